use crate::routes::responses::ImageRecordView;
use schemars::JsonSchema;
use serde::Serialize;

/// `{success: false, error}` returned by every failing endpoint
#[derive(Debug, Serialize, JsonSchema)]
pub struct FailureEnvelope {
    pub success: bool,
    pub error: String,
}

/// `{success: true}`
#[derive(Debug, Serialize, JsonSchema)]
pub struct SuccessEnvelope {
    pub success: bool,
}

/// `{success: true, image}` returned on upload
#[derive(Debug, Serialize, JsonSchema)]
pub struct UploadEnvelope {
    pub success: bool,
    pub image: ImageRecordView,
}

impl FailureEnvelope {
    pub fn new(error: String) -> Self {
        FailureEnvelope {
            success: false,
            error,
        }
    }
}

impl SuccessEnvelope {
    pub fn ok() -> Self {
        SuccessEnvelope { success: true }
    }
}

impl UploadEnvelope {
    pub fn ok(image: ImageRecordView) -> Self {
        UploadEnvelope {
            success: true,
            image,
        }
    }
}

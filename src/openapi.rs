use crate::routes::upload_form::UploadForm;
use aide::generate::GenContext;
use aide::openapi::{MediaType, RequestBody, SchemaObject};
use aide::operation::{OperationInput, set_body};
use indexmap::IndexMap;
use schemars::Schema;
use schemars::json_schema;

impl OperationInput for UploadForm {
    fn operation_input(ctx: &mut GenContext, operation: &mut aide::openapi::Operation) {
        let schema: Schema = json_schema!({
            "type": "object",
            "required": ["image", "gallery"],
            "properties": {
                "image": {
                    "type": "string",
                    "format": "binary",
                    "description": "Image file (`file` is accepted too); the part content type is stored as-is"
                },
                "gallery": {
                    "type": "string",
                    "description": "Gallery label the image is listed under"
                }
            }
        });
        set_body(
            ctx,
            operation,
            RequestBody {
                description: Some("Image file plus gallery label.".to_string()),
                content: IndexMap::from_iter([(
                    "multipart/form-data".to_string(),
                    MediaType {
                        schema: Some(SchemaObject {
                            json_schema: schema,
                            example: None,
                            external_docs: None,
                        }),
                        ..Default::default()
                    },
                )]),
                required: true,
                extensions: Default::default(),
            },
        );
    }
}

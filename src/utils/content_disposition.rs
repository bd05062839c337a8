use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use sanitize_filename::sanitize;

/// RFC 5987 attr-char: everything except alphanumerics and `!#$&+-.^_`|~` gets encoded
const ATTR_CHAR: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'!')
    .remove(b'#')
    .remove(b'$')
    .remove(b'&')
    .remove(b'+')
    .remove(b'-')
    .remove(b'.')
    .remove(b'^')
    .remove(b'_')
    .remove(b'`')
    .remove(b'|')
    .remove(b'~');

pub struct ContentDisposition;

impl ContentDisposition {
    /// `inline` disposition carrying both an ASCII fallback and the UTF-8 filename
    pub fn inline(filename: &str) -> String {
        let sanitized = sanitize(filename);
        let sanitized = if sanitized.is_empty() {
            "image".to_string()
        } else {
            sanitized
        };

        format!(
            "inline; filename=\"{}\"; filename*=UTF-8''{}",
            Self::ascii_fallback(&sanitized),
            utf8_percent_encode(&sanitized, ATTR_CHAR)
        )
    }

    fn ascii_fallback(filename: &str) -> String {
        filename
            .chars()
            .map(|c| {
                if c.is_ascii() && !c.is_ascii_control() && c != '"' && c != '\\' {
                    c
                } else {
                    '_'
                }
            })
            .collect()
    }
}

//! Image upload intake for document forensics.

use std::path::Path;

use axum::body::Bytes;
use axum::extract::Multipart;
use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::error::WebError;

pub const ACCEPTED_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

pub struct Upload {
    pub file_name: String,
    pub bytes: Bytes,
}

impl Upload {
    pub fn mime(&self) -> &'static str {
        match extension(&self.file_name).as_deref() {
            Some("png") => "image/png",
            _ => "image/jpeg",
        }
    }

    /// Inline `data:` URL for showing the image back on the page.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime(), STANDARD.encode(&self.bytes))
    }
}

/// The first file field of the form. Non-file fields are skipped.
pub async fn read_image(multipart: &mut Multipart) -> Result<Upload, WebError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| WebError::BadUpload(format!("could not read upload: {}", e.body_text())))?
    {
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        if !accepted(&file_name) {
            return Err(WebError::BadUpload(format!(
                "'{file_name}' is not an image: only png, jpg and jpeg files are accepted"
            )));
        }
        let bytes = field
            .bytes()
            .await
            .map_err(|e| WebError::BadUpload(format!("could not read upload: {}", e.body_text())))?;
        if bytes.is_empty() {
            return Err(WebError::BadUpload(format!("'{file_name}' is empty")));
        }
        return Ok(Upload { file_name, bytes });
    }
    Err(WebError::BadUpload("no file was uploaded".into()))
}

fn extension(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
}

fn accepted(file_name: &str) -> bool {
    extension(file_name).is_some_and(|ext| ACCEPTED_EXTENSIONS.contains(&ext.as_str()))
}

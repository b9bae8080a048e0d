//! Multipart form reading for the avatar and product uploads.

use std::collections::HashMap;

use axum::extract::Multipart;

use crate::api::Upload;
use crate::error::{AppError, Result};

/// A multipart form read into memory.
#[derive(Debug, Default)]
pub struct UploadForm {
    fields: HashMap<String, String>,
    files: HashMap<String, Upload>,
}

impl UploadForm {
    /// Read every part of `multipart`.
    ///
    /// File inputs left empty (no name, no bytes) are skipped.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` for a malformed or oversized body.
    pub async fn read(mut multipart: Multipart) -> Result<Self> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await.map_err(bad_request)? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let content_type = field
                        .content_type()
                        .unwrap_or("application/octet-stream")
                        .to_string();
                    let bytes = field.bytes().await.map_err(bad_request)?;
                    if file_name.is_empty() && bytes.is_empty() {
                        continue;
                    }
                    form.files.insert(
                        name,
                        Upload {
                            file_name,
                            content_type,
                            bytes: bytes.to_vec(),
                        },
                    );
                }
                None => {
                    let value = field.text().await.map_err(bad_request)?;
                    form.fields.insert(name, value);
                }
            }
        }

        Ok(form)
    }

    /// Text value of `name`, empty when absent.
    #[must_use]
    pub fn text(&self, name: &str) -> String {
        self.fields.get(name).cloned().unwrap_or_default()
    }

    /// Take the file sent as `name`.
    pub fn take_file(&mut self, name: &str) -> Option<Upload> {
        self.files.remove(name)
    }
}

fn bad_request(err: axum::extract::multipart::MultipartError) -> AppError {
    tracing::warn!(error = %err, "Malformed multipart body");
    AppError::BadRequest(err.body_text())
}

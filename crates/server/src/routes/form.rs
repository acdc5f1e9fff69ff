//! Form bodies as browsers send them.
//!
//! The editor posts `FormData` (multipart) while scripts and older pages
//! post urlencoded bodies. Both end up in the same `FormData` map so the
//! handlers never see the difference.

use std::collections::HashMap;
use std::str::FromStr;

use axum::{
    extract::{FromRequest, Multipart, Request},
    http::header,
    Form,
};

use crate::error::ApiError;

pub struct UploadedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

#[derive(Default)]
pub struct FormData {
    fields: HashMap<String, String>,
    files: HashMap<String, UploadedFile>,
}

impl<S> FromRequest<S> for FormData
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| ApiError::bad_request(e.body_text()))?;
            Self::from_multipart(multipart).await
        } else if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(pairs) = Form::<Vec<(String, String)>>::from_request(req, state)
                .await
                .map_err(|e| ApiError::bad_request(e.body_text()))?;
            let mut form = Self::default();
            for (name, value) in pairs {
                form.fields.entry(name).or_insert(value);
            }
            Ok(form)
        } else {
            Ok(Self::default())
        }
    }
}

impl FormData {
    async fn from_multipart(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = Self::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?
        {
            let name = field.name().unwrap_or_default().to_string();
            let file_name = field.file_name().map(str::to_string);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::bad_request(e.body_text()))?;

            match file_name {
                // an empty file input still sends a part with no content
                Some(_) if bytes.is_empty() => {}
                Some(file_name) => {
                    form.files.entry(name).or_insert(UploadedFile {
                        name: file_name,
                        bytes: bytes.to_vec(),
                    });
                }
                None => {
                    form.fields
                        .entry(name)
                        .or_insert_with(|| String::from_utf8_lossy(&bytes).into_owned());
                }
            }
        }
        Ok(form)
    }

    /// Text field, `None` when absent or blank.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    pub fn take_file(&mut self, name: &str) -> Option<UploadedFile> {
        self.files.remove(name)
    }

    /// Parse a field, answering 400 when it is present but malformed.
    pub fn parse<T: FromStr>(&self, name: &str) -> Result<Option<T>, ApiError> {
        match self.text(name) {
            Some(value) => value
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| ApiError::bad_request(format!("Invalid {name}: {value}"))),
            None => Ok(None),
        }
    }

    pub fn number(&self, name: &str, default: f64) -> Result<f64, ApiError> {
        Ok(self.parse(name)?.unwrap_or(default))
    }
}

// Request body for create/update: multipart/form-data (browser forms, with an
// optional `profile` image part) or a plain JSON object.

use crate::{models::UserForm, services::ProfileUpload, utils::error::AppError};
use actix_multipart::Multipart;
use actix_web::{web, FromRequest, HttpRequest};
use futures::StreamExt;

pub const PROFILE_FIELD: &str = "profile";

#[derive(Debug, Default)]
pub struct UserPayload {
    pub form: UserForm,
    pub profile: Option<ProfileUpload>,
}

pub async fn read_user_payload(
    req: &HttpRequest,
    payload: web::Payload,
    max_upload_bytes: usize,
) -> Result<UserPayload, AppError> {
    let content_type = req
        .headers()
        .get(actix_web::http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_ascii_lowercase();

    let mut payload = payload.into_inner();

    if content_type.starts_with("multipart/form-data") {
        let multipart = Multipart::new(req.headers(), payload);
        read_multipart(multipart, max_upload_bytes).await
    } else if content_type.starts_with("application/json") {
        let json = web::Json::<UserForm>::from_request(req, &mut payload)
            .await
            .map_err(|e| AppError::BadRequest(format!("Invalid JSON payload: {}", e)))?;
        Ok(UserPayload {
            form: json.into_inner(),
            profile: None,
        })
    } else {
        Err(AppError::BadRequest(format!(
            "Unsupported content type '{}', expected multipart/form-data or application/json",
            content_type
        )))
    }
}

async fn read_multipart(
    mut multipart: Multipart,
    max_upload_bytes: usize,
) -> Result<UserPayload, AppError> {
    let mut result = UserPayload::default();

    while let Some(field) = multipart.next().await {
        let mut field =
            field.map_err(|e| AppError::BadRequest(format!("Invalid multipart payload: {}", e)))?;

        let disposition = field.content_disposition();
        let name = disposition
            .and_then(|cd| cd.get_name())
            .unwrap_or_default()
            .to_string();
        let file_name = disposition.and_then(|cd| cd.get_filename()).map(str::to_string);
        let content_type = field.content_type().map(|m| m.essence_str().to_string());

        let mut data = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|e| {
                AppError::BadRequest(format!("Failed to read field {}: {}", name, e))
            })?;
            if data.len() + chunk.len() > max_upload_bytes {
                return Err(AppError::PayloadTooLarge(format!(
                    "field {} exceeds {} bytes",
                    name, max_upload_bytes
                )));
            }
            data.extend_from_slice(&chunk);
        }

        match file_name {
            Some(file_name) if name == PROFILE_FIELD => {
                // A file input left empty still sends a part with no content
                if file_name.is_empty() && data.is_empty() {
                    continue;
                }
                result.profile = Some(ProfileUpload {
                    file_name,
                    content_type,
                    bytes: data,
                });
            }
            Some(_) => {
                log::debug!("Ignoring unexpected file part {}", name);
            }
            None => {
                let value = String::from_utf8(data)
                    .map_err(|_| {
                        AppError::BadRequest(format!("Field {} is not valid UTF-8", name))
                    })?;
                result.form.set(&name, value);
            }
        }
    }

    Ok(result)
}

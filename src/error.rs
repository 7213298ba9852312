// src/error.rs
use crate::fields::FieldError;
use crate::models::post::PostId;
use crate::models::settings::SettingsError;
use crate::search::params::ParamError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use leptos::logging;
use serde_json::{json, Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidParam(#[from] ParamError),
    #[error("Invalid settings data provided.")]
    InvalidSettings(Vec<String>),
    #[error("{0}")]
    InvalidField(#[from] FieldError),
    #[error("Sorry, you are not allowed to do that.")]
    Forbidden { authenticated: bool },
    #[error("Invalid post ID.")]
    PostNotFound(PostId),
    #[error("Invalid request body: {0}")]
    InvalidBody(String),
    #[error("Stored value could not be decoded: {0}")]
    InvalidStoredValue(#[from] serde_json::Error),
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

impl From<SettingsError> for ApiError {
    fn from(err: SettingsError) -> Self {
        match err {
            SettingsError::Invalid(messages) => ApiError::InvalidSettings(messages),
        }
    }
}

impl ApiError {
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidParam(_) => "rest_invalid_param",
            ApiError::InvalidSettings(_) => "rest_invalid_params",
            ApiError::InvalidField(FieldError::Forbidden(_)) => "rest_cannot_update",
            ApiError::InvalidField(_) => "rest_invalid_param",
            ApiError::Forbidden { .. } => "rest_forbidden",
            ApiError::PostNotFound(_) => "rest_post_invalid_id",
            ApiError::InvalidBody(_) => "rest_invalid_json",
            ApiError::InvalidStoredValue(_) | ApiError::Database(_) => "internal_error",
        }
    }

    fn params(&self) -> Option<Value> {
        let (key, detail) = match self {
            ApiError::InvalidParam(err) => (err.param.to_string(), json!(err.reason)),
            ApiError::InvalidSettings(messages) => ("settings".to_string(), json!(messages)),
            ApiError::InvalidField(err) => {
                let key = match err {
                    FieldError::Unknown(key) => key.clone(),
                    FieldError::InvalidType { key, .. }
                    | FieldError::OutOfRange { key, .. }
                    | FieldError::Forbidden(key) => key.to_string(),
                };
                (key, json!(err.to_string()))
            }
            _ => return None,
        };
        let mut params = Map::new();
        params.insert(key, detail);
        Some(Value::Object(params))
    }

    fn message(&self) -> String {
        match self {
            ApiError::InvalidParam(err) => format!("Invalid parameter(s): {}", err.param),
            // storage details stay in the log
            ApiError::InvalidStoredValue(_) | ApiError::Database(_) => {
                "The request could not be completed.".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidParam(_)
            | ApiError::InvalidSettings(_)
            | ApiError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidField(FieldError::Forbidden(_)) => StatusCode::FORBIDDEN,
            ApiError::InvalidField(_) => StatusCode::BAD_REQUEST,
            ApiError::Forbidden {
                authenticated: false,
            } => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden {
                authenticated: true,
            } => StatusCode::FORBIDDEN,
            ApiError::PostNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InvalidStoredValue(_) | ApiError::Database(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            logging::error!("[API] {}", self);
        } else {
            logging::log!("[API] Rejected request: {} ({})", self, self.code());
        }

        let mut data = Map::new();
        data.insert("status".into(), json!(status.as_u16()));
        if let Some(params) = self.params() {
            data.insert("params".into(), params);
        }
        HttpResponse::build(status).json(json!({
            "code": self.code(),
            "message": self.message(),
            "data": data,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    async fn body_of(err: ApiError) -> (StatusCode, Value) {
        let response = err.error_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body()).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[actix_web::test]
    async fn param_errors_name_the_parameter() {
        let err = ApiError::InvalidParam(ParamError {
            param: "rating",
            reason: "out of range".into(),
        });
        let (status, body) = body_of(err).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "rest_invalid_param");
        assert_eq!(body["message"], "Invalid parameter(s): rating");
        assert_eq!(body["data"]["status"], 400);
        assert_eq!(body["data"]["params"]["rating"], "out of range");
    }

    #[actix_web::test]
    async fn forbidden_depends_on_authentication() {
        let (anonymous, body) = body_of(ApiError::Forbidden {
            authenticated: false,
        })
        .await;
        assert_eq!(anonymous, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "rest_forbidden");
        assert!(body["data"].get("params").is_none());

        let (editor, _) = body_of(ApiError::Forbidden {
            authenticated: true,
        })
        .await;
        assert_eq!(editor, StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn storage_errors_hide_details() {
        let (status, body) =
            body_of(ApiError::Database(rusqlite::Error::QueryReturnedNoRows)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["code"], "internal_error");
        assert_eq!(body["message"], "The request could not be completed.");
    }
}

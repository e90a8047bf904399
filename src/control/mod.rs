use actix_web::{http::StatusCode, HttpResponse};
use derive_more::{Display, Error};

pub mod site_api;

pub type Response = Result<HttpResponse, ControllerError>;

#[derive(Debug, Display, Error)]
pub enum ControllerError {
    NotFound,
    #[error(ignore)]
    #[display("Invalid field {field}")]
    InvalidInput { field: String, msg: String },
}

impl actix_web::error::ResponseError for ControllerError {
    fn status_code(&self) -> StatusCode {
        match self {
            ControllerError::NotFound => StatusCode::NOT_FOUND,
            ControllerError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        log::warn!("{self:?}\n");
        use ControllerError::*;
        let body = match self {
            NotFound => serde_json::json!({ "error": "Not found" }),
            InvalidInput { field, msg } => serde_json::json!({
                "error": "Invalid input",
                "field": field,
                "message": msg,
            }),
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

pub async fn not_found() -> Response {
    Err(ControllerError::NotFound)
}

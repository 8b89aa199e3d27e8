mod ports;
mod sketch;

pub use ports::get_ports_handler;
pub use sketch::{compile_handler, upload_handler};

use actix_web::error::{InternalError, JsonPayloadError};
use actix_web::http::Method;
use actix_web::{HttpRequest, HttpResponse, Responder};
use serde_json::json;

use crate::error::ErrorResponse;

pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let response = HttpResponse::BadRequest().json(ErrorResponse {
        status: "error",
        reason: "ERR_INVALID_ARGUMENT",
        code: 1,
        message: err.to_string(),
    });
    InternalError::from_response(err, response).into()
}

pub async fn root_handler() -> impl Responder {
    HttpResponse::Ok().json(json!({ "status": "Sketch build service online" }))
}

/// Answers CORS preflight requests and unknown routes
pub async fn fallback_handler(req: HttpRequest) -> HttpResponse {
    if req.method() == Method::OPTIONS {
        return HttpResponse::NoContent().finish();
    }
    HttpResponse::NotFound().json(ErrorResponse {
        status: "error",
        reason: "ERR_NOT_FOUND",
        code: 3,
        message: format!("No route for {} {}", req.method(), req.path()),
    })
}

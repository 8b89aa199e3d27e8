use actix_web::{HttpResponse, web};

use crate::error::DeployError;
use crate::toolchain::{Action, BuildRequest, Orchestrator, Outcome, StatusResponse};

pub async fn compile_handler(
    orchestrator: web::Data<Orchestrator>,
    body: web::Json<BuildRequest>,
) -> Result<HttpResponse, DeployError> {
    handle_sketch(&orchestrator, Action::Compile, &body).await
}

pub async fn upload_handler(
    orchestrator: web::Data<Orchestrator>,
    body: web::Json<BuildRequest>,
) -> Result<HttpResponse, DeployError> {
    handle_sketch(&orchestrator, Action::CompileAndUpload, &body).await
}

async fn handle_sketch(
    orchestrator: &Orchestrator,
    action: Action,
    request: &BuildRequest,
) -> Result<HttpResponse, DeployError> {
    match orchestrator.deploy(action, request).await? {
        Outcome::Success(message) => Ok(HttpResponse::Ok().json(StatusResponse {
            status: "success",
            message,
        })),
        Outcome::SimulatedFallback(message) => Ok(HttpResponse::Ok().json(StatusResponse {
            status: "warning",
            message,
        })),
        Outcome::Failure(diagnostic) => {
            let err = DeployError::ToolchainFailed { action, diagnostic };
            log::info!("{err}");
            Err(err)
        }
    }
}

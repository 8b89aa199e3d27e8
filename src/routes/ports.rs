use actix_web::{HttpResponse, web};

use crate::toolchain::Orchestrator;

pub async fn get_ports_handler(orchestrator: web::Data<Orchestrator>) -> HttpResponse {
    HttpResponse::Ok().json(orchestrator.list_ports().await)
}

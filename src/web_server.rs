use actix_web::http::Method;
use actix_web::{App, HttpServer, dev::Server, middleware, web};

use crate::config::{DEFAULT_BIND_ADDRESS, DEFAULT_BIND_PORT, ServerConfig};
use crate::routes::{
    compile_handler, fallback_handler, get_ports_handler, json_error_handler, root_handler,
    upload_handler,
};
use crate::toolchain::Orchestrator;

/// Registers every route on an app; shared by the server and the tests
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .service(web::resource("/").route(web::get().to(root_handler)))
        .service(
            web::resource("/ports")
                .route(web::get().to(get_ports_handler))
                .route(web::method(Method::OPTIONS).to(fallback_handler)),
        )
        .service(
            web::resource("/compile")
                .route(web::post().to(compile_handler))
                .route(web::method(Method::OPTIONS).to(fallback_handler)),
        )
        .service(
            web::resource("/upload")
                .route(web::post().to(upload_handler))
                .route(web::method(Method::OPTIONS).to(fallback_handler)),
        )
        .default_service(web::to(fallback_handler));
}

/// Front-ends are served from other origins, so every origin is allowed
pub fn cors_headers() -> middleware::DefaultHeaders {
    middleware::DefaultHeaders::new()
        .add(("Access-Control-Allow-Origin", "*"))
        .add(("Access-Control-Allow-Methods", "GET, POST, OPTIONS"))
        .add(("Access-Control-Allow-Headers", "*"))
}

pub fn build_server(
    server_config: ServerConfig,
    orchestrator: Orchestrator,
) -> std::io::Result<Server> {
    let orchestrator = web::Data::new(orchestrator);
    let bind_address = server_config
        .bind_address
        .unwrap_or(DEFAULT_BIND_ADDRESS.to_string());
    let bind_port = server_config.bind_port.unwrap_or(DEFAULT_BIND_PORT);

    let server = HttpServer::new(move || {
        App::new()
            .app_data(orchestrator.clone())
            .wrap(cors_headers())
            .wrap(middleware::Logger::default())
            .configure(configure)
    })
    .bind((bind_address.as_str(), bind_port))?
    .run();

    log::info!("Listening on {bind_address}:{bind_port}");
    Ok(server)
}

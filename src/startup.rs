use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use std::net::TcpListener;

use crate::auth::AuthService;
use crate::configuration::ApplicationSettings;
use crate::middleware::{JwtMiddleware, RequestLogger};
use crate::routes::{create_user, health_check, login, refresh, reset, revoke, update_user};

pub fn run(
    listener: TcpListener,
    auth_service: AuthService,
    application: ApplicationSettings,
) -> Result<Server, std::io::Error> {
    let auth_service = web::Data::new(auth_service);
    let application = web::Data::new(application);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(RequestLogger)

            // Shared state
            .app_data(auth_service.clone())
            .app_data(application.clone())

            .route("/api/healthz", web::get().to(health_check))
            .route("/api/users", web::post().to(create_user))
            .route("/api/login", web::post().to(login))
            .route("/api/refresh", web::post().to(refresh))
            .route("/api/revoke", web::post().to(revoke))
            .service(
                web::resource("/api/users")
                    .wrap(JwtMiddleware)
                    .route(web::put().to(update_user)),
            )
            .route("/admin/reset", web::post().to(reset))
    })
    .listen(listener)?
    .run();

    Ok(server)
}

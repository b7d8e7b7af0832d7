//! HTTP handlers and route configuration.

#[cfg(feature = "auth")]
mod auth;
mod health;
mod posts;

use actix_web::web;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    let api = web::scope("/api/v1")
        // Public routes
        .route("/health", web::get().to(health::health_check))
        .route("/posts", web::get().to(posts::list_posts))
        .route("/post/{slug}", web::get().to(posts::get_post));

    #[cfg(feature = "auth")]
    let api = api
        .route("/create-post", web::post().to(posts::create_post))
        .route("/update-post/{post_id}", web::put().to(posts::update_post))
        .route("/delete/{post_id}", web::delete().to(posts::delete_post))
        .route("/feature", web::put().to(posts::feature_post))
        .service(
            web::scope("/auth")
                .route("/register", web::post().to(auth::register))
                .route("/login", web::post().to(auth::login))
                .route("/me", web::get().to(auth::me)),
        );

    cfg.service(api);
}

pub mod error;
pub mod extractors;
pub mod routes;
pub mod state;

use axum::{
    Router,
    http::HeaderValue,
    routing::{delete, get, post, put},
};
use state::AppState;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.settings.server.cors_origins);

    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/refresh", post(routes::auth::refresh))
        .route("/me", get(routes::auth::me).put(routes::auth::update_me));

    let user_routes = Router::new()
        .route("/notification", get(routes::user::notifications))
        .route("/notification/{notification_id}/read", put(routes::user::mark_read));

    let admin_routes = Router::new()
        .route("/notification", post(routes::user::broadcast))
        .route(
            "/review/{review_id}",
            put(routes::review::admin_edit).delete(routes::review::admin_delete),
        );

    let category_routes = Router::new()
        .route("/", get(routes::category::list).post(routes::category::create));

    let blog_routes = Router::new()
        .route("/", get(routes::blog::list).post(routes::blog::create))
        .route("/{blog_id}", get(routes::blog::get));

    let retreat_routes = Router::new()
        .route("/", get(routes::retreat::list).post(routes::retreat::create))
        .route("/all", get(routes::retreat::list_all))
        .route("/organizer/{organizer_id}", get(routes::retreat::by_organizer))
        .route(
            "/{retreat_id}",
            get(routes::retreat::get)
                .put(routes::retreat::update)
                .delete(routes::retreat::delete),
        )
        .route("/{retreat_id}/approve", put(routes::retreat::approve));

    let booking_routes = Router::new()
        .route("/", post(routes::booking::checkout))
        .route("/{user_id}", get(routes::booking::for_user))
        .route("/organizer/{organizer_id}", get(routes::booking::for_organizer))
        .route(
            "/organizer/{organizer_id}/categorized",
            get(routes::booking::categorized_for_organizer),
        )
        .route("/{booking_id}/cancel", put(routes::booking::cancel))
        .route("/{booking_id}/status", put(routes::booking::set_status));

    let dashboard_routes = Router::new()
        .route("/revenue/{organizer_id}", get(routes::dashboard::revenue))
        .route("/organizer/{organizer_id}", get(routes::dashboard::organizer_summary))
        .route("/users", get(routes::dashboard::users))
        .route("/organizers", get(routes::dashboard::organizers));

    let review_routes = Router::new()
        .route("/", post(routes::review::add))
        .route("/retreat/{retreat_id}", get(routes::review::for_retreat))
        .route("/retreat/{retreat_id}/average", get(routes::review::average))
        .route("/{review_id}", put(routes::review::edit))
        .route("/{review_id}/helpful", post(routes::review::helpful));

    let chat_routes = Router::new()
        .route("/", post(routes::chat::send))
        .route("/user", get(routes::chat::for_user))
        .route("/retreat/{retreat_id}", get(routes::chat::for_retreat));

    let wishlist_routes = Router::new()
        .route(
            "/{user_id}",
            get(routes::wishlist::list)
                .post(routes::wishlist::add)
                .delete(routes::wishlist::clear),
        )
        .route("/{user_id}/item", delete(routes::wishlist::remove_item))
        .route(
            "/{user_id}/{service_type}",
            get(routes::wishlist::list_by_service_type),
        );

    let api = Router::new()
        .nest("/auth", auth_routes)
        .nest("/user", user_routes)
        .nest("/admin", admin_routes)
        .nest("/category", category_routes)
        .nest("/blog", blog_routes)
        .nest("/retreat", retreat_routes)
        .nest("/booking", booking_routes)
        .nest("/dashboard", dashboard_routes)
        .nest("/review", review_routes)
        .nest("/chat", chat_routes)
        .nest("/wishlist", wishlist_routes);

    let health = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api)
        .merge(health)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(cors),
        )
        .with_state(state)
}

/// Any origin when none are configured.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();

    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if allowed.is_empty() {
        cors.allow_origin(Any)
    } else {
        cors.allow_origin(allowed)
    }
}

async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

use axum::{
    http::{header, Method},
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod config;
pub mod extractors;
pub mod handlers;
pub mod metrics;
pub mod middlewares;
pub mod models;
pub mod services;

pub use config::Config;
pub use services::AppState;

/// Build the application router with all routes and middleware.
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login))
        .route("/google-login", post(handlers::auth::google_login))
        .route("/verify", post(handlers::auth::verify));

    // Collection roots are registered as explicit paths so "/api/students"
    // matches without a trailing slash
    let student_routes = Router::new()
        .route(
            "/students",
            get(handlers::students::list).post(handlers::students::create),
        )
        .route(
            "/students/{id}",
            get(handlers::students::get)
                .put(handlers::students::update)
                .delete(handlers::students::delete),
        );

    let drill_routes = Router::new()
        .route(
            "/drills",
            get(handlers::drills::list).post(handlers::drills::create),
        )
        .route(
            "/drills/{id}",
            get(handlers::drills::get)
                .put(handlers::drills::update)
                .delete(handlers::drills::delete),
        )
        .route("/drills/{id}/start", post(handlers::drills::start))
        .route("/drills/{id}/end", post(handlers::drills::end))
        .route(
            "/drills/{id}/attendance",
            post(handlers::drills::mark_attendance),
        );

    let module_routes = Router::new()
        .route(
            "/modules",
            get(handlers::modules::list).post(handlers::modules::create),
        )
        .route(
            "/modules/{id}",
            get(handlers::modules::get)
                .put(handlers::modules::update)
                .delete(handlers::modules::delete),
        )
        .route(
            "/modules/{id}/progress",
            post(handlers::modules::record_progress),
        );

    let alert_routes = Router::new()
        .route(
            "/alerts",
            get(handlers::alerts::list).post(handlers::alerts::create),
        )
        .route(
            "/alerts/{id}",
            get(handlers::alerts::get)
                .put(handlers::alerts::update)
                .delete(handlers::alerts::delete),
        )
        .route("/alerts/{id}/acknowledge", post(handlers::alerts::acknowledge))
        .route(
            "/alerts/{id}/deactivate",
            post(handlers::alerts::deactivate).put(handlers::alerts::deactivate),
        );

    let dashboard_routes = Router::new()
        .route("/stats", get(handlers::dashboard::stats))
        .route("/leaderboard", get(handlers::dashboard::leaderboard))
        .route("/activities", get(handlers::dashboard::activities));

    let ai_routes = Router::new()
        .route("/chat", post(handlers::ai::chat))
        .route("/quiz", post(handlers::ai::generate_quiz))
        .route("/safety-tips", post(handlers::ai::safety_tips))
        .route("/drill-scenario", post(handlers::ai::drill_scenario))
        .route(
            "/analyze-preparedness",
            post(handlers::ai::analyze_preparedness),
        )
        .route("/emergency-guide", post(handlers::ai::emergency_guide));

    // Everything except auth sits behind the JWT middleware
    let protected = Router::new()
        .merge(student_routes)
        .merge(drill_routes)
        .merge(module_routes)
        .merge(alert_routes)
        .nest("/dashboard", dashboard_routes)
        .nest("/ai", ai_routes)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::auth::auth_middleware,
        ));

    let api = Router::new()
        .nest("/auth", auth_routes)
        .route("/health", get(handlers::health_check))
        .merge(protected)
        .fallback(handlers::api_description);

    Router::new()
        .route("/health", get(handlers::health_check))
        .route(
            "/metrics",
            get(handlers::metrics_handler)
                .layer(middleware::from_fn(handlers::metrics_auth_middleware)),
        )
        .nest("/api", api)
        .layer(middleware::from_fn(
            middlewares::metrics::metrics_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

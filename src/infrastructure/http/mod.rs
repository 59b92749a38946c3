use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, patch, post, put},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::infrastructure::config::Config;
use crate::infrastructure::db::DbPool;
use crate::{
    controllers::{
        admin::AdminController,
        auth::AuthController,
        flow::FlowController,
        health::{self, HealthState},
    },
    domain::{
        admin::AdminService,
        auth::{AuthService, SessionEvents},
        flow::{FlowService, FlowSettings},
        replies::ReplyService,
    },
    infrastructure::auth::{admin_middleware, auth_middleware, request_id_middleware},
    infrastructure::repositories::{AssistantRepository, SessionRepository, UserRepository},
};

/// Wire repositories, services and controllers into the application router
pub fn build_app(
    config: Arc<Config>,
    pool: Arc<DbPool>,
    assistant: Arc<dyn AssistantRepository>,
) -> Router {
    // === DEPENDENCY INJECTION SETUP ===
    // 1. Repositories
    let user_repo = Arc::new(UserRepository::new(pool.clone()));
    let session_repo = Arc::new(SessionRepository::new(pool.clone()));
    let events = Arc::new(SessionEvents::default());

    // 2. Services
    let auth_service = Arc::new(AuthService::new(
        user_repo.clone(),
        session_repo.clone(),
        events.clone(),
        config.clone(),
    ));
    let admin_service = Arc::new(AdminService::new(
        user_repo,
        session_repo.clone(),
        events.clone(),
        config.clone(),
    ));
    let reply_service = Arc::new(ReplyService::new(assistant.clone()));
    let flow_service = Arc::new(FlowService::new(
        reply_service,
        FlowSettings::from(config.as_ref()),
    ));

    // 3. Controllers
    let auth_controller = Arc::new(AuthController::new(auth_service, events));
    let admin_controller = Arc::new(AdminController::new(admin_service));
    let flow_controller = Arc::new(FlowController::new(flow_service));
    let health_state = Arc::new(HealthState { pool, assistant });

    let auth_state = (session_repo, config.clone());

    // Auth routes (public - no auth required)
    let auth_routes = Router::new()
        .route("/auth/signup", post(AuthController::signup))
        .route("/auth/signin", post(AuthController::signin))
        .with_state(auth_controller.clone());

    // Session routes (require authentication)
    let session_routes = Router::new()
        .route("/auth/signout", post(AuthController::signout))
        .route("/api/session", get(AuthController::session))
        .route("/api/session/events", get(AuthController::events))
        .route("/api/subscription/upgrade", post(AuthController::upgrade))
        .with_state(auth_controller)
        .layer(middleware::from_fn_with_state(
            auth_state.clone(),
            auth_middleware,
        ));

    // Admin routes (authentication + admin flag)
    let admin_routes = Router::new()
        .route("/api/admin/users", get(AdminController::list_users))
        .route(
            "/api/admin/users/:id",
            patch(AdminController::update_user).delete(AdminController::delete_user),
        )
        .route("/api/admin/stats", get(AdminController::stats))
        .with_state(admin_controller)
        .layer(middleware::from_fn(admin_middleware))
        .layer(middleware::from_fn_with_state(
            auth_state.clone(),
            auth_middleware,
        ));

    // Base64 inflates payloads by a third; leave room for the JSON envelope
    let body_limit = config.max_image_bytes / 3 * 4 + 64 * 1024;

    // Flow routes (anonymous until generation)
    let flow_routes = Router::new()
        .route("/api/flows", post(FlowController::create))
        .route("/api/flows/:id", get(FlowController::get))
        .route("/api/flows/:id/image", post(FlowController::submit_image))
        .route("/api/flows/:id/upload", post(FlowController::upload))
        .route("/api/flows/:id/transcript", put(FlowController::update_transcript))
        .route("/api/flows/:id/advance", post(FlowController::advance))
        .route("/api/flows/:id/config", put(FlowController::update_config))
        .route("/api/flows/:id/gate/complete", post(FlowController::complete_gate))
        .route("/api/flows/:id/back", post(FlowController::back))
        .route("/api/flows/:id/reset", post(FlowController::reset))
        .with_state(flow_controller.clone())
        .layer(DefaultBodyLimit::max(body_limit));

    let generate_routes = Router::new()
        .route("/api/flows/:id/generate", post(FlowController::generate))
        .with_state(flow_controller)
        .layer(middleware::from_fn_with_state(auth_state, auth_middleware));

    let cors = if config.is_development() {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
    };

    // Build application routes
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::health_ready))
        .with_state(health_state)
        .merge(auth_routes)
        .merge(session_routes)
        .merge(admin_routes)
        .merge(flow_routes)
        .merge(generate_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(middleware::from_fn(request_id_middleware)),
        )
}

/// Start the HTTP server with all routes configured
pub async fn start_http_server(
    config: Arc<Config>,
    app: Router,
) -> Result<(), Box<dyn std::error::Error>> {
    let listener =
        tokio::net::TcpListener::bind(format!("{}:{}", config.host, config.port)).await?;

    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}

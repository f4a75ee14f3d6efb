//! API routes

use axum::Router;

use crate::AppState;

mod agents;
mod system;
mod tasks;
mod workflows;

/// Build the API router with all endpoints
pub fn api_router() -> Router<AppState> {
    Router::new()
        .nest("/agents", agents::router())
        .nest("/tasks", tasks::router())
        .nest("/workflows", workflows::router())
        .nest("/system", system::router())
}

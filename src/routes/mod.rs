use axum::Router;

use crate::state::AppState;

pub mod audit;
pub mod auth;
pub mod doc;
pub mod emissions;
pub mod guests;
pub mod health;
pub mod params;
pub mod permissions;
pub mod presenters;
pub mod roles;
pub mod segments;
pub mod setup;
pub mod shows;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/permissions", permissions::router())
        .nest("/roles", roles::router())
        .nest("/emissions", emissions::router())
        .nest("/shows", shows::router())
        .nest("/segments", segments::router())
        .nest("/presenters", presenters::router())
        .nest("/guests", guests::router())
        .nest("/audit", audit::router())
}

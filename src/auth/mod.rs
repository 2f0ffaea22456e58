mod dto;
mod handlers;
pub mod jwt;
mod password;
mod repo;

use axum::Router;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    handlers::auth_routes()
}

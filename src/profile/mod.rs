pub mod dto;
pub mod handlers;
pub mod repo;

use crate::state::AppState;
use axum::Router;

pub use dto::UserProfile;

pub fn router() -> Router<AppState> {
    handlers::profile_routes()
}

use crate::state::AppState;
use axum::Router;

mod claims;
pub(crate) mod dto;
pub mod extractors;
pub mod handlers;
pub mod jwt;
pub mod password;
pub mod services;

pub use claims::Claims;
pub use extractors::{CurrentStudent, CurrentTeacher};

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::auth_routes())
}

//! Wires the users domain to MongoDB.

use axum::Router;
use domain_users::{MongoUserRepository, UserService, handlers};

use crate::state::AppState;

pub fn router(state: &AppState) -> Router {
    let repository =
        MongoUserRepository::with_collection(&state.db, &state.config.users_collection);
    let service = UserService::new(repository);

    handlers::router(service)
}

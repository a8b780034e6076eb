//! HTTP inbound adapter exposing REST endpoints.

use actix_web::web;

pub mod error;
pub mod health;
pub mod items;
pub mod schemas;
pub mod session;
pub mod session_config;
pub mod state;
pub mod swaps;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;

pub use error::ApiResult;

/// Register every `/api/v1` endpoint on `cfg`.
///
/// Callers mount this under a scope wrapped in the session middleware.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(users::register)
        .service(users::login)
        .service(users::logout)
        .service(users::current_user)
        .service(users::update_current_user)
        .service(items::list_user_items)
        .service(items::create_item)
        .service(items::list_items)
        .service(items::get_item)
        .service(items::update_item)
        .service(items::delete_item)
        .service(swaps::propose_swap)
        .service(swaps::list_swaps)
        .service(swaps::resolve_swap)
        .service(swaps::withdraw_swap);
}

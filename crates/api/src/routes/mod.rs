//! API route definitions.

use axum::{Router, middleware};

use crate::{AppState, middleware::auth_middleware};

mod common;
pub mod health;
pub mod inventory;
pub mod invoices;
pub mod purchases;
pub mod quotations;
pub mod registry;
pub mod treasury;
pub mod work_orders;

/// Creates the `/api/v1` router. Every route requires a bearer token.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .merge(quotations::routes())
        .merge(work_orders::routes())
        .merge(invoices::routes())
        .merge(inventory::routes())
        .merge(treasury::routes())
        .merge(purchases::routes())
        .merge(registry::routes())
        .layer(middleware::from_fn_with_state(state, auth_middleware))
}

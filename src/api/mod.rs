//! HTTP surface of the account area.

pub mod handlers;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::domain::value_objects::RequestContext;
use crate::infrastructure::Collaborators;
use crate::ports::ClientError;
use crate::services::{AddressService, CompareListService, OrderHistoryService, OrganizationService, ProfileService, ReturnService, WishListService};
use crate::AccountError;

pub const CUSTOMER_HEADER: &str = "x-customer-id";
pub const STORE_HEADER: &str = "x-store-id";

#[derive(Clone)]
pub struct AppState {
    pub returns: ReturnService,
    pub addresses: AddressService,
    pub orders: OrderHistoryService,
    pub wishlist: WishListService,
    pub compare: CompareListService,
    pub organizations: OrganizationService,
    pub profile: ProfileService,
}

impl AppState {
    pub fn new(c: Collaborators) -> Self {
        Self {
            returns: ReturnService::new(c.orders.clone(), c.totals, c.catalog.clone(), c.settings, c.members.clone(), c.events.clone()),
            addresses: AddressService::new(c.members.clone(), c.events.clone()),
            organizations: OrganizationService::new(c.members.clone(), c.events.clone()),
            profile: ProfileService::new(c.members, c.events.clone()),
            orders: OrderHistoryService::new(c.orders, c.lists.clone()),
            wishlist: WishListService::new(c.lists.clone(), c.events),
            compare: CompareListService::new(c.lists, c.catalog),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/v1/account/addresses", get(handlers::address_book).post(handlers::save_address))
        .route("/api/v1/account/addresses/edit", get(handlers::edit_address))
        .route("/api/v1/account/addresses/:id", delete(handlers::delete_address))
        .route("/api/v1/account/orders", get(handlers::list_orders))
        .route("/api/v1/account/orders/recent", get(handlers::recent_orders))
        .route("/api/v1/account/orders/:id", get(handlers::view_order))
        .route("/api/v1/account/orders/:id/print", get(handlers::print_order))
        .route("/api/v1/account/orders/:id/reorder", post(handlers::reorder))
        .route("/api/v1/account/orders/:id/returns/new", get(handlers::return_form))
        .route("/api/v1/account/orders/:id/returns", post(handlers::submit_return))
        .route("/api/v1/account/returns", get(handlers::list_returns))
        .route("/api/v1/account/wishlist", get(handlers::wishlist).post(handlers::update_wishlist))
        .route("/api/v1/account/compare", get(handlers::compare_list).post(handlers::add_to_compare))
        .route("/api/v1/account/compare/summary", get(handlers::compare_summary))
        .route("/api/v1/account/compare/:id", delete(handlers::remove_from_compare))
        .route("/api/v1/account/organizations", get(handlers::my_organizations))
        .route("/api/v1/account/organizations/:id", get(handlers::edit_organization).put(handlers::update_organization))
        .route("/api/v1/account/profile", get(handlers::profile).put(handlers::update_profile))
        .route("/api/v1/account/profile/edit", get(handlers::edit_profile))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl IntoResponse for AccountError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            AccountError::Unauthorized => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            AccountError::Return(_) | AccountError::InvalidInput(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            AccountError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AccountError::Collaborator(ClientError::Conflict { .. }) => (StatusCode::CONFLICT, "CONFLICT"),
            AccountError::Collaborator(e) => {
                tracing::error!(error = %e, "collaborator failure");
                (StatusCode::BAD_GATEWAY, "COLLABORATOR_ERROR")
            }
        };
        (status, Json(ErrorResponse { error: error_type.to_string(), message: self.to_string() })).into_response()
    }
}

/// Rejection for requests without an authenticated customer or store.
#[derive(Debug)]
pub struct MissingContext(&'static str);

impl IntoResponse for MissingContext {
    fn into_response(self) -> Response {
        let body = ErrorResponse { error: "UNAUTHORIZED".to_string(), message: format!("Missing {} header", self.0) };
        (StatusCode::UNAUTHORIZED, Json(body)).into_response()
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for RequestContext {
    type Rejection = MissingContext;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &'static str| {
            parts.headers.get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .ok_or(MissingContext(name))
        };
        Ok(RequestContext::new(header(CUSTOMER_HEADER)?, header(STORE_HEADER)?))
    }
}

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::api::AppState;
use crate::domain::aggregates::{
    AddressInput, CustomerProfile, DefaultAddressFlags, Order, Organization, OrganizationInput, ProfileUpdate, ReturnRequest,
    ReturnSubmission, SavedAddress, ShopperList,
};
use crate::domain::value_objects::RequestContext;
use crate::services::{AccountProfile, AddressBookPage, CompareSummary, OrderView, ReturnForm, WishListAction, WishListUpdate};
use crate::Result;

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "healthy", "service": "storefront-account"}))
}

// =============================================================================
// Addresses
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct OwnerParams { pub organization_id: Option<String> }

#[derive(Debug, Default, Deserialize)]
pub struct EditParams { pub address_id: Option<String>, pub organization_id: Option<String> }

#[derive(Debug, Deserialize)]
pub struct SaveAddressRequest {
    #[serde(flatten)]
    pub address: AddressInput,
    #[serde(flatten)]
    pub flags: DefaultAddressFlags,
}

pub async fn address_book(State(s): State<AppState>, ctx: RequestContext, Query(p): Query<OwnerParams>) -> Result<Json<AddressBookPage>> {
    Ok(Json(s.addresses.address_book(&ctx, p.organization_id.as_deref()).await?))
}

pub async fn edit_address(State(s): State<AppState>, ctx: RequestContext, Query(p): Query<EditParams>) -> Result<Json<AddressInput>> {
    Ok(Json(s.addresses.edit_form(&ctx, p.address_id.as_deref(), p.organization_id.as_deref()).await?))
}

pub async fn save_address(State(s): State<AppState>, ctx: RequestContext, Query(p): Query<OwnerParams>, Json(r): Json<SaveAddressRequest>) -> Result<(StatusCode, Json<SavedAddress>)> {
    let saved = s.addresses.save_address(&ctx, p.organization_id.as_deref(), r.address, r.flags).await?;
    let status = if saved.created { StatusCode::CREATED } else { StatusCode::OK };
    Ok((status, Json(saved)))
}

pub async fn delete_address(State(s): State<AppState>, ctx: RequestContext, Path(id): Path<String>, Query(p): Query<OwnerParams>) -> Result<StatusCode> {
    s.addresses.delete_address(&ctx, p.organization_id.as_deref(), &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Orders
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct OrderListParams { pub limit: Option<usize> }

pub async fn list_orders(State(s): State<AppState>, ctx: RequestContext, Query(p): Query<OrderListParams>) -> Result<Json<Vec<Order>>> {
    Ok(Json(s.orders.list_orders(&ctx, p.limit).await?))
}

pub async fn recent_orders(State(s): State<AppState>, ctx: RequestContext) -> Result<Json<Vec<Order>>> {
    Ok(Json(s.orders.recent_orders(&ctx).await?))
}

pub async fn view_order(State(s): State<AppState>, ctx: RequestContext, Path(id): Path<String>) -> Result<Json<OrderView>> {
    Ok(Json(s.orders.view_order(&ctx, &id).await?))
}

#[derive(Debug, Serialize)]
pub struct PrintableOrder {
    #[serde(flatten)]
    pub view: OrderView,
    pub printable: bool,
}

pub async fn print_order(State(s): State<AppState>, ctx: RequestContext, Path(id): Path<String>) -> Result<Json<PrintableOrder>> {
    let view = s.orders.view_order(&ctx, &id).await?;
    Ok(Json(PrintableOrder { view, printable: true }))
}

pub async fn reorder(State(s): State<AppState>, ctx: RequestContext, Path(id): Path<String>) -> Result<Json<ShopperList>> {
    Ok(Json(s.orders.reorder(&ctx, &id).await?))
}

// =============================================================================
// Returns
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct ReturnListParams { pub order_id: Option<String> }

pub async fn return_form(State(s): State<AppState>, ctx: RequestContext, Path(id): Path<String>) -> Result<Json<ReturnForm>> {
    Ok(Json(s.returns.return_form(&ctx, &id).await?))
}

pub async fn submit_return(State(s): State<AppState>, ctx: RequestContext, Path(id): Path<String>, Json(r): Json<ReturnSubmission>) -> Result<(StatusCode, Json<ReturnRequest>)> {
    let request = s.returns.submit_return(&ctx, &id, &r).await?;
    Ok((StatusCode::CREATED, Json(request)))
}

pub async fn list_returns(State(s): State<AppState>, ctx: RequestContext, Query(p): Query<ReturnListParams>) -> Result<Json<Vec<ReturnRequest>>> {
    Ok(Json(s.returns.list_returns(&ctx, p.order_id.as_deref()).await?))
}

// =============================================================================
// Wishlist
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct WishListRequest {
    pub action: WishListAction,
    #[serde(default)]
    pub items: Vec<WishListUpdate>,
}

pub async fn wishlist(State(s): State<AppState>, ctx: RequestContext) -> Result<Json<ShopperList>> {
    Ok(Json(s.wishlist.wishlist(&ctx).await?))
}

pub async fn update_wishlist(State(s): State<AppState>, ctx: RequestContext, Json(r): Json<WishListRequest>) -> Result<Json<ShopperList>> {
    Ok(Json(s.wishlist.update_wishlist(&ctx, r.action, &r.items).await?))
}

// =============================================================================
// Compare list
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct CompareRequest { pub catalog_item_id: String }

pub async fn compare_list(State(s): State<AppState>, ctx: RequestContext) -> Result<Json<ShopperList>> {
    Ok(Json(s.compare.compare_list(&ctx).await?))
}

pub async fn compare_summary(State(s): State<AppState>, ctx: RequestContext) -> Result<Json<CompareSummary>> {
    Ok(Json(s.compare.summary(&ctx).await?))
}

pub async fn add_to_compare(State(s): State<AppState>, ctx: RequestContext, Json(r): Json<CompareRequest>) -> Result<Json<ShopperList>> {
    Ok(Json(s.compare.add_item(&ctx, &r.catalog_item_id).await?))
}

pub async fn remove_from_compare(State(s): State<AppState>, ctx: RequestContext, Path(id): Path<String>) -> Result<Json<ShopperList>> {
    Ok(Json(s.compare.remove_item(&ctx, &id).await?))
}

// =============================================================================
// Organizations
// =============================================================================

pub async fn my_organizations(State(s): State<AppState>, ctx: RequestContext) -> Result<Json<Vec<Organization>>> {
    Ok(Json(s.organizations.my_organizations(&ctx).await?))
}

pub async fn edit_organization(State(s): State<AppState>, ctx: RequestContext, Path(id): Path<String>) -> Result<Json<OrganizationInput>> {
    Ok(Json(s.organizations.edit_form(&ctx, &id).await?))
}

pub async fn update_organization(State(s): State<AppState>, ctx: RequestContext, Path(id): Path<String>, Json(r): Json<OrganizationInput>) -> Result<Json<Organization>> {
    Ok(Json(s.organizations.update_organization(&ctx, &id, r).await?))
}

// =============================================================================
// Profile
// =============================================================================

pub async fn profile(State(s): State<AppState>, ctx: RequestContext) -> Result<Json<AccountProfile>> {
    Ok(Json(s.profile.profile(&ctx).await?))
}

pub async fn edit_profile(State(s): State<AppState>, ctx: RequestContext) -> Result<Json<ProfileUpdate>> {
    Ok(Json(s.profile.edit_form(&ctx).await?))
}

pub async fn update_profile(State(s): State<AppState>, ctx: RequestContext, Json(r): Json<ProfileUpdate>) -> Result<Json<CustomerProfile>> {
    Ok(Json(s.profile.update_profile(&ctx, r).await?))
}

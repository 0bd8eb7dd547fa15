//! Collaborator contracts consumed by the account services.
//!
//! Implementations live in [`crate::infrastructure`]; the services only see
//! these traits.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::aggregates::{AddressBook, CustomerProfile, Order, Organization, ShopperList, ListKind};
use crate::domain::events::AccountEvent;
use crate::domain::value_objects::{Money, PartyRef};

/// Settings key holding the selectable return reasons.
pub const RETURN_REASONS_SETTING: &str = "ReturnReasons";

#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    #[error("storage error: {0}")]
    Storage(String),

    #[error("workflow {workflow} failed: {message}")]
    Workflow { workflow: &'static str, message: String },

    #[error("messaging error: {0}")]
    Messaging(String),

    /// Optimistic concurrency check failed; the caller should reload.
    #[error("{entity} {id} was changed concurrently")]
    Conflict { entity: &'static str, id: String },
}

impl From<sqlx::Error> for ClientError {
    fn from(e: sqlx::Error) -> Self { ClientError::Storage(e.to_string()) }
}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self { ClientError::Storage(e.to_string()) }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: String,
    pub name: String,
    pub image_url: Option<String>,
    #[serde(default)]
    pub price: Option<Money>,
}

#[async_trait]
pub trait OrderClient: Send + Sync + 'static {
    /// Ownership-scoped lookup: orders of other customers are never returned.
    async fn get_customer_order(&self, customer_id: &str, order_id: &str) -> Result<Option<Order>, ClientError>;
    async fn list_customer_orders(&self, customer_id: &str, store_id: &str, limit: Option<usize>) -> Result<Vec<Order>, ClientError>;
    /// Saves `order` if the stored version still equals `order.version()`,
    /// otherwise fails with [`ClientError::Conflict`]. The stored copy gets the
    /// next version.
    async fn save_order(&self, order: &Order) -> Result<(), ClientError>;
}

#[async_trait]
pub trait ReturnTotalsWorkflow: Send + Sync + 'static {
    /// Fills the monetary fields of the order's return requests.
    async fn calculate(&self, order: &mut Order) -> Result<(), ClientError>;
}

#[async_trait]
pub trait CatalogClient: Send + Sync + 'static {
    async fn get_item(&self, catalog_item_id: &str) -> Result<Option<CatalogItem>, ClientError>;
}

#[async_trait]
pub trait SettingsClient: Send + Sync + 'static {
    async fn get_settings(&self, name: &str) -> Result<Vec<String>, ClientError>;
}

#[async_trait]
pub trait MemberClient: Send + Sync + 'static {
    async fn get_customer(&self, customer_id: &str) -> Result<Option<CustomerProfile>, ClientError>;
    async fn save_customer(&self, customer: &CustomerProfile) -> Result<(), ClientError>;
    async fn get_organization(&self, organization_id: &str) -> Result<Option<Organization>, ClientError>;
    /// Updates name and description; membership is untouched.
    async fn save_organization(&self, organization: &Organization) -> Result<(), ClientError>;
    /// Organizations the customer is a member of.
    async fn organizations_for(&self, customer_id: &str) -> Result<Vec<Organization>, ClientError>;
    /// An unknown party yields an empty book.
    async fn load_address_book(&self, owner: &PartyRef) -> Result<AddressBook, ClientError>;
    async fn save_address_book(&self, book: &AddressBook) -> Result<(), ClientError>;
}

#[async_trait]
pub trait ShopperListStore: Send + Sync + 'static {
    async fn load(&self, customer_id: &str, kind: ListKind) -> Result<Option<ShopperList>, ClientError>;
    async fn save(&self, list: &ShopperList) -> Result<(), ClientError>;
    async fn delete(&self, customer_id: &str, kind: ListKind) -> Result<(), ClientError>;
}

#[async_trait]
pub trait EventPublisher: Send + Sync + 'static {
    async fn publish(&self, event: &AccountEvent) -> Result<(), ClientError>;
}

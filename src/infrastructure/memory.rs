//! In-memory collaborators, used when no database is configured and by tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};

use crate::domain::aggregates::{AddressBook, CustomerProfile, ListKind, Order, Organization, ShopperList};
use crate::domain::events::AccountEvent;
use crate::domain::value_objects::PartyRef;
use crate::ports::{CatalogClient, CatalogItem, ClientError, EventPublisher, MemberClient, OrderClient, SettingsClient, ShopperListStore};

#[derive(Default)]
pub struct InMemoryOrders {
    orders: RwLock<HashMap<String, Order>>,
    saves: AtomicUsize,
}

impl InMemoryOrders {
    pub async fn insert(&self, order: Order) { self.orders.write().await.insert(order.id().to_string(), order); }
    pub async fn get(&self, order_id: &str) -> Option<Order> { self.orders.read().await.get(order_id).cloned() }
    pub async fn save_count(&self) -> usize { self.saves.load(Ordering::SeqCst) }
}

#[async_trait]
impl OrderClient for InMemoryOrders {
    async fn get_customer_order(&self, customer_id: &str, order_id: &str) -> Result<Option<Order>, ClientError> {
        Ok(self.orders.read().await.get(order_id).filter(|o| o.customer_id() == customer_id).cloned())
    }

    async fn list_customer_orders(&self, customer_id: &str, store_id: &str, limit: Option<usize>) -> Result<Vec<Order>, ClientError> {
        let mut orders: Vec<Order> = self.orders.read().await.values()
            .filter(|o| o.customer_id() == customer_id && o.store_id() == store_id)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        if let Some(limit) = limit { orders.truncate(limit); }
        Ok(orders)
    }

    async fn save_order(&self, order: &Order) -> Result<(), ClientError> {
        let mut orders = self.orders.write().await;
        if orders.get(order.id()).is_some_and(|stored| stored.version() != order.version()) {
            return Err(ClientError::Conflict { entity: "order", id: order.id().to_string() });
        }
        orders.insert(order.id().to_string(), order.clone().with_version(order.version() + 1));
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryCatalog { items: RwLock<HashMap<String, CatalogItem>> }

impl InMemoryCatalog {
    pub async fn insert(&self, item: CatalogItem) { self.items.write().await.insert(item.id.clone(), item); }
}

#[async_trait]
impl CatalogClient for InMemoryCatalog {
    async fn get_item(&self, catalog_item_id: &str) -> Result<Option<CatalogItem>, ClientError> {
        Ok(self.items.read().await.get(catalog_item_id).cloned())
    }
}

#[derive(Default)]
pub struct StaticSettings { values: RwLock<HashMap<String, Vec<String>>> }

impl StaticSettings {
    pub async fn set(&self, name: &str, values: Vec<String>) { self.values.write().await.insert(name.to_string(), values); }
}

#[async_trait]
impl SettingsClient for StaticSettings {
    async fn get_settings(&self, name: &str) -> Result<Vec<String>, ClientError> {
        Ok(self.values.read().await.get(name).cloned().unwrap_or_default())
    }
}

#[derive(Default)]
pub struct InMemoryMembers {
    customers: RwLock<HashMap<String, CustomerProfile>>,
    organizations: RwLock<HashMap<String, (Organization, Vec<String>)>>,
    books: RwLock<HashMap<PartyRef, AddressBook>>,
}

impl InMemoryMembers {
    pub async fn insert_customer(&self, customer: CustomerProfile) { self.customers.write().await.insert(customer.id.clone(), customer); }

    pub async fn insert_organization(&self, organization: Organization, member_ids: Vec<String>) {
        self.organizations.write().await.insert(organization.id.clone(), (organization, member_ids));
    }

    pub async fn insert_book(&self, book: AddressBook) { self.books.write().await.insert(book.owner().clone(), book); }
    pub async fn book(&self, owner: &PartyRef) -> Option<AddressBook> { self.books.read().await.get(owner).cloned() }
}

#[async_trait]
impl MemberClient for InMemoryMembers {
    async fn get_customer(&self, customer_id: &str) -> Result<Option<CustomerProfile>, ClientError> {
        Ok(self.customers.read().await.get(customer_id).cloned())
    }

    async fn save_customer(&self, customer: &CustomerProfile) -> Result<(), ClientError> {
        self.customers.write().await.insert(customer.id.clone(), customer.clone());
        Ok(())
    }

    async fn get_organization(&self, organization_id: &str) -> Result<Option<Organization>, ClientError> {
        Ok(self.organizations.read().await.get(organization_id).map(|(o, _)| o.clone()))
    }

    async fn save_organization(&self, organization: &Organization) -> Result<(), ClientError> {
        self.organizations.write().await
            .entry(organization.id.clone())
            .and_modify(|(stored, _)| *stored = organization.clone())
            .or_insert_with(|| (organization.clone(), vec![]));
        Ok(())
    }

    async fn organizations_for(&self, customer_id: &str) -> Result<Vec<Organization>, ClientError> {
        Ok(self.organizations.read().await.values()
            .filter(|(_, members)| members.iter().any(|m| m == customer_id))
            .map(|(o, _)| o.clone())
            .collect())
    }

    async fn load_address_book(&self, owner: &PartyRef) -> Result<AddressBook, ClientError> {
        Ok(self.books.read().await.get(owner).cloned().unwrap_or_else(|| AddressBook::new(owner.clone())))
    }

    async fn save_address_book(&self, book: &AddressBook) -> Result<(), ClientError> {
        self.books.write().await.insert(book.owner().clone(), book.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryShopperLists { lists: RwLock<HashMap<(String, ListKind), ShopperList>> }

#[async_trait]
impl ShopperListStore for InMemoryShopperLists {
    async fn load(&self, customer_id: &str, kind: ListKind) -> Result<Option<ShopperList>, ClientError> {
        Ok(self.lists.read().await.get(&(customer_id.to_string(), kind)).cloned())
    }

    async fn save(&self, list: &ShopperList) -> Result<(), ClientError> {
        self.lists.write().await.insert((list.customer_id().to_string(), list.kind()), list.clone());
        Ok(())
    }

    async fn delete(&self, customer_id: &str, kind: ListKind) -> Result<(), ClientError> {
        self.lists.write().await.remove(&(customer_id.to_string(), kind));
        Ok(())
    }
}

/// Writes events to the log instead of a broker.
#[derive(Default)]
pub struct LogPublisher;

#[async_trait]
impl EventPublisher for LogPublisher {
    async fn publish(&self, event: &AccountEvent) -> Result<(), ClientError> {
        tracing::debug!(kind = event.kind(), ?event, "account event");
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingPublisher { events: Mutex<Vec<AccountEvent>> }

impl RecordingPublisher {
    pub async fn events(&self) -> Vec<AccountEvent> { self.events.lock().await.clone() }
}

#[async_trait]
impl EventPublisher for RecordingPublisher {
    async fn publish(&self, event: &AccountEvent) -> Result<(), ClientError> {
        self.events.lock().await.push(event.clone());
        Ok(())
    }
}

#[cfg(test)]
pub struct FailingWorkflow;

#[cfg(test)]
#[async_trait]
impl crate::ports::ReturnTotalsWorkflow for FailingWorkflow {
    async fn calculate(&self, _order: &mut Order) -> Result<(), ClientError> {
        Err(ClientError::Workflow { workflow: "CalculateReturnTotalsWorkflow", message: "totals service unavailable".into() })
    }
}

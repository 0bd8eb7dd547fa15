//! Collaborator implementations.
pub mod memory;
pub mod nats;
pub mod postgres;
pub mod totals;

use std::sync::Arc;

use crate::ports::{CatalogClient, EventPublisher, MemberClient, OrderClient, ReturnTotalsWorkflow, SettingsClient, ShopperListStore};

/// Everything the services talk to.
#[derive(Clone)]
pub struct Collaborators {
    pub orders: Arc<dyn OrderClient>,
    pub totals: Arc<dyn ReturnTotalsWorkflow>,
    pub catalog: Arc<dyn CatalogClient>,
    pub settings: Arc<dyn SettingsClient>,
    pub members: Arc<dyn MemberClient>,
    pub lists: Arc<dyn ShopperListStore>,
    pub events: Arc<dyn EventPublisher>,
}

impl Collaborators {
    /// Postgres for every store, with the given publisher.
    pub fn postgres(store: postgres::PgAccountStore, events: Arc<dyn EventPublisher>) -> Self {
        let store = Arc::new(store);
        Self {
            orders: store.clone(),
            totals: Arc::new(totals::LineItemPriceTotals),
            catalog: store.clone(),
            settings: store.clone(),
            members: store.clone(),
            lists: store,
            events,
        }
    }

    /// Empty in-memory stores, with the given publisher.
    pub fn in_memory(events: Arc<dyn EventPublisher>) -> Self {
        Self {
            orders: Arc::new(memory::InMemoryOrders::default()),
            totals: Arc::new(totals::LineItemPriceTotals),
            catalog: Arc::new(memory::InMemoryCatalog::default()),
            settings: Arc::new(memory::StaticSettings::default()),
            members: Arc::new(memory::InMemoryMembers::default()),
            lists: Arc::new(memory::InMemoryShopperLists::default()),
            events,
        }
    }
}

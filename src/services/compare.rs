//! Product compare list.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::aggregates::{ListItem, ListKind, ShopperList};
use crate::domain::value_objects::{Money, RequestContext};
use crate::ports::{CatalogClient, ShopperListStore};
use crate::services::wishlist::DEFAULT_CURRENCY;
use crate::{AccountError, Result};

/// Header widget contents: how many products are being compared.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CompareSummary {
    pub item_count: usize,
    pub catalog_item_ids: Vec<String>,
}

#[derive(Clone)]
pub struct CompareListService {
    lists: Arc<dyn ShopperListStore>,
    catalog: Arc<dyn CatalogClient>,
}

impl CompareListService {
    pub fn new(lists: Arc<dyn ShopperListStore>, catalog: Arc<dyn CatalogClient>) -> Self {
        Self { lists, catalog }
    }

    pub async fn compare_list(&self, ctx: &RequestContext) -> Result<ShopperList> {
        Ok(self.lists.load(&ctx.customer_id, ListKind::CompareList).await?
            .unwrap_or_else(|| ShopperList::new(ListKind::CompareList, ctx.customer_id.clone(), DEFAULT_CURRENCY)))
    }

    pub async fn summary(&self, ctx: &RequestContext) -> Result<CompareSummary> {
        let list = self.compare_list(ctx).await?;
        Ok(CompareSummary {
            item_count: list.item_count(),
            catalog_item_ids: list.items().iter().map(|i| i.catalog_item_id.clone()).collect(),
        })
    }

    /// Adds a catalog item once; adding it again changes nothing.
    pub async fn add_item(&self, ctx: &RequestContext, catalog_item_id: &str) -> Result<ShopperList> {
        let item = self.catalog.get_item(catalog_item_id).await?
            .ok_or_else(|| AccountError::NotFound(format!("Catalog item {catalog_item_id} not found")))?;

        let mut list = self.compare_list(ctx).await?;
        if !list.contains_catalog_item(&item.id) {
            let price = item.price.unwrap_or_else(|| Money::zero(list.currency()));
            list.add_item(ListItem::new(item.id, item.name, 1, price));
            self.lists.save(&list).await?;
        }
        Ok(list)
    }

    pub async fn remove_item(&self, ctx: &RequestContext, line_item_id: &str) -> Result<ShopperList> {
        let mut list = self.compare_list(ctx).await?;
        list.remove_item(line_item_id)
            .map_err(|_| AccountError::NotFound(format!("Compare list item {line_item_id} not found")))?;
        if list.is_empty() {
            self.lists.delete(&ctx.customer_id, ListKind::CompareList).await?;
        } else {
            self.lists.save(&list).await?;
        }
        Ok(list)
    }
}

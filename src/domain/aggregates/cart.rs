//! Shopper List Aggregate (cart, wishlist and compare list)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::aggregates::order::Order;
use crate::domain::value_objects::Money;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListKind { Cart, WishList, CompareList }

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ShopperList {
    id: String,
    kind: ListKind,
    customer_id: String,
    items: Vec<ListItem>,
    subtotal: Money,
    currency: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ListItem {
    pub line_item_id: String,
    pub catalog_item_id: String,
    pub name: String,
    pub quantity: u32,
    pub unit_price: Money,
    pub comment: Option<String>,
}

impl ListItem {
    pub fn new(catalog_item_id: impl Into<String>, name: impl Into<String>, quantity: u32, unit_price: Money) -> Self {
        Self { line_item_id: Uuid::now_v7().to_string(), catalog_item_id: catalog_item_id.into(), name: name.into(), quantity, unit_price, comment: None }
    }
    pub fn line_total(&self) -> Money { self.unit_price.multiply(self.quantity) }
}

impl ShopperList {
    pub fn new(kind: ListKind, customer_id: impl Into<String>, currency: &str) -> Self {
        Self {
            id: Uuid::now_v7().to_string(), kind, customer_id: customer_id.into(),
            items: vec![], subtotal: Money::zero(currency), currency: currency.to_string(),
            created_at: Utc::now(), updated_at: Utc::now(),
        }
    }

    pub fn id(&self) -> &str { &self.id }
    pub fn kind(&self) -> ListKind { self.kind }
    pub fn customer_id(&self) -> &str { &self.customer_id }
    pub fn items(&self) -> &[ListItem] { &self.items }
    pub fn subtotal(&self) -> &Money { &self.subtotal }
    pub fn currency(&self) -> &str { &self.currency }
    pub fn item_count(&self) -> usize { self.items.len() }
    pub fn is_empty(&self) -> bool { self.items.is_empty() }
    pub fn contains_catalog_item(&self, catalog_item_id: &str) -> bool { self.items.iter().any(|i| i.catalog_item_id == catalog_item_id) }
    pub fn find(&self, line_item_id: &str) -> Option<&ListItem> { self.items.iter().find(|i| i.line_item_id == line_item_id) }

    /// Quantities merge when the catalog item is already listed.
    pub fn add_item(&mut self, item: ListItem) {
        if let Some(existing) = self.items.iter_mut().find(|i| i.catalog_item_id == item.catalog_item_id) {
            existing.quantity += item.quantity;
        } else {
            self.items.push(item);
        }
        self.recalculate();
    }

    /// Copies every line of `order` into this list.
    pub fn add_order(&mut self, order: &Order) {
        for li in order.line_items() {
            self.add_item(ListItem::new(li.catalog_item_id.clone(), li.name.clone(), li.quantity, li.list_price.clone()));
        }
    }

    pub fn update_item(&mut self, line_item_id: &str, quantity: u32, comment: Option<String>) -> Result<(), CartError> {
        let item = self.items.iter_mut().find(|i| i.line_item_id == line_item_id).ok_or(CartError::ItemNotFound)?;
        if quantity == 0 {
            self.items.retain(|i| i.line_item_id != line_item_id);
        } else {
            item.quantity = quantity;
            item.comment = comment;
        }
        self.recalculate();
        Ok(())
    }

    pub fn remove_item(&mut self, line_item_id: &str) -> Result<ListItem, CartError> {
        let pos = self.items.iter().position(|i| i.line_item_id == line_item_id).ok_or(CartError::ItemNotFound)?;
        let item = self.items.remove(pos);
        self.recalculate();
        Ok(item)
    }

    fn recalculate(&mut self) {
        self.subtotal = self.items.iter().fold(Money::zero(&self.currency), |acc, i| acc.add(&i.line_total()).unwrap_or(acc));
        self.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CartError {
    #[error("Item not found")]
    ItemNotFound,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::order::{LineItem, OrderForm, OrderStatus};
    use rust_decimal::Decimal;

    #[test]
    fn test_cart_operations() {
        let mut cart = ShopperList::new(ListKind::Cart, "C1", "USD");
        cart.add_item(ListItem::new("P1", "Widget", 2, Money::usd(Decimal::new(10, 0))));
        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.subtotal().amount(), Decimal::new(20, 0));
        cart.add_item(ListItem::new("P1", "Widget", 1, Money::usd(Decimal::new(10, 0))));
        assert_eq!(cart.items()[0].quantity, 3); // Merged
    }

    #[test]
    fn test_update_and_remove() {
        let mut list = ShopperList::new(ListKind::WishList, "C1", "USD");
        list.add_item(ListItem::new("P1", "Widget", 1, Money::usd(Decimal::new(10, 0))));
        let id = list.items()[0].line_item_id.clone();

        list.update_item(&id, 4, Some("for the office".into())).unwrap();
        assert_eq!(list.find(&id).unwrap().quantity, 4);
        assert_eq!(list.subtotal().amount(), Decimal::new(40, 0));

        assert_eq!(list.update_item("missing", 1, None), Err(CartError::ItemNotFound));
        list.update_item(&id, 0, None).unwrap();
        assert!(list.is_empty());
    }

    #[test]
    fn test_reorder_copies_lines() {
        let order = Order::new("O1", "C1", "S1", OrderStatus::Completed, "USD").with_form(OrderForm {
            id: "F1".into(),
            line_items: vec![LineItem { id: "L1".into(), catalog_item_id: "P1".into(), parent_catalog_item_id: None, name: "Widget".into(), quantity: 2, list_price: Money::usd(Decimal::new(10, 0)) }],
        });
        let mut cart = ShopperList::new(ListKind::Cart, "C1", "USD");
        cart.add_item(ListItem::new("P1", "Widget", 1, Money::usd(Decimal::new(10, 0))));
        cart.add_order(&order);
        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.items()[0].quantity, 3);
        assert_eq!(cart.subtotal().amount(), Decimal::new(30, 0));
    }
}

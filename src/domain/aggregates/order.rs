//! Order Aggregate
//!
//! Orders are owned by the order subsystem; the account area only reads them
//! and appends return requests.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::aggregates::return_request::{ReturnRequest, ReturnRequestStatus, ReturnItemState};
use crate::domain::value_objects::Money;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Order {
    id: String,
    customer_id: String,
    store_id: String,
    status: OrderStatus,
    billing_currency: String,
    order_forms: Vec<OrderForm>,
    #[serde(default)]
    addresses: Vec<OrderAddress>,
    #[serde(default)]
    return_requests: Vec<ReturnRequest>,
    created_at: DateTime<Utc>,
    /// Stored revision. Stores only accept a save whose version matches theirs.
    #[serde(default)]
    version: i64,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct OrderForm { pub id: String, pub line_items: Vec<LineItem> }

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LineItem {
    pub id: String,
    pub catalog_item_id: String,
    pub parent_catalog_item_id: Option<String>,
    pub name: String,
    pub quantity: u32,
    pub list_price: Money,
}

pub const BILLING_ADDRESS: &str = "Billing";
pub const SHIPPING_ADDRESS: &str = "Shipping";

/// Address captured on the order, identified by its name (billing, shipping).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderAddress {
    pub name: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub region: Option<String>,
    pub postal_code: String,
    pub country_code: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus { #[default] Pending, Processing, OnHold, AwaitingExchange, Completed, Cancelled }

impl Order {
    pub fn new(id: impl Into<String>, customer_id: impl Into<String>, store_id: impl Into<String>, status: OrderStatus, currency: &str) -> Self {
        Self {
            id: id.into(), customer_id: customer_id.into(), store_id: store_id.into(), status,
            billing_currency: currency.to_string(), order_forms: vec![], addresses: vec![], return_requests: vec![], created_at: Utc::now(), version: 0,
        }
    }

    pub fn with_form(mut self, form: OrderForm) -> Self { self.order_forms.push(form); self }
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self { self.created_at = created_at; self }
    pub fn with_address(mut self, address: OrderAddress) -> Self { self.addresses.push(address); self }
    pub fn with_version(mut self, version: i64) -> Self { self.version = version; self }

    pub fn id(&self) -> &str { &self.id }
    pub fn customer_id(&self) -> &str { &self.customer_id }
    pub fn store_id(&self) -> &str { &self.store_id }
    pub fn status(&self) -> OrderStatus { self.status }
    pub fn billing_currency(&self) -> &str { &self.billing_currency }
    pub fn created_at(&self) -> DateTime<Utc> { self.created_at }
    pub fn version(&self) -> i64 { self.version }
    pub fn order_forms(&self) -> &[OrderForm] { &self.order_forms }
    pub fn addresses(&self) -> &[OrderAddress] { &self.addresses }
    pub fn return_requests(&self) -> &[ReturnRequest] { &self.return_requests }

    /// Mutable access for the totals workflow; the collection itself only grows
    /// through [`Order::attach_return_request`].
    pub fn return_requests_mut(&mut self) -> &mut [ReturnRequest] { &mut self.return_requests }

    /// An order with no customer id is treated as not owned by anyone.
    pub fn is_owned_by(&self, customer_id: &str) -> bool {
        !self.customer_id.is_empty() && self.customer_id == customer_id
    }

    pub fn line_items(&self) -> impl Iterator<Item = &LineItem> {
        self.order_forms.iter().flat_map(|f| f.line_items.iter())
    }

    /// Case-insensitive lookup by address name. Orders without forms carry no
    /// usable addresses.
    pub fn find_address(&self, name: &str) -> Option<&OrderAddress> {
        if self.order_forms.is_empty() {
            return None;
        }
        self.addresses.iter().find(|a| a.name.trim().eq_ignore_ascii_case(name.trim()))
    }

    pub fn find_line_item(&self, line_item_id: &str) -> Option<&LineItem> {
        self.line_items().find(|li| li.id == line_item_id)
    }

    /// Line items already covered by a live return request.
    ///
    /// Rejected requests and rejected return items release their line items.
    pub fn returned_line_item_ids(&self) -> HashSet<&str> {
        self.return_requests.iter()
            .filter(|r| r.status != ReturnRequestStatus::Rejected)
            .flat_map(|r| r.items.iter())
            .filter(|i| i.state != ReturnItemState::Rejected)
            .flat_map(|i| i.line_items.iter())
            .map(|rli| rli.line_item_id.as_str())
            .collect()
    }

    pub fn returnable_line_items(&self) -> Vec<&LineItem> {
        let excluded = self.returned_line_item_ids();
        self.line_items().filter(|li| !excluded.contains(li.id.as_str())).collect()
    }

    pub fn attach_return_request(&mut self, request: ReturnRequest) { self.return_requests.push(request); }
}

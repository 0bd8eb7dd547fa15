//! Return (RMA) Request Aggregate

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::domain::aggregates::order::{LineItem, Order, OrderStatus};
use crate::domain::value_objects::Money;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReturnRequest {
    pub id: String,
    pub order_id: String,
    pub comment: String,
    pub status: ReturnRequestStatus,
    /// Equal to `id`; carries no entropy of its own.
    pub authorization_code: String,
    pub return_from_address_id: String,
    pub items: Vec<ReturnItem>,
    pub item_subtotal: Option<Money>,
    pub refund_total: Option<Money>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReturnItem {
    pub state: ReturnItemState,
    pub reason: String,
    pub line_items: Vec<ReturnLineItem>,
    pub return_amount: Option<Money>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnLineItem { pub line_item_id: String, pub return_quantity: u32 }

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReturnRequestStatus { #[default] AwaitingStockReturn, Approved, Rejected, Completed }

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReturnItemState { #[default] AwaitingReturn, Received, Refunded, Rejected }

impl ReturnRequest {
    pub fn new(order_id: impl Into<String>, comment: impl Into<String>, return_from_address_id: impl Into<String>) -> Self {
        let id = Uuid::now_v7().to_string();
        Self {
            authorization_code: id.clone(), id, order_id: order_id.into(), comment: comment.into(),
            status: ReturnRequestStatus::AwaitingStockReturn, return_from_address_id: return_from_address_id.into(),
            items: vec![], item_subtotal: None, refund_total: None, created_at: Utc::now(),
        }
    }

    pub fn line_item_ids(&self) -> impl Iterator<Item = &str> {
        self.items.iter().flat_map(|i| i.line_items.iter()).map(|l| l.line_item_id.as_str())
    }
}

/// Customer input for a return: the comment, where the goods come back from,
/// and one row per offered line item.
#[derive(Clone, Debug, Default, Serialize, Deserialize, Validate)]
pub struct ReturnSubmission {
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub comment: String,
    #[validate(length(min = 1))]
    pub return_from_address_id: String,
    #[serde(default)]
    pub items: Vec<ReturnSelection>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReturnSelection {
    pub line_item_id: String,
    pub quantity: u32,
    #[serde(default)]
    pub reason: String,
    /// Unselected rows are ignored entirely, including their validation.
    #[serde(default = "selected_by_default")]
    pub selected: bool,
}

fn selected_by_default() -> bool { true }

impl ReturnSelection {
    pub fn new(line_item_id: impl Into<String>, quantity: u32, reason: impl Into<String>) -> Self {
        Self { line_item_id: line_item_id.into(), quantity, reason: reason.into(), selected: true }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReturnError {
    #[error("Cannot return items, because order is not completed (status: {0:?})")]
    OrderNotCompleted(OrderStatus),

    #[error("Select at least one item to return")]
    NothingSelected,

    #[error("Line item {0} does not belong to this order")]
    UnknownLineItem(String),

    #[error("Line item {0} is already covered by a return request")]
    AlreadyReturned(String),

    #[error("Line item {0} was selected more than once")]
    DuplicateSelection(String),

    #[error("Invalid return quantity {requested} for line item {line_item_id} (ordered {available})")]
    InvalidQuantity { line_item_id: String, requested: u32, available: u32 },

    #[error("A return reason is required for line item {0}")]
    MissingReason(String),
}

/// Builds return requests against one order.
///
/// The same exclusion set gates both the candidates offered to the customer and
/// the submission path.
pub struct ReturnRequestBuilder<'a> {
    order: &'a Order,
}

impl<'a> ReturnRequestBuilder<'a> {
    pub fn new(order: &'a Order) -> Self { Self { order } }

    pub fn ensure_returnable(&self) -> Result<(), ReturnError> {
        match self.order.status() {
            OrderStatus::Completed => Ok(()),
            other => Err(ReturnError::OrderNotCompleted(other)),
        }
    }

    pub fn candidates(&self) -> Vec<&'a LineItem> { self.order.returnable_line_items() }

    /// Validates the whole submission before constructing anything; the order is
    /// never touched here.
    pub fn build(&self, submission: &ReturnSubmission) -> Result<ReturnRequest, ReturnError> {
        self.ensure_returnable()?;

        let selected: Vec<&ReturnSelection> = submission.items.iter().filter(|s| s.selected).collect();
        if selected.is_empty() {
            return Err(ReturnError::NothingSelected);
        }

        let excluded = self.order.returned_line_item_ids();
        let mut seen = HashSet::new();
        for selection in &selected {
            let id = selection.line_item_id.as_str();
            let line_item = self.order.find_line_item(id)
                .ok_or_else(|| ReturnError::UnknownLineItem(id.to_string()))?;
            if excluded.contains(id) {
                return Err(ReturnError::AlreadyReturned(id.to_string()));
            }
            if !seen.insert(id) {
                return Err(ReturnError::DuplicateSelection(id.to_string()));
            }
            if selection.quantity == 0 || selection.quantity > line_item.quantity {
                return Err(ReturnError::InvalidQuantity {
                    line_item_id: id.to_string(), requested: selection.quantity, available: line_item.quantity,
                });
            }
            if selection.reason.trim().is_empty() {
                return Err(ReturnError::MissingReason(id.to_string()));
            }
        }

        let mut request = ReturnRequest::new(self.order.id(), submission.comment.clone(), submission.return_from_address_id.clone());
        request.items = selected.into_iter().map(|s| ReturnItem {
            state: ReturnItemState::AwaitingReturn,
            reason: s.reason.clone(),
            line_items: vec![ReturnLineItem { line_item_id: s.line_item_id.clone(), return_quantity: s.quantity }],
            return_amount: None,
        }).collect();
        Ok(request)
    }
}

//! Order history, order view and reorder.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::aggregates::{ListKind, Order, OrderAddress, ShopperList, BILLING_ADDRESS, SHIPPING_ADDRESS};
use crate::domain::value_objects::RequestContext;
use crate::ports::{OrderClient, ShopperListStore};
use crate::services::load_owned_order;
use crate::Result;

pub const RECENT_ORDERS_LIMIT: usize = 5;

/// An order with its billing and shipping addresses resolved.
#[derive(Clone, Debug, Serialize)]
pub struct OrderView {
    pub order: Order,
    pub billing_address: Option<OrderAddress>,
    pub shipping_address: Option<OrderAddress>,
}

impl From<Order> for OrderView {
    fn from(order: Order) -> Self {
        Self {
            billing_address: order.find_address(BILLING_ADDRESS).cloned(),
            shipping_address: order.find_address(SHIPPING_ADDRESS).cloned(),
            order,
        }
    }
}

#[derive(Clone)]
pub struct OrderHistoryService {
    orders: Arc<dyn OrderClient>,
    lists: Arc<dyn ShopperListStore>,
}

impl OrderHistoryService {
    pub fn new(orders: Arc<dyn OrderClient>, lists: Arc<dyn ShopperListStore>) -> Self {
        Self { orders, lists }
    }

    pub async fn list_orders(&self, ctx: &RequestContext, limit: Option<usize>) -> Result<Vec<Order>> {
        Ok(self.orders.list_customer_orders(&ctx.customer_id, &ctx.store_id, limit).await?)
    }

    pub async fn recent_orders(&self, ctx: &RequestContext) -> Result<Vec<Order>> {
        self.list_orders(ctx, Some(RECENT_ORDERS_LIMIT)).await
    }

    /// Used for both the order page and its printable version.
    pub async fn view_order(&self, ctx: &RequestContext, order_id: &str) -> Result<OrderView> {
        Ok(load_owned_order(self.orders.as_ref(), ctx, order_id).await?.into())
    }

    /// Copies the order's lines into the customer's cart and returns the cart.
    pub async fn reorder(&self, ctx: &RequestContext, order_id: &str) -> Result<ShopperList> {
        let order = load_owned_order(self.orders.as_ref(), ctx, order_id).await?;
        let mut cart = self.lists.load(&ctx.customer_id, ListKind::Cart).await?
            .unwrap_or_else(|| ShopperList::new(ListKind::Cart, ctx.customer_id.clone(), order.billing_currency()));
        cart.add_order(&order);
        self.lists.save(&cart).await?;
        tracing::info!(order_id, cart_id = cart.id(), items = cart.item_count(), "order copied to cart");
        Ok(cart)
    }
}

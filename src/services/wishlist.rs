//! Wishlist: view, edit, and move items into the cart.

use std::sync::Arc;

use serde::Deserialize;

use crate::domain::aggregates::{ListItem, ListKind, ShopperList};
use crate::domain::events::AccountEvent;
use crate::domain::value_objects::RequestContext;
use crate::ports::{EventPublisher, ShopperListStore};
use crate::services::publish;
use crate::Result;

pub const DEFAULT_CURRENCY: &str = "USD";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WishListAction { AddToCart, Update }

#[derive(Clone, Debug, Deserialize)]
pub struct WishListUpdate {
    pub line_item_id: String,
    pub quantity: u32,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Clone)]
pub struct WishListService {
    lists: Arc<dyn ShopperListStore>,
    events: Arc<dyn EventPublisher>,
}

impl WishListService {
    pub fn new(lists: Arc<dyn ShopperListStore>, events: Arc<dyn EventPublisher>) -> Self {
        Self { lists, events }
    }

    pub async fn wishlist(&self, ctx: &RequestContext) -> Result<ShopperList> {
        Ok(self.lists.load(&ctx.customer_id, ListKind::WishList).await?
            .unwrap_or_else(|| ShopperList::new(ListKind::WishList, ctx.customer_id.clone(), DEFAULT_CURRENCY)))
    }

    /// Applies `updates` to the wishlist. Lines that are no longer on the list
    /// are skipped. Returns the wishlist afterwards.
    pub async fn update_wishlist(&self, ctx: &RequestContext, action: WishListAction, updates: &[WishListUpdate]) -> Result<ShopperList> {
        let mut wishlist = self.wishlist(ctx).await?;
        match action {
            WishListAction::AddToCart => self.move_to_cart(ctx, &mut wishlist, updates).await?,
            WishListAction::Update => {
                for update in updates {
                    if wishlist.update_item(&update.line_item_id, update.quantity, update.comment.clone()).is_err() {
                        tracing::debug!(line_item_id = %update.line_item_id, "wishlist line not found, skipped");
                    }
                }
                self.lists.save(&wishlist).await?;
            }
        }
        Ok(wishlist)
    }

    async fn move_to_cart(&self, ctx: &RequestContext, wishlist: &mut ShopperList, updates: &[WishListUpdate]) -> Result<()> {
        let mut cart = self.lists.load(&ctx.customer_id, ListKind::Cart).await?
            .unwrap_or_else(|| ShopperList::new(ListKind::Cart, ctx.customer_id.clone(), wishlist.currency()));

        let mut moved = Vec::new();
        // A zero quantity leaves the line on the wishlist.
        for update in updates.iter().filter(|u| u.quantity > 0) {
            let Ok(item) = wishlist.remove_item(&update.line_item_id) else { continue };
            cart.add_item(ListItem::new(item.catalog_item_id, item.name, update.quantity, item.unit_price));
            moved.push(update.line_item_id.clone());
        }

        self.lists.save(&cart).await?;
        if wishlist.is_empty() {
            self.lists.delete(&ctx.customer_id, ListKind::WishList).await?;
        } else {
            self.lists.save(wishlist).await?;
        }

        if !moved.is_empty() {
            tracing::info!(customer_id = %ctx.customer_id, moved = moved.len(), "wishlist items moved to cart");
            publish(&self.events, AccountEvent::WishListMovedToCart { customer_id: ctx.customer_id.clone(), line_item_ids: moved }).await;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::Money;
    use crate::services::fixtures::{ctx, fixture, Fixture};
    use rust_decimal::Decimal;

    fn service(f: &Fixture) -> WishListService { WishListService::new(f.lists.clone(), f.events.clone()) }

    async fn seeded(f: &Fixture) -> (String, String) {
        let mut wl = ShopperList::new(ListKind::WishList, "C1", "USD");
        wl.add_item(ListItem::new("CAT1", "Teapot", 1, Money::usd(Decimal::new(20, 0))));
        wl.add_item(ListItem::new("CAT2", "Cosy", 1, Money::usd(Decimal::new(8, 0))));
        let ids = (wl.items()[0].line_item_id.clone(), wl.items()[1].line_item_id.clone());
        f.lists.save(&wl).await.unwrap();
        ids
    }

    #[tokio::test]
    async fn test_update_quantity_and_comment() {
        let f = fixture().await;
        let (teapot, _) = seeded(&f).await;
        let updates = vec![
            WishListUpdate { line_item_id: teapot.clone(), quantity: 3, comment: Some("gift".into()) },
            WishListUpdate { line_item_id: "missing".into(), quantity: 1, comment: None },
        ];
        let wl = service(&f).update_wishlist(&ctx(), WishListAction::Update, &updates).await.unwrap();
        let item = wl.find(&teapot).unwrap();
        assert_eq!(item.quantity, 3);
        assert_eq!(item.comment.as_deref(), Some("gift"));
    }

    #[tokio::test]
    async fn test_move_to_cart() {
        let f = fixture().await;
        let (teapot, cosy) = seeded(&f).await;
        let svc = service(&f);

        let wl = svc.update_wishlist(&ctx(), WishListAction::AddToCart, &[WishListUpdate { line_item_id: teapot.clone(), quantity: 2, comment: None }]).await.unwrap();
        assert!(wl.find(&teapot).is_none());
        let cart = f.lists.load("C1", ListKind::Cart).await.unwrap().unwrap();
        assert_eq!(cart.items()[0].catalog_item_id, "CAT1");
        assert_eq!(cart.items()[0].quantity, 2);

        svc.update_wishlist(&ctx(), WishListAction::AddToCart, &[WishListUpdate { line_item_id: cosy, quantity: 1, comment: None }]).await.unwrap();
        assert!(f.lists.load("C1", ListKind::WishList).await.unwrap().is_none());
        assert_eq!(f.lists.load("C1", ListKind::Cart).await.unwrap().unwrap().item_count(), 2);
        assert_eq!(f.events.events().await.len(), 2);
    }

    #[tokio::test]
    async fn test_zero_quantity_stays_on_wishlist() {
        let f = fixture().await;
        let (teapot, _) = seeded(&f).await;

        let wl = service(&f).update_wishlist(&ctx(), WishListAction::AddToCart, &[WishListUpdate { line_item_id: teapot.clone(), quantity: 0, comment: None }]).await.unwrap();
        assert_eq!(wl.find(&teapot).unwrap().quantity, 1);
        assert_eq!(f.lists.load("C1", ListKind::WishList).await.unwrap().unwrap().item_count(), 2);
        assert!(f.lists.load("C1", ListKind::Cart).await.unwrap().unwrap().is_empty());
        assert!(f.events.events().await.is_empty());
    }
}

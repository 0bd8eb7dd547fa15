//! Return (RMA) requests: the selection form, submission and history.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::OnceCell;
use validator::Validate;

use crate::domain::aggregates::{ReturnRequest, ReturnRequestBuilder, ReturnSubmission};
use crate::domain::events::AccountEvent;
use crate::domain::value_objects::{Money, RequestContext};
use crate::ports::{CatalogClient, CatalogItem, EventPublisher, MemberClient, OrderClient, ReturnTotalsWorkflow, SettingsClient, RETURN_REASONS_SETTING};
use crate::services::{load_owned_order, publish};
use crate::Result;

#[derive(Clone, Debug, Default, Serialize)]
pub struct ReturnForm {
    pub order_id: String,
    pub candidates: Vec<ReturnCandidate>,
    pub reasons: Vec<String>,
    pub addresses: Vec<AddressChoice>,
    /// Form-level message when the order cannot be returned at all.
    pub error: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ReturnCandidate {
    pub line_item_id: String,
    pub name: String,
    pub quantity: u32,
    pub list_price: Money,
    pub catalog_item: CatalogItem,
    pub parent_item: Option<CatalogItem>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AddressChoice { pub id: String, pub label: String }

#[derive(Clone)]
pub struct ReturnService {
    orders: Arc<dyn OrderClient>,
    totals: Arc<dyn ReturnTotalsWorkflow>,
    catalog: Arc<dyn CatalogClient>,
    settings: Arc<dyn SettingsClient>,
    members: Arc<dyn MemberClient>,
    events: Arc<dyn EventPublisher>,
    reasons: Arc<OnceCell<Vec<String>>>,
}

impl ReturnService {
    pub fn new(
        orders: Arc<dyn OrderClient>,
        totals: Arc<dyn ReturnTotalsWorkflow>,
        catalog: Arc<dyn CatalogClient>,
        settings: Arc<dyn SettingsClient>,
        members: Arc<dyn MemberClient>,
        events: Arc<dyn EventPublisher>,
    ) -> Self {
        Self { orders, totals, catalog, settings, members, events, reasons: Arc::new(OnceCell::new()) }
    }

    /// Reasons are reference data and loaded once per service.
    async fn return_reasons(&self) -> Result<Vec<String>> {
        let reasons = self.reasons
            .get_or_try_init(|| async { self.settings.get_settings(RETURN_REASONS_SETTING).await })
            .await?;
        Ok(reasons.clone())
    }

    /// Line items still open for return, enriched for display. Items whose
    /// catalog entry has disappeared are not offered.
    pub async fn return_form(&self, ctx: &RequestContext, order_id: &str) -> Result<ReturnForm> {
        let order = load_owned_order(self.orders.as_ref(), ctx, order_id).await?;
        let builder = ReturnRequestBuilder::new(&order);

        if let Err(e) = builder.ensure_returnable() {
            return Ok(ReturnForm { order_id: order.id().to_string(), error: Some(e.to_string()), ..Default::default() });
        }

        let mut candidates = Vec::new();
        for li in builder.candidates() {
            let Some(catalog_item) = self.catalog.get_item(&li.catalog_item_id).await? else { continue };
            let parent_item = match &li.parent_catalog_item_id {
                Some(parent_id) => self.catalog.get_item(parent_id).await?,
                None => None,
            };
            candidates.push(ReturnCandidate {
                line_item_id: li.id.clone(), name: li.name.clone(), quantity: li.quantity,
                list_price: li.list_price.clone(), catalog_item, parent_item,
            });
        }

        let book = self.members.load_address_book(&ctx.party()).await?;
        let addresses = book.addresses().iter().map(|a| AddressChoice { id: a.id.clone(), label: a.to_string() }).collect();

        Ok(ReturnForm { order_id: order.id().to_string(), candidates, reasons: self.return_reasons().await?, addresses, error: None })
    }

    /// Validates, appends the request, runs the totals workflow and saves the
    /// order. Nothing is persisted unless every step succeeds.
    pub async fn submit_return(&self, ctx: &RequestContext, order_id: &str, submission: &ReturnSubmission) -> Result<ReturnRequest> {
        let mut order = load_owned_order(self.orders.as_ref(), ctx, order_id).await?;
        submission.validate()?;

        let request = match ReturnRequestBuilder::new(&order).build(submission) {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!(order_id, error = %e, "return request rejected");
                return Err(e.into());
            }
        };
        let request_id = request.id.clone();
        let line_item_ids: Vec<String> = request.line_item_ids().map(str::to_string).collect();
        order.attach_return_request(request);

        self.totals.calculate(&mut order).await?;
        self.orders.save_order(&order).await?;

        let saved = order.return_requests().iter()
            .find(|r| r.id == request_id)
            .cloned()
            .ok_or_else(|| crate::AccountError::NotFound(format!("Return request {request_id} missing after save")))?;

        tracing::info!(order_id, request_id = %saved.id, items = saved.items.len(), "return request created");
        publish(&self.events, AccountEvent::ReturnRequested {
            order_id: order.id().to_string(), request_id, customer_id: ctx.customer_id.clone(), line_item_ids,
        }).await;
        Ok(saved)
    }

    /// Return requests of one owned order, or of all the customer's orders in
    /// this store. Newest first.
    pub async fn list_returns(&self, ctx: &RequestContext, order_id: Option<&str>) -> Result<Vec<ReturnRequest>> {
        let orders = match order_id.filter(|id| !id.trim().is_empty()) {
            Some(id) => vec![load_owned_order(self.orders.as_ref(), ctx, id).await?],
            None => self.orders.list_customer_orders(&ctx.customer_id, &ctx.store_id, None).await?,
        };
        let mut requests: Vec<ReturnRequest> = orders.into_iter().flat_map(|o| o.return_requests().to_vec()).collect();
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(requests)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::{AddressInput, DefaultAddressFlags, Order, OrderStatus, ReturnError, ReturnItemState, ReturnLineItem, ReturnRequestStatus, ReturnSelection, AddressBook};
    use crate::domain::events::AccountEvent;
    use crate::infrastructure::memory::FailingWorkflow;
    use crate::ports::ClientError;
    use crate::services::fixtures::{ctx, fixture, line, order, Fixture};
    use crate::AccountError;
    use rust_decimal::Decimal;

    fn service(f: &Fixture) -> ReturnService {
        ReturnService::new(f.orders.clone(), f.totals.clone(), f.catalog.clone(), f.settings.clone(), f.members.clone(), f.events.clone())
    }

    fn submission(items: Vec<ReturnSelection>) -> ReturnSubmission {
        ReturnSubmission { comment: "Arrived cracked".into(), return_from_address_id: "A1".into(), items }
    }

    #[tokio::test]
    async fn test_submit_creates_request_and_persists() {
        let f = fixture().await;
        f.orders.insert(order("O1", "C1", OrderStatus::Completed, vec![line("L1", "CAT1", 2, 30)])).await;

        let request = service(&f).submit_return(&ctx(), "O1", &submission(vec![ReturnSelection::new("L1", 1, "Damaged")])).await.unwrap();

        assert_eq!(request.status, ReturnRequestStatus::AwaitingStockReturn);
        assert_eq!(request.authorization_code, request.id);
        assert_eq!(request.items.len(), 1);
        assert_eq!(request.items[0].state, ReturnItemState::AwaitingReturn);
        assert_eq!(request.items[0].reason, "Damaged");
        assert_eq!(request.items[0].line_items, vec![ReturnLineItem { line_item_id: "L1".into(), return_quantity: 1 }]);
        assert_eq!(request.refund_total.as_ref().unwrap().amount(), Decimal::new(30, 0));

        let stored = f.orders.get("O1").await.unwrap();
        assert_eq!(stored.return_requests().len(), 1);
        assert_eq!(f.orders.save_count().await, 1);
        assert!(matches!(f.events.events().await.as_slice(), [AccountEvent::ReturnRequested { .. }]));
    }

    #[tokio::test]
    async fn test_processing_order_rejected_without_mutation() {
        let f = fixture().await;
        f.orders.insert(order("O1", "C1", OrderStatus::Processing, vec![line("L1", "CAT1", 1, 10)])).await;

        let err = service(&f).submit_return(&ctx(), "O1", &submission(vec![ReturnSelection::new("L1", 1, "Damaged")])).await.unwrap_err();

        assert!(matches!(err, AccountError::Return(ReturnError::OrderNotCompleted(OrderStatus::Processing))));
        assert!(err.is_validation());
        assert!(f.orders.get("O1").await.unwrap().return_requests().is_empty());
        assert_eq!(f.orders.save_count().await, 0);
        assert!(f.events.events().await.is_empty());
    }

    #[tokio::test]
    async fn test_foreign_order_is_unauthorized() {
        let f = fixture().await;
        f.orders.insert(order("O1", "C2", OrderStatus::Completed, vec![line("L1", "CAT1", 1, 10)])).await;
        f.orders.insert(order("O2", "", OrderStatus::Completed, vec![line("L1", "CAT1", 1, 10)])).await;
        let svc = service(&f);

        // An empty submission would be a validation error; ownership is checked first.
        for id in ["O1", "O2", "missing"] {
            let err = svc.submit_return(&ctx(), id, &submission(vec![])).await.unwrap_err();
            assert!(matches!(err, AccountError::Unauthorized), "{id}: {err}");
        }
        assert!(matches!(svc.return_form(&ctx(), "O1").await, Err(AccountError::Unauthorized)));
        assert_eq!(f.orders.save_count().await, 0);
    }

    #[tokio::test]
    async fn test_second_return_of_same_line_rejected() {
        let f = fixture().await;
        f.orders.insert(order("O1", "C1", OrderStatus::Completed, vec![line("L1", "CAT1", 2, 10), line("L2", "CAT2", 1, 5)])).await;
        let svc = service(&f);
        svc.submit_return(&ctx(), "O1", &submission(vec![ReturnSelection::new("L1", 1, "Damaged")])).await.unwrap();

        let form = svc.return_form(&ctx(), "O1").await.unwrap();
        assert_eq!(form.candidates.iter().map(|c| c.line_item_id.as_str()).collect::<Vec<_>>(), vec!["L2"]);

        let err = svc.submit_return(&ctx(), "O1", &submission(vec![ReturnSelection::new("L1", 1, "Damaged")])).await.unwrap_err();
        assert!(matches!(err, AccountError::Return(ReturnError::AlreadyReturned(ref id)) if id == "L1"));
        assert_eq!(f.orders.get("O1").await.unwrap().return_requests().len(), 1);
    }

    /// Holds every loader until two requests have read the order.
    struct LockstepOrders {
        inner: Arc<crate::infrastructure::memory::InMemoryOrders>,
        loaded: tokio::sync::Barrier,
    }

    #[async_trait::async_trait]
    impl OrderClient for LockstepOrders {
        async fn get_customer_order(&self, customer_id: &str, order_id: &str) -> std::result::Result<Option<Order>, ClientError> {
            let order = self.inner.get_customer_order(customer_id, order_id).await?;
            self.loaded.wait().await;
            Ok(order)
        }

        async fn list_customer_orders(&self, customer_id: &str, store_id: &str, limit: Option<usize>) -> std::result::Result<Vec<Order>, ClientError> {
            self.inner.list_customer_orders(customer_id, store_id, limit).await
        }

        async fn save_order(&self, order: &Order) -> std::result::Result<(), ClientError> { self.inner.save_order(order).await }
    }

    #[tokio::test]
    async fn test_concurrent_returns_of_same_line_one_wins() {
        let f = fixture().await;
        f.orders.insert(order("O1", "C1", OrderStatus::Completed, vec![line("L1", "CAT1", 2, 10)])).await;
        let orders = Arc::new(LockstepOrders { inner: f.orders.clone(), loaded: tokio::sync::Barrier::new(2) });
        let svc = ReturnService::new(orders, f.totals.clone(), f.catalog.clone(), f.settings.clone(), f.members.clone(), f.events.clone());
        let s = submission(vec![ReturnSelection::new("L1", 1, "Damaged")]);

        let (c1, c2) = (ctx(), ctx());
        let (first, second) = tokio::join!(svc.submit_return(&c1, "O1", &s), svc.submit_return(&c2, "O1", &s));

        let (won, lost): (Vec<_>, Vec<_>) = [first, second].into_iter().partition(|r| r.is_ok());
        assert_eq!(won.len(), 1);
        assert!(matches!(lost[0], Err(AccountError::Collaborator(ClientError::Conflict { .. }))));

        let stored = f.orders.get("O1").await.unwrap();
        assert_eq!(stored.return_requests().len(), 1);
        assert_eq!(stored.return_requests()[0].id, won[0].as_ref().unwrap().id);
        assert_eq!(stored.version(), 1);
        assert_eq!(f.orders.save_count().await, 1);
        assert_eq!(f.events.events().await.len(), 1);
    }

    #[tokio::test]
    async fn test_workflow_failure_persists_nothing() {
        let f = fixture().await;
        f.orders.insert(order("O1", "C1", OrderStatus::Completed, vec![line("L1", "CAT1", 1, 10)])).await;
        let svc = ReturnService::new(f.orders.clone(), Arc::new(FailingWorkflow), f.catalog.clone(), f.settings.clone(), f.members.clone(), f.events.clone());

        let err = svc.submit_return(&ctx(), "O1", &submission(vec![ReturnSelection::new("L1", 1, "Damaged")])).await.unwrap_err();
        assert!(matches!(err, AccountError::Collaborator(_)));
        assert!(f.orders.get("O1").await.unwrap().return_requests().is_empty());
        assert_eq!(f.orders.save_count().await, 0);
    }

    #[tokio::test]
    async fn test_invalid_submission_shape() {
        let f = fixture().await;
        f.orders.insert(order("O1", "C1", OrderStatus::Completed, vec![line("L1", "CAT1", 1, 10)])).await;
        let mut s = submission(vec![ReturnSelection::new("L1", 1, "Damaged")]);
        s.return_from_address_id.clear();
        let err = service(&f).submit_return(&ctx(), "O1", &s).await.unwrap_err();
        assert!(matches!(err, AccountError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_return_form_contents() {
        let f = fixture().await;
        f.orders.insert(order("O1", "C1", OrderStatus::Completed, vec![line("L1", "CAT1", 1, 10), line("L2", "GONE", 1, 10)])).await;
        let mut book = AddressBook::new(ctx().party());
        book.save(AddressInput {
            id: Some("A1".into()), first_name: "Ada".into(), last_name: "Lovelace".into(), line1: "1 Way".into(),
            city: "London".into(), postal_code: "N1".into(), country_code: "GB".into(), ..Default::default()
        }, DefaultAddressFlags::default());
        f.members.insert_book(book).await;

        let form = service(&f).return_form(&ctx(), "O1").await.unwrap();
        assert!(form.error.is_none());
        assert_eq!(form.candidates.len(), 1);
        assert_eq!(form.candidates[0].catalog_item.id, "CAT1");
        assert_eq!(form.reasons, vec!["Damaged".to_string(), "Wrong size".to_string()]);
        assert_eq!(form.addresses, vec![AddressChoice { id: "A1".into(), label: "Ada Lovelace, 1 Way, London, N1 GB".into() }]);
    }

    #[tokio::test]
    async fn test_return_form_for_open_order() {
        let f = fixture().await;
        f.orders.insert(order("O1", "C1", OrderStatus::Pending, vec![line("L1", "CAT1", 1, 10)])).await;
        let form = service(&f).return_form(&ctx(), "O1").await.unwrap();
        assert!(form.candidates.is_empty());
        assert!(form.error.unwrap().contains("not completed"));
    }

    #[tokio::test]
    async fn test_list_returns_newest_first() {
        let f = fixture().await;
        f.orders.insert(order("O1", "C1", OrderStatus::Completed, vec![line("L1", "CAT1", 1, 10)])).await;
        f.orders.insert(order("O2", "C1", OrderStatus::Completed, vec![line("L2", "CAT2", 1, 10)])).await;
        let svc = service(&f);
        let first = svc.submit_return(&ctx(), "O1", &submission(vec![ReturnSelection::new("L1", 1, "Damaged")])).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = svc.submit_return(&ctx(), "O2", &submission(vec![ReturnSelection::new("L2", 1, "Wrong size")])).await.unwrap();

        let all = svc.list_returns(&ctx(), None).await.unwrap();
        assert_eq!(all.iter().map(|r| r.id.clone()).collect::<Vec<_>>(), vec![second.id.clone(), first.id.clone()]);

        let one = svc.list_returns(&ctx(), Some("O1")).await.unwrap();
        assert_eq!(one.len(), 1);
        assert_eq!(one[0].id, first.id);
    }
}

//! Local return-totals workflow: refunds each returned unit at its list price.

use async_trait::async_trait;

use crate::domain::aggregates::Order;
use crate::domain::value_objects::Money;
use crate::ports::{ClientError, ReturnTotalsWorkflow};

pub const CALCULATE_RETURN_TOTALS: &str = "CalculateReturnTotalsWorkflow";

#[derive(Clone, Copy, Debug, Default)]
pub struct LineItemPriceTotals;

impl LineItemPriceTotals {
    fn item_amounts(order: &Order) -> Result<Vec<Vec<Money>>, ClientError> {
        let currency = order.billing_currency();
        let mismatch = |e: crate::domain::value_objects::MoneyError| ClientError::Workflow { workflow: CALCULATE_RETURN_TOTALS, message: e.to_string() };

        let mut per_request = Vec::with_capacity(order.return_requests().len());
        for request in order.return_requests() {
            let mut per_item = Vec::with_capacity(request.items.len());
            for item in &request.items {
                let mut amount = Money::zero(currency);
                for rli in &item.line_items {
                    let line = order.find_line_item(&rli.line_item_id).ok_or_else(|| ClientError::Workflow {
                        workflow: CALCULATE_RETURN_TOTALS,
                        message: format!("line item {} not in order {}", rli.line_item_id, order.id()),
                    })?;
                    amount = amount.add(&line.list_price.multiply(rli.return_quantity)).map_err(mismatch)?;
                }
                per_item.push(amount);
            }
            per_request.push(per_item);
        }
        Ok(per_request)
    }
}

#[async_trait]
impl ReturnTotalsWorkflow for LineItemPriceTotals {
    async fn calculate(&self, order: &mut Order) -> Result<(), ClientError> {
        let amounts = Self::item_amounts(order)?;
        let currency = order.billing_currency().to_string();

        for (request, item_amounts) in order.return_requests_mut().iter_mut().zip(amounts) {
            let mut subtotal = Money::zero(&currency);
            for (item, amount) in request.items.iter_mut().zip(item_amounts) {
                subtotal = subtotal.add(&amount).unwrap_or(subtotal);
                item.return_amount = Some(amount);
            }
            request.refund_total = Some(subtotal.clone());
            request.item_subtotal = Some(subtotal);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::{OrderStatus, ReturnRequestBuilder, ReturnSelection, ReturnSubmission};
    use crate::services::fixtures::{line, order};
    use rust_decimal::Decimal;

    #[tokio::test]
    async fn test_totals_from_list_price() {
        let mut o = order("O1", "C1", OrderStatus::Completed, vec![line("L1", "CAT1", 3, 12), line("L2", "CAT2", 1, 5)]);
        let submission = ReturnSubmission {
            comment: String::new(), return_from_address_id: "A1".into(),
            items: vec![ReturnSelection::new("L1", 2, "Damaged"), ReturnSelection::new("L2", 1, "Wrong size")],
        };
        let request = ReturnRequestBuilder::new(&o).build(&submission).unwrap();
        o.attach_return_request(request);

        LineItemPriceTotals.calculate(&mut o).await.unwrap();
        let r = &o.return_requests()[0];
        assert_eq!(r.items[0].return_amount.as_ref().unwrap().amount(), Decimal::new(24, 0));
        assert_eq!(r.items[1].return_amount.as_ref().unwrap().amount(), Decimal::new(5, 0));
        assert_eq!(r.refund_total.as_ref().unwrap().amount(), Decimal::new(29, 0));
    }
}

//! Application services: load through the collaborator ports, run the domain
//! logic, persist, publish.

pub mod addresses;
pub mod compare;
pub mod orders;
pub mod organizations;
pub mod profile;
pub mod returns;
pub mod wishlist;

use std::sync::Arc;

use crate::domain::aggregates::{Order, Organization};
use crate::domain::events::AccountEvent;
use crate::domain::value_objects::RequestContext;
use crate::ports::{EventPublisher, MemberClient, OrderClient};
use crate::{AccountError, Result};

pub use addresses::{AddressBookPage, AddressService};
pub use compare::{CompareListService, CompareSummary};
pub use orders::{OrderHistoryService, OrderView};
pub use organizations::OrganizationService;
pub use profile::{AccountProfile, ProfileService};
pub use returns::{AddressChoice, ReturnCandidate, ReturnForm, ReturnService};
pub use wishlist::{WishListAction, WishListService, WishListUpdate};

/// Loads an order the caller owns, or fails with `Unauthorized`.
///
/// Missing orders and orders without a customer are indistinguishable from
/// orders of someone else.
pub(crate) async fn load_owned_order(orders: &dyn OrderClient, ctx: &RequestContext, order_id: &str) -> Result<Order> {
    match orders.get_customer_order(&ctx.customer_id, order_id).await? {
        Some(order) if order.is_owned_by(&ctx.customer_id) => Ok(order),
        _ => {
            tracing::warn!(customer_id = %ctx.customer_id, order_id, "order access denied");
            Err(AccountError::Unauthorized)
        }
    }
}

/// One of the caller's organizations, or `Unauthorized` when they are not a
/// member of `organization_id`.
pub(crate) async fn member_organization(members: &dyn MemberClient, ctx: &RequestContext, organization_id: &str) -> Result<Organization> {
    let member_of = members.organizations_for(&ctx.customer_id).await?;
    match member_of.into_iter().find(|o| o.id == organization_id) {
        Some(organization) => Ok(organization),
        None => {
            tracing::warn!(customer_id = %ctx.customer_id, organization_id, "organization access denied");
            Err(AccountError::Unauthorized)
        }
    }
}

/// Events are best effort: the write already happened.
pub(crate) async fn publish(events: &Arc<dyn EventPublisher>, event: AccountEvent) {
    if let Err(e) = events.publish(&event).await {
        tracing::warn!(kind = event.kind(), error = %e, "failed to publish account event");
    }
}

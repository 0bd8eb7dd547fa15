//! Account profile: the customer's details and default addresses.

use std::sync::Arc;

use serde::Serialize;
use validator::Validate;

use crate::domain::aggregates::{Address, CustomerProfile, ProfileUpdate};
use crate::domain::events::AccountEvent;
use crate::domain::value_objects::RequestContext;
use crate::ports::{EventPublisher, MemberClient};
use crate::services::publish;
use crate::{AccountError, Result};

#[derive(Clone, Debug, Serialize)]
pub struct AccountProfile {
    pub customer: CustomerProfile,
    pub default_billing: Option<Address>,
    pub default_shipping: Option<Address>,
}

#[derive(Clone)]
pub struct ProfileService {
    members: Arc<dyn MemberClient>,
    events: Arc<dyn EventPublisher>,
}

impl ProfileService {
    pub fn new(members: Arc<dyn MemberClient>, events: Arc<dyn EventPublisher>) -> Self {
        Self { members, events }
    }

    async fn customer(&self, ctx: &RequestContext) -> Result<CustomerProfile> {
        self.members.get_customer(&ctx.customer_id).await?
            .ok_or_else(|| AccountError::NotFound(format!("Customer {} not found", ctx.customer_id)))
    }

    pub async fn profile(&self, ctx: &RequestContext) -> Result<AccountProfile> {
        let customer = self.customer(ctx).await?;
        let book = self.members.load_address_book(&ctx.party()).await?;
        Ok(AccountProfile {
            customer,
            default_billing: book.default_billing().cloned(),
            default_shipping: book.default_shipping().cloned(),
        })
    }

    pub async fn edit_form(&self, ctx: &RequestContext) -> Result<ProfileUpdate> {
        Ok(self.customer(ctx).await?.edit_form())
    }

    /// Updates the full name and primary email. A customer without a stored
    /// profile gets one.
    pub async fn update_profile(&self, ctx: &RequestContext, update: ProfileUpdate) -> Result<CustomerProfile> {
        update.validate()?;

        let mut customer = self.members.get_customer(&ctx.customer_id).await?
            .unwrap_or_else(|| CustomerProfile::new(ctx.customer_id.clone()));
        customer.apply(update);
        self.members.save_customer(&customer).await?;

        tracing::info!(customer_id = %ctx.customer_id, "profile updated");
        publish(&self.events, AccountEvent::ProfileUpdated { customer_id: ctx.customer_id.clone() }).await;
        Ok(customer)
    }
}

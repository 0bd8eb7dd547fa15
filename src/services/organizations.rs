//! Company accounts the customer belongs to.

use std::sync::Arc;

use validator::Validate;

use crate::domain::aggregates::{Organization, OrganizationInput};
use crate::domain::events::AccountEvent;
use crate::domain::value_objects::RequestContext;
use crate::ports::{EventPublisher, MemberClient};
use crate::services::{member_organization, publish};
use crate::Result;

#[derive(Clone)]
pub struct OrganizationService {
    members: Arc<dyn MemberClient>,
    events: Arc<dyn EventPublisher>,
}

impl OrganizationService {
    pub fn new(members: Arc<dyn MemberClient>, events: Arc<dyn EventPublisher>) -> Self {
        Self { members, events }
    }

    pub async fn my_organizations(&self, ctx: &RequestContext) -> Result<Vec<Organization>> {
        Ok(self.members.organizations_for(&ctx.customer_id).await?)
    }

    pub async fn edit_form(&self, ctx: &RequestContext, organization_id: &str) -> Result<OrganizationInput> {
        let organization = member_organization(self.members.as_ref(), ctx, organization_id).await?;
        Ok(OrganizationInput::from(&organization))
    }

    /// Updates name and description. Any member may edit.
    pub async fn update_organization(&self, ctx: &RequestContext, organization_id: &str, input: OrganizationInput) -> Result<Organization> {
        let mut organization = member_organization(self.members.as_ref(), ctx, organization_id).await?;
        input.validate()?;

        organization.apply(input);
        self.members.save_organization(&organization).await?;

        tracing::info!(organization_id, customer_id = %ctx.customer_id, "organization updated");
        publish(&self.events, AccountEvent::OrganizationUpdated {
            organization_id: organization.id.clone(), updated_by: ctx.customer_id.clone(),
        }).await;
        Ok(organization)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::fixtures::{ctx, fixture, Fixture};
    use crate::AccountError;

    fn service(f: &Fixture) -> OrganizationService { OrganizationService::new(f.members.clone(), f.events.clone()) }

    async fn seeded() -> Fixture {
        let f = fixture().await;
        f.members.insert_organization(Organization { id: "ORG1".into(), name: "Acme".into(), description: None }, vec!["C1".into(), "C7".into()]).await;
        f.members.insert_organization(Organization { id: "ORG2".into(), name: "Globex".into(), description: None }, vec!["C9".into()]).await;
        f
    }

    #[tokio::test]
    async fn test_lists_only_my_organizations() {
        let f = seeded().await;
        let orgs = service(&f).my_organizations(&ctx()).await.unwrap();
        assert_eq!(orgs.iter().map(|o| o.id.as_str()).collect::<Vec<_>>(), vec!["ORG1"]);
    }

    #[tokio::test]
    async fn test_member_can_edit() {
        let f = seeded().await;
        let svc = service(&f);
        assert_eq!(svc.edit_form(&ctx(), "ORG1").await.unwrap().name, "Acme");

        let input = OrganizationInput { name: "Acme Ltd".into(), description: Some("Anvils and rockets".into()) };
        let updated = svc.update_organization(&ctx(), "ORG1", input).await.unwrap();
        assert_eq!(updated.name, "Acme Ltd");

        let stored = svc.my_organizations(&ctx()).await.unwrap();
        assert_eq!(stored[0].description.as_deref(), Some("Anvils and rockets"));
        assert!(matches!(f.events.events().await.as_slice(), [AccountEvent::OrganizationUpdated { .. }]));
    }

    #[tokio::test]
    async fn test_non_member_and_invalid_input() {
        let f = seeded().await;
        let svc = service(&f);

        let err = svc.update_organization(&ctx(), "ORG2", OrganizationInput { name: "Mine".into(), description: None }).await.unwrap_err();
        assert!(matches!(err, AccountError::Unauthorized));
        assert!(matches!(svc.edit_form(&ctx(), "ORG2").await, Err(AccountError::Unauthorized)));

        let err = svc.update_organization(&ctx(), "ORG1", OrganizationInput { name: String::new(), description: None }).await.unwrap_err();
        assert!(matches!(err, AccountError::InvalidInput(_)));
        assert!(f.events.events().await.is_empty());
    }
}

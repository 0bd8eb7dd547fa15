//! Address books of the customer and of the organizations they belong to.

use std::sync::Arc;

use serde::Serialize;
use validator::Validate;

use crate::domain::aggregates::{AddressBookView, AddressInput, DefaultAddressFlags, Organization, SavedAddress};
use crate::domain::events::AccountEvent;
use crate::domain::value_objects::{PartyRef, RequestContext};
use crate::ports::{EventPublisher, MemberClient};
use crate::services::{member_organization, publish};
use crate::Result;

#[derive(Clone, Debug, Serialize)]
pub struct AddressBookPage {
    pub owner: PartyRef,
    /// Set when the book belongs to an organization.
    pub organization: Option<Organization>,
    /// True when the book is empty and the customer should be sent to the
    /// new-address form.
    pub needs_first_address: bool,
    pub book: AddressBookView,
}

#[derive(Clone)]
pub struct AddressService {
    members: Arc<dyn MemberClient>,
    events: Arc<dyn EventPublisher>,
}

impl AddressService {
    pub fn new(members: Arc<dyn MemberClient>, events: Arc<dyn EventPublisher>) -> Self {
        Self { members, events }
    }

    /// The caller's own book, or an organization's when the caller is a member.
    async fn owner(&self, ctx: &RequestContext, organization_id: Option<&str>) -> Result<PartyRef> {
        let Some(org_id) = organization_id.filter(|id| !id.trim().is_empty()) else {
            return Ok(ctx.party());
        };
        let organization = member_organization(self.members.as_ref(), ctx, org_id).await?;
        Ok(PartyRef::Organization(organization.id))
    }

    pub async fn address_book(&self, ctx: &RequestContext, organization_id: Option<&str>) -> Result<AddressBookPage> {
        let owner = self.owner(ctx, organization_id).await?;
        let organization = match &owner {
            PartyRef::Organization(id) => self.members.get_organization(id).await?,
            PartyRef::Customer(_) => None,
        };
        let book = self.members.load_address_book(&owner).await?;
        Ok(AddressBookPage { needs_first_address: book.is_empty(), book: book.view(), owner, organization })
    }

    /// Form contents for editing `address_id`, or a prefilled blank form.
    pub async fn edit_form(&self, ctx: &RequestContext, address_id: Option<&str>, organization_id: Option<&str>) -> Result<AddressInput> {
        let owner = self.owner(ctx, organization_id).await?;
        let book = self.members.load_address_book(&owner).await?;
        if let Some(existing) = address_id.and_then(|id| book.get(id)) {
            return Ok(AddressInput::from(existing));
        }
        Ok(match self.members.get_customer(&ctx.customer_id).await? {
            Some(customer) => customer.address_template(&owner),
            None => AddressInput::default(),
        })
    }

    pub async fn save_address(&self, ctx: &RequestContext, organization_id: Option<&str>, input: AddressInput, flags: DefaultAddressFlags) -> Result<SavedAddress> {
        let owner = self.owner(ctx, organization_id).await?;
        input.validate()?;

        let mut book = self.members.load_address_book(&owner).await?;
        let saved = book.save(input, flags);
        self.members.save_address_book(&book).await?;

        let roles = book.get(&saved.address_id).map(|a| a.roles).unwrap_or_default();
        tracing::info!(owner = %owner, address_id = %saved.address_id, created = saved.created, "address saved");
        publish(&self.events, AccountEvent::AddressSaved { owner, address_id: saved.address_id.clone(), created: saved.created, roles }).await;
        Ok(saved)
    }

    pub async fn delete_address(&self, ctx: &RequestContext, organization_id: Option<&str>, address_id: &str) -> Result<()> {
        let owner = self.owner(ctx, organization_id).await?;
        let mut book = self.members.load_address_book(&owner).await?;
        book.remove(address_id)?;
        self.members.save_address_book(&book).await?;

        tracing::info!(owner = %owner, address_id, "address removed");
        publish(&self.events, AccountEvent::AddressRemoved { owner, address_id: address_id.to_string() }).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::AddressRoles;
    use crate::services::fixtures::{ctx, fixture, Fixture};
    use crate::AccountError;

    fn service(f: &Fixture) -> AddressService { AddressService::new(f.members.clone(), f.events.clone()) }

    fn input(id: &str) -> AddressInput {
        AddressInput {
            id: Some(id.into()), name: String::new(), first_name: "Ada".into(), last_name: "Lovelace".into(),
            email: None, phone: None, line1: "12 St James's Square".into(), line2: None, city: "London".into(),
            region: None, postal_code: "SW1Y 4JH".into(), country_code: "GB".into(),
        }
    }

    const BILLING: DefaultAddressFlags = DefaultAddressFlags { make_default_billing: true, make_default_shipping: false };

    #[tokio::test]
    async fn test_first_address_then_billing_move() {
        let f = fixture().await;
        let svc = service(&f);

        let page = svc.address_book(&ctx(), None).await.unwrap();
        assert!(page.needs_first_address);

        svc.save_address(&ctx(), None, input("A"), DefaultAddressFlags::default()).await.unwrap();
        let saved = svc.save_address(&ctx(), None, input("B"), BILLING).await.unwrap();
        assert!(saved.created);

        let book = f.members.book(&ctx().party()).await.unwrap();
        assert_eq!(book.addresses().len(), 2);
        assert_eq!(book.default_billing().unwrap().id, "B");
        assert_eq!(book.default_shipping().unwrap().id, "A");
        assert_eq!(f.events.events().await.len(), 2);

        let page = svc.address_book(&ctx(), None).await.unwrap();
        assert!(!page.needs_first_address);
        assert!(page.book.other.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_input_not_saved() {
        let f = fixture().await;
        let mut bad = input("A");
        bad.first_name.clear();
        let err = service(&f).save_address(&ctx(), None, bad, DefaultAddressFlags::default()).await.unwrap_err();
        assert!(matches!(err, AccountError::InvalidInput(_)));
        assert!(f.members.book(&ctx().party()).await.is_none());
    }

    #[tokio::test]
    async fn test_organization_book_requires_membership() {
        let f = fixture().await;
        f.members.insert_organization(Organization { id: "ORG1".into(), name: "Acme".into(), description: None }, vec!["C1".into()]).await;
        f.members.insert_organization(Organization { id: "ORG2".into(), name: "Globex".into(), description: None }, vec!["C9".into()]).await;
        let svc = service(&f);

        svc.save_address(&ctx(), Some("ORG1"), input("HQ"), DefaultAddressFlags::default()).await.unwrap();
        let org_book = f.members.book(&PartyRef::Organization("ORG1".into())).await.unwrap();
        assert_eq!(org_book.get("HQ").unwrap().roles, AddressRoles::BOTH);
        assert!(f.members.book(&ctx().party()).await.is_none());

        let page = svc.address_book(&ctx(), Some("ORG1")).await.unwrap();
        assert_eq!(page.organization.unwrap().name, "Acme");
        assert!(page.book.default_billing.is_some());

        let err = svc.save_address(&ctx(), Some("ORG2"), input("X"), DefaultAddressFlags::default()).await.unwrap_err();
        assert!(matches!(err, AccountError::Unauthorized));
    }

    #[tokio::test]
    async fn test_edit_form_prefill() {
        let f = fixture().await;
        let svc = service(&f);

        let blank = svc.edit_form(&ctx(), None, None).await.unwrap();
        assert_eq!(blank.first_name, "Ada");
        assert_eq!(blank.last_name, "Lovelace");
        assert_eq!(blank.email.as_deref(), Some("ada@example.com"));

        svc.save_address(&ctx(), None, input("A"), DefaultAddressFlags::default()).await.unwrap();
        let existing = svc.edit_form(&ctx(), Some("A"), None).await.unwrap();
        assert_eq!(existing.id.as_deref(), Some("A"));
        assert_eq!(existing.city, "London");
    }

    #[tokio::test]
    async fn test_delete_address() {
        let f = fixture().await;
        let svc = service(&f);
        svc.save_address(&ctx(), None, input("A"), DefaultAddressFlags::default()).await.unwrap();

        svc.delete_address(&ctx(), None, "A").await.unwrap();
        assert!(f.members.book(&ctx().party()).await.unwrap().is_empty());
        assert!(matches!(svc.delete_address(&ctx(), None, "A").await, Err(AccountError::NotFound(_))));
    }
}

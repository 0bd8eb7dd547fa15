//! Customer and organization profiles as supplied by the member service.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::aggregates::address_book::AddressInput;
use crate::domain::value_objects::PartyRef;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CustomerProfile {
    pub id: String,
    pub full_name: String,
    #[serde(default)]
    pub emails: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
}

/// Editable account details. The first entry of `emails` is the primary one.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct ProfileUpdate {
    #[validate(length(min = 1, max = 128))]
    pub full_name: String,
    #[validate(email)]
    pub email: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct OrganizationInput {
    #[validate(length(min = 1, max = 128))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 1000))]
    pub description: Option<String>,
}

impl Organization {
    pub fn apply(&mut self, input: OrganizationInput) {
        self.name = input.name;
        self.description = input.description.filter(|d| !d.trim().is_empty());
    }
}

impl From<&Organization> for OrganizationInput {
    fn from(o: &Organization) -> Self { Self { name: o.name.clone(), description: o.description.clone() } }
}

impl CustomerProfile {
    pub fn new(id: impl Into<String>) -> Self { Self { id: id.into(), full_name: String::new(), emails: vec![] } }

    pub fn primary_email(&self) -> Option<&str> { self.emails.first().map(String::as_str) }

    /// Sets the full name and replaces the primary email, adding one when the
    /// profile has none. Other emails are kept.
    pub fn apply(&mut self, update: ProfileUpdate) {
        self.full_name = update.full_name;
        match self.emails.first_mut() {
            Some(primary) => *primary = update.email,
            None => self.emails.push(update.email),
        }
    }

    pub fn edit_form(&self) -> ProfileUpdate {
        ProfileUpdate { full_name: self.full_name.clone(), email: self.primary_email().unwrap_or_default().to_string() }
    }

    /// Prefill for a brand-new address. Personal names are only copied into a
    /// customer's own book, never an organization's.
    pub fn address_template(&self, owner: &PartyRef) -> AddressInput {
        let mut input = AddressInput::default();
        if !owner.is_organization() {
            let mut names = self.full_name.split_whitespace();
            input.first_name = names.next().unwrap_or_default().to_string();
            input.last_name = names.next().unwrap_or_default().to_string();
        }
        input.email = self.emails.first().cloned();
        input
    }
}

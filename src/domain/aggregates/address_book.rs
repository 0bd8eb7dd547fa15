//! Address Book Aggregate
//!
//! One book per party. Default billing and default shipping are roles carried
//! in [`AddressRoles`], never encoded in the display name.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::domain::value_objects::{AddressRoles, PartyRef};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub id: String,
    pub name: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub region: Option<String>,
    pub postal_code: String,
    pub country_code: String,
    #[serde(default)]
    pub roles: AddressRoles,
}

impl Address {
    fn from_input(id: String, input: AddressInput) -> Self {
        let mut address = Self {
            id, name: String::new(), first_name: String::new(), last_name: String::new(), email: None, phone: None,
            line1: String::new(), line2: None, city: String::new(), region: None, postal_code: String::new(),
            country_code: String::new(), roles: AddressRoles::NONE,
        };
        address.overwrite(input);
        address
    }

    /// Replaces every editable field; roles and id are untouched.
    fn overwrite(&mut self, input: AddressInput) {
        self.name = if input.name.trim().is_empty() { self.id.clone() } else { input.name };
        self.first_name = input.first_name;
        self.last_name = input.last_name;
        self.email = input.email;
        self.phone = input.phone;
        self.line1 = input.line1;
        self.line2 = input.line2;
        self.city = input.city;
        self.region = input.region;
        self.postal_code = input.postal_code;
        self.country_code = input.country_code;
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}, {}, {}, {} {}", self.first_name, self.last_name, self.line1, self.city, self.postal_code, self.country_code)
    }
}

/// Editable address fields as submitted by the customer.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct AddressInput {
    /// Existing address id to update; absent or empty creates a new address.
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    #[validate(length(max = 128))]
    pub name: String,
    #[validate(length(min = 1, max = 64))]
    pub first_name: String,
    #[validate(length(min = 1, max = 64))]
    pub last_name: String,
    #[validate(email)]
    pub email: Option<String>,
    pub phone: Option<String>,
    #[validate(length(min = 1))]
    pub line1: String,
    pub line2: Option<String>,
    #[validate(length(min = 1))]
    pub city: String,
    pub region: Option<String>,
    #[validate(length(min = 1, max = 16))]
    pub postal_code: String,
    #[validate(length(equal = 2))]
    pub country_code: String,
}

impl From<&Address> for AddressInput {
    fn from(a: &Address) -> Self {
        Self {
            id: Some(a.id.clone()), name: a.name.clone(), first_name: a.first_name.clone(), last_name: a.last_name.clone(),
            email: a.email.clone(), phone: a.phone.clone(), line1: a.line1.clone(), line2: a.line2.clone(), city: a.city.clone(),
            region: a.region.clone(), postal_code: a.postal_code.clone(), country_code: a.country_code.clone(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultAddressFlags {
    #[serde(default)]
    pub make_default_billing: bool,
    #[serde(default)]
    pub make_default_shipping: bool,
}

impl DefaultAddressFlags {
    fn as_roles(self) -> AddressRoles {
        AddressRoles { default_billing: self.make_default_billing, default_shipping: self.make_default_shipping }
    }
}

/// Roles granted to the first address saved into an empty book.
pub fn first_address_roles() -> AddressRoles { AddressRoles::BOTH }

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SavedAddress { pub address_id: String, pub created: bool }

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct AddressBookView {
    pub default_billing: Option<Address>,
    pub default_shipping: Option<Address>,
    pub other: Vec<Address>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    #[error("Address not found: {0}")]
    NotFound(String),
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AddressBook {
    owner: PartyRef,
    addresses: Vec<Address>,
}

impl AddressBook {
    pub fn new(owner: PartyRef) -> Self { Self { owner, addresses: vec![] } }
    pub fn from_parts(owner: PartyRef, addresses: Vec<Address>) -> Self { Self { owner, addresses } }

    pub fn owner(&self) -> &PartyRef { &self.owner }
    pub fn addresses(&self) -> &[Address] { &self.addresses }
    pub fn is_empty(&self) -> bool { self.addresses.is_empty() }
    pub fn get(&self, address_id: &str) -> Option<&Address> { self.addresses.iter().find(|a| a.id == address_id) }

    pub fn default_billing(&self) -> Option<&Address> { self.addresses.iter().find(|a| a.roles.default_billing) }
    pub fn default_shipping(&self) -> Option<&Address> { self.addresses.iter().find(|a| a.roles.default_shipping) }

    /// Inserts or updates `input`, moving the requested default roles onto it.
    pub fn save(&mut self, input: AddressInput, flags: DefaultAddressFlags) -> SavedAddress {
        let mut granted = flags.as_roles();
        if self.addresses.is_empty() {
            granted = granted.union(first_address_roles());
        }

        if granted.default_billing {
            self.addresses.iter_mut().for_each(|a| a.roles.default_billing = false);
        }
        if granted.default_shipping {
            self.addresses.iter_mut().for_each(|a| a.roles.default_shipping = false);
        }

        let id = input.id.clone().filter(|id| !id.trim().is_empty()).unwrap_or_else(|| Uuid::now_v7().to_string());
        match self.addresses.iter_mut().find(|a| a.id == id) {
            Some(existing) => {
                existing.overwrite(input);
                existing.roles = existing.roles.union(granted);
                SavedAddress { address_id: id, created: false }
            }
            None => {
                let mut address = Address::from_input(id.clone(), input);
                address.roles = granted;
                self.addresses.push(address);
                SavedAddress { address_id: id, created: true }
            }
        }
    }

    /// Removes an address; any role it held stays vacant.
    pub fn remove(&mut self, address_id: &str) -> Result<Address, AddressError> {
        let pos = self.addresses.iter().position(|a| a.id == address_id)
            .ok_or_else(|| AddressError::NotFound(address_id.to_string()))?;
        Ok(self.addresses.remove(pos))
    }

    pub fn view(&self) -> AddressBookView {
        AddressBookView {
            default_billing: self.default_billing().cloned(),
            default_shipping: self.default_shipping().cloned(),
            other: self.addresses.iter().filter(|a| a.roles.is_empty()).cloned().collect(),
        }
    }
}

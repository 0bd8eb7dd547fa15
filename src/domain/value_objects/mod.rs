//! Value Objects for the account area

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Money value object
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money { amount: Decimal, currency: String }

impl Money {
    pub fn new(amount: Decimal, currency: &str) -> Self { Self { amount, currency: currency.to_string() } }
    pub fn usd(amount: Decimal) -> Self { Self::new(amount, "USD") }
    pub fn zero(currency: &str) -> Self { Self::new(Decimal::ZERO, currency) }
    pub fn amount(&self) -> Decimal { self.amount }
    pub fn currency(&self) -> &str { &self.currency }
    pub fn add(&self, other: &Money) -> Result<Money, MoneyError> {
        if self.currency != other.currency { return Err(MoneyError::CurrencyMismatch); }
        Ok(Money::new(self.amount + other.amount, &self.currency))
    }
    pub fn multiply(&self, qty: u32) -> Money { Money::new(self.amount * Decimal::from(qty), &self.currency) }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{} {}", self.amount, self.currency) }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoneyError {
    #[error("Currency mismatch")]
    CurrencyMismatch,
}

/// Owner of an address book: an individual customer or a B2B organization.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum PartyRef {
    Customer(String),
    Organization(String),
}

impl PartyRef {
    pub fn id(&self) -> &str {
        match self { Self::Customer(id) | Self::Organization(id) => id }
    }
    pub fn is_organization(&self) -> bool { matches!(self, Self::Organization(_)) }
}

impl fmt::Display for PartyRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Customer(id) => write!(f, "customer:{}", id),
            Self::Organization(id) => write!(f, "organization:{}", id),
        }
    }
}

/// Default-address roles held by a single address.
///
/// Each role has at most one holder within an address book; an address may
/// hold neither, either, or both.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressRoles {
    pub default_billing: bool,
    pub default_shipping: bool,
}

impl AddressRoles {
    pub const NONE: AddressRoles = AddressRoles { default_billing: false, default_shipping: false };
    pub const BOTH: AddressRoles = AddressRoles { default_billing: true, default_shipping: true };

    pub fn is_empty(&self) -> bool { !self.default_billing && !self.default_shipping }

    pub fn union(self, other: AddressRoles) -> AddressRoles {
        AddressRoles {
            default_billing: self.default_billing || other.default_billing,
            default_shipping: self.default_shipping || other.default_shipping,
        }
    }
}

/// Explicit per-request caller identity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestContext {
    pub customer_id: String,
    pub store_id: String,
}

impl RequestContext {
    pub fn new(customer_id: impl Into<String>, store_id: impl Into<String>) -> Self {
        Self { customer_id: customer_id.into(), store_id: store_id.into() }
    }
    pub fn party(&self) -> PartyRef { PartyRef::Customer(self.customer_id.clone()) }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn test_money_add() {
        let a = Money::usd(Decimal::new(100, 0));
        let b = Money::usd(Decimal::new(50, 0));
        assert_eq!(a.add(&b).unwrap().amount(), Decimal::new(150, 0));
        assert_eq!(a.add(&Money::zero("EUR")), Err(MoneyError::CurrencyMismatch));
    }
    #[test]
    fn test_roles_union() {
        let billing = AddressRoles { default_billing: true, default_shipping: false };
        let shipping = AddressRoles { default_billing: false, default_shipping: true };
        assert_eq!(billing.union(shipping), AddressRoles::BOTH);
        assert!(AddressRoles::NONE.is_empty());
    }
    #[test]
    fn test_party_display() {
        assert_eq!(PartyRef::Organization("ORG1".into()).to_string(), "organization:ORG1");
        assert_eq!(PartyRef::Customer("C1".into()).id(), "C1");
    }
}

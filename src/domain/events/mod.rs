//! Domain events
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{AddressRoles, PartyRef};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum AccountEvent {
    ReturnRequested { order_id: String, request_id: String, customer_id: String, line_item_ids: Vec<String> },
    AddressSaved { owner: PartyRef, address_id: String, created: bool, roles: AddressRoles },
    AddressRemoved { owner: PartyRef, address_id: String },
    WishListMovedToCart { customer_id: String, line_item_ids: Vec<String> },
    ProfileUpdated { customer_id: String },
    OrganizationUpdated { organization_id: String, updated_by: String },
}

impl AccountEvent {
    /// Suffix of the subject the event is published on.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ReturnRequested { .. } => "return_requested",
            Self::AddressSaved { .. } => "address_saved",
            Self::AddressRemoved { .. } => "address_removed",
            Self::WishListMovedToCart { .. } => "wishlist_moved_to_cart",
            Self::ProfileUpdated { .. } => "profile_updated",
            Self::OrganizationUpdated { .. } => "organization_updated",
        }
    }
}

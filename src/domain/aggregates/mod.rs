//! Aggregates module
pub mod order;
pub mod return_request;
pub mod address_book;
pub mod member;
pub mod cart;

pub use order::{Order, OrderAddress, OrderForm, OrderStatus, LineItem, BILLING_ADDRESS, SHIPPING_ADDRESS};
pub use return_request::{ReturnRequest, ReturnItem, ReturnLineItem, ReturnRequestStatus, ReturnItemState, ReturnSubmission, ReturnSelection, ReturnRequestBuilder, ReturnError};
pub use address_book::{Address, AddressBook, AddressBookView, AddressInput, AddressError, DefaultAddressFlags, SavedAddress, first_address_roles};
pub use member::{CustomerProfile, Organization, OrganizationInput, ProfileUpdate};
pub use cart::{ShopperList, ListItem, ListKind, CartError};

//! Storefront Account Service
//!
//! The customer-facing account area of the storefront.
//!
//! ## Features
//! - Address books for customers and organizations, with default billing and
//!   shipping roles
//! - Order history, order view and reorder into the cart
//! - Return (RMA) requests against completed orders
//! - Wishlist management

pub mod api;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod ports;
pub mod services;

use thiserror::Error;

use crate::domain::aggregates::{AddressError, ReturnError};
use crate::ports::ClientError;

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum AccountError {
    /// The caller does not own the referenced order or organization.
    #[error("Access denied")]
    Unauthorized,

    #[error(transparent)]
    Return(#[from] ReturnError),

    #[error("Invalid input: {0}")]
    InvalidInput(#[from] validator::ValidationErrors),

    #[error("{0}")]
    NotFound(String),

    #[error("Collaborator failure: {0}")]
    Collaborator(#[from] ClientError),
}

impl AccountError {
    /// Form-level errors the customer can fix and resubmit.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Return(_) | Self::InvalidInput(_))
    }
}

impl From<AddressError> for AccountError {
    fn from(e: AddressError) -> Self { AccountError::NotFound(e.to_string()) }
}

pub type Result<T> = std::result::Result<T, AccountError>;

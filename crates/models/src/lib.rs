//! Data-transfer shapes exchanged with the account backend.
//!
//! Every struct here mirrors one JSON body. Required fields are required:
//! a body missing one fails to decode instead of producing an empty value.

pub mod errors;
pub mod dates;
pub mod auth;
pub mod account;
pub mod card;
pub mod invoice;
pub mod transaction;

pub use account::{AccountSummary, Identity};
pub use auth::{ChangePasswordRequest, LoginRequest, ServerMessage};
pub use card::Card;
pub use invoice::{InvoiceDetail, InvoiceId, InvoiceSummary};
pub use transaction::Transaction;

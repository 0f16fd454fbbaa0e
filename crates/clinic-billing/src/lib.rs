//! Payment processing for the clinic backend.
//!
//! The [`PaymentEngine`] owns the one multi-record mutation in the system:
//! paying a bill flips its status to `Paid` and deducts every stock line
//! from inventory in a single atomic transaction. Partial effects are
//! impossible; a failed payment leaves both the bill and the stock exactly
//! as they were.

pub mod engine;
pub mod error;

pub use engine::{PaymentEngine, PaymentReceipt};
pub use error::PaymentError;

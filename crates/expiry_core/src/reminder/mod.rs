//! Expiry reminders.
//!
//! # Responsibility
//! - Decide when an item's daily reminder starts and when it must be
//!   rescheduled or cancelled (`policy`).
//! - Abstract the platform alarm registry as an injected capability
//!   (`scheduler`).
//! - Turn a delivered reminder into notification content (`firing`).

pub mod firing;
pub mod policy;
pub mod scheduler;

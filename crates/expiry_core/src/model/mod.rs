//! Domain model for tracked food items.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Define the supported list orderings.
//!
//! # Invariants
//! - Persisted items are identified by a store-assigned `FoodItemId`.
//! - Deletion is a hard delete; there are no tombstones.

pub mod food_item;
pub mod sort_order;

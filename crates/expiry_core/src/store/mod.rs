//! Shared store facade used by services and the FFI/CLI shells.
//!
//! # Responsibility
//! - Serialize all item reads and writes behind one connection.
//! - Publish sorted snapshots to subscribers after every mutation.

pub mod food_item_store;

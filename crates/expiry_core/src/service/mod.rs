//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository and reminder calls into use-case level APIs.
//! - Keep UI/FFI layers decoupled from storage and platform details.

pub mod food_item_service;
pub mod sort_preference_service;

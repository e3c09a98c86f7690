//! FFI bridge crate exposing expiry tracker use-cases to the Flutter shell.

pub mod api;

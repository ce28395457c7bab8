//! Storage module
//!
//! Provides the embedded key/value store that the wardrobe collections
//! are persisted in.

pub mod store;

pub use store::{Collection, Store};

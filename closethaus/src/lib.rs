//! ClosetHaus library
//!
//! Wardrobe catalog, try-on generation and the persistence that keeps a
//! user's closet across restarts. The binary and the integration tests
//! both drive it through [`app::AppState`] and [`commands`].

pub mod app;
pub mod commands;
pub mod config;
pub mod database;
pub mod error;
pub mod remote;
pub mod services;
pub mod storage;

#[cfg(test)]
pub(crate) mod test_support;

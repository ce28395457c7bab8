//! Services module
//!
//! Business logic services that coordinate between commands, the
//! in-memory snapshot and the repository.

pub mod closet;
pub mod coordinator;
pub mod mirror;
pub mod room;
pub mod settings;

pub use closet::ClosetService;
pub use coordinator::{Coordinator, Phase, SyncEvent};
pub use mirror::{MirrorService, MirrorSession};
pub use room::Room;
pub use settings::{AppSettings, SettingsService};

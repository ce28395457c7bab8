//! Application configuration constants
//!
//! Central location for storage layout, remote endpoints, and validation
//! boundaries used throughout the application. Runtime-tunable values live
//! in [`crate::services::settings`].

// ===== Storage Layout =====

/// File name of the embedded database inside the app data directory
pub const DATABASE_FILE_NAME: &str = "closethaus.db";

/// Settings file name inside the app data directory
pub const SETTINGS_FILE_NAME: &str = "settings.json";

/// Table backing the user reference images collection
pub const USER_IMAGES_COLLECTION: &str = "userImages";
/// Table backing the clothing catalog collection
pub const CLOTHING_ITEMS_COLLECTION: &str = "clothingItems";
/// Table backing the saved outfits collection
pub const SAVED_OUTFITS_COLLECTION: &str = "savedOutfits";

/// Fixed record key for the user reference images
pub const USER_IMAGES_KEY: &str = "userData";
/// Fixed record key for list-shaped collections
pub const ITEMS_KEY: &str = "items";

/// How long a writer waits on a locked database before giving up
pub const STORE_BUSY_TIMEOUT_SECS: u64 = 5;

// ===== Remote Service =====

/// Default base URL of the classify/generate proxy
pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8080";

/// Path of the classification endpoint, relative to the base URL
pub const CLASSIFY_PATH: &str = "/api/classify";

/// Path of the outfit generation endpoint, relative to the base URL
pub const GENERATE_PATH: &str = "/api/generate";

/// Default request timeout in seconds.
/// Generation composites several images and routinely takes tens of seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

/// Minimum request timeout accepted from settings
pub const MIN_REQUEST_TIMEOUT_SECS: u64 = 5;

/// Maximum request timeout accepted from settings (10 minutes)
pub const MAX_REQUEST_TIMEOUT_SECS: u64 = 600;

// ===== Image Validation =====

/// Required prefix of an uploaded image MIME type
pub const IMAGE_MIME_PREFIX: &str = "image/";

/// Largest decoded image accepted inline (the proxy caps request bodies at 10 MB)
pub const MAX_IMAGE_BYTES: usize = 8 * 1024 * 1024;

// ===== Sync Events =====

/// Capacity of the sync event broadcast channel
pub const SYNC_EVENT_CAPACITY: usize = 64;

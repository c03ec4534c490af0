//! Settings pipeline for the service instance.
//!
//! # Data Flow
//! ```text
//! appsettings.json (required, JSON)
//!     → loader.rs (read & deserialize)
//!     → AppSettings (immutable snapshot)
//!     → watcher.rs re-reads on file change
//!     → atomic swap of the shared ArcSwap handle
//!     → collaborators observe the new snapshot on next load()
//! ```
//!
//! A settings file that fails to re-parse during a reload is rejected and
//! the current snapshot is kept.

pub mod loader;
pub mod schema;
pub mod watcher;

pub use loader::{load_settings, SettingsError};
pub use schema::AppSettings;
pub use watcher::SharedSettings;

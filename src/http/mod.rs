//! Web server assembly and the application startup seam.

pub mod server;
pub mod startup;

pub use server::{RunningServer, ServerError};
pub use startup::{AppServices, Startup};

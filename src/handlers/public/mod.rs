// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Health, setup status and bootstrap, and token acquisition.

pub mod auth;
pub mod health;
pub mod setup;

pub use auth::login;
pub use health::health;
pub use setup::{setup_init, setup_status};

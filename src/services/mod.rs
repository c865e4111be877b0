pub mod error;
pub mod setup_service;
pub mod team_service;
pub mod user_service;

pub use error::StoreError;
pub use setup_service::{SetupService, SetupStatus};
pub use team_service::TeamService;
pub use user_service::UserService;

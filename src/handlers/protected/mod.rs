// handlers/protected/mod.rs - Protected handlers (JWT authentication required)
//
// Mounted behind `jwt_auth_middleware`; each handler receives the resolved
// `AuthUser` and checks the gate for its own action.

pub mod auth;
pub mod team;
pub mod team_members;

pub use auth::{change_password, logout, me};
pub use team::{team_create, team_delete, team_get, team_list, team_update};
pub use team_members::{member_add, member_remove, member_update};

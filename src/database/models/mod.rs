pub mod organization;
pub mod team;
pub mod user;

pub use organization::Organization;
pub use team::{Permission, Team, TeamMember, TeamWithMembers};
pub use user::{Role, User};

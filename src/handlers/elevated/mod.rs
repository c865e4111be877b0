// handlers/elevated/mod.rs - Elevated handlers (super-admin JWT required)
//
// User administration. Handlers gather the target's current role and the
// super-admin count so the gate can rule on invariant-sensitive actions.

pub mod setup;
pub mod users;

pub use setup::create_admin;
pub use users::{user_delete, user_list, user_update_role};

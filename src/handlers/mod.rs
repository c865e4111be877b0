// handlers/mod.rs - 3-tier handler layout
//
// Public (no auth) → Protected (JWT auth) → Elevated (JWT auth, super-admin)
//
// Every protected and elevated handler asks the authorization gate before it
// touches a store.
pub mod elevated;
pub mod input;
pub mod protected;
pub mod public;

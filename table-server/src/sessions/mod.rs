//! Session management
//!
//! Owns session creation, occupancy detection and close-out. The
//! shared-vs-separate-bill decision is the diner's: scanning an occupied
//! table returns `is_occupied=true` and the caller chooses a billing
//! intent; either way the table keeps its single active session.

mod manager;

pub use manager::SessionManager;

/// General utility commands
mod general;
/// Master-only management commands
pub mod manage;
/// Profile registration and browsing
pub mod profile;

pub use general::*;
pub use manage::clear_profiles;
pub use profile::{profiles, register};

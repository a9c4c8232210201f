//! Party domain module.
//!
//! - `model`: `Party` and its advisory `Presence`
//! - `repository`: persistence contract for the party directory

mod model;
mod repository;

pub use model::{Party, PartyDirectory, Presence};
pub use repository::PartyRepository;

//! Identity domain module.
//!
//! The durable identity of the current actor ("self") and the sequential
//! handle scheme used when one is first allocated.

mod handle;
mod model;
mod repository;

pub use handle::format_handle;
pub use model::{DEFAULT_DISPLAY_NAME, SelfProfile};
pub use repository::IdentityRepository;

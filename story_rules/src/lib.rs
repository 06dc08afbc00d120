//! # Story Rules
//!
//! The "Story Bible" crate - the data model and pure rules of a serial novel:
//! characters and their mutation vocabulary, chapter ordering, and the world
//! graph. This crate owns no storage and does no I/O.

pub mod cycles;
pub mod entities;
pub mod error;
pub mod mechanics;
pub mod world_state;

pub use cycles::*;
pub use entities::*;
pub use error::*;
pub use mechanics::*;
pub use world_state::*;

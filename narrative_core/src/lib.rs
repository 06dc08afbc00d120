//! # Narrative Core
//!
//! The engine that keeps a serial novel consistent. It stores what the
//! `story_rules` crate describes and checks drafts against it.
//!
//! ## Core Components
//!
//! - **timeline**: per-character mutation logs, replay and snapshots
//! - **foreshadowing**: planted threads, their dependencies and lifecycle
//! - **world**: the persisted world graph
//! - **checker**: draft validation against constraints and annotations
//! - **context_assembler**: bounded chapter digest for draft writers
//! - **simulation**: plan, draft, check and polish one chapter
//!
//! ## Design Philosophy
//!
//! - **Log-Sourced**: a character's summary is always a replay of its log
//! - **Whole-File Records**: every write loads, mutates and rewrites one file
//! - **Explicit Roots**: storage lives under a configured project root only

pub mod annotations;
pub mod checker;
pub mod config;
pub mod context_assembler;
pub mod error;
pub mod foreshadowing;
pub mod novel;
pub mod simulation;
pub mod store;
pub mod timeline;
pub mod world;

pub use annotations::*;
pub use checker::*;
pub use config::*;
pub use context_assembler::*;
pub use error::*;
pub use foreshadowing::*;
pub use novel::*;
pub use simulation::*;
pub use store::*;
pub use timeline::*;
pub use world::*;

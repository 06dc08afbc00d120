//! Foreshadowing - planted threads, their dependencies and recovery lifecycle.
//!
//! Nodes are threads the author planted; edges record how threads feed,
//! strengthen or overturn one another. An edge may also point at a recovery
//! point (`<id>_recover`) rather than another node.

mod edge;
mod graph;
mod node;
mod store;

pub use edge::*;
pub use graph::*;
pub use node::*;
pub use store::*;

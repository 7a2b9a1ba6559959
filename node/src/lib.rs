//! Vanguard node: turns observed transfers into vote tasks.
//!
//! The node owns the long-running loops:
//! - the [`Pipeline`] that filters a transfer, resolves its content and
//!   weight, and hands it to the dispatch engine
//! - the [`StreamRunner`] that follows live transfers and restarts after
//!   connection failures
//! - the [`ReplayDriver`] that pushes a historical block range through the
//!   same pipeline
//! - configuration loading and graceful shutdown

pub mod config;
pub mod error;
pub mod node;
pub mod pipeline;
pub mod replay;
pub mod runner;
pub mod shutdown;

pub use config::{ListSource, NodeConfig, VotersSource};
pub use error::NodeError;
pub use node::{Node, Services};
pub use pipeline::{Outcome, Pipeline};
pub use replay::{ReplayDriver, ReplayStats};
pub use runner::StreamRunner;
pub use shutdown::ShutdownController;

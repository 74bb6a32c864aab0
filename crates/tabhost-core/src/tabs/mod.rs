//! Tab orchestration
//!
//! The [`TabOrchestrator`] tracks, per server, the ordered list of tabs and
//! which one is active, and arbitrates the single visible surface of the host
//! window. [`TabCommand`] is the request surface exposed to the presentation
//! layer.

mod commands;
mod orchestrator;

pub use commands::{CommandReply, TabCommand};
pub use orchestrator::{Collaborators, TabOrchestrator};

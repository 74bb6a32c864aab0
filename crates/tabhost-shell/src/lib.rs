//! Tabhost Shell Library
//!
//! Headless presentation layer for Tabhost: a line-command console on stdin
//! driving the tab orchestrator, with outbound events printed as JSON lines.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  ConsoleCommand  ┌──────────────┐  TabCommand   ┌──────────────────┐
//! │ stdin lines  │ ───────────────▶ │ Shell        │ ────────────▶ │ TabOrchestrator  │
//! └──────────────┘                  │  registries  │  HostSignal   │  (tokio task)    │
//!                                   │  surfaces    │ ────────────▶ │                  │
//!                                   └──────────────┘               └────────┬─────────┘
//!                                                                           │ TabEvent /
//!                                                                           ▼ RendererMessage
//!                                                                  stdout (JSON lines)
//! ```

pub mod console;
pub mod shell;

pub use console::{parse, ConsoleCommand};
pub use shell::{Shell, ShellOutputs};

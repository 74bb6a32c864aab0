//! Tabhost Core Library
//!
//! This crate provides the core functionality for Tabhost, a desktop shell
//! that hosts several remote servers in one window, including:
//! - Per-server tab ordering and active tab selection
//! - Compositing exactly one visible surface into the host window
//! - Server and view registries
//! - SQLite-based persistence and JSON configuration
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     tabhost-core                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  tabs/         - Tab orchestrator, presentation commands    │
//! │  servers/      - Server registry, current server, login     │
//! │  views/        - View registry, primary views               │
//! │  surface/      - Renderable surfaces and load status        │
//! │  window/       - Host window seam                           │
//! │  overlay/      - Loading screen, modal dialogs              │
//! │  events.rs     - Signals in, tab events out                 │
//! │  runtime.rs    - Orchestrator actor and channels            │
//! │  storage/      - SQLite database, queries                   │
//! │  config.rs     - Shell configuration                        │
//! │  types/        - Shared type definitions                    │
//! │  error.rs      - Error types                                │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod events;
pub mod overlay;
pub mod runtime;
pub mod servers;
pub mod storage;
pub mod surface;
pub mod tabs;
pub mod types;
pub mod views;
pub mod window;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;

pub use config::ShellConfig;
pub use events::{EventBus, HostSignal, RendererMessage, SignalSender, TabEvent};
pub use runtime::{spawn_orchestrator, HostChannels, OrchestratorHandle, SignalRouter};
pub use tabs::{Collaborators, CommandReply, TabCommand, TabOrchestrator};

// Re-export collaborators
pub use overlay::{LoadingScreen, LoadingScreenOverlay, ModalCoordinator, ModalStack};
pub use servers::{ServerManager, ServerRegistry};
pub use surface::{SurfaceManager, SurfaceStatus, SurfaceTable};
pub use views::{ViewManager, ViewRegistry};
pub use window::{HeadlessWindow, WindowHost};

// Re-export storage
pub use storage::Storage;

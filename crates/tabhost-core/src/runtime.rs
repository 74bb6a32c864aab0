//! Runtime wiring for the tab orchestrator
//!
//! The orchestrator runs as a single tokio task that owns it exclusively.
//! Registries, surfaces and the window raise [`HostSignal`]s; the
//! presentation layer sends [`TabCommand`]s through an
//! [`OrchestratorHandle`] and awaits the reply.

use crate::error::{Error, Result};
use crate::events::{signal_channel, HostSignal, SignalReceiver, SignalSender};
use crate::servers::ServerRegistry;
use crate::tabs::{CommandReply, TabCommand, TabOrchestrator};
use crate::types::{ServerId, TabInfo, ViewId};
use crate::views::ViewManager;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// A command paired with the channel its reply goes to
pub type CommandRequest = (TabCommand, oneshot::Sender<CommandReply>);

/// Senders shared by everything that talks to the orchestrator.
///
/// Registries and surfaces get clones of `signal_tx`; the presentation layer
/// wraps `command_tx` in an [`OrchestratorHandle`].
#[derive(Debug, Clone)]
pub struct HostChannels {
    pub signal_tx: SignalSender,
    pub command_tx: mpsc::Sender<CommandRequest>,
}

impl HostChannels {
    pub fn new(buffer: usize) -> (Self, SignalReceiver, mpsc::Receiver<CommandRequest>) {
        let (signal_tx, signal_rx) = signal_channel();
        let (command_tx, command_rx) = mpsc::channel(buffer);
        (
            Self {
                signal_tx,
                command_tx,
            },
            signal_rx,
            command_rx,
        )
    }

    pub fn handle(&self) -> OrchestratorHandle {
        OrchestratorHandle::new(self.command_tx.clone())
    }
}

/// Dispatches signals between the view registry and the orchestrator.
///
/// Server additions and removals are view-registry business: it opens the
/// initial tab or drops the server's views, and the resulting view signals
/// come back through the channel to the orchestrator.
pub struct SignalRouter {
    views: Arc<ViewManager>,
    servers: Arc<dyn ServerRegistry>,
}

impl SignalRouter {
    pub fn new(views: Arc<ViewManager>, servers: Arc<dyn ServerRegistry>) -> Self {
        Self { views, servers }
    }

    pub fn route(&self, orchestrator: &mut TabOrchestrator, signal: HostSignal) {
        match signal {
            HostSignal::ServerAdded { server_id, .. } => match self.servers.get_server(&server_id) {
                Some(server) => {
                    self.views.handle_server_added(&server);
                }
                None => warn!("Server {} vanished before its views were created", server_id),
            },
            HostSignal::ServerRemoved { server_id } => {
                self.views.handle_server_removed(&server_id);
            }
            other => orchestrator.handle_signal(other),
        }
    }
}

/// Run the orchestrator on its own task.
///
/// Pending signals are always handled before the next command so replies
/// reflect every change raised before the command was sent. The task ends
/// when every command sender is gone and hands the orchestrator back.
pub fn spawn_orchestrator(
    mut orchestrator: TabOrchestrator,
    router: SignalRouter,
    mut signal_rx: SignalReceiver,
    mut command_rx: mpsc::Receiver<CommandRequest>,
) -> JoinHandle<TabOrchestrator> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;
                signal = signal_rx.recv() => match signal {
                    Some(signal) => router.route(&mut orchestrator, signal),
                    None => break,
                },
                request = command_rx.recv() => match request {
                    Some((command, reply_tx)) => {
                        let reply = orchestrator.handle_command(command);
                        if reply_tx.send(reply).is_err() {
                            debug!("Command reply dropped, requester went away");
                        }
                    }
                    None => break,
                },
            }
        }

        info!("Tab orchestrator stopped");
        orchestrator
    })
}

/// Client side of the command channel
#[derive(Debug, Clone)]
pub struct OrchestratorHandle {
    command_tx: mpsc::Sender<CommandRequest>,
}

impl OrchestratorHandle {
    pub fn new(command_tx: mpsc::Sender<CommandRequest>) -> Self {
        Self { command_tx }
    }

    pub async fn request(&self, command: TabCommand) -> Result<CommandReply> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.command_tx
            .send((command, reply_tx))
            .await
            .map_err(|_| Error::Internal("tab orchestrator is not running".to_string()))?;
        reply_rx
            .await
            .map_err(|_| Error::Internal("tab orchestrator dropped the request".to_string()))
    }

    pub async fn ordered_tabs(&self, server_id: &ServerId) -> Result<Vec<TabInfo>> {
        match self
            .request(TabCommand::GetOrderedTabsForServer {
                server_id: server_id.clone(),
            })
            .await?
        {
            CommandReply::Tabs(tabs) => Ok(tabs),
            other => Err(unexpected(other)),
        }
    }

    pub async fn active_tab(&self, server_id: &ServerId) -> Result<Option<TabInfo>> {
        match self
            .request(TabCommand::GetActiveTabForServer {
                server_id: server_id.clone(),
            })
            .await?
        {
            CommandReply::ActiveTab(tab) => Ok(tab),
            other => Err(unexpected(other)),
        }
    }

    pub async fn create_new_tab(&self, server_id: &ServerId) -> Result<Option<ViewId>> {
        match self
            .request(TabCommand::CreateNewTab {
                server_id: server_id.clone(),
            })
            .await?
        {
            CommandReply::NewTab(id) => Ok(id),
            other => Err(unexpected(other)),
        }
    }

    /// Send a command that only acknowledges
    pub async fn send(&self, command: TabCommand) -> Result<()> {
        self.request(command).await.map(|_| ())
    }
}

fn unexpected(reply: CommandReply) -> Error {
    Error::Internal(format!("unexpected reply: {:?}", reply))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventBus;
    use crate::overlay::{LoadingScreenOverlay, ModalStack};
    use crate::servers::ServerManager;
    use crate::surface::SurfaceTable;
    use crate::tabs::Collaborators;
    use crate::window::HeadlessWindow;
    use pretty_assertions::assert_eq;

    struct Runtime {
        channels: HostChannels,
        servers: Arc<ServerManager>,
        window: Arc<HeadlessWindow>,
        task: JoinHandle<TabOrchestrator>,
    }

    fn start() -> Runtime {
        let (channels, signal_rx, command_rx) = HostChannels::new(16);
        let servers = Arc::new(ServerManager::new(channels.signal_tx.clone()));
        let views = Arc::new(ViewManager::new(channels.signal_tx.clone()));
        let window = Arc::new(HeadlessWindow::new(1280, 800));

        let mut orchestrator = TabOrchestrator::new(
            Collaborators {
                servers: servers.clone(),
                views: views.clone(),
                surfaces: Arc::new(SurfaceTable::new()),
                loading_screen: Arc::new(LoadingScreenOverlay::new()),
                modals: Arc::new(ModalStack::new()),
            },
            channels.signal_tx.clone(),
            EventBus::default(),
        );
        orchestrator.set_window(window.clone());

        let router = SignalRouter::new(views, servers.clone());
        let task = spawn_orchestrator(orchestrator, router, signal_rx, command_rx);

        Runtime {
            channels,
            servers,
            window,
            task,
        }
    }

    #[tokio::test]
    async fn test_signals_settle_before_commands() {
        let rt = start();
        let handle = rt.channels.handle();

        let server = rt
            .servers
            .add_server("alpha", "https://alpha.example.com")
            .unwrap();

        let tabs = handle.ordered_tabs(&server.id).await.unwrap();
        assert_eq!(tabs.len(), 1);
        assert!(tabs[0].is_active);
        assert_eq!(rt.window.children(), vec![tabs[0].id.clone()]);
    }

    #[tokio::test]
    async fn test_create_and_close_through_handle() {
        let rt = start();
        let handle = rt.channels.handle();
        let server = rt
            .servers
            .add_server("alpha", "https://alpha.example.com")
            .unwrap();

        let created = tokio_test::assert_ok!(handle.create_new_tab(&server.id).await).unwrap();
        let active = handle.active_tab(&server.id).await.unwrap().unwrap();
        assert_eq!(active.id, created);

        handle
            .send(TabCommand::CloseTab {
                view_id: created.clone(),
            })
            .await
            .unwrap();

        let tabs = handle.ordered_tabs(&server.id).await.unwrap();
        assert_eq!(tabs.len(), 1);
        assert_ne!(tabs[0].id, created);
        assert!(tabs[0].is_active);

        let missing = handle
            .create_new_tab(&ServerId::new("missing"))
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_task_stops_when_commands_close() {
        let rt = start();
        let server = rt
            .servers
            .add_server("alpha", "https://alpha.example.com")
            .unwrap();
        // Let the initial tab land before shutting down
        rt.channels.handle().ordered_tabs(&server.id).await.unwrap();

        let Runtime { channels, task, .. } = rt;
        drop(channels);

        let orchestrator = task.await.unwrap();
        assert_eq!(orchestrator.tab_order(&server.id).len(), 1);
    }

    #[tokio::test]
    async fn test_request_after_shutdown_fails() {
        let (channels, signal_rx, command_rx) = HostChannels::new(4);
        drop(signal_rx);
        drop(command_rx);

        let result = channels.handle().ordered_tabs(&ServerId::new("s1")).await;
        assert!(matches!(result, Err(Error::Internal(_))));
    }
}

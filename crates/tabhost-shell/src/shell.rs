//! Headless presentation layer wired to the tab orchestrator

use crate::console::{ConsoleCommand, HELP};
use anyhow::{anyhow, Context, Result};
use serde_json::{json, Value};
use std::sync::Arc;
use tabhost_core::events::raise;
use tabhost_core::{
    spawn_orchestrator, Collaborators, EventBus, HeadlessWindow, HostChannels, HostSignal,
    LoadingScreenOverlay, ModalStack, OrchestratorHandle, RendererMessage, ServerId,
    ServerManager, ServerRegistry, ShellConfig, SignalRouter, SignalSender, Storage,
    SurfaceTable, TabCommand, TabEvent, TabOrchestrator, ViewId, ViewManager, WindowHost,
};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::info;

/// Streams the shell prints as they arrive
pub struct ShellOutputs {
    pub events: broadcast::Receiver<TabEvent>,
    pub renderer: mpsc::UnboundedReceiver<RendererMessage>,
}

/// Collaborators plus the running orchestrator
pub struct Shell {
    servers: Arc<ServerManager>,
    views: Arc<ViewManager>,
    surfaces: Arc<SurfaceTable>,
    window: Arc<HeadlessWindow>,
    signals: SignalSender,
    handle: OrchestratorHandle,
    task: JoinHandle<TabOrchestrator>,
}

impl Shell {
    /// Wire everything up and restore servers. Must run inside a tokio runtime.
    pub fn start(config: &ShellConfig, storage: Option<Arc<Storage>>) -> Result<(Self, ShellOutputs)> {
        let (channels, signal_rx, command_rx) = HostChannels::new(64);
        let (renderer_tx, renderer_rx) = mpsc::unbounded_channel();

        let window = Arc::new(
            HeadlessWindow::new(config.window_width, config.window_height).with_renderer(renderer_tx),
        );
        let mut servers = ServerManager::new(channels.signal_tx.clone());
        if let Some(storage) = storage {
            servers = servers.with_storage(storage);
        }
        let servers = Arc::new(servers);
        let views = Arc::new(ViewManager::new(channels.signal_tx.clone()));
        let surfaces = Arc::new(SurfaceTable::new());

        let bus = EventBus::default();
        let events = bus.subscribe();
        let mut orchestrator = TabOrchestrator::new(
            Collaborators {
                servers: servers.clone(),
                views: views.clone(),
                surfaces: surfaces.clone(),
                loading_screen: Arc::new(LoadingScreenOverlay::new().with_window(window.clone())),
                modals: Arc::new(ModalStack::new()),
            },
            channels.signal_tx.clone(),
            bus,
        )
        .with_tab_bar_height(config.tab_bar_height);
        orchestrator.set_window(window.clone());

        let router = SignalRouter::new(views.clone(), servers.clone());
        let task = spawn_orchestrator(orchestrator, router, signal_rx, command_rx);

        let restored = servers
            .init(&config.predefined_servers)
            .context("failed to restore servers")?;
        info!("Shell started with {} servers", restored);

        let shell = Self {
            servers,
            views,
            surfaces,
            window,
            signals: channels.signal_tx.clone(),
            handle: channels.handle(),
            task,
        };
        let outputs = ShellOutputs {
            events,
            renderer: renderer_rx,
        };
        Ok((shell, outputs))
    }

    fn current_server(&self) -> Result<ServerId> {
        self.servers
            .current_server_id()
            .ok_or_else(|| anyhow!("no server configured; use add-server first"))
    }

    fn resolve_server(&self, token: &str) -> Result<ServerId> {
        self.servers
            .ordered_servers()
            .into_iter()
            .find(|s| s.id.as_str() == token || s.name == token)
            .map(|s| s.id)
            .ok_or_else(|| anyhow!("no server named {}", token))
    }

    /// A tab of the current server by 1-based position or id prefix
    async fn resolve_tab(&self, token: &str) -> Result<ViewId> {
        let tabs = self.handle.ordered_tabs(&self.current_server()?).await?;
        let found = match token.parse::<usize>() {
            Ok(position) if position >= 1 => tabs.get(position - 1),
            _ => tabs.iter().find(|tab| tab.id.as_str().starts_with(token)),
        };
        found
            .map(|tab| tab.id.clone())
            .ok_or_else(|| anyhow!("no tab {} on the current server", token))
    }

    /// Run one console command and describe the outcome
    pub async fn execute(&self, command: ConsoleCommand) -> Result<Value> {
        let value = match command {
            ConsoleCommand::AddServer { name, url } => {
                json!(self.servers.add_server(&name, &url)?)
            }
            ConsoleCommand::RemoveServer(token) => {
                let id = self.resolve_server(&token)?;
                self.servers.remove_server(&id)?;
                json!({ "removed": id })
            }
            ConsoleCommand::SwitchServer(token) => {
                let id = self.resolve_server(&token)?;
                self.servers.switch_server(&id)?;
                json!({ "currentServer": id })
            }
            ConsoleCommand::Servers => json!({
                "servers": self.servers.ordered_servers(),
                "currentServer": self.servers.current_server_id(),
            }),
            ConsoleCommand::NewTab => {
                let view_id = self.handle.create_new_tab(&self.current_server()?).await?;
                json!({ "viewId": view_id })
            }
            ConsoleCommand::Switch(token) => {
                let view_id = self.resolve_tab(&token).await?;
                self.handle.send(TabCommand::SwitchTab { view_id }).await?;
                Value::Null
            }
            ConsoleCommand::Close(token) => {
                let view_id = self.resolve_tab(&token).await?;
                self.handle.send(TabCommand::CloseTab { view_id }).await?;
                Value::Null
            }
            ConsoleCommand::Next => {
                self.handle.send(TabCommand::NextTab).await?;
                Value::Null
            }
            ConsoleCommand::Prev => {
                self.handle.send(TabCommand::PreviousTab).await?;
                Value::Null
            }
            ConsoleCommand::Order(tokens) => {
                let mut view_ids = Vec::with_capacity(tokens.len());
                for token in &tokens {
                    view_ids.push(self.resolve_tab(token).await?);
                }
                let server_id = self.current_server()?;
                self.handle
                    .send(TabCommand::UpdateTabOrder {
                        server_id,
                        view_ids,
                    })
                    .await?;
                Value::Null
            }
            ConsoleCommand::Tabs => {
                json!(self.handle.ordered_tabs(&self.current_server()?).await?)
            }
            ConsoleCommand::Login => {
                self.servers.set_logged_in(&self.current_server()?, true);
                Value::Null
            }
            ConsoleCommand::Logout => {
                self.servers.set_logged_in(&self.current_server()?, false);
                Value::Null
            }
            ConsoleCommand::Loaded(token) => {
                let view_id = self.resolve_tab(&token).await?;
                self.surfaces.commit_load(&view_id);
                self.surfaces.finish_load(&view_id);
                Value::Null
            }
            ConsoleCommand::Failed { tab, error } => {
                let view_id = self.resolve_tab(&tab).await?;
                self.surfaces.fail_load(&view_id, &error);
                Value::Null
            }
            ConsoleCommand::Resize { width, height } => {
                let bounds = self.window.resize(width, height);
                raise(&self.signals, HostSignal::WindowResized { bounds });
                json!(bounds)
            }
            ConsoleCommand::Focus => {
                self.window.focus();
                raise(&self.signals, HostSignal::WindowFocused);
                Value::Null
            }
            ConsoleCommand::Reload => {
                self.handle.send(TabCommand::ReloadCurrentTab).await?;
                Value::Null
            }
            ConsoleCommand::Find => {
                self.handle.send(TabCommand::FindInPage).await?;
                Value::Null
            }
            ConsoleCommand::Title { tab, title } => {
                let view_id = self.resolve_tab(&tab).await?;
                self.views.update_view_title(&view_id, &title)?;
                Value::Null
            }
            ConsoleCommand::Help => Value::String(HELP.to_string()),
            ConsoleCommand::Quit => Value::Null,
        };
        Ok(value)
    }

    /// Surfaces attached to the window right now
    pub fn attached(&self) -> Vec<ViewId> {
        self.window.children()
    }

    /// Stop the orchestrator and wait for it to finish
    pub async fn shutdown(self) -> Result<()> {
        let Shell { handle, task, .. } = self;
        drop(handle);
        let orchestrator = task.await.context("tab orchestrator panicked")?;
        info!(
            "Tab orchestrator shut down, visible surface: {:?}",
            orchestrator.visible_surface()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::parse;
    use pretty_assertions::assert_eq;

    async fn run(shell: &Shell, line: &str) -> Value {
        let command = parse(line).unwrap().unwrap();
        shell.execute(command).await.unwrap()
    }

    async fn tab_ids(shell: &Shell) -> Vec<String> {
        run(shell, "tabs")
            .await
            .as_array()
            .unwrap()
            .iter()
            .map(|tab| tab["id"].as_str().unwrap().to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_tab_session() {
        let (shell, _outputs) = Shell::start(&ShellConfig::default(), None).unwrap();

        run(&shell, "add-server alpha https://alpha.example.com").await;
        run(&shell, "new-tab").await;
        run(&shell, "new-tab").await;

        let ids = tab_ids(&shell).await;
        assert_eq!(ids.len(), 3);
        assert_eq!(shell.attached(), vec![ViewId::new(ids[2].clone())]);

        run(&shell, "next").await;
        let tabs = run(&shell, "tabs").await;
        assert_eq!(tabs[0]["isActive"], true);

        run(&shell, "order 3 1 2").await;
        let reordered = tab_ids(&shell).await;
        assert_eq!(reordered, vec![ids[2].clone(), ids[0].clone(), ids[1].clone()]);

        run(&shell, "close 2").await;
        let remaining = tab_ids(&shell).await;
        assert_eq!(remaining, vec![ids[2].clone(), ids[1].clone()]);
        assert_eq!(shell.attached().len(), 1);

        shell.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_events_and_renderer_messages_stream_out() {
        let (shell, mut outputs) = Shell::start(&ShellConfig::default(), None).unwrap();

        run(&shell, "add-server alpha https://alpha.example.com").await;
        run(&shell, "tabs").await;
        run(&shell, "title 1 Town Square").await;
        run(&shell, "tabs").await;

        let first = outputs.events.recv().await.unwrap();
        assert!(matches!(first, TabEvent::ActiveTabChanged { .. }));

        let mut titles = Vec::new();
        while let Ok(message) = outputs.renderer.try_recv() {
            if let RendererMessage::UpdateTabTitle { title, .. } = message {
                titles.push(title);
            }
        }
        assert_eq!(titles, vec!["Town Square".to_string()]);
    }

    #[tokio::test]
    async fn test_commands_without_server_fail() {
        let (shell, _outputs) = Shell::start(&ShellConfig::default(), None).unwrap();

        let err = shell.execute(ConsoleCommand::NewTab).await.unwrap_err();
        assert!(err.to_string().contains("add-server"));
        assert!(shell
            .execute(ConsoleCommand::SwitchServer("nowhere".to_string()))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_servers_persist_across_restarts() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = ShellConfig {
            data_dir: Some(dir.path().to_path_buf()),
            ..ShellConfig::default()
        };

        {
            let storage = Arc::new(Storage::new_with_path(config.data_dir()).unwrap());
            let (shell, _outputs) = Shell::start(&config, Some(storage)).unwrap();
            run(&shell, "add-server alpha https://alpha.example.com").await;
            run(&shell, "add-server beta https://beta.example.com").await;
            run(&shell, "switch-server alpha").await;
            shell.shutdown().await.unwrap();
        }

        let storage = Arc::new(Storage::new_with_path(config.data_dir()).unwrap());
        let (shell, _outputs) = Shell::start(&config, Some(storage)).unwrap();
        let servers = run(&shell, "servers").await;

        let names: Vec<&str> = servers["servers"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["alpha", "beta"]);
        assert_eq!(servers["currentServer"], servers["servers"][0]["id"]);

        // The restored current server gets its initial tab composited
        assert_eq!(tab_ids(&shell).await.len(), 1);
        assert_eq!(shell.attached().len(), 1);
    }
}

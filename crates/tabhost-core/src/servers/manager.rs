//! In-memory server registry with optional persistence

use super::ServerRegistry;
use crate::error::{Error, Result, ServerError};
use crate::events::{raise, HostSignal, SignalSender};
use crate::storage::{self, Storage};
use crate::types::{is_valid_server_url, Server, ServerConfig, ServerId};
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Settings key remembering the last current server
const LAST_ACTIVE_SERVER_KEY: &str = "last_active_server";

#[derive(Debug, Default)]
struct ServerState {
    /// Servers in display order, predefined ones first
    servers: IndexMap<ServerId, Server>,
    current: Option<ServerId>,
}

/// Owns configured servers, the current selection and login state.
///
/// Mutations update memory and raise their signals before anything is
/// written to storage. A storage error is returned to the caller after the
/// change has already taken effect in the running shell.
pub struct ServerManager {
    state: RwLock<ServerState>,
    signals: SignalSender,
    storage: Option<Arc<Storage>>,
}

impl ServerManager {
    pub fn new(signals: SignalSender) -> Self {
        Self {
            state: RwLock::new(ServerState::default()),
            signals,
            storage: None,
        }
    }

    /// Persist user-added servers and the current selection
    pub fn with_storage(mut self, storage: Arc<Storage>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Load predefined servers from configuration, then persisted ones.
    ///
    /// Duplicates (same name and URL) are dropped. The last active server is
    /// restored when it still exists, otherwise the first server becomes
    /// current.
    pub fn init(&self, predefined: &[ServerConfig]) -> Result<usize> {
        let mut initial: Vec<Server> = predefined
            .iter()
            .map(|config| Server::new(&config.name, &config.url).predefined())
            .collect();

        let mut last_active = None;
        if let Some(storage) = &self.storage {
            let conn = storage.connection()?;
            initial.extend(storage::list_servers(&conn)?);
            last_active = storage::get_setting(&conn, LAST_ACTIVE_SERVER_KEY)?.map(ServerId::from);
        }

        let mut seen = std::collections::HashSet::new();
        initial.retain(|server| seen.insert(format!("{}:{}", server.name, server.url)));

        let current = last_active
            .filter(|id| initial.iter().any(|s| &s.id == id))
            .or_else(|| initial.first().map(|s| s.id.clone()));

        {
            let mut state = self.state.write();
            state.servers.clear();
            state.current = current.clone();
            for server in &initial {
                state.servers.insert(server.id.clone(), server.clone());
            }
        }

        info!("Loaded {} servers", initial.len());

        for server in &initial {
            raise(
                &self.signals,
                HostSignal::ServerAdded {
                    server_id: server.id.clone(),
                    set_as_current: current.as_ref() == Some(&server.id),
                },
            );
        }

        Ok(initial.len())
    }

    pub fn has_servers(&self) -> bool {
        !self.state.read().servers.is_empty()
    }

    /// All servers in display order
    pub fn ordered_servers(&self) -> Vec<Server> {
        self.state.read().servers.values().cloned().collect()
    }

    /// Add a user server and make it current
    pub fn add_server(&self, name: &str, url: &str) -> Result<Server> {
        if !is_valid_server_url(url) {
            return Err(Error::Server(ServerError::InvalidUrl(url.to_string())));
        }

        let server = Server::new(name, url);
        debug!("addServer {} ({})", server.id, server.name);

        {
            let mut state = self.state.write();
            state.servers.insert(server.id.clone(), server.clone());
            state.current = Some(server.id.clone());
        }

        raise(
            &self.signals,
            HostSignal::ServerAdded {
                server_id: server.id.clone(),
                set_as_current: true,
            },
        );
        self.persist()?;

        Ok(server)
    }

    /// Remove a server; the neighbouring server becomes current if needed
    pub fn remove_server(&self, id: &ServerId) -> Result<()> {
        let next_current = {
            let mut state = self.state.write();
            let index = state
                .servers
                .get_index_of(id)
                .ok_or_else(|| Error::Server(ServerError::NotFound(id.to_string())))?;

            state.servers.shift_remove(id);

            if state.current.as_ref() == Some(id) {
                let next = index
                    .checked_sub(1)
                    .and_then(|i| state.servers.get_index(i))
                    .or_else(|| state.servers.get_index(index))
                    .map(|(id, _)| id.clone());
                state.current = None;
                next
            } else {
                None
            }
        };

        info!("Removed server {}", id);

        if let Some(next) = next_current {
            self.select(&next)?;
        }
        raise(&self.signals, HostSignal::ServerRemoved { server_id: id.clone() });

        if let Some(storage) = &self.storage {
            let conn = storage.connection()?;
            storage::delete_server(&conn, id)?;
        }
        self.persist()
    }

    /// Make a server current
    pub fn switch_server(&self, id: &ServerId) -> Result<()> {
        if self.select(id)? {
            self.persist()?;
        }
        Ok(())
    }

    /// Update the in-memory selection; `false` when it was already current
    fn select(&self, id: &ServerId) -> Result<bool> {
        {
            let mut state = self.state.write();
            if !state.servers.contains_key(id) {
                return Err(Error::Server(ServerError::NotFound(id.to_string())));
            }
            if state.current.as_ref() == Some(id) {
                return Ok(false);
            }
            state.current = Some(id.clone());
        }

        debug!("updateCurrentServer {}", id);
        raise(&self.signals, HostSignal::ServerSwitched { server_id: id.clone() });
        Ok(true)
    }

    /// Record a login state change reported by the server's session
    pub fn set_logged_in(&self, id: &ServerId, logged_in: bool) {
        {
            let mut state = self.state.write();
            match state.servers.get_mut(id) {
                Some(server) => server.is_logged_in = logged_in,
                None => {
                    warn!("setLoggedIn: server {} not found", id);
                    return;
                }
            }
        }

        raise(
            &self.signals,
            HostSignal::ServerLoggedInChanged {
                server_id: id.clone(),
                logged_in,
            },
        );
    }

    /// Reorder user servers; predefined servers stay in front
    pub fn update_server_order(&self, order: &[ServerId]) -> Result<()> {
        {
            let mut state = self.state.write();
            let mut reordered: IndexMap<ServerId, Server> = state
                .servers
                .iter()
                .filter(|(_, s)| s.is_predefined)
                .map(|(id, s)| (id.clone(), s.clone()))
                .collect();

            for id in order {
                if let Some(server) = state.servers.get(id) {
                    if !server.is_predefined {
                        reordered.insert(id.clone(), server.clone());
                    }
                }
            }

            // Keep servers the caller forgot about at the end
            for (id, server) in state.servers.iter() {
                if !reordered.contains_key(id) {
                    reordered.insert(id.clone(), server.clone());
                }
            }

            state.servers = reordered;
        }

        self.persist()
    }

    fn persist(&self) -> Result<()> {
        let Some(storage) = &self.storage else {
            return Ok(());
        };

        let (servers, current) = {
            let state = self.state.read();
            let servers: Vec<Server> = state
                .servers
                .values()
                .filter(|s| !s.is_predefined)
                .cloned()
                .collect();
            (servers, state.current.clone())
        };

        let conn = storage.connection()?;
        for (index, server) in servers.iter().enumerate() {
            storage::upsert_server(&conn, server, index)?;
        }
        match current {
            Some(id) => storage::set_setting(&conn, LAST_ACTIVE_SERVER_KEY, id.as_str())?,
            None => storage::delete_setting(&conn, LAST_ACTIVE_SERVER_KEY)?,
        }

        Ok(())
    }
}

impl ServerRegistry for ServerManager {
    fn get_server(&self, id: &ServerId) -> Option<Server> {
        self.state.read().servers.get(id).cloned()
    }

    fn current_server_id(&self) -> Option<ServerId> {
        self.state.read().current.clone()
    }
}

//! Requests the presentation layer sends to the orchestrator

use super::TabOrchestrator;
use crate::types::{ServerId, TabInfo, ViewId};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Request from the presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum TabCommand {
    GetOrderedTabsForServer { server_id: ServerId },
    GetActiveTabForServer { server_id: ServerId },
    CreateNewTab { server_id: ServerId },
    SwitchTab { view_id: ViewId },
    CloseTab { view_id: ViewId },
    UpdateTabOrder { server_id: ServerId, view_ids: Vec<ViewId> },
    NextTab,
    PreviousTab,
    FocusCurrentTab,
    ReloadCurrentTab,
    FindInPage,
}

/// Answer to a [`TabCommand`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "kebab-case")]
pub enum CommandReply {
    Tabs(Vec<TabInfo>),
    ActiveTab(Option<TabInfo>),
    NewTab(Option<ViewId>),
    Done,
}

impl TabOrchestrator {
    /// Execute a presentation-layer request
    pub fn handle_command(&mut self, command: TabCommand) -> CommandReply {
        debug!("handle_command {:?}", command);
        match command {
            TabCommand::GetOrderedTabsForServer { server_id } => {
                CommandReply::Tabs(self.ordered_tabs_for_server(&server_id))
            }
            TabCommand::GetActiveTabForServer { server_id } => CommandReply::ActiveTab(
                self.ordered_tabs_for_server(&server_id)
                    .into_iter()
                    .find(|tab| tab.is_active),
            ),
            TabCommand::CreateNewTab { server_id } => {
                CommandReply::NewTab(self.create_new_tab(&server_id))
            }
            TabCommand::SwitchTab { view_id } => {
                self.switch_to_tab(&view_id);
                CommandReply::Done
            }
            TabCommand::CloseTab { view_id } => {
                self.close_tab(&view_id);
                CommandReply::Done
            }
            TabCommand::UpdateTabOrder {
                server_id,
                view_ids,
            } => {
                self.update_tab_order(server_id, view_ids);
                CommandReply::Done
            }
            TabCommand::NextTab => {
                self.switch_to_next_tab();
                CommandReply::Done
            }
            TabCommand::PreviousTab => {
                self.switch_to_previous_tab();
                CommandReply::Done
            }
            TabCommand::FocusCurrentTab => {
                self.focus_current_tab();
                CommandReply::Done
            }
            TabCommand::ReloadCurrentTab => {
                self.reload_current_tab();
                CommandReply::Done
            }
            TabCommand::FindInPage => {
                self.send_to_find();
                CommandReply::Done
            }
        }
    }
}

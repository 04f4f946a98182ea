use anyhow::{bail, Context};
use serde::Serialize;
use serde_json::Value;
use so_core::form::FieldValue;
use so_core::marketplace::MarketView;

use super::parse::{Command, HELP};
use crate::runtime::ShellRuntime;

/// Which orchestrator the shell is driving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Flow {
    #[default]
    Auth,
    Market,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Snapshot(Value),
    Text(&'static str),
    Quit,
}

pub struct Shell<'a> {
    runtime: &'a ShellRuntime,
    flow: Flow,
}

fn snapshot_reply<T: Serialize>(snapshot: &T) -> anyhow::Result<Reply> {
    let value = serde_json::to_value(snapshot).context("Failed to serialize snapshot")?;
    Ok(Reply::Snapshot(value))
}

impl<'a> Shell<'a> {
    pub fn new(runtime: &'a ShellRuntime) -> Self {
        Self {
            runtime,
            flow: Flow::default(),
        }
    }

    pub fn flow(&self) -> Flow {
        self.flow
    }

    pub async fn execute(&mut self, command: Command) -> anyhow::Result<Reply> {
        match command {
            Command::Help => return Ok(Reply::Text(HELP)),
            Command::Quit => return Ok(Reply::Quit),
            Command::Auth => self.flow = Flow::Auth,
            Command::Market => self.flow = Flow::Market,
            _ => {}
        }

        match self.flow {
            Flow::Auth => self.run_auth(command).await,
            Flow::Market => self.run_market(command).await,
        }
    }

    async fn run_auth(&self, command: Command) -> anyhow::Result<Reply> {
        let flow = self.runtime.auth_flow();
        let snapshot = match command {
            Command::View | Command::Auth => flow.snapshot().await,
            Command::Set { field, value } => {
                flow.set_field(field, FieldValue::from_input(field, &value)?)
                    .await?
            }
            Command::Signup => flow.show_signup().await?,
            Command::Login => flow.show_login().await?,
            Command::Submit => flow.submit().await?,
            Command::EditProfile => flow.open_profile_editor().await?,
            Command::Cancel | Command::Back => flow.cancel_edit().await?,
            Command::Logout => flow.logout().await?,
            other => bail!(
                "`{}` is a marketplace command; run `market` first",
                other.name()
            ),
        };
        snapshot_reply(&snapshot)
    }

    async fn run_market(&self, command: Command) -> anyhow::Result<Reply> {
        let flow = self.runtime.marketplace();
        let snapshot = match command {
            Command::View | Command::Market => flow.snapshot().await,
            Command::Set { field, value } => {
                flow.set_field(field, FieldValue::from_input(field, &value)?)
                    .await?
            }
            Command::Role(role) => flow.choose_role(role).await?,
            Command::Signup => flow.show_signup().await?,
            Command::Login => flow.show_login().await?,
            Command::Submit | Command::Request => flow.submit().await?,
            Command::Browse => flow.browse().await?,
            Command::Pick(celebrity_id) => flow.select_celebrity(celebrity_id).await?,
            Command::Requests => flow.refresh_requests().await,
            Command::Accept(request_id) => flow.accept(request_id).await?,
            Command::Reject { id, reason } => flow.reject(id, reason).await?,
            Command::Record(request_id) => flow.record_for(request_id).await?,
            Command::Send => flow.send_video().await?,
            Command::Family => flow.record_family_video().await?,
            Command::Share => flow.generate_share_link().await?,
            Command::Back => {
                let view = flow.snapshot().await.view;
                match view {
                    MarketView::Login { .. } | MarketView::Signup { .. } => {
                        flow.back_home().await?
                    }
                    _ => flow.back().await?,
                }
            }
            Command::Logout => flow.logout().await?,
            other => bail!(
                "`{}` belongs to the auth flow; run `auth` first",
                other.name()
            ),
        };
        snapshot_reply(&snapshot)
    }
}

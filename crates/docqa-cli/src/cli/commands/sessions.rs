//! Conversation management command handlers.

use anyhow::{Result, bail};
use docqa_client::{UiEvent, notifications};

use crate::cli::client::{self, Client};

pub fn list(client: &Client) {
    let session = &client.state.session;
    if session.sessions.is_empty() {
        println!("No conversations found.");
        return;
    }
    for s in &session.sessions {
        let marker = if session.is_active(&s.session_id) {
            '*'
        } else {
            ' '
        };
        println!("{marker} {}  {}  {}", s.session_id, s.title(), s.created_at);
    }
}

pub async fn select(client: &mut Client, id: &str) -> Result<()> {
    ensure_known(client, id)?;
    client.dispatch(UiEvent::SelectSession {
        session_id: id.to_string(),
    });
    client::settle(client).await?;
    if let Some(active) = &client.state.session.active_file {
        println!("Active: {} [{}]", active.file_name, active.session_id);
    }
    Ok(())
}

pub async fn new(client: &mut Client) -> Result<()> {
    client.dispatch(UiEvent::NewConversation);
    client::settle(client).await?;
    println!("No active conversation. Upload a document to start one.");
    Ok(())
}

pub async fn delete(client: &mut Client, id: &str) -> Result<()> {
    ensure_known(client, id)?;
    client.dispatch(UiEvent::DeleteConversation {
        session_id: id.to_string(),
    });
    client::settle(client).await
}

/// Unknown ids are ignored by the client state; the CLI reports them.
pub(super) fn ensure_known(client: &Client, id: &str) -> Result<()> {
    let session = &client.state.session;
    if !session.is_authenticated() {
        bail!(notifications::SIGN_IN_TO_MANAGE);
    }
    if session.find(id).is_none() {
        bail!("Unknown conversation '{id}'. Run `docqa sessions list` to see known ids.");
    }
    Ok(())
}

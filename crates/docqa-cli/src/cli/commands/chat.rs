//! Document and question command handlers.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use docqa_client::{UiEvent, notifications};
use docqa_core::model::Sender;
use docqa_core::service::UploadFile;

use super::sessions::ensure_known;
use crate::cli::client::{self, Client};

const NO_ACTIVE: &str =
    "No active conversation. Upload a document or run `docqa sessions select <id>`.";

pub async fn upload(client: &mut Client, path: &Path) -> Result<()> {
    let file = UploadFile::from_path(path)?;
    if file.is_empty() {
        bail!("{} is empty", path.display());
    }

    client.dispatch(UiEvent::UploadFile { file: Some(file) });
    client::settle(client).await?;

    if let Some(active) = &client.state.session.active_file {
        println!("Active: {} [{}]", active.file_name, active.session_id);
    }
    Ok(())
}

pub async fn ask(client: &mut Client, question: &str) -> Result<()> {
    let question = question.trim();
    if question.is_empty() {
        bail!("Question is empty");
    }
    let session = &client.state.session;
    if session.is_authenticated() && session.active_session_id().is_none() {
        bail!(NO_ACTIVE);
    }

    client.dispatch(UiEvent::InputChanged(question.to_string()));
    client.dispatch(UiEvent::SubmitInput);
    client::settle(client).await?;

    match client.state.messages().last() {
        Some(answer) if answer.sender == Sender::Assistant => {
            println!("{}", answer.content);
            Ok(())
        }
        _ => bail!(notifications::SEND_FAILED),
    }
}

pub async fn history(client: &mut Client, id: Option<&str>) -> Result<()> {
    let session_id = match id {
        Some(id) => {
            ensure_known(client, id)?;
            id.to_string()
        }
        None => {
            let session = &client.state.session;
            if !session.is_authenticated() {
                bail!(notifications::SIGN_IN_TO_MANAGE);
            }
            session.active_session_id().context(NO_ACTIVE)?.to_string()
        }
    };

    if client.state.session.is_active(&session_id) {
        client.dispatch(UiEvent::LoadConversation {
            session_id: Some(session_id),
        });
    } else {
        client.dispatch(UiEvent::SelectSession { session_id });
    }
    client::settle(client).await?;

    let messages = client.state.messages();
    if messages.is_empty() {
        println!("No messages yet.");
    }
    for message in messages {
        println!("{}: {}", message.sender, message.content);
    }
    Ok(())
}

pub async fn export(client: &mut Client, id: &str, output: Option<&Path>) -> Result<()> {
    ensure_known(client, id)?;
    client.dispatch(UiEvent::ExportConversation {
        session_id: id.to_string(),
    });
    client::settle(client).await?;

    let export = client
        .state
        .take_export()
        .context(notifications::EXPORT_FAILED)?;
    let path = output.map_or_else(
        || PathBuf::from(format!("conversation_{}.pdf", export.session_id)),
        Path::to_path_buf,
    );
    fs::write(&path, &export.bytes)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Exported to {}", path.display());
    Ok(())
}

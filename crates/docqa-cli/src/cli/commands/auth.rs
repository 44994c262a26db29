//! Sign-in command handlers.

use anyhow::Result;
use docqa_client::UiEvent;
use docqa_core::service::Credential;

use crate::cli::client::{self, Client};

pub async fn login(client: &mut Client, sub: String, email: String, name: String) -> Result<()> {
    client.dispatch(UiEvent::Authenticate {
        credential: Credential {
            sub,
            name,
            email,
            email_verified: true,
        },
    });
    client::settle(client).await?;

    let session = &client.state.session;
    if let Some(user) = &session.user {
        println!("Signed in as {}", display_user(&user.name, &user.email));
        println!("{} conversation(s)", session.sessions.len());
    }
    Ok(())
}

pub async fn logout(client: &mut Client) -> Result<()> {
    client.dispatch(UiEvent::Logout);
    client::settle(client).await
}

pub fn whoami(client: &Client) {
    let session = &client.state.session;
    let Some(user) = &session.user else {
        println!("Not signed in.");
        return;
    };
    println!("{} ({})", display_user(&user.name, &user.email), user.id);
    match &session.active_file {
        Some(active) => println!("Active: {} [{}]", active.file_name, active.session_id),
        None => println!("Active: none"),
    }
}

fn display_user(name: &str, email: &str) -> String {
    if name.trim().is_empty() {
        email.to_string()
    } else {
        format!("{name} <{email}>")
    }
}

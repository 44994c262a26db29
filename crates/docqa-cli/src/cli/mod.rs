//! CLI entry and dispatch.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use docqa_core::{config, logging};

mod client;
mod commands;

#[derive(Parser)]
#[command(name = "docqa")]
#[command(version)]
#[command(about = "Ask questions about your documents")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Sign in with identity claims
    Login {
        /// Stable subject identifier of the account
        #[arg(long)]
        sub: String,
        /// Account email
        #[arg(long)]
        email: String,
        /// Display name
        #[arg(long, default_value = "")]
        name: String,
    },
    /// Sign out and forget the saved session list
    Logout,
    /// Show the signed-in user and active document
    Whoami,

    /// Manage conversations
    Sessions {
        #[command(subcommand)]
        command: SessionCommands,
    },

    /// Upload a document and start a conversation about it
    Upload {
        /// Path of the document to upload
        #[arg(value_name = "PATH")]
        path: PathBuf,
    },
    /// Ask a question about the active document
    Ask {
        /// The question to ask
        #[arg(value_name = "QUESTION", required = true, num_args = 1..)]
        question: Vec<String>,
    },
    /// Show the message history of a conversation
    History {
        /// Conversation to show (defaults to the active one)
        #[arg(value_name = "SESSION_ID")]
        id: Option<String>,
    },
    /// Export a conversation as PDF
    Export {
        /// Conversation to export
        #[arg(value_name = "SESSION_ID")]
        id: String,
        /// Where to write the PDF
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum SessionCommands {
    /// Lists known conversations
    List,
    /// Makes a conversation the active one
    Select {
        #[arg(value_name = "SESSION_ID")]
        id: String,
    },
    /// Clears the active conversation
    New,
    /// Deletes a conversation and its document
    Delete {
        #[arg(value_name = "SESSION_ID")]
        id: String,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // Config commands must work even when the config file is broken.
    let command = match cli.command {
        Commands::Config { command } => return config_command(command),
        command => command,
    };

    let config = config::Config::load().context("load config")?;
    let _log_guard = logging::init(&config).context("init logging")?;

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("create tokio runtime")?;

    rt.block_on(async move { dispatch(command, &config).await })
}

fn config_command(command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Path => {
            commands::config::path();
            Ok(())
        }
        ConfigCommands::Init => commands::config::init(),
    }
}

async fn dispatch(command: Commands, config: &config::Config) -> Result<()> {
    let mut client = client::open(config)?;

    match command {
        Commands::Login { sub, email, name } => {
            commands::auth::login(&mut client, sub, email, name).await
        }
        Commands::Logout => commands::auth::logout(&mut client).await,
        Commands::Whoami => {
            commands::auth::whoami(&client);
            Ok(())
        }

        Commands::Sessions { command } => match command {
            SessionCommands::List => {
                commands::sessions::list(&client);
                Ok(())
            }
            SessionCommands::Select { id } => commands::sessions::select(&mut client, &id).await,
            SessionCommands::New => commands::sessions::new(&mut client).await,
            SessionCommands::Delete { id } => commands::sessions::delete(&mut client, &id).await,
        },

        Commands::Upload { path } => commands::chat::upload(&mut client, &path).await,
        Commands::Ask { question } => commands::chat::ask(&mut client, &question.join(" ")).await,
        Commands::History { id } => commands::chat::history(&mut client, id.as_deref()).await,
        Commands::Export { id, output } => {
            commands::chat::export(&mut client, &id, output.as_deref()).await
        }

        Commands::Config { command } => config_command(command),
    }
}

//! Builds the client runtime for one CLI invocation and reports its notices.

use anyhow::{Context, Result, bail};
use docqa_client::{ClientRuntime, Notification, Severity};
use docqa_core::config::Config;
use docqa_core::service::HttpDocumentService;
use docqa_core::snapshot::{FileSnapshotStore, MemorySnapshotStore, SnapshotStore};
use tracing::debug;

pub type Client = ClientRuntime<HttpDocumentService, Box<dyn SnapshotStore>>;

/// Opens a runtime over the configured service with the persisted snapshot
/// restored. With persistence disabled every invocation starts signed out.
pub fn open(config: &Config) -> Result<Client> {
    let service = HttpDocumentService::from_config(config).context("build document service")?;
    let store: Box<dyn SnapshotStore> = if config.persistence.enabled {
        Box::new(FileSnapshotStore::default_location())
    } else {
        debug!("snapshot persistence disabled");
        Box::new(MemorySnapshotStore::new())
    };

    let mut client = ClientRuntime::new(service, store);
    client.restore();
    Ok(client)
}

/// Drives every in-flight task to completion, then reports notices.
///
/// Success and info notices go to stderr. The first warning or error fails
/// the command.
pub async fn settle(client: &mut Client) -> Result<()> {
    client.run_until_idle().await;
    report(client.take_notifications())
}

fn report(notices: Vec<Notification>) -> Result<()> {
    let mut failure: Option<String> = None;
    for notice in notices {
        match notice.severity {
            Severity::Success | Severity::Info => eprintln!("{}", notice.message),
            Severity::Warning | Severity::Error if failure.is_none() => {
                failure = Some(notice.message);
            }
            Severity::Warning | Severity::Error => eprintln!("{notice}"),
        }
    }
    match failure {
        Some(message) => bail!(message),
        None => Ok(()),
    }
}

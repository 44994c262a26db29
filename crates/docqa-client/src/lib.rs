//! Conversation and session state for the DocQA client.
//!
//! State lives in a single [`AppState`] that only [`update::update`] mutates.
//! The reducer returns [`UiEffect`]s; [`ClientRuntime`] executes them against
//! a [`docqa_core::service::DocumentService`] and a
//! [`docqa_core::snapshot::SnapshotStore`], feeding results back as events.

pub mod common;
pub mod effects;
pub mod error;
pub mod events;
pub mod features;
pub mod mutations;
pub mod runtime;
pub mod state;
pub mod update;

pub use effects::UiEffect;
pub use error::ClientError;
pub use events::UiEvent;
pub use features::notifications::{Notification, Severity};
pub use features::{conversation, notifications, session, upload};
pub use runtime::ClientRuntime;
pub use state::{AppState, ExportedConversation};

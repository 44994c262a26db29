//! Feature slices of the client state.

pub mod conversation;
pub mod notifications;
pub mod session;
pub mod upload;

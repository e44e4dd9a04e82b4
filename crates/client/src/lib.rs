//! Client side of the Shipyard API.
//!
//! [`ApiClient`] wraps every HTTP endpoint, [`StatusPoller`] follows a
//! deployment until it settles, and [`ProjectEditor`] keeps a project's file
//! map in sync while it is edited.

pub mod client;
pub mod editor;
pub mod error;
pub mod models;
pub mod poller;

pub use client::ApiClient;
pub use editor::{ProjectEditor, ProjectStore};
pub use error::ClientError;
pub use poller::{DeploymentSource, StatusPoller};

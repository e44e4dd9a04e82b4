//! Domain types shared by the Shipyard server, store, and client.
//!
//! Nothing here touches the database or the network: status machines,
//! validation helpers, and constants only.

pub mod deployment;
pub mod environment;
pub mod error;
pub mod generation;
pub mod project;
pub mod types;

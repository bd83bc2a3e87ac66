//! Registration hub for Pact
//!
//! Replaces runtime discovery with an explicit compose step. A
//! [`HubBuilder`] takes a [`HubConfig`], the contract sets of each namespace
//! and the implementations to wrap; [`HubBuilder::build`] resolves every
//! implementation's stages ahead of time and returns an immutable [`Hub`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod hub;

pub use config::{HubConfig, ModuleConfig, NamespaceConfig, CONFIG_FILE_NAME};
pub use hub::{Hub, HubBuilder};

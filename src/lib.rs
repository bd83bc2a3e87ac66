//! Pact - contract-wrapped dispatch for plugin implementations
//!
//! Pact wraps independently-authored functions with layered contracts: pre
//! stages that validate or rewrite arguments, an optional override that
//! replaces the call, and post stages that transform the result. The wrapped
//! function never knows contracts exist, and callers see a single callable.
//!
//! # Quick Start
//!
//! ```ignore
//! use pact::{Args, Contract, ContractSet, Hub, HubConfig, Implementation, PreHook, Target};
//!
//! let contracts = ContractSet::new().with(
//!     Contract::new("test").pre("ping", PreHook::sync(|ctx| {
//!         ctx.argument("a")?;
//!         Ok(())
//!     })),
//! );
//!
//! let hub = Hub::builder(HubConfig::default())
//!     .contracts("mods", contracts)
//!     .register(Implementation::plain(Target::new("mods.test", "ping", sig), ping))
//!     .build()?;
//!
//! let value = hub.call("mods.test.ping", Args::new().arg(1))?;
//! ```
//!
//! # Architecture
//!
//! - `pact-core`: values, errors and signature binding
//! - `pact-contract`: call contexts, contract sources and stage resolution
//! - `pact-dispatch`: the three-mode dispatcher
//! - `pact-hub`: configuration and the registration hub

pub use pact_contract::*;
pub use pact_core::*;
pub use pact_dispatch::*;
pub use pact_hub::*;

//! Contract layer for Pact
//!
//! Contracts are layered validation/transformation routines wrapped around an
//! implementation that knows nothing about them. This crate holds everything
//! the dispatcher consumes but does not itself execute:
//!
//! - [`Target`] / [`ExecutionNature`]: the identity and nature of a wrapped implementation
//! - [`CallContext`]: the per-invocation record shared by all stages of one call
//! - [`PreHook`], [`CallHook`], [`PostHook`]: stage functions
//! - [`ContractSource`] / [`Contract`] / [`ContractSet`]: named stage collections
//! - [`resolver`]: ordered discovery of the stages that apply to an operation
//! - [`verify`]: registration-time signature conformance checks
//!
//! ## Stage naming
//!
//! For an operation `ping`, a source is searched for, in this order:
//!
//! | Stage | Exact | Catch-all |
//! |-------|-------|-----------|
//! | pre   | `pre_ping`  | `pre`  |
//! | call  | `call_ping` | `call` |
//! | post  | `post_ping` | `post` |

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod context;
pub mod resolver;
pub mod source;
pub mod stage;
pub mod verify;

pub use context::{CallContext, ExecutionNature, Target};
pub use resolver::{load_contracts, resolve, ResolvedStages, StageCache, INIT_CONTRACT};
pub use source::{Contract, ContractSet, ContractSource};
pub use stage::{CallHook, NamedStage, PostHook, PreHook};
pub use verify::{verify_implementation, verify_signature};

/// Re-exported so stage authors can name boxed futures and streams.
pub use futures::future::BoxFuture;
pub use futures::stream::BoxStream;

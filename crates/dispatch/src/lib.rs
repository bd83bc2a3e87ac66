//! Dispatch layer for Pact
//!
//! Wraps an [`Implementation`] with its resolved contract stages and exposes
//! a single invocation surface per implementation. The execution nature
//! (plain, async or stream) is fixed when the implementation is registered
//! and selects the pipeline; it is never inferred from a call's result.
//!
//! ```ignore
//! let stages = Arc::new(resolve(Some(&contracts), &[], &[], "test", "ping"));
//! let ping = Dispatcher::new(Implementation::plain(target, ping_impl), stages)?;
//! let value = ping.call(Args::new().arg(1))?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod dispatcher;
pub mod implementation;

pub use dispatcher::{Dispatcher, Invocation};
pub use implementation::{Callable, Implementation};

//! Stage functions
//!
//! A stage is one pre, call-override or post function drawn from a contract
//! source. Every stage receives the invocation's [`CallContext`] as its only
//! argument.
//!
//! - Pre-stages exist for their side effects. They abort the call by
//!   returning an error; their `Ok` value carries nothing.
//! - A call-override replaces the implementation's own execution.
//! - Post-stages return `Some(value)` to replace the in-flight return value,
//!   or `None` to leave it unchanged. `Some(Value::Null)` is a replacement.
//!
//! Asynchronous hooks follow the boxed-future convention:
//!
//! ```ignore
//! PreHook::asynchronous(|ctx| Box::pin(async move {
//!     let user = ctx.argument("user")?.clone();
//!     check_remote_acl(&user).await
//! }))
//! ```

use crate::context::CallContext;
use futures::future::BoxFuture;
use futures::stream::BoxStream;
use pact_core::{Result, Value};
use std::fmt;
use std::sync::Arc;

type SyncPreFn = dyn Fn(&mut CallContext) -> Result<()> + Send + Sync;
type AsyncPreFn = dyn for<'a> Fn(&'a mut CallContext) -> BoxFuture<'a, Result<()>> + Send + Sync;
type SyncCallFn = dyn Fn(&mut CallContext) -> Result<Value> + Send + Sync;
type AsyncCallFn =
    dyn for<'a> Fn(&'a mut CallContext) -> BoxFuture<'a, Result<Value>> + Send + Sync;
type StreamCallFn =
    dyn Fn(&mut CallContext) -> Result<BoxStream<'static, Result<Value>>> + Send + Sync;
type SyncPostFn = dyn Fn(&mut CallContext) -> Result<Option<Value>> + Send + Sync;
type AsyncPostFn =
    dyn for<'a> Fn(&'a mut CallContext) -> BoxFuture<'a, Result<Option<Value>>> + Send + Sync;

/// A pre-call stage.
#[derive(Clone)]
pub enum PreHook {
    /// Runs to completion before returning
    Sync(Arc<SyncPreFn>),
    /// Awaited before the next stage starts
    Async(Arc<AsyncPreFn>),
}

impl PreHook {
    /// A synchronous pre-stage.
    pub fn sync<F>(f: F) -> Self
    where
        F: Fn(&mut CallContext) -> Result<()> + Send + Sync + 'static,
    {
        PreHook::Sync(Arc::new(f))
    }

    /// An asynchronous pre-stage.
    pub fn asynchronous<F>(f: F) -> Self
    where
        F: for<'a> Fn(&'a mut CallContext) -> BoxFuture<'a, Result<()>> + Send + Sync + 'static,
    {
        PreHook::Async(Arc::new(f))
    }

    /// True if this hook must be awaited
    pub fn is_async(&self) -> bool {
        matches!(self, PreHook::Async(_))
    }
}

/// A call-override stage.
#[derive(Clone)]
pub enum CallHook {
    /// Produces the return value synchronously
    Sync(Arc<SyncCallFn>),
    /// Produces the return value through a future
    Async(Arc<AsyncCallFn>),
    /// Produces the element stream of a streaming call
    Stream(Arc<StreamCallFn>),
}

impl CallHook {
    /// A synchronous override.
    pub fn sync<F>(f: F) -> Self
    where
        F: Fn(&mut CallContext) -> Result<Value> + Send + Sync + 'static,
    {
        CallHook::Sync(Arc::new(f))
    }

    /// An asynchronous override.
    pub fn asynchronous<F>(f: F) -> Self
    where
        F: for<'a> Fn(&'a mut CallContext) -> BoxFuture<'a, Result<Value>> + Send + Sync + 'static,
    {
        CallHook::Async(Arc::new(f))
    }

    /// A streaming override. The returned stream must own its data.
    pub fn stream<F>(f: F) -> Self
    where
        F: Fn(&mut CallContext) -> Result<BoxStream<'static, Result<Value>>>
            + Send
            + Sync
            + 'static,
    {
        CallHook::Stream(Arc::new(f))
    }

    /// Stable lowercase kind name, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            CallHook::Sync(_) => "sync",
            CallHook::Async(_) => "async",
            CallHook::Stream(_) => "stream",
        }
    }
}

/// A post-call stage.
#[derive(Clone)]
pub enum PostHook {
    /// Runs to completion before returning
    Sync(Arc<SyncPostFn>),
    /// Awaited before the next stage starts
    Async(Arc<AsyncPostFn>),
}

impl PostHook {
    /// A synchronous post-stage.
    pub fn sync<F>(f: F) -> Self
    where
        F: Fn(&mut CallContext) -> Result<Option<Value>> + Send + Sync + 'static,
    {
        PostHook::Sync(Arc::new(f))
    }

    /// An asynchronous post-stage.
    pub fn asynchronous<F>(f: F) -> Self
    where
        F: for<'a> Fn(&'a mut CallContext) -> BoxFuture<'a, Result<Option<Value>>>
            + Send
            + Sync
            + 'static,
    {
        PostHook::Async(Arc::new(f))
    }

    /// True if this hook must be awaited
    pub fn is_async(&self) -> bool {
        matches!(self, PostHook::Async(_))
    }
}

/// A hook together with the name it was resolved under, e.g. `auth.pre_ping`.
#[derive(Clone)]
pub struct NamedStage<H> {
    name: String,
    hook: H,
}

impl<H> NamedStage<H> {
    pub(crate) fn new(source: &str, stage: &str, hook: H) -> Self {
        Self {
            name: format!("{}.{}", source, stage),
            hook,
        }
    }

    /// `<source>.<stage>`
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The hook itself
    pub fn hook(&self) -> &H {
        &self.hook
    }
}

impl<H> fmt::Debug for NamedStage<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NamedStage").field(&self.name).finish()
    }
}

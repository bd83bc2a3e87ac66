//! Wrapped implementations
//!
//! An [`Implementation`] pairs a [`Target`] with the callable that serves it.
//! The callable variant fixes the execution nature; the constructors stamp the
//! same nature onto the target so the two can never disagree.

use futures::future::{self, BoxFuture};
use futures::stream::{self, BoxStream};
use futures::{Future, Stream};
use pact_contract::{ExecutionNature, Target};
use pact_core::{Args, BoundArguments, Error, Result, Value};
use std::fmt;
use std::sync::Arc;

type PlainFn = dyn Fn(BoundArguments) -> Result<Value> + Send + Sync;
type AsyncFn = dyn Fn(BoundArguments) -> BoxFuture<'static, Result<Value>> + Send + Sync;
type StreamFn = dyn Fn(BoundArguments) -> BoxStream<'static, Result<Value>> + Send + Sync;

/// The function behind an implementation, tagged by execution nature.
#[derive(Clone)]
pub enum Callable {
    /// Returns its value synchronously
    Plain(Arc<PlainFn>),
    /// Returns a future
    Async(Arc<AsyncFn>),
    /// Returns a stream of values
    Stream(Arc<StreamFn>),
}

impl Callable {
    /// The execution nature this callable implies
    pub fn nature(&self) -> ExecutionNature {
        match self {
            Callable::Plain(_) => ExecutionNature::Plain,
            Callable::Async(_) => ExecutionNature::Async,
            Callable::Stream(_) => ExecutionNature::Stream,
        }
    }
}

/// A registered callable subject to contract wrapping.
#[derive(Clone)]
pub struct Implementation {
    target: Arc<Target>,
    callable: Callable,
    alias: Option<String>,
}

impl Implementation {
    /// A synchronous implementation.
    pub fn plain<F>(target: Target, f: F) -> Self
    where
        F: Fn(BoundArguments) -> Result<Value> + Send + Sync + 'static,
    {
        Self::from_callable(target, Callable::Plain(Arc::new(f)))
    }

    /// An asynchronous implementation.
    pub fn asynchronous<F, Fut>(target: Target, f: F) -> Self
    where
        F: Fn(BoundArguments) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value>> + Send + 'static,
    {
        Self::from_callable(
            target,
            Callable::Async(Arc::new(move |bound| -> BoxFuture<'static, Result<Value>> {
                Box::pin(f(bound))
            })),
        )
    }

    /// A streaming implementation.
    pub fn streaming<F, S>(target: Target, f: F) -> Self
    where
        F: Fn(BoundArguments) -> S + Send + Sync + 'static,
        S: Stream<Item = Result<Value>> + Send + 'static,
    {
        Self::from_callable(
            target,
            Callable::Stream(Arc::new(move |bound| -> BoxStream<'static, Result<Value>> {
                Box::pin(f(bound))
            })),
        )
    }

    /// Wrap an existing callable. The target takes the callable's nature.
    pub fn from_callable(target: Target, callable: Callable) -> Self {
        let target = target.with_nature(callable.nature());
        Self {
            target: Arc::new(target),
            callable,
            alias: None,
        }
    }

    /// Expose this implementation under a public name distinct from its own.
    ///
    /// The target's path follows the alias, so binding and mode errors name
    /// the path callers use.
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        let alias = alias.into();
        self.target = Arc::new(self.target.as_ref().clone().with_public_name(&alias));
        self.alias = Some(alias);
        self
    }

    /// Declared identity
    pub fn target(&self) -> &Target {
        &self.target
    }

    pub(crate) fn shared_target(&self) -> Arc<Target> {
        Arc::clone(&self.target)
    }

    /// The callable itself
    pub fn callable(&self) -> &Callable {
        &self.callable
    }

    /// Execution nature
    pub fn nature(&self) -> ExecutionNature {
        self.target.nature()
    }

    /// Public alias, if one was set
    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// The name callers use: the alias if set, otherwise the target name.
    pub fn public_name(&self) -> &str {
        self.alias.as_deref().unwrap_or_else(|| self.target.name())
    }

    /// Call a plain implementation directly, without contracts.
    pub fn call(&self, args: &Args) -> Result<Value> {
        self.call_bound(self.target.bind(args)?)
    }

    /// Call a plain or async implementation directly, without contracts.
    pub fn call_async(&self, args: &Args) -> BoxFuture<'static, Result<Value>> {
        match self.target.bind(args) {
            Ok(bound) => self.resolve_bound(bound),
            Err(e) => Box::pin(future::ready(Err(e))),
        }
    }

    /// Call a streaming implementation directly, without contracts.
    pub fn call_stream(&self, args: &Args) -> BoxStream<'static, Result<Value>> {
        match self.target.bind(args) {
            Ok(bound) => self.stream_bound(bound),
            Err(e) => Box::pin(stream::once(future::ready(Err(e)))),
        }
    }

    pub(crate) fn call_bound(&self, bound: BoundArguments) -> Result<Value> {
        match &self.callable {
            Callable::Plain(f) => f(bound),
            _ => Err(self.wrong_mode("a plain call")),
        }
    }

    pub(crate) fn resolve_bound(&self, bound: BoundArguments) -> BoxFuture<'static, Result<Value>> {
        match &self.callable {
            Callable::Plain(f) => Box::pin(future::ready(f(bound))),
            Callable::Async(f) => f(bound),
            Callable::Stream(_) => Box::pin(future::ready(Err(self.wrong_mode("an awaited call")))),
        }
    }

    pub(crate) fn stream_bound(&self, bound: BoundArguments) -> BoxStream<'static, Result<Value>> {
        match &self.callable {
            Callable::Stream(f) => f(bound),
            _ => Box::pin(stream::once(future::ready(Err(self.wrong_mode("a stream"))))),
        }
    }

    pub(crate) fn wrong_mode(&self, requested: &'static str) -> Error {
        Error::WrongMode {
            target: self.target.path().to_string(),
            nature: self.nature().as_str(),
            requested,
        }
    }
}

impl fmt::Debug for Implementation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Implementation")
            .field("path", &self.target.path())
            .field("nature", &self.nature())
            .field("alias", &self.alias)
            .finish()
    }
}

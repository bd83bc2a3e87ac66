//! Contracted invocation
//!
//! A [`Dispatcher`] owns one [`Implementation`] and the [`ResolvedStages`]
//! that apply to it. Its execution nature is fixed at construction and picks
//! one of three pipelines:
//!
//! | Nature | Pre-stages | Override | Post-stages | Result |
//! |--------|-----------|----------|-------------|--------|
//! | plain  | sync only | sync | sync only | the value |
//! | async  | awaited in order | sync or async | awaited in order | a future |
//! | stream | awaited in order | stream | after exhaustion | elements, then a final value |
//!
//! A stream yields its final value only when post-stages exist.
//!
//! With no stages at all, every mode forwards to the implementation directly.

use crate::implementation::Implementation;
use async_stream::stream;
use futures::future::{self, BoxFuture};
use futures::stream::{self as stream_util, BoxStream};
use futures::StreamExt;
use pact_contract::{
    CallContext, CallHook, ExecutionNature, PostHook, PreHook, ResolvedStages, Target,
};
use pact_core::{Args, Error, Result, Value};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// The in-flight result of [`Dispatcher::invoke`], shaped by execution nature.
pub enum Invocation {
    /// A plain call, already complete
    Ready(Result<Value>),
    /// An async call, resolving to its value
    Pending(BoxFuture<'static, Result<Value>>),
    /// A streaming call
    Streaming(BoxStream<'static, Result<Value>>),
}

impl Invocation {
    /// View any invocation as a stream. Ready and pending calls yield exactly
    /// one item.
    pub fn into_stream(self) -> BoxStream<'static, Result<Value>> {
        match self {
            Invocation::Ready(result) => Box::pin(stream_util::once(future::ready(result))),
            Invocation::Pending(fut) => Box::pin(stream_util::once(fut)),
            Invocation::Streaming(s) => s,
        }
    }
}

impl fmt::Debug for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Invocation::Ready(result) => f.debug_tuple("Ready").field(result).finish(),
            Invocation::Pending(_) => f.write_str("Pending"),
            Invocation::Streaming(_) => f.write_str("Streaming"),
        }
    }
}

/// An implementation wrapped with its contract stages.
///
/// Cheap to clone; clones share the implementation and stage list.
#[derive(Clone)]
pub struct Dispatcher {
    implementation: Arc<Implementation>,
    stages: Arc<ResolvedStages>,
}

impl Dispatcher {
    /// Wrap `implementation` with `stages`.
    ///
    /// # Errors
    ///
    /// [`Error::StageMismatch`] if a stage cannot run under the
    /// implementation's execution nature: an async hook on a plain
    /// implementation, a streaming override on a non-streaming one, or a
    /// non-streaming override on a streaming one.
    pub fn new(implementation: Implementation, stages: Arc<ResolvedStages>) -> Result<Self> {
        let nature = implementation.nature();
        check_stages(nature, &stages)?;
        debug!(
            target: "pact::dispatch",
            path = implementation.target().path(),
            nature = nature.as_str(),
            pre = stages.pre().len(),
            overridden = stages.call().is_some(),
            post = stages.post().len(),
            "Wrapped implementation"
        );
        Ok(Self {
            implementation: Arc::new(implementation),
            stages,
        })
    }

    /// Wrap `implementation` with no stages.
    pub fn bare(implementation: Implementation) -> Self {
        Self {
            implementation: Arc::new(implementation),
            stages: Arc::new(ResolvedStages::empty()),
        }
    }

    /// The wrapped implementation
    pub fn implementation(&self) -> &Implementation {
        &self.implementation
    }

    /// Declared identity of the wrapped implementation
    pub fn target(&self) -> &Target {
        self.implementation.target()
    }

    /// Execution nature
    pub fn nature(&self) -> ExecutionNature {
        self.implementation.nature()
    }

    /// Stages run around every call
    pub fn stages(&self) -> &ResolvedStages {
        &self.stages
    }

    /// Invoke through the pipeline matching the execution nature.
    pub fn invoke(&self, args: Args) -> Invocation {
        match self.nature() {
            ExecutionNature::Plain => Invocation::Ready(self.run_plain(args)),
            ExecutionNature::Async => Invocation::Pending(self.run_async(args)),
            ExecutionNature::Stream => Invocation::Streaming(self.run_stream(args)),
        }
    }

    /// Call a plain implementation.
    ///
    /// # Errors
    ///
    /// [`Error::WrongMode`] for async and streaming implementations; otherwise
    /// whatever binding, a stage or the implementation fails with.
    pub fn call(&self, args: Args) -> Result<Value> {
        match self.nature() {
            ExecutionNature::Plain => self.run_plain(args),
            _ => Err(self.implementation.wrong_mode("a plain call")),
        }
    }

    /// Await a plain or async implementation.
    pub async fn call_async(&self, args: Args) -> Result<Value> {
        match self.nature() {
            ExecutionNature::Plain => self.run_plain(args),
            ExecutionNature::Async => self.run_async(args).await,
            ExecutionNature::Stream => Err(self.implementation.wrong_mode("an awaited call")),
        }
    }

    /// Stream a streaming implementation.
    ///
    /// The returned stream owns everything it needs, including the call
    /// context, and ends after the first error it yields.
    pub fn call_stream(&self, args: Args) -> BoxStream<'static, Result<Value>> {
        match self.nature() {
            ExecutionNature::Stream => self.run_stream(args),
            _ => {
                let err = self.implementation.wrong_mode("a stream");
                Box::pin(stream_util::once(future::ready(Err(err))))
            }
        }
    }

    fn run_plain(&self, args: Args) -> Result<Value> {
        if self.stages.is_empty() {
            return self.implementation.call(&args);
        }
        let nature = ExecutionNature::Plain;
        let mut ctx = CallContext::new(self.implementation.shared_target(), args);

        for stage in self.stages.pre() {
            trace!(target: "pact::dispatch", stage = stage.name(), "pre");
            match stage.hook() {
                PreHook::Sync(f) => f(&mut ctx)?,
                PreHook::Async(_) => return Err(mismatch(stage.name(), nature)),
            }
        }

        let ret = match self.stages.call() {
            Some(stage) => {
                trace!(target: "pact::dispatch", stage = stage.name(), "call");
                match stage.hook() {
                    CallHook::Sync(f) => f(&mut ctx)?,
                    _ => return Err(mismatch(stage.name(), nature)),
                }
            }
            None => self.implementation.call_bound(ctx.bound()?)?,
        };
        ctx.set_ret(ret);

        for stage in self.stages.post() {
            trace!(target: "pact::dispatch", stage = stage.name(), "post");
            let replacement = match stage.hook() {
                PostHook::Sync(f) => f(&mut ctx)?,
                PostHook::Async(_) => return Err(mismatch(stage.name(), nature)),
            };
            if let Some(value) = replacement {
                ctx.set_ret(value);
            }
        }

        Ok(ctx.take_ret().unwrap_or(Value::Null))
    }

    fn run_async(&self, args: Args) -> BoxFuture<'static, Result<Value>> {
        if self.stages.is_empty() {
            return self.implementation.call_async(&args);
        }
        let implementation = Arc::clone(&self.implementation);
        let stages = Arc::clone(&self.stages);

        Box::pin(async move {
            let mut ctx = CallContext::new(implementation.shared_target(), args);
            run_pre(&stages, &mut ctx).await?;

            let ret = match stages.call() {
                Some(stage) => {
                    trace!(target: "pact::dispatch", stage = stage.name(), "call");
                    match stage.hook() {
                        CallHook::Sync(f) => f(&mut ctx)?,
                        CallHook::Async(f) => f(&mut ctx).await?,
                        CallHook::Stream(_) => {
                            return Err(mismatch(stage.name(), ExecutionNature::Async))
                        }
                    }
                }
                None => implementation.resolve_bound(ctx.bound()?).await?,
            };
            ctx.set_ret(ret);

            run_post(&stages, &mut ctx).await?;
            Ok(ctx.take_ret().unwrap_or(Value::Null))
        })
    }

    fn run_stream(&self, args: Args) -> BoxStream<'static, Result<Value>> {
        if self.stages.is_empty() {
            return self.implementation.call_stream(&args);
        }
        let implementation = Arc::clone(&self.implementation);
        let stages = Arc::clone(&self.stages);

        Box::pin(stream! {
            let mut ctx = CallContext::new(implementation.shared_target(), args);
            if let Err(e) = run_pre(&stages, &mut ctx).await {
                yield Err(e);
                return;
            }

            let produced = match stages.call() {
                Some(stage) => {
                    trace!(target: "pact::dispatch", stage = stage.name(), "call");
                    match stage.hook() {
                        CallHook::Stream(f) => f(&mut ctx),
                        _ => Err(mismatch(stage.name(), ExecutionNature::Stream)),
                    }
                }
                None => ctx.bound().map(|bound| implementation.stream_bound(bound)),
            };
            let mut elements = match produced {
                Ok(elements) => elements,
                Err(e) => {
                    yield Err(e);
                    return;
                }
            };

            let mut last = None;
            while let Some(element) = elements.next().await {
                match element {
                    Ok(value) => {
                        last = Some(value.clone());
                        yield Ok(value);
                    }
                    Err(e) => {
                        yield Err(e);
                        return;
                    }
                }
            }

            if stages.post().is_empty() {
                return;
            }
            if let Some(value) = last {
                ctx.set_ret(value);
            }
            if let Err(e) = run_post(&stages, &mut ctx).await {
                yield Err(e);
                return;
            }
            if let Some(value) = ctx.take_ret() {
                yield Ok(value);
            }
        })
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("path", &self.target().path())
            .field("nature", &self.nature())
            .field("stages", &self.stages.stage_names())
            .finish()
    }
}

async fn run_pre(stages: &ResolvedStages, ctx: &mut CallContext) -> Result<()> {
    for stage in stages.pre() {
        trace!(target: "pact::dispatch", stage = stage.name(), "pre");
        match stage.hook() {
            PreHook::Sync(f) => f(&mut *ctx)?,
            PreHook::Async(f) => f(&mut *ctx).await?,
        }
    }
    Ok(())
}

async fn run_post(stages: &ResolvedStages, ctx: &mut CallContext) -> Result<()> {
    for stage in stages.post() {
        trace!(target: "pact::dispatch", stage = stage.name(), "post");
        let replacement = match stage.hook() {
            PostHook::Sync(f) => f(&mut *ctx)?,
            PostHook::Async(f) => f(&mut *ctx).await?,
        };
        if let Some(value) = replacement {
            ctx.set_ret(value);
        }
    }
    Ok(())
}

fn mismatch(stage: &str, nature: ExecutionNature) -> Error {
    Error::StageMismatch {
        stage: stage.to_string(),
        nature: nature.as_str(),
    }
}

fn check_stages(nature: ExecutionNature, stages: &ResolvedStages) -> Result<()> {
    match nature {
        ExecutionNature::Plain => {
            if let Some(stage) = stages.pre().iter().find(|s| s.hook().is_async()) {
                return Err(mismatch(stage.name(), nature));
            }
            if let Some(stage) = stages.call() {
                if !matches!(stage.hook(), CallHook::Sync(_)) {
                    return Err(mismatch(stage.name(), nature));
                }
            }
            if let Some(stage) = stages.post().iter().find(|s| s.hook().is_async()) {
                return Err(mismatch(stage.name(), nature));
            }
        }
        ExecutionNature::Async => {
            if let Some(stage) = stages.call() {
                if matches!(stage.hook(), CallHook::Stream(_)) {
                    return Err(mismatch(stage.name(), nature));
                }
            }
        }
        ExecutionNature::Stream => {
            if let Some(stage) = stages.call() {
                if !matches!(stage.hook(), CallHook::Stream(_)) {
                    return Err(mismatch(stage.name(), nature));
                }
            }
        }
    }
    Ok(())
}

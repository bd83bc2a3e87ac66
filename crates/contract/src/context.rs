//! Call targets and the per-invocation call context
//!
//! A [`CallContext`] is created at the start of one contracted invocation and
//! dropped at its end (a streamed invocation keeps it alive until the stream
//! is exhausted). It is never shared between invocations, so its memo cache
//! needs no locking.

use pact_core::{Args, BoundArguments, Error, Result, Signature, Value};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// How an implementation produces its result. Fixed at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExecutionNature {
    /// Returns its value synchronously
    Plain,
    /// Returns a future resolving to its value
    Async,
    /// Returns a stream of values
    Stream,
}

impl ExecutionNature {
    /// Stable lowercase name, used in diagnostics.
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionNature::Plain => "plain",
            ExecutionNature::Async => "async",
            ExecutionNature::Stream => "stream",
        }
    }
}

impl fmt::Display for ExecutionNature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity and declaration of a wrapped implementation.
///
/// The module reference is dotted: `"mods.test"` is module `test` in namespace
/// `mods`; `"mods.nest.basic"` is module `basic` in namespace `mods.nest`.
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    reference: String,
    namespace: String,
    module: String,
    name: String,
    path: String,
    signature: Signature,
    nature: ExecutionNature,
}

impl Target {
    /// Declare a target. The nature defaults to [`ExecutionNature::Plain`].
    pub fn new(
        reference: impl Into<String>,
        name: impl Into<String>,
        signature: Signature,
    ) -> Self {
        let reference = reference.into();
        let name = name.into();
        let (namespace, module) = match reference.rsplit_once('.') {
            Some((ns, module)) => (ns.to_string(), module.to_string()),
            None => (String::new(), reference.clone()),
        };
        let path = join_path(&reference, &name);
        Self {
            reference,
            namespace,
            module,
            name,
            path,
            signature,
            nature: ExecutionNature::Plain,
        }
    }

    /// Set the execution nature.
    pub fn with_nature(mut self, nature: ExecutionNature) -> Self {
        self.nature = nature;
        self
    }

    /// Expose this target under `public_name`. [`name`](Self::name) keeps the
    /// declared name; [`path`](Self::path) and error messages use the public one.
    pub fn with_public_name(mut self, public_name: &str) -> Self {
        self.path = self.path_for(public_name);
        self
    }

    /// The dotted path `name` would have in this target's module.
    pub fn path_for(&self, name: &str) -> String {
        join_path(&self.reference, name)
    }

    /// Operation name, e.g. `ping`
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Owning module reference, e.g. `mods.test`
    pub fn reference(&self) -> &str {
        &self.reference
    }

    /// Namespace portion of the reference, e.g. `mods`
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Module portion of the reference, e.g. `test`
    pub fn module(&self) -> &str {
        &self.module
    }

    /// Fully qualified public path, e.g. `mods.test.ping`
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Declared signature
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Execution nature
    pub fn nature(&self) -> ExecutionNature {
        self.nature
    }

    /// Bind arguments, naming this target in the error on failure.
    pub fn bind(&self, args: &Args) -> Result<BoundArguments> {
        self.signature
            .bind(args)
            .map_err(|e| Error::binding(self.path.clone(), e))
    }
}

fn join_path(reference: &str, name: &str) -> String {
    if reference.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", reference, name)
    }
}

/// Per-invocation record shared by the stages of one contracted call.
///
/// Pre-stages may rewrite the arguments through [`args_mut`](Self::args_mut);
/// the implementation is then called with whatever the context holds.
/// Post-stages see the in-flight return value through [`ret`](Self::ret).
pub struct CallContext {
    target: Arc<Target>,
    args: Args,
    ret: Option<Value>,
    bound: Option<BoundArguments>,
    memo: HashMap<String, Value>,
}

impl CallContext {
    /// Start a context for one invocation.
    pub fn new(target: Arc<Target>, args: Args) -> Self {
        Self {
            target,
            args,
            ret: None,
            bound: None,
            memo: HashMap::new(),
        }
    }

    /// The implementation being called
    pub fn target(&self) -> &Target {
        &self.target
    }

    /// Raw call arguments
    pub fn args(&self) -> &Args {
        &self.args
    }

    /// Mutable call arguments. Drops the memoized bound view.
    pub fn args_mut(&mut self) -> &mut Args {
        self.bound = None;
        &mut self.args
    }

    /// Arguments bound to the target's signature, defaults applied.
    ///
    /// Bound at most once per invocation unless the arguments are mutated.
    ///
    /// # Errors
    ///
    /// [`Error::Binding`] if the arguments do not fit the signature.
    pub fn arguments(&mut self) -> Result<&BoundArguments> {
        match &mut self.bound {
            Some(bound) => Ok(&*bound),
            slot @ None => {
                let bound = self.target.bind(&self.args)?;
                Ok(&*slot.insert(bound))
            }
        }
    }

    /// A single bound argument.
    ///
    /// # Errors
    ///
    /// [`Error::Binding`] if binding fails, [`Error::UnknownArgument`] if the
    /// signature has no parameter called `name`.
    pub fn argument(&mut self, name: &str) -> Result<&Value> {
        self.arguments()?.value(name)
    }

    /// An owned copy of the bound arguments, as handed to the implementation.
    pub fn bound(&mut self) -> Result<BoundArguments> {
        self.arguments().cloned()
    }

    /// In-flight return value. `None` until the call has produced one.
    pub fn ret(&self) -> Option<&Value> {
        self.ret.as_ref()
    }

    /// Replace the in-flight return value.
    pub fn set_ret(&mut self, value: Value) {
        self.ret = Some(value);
    }

    /// Take the in-flight return value out of the context.
    pub fn take_ret(&mut self) -> Option<Value> {
        self.ret.take()
    }

    /// Memoize a value derived during this invocation.
    ///
    /// `derive` runs only the first time `key` is requested.
    pub fn memo<F>(&mut self, key: &str, derive: F) -> Result<&Value>
    where
        F: FnOnce() -> Result<Value>,
    {
        match self.memo.entry(key.to_string()) {
            Entry::Occupied(e) => Ok(&*e.into_mut()),
            Entry::Vacant(e) => Ok(&*e.insert(derive()?)),
        }
    }

    /// Consume the context, returning its (possibly rewritten) arguments.
    pub fn into_args(self) -> Args {
        self.args
    }
}

impl fmt::Debug for CallContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallContext")
            .field("target", &self.target.path())
            .field("args", &self.args)
            .field("ret", &self.ret)
            .finish()
    }
}

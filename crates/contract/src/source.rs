//! Contract sources
//!
//! A [`ContractSource`] exposes zero or more stage functions by stage name
//! (`pre_ping`, `pre`, `call_ping`, `call`, `post_ping`, `post`). The
//! table-backed [`Contract`] is the usual implementation; anything that can
//! answer the three lookups can act as a source.
//!
//! A [`ContractSet`] is the collection of named sources available to one
//! namespace. Its identity (a v4 UUID) is what resolution results are
//! memoized against.

use crate::stage::{CallHook, PostHook, PreHook};
use pact_core::Signature;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// An object exposing named stage functions.
pub trait ContractSource: Send + Sync {
    /// Source name. Matched against module names, `init` and configured lists.
    fn name(&self) -> &str;

    /// Pre-stage registered under `stage` (`pre_<op>` or `pre`)
    fn pre(&self, stage: &str) -> Option<PreHook>;

    /// Override registered under `stage` (`call_<op>` or `call`)
    fn call(&self, stage: &str) -> Option<CallHook>;

    /// Post-stage registered under `stage` (`post_<op>` or `post`)
    fn post(&self, stage: &str) -> Option<PostHook>;

    /// Signature this source expects implementations of `function` to declare
    fn expected_signature(&self, _function: &str) -> Option<&Signature> {
        None
    }
}

/// Table-backed contract source, assembled with a builder.
///
/// ```ignore
/// let audit = Contract::new("audit")
///     .pre("ping", PreHook::sync(|ctx| { ctx.argument("a")?; Ok(()) }))
///     .post_all(PostHook::sync(|ctx| Ok(None)));
/// ```
#[derive(Clone, Default)]
pub struct Contract {
    name: String,
    pre: HashMap<String, PreHook>,
    call: HashMap<String, CallHook>,
    post: HashMap<String, PostHook>,
    signatures: HashMap<String, Signature>,
}

impl Contract {
    /// An empty contract named `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Register `pre_<function>`.
    pub fn pre(mut self, function: &str, hook: PreHook) -> Self {
        self.pre.insert(format!("pre_{}", function), hook);
        self
    }

    /// Register the catch-all `pre`.
    pub fn pre_all(mut self, hook: PreHook) -> Self {
        self.pre.insert("pre".to_string(), hook);
        self
    }

    /// Register `call_<function>`.
    pub fn call(mut self, function: &str, hook: CallHook) -> Self {
        self.call.insert(format!("call_{}", function), hook);
        self
    }

    /// Register the catch-all `call`.
    pub fn call_all(mut self, hook: CallHook) -> Self {
        self.call.insert("call".to_string(), hook);
        self
    }

    /// Register `post_<function>`.
    pub fn post(mut self, function: &str, hook: PostHook) -> Self {
        self.post.insert(format!("post_{}", function), hook);
        self
    }

    /// Register the catch-all `post`.
    pub fn post_all(mut self, hook: PostHook) -> Self {
        self.post.insert("post".to_string(), hook);
        self
    }

    /// Declare the signature implementations of `function` must match.
    pub fn expect_signature(mut self, function: &str, signature: Signature) -> Self {
        self.signatures.insert(function.to_string(), signature);
        self
    }
}

impl ContractSource for Contract {
    fn name(&self) -> &str {
        &self.name
    }

    fn pre(&self, stage: &str) -> Option<PreHook> {
        self.pre.get(stage).cloned()
    }

    fn call(&self, stage: &str) -> Option<CallHook> {
        self.call.get(stage).cloned()
    }

    fn post(&self, stage: &str) -> Option<PostHook> {
        self.post.get(stage).cloned()
    }

    fn expected_signature(&self, function: &str) -> Option<&Signature> {
        self.signatures.get(function)
    }
}

impl fmt::Debug for Contract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut stages: Vec<&str> = self
            .pre
            .keys()
            .chain(self.call.keys())
            .chain(self.post.keys())
            .map(String::as_str)
            .collect();
        stages.sort_unstable();
        f.debug_struct("Contract")
            .field("name", &self.name)
            .field("stages", &stages)
            .finish()
    }
}

/// Named contract sources available to one namespace.
#[derive(Clone)]
pub struct ContractSet {
    id: Uuid,
    sources: HashMap<String, Arc<dyn ContractSource>>,
}

impl ContractSet {
    /// An empty set with a fresh identity.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            sources: HashMap::new(),
        }
    }

    /// Add a source, replacing any source with the same name.
    ///
    /// Changing the membership gives the set a fresh identity, so memoized
    /// resolutions of the old membership are never reused.
    pub fn with(mut self, source: impl ContractSource + 'static) -> Self {
        self.insert(Arc::new(source));
        self
    }

    /// Add a shared source, replacing any source with the same name.
    pub fn insert(&mut self, source: Arc<dyn ContractSource>) {
        self.sources.insert(source.name().to_string(), source);
        self.id = Uuid::new_v4();
    }

    /// Identity of this membership
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Source named `name`
    pub fn get(&self, name: &str) -> Option<&Arc<dyn ContractSource>> {
        self.sources.get(name)
    }

    /// True if a source named `name` exists
    pub fn contains(&self, name: &str) -> bool {
        self.sources.contains_key(name)
    }

    /// Source names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.sources.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of sources
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// True if the set has no sources
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl Default for ContractSet {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ContractSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContractSet")
            .field("id", &self.id)
            .field("sources", &self.names())
            .finish()
    }
}

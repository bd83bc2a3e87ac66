//! Stage resolution
//!
//! Resolution runs in two steps, both pure:
//!
//! 1. [`load_contracts`] orders the sources that apply to a module, highest
//!    priority first:
//!    1. the source named after the module itself,
//!    2. the namespace's `init` source,
//!    3. the namespace's configured default sources, in configured order,
//!    4. the sources the module opts into.
//!
//!    A source reachable through several tiers appears once, at its highest
//!    tier. Names in tiers 3 and 4 that match no source are skipped.
//!
//! 2. [`ResolvedStages::from_sources`] walks that chain for one operation and
//!    collects, per source, the exact stage before the catch-all one. Every
//!    matching pre- and post-stage is kept; only the first override wins.
//!
//! [`StageCache`] memoizes the result per (set identity, module, lists,
//! operation) so identical resolutions are computed once.

use crate::source::{ContractSet, ContractSource};
use crate::stage::{CallHook, NamedStage, PostHook, PreHook};
use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Name of the namespace-wide fallback source.
pub const INIT_CONTRACT: &str = "init";

/// Order the contract sources that apply to `module`.
pub fn load_contracts(
    sources: Option<&ContractSet>,
    default_sources: &[String],
    opt_in: &[String],
    module: &str,
) -> Vec<Arc<dyn ContractSource>> {
    let Some(sources) = sources else {
        return Vec::new();
    };

    let mut loaded: Vec<&str> = Vec::new();
    let mut chain: Vec<Arc<dyn ContractSource>> = Vec::new();

    let tiers = [module, INIT_CONTRACT]
        .into_iter()
        .chain(default_sources.iter().map(String::as_str))
        .chain(opt_in.iter().map(String::as_str));

    for name in tiers {
        if loaded.contains(&name) {
            continue;
        }
        if let Some(source) = sources.get(name) {
            loaded.push(name);
            chain.push(Arc::clone(source));
        }
    }

    chain
}

/// Stages that apply to one operation, in execution order.
///
/// Computed once when an implementation is wrapped, then shared read-only by
/// every invocation.
#[derive(Clone, Default, Debug)]
pub struct ResolvedStages {
    pre: Vec<NamedStage<PreHook>>,
    call: Option<NamedStage<CallHook>>,
    post: Vec<NamedStage<PostHook>>,
}

impl ResolvedStages {
    /// No stages: the dispatcher passes calls straight through.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Collect the stages for `operation` from an ordered source chain.
    pub fn from_sources(chain: &[Arc<dyn ContractSource>], operation: &str) -> Self {
        let exact_pre = format!("pre_{}", operation);
        let exact_call = format!("call_{}", operation);
        let exact_post = format!("post_{}", operation);

        let mut stages = Self::default();
        for source in chain {
            let name = source.name();
            for stage in [exact_pre.as_str(), "pre"] {
                if let Some(hook) = source.pre(stage) {
                    stages.pre.push(NamedStage::new(name, stage, hook));
                }
            }
            if stages.call.is_none() {
                stages.call = [exact_call.as_str(), "call"]
                    .into_iter()
                    .find_map(|stage| {
                        source
                            .call(stage)
                            .map(|hook| NamedStage::new(name, stage, hook))
                    });
            }
            for stage in [exact_post.as_str(), "post"] {
                if let Some(hook) = source.post(stage) {
                    stages.post.push(NamedStage::new(name, stage, hook));
                }
            }
        }
        stages
    }

    /// Pre-stages in execution order
    pub fn pre(&self) -> &[NamedStage<PreHook>] {
        &self.pre
    }

    /// The honored override, if any
    pub fn call(&self) -> Option<&NamedStage<CallHook>> {
        self.call.as_ref()
    }

    /// Post-stages in execution order
    pub fn post(&self) -> &[NamedStage<PostHook>] {
        &self.post
    }

    /// True if no stage applies
    pub fn is_empty(&self) -> bool {
        self.pre.is_empty() && self.call.is_none() && self.post.is_empty()
    }

    /// Names of every resolved stage, pre then call then post.
    pub fn stage_names(&self) -> Vec<&str> {
        self.pre
            .iter()
            .map(NamedStage::name)
            .chain(self.call.iter().map(NamedStage::name))
            .chain(self.post.iter().map(NamedStage::name))
            .collect()
    }
}

/// Resolve the stages for `operation` of `module` in one step.
pub fn resolve(
    sources: Option<&ContractSet>,
    default_sources: &[String],
    opt_in: &[String],
    module: &str,
    operation: &str,
) -> ResolvedStages {
    let chain = load_contracts(sources, default_sources, opt_in, module);
    ResolvedStages::from_sources(&chain, operation)
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct StageKey {
    set: Uuid,
    module: String,
    default_sources: Vec<String>,
    opt_in: Vec<String>,
    operation: String,
}

/// Concurrent memo of resolved stages.
#[derive(Default)]
pub struct StageCache {
    entries: DashMap<StageKey, Arc<ResolvedStages>>,
}

impl StageCache {
    /// An empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// [`resolve`], memoized by the identity of `sources`.
    pub fn resolve(
        &self,
        sources: Option<&ContractSet>,
        default_sources: &[String],
        opt_in: &[String],
        module: &str,
        operation: &str,
    ) -> Arc<ResolvedStages> {
        let Some(set) = sources else {
            return Arc::new(ResolvedStages::empty());
        };
        let key = StageKey {
            set: set.id(),
            module: module.to_string(),
            default_sources: default_sources.to_vec(),
            opt_in: opt_in.to_vec(),
            operation: operation.to_string(),
        };
        if let Some(hit) = self.entries.get(&key) {
            return Arc::clone(hit.value());
        }

        let stages = Arc::new(resolve(sources, default_sources, opt_in, module, operation));
        debug!(
            target: "pact::resolve",
            module,
            operation,
            stages = ?stages.stage_names(),
            "Resolved contract stages"
        );
        Arc::clone(self.entries.entry(key).or_insert(stages).value())
    }

    /// Number of memoized resolutions
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing is memoized
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Forget every memoized resolution.
    pub fn clear(&self) {
        self.entries.clear();
    }
}

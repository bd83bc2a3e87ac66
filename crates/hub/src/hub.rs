//! Registration and lookup
//!
//! [`HubBuilder`] is the compose step: it collects contract sets and
//! implementations, resolves every implementation's stages once, and freezes
//! the result into an immutable [`Hub`] keyed by dotted path.

use crate::config::HubConfig;
use futures::future;
use futures::stream::{self, BoxStream};
use pact_contract::{load_contracts, verify_implementation, ContractSet, StageCache};
use pact_core::{Args, Error, Result, Value};
use pact_dispatch::{Dispatcher, Implementation};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Collects contracts and implementations, then builds a [`Hub`].
pub struct HubBuilder {
    config: HubConfig,
    contracts: HashMap<String, ContractSet>,
    implementations: Vec<Implementation>,
    cache: Arc<StageCache>,
}

impl HubBuilder {
    /// A builder over `config` with a private stage cache.
    pub fn new(config: HubConfig) -> Self {
        Self {
            config,
            contracts: HashMap::new(),
            implementations: Vec::new(),
            cache: Arc::new(StageCache::new()),
        }
    }

    /// Share a stage cache with other builders, so rebuilding over the same
    /// contract sets reuses prior resolution.
    pub fn with_cache(mut self, cache: Arc<StageCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Make `set` the contract sources of `namespace`, replacing any earlier set.
    pub fn contracts(mut self, namespace: impl Into<String>, set: ContractSet) -> Self {
        self.contracts.insert(namespace.into(), set);
        self
    }

    /// Queue an implementation. Its namespace and module come from its target.
    pub fn register(mut self, implementation: Implementation) -> Self {
        self.implementations.push(implementation);
        self
    }

    /// Resolve, verify and wrap every registered implementation.
    ///
    /// # Errors
    ///
    /// - [`Error::ContractNotFound`] if a namespace's configured default
    ///   contract has no matching source
    /// - [`Error::Duplicate`] if two implementations share a path
    /// - [`Error::ContractSignature`] if verification is enabled and an
    ///   implementation does not match a contract-declared signature
    /// - [`Error::StageMismatch`] if a stage cannot run under an
    ///   implementation's execution nature
    pub fn build(self) -> Result<Hub> {
        for (namespace, settings) in &self.config.namespaces {
            let set = self.contracts.get(namespace);
            for name in &settings.default_contracts {
                if !set.map_or(false, |set| set.contains(name)) {
                    return Err(Error::ContractNotFound { name: name.clone() });
                }
            }
        }

        let mut dispatchers = HashMap::with_capacity(self.implementations.len());
        for implementation in self.implementations {
            let target = implementation.target();
            let path = target.path().to_string();
            if dispatchers.contains_key(&path) {
                return Err(Error::Duplicate { path });
            }

            let namespace = target.namespace();
            let module = target.module();
            let function = implementation.public_name();
            let set = self.contracts.get(namespace);
            let defaults = self.config.default_contracts(namespace);
            let opt_in = self.config.opt_in(namespace, module);

            if self.config.verify_signatures(namespace) {
                let chain = load_contracts(set, defaults, opt_in, module);
                verify_implementation(&chain, target, function)?;
            }

            let stages = self.cache.resolve(set, defaults, opt_in, module, function);
            debug!(
                target: "pact::hub",
                path = path.as_str(),
                nature = target.nature().as_str(),
                stages = stages.stage_names().len(),
                "Registered implementation"
            );
            let dispatcher = Dispatcher::new(implementation, stages)?;
            dispatchers.insert(path, dispatcher);
        }

        Ok(Hub { dispatchers })
    }
}

impl fmt::Debug for HubBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HubBuilder")
            .field("config", &self.config)
            .field("contracts", &self.contracts)
            .field("implementations", &self.implementations.len())
            .finish()
    }
}

/// Immutable table of wrapped implementations keyed by dotted path,
/// e.g. `mods.test.ping`.
pub struct Hub {
    dispatchers: HashMap<String, Dispatcher>,
}

impl Hub {
    /// Start building a hub over `config`.
    pub fn builder(config: HubConfig) -> HubBuilder {
        HubBuilder::new(config)
    }

    /// The dispatcher registered under `path`.
    pub fn get(&self, path: &str) -> Result<&Dispatcher> {
        self.dispatchers.get(path).ok_or_else(|| Error::NotFound {
            path: path.to_string(),
        })
    }

    /// True if something is registered under `path`
    pub fn contains(&self, path: &str) -> bool {
        self.dispatchers.contains_key(path)
    }

    /// Registered paths, sorted
    pub fn paths(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = self.dispatchers.keys().map(String::as_str).collect();
        paths.sort_unstable();
        paths
    }

    /// Number of registered implementations
    pub fn len(&self) -> usize {
        self.dispatchers.len()
    }

    /// True if nothing is registered
    pub fn is_empty(&self) -> bool {
        self.dispatchers.is_empty()
    }

    /// Call the plain implementation at `path`.
    pub fn call(&self, path: &str, args: Args) -> Result<Value> {
        self.get(path)?.call(args)
    }

    /// Await the plain or async implementation at `path`.
    pub async fn call_async(&self, path: &str, args: Args) -> Result<Value> {
        self.get(path)?.call_async(args).await
    }

    /// Stream the streaming implementation at `path`.
    pub fn call_stream(&self, path: &str, args: Args) -> BoxStream<'static, Result<Value>> {
        match self.get(path) {
            Ok(dispatcher) => dispatcher.call_stream(args),
            Err(e) => Box::pin(stream::once(future::ready(Err(e)))),
        }
    }
}

impl fmt::Debug for Hub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hub").field("paths", &self.paths()).finish()
    }
}

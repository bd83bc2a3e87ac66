//! Declared parameter signatures and argument binding
//!
//! A [`Signature`] is fixed when an implementation is registered. Every call
//! supplies raw [`Args`] (positional values plus keyword values) which are
//! bound against the signature into [`BoundArguments`]: one entry per
//! declared parameter, in declaration order, with defaults filled in.
//!
//! ## Parameter kinds
//!
//! Kinds must appear in this order, and `*args` / `**kwargs` at most once:
//!
//! | Kind | Example | Bound from |
//! |------|---------|------------|
//! | `PositionalOnly` | `a, /` | position only |
//! | `PositionalOrKeyword` | `a` | position or keyword |
//! | `VarPositional` | `*args` | surplus positions, as `Value::Array` |
//! | `KeywordOnly` | `*, a` | keyword only |
//! | `VarKeyword` | `**kwargs` | surplus keywords, as `Value::Object` |
//!
//! ## Defaults
//!
//! Defaults are captured once, at signature construction, and cloned into
//! each call's bound view. Nothing is shared by reference across calls, so a
//! call that mutates a defaulted container cannot leak into the next one.

use crate::error::{BindingError, Error, Result};
use crate::value::Value;
use std::collections::HashMap;

/// How a parameter accepts its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ParamKind {
    /// Bound from a position only
    PositionalOnly,
    /// Bound from a position or by keyword
    PositionalOrKeyword,
    /// Collects surplus positional arguments
    VarPositional,
    /// Bound by keyword only
    KeywordOnly,
    /// Collects surplus keyword arguments
    VarKeyword,
}

impl ParamKind {
    /// Stable lowercase name, used in diagnostics.
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamKind::PositionalOnly => "positional-only",
            ParamKind::PositionalOrKeyword => "positional-or-keyword",
            ParamKind::VarPositional => "var-positional",
            ParamKind::KeywordOnly => "keyword-only",
            ParamKind::VarKeyword => "var-keyword",
        }
    }

    fn is_positional(&self) -> bool {
        matches!(
            self,
            ParamKind::PositionalOnly | ParamKind::PositionalOrKeyword
        )
    }

    fn is_variadic(&self) -> bool {
        matches!(self, ParamKind::VarPositional | ParamKind::VarKeyword)
    }
}

/// One declared parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    name: String,
    kind: ParamKind,
    default: Option<Value>,
}

impl Parameter {
    fn with_kind(name: impl Into<String>, kind: ParamKind) -> Self {
        Self {
            name: name.into(),
            kind,
            default: None,
        }
    }

    /// A positional-or-keyword parameter.
    pub fn positional(name: impl Into<String>) -> Self {
        Self::with_kind(name, ParamKind::PositionalOrKeyword)
    }

    /// A positional-only parameter.
    pub fn positional_only(name: impl Into<String>) -> Self {
        Self::with_kind(name, ParamKind::PositionalOnly)
    }

    /// A keyword-only parameter.
    pub fn keyword_only(name: impl Into<String>) -> Self {
        Self::with_kind(name, ParamKind::KeywordOnly)
    }

    /// A `*args` collector.
    pub fn var_positional(name: impl Into<String>) -> Self {
        Self::with_kind(name, ParamKind::VarPositional)
    }

    /// A `**kwargs` collector.
    pub fn var_keyword(name: impl Into<String>) -> Self {
        Self::with_kind(name, ParamKind::VarKeyword)
    }

    /// Attach a default value.
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Parameter name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parameter kind
    pub fn kind(&self) -> ParamKind {
        self.kind
    }

    /// Declared default, if any
    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// True if a call must supply this parameter.
    pub fn is_required(&self) -> bool {
        self.default.is_none() && !self.kind.is_variadic()
    }
}

/// An implementation's declared parameter list.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Signature {
    params: Vec<Parameter>,
}

impl Signature {
    /// Build a signature, rejecting parameter lists that could never bind
    /// unambiguously.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSignature`] when names are empty or repeated,
    /// kinds are out of order, a variadic parameter repeats or has a default,
    /// or a positional parameter without a default follows one with a default.
    pub fn new(params: Vec<Parameter>) -> Result<Self> {
        let mut seen: Vec<&str> = Vec::with_capacity(params.len());
        let mut prev: Option<ParamKind> = None;
        let mut saw_positional_default = false;

        for param in &params {
            if param.name.is_empty() {
                return Err(invalid("parameter name cannot be empty"));
            }
            if seen.contains(&param.name.as_str()) {
                return Err(invalid(format!("duplicate parameter '{}'", param.name)));
            }
            seen.push(&param.name);

            if let Some(prev) = prev {
                if param.kind < prev {
                    return Err(invalid(format!(
                        "{} parameter '{}' cannot follow a {} parameter",
                        param.kind.as_str(),
                        param.name,
                        prev.as_str()
                    )));
                }
                if param.kind == prev && param.kind.is_variadic() {
                    return Err(invalid(format!(
                        "more than one {} parameter",
                        param.kind.as_str()
                    )));
                }
            }
            prev = Some(param.kind);

            if param.kind.is_variadic() && param.default.is_some() {
                return Err(invalid(format!(
                    "{} parameter '{}' cannot have a default",
                    param.kind.as_str(),
                    param.name
                )));
            }
            if param.kind.is_positional() {
                if param.default.is_some() {
                    saw_positional_default = true;
                } else if saw_positional_default {
                    return Err(invalid(format!(
                        "non-default parameter '{}' follows default parameter",
                        param.name
                    )));
                }
            }
        }

        Ok(Self { params })
    }

    /// A signature that accepts no arguments.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Declared parameters in order
    pub fn parameters(&self) -> &[Parameter] {
        &self.params
    }

    /// Look up a parameter by name
    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.params.iter().find(|p| p.name == name)
    }

    /// Number of declared parameters
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// True if no parameters are declared
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    fn has_var_keyword(&self) -> bool {
        self.params.iter().any(|p| p.kind == ParamKind::VarKeyword)
    }

    /// Bind call arguments to this signature, filling in defaults.
    ///
    /// Binding is pure: `args` is not consumed and the same input always
    /// yields the same output.
    pub fn bind(&self, args: &Args) -> std::result::Result<BoundArguments, BindingError> {
        let mut entries: Vec<(String, Value)> = Vec::with_capacity(self.params.len());
        let mut keyword: HashMap<&str, &Value> = args
            .keyword
            .iter()
            .map(|(k, v)| (k.as_str(), v))
            .collect();

        // Phase 1: positional arguments, left to right.
        let mut positional = args.positional.iter();
        let mut next_param = 0;
        while next_param < self.params.len() {
            let param = &self.params[next_param];
            if param.kind == ParamKind::VarPositional {
                let rest: Vec<Value> = positional.by_ref().cloned().collect();
                entries.push((param.name.clone(), Value::Array(rest)));
                next_param += 1;
                break;
            }
            if !param.kind.is_positional() {
                break;
            }
            let Some(value) = positional.next() else {
                break;
            };
            if param.kind == ParamKind::PositionalOrKeyword
                && keyword.contains_key(param.name.as_str())
            {
                return Err(BindingError::MultipleValues {
                    name: param.name.clone(),
                });
            }
            entries.push((param.name.clone(), value.clone()));
            next_param += 1;
        }

        if positional.next().is_some() {
            let expected = self
                .params
                .iter()
                .filter(|p| p.kind.is_positional())
                .count();
            return Err(BindingError::TooManyPositional {
                expected,
                given: args.positional.len(),
            });
        }

        // Phase 2: everything not filled positionally.
        let mut var_keyword_slot = None;
        for param in &self.params[next_param..] {
            match param.kind {
                ParamKind::VarPositional => {
                    entries.push((param.name.clone(), Value::Array(Vec::new())));
                }
                ParamKind::VarKeyword => {
                    var_keyword_slot = Some(entries.len());
                    entries.push((param.name.clone(), Value::Object(HashMap::new())));
                }
                ParamKind::PositionalOnly => {
                    if keyword.contains_key(param.name.as_str()) && !self.has_var_keyword() {
                        return Err(BindingError::PositionalOnlyAsKeyword {
                            name: param.name.clone(),
                        });
                    }
                    entries.push((param.name.clone(), default_or_missing(param)?));
                }
                ParamKind::PositionalOrKeyword | ParamKind::KeywordOnly => {
                    let value = match keyword.remove(param.name.as_str()) {
                        Some(v) => v.clone(),
                        None => default_or_missing(param)?,
                    };
                    entries.push((param.name.clone(), value));
                }
            }
        }

        // Phase 3: surplus keywords.
        if !keyword.is_empty() {
            match var_keyword_slot {
                Some(slot) => {
                    let collected: HashMap<String, Value> = keyword
                        .into_iter()
                        .map(|(k, v)| (k.to_string(), v.clone()))
                        .collect();
                    entries[slot].1 = Value::Object(collected);
                }
                None => {
                    let mut names: Vec<&str> = keyword.into_keys().collect();
                    names.sort_unstable();
                    return Err(BindingError::UnexpectedKeyword {
                        name: names[0].to_string(),
                    });
                }
            }
        }

        Ok(BoundArguments { entries })
    }
}

fn default_or_missing(param: &Parameter) -> std::result::Result<Value, BindingError> {
    param
        .default
        .clone()
        .ok_or_else(|| BindingError::MissingArgument {
            name: param.name.clone(),
        })
}

fn invalid(reason: impl Into<String>) -> Error {
    Error::InvalidSignature {
        reason: reason.into(),
    }
}

/// Raw call arguments: positional values and keyword values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args {
    /// Positional arguments, in call order
    pub positional: Vec<Value>,
    /// Keyword arguments
    pub keyword: HashMap<String, Value>,
}

impl Args {
    /// No arguments.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a positional argument.
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Set a keyword argument.
    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.keyword.insert(name.into(), value.into());
        self
    }

    /// Total number of supplied arguments
    pub fn len(&self) -> usize {
        self.positional.len() + self.keyword.len()
    }

    /// True if no arguments were supplied
    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.keyword.is_empty()
    }
}

impl From<Vec<Value>> for Args {
    fn from(positional: Vec<Value>) -> Self {
        Self {
            positional,
            keyword: HashMap::new(),
        }
    }
}

/// Arguments bound to a signature: one value per declared parameter, in
/// declaration order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BoundArguments {
    entries: Vec<(String, Value)>,
}

impl BoundArguments {
    /// Value bound to `name`, if the signature declares it
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Value bound to `name`, or [`Error::UnknownArgument`].
    pub fn value(&self, name: &str) -> Result<&Value> {
        self.get(name).ok_or_else(|| Error::UnknownArgument {
            name: name.to_string(),
        })
    }

    /// True if `name` is bound
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterate `(name, value)` pairs in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Number of bound parameters
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing is bound
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Collapse into a name-keyed map.
    pub fn into_map(self) -> HashMap<String, Value> {
        self.entries.into_iter().collect()
    }
}

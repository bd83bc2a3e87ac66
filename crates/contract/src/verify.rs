//! Registration-time signature conformance
//!
//! A contract may declare the signature it expects implementations of a
//! function to have. These checks compare declared parameter lists position by
//! position and report every violation, not just the first.

use crate::context::Target;
use crate::source::ContractSource;
use pact_core::{Error, ParamKind, Parameter, Result, Signature};
use std::sync::Arc;

/// Compare `actual` against `expected`, returning one message per violation.
///
/// An implementation may add trailing parameters as long as they have
/// defaults or take surplus positionals. It may only take `**kwargs` if the
/// contract does.
pub fn verify_signature(expected: &Signature, actual: &Signature) -> Vec<String> {
    let mut violations = Vec::new();
    let expected = expected.parameters();
    let actual = actual.parameters();

    let takes_kwargs = |params: &[Parameter]| {
        params.iter().any(|p| p.kind() == ParamKind::VarKeyword)
    };
    if takes_kwargs(actual) && !takes_kwargs(expected) {
        violations.push("kwargs are not permitted as a parameter".to_string());
    }

    for (idx, want) in expected.iter().enumerate() {
        let Some(have) = actual.get(idx) else {
            violations.push(format!("missing parameter \"{}\"", want.name()));
            continue;
        };
        if have.name() != want.name() {
            violations.push(format!(
                "parameter \"{}\" does not have the correct name: {}",
                have.name(),
                want.name()
            ));
        }
        if have.kind() != want.kind() {
            violations.push(format!(
                "parameter \"{}\" is not of kind {}",
                have.name(),
                want.kind().as_str()
            ));
        }
        if want.default().is_some() && have.default().is_none() {
            violations.push(format!(
                "parameter \"{}\" does not have a default value",
                have.name()
            ));
        }
    }

    for extra in actual.iter().skip(expected.len()) {
        if extra.is_required() {
            violations.push(format!(
                "extra parameter \"{}\" must have a default value",
                extra.name()
            ));
        }
    }

    violations
}

/// Check `target`, exposed as `function`, against every expectation in its
/// source chain.
///
/// # Errors
///
/// [`Error::ContractSignature`] carrying every violation, prefixed with the
/// name of the contract that expected it.
pub fn verify_implementation(
    chain: &[Arc<dyn ContractSource>],
    target: &Target,
    function: &str,
) -> Result<()> {
    let mut violations = Vec::new();
    for source in chain {
        let Some(expected) = source.expected_signature(function) else {
            continue;
        };
        violations.extend(
            verify_signature(expected, target.signature())
                .into_iter()
                .map(|v| format!("{}: {}", source.name(), v)),
        );
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(Error::ContractSignature {
            target: target.path().to_string(),
            violations,
        })
    }
}

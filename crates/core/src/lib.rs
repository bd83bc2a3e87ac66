//! Core types for Pact
//!
//! This crate defines the leaf types every other Pact crate builds on:
//! - Value: the dynamic value passed between callers, stages and implementations
//! - Signature / Parameter: an implementation's declared parameter list
//! - Args / BoundArguments: raw call arguments and their bound view
//! - Error / BindingError: the error hierarchy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod signature;
pub mod value;

pub use error::{BindingError, Error, Result};
pub use signature::{Args, BoundArguments, ParamKind, Parameter, Signature};
pub use value::Value;

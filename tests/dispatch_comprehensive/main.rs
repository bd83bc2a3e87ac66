//! Dispatch Comprehensive Test Suite
//!
//! End-to-end coverage of contracted invocation across the three execution
//! natures.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --test dispatch_comprehensive
//!
//! # Streaming only
//! cargo test --test dispatch_comprehensive stream_mode::
//! ```

#[path = "../common/mod.rs"]
mod common;

mod async_mode;
mod concurrency;
mod fast_path;
mod stream_mode;

//! # Skill Gateway Test Suite
//!
//! Unified test crate for cross-crate behaviour.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── gate_flows.rs     # Request gate + certificate cache
//!     └── gateway_e2e.rs    # Full HTTP router, in-process
//! tests/benches/
//! └── gate_benchmarks.rs    # Chain validation and signature cost
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p skill-tests
//! cargo test -p skill-tests integration::gateway_e2e
//!
//! # Benchmarks
//! cargo bench -p skill-tests
//! ```

pub mod integration;

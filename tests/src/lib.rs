//! # Ledger-Relay Test Suite
//!
//! Unified test crate for scenarios that span more than one subsystem.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── harness.rs      # Shared wiring over mocks
//!     ├── flows.rs        # Submit → confirm / fail / time out
//!     ├── recovery.rs     # Restart with a persistent store, then resume
//!     └── concurrency.rs  # Many operations per actor, many actors
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p lr-tests
//! cargo test -p lr-tests integration::flows
//! ```

#![allow(dead_code)]

pub mod integration;

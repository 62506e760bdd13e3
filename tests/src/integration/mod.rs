//! Cross-subsystem integration scenarios.

pub mod harness;

mod concurrency;
mod flows;
mod recovery;

//! Shared test fixtures for classplan crates.
//!
//! This crate provides small rosters with known shapes for testing. It
//! depends only on `classplan-core` so every other crate can use it as a
//! dev-dependency without cycles.
//!
//! # Usage
//!
//! Add as a dev-dependency in your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! classplan-test = { workspace = true }
//! ```

pub mod cohorts;

pub use cohorts::{
    forced_language_roster, paired_roster, plain_roster, student, tiny_pair_roster,
};

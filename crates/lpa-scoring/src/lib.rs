//! Learning Profile Assessment: scoring
//!
//! Turns selected answers into a learning profile.
//!
//! # Core Concepts
//!
//! - [`aggregate`]: `score[trait] += weight` over every selected option
//! - [`resolve_domain`]: argmax over one domain, ties broken by priority
//! - [`percentile_for`]: six-bucket step function over a raw total
//! - [`ResolutionStrategy`]: one implementation per product iteration
//! - [`StrategyRegistry`]: maps a bank's `resolution` name to a strategy
//!
//! # Example
//!
//! ```rust,ignore
//! use lpa_bank::BankRegistry;
//! use lpa_scoring::{Answer, StrategyRegistry};
//!
//! let bank = BankRegistry::with_builtin()?.get("enhanced")?;
//! let answers = vec![Answer::new(1, "B".parse()?)];
//! let evaluation = StrategyRegistry::with_defaults().evaluate(&bank, &answers)?;
//! println!("{}", evaluation.profile.primary);
//! ```

#![warn(unreachable_pub)]

mod error;
mod indicators;
mod percentile;
mod profile;
mod registry;
mod resolve;
mod sheet;
mod strategy;

pub use error::ScoringError;
pub use indicators::{signals, strengths, urgency_level, Signal, Strength};
pub use percentile::{percentile_for, Percentile};
pub use profile::{Evaluation, Profile, BALANCED};
pub use registry::StrategyRegistry;
pub use resolve::{rank, resolve_domain, DomainOutcome, TraitScore};
pub use sheet::{aggregate, Answer, ScoreSheet, SkipReason, SkippedAnswer};
pub use strategy::{GlobalArgmax, MultiDomain, PrioritizedDomain, ResolutionStrategy};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

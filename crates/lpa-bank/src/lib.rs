//! Learning Profile Assessment: question banks
//!
//! Static weight tables behind each version of the parent quiz.
//!
//! # Core Concepts
//!
//! - [`QuestionBank`]: questions, options and the `trait -> points` table each
//!   option awards
//! - [`Domain`]: a disjoint group of traits resolved together, listed in
//!   tie-break priority order
//! - [`Points`]: exact fixed-point weights (hundredths)
//! - [`Fingerprint`]: Blake3 hash of a bank, stored with every result
//! - [`BankRegistry`]: built-in versions `classic`, `enhanced`, `multi-domain`
//!
//! # Example
//!
//! ```rust,ignore
//! use lpa_bank::{BankRegistry, QuestionId};
//!
//! let registry = BankRegistry::with_builtin()?;
//! let bank = registry.get("classic")?;
//! let option = bank.lookup(QuestionId(1), &"A".parse()?).unwrap();
//! assert_eq!(option.weight("visual").as_f64(), 1.0);
//! ```

#![warn(unreachable_pub)]

mod bank;
mod error;
mod fingerprint;
mod ids;
mod personalize;
mod points;
mod registry;

pub use bank::{AnswerOption, Domain, Question, QuestionBank};
pub use error::BankError;
pub use fingerprint::Fingerprint;
pub use ids::{OptionId, QuestionId, TraitKey};
pub use personalize::personalize;
pub use points::Points;
pub use registry::{BankRegistry, DEFAULT_VERSION};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! Tax computation for the two regimes.
//!
//! The slab and relief calculators are the leaves; the regime calculator
//! wires them to the reductions each regime admits, and the comparator runs
//! both regimes side by side.

pub mod common;
pub mod comparator;
pub mod regime;
pub mod relief;
pub mod slab;

pub use comparator::RegimeComparator;
pub use regime::RegimeCalculator;
pub use relief::{ReliefBreakdown, SurchargeReliefCalculator};
pub use slab::SlabTaxCalculator;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::config::RulesError;

/// Errors raised while computing tax for a regime.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaxComputationError {
    #[error("taxable income cannot be negative, got {0}")]
    NegativeIncome(Decimal),

    #[error("base tax cannot be negative, got {0}")]
    NegativeBaseTax(Decimal),

    #[error("invalid tax rules: {0}")]
    InvalidRules(#[from] RulesError),
}

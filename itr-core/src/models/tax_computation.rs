use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::income::ChapterViADeduction;
use super::regime::Regime;

/// Outcome of one regime calculation. Built once by the regime calculator
/// and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxComputationResult {
    pub regime: Regime,
    pub gross_salary: Decimal,
    pub exemptions_allowed: Decimal,
    pub standard_deduction_allowed: Decimal,
    pub professional_tax_allowed: Decimal,
    /// Chapter VI-A items the regime admits, after clamping.
    pub chapter_vi_a_allowed: Vec<ChapterViADeduction>,
    pub total_reductions: Decimal,
    pub taxable_income: Decimal,
    pub base_tax: Decimal,
    pub surcharge: Decimal,
    pub cess: Decimal,
    pub rebate: Decimal,
    pub net_tax_payable: Decimal,
    pub tax_already_paid: Decimal,
    /// Positive when tax is still owed, negative when a refund is due.
    pub balance_or_refund: Decimal,
}

impl TaxComputationResult {
    pub fn chapter_vi_a_total(&self) -> Decimal {
        self.chapter_vi_a_allowed.iter().map(|d| d.amount).sum()
    }

    pub fn balance_payable(&self) -> Decimal {
        self.balance_or_refund.max(Decimal::ZERO)
    }

    pub fn refund_due(&self) -> Decimal {
        (-self.balance_or_refund).max(Decimal::ZERO)
    }
}

/// Advisory side-by-side of the two regimes' net liabilities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegimeComparison {
    #[serde(with = "rust_decimal::serde::float")]
    pub old_regime_tax: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub new_regime_tax: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub savings: Decimal,
    pub recommendation: Regime,
}

/// A comparison together with the two full results it was derived from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonOutcome {
    pub comparison: RegimeComparison,
    pub old_regime: TaxComputationResult,
    pub new_regime: TaxComputationResult,
}

impl ComparisonOutcome {
    pub fn recommended(&self) -> &TaxComputationResult {
        match self.comparison.recommendation {
            Regime::Old => &self.old_regime,
            Regime::New => &self.new_regime,
        }
    }
}

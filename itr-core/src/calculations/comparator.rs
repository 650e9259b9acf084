//! Side-by-side computation of both regimes.
//!
//! The comparison looks at net tax payable, not the balance after
//! withholding: withholding is the same under both regimes. A tie
//! recommends the new regime.

use tracing::info;

use super::TaxComputationError;
use super::regime::RegimeCalculator;
use crate::config::TaxRules;
use crate::models::{ComparisonOutcome, NormalizedIncomeRecord, Regime, RegimeComparison};

/// Holds one [`RegimeCalculator`] per regime.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use itr_core::{NormalizedIncomeRecord, Regime};
/// use itr_core::calculations::RegimeComparator;
///
/// let income: NormalizedIncomeRecord = serde_json::from_value(serde_json::json!({
///     "assessmentYear": "2024-25",
///     "grossSalaryTotal": 800000,
///     "admissibleExemptionsTotal": 0,
///     "admissibleDeductionsTotal": 150000,
///     "taxAlreadyWithheld": 30000,
///     "standardDeduction": 50000
/// }))
/// .unwrap();
///
/// let outcome = RegimeComparator::default().compare(&income).unwrap();
///
/// assert_eq!(outcome.comparison.old_regime_tax, dec!(33800));
/// assert_eq!(outcome.comparison.new_regime_tax, dec!(31200));
/// assert_eq!(outcome.comparison.recommendation, Regime::New);
/// ```
#[derive(Debug, Clone)]
pub struct RegimeComparator {
    old: RegimeCalculator,
    new: RegimeCalculator,
}

impl RegimeComparator {
    /// Builds both calculators from configured rules.
    ///
    /// # Errors
    ///
    /// Returns [`TaxComputationError::InvalidRules`] if either regime's
    /// rules fail validation.
    pub fn from_rules(rules: &TaxRules) -> Result<Self, TaxComputationError> {
        Ok(Self {
            old: RegimeCalculator::for_regime(Regime::Old, rules.old.clone())?,
            new: RegimeCalculator::for_regime(Regime::New, rules.new.clone())?,
        })
    }

    /// The calculator for `regime`, e.g. to assemble a return for it.
    pub fn calculator(
        &self,
        regime: Regime,
    ) -> &RegimeCalculator {
        match regime {
            Regime::Old => &self.old,
            Regime::New => &self.new,
        }
    }

    /// Runs both regimes on `income` and recommends the cheaper one.
    ///
    /// # Returns
    ///
    /// Both full results and the [`RegimeComparison`]: the regime with the
    /// lower net tax payable, `NEW` on a tie, and the absolute difference
    /// as savings.
    ///
    /// # Errors
    ///
    /// Returns [`TaxComputationError`] if either regime's computation fails.
    pub fn compare(
        &self,
        income: &NormalizedIncomeRecord,
    ) -> Result<ComparisonOutcome, TaxComputationError> {
        let old_regime = self.old.calculate(income)?;
        let new_regime = self.new.calculate(income)?;

        let old_tax = old_regime.net_tax_payable;
        let new_tax = new_regime.net_tax_payable;
        let recommendation = if old_tax < new_tax {
            Regime::Old
        } else {
            Regime::New
        };
        let savings = (old_tax - new_tax).abs();

        info!(%old_tax, %new_tax, %savings, %recommendation, "regimes compared");

        Ok(ComparisonOutcome {
            comparison: RegimeComparison {
                old_regime_tax: old_tax,
                new_regime_tax: new_tax,
                savings,
                recommendation,
            },
            old_regime,
            new_regime,
        })
    }
}

impl Default for RegimeComparator {
    fn default() -> Self {
        Self {
            old: RegimeCalculator::old_regime_default(),
            new: RegimeCalculator::new_regime_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::{ChapterViADeduction, DeductionSection, Employment, SalaryComponents};

    fn record(
        salary: Decimal,
        deduction_80c: Decimal,
    ) -> NormalizedIncomeRecord {
        NormalizedIncomeRecord {
            employments: vec![Employment {
                salary: SalaryComponents {
                    salary,
                    ..Default::default()
                },
                ..Default::default()
            }],
            standard_deduction: dec!(50000),
            deductions: vec![ChapterViADeduction {
                section: DeductionSection::Section80C,
                amount: deduction_80c,
            }],
            ..Default::default()
        }
    }

    #[test]
    fn recommends_new_regime_when_cheaper() {
        let outcome = RegimeComparator::default()
            .compare(&record(dec!(800000), dec!(150000)))
            .unwrap();

        assert_eq!(
            outcome.comparison,
            RegimeComparison {
                old_regime_tax: dec!(33800),
                new_regime_tax: dec!(31200),
                savings: dec!(2600),
                recommendation: Regime::New,
            }
        );
        assert_eq!(outcome.recommended().regime, Regime::New);
    }

    #[test]
    fn recommends_old_regime_with_large_deductions() {
        let mut income = record(dec!(1500000), dec!(150000));
        income.deductions.push(ChapterViADeduction {
            section: DeductionSection::Section80D,
            amount: dec!(300000),
        });

        let outcome = RegimeComparator::default().compare(&income).unwrap();

        assert_eq!(outcome.comparison.recommendation, Regime::Old);
        assert!(outcome.comparison.old_regime_tax < outcome.comparison.new_regime_tax);
        assert_eq!(
            outcome.comparison.savings,
            outcome.comparison.new_regime_tax - outcome.comparison.old_regime_tax
        );
    }

    #[test]
    fn tie_recommends_new_regime() {
        // Both regimes owe nothing below their exempt slabs.
        let outcome = RegimeComparator::default()
            .compare(&record(dec!(200000), dec!(0)))
            .unwrap();

        assert_eq!(outcome.comparison.old_regime_tax, dec!(0));
        assert_eq!(outcome.comparison.new_regime_tax, dec!(0));
        assert_eq!(outcome.comparison.savings, dec!(0));
        assert_eq!(outcome.comparison.recommendation, Regime::New);
    }

    #[test]
    fn from_rules_rejects_invalid_rules() {
        let mut rules = TaxRules::default();
        rules.new.standard_deduction_cap = dec!(-1);

        let result = RegimeComparator::from_rules(&rules);

        assert!(matches!(result, Err(TaxComputationError::InvalidRules(_))));
    }
}

//! Per-regime tax computation.
//!
//! The two regimes differ only in which reductions they admit and which
//! rules they carry:
//!
//! | Reduction                    | Old | New |
//! |------------------------------|-----|-----|
//! | Section 10 exempt allowances | yes | no  |
//! | Standard deduction (capped)  | yes | yes |
//! | Professional tax             | yes | no  |
//! | Chapter VI-A                 | all | 80CCD(2) only |
//!
//! Every input amount is rounded to the rupee before it is summed, the same
//! way the return schedules round their lines, so the taxable income here is
//! exactly the `TotalIncome` of the assembled document.

use rust_decimal::Decimal;
use tracing::{debug, warn};

use super::TaxComputationError;
use super::common::{max, round_to_rupee};
use super::relief::SurchargeReliefCalculator;
use super::slab::SlabTaxCalculator;
use crate::config::RegimeRules;
use crate::models::{
    ChapterViADeduction, DeductionSection, NormalizedIncomeRecord, Regime, TaxComputationResult,
};

/// Calculator bound to one regime and its rules.
///
/// Holds no mutable state; one instance can serve any number of records
/// from any number of threads.
#[derive(Debug, Clone)]
pub struct RegimeCalculator {
    regime: Regime,
    rules: RegimeRules,
}

impl RegimeCalculator {
    /// # Errors
    ///
    /// Returns [`TaxComputationError::InvalidRules`] if `rules` fail validation.
    pub fn for_regime(
        regime: Regime,
        rules: RegimeRules,
    ) -> Result<Self, TaxComputationError> {
        rules.validate()?;
        Ok(Self { regime, rules })
    }

    /// The old regime with the built-in AY 2024-25 rules.
    pub fn old_regime_default() -> Self {
        Self {
            regime: Regime::Old,
            rules: RegimeRules::old_regime_default(),
        }
    }

    /// The new regime with the built-in AY 2024-25 rules.
    pub fn new_regime_default() -> Self {
        Self {
            regime: Regime::New,
            rules: RegimeRules::new_regime_default(),
        }
    }

    pub fn regime(&self) -> Regime {
        self.regime
    }

    pub fn rules(&self) -> &RegimeRules {
        &self.rules
    }

    /// Computes the full liability of `income` under this regime.
    ///
    /// # Arguments
    ///
    /// * `income` - The filer's normalized income record
    ///
    /// # Returns
    ///
    /// A [`TaxComputationResult`] tagged with this regime, listing every
    /// admitted reduction alongside taxable income, base tax, relief and
    /// the balance after tax already withheld.
    ///
    /// # Errors
    ///
    /// Returns [`TaxComputationError`] if the gross salary is negative.
    pub fn calculate(
        &self,
        income: &NormalizedIncomeRecord,
    ) -> Result<TaxComputationResult, TaxComputationError> {
        let gross_salary: Decimal = income
            .employments
            .iter()
            .map(|e| {
                round_to_rupee(e.salary.salary)
                    + round_to_rupee(e.salary.perquisites)
                    + round_to_rupee(e.salary.profits_in_lieu)
            })
            .sum();
        if gross_salary < Decimal::ZERO {
            return Err(TaxComputationError::NegativeIncome(gross_salary));
        }

        let exemptions_allowed = self.exemptions_allowed(income);
        let standard_deduction_allowed = self.standard_deduction_allowed(income);
        let professional_tax_allowed = self.professional_tax_allowed(income);
        let chapter_vi_a_allowed = self.chapter_vi_a_allowed(income);
        let chapter_vi_a_total: Decimal = chapter_vi_a_allowed.iter().map(|d| d.amount).sum();

        let total_reductions = exemptions_allowed
            + standard_deduction_allowed
            + professional_tax_allowed
            + chapter_vi_a_total;
        let taxable_income = max(gross_salary - total_reductions, Decimal::ZERO);

        let base_tax = SlabTaxCalculator::new(&self.rules.slabs).calculate(taxable_income)?;
        let relief =
            SurchargeReliefCalculator::new(&self.rules.relief).calculate(base_tax, taxable_income)?;

        let tax_already_paid = self.tax_already_paid(income);
        let balance_or_refund = relief.net_tax_payable - tax_already_paid;

        debug!(
            regime = %self.regime,
            %gross_salary,
            %total_reductions,
            %taxable_income,
            net_tax_payable = %relief.net_tax_payable,
            "regime tax computed"
        );

        Ok(TaxComputationResult {
            regime: self.regime,
            gross_salary,
            exemptions_allowed,
            standard_deduction_allowed,
            professional_tax_allowed,
            chapter_vi_a_allowed,
            total_reductions,
            taxable_income,
            base_tax,
            surcharge: relief.surcharge,
            cess: relief.cess,
            rebate: relief.rebate,
            net_tax_payable: relief.net_tax_payable,
            tax_already_paid,
            balance_or_refund,
        })
    }

    fn exemptions_allowed(
        &self,
        income: &NormalizedIncomeRecord,
    ) -> Decimal {
        if self.regime == Regime::New {
            return Decimal::ZERO;
        }
        income
            .employments
            .iter()
            .flat_map(|e| e.exempt_allowances.iter())
            .map(|a| self.whole_rupees("exempt allowance", a.amount))
            .sum()
    }

    fn standard_deduction_allowed(
        &self,
        income: &NormalizedIncomeRecord,
    ) -> Decimal {
        round_to_rupee(
            self.whole_rupees("standard deduction", income.standard_deduction)
                .min(self.rules.standard_deduction_cap),
        )
    }

    fn professional_tax_allowed(
        &self,
        income: &NormalizedIncomeRecord,
    ) -> Decimal {
        if self.regime == Regime::New {
            return Decimal::ZERO;
        }
        income
            .employments
            .iter()
            .map(|e| self.whole_rupees("professional tax", e.professional_tax))
            .sum()
    }

    fn chapter_vi_a_allowed(
        &self,
        income: &NormalizedIncomeRecord,
    ) -> Vec<ChapterViADeduction> {
        income
            .deductions
            .iter()
            .filter(|d| self.admits(d.section))
            .map(|d| ChapterViADeduction {
                section: d.section,
                amount: self.whole_rupees("chapter VI-A deduction", d.amount),
            })
            .collect()
    }

    fn admits(
        &self,
        section: DeductionSection,
    ) -> bool {
        match self.regime {
            Regime::Old => true,
            Regime::New => section == DeductionSection::Section80CCD2,
        }
    }

    fn tax_already_paid(
        &self,
        income: &NormalizedIncomeRecord,
    ) -> Decimal {
        income
            .employments
            .iter()
            .map(|e| self.whole_rupees("tax withheld", e.tax_withheld))
            .sum()
    }

    /// Rounds `amount` to the rupee, clamping negatives to zero.
    fn whole_rupees(
        &self,
        item: &str,
        amount: Decimal,
    ) -> Decimal {
        if amount < Decimal::ZERO {
            warn!(regime = %self.regime, item, %amount, "negative amount clamped to zero");
            Decimal::ZERO
        } else {
            round_to_rupee(amount)
        }
    }
}

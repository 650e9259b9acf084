//! Surcharge, cess and rebate on top of the slab tax.
//!
//! | Step      | Amount |
//! |-----------|--------|
//! | Surcharge | base tax × rate of the first tier whose bound covers the income |
//! | Cess      | cess rate × (base tax + surcharge) |
//! | Rebate    | min(rebate cap, base tax) when income ≤ rebate ceiling, else 0 |
//! | Net       | max(0, base tax + surcharge + cess − rebate) |
//!
//! Tiers apply in full at their boundary; there is no marginal relief.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::TaxComputationError;
use super::common::{max, round_to_rupee};
use crate::config::ReliefRules;

/// Amounts added to and taken off the base tax.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReliefBreakdown {
    pub surcharge: Decimal,
    /// Health and education cess on base tax plus surcharge.
    pub cess: Decimal,
    /// Section 87A rebate, never more than the base tax.
    pub rebate: Decimal,
    /// Never negative.
    pub net_tax_payable: Decimal,
}

/// Applies one regime's [`ReliefRules`] to a base tax.
#[derive(Debug, Clone, Copy)]
pub struct SurchargeReliefCalculator<'a> {
    rules: &'a ReliefRules,
}

impl<'a> SurchargeReliefCalculator<'a> {
    /// Creates a calculator over `rules`. The rules are validated on each
    /// [`calculate`](Self::calculate) call.
    pub fn new(rules: &'a ReliefRules) -> Self {
        Self { rules }
    }

    /// Surcharge, cess, rebate and net tax for `base_tax` on `taxable_income`.
    ///
    /// # Arguments
    ///
    /// * `base_tax` - Slab tax, already rounded to the rupee
    /// * `taxable_income` - The income the base tax was computed on; selects
    ///   the surcharge tier and decides rebate eligibility
    ///
    /// # Returns
    ///
    /// A [`ReliefBreakdown`] with every amount rounded to the rupee.
    ///
    /// # Errors
    ///
    /// Returns [`TaxComputationError`] if either amount is negative or the
    /// rules fail validation.
    ///
    /// # Examples
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use itr_core::ReliefRules;
    /// use itr_core::calculations::SurchargeReliefCalculator;
    ///
    /// let rules = ReliefRules::old_regime_default();
    /// let calculator = SurchargeReliefCalculator::new(&rules);
    ///
    /// // at the rebate ceiling the whole base tax is rebated, cess stays
    /// let at_ceiling = calculator.calculate(dec!(12500), dec!(500000)).unwrap();
    /// assert_eq!(at_ceiling.rebate, dec!(12500));
    /// assert_eq!(at_ceiling.net_tax_payable, dec!(500));
    ///
    /// let above = calculator.calculate(dec!(32500), dec!(600000)).unwrap();
    /// assert_eq!(above.rebate, dec!(0));
    /// assert_eq!(above.net_tax_payable, dec!(33800));
    /// ```
    pub fn calculate(
        &self,
        base_tax: Decimal,
        taxable_income: Decimal,
    ) -> Result<ReliefBreakdown, TaxComputationError> {
        if base_tax < Decimal::ZERO {
            return Err(TaxComputationError::NegativeBaseTax(base_tax));
        }
        if taxable_income < Decimal::ZERO {
            return Err(TaxComputationError::NegativeIncome(taxable_income));
        }
        self.rules.validate()?;

        let surcharge = self.surcharge(base_tax, taxable_income);
        let cess = self.cess(base_tax, surcharge);
        let rebate = self.rebate(base_tax, taxable_income);
        let net_tax_payable = max(base_tax + surcharge + cess - rebate, Decimal::ZERO);

        debug!(%base_tax, %surcharge, %cess, %rebate, %net_tax_payable, "relief applied");

        Ok(ReliefBreakdown {
            surcharge,
            cess,
            rebate,
            net_tax_payable,
        })
    }

    /// Rate of the first tier whose bound is open or at least the income.
    fn surcharge_rate(
        &self,
        taxable_income: Decimal,
    ) -> Decimal {
        self.rules
            .surcharge_tiers
            .iter()
            .find(|tier| tier.up_to.is_none_or(|bound| taxable_income <= bound))
            .map_or(Decimal::ZERO, |tier| tier.rate)
    }

    fn surcharge(
        &self,
        base_tax: Decimal,
        taxable_income: Decimal,
    ) -> Decimal {
        round_to_rupee(base_tax * self.surcharge_rate(taxable_income))
    }

    fn cess(
        &self,
        base_tax: Decimal,
        surcharge: Decimal,
    ) -> Decimal {
        round_to_rupee((base_tax + surcharge) * self.rules.cess_rate)
    }

    fn rebate(
        &self,
        base_tax: Decimal,
        taxable_income: Decimal,
    ) -> Decimal {
        if taxable_income <= self.rules.rebate_ceiling {
            self.rules.rebate_cap.min(base_tax)
        } else {
            Decimal::ZERO
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::calculations::SlabTaxCalculator;
    use crate::models::TaxSlabTable;

    fn old_rules() -> ReliefRules {
        ReliefRules::old_regime_default()
    }

    fn new_rules() -> ReliefRules {
        ReliefRules::new_regime_default()
    }

    // =========================================================================
    // Cess and net
    // =========================================================================

    #[test]
    fn cess_is_four_percent_of_tax_below_surcharge_floor() {
        let rules = old_rules();

        let result = SurchargeReliefCalculator::new(&rules)
            .calculate(dec!(32500), dec!(600000))
            .unwrap();

        assert_eq!(
            result,
            ReliefBreakdown {
                surcharge: dec!(0),
                cess: dec!(1300),
                rebate: dec!(0),
                net_tax_payable: dec!(33800),
            }
        );
    }

    #[test]
    fn zero_base_tax_gives_zero_net() {
        let rules = new_rules();

        let result = SurchargeReliefCalculator::new(&rules)
            .calculate(dec!(0), dec!(250000))
            .unwrap();

        assert_eq!(result.net_tax_payable, dec!(0));
        assert_eq!(result.rebate, dec!(0));
    }

    // =========================================================================
    // Rebate
    // =========================================================================

    #[test]
    fn old_regime_rebate_applies_at_ceiling() {
        let rules = old_rules();

        let result = SurchargeReliefCalculator::new(&rules)
            .calculate(dec!(12500), dec!(500000))
            .unwrap();

        assert_eq!(result.rebate, dec!(12500));
    }

    #[test]
    fn old_regime_rebate_lapses_one_rupee_above_ceiling() {
        let rules = old_rules();

        let result = SurchargeReliefCalculator::new(&rules)
            .calculate(dec!(12500), dec!(500001))
            .unwrap();

        assert_eq!(result.rebate, dec!(0));
    }

    #[test]
    fn new_regime_rebate_boundary() {
        let rules = new_rules();
        let table = TaxSlabTable::new_regime_default();
        let slab = SlabTaxCalculator::new(&table);
        let calculator = SurchargeReliefCalculator::new(&rules);

        let at_ceiling = calculator
            .calculate(slab.calculate(dec!(700000)).unwrap(), dec!(700000))
            .unwrap();
        let above_ceiling = calculator
            .calculate(slab.calculate(dec!(700001)).unwrap(), dec!(700001))
            .unwrap();

        assert_eq!(at_ceiling.rebate, dec!(25000));
        assert_eq!(above_ceiling.rebate, dec!(0));
    }

    #[test]
    fn rebate_never_exceeds_base_tax() {
        let rules = old_rules();

        let result = SurchargeReliefCalculator::new(&rules)
            .calculate(dec!(5000), dec!(350000))
            .unwrap();

        assert_eq!(result.rebate, dec!(5000));
        assert!(result.net_tax_payable >= Decimal::ZERO);
    }

    // =========================================================================
    // Surcharge tiers
    // =========================================================================

    #[test]
    fn surcharge_jumps_at_tier_boundary() {
        let rules = old_rules();
        let table = TaxSlabTable::old_regime_default();
        let slab = SlabTaxCalculator::new(&table);
        let calculator = SurchargeReliefCalculator::new(&rules);

        let at_floor = calculator
            .calculate(slab.calculate(dec!(5000000)).unwrap(), dec!(5000000))
            .unwrap();
        let base_above = slab.calculate(dec!(5000001)).unwrap();
        let above_floor = calculator.calculate(base_above, dec!(5000001)).unwrap();

        assert_eq!(at_floor.surcharge, dec!(0));
        assert_eq!(above_floor.surcharge, round_to_rupee(base_above * dec!(0.10)));
        assert_eq!(above_floor.surcharge, dec!(131250));
    }

    #[test]
    fn top_tier_differs_between_regimes() {
        let old = old_rules();
        let new = new_rules();

        let old_result = SurchargeReliefCalculator::new(&old)
            .calculate(dec!(1000000), dec!(60000000))
            .unwrap();
        let new_result = SurchargeReliefCalculator::new(&new)
            .calculate(dec!(1000000), dec!(60000000))
            .unwrap();

        assert_eq!(old_result.surcharge, dec!(370000));
        assert_eq!(new_result.surcharge, dec!(250000));
        assert_eq!(old_result.cess, dec!(54800));
    }

    #[test]
    fn tier_bound_is_inclusive() {
        let rules = old_rules();

        let result = SurchargeReliefCalculator::new(&rules)
            .calculate(dec!(100000), dec!(10000000))
            .unwrap();

        assert_eq!(result.surcharge, dec!(10000));
    }

    // =========================================================================
    // Errors
    // =========================================================================

    #[test]
    fn negative_base_tax_is_rejected() {
        let rules = old_rules();

        let result = SurchargeReliefCalculator::new(&rules).calculate(dec!(-1), dec!(100));

        assert_eq!(result, Err(TaxComputationError::NegativeBaseTax(dec!(-1))));
    }

    #[test]
    fn invalid_rules_are_rejected() {
        let rules = ReliefRules {
            surcharge_tiers: vec![],
            ..old_rules()
        };

        let result = SurchargeReliefCalculator::new(&rules).calculate(dec!(100), dec!(100));

        assert!(matches!(result, Err(TaxComputationError::InvalidRules(_))));
    }
}

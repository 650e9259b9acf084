//! Progressive slab taxation.
//!
//! Each bracket `(lower, upper]` contributes `rate × (min(income, upper) − lower)`
//! once income exceeds its lower bound. Income above the last finite bound
//! is taxed at the top rate for the excess only.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use itr_core::calculations::SlabTaxCalculator;
//! use itr_core::TaxSlabTable;
//!
//! let table = TaxSlabTable::old_regime_default();
//! let calculator = SlabTaxCalculator::new(&table);
//!
//! assert_eq!(calculator.calculate(dec!(600000)).unwrap(), dec!(32500));
//! ```

use rust_decimal::Decimal;
use tracing::debug;

use super::TaxComputationError;
use super::common::round_to_rupee;
use crate::models::TaxSlabTable;

/// Applies one [`TaxSlabTable`] to a taxable income.
///
/// Borrows the table; build one per table and reuse it for any number of
/// incomes.
#[derive(Debug, Clone, Copy)]
pub struct SlabTaxCalculator<'a> {
    table: &'a TaxSlabTable,
}

impl<'a> SlabTaxCalculator<'a> {
    /// Creates a calculator over `table`.
    pub fn new(table: &'a TaxSlabTable) -> Self {
        Self { table }
    }

    /// Base tax on `taxable_income`, rounded to the rupee.
    ///
    /// # Arguments
    ///
    /// * `taxable_income` - Income after every admitted reduction
    ///
    /// # Returns
    ///
    /// The sum over brackets of `rate × (min(income, upper) − lower)`.
    /// Income at or below the first bound of a zero-rate slab yields zero.
    ///
    /// # Errors
    ///
    /// Returns [`TaxComputationError::NegativeIncome`] for a negative income.
    pub fn calculate(
        &self,
        taxable_income: Decimal,
    ) -> Result<Decimal, TaxComputationError> {
        if taxable_income < Decimal::ZERO {
            return Err(TaxComputationError::NegativeIncome(taxable_income));
        }

        let mut tax = Decimal::ZERO;
        for (lower, upper, rate) in self.table.brackets() {
            if taxable_income <= lower {
                break;
            }
            let ceiling = upper.map_or(taxable_income, |u| u.min(taxable_income));
            tax += (ceiling - lower) * rate;
        }

        let tax = round_to_rupee(tax);
        debug!(%taxable_income, %tax, "slab tax computed");
        Ok(tax)
    }
}

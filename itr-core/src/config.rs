//! Rule parameters for the two regimes and the return's creation metadata.
//!
//! Nothing here is a process-wide constant: callers build a [`TaxRules`]
//! (usually from the TOML configuration) and hand it to the calculators.
//! The `Default` impls carry the assessment year 2024-25 values.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Regime, TaxSlabTable};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RulesError {
    #[error("cess rate must be between 0 and 1, got {0}")]
    InvalidCessRate(Decimal),

    #[error("rebate ceiling must be non-negative, got {0}")]
    InvalidRebateCeiling(Decimal),

    #[error("rebate cap must be non-negative, got {0}")]
    InvalidRebateCap(Decimal),

    #[error("standard deduction cap must be non-negative, got {0}")]
    InvalidStandardDeductionCap(Decimal),

    #[error("no surcharge tiers configured")]
    NoSurchargeTiers,

    #[error("surcharge tier {index} is invalid: {reason}")]
    InvalidSurchargeTier { index: usize, reason: String },
}

/// Surcharge applies at `rate` to incomes up to and including `up_to`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SurchargeTier {
    pub up_to: Option<Decimal>,
    pub rate: Decimal,
}

/// Parameters of the surcharge, cess and rebate step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReliefRules {
    pub surcharge_tiers: Vec<SurchargeTier>,
    pub cess_rate: Decimal,
    pub rebate_ceiling: Decimal,
    pub rebate_cap: Decimal,
}

impl ReliefRules {
    pub fn old_regime_default() -> Self {
        Self {
            surcharge_tiers: default_surcharge_tiers(dec!(0.37)),
            cess_rate: dec!(0.04),
            rebate_ceiling: dec!(500000),
            rebate_cap: dec!(12500),
        }
    }

    pub fn new_regime_default() -> Self {
        Self {
            surcharge_tiers: default_surcharge_tiers(dec!(0.25)),
            cess_rate: dec!(0.04),
            rebate_ceiling: dec!(700000),
            rebate_cap: dec!(25000),
        }
    }

    /// # Errors
    ///
    /// Returns [`RulesError`] if a rate is outside `[0, 1]`, an amount is
    /// negative, or the surcharge tiers are not an ordered scan ending in an
    /// unbounded tier.
    pub fn validate(&self) -> Result<(), RulesError> {
        if self.cess_rate < Decimal::ZERO || self.cess_rate > Decimal::ONE {
            return Err(RulesError::InvalidCessRate(self.cess_rate));
        }
        if self.rebate_ceiling < Decimal::ZERO {
            return Err(RulesError::InvalidRebateCeiling(self.rebate_ceiling));
        }
        if self.rebate_cap < Decimal::ZERO {
            return Err(RulesError::InvalidRebateCap(self.rebate_cap));
        }
        if self.surcharge_tiers.is_empty() {
            return Err(RulesError::NoSurchargeTiers);
        }

        let last = self.surcharge_tiers.len() - 1;
        let mut previous: Option<Decimal> = None;
        for (index, tier) in self.surcharge_tiers.iter().enumerate() {
            let invalid = |reason: &str| RulesError::InvalidSurchargeTier {
                index,
                reason: reason.to_string(),
            };
            if tier.rate < Decimal::ZERO || tier.rate > Decimal::ONE {
                return Err(invalid("rate must be between 0 and 1"));
            }
            match (tier.up_to, index == last) {
                (None, false) => return Err(invalid("only the last tier may be unbounded")),
                (Some(_), true) => return Err(invalid("last tier must be unbounded")),
                (Some(bound), false) => {
                    if previous.is_some_and(|p| bound <= p) {
                        return Err(invalid("bounds must be strictly increasing"));
                    }
                    previous = Some(bound);
                }
                (None, true) => {}
            }
        }
        Ok(())
    }
}

fn default_surcharge_tiers(top_rate: Decimal) -> Vec<SurchargeTier> {
    vec![
        SurchargeTier {
            up_to: Some(dec!(5000000)),
            rate: dec!(0),
        },
        SurchargeTier {
            up_to: Some(dec!(10000000)),
            rate: dec!(0.10),
        },
        SurchargeTier {
            up_to: Some(dec!(20000000)),
            rate: dec!(0.15),
        },
        SurchargeTier {
            up_to: Some(dec!(50000000)),
            rate: dec!(0.25),
        },
        SurchargeTier {
            up_to: None,
            rate: top_rate,
        },
    ]
}

/// Everything one regime calculator needs besides the income record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegimeRules {
    pub slabs: TaxSlabTable,
    #[serde(default = "default_standard_deduction_cap")]
    pub standard_deduction_cap: Decimal,
    pub relief: ReliefRules,
}

fn default_standard_deduction_cap() -> Decimal {
    dec!(50000)
}

impl RegimeRules {
    pub fn old_regime_default() -> Self {
        Self {
            slabs: TaxSlabTable::old_regime_default(),
            standard_deduction_cap: default_standard_deduction_cap(),
            relief: ReliefRules::old_regime_default(),
        }
    }

    pub fn new_regime_default() -> Self {
        Self {
            slabs: TaxSlabTable::new_regime_default(),
            standard_deduction_cap: default_standard_deduction_cap(),
            relief: ReliefRules::new_regime_default(),
        }
    }

    pub fn validate(&self) -> Result<(), RulesError> {
        if self.standard_deduction_cap < Decimal::ZERO {
            return Err(RulesError::InvalidStandardDeductionCap(
                self.standard_deduction_cap,
            ));
        }
        self.relief.validate()
    }
}

/// Rules for both regimes of one assessment year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRules {
    #[serde(default = "RegimeRules::old_regime_default")]
    pub old: RegimeRules,
    #[serde(default = "RegimeRules::new_regime_default")]
    pub new: RegimeRules,
}

impl TaxRules {
    pub fn for_regime(
        &self,
        regime: Regime,
    ) -> &RegimeRules {
        match regime {
            Regime::Old => &self.old,
            Regime::New => &self.new,
        }
    }

    /// Replaces the slab table of one regime, keeping its other parameters.
    pub fn with_slabs(
        mut self,
        regime: Regime,
        slabs: TaxSlabTable,
    ) -> Self {
        match regime {
            Regime::Old => self.old.slabs = slabs,
            Regime::New => self.new.slabs = slabs,
        }
        self
    }

    pub fn validate(&self) -> Result<(), RulesError> {
        self.old.validate()?;
        self.new.validate()
    }
}

impl Default for TaxRules {
    fn default() -> Self {
        Self {
            old: RegimeRules::old_regime_default(),
            new: RegimeRules::new_regime_default(),
        }
    }
}

/// Software identifiers written into the return's creation section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreationMetadata {
    pub sw_version_no: String,
    pub sw_created_by: String,
    pub json_created_by: String,
    pub intermediary_city: String,
    pub schema_version: String,
    pub form_version: String,
}

impl Default for CreationMetadata {
    fn default() -> Self {
        Self {
            sw_version_no: env!("CARGO_PKG_VERSION").to_string(),
            sw_created_by: "SW00000000".to_string(),
            json_created_by: "SW00000000".to_string(),
            intermediary_city: "Delhi".to_string(),
            schema_version: "Ver1.0".to_string(),
            form_version: "Ver1.0".to_string(),
        }
    }
}

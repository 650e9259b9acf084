use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SlabTableError {
    #[error("slab table has no slabs")]
    Empty,

    #[error("slab {index} has a non-positive upper bound {bound}")]
    NonPositiveBound { index: usize, bound: Decimal },

    #[error("slab {index} upper bound {bound} does not exceed the previous bound")]
    NotIncreasing { index: usize, bound: Decimal },

    #[error("slab {index} is unbounded but is not the last slab")]
    UnboundedBeforeLast { index: usize },

    #[error("last slab must be unbounded")]
    MissingUnboundedSlab,

    #[error("slab {index} rate must be between 0 and 1, got {rate}")]
    InvalidRate { index: usize, rate: Decimal },
}

/// One bracket: income up to `up_to` (exclusive of the previous bound) is
/// taxed at `rate`. `None` marks the open-ended top bracket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxSlab {
    #[serde(alias = "up_to")]
    pub up_to: Option<Decimal>,
    pub rate: Decimal,
}

impl TaxSlab {
    pub fn bounded(
        up_to: Decimal,
        rate: Decimal,
    ) -> Self {
        Self {
            up_to: Some(up_to),
            rate,
        }
    }

    pub fn unbounded(rate: Decimal) -> Self {
        Self { up_to: None, rate }
    }
}

/// Validated progressive slab table.
///
/// Finite bounds are positive and strictly increasing, and exactly the last
/// slab is unbounded. The checks also run on deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<TaxSlab>", into = "Vec<TaxSlab>")]
pub struct TaxSlabTable {
    slabs: Vec<TaxSlab>,
}

impl TaxSlabTable {
    pub fn new(slabs: Vec<TaxSlab>) -> Result<Self, SlabTableError> {
        validate_slabs(&slabs)?;
        Ok(Self { slabs })
    }

    /// Old regime, assessment year 2024-25.
    pub fn old_regime_default() -> Self {
        Self {
            slabs: vec![
                TaxSlab::bounded(dec!(250000), dec!(0)),
                TaxSlab::bounded(dec!(500000), dec!(0.05)),
                TaxSlab::bounded(dec!(1000000), dec!(0.20)),
                TaxSlab::unbounded(dec!(0.30)),
            ],
        }
    }

    /// New regime (section 115BAC), assessment year 2024-25.
    pub fn new_regime_default() -> Self {
        Self {
            slabs: vec![
                TaxSlab::bounded(dec!(300000), dec!(0)),
                TaxSlab::bounded(dec!(600000), dec!(0.05)),
                TaxSlab::bounded(dec!(900000), dec!(0.10)),
                TaxSlab::bounded(dec!(1200000), dec!(0.15)),
                TaxSlab::bounded(dec!(1500000), dec!(0.20)),
                TaxSlab::unbounded(dec!(0.30)),
            ],
        }
    }

    pub fn slabs(&self) -> &[TaxSlab] {
        &self.slabs
    }

    /// Iterates `(lower, upper, rate)` triples; the first lower bound is zero.
    pub fn brackets(&self) -> impl Iterator<Item = (Decimal, Option<Decimal>, Decimal)> + '_ {
        let lowers = std::iter::once(Decimal::ZERO)
            .chain(self.slabs.iter().filter_map(|slab| slab.up_to));
        lowers
            .zip(self.slabs.iter())
            .map(|(lower, slab)| (lower, slab.up_to, slab.rate))
    }
}

impl TryFrom<Vec<TaxSlab>> for TaxSlabTable {
    type Error = SlabTableError;

    fn try_from(slabs: Vec<TaxSlab>) -> Result<Self, Self::Error> {
        Self::new(slabs)
    }
}

impl From<TaxSlabTable> for Vec<TaxSlab> {
    fn from(table: TaxSlabTable) -> Self {
        table.slabs
    }
}

fn validate_slabs(slabs: &[TaxSlab]) -> Result<(), SlabTableError> {
    if slabs.is_empty() {
        return Err(SlabTableError::Empty);
    }

    let last = slabs.len() - 1;
    let mut previous = Decimal::ZERO;

    for (index, slab) in slabs.iter().enumerate() {
        if slab.rate < Decimal::ZERO || slab.rate > Decimal::ONE {
            return Err(SlabTableError::InvalidRate {
                index,
                rate: slab.rate,
            });
        }

        match slab.up_to {
            Some(bound) if bound <= Decimal::ZERO => {
                return Err(SlabTableError::NonPositiveBound { index, bound });
            }
            Some(bound) if bound <= previous => {
                return Err(SlabTableError::NotIncreasing { index, bound });
            }
            Some(_) if index == last => return Err(SlabTableError::MissingUnboundedSlab),
            Some(bound) => previous = bound,
            None if index != last => return Err(SlabTableError::UnboundedBeforeLast { index }),
            None => {}
        }
    }

    Ok(())
}

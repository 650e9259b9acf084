use std::collections::BTreeMap;
use std::io::Read;

use itr_core::{
    Regime, RepositoryError, ReturnRepository, SlabTableError, TaxRules, TaxSlab, TaxSlabTable,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur when loading slab data.
#[derive(Debug, Error)]
pub enum TaxSlabLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("Slabs for {assessment_year} {regime} are not a valid table: {source}")]
    InvalidTable {
        assessment_year: String,
        regime: Regime,
        #[source]
        source: SlabTableError,
    },

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<csv::Error> for TaxSlabLoaderError {
    fn from(err: csv::Error) -> Self {
        TaxSlabLoaderError::CsvParse(err.to_string())
    }
}

/// A single record from the slab CSV file.
///
/// - `assessment_year`: e.g. `2024-25`
/// - `regime`: `OLD` or `NEW`, any case
/// - `up_to`: upper bound of the slab, empty for the open-ended top slab
/// - `rate`: marginal rate as a fraction (e.g. `0.05`)
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TaxSlabRecord {
    pub assessment_year: String,
    #[serde(deserialize_with = "deserialize_regime")]
    pub regime: Regime,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub up_to: Option<Decimal>,
    pub rate: Decimal,
}

impl TaxSlabRecord {
    pub fn slab(&self) -> TaxSlab {
        TaxSlab {
            up_to: self.up_to,
            rate: self.rate,
        }
    }
}

fn deserialize_regime<'de, D>(deserializer: D) -> Result<Regime, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    Regime::parse(&s)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid regime '{}'", s.trim())))
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Loader for slab tables from CSV files into any [`ReturnRepository`].
pub struct TaxSlabLoader;

impl TaxSlabLoader {
    /// Parse slab records from a CSV reader.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<TaxSlabRecord>, TaxSlabLoaderError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: TaxSlabRecord = result?;
            records.push(record);
        }

        Ok(records)
    }

    /// Groups `records` by (assessment year, regime) and validates each
    /// group as a [`TaxSlabTable`], keeping file order within a group.
    pub fn tables(
        records: &[TaxSlabRecord]
    ) -> Result<BTreeMap<(String, Regime), TaxSlabTable>, TaxSlabLoaderError> {
        let mut groups: BTreeMap<(String, Regime), Vec<TaxSlab>> = BTreeMap::new();
        for record in records {
            groups
                .entry((record.assessment_year.clone(), record.regime))
                .or_default()
                .push(record.slab());
        }

        groups
            .into_iter()
            .map(|((assessment_year, regime), slabs)| {
                let table = TaxSlabTable::new(slabs).map_err(|source| {
                    TaxSlabLoaderError::InvalidTable {
                        assessment_year: assessment_year.clone(),
                        regime,
                        source,
                    }
                })?;
                Ok(((assessment_year, regime), table))
            })
            .collect()
    }

    /// Load slab records into the repository.
    ///
    /// Every (assessment year, regime) group is validated before anything
    /// is written. Each group then replaces the stored slabs for that year
    /// and regime, so loading the same file twice gives the same result.
    /// Returns the number of slabs inserted.
    pub async fn load<R>(
        repo: &R,
        records: &[TaxSlabRecord],
    ) -> Result<usize, TaxSlabLoaderError>
    where
        R: ReturnRepository + ?Sized,
    {
        let tables = Self::tables(records)?;
        let mut inserted = 0;

        for ((assessment_year, regime), table) in &tables {
            repo.delete_tax_slabs(assessment_year, *regime).await?;
            for slab in table.slabs() {
                repo.insert_tax_slab(assessment_year, *regime, slab).await?;
                inserted += 1;
            }
            debug!(%assessment_year, %regime, slabs = table.slabs().len(), "slab table replaced");
        }

        info!(tables = tables.len(), inserted, "slab tables loaded");
        Ok(inserted)
    }
}

/// Overlays the stored slab tables for `assessment_year` onto `base`.
///
/// A regime with no stored slabs keeps the table from `base`.
pub async fn rules_from_repository<R>(
    repo: &R,
    assessment_year: &str,
    base: TaxRules,
) -> Result<TaxRules, TaxSlabLoaderError>
where
    R: ReturnRepository + ?Sized,
{
    let mut rules = base;
    for regime in Regime::ALL {
        let slabs = repo.get_tax_slabs(assessment_year, regime).await?;
        if slabs.is_empty() {
            debug!(%assessment_year, %regime, "no stored slabs, keeping configured table");
            continue;
        }
        let table = TaxSlabTable::new(slabs).map_err(|source| TaxSlabLoaderError::InvalidTable {
            assessment_year: assessment_year.to_string(),
            regime,
            source,
        })?;
        rules = rules.with_slabs(regime, table);
    }
    Ok(rules)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    const TEST_CSV: &str = r#"assessment_year,regime,up_to,rate
2024-25,OLD,250000,0
2024-25,OLD,500000,0.05
2024-25,OLD,1000000,0.20
2024-25,OLD,,0.30
2024-25,new,300000,0
2024-25,new,600000,0.05
2024-25,new,900000,0.10
2024-25,new,1200000,0.15
2024-25,new,1500000,0.20
2024-25,new,,0.30
"#;

    #[test]
    fn test_parse_csv_single_slab() {
        let csv = "assessment_year,regime,up_to,rate\n2024-25,OLD,250000,0";

        let records = TaxSlabLoader::parse(csv.as_bytes()).expect("Failed to parse CSV");

        assert_eq!(
            records,
            vec![TaxSlabRecord {
                assessment_year: "2024-25".to_string(),
                regime: Regime::Old,
                up_to: Some(dec!(250000)),
                rate: dec!(0),
            }]
        );
    }

    #[test]
    fn test_parse_csv_unbounded_slab() {
        let csv = "assessment_year,regime,up_to,rate\n2024-25,NEW,,0.30";

        let records = TaxSlabLoader::parse(csv.as_bytes()).expect("Failed to parse CSV");

        assert_eq!(records[0].up_to, None);
        assert_eq!(records[0].regime, Regime::New);
        assert_eq!(records[0].rate, dec!(0.30));
    }

    #[test]
    fn test_tables_match_builtin_defaults() {
        let records = TaxSlabLoader::parse(TEST_CSV.as_bytes()).expect("Failed to parse CSV");

        let tables = TaxSlabLoader::tables(&records).expect("valid tables");

        assert_eq!(tables.len(), 2);
        assert_eq!(
            tables[&("2024-25".to_string(), Regime::Old)],
            TaxSlabTable::old_regime_default()
        );
        assert_eq!(
            tables[&("2024-25".to_string(), Regime::New)],
            TaxSlabTable::new_regime_default()
        );
    }

    #[test]
    fn test_tables_reject_missing_top_slab() {
        let csv = "assessment_year,regime,up_to,rate\n2024-25,OLD,250000,0\n2024-25,OLD,500000,0.05";
        let records = TaxSlabLoader::parse(csv.as_bytes()).expect("Failed to parse CSV");

        let err = TaxSlabLoader::tables(&records).expect_err("table has no open-ended slab");

        match err {
            TaxSlabLoaderError::InvalidTable {
                assessment_year,
                regime,
                source,
            } => {
                assert_eq!(assessment_year, "2024-25");
                assert_eq!(regime, Regime::Old);
                assert_eq!(source, SlabTableError::MissingUnboundedSlab);
            }
            other => panic!("expected InvalidTable, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_invalid_regime() {
        let csv = "assessment_year,regime,up_to,rate\n2024-25,FLAT,250000,0";

        let err = TaxSlabLoader::parse(csv.as_bytes()).expect_err("Should fail for bad regime");

        let TaxSlabLoaderError::CsvParse(msg) = err else {
            panic!("Expected CsvParse error, got: {:?}", err);
        };
        assert!(msg.contains("invalid regime 'FLAT'"), "got: {}", msg);
    }

    #[test]
    fn test_parse_invalid_csv_missing_column() {
        let csv = "assessment_year,regime\n2024-25,OLD";

        let err = TaxSlabLoader::parse(csv.as_bytes()).expect_err("Should fail for missing column");

        let TaxSlabLoaderError::CsvParse(msg) = err else {
            panic!("Expected CsvParse error, got: {:?}", err);
        };
        assert!(msg.contains("missing field"), "got: {}", msg);
    }

    #[test]
    fn test_parse_empty_csv() {
        let csv = "assessment_year,regime,up_to,rate\n";

        let records = TaxSlabLoader::parse(csv.as_bytes()).expect("Failed to parse CSV");

        assert!(records.is_empty());
    }
}

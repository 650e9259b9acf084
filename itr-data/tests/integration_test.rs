//! Slab loading, rule overlay and income reading against an in-memory
//! SQLite backend.

use std::path::Path;

use itr_core::calculations::RegimeComparator;
use itr_core::{Regime, ReturnRepository, TaxRules, TaxSlab, TaxSlabTable};
use itr_data::{
    AppConfig, TaxSlabLoader, TaxSlabLoaderError, read_income_record, rules_from_repository,
};
use itr_db_sqlite::SqliteRepository;
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;
use sqlx::sqlite::SqlitePoolOptions;

const SLABS_2024_25: &str = include_str!("../test-data/tax_slabs_2024_25.csv");
const SLABS_2025_26: &str = include_str!("../test-data/tax_slabs_2025_26.csv");

/// Migrated database with no seed data.
async fn setup_test_db() -> SqliteRepository {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");

    let repo = SqliteRepository::new_with_pool(pool).await;
    repo.run_migrations()
        .await
        .expect("Failed to run migrations");
    repo
}

fn sample_income_path() -> &'static Path {
    Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/test-data/income_sample.json"))
}

// =============================================================================
// Slab loading
// =============================================================================

#[tokio::test]
async fn test_load_2024_25_slabs() {
    let repo = setup_test_db().await;

    let records = TaxSlabLoader::parse(SLABS_2024_25.as_bytes()).expect("Failed to parse CSV");
    let inserted = TaxSlabLoader::load(&repo, &records)
        .await
        .expect("Failed to load slabs");

    assert_eq!(inserted, 10);
    assert_eq!(
        repo.get_tax_slabs("2024-25", Regime::Old).await.unwrap(),
        TaxSlabTable::old_regime_default().slabs().to_vec()
    );
    assert_eq!(
        repo.get_tax_slabs("2024-25", Regime::New).await.unwrap(),
        TaxSlabTable::new_regime_default().slabs().to_vec()
    );
    assert_eq!(repo.list_assessment_years().await.unwrap(), vec!["2024-25"]);
}

#[tokio::test]
async fn test_load_is_idempotent() {
    let repo = setup_test_db().await;
    let records = TaxSlabLoader::parse(SLABS_2024_25.as_bytes()).unwrap();

    TaxSlabLoader::load(&repo, &records).await.unwrap();
    TaxSlabLoader::load(&repo, &records).await.unwrap();

    assert_eq!(repo.get_tax_slabs("2024-25", Regime::Old).await.unwrap().len(), 4);
    assert_eq!(repo.get_tax_slabs("2024-25", Regime::New).await.unwrap().len(), 6);
}

#[tokio::test]
async fn test_load_preserves_other_years() {
    let repo = setup_test_db().await;

    let first = TaxSlabLoader::parse(SLABS_2024_25.as_bytes()).unwrap();
    let second = TaxSlabLoader::parse(SLABS_2025_26.as_bytes()).unwrap();
    TaxSlabLoader::load(&repo, &first).await.unwrap();
    TaxSlabLoader::load(&repo, &second).await.unwrap();

    assert_eq!(repo.get_tax_slabs("2024-25", Regime::New).await.unwrap().len(), 6);
    assert_eq!(
        repo.get_tax_slabs("2025-26", Regime::New).await.unwrap()[1],
        TaxSlab::bounded(dec!(700000), dec!(0.05))
    );
    assert!(repo.get_tax_slabs("2025-26", Regime::Old).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_table_writes_nothing() {
    let repo = setup_test_db().await;
    let csv = "assessment_year,regime,up_to,rate\n\
               2024-25,OLD,250000,0\n\
               2024-25,OLD,,0.30\n\
               2024-25,NEW,600000,0.05\n\
               2024-25,NEW,300000,0\n\
               2024-25,NEW,,0.30\n";
    let records = TaxSlabLoader::parse(csv.as_bytes()).unwrap();

    let result = TaxSlabLoader::load(&repo, &records).await;

    assert!(matches!(
        result,
        Err(TaxSlabLoaderError::InvalidTable { regime: Regime::New, .. })
    ));
    assert!(repo.get_tax_slabs("2024-25", Regime::Old).await.unwrap().is_empty());
}

// =============================================================================
// Rules from stored slabs
// =============================================================================

#[tokio::test]
async fn test_rules_from_repository_overlays_stored_tables() {
    let repo = setup_test_db().await;
    let records = TaxSlabLoader::parse(SLABS_2025_26.as_bytes()).unwrap();
    TaxSlabLoader::load(&repo, &records).await.unwrap();

    let rules = rules_from_repository(&repo, "2025-26", TaxRules::default())
        .await
        .unwrap();

    assert_eq!(rules.old, TaxRules::default().old);
    assert_eq!(rules.new.slabs.slabs()[1], TaxSlab::bounded(dec!(700000), dec!(0.05)));
    assert_eq!(rules.new.relief, TaxRules::default().new.relief);
}

#[tokio::test]
async fn test_rules_from_empty_repository_are_the_base_rules() {
    let repo = setup_test_db().await;

    let rules = rules_from_repository(&repo, "2024-25", TaxRules::default())
        .await
        .unwrap();

    assert_eq!(rules, TaxRules::default());
}

// =============================================================================
// Income records through the engine
// =============================================================================

#[test]
fn test_sample_income_compares_to_new_regime() {
    let income = read_income_record(sample_income_path()).expect("sample income");
    let config = AppConfig::default();

    let outcome = RegimeComparator::from_rules(&config.rules)
        .unwrap()
        .compare(&income)
        .unwrap();

    assert_eq!(income.gross_salary_total(), dec!(1162000));
    assert_eq!(outcome.old_regime.taxable_income, dec!(838600));
    assert_eq!(outcome.old_regime.base_tax, dec!(80220));
    assert_eq!(outcome.new_regime.taxable_income, dec!(1112000));
    assert_eq!(outcome.new_regime.base_tax, dec!(76800));
    assert_eq!(outcome.new_regime.cess, dec!(3072));
    assert_eq!(outcome.new_regime.net_tax_payable, dec!(79872));
    assert_eq!(outcome.comparison.recommendation, Regime::New);
}

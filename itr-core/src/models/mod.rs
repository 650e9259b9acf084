mod income;
mod regime;
mod tax_computation;
mod tax_slab;
mod user_input;

pub use income::{
    AGGREGATE_EXEMPTION_NATURE, Address, ChapterViADeduction, DeductionSection, Employee,
    Employer, Employment, ExemptAllowance, IncomeShapeError, NormalizedIncomeRecord, PersonName,
    SalaryComponents,
};
pub use regime::Regime;
pub use tax_computation::{ComparisonOutcome, RegimeComparison, TaxComputationResult};
pub use tax_slab::{SlabTableError, TaxSlab, TaxSlabTable};
pub use user_input::{CURRENT_SCHEMA_VERSION, UserInputDocument, UserInputKey};

//! Normalized income statement, as handed over by the statement extractor.
//!
//! The record is treated as immutable input: calculators and the assembler
//! read it, nothing writes it back.
//!
//! Two JSON shapes are accepted. The itemized shape lists `employments` and
//! `deductions`. The totals shape carries `grossSalaryTotal`,
//! `admissibleExemptionsTotal`, `admissibleDeductionsTotal` and
//! `taxAlreadyWithheld` (plus an optional `employer`), and is read as a
//! single employment with one aggregate exemption line and one
//! [`DeductionSection::Unclassified`] deduction. Unknown keys are rejected
//! in both shapes, and a record may not mix them.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Address {
    pub flat_or_door: String,
    pub premises: String,
    pub street: String,
    pub locality: String,
    pub city: String,
    pub state_code: String,
    pub country_code: String,
    pub pin_code: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonName {
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
}

/// The payee: the individual filing the return.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Employee {
    pub name: PersonName,
    pub pan: String,
    pub date_of_birth: Option<NaiveDate>,
    pub address: Address,
    pub email: String,
    pub mobile: String,
}

/// The payer of one salary stream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Employer {
    pub name: String,
    pub tan: String,
    pub address: Address,
}

/// Salary split by the three heads of section 17.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SalaryComponents {
    /// Section 17(1).
    pub salary: Decimal,
    /// Section 17(2).
    pub perquisites: Decimal,
    /// Section 17(3).
    pub profits_in_lieu: Decimal,
}

impl SalaryComponents {
    pub fn gross(&self) -> Decimal {
        self.salary + self.perquisites + self.profits_in_lieu
    }
}

/// An allowance exempt under section 10 (HRA, LTA, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExemptAllowance {
    pub nature: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Employment {
    pub employer: Employer,
    pub salary: SalaryComponents,
    pub exempt_allowances: Vec<ExemptAllowance>,
    pub professional_tax: Decimal,
    pub tax_withheld: Decimal,
}

impl Employment {
    pub fn gross_salary(&self) -> Decimal {
        self.salary.gross()
    }

    pub fn exemptions_total(&self) -> Decimal {
        self.exempt_allowances.iter().map(|a| a.amount).sum()
    }
}

/// Chapter VI-A sections recognised by the return schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DeductionSection {
    #[serde(rename = "80C")]
    Section80C,
    #[serde(rename = "80CCC")]
    Section80CCC,
    #[serde(rename = "80CCD(1)")]
    Section80CCD1,
    #[serde(rename = "80CCD(1B)")]
    Section80CCD1B,
    /// Employer contribution to NPS.
    #[serde(rename = "80CCD(2)")]
    Section80CCD2,
    #[serde(rename = "80D")]
    Section80D,
    #[serde(rename = "80DD")]
    Section80DD,
    #[serde(rename = "80E")]
    Section80E,
    #[serde(rename = "80G")]
    Section80G,
    #[serde(rename = "80TTA")]
    Section80TTA,
    #[serde(rename = "80TTB")]
    Section80TTB,
    /// A deduction known only as part of an aggregate total.
    #[serde(rename = "unclassified")]
    Unclassified,
}

impl DeductionSection {
    pub const ALL: [DeductionSection; 12] = [
        Self::Section80C,
        Self::Section80CCC,
        Self::Section80CCD1,
        Self::Section80CCD1B,
        Self::Section80CCD2,
        Self::Section80D,
        Self::Section80DD,
        Self::Section80E,
        Self::Section80G,
        Self::Section80TTA,
        Self::Section80TTB,
        Self::Unclassified,
    ];

    /// Key of this section inside the chapter VI-A schedule.
    pub fn schema_key(&self) -> &'static str {
        match self {
            Self::Section80C => "Section80C",
            Self::Section80CCC => "Section80CCC",
            Self::Section80CCD1 => "Section80CCDEmployeeOrSE",
            Self::Section80CCD1B => "Section80CCD1B",
            Self::Section80CCD2 => "Section80CCDEmployer",
            Self::Section80D => "Section80D",
            Self::Section80DD => "Section80DD",
            Self::Section80E => "Section80E",
            Self::Section80G => "Section80G",
            Self::Section80TTA => "Section80TTA",
            Self::Section80TTB => "Section80TTB",
            Self::Unclassified => "OtherDeductions",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterViADeduction {
    pub section: DeductionSection,
    pub amount: Decimal,
}

/// Everything the engine knows about one filer's salary year.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "IncomeRecordInput")]
pub struct NormalizedIncomeRecord {
    /// Assessment year in `YYYY-YY` form, e.g. `2024-25`.
    pub assessment_year: String,
    pub employee: Employee,
    pub employments: Vec<Employment>,
    /// Standard deduction as claimed on the statement, before regime caps.
    pub standard_deduction: Decimal,
    pub deductions: Vec<ChapterViADeduction>,
}

impl NormalizedIncomeRecord {
    pub fn gross_salary_total(&self) -> Decimal {
        self.employments.iter().map(Employment::gross_salary).sum()
    }

    pub fn exemptions_total(&self) -> Decimal {
        self.employments.iter().map(Employment::exemptions_total).sum()
    }

    pub fn professional_tax_total(&self) -> Decimal {
        self.employments.iter().map(|e| e.professional_tax).sum()
    }

    pub fn chapter_vi_a_total(&self) -> Decimal {
        self.deductions.iter().map(|d| d.amount).sum()
    }

    pub fn tax_already_withheld(&self) -> Decimal {
        self.employments.iter().map(|e| e.tax_withheld).sum()
    }

    /// Sum of all claimed amounts under one chapter VI-A section.
    pub fn deduction_for(
        &self,
        section: DeductionSection,
    ) -> Decimal {
        self.deductions
            .iter()
            .filter(|d| d.section == section)
            .map(|d| d.amount)
            .sum()
    }
}

/// Nature recorded for the exemption line built from an aggregate total.
pub const AGGREGATE_EXEMPTION_NATURE: &str = "Aggregate exempt allowances";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IncomeShapeError {
    #[error("'{total}' cannot be combined with itemized '{itemized}'")]
    MixedShapes {
        total: &'static str,
        itemized: &'static str,
    },
}

/// Wire form of [`NormalizedIncomeRecord`], accepting either shape.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
struct IncomeRecordInput {
    assessment_year: String,
    employee: Employee,
    employments: Vec<Employment>,
    standard_deduction: Decimal,
    deductions: Vec<ChapterViADeduction>,
    employer: Option<Employer>,
    gross_salary_total: Option<Decimal>,
    admissible_exemptions_total: Option<Decimal>,
    admissible_deductions_total: Option<Decimal>,
    tax_already_withheld: Option<Decimal>,
}

impl IncomeRecordInput {
    fn salary_totals_given(&self) -> Option<&'static str> {
        if self.gross_salary_total.is_some() {
            Some("grossSalaryTotal")
        } else if self.admissible_exemptions_total.is_some() {
            Some("admissibleExemptionsTotal")
        } else if self.tax_already_withheld.is_some() {
            Some("taxAlreadyWithheld")
        } else if self.employer.is_some() {
            Some("employer")
        } else {
            None
        }
    }
}

impl TryFrom<IncomeRecordInput> for NormalizedIncomeRecord {
    type Error = IncomeShapeError;

    fn try_from(input: IncomeRecordInput) -> Result<Self, Self::Error> {
        let salary_total = input.salary_totals_given();
        if let Some(total) = salary_total
            && !input.employments.is_empty()
        {
            return Err(IncomeShapeError::MixedShapes {
                total,
                itemized: "employments",
            });
        }
        if input.admissible_deductions_total.is_some() && !input.deductions.is_empty() {
            return Err(IncomeShapeError::MixedShapes {
                total: "admissibleDeductionsTotal",
                itemized: "deductions",
            });
        }

        let mut employments = input.employments;
        if salary_total.is_some() {
            let exempt_allowances = input
                .admissible_exemptions_total
                .filter(|amount| !amount.is_zero())
                .map(|amount| ExemptAllowance {
                    nature: AGGREGATE_EXEMPTION_NATURE.to_string(),
                    amount,
                })
                .into_iter()
                .collect();
            employments.push(Employment {
                employer: input.employer.unwrap_or_default(),
                salary: SalaryComponents {
                    salary: input.gross_salary_total.unwrap_or_default(),
                    ..Default::default()
                },
                exempt_allowances,
                professional_tax: Decimal::ZERO,
                tax_withheld: input.tax_already_withheld.unwrap_or_default(),
            });
        }

        let mut deductions = input.deductions;
        if let Some(amount) = input.admissible_deductions_total
            && !amount.is_zero()
        {
            deductions.push(ChapterViADeduction {
                section: DeductionSection::Unclassified,
                amount,
            });
        }

        Ok(Self {
            assessment_year: input.assessment_year,
            employee: input.employee,
            employments,
            standard_deduction: input.standard_deduction,
            deductions,
        })
    }
}

//! Builds the canonical return document from an income record and one
//! regime's computation.
//!
//! Every total written here is derived from the constituents written next
//! to it, and the tax liability is cross-checked against the computation
//! it came from. Any failure yields an error, never a partial document.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

use super::schema::*;
use crate::calculations::common::round_to_rupee;
use crate::calculations::{RegimeCalculator, TaxComputationError};
use crate::config::CreationMetadata;
use crate::models::{Address, Employment, NormalizedIncomeRecord, Regime, TaxComputationResult};

static PAN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Z]{5}[0-9]{4}[A-Z]$").expect("PAN pattern compiles")
});

static ASSESSMENT_YEAR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4})-\d{2}$").expect("assessment year pattern compiles")
});

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AssemblyError {
    #[error("required identity field is missing: {0}")]
    MissingIdentityField(&'static str),

    #[error("{field} '{value}' is not well formed")]
    InvalidIdentifier { field: &'static str, value: String },

    #[error("assessment year '{0}' is not in YYYY-YY form")]
    InvalidAssessmentYear(String),

    #[error("amount {0} does not fit a whole-rupee field")]
    AmountOutOfRange(Decimal),

    #[error("{field} assembled as {assembled} but the computation says {computed}")]
    InconsistentResult {
        field: &'static str,
        assembled: i64,
        computed: i64,
    },

    #[error("tax computation failed: {0}")]
    Computation(#[from] TaxComputationError),

    #[error("failed to serialize return document: {0}")]
    Serialization(String),
}

/// Assembles ITR-2 documents stamped with fixed creation metadata.
#[derive(Debug, Clone, Default)]
pub struct ReturnAssembler {
    creation: CreationMetadata,
}

impl ReturnAssembler {
    pub fn new(creation: CreationMetadata) -> Self {
        Self { creation }
    }

    /// Runs `calculator` on `income` and assembles the result in one step.
    ///
    /// # Errors
    ///
    /// Returns [`AssemblyError::Computation`] if the calculation fails, or
    /// any error [`ReturnAssembler::assemble`] can return.
    pub fn assemble_for_regime(
        &self,
        income: &NormalizedIncomeRecord,
        calculator: &RegimeCalculator,
        created_on: NaiveDate,
    ) -> Result<ReturnDocument, AssemblyError> {
        let result = calculator.calculate(income)?;
        self.assemble(income, &result, created_on)
    }

    /// # Errors
    ///
    /// Returns [`AssemblyError`] if the identity is incomplete, an amount
    /// cannot be represented, or the assembled total income or liability
    /// disagrees with `result`.
    pub fn assemble(
        &self,
        income: &NormalizedIncomeRecord,
        result: &TaxComputationResult,
        created_on: NaiveDate,
    ) -> Result<ReturnDocument, AssemblyError> {
        let form = self.form_info(&income.assessment_year)?;
        let part_a_gen1 = self.part_a_gen1(income, result.regime)?;
        let schedule_s = self.schedule_s(income, result)?;
        let schedule_via = self.schedule_via(result)?;
        let part_b_ti = self.part_b_ti(&schedule_s, &schedule_via);
        check("TotalIncome", part_b_ti.total_income, result.taxable_income)?;
        let schedule_tds1 = self.schedule_tds1(income)?;
        let part_b_tti = self.part_b_tti(result, &schedule_tds1)?;

        debug!(regime = %result.regime, "return document assembled");
        info!(
            pan = %part_a_gen1.personal_info.pan,
            regime = %result.regime,
            net_tax_liability = part_b_tti.computation_of_tax_liability.net_tax_liability,
            "return assembled"
        );

        Ok(ReturnDocument {
            itr: ItrEnvelope {
                itr2: Itr2 {
                    creation_info: self.creation_info(created_on),
                    form,
                    part_a_gen1,
                    schedule_s,
                    schedule_via,
                    part_b_ti,
                    part_b_tti,
                    schedule_tds1,
                },
            },
        })
    }

    fn creation_info(
        &self,
        created_on: NaiveDate,
    ) -> CreationInfo {
        CreationInfo {
            sw_version_no: self.creation.sw_version_no.clone(),
            sw_created_by: self.creation.sw_created_by.clone(),
            json_created_by: self.creation.json_created_by.clone(),
            json_creation_date: created_on.format("%Y-%m-%d").to_string(),
            intermediary_city: self.creation.intermediary_city.clone(),
            digest: "-".to_string(),
        }
    }

    fn form_info(
        &self,
        assessment_year: &str,
    ) -> Result<FormInfo, AssemblyError> {
        let year = ASSESSMENT_YEAR_PATTERN
            .captures(assessment_year.trim())
            .and_then(|c| c.get(1))
            .ok_or_else(|| AssemblyError::InvalidAssessmentYear(assessment_year.to_string()))?;

        Ok(FormInfo {
            form_name: "ITR-2".to_string(),
            description: "For Individuals and HUFs not having income from profits and gains of business or profession".to_string(),
            assessment_year: year.as_str().to_string(),
            schema_ver: self.creation.schema_version.clone(),
            form_ver: self.creation.form_version.clone(),
        })
    }

    fn part_a_gen1(
        &self,
        income: &NormalizedIncomeRecord,
        regime: Regime,
    ) -> Result<PartAGen1, AssemblyError> {
        let employee = &income.employee;

        let surname = employee.name.last_name.trim();
        if surname.is_empty() {
            return Err(AssemblyError::MissingIdentityField("surname"));
        }

        let pan = employee.pan.trim().to_ascii_uppercase();
        if pan.is_empty() {
            return Err(AssemblyError::MissingIdentityField("PAN"));
        }
        if !PAN_PATTERN.is_match(&pan) {
            return Err(AssemblyError::InvalidIdentifier {
                field: "PAN",
                value: employee.pan.clone(),
            });
        }

        Ok(PartAGen1 {
            personal_info: PersonalInfo {
                assessee_name: AssesseeName {
                    first_name: employee.name.first_name.trim().to_string(),
                    middle_name: employee.name.middle_name.trim().to_string(),
                    sur_name_or_org_name: surname.to_string(),
                },
                pan,
                address: residence_address(&employee.address, &employee.mobile, &employee.email),
                dob: employee
                    .date_of_birth
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_default(),
                status: "I".to_string(),
            },
            filing_status: FilingStatus {
                return_file_sec: 11,
                opt_out_new_tax_regime: regime.opt_out_flag().to_string(),
                seventh_provisio_139: "N".to_string(),
            },
        })
    }

    fn schedule_s(
        &self,
        income: &NormalizedIncomeRecord,
        result: &TaxComputationResult,
    ) -> Result<ScheduleS, AssemblyError> {
        let exemptions_admitted = result.regime == Regime::Old;

        let mut salaries = Vec::with_capacity(income.employments.len());
        let mut details = Vec::new();
        for employment in &income.employments {
            let employer_details = if exemptions_admitted {
                exempt_details(employment)?
            } else {
                Vec::new()
            };
            let exempt: i64 = employer_details.iter().map(|d| d.sal_oth_amount).sum();
            salaries.push(salary_entry(employment, exempt)?);
            details.extend(employer_details);
        }

        let total_gross_salary: i64 = salaries.iter().map(|s| s.salarys.gross_salary).sum();
        let total_exempt: i64 = details.iter().map(|d| d.sal_oth_amount).sum();
        let net_salary = total_gross_salary - total_exempt;
        let standard_deduction = rupees(result.standard_deduction_allowed)?;
        let professional_tax = rupees(result.professional_tax_allowed)?;
        let deduction_us16 = standard_deduction + professional_tax;

        Ok(ScheduleS {
            salaries,
            total_gross_salary,
            allwnc_exempt_us10: AllowancesExempt {
                details,
                total: total_exempt,
            },
            net_salary,
            deduction_us16,
            deduction_under_section_16ia: standard_deduction,
            professional_tax_us16iii: professional_tax,
            tot_inc_under_head_salaries: (net_salary - deduction_us16).max(0),
        })
    }

    fn schedule_via(
        &self,
        result: &TaxComputationResult,
    ) -> Result<ScheduleVia, AssemblyError> {
        let mut deductions = ChapterViaDeductions::default();
        for item in &result.chapter_vi_a_allowed {
            *deductions.slot_mut(item.section) += rupees(item.amount)?;
        }
        deductions.total_chap_via_deductions = deductions.sections_sum();

        Ok(ScheduleVia {
            deduct_und_chap_via: deductions,
        })
    }

    fn part_b_ti(
        &self,
        schedule_s: &ScheduleS,
        schedule_via: &ScheduleVia,
    ) -> PartBTi {
        let salaries = schedule_s.tot_inc_under_head_salaries;
        let gross_total_income = salaries;
        let deductions = schedule_via.deduct_und_chap_via.total_chap_via_deductions;

        PartBTi {
            salaries,
            gross_total_income,
            deductions_under_schedule_via: deductions,
            total_income: (gross_total_income - deductions).max(0),
        }
    }

    fn part_b_tti(
        &self,
        result: &TaxComputationResult,
        schedule_tds1: &ScheduleTds1,
    ) -> Result<PartBTti, AssemblyError> {
        let base_tax = rupees(result.base_tax)?;
        let rebate = rupees(result.rebate)?;
        let surcharge = rupees(result.surcharge)?;
        let cess = rupees(result.cess)?;

        let tax_payable_on_rebate = (base_tax - rebate).max(0);
        let gross_tax_liability = tax_payable_on_rebate + surcharge + cess;
        let tax_relief = TaxRelief::default();
        let net_tax_liability = gross_tax_liability - tax_relief.tot_tax_relief;

        check("NetTaxLiability", net_tax_liability, result.net_tax_payable)?;

        let tds = schedule_tds1.total_tds_on_salaries;
        let taxes_paid = TaxesPaid {
            advance_tax: 0,
            tds,
            tcs: 0,
            self_assessment_tax: 0,
            total_taxes_paid: tds,
        };
        let balance = net_tax_liability - taxes_paid.total_taxes_paid;

        Ok(PartBTti {
            computation_of_tax_liability: ComputationOfTaxLiability {
                tax_payable_on_ti: TaxPayableOnTi {
                    tax_at_normal_rates_on_aggr_inc: base_tax,
                    tax_at_special_rates: 0,
                    tax_payable_on_tot_inc: base_tax,
                },
                rebate_87a: rebate,
                tax_payable_on_rebate,
                surcharge,
                education_cess: cess,
                gross_tax_liability,
                tax_relief,
                net_tax_liability,
            },
            tax_paid: TaxPaid {
                taxes_paid,
                bal_tax_payable: balance.max(0),
            },
            refund: Refund {
                refund_due: (-balance).max(0),
            },
        })
    }

    fn schedule_tds1(
        &self,
        income: &NormalizedIncomeRecord,
    ) -> Result<ScheduleTds1, AssemblyError> {
        let tds_on_salary = income
            .employments
            .iter()
            .map(|e| {
                Ok(TdsOnSalary {
                    employer: DeductorDetail {
                        tan: e.employer.tan.trim().to_ascii_uppercase(),
                        employer_or_deductor_or_collecter_name: e.employer.name.trim().to_string(),
                    },
                    inc_chrg_sal: rupees(e.gross_salary())?,
                    total_tds_sal: rupees(e.tax_withheld.max(Decimal::ZERO))?,
                })
            })
            .collect::<Result<Vec<_>, AssemblyError>>()?;
        let total_tds_on_salaries = tds_on_salary.iter().map(|t| t.total_tds_sal).sum();

        Ok(ScheduleTds1 {
            tds_on_salary,
            total_tds_on_salaries,
        })
    }
}

impl ReturnDocument {
    /// # Errors
    ///
    /// Returns [`AssemblyError::Serialization`] if serialization fails.
    pub fn to_value(&self) -> Result<Value, AssemblyError> {
        serde_json::to_value(self).map_err(|e| AssemblyError::Serialization(e.to_string()))
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, AssemblyError> {
        serde_json::to_string_pretty(self).map_err(|e| AssemblyError::Serialization(e.to_string()))
    }
}

/// Converts a decimal amount into a whole-rupee schema field.
pub fn rupees(amount: Decimal) -> Result<i64, AssemblyError> {
    round_to_rupee(amount)
        .to_i64()
        .ok_or(AssemblyError::AmountOutOfRange(amount))
}

fn check(
    field: &'static str,
    assembled: i64,
    computed: Decimal,
) -> Result<(), AssemblyError> {
    let computed = rupees(computed)?;
    if assembled != computed {
        return Err(AssemblyError::InconsistentResult {
            field,
            assembled,
            computed,
        });
    }
    Ok(())
}

fn residence_address(
    address: &Address,
    mobile: &str,
    email: &str,
) -> ResidenceAddress {
    ResidenceAddress {
        residence_no: address.flat_or_door.trim().to_string(),
        residence_name: address.premises.trim().to_string(),
        road_or_street: address.street.trim().to_string(),
        locality_or_area: address.locality.trim().to_string(),
        city_or_town_or_district: address.city.trim().to_string(),
        state_code: address.state_code.trim().to_string(),
        country_code: non_empty_or(&address.country_code, "91"),
        pin_code: address.pin_code.trim().to_string(),
        country_code_mobile: 91,
        mobile_no: mobile.trim().to_string(),
        email_address: email.trim().to_string(),
    }
}

fn salary_entry(
    employment: &Employment,
    exempt: i64,
) -> Result<SalaryEntry, AssemblyError> {
    let salary = rupees(employment.salary.salary)?;
    let perquisites = rupees(employment.salary.perquisites)?;
    let profits_in_lieu = rupees(employment.salary.profits_in_lieu)?;
    let gross_salary = salary + perquisites + profits_in_lieu;
    let address = &employment.employer.address;

    Ok(SalaryEntry {
        name_of_employer: employment.employer.name.trim().to_string(),
        tan_of_employer: employment.employer.tan.trim().to_ascii_uppercase(),
        address_detail: EmployerAddress {
            addr_detail: [&address.flat_or_door, &address.premises, &address.street, &address.locality]
                .iter()
                .map(|part| part.trim())
                .filter(|part| !part.is_empty())
                .collect::<Vec<_>>()
                .join(", "),
            city_or_town_or_district: address.city.trim().to_string(),
            state_code: address.state_code.trim().to_string(),
            pin_code: address.pin_code.trim().to_string(),
        },
        salarys: Salarys {
            gross_salary,
            salary,
            value_of_perquisites: perquisites,
            profits_in_lieu_of_salary: profits_in_lieu,
            net_salary: gross_salary - exempt,
        },
    })
}

fn exempt_details(employment: &Employment) -> Result<Vec<AllowanceExemptDetail>, AssemblyError> {
    employment
        .exempt_allowances
        .iter()
        .map(|a| {
            Ok(AllowanceExemptDetail {
                sal_nature_desc: a.nature.trim().to_string(),
                sal_oth_amount: rupees(a.amount.max(Decimal::ZERO))?,
            })
        })
        .collect()
}

fn non_empty_or(
    value: &str,
    default: &str,
) -> String {
    let value = value.trim();
    if value.is_empty() {
        default.to_string()
    } else {
        value.to_string()
    }
}

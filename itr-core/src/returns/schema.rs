//! Typed shape of the canonical ITR-2 return document.
//!
//! Field names follow the published schedule keys, so the serde renames are
//! deliberately irregular. Every amount is whole rupees and every field is
//! always present: absent source data is written as `0` or `""`.

use serde::{Deserialize, Serialize};

use crate::models::DeductionSection;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnDocument {
    #[serde(rename = "ITR")]
    pub itr: ItrEnvelope,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItrEnvelope {
    #[serde(rename = "ITR2")]
    pub itr2: Itr2,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Itr2 {
    #[serde(rename = "CreationInfo")]
    pub creation_info: CreationInfo,
    #[serde(rename = "Form_ITR2")]
    pub form: FormInfo,
    #[serde(rename = "PartA_GEN1")]
    pub part_a_gen1: PartAGen1,
    #[serde(rename = "ScheduleS")]
    pub schedule_s: ScheduleS,
    #[serde(rename = "ScheduleVIA")]
    pub schedule_via: ScheduleVia,
    #[serde(rename = "PartB-TI")]
    pub part_b_ti: PartBTi,
    #[serde(rename = "PartB_TTI")]
    pub part_b_tti: PartBTti,
    #[serde(rename = "ScheduleTDS1")]
    pub schedule_tds1: ScheduleTds1,
}

// ============================================================================
// Header
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreationInfo {
    #[serde(rename = "SWVersionNo")]
    pub sw_version_no: String,
    #[serde(rename = "SWCreatedBy")]
    pub sw_created_by: String,
    #[serde(rename = "JSONCreatedBy")]
    pub json_created_by: String,
    /// `YYYY-MM-DD`.
    #[serde(rename = "JSONCreationDate")]
    pub json_creation_date: String,
    #[serde(rename = "IntermediaryCity")]
    pub intermediary_city: String,
    #[serde(rename = "Digest")]
    pub digest: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormInfo {
    #[serde(rename = "FormName")]
    pub form_name: String,
    #[serde(rename = "Description")]
    pub description: String,
    /// First calendar year of the assessment year, e.g. `2024` for 2024-25.
    #[serde(rename = "AssessmentYear")]
    pub assessment_year: String,
    #[serde(rename = "SchemaVer")]
    pub schema_ver: String,
    #[serde(rename = "FormVer")]
    pub form_ver: String,
}

// ============================================================================
// Part A: general information
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartAGen1 {
    #[serde(rename = "PersonalInfo")]
    pub personal_info: PersonalInfo,
    #[serde(rename = "FilingStatus")]
    pub filing_status: FilingStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalInfo {
    #[serde(rename = "AssesseeName")]
    pub assessee_name: AssesseeName,
    #[serde(rename = "PAN")]
    pub pan: String,
    #[serde(rename = "Address")]
    pub address: ResidenceAddress,
    /// `YYYY-MM-DD`, or empty when the statement carries no date of birth.
    #[serde(rename = "DOB")]
    pub dob: String,
    /// `I` for individual.
    #[serde(rename = "Status")]
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssesseeName {
    #[serde(rename = "FirstName")]
    pub first_name: String,
    #[serde(rename = "MiddleName")]
    pub middle_name: String,
    #[serde(rename = "SurNameOrOrgName")]
    pub sur_name_or_org_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResidenceAddress {
    #[serde(rename = "ResidenceNo")]
    pub residence_no: String,
    #[serde(rename = "ResidenceName")]
    pub residence_name: String,
    #[serde(rename = "RoadOrStreet")]
    pub road_or_street: String,
    #[serde(rename = "LocalityOrArea")]
    pub locality_or_area: String,
    #[serde(rename = "CityOrTownOrDistrict")]
    pub city_or_town_or_district: String,
    #[serde(rename = "StateCode")]
    pub state_code: String,
    #[serde(rename = "CountryCode")]
    pub country_code: String,
    #[serde(rename = "PinCode")]
    pub pin_code: String,
    #[serde(rename = "CountryCodeMobile")]
    pub country_code_mobile: i64,
    #[serde(rename = "MobileNo")]
    pub mobile_no: String,
    #[serde(rename = "EmailAddress")]
    pub email_address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilingStatus {
    /// Section under which the return is filed; 11 is 139(1), on time.
    #[serde(rename = "ReturnFileSec")]
    pub return_file_sec: i64,
    #[serde(rename = "OptOutNewTaxRegime")]
    pub opt_out_new_tax_regime: String,
    #[serde(rename = "SeventhProvisio139")]
    pub seventh_provisio_139: String,
}

// ============================================================================
// Schedule S: salaries
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleS {
    #[serde(rename = "Salaries")]
    pub salaries: Vec<SalaryEntry>,
    /// Sum of every entry's `GrossSalary`.
    #[serde(rename = "TotalGrossSalary")]
    pub total_gross_salary: i64,
    #[serde(rename = "AllwncExemptUs10")]
    pub allwnc_exempt_us10: AllowancesExempt,
    /// `TotalGrossSalary − TotalAllwncExemptUs10`.
    #[serde(rename = "NetSalary")]
    pub net_salary: i64,
    /// `DeductionUnderSection16ia + ProfessionalTaxUs16iii`.
    #[serde(rename = "DeductionUS16")]
    pub deduction_us16: i64,
    #[serde(rename = "DeductionUnderSection16ia")]
    pub deduction_under_section_16ia: i64,
    #[serde(rename = "ProfessionalTaxUs16iii")]
    pub professional_tax_us16iii: i64,
    #[serde(rename = "TotIncUnderHeadSalaries")]
    pub tot_inc_under_head_salaries: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryEntry {
    #[serde(rename = "NameOfEmployer")]
    pub name_of_employer: String,
    #[serde(rename = "TANofEmployer")]
    pub tan_of_employer: String,
    #[serde(rename = "AddressDetail")]
    pub address_detail: EmployerAddress,
    #[serde(rename = "Salarys")]
    pub salarys: Salarys,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployerAddress {
    #[serde(rename = "AddrDetail")]
    pub addr_detail: String,
    #[serde(rename = "CityOrTownOrDistrict")]
    pub city_or_town_or_district: String,
    #[serde(rename = "StateCode")]
    pub state_code: String,
    #[serde(rename = "PinCode")]
    pub pin_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Salarys {
    /// `Salary + ValueOfPerquisites + ProfitsinLieuOfSalary`.
    #[serde(rename = "GrossSalary")]
    pub gross_salary: i64,
    #[serde(rename = "Salary")]
    pub salary: i64,
    #[serde(rename = "ValueOfPerquisites")]
    pub value_of_perquisites: i64,
    #[serde(rename = "ProfitsinLieuOfSalary")]
    pub profits_in_lieu_of_salary: i64,
    /// Gross less the allowances exempted for this employer.
    #[serde(rename = "NetSalary")]
    pub net_salary: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowancesExempt {
    #[serde(rename = "AllwncExemptUs10Dtls")]
    pub details: Vec<AllowanceExemptDetail>,
    #[serde(rename = "TotalAllwncExemptUs10")]
    pub total: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowanceExemptDetail {
    #[serde(rename = "SalNatureDesc")]
    pub sal_nature_desc: String,
    #[serde(rename = "SalOthAmount")]
    pub sal_oth_amount: i64,
}

// ============================================================================
// Schedule VI-A
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleVia {
    #[serde(rename = "DeductUndChapVIA")]
    pub deduct_und_chap_via: ChapterViaDeductions,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterViaDeductions {
    #[serde(rename = "Section80C")]
    pub section_80c: i64,
    #[serde(rename = "Section80CCC")]
    pub section_80ccc: i64,
    #[serde(rename = "Section80CCDEmployeeOrSE")]
    pub section_80ccd_employee_or_se: i64,
    #[serde(rename = "Section80CCD1B")]
    pub section_80ccd_1b: i64,
    #[serde(rename = "Section80CCDEmployer")]
    pub section_80ccd_employer: i64,
    #[serde(rename = "Section80D")]
    pub section_80d: i64,
    #[serde(rename = "Section80DD")]
    pub section_80dd: i64,
    #[serde(rename = "Section80E")]
    pub section_80e: i64,
    #[serde(rename = "Section80G")]
    pub section_80g: i64,
    #[serde(rename = "Section80TTA")]
    pub section_80tta: i64,
    #[serde(rename = "Section80TTB")]
    pub section_80ttb: i64,
    /// Deductions received only as an aggregate total.
    #[serde(rename = "OtherDeductions")]
    pub other_deductions: i64,
    /// Sum of every section above.
    #[serde(rename = "TotalChapVIADeductions")]
    pub total_chap_via_deductions: i64,
}

impl ChapterViaDeductions {
    pub fn slot_mut(
        &mut self,
        section: DeductionSection,
    ) -> &mut i64 {
        match section {
            DeductionSection::Section80C => &mut self.section_80c,
            DeductionSection::Section80CCC => &mut self.section_80ccc,
            DeductionSection::Section80CCD1 => &mut self.section_80ccd_employee_or_se,
            DeductionSection::Section80CCD1B => &mut self.section_80ccd_1b,
            DeductionSection::Section80CCD2 => &mut self.section_80ccd_employer,
            DeductionSection::Section80D => &mut self.section_80d,
            DeductionSection::Section80DD => &mut self.section_80dd,
            DeductionSection::Section80E => &mut self.section_80e,
            DeductionSection::Section80G => &mut self.section_80g,
            DeductionSection::Section80TTA => &mut self.section_80tta,
            DeductionSection::Section80TTB => &mut self.section_80ttb,
            DeductionSection::Unclassified => &mut self.other_deductions,
        }
    }

    pub fn sections_sum(&self) -> i64 {
        self.section_80c
            + self.section_80ccc
            + self.section_80ccd_employee_or_se
            + self.section_80ccd_1b
            + self.section_80ccd_employer
            + self.section_80d
            + self.section_80dd
            + self.section_80e
            + self.section_80g
            + self.section_80tta
            + self.section_80ttb
            + self.other_deductions
    }
}

// ============================================================================
// Part B: total income and tax liability
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartBTi {
    #[serde(rename = "Salaries")]
    pub salaries: i64,
    #[serde(rename = "GrossTotalIncome")]
    pub gross_total_income: i64,
    #[serde(rename = "DeductionsUnderScheduleVIA")]
    pub deductions_under_schedule_via: i64,
    /// `GrossTotalIncome − DeductionsUnderScheduleVIA`, floored at zero.
    #[serde(rename = "TotalIncome")]
    pub total_income: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartBTti {
    #[serde(rename = "ComputationOfTaxLiability")]
    pub computation_of_tax_liability: ComputationOfTaxLiability,
    #[serde(rename = "TaxPaid")]
    pub tax_paid: TaxPaid,
    #[serde(rename = "Refund")]
    pub refund: Refund,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputationOfTaxLiability {
    #[serde(rename = "TaxPayableOnTI")]
    pub tax_payable_on_ti: TaxPayableOnTi,
    #[serde(rename = "Rebate87A")]
    pub rebate_87a: i64,
    #[serde(rename = "TaxPayableOnRebate")]
    pub tax_payable_on_rebate: i64,
    #[serde(rename = "Surcharge")]
    pub surcharge: i64,
    #[serde(rename = "EducationCess")]
    pub education_cess: i64,
    /// `TaxPayableOnRebate + Surcharge + EducationCess`.
    #[serde(rename = "GrossTaxLiability")]
    pub gross_tax_liability: i64,
    #[serde(rename = "TaxRelief")]
    pub tax_relief: TaxRelief,
    /// `GrossTaxLiability − TotTaxRelief`.
    #[serde(rename = "NetTaxLiability")]
    pub net_tax_liability: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxPayableOnTi {
    #[serde(rename = "TaxAtNormalRatesOnAggrInc")]
    pub tax_at_normal_rates_on_aggr_inc: i64,
    #[serde(rename = "TaxAtSpecialRates")]
    pub tax_at_special_rates: i64,
    #[serde(rename = "TaxPayableOnTotInc")]
    pub tax_payable_on_tot_inc: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRelief {
    #[serde(rename = "Section89")]
    pub section_89: i64,
    #[serde(rename = "Section90")]
    pub section_90: i64,
    #[serde(rename = "Section91")]
    pub section_91: i64,
    #[serde(rename = "TotTaxRelief")]
    pub tot_tax_relief: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxPaid {
    #[serde(rename = "TaxesPaid")]
    pub taxes_paid: TaxesPaid,
    #[serde(rename = "BalTaxPayable")]
    pub bal_tax_payable: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxesPaid {
    #[serde(rename = "AdvanceTax")]
    pub advance_tax: i64,
    #[serde(rename = "TDS")]
    pub tds: i64,
    #[serde(rename = "TCS")]
    pub tcs: i64,
    #[serde(rename = "SelfAssessmentTax")]
    pub self_assessment_tax: i64,
    /// Sum of the four payment kinds above.
    #[serde(rename = "TotalTaxesPaid")]
    pub total_taxes_paid: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Refund {
    #[serde(rename = "RefundDue")]
    pub refund_due: i64,
}

// ============================================================================
// Schedule TDS1: tax deducted on salary
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleTds1 {
    #[serde(rename = "TDSonSalary")]
    pub tds_on_salary: Vec<TdsOnSalary>,
    #[serde(rename = "TotalTDSonSalaries")]
    pub total_tds_on_salaries: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TdsOnSalary {
    #[serde(rename = "EmployerOrDeductorOrCollectDetl")]
    pub employer: DeductorDetail,
    #[serde(rename = "IncChrgSal")]
    pub inc_chrg_sal: i64,
    #[serde(rename = "TotalTDSSal")]
    pub total_tds_sal: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductorDetail {
    #[serde(rename = "TAN")]
    pub tan: String,
    #[serde(rename = "EmployerOrDeductorOrCollecterName")]
    pub employer_or_deductor_or_collecter_name: String,
}

//! Dotted paths into the serialized return document.
//!
//! Export and presentation layers read these locations; they must not move
//! between assembler versions.

use serde_json::Value;

pub const GROSS_TOTAL_INCOME: &str = "ITR.ITR2.PartB-TI.GrossTotalIncome";
pub const TOTAL_DEDUCTIONS: &str = "ITR.ITR2.PartB-TI.DeductionsUnderScheduleVIA";
pub const TOTAL_INCOME: &str = "ITR.ITR2.PartB-TI.TotalIncome";
pub const INCOME_UNDER_SALARIES: &str = "ITR.ITR2.ScheduleS.TotIncUnderHeadSalaries";
pub const NET_TAX_LIABILITY: &str =
    "ITR.ITR2.PartB_TTI.ComputationOfTaxLiability.NetTaxLiability";
pub const GROSS_TAX_LIABILITY: &str =
    "ITR.ITR2.PartB_TTI.ComputationOfTaxLiability.GrossTaxLiability";
pub const TOTAL_TAXES_PAID: &str = "ITR.ITR2.PartB_TTI.TaxPaid.TaxesPaid.TotalTaxesPaid";
pub const BALANCE_TAX_PAYABLE: &str = "ITR.ITR2.PartB_TTI.TaxPaid.BalTaxPayable";
pub const REFUND_DUE: &str = "ITR.ITR2.PartB_TTI.Refund.RefundDue";
pub const OPT_OUT_NEW_TAX_REGIME: &str = "ITR.ITR2.PartA_GEN1.FilingStatus.OptOutNewTaxRegime";
pub const PAN: &str = "ITR.ITR2.PartA_GEN1.PersonalInfo.PAN";

/// Resolves a dotted path. Segments of the form `name[i]` index into arrays.
///
/// Keys such as `PartB-TI` contain no dots, so splitting on `.` is safe for
/// every path the document exposes.
pub fn lookup<'a>(
    document: &'a Value,
    path: &str,
) -> Option<&'a Value> {
    path.split('.').try_fold(document, |node, segment| {
        let (key, index) = split_index(segment);
        let node = if key.is_empty() { node } else { node.get(key)? };
        match index {
            Some(i) => node.get(i),
            None => Some(node),
        }
    })
}

fn split_index(segment: &str) -> (&str, Option<usize>) {
    if let Some(open) = segment.find('[')
        && let Some(index) = segment[open + 1..]
            .strip_suffix(']')
            .and_then(|s| s.parse().ok())
    {
        return (&segment[..open], Some(index));
    }
    (segment, None)
}

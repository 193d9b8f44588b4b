use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One band of the progressive INSS contribution table.
///
/// Bands are half-open `[lower_bound, upper_bound)`; `upper_bound` of `None`
/// means the band is open-ended and only the last band of a table may carry it.
/// `rate` is a percentage in the 0–100 range, as published in the official
/// tables (e.g. `7.5` for the first 2025 band).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InssBracket {
    pub lower_bound: Decimal,
    pub upper_bound: Option<Decimal>,
    pub rate: Decimal,
    pub order: i32,
    pub effective_from: NaiveDate,
    pub effective_to: Option<NaiveDate>,
}

/// One band of the IRRF withholding table.
///
/// Unlike INSS, IRRF bands are not summed incrementally: the matched band's
/// `rate` applies to the entire taxable base and `deduction` (the published
/// "parcela a deduzir") is subtracted afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IrrfBracket {
    pub lower_bound: Decimal,
    pub upper_bound: Option<Decimal>,
    pub rate: Decimal,
    pub deduction: Decimal,
    pub order: i32,
    pub effective_from: NaiveDate,
    pub effective_to: Option<NaiveDate>,
}

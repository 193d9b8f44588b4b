use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollCalculation {
    pub id: i64,

    // Competência (pay period) and employee reference
    pub competency_year: i32,
    pub competency_month: i32,
    pub employee_ref: String,

    // Engine inputs as entered or read from the payroll record
    pub total_proventos: Decimal,
    pub other_deductions: Decimal,
    pub dependent_count: i32,

    // Calculated values
    pub calculated_inss: Option<Decimal>,
    pub calculated_irrf: Option<Decimal>,
    pub calculated_total_descontos: Option<Decimal>,
    pub calculated_net_pay: Option<Decimal>,
    pub calculated_employer_charges: Option<Decimal>,
    pub calculated_consignable_margin: Option<Decimal>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// For creating new calculations (no id, timestamps, or computed values)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPayrollCalculation {
    pub competency_year: i32,
    pub competency_month: i32,
    pub employee_ref: String,
    pub total_proventos: Decimal,
    pub other_deductions: Decimal,
    pub dependent_count: i32,
}

use serde::Serialize;
use utoipa::ToSchema;

/// One ledger entry per generated slip. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct SlipRecord {
    pub id: u64,
    pub employee_id: u64,
    pub employee_name: String,
    pub month: String,
    pub days_worked: f64,
    pub net_salary: f64,
    /// Locator returned by the artifact store when the PDF was written.
    pub artifact_path: String,
}

#[derive(Debug, Clone)]
pub struct NewSlipRecord {
    pub employee_id: u64,
    pub employee_name: String,
    pub month: String,
    pub days_worked: f64,
    pub net_salary: f64,
    pub artifact_path: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SlipSummary {
    #[serde(rename = "_id")]
    #[schema(example = 12)]
    pub id: u64,
    #[schema(example = "Ravi Kumar")]
    pub user: String,
    #[schema(example = "March 2025")]
    pub month: String,
    #[schema(example = 26.0)]
    pub days: f64,
    /// Net salary, fixed to two decimals.
    #[schema(example = "26000.00")]
    pub salary: String,
    #[schema(example = "/salary_slips/Ravi_Kumar_March_2025.pdf")]
    pub pdf_url: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedSlip {
    #[serde(rename = "_id")]
    #[schema(example = 12)]
    pub id: u64,
    #[schema(example = "/salary_slips/Ravi_Kumar_March_2025.pdf")]
    pub pdf_url: String,
}

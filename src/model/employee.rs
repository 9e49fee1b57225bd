use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{error::AppError, utils::lenient};

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(
    example = json!({
        "_id": 1,
        "username": "Ravi Kumar",
        "email": "ravi.kumar@company.com",
        "baseSalary": 26000.0,
        "employeeid": "EMP-001",
        "joindate": "2024-01-15",
        "pan": "ABCDE1234F",
        "adhaar": "1234 5678 9012",
        "designation": "Accountant",
        "houseRentAllowance": 0.0,
        "transportAllowance": 0.0,
        "medicalAllowance": 0.0,
        "bonus": 0.0,
        "ot": 0.0,
        "incomeTax": 0.0,
        "providentFund": 0.0,
        "esi": 0.0,
        "professionalTax": 0.0,
        "otherEarnings": 0.0,
        "otherDeductions": 0.0,
        "advance": 0.0
    })
)]
pub struct Employee {
    #[serde(rename = "_id")]
    pub id: u64,
    pub username: String,
    pub email: String,
    pub base_salary: f64,
    #[serde(rename = "employeeid")]
    pub employee_code: String,
    #[serde(rename = "joindate")]
    #[schema(value_type = Option<String>)]
    pub join_date: Option<NaiveDate>,
    pub pan: Option<String>,
    pub adhaar: Option<String>,
    pub designation: Option<String>,

    pub house_rent_allowance: f64,
    pub transport_allowance: f64,
    pub medical_allowance: f64,
    pub bonus: f64,
    pub ot: f64,
    pub income_tax: f64,
    pub provident_fund: f64,
    pub esi: f64,
    pub professional_tax: f64,
    pub other_earnings: f64,
    pub other_deductions: f64,
    pub advance: f64,
}

/// Raw employee payload as posted by the client.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeForm {
    #[schema(example = "Ravi Kumar")]
    pub username: Option<String>,
    #[schema(example = "ravi.kumar@company.com")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_amount")]
    #[schema(example = 26000.0)]
    pub base_salary: Option<f64>,
    #[serde(rename = "employeeid")]
    #[schema(example = "EMP-001")]
    pub employee_code: Option<String>,
    #[serde(rename = "joindate")]
    #[schema(example = "2024-01-15")]
    pub join_date: Option<String>,
    pub pan: Option<String>,
    pub adhaar: Option<String>,
    #[serde(alias = "deg")]
    pub designation: Option<String>,

    #[serde(default, deserialize_with = "lenient::optional_amount")]
    pub house_rent_allowance: Option<f64>,
    #[serde(default, deserialize_with = "lenient::optional_amount")]
    pub transport_allowance: Option<f64>,
    #[serde(default, deserialize_with = "lenient::optional_amount")]
    pub medical_allowance: Option<f64>,
    #[serde(default, deserialize_with = "lenient::optional_amount")]
    pub bonus: Option<f64>,
    #[serde(default, deserialize_with = "lenient::optional_amount")]
    pub ot: Option<f64>,
    #[serde(default, deserialize_with = "lenient::optional_amount")]
    pub income_tax: Option<f64>,
    #[serde(default, deserialize_with = "lenient::optional_amount")]
    pub provident_fund: Option<f64>,
    #[serde(default, deserialize_with = "lenient::optional_amount")]
    pub esi: Option<f64>,
    #[serde(default, deserialize_with = "lenient::optional_amount")]
    pub professional_tax: Option<f64>,
    #[serde(default, deserialize_with = "lenient::optional_amount")]
    pub other_earnings: Option<f64>,
    #[serde(default, deserialize_with = "lenient::optional_amount")]
    pub other_deductions: Option<f64>,
    #[serde(default, deserialize_with = "lenient::optional_amount")]
    pub advance: Option<f64>,
}

/// Sanitized, validated employee fields ready to be written.
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct EmployeeInput {
    #[validate(length(min = 1, message = "Username must not be empty"))]
    pub username: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(range(exclusive_min = 0.0, message = "Base salary must be a positive number"))]
    pub base_salary: f64,
    #[validate(length(min = 1, message = "Employee ID must not be empty"))]
    pub employee_code: String,
    pub join_date: Option<NaiveDate>,
    pub pan: Option<String>,
    pub adhaar: Option<String>,
    pub designation: Option<String>,

    #[validate(range(min = 0.0, message = "House rent allowance cannot be negative"))]
    pub house_rent_allowance: f64,
    #[validate(range(min = 0.0, message = "Transport allowance cannot be negative"))]
    pub transport_allowance: f64,
    #[validate(range(min = 0.0, message = "Medical allowance cannot be negative"))]
    pub medical_allowance: f64,
    #[validate(range(min = 0.0, message = "Bonus cannot be negative"))]
    pub bonus: f64,
    #[validate(range(min = 0.0, message = "Overtime cannot be negative"))]
    pub ot: f64,
    #[validate(range(min = 0.0, message = "Income tax cannot be negative"))]
    pub income_tax: f64,
    #[validate(range(min = 0.0, message = "Provident fund cannot be negative"))]
    pub provident_fund: f64,
    #[validate(range(min = 0.0, message = "ESI cannot be negative"))]
    pub esi: f64,
    #[validate(range(min = 0.0, message = "Professional tax cannot be negative"))]
    pub professional_tax: f64,
    #[validate(range(min = 0.0, message = "Other earnings cannot be negative"))]
    pub other_earnings: f64,
    #[validate(range(min = 0.0, message = "Other deductions cannot be negative"))]
    pub other_deductions: f64,
    #[validate(range(min = 0.0, message = "Advance cannot be negative"))]
    pub advance: f64,
}

fn parse_join_date(raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.date_naive()))
        .map_err(|_| AppError::Validation("Invalid join date format".into()))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl EmployeeForm {
    /// Checks required fields, sanitizes, then runs field validation.
    pub fn into_input(self) -> Result<EmployeeInput, AppError> {
        let (Some(username), Some(email), Some(base_salary), Some(employee_code)) = (
            non_empty(self.username),
            non_empty(self.email),
            self.base_salary,
            non_empty(self.employee_code),
        ) else {
            return Err(AppError::Validation(
                "Username, email, base salary, and employee ID are required".into(),
            ));
        };

        let join_date = match non_empty(self.join_date) {
            Some(raw) => Some(parse_join_date(&raw)?),
            None => None,
        };

        let input = EmployeeInput {
            username,
            email: email.to_lowercase(),
            base_salary,
            employee_code,
            join_date,
            pan: non_empty(self.pan).map(|p| p.to_uppercase()),
            adhaar: non_empty(self.adhaar),
            designation: non_empty(self.designation),
            house_rent_allowance: self.house_rent_allowance.unwrap_or_default(),
            transport_allowance: self.transport_allowance.unwrap_or_default(),
            medical_allowance: self.medical_allowance.unwrap_or_default(),
            bonus: self.bonus.unwrap_or_default(),
            ot: self.ot.unwrap_or_default(),
            income_tax: self.income_tax.unwrap_or_default(),
            provident_fund: self.provident_fund.unwrap_or_default(),
            esi: self.esi.unwrap_or_default(),
            professional_tax: self.professional_tax.unwrap_or_default(),
            other_earnings: self.other_earnings.unwrap_or_default(),
            other_deductions: self.other_deductions.unwrap_or_default(),
            advance: self.advance.unwrap_or_default(),
        };

        input.validate()?;
        Ok(input)
    }
}

impl Employee {
    pub fn from_input(id: u64, input: EmployeeInput) -> Self {
        Self {
            id,
            username: input.username,
            email: input.email,
            base_salary: input.base_salary,
            employee_code: input.employee_code,
            join_date: input.join_date,
            pan: input.pan,
            adhaar: input.adhaar,
            designation: input.designation,
            house_rent_allowance: input.house_rent_allowance,
            transport_allowance: input.transport_allowance,
            medical_allowance: input.medical_allowance,
            bonus: input.bonus,
            ot: input.ot,
            income_tax: input.income_tax,
            provident_fund: input.provident_fund,
            esi: input.esi,
            professional_tax: input.professional_tax,
            other_earnings: input.other_earnings,
            other_deductions: input.other_deductions,
            advance: input.advance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn form(value: serde_json::Value) -> EmployeeForm {
        serde_json::from_value(value).unwrap()
    }

    fn valid() -> serde_json::Value {
        json!({
            "username": "  Ravi Kumar ",
            "email": " Ravi.Kumar@Company.com ",
            "baseSalary": "26000",
            "employeeid": "EMP-001",
            "joindate": "2024-01-15",
            "pan": "abcde1234f",
            "deg": "Accountant"
        })
    }

    #[test]
    fn sanitizes_fields() {
        let input = form(valid()).into_input().unwrap();
        assert_eq!(input.username, "Ravi Kumar");
        assert_eq!(input.email, "ravi.kumar@company.com");
        assert_eq!(input.base_salary, 26000.0);
        assert_eq!(input.pan.as_deref(), Some("ABCDE1234F"));
        assert_eq!(input.designation.as_deref(), Some("Accountant"));
        assert_eq!(input.join_date, NaiveDate::from_ymd_opt(2024, 1, 15));
        assert_eq!(input.bonus, 0.0);
    }

    #[test]
    fn missing_required_fields_are_rejected() {
        let mut body = valid();
        body.as_object_mut().unwrap().remove("employeeid");
        let err = form(body).into_input().unwrap_err();
        assert!(matches!(err, AppError::Validation(m) if m.contains("required")));
    }

    #[test]
    fn zero_base_salary_is_rejected() {
        let mut body = valid();
        body["baseSalary"] = json!(0);
        let err = form(body).into_input().unwrap_err();
        assert!(
            matches!(err, AppError::Validation(m) if m == "Base salary must be a positive number")
        );
    }

    #[test]
    fn negative_defaults_are_rejected() {
        let mut body = valid();
        body["advance"] = json!(-10);
        let err = form(body).into_input().unwrap_err();
        assert!(matches!(err, AppError::Validation(m) if m == "Advance cannot be negative"));
    }

    #[test]
    fn bad_email_and_date_are_rejected() {
        let mut body = valid();
        body["email"] = json!("not-an-email");
        assert!(matches!(
            form(body).into_input(),
            Err(AppError::Validation(m)) if m == "Invalid email format"
        ));

        let mut body = valid();
        body["joindate"] = json!("15/01/2024");
        assert!(matches!(
            form(body).into_input(),
            Err(AppError::Validation(m)) if m == "Invalid join date format"
        ));
    }
}

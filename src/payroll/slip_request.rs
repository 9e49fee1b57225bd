use serde::Deserialize;
use utoipa::ToSchema;

use super::calculator::{Deductions, Earnings};
use crate::{error::AppError, utils::lenient};

/// Body of `POST /salary-slip`. Overrides that are missing or not numeric count as zero.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SlipRequest {
    #[serde(default, deserialize_with = "lenient::optional_id")]
    #[schema(example = 1, value_type = Option<u64>)]
    pub user_id: Option<u64>,
    #[schema(example = "March 2025")]
    pub month: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_amount")]
    #[schema(example = 26.0, value_type = Option<f64>)]
    pub days_worked: Option<f64>,

    #[serde(default, deserialize_with = "lenient::amount")]
    pub house_rent_allowance: f64,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub transport_allowance: f64,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub medical_allowance: f64,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub others_earnings: f64,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub bonus: f64,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub ot: f64,

    #[serde(default, deserialize_with = "lenient::amount")]
    pub income_tax: f64,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub provident_fund: f64,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub esi: f64,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub professional_tax: f64,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub others_deductions: f64,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub advance: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidSlipRequest {
    pub employee_id: u64,
    pub month: String,
    pub days_worked: f64,
    pub earnings: Earnings,
    pub deductions: Deductions,
}

impl SlipRequest {
    pub fn validate(self) -> Result<ValidSlipRequest, AppError> {
        let month = self
            .month
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty());

        let (Some(employee_id), Some(month), Some(days_worked)) =
            (self.user_id.filter(|id| *id > 0), month, self.days_worked)
        else {
            return Err(AppError::Validation(
                "User ID, month, and days worked are required".into(),
            ));
        };

        if days_worked < 0.0 {
            return Err(AppError::Validation("Days worked cannot be negative".into()));
        }

        Ok(ValidSlipRequest {
            employee_id,
            month,
            days_worked,
            earnings: Earnings {
                house_rent_allowance: self.house_rent_allowance,
                transport_allowance: self.transport_allowance,
                medical_allowance: self.medical_allowance,
                others: self.others_earnings,
                bonus: self.bonus,
                overtime: self.ot,
            },
            deductions: Deductions {
                income_tax: self.income_tax,
                provident_fund: self.provident_fund,
                esi: self.esi,
                professional_tax: self.professional_tax,
                others: self.others_deductions,
                advance: self.advance,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(value: serde_json::Value) -> SlipRequest {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn maps_overrides() {
        let valid = request(json!({
            "userId": "4",
            "month": " March 2025 ",
            "daysWorked": "24.5",
            "houseRentAllowance": 5000,
            "othersEarnings": "250",
            "ot": "n/a",
            "advance": 1000
        }))
        .validate()
        .unwrap();

        assert_eq!(valid.employee_id, 4);
        assert_eq!(valid.month, "March 2025");
        assert_eq!(valid.days_worked, 24.5);
        assert_eq!(valid.earnings.house_rent_allowance, 5000.0);
        assert_eq!(valid.earnings.others, 250.0);
        assert_eq!(valid.earnings.overtime, 0.0);
        assert_eq!(valid.deductions.advance, 1000.0);
    }

    #[test]
    fn zero_days_is_allowed() {
        let valid = request(json!({"userId": 1, "month": "May", "daysWorked": 0}))
            .validate()
            .unwrap();
        assert_eq!(valid.days_worked, 0.0);
    }

    #[test]
    fn required_fields() {
        for body in [
            json!({"month": "May", "daysWorked": 10}),
            json!({"userId": 1, "month": "  ", "daysWorked": 10}),
            json!({"userId": 1, "month": "May"}),
            json!({"userId": 1, "month": "May", "daysWorked": "ten"}),
        ] {
            let err = request(body).validate().unwrap_err();
            assert!(matches!(err, AppError::Validation(m) if m.contains("required")));
        }
    }

    #[test]
    fn negative_days_are_rejected() {
        let err = request(json!({"userId": 1, "month": "May", "daysWorked": -1}))
            .validate()
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(m) if m == "Days worked cannot be negative"));
    }
}

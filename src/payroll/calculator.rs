//! Payroll arithmetic. Pure and stateless; rounding happens only when amounts are formatted.

/// Working days in a pay period. Business rule, not configurable.
pub const PAY_PERIOD_DAYS: f64 = 26.0;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Earnings {
    pub house_rent_allowance: f64,
    pub transport_allowance: f64,
    pub medical_allowance: f64,
    pub others: f64,
    pub bonus: f64,
    pub overtime: f64,
}

impl Earnings {
    pub fn total(&self) -> f64 {
        self.house_rent_allowance
            + self.transport_allowance
            + self.medical_allowance
            + self.others
            + self.bonus
            + self.overtime
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Deductions {
    pub income_tax: f64,
    pub provident_fund: f64,
    pub esi: f64,
    pub professional_tax: f64,
    pub others: f64,
    pub advance: f64,
}

impl Deductions {
    pub fn total(&self) -> f64 {
        self.income_tax
            + self.provident_fund
            + self.esi
            + self.professional_tax
            + self.others
            + self.advance
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PayrollTotals {
    pub daily_rate: f64,
    pub prorated_basic: f64,
    pub total_earnings: f64,
    pub total_deductions: f64,
    /// Not clamped: large advances can push this below zero.
    pub net_payable: f64,
}

pub fn compute(
    base_salary: f64,
    days_worked: f64,
    earnings: &Earnings,
    deductions: &Deductions,
) -> PayrollTotals {
    let daily_rate = base_salary / PAY_PERIOD_DAYS;
    let prorated_basic = daily_rate * days_worked;
    let total_earnings = prorated_basic + earnings.total();
    let total_deductions = deductions.total();

    PayrollTotals {
        daily_rate,
        prorated_basic,
        total_earnings,
        total_deductions,
        net_payable: total_earnings - total_deductions,
    }
}

/// Fixed two-decimal presentation of an amount.
pub fn format_amount(value: f64) -> String {
    let formatted = format!("{value:.2}");
    if formatted == "-0.00" {
        "0.00".to_string()
    } else {
        formatted
    }
}

/// Day counts print without a trailing `.0` when whole.
pub fn format_days(days: f64) -> String {
    if days.fract() == 0.0 {
        format!("{days:.0}")
    } else {
        days.to_string()
    }
}

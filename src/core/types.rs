use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const SERVICE_FEE_RATE: f64 = 0.05;
pub const LABOR_TAX_RATE: f64 = 0.10;
pub const VAT_RATE: f64 = 0.03;
pub const LABOR_CAP: f64 = 1500.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rates {
    pub service_fee_rate: f64,
    pub labor_tax_rate: f64,
    pub vat_rate: f64,
    /// Ceiling for the labor bucket when a grand total is split back out.
    pub labor_cap: f64,
}

impl Default for Rates {
    fn default() -> Self {
        Self {
            service_fee_rate: SERVICE_FEE_RATE,
            labor_tax_rate: LABOR_TAX_RATE,
            vat_rate: VAT_RATE,
            labor_cap: LABOR_CAP,
        }
    }
}

impl Rates {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, rate) in [
            ("serviceFeeRate", self.service_fee_rate),
            ("laborTaxRate", self.labor_tax_rate),
            ("vatRate", self.vat_rate),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(ConfigError::RateOutOfRange { field });
            }
        }

        if !self.labor_cap.is_finite() || self.labor_cap < 0.0 {
            return Err(ConfigError::InvalidCap);
        }
        Ok(())
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum IncomeCategory {
    #[serde(rename = "laborRemuneration", alias = "labor")]
    Labor,
    #[serde(rename = "businessIncome", alias = "business")]
    Business,
    #[serde(rename = "soleProprietorIncome", alias = "sole")]
    SoleProprietor,
}

impl IncomeCategory {
    pub const ALL: [IncomeCategory; 3] = [
        IncomeCategory::Labor,
        IncomeCategory::Business,
        IncomeCategory::SoleProprietor,
    ];
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawIncome {
    pub labor_remuneration: f64,
    pub business_income: f64,
    pub sole_proprietor_income: f64,
}

impl RawIncome {
    pub fn new(labor_remuneration: f64, business_income: f64, sole_proprietor_income: f64) -> Self {
        Self {
            labor_remuneration,
            business_income,
            sole_proprietor_income,
        }
    }

    pub fn amount(&self, category: IncomeCategory) -> f64 {
        match category {
            IncomeCategory::Labor => self.labor_remuneration,
            IncomeCategory::Business => self.business_income,
            IncomeCategory::SoleProprietor => self.sole_proprietor_income,
        }
    }

    pub fn with_amount(self, category: IncomeCategory, value: f64) -> Self {
        let mut next = self;
        match category {
            IncomeCategory::Labor => next.labor_remuneration = value,
            IncomeCategory::Business => next.business_income = value,
            IncomeCategory::SoleProprietor => next.sole_proprietor_income = value,
        }
        next
    }

    pub fn non_labor_subtotal(&self) -> f64 {
        self.business_income + self.sole_proprietor_income
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedRecord {
    pub labor_remuneration: f64,
    pub business_income: f64,
    pub sole_proprietor_income: f64,
    pub total_amount_due: f64,
    pub service_fee: f64,
    pub personal_income_tax: f64,
    pub vat: f64,
    pub net_amount: f64,
    pub total_order_amount: f64,
}

impl DerivedRecord {
    pub fn raw(&self) -> RawIncome {
        RawIncome {
            labor_remuneration: self.labor_remuneration,
            business_income: self.business_income,
            sole_proprietor_income: self.sole_proprietor_income,
        }
    }

    pub fn taxes(&self) -> f64 {
        self.personal_income_tax + self.vat
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryBreakdown {
    pub category: IncomeCategory,
    pub amount: f64,
    pub service_fee: f64,
    pub tax: f64,
}

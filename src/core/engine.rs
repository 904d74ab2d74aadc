use super::{CategoryBreakdown, DerivedRecord, IncomeCategory, Rates, RawIncome};

pub fn derive(raw: RawIncome) -> DerivedRecord {
    derive_with(raw, &Rates::default())
}

/// Nothing is rounded or clamped here. Negative and NaN amounts flow through
/// the arithmetic unchanged; formatting to cents is left to whoever renders
/// the record.
pub fn derive_with(raw: RawIncome, rates: &Rates) -> DerivedRecord {
    let total_amount_due =
        raw.labor_remuneration + raw.business_income + raw.sole_proprietor_income;
    let service_fee = total_amount_due * rates.service_fee_rate;
    let personal_income_tax = raw.labor_remuneration * rates.labor_tax_rate;
    let vat = raw.non_labor_subtotal() * rates.vat_rate;
    let net_amount = total_amount_due - service_fee - personal_income_tax - vat;
    let total_order_amount = total_amount_due + service_fee + personal_income_tax + vat;

    DerivedRecord {
        labor_remuneration: raw.labor_remuneration,
        business_income: raw.business_income,
        sole_proprietor_income: raw.sole_proprietor_income,
        total_amount_due,
        service_fee,
        personal_income_tax,
        vat,
        net_amount,
        total_order_amount,
    }
}

pub fn reallocate(new_total: f64, current: RawIncome, fallback: RawIncome) -> RawIncome {
    reallocate_with(new_total, current, fallback, &Rates::default())
}

/// Labor takes the first `labor_cap` of the total. The rest is split between
/// business and sole proprietor income in the ratio of `current`, or of
/// `fallback` when the current pair does not sum to a positive amount. If
/// neither pair does, the whole remainder goes to business income.
pub fn reallocate_with(
    new_total: f64,
    current: RawIncome,
    fallback: RawIncome,
    rates: &Rates,
) -> RawIncome {
    let labor = nan_min(new_total, rates.labor_cap);
    let remainder = nan_max(0.0, new_total - labor);

    let (business, sole) = match split_ratio(&current).or_else(|| split_ratio(&fallback)) {
        Some(business_ratio) => (remainder * business_ratio, remainder * (1.0 - business_ratio)),
        None => (remainder, 0.0),
    };

    RawIncome {
        labor_remuneration: labor,
        business_income: business,
        sole_proprietor_income: sole,
    }
}

/// Per-category fee and tax lines. Labor is taxed at the labor rate, the two
/// other categories at the VAT rate.
pub fn category_breakdown(raw: RawIncome, rates: &Rates) -> [CategoryBreakdown; 3] {
    IncomeCategory::ALL.map(|category| {
        let amount = raw.amount(category);
        let tax_rate = match category {
            IncomeCategory::Labor => rates.labor_tax_rate,
            IncomeCategory::Business | IncomeCategory::SoleProprietor => rates.vat_rate,
        };
        CategoryBreakdown {
            category,
            amount,
            service_fee: amount * rates.service_fee_rate,
            tax: amount * tax_rate,
        }
    })
}

fn split_ratio(raw: &RawIncome) -> Option<f64> {
    let subtotal = raw.non_labor_subtotal();
    (subtotal > 0.0).then(|| raw.business_income / subtotal)
}

// f64::min/max drop a NaN operand; the engine must keep it.
fn nan_min(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        f64::NAN
    } else {
        a.min(b)
    }
}

fn nan_max(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        f64::NAN
    } else {
        a.max(b)
    }
}

use serde::{Deserialize, Serialize};

use super::{DerivedRecord, IncomeCategory, Rates, RawIncome, derive_with, reallocate_with};
use crate::error::RosterError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerProfile {
    pub name: String,
    #[serde(rename = "id")]
    pub id_number: String,
    pub phone: String,
    pub task: String,
    pub bank: String,
    pub account_number: String,
}

impl WorkerProfile {
    pub fn masked_account(&self) -> String {
        let chars: Vec<char> = self.account_number.chars().collect();
        let tail: String = chars[chars.len().saturating_sub(4)..].iter().collect();
        format!("**** **** {tail}")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Worker {
    #[serde(flatten)]
    pub profile: WorkerProfile,
    #[serde(flatten)]
    pub income: RawIncome,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    pub profile: WorkerProfile,
    /// Raw amounts at load time. Used as the split ratio when a total edit
    /// finds business and sole proprietor income both at zero.
    pub baseline: RawIncome,
    pub record: DerivedRecord,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EditOutcome {
    Updated,
    Unchanged,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterTotals {
    pub total_order_amount: f64,
    pub total_amount_due: f64,
    pub service_fee: f64,
    pub taxes: f64,
    pub net_amount: f64,
}

/// Ordered worker entries for one settlement. Every edit derives a fresh
/// record and swaps it into the slot; records are never patched field by field.
#[derive(Debug, Clone)]
pub struct Roster {
    rates: Rates,
    entries: Vec<RosterEntry>,
}

impl Roster {
    pub fn new(rates: Rates, workers: impl IntoIterator<Item = Worker>) -> Self {
        let entries = workers
            .into_iter()
            .map(|worker| RosterEntry {
                profile: worker.profile,
                baseline: worker.income,
                record: derive_with(worker.income, &rates),
            })
            .collect();
        Self { rates, entries }
    }

    pub fn rates(&self) -> &Rates {
        &self.rates
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[RosterEntry] {
        &self.entries
    }

    pub fn entry(&self, index: usize) -> Result<&RosterEntry, RosterError> {
        self.entries.get(index).ok_or(RosterError::RecordNotFound {
            index,
            len: self.entries.len(),
        })
    }

    pub fn records(&self) -> Vec<DerivedRecord> {
        self.entries.iter().map(|entry| entry.record).collect()
    }

    pub fn set_amount(
        &mut self,
        index: usize,
        category: IncomeCategory,
        value: f64,
    ) -> Result<EditOutcome, RosterError> {
        let current = self.entry(index)?.record.raw();
        if current.amount(category) == value {
            return Ok(EditOutcome::Unchanged);
        }
        self.replace(index, current.with_amount(category, value));
        Ok(EditOutcome::Updated)
    }

    /// Grand-total edit: the new total is split back over the categories,
    /// with the load-time baseline as the fallback ratio.
    pub fn set_total(&mut self, index: usize, new_total: f64) -> Result<EditOutcome, RosterError> {
        let entry = self.entry(index)?;
        if entry.record.total_amount_due == new_total {
            return Ok(EditOutcome::Unchanged);
        }
        let raw = reallocate_with(new_total, entry.record.raw(), entry.baseline, &self.rates);
        self.replace(index, raw);
        Ok(EditOutcome::Updated)
    }

    pub fn replace_raw(&mut self, index: usize, raw: RawIncome) -> Result<(), RosterError> {
        self.entry(index)?;
        self.replace(index, raw);
        Ok(())
    }

    pub fn totals(&self) -> RosterTotals {
        self.entries
            .iter()
            .fold(RosterTotals::default(), |mut acc, entry| {
                let record = &entry.record;
                acc.total_order_amount += record.total_order_amount;
                acc.total_amount_due += record.total_amount_due;
                acc.service_fee += record.service_fee;
                acc.taxes += record.taxes();
                acc.net_amount += record.net_amount;
                acc
            })
    }

    fn replace(&mut self, index: usize, raw: RawIncome) {
        self.entries[index].record = derive_with(raw, &self.rates);
    }
}

pub fn demo_workers() -> Vec<Worker> {
    vec![
        Worker {
            profile: WorkerProfile {
                name: "Xu Chenlu".to_string(),
                id_number: "320322199212170029".to_string(),
                phone: "15002106134".to_string(),
                task: "UI design".to_string(),
                bank: "Bank of China".to_string(),
                account_number: "6217850800019685732".to_string(),
            },
            income: RawIncome::new(1500.0, 5100.60, 3400.40),
        },
        Worker {
            profile: WorkerProfile {
                name: "Chen Li".to_string(),
                id_number: "320681198911010085".to_string(),
                phone: "15001974427".to_string(),
                task: "Backend development".to_string(),
                bank: "China Merchants Bank".to_string(),
                account_number: "6214852114742441".to_string(),
            },
            income: RawIncome::new(8000.0, 0.0, 4000.0),
        },
    ]
}

pub fn demo_roster() -> Roster {
    Roster::new(Rates::default(), demo_workers())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::derive;

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn new_roster_derives_every_entry() {
        let roster = demo_roster();
        assert_eq!(roster.len(), 2);
        for (entry, worker) in roster.entries().iter().zip(demo_workers()) {
            assert_eq!(entry.baseline, worker.income);
            assert_eq!(entry.record, derive(worker.income));
        }
    }

    #[test]
    fn totals_sum_all_records() {
        let totals = demo_roster().totals();
        assert_approx(totals.total_amount_due, 10001.0 + 12000.0);
        assert_approx(totals.total_order_amount, 10906.08 + 13520.0);
        assert_approx(totals.service_fee, 500.05 + 600.0);
        assert_approx(totals.taxes, 150.0 + 255.03 + 800.0 + 120.0);
        assert_approx(totals.net_amount, 9095.92 + 10480.0);
    }

    #[test]
    fn set_amount_replaces_record_and_keeps_others() {
        let mut roster = demo_roster();
        let untouched = roster.entries()[1].clone();

        let outcome = roster
            .set_amount(0, IncomeCategory::Business, 100.0)
            .expect("valid index");
        assert_eq!(outcome, EditOutcome::Updated);

        let expected = derive(RawIncome::new(1500.0, 100.0, 3400.40));
        assert_eq!(roster.entries()[0].record, expected);
        assert_eq!(roster.entries()[1], untouched);
        assert_eq!(
            roster.entries()[0].baseline,
            RawIncome::new(1500.0, 5100.60, 3400.40)
        );
    }

    #[test]
    fn unchanged_amount_is_not_saved() {
        let mut roster = demo_roster();
        let before = roster.entries()[1].clone();
        let outcome = roster
            .set_amount(1, IncomeCategory::SoleProprietor, 4000.0)
            .expect("valid index");
        assert_eq!(outcome, EditOutcome::Unchanged);
        assert_eq!(roster.entries()[1], before);

        let outcome = roster.set_total(1, 12000.0).expect("valid index");
        assert_eq!(outcome, EditOutcome::Unchanged);
        assert_eq!(roster.entries()[1], before);
    }

    #[test]
    fn set_total_uses_current_split() {
        let mut roster = demo_roster();
        roster.set_total(1, 7500.0).expect("valid index");
        let record = roster.entries()[1].record;
        assert_eq!(record.raw(), RawIncome::new(1500.0, 0.0, 6000.0));
        assert_approx(record.total_amount_due, 7500.0);
    }

    #[test]
    fn set_total_falls_back_to_baseline_after_zeroing() {
        let mut roster = demo_roster();
        roster
            .set_amount(0, IncomeCategory::Business, 0.0)
            .expect("valid index");
        roster
            .set_amount(0, IncomeCategory::SoleProprietor, 0.0)
            .expect("valid index");

        roster.set_total(0, 10001.0).expect("valid index");
        let raw = roster.entries()[0].record.raw();
        assert_approx(raw.labor_remuneration, 1500.0);
        assert_approx(raw.business_income, 5100.60);
        assert_approx(raw.sole_proprietor_income, 3400.40);
    }

    #[test]
    fn replace_raw_rederives() {
        let mut roster = demo_roster();
        let raw = RawIncome::new(10.0, 20.0, 30.0);
        roster.replace_raw(1, raw).expect("valid index");
        assert_eq!(roster.entries()[1].record, derive(raw));
    }

    #[test]
    fn unknown_index_is_rejected() {
        let mut roster = demo_roster();
        let err = roster
            .set_amount(5, IncomeCategory::Labor, 1.0)
            .expect_err("must reject");
        assert_eq!(err, RosterError::RecordNotFound { index: 5, len: 2 });
        assert!(roster.set_total(2, 1.0).is_err());
        assert!(roster.replace_raw(9, RawIncome::default()).is_err());
    }

    #[test]
    fn masked_account_keeps_last_four() {
        let roster = demo_roster();
        assert_eq!(
            roster.entries()[0].profile.masked_account(),
            "**** **** 5732"
        );

        let mut profile = roster.entries()[1].profile.clone();
        profile.account_number = "12".to_string();
        assert_eq!(profile.masked_account(), "**** **** 12");
    }

    #[test]
    fn worker_json_uses_flat_camel_case_keys() {
        let json = r#"{
            "name": "A",
            "id": "1",
            "phone": "2",
            "task": "t",
            "bank": "b",
            "accountNumber": "123456",
            "laborRemuneration": 1500,
            "businessIncome": 10.5,
            "soleProprietorIncome": 0
        }"#;
        let worker: Worker = serde_json::from_str(json).expect("valid worker");
        assert_eq!(worker.profile.id_number, "1");
        assert_eq!(worker.income, RawIncome::new(1500.0, 10.5, 0.0));
    }
}

mod engine;
mod order;
mod roster;
mod types;

pub use engine::{category_breakdown, derive, derive_with, reallocate, reallocate_with};
pub use order::{OrderStage, SettlementOrder, StageStatus};
pub use roster::{
    EditOutcome, Roster, RosterEntry, RosterTotals, Worker, WorkerProfile, demo_roster,
    demo_workers,
};
pub use types::{
    CategoryBreakdown, DerivedRecord, IncomeCategory, LABOR_CAP, LABOR_TAX_RATE, Rates, RawIncome,
    SERVICE_FEE_RATE, VAT_RATE,
};

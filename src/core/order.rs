use std::fmt;

use serde::Serialize;

use super::Roster;
use crate::error::RosterError;

#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum OrderStage {
    CreateOrder,
    BusinessConfirmation,
    PaymentConfirmation,
    Complete,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StageStatus {
    Completed,
    Current,
    Upcoming,
}

impl OrderStage {
    pub const ALL: [OrderStage; 4] = [
        OrderStage::CreateOrder,
        OrderStage::BusinessConfirmation,
        OrderStage::PaymentConfirmation,
        OrderStage::Complete,
    ];

    pub fn label(self) -> &'static str {
        match self {
            OrderStage::CreateOrder => "create order",
            OrderStage::BusinessConfirmation => "business confirmation",
            OrderStage::PaymentConfirmation => "payment confirmation",
            OrderStage::Complete => "complete",
        }
    }

    pub fn next(self) -> Self {
        match self {
            OrderStage::CreateOrder => OrderStage::BusinessConfirmation,
            OrderStage::BusinessConfirmation => OrderStage::PaymentConfirmation,
            OrderStage::PaymentConfirmation | OrderStage::Complete => OrderStage::Complete,
        }
    }

    pub fn previous(self) -> Self {
        match self {
            OrderStage::CreateOrder | OrderStage::BusinessConfirmation => OrderStage::CreateOrder,
            OrderStage::PaymentConfirmation => OrderStage::BusinessConfirmation,
            OrderStage::Complete => OrderStage::PaymentConfirmation,
        }
    }

    pub fn status_of(self, other: OrderStage) -> StageStatus {
        if other < self {
            StageStatus::Completed
        } else if other == self {
            StageStatus::Current
        } else {
            StageStatus::Upcoming
        }
    }

    pub fn allows_amount_edits(self) -> bool {
        self == OrderStage::BusinessConfirmation
    }
}

impl fmt::Display for OrderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone)]
pub struct SettlementOrder {
    pub month: String,
    pub task_label: String,
    stage: OrderStage,
    roster: Roster,
}

impl SettlementOrder {
    pub fn new(month: impl Into<String>, task_label: impl Into<String>, roster: Roster) -> Self {
        Self {
            month: month.into(),
            task_label: task_label.into(),
            stage: OrderStage::BusinessConfirmation,
            roster,
        }
    }

    pub fn stage(&self) -> OrderStage {
        self.stage
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn roster_mut(&mut self) -> Result<&mut Roster, RosterError> {
        if !self.stage.allows_amount_edits() {
            return Err(RosterError::OrderLocked { stage: self.stage });
        }
        Ok(&mut self.roster)
    }

    pub fn advance(&mut self) -> OrderStage {
        self.stage = self.stage.next();
        self.stage
    }

    pub fn back(&mut self) -> OrderStage {
        self.stage = self.stage.previous();
        self.stage
    }
}

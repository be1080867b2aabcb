use crate::ingestion::NormalizedLedger;
use chrono::{Local, NaiveDate};
use serde::Serialize;

/// Returned as `days_to_zero` when there is no spending to extrapolate from.
pub const NO_DEPLETION_SENTINEL: i64 = 999;

/// Source of "today" for elapsed-day arithmetic.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Aggregates derived from the cleaned ledger. They seed the model prompt and
/// are the only input to the fallback result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LocalStatistics {
    pub current_balance: f64,
    pub total_debits: f64,
    pub days_elapsed: i64,
    pub avg_daily_debit: f64,
    pub days_to_zero: i64,
}

impl LocalStatistics {
    pub fn compute(ledger: &NormalizedLedger, current_balance: f64, clock: &dyn Clock) -> Self {
        let total_debits: f64 = ledger.debits().map(|row| row.amount.abs()).sum();

        let days_elapsed = match ledger.earliest_date() {
            Some(earliest) => (clock.today() - earliest).num_days() + 1,
            None => 1,
        };

        let avg_daily_debit = if days_elapsed > 0 {
            total_debits / days_elapsed as f64
        } else {
            0.0
        };

        Self {
            current_balance,
            total_debits,
            days_elapsed,
            avg_daily_debit,
            days_to_zero: forecast_days_to_zero(current_balance, avg_daily_debit),
        }
    }
}

/// Whole days until `balance` is exhausted at `avg_daily_debit` per day.
///
/// Floors toward negative infinity, so an overdrawn balance yields a negative
/// count.
pub fn forecast_days_to_zero(balance: f64, avg_daily_debit: f64) -> i64 {
    if avg_daily_debit > 0.0 {
        (balance / avg_daily_debit).floor() as i64
    } else {
        NO_DEPLETION_SENTINEL
    }
}

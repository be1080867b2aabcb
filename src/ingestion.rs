use crate::schema::RawTransaction;
use crate::utils::{coerce_date, coerce_number, coerce_text};
use chrono::NaiveDate;
use log::{debug, warn};
use serde_json::Value;

pub const DEBIT: &str = "debit";

/// A transaction that survived coercion.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanTransaction {
    pub date: NaiveDate,
    pub category: String,
    pub amount: f64,
    pub kind: String,
}

impl CleanTransaction {
    pub fn is_debit(&self) -> bool {
        self.kind == DEBIT
    }
}

/// The cleaned transaction table plus a count of the rows that were discarded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedLedger {
    pub rows: Vec<CleanTransaction>,
    pub dropped_rows: usize,
}

impl NormalizedLedger {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn earliest_date(&self) -> Option<NaiveDate> {
        self.rows.iter().map(|row| row.date).min()
    }

    pub fn debits(&self) -> impl Iterator<Item = &CleanTransaction> {
        self.rows.iter().filter(|row| row.is_debit())
    }

    /// Renders the ledger as a column-aligned plain-text table.
    pub fn to_text_table(&self) -> String {
        if self.rows.is_empty() {
            return "Empty ledger (no valid transactions)".to_string();
        }

        let cells: Vec<[String; 4]> = self
            .rows
            .iter()
            .map(|row| {
                [
                    row.date.format("%Y-%m-%d").to_string(),
                    row.category.clone(),
                    format!("{:.2}", row.amount),
                    row.kind.clone(),
                ]
            })
            .collect();

        let headers = ["date", "category", "amount", "type"];
        let mut widths = headers.map(str::len);
        for row in &cells {
            for (width, cell) in widths.iter_mut().zip(row.iter()) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let render_line = |values: [&str; 4]| -> String {
            format!(
                "{:<w0$}  {:<w1$}  {:>w2$}  {:<w3$}",
                values[0],
                values[1],
                values[2],
                values[3],
                w0 = widths[0],
                w1 = widths[1],
                w2 = widths[2],
                w3 = widths[3],
            )
            .trim_end()
            .to_string()
        };

        let mut lines = Vec::with_capacity(cells.len() + 1);
        lines.push(render_line(headers));
        for row in &cells {
            lines.push(render_line([
                row[0].as_str(),
                row[1].as_str(),
                row[2].as_str(),
                row[3].as_str(),
            ]));
        }
        lines.join("\n")
    }
}

/// Coerces raw transactions into a clean table.
///
/// Rows whose date or amount cannot be parsed are dropped and counted; they
/// never produce an error.
pub fn normalize_transactions(transactions: &[RawTransaction]) -> NormalizedLedger {
    let mut ledger = NormalizedLedger {
        rows: Vec::with_capacity(transactions.len()),
        dropped_rows: 0,
    };

    for (idx, raw) in transactions.iter().enumerate() {
        let date = coerce_date(&raw.date);
        let amount = coerce_number(&raw.amount);

        match (date, amount) {
            (Some(date), Some(amount)) => ledger.rows.push(CleanTransaction {
                date,
                category: coerce_text(&raw.category),
                amount,
                kind: coerce_text(&raw.kind),
            }),
            _ => {
                debug!(
                    "Dropping transaction #{}: date={} amount={}",
                    idx, raw.date, raw.amount
                );
                ledger.dropped_rows += 1;
            }
        }
    }

    if ledger.dropped_rows > 0 {
        warn!(
            "Dropped {} of {} transactions with unparseable date or amount",
            ledger.dropped_rows,
            transactions.len()
        );
    }

    ledger
}

/// Coerces the raw balance, defaulting to zero when it is not numeric.
pub fn coerce_balance(raw: &Value) -> f64 {
    coerce_number(raw).unwrap_or_else(|| {
        if !raw.is_null() {
            debug!("Balance {} is not numeric, defaulting to 0", raw);
        }
        0.0
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_normalize_keeps_valid_rows_in_order() {
        let raw = vec![
            RawTransaction::new("2024-02-01", "Salary", 5_000_000, "credit"),
            RawTransaction::new("2024-01-15", "Food", "100000", "debit"),
        ];

        let ledger = normalize_transactions(&raw);

        assert_eq!(ledger.dropped_rows, 0);
        assert_eq!(ledger.rows.len(), 2);
        assert_eq!(ledger.rows[0].category, "Salary");
        assert_eq!(ledger.rows[1].amount, 100_000.0);
        assert_eq!(ledger.earliest_date(), Some(date(2024, 1, 15)));
        assert_eq!(ledger.debits().count(), 1);
    }

    #[test]
    fn test_normalize_drops_unparseable_rows() {
        let raw = vec![
            RawTransaction::new("not a date", "Food", "100", "debit"),
            RawTransaction::new("2024-01-01", "Food", "one hundred", "debit"),
            RawTransaction::new(Value::Null, "Food", 100, "debit"),
            RawTransaction::new("2024-01-02", "Transport", 25.5, "debit"),
        ];

        let ledger = normalize_transactions(&raw);

        assert_eq!(ledger.dropped_rows, 3);
        assert_eq!(ledger.rows.len(), 1);
        assert_eq!(ledger.rows[0].category, "Transport");
    }

    #[test]
    fn test_normalize_tolerates_missing_labels() {
        let raw = vec![RawTransaction {
            date: json!("2024-01-01"),
            amount: json!(10),
            ..Default::default()
        }];

        let ledger = normalize_transactions(&raw);

        assert_eq!(ledger.rows.len(), 1);
        assert_eq!(ledger.rows[0].category, "");
        assert!(!ledger.rows[0].is_debit());
    }

    #[test]
    fn test_debit_match_is_exact() {
        let raw = vec![
            RawTransaction::new("2024-01-01", "Food", 10, "Debit"),
            RawTransaction::new("2024-01-01", "Food", 10, "debit"),
        ];

        let ledger = normalize_transactions(&raw);
        assert_eq!(ledger.debits().count(), 1);
    }

    #[test]
    fn test_coerce_balance() {
        assert_eq!(coerce_balance(&json!("500000")), 500_000.0);
        assert_eq!(coerce_balance(&json!(1234.5)), 1234.5);
        assert_eq!(coerce_balance(&json!("-20")), -20.0);
        assert_eq!(coerce_balance(&json!("lots")), 0.0);
        assert_eq!(coerce_balance(&json!({"amount": 5})), 0.0);
        assert_eq!(coerce_balance(&Value::Null), 0.0);
    }

    #[test]
    fn test_text_table_rendering() {
        let raw = vec![
            RawTransaction::new("2024-01-01", "Food", "100000", "debit"),
            RawTransaction::new("2024-01-03", "Transportation", 2500, "debit"),
        ];

        let table = normalize_transactions(&raw).to_text_table();
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("date"));
        assert!(lines[0].contains("category"));
        assert!(lines[1].contains("100000.00"));
        assert!(lines[2].contains("Transportation"));
        assert!(lines[2].contains("2500.00"));
    }

    #[test]
    fn test_text_table_empty() {
        let ledger = normalize_transactions(&[]);
        assert_eq!(ledger.to_text_table(), "Empty ledger (no valid transactions)");
    }
}

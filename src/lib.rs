//! # LedgerFlow Analysis
//!
//! Turns a user's transaction history and current balance into a compact
//! financial-health summary: a score, a balance depletion forecast, notable
//! month-over-month spending shifts and written advice.
//!
//! ## Core Concepts
//!
//! - **Tolerant ingestion**: transactions arrive loosely typed. Rows with an
//!   unparseable date or amount are dropped (and counted), a non-numeric balance
//!   counts as zero.
//! - **Local statistics**: average daily debit and days-to-zero are always
//!   computed locally and grounded in the same arithmetic on every path.
//! - **Structured enrichment**: a language model is asked for a JSON answer
//!   constrained to the [`FinancialAnalysisResult`] schema and validated strictly.
//! - **Fallback**: when the model is absent, fails, or answers off-schema, a
//!   deterministic result is derived from the local statistics instead.
//!
//! ## Example
//!
//! ```rust,ignore
//! use ledgerflow_analysis::*;
//! use serde_json::json;
//!
//! let engine = AnalysisEngine::from_env();
//! let transactions = vec![RawTransaction::new("2024-01-01", "Food", "100000", "debit")];
//!
//! let result = engine.analyze(&transactions, &json!("500000")).await?;
//! println!("score {} / days to zero {}", result.financial_score, result.days_to_zero);
//! ```

pub mod engine;
pub mod error;
pub mod fallback;
pub mod ingestion;
pub mod model;
pub mod prompts;
pub mod schema;
pub mod stats;
pub mod utils;

#[cfg(feature = "gemini")]
pub mod llm;

pub use engine::{AnalysisEngine, AnalysisReport, EnrichmentOutcome, ResultSource};
pub use error::{AnalysisError, Result};
pub use fallback::{
    fallback_advice, fallback_result, fallback_score, placeholder_shifts, FALLBACK_ADVICE,
    FALLBACK_ADVICE_EN,
};
pub use ingestion::{coerce_balance, normalize_transactions, CleanTransaction, NormalizedLedger};
pub use model::{analysis_response_schema, parse_analysis_response, StructuredModel};
pub use prompts::Locale;
pub use schema::*;
pub use stats::{
    forecast_days_to_zero, Clock, FixedClock, LocalStatistics, SystemClock, NO_DEPLETION_SENTINEL,
};

use serde_json::Value;
use std::sync::Arc;

/// One-shot analysis with the system clock.
pub async fn run_analysis(
    transactions: &[RawTransaction],
    current_balance: &Value,
    model: Option<Arc<dyn StructuredModel>>,
) -> Result<FinancialAnalysisResult> {
    AnalysisEngine::new(model)
        .analyze(transactions, current_balance)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_end_to_end_without_model() {
        let transactions = vec![
            RawTransaction::new("2024-01-01", "Food", "100000", "debit"),
            RawTransaction::new("garbage", "Food", "100000", "debit"),
        ];

        let result = run_analysis(&transactions, &json!("500000"), None)
            .await
            .unwrap();

        assert!((10..=100).contains(&result.financial_score));
        assert_eq!(result.monthly_spending_shifts, placeholder_shifts());
        assert_eq!(result.advice, FALLBACK_ADVICE);
    }

    #[tokio::test]
    async fn test_empty_history_has_no_depletion() {
        let result = run_analysis(&[], &json!(1000), None).await.unwrap();

        assert_eq!(result.days_to_zero, NO_DEPLETION_SENTINEL);
        assert_eq!(result.financial_score, 50);
    }
}

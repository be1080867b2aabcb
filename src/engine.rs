use crate::error::{AnalysisError, Result};
use crate::fallback::fallback_result;
use crate::ingestion::{coerce_balance, normalize_transactions, NormalizedLedger};
use crate::model::{analysis_response_schema, parse_analysis_response, StructuredModel};
use crate::prompts::{build_analysis_prompt, Locale, DEFAULT_CURRENCY_SYMBOL};
use crate::schema::{AnalysisInput, FinancialAnalysisResult, RawTransaction};
use crate::stats::{Clock, LocalStatistics, SystemClock};
use log::{debug, info, warn};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Result of the best-effort model call.
#[derive(Debug)]
pub enum EnrichmentOutcome {
    Enriched(FinancialAnalysisResult),
    Failed(AnalysisError),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResultSource {
    Model,
    Fallback { reason: String },
}

/// A result together with how it was produced.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub result: FinancialAnalysisResult,
    pub source: ResultSource,
    pub statistics: LocalStatistics,
    pub dropped_rows: usize,
}

/// Runs the analysis pipeline: normalise, compute local statistics, try the
/// model, fall back to the local heuristic.
#[derive(Clone)]
pub struct AnalysisEngine {
    model: Option<Arc<dyn StructuredModel>>,
    clock: Arc<dyn Clock>,
    currency_symbol: String,
    locale: Locale,
}

impl AnalysisEngine {
    pub fn new(model: Option<Arc<dyn StructuredModel>>) -> Self {
        Self {
            model,
            clock: Arc::new(SystemClock),
            currency_symbol: DEFAULT_CURRENCY_SYMBOL.to_string(),
            locale: Locale::default(),
        }
    }

    pub fn without_model() -> Self {
        Self::new(None)
    }

    /// Builds an engine backed by Gemini, configured from the environment.
    #[cfg(feature = "gemini")]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds an engine backed by Gemini, reading configuration through `lookup`.
    ///
    /// A client that cannot be constructed is reported once here; the engine
    /// then serves every request from the local fallback.
    #[cfg(feature = "gemini")]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        match crate::llm::GeminiClient::from_lookup(lookup) {
            Ok(client) => {
                info!("Gemini client initialised (model: {})", client.model());
                let model: Arc<dyn StructuredModel> = Arc::new(client);
                Self::new(Some(model))
            }
            Err(e) => {
                warn!("Gemini client failed to initialise, AI analysis disabled: {}", e);
                Self::without_model()
            }
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn with_currency_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.currency_symbol = symbol.into();
        self
    }

    /// Sets the language of the prompt and of the fallback advice.
    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    pub async fn analyze(
        &self,
        transactions: &[RawTransaction],
        current_balance: &Value,
    ) -> Result<FinancialAnalysisResult> {
        Ok(self
            .analyze_detailed(transactions, current_balance)
            .await?
            .result)
    }

    pub async fn analyze_input(&self, input: &AnalysisInput) -> Result<FinancialAnalysisResult> {
        self.analyze(&input.transactions, &input.current_balance)
            .await
    }

    pub async fn analyze_detailed(
        &self,
        transactions: &[RawTransaction],
        current_balance: &Value,
    ) -> Result<AnalysisReport> {
        let ledger = normalize_transactions(transactions);
        let balance = coerce_balance(current_balance);
        let statistics = LocalStatistics::compute(&ledger, balance, self.clock.as_ref());

        ensure_finite("total_debits", statistics.total_debits)?;
        ensure_finite("avg_daily_debit", statistics.avg_daily_debit)?;

        info!(
            "Analysing {} transactions ({} dropped)",
            ledger.rows.len(),
            ledger.dropped_rows
        );
        debug!(
            "Local statistics: total_debits={:.2}, days_elapsed={}, avg_daily_debit={:.2}, days_to_zero={}",
            statistics.total_debits,
            statistics.days_elapsed,
            statistics.avg_daily_debit,
            statistics.days_to_zero
        );

        let (result, source) = match self.enrich(&ledger, &statistics).await {
            EnrichmentOutcome::Enriched(result) => (result, ResultSource::Model),
            EnrichmentOutcome::Failed(e) => {
                warn!("AI analysis unavailable, using local fallback: {}", e);
                (
                    fallback_result(&statistics, self.locale),
                    ResultSource::Fallback {
                        reason: e.to_string(),
                    },
                )
            }
        };

        Ok(AnalysisReport {
            result,
            source,
            statistics,
            dropped_rows: ledger.dropped_rows,
        })
    }

    /// Makes the single model call. Every failure is returned as
    /// [`EnrichmentOutcome::Failed`].
    pub async fn enrich(
        &self,
        ledger: &NormalizedLedger,
        statistics: &LocalStatistics,
    ) -> EnrichmentOutcome {
        let Some(model) = self.model.as_ref() else {
            return EnrichmentOutcome::Failed(AnalysisError::ModelUnavailable);
        };

        match self.call_model(model.as_ref(), ledger, statistics).await {
            Ok(result) => EnrichmentOutcome::Enriched(result),
            Err(e) => EnrichmentOutcome::Failed(e),
        }
    }

    async fn call_model(
        &self,
        model: &dyn StructuredModel,
        ledger: &NormalizedLedger,
        statistics: &LocalStatistics,
    ) -> Result<FinancialAnalysisResult> {
        let prompt = build_analysis_prompt(ledger, statistics, &self.currency_symbol, self.locale);
        let schema = analysis_response_schema()?;
        let text = model.generate(&prompt, &schema).await?;
        parse_analysis_response(&text)
    }
}

fn ensure_finite(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(AnalysisError::NonFiniteStatistic { name, value })
    }
}

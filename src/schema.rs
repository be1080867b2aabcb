use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A transaction as delivered by the upstream service.
///
/// Every field is kept as loosely-typed JSON: amounts frequently arrive as
/// strings and dates in whatever format the producer used. Coercion happens
/// in [`crate::ingestion`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTransaction {
    #[serde(default)]
    pub date: Value,
    #[serde(default)]
    pub category: Value,
    #[serde(default)]
    pub amount: Value,
    #[serde(default, rename = "type")]
    pub kind: Value,
}

impl RawTransaction {
    pub fn new(
        date: impl Into<Value>,
        category: impl Into<Value>,
        amount: impl Into<Value>,
        kind: impl Into<Value>,
    ) -> Self {
        Self {
            date: date.into(),
            category: category.into(),
            amount: amount.into(),
            kind: kind.into(),
        }
    }
}

/// Request body for a single analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisInput {
    #[serde(default)]
    pub transactions: Vec<RawTransaction>,
    #[serde(default)]
    pub current_balance: Value,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Increase,
    Decrease,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct SpendingShift {
    #[schemars(description = "Transaction category the shift was observed in")]
    pub category: String,

    #[schemars(
        description = "Month-over-month change in category spending, in percent. Negative for a decrease."
    )]
    pub change_percent: f64,

    #[schemars(description = "Direction of the change: 'increase' or 'decrease'")]
    pub trend: Trend,
}

impl SpendingShift {
    pub fn new(category: impl Into<String>, change_percent: f64, trend: Trend) -> Self {
        Self {
            category: category.into(),
            change_percent,
            trend,
        }
    }
}

/// The analysis returned to callers, whether produced by the model or by the
/// local fallback.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct FinancialAnalysisResult {
    #[schemars(
        description = "Overall financial health score from 1 (critical) to 100 (excellent), based on net flow and spending consistency"
    )]
    pub financial_score: i64,

    #[schemars(
        description = "Days until the balance reaches zero at the current average daily spend. 999 means no depletion is forecast."
    )]
    pub days_to_zero: i64,

    #[schemars(description = "The most significant month-over-month category spending shifts")]
    pub monthly_spending_shifts: Vec<SpendingShift>,

    #[schemars(description = "Personalised, specific financial advice for the user")]
    pub advice: String,
}

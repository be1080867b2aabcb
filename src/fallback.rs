use crate::prompts::Locale;
use crate::schema::{FinancialAnalysisResult, SpendingShift, Trend};
use crate::stats::LocalStatistics;

pub const FALLBACK_ADVICE: &str = "Saat ini sistem AI tidak aktif. Lanjutkan dengan analisis dasar: Fokus pada pengeluaran transportasi bulan ini.";
pub const FALLBACK_ADVICE_EN: &str = "The AI analysis system is currently inactive. Continuing with a basic analysis: focus on your transportation spending this month.";

const BASE_SCORE: i64 = 50;
const MIN_SCORE: i64 = 10;
const MAX_SCORE: i64 = 100;

/// Score used when the model is unavailable: five points per 100,000 of
/// average daily spend on top of a base of 50, clamped to `[10, 100]`.
pub fn fallback_score(avg_daily_debit: f64) -> i64 {
    let bonus = (avg_daily_debit / 100_000.0 * 5.0).floor() as i64;
    BASE_SCORE.saturating_add(bonus).clamp(MIN_SCORE, MAX_SCORE)
}

/// Fixed placeholder shifts. They are not derived from the ledger.
pub fn placeholder_shifts() -> Vec<SpendingShift> {
    vec![
        SpendingShift::new("Transportation", 50.0, Trend::Increase),
        SpendingShift::new("Food", -20.0, Trend::Decrease),
    ]
}

pub fn fallback_advice(locale: Locale) -> &'static str {
    match locale {
        Locale::Indonesian => FALLBACK_ADVICE,
        Locale::English => FALLBACK_ADVICE_EN,
    }
}

pub fn fallback_result(stats: &LocalStatistics, locale: Locale) -> FinancialAnalysisResult {
    FinancialAnalysisResult {
        financial_score: fallback_score(stats.avg_daily_debit),
        days_to_zero: stats.days_to_zero,
        monthly_spending_shifts: placeholder_shifts(),
        advice: fallback_advice(locale).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_score_formula() {
        assert_eq!(fallback_score(0.0), 50);
        assert_eq!(fallback_score(99_999.0), 50);
        assert_eq!(fallback_score(100_000.0), 55);
        assert_eq!(fallback_score(250_000.0), 62);
        assert_eq!(fallback_score(2_000_000.0), 100);
        assert_eq!(fallback_score(f64::MAX), 100);
    }

    #[test]
    fn test_fallback_score_lower_clamp() {
        assert_eq!(fallback_score(-900_000.0), 10);
        assert_eq!(fallback_score(-100_000.0), 45);
    }

    #[test]
    fn test_fallback_result_reuses_local_forecast() {
        let stats = LocalStatistics {
            current_balance: 500_000.0,
            total_debits: 100_000.0,
            days_elapsed: 10,
            avg_daily_debit: 10_000.0,
            days_to_zero: 50,
        };

        let result = fallback_result(&stats, Locale::default());

        assert_eq!(result.financial_score, 50);
        assert_eq!(result.days_to_zero, 50);
        assert_eq!(result.monthly_spending_shifts, placeholder_shifts());
        assert_eq!(result.advice, FALLBACK_ADVICE);

        let english = fallback_result(&stats, Locale::English);
        assert_eq!(english.advice, FALLBACK_ADVICE_EN);
        assert_eq!(english.financial_score, result.financial_score);
    }
}

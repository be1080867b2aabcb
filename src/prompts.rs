use crate::ingestion::NormalizedLedger;
use crate::stats::LocalStatistics;
use crate::utils::format_currency;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CURRENCY_SYMBOL: &str = "Rp";

/// Language of the prompt and of the fixed fallback notice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Locale {
    #[default]
    Indonesian,
    English,
}

/// Builds the instruction sent to the model.
///
/// The locally computed spend rate and days-to-zero are embedded so the model
/// restates the same arithmetic instead of inventing its own.
pub fn build_analysis_prompt(
    ledger: &NormalizedLedger,
    stats: &LocalStatistics,
    currency_symbol: &str,
    locale: Locale,
) -> String {
    let table = ledger.to_text_table();
    let balance = format_currency(stats.current_balance, currency_symbol);
    let avg_daily = format_currency(stats.avg_daily_debit, currency_symbol);
    let days_to_zero = stats.days_to_zero;

    match locale {
        Locale::Indonesian => format!(
            r#"
Anda adalah analis keuangan AI untuk LedgerFlow. Tugas Anda adalah menganalisis riwayat
transaksi berikut dan status saldo saat ini:

--- DATA TRANSAKSI MENTAH ---
{table}

--- STATUS SAAT INI ---
Saldo Aktif: {balance}
Rata-rata Pengeluaran Harian Bulan Ini: {avg_daily}

1. Berikan 'financial_score' (1-100) berdasarkan Net Flow dan Konsistensi.
2. Berikan 'days_to_zero' berdasarkan data yang sudah dihitung (Days: {days_to_zero}).
3. Identifikasi dua pergeseran pengeluaran MoM paling signifikan ('monthly_spending_shifts').
4. Tulis 'advice' personal dan spesifik untuk pengguna.

Berikan hasilnya HANYA dalam format JSON yang sesuai dengan skema yang diminta.
"#
        ),
        Locale::English => format!(
            r#"
You are the AI financial analyst for LedgerFlow. Your task is to analyse the following
transaction history and the user's current balance.

--- RAW TRANSACTION DATA ---
{table}

--- CURRENT STATUS ---
Active Balance: {balance}
Average Daily Spending This Month: {avg_daily}

1. Give a 'financial_score' (1-100) based on Net Flow and spending Consistency.
2. Give 'days_to_zero' based on the figure already calculated (Days: {days_to_zero}).
3. Identify the two most significant month-over-month category spending shifts ('monthly_spending_shifts').
4. Write personal, specific 'advice' for the user.

Return the result ONLY as JSON matching the requested schema.
"#
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingestion::normalize_transactions;
    use crate::schema::RawTransaction;
    use crate::stats::{FixedClock, LocalStatistics};
    use chrono::NaiveDate;

    fn sample() -> (NormalizedLedger, LocalStatistics) {
        let ledger = normalize_transactions(&[RawTransaction::new(
            "2024-01-01",
            "Food",
            "100000",
            "debit",
        )]);
        let clock = FixedClock(NaiveDate::from_ymd_opt(2024, 1, 4).unwrap());
        let stats = LocalStatistics::compute(&ledger, 500_000.0, &clock);
        (ledger, stats)
    }

    #[test]
    fn test_prompt_embeds_local_figures() {
        let (ledger, stats) = sample();

        let prompt =
            build_analysis_prompt(&ledger, &stats, DEFAULT_CURRENCY_SYMBOL, Locale::default());

        assert!(prompt.contains("Saldo Aktif: Rp500,000.00"));
        assert!(prompt.contains("Rata-rata Pengeluaran Harian Bulan Ini: Rp25,000.00"));
        assert!(prompt.contains("(Days: 20)"));
        assert!(prompt.contains("2024-01-01"));
        assert!(prompt.contains("Food"));
        assert!(prompt.contains("HANYA dalam format JSON"));
    }

    #[test]
    fn test_english_prompt() {
        let (ledger, stats) = sample();

        let prompt = build_analysis_prompt(&ledger, &stats, "$", Locale::English);

        assert!(prompt.contains("Active Balance: $500,000.00"));
        assert!(prompt.contains("Average Daily Spending This Month: $25,000.00"));
        assert!(prompt.contains("(Days: 20)"));
        assert!(prompt.contains("ONLY as JSON"));
        assert!(!prompt.contains("Saldo"));
    }
}

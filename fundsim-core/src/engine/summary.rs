//! Fund report — completed trades plus aggregate performance statistics.
//!
//! Everything here is derived from a finished `FundState`; nothing mutates it,
//! so building a report twice yields identical output.

use crate::domain::money::to_f64;
use crate::domain::{CompletedTrade, FundState};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::trade_extraction::extract_trades;

/// Reporting parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportOptions {
    /// Days per signal period; holding periods are expressed in these units.
    pub period_days: u32,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self { period_days: 7 }
    }
}

/// Aggregate statistics over a finished fund.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    // ── Balances ──
    pub starting_value: Decimal,
    pub cash_available: Decimal,
    pub invested_mark_value: Decimal,
    pub fund_value: Decimal,
    pub cost_of_doing_business: Decimal,

    // ── Closed trades ──
    pub closed_trades: usize,
    pub closed_profit_loss: Decimal,

    // ── Open trades ──
    pub open_trades: usize,
    /// Current mark value of open trades.
    pub open_value: Decimal,
    /// What open trades cost to enter.
    pub open_cost: Decimal,

    /// `closed P/L + open value − open cost`
    pub total_value_gained: Decimal,
    /// `fund_value / starting_value − 1`
    pub overall_roi: f64,

    // ── Per-trade ROI ──
    pub mean_roi: Option<f64>,
    pub positive_trades: usize,
    pub mean_positive_roi: Option<f64>,
    pub non_positive_trades: usize,
    pub mean_non_positive_roi: Option<f64>,
    pub win_rate: Option<f64>,

    // ── Holding periods (closed trades only) ──
    pub mean_holding_periods: Option<f64>,
    pub mean_positive_holding_periods: Option<f64>,
    pub mean_non_positive_holding_periods: Option<f64>,
}

impl ReportSummary {
    pub fn compute(fund: &FundState, trades: &[CompletedTrade]) -> Self {
        let (closed, open): (Vec<&CompletedTrade>, Vec<&CompletedTrade>) =
            trades.iter().partition(|t| t.is_closed());

        let closed_profit_loss: Decimal = closed.iter().filter_map(|t| t.profit_loss).sum();
        let open_value: Decimal = open.iter().map(|t| t.holding_value).sum();
        let open_cost: Decimal = open.iter().map(|t| t.buy_spend).sum();

        let overall_roi = if fund.starting_value().is_zero() {
            0.0
        } else {
            to_f64(fund.fund_value() / fund.starting_value()) - 1.0
        };

        let winners: Vec<&CompletedTrade> = trades.iter().filter(|t| t.is_winner()).collect();
        let losers: Vec<&CompletedTrade> = trades.iter().filter(|t| !t.is_winner()).collect();

        let win_rate = if trades.is_empty() {
            None
        } else {
            Some(winners.len() as f64 / trades.len() as f64)
        };

        Self {
            starting_value: fund.starting_value(),
            cash_available: fund.cash_available(),
            invested_mark_value: fund.invested_mark_value(),
            fund_value: fund.fund_value(),
            cost_of_doing_business: fund.cost_of_doing_business(),
            closed_trades: closed.len(),
            closed_profit_loss,
            open_trades: open.len(),
            open_value,
            open_cost,
            total_value_gained: closed_profit_loss + open_value - open_cost,
            overall_roi,
            mean_roi: mean(trades.iter().map(|t| t.roi)),
            positive_trades: winners.len(),
            mean_positive_roi: mean(winners.iter().map(|t| t.roi)),
            non_positive_trades: losers.len(),
            mean_non_positive_roi: mean(losers.iter().map(|t| t.roi)),
            win_rate,
            mean_holding_periods: mean(closed.iter().filter_map(|t| t.holding_periods)),
            mean_positive_holding_periods: mean(
                winners.iter().filter_map(|t| t.holding_periods),
            ),
            mean_non_positive_holding_periods: mean(
                losers.iter().filter_map(|t| t.holding_periods),
            ),
        }
    }
}

/// Completed trades and their summary for one fund.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundReport {
    pub trades: Vec<CompletedTrade>,
    pub summary: ReportSummary,
}

/// Match the fund's ledger into completed trades and summarize them.
pub fn build_report(fund: &FundState, options: &ReportOptions) -> FundReport {
    let trades = extract_trades(fund.ledger(), fund.positions(), options.period_days);
    let summary = ReportSummary::compute(fund, &trades);
    FundReport { trades, summary }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

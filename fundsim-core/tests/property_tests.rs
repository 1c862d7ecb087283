//! Property tests for fund invariants.
//!
//! Uses proptest to verify, over arbitrary signal streams:
//! 1. Cash never goes negative
//! 2. At most one open position per instrument
//! 3. Invested value equals the sum of position marks
//! 4. Ledger dates never decrease
//! 5. Buys conserve value up to their costs
//! 6. Reporting is idempotent

use chrono::{Days, NaiveDate};
use fundsim_core::domain::{SignalKind, SignalRow, TradeDirection};
use fundsim_core::engine::{
    build_report, replay, run_simulation, CostParameters, FundLedger, ReportOptions,
    SimulationConfig, SizingPolicy,
};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::BTreeSet;

const SYMBOLS: [&str; 4] = ["AAA", "BBB", "CCC", "DDD"];

// ── Strategies (proptest) ────────────────────────────────────────────

/// Prices in pence with two decimal places, 1.00 to 500.00.
fn arb_price() -> impl Strategy<Value = Decimal> {
    (100i64..50_000).prop_map(|cents| Decimal::new(cents, 2))
}

fn arb_signal() -> impl Strategy<Value = SignalKind> {
    prop_oneof![
        Just(SignalKind::Buy),
        Just(SignalKind::Sell),
        Just(SignalKind::Hold),
    ]
}

/// A date-ordered stream: each row advances the date by 0–2 days.
fn arb_stream(max_len: usize) -> impl Strategy<Value = Vec<SignalRow>> {
    prop::collection::vec(
        (
            0..SYMBOLS.len(),
            0u64..3,
            arb_signal(),
            arb_price(),
            arb_price(),
            0.0..1.0_f64,
        ),
        1..max_len,
    )
    .prop_map(|steps| {
        let start = NaiveDate::from_ymd_opt(2020, 1, 6).unwrap();
        let mut offset = 0u64;
        steps
            .into_iter()
            .map(|(sym, gap, signal, close, next_open, confidence)| {
                offset += gap;
                let date = start + Days::new(offset);
                SignalRow::new(SYMBOLS[sym], date, signal, close, Some(next_open), confidence)
            })
            .collect()
    })
}

fn small_fund() -> SimulationConfig {
    SimulationConfig {
        starting_value: dec!(100000),
        costs: CostParameters::default(),
        sizing: SizingPolicy {
            min_investment_value: dec!(5000),
            max_investment_fraction: dec!(0.25),
        },
    }
}

// ── 1–3. State invariants after every row ────────────────────────────

proptest! {
    #[test]
    fn fund_invariants_hold_after_every_row(signals in arb_stream(60)) {
        let config = small_fund();
        let mut ledger = FundLedger::new(config.starting_value, config.costs.clone()).unwrap();

        for row in &signals {
            replay(&mut ledger, std::slice::from_ref(row), &config.sizing);
            let fund = ledger.state();

            prop_assert!(fund.cash_available() >= Decimal::ZERO);
            prop_assert_eq!(fund.invested_mark_value(), fund.positions_mark_value());
            prop_assert_eq!(
                fund.fund_value(),
                fund.cash_available() + fund.invested_mark_value()
            );

            let held: BTreeSet<&str> = fund.positions().keys().map(String::as_str).collect();
            prop_assert_eq!(held.len(), fund.positions().len());
            for (instrument, position) in fund.positions() {
                prop_assert_eq!(instrument, &position.instrument_id);
                prop_assert!(position.share_volume > 0);
            }
        }
    }
}

// ── 4. Ledger ordering ───────────────────────────────────────────────

proptest! {
    #[test]
    fn ledger_dates_never_decrease(signals in arb_stream(80)) {
        let result = run_simulation(&signals, &small_fund()).unwrap();
        let ledger = result.fund.ledger();
        for pair in ledger.windows(2) {
            prop_assert!(pair[0].date <= pair[1].date);
            prop_assert!(pair[0].trade_id < pair[1].trade_id);
        }
        for (index, record) in ledger.iter().enumerate() {
            prop_assert_eq!(record.trade_id.0, index as u64);
        }
    }

    #[test]
    fn each_sell_closes_an_earlier_buy_of_the_same_instrument(signals in arb_stream(80)) {
        let result = run_simulation(&signals, &small_fund()).unwrap();
        let ledger = result.fund.ledger();
        for sell in ledger.iter().filter(|r| r.direction == TradeDirection::Sell) {
            let opening = sell.opening_trade_id.unwrap();
            let buy = &ledger[opening.0 as usize];
            prop_assert_eq!(buy.direction, TradeDirection::Buy);
            prop_assert_eq!(&buy.instrument_id, &sell.instrument_id);
            prop_assert_eq!(buy.share_volume, sell.share_volume);
            prop_assert!(buy.trade_id < sell.trade_id);
        }
    }
}

// ── 5. Conservation ──────────────────────────────────────────────────

proptest! {
    /// cash_post + invested_delta == cash_pre − fixed − stamp − shares × (ask − reference)
    #[test]
    fn buys_conserve_value_up_to_costs(signals in arb_stream(60)) {
        let result = run_simulation(&signals, &small_fund()).unwrap();
        for buy in result.fund.ledger().iter().filter(|r| r.is_buy()) {
            let invested_delta = buy.invested_value_post - buy.invested_value_pre;
            let slippage =
                Decimal::from(buy.share_volume) * (buy.ask_price - buy.reference_price);
            prop_assert_eq!(
                buy.cash_available_post + invested_delta,
                buy.cash_available_pre - buy.fixed_trade_cost - buy.stamp_duty - slippage
            );
        }
    }

    #[test]
    fn cost_of_doing_business_sums_ledger_costs(signals in arb_stream(60)) {
        let result = run_simulation(&signals, &small_fund()).unwrap();
        let total: Decimal = result
            .fund
            .ledger()
            .iter()
            .map(|r| r.cost_of_doing_business())
            .sum();
        prop_assert_eq!(result.fund.cost_of_doing_business(), total);
    }
}

// ── 6. Reporting ─────────────────────────────────────────────────────

proptest! {
    #[test]
    fn reporting_is_idempotent(signals in arb_stream(60)) {
        let result = run_simulation(&signals, &small_fund()).unwrap();
        let options = ReportOptions::default();
        let first = build_report(&result.fund, &options);
        let second = build_report(&result.fund, &options);
        prop_assert_eq!(&first, &second);

        let buys = result.fund.ledger().iter().filter(|r| r.is_buy()).count();
        prop_assert_eq!(first.trades.len(), buys);
        prop_assert_eq!(first.summary.open_trades, result.fund.positions().len());
    }
}

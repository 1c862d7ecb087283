//! End-to-end fund scenarios through the public engine API.

use chrono::NaiveDate;
use fundsim_core::domain::{SignalKind, SignalRow};
use fundsim_core::engine::{
    build_report, run_simulation, EngineError, ReportOptions, SimulationConfig,
};
use fundsim_core::fingerprint::ledger_digest;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn signal(symbol: &str, day: NaiveDate, kind: SignalKind, next_open: Decimal) -> SignalRow {
    SignalRow::new(symbol, day, kind, next_open, Some(next_open), 0.75)
}

#[test]
fn first_buy_matches_worked_example() {
    let signals = vec![signal("AAA", date(2024, 1, 1), SignalKind::Buy, dec!(100.0))];
    let result = run_simulation(&signals, &SimulationConfig::default()).unwrap();

    let trade = &result.fund.ledger()[0];
    assert_eq!(trade.ask_price, dec!(101.00));
    assert_eq!(trade.share_volume, 982);
    assert_eq!(trade.trade_value, dec!(99182.00));
    assert_eq!(trade.stamp_duty, dec!(495.91));
    assert_eq!(trade.ledger_value, dec!(-99927.91));
    assert_eq!(trade.cash_available_pre, dec!(1000000));
    assert_eq!(trade.cash_available_post, dec!(900072.09));
    assert_eq!(result.fund.cash_available(), dec!(900072.09));
    assert_eq!(result.fund.invested_mark_value(), dec!(98200.00));
}

#[test]
fn buy_for_held_instrument_leaves_ledger_unchanged() {
    let signals = vec![
        signal("AAA", date(2024, 1, 1), SignalKind::Buy, dec!(100.0)),
        signal("AAA", date(2024, 1, 8), SignalKind::Buy, dec!(103.0)),
    ];
    let result = run_simulation(&signals, &SimulationConfig::default()).unwrap();

    assert_eq!(result.fund.ledger().len(), 1);
    assert_eq!(result.stats.buys_already_open, 1);
    assert_eq!(result.fund.cash_available(), dec!(900072.09));
    assert!(result.errors.is_empty());
}

#[test]
fn sell_for_never_bought_instrument_is_a_quiet_no_op() {
    let signals = vec![signal("ZZZ", date(2024, 1, 1), SignalKind::Sell, dec!(10.0))];
    let result = run_simulation(&signals, &SimulationConfig::default()).unwrap();

    assert!(result.fund.ledger().is_empty());
    assert!(result.errors.is_empty());
    assert_eq!(result.stats.sells_not_held, 1);
}

#[test]
fn buy_costing_more_than_cash_is_recorded_and_run_continues() {
    let mut config = SimulationConfig {
        starting_value: dec!(100000),
        ..SimulationConfig::default()
    };
    // Without reserving the fixed fee, 985 shares plus costs come to 100,232.42.
    config.costs.value_includes_trade_cost = false;

    let signals = vec![
        signal("AAA", date(2024, 1, 1), SignalKind::Buy, dec!(100.0)),
        signal("BBB", date(2024, 1, 1), SignalKind::Hold, dec!(5.0)),
    ];
    let result = run_simulation(&signals, &config).unwrap();

    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].instrument_id, "AAA");
    match &result.errors[0].error {
        EngineError::InsufficientFunds {
            required,
            available,
        } => {
            assert_eq!(*required, dec!(100232.42));
            assert_eq!(*available, dec!(100000));
        }
        other => panic!("expected InsufficientFunds, got {other:?}"),
    }
    assert!(result.fund.ledger().is_empty());
    assert_eq!(result.fund.cash_available(), dec!(100000));
    assert_eq!(result.stats.rows, 2);
}

#[test]
fn buy_then_sell_is_one_completed_trade() {
    let signals = vec![
        signal("AAA", date(2024, 1, 1), SignalKind::Buy, dec!(100.0)),
        signal("AAA", date(2024, 1, 8), SignalKind::Hold, dec!(105.0)),
        signal("AAA", date(2024, 1, 22), SignalKind::Sell, dec!(110.0)),
    ];
    let result = run_simulation(&signals, &SimulationConfig::default()).unwrap();
    let report = build_report(&result.fund, &ReportOptions::default());

    assert_eq!(report.trades.len(), 1);
    let trade = &report.trades[0];
    assert_eq!(trade.buy_spend, dec!(99927.91));
    // 982 × 108.90 − 250
    assert_eq!(trade.sell_spend, Some(dec!(106689.80)));
    assert_eq!(trade.profit_loss, Some(dec!(6761.89)));
    assert_eq!(trade.holding_periods, Some(3.0));
    assert!(trade.is_winner());

    assert!(result.fund.positions().is_empty());
    assert_eq!(result.fund.invested_mark_value(), Decimal::ZERO);
    assert_eq!(result.fund.cash_available(), dec!(1006761.89));
    assert_eq!(report.summary.closed_profit_loss, dec!(6761.89));
    assert_eq!(report.summary.total_value_gained, dec!(6761.89));
}

#[test]
fn capital_is_allocated_to_higher_confidence_first() {
    let config = SimulationConfig {
        starting_value: dec!(150000),
        ..SimulationConfig::default()
    };
    let day = date(2024, 1, 1);
    let mut signals = vec![
        SignalRow::new("LOW", day, SignalKind::Buy, dec!(10), Some(dec!(10)), 0.2),
        SignalRow::new("HIGH", day, SignalKind::Buy, dec!(10), Some(dec!(10)), 0.9),
    ];
    fundsim_core::domain::sort_for_replay(&mut signals);
    let result = run_simulation(&signals, &config).unwrap();

    assert_eq!(result.fund.ledger().len(), 1);
    assert!(result.fund.holds("HIGH"));
    assert_eq!(result.stats.buys_skipped_low_cash, 1);
}

#[test]
fn identical_runs_have_identical_digests() {
    let signals = vec![
        signal("AAA", date(2024, 1, 1), SignalKind::Buy, dec!(100.0)),
        signal("BBB", date(2024, 1, 1), SignalKind::Buy, dec!(42.17)),
        signal("AAA", date(2024, 1, 8), SignalKind::Sell, dec!(97.5)),
        signal("BBB", date(2024, 1, 8), SignalKind::Hold, dec!(44.0)),
    ];
    let config = SimulationConfig::default();
    let a = run_simulation(&signals, &config).unwrap();
    let b = run_simulation(&signals, &config).unwrap();

    assert_eq!(a.fund.ledger(), b.fund.ledger());
    assert_eq!(
        ledger_digest(a.fund.ledger()).unwrap(),
        ledger_digest(b.fund.ledger()).unwrap()
    );
}

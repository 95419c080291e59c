//! Library-level tests for both cost basis methods
//!
//! These tests verify:
//! - Moving average round trips, weighted averages and income events
//! - Insufficient balance failures
//! - Total average yearly isolation and income folded into the average
//! - Input order independence and repeatability

use anyhow::Result;
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use zeitan::tax::{MovingAverageCalculator, TotalAverageCalculator};
use zeitan::{
    calculate, CalculationError, CalculationMethod, CostBasisCalculator, NormalizedTransaction,
    TransactionKind,
};

fn at(year: i32, month: u32, day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap()
        .and_hms_opt(10, 0, 0)
        .unwrap()
}

fn tx(
    timestamp: NaiveDateTime,
    kind: TransactionKind,
    amount: Decimal,
    price: Decimal,
    fee: Decimal,
) -> NormalizedTransaction {
    NormalizedTransaction::new(timestamp, "bitflyer", "BTC/JPY", kind, amount, price, fee)
}

#[test]
fn test_moving_average_simple_round_trip() -> Result<()> {
    let mut calc = MovingAverageCalculator::new();
    let results = calc.calculate(&[
        tx(at(2024, 1, 1), TransactionKind::Buy, dec!(1.0), dec!(5000000), dec!(1000)),
        tx(at(2024, 2, 1), TransactionKind::Sell, dec!(1.0), dec!(5500000), dec!(1000)),
    ])?;

    assert_eq!(results[0].average_cost_after, Some(dec!(5001000)));
    assert_eq!(results[1].profit_loss, dec!(498000));
    assert_eq!(calc.total_profit_loss(&results)?, dec!(498000));
    Ok(())
}

#[test]
fn test_moving_average_weighted_across_buys() -> Result<()> {
    let mut calc = MovingAverageCalculator::new();
    let results = calc.calculate(&[
        tx(at(2024, 1, 1), TransactionKind::Buy, dec!(1.0), dec!(5000000), dec!(0)),
        tx(at(2024, 1, 2), TransactionKind::Buy, dec!(1.0), dec!(6000000), dec!(0)),
        tx(at(2024, 1, 3), TransactionKind::Sell, dec!(2.0), dec!(7000000), dec!(0)),
    ])?;

    assert_eq!(results[1].average_cost_after, Some(dec!(5500000)));
    assert_eq!(results[2].profit_loss, dec!(3000000));
    Ok(())
}

#[test]
fn test_moving_average_income_event() -> Result<()> {
    let mut calc = MovingAverageCalculator::new();
    let results = calc.calculate(&[
        tx(at(2024, 1, 1), TransactionKind::Airdrop, dec!(10.0), dec!(300000), dec!(0)),
        tx(at(2024, 3, 1), TransactionKind::Sell, dec!(5.0), dec!(350000), dec!(0)),
    ])?;

    assert_eq!(results[0].profit_loss, dec!(3000000));
    assert_eq!(results[0].average_cost_after, Some(dec!(300000)));
    assert_eq!(results[1].profit_loss, dec!(250000));
    Ok(())
}

#[test]
fn test_moving_average_sell_without_holdings_fails() {
    let mut calc = MovingAverageCalculator::new();
    let err = calc
        .calculate(&[tx(at(2024, 1, 1), TransactionKind::Sell, dec!(1), dec!(5000000), dec!(0))])
        .unwrap_err();

    match err {
        CalculationError::InsufficientBalance { symbol, .. } => assert_eq!(symbol, "BTC/JPY"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_oversell_keeps_earlier_steps_committed() -> Result<()> {
    let mut calc = MovingAverageCalculator::new();
    let err = calc
        .calculate(&[
            tx(at(2024, 1, 1), TransactionKind::Buy, dec!(2), dec!(1000), dec!(0)),
            tx(at(2024, 1, 2), TransactionKind::Sell, dec!(1), dec!(1200), dec!(0)),
            tx(at(2024, 1, 3), TransactionKind::Sell, dec!(5), dec!(1200), dec!(0)),
        ])
        .unwrap_err();

    assert_eq!(
        err,
        CalculationError::InsufficientBalance {
            symbol: "BTC/JPY".to_string(),
            held: dec!(1),
            requested: dec!(5),
        }
    );
    let holding = calc.holding("BTC/JPY").expect("position from the first two steps");
    assert_eq!(holding.amount, dec!(1));
    assert_eq!(holding.average_cost, dec!(1000));
    Ok(())
}

#[test]
fn test_zero_amount_sell_without_holdings_fails() {
    let mut calc = MovingAverageCalculator::new();
    let err = calc
        .calculate(&[tx(at(2024, 1, 1), TransactionKind::Sell, dec!(0), dec!(5000000), dec!(0))])
        .unwrap_err();

    assert_eq!(
        err,
        CalculationError::InsufficientBalance {
            symbol: "BTC/JPY".to_string(),
            held: Decimal::ZERO,
            requested: Decimal::ZERO,
        }
    );
}

#[test]
fn test_overflowing_values_are_reported_not_panicked() {
    let txs = vec![tx(
        at(2024, 1, 1),
        TransactionKind::Buy,
        dec!(100000000000000000000),
        dec!(10000000000),
        dec!(0),
    )];

    for method in [CalculationMethod::MovingAverage, CalculationMethod::TotalAverage] {
        assert_eq!(
            calculate(method, &txs).unwrap_err(),
            CalculationError::ArithmeticOverflow {
                symbol: "BTC/JPY".to_string()
            },
            "{method}"
        );
    }
}

#[test]
fn test_average_cost_stable_across_disposals() -> Result<()> {
    let mut calc = MovingAverageCalculator::new();
    let results = calc.calculate(&[
        tx(at(2024, 1, 1), TransactionKind::Buy, dec!(3), dec!(100), dec!(7)),
        tx(at(2024, 1, 2), TransactionKind::Sell, dec!(1), dec!(120), dec!(0)),
        tx(at(2024, 1, 3), TransactionKind::TransferOut, dec!(0.5), dec!(0), dec!(0)),
        tx(at(2024, 1, 4), TransactionKind::Lending, dec!(0.5), dec!(0), dec!(0)),
        tx(at(2024, 1, 5), TransactionKind::Swap, dec!(0.5), dec!(130), dec!(1)),
    ])?;

    let first = results[0].average_cost_after;
    assert!(results[1..].iter().all(|r| r.average_cost_after == first));
    assert_eq!(calc.holdings()["BTC/JPY"].amount, dec!(0.5));
    Ok(())
}

#[test]
fn test_total_average_years_do_not_interact() -> Result<()> {
    let mut calc = TotalAverageCalculator::new();
    let results = calc.calculate(&[
        tx(at(2023, 1, 1), TransactionKind::Buy, dec!(1.0), dec!(5000000), dec!(0)),
        tx(at(2023, 6, 1), TransactionKind::Sell, dec!(1.0), dec!(5500000), dec!(0)),
        tx(at(2024, 1, 1), TransactionKind::Buy, dec!(1.0), dec!(6000000), dec!(0)),
        tx(at(2024, 6, 1), TransactionKind::Sell, dec!(1.0), dec!(6500000), dec!(0)),
    ])?;

    assert_eq!(results[1].average_cost_used, Some(dec!(5000000)));
    assert_eq!(results[1].profit_loss, dec!(500000));
    assert_eq!(results[3].average_cost_used, Some(dec!(6000000)));
    assert_eq!(results[3].profit_loss, dec!(500000));
    assert_eq!(calc.yearly_average_costs().len(), 2);
    Ok(())
}

#[test]
fn test_total_average_income_folded_into_average() -> Result<()> {
    let mut calc = TotalAverageCalculator::new();
    let results = calc.calculate(&[
        tx(at(2024, 1, 1), TransactionKind::Buy, dec!(1.0), dec!(300000), dec!(0)),
        tx(at(2024, 2, 1), TransactionKind::Airdrop, dec!(1.0), dec!(320000), dec!(0)),
        tx(at(2024, 3, 1), TransactionKind::Sell, dec!(2.0), dec!(350000), dec!(0)),
    ])?;

    assert_eq!(results[2].average_cost_used, Some(dec!(310000)));
    assert_eq!(results[2].profit_loss, dec!(80000));
    assert_eq!(results[1].profit_loss, dec!(320000));
    Ok(())
}

#[test]
fn test_total_average_rejects_nft_kinds() {
    let mut calc = TotalAverageCalculator::new();
    let err = calc
        .calculate(&[
            tx(at(2024, 1, 1), TransactionKind::NftBuy, dec!(1), dec!(30000), dec!(500)),
            tx(at(2024, 2, 1), TransactionKind::NftSell, dec!(1), dec!(40000), dec!(800)),
        ])
        .unwrap_err();
    assert_eq!(err, CalculationError::UnknownTransactionKind("nft_buy".to_string()));
}

#[test]
fn test_shuffled_input_gives_same_sorted_output() -> Result<()> {
    let ordered = vec![
        tx(at(2024, 1, 1), TransactionKind::Buy, dec!(2), dec!(100), dec!(1)),
        tx(at(2024, 1, 2), TransactionKind::Reward, dec!(1), dec!(130), dec!(0)),
        tx(at(2024, 1, 3), TransactionKind::Sell, dec!(1), dec!(150), dec!(1)),
        tx(at(2024, 1, 4), TransactionKind::TransferIn, dec!(1), dec!(0), dec!(0)),
        tx(at(2024, 1, 5), TransactionKind::Sell, dec!(2), dec!(90), dec!(0)),
    ];
    let mut shuffled = ordered.clone();
    shuffled.reverse();
    shuffled.swap(0, 2);

    for method in [CalculationMethod::MovingAverage, CalculationMethod::TotalAverage] {
        let a = calculate(method, &ordered)?;
        let b = calculate(method, &shuffled)?;
        assert_eq!(a, b, "{method}");
        assert!(a
            .results
            .windows(2)
            .all(|w| w[0].transaction.timestamp <= w[1].transaction.timestamp));
    }
    Ok(())
}

#[test]
fn test_repeated_calculation_is_identical() -> Result<()> {
    let txs = vec![
        tx(at(2024, 1, 1), TransactionKind::Buy, dec!(3), dec!(1000), dec!(10)),
        tx(at(2024, 1, 2), TransactionKind::Sell, dec!(1), dec!(1100), dec!(5)),
    ];

    let mut calc = MovingAverageCalculator::new();
    let first = calc.calculate(&txs)?;
    let second = calc.calculate(&txs)?;
    assert_eq!(first, second);
    assert_eq!(calc.holdings()["BTC/JPY"].amount, dec!(2));
    Ok(())
}

#[test]
fn test_failed_call_returns_no_results() {
    let txs = vec![
        tx(at(2024, 1, 1), TransactionKind::Buy, dec!(1), dec!(1000), dec!(0)),
        tx(at(2024, 1, 2), TransactionKind::Sell, dec!(1), dec!(1100), dec!(0)),
        tx(at(2024, 1, 3), TransactionKind::Sell, dec!(1), dec!(1100), dec!(0)),
    ];

    assert!(calculate(CalculationMethod::MovingAverage, &txs).is_err());
    // Total average has no balance check
    let report = calculate(CalculationMethod::TotalAverage, &txs).unwrap();
    assert_eq!(report.total_profit_loss, dec!(200));
}

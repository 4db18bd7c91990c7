//! Integration tests for the full scoring pipeline.
//!
//! These tests run the pipeline end to end through real input and output
//! files.

use rust_decimal::Decimal;
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tempfile::TempDir;

use credit_scorer::core::{io, Error, ScoreRecord, ScoringPipeline, ScoringWeights, WalletSet};

const DAY: i64 = 86_400;

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn tx(wallet: &str, ts: i64, action: &str, asset: &str, amount: &str, price: &str) -> serde_json::Value {
    json!({
        "userWallet": wallet,
        "network": "polygon",
        "protocol": "aave_v2",
        "timestamp": ts,
        "action": action,
        "actionData": {
            "type": action,
            "amount": amount,
            "assetSymbol": asset,
            "assetPriceUSD": price
        }
    })
}

fn read_scores(path: &Path) -> Vec<(String, f64)> {
    let text = fs::read_to_string(path).unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("wallet_id,score"));
    lines
        .map(|line| {
            let (wallet, score) = line.split_once(',').unwrap();
            (wallet.to_string(), score.parse().unwrap())
        })
        .collect()
}

/// Hand-computed example: supply 1000, borrow 500, repay 500 within a day.
#[test]
fn test_hand_computed_example() {
    let records = vec![
        tx("0xABC", 1_000, "supply", "USDC", "1000", "1"),
        tx("0xabc", 2_000, "borrow", "USDC", "500", "1"),
        tx("0xabc", 3_000, "repay", "USDC", "500", "1"),
        // A second wallet that only borrows, so the range is not degenerate.
        tx("0xdef", 1_000, "borrow", "USDC", "100", "1"),
    ];
    let wallets = WalletSet::from_ids(["0xabc", "0xdef"]);
    let output = ScoringPipeline::default().run(&records, &wallets).unwrap();

    let abc = &output.features["0xabc"];
    assert_eq!(abc.deposit_total, Decimal::from(1000));
    assert_eq!(abc.borrow_total, Decimal::from(500));
    assert_eq!(abc.repay_total, Decimal::from(500));
    assert_eq!(abc.repay_ratio, 1.0);
    assert_eq!(abc.borrow_deposit_ratio, 0.5);
    assert_eq!(abc.liquidation_count, 0);
    assert_eq!(abc.active_days, 1);

    // 0.35*1 + 0.25*0.5 + 0.20*1 + 0.15*3 + 0.05*1 = 1.175
    // 0xdef: 0.35*0 + 0.25*1 + 0.20*1 + 0.15*1 + 0.05*1 = 0.65
    let raw_abc = credit_scorer::core::scorer::raw_score(abc, 1, &ScoringWeights::DEFAULT);
    let raw_def = credit_scorer::core::scorer::raw_score(
        &output.features["0xdef"],
        1,
        &ScoringWeights::DEFAULT,
    );
    assert!((raw_abc - 1.175).abs() < 1e-12);
    assert!((raw_def - 0.65).abs() < 1e-12);

    assert_eq!(
        output.scores,
        vec![ScoreRecord::new("0xabc", 1000.0), ScoreRecord::new("0xdef", 0.0)]
    );
}

#[test]
fn test_end_to_end_files() {
    let dir = TempDir::new().unwrap();
    let records = json!([
        tx("0xAAA", 0, "supply", "USDC", "5000000000", "1"),
        tx("0xaaa", DAY, "borrow", "WETH", "1000000000000000000", "1800"),
        tx("0xaaa", 3 * DAY, "repay", "WETH", "1000000000000000000", "1900"),
        tx("0xbbb", 0, "supply", "DAI", "300", "1"),
        tx("0xbbb", DAY, "borrow", "DAI", "600", "1"),
        tx("0xbbb", 2 * DAY, "liquidationcall", "DAI", "100", "1"),
        tx("0xccc", 0, "supply", "USDC", "10", "1"),
        tx("0xnotlisted", 0, "supply", "USDC", "10", "1"),
    ]);
    let tx_path = write(&dir, "tx.json", &records.to_string());
    let wallet_path = write(&dir, "wallets.csv", "wallet_id\n0xAAA\n0xbbb\n0xccc\n0xidle\n");
    let out_path = dir.path().join("scores.csv");

    let output = ScoringPipeline::default()
        .run_files(&tx_path, &wallet_path)
        .unwrap();
    io::write_scores(&out_path, &output.scores).unwrap();

    let scores = read_scores(&out_path);
    let ids: Vec<_> = scores.iter().map(|(w, _)| w.as_str()).collect();
    assert_eq!(ids, vec!["0xAAA", "0xbbb", "0xccc", "0xidle"]);
    assert!(scores.iter().all(|(_, s)| (0.0..=1000.0).contains(s)));
    assert_eq!(scores[3].1, 0.0);

    // 1e18 wei-style amounts are scaled down; 5e9 is below the threshold.
    let aaa = &output.features["0xaaa"];
    assert_eq!(aaa.deposit_total, Decimal::from(5_000_000_000i64));
    assert_eq!(aaa.borrow_total, Decimal::from(1800));
    assert_eq!(aaa.repay_total, Decimal::from(1900));
    assert_eq!(aaa.active_days, 4);
    assert_eq!(output.features["0xbbb"].liquidation_count, 1);
    assert_eq!(output.report.rejected["unrequested_wallet"], 1);
}

#[test]
fn test_zero_activity_wallet_scores_zero() {
    let records = vec![
        tx("0x1", 0, "supply", "USDC", "100", "1"),
        tx("0x2", 0, "borrow", "USDC", "100", "1"),
    ];
    let wallets = WalletSet::from_ids(["0x1", "0x2", "0xghost"]);
    let output = ScoringPipeline::default().run(&records, &wallets).unwrap();
    assert_eq!(output.scores[2], ScoreRecord::zero("0xghost"));
}

#[test]
fn test_empty_transactions_file() {
    let dir = TempDir::new().unwrap();
    for contents in ["", "[]"] {
        let tx_path = write(&dir, "tx.json", contents);
        let wallet_path = write(&dir, "wallets.csv", "wallet_id\n0x1\n0x2\n");
        let output = ScoringPipeline::default()
            .run_files(&tx_path, &wallet_path)
            .unwrap();
        assert_eq!(output.scores.len(), 2);
        assert!(output.scores.iter().all(|s| s.score == 0.0));
    }
}

#[test]
fn test_malformed_amount_does_not_abort() {
    let records = vec![
        tx("0x1", 0, "supply", "USDC", "not_a_number", "1"),
        tx("0x1", 10, "borrow", "USDC", "50", "1"),
        tx("0x2", 0, "supply", "USDC", "100", "1"),
    ];
    let wallets = WalletSet::from_ids(["0x1", "0x2"]);
    let output = ScoringPipeline::default().run(&records, &wallets).unwrap();

    let f = &output.features["0x1"];
    assert_eq!(f.num_tx, 2);
    assert_eq!(f.deposit_total, Decimal::ZERO);
    assert_eq!(f.avg_tx_usd, Decimal::from(25));
    assert_eq!(output.report.value_warnings["invalid_amount"], 1);
}

#[test]
fn test_unit_normalization_boundary() {
    let records = vec![
        tx("0x1", 0, "supply", "USDC", "2000000000000", "1"),
        tx("0x2", 0, "supply", "USDC", "500", "1"),
    ];
    let wallets = WalletSet::from_ids(["0x1", "0x2"]);
    let output = ScoringPipeline::default().run(&records, &wallets).unwrap();

    assert_eq!(
        output.features["0x1"].deposit_total,
        Decimal::from_str("0.000002").unwrap()
    );
    assert_eq!(output.features["0x2"].deposit_total, Decimal::from(500));
}

#[test]
fn test_idempotent_runs() {
    let dir = TempDir::new().unwrap();
    let records = json!([
        tx("0x1", 0, "supply", "USDC", "100", "1"),
        tx("0x1", DAY * 2, "borrow", "WETH", "40", "1"),
        tx("0x2", 0, "supply", "DAI", "100", "1"),
        tx("0x2", 5, "liquidateborrow", "DAI", "1", "1"),
        tx("0x3", 0, "mint", "USDC", "1", "1"),
    ]);
    let tx_path = write(&dir, "tx.json", &records.to_string());
    let wallet_path = write(&dir, "wallets.csv", "wallet_id\n0x1\n0x2\n0x3\n");

    let pipeline = ScoringPipeline::default();
    let first = pipeline.run_files(&tx_path, &wallet_path).unwrap();
    let second = pipeline.run_files(&tx_path, &wallet_path).unwrap();
    assert_eq!(first.scores, second.scores);
}

#[test]
fn test_terminal_errors() {
    let dir = TempDir::new().unwrap();
    let tx_path = write(&dir, "tx.json", "[]");
    let pipeline = ScoringPipeline::default();

    let missing = dir.path().join("missing.csv");
    assert!(matches!(
        pipeline.run_files(&tx_path, &missing),
        Err(Error::Io { .. })
    ));

    let no_column = write(&dir, "no_column.csv", "address\n0x1\n");
    assert!(matches!(
        pipeline.run_files(&tx_path, &no_column),
        Err(Error::MissingColumn { .. })
    ));

    let empty = write(&dir, "empty.csv", "");
    assert!(matches!(
        pipeline.run_files(&tx_path, &empty),
        Err(Error::EmptyWalletList { .. })
    ));

    let wallets = write(&dir, "wallets.csv", "wallet_id\n0x1\n");
    let broken = write(&dir, "broken.json", "[{\"userWallet\": ");
    assert!(matches!(
        pipeline.run_files(&broken, &wallets),
        Err(Error::Json(_))
    ));
}

#[test]
fn test_features_export() {
    let dir = TempDir::new().unwrap();
    let records = vec![tx("0x1", 0, "supply", "USDC", "100", "1")];
    let wallets = WalletSet::from_ids(["0x1", "0x2"]);
    let output = ScoringPipeline::default().run(&records, &wallets).unwrap();

    let path = dir.path().join("features.csv");
    io::write_features(&path, &output.feature_rows()).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("wallet,num_tx,active_days,avg_tx_usd"));
    assert!(lines[1].starts_with("0x1,1,1,100,"));
    assert!(lines[2].starts_with("0x2,0,1,0,"));
}

#[test]
fn test_deposit_action_is_not_bucketed() {
    let records = vec![
        tx("0x1", 0, "deposit", "USDC", "100", "1"),
        tx("0x1", 10, "borrow", "USDC", "40", "1"),
    ];
    let wallets = WalletSet::from_ids(["0x1"]);
    let output = ScoringPipeline::default().run(&records, &wallets).unwrap();

    let f = &output.features["0x1"];
    assert_eq!(f.num_tx, 2);
    assert_eq!(f.deposit_total, Decimal::ZERO);
    assert_eq!(f.borrow_deposit_ratio, 0.0);
    assert_eq!(f.avg_tx_usd, Decimal::from(70));
}

#[test]
fn test_near_max_values_do_not_abort() {
    // Each product is 5e28; the amount sits exactly at the 1e12 threshold so
    // it is not scaled, and the two together exceed Decimal::MAX.
    let records = vec![
        tx("0xa", 0, "supply", "USDC", "1000000000000", "50000000000000000"),
        tx("0xa", 10, "supply", "USDC", "1000000000000", "50000000000000000"),
        tx("0xb", 0, "supply", "USDC", "100", "1"),
    ];
    let wallets = WalletSet::from_ids(["0xa", "0xb"]);
    let output = ScoringPipeline::default().run(&records, &wallets).unwrap();

    assert_eq!(output.features["0xa"].deposit_total, Decimal::MAX);
    assert_eq!(output.features["0xa"].num_tx, 2);
    assert_eq!(output.scores.len(), 2);
    assert!(output.scores.iter().all(|s| (0.0..=1000.0).contains(&s.score)));
}

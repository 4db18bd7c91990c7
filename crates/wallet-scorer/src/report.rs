//! Text summary of a scoring run.

use credit_core::{PipelineOutput, ScoreRecord};

/// Generate a ranked report of a finished run.
pub fn generate_report(output: &PipelineOutput, top_n: usize) -> String {
    let mut report = String::new();
    let normalization = &output.report;

    report.push_str("=== Wallet Credit Score Report ===\n");

    report.push_str("\n--- Input ---\n");
    report.push_str(&format!("Records Read: {}\n", normalization.total_records));
    report.push_str(&format!(
        "Accepted: {} ({} valued at zero)\n",
        normalization.accepted, normalization.zero_valued
    ));
    if normalization.rejected.is_empty() {
        report.push_str("Rejected: 0\n");
    } else {
        report.push_str(&format!("Rejected: {}\n", normalization.rejected_total()));
        for (reason, count) in &normalization.rejected {
            report.push_str(&format!("  - {}: {}\n", reason, count));
        }
    }

    report.push_str("\n--- Scores ---\n");
    report.push_str(&format!("Wallets Scored: {}\n", output.scores.len()));
    report.push_str(&format!("With Activity: {}\n", output.active_wallets()));
    report.push_str(&format!(
        "Without Activity: {}\n",
        output.scores.len() - output.active_wallets()
    ));

    let active: Vec<f64> = output
        .scores
        .iter()
        .filter(|s| output.features.contains_key(&s.wallet_id.to_lowercase()))
        .map(|s| s.score)
        .collect();
    if !active.is_empty() {
        let min = active.iter().copied().fold(f64::INFINITY, f64::min);
        let max = active.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = active.iter().sum::<f64>() / active.len() as f64;
        report.push_str(&format!(
            "Active Range: {:.2} - {:.2} (mean {:.2})\n",
            min, max, mean
        ));
    }

    let ranked = rank_scores(&output.scores);
    if top_n > 0 && !ranked.is_empty() {
        report.push_str(&format!("\n--- Top {} ---\n", top_n.min(ranked.len())));
        for (rank, record) in ranked.iter().take(top_n).enumerate() {
            report.push_str(&format!(
                "{:>3}. {} {:>8.2}",
                rank + 1,
                record.wallet_id,
                record.score
            ));
            if let Some(f) = output.features.get(&record.wallet_id.to_lowercase()) {
                report.push_str(&format!(
                    "  tx={} repay={:.2} leverage={:.2} liquidations={} deposits=${}",
                    f.num_tx,
                    f.repay_ratio,
                    f.borrow_deposit_ratio,
                    f.liquidation_count,
                    f.deposit_total.round_dp(2)
                ));
            }
            report.push('\n');
        }
    }

    report.push_str("\n==================================\n");

    report
}

/// Rank wallets by score, best first. Ties keep wallet list order.
pub fn rank_scores(scores: &[ScoreRecord]) -> Vec<&ScoreRecord> {
    let mut ranked: Vec<_> = scores.iter().collect();
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked
}

//! Plain-text summary of a trial batch.

use std::collections::BTreeMap;
use std::fmt::Write;

use rotation_core::EffectId;
use rotation_runtime::TrialReport;

/// Renders one line per trial followed by per-effect averages.
pub fn render(reports: &[TrialReport]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>5}  {:>10}  {:>9}  {:>5}  status",
        "trial", "seed", "decisions", "casts"
    );
    for report in reports {
        let status = report
            .aborted
            .as_ref()
            .map_or_else(|| "ok".to_string(), |abort| format!("aborted ({})", abort.code));
        let _ = writeln!(
            out,
            "{:>5}  {:>10}  {:>9}  {:>5}  {}",
            report.trial,
            report.seed,
            report.decisions,
            report.total_casts(),
            status
        );
    }

    let mut effects: BTreeMap<EffectId, (f64, i64, usize)> = BTreeMap::new();
    for report in reports {
        for (effect, coverage) in &report.effects {
            let entry = effects.entry(*effect).or_default();
            entry.0 += coverage.uptime;
            entry.1 = entry.1.max(coverage.longest_gap_ms);
            entry.2 += 1;
        }
    }
    if !effects.is_empty() {
        let _ = writeln!(out, "\n{:<18}  {:>7}  {:>12}", "effect", "uptime", "worst gap");
    }
    for (effect, (uptime, gap, count)) in effects {
        let mean = uptime / count.max(1) as f64;
        let _ = writeln!(
            out,
            "{:<18}  {:>6.1}%  {:>10}ms",
            effect.to_string(),
            mean * 100.0,
            gap
        );
    }
    out
}

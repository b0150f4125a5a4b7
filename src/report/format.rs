//! Formatted terminal output for fit reports.
//!
//! Everything here works from a [`FitReport`], so a saved report prints the
//! same way as a fresh fit.

use crate::domain::{FitReport, NamedCoefficient, PredictionRow};

/// Format the run summary (dataset + fit diagnostics + coefficient table).
pub fn format_fit_summary(report: &FitReport) -> String {
    let mut out = String::new();

    out.push_str("=== linfit - least squares fit ===\n");
    out.push_str(&format!("Source: {}\n", report.source));
    out.push_str(&format!(
        "Samples: n={} | parameters p={} | df={}\n",
        report.samples, report.parameters, report.degrees_of_freedom
    ));
    out.push_str(&format!(
        "Weighting: {}\n",
        if report.weighted { "inverse variance" } else { "none (OLS)" }
    ));
    out.push_str(&format!(
        "Residual variance s²={:.6} | s={:.6}\n",
        report.residual_variance,
        report.residual_variance.sqrt()
    ));
    match report.r_squared {
        Some(r2) => out.push_str(&format!("R²={r2:.6}\n")),
        None => out.push_str("R²=n/a (constant response)\n"),
    }
    out.push_str(&format!("Conditioning: rcond={:.3e}\n", report.rcond));

    out.push_str(&format!(
        "\nCoefficients ({:.1}% intervals):\n",
        100.0 * (1.0 - report.significance)
    ));
    out.push_str(&format_coefficients(&report.coefficients, report.truth.as_deref()));

    out
}

/// Format the interval table for the requested query points.
pub fn format_predictions(rows: &[PredictionRow]) -> String {
    let mut out = String::new();
    if rows.is_empty() {
        out.push_str("No query points.\n");
        return out;
    }

    out.push_str(
        format!(
            "{:<28} {:>12} {:>10} {:>12} {:>12} {:>10}\n",
            "query", "estimate", "leverage", "± conf", "± pred", "t"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!(
            "{:-<28} {:-<12} {:-<10} {:-<12} {:-<12} {:-<10}\n",
            "", "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');

    for row in rows {
        let r = &row.interval;
        out.push_str(
            format!(
                "{:<28} {:>12.4} {:>10.5} {:>12.4} {:>12.4} {:>10.4}\n",
                truncate(&fmt_vec(&row.predictors), 28),
                r.estimate,
                r.leverage,
                r.confidence_half_width,
                r.prediction_half_width,
                r.critical_value,
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

fn format_coefficients(rows: &[NamedCoefficient], truth: Option<&[f64]>) -> String {
    let mut out = String::new();
    let truth_header = if truth.is_some() { "truth" } else { "" };

    out.push_str(
        format!(
            "{:<16} {:>12} {:>10} {:>9} {:>10} {:>12} {:>12} {:>10}\n",
            "name", "estimate", "std.err", "t", "p", "lower", "upper", truth_header
        )
        .trim_end(),
    );
    out.push('\n');

    for (i, row) in rows.iter().enumerate() {
        let c = &row.estimate;
        let truth_cell = truth
            .and_then(|t| t.get(i))
            .map(|v| format!("{v:.4}"))
            .unwrap_or_default();
        out.push_str(
            format!(
                "{:<16} {:>12.4} {:>10.4} {:>9.2} {:>10} {:>12.4} {:>12.4} {:>10}\n",
                truncate(&row.name, 16),
                c.value,
                c.std_error,
                c.t_statistic,
                fmt_p(c.p_value),
                c.lower,
                c.upper,
                truth_cell,
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

fn fmt_p(p: f64) -> String {
    if p < 1e-4 { format!("{p:.2e}") } else { format!("{p:.4}") }
}

fn fmt_vec(v: &[f64]) -> String {
    let parts: Vec<String> = v.iter().map(|x| format!("{x}")).collect();
    format!("[{}]", parts.join(", "))
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

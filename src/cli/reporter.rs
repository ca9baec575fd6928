// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! CLI output reporter with colored formatting

use crate::geometry::{BooleanOp, BooleanOutcome};
use colored::*;
use std::time::Duration;

/// CLI reporter for formatted output
pub struct Reporter;

impl Reporter {
    /// Report the result of one Boolean evaluation
    pub fn report_boolean(op: BooleanOp, output: &str, outcome: &BooleanOutcome, duration: Duration) {
        let diag = &outcome.diagnostics;
        println!("\n{}", "━".repeat(80).bright_black());
        println!("{} {}", format!("{}:", op).bold(), output.cyan());
        println!("{}", "━".repeat(80).bright_black());

        if outcome.is_empty() {
            println!("{} {}", "∅".yellow(), "Result is empty".yellow().bold());
        } else if outcome.mesh.is_closed() {
            println!("{} {}", "✅".green(), "Result is closed".green().bold());
        } else {
            println!("{} {}", "⚠️".yellow(), "Result has unpaired edges".yellow().bold());
        }

        println!("\n{}", "Result:".bold());
        Self::print_count("Faces", outcome.mesh.face_count(), false);
        Self::print_count("Vertices", outcome.mesh.vertex_count(), false);
        Self::print_count("Paired half-edges", diag.pairing.paired, false);
        Self::print_count("Bridge half-edges", diag.pairing.bridges, false);
        Self::print_count("Unpaired half-edges", diag.pairing.unpaired, true);
        Self::print_count("Pairing anomalies", diag.pairing.anomalies, true);

        println!("\n{}", "Classification:".bold());
        let [a_in, a_out, b_in, b_out] = diag.fragments;
        println!(
            "  {} {} | {} {} | {} {} | {} {}",
            "A in B:".bright_black(),
            a_in.to_string().cyan(),
            "A out B:".bright_black(),
            a_out.to_string().cyan(),
            "B in A:".bright_black(),
            b_in.to_string().cyan(),
            "B out A:".bright_black(),
            b_out.to_string().cyan()
        );
        Self::print_count("Coincident pairs", diag.coincident_pairs, false);
        Self::print_count("Dropped segments", diag.dropped_segments, true);

        println!("\n{}", "Performance:".bold());
        println!("  {} {}", "Time:".bright_black(), Self::format_duration(duration).yellow());
        println!("{}", "━".repeat(80).bright_black());
    }

    /// Report error
    pub fn report_error(message: &str) {
        eprintln!("\n{} {}", "❌ Error:".red().bold(), message);
    }

    /// Report warning
    pub fn report_warning(message: &str) {
        println!("\n{} {}", "⚠️  Warning:".yellow().bold(), message);
    }

    /// Print success message
    pub fn success(message: &str) {
        println!("{} {}", "✅".green(), message.green());
    }

    /// Counts that should be zero are highlighted when they are not
    fn print_count(name: &str, value: usize, want_zero: bool) {
        let formatted = if want_zero && value > 0 {
            value.to_string().red()
        } else if want_zero {
            value.to_string().green()
        } else {
            value.to_string().cyan()
        };
        println!("  {} {}", format!("{}:", name).bright_black(), formatted);
    }

    /// Format duration for display
    pub fn format_duration(duration: Duration) -> String {
        let micros = duration.as_micros();

        if micros < 1_000 {
            format!("{}µs", micros)
        } else if micros < 1_000_000 {
            format!("{:.2}ms", micros as f64 / 1_000.0)
        } else {
            format!("{:.2}s", micros as f64 / 1_000_000.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(Reporter::format_duration(Duration::from_micros(500)), "500µs");
        assert_eq!(Reporter::format_duration(Duration::from_millis(5)), "5.00ms");
        assert_eq!(Reporter::format_duration(Duration::from_secs(2)), "2.00s");
    }
}

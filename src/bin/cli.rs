// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Solidbool CLI

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use solidbool::cli::Reporter;
use solidbool::geometry::{analyze, compact_vertices, HalfEdgeMesh};
use solidbool::{boolean_files, read_obj, write_obj, BooleanOp, EngineConfig};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "solidbool")]
#[command(about = "Boolean operations on planar B-rep solids stored as OBJ", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Engine configuration file (defaults to ./solidbool.toml when present)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// A ∪ B
    Union(OperandArgs),

    /// A ∩ B
    Intersect(OperandArgs),

    /// A − B
    Subtract(OperandArgs),

    /// Print analytics for an OBJ solid
    Info {
        /// Input OBJ file
        file: PathBuf,

        /// Emit the statistics as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(clap::Args)]
struct OperandArgs {
    /// First operand
    a: PathBuf,

    /// Second operand
    b: PathBuf,

    /// Output OBJ file
    #[arg(short, long)]
    output: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(cli.config.as_deref())?;

    match &cli.command {
        Commands::Union(args) => boolean_command(BooleanOp::Union, args, &config, cli.verbose),
        Commands::Intersect(args) => boolean_command(BooleanOp::Intersect, args, &config, cli.verbose),
        Commands::Subtract(args) => boolean_command(BooleanOp::Subtract, args, &config, cli.verbose),
        Commands::Info { file, json } => info_command(file, *json, &config),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "solidbool=debug" } else { "solidbool=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => {
            let mut config = EngineConfig::from_file(path)?;
            config.apply_env_overrides();
            Ok(config)
        }
        None => EngineConfig::load(),
    }
}

fn boolean_command(op: BooleanOp, args: &OperandArgs, config: &EngineConfig, verbose: bool) -> Result<()> {
    for input in [&args.a, &args.b] {
        if !input.exists() {
            Reporter::report_error(&format!("Input file not found: {}", input.display()));
            std::process::exit(1);
        }
    }

    if verbose {
        println!(
            "{} {} {} {}",
            "Evaluating".bold(),
            args.a.display().to_string().cyan(),
            op.to_string().bold(),
            args.b.display().to_string().cyan()
        );
    }

    let start = Instant::now();
    let outcome = boolean_files(&args.a, &args.b, op, config)?;
    let elapsed = start.elapsed();

    write_obj(&outcome.mesh, &args.output)?;

    let output = args.output.display().to_string();
    if verbose {
        Reporter::report_boolean(op, &output, &outcome, elapsed);
    } else {
        Reporter::success(&format!(
            "{} -> {} ({} faces, {})",
            op,
            output,
            outcome.mesh.face_count(),
            Reporter::format_duration(elapsed)
        ));
    }

    let diag = &outcome.diagnostics;
    if diag.dropped_segments > 0 || diag.pairing.anomalies > 0 {
        Reporter::report_warning(&format!(
            "{} unclosed section segments dropped, {} edge groups could not be paired",
            diag.dropped_segments, diag.pairing.anomalies
        ));
    }

    Ok(())
}

fn info_command(file: &Path, json: bool, config: &EngineConfig) -> Result<()> {
    let solid = read_obj(file)?;
    let compacted = compact_vertices(&solid.faces, &config.tolerance);
    let (mesh, _) = HalfEdgeMesh::from_compacted(&compacted);
    let stats = analyze(&mesh);

    if json {
        let text = serde_json::to_string_pretty(&stats).context("Failed to serialize analytics")?;
        println!("{}", text);
    } else {
        println!("{} {}", "File:".bold(), file.display().to_string().cyan());
        stats.print();
    }
    Ok(())
}

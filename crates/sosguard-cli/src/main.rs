//! CLI entry point for sosguard.
//!
//! Argument parsing, file IO, logging setup and exit codes. Everything else
//! lives in `sosguard-app`.

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand};
use sosguard_app::{
    format_explanation, lint_rules, parse_report_json, render_markdown, report_schema_json,
    run_check, run_eval, run_explain, runtime_error_report, serialize_report, verdict_exit_code,
    CheckInput, EvalInput, ExplainOutput,
};
use sosguard_expr::ExprError;
use sosguard_settings::Overrides;
use sosguard_types::SosguardReport;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(
    name = "sosguard",
    version,
    about = "Expression-driven diagnostic checks for sosreport bundles"
)]
struct Cli {
    /// Path to sosguard config TOML (missing file means defaults).
    #[arg(long, default_value = "sosguard.toml")]
    config: Utf8PathBuf,

    /// Override profile (strict|advisory).
    #[arg(long)]
    profile: Option<String>,

    /// Override maximum findings to emit.
    #[arg(long)]
    max_findings: Option<u32>,

    /// Log filter directive, e.g. `debug` or `sosguard_bundle=trace`.
    #[arg(long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Evaluate a rule file against a bundle and write the report.
    Check {
        /// Extracted sosreport directory.
        #[arg(long)]
        bundle: Utf8PathBuf,

        /// Rule file (TOML, `[[check]]` tables).
        #[arg(long)]
        rules: Utf8PathBuf,

        /// Where to write the JSON report.
        #[arg(long, default_value = "artifacts/sosguard/report.json")]
        report_out: Utf8PathBuf,

        /// Write a Markdown report alongside the JSON.
        #[arg(long)]
        write_markdown: bool,

        /// Where to write the Markdown report (if enabled).
        #[arg(long, default_value = "artifacts/sosguard/report.md")]
        markdown_out: Utf8PathBuf,
    },

    /// Evaluate a single expression and print its value.
    Eval {
        expression: String,

        /// Bundle to evaluate against; without one every lookup is absent.
        #[arg(long)]
        bundle: Option<Utf8PathBuf>,
    },

    /// Parse every expression in a rule file without evaluating it.
    Lint {
        #[arg(long)]
        rules: Utf8PathBuf,
    },

    /// Show what a check looks for, by check id or code.
    Explain {
        identifier: String,

        #[arg(long)]
        rules: Utf8PathBuf,
    },

    /// Render markdown from an existing JSON report.
    Md {
        /// Path to the JSON report file.
        #[arg(long, default_value = "artifacts/sosguard/report.json")]
        report: Utf8PathBuf,

        /// Where to write the Markdown output (stdout if omitted).
        #[arg(long, short)]
        output: Option<Utf8PathBuf>,
    },

    /// Print the JSON Schema of the report.
    Schema,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    match &cli.cmd {
        Commands::Check {
            bundle,
            rules,
            report_out,
            write_markdown,
            markdown_out,
        } => cmd_check(
            &cli,
            bundle,
            rules,
            report_out,
            *write_markdown,
            markdown_out,
        ),
        Commands::Eval { expression, bundle } => cmd_eval(expression, bundle.as_deref()),
        Commands::Lint { rules } => cmd_lint(rules),
        Commands::Explain { identifier, rules } => cmd_explain(identifier, rules),
        Commands::Md { report, output } => cmd_md(report, output.as_deref()),
        Commands::Schema => {
            println!("{}", report_schema_json()?);
            Ok(())
        }
    }
}

fn init_logging(directive: &str) {
    let filter = EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn cmd_check(
    cli: &Cli,
    bundle: &Utf8Path,
    rules: &Utf8Path,
    report_out: &Utf8Path,
    write_markdown: bool,
    markdown_out: &Utf8Path,
) -> anyhow::Result<()> {
    let result = (|| -> anyhow::Result<i32> {
        // Missing config file is allowed (defaults apply).
        let cfg_text = std::fs::read_to_string(&cli.config).unwrap_or_default();
        if cfg_text.is_empty() {
            debug!(path = %cli.config, "no config file, using defaults");
        }
        let rules_text = std::fs::read_to_string(rules)
            .with_context(|| format!("read rules: {rules}"))?;

        let input = CheckInput {
            bundle_root: bundle,
            config_text: &cfg_text,
            rules_text: &rules_text,
            overrides: Overrides {
                profile: cli.profile.clone(),
                max_findings: cli.max_findings,
            },
            now: None,
        };

        let output = run_check(input)?;

        write_report_file(report_out, &output.report).context("write report json")?;
        if write_markdown {
            let md = render_markdown(&output.report);
            write_text_file(markdown_out, &md).context("write markdown")?;
        }

        Ok(verdict_exit_code(output.report.verdict))
    })();

    match result {
        Ok(code) => {
            if code != 0 {
                std::process::exit(code);
            }
            Ok(())
        }
        Err(err) => {
            let report = runtime_error_report(bundle.as_str(), &format!("{err:#}"));
            let _ = write_report_file(report_out, &report);
            eprintln!("sosguard error: {err:#}");
            std::process::exit(1);
        }
    }
}

fn cmd_eval(expression: &str, bundle: Option<&Utf8Path>) -> anyhow::Result<()> {
    let input = EvalInput {
        expression,
        bundle_root: bundle,
        now: None,
    };
    match run_eval(input) {
        Ok(value) => {
            println!("{value}");
            Ok(())
        }
        Err(err) => {
            match err.downcast_ref::<ExprError>() {
                Some(expr_err) => eprintln!("{}: {expr_err}", expr_err.kind()),
                None => eprintln!("sosguard error: {err:#}"),
            }
            std::process::exit(1);
        }
    }
}

fn cmd_lint(rules: &Utf8Path) -> anyhow::Result<()> {
    let rules_text =
        std::fs::read_to_string(rules).with_context(|| format!("read rules: {rules}"))?;
    let output = lint_rules(&rules_text)?;

    for problem in &output.problems {
        println!(
            "{}: {}: {}",
            problem.check_id, problem.error_kind, problem.message
        );
    }
    if !output.is_clean() {
        eprintln!(
            "{} of {} checks have invalid expressions",
            output.problems.len(),
            output.checks
        );
        std::process::exit(1);
    }
    println!("{} checks ok", output.checks);
    Ok(())
}

fn cmd_explain(identifier: &str, rules: &Utf8Path) -> anyhow::Result<()> {
    let rules_text =
        std::fs::read_to_string(rules).with_context(|| format!("read rules: {rules}"))?;
    match run_explain(&rules_text, identifier)? {
        ExplainOutput::Found(check) => {
            print!("{}", format_explanation(&check));
            Ok(())
        }
        ExplainOutput::NotFound {
            identifier,
            available_check_ids,
        } => {
            eprintln!("unknown check: {identifier}");
            if !available_check_ids.is_empty() {
                eprintln!("available checks:");
                for id in available_check_ids {
                    eprintln!("  {id}");
                }
            }
            std::process::exit(1);
        }
    }
}

fn cmd_md(report_path: &Utf8Path, output: Option<&Utf8Path>) -> anyhow::Result<()> {
    let report_text = std::fs::read_to_string(report_path)
        .with_context(|| format!("read report: {report_path}"))?;
    let report = parse_report_json(&report_text)?;
    let md = render_markdown(&report);

    match output {
        Some(out_path) => write_text_file(out_path, &md).context("write markdown output")?,
        None => print!("{md}"),
    }
    Ok(())
}

fn write_report_file(path: &Utf8Path, report: &SosguardReport) -> anyhow::Result<()> {
    let data = serialize_report(report)?;
    create_parent(path)?;
    std::fs::write(path, data).with_context(|| format!("write report: {path}"))
}

fn write_text_file(path: &Utf8Path, text: &str) -> anyhow::Result<()> {
    create_parent(path)?;
    std::fs::write(path, text).with_context(|| format!("write text: {path}"))
}

fn create_parent(path: &Utf8Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_str().is_empty()
    {
        std::fs::create_dir_all(parent).with_context(|| format!("create directory: {parent}"))?;
    }
    Ok(())
}

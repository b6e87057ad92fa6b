use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use padcalc::{evaluate_traced, format_expression, format_number, EvaluationTrace};
use std::{fs::File, path::PathBuf, sync::Mutex};
use tracing_subscriber::EnvFilter;

#[cfg(feature = "line")]
mod line_mode;
#[cfg(feature = "tui")]
mod render_help;
#[cfg(feature = "tui")]
mod tui_mode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Full-screen keypad
    Tui,
    /// Single-line keypad
    Line,
}

#[derive(Parser)]
#[command(name = "padcalc", version, about = "Keypad calculator for the terminal", long_about = None)]
struct Cli {
    /// Evaluate an expression, print the result and exit
    #[arg(short, long, value_name = "EXPR", allow_hyphen_values = true)]
    eval: Option<String>,

    /// Print every applied operation (with --eval)
    #[arg(short, long)]
    details: bool,

    /// Interactive front-end
    #[arg(short, long, value_enum, default_value_t = Mode::Tui)]
    mode: Mode,

    /// Write logs to this file; interactive modes never log to the terminal
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    if let Some(expression) = cli.eval.as_deref() {
        return run_eval(expression, cli.details);
    }

    tracing::info!(mode = ?cli.mode, "starting keypad");
    match cli.mode {
        Mode::Tui => run_tui(),
        Mode::Line => run_line(),
    }
}

fn init_logging(cli: &Cli) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    if let Some(path) = &cli.log_file {
        let file = File::create(path)
            .with_context(|| format!("cannot create log file {}", path.display()))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .init();
    } else if cli.eval.is_some() {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
    Ok(())
}

fn run_eval(expression: &str, details: bool) -> Result<()> {
    let mut trace = EvaluationTrace::new(details);
    let value = evaluate_traced(expression, &mut trace)
        .with_context(|| format!("cannot evaluate '{}'", expression))?;

    for (i, step) in trace.steps.iter().enumerate() {
        println!("  Step {}: {} = {}", i + 1, step.operation, format_number(step.result));
    }
    println!("{} = {}", format_expression(expression), format_number(value));
    Ok(())
}

#[cfg(feature = "tui")]
fn run_tui() -> Result<()> {
    tui_mode::run_tui()
}

#[cfg(not(feature = "tui"))]
fn run_tui() -> Result<()> {
    anyhow::bail!("padcalc was built without the `tui` feature")
}

#[cfg(feature = "line")]
fn run_line() -> Result<()> {
    line_mode::run_line()
}

#[cfg(not(feature = "line"))]
fn run_line() -> Result<()> {
    anyhow::bail!("padcalc was built without the `line` feature")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn eval_accepts_leading_minus() {
        let cli = Cli::try_parse_from(["padcalc", "--eval", "-5+3", "--details"]).unwrap();
        assert_eq!(cli.eval.as_deref(), Some("-5+3"));
        assert!(cli.details);
        assert_eq!(cli.mode, Mode::Tui);
    }

    #[test]
    fn line_mode_flag() {
        let cli = Cli::try_parse_from(["padcalc", "-m", "line"]).unwrap();
        assert_eq!(cli.mode, Mode::Line);
    }

    #[test]
    fn eval_reports_invalid_expression() {
        let err = run_eval("2+a", false).unwrap_err();
        assert!(err.to_string().contains("cannot evaluate '2+a'"));
    }
}

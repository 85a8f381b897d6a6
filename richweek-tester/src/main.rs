mod reports;
mod runner;
mod scenarios;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::time::Instant;

use runner::ScenarioRunner;

#[derive(Debug, Parser)]
#[command(name = "richweek-tester", version)]
#[command(about = "Automated QA sweeps for the Richweek engine")]
struct Args {
    /// Scenarios to run (comma-separated, or "all")
    #[arg(long, default_value = "smoke")]
    scenarios: String,

    /// List all available scenarios and exit
    #[arg(long)]
    list_scenarios: bool,

    /// Seeds to run (comma-separated)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Number of iterations per scenario and seed
    #[arg(long, default_value_t = 10)]
    iterations: usize,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "console"])]
    report: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if maybe_list_scenarios(&args)? {
        return Ok(());
    }

    announce_banner();

    let start_time = Instant::now();
    let names = expand_scenarios(&args.scenarios);
    let seeds = parse_seeds(&args.seeds)?;
    log::info!(
        "running {} scenario(s) over {} seed(s), {} iterations each",
        names.len(),
        seeds.len(),
        args.iterations
    );

    let runner = ScenarioRunner::new(args.verbose);
    let mut results = Vec::new();
    for name in &names {
        if let Some(scenario) = scenarios::get(name) {
            results.extend(runner.run_scenario(scenario, &seeds, args.iterations));
        } else {
            eprintln!("⚠️  Unknown scenario: {}", name.yellow());
        }
    }

    write_reports(&args, &results, start_time)?;

    if results.is_empty() || results.iter().any(|r| !r.passed) {
        std::process::exit(1);
    }

    Ok(())
}

fn announce_banner() {
    println!("{}", "🎮 Richweek Automated Tester".bright_cyan().bold());
    println!("{}", "============================".cyan());
}

fn maybe_list_scenarios(args: &Args) -> Result<bool> {
    if !args.list_scenarios {
        return Ok(false);
    }
    let mut target = OutputTarget::new(args.output.clone())?;
    writeln!(target, "Available scenarios:")?;
    for (name, description) in scenarios::list() {
        writeln!(target, "  {name:16} - {description}")?;
    }
    target.flush_inner()?;
    Ok(true)
}

fn split_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}

fn expand_scenarios(scenarios_arg: &str) -> Vec<String> {
    let mut names = split_csv(scenarios_arg);
    if names.contains(&"all".to_string()) {
        names.retain(|s| s != "all");
        names.extend(scenarios::list().into_iter().map(|(name, _)| name.to_string()));
    }
    names
}

fn parse_seeds(raw: &str) -> Result<Vec<u64>> {
    split_csv(raw)
        .iter()
        .map(|token| {
            token
                .parse::<u64>()
                .with_context(|| format!("invalid seed '{token}'"))
        })
        .collect()
}

fn write_reports(
    args: &Args,
    results: &[runner::ScenarioResult],
    start_time: Instant,
) -> Result<()> {
    let mut target = OutputTarget::new(args.output.clone())?;
    let duration = start_time.elapsed();

    match args.report.as_str() {
        "json" => {
            if results.is_empty() {
                writeln!(&mut target, "[]")?;
            } else {
                reports::generate_json_report(&mut target, results)?;
            }
        }
        _ => {
            if results.is_empty() {
                writeln!(&mut target, "No scenarios executed.")?;
            } else {
                reports::generate_console_report(&mut target, results, duration)?;
            }
        }
    }

    writeln!(&mut target, "🏁 Total time: {duration:?}")?;
    target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}

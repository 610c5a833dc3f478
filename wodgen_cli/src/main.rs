use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use wodgen_core::*;

#[derive(Parser)]
#[command(name = "wodgen")]
#[command(about = "Deterministic workout session planner", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Use this config file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a workout plan (default)
    Plan(PlanArgs),

    /// Validate the movement library
    Check {
        /// Movement library file (defaults to movements.json in the data dir)
        #[arg(long)]
        library: Option<PathBuf>,
    },
}

#[derive(Args, Default)]
struct PlanArgs {
    /// Profile file (JSON object)
    #[arg(long)]
    profile: Option<PathBuf>,

    /// History file (JSON array, or CSV with date,movements,patterns)
    #[arg(long)]
    history: Option<PathBuf>,

    /// Movement library file (JSON array)
    #[arg(long)]
    library: Option<PathBuf>,

    /// Random seed (defaults to the date as YYYYMMDD)
    #[arg(long)]
    seed: Option<u32>,

    /// Days of history that count towards fatigue
    #[arg(long)]
    lookback_days: Option<u32>,

    /// Plan as of this date (YYYY-MM-DD, defaults to today)
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Output format (text or json)
    #[arg(long, default_value = "text")]
    format: OutputFormat,

    /// Write the plan to this file instead of stdout
    #[arg(long)]
    out: Option<PathBuf>,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    wodgen_core::logging::init_with_level(if cli.verbose { "debug" } else { "info" });

    let config = match cli.config {
        Some(ref path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());

    match cli.command {
        Some(Commands::Plan(args)) => cmd_plan(data_dir, args, &config),
        Some(Commands::Check { library }) => cmd_check(data_dir, library),
        None => {
            // Default to "plan" command
            cmd_plan(data_dir, PlanArgs::default(), &config)
        }
    }
}

fn resolve_library(data_dir: &std::path::Path, explicit: Option<PathBuf>) -> Result<MovementLibrary> {
    match explicit {
        Some(path) => load_library(&path),
        None => load_library_or_default(&DataPaths::in_dir(data_dir).library),
    }
}

fn cmd_plan(data_dir: PathBuf, args: PlanArgs, config: &Config) -> Result<()> {
    let paths = DataPaths::in_dir(&data_dir);
    let profile_path = args.profile.unwrap_or(paths.profile);
    let history_path = args.history.unwrap_or(paths.history);

    let profile = load_profile(&profile_path)?;
    let history = load_history(&history_path)?;
    let library = resolve_library(&data_dir, args.library)?;
    for problem in library.validate() {
        tracing::warn!("Library: {}", problem);
    }

    let today = args
        .date
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    let inputs = PlanInputs {
        profile,
        history: &history,
        library: &library,
        lookback_days: args.lookback_days.unwrap_or(config.planner.lookback_days),
        seed: args.seed.unwrap_or_else(|| seed_for_date(today)),
        today,
    };

    let plan = generate_plan(&inputs, config)?;
    let output = render(&plan, args.format)?;

    match args.out {
        Some(path) => {
            write_plan(&path, &output)?;
            println!("✓ Plan written to {}", path.display());
        }
        None => print!("{}", output),
    }

    Ok(())
}

fn cmd_check(data_dir: PathBuf, library: Option<PathBuf>) -> Result<()> {
    let library = resolve_library(&data_dir, library)?;

    let errors = library.validate();
    if !errors.is_empty() {
        eprintln!("Library validation errors:");
        for error in &errors {
            eprintln!("  - {}", error);
        }
        return Err(Error::LibraryValidation(format!(
            "{} problem(s) in movement library",
            errors.len()
        )));
    }

    println!("✓ {} movements", library.len());
    for (modality, count) in library.modality_counts() {
        println!("  {:<15} {}", modality.as_str(), count);
    }

    Ok(())
}

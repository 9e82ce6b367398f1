use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use reel_core::{RandomSymbols, ReelEvent, SlotConfig, SlotMachine, SpinRequest, StopReport, SymbolId};
use reel_curve::{
    create_quick_stop_curve, create_standard_reel_curves, describe_curve, CurveLoader, QuickStopConfig,
    QuickStopEasing,
};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Log level
    #[arg(long, value_enum, default_value_t = LogLevel::Info, global = true)]
    log_level: LogLevel,

    /// Log format
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty, global = true)]
    log_format: LogFormat,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one spin and print the board and event timeline
    Simulate(SimulateArgs),
    /// Write the standard reel curves as a JSON curve library
    Curves(CurvesArgs),
    /// Spin many random machines and check every reel lands its targets
    Verify(VerifyArgs),
}

#[derive(Args, Debug)]
struct SimulateArgs {
    /// Slot configuration (JSON). Defaults are used when omitted.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[arg(long, default_value_t = 60.0)]
    fps: f64,

    /// Seed for the result and the filler symbols
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Seconds into the spin at which to request a quick stop
    #[arg(long, value_name = "SECONDS")]
    quick_stop: Option<f64>,

    /// Reels that anticipate, e.g. `--anticipation 2,3`
    #[arg(long, value_delimiter = ',')]
    anticipation: Vec<usize>,

    /// Print a JSON summary instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct CurvesArgs {
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output file; stdout when omitted
    #[arg(long, short, value_name = "FILE")]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct VerifyArgs {
    /// Number of random machines to spin
    #[arg(long, default_value_t = 200)]
    spins: usize,

    #[arg(long, default_value_t = 1)]
    seed: u64,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Error => write!(f, "error"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Trace => write!(f, "trace"),
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
enum LogFormat {
    Pretty,
    Json,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.log_level, cli.log_format) {
        eprintln!("Failed to initialize logging: {:#}", e);
        std::process::exit(2);
    }

    let outcome = match cli.command {
        Command::Simulate(args) => simulate(args),
        Command::Curves(args) => curves(args),
        Command::Verify(args) => verify(args),
    };

    if let Err(e) = outcome {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn init_logging(level: LogLevel, format: LogFormat) -> Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(level.to_string().parse()?)
        .from_env_lossy();

    let subscriber_builder = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    match format {
        LogFormat::Json => subscriber_builder.json().init(),
        LogFormat::Pretty => subscriber_builder.pretty().init(),
    }
    Ok(())
}

fn load_config(path: Option<&PathBuf>) -> Result<SlotConfig> {
    match path {
        Some(path) => SlotConfig::from_path(path).with_context(|| format!("loading config {:?}", path)),
        None => Ok(SlotConfig::default()),
    }
}

fn random_result(config: &SlotConfig, rng: &mut StdRng) -> Vec<Vec<SymbolId>> {
    (0..config.visible_rows)
        .map(|_| {
            (0..config.reel_count)
                .map(|_| rng.gen_range(0..config.symbol_types))
                .collect()
        })
        .collect()
}

#[derive(Serialize)]
struct TimedEvent {
    time: f64,
    #[serde(flatten)]
    event: ReelEvent,
}

#[derive(Serialize)]
struct SimulationSummary {
    expected: Vec<Vec<SymbolId>>,
    board: Vec<Vec<SymbolId>>,
    spin_time: f64,
    events: Vec<TimedEvent>,
    reports: Vec<StopReport>,
}

fn simulate(args: SimulateArgs) -> Result<()> {
    let config = load_config(args.config.as_ref())?;
    if args.fps.is_nan() || args.fps <= 0.0 {
        bail!("--fps must be positive, got {}", args.fps);
    }
    let dt = 1.0 / args.fps;
    let mut rng = StdRng::seed_from_u64(args.seed);
    let expected = random_result(&config, &mut rng);

    let symbols = RandomSymbols::seeded(config.symbol_types, args.seed.wrapping_add(1));
    let mut machine = SlotMachine::new(config, Box::new(symbols)).context("building machine")?;
    machine
        .spin(SpinRequest::new(expected.clone()).with_anticipation(args.anticipation.iter().copied()))
        .context("starting spin")?;
    info!(fps = args.fps, seed = args.seed, "simulating spin");

    let mut events = Vec::new();
    let mut quick_stop = args.quick_stop;
    while machine.is_spinning() {
        if let Some(at) = quick_stop {
            if machine.spin_time() >= at {
                let fired = machine.quick_stop().to_vec();
                events.extend(fired.into_iter().map(|event| TimedEvent {
                    time: machine.spin_time(),
                    event,
                }));
                quick_stop = None;
            }
        }
        let frame = machine.update(dt).to_vec();
        events.extend(frame.into_iter().map(|event| TimedEvent {
            time: machine.spin_time(),
            event,
        }));
    }

    let summary = SimulationSummary {
        board: machine.finish().context("finishing spin")?,
        expected,
        spin_time: machine.spin_time(),
        events,
        reports: machine.stop_reports().cloned().collect(),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        for e in &summary.events {
            println!("{:>8.3}s  reel {}  {:?}", e.time, e.event.reel(), e.event);
        }
        println!();
        for row in &summary.board {
            let cells: Vec<String> = row.iter().map(|s| format!("{:>3}", s)).collect();
            println!("{}", cells.join(" "));
        }
        let corrections: usize = summary.reports.iter().map(|r| r.corrections).sum();
        println!();
        println!("spin time {:.3}s, corrections {}", summary.spin_time, corrections);
    }

    if summary.board != summary.expected {
        bail!("board does not match the requested result");
    }
    Ok(())
}

fn curves(args: CurvesArgs) -> Result<()> {
    let config = load_config(args.config.as_ref())?;
    let standard = create_standard_reel_curves(&config.curve_config());
    let names: Vec<String> = (0..standard.len()).map(|i| format!("reel_{}", i)).collect();
    for (name, curve) in names.iter().zip(&standard) {
        describe_curve(curve, name);
    }

    let quick_stop = create_quick_stop_curve(&QuickStopConfig {
        stop_distance: config.slots_per_reel as f64 * config.symbol_pitch,
        stop_time: config.timing.quick_stop_time,
        easing: QuickStopEasing::Cubic,
    });

    let entries = names
        .iter()
        .map(String::as_str)
        .zip(&standard)
        .chain(std::iter::once(("quick_stop", &quick_stop)));
    let json = CurveLoader::export_library("standard_reels", env!("CARGO_PKG_VERSION"), entries)?;

    match args.output {
        Some(path) => {
            std::fs::write(&path, json).with_context(|| format!("writing {:?}", path))?;
            info!(path = ?path, curves = standard.len() + 1, "curve library written");
        }
        None => println!("{}", json),
    }
    Ok(())
}

struct CaseOutcome {
    case: usize,
    slots: usize,
    visible: usize,
    fps: f64,
    matched: bool,
    corrections: usize,
}

fn verify(args: VerifyArgs) -> Result<()> {
    info!(spins = args.spins, seed = args.seed, "verifying random spins");
    let outcomes: Vec<CaseOutcome> = (0..args.spins)
        .into_par_iter()
        .map(|case| run_case(case, args.seed))
        .collect::<Result<_>>()?;

    let mut failures = 0;
    for outcome in outcomes.iter().filter(|o| !o.matched || o.corrections > 0) {
        warn!(
            case = outcome.case,
            slots = outcome.slots,
            visible = outcome.visible,
            fps = outcome.fps,
            matched = outcome.matched,
            corrections = outcome.corrections,
            "spin failed verification"
        );
        failures += 1;
    }
    let corrections: usize = outcomes.iter().map(|o| o.corrections).sum();
    println!(
        "{} spins, {} failed, {} corrections",
        outcomes.len(),
        failures,
        corrections
    );
    if failures > 0 {
        bail!("{} of {} spins failed verification", failures, outcomes.len());
    }
    Ok(())
}

fn run_case(case: usize, seed: u64) -> Result<CaseOutcome> {
    let mut rng = StdRng::seed_from_u64(seed.wrapping_mul(1_000_003).wrapping_add(case as u64));
    let visible = rng.gen_range(1..=5);
    let mut config = SlotConfig {
        reel_count: rng.gen_range(1..=6),
        visible_rows: visible,
        slots_per_reel: visible + rng.gen_range(1..=5),
        symbol_pitch: [64.0, 96.0, 110.0, 137.5][rng.gen_range(0..4)],
        ..SlotConfig::default()
    };
    config.timing.stop_delay = rng.gen_range(0.0..0.4);
    config.timing.normal_speed = rng.gen_range(800.0..3000.0);
    let fps = [24.0, 30.0, 60.0, 144.0][rng.gen_range(0..4)];

    let expected = random_result(&config, &mut rng);
    let anticipation: Vec<usize> = (0..config.reel_count).filter(|_| rng.gen_bool(0.2)).collect();
    let symbols = RandomSymbols::seeded(config.symbol_types, rng.gen());
    let (slots, reels) = (config.slots_per_reel, config.reel_count);

    let mut machine = SlotMachine::new(config, Box::new(symbols))
        .with_context(|| format!("case {}: building machine", case))?;
    machine
        .spin(SpinRequest::new(expected.clone()).with_anticipation(anticipation))
        .with_context(|| format!("case {}: starting spin", case))?;
    let mut frames = 0usize;
    while machine.is_spinning() {
        machine.update(1.0 / fps);
        frames += 1;
        if frames > 1_000_000 {
            bail!("case {}: spin did not finish", case);
        }
    }

    let corrections = machine.stop_reports().map(|r| r.corrections).sum();
    let board = machine.finish()?;
    tracing::debug!(case, slots, visible, reels, fps, frames, "case done");
    Ok(CaseOutcome {
        case,
        slots,
        visible,
        fps,
        matched: board == expected,
        corrections,
    })
}

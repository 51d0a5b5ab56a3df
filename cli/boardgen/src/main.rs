//! Boardgen CLI — generates firmware sources and build artifacts from a board description.

use std::fs;
use std::path::PathBuf;
use std::process;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Context;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, ValueEnum};

use boardgen_ast::build_module;
use boardgen_backend::{compile_module, FirmwarePipeline, SystemInvoker};
use boardgen_config::BoardConfig;
use boardgen_emit::{Emitter, Engine, Registry};
use boardgen_ir::lower;
use boardgen_targets::TargetSpec;

#[derive(Parser)]
#[command(name = "boardgen", version, about = "Embedded peripheral code generator")]
struct Cli {
    /// Board description (TOML)
    #[arg(long)]
    config: PathBuf,

    /// Directory with template overrides
    #[arg(long, default_value = "templates")]
    template_dir: PathBuf,

    /// Output directory for generated sources
    #[arg(long, default_value = "out")]
    out_dir: PathBuf,

    /// Target platform
    #[arg(long, value_enum)]
    target: Option<TargetName>,

    /// Write the program model as JSON to PATH and exit
    #[arg(long, value_name = "PATH")]
    emit_ast: Option<PathBuf>,

    /// Write textual LLVM IR to PATH and exit
    #[arg(long, value_name = "PATH")]
    emit_ir: Option<PathBuf>,

    /// Compile the IR to a relocatable object at PATH and exit
    #[arg(long, value_name = "PATH")]
    emit_obj: Option<PathBuf>,

    /// After source generation, compile the sources through the LLVM pipeline
    #[arg(long)]
    llvm_ir: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum TargetName {
    X86,
    Stm32,
    Imx7,
}

impl TargetName {
    fn spec(self) -> &'static TargetSpec {
        match self {
            TargetName::X86 => &boardgen_targets::X86,
            TargetName::Stm32 => &boardgen_targets::STM32,
            TargetName::Imx7 => &boardgen_targets::IMX7,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // A bare IR or AST dump does not need a platform; everything else does.
    let dump_only = cli.emit_ast.is_some() || cli.emit_ir.is_some();
    if cli.target.is_none() && !dump_only {
        let mut cmd = Cli::command();
        cmd.error(
            ErrorKind::MissingRequiredArgument,
            "--target is required unless only --emit-ast or --emit-ir is requested",
        )
        .exit();
    }

    let result = run(cli);
    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let board = BoardConfig::load(&cli.config)
        .with_context(|| format!("loading board config {}", cli.config.display()))?;
    log::info!(
        "loaded board '{}' (gpio={}, uart={}, timer={})",
        board.name,
        board.gpio.len(),
        board.uart.len(),
        board.timer.len()
    );

    let target = cli.target.map(TargetName::spec);

    if cli.emit_ast.is_some() || cli.emit_ir.is_some() || cli.emit_obj.is_some() {
        let module = build_module(&board);

        if let Some(path) = &cli.emit_ast {
            let json = serde_json::to_string_pretty(&module)?;
            fs::write(path, json)
                .with_context(|| format!("writing program model to {}", path.display()))?;
            log::info!("program model written to {}", path.display());
            return Ok(());
        }

        let ir = lower(&module, &board.name, target)?;

        if let Some(path) = &cli.emit_ir {
            fs::write(path, ir.to_string())
                .with_context(|| format!("writing IR to {}", path.display()))?;
            log::info!("IR written to {}", path.display());
            return Ok(());
        }

        if let Some(path) = &cli.emit_obj {
            let spec = target
                .ok_or_else(|| anyhow::anyhow!("--target is required with --emit-obj"))?;
            let obj = compile_module(&SystemInvoker, &ir.to_string(), spec)?;
            fs::write(path, obj)
                .with_context(|| format!("writing object to {}", path.display()))?;
            log::info!("object written to {}", path.display());
            return Ok(());
        }
    }

    let spec = target.ok_or_else(|| anyhow::anyhow!("--target is required for code generation"))?;

    let engine = if cli.template_dir.is_dir() {
        Engine::with_template_dir(&cli.template_dir)
    } else {
        Engine::new()
    };
    let registry = Registry::builtin();
    let generated = now_iso8601();
    let emitter = Emitter::new(&board, &engine, &registry, spec, &cli.out_dir, &generated);
    let peripherals = emitter.generate()?;
    println!(
        "Generated firmware sources for '{}' ({}) in {}: {} peripheral(s)",
        board.name,
        spec.name,
        cli.out_dir.display(),
        peripherals.len()
    );

    if cli.llvm_ir {
        let pipeline = FirmwarePipeline::new(&cli.out_dir, spec, &SystemInvoker);
        let image = pipeline.run()?;
        println!("Firmware image: {}", image.display());
    }

    Ok(())
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .format_timestamp(None)
        .init();
}

/// Current UTC time as an ISO-8601 timestamp, embedded in generated file banners.
fn now_iso8601() -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    let secs = now.as_secs();

    let days = secs / 86_400;
    let rem = secs % 86_400;
    let (hour, minute, second) = (rem / 3600, (rem % 3600) / 60, rem % 60);

    // Civil-date conversion from a day count (days since 1970-01-01).
    let mut year = 1970i64;
    let mut days_left = days as i64;
    loop {
        let leap = (year % 4 == 0 && year % 100 != 0) || year % 400 == 0;
        let year_days = if leap { 366 } else { 365 };
        if days_left < year_days {
            break;
        }
        days_left -= year_days;
        year += 1;
    }
    let leap = (year % 4 == 0 && year % 100 != 0) || year % 400 == 0;
    let month_lengths = [
        31,
        if leap { 29 } else { 28 },
        31,
        30,
        31,
        30,
        31,
        31,
        30,
        31,
        30,
        31,
    ];
    let mut month = 1;
    for len in month_lengths {
        if days_left < len {
            break;
        }
        days_left -= len;
        month += 1;
    }
    let day = days_left + 1;

    format!("{year:04}-{month:02}-{day:02}T{hour:02}:{minute:02}:{second:02}Z")
}

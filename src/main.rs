//! Bscan - safe pin toggling over JTAG boundary scan
//!
//! Reads a device's BSDL, resolves its tri-state outputs and pulses one or
//! all of them through OpenOCD in EXTEST, keeping every other output
//! disabled.
//!
//! # Usage
//!
//! ```bash
//! bscan plm4.bsdl                                  # list resolved output pins
//! bscan plm4.bsdl --tap xc7a100t.tap --pin IO_U8   # toggle one pin
//! bscan plm4.bsdl --tap xc7a100t.tap --all --dry-run
//! ```

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Parser};
use log::{info, warn};

use bscan_core::{
    bsdl,
    error::Result,
    register::{build_pin_map, Bit, PinMap, RegisterOptions},
    scan::{build_full_sweep, build_safe_vector, build_toggle_steps, parse_hold, SweepPlan},
    transport::{
        RecordingTransport, ScanSession, ShiftOrder, TargetConfig, TelnetTransport, Transport, DEFAULT_HOST,
        DEFAULT_PORT,
    },
    Bsdl, DEFAULT_HOLD_SECS, DEFAULT_SWEEP_HOLD_SECS,
};

/// Boundary-scan pin toggler driven by BSDL
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the device's BSDL file
    #[arg(value_name = "BSDL_FILE")]
    bsdl_file: PathBuf,

    /// Toggle this output pin (port name from the BSDL)
    #[arg(short, long, conflicts_with = "all", requires = "tap")]
    pin: Option<String>,

    /// Toggle every resolved output pin, one at a time
    #[arg(short, long, requires = "tap")]
    all: bool,

    /// Value driven in the first toggle step (0 or 1)
    #[arg(long, default_value = "1", value_parser = parse_bit)]
    assert: Bit,

    /// Hold time per step in seconds, SI prefixes allowed (e.g. 500m) [default: 0.5, 0.1 with --all]
    #[arg(long)]
    hold: Option<String>,

    /// OpenOCD host
    #[arg(long, default_value = DEFAULT_HOST)]
    host: String,

    /// OpenOCD telnet port
    #[arg(long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// OpenOCD TAP name, e.g. xc7a100t.tap (needed with --pin or --all)
    #[arg(long)]
    tap: Option<String>,

    /// EXTEST opcode bits, overriding the BSDL's INSTRUCTION_OPCODE
    #[arg(long, value_name = "BITS")]
    extest: Option<String>,

    /// Which end of the vector is shifted first: cell0-first or cell0-last
    #[arg(long, default_value = "cell0-first", value_parser = parse_shift_order)]
    shift_order: ShiftOrder,

    /// Accept a register excerpt with missing cells
    #[arg(long)]
    partial: bool,

    /// Print the OpenOCD commands instead of sending them
    #[arg(long)]
    dry_run: bool,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn parse_bit(text: &str) -> std::result::Result<Bit, String> {
    Bit::from_symbol(text).ok_or_else(|| format!("expected 0 or 1, got '{}'", text))
}

fn parse_shift_order(text: &str) -> std::result::Result<ShiftOrder, String> {
    ShiftOrder::from_name(text).ok_or_else(|| format!("expected cell0-first or cell0-last, got '{}'", text))
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    // Parse and validate the BSDL
    let options = RegisterOptions::new().with_partial(args.partial);
    let device = bsdl::parse_file(&args.bsdl_file, &options)?;
    for diagnostic in &device.diagnostics {
        warn!("{}", diagnostic);
    }
    info!(
        "{}: boundary register of {} cells",
        device.entity.as_deref().unwrap_or("device"),
        device.register.boundary_len()
    );

    // Resolve output pins
    let report = build_pin_map(&device.register);
    for failure in &report.failures {
        warn!("{}", failure);
    }
    let pins = report.pins;
    info!("{} output pins resolved", pins.len());

    if args.pin.is_none() && !args.all {
        list_pins(&pins);
        return Ok(());
    }

    // Build the whole plan before touching hardware
    let hold = match &args.hold {
        Some(text) => parse_hold(text)?,
        None if args.all => Duration::from_secs_f64(DEFAULT_SWEEP_HOLD_SECS),
        None => Duration::from_secs_f64(DEFAULT_HOLD_SECS),
    };
    let plan = match &args.pin {
        Some(pin) => SweepPlan {
            safe: build_safe_vector(&device.register, &pins),
            groups: vec![build_toggle_steps(&pins, pin, args.assert, hold)?],
            skipped: Vec::new(),
        },
        None => build_full_sweep(&pins, args.assert, hold),
    };

    let mut config = TargetConfig::new(args.tap.clone().unwrap_or_default())
        .with_host(args.host.as_str())
        .with_port(args.port)
        .with_shift_order(args.shift_order);
    if let Some(bits) = &args.extest {
        config = config.with_extest_opcode(bits.as_str());
    }

    let boundary_len = device.register.boundary_len();
    if args.dry_run {
        let session = ScanSession::new(RecordingTransport::new(), config, boundary_len).with_pacing(false);
        let transport = execute(session, &device, &plan)?.into_transport();
        for command in &transport.commands {
            println!("{}", command);
        }
    } else {
        let transport = TelnetTransport::connect(&config)?;
        execute(ScanSession::new(transport, config, boundary_len), &device, &plan)?;
    }

    Ok(())
}

/// EXTEST, safe preload, then every step group of the plan.
fn execute<T: Transport>(mut session: ScanSession<T>, device: &Bsdl, plan: &SweepPlan) -> Result<ScanSession<T>> {
    session.enter_extest(&device.instructions)?;
    session.preload_safe(&plan.safe)?;
    session.play_sweep(plan)?;
    Ok(session)
}

fn list_pins(pins: &PinMap) {
    println!("{:<16} {:>6} {:>8} {:>8}", "PORT", "DATA", "CONTROL", "DISABLE");
    for pin in pins.iter() {
        println!(
            "{:<16} {:>6} {:>8} {:>8}",
            pin.port,
            pin.data_idx,
            pin.ctrl_idx,
            pin.disable_value.to_string()
        );
    }
}

//! Full attach → init → tune → stream session against the simulated chip.

use std::path::Path;
use std::sync::Arc;

use colored::Colorize;
use log::{info, warn};
use serde::Serialize;
use tcc353x::sim::{SimRf, SimulatedBus};
use tcc353x::{DriverConfig, Platform, ReceiverOptions, Registry, StdPlatform, TuneState};
use tcc353x_protocol::{CodeVersion, ContainerBuilder, DiversityRole, TmccInfo, TuneRequest};

use crate::config::{BoardFile, BoardOverrides};
use crate::context::OutputFormat;
use crate::error::{read_file, CliError};

const MODULE: usize = 0;

#[derive(Debug, Serialize)]
pub(crate) struct TuneReport {
    pub frequency_khz: i32,
    pub pll: u16,
    pub main_clock_khz: u32,
    pub elapsed_ms: u64,
}

#[derive(Debug, Serialize)]
pub(crate) struct SlotReport {
    pub slot: usize,
    pub address: u8,
    pub role: DiversityRole,
    pub pll: u16,
    pub main_clock_khz: u32,
    pub tuned: bool,
    pub stream_started: bool,
    pub dsp_code_version: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SessionReport {
    pub state: TuneState,
    pub tunes: Vec<TuneReport>,
    pub slots: Vec<SlotReport>,
    pub rf_tunes: usize,
    pub fifo_bytes: u32,
    pub tmcc: TmccInfo,
}

/// Coldboot image with a deterministic code pattern.
pub(crate) fn synthetic_image() -> Vec<u8> {
    let code: Vec<u8> = (0..4096u32).map(|i| (i.wrapping_mul(31) >> 3) as u8).collect();
    ContainerBuilder::new().code(&code).build().to_vec()
}

/// Drive one module through a session and close it again.
pub(crate) fn run_session(
    driver: DriverConfig,
    slots: &[ReceiverOptions],
    image: &[u8],
    request: &TuneRequest,
    frequencies: &[i32],
    platform: Arc<dyn Platform>,
) -> Result<SessionReport, CliError> {
    let bus = Arc::new(SimulatedBus::new(slots.len()));
    let rf = Arc::new(SimRf::default());
    let registry = Registry::new(bus, platform.clone(), rf.clone(), driver);

    registry.attach(MODULE, slots)?;
    let result = drive(&registry, &rf, image, request, frequencies, platform.as_ref());
    if let Err(e) = registry.close(MODULE) {
        warn!("Close failed: {}", e);
    }
    result
}

fn drive(
    registry: &Registry,
    rf: &SimRf,
    image: &[u8],
    request: &TuneRequest,
    frequencies: &[i32],
    platform: &dyn Platform,
) -> Result<SessionReport, CliError> {
    registry.init(MODULE, Some(image))?;

    let mut tunes = Vec::with_capacity(frequencies.len());
    for &frequency_khz in frequencies {
        let started = platform.now_ms();
        registry.tune(MODULE, frequency_khz, request)?;
        let master = registry.handle(MODULE, 0)?;
        tunes.push(TuneReport {
            frequency_khz,
            pll: master.pll,
            main_clock_khz: master.main_clock_khz,
            elapsed_ms: platform.now_ms().saturating_sub(started),
        });
    }

    let slots = (0..registry.diversity_count(MODULE)?)
        .map(|slot| {
            registry.handle(MODULE, slot).map(|handle| SlotReport {
                slot,
                address: handle.original_address,
                role: handle.options.role,
                pll: handle.pll,
                main_clock_khz: handle.main_clock_khz,
                tuned: handle.tuned,
                stream_started: handle.stream_started,
                dsp_code_version: handle
                    .dsp_code_version
                    .map(|word| CodeVersion::from_word(word).to_string()),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(SessionReport {
        state: registry.tune_state(MODULE)?,
        tunes,
        slots,
        rf_tunes: rf.tunes().len(),
        fifo_bytes: registry.fifo_status(MODULE)?,
        tmcc: registry.tmcc_info(MODULE, 0)?,
    })
}

/// Arguments of the `simulate` subcommand.
#[derive(Debug)]
pub(crate) struct SimulateArgs<'a> {
    pub board: Option<&'a Path>,
    pub overrides: BoardOverrides,
    pub firmware: Option<&'a Path>,
    pub request: TuneRequest,
    pub frequencies: Vec<i32>,
    pub format: OutputFormat,
}

pub(crate) fn simulate(args: SimulateArgs<'_>) -> Result<(), CliError> {
    let (driver, slots) = BoardFile::load(args.board)?.resolve(&args.overrides);
    let image = match args.firmware {
        Some(path) => read_file(path)?,
        None => synthetic_image(),
    };
    info!(
        "Simulating {} slots, {:?}, PLL policy {:?}",
        slots.len(),
        args.request.segment,
        driver.pll_policy
    );

    let report = run_session(
        driver,
        &slots,
        &image,
        &args.request,
        &args.frequencies,
        Arc::new(StdPlatform::new()),
    )?;

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Table => print_report(&report),
    }
    Ok(())
}

fn print_report(report: &SessionReport) {
    for tune in &report.tunes {
        println!(
            "tune {:>7} kHz  pll 0x{:04X}  main clock {} kHz  {} ms",
            tune.frequency_khz, tune.pll, tune.main_clock_khz, tune.elapsed_ms
        );
    }
    println!();
    println!(
        "{:<5} {:<8} {:<7} {:>8} {:>6} {:>9}  {}",
        "SLOT", "ADDRESS", "ROLE", "PLL", "TUNED", "STREAMING", "DSP CODE"
    );
    for slot in &report.slots {
        println!(
            "{:<5} {:<8} {:<7} {:>8} {:>6} {:>9}  {}",
            slot.slot,
            format!("0x{:02X}", slot.address),
            format!("{:?}", slot.role),
            format!("0x{:04X}", slot.pll),
            slot.tuned,
            slot.stream_started,
            slot.dsp_code_version.as_deref().unwrap_or("-"),
        );
    }
    println!();
    let state = format!("{:?}", report.state);
    let state = if report.state == TuneState::Streaming {
        state.green()
    } else {
        state.yellow()
    };
    println!("state {}  rf tunes {}  fifo {} bytes", state, report.rf_tunes, report.fifo_bytes);
}

mod trace;

use anyhow::Context;
use clap::Parser;
use std::fs;
use std::path::Path;
use trace::Trace;
use vcsbank_core::{Cartridge, CartridgeConfig, SchemeKind};

/// Replay a bus access trace against a bank-switched cartridge image and print the active bank
/// after every access.
#[derive(Parser)]
struct Cli {
    #[arg(short = 'f', long = "rom_file_path")]
    rom_file_path: String,
    #[arg(short = 't', long = "trace_file_path")]
    trace_file_path: String,
    /// Bank switching scheme, e.g. F8, EF, 3F; overrides the trace file
    #[arg(short = 's', long = "scheme")]
    scheme: Option<SchemeKind>,
    /// Power-on bank; overrides the trace file and the scheme default
    #[arg(long = "start_bank")]
    start_bank: Option<u16>,
    /// Restore the active bank from this state file before replaying
    #[arg(long = "load_state_path")]
    load_state_path: Option<String>,
    /// Write the final active bank to this state file
    #[arg(long = "save_state_path")]
    save_state_path: Option<String>,
}

fn main() -> Result<(), anyhow::Error> {
    env_logger::init();

    let args = Cli::parse();

    let trace = Trace::from_toml_file(&args.trace_file_path)?;
    log::info!(
        "Loaded {} accesses from '{}'",
        trace.accesses.len(),
        args.trace_file_path
    );

    let scheme = args
        .scheme
        .or(trace.scheme)
        .context("no bank switching scheme given on the command line or in the trace file")?;
    let config = CartridgeConfig {
        scheme,
        start_bank: args.start_bank.or(trace.start_bank),
    };

    log::info!("Running with config:\n{config}");

    let rom = fs::read(Path::new(&args.rom_file_path))
        .with_context(|| format!("error reading ROM image from '{}'", args.rom_file_path))?;
    let mut cartridge = Cartridge::new(rom, config)
        .with_context(|| format!("error loading {scheme} cartridge from '{}'", args.rom_file_path))?;

    if let Some(load_state_path) = &args.load_state_path {
        let bytes = fs::read(load_state_path)
            .with_context(|| format!("error reading state from '{load_state_path}'"))?;
        let snapshot = vcsbank_core::snapshot_from_bytes(&bytes)?;
        cartridge.restore(&snapshot)?;
        log::info!("Restored bank {} from '{load_state_path}'", snapshot.active_bank);
    }

    println!("start  bank {}", cartridge.active_bank());
    for step in trace::replay(&mut cartridge, &trace.accesses) {
        println!("{step}");
    }

    if let Some(save_state_path) = &args.save_state_path {
        let bytes = vcsbank_core::snapshot_to_bytes(&cartridge.snapshot())?;
        fs::write(save_state_path, bytes)
            .with_context(|| format!("error writing state to '{save_state_path}'"))?;
        log::info!("Successfully wrote state to '{save_state_path}'");
    }

    Ok(())
}

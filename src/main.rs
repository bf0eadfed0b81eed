use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{error, info};

use chip8_vm::{run_emulator_app, run_emulator_headless, Chip8Error, CyclePacing};

#[derive(Debug, Parser)]
#[command(name = "chip8-vm")]
#[command(about = "Run a CHIP-8 ROM")]
struct Args {
    rom: PathBuf,

    #[arg(long, default_value_t = 10)]
    scale: usize,

    /// Run every instruction at this rate instead of the per-opcode timing model.
    #[arg(long)]
    hz: Option<u32>,

    #[arg(long, default_value_t = 60)]
    fps: usize,

    #[arg(long, default_value_t = 2000)]
    max_cycles: usize,

    #[arg(long)]
    headless: bool,
}

fn run(args: &Args) -> Result<(), Chip8Error> {
    let pacing = args.hz.map_or(CyclePacing::Measured, CyclePacing::FixedHz);

    if args.headless {
        let state = run_emulator_headless(&args.rom, args.max_cycles, pacing)?;
        println!(
            "headless finished: pc=0x{:03x} i=0x{:03x} delay={} sound={}",
            state.pc, state.index, state.delay_timer, state.sound_timer
        );
        return Ok(());
    }

    run_emulator_app(&args.rom, args.scale, pacing, args.fps)?;
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();
    info!("starting {}", args.rom.display());

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}: {err}", err.kind_label());
            ExitCode::from(1)
        }
    }
}

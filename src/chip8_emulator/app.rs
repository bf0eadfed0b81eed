use std::path::Path;
use std::time::{Duration, Instant};

use log::info;

use crate::chip8_emulator::config::{PIXEL_OFF, SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::chip8_emulator::cpu::{step, CycleOutcome};
use crate::chip8_emulator::error::Chip8Error;
use crate::chip8_emulator::state::{create_state, load_rom_file, set_key_state, EmulatorState};
use crate::chip8_emulator::timing::{advance_timers, CyclePacing, MAX_FIXED_HZ};

fn validate_pacing(pacing: CyclePacing) -> Result<(), Chip8Error> {
    match pacing {
        CyclePacing::FixedHz(0) => Err(Chip8Error::InvalidArgument("hz must be > 0")),
        CyclePacing::FixedHz(hz) if hz > MAX_FIXED_HZ => Err(Chip8Error::InvalidArgument(
            "hz must not exceed 1000000000",
        )),
        _ => Ok(()),
    }
}

/// Runs without a window. Each cycle's cost is fed to the timers as elapsed
/// time, so results do not depend on host speed. Stops early when the program
/// waits for a key, since nothing can press one.
pub fn run_emulator_headless(
    rom_path: &Path,
    max_cycles: usize,
    pacing: CyclePacing,
) -> Result<EmulatorState, Chip8Error> {
    if max_cycles == 0 {
        return Err(Chip8Error::InvalidArgument("max_cycles must be > 0"));
    }
    validate_pacing(pacing)?;

    let rom = load_rom_file(rom_path)?;
    let mut state = create_state(&rom)?;
    let mut last_cost = Duration::ZERO;

    for cycle in 0..max_cycles {
        match step(&mut state, pacing, last_cost)? {
            CycleOutcome::Executed { cost } => last_cost = cost,
            CycleOutcome::AwaitingKey => {
                info!("headless run blocked on key input after {cycle} cycles");
                break;
            }
        }
    }

    Ok(state)
}

pub fn run_emulator_app(
    rom_path: &Path,
    scale: usize,
    pacing: CyclePacing,
    target_fps: usize,
) -> Result<EmulatorState, Chip8Error> {
    use raylib::prelude::{Color, KeyboardKey, RaylibDraw};

    if scale == 0 {
        return Err(Chip8Error::InvalidArgument("scale must be > 0"));
    }
    if target_fps == 0 {
        return Err(Chip8Error::InvalidArgument("target_fps must be > 0"));
    }
    validate_pacing(pacing)?;

    let rom = load_rom_file(rom_path)?;
    let mut state = create_state(&rom)?;

    let width = (SCREEN_WIDTH * scale) as i32;
    let height = (SCREEN_HEIGHT * scale) as i32;
    let (mut rl, thread) = raylib::init()
        .size(width, height)
        .title("chip8-vm")
        .build();
    rl.set_target_fps(target_fps as u32);

    let key_map = [
        (KeyboardKey::KEY_ONE, 0x1usize),
        (KeyboardKey::KEY_TWO, 0x2),
        (KeyboardKey::KEY_THREE, 0x3),
        (KeyboardKey::KEY_FOUR, 0xC),
        (KeyboardKey::KEY_Q, 0x4),
        (KeyboardKey::KEY_W, 0x5),
        (KeyboardKey::KEY_E, 0x6),
        (KeyboardKey::KEY_R, 0xD),
        (KeyboardKey::KEY_A, 0x7),
        (KeyboardKey::KEY_S, 0x8),
        (KeyboardKey::KEY_D, 0x9),
        (KeyboardKey::KEY_F, 0xE),
        (KeyboardKey::KEY_Z, 0xA),
        (KeyboardKey::KEY_X, 0x0),
        (KeyboardKey::KEY_C, 0xB),
        (KeyboardKey::KEY_V, 0xF),
    ];

    // Emulated time owed to the CPU; each executed instruction pays its cost.
    let mut budget = 0.0f64;
    let mut last_cost = Duration::ZERO;
    let mut previous_tick = Instant::now();

    while !rl.window_should_close() {
        if rl.is_key_pressed(KeyboardKey::KEY_ESCAPE) {
            break;
        }

        for (key, mapped) in key_map {
            set_key_state(&mut state, mapped, rl.is_key_down(key));
        }

        let now = Instant::now();
        let frame_dt = (now - previous_tick).as_secs_f64().min(0.1);
        previous_tick = now;
        budget += frame_dt;

        while budget > 0.0 {
            match step(&mut state, pacing, last_cost)? {
                CycleOutcome::Executed { cost } => {
                    budget -= cost.as_secs_f64();
                    last_cost = cost;
                }
                CycleOutcome::AwaitingKey => {
                    // the rest of the frame still counts for the timers
                    advance_timers(&mut state, Duration::from_secs_f64(budget));
                    last_cost = Duration::ZERO;
                    budget = 0.0;
                }
            }
        }

        let mut d = rl.begin_drawing(&thread);
        d.clear_background(Color::BLACK);
        for (index, value) in state.screen_buffer.iter().enumerate() {
            if *value == PIXEL_OFF {
                continue;
            }
            let x = (index % SCREEN_WIDTH) as i32;
            let y = (index / SCREEN_WIDTH) as i32;
            d.draw_rectangle(
                x * scale as i32,
                y * scale as i32,
                scale as i32,
                scale as i32,
                Color::WHITE,
            );
        }
    }

    Ok(state)
}

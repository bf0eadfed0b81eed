use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;
use std::time::Duration;

use log::{debug, info, log_enabled, Level};

use crate::chip8_emulator::config::{
    FONT_BASE, FONT_BYTES, KEY_COUNT, MAX_ROM_SIZE, MEMORY_SIZE, PIXEL_OFF, PROGRAM_START,
    REGISTER_COUNT, SCREEN_HEIGHT, SCREEN_WIDTH, STACK_DEPTH,
};
use crate::chip8_emulator::error::Chip8Error;

/// Whether the interpreter fetches instructions or is parked on `LD Vx, K`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    AwaitingKey { register: usize },
}

#[derive(Debug, Clone)]
pub struct EmulatorState {
    pub memory: [u8; MEMORY_SIZE],
    pub registers: [u8; REGISTER_COUNT],
    pub stack: [u16; STACK_DEPTH],
    pub sp: u8,
    pub key_inputs: [bool; KEY_COUNT],
    pub screen_buffer: [u8; SCREEN_WIDTH * SCREEN_HEIGHT],
    pub pc: u16,
    pub index: u16,
    pub delay_timer: u8,
    pub sound_timer: u8,
    pub run_state: RunState,
    /// Time accumulated since the timers last ticked.
    pub timer_elapsed: Duration,
}

impl Default for EmulatorState {
    fn default() -> Self {
        Self {
            memory: [0; MEMORY_SIZE],
            registers: [0; REGISTER_COUNT],
            stack: [0; STACK_DEPTH],
            sp: 0,
            key_inputs: [false; KEY_COUNT],
            screen_buffer: [PIXEL_OFF; SCREEN_WIDTH * SCREEN_HEIGHT],
            pc: PROGRAM_START as u16,
            index: 0,
            delay_timer: 0,
            sound_timer: 0,
            run_state: RunState::Running,
            timer_elapsed: Duration::ZERO,
        }
    }
}

pub fn create_state(rom: &[u8]) -> Result<EmulatorState, Chip8Error> {
    let mut state = EmulatorState::default();
    reset_state(&mut state, rom)?;
    Ok(state)
}

/// Re-initialises `state` with the font and `rom`. A ROM that does not fit
/// leaves the state as it was.
pub fn reset_state(state: &mut EmulatorState, rom: &[u8]) -> Result<(), Chip8Error> {
    check_rom_size(rom.len())?;

    *state = EmulatorState::default();
    load_font(state);
    load_rom_bytes(state, rom)
}

pub fn load_font(state: &mut EmulatorState) {
    state.memory[FONT_BASE..FONT_BASE + FONT_BYTES.len()].copy_from_slice(&FONT_BYTES);
}

pub fn load_rom_bytes(state: &mut EmulatorState, rom: &[u8]) -> Result<(), Chip8Error> {
    check_rom_size(rom.len())?;

    let start = PROGRAM_START;
    let end = PROGRAM_START + rom.len();
    state.memory[start..end].copy_from_slice(rom);

    info!("loaded rom into memory 0x{start:03x}..0x{end:03x} ({} bytes)", rom.len());
    if log_enabled!(Level::Debug) {
        log_rom_content(rom);
    }

    Ok(())
}

/// Reads a ROM image from disk, rejecting anything that could not be run.
pub fn load_rom_file(path: &Path) -> Result<Vec<u8>, Chip8Error> {
    let mut file = File::open(path).map_err(|error| match error.kind() {
        ErrorKind::NotFound => Chip8Error::RomNotFound(path.to_path_buf()),
        _ => Chip8Error::RomRead(error),
    })?;

    let expected = file.metadata().map_err(Chip8Error::RomRead)?.len() as usize;
    if expected == 0 {
        return Err(Chip8Error::RomEmpty(path.to_path_buf()));
    }
    check_rom_size(expected)?;

    let mut rom = Vec::with_capacity(expected);
    file.read_to_end(&mut rom).map_err(Chip8Error::RomRead)?;
    if rom.len() != expected {
        return Err(Chip8Error::RomRead(std::io::Error::new(
            ErrorKind::UnexpectedEof,
            format!("short read: expected {expected} bytes, got {}", rom.len()),
        )));
    }

    Ok(rom)
}

fn check_rom_size(size: usize) -> Result<(), Chip8Error> {
    if size > MAX_ROM_SIZE {
        return Err(Chip8Error::RomTooLarge {
            size,
            max: MAX_ROM_SIZE,
        });
    }
    Ok(())
}

fn log_rom_content(rom: &[u8]) {
    let rows: Vec<String> = rom
        .chunks(16)
        .map(|row| {
            row.iter()
                .map(|byte| format!("{byte:02x}"))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect();
    debug!("rom content:\n{}", rows.join("\n"));
}

pub fn clear_display(state: &mut EmulatorState) {
    state.screen_buffer = [PIXEL_OFF; SCREEN_WIDTH * SCREEN_HEIGHT];
}

pub fn pixel_at(state: &EmulatorState, x: usize, y: usize) -> u8 {
    state.screen_buffer[(y % SCREEN_HEIGHT) * SCREEN_WIDTH + (x % SCREEN_WIDTH)]
}

pub fn sound_active(state: &EmulatorState) -> bool {
    state.sound_timer > 0
}

/// Lowest-numbered key currently held, scanning 0x0 through 0xF.
pub fn first_pressed_key(state: &EmulatorState) -> Option<u8> {
    state
        .key_inputs
        .iter()
        .position(|pressed| *pressed)
        .map(|index| index as u8)
}

pub fn set_key_state(state: &mut EmulatorState, key_index: usize, is_pressed: bool) {
    if key_index >= KEY_COUNT {
        return;
    }

    state.key_inputs[key_index] = is_pressed;
}

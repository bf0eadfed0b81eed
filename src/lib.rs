pub mod chip8_emulator;

pub use chip8_emulator::app::{run_emulator_app, run_emulator_headless};
pub use chip8_emulator::cpu::{
    execute_cycle, execute_instruction, execute_opcode, step, CycleOutcome,
};
pub use chip8_emulator::error::Chip8Error;
pub use chip8_emulator::instruction::{decode, Instruction};
pub use chip8_emulator::state::{
    clear_display, create_state, first_pressed_key, load_rom_bytes, load_rom_file, pixel_at,
    reset_state, set_key_state, sound_active, EmulatorState, RunState,
};
pub use chip8_emulator::timing::{
    advance_timers, instruction_cost, tick_timers, unrecognized_cost, CyclePacing,
};

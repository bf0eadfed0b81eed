use std::time::Duration;

use log::{debug, trace};
use rand::random;

use crate::chip8_emulator::config::{
    FLAG_REGISTER, FONT_BASE, GLYPH_HEIGHT, MEMORY_SIZE, PIXEL_ON, SCREEN_HEIGHT, SCREEN_WIDTH,
    STACK_DEPTH,
};
use crate::chip8_emulator::error::Chip8Error;
use crate::chip8_emulator::instruction::{decode, Instruction};
use crate::chip8_emulator::state::{clear_display, first_pressed_key, EmulatorState, RunState};
use crate::chip8_emulator::timing::{
    advance_timers, instruction_cost, unrecognized_cost, CyclePacing,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// An instruction ran (or an awaited key arrived) and took `cost` of emulated time.
    Executed { cost: Duration },
    /// Parked on `LD Vx, K` with no key held; nothing was fetched.
    AwaitingKey,
}

/// Runs one cycle and then feeds `elapsed` to the 60 Hz timers. The timers
/// keep counting while the VM is blocked on a key.
pub fn step(
    state: &mut EmulatorState,
    pacing: CyclePacing,
    elapsed: Duration,
) -> Result<CycleOutcome, Chip8Error> {
    let outcome = execute_cycle(state, pacing)?;
    advance_timers(state, elapsed);
    Ok(outcome)
}

pub fn execute_cycle(
    state: &mut EmulatorState,
    pacing: CyclePacing,
) -> Result<CycleOutcome, Chip8Error> {
    if let RunState::AwaitingKey { register } = state.run_state {
        let Some(key) = first_pressed_key(state) else {
            return Ok(CycleOutcome::AwaitingKey);
        };
        state.registers[register] = key;
        state.run_state = RunState::Running;
        let cost = instruction_cost(Instruction::WaitKey { x: register }, pacing);
        return Ok(CycleOutcome::Executed { cost });
    }

    let pc = state.pc as usize;
    if pc > MEMORY_SIZE - 2 {
        return Err(Chip8Error::ProgramCounterOutOfBounds(pc));
    }

    let opcode = u16::from_be_bytes([state.memory[pc], state.memory[pc + 1]]);
    state.pc = state.pc.wrapping_add(2);

    let cost = execute_opcode(state, opcode, pacing)?;
    Ok(CycleOutcome::Executed { cost })
}

/// Executes an already fetched opcode. Words outside the instruction set are
/// skipped without error.
pub fn execute_opcode(
    state: &mut EmulatorState,
    opcode: u16,
    pacing: CyclePacing,
) -> Result<Duration, Chip8Error> {
    match decode(opcode) {
        Some(instruction) => {
            trace!("0x{:03x}: {opcode:04x} {instruction}", state.pc.wrapping_sub(2));
            execute_instruction(state, instruction)?;
            Ok(instruction_cost(instruction, pacing))
        }
        None => {
            debug!("skipping unrecognized opcode 0x{opcode:04x}");
            Ok(unrecognized_cost(pacing))
        }
    }
}

pub fn execute_instruction(
    state: &mut EmulatorState,
    instruction: Instruction,
) -> Result<(), Chip8Error> {
    use Instruction::*;

    let v = &mut state.registers;
    match instruction {
        Sys(address) => debug!("ignoring SYS 0x{address:03x}"),
        ClearScreen => clear_display(state),
        Return => {
            if state.sp == 0 {
                return Err(Chip8Error::StackUnderflow);
            }
            state.sp -= 1;
            state.pc = state.stack[state.sp as usize];
        }
        Jump(address) => state.pc = address,
        Call(address) => {
            if state.sp as usize >= STACK_DEPTH {
                return Err(Chip8Error::StackOverflow);
            }
            state.stack[state.sp as usize] = state.pc;
            state.sp += 1;
            state.pc = address;
        }
        SkipEqImm { x, nn } => skip_if(&mut state.pc, v[x] == nn),
        SkipNeImm { x, nn } => skip_if(&mut state.pc, v[x] != nn),
        SkipEqReg { x, y } => skip_if(&mut state.pc, v[x] == v[y]),
        SkipNeReg { x, y } => skip_if(&mut state.pc, v[x] != v[y]),
        LoadImm { x, nn } => v[x] = nn,
        AddImm { x, nn } => v[x] = v[x].wrapping_add(nn),
        Move { x, y } => v[x] = v[y],
        Or { x, y } => v[x] |= v[y],
        And { x, y } => v[x] &= v[y],
        Xor { x, y } => v[x] ^= v[y],
        AddReg { x, y } => {
            let sum = u16::from(v[x]) + u16::from(v[y]);
            v[FLAG_REGISTER] = u8::from(sum > 0xFF);
            v[x] = sum as u8;
        }
        // Flag first, then the result: with x == F the difference is what remains.
        Sub { x, y } => {
            v[FLAG_REGISTER] = u8::from(v[x] > v[y]);
            v[x] = v[x].wrapping_sub(v[y]);
        }
        SubReversed { x, y } => {
            v[FLAG_REGISTER] = u8::from(v[y] > v[x]);
            v[x] = v[y].wrapping_sub(v[x]);
        }
        ShiftRight { x, .. } => {
            let value = v[x];
            v[FLAG_REGISTER] = value & 0x01;
            v[x] = value >> 1;
        }
        ShiftLeft { x, .. } => {
            let value = v[x];
            v[FLAG_REGISTER] = value >> 7;
            v[x] = value << 1;
        }
        LoadIndex(address) => state.index = address,
        JumpOffset(address) => state.pc = u16::from(v[0]).wrapping_add(address),
        Random { x, nn } => v[x] = random::<u8>() & nn,
        Draw { x, y, n } => draw_sprite(state, x, y, n)?,
        SkipKeyDown { x } => {
            let key = (v[x] & 0x0F) as usize;
            skip_if(&mut state.pc, state.key_inputs[key]);
        }
        SkipKeyUp { x } => {
            let key = (v[x] & 0x0F) as usize;
            skip_if(&mut state.pc, !state.key_inputs[key]);
        }
        LoadDelay { x } => v[x] = state.delay_timer,
        WaitKey { x } => match first_pressed_key(state) {
            Some(key) => state.registers[x] = key,
            None => state.run_state = RunState::AwaitingKey { register: x },
        },
        SetDelay { x } => state.delay_timer = v[x],
        SetSound { x } => state.sound_timer = v[x],
        AddIndex { x } => state.index = state.index.wrapping_add(u16::from(v[x])),
        LoadGlyph { x } => {
            state.index = (FONT_BASE + GLYPH_HEIGHT * v[x] as usize) as u16;
        }
        StoreBcd { x } => {
            let value = v[x];
            let base = state.index as usize;
            write_memory(&mut state.memory, base, value / 100)?;
            write_memory(&mut state.memory, base + 1, (value / 10) % 10)?;
            write_memory(&mut state.memory, base + 2, value % 10)?;
        }
        StoreRegisters { x } => {
            let base = state.index as usize;
            for register in 0..=x {
                write_memory(&mut state.memory, base + register, state.registers[register])?;
            }
        }
        LoadRegisters { x } => {
            let base = state.index as usize;
            for register in 0..=x {
                state.registers[register] = read_memory(&state.memory, base + register)?;
            }
        }
    }

    Ok(())
}

fn skip_if(pc: &mut u16, condition: bool) {
    if condition {
        *pc = pc.wrapping_add(2);
    }
}

fn read_memory(memory: &[u8], address: usize) -> Result<u8, Chip8Error> {
    memory
        .get(address)
        .copied()
        .ok_or(Chip8Error::MemoryOutOfBounds(address))
}

fn write_memory(memory: &mut [u8], address: usize, value: u8) -> Result<(), Chip8Error> {
    let slot = memory
        .get_mut(address)
        .ok_or(Chip8Error::MemoryOutOfBounds(address))?;
    *slot = value;
    Ok(())
}

/// XORs an `n`-row sprite from memory at I onto the screen. The origin and
/// every plotted pixel wrap around both edges; VF reports whether any lit
/// pixel was switched off.
fn draw_sprite(state: &mut EmulatorState, x: usize, y: usize, n: u8) -> Result<(), Chip8Error> {
    let x_start = state.registers[x] as usize % SCREEN_WIDTH;
    let y_start = state.registers[y] as usize % SCREEN_HEIGHT;
    state.registers[FLAG_REGISTER] = 0;

    for row in 0..n as usize {
        let sprite_row = read_memory(&state.memory, state.index as usize + row)?;
        let y_pos = (y_start + row) % SCREEN_HEIGHT;

        for bit in 0..8 {
            if sprite_row & (0x80u8 >> bit) == 0 {
                continue;
            }

            let x_pos = (x_start + bit) % SCREEN_WIDTH;
            let location = x_pos + y_pos * SCREEN_WIDTH;
            if state.screen_buffer[location] == PIXEL_ON {
                state.registers[FLAG_REGISTER] = 1;
            }
            state.screen_buffer[location] ^= PIXEL_ON;
        }
    }

    Ok(())
}

use std::time::Duration;

use crate::chip8_emulator::config::TIMER_PERIOD;
use crate::chip8_emulator::instruction::Instruction;
use crate::chip8_emulator::state::EmulatorState;

/// Highest `FixedHz` rate whose period is still a whole nanosecond.
pub const MAX_FIXED_HZ: u32 = 1_000_000_000;

/// How much emulated time an executed instruction accounts for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CyclePacing {
    /// Per-opcode durations approximating the COSMAC VIP interpreter.
    #[default]
    Measured,
    /// Every instruction takes `1 / hz` seconds.
    FixedHz(u32),
}

/// Approximate time the original interpreter spent on `instruction`, in microseconds.
fn measured_micros(instruction: Instruction) -> u64 {
    use Instruction::*;

    match instruction {
        Sys(_) => 100,
        ClearScreen => 109,
        Return | Jump(_) | Call(_) | JumpOffset(_) => 105,
        SkipEqImm { .. } | SkipNeImm { .. } | LoadIndex(_) => 55,
        SkipEqReg { .. } | SkipNeReg { .. } | SkipKeyDown { .. } | SkipKeyUp { .. } => 73,
        LoadImm { .. } => 50,
        AddImm { .. } => 55,
        LoadDelay { .. } | SetDelay { .. } | SetSound { .. } => 45,
        Move { .. } | Or { .. } | And { .. } | Xor { .. } => 64,
        AddReg { .. }
        | Sub { .. }
        | ShiftRight { .. }
        | SubReversed { .. }
        | ShiftLeft { .. } => 73,
        Random { .. } => 164,
        // includes waiting on display DMA
        Draw { n, .. } => 720 + 18 * u64::from(n),
        WaitKey { .. } => 45,
        AddIndex { .. } => 86,
        LoadGlyph { .. } => 91,
        StoreBcd { .. } => 364,
        StoreRegisters { x } | LoadRegisters { x } => 64 + 32 * (x as u64 + 1),
    }
}

/// Period of one instruction at `hz`, never shorter than a nanosecond.
fn fixed_period(hz: u32) -> Duration {
    (Duration::from_secs(1) / hz.max(1)).max(Duration::from_nanos(1))
}

pub fn instruction_cost(instruction: Instruction, pacing: CyclePacing) -> Duration {
    match pacing {
        CyclePacing::Measured => Duration::from_micros(measured_micros(instruction)),
        CyclePacing::FixedHz(hz) => fixed_period(hz),
    }
}

/// Cost charged for a word that does not decode.
pub fn unrecognized_cost(pacing: CyclePacing) -> Duration {
    match pacing {
        CyclePacing::Measured => Duration::from_micros(measured_micros(Instruction::Sys(0))),
        CyclePacing::FixedHz(hz) => fixed_period(hz),
    }
}

/// Decrements each nonzero timer once.
pub fn tick_timers(state: &mut EmulatorState) {
    state.delay_timer = state.delay_timer.saturating_sub(1);
    state.sound_timer = state.sound_timer.saturating_sub(1);
}

/// Feeds wall-clock time into the 60 Hz timer clock. At most one tick happens
/// per call; the accumulator restarts from zero after a tick.
pub fn advance_timers(state: &mut EmulatorState, elapsed: Duration) -> bool {
    state.timer_elapsed += elapsed;
    if state.timer_elapsed < TIMER_PERIOD {
        return false;
    }

    tick_timers(state);
    state.timer_elapsed = Duration::ZERO;
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chip8_emulator::instruction::decode;

    #[test]
    fn draws_cost_ten_to_twenty_register_ops() {
        // LD Vx, nn / ADD Vx, nn and every 8xy_ form
        let register_ops = [
            0x6012, 0x7012, 0x8010, 0x8011, 0x8012, 0x8013, 0x8014, 0x8015, 0x8016, 0x8017,
            0x801E,
        ];

        for n in 1..=15u16 {
            let draw = instruction_cost(decode(0xD000 | n).unwrap(), CyclePacing::Measured);
            for opcode in register_ops {
                let instruction = decode(opcode).unwrap();
                let op = instruction_cost(instruction, CyclePacing::Measured);
                assert!(
                    draw >= op * 10 && draw <= op * 20,
                    "DRW n={n} ({draw:?}) vs {instruction} ({op:?})"
                );
            }
        }
    }

    #[test]
    fn measured_costs_stay_in_microsecond_range() {
        for opcode in [0x00E0, 0x1200, 0x6001, 0x8124, 0xA300, 0xC0FF, 0xF033, 0xFF65] {
            let instruction = decode(opcode).unwrap();
            let cost = instruction_cost(instruction, CyclePacing::Measured);
            assert!(cost >= Duration::from_micros(10), "{instruction}");
            assert!(cost < Duration::from_millis(2), "{instruction}");
        }
    }

    #[test]
    fn fixed_hz_replaces_the_cost_model() {
        let pacing = CyclePacing::FixedHz(500);
        let expected = Duration::from_millis(2);

        assert_eq!(instruction_cost(Instruction::ClearScreen, pacing), expected);
        assert_eq!(
            instruction_cost(Instruction::Draw { x: 0, y: 0, n: 15 }, pacing),
            expected
        );
        assert_eq!(unrecognized_cost(pacing), expected);
    }

    #[test]
    fn fixed_hz_period_never_reaches_zero() {
        for hz in [MAX_FIXED_HZ, MAX_FIXED_HZ + 1, u32::MAX] {
            let cost = instruction_cost(Instruction::ClearScreen, CyclePacing::FixedHz(hz));
            assert_eq!(cost, Duration::from_nanos(1), "hz={hz}");
        }
    }

    #[test]
    fn advance_timers_waits_for_a_full_period() {
        let mut state = EmulatorState {
            delay_timer: 3,
            ..EmulatorState::default()
        };

        assert!(!advance_timers(&mut state, TIMER_PERIOD / 2));
        assert_eq!(state.delay_timer, 3);
        assert!(advance_timers(&mut state, TIMER_PERIOD / 2));
        assert_eq!(state.delay_timer, 2);
        assert_eq!(state.timer_elapsed, Duration::ZERO);
    }

    #[test]
    fn long_gaps_still_tick_once() {
        let mut state = EmulatorState {
            delay_timer: 10,
            sound_timer: 1,
            ..EmulatorState::default()
        };

        advance_timers(&mut state, Duration::from_secs(1));

        assert_eq!(state.delay_timer, 9);
        assert_eq!(state.sound_timer, 0);
    }
}

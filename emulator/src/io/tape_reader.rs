use std::collections::VecDeque;

use crate::error::EmuError;
use crate::io::IotDevice;
use crate::processor::CpuState;

// Paper-tape reader. With the motor on, a frame comes under the head
// every few thousand steps and sets the ready flag; reading a frame arms
// the next one.
pub struct PaperTapeReader {
    tape: VecDeque<u8>,
    frame: u8,
    ready: bool,
    motor_on: bool,
    ticks_until_frame: usize,
}

impl PaperTapeReader {
    // Read buffer: or the frame into AC and arm the next.
    pub const HRB: u16 = 0o051;
    // Motor off.
    pub const HOF: u16 = 0o052;
    // Motor on.
    pub const HON: u16 = 0o061;

    // 300 frames per second, in 2 us steps.
    const FRAME_DELAY_TICKS: usize = 1_600;

    pub fn new() -> Self {
        PaperTapeReader{
            tape: VecDeque::new(),
            frame: 0,
            ready: false,
            motor_on: false,
            ticks_until_frame: 0,
        }
    }

    pub fn load_tape(&mut self, data: Vec<u8>) {
        self.tape = data.into();
    }

    pub fn tape_ready(&self) -> bool {
        self.ready
    }

    pub fn frames_left(&self) -> usize {
        self.tape.len()
    }
}

impl Default for PaperTapeReader {
    fn default() -> Self {
        Self::new()
    }
}

impl IotDevice for PaperTapeReader {
    fn reset(&mut self) {
        self.frame = 0;
        self.ready = false;
        self.motor_on = false;
        self.ticks_until_frame = 0;
    }

    fn tick(&mut self) {
        if !self.motor_on || self.ready {
            return;
        }
        if self.ticks_until_frame > 0 {
            self.ticks_until_frame -= 1;
            return;
        }
        if let Some(frame) = self.tape.pop_front() {
            self.frame = frame;
            self.ready = true;
        }
    }

    fn handled_codes(&self) -> &'static [u16] {
        &[Self::HRB, Self::HOF, Self::HON]
    }

    fn execute_iot(&mut self, code: u16, cpu: &mut CpuState) -> Result<(), EmuError> {
        match code {
            Self::HRB => {
                cpu.or_ac(self.frame as u16);
                self.ready = false;
                self.ticks_until_frame = Self::FRAME_DELAY_TICKS;
            }
            Self::HOF => {
                self.motor_on = false;
                self.ready = false;
            }
            Self::HON => {
                self.motor_on = true;
                self.ticks_until_frame = Self::FRAME_DELAY_TICKS;
            }
            _ => return Err(EmuError::UnimplementedIot{code}),
        }
        Ok(())
    }
}

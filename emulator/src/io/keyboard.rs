use std::collections::VecDeque;

use crate::error::EmuError;
use crate::io::IotDevice;
use crate::processor::CpuState;

// Keyboard: one latched word plus a ready flag. Host key presses queue up
// and are promoted into the latch one at a time as the program consumes
// them.
pub struct Keyboard {
    queue: VecDeque<u16>,
    latch: u16,
    ready: bool,
}

impl Keyboard {
    // Read buffer: or the latch into AC.
    pub const KRB: u16 = 0o021;
    // Clear the ready flag.
    pub const KCF: u16 = 0o022;
    // Read and clear.
    pub const KRC: u16 = 0o023;

    pub fn new() -> Self {
        Keyboard{queue: VecDeque::new(), latch: 0, ready: false}
    }

    pub fn press_key(&mut self, key: u16) {
        self.queue.push_back(key);
    }

    pub fn type_str(&mut self, s: &str) {
        for ch in s.bytes() {
            self.press_key(ch as u16);
        }
    }

    pub fn key_ready(&self) -> bool {
        self.ready
    }
}

impl Default for Keyboard {
    fn default() -> Self {
        Self::new()
    }
}

impl IotDevice for Keyboard {
    fn reset(&mut self) {
        self.queue.clear();
        self.latch = 0;
        self.ready = false;
    }

    fn tick(&mut self) {
        if !self.ready {
            if let Some(key) = self.queue.pop_front() {
                self.latch = key;
                self.ready = true;
            }
        }
    }

    fn handled_codes(&self) -> &'static [u16] {
        &[Self::KRB, Self::KCF, Self::KRC]
    }

    fn execute_iot(&mut self, code: u16, cpu: &mut CpuState) -> Result<(), EmuError> {
        match code {
            Self::KRB => cpu.or_ac(self.latch),
            Self::KCF => self.ready = false,
            Self::KRC => {
                cpu.or_ac(self.latch);
                self.ready = false;
            }
            _ => return Err(EmuError::UnimplementedIot{code}),
        }
        Ok(())
    }
}

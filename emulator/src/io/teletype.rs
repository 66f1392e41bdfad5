use std::collections::VecDeque;
use std::io::{Write, stdout};
use std::sync::{Arc, Mutex};

use log::error;

use crate::error::EmuError;
use crate::io::IotDevice;
use crate::processor::CpuState;

// The host side of the teletype line.
pub trait Tty: Send + Sync {
    fn transmit(&self, val: u8);

    fn rx_ready(&self) -> bool;
    fn receive(&self) -> Option<u8>;
}

////////////////////////////////////////////////////////////////////////////////

#[derive(Default, Clone, Copy)]
pub struct StdoutTty;

impl Tty for StdoutTty {
    fn transmit(&self, val: u8) {
        let mut out = stdout().lock();
        out.write_all(&[val]).unwrap();
        out.flush().unwrap();
    }

    fn rx_ready(&self) -> bool {
        false
    }

    fn receive(&self) -> Option<u8> {
        None
    }
}

////////////////////////////////////////////////////////////////////////////////

// Buffered line for tests and embedding.
#[derive(Default)]
pub struct PipeTty {
    out_buf: Mutex<VecDeque<u8>>,
    in_buf: Mutex<VecDeque<u8>>,
}

impl PipeTty {
    pub fn take_output(&self) -> VecDeque<u8> {
        std::mem::take(&mut self.out_buf.lock().unwrap())
    }

    pub fn take_output_string(&self) -> String {
        String::from_utf8_lossy(self.take_output().make_contiguous()).into_owned()
    }

    pub fn is_out_empty(&self) -> bool {
        self.out_buf.lock().unwrap().is_empty()
    }

    pub fn pop_output(&self) -> Option<u8> {
        self.out_buf.lock().unwrap().pop_front()
    }

    pub fn push_input(&self, val: u8) {
        self.in_buf.lock().unwrap().push_back(val);
    }

    pub fn write_input(&self, vals: &[u8]) {
        for val in vals.iter() {
            self.push_input(*val);
        }
    }
}

impl Tty for PipeTty {
    fn transmit(&self, val: u8) {
        self.out_buf.lock().unwrap().push_back(val);
    }

    fn rx_ready(&self) -> bool {
        !self.in_buf.lock().unwrap().is_empty()
    }

    fn receive(&self) -> Option<u8> {
        self.in_buf.lock().unwrap().pop_front()
    }
}

////////////////////////////////////////////////////////////////////////////////

// Serial line interface: a receive latch with a ready flag, and a send
// side that takes a character time to come ready again.
pub struct Teletype {
    device: Arc<dyn Tty>,

    rx_byte: u8,
    rx_ready: bool,

    tx_done: bool,
    tx_ticks_until_done: usize,
}

impl Teletype {
    // Read buffer: or the received byte into AC.
    pub const RRB: u16 = 0o031;
    // Clear the receive flag.
    pub const RCF: u16 = 0o032;
    // Read and clear.
    pub const RRC: u16 = 0o033;

    // Print the low byte of AC.
    pub const TPR: u16 = 0o041;
    // Clear the send-done flag.
    pub const TCF: u16 = 0o042;
    // Print and clear.
    pub const TPC: u16 = 0o043;

    // One character time at 110 baud, in 2 us steps.
    const SEND_DELAY_TICKS: usize = 50_000;

    pub fn new(device: Arc<dyn Tty>) -> Self {
        Teletype{
            device,
            rx_byte: 0,
            rx_ready: false,
            tx_done: true,
            tx_ticks_until_done: 0,
        }
    }

    pub fn new_to_stdout() -> Self {
        Self::new(Arc::new(StdoutTty))
    }

    pub fn rx_ready(&self) -> bool {
        self.rx_ready
    }

    pub fn tx_done(&self) -> bool {
        self.tx_done
    }

    fn print(&mut self, cpu: &CpuState) {
        let val = (cpu.ac() & 0o377) as u8;
        if self.tx_done {
            self.device.transmit(val);
            self.tx_done = false;
            self.tx_ticks_until_done = Self::SEND_DELAY_TICKS;
        } else {
            error!("Teletype: print of {val} while busy");
        }
    }
}

impl Default for Teletype {
    fn default() -> Self {
        Teletype::new_to_stdout()
    }
}

impl IotDevice for Teletype {
    fn reset(&mut self) {
        self.rx_byte = 0;
        self.rx_ready = false;
        self.tx_done = true;
        self.tx_ticks_until_done = 0;
    }

    fn tick(&mut self) {
        if !self.rx_ready {
            if let Some(val) = self.device.receive() {
                self.rx_byte = val;
                self.rx_ready = true;
            }
        }

        if self.tx_ticks_until_done > 0 {
            self.tx_ticks_until_done -= 1;
            if self.tx_ticks_until_done == 0 {
                self.tx_done = true;
            }
        }
    }

    fn handled_codes(&self) -> &'static [u16] {
        &[Self::RRB, Self::RCF, Self::RRC, Self::TPR, Self::TCF, Self::TPC]
    }

    fn execute_iot(&mut self, code: u16, cpu: &mut CpuState) -> Result<(), EmuError> {
        match code {
            Self::RRB => cpu.or_ac(self.rx_byte as u16),
            Self::RCF => self.rx_ready = false,
            Self::RRC => {
                cpu.or_ac(self.rx_byte as u16);
                self.rx_ready = false;
            }
            Self::TPR => self.print(cpu),
            Self::TCF => self.tx_done = false,
            Self::TPC => {
                self.print(cpu);
                self.tx_done = false;
            }
            _ => return Err(EmuError::UnimplementedIot{code}),
        }
        Ok(())
    }
}

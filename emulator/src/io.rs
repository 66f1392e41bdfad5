pub mod keyboard;
pub mod tape_reader;
pub mod teletype;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::EmuError;
use crate::io::keyboard::Keyboard;
use crate::io::tape_reader::PaperTapeReader;
use crate::io::teletype::{Teletype, Tty};
use crate::processor::CpuState;

// A peripheral on the I/O bus. A device claims its codes once at
// registration; execute_iot only ever sees codes from that set.
pub trait IotDevice: Send {
    fn reset(&mut self) {}
    fn tick(&mut self) {}

    fn handled_codes(&self) -> &'static [u16];
    fn execute_iot(&mut self, code: u16, cpu: &mut CpuState) -> Result<(), EmuError>;
}

enum Slot {
    Display,
    Device(usize),
}

// Where a code routes. The display processor is not behind a mutex, so it
// gets a marker rather than a handle.
pub enum IotTarget {
    Display,
    Device(Arc<Mutex<dyn IotDevice>>),
}

#[derive(Default)]
pub struct IotRegistry {
    devices: Vec<Arc<Mutex<dyn IotDevice>>>,
    map: HashMap<u16, Slot>,
}

impl IotRegistry {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn claim_for_display(&mut self, codes: &[u16]) {
        for &code in codes {
            let prev = self.map.insert(code, Slot::Display);
            assert!(prev.is_none(), "Duplicate IOT claim for code 0o{code:o}");
        }
    }

    pub fn register(&mut self, dev: Arc<Mutex<dyn IotDevice>>) {
        let idx = self.devices.len();
        let codes = dev.lock().unwrap().handled_codes();
        for &code in codes {
            let prev = self.map.insert(code, Slot::Device(idx));
            assert!(prev.is_none(), "Duplicate IOT claim for code 0o{code:o}");
        }
        self.devices.push(dev);
    }

    pub fn target(&self, code: u16) -> Option<IotTarget> {
        match self.map.get(&code)? {
            Slot::Display => Some(IotTarget::Display),
            Slot::Device(idx) => Some(IotTarget::Device(self.devices[*idx].clone())),
        }
    }

    // Devices registered under several codes still tick once per step.
    pub fn tick_all(&self) {
        for dev in &self.devices {
            dev.lock().unwrap().tick();
        }
    }

    pub fn reset_all(&self) {
        for dev in &self.devices {
            dev.lock().unwrap().reset();
        }
    }
}

////////////////////////////////////////////////////////////////////////////////

// The stock peripheral set. Typed handles are kept so the skip conditions
// can poll readiness without going through the code map.
pub struct Peripherals {
    pub keyboard: Arc<Mutex<Keyboard>>,
    pub teletype: Arc<Mutex<Teletype>>,
    pub reader: Arc<Mutex<PaperTapeReader>>,
}

impl Peripherals {
    pub fn new(tty: Arc<dyn Tty>) -> Self {
        Peripherals{
            keyboard: Arc::new(Mutex::new(Keyboard::new())),
            teletype: Arc::new(Mutex::new(Teletype::new(tty))),
            reader: Arc::new(Mutex::new(PaperTapeReader::new())),
        }
    }

    pub fn register_all(&self, registry: &mut IotRegistry) {
        registry.register(self.keyboard.clone());
        registry.register(self.teletype.clone());
        registry.register(self.reader.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubDevice(&'static [u16]);

    impl IotDevice for StubDevice {
        fn handled_codes(&self) -> &'static [u16] {
            self.0
        }

        fn execute_iot(&mut self, _code: u16, _cpu: &mut CpuState) -> Result<(), EmuError> {
            Ok(())
        }
    }

    #[test]
    fn routes_to_registered_device() {
        let mut reg = IotRegistry::new();
        reg.register(Arc::new(Mutex::new(StubDevice(&[0o021, 0o022]))));
        assert!(matches!(reg.target(0o021), Some(IotTarget::Device(_))));
        assert!(matches!(reg.target(0o022), Some(IotTarget::Device(_))));
        assert!(reg.target(0o023).is_none());
    }

    #[test]
    fn display_claims_route_as_display() {
        let mut reg = IotRegistry::new();
        reg.claim_for_display(&[0o003, 0o012]);
        assert!(matches!(reg.target(0o003), Some(IotTarget::Display)));
    }

    #[test]
    #[should_panic(expected = "Duplicate IOT claim")]
    fn duplicate_code_panics() {
        let mut reg = IotRegistry::new();
        reg.register(Arc::new(Mutex::new(StubDevice(&[0o021]))));
        reg.register(Arc::new(Mutex::new(StubDevice(&[0o021]))));
    }
}

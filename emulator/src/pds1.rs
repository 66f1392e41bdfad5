use std::sync::{Arc, Mutex};

use common::constants::*;

use crate::breakpoints::{BreakpointQuery, NoBreakpoints};
use crate::console::{Console, NullConsole};
use crate::display_processor::DisplayProcessor;
use crate::error::EmuError;
use crate::io::keyboard::Keyboard;
use crate::io::tape_reader::PaperTapeReader;
use crate::io::teletype::{StdoutTty, Teletype, Tty};
use crate::io::{IotDevice, IotRegistry, Peripherals};
use crate::memory::Memory;
use crate::processor::{CpuState, Processor, ProcessorState};

// The assembled machine: both processors, core, the I/O bus, and the
// stock peripherals, stepped cooperatively from a single caller.
pub struct Pds1 {
    main: Processor,
    display: DisplayProcessor,
    mem: Memory,
    devices: IotRegistry,
    peripherals: Peripherals,
    console: Arc<dyn Console>,
    breakpoints: Arc<dyn BreakpointQuery>,
    display_interleave: usize,
}

impl Pds1 {
    pub fn new() -> Self {
        Self::with_console(Arc::new(NullConsole))
    }

    pub fn with_console(console: Arc<dyn Console>) -> Self {
        Self::with_console_and_tty(console, Arc::new(StdoutTty))
    }

    pub fn with_console_and_tty(console: Arc<dyn Console>, tty: Arc<dyn Tty>) -> Self {
        let mut devices = IotRegistry::new();
        devices.claim_for_display(DISPLAY_IOT_CODES);

        let peripherals = Peripherals::new(tty);
        peripherals.register_all(&mut devices);

        Pds1{
            main: Processor::new(),
            display: DisplayProcessor::new(),
            mem: Memory::new(),
            devices,
            peripherals,
            console,
            breakpoints: Arc::new(NoBreakpoints),
            display_interleave: 2,
        }
    }

    // Core size is fixed at construction; addresses wrap at the boundary.
    pub fn with_memory_words(words: usize) -> Self {
        let mut pds = Self::new();
        pds.mem = Memory::with_words(words);
        pds
    }

    pub fn set_breakpoints(&mut self, breakpoints: Arc<dyn BreakpointQuery>) {
        self.breakpoints = breakpoints;
    }

    // Main processor steps per display step during run.
    pub fn set_display_interleave(&mut self, steps: usize) {
        assert!(steps > 0, "display interleave must be at least one");
        self.display_interleave = steps;
    }

    pub fn register_device(&mut self, dev: Arc<Mutex<dyn IotDevice>>) {
        self.devices.register(dev);
    }

    pub fn load_image(&mut self, words: &[u16], base: u16) {
        self.mem.load_image(words, base);
    }

    pub fn load_tape(&mut self, tape: Vec<u8>) {
        self.peripherals.reader.lock().unwrap().load_tape(tape);
    }

    pub fn reset(&mut self) {
        self.main.reset();
        self.display.reset(self.console.as_ref());
        self.mem.reset();
        self.devices.reset_all();
    }

    pub fn step_main(&mut self) -> Result<ProcessorState, EmuError> {
        self.main.step(
            &mut self.mem,
            &mut self.display,
            &self.devices,
            &self.peripherals,
            self.breakpoints.as_ref(),
            self.console.as_ref(),
        )
    }

    pub fn step_display(&mut self) -> ProcessorState {
        self.display
            .step(&mut self.mem, self.console.as_ref(), self.breakpoints.as_ref())
    }

    // Run until the main processor stops, interleaving display steps. A
    // display breakpoint stops the run too; a plain display halt is the
    // normal idle state and does not.
    pub fn run(&mut self) -> Result<ProcessorState, EmuError> {
        loop {
            for _ in 0..self.display_interleave {
                let state = self.step_main()?;
                if !state.is_running() {
                    return Ok(state);
                }
            }
            if self.step_display().is_breakpoint_halt() {
                return Ok(ProcessorState::BreakpointHalt);
            }
        }
    }

    pub fn run_at(&mut self, pc: u16) -> Result<ProcessorState, EmuError> {
        self.main.start_at(pc);
        self.run()
    }

    // Bounded variant of run.
    pub fn run_steps(&mut self, steps: usize) -> Result<ProcessorState, EmuError> {
        let mut state = self.main.cpu().state();
        for n in 0..steps {
            state = self.step_main()?;
            if !state.is_running() {
                break;
            }
            if (n + 1) % self.display_interleave == 0
                && self.step_display().is_breakpoint_halt()
            {
                state = ProcessorState::BreakpointHalt;
                break;
            }
        }
        Ok(state)
    }

    // Step only the display, at most `steps` times; the main processor
    // usually halts with a frame still in flight.
    pub fn run_display(&mut self, steps: usize) -> ProcessorState {
        let mut state = self.display.state();
        for _ in 0..steps {
            state = self.step_display();
            if !state.is_running() {
                break;
            }
        }
        state
    }

    pub fn main(&self) -> &Processor {
        &self.main
    }

    pub fn main_mut(&mut self) -> &mut Processor {
        &mut self.main
    }

    pub fn cpu(&self) -> &CpuState {
        self.main.cpu()
    }

    pub fn cpu_mut(&mut self) -> &mut CpuState {
        self.main.cpu_mut()
    }

    pub fn display(&self) -> &DisplayProcessor {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut DisplayProcessor {
        &mut self.display
    }

    pub fn mem(&self) -> &Memory {
        &self.mem
    }

    pub fn mem_mut(&mut self) -> &mut Memory {
        &mut self.mem
    }

    pub fn keyboard(&self) -> Arc<Mutex<Keyboard>> {
        self.peripherals.keyboard.clone()
    }

    pub fn teletype(&self) -> Arc<Mutex<Teletype>> {
        self.peripherals.teletype.clone()
    }

    pub fn reader(&self) -> Arc<Mutex<PaperTapeReader>> {
        self.peripherals.reader.clone()
    }
}

impl Default for Pds1 {
    fn default() -> Self {
        Self::new()
    }
}

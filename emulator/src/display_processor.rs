use common::constants::*;
use common::display::*;

use log::{debug, warn};

use crate::breakpoints::{BreakpointKind, BreakpointQuery};
use crate::console::{Console, DrawingStyle};
use crate::error::EmuError;
use crate::memory::Memory;
use crate::processor::{CpuState, ProcessorState};

// The display interpreter. It walks a display list in core, keeping the
// beam position in a pair of 11-bit coordinate registers, and reports
// every movement to the console. Increment mode consumes the captured
// word half by half across step calls, so single-stepping stays exact.
pub struct DisplayProcessor {
    state: ProcessorState,
    pc: u16,
    entry_addr: u16,
    block: u16,
    x: u16,
    y: u16,
    scale: f32,
    mode: DisplayMode,
    inc_word: u16,
    inc_half: Half,
    stack: Vec<u16>,
    sgr_enter: bool,
    sgr_return_on_load: bool,
    sgr_beam_on: bool,
    cycles_per_frame: usize,
    frame_cycles: usize,
    frame_latch: bool,
    breakpoint_addr: Option<u16>,
}

impl DisplayProcessor {
    pub fn new() -> Self {
        DisplayProcessor{
            state: ProcessorState::Halted,
            pc: 0,
            entry_addr: 0,
            block: 0,
            x: 0,
            y: 0,
            scale: 1.0,
            mode: DisplayMode::Processor,
            inc_word: 0,
            inc_half: Half::First,
            stack: vec![],
            sgr_enter: false,
            sgr_return_on_load: false,
            sgr_beam_on: false,
            cycles_per_frame: DEFAULT_CYCLES_PER_FRAME,
            frame_cycles: 0,
            frame_latch: false,
            breakpoint_addr: None,
        }
    }

    pub fn state(&self) -> ProcessorState {
        self.state
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    pub fn x(&self) -> u16 {
        self.x
    }

    pub fn y(&self) -> u16 {
        self.y
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn block(&self) -> u16 {
        self.block
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    pub fn frame_latch(&self) -> bool {
        self.frame_latch
    }

    // Where the last DLA pointed. Not used for execution, only reporting.
    pub fn entry_addr(&self) -> u16 {
        self.entry_addr
    }

    pub fn breakpoint_addr(&self) -> Option<u16> {
        self.breakpoint_addr
    }

    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    pub fn set_cycles_per_frame(&mut self, cycles: usize) {
        self.cycles_per_frame = cycles;
    }

    pub fn start_at(&mut self, pc: u16) {
        self.pc = pc;
        self.mode = DisplayMode::Processor;
        self.state = ProcessorState::Running;
        self.breakpoint_addr = None;
    }

    pub fn resume(&mut self) {
        self.state = ProcessorState::Running;
        self.breakpoint_addr = None;
    }

    pub fn reset(&mut self, console: &dyn Console) {
        let cycles = self.cycles_per_frame;
        *self = Self::new();
        self.cycles_per_frame = cycles;
        console.move_absolute(0, 0, DrawingStyle::Off);
    }

    // One display cycle. The frame counter runs whether or not the
    // processor does.
    pub fn step(
        &mut self,
        mem: &mut Memory,
        console: &dyn Console,
        breakpoints: &dyn BreakpointQuery,
    ) -> ProcessorState {
        self.count_frame(console);

        if !self.state.is_running() {
            return self.state;
        }

        if self.mode.is_increment() {
            self.step_increment(mem, console, breakpoints);
        } else {
            self.step_processor(mem, console, breakpoints);
        }

        self.state
    }

    fn count_frame(&mut self, console: &dyn Console) {
        self.frame_cycles += 1;
        if self.frame_cycles >= self.cycles_per_frame {
            self.frame_cycles = 0;
            self.frame_latch = true;
            console.frame_done();
        }
    }

    fn step_processor(
        &mut self,
        mem: &mut Memory,
        console: &dyn Console,
        breakpoints: &dyn BreakpointQuery,
    ) {
        let pc = self.pc;
        let ins = mem.display_ins(pc, DisplayMode::Processor);
        debug!("DPC 0o{:o}: {}", pc, ins);

        match ins {
            DIns::Dopr(dopr) => self.exec_dopr(dopr, console),
            DIns::Dlxa(dlxa) => {
                self.x = dlxa.value();
                self.finish_load(console);
            }
            DIns::Dlya(dlya) => {
                self.y = dlya.value();
                self.finish_load(console);
            }
            DIns::Deim(deim) => {
                // The low half of the word itself is the first datum, so
                // the PC stays put until that half is exhausted. Skip the
                // post-execute check here: the DPC has not moved, and a
                // breakpoint on this word already halted us before it ran.
                // advance_half covers the next word boundary.
                self.mode = DisplayMode::Increment;
                self.inc_word = deim.word();
                self.inc_half = Half::Second;
                return;
            }
            DIns::Djmp(djmp) => self.pc = djmp.target(self.block),
            DIns::Djms(djms) => {
                self.stack.push(pc.wrapping_add(1));
                self.pc = djms.target(self.block);
            }
            DIns::Dlvh(_) => self.exec_dlvh(pc, mem, console),
            DIns::Sgr(sgr) => {
                self.sgr_enter = sgr.enter();
                self.sgr_return_on_load = sgr.return_on_load();
                self.sgr_beam_on = sgr.beam_on();
                self.pc = pc.wrapping_add(1);
            }
        }

        self.check_breakpoint(breakpoints);
    }

    // A coordinate load positions the beam. Under the graphics extension
    // it can also draw on the way and return from a subroutine.
    fn finish_load(&mut self, console: &dyn Console) {
        let style = if self.sgr_enter && self.sgr_beam_on {
            DrawingStyle::Extended
        } else {
            DrawingStyle::Off
        };
        console.move_absolute(self.x, self.y, style);

        let next = self.pc.wrapping_add(1);
        self.pc = if self.sgr_enter && self.sgr_return_on_load {
            self.pop_return(next)
        } else {
            next
        };
    }

    fn exec_dopr(&mut self, ins: DoprIns, console: &dyn Console) {
        let mut next = self.pc.wrapping_add(1);

        if ins.has(DoprIns::DSYN) {
            console.move_absolute(self.x, self.y, DrawingStyle::Off);
        }
        if ins.has(DoprIns::DIXM) {
            self.x = self.x.wrapping_add(COORD_MSB_STEP) & COORD_MASK;
            console.move_absolute(self.x, self.y, DrawingStyle::Off);
        }
        if ins.has(DoprIns::DIYM) {
            self.y = self.y.wrapping_add(COORD_MSB_STEP) & COORD_MASK;
            console.move_absolute(self.x, self.y, DrawingStyle::Off);
        }
        if ins.has(DoprIns::DDXM) {
            self.x = self.x.wrapping_sub(COORD_MSB_STEP) & COORD_MASK;
            console.move_absolute(self.x, self.y, DrawingStyle::Off);
        }
        if ins.has(DoprIns::DDYM) {
            self.y = self.y.wrapping_sub(COORD_MSB_STEP) & COORD_MASK;
            console.move_absolute(self.x, self.y, DrawingStyle::Off);
        }
        if ins.has(DoprIns::DRJM) {
            next = self.pop_return(next);
        }
        if ins.has(DoprIns::DDSP) {
            console.draw_point(self.x, self.y);
        }

        match ins.func() {
            DoprFunc::Nop => {}
            DoprFunc::Dsts => {
                self.scale = if ins.n() == 0 { 1.0 } else { ins.n() as f32 };
            }
            DoprFunc::Dstb => self.block = ins.n() * PAGE_WORDS,
            DoprFunc::Dlpn => warn!("light pen sensitize is not implemented"),
        }

        if ins.halts() {
            debug!("display processor halted at 0o{:o}", self.pc);
            self.state = ProcessorState::Halted;
        }

        self.pc = next;
    }

    fn exec_dlvh(&mut self, pc: u16, mem: &mut Memory, console: &dyn Console) {
        // The two data words ride along undecoded.
        let words = DlvhWords{
            w1: mem.fetch(pc.wrapping_add(1)),
            w2: mem.fetch(pc.wrapping_add(2)),
        };

        let m = self.scale_mag(words.m());
        let n = self.scale_mag(words.n());
        let (x_mag, y_mag) = if words.dy_greater() { (n, m) } else { (m, n) };

        let dx = if words.neg_x() { -x_mag } else { x_mag };
        let dy = if words.neg_y() { -y_mag } else { y_mag };
        self.apply_delta(dx, dy);

        let style = if !words.beam_on() {
            DrawingStyle::Off
        } else if words.dotted() {
            DrawingStyle::Dotted
        } else {
            DrawingStyle::Normal
        };
        console.move_absolute(self.x, self.y, style);

        self.pc = pc.wrapping_add(DlvhIns::LEN);
    }

    fn step_increment(
        &mut self,
        mem: &mut Memory,
        console: &dyn Console,
        breakpoints: &dyn BreakpointQuery,
    ) {
        let half = self.inc_half.of(self.inc_word);

        match IncHalf::classify(half) {
            IncHalf::Vector(vec) => {
                let dx = self.scale_mag(vec.x_mag());
                let dy = self.scale_mag(vec.y_mag());
                self.apply_delta(
                    if vec.neg_x() { -dx } else { dx },
                    if vec.neg_y() { -dy } else { dy },
                );

                let style = if vec.beam_on() {
                    DrawingStyle::Normal
                } else {
                    DrawingStyle::Off
                };
                console.move_absolute(self.x, self.y, style);
                self.advance_half(mem, breakpoints);
            }
            IncHalf::Control(ctl) => {
                if ctl.x_msb_inc() {
                    self.x = self.x.wrapping_add(COORD_MSB_STEP) & COORD_MASK;
                }
                if ctl.x_lsb_clear() {
                    self.x &= !COORD_LSB_MASK;
                }
                if ctl.y_msb_inc() {
                    self.y = self.y.wrapping_add(COORD_MSB_STEP) & COORD_MASK;
                }
                if ctl.y_lsb_clear() {
                    self.y &= !COORD_LSB_MASK;
                }
                if ctl.moves_beam() {
                    console.move_absolute(self.x, self.y, DrawingStyle::Off);
                }

                if ctl.escape() {
                    self.mode = DisplayMode::Processor;
                    let next = self.pc.wrapping_add(1);
                    self.pc = if ctl.return_on_escape() {
                        self.pop_return(next)
                    } else {
                        next
                    };
                    self.check_breakpoint(breakpoints);
                } else {
                    self.advance_half(mem, breakpoints);
                }
            }
        }
    }

    // Move to the next half, fetching a fresh word past the second one.
    // The breakpoint check runs at word boundaries only, after the fetch,
    // so a resume picks up at the first half of the new word.
    fn advance_half(&mut self, mem: &mut Memory, breakpoints: &dyn BreakpointQuery) {
        match self.inc_half {
            Half::First => self.inc_half = Half::Second,
            Half::Second => {
                self.pc = self.pc.wrapping_add(1);
                let ins = mem.display_ins(self.pc, DisplayMode::Increment);
                self.inc_word = ins.word();
                self.inc_half = Half::First;
                self.check_breakpoint(breakpoints);
            }
        }
    }

    // Magnitudes are scaled, then doubled into the 11-bit coordinate space.
    fn scale_mag(&self, mag: u16) -> i32 {
        ((mag as f32 * self.scale) as i32) << 1
    }

    fn apply_delta(&mut self, dx: i32, dy: i32) {
        self.x = (self.x as i32 + dx) as u16 & COORD_MASK;
        self.y = (self.y as i32 + dy) as u16 & COORD_MASK;
    }

    fn pop_return(&mut self, next: u16) -> u16 {
        match self.stack.pop() {
            Some(addr) => addr,
            None => {
                warn!("display return with an empty stack at 0o{:o}", self.pc);
                next
            }
        }
    }

    fn check_breakpoint(&mut self, breakpoints: &dyn BreakpointQuery) {
        if self.state.is_running() && breakpoints.test(BreakpointKind::Display, self.pc) {
            debug!("display breakpoint at 0o{:o}", self.pc);
            self.breakpoint_addr = Some(self.pc);
            self.state = ProcessorState::BreakpointHalt;
        }
    }

    pub fn handled_codes(&self) -> &'static [u16] {
        DISPLAY_IOT_CODES
    }

    pub fn execute_iot(&mut self, code: u16, cpu: &mut CpuState) -> Result<(), EmuError> {
        match code {
            IOT_DLA => {
                let addr = cpu.ac();
                self.pc = addr;
                self.entry_addr = addr;
                self.block = addr & PAGE_MASK;
                self.mode = DisplayMode::Processor;
                Ok(())
            }
            IOT_DOF => {
                self.state = ProcessorState::Halted;
                Ok(())
            }
            IOT_SCF => {
                self.frame_latch = false;
                Ok(())
            }
            IOT_DON => {
                self.resume();
                Ok(())
            }
            _ => Err(EmuError::UnimplementedIot{code}),
        }
    }
}

impl Default for DisplayProcessor {
    fn default() -> Self {
        Self::new()
    }
}

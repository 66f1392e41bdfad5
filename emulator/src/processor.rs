use common::asm::*;
use common::constants::*;

use derive_more::IsVariant;
use log::{debug, warn};

use crate::breakpoints::{BreakpointKind, BreakpointQuery};
use crate::console::Console;
use crate::display_processor::DisplayProcessor;
use crate::error::EmuError;
use crate::io::{IotRegistry, IotTarget, Peripherals};
use crate::memory::Memory;

#[derive(Debug, Clone, Copy, PartialEq, Eq, IsVariant)]
pub enum ProcessorState {
    Halted,
    Running,
    BreakpointHalt,
}

// The externally visible pipeline position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IsVariant)]
pub enum ExecState {
    Fetch,
    Defer,
    Execute,
}

// Registers and run state, separate from the interpreter so IOT devices
// can borrow it mutably mid-step.
pub struct CpuState {
    pc: u16,
    ac: u16,
    link: bool,
    ds: u16,
    state: ProcessorState,
    breakpoint_addr: Option<u16>,
}

impl CpuState {
    fn new() -> Self {
        CpuState{
            pc: BOOTSTRAP_ADDR,
            ac: 0,
            link: false,
            ds: 0,
            state: ProcessorState::Halted,
            breakpoint_addr: None,
        }
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    pub fn set_pc(&mut self, pc: u16) {
        self.pc = pc;
    }

    pub fn ac(&self) -> u16 {
        self.ac
    }

    pub fn set_ac(&mut self, ac: u16) {
        self.ac = ac;
    }

    // IOT read pulses or into AC rather than replacing it.
    pub fn or_ac(&mut self, val: u16) {
        self.ac |= val;
    }

    pub fn link(&self) -> bool {
        self.link
    }

    pub fn set_link(&mut self, link: bool) {
        self.link = link;
    }

    pub fn ds(&self) -> u16 {
        self.ds
    }

    pub fn set_ds(&mut self, ds: u16) {
        self.ds = ds;
    }

    pub fn state(&self) -> ProcessorState {
        self.state
    }

    pub fn halt(&mut self) {
        self.state = ProcessorState::Halted;
    }

    pub fn breakpoint_addr(&self) -> Option<u16> {
        self.breakpoint_addr
    }
}

// One pipeline cycle. Defer and Execute carry the latched order along so
// a step never has to re-decode.
#[derive(Clone, Copy)]
enum Cycle {
    Fetch,
    Defer { ins: MemRefIns },
    Execute { ins: MemRefIns, addr: u16 },
}

pub struct Processor {
    state: CpuState,
    cycle: Cycle,
}

impl Processor {
    pub fn new() -> Self {
        Processor{state: CpuState::new(), cycle: Cycle::Fetch}
    }

    pub fn cpu(&self) -> &CpuState {
        &self.state
    }

    pub fn cpu_mut(&mut self) -> &mut CpuState {
        &mut self.state
    }

    pub fn exec_state(&self) -> ExecState {
        match self.cycle {
            Cycle::Fetch => ExecState::Fetch,
            Cycle::Defer{..} => ExecState::Defer,
            Cycle::Execute{..} => ExecState::Execute,
        }
    }

    pub fn reset(&mut self) {
        let ds = self.state.ds;
        self.state = CpuState::new();
        self.state.ds = ds;
        self.state.state = ProcessorState::Running;
        self.cycle = Cycle::Fetch;
    }

    pub fn start_at(&mut self, pc: u16) {
        self.state.pc = pc;
        self.state.state = ProcessorState::Running;
        self.state.breakpoint_addr = None;
        self.cycle = Cycle::Fetch;
    }

    pub fn resume(&mut self) {
        self.state.state = ProcessorState::Running;
        self.state.breakpoint_addr = None;
    }

    // One pipeline cycle: a fetch, a defer, or an execute. Operate-class
    // words and IOTs have no memory operand and complete during fetch.
    pub fn step(
        &mut self,
        mem: &mut Memory,
        display: &mut DisplayProcessor,
        devices: &IotRegistry,
        peripherals: &Peripherals,
        breakpoints: &dyn BreakpointQuery,
        console: &dyn Console,
    ) -> Result<ProcessorState, EmuError> {
        if !self.state.state.is_running() {
            return Ok(self.state.state);
        }

        if console.data_switch_mapping_enabled() {
            self.state.ds = console.data_switches();
        }

        devices.tick_all();

        match self.cycle {
            Cycle::Fetch => self.fetch(mem, display, devices, peripherals, breakpoints)?,
            Cycle::Defer{ins} => self.defer(ins, mem),
            Cycle::Execute{ins, addr} => self.execute(ins, addr, mem, breakpoints),
        }

        Ok(self.state.state)
    }

    fn fetch(
        &mut self,
        mem: &mut Memory,
        display: &mut DisplayProcessor,
        devices: &IotRegistry,
        peripherals: &Peripherals,
        breakpoints: &dyn BreakpointQuery,
    ) -> Result<(), EmuError> {
        let pc = self.state.pc;
        let ins = mem.main_ins(pc)?;
        debug!("PC 0o{:o}: {}", pc, ins.display_with_pc(pc));

        match ins {
            Ins::Opr(opr) => {
                self.exec_opr(opr);
                self.finish(pc.wrapping_add(1), breakpoints);
            }
            Ins::Shift(shift) => {
                self.exec_shift(shift, display);
                self.finish(pc.wrapping_add(1), breakpoints);
            }
            Ins::Skip(skip) => {
                let taken = self.eval_skip(skip, display, peripherals);
                let next = pc.wrapping_add(if taken { 2 } else { 1 });
                self.finish(next, breakpoints);
            }
            Ins::Iot(iot) => {
                self.exec_iot(iot, display, devices)?;
                self.finish(pc.wrapping_add(1), breakpoints);
            }
            Ins::MemRef(mr) => match mr.op {
                MemRefOpcode::Law => {
                    self.state.ac = mr.operand;
                    self.finish(pc.wrapping_add(1), breakpoints);
                }
                MemRefOpcode::Lwc => {
                    self.state.ac = mr.operand.wrapping_neg();
                    self.finish(pc.wrapping_add(1), breakpoints);
                }
                _ if mr.indirect => self.cycle = Cycle::Defer{ins: mr},
                _ => self.cycle = Cycle::Execute{ins: mr, addr: mr.ea(pc)},
            },
        }

        Ok(())
    }

    // The deferred cycle: step an auto-index cell, then read the pointer.
    fn defer(&mut self, ins: MemRefIns, mem: &mut Memory) {
        let ptr_addr = ins.ea(self.state.pc);

        let offset = ptr_addr & OPERAND_MASK;
        if (AUTO_INDEX_FIRST..=AUTO_INDEX_LAST).contains(&offset) {
            let bumped = mem.fetch(ptr_addr).wrapping_add(1);
            mem.store(ptr_addr, bumped);
        }

        let addr = mem.fetch(ptr_addr);
        self.cycle = Cycle::Execute{ins, addr};
    }

    fn execute(
        &mut self,
        ins: MemRefIns,
        addr: u16,
        mem: &mut Memory,
        breakpoints: &dyn BreakpointQuery,
    ) {
        use MemRefOpcode::*;

        let pc = self.state.pc;
        let mut next = pc.wrapping_add(1);

        match ins.op {
            Law | Lwc => unreachable!("immediates complete during fetch"),
            Jmp => next = addr,
            Jms => {
                if self.data_breakpoint(BreakpointKind::Write, addr, breakpoints) {
                    return;
                }
                mem.store(addr, pc.wrapping_add(1));
                next = addr.wrapping_add(1);
            }
            Dac => {
                if self.data_breakpoint(BreakpointKind::Write, addr, breakpoints) {
                    return;
                }
                mem.store(addr, self.state.ac);
            }
            Xam => {
                if self.data_breakpoint(BreakpointKind::Read, addr, breakpoints)
                    || self.data_breakpoint(BreakpointKind::Write, addr, breakpoints)
                {
                    return;
                }
                let tmp = mem.fetch(addr);
                mem.store(addr, self.state.ac);
                self.state.ac = tmp;
            }
            Isz => {
                if self.data_breakpoint(BreakpointKind::Read, addr, breakpoints)
                    || self.data_breakpoint(BreakpointKind::Write, addr, breakpoints)
                {
                    return;
                }
                let val = mem.fetch(addr).wrapping_add(1);
                mem.store(addr, val);
                if val == 0 {
                    next = pc.wrapping_add(2);
                }
            }
            And => {
                if self.data_breakpoint(BreakpointKind::Read, addr, breakpoints) {
                    return;
                }
                self.state.ac &= mem.fetch(addr);
            }
            Ior => {
                if self.data_breakpoint(BreakpointKind::Read, addr, breakpoints) {
                    return;
                }
                self.state.ac |= mem.fetch(addr);
            }
            Xor => {
                if self.data_breakpoint(BreakpointKind::Read, addr, breakpoints) {
                    return;
                }
                self.state.ac ^= mem.fetch(addr);
            }
            Lac => {
                if self.data_breakpoint(BreakpointKind::Read, addr, breakpoints) {
                    return;
                }
                self.state.ac = mem.fetch(addr);
            }
            Add => {
                if self.data_breakpoint(BreakpointKind::Read, addr, breakpoints) {
                    return;
                }
                let (sum, carry) = self.state.ac.overflowing_add(mem.fetch(addr));
                if carry {
                    self.state.link = !self.state.link;
                }
                self.state.ac = sum;
            }
            Sub => {
                if self.data_breakpoint(BreakpointKind::Read, addr, breakpoints) {
                    return;
                }
                let (diff, borrow) = self.state.ac.overflowing_sub(mem.fetch(addr));
                if borrow {
                    self.state.link = !self.state.link;
                }
                self.state.ac = diff;
            }
            Sam => {
                if self.data_breakpoint(BreakpointKind::Read, addr, breakpoints) {
                    return;
                }
                if mem.fetch(addr) == self.state.ac {
                    next = pc.wrapping_add(2);
                }
            }
        }

        self.finish(next, breakpoints);
    }

    // Micro ops in their three timing phases; the order is what makes
    // cla+iac load one while cma+iac negates.
    fn exec_opr(&mut self, ins: OprIns) {
        if ins.has(OprIns::CLA) {
            self.state.ac = 0;
        }
        if ins.has(OprIns::CLL) {
            self.state.link = false;
        }

        if ins.has(OprIns::CMA) {
            self.state.ac = !self.state.ac;
        }
        if ins.has(OprIns::CML) {
            self.state.link = !self.state.link;
        }

        if ins.has(OprIns::IAC) {
            let (ac, carry) = self.state.ac.overflowing_add(1);
            if carry {
                self.state.link = !self.state.link;
            }
            self.state.ac = ac;
        }
        if ins.has(OprIns::ODA) {
            self.state.ac |= self.state.ds;
        }

        if ins.halts() {
            debug!("main processor halted at 0o{:o}", self.state.pc);
            self.state.state = ProcessorState::Halted;
        }
    }

    fn exec_shift(&mut self, ins: ShiftIns, display: &mut DisplayProcessor) {
        if ins.display_on() {
            display.resume();
        }

        for _ in 0..ins.count() {
            match (ins.arithmetic(), ins.right()) {
                (false, false) => {
                    let out = self.state.ac & 0o100000 != 0;
                    self.state.ac = (self.state.ac << 1) | self.state.link as u16;
                    self.state.link = out;
                }
                (false, true) => {
                    let out = self.state.ac & 1 != 0;
                    self.state.ac = (self.state.ac >> 1) | ((self.state.link as u16) << 15);
                    self.state.link = out;
                }
                // Arithmetic shifts keep the sign and never touch the link.
                (true, false) => {
                    self.state.ac =
                        (self.state.ac & 0o100000) | ((self.state.ac << 1) & 0o077777);
                }
                (true, true) => {
                    self.state.ac = ((self.state.ac as i16) >> 1) as u16;
                }
            }
        }
    }

    // Each set condition bit overwrites the decision; the hardware latches
    // them in bit order rather than or-ing them.
    fn eval_skip(
        &self,
        ins: SkipIns,
        display: &DisplayProcessor,
        peripherals: &Peripherals,
    ) -> bool {
        let conds = ins.conds();
        let mut skip = false;

        if conds & SkipIns::ASZ != 0 {
            skip = self.state.ac == 0;
        }
        if conds & SkipIns::ASP != 0 {
            skip = self.state.ac & 0o100000 == 0;
        }
        if conds & SkipIns::LSZ != 0 {
            skip = !self.state.link;
        }
        if conds & SkipIns::DSF != 0 {
            skip = display.state().is_running();
        }
        if conds & SkipIns::KSF != 0 {
            skip = peripherals.keyboard.lock().unwrap().key_ready();
        }
        if conds & SkipIns::RSF != 0 {
            skip = peripherals.teletype.lock().unwrap().rx_ready();
        }
        if conds & SkipIns::TSF != 0 {
            skip = peripherals.teletype.lock().unwrap().tx_done();
        }
        if conds & SkipIns::SSF != 0 {
            skip = display.frame_latch();
        }
        if conds & SkipIns::HSF != 0 {
            skip = peripherals.reader.lock().unwrap().tape_ready();
        }

        if ins.negate() { !skip } else { skip }
    }

    fn exec_iot(
        &mut self,
        ins: IotIns,
        display: &mut DisplayProcessor,
        devices: &IotRegistry,
    ) -> Result<(), EmuError> {
        let code = ins.code();

        // Paper-tape bootstraps issue this one; the hardware ignores it.
        if code == IOT_IGNORED {
            return Ok(());
        }

        match devices.target(code) {
            Some(IotTarget::Display) => display.execute_iot(code, &mut self.state),
            Some(IotTarget::Device(dev)) => {
                dev.lock().unwrap().execute_iot(code, &mut self.state)
            }
            None => {
                warn!("IOT 0o{:o} has no registered device", code);
                Ok(())
            }
        }
    }

    fn data_breakpoint(
        &mut self,
        kind: BreakpointKind,
        addr: u16,
        breakpoints: &dyn BreakpointQuery,
    ) -> bool {
        if breakpoints.test(kind, addr) {
            debug!("{:?} breakpoint at 0o{:o}", kind, addr);
            self.state.breakpoint_addr = Some(addr);
            self.state.state = ProcessorState::BreakpointHalt;
            return true;
        }
        false
    }

    fn finish(&mut self, next_pc: u16, breakpoints: &dyn BreakpointQuery) {
        self.state.pc = next_pc;
        self.cycle = Cycle::Fetch;

        if self.state.state.is_running()
            && breakpoints.test(BreakpointKind::Execution, next_pc)
        {
            debug!("execution breakpoint at 0o{:o}", next_pc);
            self.state.breakpoint_addr = Some(next_pc);
            self.state.state = ProcessorState::BreakpointHalt;
        }
    }
}

impl Default for Processor {
    fn default() -> Self {
        Self::new()
    }
}

use std::sync::{Arc, Mutex};

use emu_lib::io::teletype::PipeTty;
use emu_lib::{CpuState, EmuError, IotDevice, NullConsole, Pds1, ProcessorState};

use crate::helpers::START;

// Captures AC whenever its code fires.
struct LatchDevice {
    val: u16,
}

impl IotDevice for LatchDevice {
    fn handled_codes(&self) -> &'static [u16] {
        &[0o011]
    }

    fn execute_iot(&mut self, _code: u16, cpu: &mut CpuState) -> Result<(), EmuError> {
        self.val = cpu.ac();
        Ok(())
    }
}

#[test]
fn keyboard_echoes_to_the_teletype() {
    let tty = Arc::new(PipeTty::default());
    let mut pds = Pds1::with_console_and_tty(Arc::new(NullConsole), tty.clone());
    pds.keyboard().lock().unwrap().type_str("abc");

    let mut prog = vec![
        0o002020, // ksf
        0o011000, // jmp 0o1000
        0o100001, // cla
        0o001023, // krc
        0o001043, // tpc
        0o002100, // tsf
        0o011005, // jmp 0o1005
        0o031030, // isz 0o1030
        0o011000, // jmp 0o1000
        0o000000, // hlt
    ];
    prog.resize(0o30, 0);
    prog.push(0o177775); // three characters
    pds.load_image(&prog, START);

    pds.main_mut().start_at(START);
    let state = pds.run_steps(1_000_000).unwrap();
    assert_eq!(state, ProcessorState::Halted);
    assert_eq!(tty.take_output_string(), "abc");
}

#[test]
fn teletype_receive_reads_piped_input() {
    let tty = Arc::new(PipeTty::default());
    let mut pds = Pds1::with_console_and_tty(Arc::new(NullConsole), tty.clone());
    tty.write_input(b"Z");

    pds.load_image(
        &[
            0o002040, // rsf
            0o011000, // jmp 0o1000
            0o100001, // cla
            0o001033, // rrc
            0o000000, // hlt
        ],
        START,
    );

    pds.main_mut().start_at(START);
    let state = pds.run_steps(10_000).unwrap();
    assert_eq!(state, ProcessorState::Halted);
    assert_eq!(pds.cpu().ac(), u16::from(b'Z'));
}

#[test]
fn paper_tape_frames_arrive_with_the_motor_on() {
    let mut pds = Pds1::new();
    pds.load_tape(vec![0o012, 0o345]);

    pds.load_image(
        &[
            0o001061, // hon
            0o002400, // hsf
            0o011001, // jmp 0o1001
            0o100001, // cla
            0o001051, // hrb
            0o021030, // dac 0o1030
            0o002400, // hsf
            0o011006, // jmp 0o1006
            0o100001, // cla
            0o001051, // hrb
            0o021031, // dac 0o1031
            0o001052, // hof
            0o000000, // hlt
        ],
        START,
    );

    pds.main_mut().start_at(START);
    let state = pds.run_steps(100_000).unwrap();
    assert_eq!(state, ProcessorState::Halted);
    assert_eq!(pds.mem().fetch(0o1030), 0o012);
    assert_eq!(pds.mem().fetch(0o1031), 0o345);
    assert_eq!(pds.reader().lock().unwrap().frames_left(), 0);
}

#[test]
fn a_custom_device_joins_the_bus() {
    let latch = Arc::new(Mutex::new(LatchDevice{val: 0}));
    let mut pds = Pds1::new();
    pds.register_device(latch.clone());

    pds.load_image(
        &[
            0o004123, // law 0o123
            0o001011, // iot 0o11
            0o000000, // hlt
        ],
        START,
    );

    pds.run_at(START).unwrap();
    assert_eq!(latch.lock().unwrap().val, 0o123);
}

use std::sync::Arc;

use emu_lib::{BreakpointKind, BreakpointSet, Pds1, ProcessorState};

use crate::helpers::START;

#[test]
fn write_breakpoint_guards_the_store() {
    let breakpoints = Arc::new(BreakpointSet::new());
    breakpoints.add(BreakpointKind::Write, 0o1020);

    let mut pds = Pds1::new();
    pds.set_breakpoints(breakpoints.clone());
    pds.load_image(
        &[
            0o004123, // law 0o123
            0o021020, // dac 0o1020
            0o000000, // hlt
        ],
        START,
    );

    let state = pds.run_at(START).unwrap();
    assert_eq!(state, ProcessorState::BreakpointHalt);
    assert_eq!(pds.cpu().breakpoint_addr(), Some(0o1020));
    // The store never landed.
    assert_eq!(pds.mem().fetch(0o1020), 0);

    // The same access re-fires on resume unless the breakpoint is
    // removed first.
    breakpoints.remove(BreakpointKind::Write, 0o1020);
    pds.main_mut().resume();
    let state = pds.run().unwrap();
    assert_eq!(state, ProcessorState::Halted);
    assert_eq!(pds.mem().fetch(0o1020), 0o123);
}

#[test]
fn read_breakpoint_fires_at_the_resolved_address() {
    let breakpoints = Arc::new(BreakpointSet::new());
    breakpoints.add(BreakpointKind::Read, 0o2000);

    let mut pds = Pds1::new();
    pds.set_breakpoints(breakpoints);
    pds.load_image(
        &[
            0o161004, // lac @0o1004
            0o000000, // hlt
            0o000000,
            0o000000,
            0o002000, // pointer
        ],
        START,
    );
    pds.load_image(&[0o777], 0o2000);

    let state = pds.run_at(START).unwrap();
    assert_eq!(state, ProcessorState::BreakpointHalt);
    assert_eq!(pds.cpu().breakpoint_addr(), Some(0o2000));
    assert_eq!(pds.cpu().ac(), 0);
}

#[test]
fn pointer_reads_do_not_trip_data_breakpoints() {
    let breakpoints = Arc::new(BreakpointSet::new());
    breakpoints.add(BreakpointKind::Read, 0o1004); // the pointer cell

    let mut pds = Pds1::new();
    pds.set_breakpoints(breakpoints);
    pds.load_image(
        &[
            0o161004, // lac @0o1004
            0o000000, // hlt
            0o000000,
            0o000000,
            0o002000, // pointer
        ],
        START,
    );
    pds.load_image(&[0o777], 0o2000);

    // The defer cycle's pointer read is not a data access.
    let state = pds.run_at(START).unwrap();
    assert_eq!(state, ProcessorState::Halted);
    assert_eq!(pds.cpu().ac(), 0o777);
}

#[test]
fn a_display_breakpoint_stops_the_run() {
    let breakpoints = Arc::new(BreakpointSet::new());
    breakpoints.add(BreakpointKind::Display, 0o2001);

    let mut pds = Pds1::new();
    pds.set_breakpoints(breakpoints);
    pds.load_image(
        &[
            0o006000, // law 0o2000
            0o001003, // dla
            0o001072, // don
            0o011003, // jmp 0o1003 (spin)
        ],
        START,
    );
    pds.load_image(
        &[
            0o010040, // dlxa 0o100
            0o020040, // dlya 0o100
            0o000000, // dhlt
        ],
        0o2000,
    );

    let state = pds.run_at(START).unwrap();
    assert_eq!(state, ProcessorState::BreakpointHalt);
    assert_eq!(pds.display().state(), ProcessorState::BreakpointHalt);
    assert_eq!(pds.display().breakpoint_addr(), Some(0o2001));
    // The main processor was not the one that stopped.
    assert_eq!(pds.cpu().state(), ProcessorState::Running);
    assert_eq!(pds.display().x(), 0o100);
    assert_eq!(pds.display().y(), 0);

    pds.display_mut().resume();
    let state = pds.run_display(10);
    assert_eq!(state, ProcessorState::Halted);
    assert_eq!(pds.display().y(), 0o100);
}

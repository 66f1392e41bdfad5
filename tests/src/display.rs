use std::sync::Arc;

use emu_lib::{DrawingStyle, Pds1, ProcessorState, RecordingConsole};

use crate::helpers::START;

// A refresh loop: the display redraws its list forever while the main
// processor paces itself on the frame latch and shuts everything down
// after two frames.
#[test]
fn refresh_loop_waits_on_the_frame_latch() {
    let console = Arc::new(RecordingConsole::new());
    let mut pds = Pds1::with_console(console.clone());
    pds.display_mut().set_cycles_per_frame(8);

    let mut prog = vec![
        0o006000, // law 0o2000
        0o001003, // dla
        0o001072, // don
        0o002200, // ssf
        0o011003, // jmp 0o1003
        0o001071, // scf
        0o031030, // isz 0o1030
        0o011003, // jmp 0o1003
        0o001012, // dof
        0o000000, // hlt
    ];
    prog.resize(0o30, 0);
    prog.push(0o177776); // frame countdown: two to go
    pds.load_image(&prog, START);

    pds.load_image(
        &[
            0o010040, // dlxa 0o100
            0o020040, // dlya 0o100
            0o004020, // ddsp
            0o042000, // djmp 0o2000
        ],
        0o2000,
    );

    pds.main_mut().start_at(START);
    let state = pds.run_steps(100_000).unwrap();
    assert_eq!(state, ProcessorState::Halted);
    assert_eq!(pds.display().state(), ProcessorState::Halted);
    assert!(console.frames() >= 2);
    assert!(console.point_count() >= 1);
}

#[test]
fn main_waits_for_display_halt() {
    let mut pds = Pds1::new();
    pds.load_image(
        &[
            0o006100, // law 0o2100
            0o001003, // dla
            0o001072, // don
            0o102010, // dsn
            0o011003, // jmp 0o1003
            0o000000, // hlt
        ],
        START,
    );
    pds.load_image(&[0o000000], 0o2100); // dhlt

    pds.main_mut().start_at(START);
    let state = pds.run_steps(10_000).unwrap();
    assert_eq!(state, ProcessorState::Halted);
    assert_eq!(pds.display().state(), ProcessorState::Halted);
    assert_eq!(pds.cpu().pc(), START + 6);
}

#[test]
fn increment_vectors_draw_through_the_machine() {
    let console = Arc::new(RecordingConsole::new());
    let mut pds = Pds1::with_console(console.clone());
    pds.load_image(
        &[
            0o006000, // law 0o2000
            0o001003, // dla
            0o001072, // don
            0o000000, // hlt
        ],
        START,
    );
    pds.load_image(
        &[
            0o010040, // dlxa 0o100
            0o020040, // dlya 0o100
            0o030310, // deim; b(+1,+0)
            0o140500, // b(+0,+1); esc
            0o000000, // dhlt
        ],
        0o2000,
    );

    let state = pds.run_at(START).unwrap();
    assert_eq!(state, ProcessorState::Halted);
    let state = pds.run_display(20);
    assert_eq!(state, ProcessorState::Halted);

    assert_eq!(pds.display().x(), 0o102);
    assert_eq!(pds.display().y(), 0o102);
    assert_eq!(
        console.take_moves(),
        vec![
            (0o100, 0o000, DrawingStyle::Off),
            (0o100, 0o100, DrawingStyle::Off),
            (0o102, 0o100, DrawingStyle::Normal),
            (0o102, 0o102, DrawingStyle::Normal),
        ],
    );
}

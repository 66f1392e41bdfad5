use common::display::DisplayMode;
use disassembler::{disassemble, disassemble_display};
use emu_lib::Pds1;

use crate::helpers::{START, run_prog};

#[test]
fn live_core_disassembles_after_a_run() {
    let pds = run_prog(&[
        0o004005, // law 0o5
        0o021100, // dac 0o1100
        0o000000, // hlt
    ]);

    let words: Vec<u16> = (0..3).map(|i| pds.mem().fetch(START + i)).collect();
    let out = disassemble(&words, START);
    assert_eq!(out[0].text.as_deref(), Some("law\t0o5"));
    assert_eq!(out[1].text.as_deref(), Some("dac\t0o1100"));
    assert_eq!(out[2].text.as_deref(), Some("hlt"));
}

#[test]
fn listing_follows_execution_time_modes() {
    let mut pds = Pds1::new();
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
            0o030310, // deim; b(+1,+0)
            0o140500, // b(+0,+1); esc
            0o000000, // dhlt
        ],
        0o2000,
    );
    pds.run_at(START).unwrap();
    pds.run_display(20);

    // Words are tagged with the mode they were consumed in.
    let mem = pds.mem();
    assert_eq!(mem.display_mode_tag(0o2000), DisplayMode::Processor);
    assert_eq!(mem.display_mode_tag(0o2001), DisplayMode::Processor);
    assert_eq!(mem.display_mode_tag(0o2002), DisplayMode::Increment);
    assert_eq!(mem.display_mode_tag(0o2003), DisplayMode::Processor);
    assert_eq!(mem.display_mode_tag(0o2004), DisplayMode::Indeterminate);

    // A listing driven by the tags reads each word the way the display
    // actually consumed it.
    let lines: Vec<String> = (0o2000..0o2004)
        .map(|addr| {
            let mode = mem.display_mode_tag(addr);
            let out = disassemble_display(&[mem.fetch(addr)], addr, mode);
            out[0].text.clone().unwrap()
        })
        .collect();
    assert_eq!(
        lines,
        vec!["dlxa\t0o100", "deim\tb(+1,+0)", "inc b(+0,+1); esc", "dhlt"],
    );
}

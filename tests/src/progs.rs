use crate::helpers::{START, run_prog};

use emu_lib::Pds1;

#[test]
fn counting_loop() {
    let pds = run_prog(&[
        0o104012, // lwc 0o12
        0o021100, // dac 0o1100
        0o100001, // cla
        0o100004, // iac
        0o031100, // isz 0o1100
        0o011003, // jmp 0o1003
        0o000000, // hlt
    ]);
    assert_eq!(pds.cpu().ac(), 0o12);
    assert_eq!(pds.mem().fetch(0o1100), 0);
    assert_eq!(pds.cpu().pc(), START + 7);
}

#[test]
fn subroutine_call_and_return() {
    let mut prog = vec![0; 0o13];
    prog[0o0] = 0o004005; // law 0o5
    prog[0o1] = 0o035010; // jms 0o1010
    prog[0o2] = 0o000000; // hlt
    prog[0o10] = 0o000000; // link word
    prog[0o11] = 0o100006; // cia
    prog[0o12] = 0o111010; // jmp @0o1010

    let pds = run_prog(&prog);
    assert_eq!(pds.cpu().ac(), 0o177773); // -5
    assert_eq!(pds.cpu().pc(), START + 3);
    assert_eq!(pds.mem().fetch(0o1010), START + 2);
}

#[test]
fn table_sum_through_auto_index() {
    let mut pds = Pds1::new();
    pds.load_image(
        &[
            0o104004, // lwc 0o4
            0o021070, // dac 0o1070
            0o005077, // law 0o1077
            0o020010, // dac 0o10
            0o100001, // cla
            0o164010, // add @0o10
            0o031070, // isz 0o1070
            0o011005, // jmp 0o1005
            0o000000, // hlt
        ],
        START,
    );
    pds.load_image(&[1, 2, 3, 4], 0o1100);
    pds.run_at(START).unwrap();

    assert_eq!(pds.cpu().ac(), 0o12);
    // Four passes stepped the pointer from 0o1077 to 0o1103.
    assert_eq!(pds.mem().fetch(0o10), 0o1103);
    assert!(!pds.cpu().link());
}

#[test]
fn self_modifying_code_sees_the_patch() {
    let mut pds = Pds1::new();
    pds.load_image(
        &[
            0o031020, // isz 0o1020
            0o011003, // jmp 0o1003
            0o011011, // jmp 0o1011
            0o004111, // law 0o111, patched on the first pass
            0o021022, // dac 0o1022
            0o061021, // lac 0o1021
            0o021003, // dac 0o1003
            0o011000, // jmp 0o1000
            0o000000,
            0o000000, // hlt
        ],
        START,
    );
    pds.load_image(&[0o177775, 0o004777, 0o000000], 0o1020);
    pds.run_at(START).unwrap();

    // The second pass decoded the patched word, not a stale cached one.
    assert_eq!(pds.mem().fetch(0o1022), 0o777);
}

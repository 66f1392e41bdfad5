use emu_lib::Pds1;

pub const START: u16 = 0o1000;

pub fn run_prog(prog: &[u16]) -> Pds1 {
    let mut pds = Pds1::new();
    pds.load_image(prog, START);
    pds.run_at(START).unwrap();
    pds
}

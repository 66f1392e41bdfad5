
use std::sync::Arc;

use common::constants::DEFAULT_CYCLES_PER_FRAME;
use emu_lib::io::teletype::StdoutTty;
use emu_lib::{BreakpointKind, BreakpointSet, Pds1, ProcessorState, RecordingConsole};

use clap::Parser;


/// PDS-1 Emulator
#[derive(Parser)]
struct Args {
    /// Word image to execute
    image: String,

    /// Octal address at which to load the image.
    #[arg(long, default_value="40", value_parser=octal)]
    load_at: u16,

    /// Octal address at which to start executing.
    #[arg(long, default_value="40", value_parser=octal)]
    start: u16,

    /// Paper tape to mount on the reader.
    #[arg(long)]
    tape: Option<String>,

    /// Main processor steps per display processor step.
    #[arg(long, default_value_t=2)]
    display_every: usize,

    /// Stop after this many main processor steps; 0 means no limit.
    #[arg(long, default_value_t=0)]
    max_steps: usize,

    /// Octal address to stop at before executing.
    #[arg(long, value_parser=octal)]
    break_at: Option<u16>,

    /// Display steps per frame sync.
    #[arg(long)]
    cycles_per_frame: Option<usize>,
}

fn octal(s: &str) -> Result<u16, String> {
    u16::from_str_radix(s, 8).map_err(|e| e.to_string())
}


fn main() {
    env_logger::init();

    let opt = Args::parse();

    let console = Arc::new(RecordingConsole::new());
    let mut pds = Pds1::with_console_and_tty(console.clone(), Arc::new(StdoutTty));
    pds.set_display_interleave(opt.display_every);

    if let Some(cycles) = opt.cycles_per_frame {
        pds.display_mut().set_cycles_per_frame(cycles);
    }

    if let Some(addr) = opt.break_at {
        let breakpoints = Arc::new(BreakpointSet::new());
        breakpoints.add(BreakpointKind::Execution, addr);
        pds.set_breakpoints(breakpoints);
    }

    let buf = std::fs::read(&opt.image).unwrap();
    pds.load_image(&common::mem::to_words(&buf), opt.load_at);

    if let Some(tape) = &opt.tape {
        pds.load_tape(std::fs::read(tape).unwrap());
    }

    pds.main_mut().start_at(opt.start);
    let result = if opt.max_steps > 0 {
        pds.run_steps(opt.max_steps)
    } else {
        pds.run()
    };

    let state = match result {
        Ok(state) => state,
        Err(err) => {
            eprintln!("emulation stopped: {err}");
            std::process::exit(1);
        }
    };

    // Let the display finish the frame in flight.
    pds.run_display(opt.cycles_per_frame.unwrap_or(DEFAULT_CYCLES_PER_FRAME));

    match state {
        ProcessorState::Halted => println!("halted at 0o{:o}", pds.cpu().pc()),
        ProcessorState::Running => println!("step limit reached at 0o{:o}", pds.cpu().pc()),
        ProcessorState::BreakpointHalt => {
            let addr = pds
                .cpu()
                .breakpoint_addr()
                .or(pds.display().breakpoint_addr())
                .unwrap_or(pds.cpu().pc());
            println!("breakpoint at 0o{addr:o}");
        }
    }
    println!("ac 0o{:o} link {}", pds.cpu().ac(), pds.cpu().link() as u16);
    println!(
        "display: {} moves, {} points, {} frames",
        console.move_count(),
        console.point_count(),
        console.frames(),
    );
}


use disassembler::{Disassembled, disassemble, disassemble_display};
use common::display::DisplayMode;

use std::ops::Range;

use clap::Parser;

/// PDS-1 Disassembler
#[derive(Parser)]
struct Args {
    /// Word image to disassemble
    bin: String,

    /// Octal base address of the image.
    #[arg(long, default_value="0", value_parser=octal)]
    base: u16,

    /// Read the image as a display list.
    #[arg(long)]
    display: bool,

    /// Read the image as increment-mode data.
    #[arg(long)]
    increment: bool,
}

fn octal(s: &str) -> Result<u16, String> {
    u16::from_str_radix(s, 8).map_err(|e| e.to_string())
}

fn remove_long_zeros(disassembly: &mut Vec<Disassembled>) {
    const THRESH: usize = 8;

    let mut ranges = vec![];
    let mut range_start = None;
    for (i, dis) in disassembly.iter().enumerate() {
        if dis.words.len() == 1 && dis.words[0] == 0 {
            if range_start.is_none() {
                range_start = Some(i);
            }
        } else if let Some(start) = range_start {
            ranges.push(Range{start, end: i});
            range_start = None;
        }
    }
    if let Some(start) = range_start {
        ranges.push(Range{start, end: disassembly.len()});
    }

    for range in ranges.iter().rev() {
        if range.len() > THRESH {
            // Leave the first and last, an ellipsis will be added between.
            disassembly.drain(range.start + 1..range.end - 1);
        }
    }
}


fn main() {
    env_logger::init();

    let args = Args::parse();
    let bin = std::fs::read(args.bin).unwrap();
    let words = common::mem::to_words(&bin);

    let mut disassembly = if args.increment {
        disassemble_display(&words, args.base, DisplayMode::Increment)
    } else if args.display {
        disassemble_display(&words, args.base, DisplayMode::Processor)
    } else {
        disassemble(&words, args.base)
    };

    remove_long_zeros(&mut disassembly);

    let mut prev: Option<Disassembled> = None;
    for dis in disassembly {
        if let Some(p) = &prev {
            if p.addr.wrapping_add(p.words.len() as u16) != dis.addr {
                println!("...");
            }
        }
        println!("{}", dis);
        prev = Some(dis);
    }
}

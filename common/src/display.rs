
use crate::constants::OPERAND_MASK;

use std::fmt;

use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::FromPrimitive;
use derive_more::IsVariant;
use delegate::delegate;


// Which interpreter consumed a word. Indeterminate is only meaningful for
// words that have never executed, so only listings ever see it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IsVariant)]
pub enum DisplayMode {
    Processor,
    Increment,
    Indeterminate,
}


////////////////////////////////////////////////////////////////////////////////


// Micro-op word. Bits are applied in order; a clear proceed bit halts the
// display after the rest have taken effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DoprIns {
    pub word: u16,
}

#[derive(Debug, Clone, Copy, FromPrimitive, ToPrimitive, PartialEq, Eq)]
pub enum DoprFunc {
    Nop = 0,
    Dsts, // set scale
    Dstb, // set block
    Dlpn, // light pen sensitize
}

impl DoprIns {
    pub const PROCEED: u16 = 0o4000;
    pub const DSYN: u16 = 0o2000;
    pub const DIXM: u16 = 0o1000;
    pub const DIYM: u16 = 0o0400;
    pub const DDXM: u16 = 0o0200;
    pub const DDYM: u16 = 0o0100;
    pub const DRJM: u16 = 0o0040;
    pub const DDSP: u16 = 0o0020;

    pub fn has(&self, bit: u16) -> bool {
        self.word & bit != 0
    }

    pub fn halts(&self) -> bool {
        self.word & Self::PROCEED == 0
    }

    pub fn func(&self) -> DoprFunc {
        DoprFunc::from_u16((self.word >> 2) & 0o3).unwrap()
    }

    pub fn n(&self) -> u16 {
        self.word & 0o3
    }

    pub fn word(&self) -> u16 {
        self.word
    }
}

impl fmt::Display for DoprIns {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        const BITS: &[(u16, &str)] = &[
            (DoprIns::DSYN, "dsyn"),
            (DoprIns::DIXM, "dixm"),
            (DoprIns::DIYM, "diym"),
            (DoprIns::DDXM, "ddxm"),
            (DoprIns::DDYM, "ddym"),
            (DoprIns::DRJM, "drjm"),
            (DoprIns::DDSP, "ddsp"),
        ];

        let mut sep = "";
        if self.halts() {
            write!(f, "dhlt")?;
            sep = " ";
        }
        for (bit, name) in BITS {
            if self.has(*bit) {
                write!(f, "{}{}", sep, name)?;
                sep = " ";
            }
        }
        match self.func() {
            DoprFunc::Nop => {}
            DoprFunc::Dsts => {
                write!(f, "{}dsts {}", sep, self.n())?;
                sep = " ";
            }
            DoprFunc::Dstb => {
                write!(f, "{}dstb {}", sep, self.n())?;
                sep = " ";
            }
            DoprFunc::Dlpn => {
                write!(f, "{}dlpn {}", sep, self.n())?;
                sep = " ";
            }
        }
        if sep.is_empty() {
            write!(f, "dnop")?;
        }
        Ok(())
    }
}


////////////////////////////////////////////////////////////////////////////////


// Load X/Y accumulator. The ten data bits land on coordinate bits 10..1,
// so loads always place the beam on an even coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DlxaIns {
    pub word: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DlyaIns {
    pub word: u16,
}

pub const DLOAD_DATA_MASK: u16 = 0o1777;

impl DlxaIns {
    pub fn value(&self) -> u16 {
        (self.word & DLOAD_DATA_MASK) << 1
    }

    pub fn word(&self) -> u16 {
        self.word
    }
}

impl DlyaIns {
    pub fn value(&self) -> u16 {
        (self.word & DLOAD_DATA_MASK) << 1
    }

    pub fn word(&self) -> u16 {
        self.word
    }
}

impl fmt::Display for DlxaIns {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "dlxa\t0o{:o}", self.value())
    }
}

impl fmt::Display for DlyaIns {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "dlya\t0o{:o}", self.value())
    }
}


////////////////////////////////////////////////////////////////////////////////


// Enter increment mode. The low half of this word is the first datum;
// consumption continues half by half until an escape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeimIns {
    pub word: u16,
}

impl DeimIns {
    pub fn word(&self) -> u16 {
        self.word
    }
}

impl fmt::Display for DeimIns {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "deim\t{}", fmt_inc_half(Half::Second.of(self.word)))
    }
}


////////////////////////////////////////////////////////////////////////////////


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DjmpIns {
    pub word: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DjmsIns {
    pub word: u16,
}

impl DjmpIns {
    pub fn target(&self, block: u16) -> u16 {
        block | (self.word & OPERAND_MASK)
    }

    pub fn word(&self) -> u16 {
        self.word
    }
}

impl DjmsIns {
    pub fn target(&self, block: u16) -> u16 {
        block | (self.word & OPERAND_MASK)
    }

    pub fn word(&self) -> u16 {
        self.word
    }
}

impl fmt::Display for DjmpIns {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "djmp\t0o{:o}", self.word & OPERAND_MASK)
    }
}

impl fmt::Display for DjmsIns {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "djms\t0o{:o}", self.word & OPERAND_MASK)
    }
}


////////////////////////////////////////////////////////////////////////////////


// Long vector, three words. The first word only selects the operation; the
// geometry rides in the two that follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DlvhIns {
    pub word: u16,
}

impl DlvhIns {
    pub const LEN: u16 = 3;

    pub fn word(&self) -> u16 {
        self.word
    }
}

impl fmt::Display for DlvhIns {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "dlvh")
    }
}

// The second and third words of a long vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DlvhWords {
    pub w1: u16,
    pub w2: u16,
}

impl DlvhWords {
    pub const BEAM_ON: u16 = 0o20000;
    pub const DOTTED: u16 = 0o10000;
    pub const DY_GREATER: u16 = 0o20000;
    pub const NEG_X: u16 = 0o10000;
    pub const NEG_Y: u16 = 0o4000;

    pub fn beam_on(&self) -> bool {
        self.w1 & Self::BEAM_ON != 0
    }

    pub fn dotted(&self) -> bool {
        self.w1 & Self::DOTTED != 0
    }

    // The larger of the two axis magnitudes.
    pub fn m(&self) -> u16 {
        self.w1 & OPERAND_MASK
    }

    pub fn dy_greater(&self) -> bool {
        self.w2 & Self::DY_GREATER != 0
    }

    pub fn neg_x(&self) -> bool {
        self.w2 & Self::NEG_X != 0
    }

    pub fn neg_y(&self) -> bool {
        self.w2 & Self::NEG_Y != 0
    }

    pub fn n(&self) -> u16 {
        self.w2 & OPERAND_MASK
    }
}


////////////////////////////////////////////////////////////////////////////////


// Extended-mode control word (the SGR-1 option).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SgrIns {
    pub word: u16,
}

impl SgrIns {
    pub const ENTER: u16 = 0o4;
    pub const RETURN_ON_LOAD: u16 = 0o2;
    pub const BEAM_ON: u16 = 0o1;

    pub fn enter(&self) -> bool {
        self.word & Self::ENTER != 0
    }

    pub fn return_on_load(&self) -> bool {
        self.word & Self::RETURN_ON_LOAD != 0
    }

    pub fn beam_on(&self) -> bool {
        self.word & Self::BEAM_ON != 0
    }

    pub fn word(&self) -> u16 {
        self.word
    }
}

impl fmt::Display for SgrIns {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "sgr")?;
        if self.enter() {
            write!(f, " enter")?;
        }
        if self.return_on_load() {
            write!(f, " ret")?;
        }
        if self.beam_on() {
            write!(f, " beam")?;
        }
        Ok(())
    }
}


////////////////////////////////////////////////////////////////////////////////


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DIns {
    Dopr(DoprIns),
    Dlxa(DlxaIns),
    Dlya(DlyaIns),
    Deim(DeimIns),
    Djmp(DjmpIns),
    Djms(DjmsIns),
    Dlvh(DlvhIns),
    Sgr(SgrIns),
}

impl DIns {
    delegate! {
        to match self {
            DIns::Dopr(x) => x,
            DIns::Dlxa(x) => x,
            DIns::Dlya(x) => x,
            DIns::Deim(x) => x,
            DIns::Djmp(x) => x,
            DIns::Djms(x) => x,
            DIns::Dlvh(x) => x,
            DIns::Sgr(x) => x,
        } {
            pub fn word(&self) -> u16;
        }
    }

    pub const OPCODE_SHIFT: usize = 12;
    pub const OPCODE_FIELD_MASK: u16 = 0o7;

    // Total: every word classifies, there is no error path.
    pub fn decode(word: u16) -> DIns {
        match (word >> Self::OPCODE_SHIFT) & Self::OPCODE_FIELD_MASK {
            0 => DIns::Dopr(DoprIns{word}),
            1 => DIns::Dlxa(DlxaIns{word}),
            2 => DIns::Dlya(DlyaIns{word}),
            3 => DIns::Deim(DeimIns{word}),
            4 => DIns::Djmp(DjmpIns{word}),
            5 => DIns::Djms(DjmsIns{word}),
            6 => DIns::Dlvh(DlvhIns{word}),
            _ => DIns::Sgr(SgrIns{word}),
        }
    }

    // In words.
    pub fn size(&self) -> u16 {
        match self {
            DIns::Dlvh(_) => DlvhIns::LEN,
            _ => 1,
        }
    }
}

impl fmt::Display for DIns {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DIns::Dopr(ins) => write!(f, "{ins}"),
            DIns::Dlxa(ins) => write!(f, "{ins}"),
            DIns::Dlya(ins) => write!(f, "{ins}"),
            DIns::Deim(ins) => write!(f, "{ins}"),
            DIns::Djmp(ins) => write!(f, "{ins}"),
            DIns::Djms(ins) => write!(f, "{ins}"),
            DIns::Dlvh(ins) => write!(f, "{ins}"),
            DIns::Sgr(ins) => write!(f, "{ins}"),
        }
    }
}


////////////////////////////////////////////////////////////////////////////////


// Increment mode consumes words as two eight-bit halves, high half first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Half {
    First,
    Second,
}

impl Half {
    pub fn of(self, word: u16) -> u8 {
        match self {
            Half::First => (word >> 8) as u8,
            Half::Second => word as u8,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncHalf {
    Vector(IncVector),
    Control(IncControl),
}

impl IncHalf {
    pub fn classify(half: u8) -> IncHalf {
        if half & 0o200 != 0 {
            IncHalf::Vector(IncVector{half})
        } else {
            IncHalf::Control(IncControl{half})
        }
    }
}

// A short vector: signed two-bit magnitudes per axis, beam on or off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IncVector {
    pub half: u8,
}

impl IncVector {
    pub const BEAM_ON: u8 = 0o100;
    pub const NEG_X: u8 = 0o40;
    pub const NEG_Y: u8 = 0o04;

    pub fn beam_on(&self) -> bool {
        self.half & Self::BEAM_ON != 0
    }

    pub fn x_mag(&self) -> u16 {
        ((self.half >> 3) & 0o3) as u16
    }

    pub fn neg_x(&self) -> bool {
        self.half & Self::NEG_X != 0
    }

    pub fn y_mag(&self) -> u16 {
        (self.half & 0o3) as u16
    }

    pub fn neg_y(&self) -> bool {
        self.half & Self::NEG_Y != 0
    }
}

// A control half: coordinate nudges, escape back to processor mode, and
// an optional subroutine return riding on the escape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IncControl {
    pub half: u8,
}

impl IncControl {
    pub const ESCAPE: u8 = 0o100;
    pub const X_MSB_INC: u8 = 0o40;
    pub const X_LSB_CLEAR: u8 = 0o20;
    pub const Y_MSB_INC: u8 = 0o10;
    pub const Y_LSB_CLEAR: u8 = 0o04;
    pub const RETURN: u8 = 0o01;

    pub fn escape(&self) -> bool {
        self.half & Self::ESCAPE != 0
    }

    pub fn x_msb_inc(&self) -> bool {
        self.half & Self::X_MSB_INC != 0
    }

    pub fn x_lsb_clear(&self) -> bool {
        self.half & Self::X_LSB_CLEAR != 0
    }

    pub fn y_msb_inc(&self) -> bool {
        self.half & Self::Y_MSB_INC != 0
    }

    pub fn y_lsb_clear(&self) -> bool {
        self.half & Self::Y_LSB_CLEAR != 0
    }

    pub fn return_on_escape(&self) -> bool {
        self.half & Self::RETURN != 0
    }

    pub fn moves_beam(&self) -> bool {
        self.x_msb_inc() || self.x_lsb_clear() || self.y_msb_inc() || self.y_lsb_clear()
    }
}

pub fn fmt_inc_half(half: u8) -> String {
    match IncHalf::classify(half) {
        IncHalf::Vector(v) => {
            let beam = if v.beam_on() { 'b' } else { 'd' };
            let sx = if v.neg_x() { '-' } else { '+' };
            let sy = if v.neg_y() { '-' } else { '+' };
            format!("{}({}{},{}{})", beam, sx, v.x_mag(), sy, v.y_mag())
        }
        IncHalf::Control(c) => {
            let mut parts = vec![];
            if c.x_msb_inc() {
                parts.push("x+");
            }
            if c.x_lsb_clear() {
                parts.push("x0");
            }
            if c.y_msb_inc() {
                parts.push("y+");
            }
            if c.y_lsb_clear() {
                parts.push("y0");
            }
            if c.escape() {
                parts.push(if c.return_on_escape() { "esc ret" } else { "esc" });
            }
            if parts.is_empty() {
                parts.push("inop");
            }
            parts.join(" ")
        }
    }
}

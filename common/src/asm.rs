
use crate::constants::{OPERAND_MASK, PAGE_MASK};

use std::fmt;

use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::FromPrimitive;
use delegate::delegate;


////////////////////////////////////////////////////////////////////////////////


// Operate class one: accumulator/link micro ops. The bits are applied in
// three timing phases, so cla+iac is "load one" while cma+iac is negate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OprIns {
    pub word: u16,
}

impl OprIns {
    pub const CLASS_MASK: u16 = 0o077700;

    // Clear means halt once the micro ops have been applied.
    pub const PROCEED: u16 = 0o100000;

    // Phase one.
    pub const CLA: u16 = 0o000001;
    pub const CLL: u16 = 0o000010;
    // Phase two.
    pub const CMA: u16 = 0o000002;
    pub const CML: u16 = 0o000020;
    // Phase three.
    pub const IAC: u16 = 0o000004;
    pub const ODA: u16 = 0o000040;

    pub fn has(&self, bit: u16) -> bool {
        self.word & bit != 0
    }

    pub fn halts(&self) -> bool {
        self.word & Self::PROCEED == 0
    }

    pub fn fmt_with_pc(&self, f: &mut fmt::Formatter, _pc: u16) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }

    fn canonical_name(&self) -> Option<&'static str> {
        let name = match self.word {
            0o000000 => "hlt",
            0o100000 => "nop",
            0o100001 => "cla",
            0o100002 => "cma",
            0o100003 => "sta",
            0o100004 => "iac",
            0o100005 => "coa",
            0o100006 => "cia",
            0o100010 => "cll",
            0o100011 => "cal",
            0o100020 => "cml",
            0o100030 => "stl",
            0o100040 => "oda",
            0o100041 => "lda",
            _ => return None,
        };
        Some(name)
    }

    fn decode(word: u16) -> Option<Ins> {
        if word & Self::CLASS_MASK != 0 {
            return None;
        }
        Some(Ins::Opr(Self{word}))
    }
}

impl fmt::Display for OprIns {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(name) = self.canonical_name() {
            return write!(f, "{}", name);
        }

        const BITS: &[(u16, &str)] = &[
            (OprIns::CLA, "cla"),
            (OprIns::CLL, "cll"),
            (OprIns::CMA, "cma"),
            (OprIns::CML, "cml"),
            (OprIns::IAC, "iac"),
            (OprIns::ODA, "oda"),
        ];

        let mut sep = "";
        for (bit, name) in BITS {
            if self.has(*bit) {
                write!(f, "{}{}", sep, name)?;
                sep = " ";
            }
        }
        if self.halts() {
            write!(f, "{}hlt", sep)?;
        }
        Ok(())
    }
}


////////////////////////////////////////////////////////////////////////////////


// Operate class two: accumulator rotates and arithmetic shifts, plus the
// display-on bit. Rotates move through the link; arithmetic shifts
// preserve the sign and leave the link alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShiftIns {
    pub word: u16,
}

impl ShiftIns {
    pub const CLASS_MASK: u16 = 0o177000;
    pub const CLASS: u16 = 0o003000;

    pub const COUNT_MASK: u16 = 0o003;
    pub const RIGHT: u16 = 0o020;
    pub const ARITHMETIC: u16 = 0o040;
    pub const DISPLAY_ON: u16 = 0o100;

    pub fn count(&self) -> u16 {
        self.word & Self::COUNT_MASK
    }

    pub fn right(&self) -> bool {
        self.word & Self::RIGHT != 0
    }

    pub fn arithmetic(&self) -> bool {
        self.word & Self::ARITHMETIC != 0
    }

    pub fn display_on(&self) -> bool {
        self.word & Self::DISPLAY_ON != 0
    }

    pub fn fmt_with_pc(&self, f: &mut fmt::Formatter, _pc: u16) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }

    fn decode(word: u16) -> Option<Ins> {
        if word & Self::CLASS_MASK != Self::CLASS {
            return None;
        }
        Some(Ins::Shift(Self{word}))
    }
}

impl fmt::Display for ShiftIns {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.display_on() && self.count() == 0 {
            return write!(f, "don");
        }

        let name = match (self.arithmetic(), self.right()) {
            (false, false) => "ral",
            (false, true) => "rar",
            (true, false) => "sal",
            (true, true) => "sar",
        };
        write!(f, "{}{}", name, self.count())?;
        if self.display_on() {
            write!(f, " don")?;
        }
        Ok(())
    }
}


////////////////////////////////////////////////////////////////////////////////


// Operate class three: conditional skips. Each set condition bit overwrites
// the skip decision rather than OR-ing into it; the hardware latches them
// in bit order, so the highest set bit decides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkipIns {
    pub word: u16,
}

impl SkipIns {
    pub const CLASS_MASK: u16 = 0o077000;
    pub const CLASS: u16 = 0o002000;

    pub const NEGATE: u16 = 0o100000;
    pub const COND_MASK: u16 = 0o777;

    pub const ASZ: u16 = 0o001; // AC == 0
    pub const ASP: u16 = 0o002; // AC sign clear
    pub const LSZ: u16 = 0o004; // link == 0
    pub const DSF: u16 = 0o010; // display running
    pub const KSF: u16 = 0o020; // keyboard ready
    pub const RSF: u16 = 0o040; // tty receive ready
    pub const TSF: u16 = 0o100; // tty send done
    pub const SSF: u16 = 0o200; // frame sync latched
    pub const HSF: u16 = 0o400; // tape frame ready

    pub fn negate(&self) -> bool {
        self.word & Self::NEGATE != 0
    }

    pub fn conds(&self) -> u16 {
        self.word & Self::COND_MASK
    }

    pub fn fmt_with_pc(&self, f: &mut fmt::Formatter, _pc: u16) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }

    fn decode(word: u16) -> Option<Ins> {
        if word & Self::CLASS_MASK != Self::CLASS {
            return None;
        }
        Some(Ins::Skip(Self{word}))
    }
}

impl fmt::Display for SkipIns {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        const NAMES: &[(u16, &str, &str)] = &[
            (SkipIns::ASZ, "asz", "asn"),
            (SkipIns::ASP, "asp", "asm"),
            (SkipIns::LSZ, "lsz", "lsn"),
            (SkipIns::DSF, "dsf", "dsn"),
            (SkipIns::KSF, "ksf", "ksn"),
            (SkipIns::RSF, "rsf", "rsn"),
            (SkipIns::TSF, "tsf", "tsn"),
            (SkipIns::SSF, "ssf", "ssn"),
            (SkipIns::HSF, "hsf", "hsn"),
        ];

        if self.conds() == 0 {
            return write!(f, "skp 0o{:06o}", self.word);
        }

        let mut sep = "";
        for (bit, plain, negated) in NAMES {
            if self.conds() & bit != 0 {
                let name = if self.negate() { negated } else { plain };
                write!(f, "{}{}", sep, name)?;
                sep = " ";
            }
        }
        Ok(())
    }
}


////////////////////////////////////////////////////////////////////////////////


// Input/output transfer. The nine-bit code selects a device (upper six
// bits) and a pulse within it (lower three).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IotIns {
    pub word: u16,
}

impl IotIns {
    pub const CLASS_MASK: u16 = 0o177000;
    pub const CLASS: u16 = 0o001000;

    pub const CODE_MASK: u16 = 0o777;

    pub fn code(&self) -> u16 {
        self.word & Self::CODE_MASK
    }

    pub fn device(&self) -> u16 {
        self.code() >> 3
    }

    pub fn pulse(&self) -> u16 {
        self.code() & 0o7
    }

    pub fn fmt_with_pc(&self, f: &mut fmt::Formatter, _pc: u16) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }

    fn mnemonic(&self) -> Option<&'static str> {
        let name = match self.code() {
            0o003 => "dla",
            0o012 => "dof",
            0o021 => "krb",
            0o022 => "kcf",
            0o023 => "krc",
            0o031 => "rrb",
            0o032 => "rcf",
            0o033 => "rrc",
            0o041 => "tpr",
            0o042 => "tcf",
            0o043 => "tpc",
            0o051 => "hrb",
            0o052 => "hof",
            0o061 => "hon",
            0o071 => "scf",
            0o072 => "don",
            _ => return None,
        };
        Some(name)
    }

    fn decode(word: u16) -> Option<Ins> {
        if word & Self::CLASS_MASK != Self::CLASS {
            return None;
        }
        Some(Ins::Iot(Self{word}))
    }
}

impl fmt::Display for IotIns {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.mnemonic() {
            Some(name) => write!(f, "{}", name),
            None => write!(f, "iot 0o{:o}", self.code()),
        }
    }
}


////////////////////////////////////////////////////////////////////////////////


#[derive(Debug, Clone, Copy, FromPrimitive, ToPrimitive, PartialEq, Eq)]
pub enum MemRefOpcode {
    Law = 0o01,
    Jmp = 0o02,
    Dac = 0o04,
    Xam = 0o05,
    Isz = 0o06,
    Jms = 0o07,
    And = 0o11,
    Ior = 0o12,
    Xor = 0o13,
    Lac = 0o14,
    Add = 0o15,
    Sub = 0o16,
    Sam = 0o17,

    // law with the defer bit set; never produced from the opcode field.
    Lwc = 0o21,
}

impl fmt::Display for MemRefOpcode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", format!("{:?}", self).to_lowercase())
    }
}

// Memory-reference orders. The operand names a location in the
// instruction's own page; the defer bit takes one indirection through it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemRefIns {
    pub op: MemRefOpcode,
    pub indirect: bool,
    pub operand: u16,
}

impl MemRefIns {
    pub const INDIRECT: u16 = 0o100000;
    pub const OPCODE_SHIFT: usize = 11;
    pub const OPCODE_FIELD_MASK: u16 = 0o17;

    pub fn ea(&self, pc: u16) -> u16 {
        (pc & PAGE_MASK) | self.operand
    }

    pub fn is_immediate(&self) -> bool {
        matches!(self.op, MemRefOpcode::Law | MemRefOpcode::Lwc)
    }

    pub fn fmt_with_pc(&self, f: &mut fmt::Formatter, pc: u16) -> fmt::Result {
        if self.is_immediate() {
            return fmt::Display::fmt(self, f);
        }
        let marker = if self.indirect { "@" } else { "" };
        write!(f, "{}\t{}0o{:o}", self.op, marker, self.ea(pc))
    }

    fn decode(word: u16) -> Option<Ins> {
        let field = (word >> Self::OPCODE_SHIFT) & Self::OPCODE_FIELD_MASK;
        let op = MemRefOpcode::from_u16(field)?;
        let indirect = word & Self::INDIRECT != 0;
        let operand = word & OPERAND_MASK;

        // law with the defer bit is load-word-complement, still immediate.
        let (op, indirect) = match (op, indirect) {
            (MemRefOpcode::Law, true) => (MemRefOpcode::Lwc, false),
            other => other,
        };
        Some(Ins::MemRef(Self{op, indirect, operand}))
    }
}

impl fmt::Display for MemRefIns {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_immediate() {
            return write!(f, "{}\t0o{:o}", self.op, self.operand);
        }
        let marker = if self.indirect { "@" } else { "" };
        write!(f, "{}\t{}0o{:o}", self.op, marker, self.operand)
    }
}


////////////////////////////////////////////////////////////////////////////////


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ins {
    Opr(OprIns),
    Shift(ShiftIns),
    Skip(SkipIns),
    Iot(IotIns),
    MemRef(MemRefIns),
}

impl Ins {
    delegate! {
        to match self {
            Ins::Opr(x) => x,
            Ins::Shift(x) => x,
            Ins::Skip(x) => x,
            Ins::Iot(x) => x,
            Ins::MemRef(x) => x,
        } {
            pub fn fmt_with_pc(&self, f: &mut fmt::Formatter, pc: u16) -> fmt::Result;
        }
    }

    pub fn display_with_pc(&self, pc: u16) -> InsWithPc {
        InsWithPc(self, pc)
    }

    // Decode precedence. Ordering matters: the operate-class masks overlap
    // the memory-reference opcode field, so they are tried first.
    const DECODERS: &[Decoder] = &[
        OprIns::decode,
        ShiftIns::decode,
        SkipIns::decode,
        IotIns::decode,
        MemRefIns::decode,
    ];

    pub fn decode(word: u16) -> Option<Ins> {
        for decoder in Self::DECODERS {
            let ins = decoder(word);
            if ins.is_some() {
                return ins;
            }
        }

        None
    }
}

impl fmt::Display for Ins {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Ins::Opr(ins) => write!(f, "{ins}"),
            Ins::Shift(ins) => write!(f, "{ins}"),
            Ins::Skip(ins) => write!(f, "{ins}"),
            Ins::Iot(ins) => write!(f, "{ins}"),
            Ins::MemRef(ins) => write!(f, "{ins}"),
        }
    }
}

// Just for formatting, like Path::Display().
pub struct InsWithPc<'a>(&'a Ins, u16);

impl<'a> fmt::Display for InsWithPc<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.fmt_with_pc(f, self.1)
    }
}


type Decoder = fn(u16) -> Option<Ins>;

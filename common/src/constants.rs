
// Memory is addressed in 2K word pages; a memory-reference order can only
// name a location within the page its own word sits in.
pub const PAGE_WORDS: u16 = 0o4000;
pub const OPERAND_MASK: u16 = PAGE_WORDS - 1;
pub const PAGE_MASK: u16 = !OPERAND_MASK;

// Page offsets stepped by the deferred cycle before the pointer is read.
pub const AUTO_INDEX_FIRST: u16 = 0o10;
pub const AUTO_INDEX_LAST: u16 = 0o17;

// Where the bootstrap loader lives; a reset points the main processor here.
pub const BOOTSTRAP_ADDR: u16 = 0o40;

pub const DEFAULT_MEM_WORDS: usize = 0o100000; // 32K
pub const MIN_MEM_WORDS: usize = 0o10000; // 4K

// The display coordinate registers are 11 bits wide.
pub const COORD_MASK: u16 = 0o3777;
pub const COORD_MSB_STEP: u16 = 0o100;
pub const COORD_LSB_MASK: u16 = 0o77;

// Issued by observed paper-tape bootstraps; a no-op on the real machine.
pub const IOT_IGNORED: u16 = 0o060;

// IOT codes owned by the display processor.
pub const IOT_DLA: u16 = 0o003;
pub const IOT_DOF: u16 = 0o012;
pub const IOT_SCF: u16 = 0o071;
pub const IOT_DON: u16 = 0o072;

pub const DISPLAY_IOT_CODES: &[u16] = &[IOT_DLA, IOT_DOF, IOT_SCF, IOT_DON];

// Display steps per frame sync, about 1/40 s at the 2 us memory cycle.
pub const DEFAULT_CYCLES_PER_FRAME: usize = 12_500;

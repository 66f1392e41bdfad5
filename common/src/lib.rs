pub mod asm;
pub mod constants;
pub mod display;
pub mod mem;

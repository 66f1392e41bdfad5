pub mod breakpoints;
pub mod cache;
pub mod console;
pub mod display_processor;
pub mod error;
pub mod io;
pub mod memory;
pub mod pds1;
pub mod processor;

pub use breakpoints::{BreakpointKind, BreakpointQuery, BreakpointSet, NoBreakpoints};
pub use console::{Console, DrawingStyle, NullConsole, RecordingConsole};
pub use display_processor::DisplayProcessor;
pub use error::EmuError;
pub use io::{IotDevice, IotRegistry, IotTarget, Peripherals};
pub use memory::Memory;
pub use pds1::Pds1;
pub use processor::{CpuState, ExecState, Processor, ProcessorState};

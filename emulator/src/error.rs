use thiserror::Error;

// Faults that stop the machine rather than being tolerated in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EmuError {
    #[error("Unimplemented instruction 0o{word:06o} at 0o{addr:o}")]
    UnimplementedInstruction { word: u16, addr: u16 },

    #[error("Unimplemented display IOT 0o{code:o}")]
    UnimplementedIot { code: u16 },
}

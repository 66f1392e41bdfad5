use common::asm::Ins;
use common::constants::{DEFAULT_MEM_WORDS, MIN_MEM_WORDS};
use common::display::{DIns, DisplayMode};

use crate::cache::InstructionCache;
use crate::error::EmuError;

use log::trace;

// The word store and both decode caches. Keeping the caches here makes
// store() the one place a write can invalidate a stale decode, no matter
// who performed it.
pub struct Memory {
    cells: Vec<u16>,
    addr_mask: u16,
    main_cache: InstructionCache<Ins>,
    display_cache: InstructionCache<(DIns, DisplayMode)>,
}

impl Memory {
    pub fn new() -> Self {
        Self::with_words(DEFAULT_MEM_WORDS)
    }

    pub fn with_words(words: usize) -> Self {
        assert!(
            words.is_power_of_two() && words >= MIN_MEM_WORDS,
            "memory size {words} is not a power of two of at least 0o{MIN_MEM_WORDS:o} words"
        );
        Memory{
            cells: vec![0; words],
            addr_mask: (words - 1) as u16,
            main_cache: InstructionCache::new(words),
            display_cache: InstructionCache::new(words),
        }
    }

    pub fn size(&self) -> usize {
        self.cells.len()
    }

    fn index(&self, addr: u16) -> u16 {
        addr & self.addr_mask
    }

    pub fn fetch(&self, addr: u16) -> u16 {
        self.cells[self.index(addr) as usize]
    }

    pub fn store(&mut self, addr: u16, word: u16) {
        let addr = self.index(addr);
        trace!("mem: 0o{:o} <- 0o{:06o}", addr, word);
        self.cells[addr as usize] = word;
        self.main_cache.invalidate(addr);
        self.display_cache.invalidate(addr);
    }

    pub fn load_image(&mut self, words: &[u16], base: u16) {
        for (i, word) in words.iter().enumerate() {
            self.store(base.wrapping_add(i as u16), *word);
        }
    }

    // Core is non-volatile; a reset only drops the decodes.
    pub fn reset(&mut self) {
        self.main_cache.clear();
        self.display_cache.clear();
    }

    // Fetch for the main processor, through its cache.
    pub fn main_ins(&mut self, addr: u16) -> Result<Ins, EmuError> {
        let addr = self.index(addr);
        if let Some(ins) = self.main_cache.get(addr) {
            return Ok(ins);
        }

        let word = self.cells[addr as usize];
        let ins = Ins::decode(word).ok_or(EmuError::UnimplementedInstruction{word, addr})?;
        self.main_cache.insert(addr, ins);
        Ok(ins)
    }

    // Fetch for the display processor, through its cache. The mode the
    // word is being consumed in rides along for listings; execution never
    // reads it back.
    pub fn display_ins(&mut self, addr: u16, mode: DisplayMode) -> DIns {
        let addr = self.index(addr);
        if let Some((ins, cached_mode)) = self.display_cache.get(addr) {
            if cached_mode != mode {
                self.display_cache.insert(addr, (ins, mode));
            }
            return ins;
        }

        let ins = DIns::decode(self.cells[addr as usize]);
        self.display_cache.insert(addr, (ins, mode));
        ins
    }

    // Indeterminate until the display first consumes the word.
    pub fn display_mode_tag(&self, addr: u16) -> DisplayMode {
        match self.display_cache.get(self.index(addr)) {
            Some((_, mode)) => mode,
            None => DisplayMode::Indeterminate,
        }
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

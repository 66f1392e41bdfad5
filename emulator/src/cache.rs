
// Lazy per-address decode cache. One slot per memory word; a slot fills
// the first time its word executes and empties when the word is stored to.
pub struct InstructionCache<T> {
    slots: Vec<Option<T>>,
}

impl<T: Copy> InstructionCache<T> {
    pub fn new(words: usize) -> Self {
        InstructionCache{slots: vec![None; words]}
    }

    pub fn get(&self, addr: u16) -> Option<T> {
        self.slots[addr as usize]
    }

    pub fn insert(&mut self, addr: u16, entry: T) {
        self.slots[addr as usize] = Some(entry);
    }

    pub fn invalidate(&mut self, addr: u16) {
        self.slots[addr as usize] = None;
    }

    pub fn clear(&mut self) {
        self.slots.fill(None);
    }
}

#[cfg(test)]
mod tests {
    use super::InstructionCache;

    #[test]
    fn insert_get() {
        let mut cache = InstructionCache::new(0o100);
        assert_eq!(cache.get(0o42), None);
        cache.insert(0o42, 7u16);
        assert_eq!(cache.get(0o42), Some(7));
        assert_eq!(cache.get(0o43), None);
    }

    #[test]
    fn invalidate() {
        let mut cache = InstructionCache::new(0o100);
        cache.insert(0o42, 7u16);
        cache.insert(0o43, 8u16);
        cache.invalidate(0o42);
        assert_eq!(cache.get(0o42), None);
        assert_eq!(cache.get(0o43), Some(8));
    }

    #[test]
    fn clear() {
        let mut cache = InstructionCache::new(0o100);
        cache.insert(0o42, 7u16);
        cache.insert(0o77, 8u16);
        cache.clear();
        assert_eq!(cache.get(0o42), None);
        assert_eq!(cache.get(0o77), None);
    }
}

// Raw images are little-endian words on disk.

// Copying variant for buffers with no alignment or length guarantee. A
// trailing odd byte is dropped.
pub fn to_words(input: &[u8]) -> Vec<u16> {
    input
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect()
}

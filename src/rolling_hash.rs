/// Cyclic-polynomial (buzhash-style) rolling hash over k-grams of tokens.
///
/// Every token symbol maps to a 64-bit key. The hash of a window `s[0..k]` is
/// the XOR of `key[s[j]]` rotated left by `k - 1 - j`, so sliding the window by
/// one token is O(1): rotate by one, cancel the outgoing key, mix in the new one.
const KEY_COUNT: usize = 256;

pub const DEFAULT_SEED: u64 = 0x7068_6173_685f_7478;

pub struct KeyTable {
    keys: [u64; KEY_COUNT],
}

impl KeyTable {
    /// Derive the key table from a seed using the BLAKE3 extendable output.
    /// The same seed yields the same table on every platform.
    pub fn from_seed(seed: u64) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"texthash key table");
        hasher.update(&seed.to_le_bytes());
        let mut bytes = [0u8; KEY_COUNT * 8];
        hasher.finalize_xof().fill(&mut bytes);

        let mut keys = [0u64; KEY_COUNT];
        for (key, chunk) in keys.iter_mut().zip(bytes.chunks_exact(8)) {
            let mut word = [0u8; 8];
            word.copy_from_slice(chunk);
            *key = u64::from_le_bytes(word);
        }
        Self { keys }
    }

    #[inline]
    pub fn key(&self, symbol: u8) -> u64 {
        self.keys[symbol as usize]
    }
}

pub struct RollingHash<'a> {
    table: &'a KeyTable,
    hash: u64,
    /// Rotation applied to the outgoing key, `k mod 64`.
    out_rotation: u32,
}

impl<'a> RollingHash<'a> {
    pub fn new(table: &'a KeyTable, window_size: usize) -> Self {
        Self {
            table,
            hash: 0,
            out_rotation: (window_size % 64) as u32,
        }
    }

    /// Compute hash over an initial window of symbols.
    pub fn init(&mut self, window: &[u8]) {
        self.hash = hash_window(self.table, window);
    }

    /// Slide the window: remove `old` from the front, add `new` at the back.
    #[inline]
    pub fn rotate(&mut self, old: u8, new: u8) {
        self.hash = self.hash.rotate_left(1)
            ^ self.table.key(old).rotate_left(self.out_rotation)
            ^ self.table.key(new);
    }

    pub fn digest(&self) -> u64 {
        self.hash
    }
}

/// Hash one window from scratch. Equal to the rolling digest of the same window.
pub fn hash_window(table: &KeyTable, window: &[u8]) -> u64 {
    window
        .iter()
        .fold(0u64, |h, &symbol| h.rotate_left(1) ^ table.key(symbol))
}

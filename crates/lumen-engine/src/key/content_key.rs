use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::geom::Rect;

use super::KeyDomain;

static NEXT_UNIQUE_ID: AtomicU64 = AtomicU64::new(1);

/// Ordered sequence of `u32` words identifying cached content.
///
/// - Equality and ordering (lexicographic) operate on the full word sequence.
/// - Hashing feeds [`ContentKey::range_hash`] to the hasher.
/// - An empty key is *invalid*: it marks uncached, one-shot content and must
///   never be inserted into a cache.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct ContentKey {
    words: Vec<u32>,
}

impl ContentKey {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn with_capacity(words: usize) -> Self {
        Self { words: Vec::with_capacity(words) }
    }

    /// Starts a key tagged with `domain`.
    pub fn for_domain(domain: KeyDomain) -> Self {
        let mut key = Self::with_capacity(8);
        key.write_u32(domain.tag());
        key
    }

    /// Returns a key that no other call in this process will ever return.
    pub fn unique() -> Self {
        let id = NEXT_UNIQUE_ID.fetch_add(1, Ordering::Relaxed);
        let mut key = Self::for_domain(KeyDomain::Unique);
        key.write_u32(id as u32);
        key.write_u32((id >> 32) as u32);
        key
    }

    #[inline]
    pub fn reserve(&mut self, additional: usize) {
        self.words.reserve(additional);
    }

    #[inline]
    pub fn write_u32(&mut self, value: u32) {
        self.words.push(value);
    }

    #[inline]
    pub fn write_i32(&mut self, value: i32) {
        self.words.push(value as u32);
    }

    #[inline]
    pub fn write_f32(&mut self, value: f32) {
        self.words.push(value.to_bits());
    }

    #[inline]
    pub fn write_bytes4(&mut self, bytes: [u8; 4]) {
        self.words.push(u32::from_ne_bytes(bytes));
    }

    #[inline]
    pub fn write_bool(&mut self, value: bool) {
        self.words.push(u32::from(value));
    }

    /// Writes a pointer identity: one word on 32-bit targets, two words
    /// (low word first) on 64-bit targets.
    pub fn write_ptr<T: ?Sized>(&mut self, ptr: *const T) {
        let addr = ptr.cast::<()>() as usize as u64;
        self.words.push(addr as u32);
        #[cfg(target_pointer_width = "64")]
        self.words.push((addr >> 32) as u32);
    }

    pub fn write_rect(&mut self, rect: Rect) {
        self.reserve(4);
        self.write_f32(rect.left);
        self.write_f32(rect.top);
        self.write_f32(rect.right);
        self.write_f32(rect.bottom);
    }

    /// Appends every word of `other`.
    pub fn append(&mut self, other: &ContentKey) {
        self.words.extend_from_slice(&other.words);
    }

    /// Returns a copy of `self` with `other` appended.
    pub fn concat(&self, other: &ContentKey) -> ContentKey {
        let mut key = Self::with_capacity(self.len() + other.len());
        key.append(self);
        key.append(other);
        key
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        !self.words.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    #[inline]
    pub fn words(&self) -> &[u32] {
        &self.words
    }

    /// Deterministic 32-bit hash over the word range (murmur3 mixing).
    pub fn range_hash(&self) -> u32 {
        const C1: u32 = 0xcc9e_2d51;
        const C2: u32 = 0x1b87_3593;

        let mut hash = self.words.len() as u32;
        for &word in &self.words {
            let mut k = word.wrapping_mul(C1);
            k = k.rotate_left(15).wrapping_mul(C2);
            hash ^= k;
            hash = hash.rotate_left(13).wrapping_mul(5).wrapping_add(0xe654_6b64);
        }

        hash ^= hash >> 16;
        hash = hash.wrapping_mul(0x85eb_ca6b);
        hash ^= hash >> 13;
        hash = hash.wrapping_mul(0xc2b2_ae35);
        hash ^ (hash >> 16)
    }
}

impl Hash for ContentKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u32(self.range_hash());
    }
}

#[cfg(test)]
mod tests {
    use std::collections::hash_map::DefaultHasher;
    use std::collections::BTreeSet;

    use super::*;

    fn hash_of(key: &ContentKey) -> u64 {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        hasher.finish()
    }

    fn build(a: u32, b: i32, c: f32) -> ContentKey {
        let mut key = ContentKey::new();
        key.write_u32(a);
        key.write_i32(b);
        key.write_f32(c);
        key.write_bytes4([1, 2, 3, 4]);
        key
    }

    // ── determinism ────────────────────────────────────────────────────────

    #[test]
    fn same_writes_produce_equal_keys() {
        let a = build(7, -3, 1.5);
        let b = build(7, -3, 1.5);
        assert_eq!(a, b);
        assert_eq!(a.range_hash(), b.range_hash());
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn single_value_change_produces_different_key() {
        let base = build(7, -3, 1.5);
        for other in [build(8, -3, 1.5), build(7, 3, 1.5), build(7, -3, 1.25)] {
            assert_ne!(base, other);
            assert_ne!(base.range_hash(), other.range_hash());
        }
    }

    #[test]
    fn negative_zero_is_distinct_from_zero() {
        let mut a = ContentKey::new();
        a.write_f32(0.0);
        let mut b = ContentKey::new();
        b.write_f32(-0.0);
        assert_ne!(a, b);
    }

    // ── validity ───────────────────────────────────────────────────────────

    #[test]
    fn empty_key_is_invalid() {
        let mut key = ContentKey::new();
        assert!(!key.is_valid());
        key.write_u32(0);
        assert!(key.is_valid());
        assert_eq!(key.len(), 1);
    }

    #[test]
    fn pointer_width_determines_word_count() {
        let value = 5_u8;
        let mut key = ContentKey::new();
        key.write_ptr(&value as *const u8);
        assert_eq!(key.len(), std::mem::size_of::<usize>() / 4);
    }

    #[test]
    fn unique_keys_never_repeat() {
        let a = ContentKey::unique();
        let b = ContentKey::unique();
        assert!(a.is_valid());
        assert_ne!(a, b);
    }

    #[test]
    fn domains_separate_identical_payloads() {
        let mut a = ContentKey::for_domain(KeyDomain::Gradient);
        a.write_u32(1);
        let mut b = ContentKey::for_domain(KeyDomain::Shape);
        b.write_u32(1);
        assert_ne!(a, b);
    }

    // ── ordering ───────────────────────────────────────────────────────────

    #[test]
    fn ordering_is_lexicographic() {
        let mut short = ContentKey::new();
        short.write_u32(1);
        let mut long = short.clone();
        long.write_u32(0);
        let mut bigger = ContentKey::new();
        bigger.write_u32(2);

        let set: BTreeSet<_> = [bigger.clone(), long.clone(), short.clone()].into_iter().collect();
        let ordered: Vec<_> = set.into_iter().collect();
        assert_eq!(ordered, vec![short, long, bigger]);
    }

    #[test]
    fn concat_appends_words() {
        let mut a = ContentKey::new();
        a.write_u32(1);
        let mut b = ContentKey::new();
        b.write_u32(2);
        assert_eq!(a.concat(&b).words(), &[1, 2]);
    }
}

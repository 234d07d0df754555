/// Sizes at or below this are never worth distinguishing.
const MIN_APPROX_SIZE: u32 = 16;

/// Above this, power-of-two rounding wastes too much memory, so the midpoint
/// between two powers of two is used when it fits.
const MAGIC_TOLERANCE: u32 = 1024;

/// Rounds `size` up to a backing-store size that is likely to be reused.
///
/// Monotonic and never smaller than `size`.
pub fn approximate_size(size: u32) -> u32 {
    if size <= MIN_APPROX_SIZE {
        return MIN_APPROX_SIZE;
    }
    if size.is_power_of_two() {
        return size;
    }
    let Some(ceil) = size.checked_next_power_of_two() else {
        return size;
    };
    if size <= MAGIC_TOLERANCE {
        return ceil;
    }
    let floor = ceil / 2;
    let mid = floor + floor / 2;
    if size <= mid { mid } else { ceil }
}

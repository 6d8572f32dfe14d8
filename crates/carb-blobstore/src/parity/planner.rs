//! Pure planning function: derive block size and redundancy from blob size
//! and whatever the caller already pinned down.

use carb_core::config::BlockSize;

/// Blobs are split into roughly this many data slices when the block size
/// is left to the planner.
pub const TARGET_DATA_SLICES: u64 = 16;
/// The codec needs at least this many parity slices to call a blob
/// recoverable against single-slice damage.
pub const MIN_PARITY_SLICES: u64 = 4;
/// Smallest block size the planner will choose in auto mode.
pub const MIN_BLOCK: u64 = 512;
/// Largest block size the planner will choose in auto mode.
pub const MAX_BLOCK: u64 = 4 * 1024 * 1024;
/// Redundancy used when nothing else constrains it.
pub const DEFAULT_REDUNDANCY_PERCENT: u8 = 10;
/// The codec refuses redundancy above this.
pub const MAX_REDUNDANCY_PERCENT: u8 = 80;

fn ceil_div(a: u64, b: u64) -> u64 {
    if b == 0 {
        return a;
    }
    (a + b - 1) / b
}

/// Smallest redundancy percent that yields at least [`MIN_PARITY_SLICES`]
/// parity slices across `data_slices` data slices.
fn min_parity_redundancy(data_slices: u64) -> u8 {
    let needed = ceil_div(MIN_PARITY_SLICES * 100, data_slices.max(1));
    needed.min(u64::from(MAX_REDUNDANCY_PERCENT)) as u8
}

fn next_power_of_two(n: u64) -> u64 {
    n.next_power_of_two()
}

/// Derive `(block_size, redundancy_percent)` for a blob of `size` bytes.
///
/// - Both block size and redundancy already pinned: returned unchanged.
/// - Only block size pinned: redundancy is derived from the resulting
///   data-slice count, floored at whatever the caller configured.
/// - Neither pinned: the block size is derived too, starting from a
///   `size / TARGET_DATA_SLICES` target clamped to `[MIN_BLOCK, MAX_BLOCK]`
///   and rounded up to a power of two.
#[must_use]
pub fn plan(size: u64, block: BlockSize, redundancy: Option<u8>) -> (u64, u8) {
    match (block, redundancy) {
        (BlockSize::Fixed(b), Some(r)) => (b, r.min(MAX_REDUNDANCY_PERCENT)),
        (BlockSize::Fixed(b), None) => {
            let data_slices = ceil_div(size, b).max(1);
            let r = DEFAULT_REDUNDANCY_PERCENT.max(min_parity_redundancy(data_slices));
            (b, r.min(MAX_REDUNDANCY_PERCENT))
        }
        (BlockSize::Auto, configured_r) => {
            let target = (size / TARGET_DATA_SLICES).clamp(MIN_BLOCK, MAX_BLOCK);
            let b = next_power_of_two(target);
            let data_slices = ceil_div(size, b).max(1);
            let base = configured_r.unwrap_or(DEFAULT_REDUNDANCY_PERCENT);
            let r = base.max(min_parity_redundancy(data_slices));
            (b, r.min(MAX_REDUNDANCY_PERCENT))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_configured_are_returned_unchanged() {
        let (b, r) = plan(10_000_000, BlockSize::Fixed(65536), Some(25));
        assert_eq!((b, r), (65536, 25));
    }

    #[test]
    fn only_block_configured_derives_redundancy_from_slice_count() {
        // 1000 bytes over a 100-byte block is 10 data slices; min parity
        // redundancy for 4 parity slices over 10 data slices is 40%.
        let (b, r) = plan(1000, BlockSize::Fixed(100), None);
        assert_eq!(b, 100);
        assert_eq!(r, 40);
    }

    #[test]
    fn only_block_configured_floors_at_default_when_slices_are_plentiful() {
        let (b, r) = plan(1_000_000, BlockSize::Fixed(1000), None);
        assert_eq!(b, 1000);
        assert_eq!(r, DEFAULT_REDUNDANCY_PERCENT);
    }

    #[test]
    fn full_auto_picks_a_power_of_two_block_within_bounds() {
        let (b, _r) = plan(16 * 1024 * 1024, BlockSize::Auto, None);
        assert!(b.is_power_of_two());
        assert!((MIN_BLOCK..=MAX_BLOCK).contains(&b));
    }

    #[test]
    fn full_auto_clamps_tiny_blobs_to_min_block() {
        let (b, _r) = plan(10, BlockSize::Auto, None);
        assert_eq!(b, MIN_BLOCK);
    }

    #[test]
    fn full_auto_clamps_huge_blobs_to_max_block() {
        let (b, _r) = plan(u64::from(u32::MAX) * 1024, BlockSize::Auto, None);
        assert_eq!(b, MAX_BLOCK);
    }

    #[test]
    fn redundancy_never_exceeds_the_codec_ceiling() {
        let (_b, r) = plan(100, BlockSize::Fixed(1), Some(255));
        assert_eq!(r, MAX_REDUNDANCY_PERCENT);
        // 5 data slices needs ceil(4*100/5) = 80% to hit MIN_PARITY_SLICES.
        let (_b, r) = plan(5, BlockSize::Fixed(1), None);
        assert_eq!(r, MAX_REDUNDANCY_PERCENT);
    }
}

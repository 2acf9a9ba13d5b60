//! Standard tournament seed placement.
//!
//! Starting from `[1, 2]`, each doubling from `k` to `2k` slots replaces
//! every slot value `v` with the pair `[v, 2k + 1 - v]`:
//!
//! ```text
//! 2: [1, 2]
//! 4: [1, 4, 2, 3]
//! 8: [1, 8, 4, 5, 2, 7, 3, 6]
//! ```
//!
//! Seeds 1 and 2 land in opposite halves and can only meet in the final, and
//! the best remaining seed always faces the worst remaining seed.

use crate::error::BracketError;

/// Slot → seed mapping for a bracket of `size` slots.
///
/// `result[i]` is the seed placed in slot `i + 1`. `size` must be a positive
/// power of two.
pub fn seed_order(size: usize) -> Result<Vec<u32>, BracketError> {
    if size == 0 || !size.is_power_of_two() {
        return Err(BracketError::InvalidBracketSize(size));
    }
    if size == 1 {
        return Ok(vec![1]);
    }

    let mut order: Vec<u32> = vec![1, 2];
    while order.len() < size {
        let doubled = (order.len() * 2) as u32;
        order = order
            .iter()
            .flat_map(|&seed| [seed, doubled + 1 - seed])
            .collect();
    }
    Ok(order)
}

/// Smallest power of two that holds `count` entrants (`0` for no entrants).
pub fn bracket_size_for(count: usize) -> usize {
    if count == 0 { 0 } else { count.next_power_of_two() }
}

/// Number of rounds a bracket of `size` slots needs (`log2(size)`).
pub fn round_count(size: usize) -> u32 {
    if size < 2 { 0 } else { size.trailing_zeros() }
}

//! Bracket seeding: which seed meets which in the first elimination round.

/// Standard balanced seeding for a bracket of `bracket_size` slots (a power of two >= 2).
///
/// Starts at `[1, 2]` and doubles: each seed `s` in a list of length `k` is followed by its
/// mirror `2k + 1 - s`. Read in adjacent pairs, seeds 1 and 2 can only meet in the final,
/// seeds 1-4 only from the semifinals, and so on.
pub fn seed_order(bracket_size: usize) -> Vec<usize> {
    debug_assert!(bracket_size >= 2 && bracket_size.is_power_of_two());
    let mut seeds = vec![1, 2];
    while seeds.len() < bracket_size {
        let sum = seeds.len() * 2 + 1;
        seeds = seeds.iter().flat_map(|&s| [s, sum - s]).collect();
    }
    seeds
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_orders() {
        assert_eq!(seed_order(2), vec![1, 2]);
        assert_eq!(seed_order(4), vec![1, 4, 2, 3]);
        assert_eq!(seed_order(8), vec![1, 8, 4, 5, 2, 7, 3, 6]);
        assert_eq!(
            seed_order(16),
            vec![1, 16, 8, 9, 4, 13, 5, 12, 2, 15, 7, 10, 3, 14, 6, 11]
        );
    }

    #[test]
    fn every_first_round_pair_sums_to_size_plus_one() {
        for size in [2, 4, 8, 16, 32, 64] {
            let order = seed_order(size);
            for pair in order.chunks_exact(2) {
                assert_eq!(pair[0] + pair[1], size + 1);
            }
        }
    }
}

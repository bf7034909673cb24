//! Integer percentage distribution.

/// Distributes integer percentages over `counts` so they sum to exactly 100.
///
/// Uses the largest-remainder method: each share gets its floored
/// percentage first, then the leftover points go to the entries with the
/// largest fractional remainders. Naive per-item rounding can sum to 99 or
/// 101, which breaks downstream consumers that assert on the total.
///
/// Returns all zeros when `counts` sums to zero.
pub fn largest_remainder_percentages(counts: &[usize]) -> Vec<u32> {
    let total: usize = counts.iter().sum();
    if total == 0 {
        return vec![0; counts.len()];
    }

    let mut floors: Vec<u32> = Vec::with_capacity(counts.len());
    let mut remainders: Vec<(usize, u64)> = Vec::with_capacity(counts.len());

    for (index, &count) in counts.iter().enumerate() {
        let scaled = count as u64 * 100;
        floors.push((scaled / total as u64) as u32);
        remainders.push((index, scaled % total as u64));
    }

    let assigned: u32 = floors.iter().sum();
    let mut leftover = 100 - assigned;

    // Stable sort keeps earlier entries first on remainder ties.
    remainders.sort_by(|a, b| b.1.cmp(&a.1));

    for (index, _) in remainders {
        if leftover == 0 {
            break;
        }
        floors[index] += 1;
        leftover -= 1;
    }

    floors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sums_to_exactly_100() {
        let result = largest_remainder_percentages(&[3, 1, 1]);
        assert_eq!(result, vec![60, 20, 20]);
        assert_eq!(result.iter().sum::<u32>(), 100);
    }

    #[test]
    fn distributes_remainder_to_largest_fraction() {
        // 1/3 each floors to 33; one entry gets the leftover point.
        let result = largest_remainder_percentages(&[1, 1, 1]);
        assert_eq!(result.iter().sum::<u32>(), 100);
        assert!(result.contains(&34));
    }

    #[test]
    fn empty_counts_yield_zeros() {
        assert_eq!(largest_remainder_percentages(&[0, 0]), vec![0, 0]);
        assert!(largest_remainder_percentages(&[]).is_empty());
    }

    #[test]
    fn single_entry_gets_everything() {
        assert_eq!(largest_remainder_percentages(&[7]), vec![100]);
    }

    #[test]
    fn skewed_distribution_still_sums_to_100() {
        let result = largest_remainder_percentages(&[997, 1, 1, 1]);
        assert_eq!(result.iter().sum::<u32>(), 100);
    }
}

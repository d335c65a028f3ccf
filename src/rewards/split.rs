//! Integer splitting used for every reward distribution.

/// Split `total` into `parts` buckets.
///
/// Every bucket gets `total / parts` and the remainder is added to the
/// last bucket, so the buckets always sum to `total`. Zero parts gives an
/// empty result.
pub fn split_int_equally(total: u32, parts: usize) -> Vec<u32> {
    if parts == 0 {
        return Vec::new();
    }

    // Counts above u32::MAX can only produce zero-sized buckets plus the total.
    let divisor = u32::try_from(parts).unwrap_or(u32::MAX);
    let share = total / divisor;
    let remainder = total - share * divisor;

    let mut buckets = vec![share; parts];
    if let Some(last) = buckets.last_mut() {
        *last += remainder;
    }
    buckets
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remainder_goes_to_last_bucket() {
        assert_eq!(split_int_equally(10, 3), vec![3, 3, 4]);
        assert_eq!(split_int_equally(7, 1), vec![7]);
        assert_eq!(split_int_equally(2, 4), vec![0, 0, 0, 2]);
    }

    #[test]
    fn zero_total_gives_zero_buckets() {
        assert_eq!(split_int_equally(0, 5), vec![0; 5]);
    }

    #[test]
    fn zero_parts_is_empty() {
        assert!(split_int_equally(10, 0).is_empty());
    }

    #[test]
    fn buckets_always_sum_to_total() {
        for total in [0, 1, 9, 10, 11, 99, 1000, 12345] {
            for parts in 1..12 {
                let buckets = split_int_equally(total, parts);
                let floor = total / parts as u32;

                assert_eq!(buckets.len(), parts);
                assert_eq!(buckets.iter().sum::<u32>(), total);
                assert!(buckets.iter().all(|b| *b >= floor));
                assert!(buckets.iter().filter(|b| **b > floor).count() <= 1);
            }
        }
    }
}

//! Group count and per-group capacity.

use crate::error::{AllocationError, Result};

/// Reject group sizes that cannot form groups: non-finite or below 2.
pub fn check_desired_size(desired_size: f64) -> Result<()> {
    if !desired_size.is_finite() || desired_size < 2.0 {
        return Err(AllocationError::InvalidConfiguration(format!(
            "desired group size must be a finite number >= 2, got {}",
            desired_size
        )));
    }
    Ok(())
}

/// Split `n` people into groups of roughly `desired_size`.
///
/// The group count is `round(n / desired_size)` with halves rounded away
/// from zero, and never less than one. Capacities differ by at most one,
/// the larger ones first, and always sum to `n`.
pub fn compute_group_sizes(n: usize, desired_size: f64) -> Result<Vec<usize>> {
    check_desired_size(desired_size)?;
    if n < 2 {
        return Err(AllocationError::InvalidConfiguration(format!(
            "need at least 2 people to form groups, got {}",
            n
        )));
    }

    let groups = ((n as f64 / desired_size).round() as usize).max(1);
    let base = n / groups;
    let remainder = n - base * groups;

    Ok((0..groups)
        .map(|i| if i < remainder { base + 1 } else { base })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_people_one_group() {
        assert_eq!(compute_group_sizes(2, 2.0).unwrap(), vec![2]);
    }

    #[test]
    fn test_seven_by_three() {
        // 7 / 3 = 2.33 rounds to 2 groups
        assert_eq!(compute_group_sizes(7, 3.0).unwrap(), vec![4, 3]);
    }

    #[test]
    fn test_half_rounds_up() {
        // 5 / 2 = 2.5 rounds to 3 groups
        assert_eq!(compute_group_sizes(5, 2.0).unwrap(), vec![2, 2, 1]);
    }

    #[test]
    fn test_large_desired_size_gives_single_group() {
        assert_eq!(compute_group_sizes(9, 100.0).unwrap(), vec![9]);
    }

    #[test]
    fn test_fractional_desired_size() {
        assert_eq!(compute_group_sizes(10, 2.5).unwrap(), vec![3, 3, 2, 2]);
    }

    #[test]
    fn test_rejects_small_or_non_finite_size() {
        for bad in [1.0, 1.99, 0.0, -3.0, f64::NAN, f64::INFINITY] {
            assert!(
                matches!(
                    compute_group_sizes(10, bad),
                    Err(AllocationError::InvalidConfiguration(_))
                ),
                "accepted {}",
                bad
            );
        }
    }

    #[test]
    fn test_rejects_tiny_population() {
        assert!(matches!(
            compute_group_sizes(1, 2.0),
            Err(AllocationError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_sizes_are_even_and_complete() {
        for n in 2..120 {
            for desired in [2.0, 2.5, 3.0, 4.0, 5.0, 7.5, 10.0, 50.0] {
                let sizes = compute_group_sizes(n, desired).unwrap();
                assert_eq!(sizes.iter().sum::<usize>(), n);
                let min = *sizes.iter().min().unwrap();
                let max = *sizes.iter().max().unwrap();
                assert!(min >= 1);
                assert!(max - min <= 1, "n={} d={} sizes={:?}", n, desired, sizes);
            }
        }
    }
}

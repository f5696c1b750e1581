//! Saturating summation of `i16` vectors.
//!
//! This is the whole computational payload of the service: each vector in a
//! batch collapses to one `i16`. The contract is bound saturation with
//! short-circuit: accumulation runs in `i32`, and the first time the running
//! total leaves the `i16` range the result is the breached bound and no
//! further elements are added. Clamping only the final total would be wrong:
//! later elements could pull an out-of-range intermediate back in range and
//! mask the overflow.

/// Sum a vector of `i16` elements, saturating at the `i16` bounds.
///
/// Returns the exact sum when it stays within `[i16::MIN, i16::MAX]`,
/// `i16::MAX` on the first breach above, `i16::MIN` on the first breach
/// below. The empty vector sums to 0.
pub fn saturating_sum(elements: &[i16]) -> i16 {
    let mut total: i32 = 0;
    for &value in elements {
        total += i32::from(value);
        if total > i32::from(i16::MAX) {
            return i16::MAX;
        }
        if total < i32::from(i16::MIN) {
            return i16::MIN;
        }
    }
    // In range by the checks above.
    total as i16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_vector_sums_to_zero() {
        assert_eq!(saturating_sum(&[]), 0);
    }

    #[test]
    fn exact_sum_when_in_range() {
        assert_eq!(saturating_sum(&[100, 200, 300]), 600);
        assert_eq!(saturating_sum(&[-5, 5]), 0);
        assert_eq!(saturating_sum(&[i16::MAX]), i16::MAX);
        assert_eq!(saturating_sum(&[i16::MIN]), i16::MIN);
    }

    #[test]
    fn saturates_to_upper_bound() {
        assert_eq!(saturating_sum(&[32760, 10]), i16::MAX);
        assert_eq!(saturating_sum(&[i16::MAX, 1]), i16::MAX);
    }

    #[test]
    fn saturates_to_lower_bound() {
        assert_eq!(saturating_sum(&[-32760, -10]), i16::MIN);
        assert_eq!(saturating_sum(&[i16::MIN, -1]), i16::MIN);
    }

    #[test]
    fn intermediate_overflow_is_not_masked() {
        // 32767 + 1 breaches, and the trailing -100 must not pull it back.
        assert_eq!(saturating_sum(&[i16::MAX, 1, -100]), i16::MAX);
        assert_eq!(saturating_sum(&[i16::MIN, -1, 100]), i16::MIN);
    }

    #[test]
    fn touching_a_bound_without_breaching_is_exact() {
        assert_eq!(saturating_sum(&[32766, 1]), i16::MAX);
        assert_eq!(saturating_sum(&[-32767, -1]), i16::MIN);
        assert_eq!(saturating_sum(&[32766, 1, -1]), 32766);
    }
}

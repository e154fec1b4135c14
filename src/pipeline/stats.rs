/// `numerator / denominator` as a whole percentage, rounded half up.
/// A zero denominator yields 0 rather than a division error.
pub fn percent(numerator: u64, denominator: u64) -> u32 {
    if denominator == 0 {
        return 0;
    }
    ((numerator as f64 / denominator as f64) * 100.0 + 0.5).floor() as u32
}

/// Round half up to the nearest integer.
pub fn round0(x: f64) -> i64 {
    (x + 0.5).floor() as i64
}

/// Round half up to one decimal.
pub fn round1(x: f64) -> f64 {
    ((10.0 * x) + 0.5).floor() / 10.0
}

/// Mean of the values, or `None` when there are none.
pub fn mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    let mut sum = 0.0;
    let mut n = 0usize;
    for v in values {
        sum += v;
        n += 1;
    }
    if n == 0 {
        None
    } else {
        Some(sum / n as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregate_open_rate_over_two_records() {
        assert_eq!(percent(108 + 85, 120 + 90), 92);
    }

    #[test]
    fn zero_denominator_is_zero() {
        assert_eq!(percent(0, 0), 0);
        assert_eq!(percent(5, 0), 0);
    }

    #[test]
    fn rounding_is_half_up() {
        assert_eq!(percent(1, 8), 13);
        assert_eq!(round0(84.5), 85);
        assert_eq!(round1(88.75), 88.8);
        assert_eq!(round1(0.0), 0.0);
    }

    #[test]
    fn mean_of_nothing_is_none() {
        assert_eq!(mean(Vec::<f64>::new()), None);
        assert_eq!(mean(vec![90.0, 80.0]), Some(85.0));
    }
}

//! Pure integer statistics over window contents
//!
//! Every function recomputes from its inputs with i128 intermediates, so
//! results depend only on the values passed in.

use crate::core::fixed_point::{floor_div_wide, isqrt, MILLI};
use crate::core::{Cents, Lots};

/// Volume-weighted average price, floored. 0 when the volume sum is 0.
pub fn vwap<I>(samples: I) -> Cents
where
    I: IntoIterator<Item = (Cents, Lots)>,
{
    let mut notional: i128 = 0;
    let mut volume: i128 = 0;
    for (price, vol) in samples {
        notional += price as i128 * vol as i128;
        volume += vol as i128;
    }

    if volume == 0 {
        return 0;
    }
    floor_div_wide(notional, volume)
}

/// Population standard deviation in thousandths, floored
///
/// `floor(1000 * sqrt(n*Σx² - (Σx)²) / n)`; 0 for an empty input.
pub fn stddev_milli<I>(values: I) -> i64
where
    I: IntoIterator<Item = i64>,
{
    let mut n: i128 = 0;
    let mut sum: i128 = 0;
    let mut sum_sq: i128 = 0;
    for x in values {
        let x = x as i128;
        n += 1;
        sum += x;
        sum_sq += x * x;
    }

    if n == 0 {
        return 0;
    }

    let spread = (n * sum_sq - sum * sum).max(0) as u128;
    let scaled = isqrt(spread * (MILLI as u128 * MILLI as u128));
    (scaled / n as u128).min(i64::MAX as u128) as i64
}

/// Least-squares slope of y against x in thousandths, floored
///
/// 0 when fewer than two distinct x values are present.
pub fn ols_slope_milli<I>(points: I) -> i64
where
    I: IntoIterator<Item = (i64, i64)>,
{
    let mut n: i128 = 0;
    let mut sx: i128 = 0;
    let mut sy: i128 = 0;
    let mut sxx: i128 = 0;
    let mut sxy: i128 = 0;
    for (x, y) in points {
        let (x, y) = (x as i128, y as i128);
        n += 1;
        sx += x;
        sy += y;
        sxx += x * x;
        sxy += x * y;
    }

    let denominator = n * sxx - sx * sx;
    if denominator == 0 {
        return 0;
    }
    let numerator = n * sxy - sx * sy;
    floor_div_wide(numerator * MILLI as i128, denominator)
}

/// Arithmetic mean, floored. `None` for an empty input.
pub fn mean<I>(values: I) -> Option<i64>
where
    I: IntoIterator<Item = i64>,
{
    let mut n: i128 = 0;
    let mut sum: i128 = 0;
    for x in values {
        n += 1;
        sum += x as i128;
    }

    (n > 0).then(|| floor_div_wide(sum, n))
}

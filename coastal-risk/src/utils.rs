//! Small numeric helpers shared by scoring and fusion

/// Round to `places` decimal places
///
/// Rounds the exact binary value of `value`, so a double stored just below a
/// decimal tie (0.345 is 0.34499…) rounds down. Scaling by 10^places first
/// would round that tie up.
pub fn round_to(value: f64, places: usize) -> f64 {
    format!("{:.*}", places, value).parse().unwrap_or(value)
}

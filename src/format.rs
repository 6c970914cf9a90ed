//! Turning results back into text.

/// Values with a long decimal expansion are cut down to this many
/// significant digits.
const SIGNIFICANT_DIGITS: usize = 10;

/// Render a calculated value the way the calculator displays it.
///
/// Integers and short decimals are printed as-is. Anything else is rounded
/// to [`SIGNIFICANT_DIGITS`] significant digits, so `1/3` becomes
/// `0.3333333333` instead of `0.3333333333333333`.
pub fn number(value: f64) -> String {
    // adding zero turns -0 into 0
    let value = value + 0.0;
    let plain = value.to_string();

    if value.fract() == 0.0 || plain.len() <= SIGNIFICANT_DIGITS {
        return plain;
    }

    let scientific = format!("{:.*e}", SIGNIFICANT_DIGITS - 1, value);
    let rounded: f64 = scientific.parse().unwrap_or(value);
    rounded.to_string()
}

//! Formatting helpers shared by the renderers.

const DECIMAL_UNITS: [&str; 5] = ["kB", "MB", "GB", "TB", "PB"];

const DURATION_UNITS: [(&str, u64); 7] = [
    ("year", 31_557_600),
    ("month", 2_629_800),
    ("week", 604_800),
    ("day", 86_400),
    ("hour", 3_600),
    ("minute", 60),
    ("second", 1),
];

/// Human-readable byte count in decimal units, e.g. `1.5 MB`.
#[must_use]
pub fn format_bytes(bytes: u64) -> String {
    if bytes < 1_000 {
        return format!("{bytes} B");
    }
    let mut value = bytes_to_f64(bytes) / 1_000.0;
    let mut unit = DECIMAL_UNITS[0];
    // Anything that would round up to 1000 moves to the next unit.
    for next in &DECIMAL_UNITS[1..] {
        if value < 999.5 {
            break;
        }
        value /= 1_000.0;
        unit = *next;
    }
    let decimals = if value < 10.0 {
        2
    } else if value < 100.0 {
        1
    } else {
        0
    };
    let rendered = format!("{value:.decimals$}");
    let trimmed = if rendered.contains('.') {
        rendered.trim_end_matches('0').trim_end_matches('.')
    } else {
        rendered.as_str()
    };
    format!("{trimmed} {unit}")
}

/// Ratio in `0.0..=1.0` as a percentage with two decimals.
#[must_use]
pub fn format_percent(ratio: f64) -> String {
    format!("{:.2}%", ratio * 100.0)
}

/// Duration spelled with its two largest units, the smaller one rounded.
#[must_use]
pub fn format_duration(seconds: u64) -> String {
    let Some(first) = DURATION_UNITS
        .iter()
        .position(|(_, size)| seconds >= *size)
    else {
        return "0 seconds".to_string();
    };
    let (first_name, first_size) = DURATION_UNITS[first];
    let mut first_count = seconds / first_size;
    let remainder = seconds % first_size;

    let Some(&(second_name, second_size)) = DURATION_UNITS.get(first + 1) else {
        return plural(first_count, first_name);
    };
    let mut second_count = (remainder + second_size / 2) / second_size;
    if second_count * second_size >= first_size {
        first_count += 1;
        second_count = 0;
    }

    if second_count == 0 {
        plural(first_count, first_name)
    } else {
        format!(
            "{}, {}",
            plural(first_count, first_name),
            plural(second_count, second_name)
        )
    }
}

fn plural(count: u64, unit: &str) -> String {
    if count == 1 {
        format!("{count} {unit}")
    } else {
        format!("{count} {unit}s")
    }
}

fn bytes_to_f64(value: u64) -> f64 {
    let high = u32::try_from(value >> 32).unwrap_or(u32::MAX);
    let low = u32::try_from(value & 0xFFFF_FFFF).unwrap_or(u32::MAX);
    f64::from(high).mul_add(4_294_967_296.0, f64::from(low))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_use_decimal_units() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(999), "999 B");
        assert_eq!(format_bytes(1_500), "1.5 kB");
        assert_eq!(format_bytes(12_340_000), "12.3 MB");
        assert_eq!(format_bytes(250_000_000_000), "250 GB");
        assert_eq!(format_bytes(2_000_000_000_000), "2 TB");
    }

    #[test]
    fn bytes_roll_over_before_rounding_to_a_thousand() {
        assert_eq!(format_bytes(999_499), "999 kB");
        assert_eq!(format_bytes(999_999), "1 MB");
        assert_eq!(format_bytes(999_999_999), "1 GB");
    }

    #[test]
    fn durations_keep_two_largest_units() {
        assert_eq!(format_duration(0), "0 seconds");
        assert_eq!(format_duration(1), "1 second");
        assert_eq!(format_duration(3_725), "1 hour, 2 minutes");
        assert_eq!(format_duration(3_600), "1 hour");
        assert_eq!(format_duration(119), "1 minute, 59 seconds");
        assert_eq!(format_duration(86_400 + 3_599), "1 day, 1 hour");
    }

    #[test]
    fn percent_has_two_decimals() {
        assert_eq!(format_percent(0.25), "25.00%");
        assert_eq!(format_percent(1.0), "100.00%");
    }
}

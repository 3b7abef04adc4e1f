//! Human readable file sizes.

const UNITS: [&str; 5] = ["Byte", "kB", "Mb", "Gb", "Tb"];

/// Format a byte count, dividing by 1024 while the value exceeds 1024.
///
/// The final value is rounded to the nearest integer; sizes past the
/// terabyte range stay in `Tb`.
pub fn human_readable_size(bytes: u64) -> String {
    let mut size = bytes as f64;
    let mut unit = 0;
    while size > 1024.0 && unit + 1 < UNITS.len() {
        size /= 1024.0;
        unit += 1;
    }
    format!("{} {}", size.round(), UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes() {
        assert_eq!(human_readable_size(0), "0 Byte");
        assert_eq!(human_readable_size(500), "500 Byte");
        assert_eq!(human_readable_size(1024), "1024 Byte");
    }

    #[test]
    fn test_rounds_to_nearest() {
        assert_eq!(human_readable_size(1536), "2 kB");
        assert_eq!(human_readable_size(1025), "1 kB");
        assert_eq!(human_readable_size(5 * 1024 * 1024 + 1), "5 Mb");
    }

    #[test]
    fn test_caps_at_terabytes() {
        assert_eq!(human_readable_size(3 * 1024u64.pow(4) + 1), "3 Tb");
        assert_eq!(human_readable_size(2048 * 1024u64.pow(4)), "2048 Tb");
    }
}

//! Human-readable byte counts for logs and CLI output.

/// Formats `n` bytes with binary (IEC) units, e.g. `1.5 KiB`.
pub fn format_bytes_iec(n: u64) -> String {
    const UNIT: u64 = 1024;
    if n < UNIT {
        return format!("{} B", n);
    }
    let mut div = UNIT;
    let mut exp = 0usize;
    let mut rest = n / UNIT;
    while rest >= UNIT && exp < 5 {
        div *= UNIT;
        exp += 1;
        rest /= UNIT;
    }
    let prefix = b"KMGTPE"[exp] as char;
    format!("{:.1} {}iB", n as f64 / div as f64, prefix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn below_one_kib_is_plain_bytes() {
        assert_eq!(format_bytes_iec(0), "0 B");
        assert_eq!(format_bytes_iec(1023), "1023 B");
    }

    #[test]
    fn scales_through_prefixes() {
        assert_eq!(format_bytes_iec(1024), "1.0 KiB");
        assert_eq!(format_bytes_iec(1536), "1.5 KiB");
        assert_eq!(format_bytes_iec(1024 * 1024), "1.0 MiB");
        assert_eq!(format_bytes_iec(5 * 1024 * 1024 * 1024), "5.0 GiB");
        assert_eq!(format_bytes_iec(u64::MAX), "16.0 EiB");
    }
}

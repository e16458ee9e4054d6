//! Human-readable formatting of transfer volumes.

/// Format a byte count with decimal units
pub fn format_bytes(bytes: f64) -> String {
    let abs = bytes.abs();
    if abs >= 1_000_000_000.0 {
        format!("{:.2} GB", bytes / 1_000_000_000.0)
    } else if abs >= 1_000_000.0 {
        format!("{:.2} MB", bytes / 1_000_000.0)
    } else if abs >= 1_000.0 {
        format!("{:.2} KB", bytes / 1_000.0)
    } else {
        format!("{} B", bytes.round())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(500.0), "500 B");
        assert_eq!(format_bytes(0.0), "0 B");
        assert_eq!(format_bytes(1_500.0), "1.50 KB");
        assert_eq!(format_bytes(262_144.0), "262.14 KB");
        assert_eq!(format_bytes(2_500_000.0), "2.50 MB");
        assert_eq!(format_bytes(3_000_000_000.0), "3.00 GB");
    }
}

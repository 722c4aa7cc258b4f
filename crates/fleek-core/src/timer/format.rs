//! Duration formatting for timer displays and timesheets.

/// Always `HH:MM:SS`.
pub fn format_duration(secs: u64) -> String {
    let (hours, minutes, seconds) = split(secs);
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

/// `MM:SS` below one hour, `HH:MM:SS` otherwise.
pub fn format_clock(secs: u64) -> String {
    let (hours, minutes, seconds) = split(secs);
    if hours > 0 {
        format!("{hours:02}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes:02}:{seconds:02}")
    }
}

fn split(secs: u64) -> (u64, u64, u64) {
    (secs / 3600, (secs % 3600) / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_pads_all_fields() {
        assert_eq!(format_duration(0), "00:00:00");
        assert_eq!(format_duration(3_725), "01:02:05");
        assert_eq!(format_duration(100 * 3600), "100:00:00");
    }

    #[test]
    fn clock_drops_hours_below_one_hour() {
        assert_eq!(format_clock(59), "00:59");
        assert_eq!(format_clock(3_599), "59:59");
        assert_eq!(format_clock(3_600), "01:00:00");
    }
}

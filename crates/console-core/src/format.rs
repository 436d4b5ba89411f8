use chrono::{DateTime, Local, NaiveDateTime, TimeZone};

const SIZE_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Human-readable size: whole bytes below 1 KB, one decimal above
pub fn format_file_size(bytes: u64) -> String {
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{} {}", bytes, SIZE_UNITS[0])
    } else {
        format!("{:.1} {}", value, SIZE_UNITS[unit])
    }
}

/// Upload time in the local timezone. Unparseable values are shown as-is.
pub fn format_uploaded_at(raw: &str) -> String {
    format_uploaded_at_in(raw, &Local)
}

pub fn format_uploaded_at_in<Tz>(raw: &str, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    const DISPLAY: &str = "%Y-%m-%d %H:%M";

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.with_timezone(tz).format(DISPLAY).to_string();
    }
    // some backends drop the offset
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return naive.and_utc().with_timezone(tz).format(DISPLAY).to_string();
    }
    raw.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(0), "0 B");
        assert_eq!(format_file_size(1023), "1023 B");
        assert_eq!(format_file_size(1024), "1.0 KB");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(5 * 1024 * 1024), "5.0 MB");
        assert_eq!(format_file_size(1073741824), "1.0 GB");
        assert_eq!(format_file_size(3 * 1024u64.pow(5)), "3072.0 TB");
    }

    #[test]
    fn test_format_uploaded_at() {
        assert_eq!(
            format_uploaded_at_in("2024-03-01T10:05:00Z", &Utc),
            "2024-03-01 10:05"
        );
        assert_eq!(
            format_uploaded_at_in("2024-03-01T10:05:00.123+02:00", &Utc),
            "2024-03-01 08:05"
        );
        let plus_one = FixedOffset::east_opt(3600).unwrap();
        assert_eq!(
            format_uploaded_at_in("2024-03-01T23:30:00", &plus_one),
            "2024-03-02 00:30"
        );
        assert_eq!(format_uploaded_at_in("yesterday", &Utc), "yesterday");
    }
}

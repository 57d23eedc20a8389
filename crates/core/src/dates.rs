//! Release-date parsing for the supplemental CSV source and the
//! VideoDB export format.

use chrono::NaiveDate;

/// Formats tried in order when parsing a supplemental `date` column.
/// The first successful parse wins.
pub const RELEASE_DATE_FORMATS: &[&str] = &[
    "%b %d, %Y", // Nov 7, 2020
    "%B %d, %Y", // November 7, 2020
    "%m/%d/%Y",  // 11/7/2020
    "%Y-%m-%d",  // 2020-11-07
    "%d-%m-%Y",  // 07-11-2020
];

/// Parse a free-form release date string. Returns `None` when no
/// format in [`RELEASE_DATE_FORMATS`] matches.
pub fn parse_release_date(s: &str) -> Option<NaiveDate> {
    RELEASE_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// Format a release date for the VideoDB export (`Nov 07, 2020`), or
/// the empty string when unset.
pub fn format_release_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%b %d, %Y").to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn abbreviated_month() {
        let d = parse_release_date("Nov 7, 2020").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2020, 11, 7).unwrap());
    }

    #[test]
    fn full_month_name() {
        let d = parse_release_date("November 7, 2020").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2020, 11, 7).unwrap());
    }

    #[test]
    fn slash_format() {
        let d = parse_release_date("11/7/2020").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2020, 11, 7).unwrap());
    }

    #[test]
    fn iso_format() {
        let d = parse_release_date("2020-11-07").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2020, 11, 7).unwrap());
    }

    #[test]
    fn day_first_format() {
        let d = parse_release_date("07-11-2020").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2020, 11, 7).unwrap());
    }

    #[test]
    fn unparseable_returns_none() {
        assert!(parse_release_date("sometime in 2020").is_none());
        assert!(parse_release_date("").is_none());
    }

    #[test]
    fn export_formatting() {
        let d = NaiveDate::from_ymd_opt(2020, 11, 7);
        assert_eq!(format_release_date(d), "Nov 07, 2020");
        assert_eq!(format_release_date(None), "");
    }
}

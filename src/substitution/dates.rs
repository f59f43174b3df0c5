//! Human-readable rendering of proposal dates

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

use super::SubstitutionError;
use crate::message::{non_blank, SiteInformation};

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d/%m/%Y %I:%M:%S %p",
    "%d/%m/%Y %I:%M %p",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y"];

/// Start and deadline dates as they appear on the page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedDates {
    pub start: String,
    pub deadline: String,
}

/// Render both proposal dates. Blank inputs render as empty strings.
pub fn render_dates(info: &SiteInformation) -> Result<RenderedDates, SubstitutionError> {
    let deadline = render_optional("ProposalDeadLineDate", &info.proposal_dead_line_date)?;
    let start = render_optional("ProposalStartDate", &info.proposal_start_date)?;
    Ok(RenderedDates { start, deadline })
}

fn render_optional(field: &str, value: &Option<String>) -> Result<String, SubstitutionError> {
    match non_blank(value) {
        Some(raw) => format_proposal_date(raw).map_err(|e| e.for_field(field)),
        None => Ok(String::new()),
    }
}

/// Format as `"3rd of June, 2021 02:30 PM"`
pub fn format_proposal_date(value: &str) -> Result<String, SubstitutionError> {
    let date = parse_date(value)?;
    Ok(format!(
        "{} of {}, {} {}",
        ordinal(date.day()),
        date.format("%B"),
        date.format("%Y"),
        date.format("%I:%M %p")
    ))
}

/// Parse the date formats queue producers are known to send.
///
/// Values with an offset keep their own wall-clock time. Slash dates are
/// read day-first (`13/06/2021`) whatever the host locale, so a month-first
/// value such as `06/13/2021` is rejected rather than guessed at.
pub fn parse_date(value: &str) -> Result<NaiveDateTime, SubstitutionError> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.naive_local());
    }

    DATE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .ok_or_else(|| SubstitutionError::InvalidDate {
            field: None,
            value: value.to_string(),
        })
}

/// English ordinal for a day number: 1st, 2nd, 3rd, 4th, 11th, 21st, 112th
pub fn ordinal(number: u32) -> String {
    let suffix = match (number % 100, number % 10) {
        (11..=13, _) => "th",
        (_, 1) => "st",
        (_, 2) => "nd",
        (_, 3) => "rd",
        _ => "th",
    };
    format!("{number}{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordinal_examples() {
        assert_eq!(ordinal(1), "1st");
        assert_eq!(ordinal(2), "2nd");
        assert_eq!(ordinal(3), "3rd");
        assert_eq!(ordinal(4), "4th");
        assert_eq!(ordinal(11), "11th");
        assert_eq!(ordinal(12), "12th");
        assert_eq!(ordinal(13), "13th");
        assert_eq!(ordinal(21), "21st");
        assert_eq!(ordinal(22), "22nd");
        assert_eq!(ordinal(103), "103rd");
        assert_eq!(ordinal(111), "111th");
        assert_eq!(ordinal(112), "112th");
        assert_eq!(ordinal(0), "0th");
    }

    #[test]
    fn test_ordinal_rule_holds_for_range() {
        for n in 0..1000u32 {
            let rendered = ordinal(n);
            let expected = if matches!(n % 100, 11..=13) {
                "th"
            } else {
                match n % 10 {
                    1 => "st",
                    2 => "nd",
                    3 => "rd",
                    _ => "th",
                }
            };
            assert!(
                rendered.ends_with(expected),
                "ordinal({n}) = {rendered}, expected suffix {expected}"
            );
            assert!(rendered.starts_with(&n.to_string()));
        }
    }

    #[test]
    fn test_format_iso_date_time() {
        assert_eq!(
            format_proposal_date("2021-06-03 14:30").unwrap(),
            "3rd of June, 2021 02:30 PM"
        );
        assert_eq!(
            format_proposal_date("2021-06-21T09:05:00").unwrap(),
            "21st of June, 2021 09:05 AM"
        );
    }

    #[test]
    fn test_format_rfc3339_keeps_wall_clock() {
        assert_eq!(
            format_proposal_date("2021-11-12T16:45:00+10:00").unwrap(),
            "12th of November, 2021 04:45 PM"
        );
    }

    #[test]
    fn test_format_day_first_dates() {
        assert_eq!(
            format_proposal_date("3/06/2021 2:30:00 PM").unwrap(),
            "3rd of June, 2021 02:30 PM"
        );
        assert_eq!(
            format_proposal_date("22/02/2022").unwrap(),
            "22nd of February, 2022 12:00 AM"
        );
    }

    #[test]
    fn test_month_first_slash_date_is_rejected() {
        assert!(matches!(
            parse_date("06/13/2021"),
            Err(SubstitutionError::InvalidDate { .. })
        ));
    }

    #[test]
    fn test_malformed_date_fails() {
        let err = format_proposal_date("next tuesday").unwrap_err();
        assert!(matches!(err, SubstitutionError::InvalidDate { .. }));
    }

    #[test]
    fn test_render_dates_handles_blank_fields() {
        let info = SiteInformation {
            site_url: "https://contoso.sharepoint.com/sites/P1".to_string(),
            proposal_dead_line_date: Some("2021-06-03 14:30".to_string()),
            proposal_start_date: Some(" ".to_string()),
            ..Default::default()
        };

        let rendered = render_dates(&info).unwrap();
        assert_eq!(rendered.start, "");
        assert_eq!(rendered.deadline, "3rd of June, 2021 02:30 PM");
    }

    #[test]
    fn test_render_dates_names_failing_field() {
        let info = SiteInformation {
            proposal_start_date: Some("31/31/2021".to_string()),
            ..Default::default()
        };

        match render_dates(&info).unwrap_err() {
            SubstitutionError::InvalidDate { field, value } => {
                assert_eq!(field.as_deref(), Some("ProposalStartDate"));
                assert_eq!(value, "31/31/2021");
            }
        }
    }
}

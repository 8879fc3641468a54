//! Shared validation helpers for inbound HTTP adapters.
//!
//! Request bodies carry times, dates, and enum names as strings so malformed
//! values surface as structured `invalid_request` errors naming the field.

use std::str::FromStr;

use chrono::NaiveDate;
use serde_json::json;

use crate::domain::{
    EtaMinutes, Error, HistoryFilter, LineType, QueueCode, SiteCode, SlotTime, TruckStatus,
};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    InvalidTime,
    InvalidDate,
    InvalidSite,
    InvalidEta,
    InvalidStatus,
    InvalidLine,
    InvalidQueueCode,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidTime => "invalid_time",
            ErrorCode::InvalidDate => "invalid_date",
            ErrorCode::InvalidSite => "invalid_site",
            ErrorCode::InvalidEta => "invalid_eta",
            ErrorCode::InvalidStatus => "invalid_status",
            ErrorCode::InvalidLine => "invalid_line",
            ErrorCode::InvalidQueueCode => "invalid_queue_code",
        }
    }
}

/// Newtype wrapper for HTTP field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(self) -> &'static str {
        self.0
    }
}

fn invalid_value(field: FieldName, code: ErrorCode, message: String, value: &str) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "value": value,
        "code": code.as_str(),
    }))
}

fn parse_with<T: FromStr>(
    raw: &str,
    field: FieldName,
    code: ErrorCode,
    expected: &str,
) -> Result<T, Error> {
    raw.trim().parse().map_err(|_| {
        invalid_value(
            field,
            code,
            format!("{} must be {expected}", field.as_str()),
            raw,
        )
    })
}

/// Parse an `HH:MM` clock time.
pub(crate) fn parse_slot_time(raw: &str, field: FieldName) -> Result<SlotTime, Error> {
    parse_with(raw, field, ErrorCode::InvalidTime, "a time formatted HH:MM")
}

/// Parse a `YYYY-MM-DD` date.
pub(crate) fn parse_date(raw: &str, field: FieldName) -> Result<NaiveDate, Error> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
        invalid_value(
            field,
            ErrorCode::InvalidDate,
            format!("{} must be a date formatted YYYY-MM-DD", field.as_str()),
            raw,
        )
    })
}

/// Parse an optional date; blank counts as absent.
pub(crate) fn parse_optional_date(
    raw: Option<&str>,
    field: FieldName,
) -> Result<Option<NaiveDate>, Error> {
    match raw.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => parse_date(value, field).map(Some),
        None => Ok(None),
    }
}

/// Parse a site code such as `CIF`.
pub(crate) fn parse_site_code(raw: &str, field: FieldName) -> Result<SiteCode, Error> {
    SiteCode::new(raw).map_err(|error| {
        invalid_value(field, ErrorCode::InvalidSite, error.to_string(), raw)
    })
}

/// Check an ETA in minutes.
pub(crate) fn parse_eta(minutes: u32, field: FieldName) -> Result<EtaMinutes, Error> {
    EtaMinutes::new(minutes).map_err(|error| {
        invalid_value(
            field,
            ErrorCode::InvalidEta,
            error.to_string(),
            &minutes.to_string(),
        )
    })
}

/// Parse a truck status name such as `ARRIVED`.
pub(crate) fn parse_status(raw: &str, field: FieldName) -> Result<TruckStatus, Error> {
    parse_with(
        raw,
        field,
        ErrorCode::InvalidStatus,
        "one of EN_ROUTE, ARRIVED, LOADING, DEPARTED",
    )
}

/// Parse a line type name: `LOAD` or `DELIVER`.
pub(crate) fn parse_line(raw: &str, field: FieldName) -> Result<LineType, Error> {
    parse_with(raw, field, ErrorCode::InvalidLine, "LOAD or DELIVER")
}

/// Parse a four-digit scale-house code.
pub(crate) fn parse_queue_code(raw: &str, field: FieldName) -> Result<QueueCode, Error> {
    QueueCode::parse(raw).map_err(|_| {
        invalid_value(
            field,
            ErrorCode::InvalidQueueCode,
            format!("{} must be 4 digits", field.as_str()),
            raw,
        )
    })
}

/// Parse a history filter: `LOAD`, `DELIVER` or `ALL`. Absent means all.
pub(crate) fn parse_history_filter(
    raw: Option<&str>,
    field: FieldName,
) -> Result<HistoryFilter, Error> {
    match raw.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => parse_with(value, field, ErrorCode::InvalidLine, "LOAD, DELIVER, or ALL"),
        None => Ok(HistoryFilter::All),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const FIELD: FieldName = FieldName::new("openTime");

    #[rstest]
    fn slot_time_errors_name_the_field() {
        let err = parse_slot_time("7am", FIELD).expect_err("malformed");
        let details = err.details().expect("details");
        assert_eq!(details["field"], "openTime");
        assert_eq!(details["code"], "invalid_time");
        assert_eq!(details["value"], "7am");
    }

    #[rstest]
    #[case(None, None)]
    #[case(Some("  "), None)]
    #[case(Some("2026-03-02"), NaiveDate::from_ymd_opt(2026, 3, 2))]
    fn optional_dates_treat_blank_as_absent(
        #[case] raw: Option<&str>,
        #[case] expected: Option<NaiveDate>,
    ) {
        assert_eq!(
            parse_optional_date(raw, FieldName::new("date")).expect("valid"),
            expected
        );
    }

    #[rstest]
    fn malformed_dates_are_rejected() {
        let err = parse_date("03/02/2026", FieldName::new("start")).expect_err("malformed");
        assert_eq!(
            err.details().expect("details")["code"],
            "invalid_date"
        );
    }

    #[rstest]
    #[case(Some("all"), HistoryFilter::All)]
    #[case(None, HistoryFilter::All)]
    #[case(Some("LOAD"), HistoryFilter::Line(LineType::Load))]
    fn history_filters_parse(#[case] raw: Option<&str>, #[case] expected: HistoryFilter) {
        assert_eq!(
            parse_history_filter(raw, FieldName::new("type")).expect("valid"),
            expected
        );
    }

    #[rstest]
    fn zero_eta_is_rejected() {
        assert!(parse_eta(0, FieldName::new("etaMinutes")).is_err());
    }

    #[rstest]
    #[case("0421", true)]
    #[case(" 0007 ", true)]
    #[case("421", false)]
    #[case("04210", false)]
    #[case("04a1", false)]
    fn queue_codes_need_four_digits(#[case] raw: &str, #[case] valid: bool) {
        let parsed = parse_queue_code(raw, FieldName::new("code"));
        assert_eq!(parsed.is_ok(), valid);
        if let Err(err) = parsed {
            assert_eq!(err.details().expect("details")["code"], "invalid_queue_code");
        }
    }
}

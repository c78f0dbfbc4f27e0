use std::fmt;

use chrono::{
    DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeDelta, TimeZone,
    Timelike, Utc,
};
use chrono_tz::Tz;

use crate::{error::FeelError, library::core::EvalResult};

/// Returns the zero UTC offset.
#[must_use]
pub fn utc() -> FixedOffset {
    Utc.fix()
}

fn all_digits(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())
}

/// Splits `yyyy-mm-dd` into its fields. Month and day have two digits. The
/// year has four digits with an optional `-`, or more than four digits (no
/// leading zero) behind an explicit sign.
fn date_fields(literal: &str) -> Option<(i32, u32, u32)> {
    let (sign, body) = match literal.split_at_checked(1)? {
        ("-", rest) => (Some('-'), rest),
        ("+", rest) => (Some('+'), rest),
        _ => (None, literal),
    };
    let parts = body.splitn(3, '-').collect::<Vec<_>>();
    let &[year, month, day] = parts.as_slice() else {
        return None;
    };
    if !all_digits(year) || !all_digits(month) || !all_digits(day) || month.len() != 2 || day.len() != 2 {
        return None;
    }

    let year_shape = match (sign, year.len()) {
        (None | Some('-'), 4) => true,
        (Some(_), 5..=9) => !year.starts_with('0'),
        _ => false,
    };
    if !year_shape {
        return None;
    }

    let year: i32 = year.parse().ok()?;
    Some((if sign == Some('-') { -year } else { year }, month.parse().ok()?, day.parse().ok()?))
}

/// Parses an extended ISO calendar date such as `2024-02-29`.
///
/// Years beyond four digits need a sign, as in `+12024-01-01`.
///
/// # Example
/// ```
/// use feelib::value::temporal::parse_date;
///
/// assert!(parse_date("2024-02-29").is_ok());
/// assert!(parse_date("-0044-03-15").is_ok());
/// assert!(parse_date("2023-02-29").is_err());
/// assert!(parse_date("2024-2-9").is_err());
/// assert!(parse_date("29/02/2024").is_err());
/// ```
pub fn parse_date(literal: &str) -> EvalResult<NaiveDate> {
    date_fields(literal).and_then(|(year, month, day)| NaiveDate::from_ymd_opt(year, month, day))
                        .ok_or_else(|| FeelError::invalid_literal("date", literal))
}

/// Parses `hh:mm`, `hh:mm:ss` or `hh:mm:ss.f` with one to nine fractional
/// digits.
fn parse_clock(text: &str) -> Option<NaiveTime> {
    let (whole, fraction) = match text.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (text, None),
    };
    let fields = whole.split(':').collect::<Vec<_>>();
    if !(2..=3).contains(&fields.len()) || !fields.iter().all(|f| f.len() == 2 && all_digits(f)) {
        return None;
    }

    let nanos = match fraction {
        None => 0,
        Some(digits) if fields.len() == 3 && digits.len() <= 9 && all_digits(digits) => {
            format!("{digits:0<9}").parse().ok()?
        },
        Some(_) => return None,
    };
    let second = fields.get(2).map_or(Some(0), |s| s.parse().ok())?;

    NaiveTime::from_hms_nano_opt(fields[0].parse().ok()?, fields[1].parse().ok()?, second, nanos)
}

/// Splits a trailing `Z` or `±hh:mm` offset from a clock text.
fn split_offset(text: &str) -> (&str, Option<&str>) {
    if let Some(clock) = text.strip_suffix(['Z', 'z']) {
        return (clock, Some("Z"));
    }
    match text.rfind(['+', '-']) {
        Some(index) if index > 0 => (&text[..index], Some(&text[index..])),
        _ => (text, None),
    }
}

/// Splits a trailing `@Zone/Id` or `[Zone/Id]` from a date-time text.
fn split_zone(text: &str) -> (&str, Option<&str>) {
    if let Some((body, zone)) = text.split_once('@') {
        return (body, Some(zone));
    }
    if let Some(inner) = text.strip_suffix(']')
       && let Some(index) = inner.find('[')
    {
        return (&inner[..index], Some(&inner[index + 1..]));
    }
    (text, None)
}

/// Parses `Z`, `±hh`, `±hhmm` or `±hh:mm`. Offsets beyond ±18 hours are
/// rejected.
fn parse_offset(text: &str) -> Option<FixedOffset> {
    if text.eq_ignore_ascii_case("z") {
        return Some(utc());
    }

    let (sign, rest) = match text.split_at_checked(1)? {
        ("+", rest) => (1, rest),
        ("-", rest) => (-1, rest),
        _ => return None,
    };
    let digits = match rest.split_once(':') {
        Some((hours, minutes)) if hours.len() == 2 && minutes.len() == 2 => {
            format!("{hours}{minutes}")
        },
        Some(_) => return None,
        None => rest.to_owned(),
    };
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let (hours, minutes): (i32, i32) = match digits.len() {
        2 => (digits.parse().ok()?, 0),
        4 => (digits[..2].parse().ok()?, digits[2..].parse().ok()?),
        _ => return None,
    };
    if hours > 18 || minutes > 59 {
        return None;
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

fn write_offset(f: &mut fmt::Formatter<'_>, offset: FixedOffset) -> fmt::Result {
    if offset.local_minus_utc() == 0 {
        write!(f, "Z")
    } else {
        write!(f, "{offset}")
    }
}

/// A time of day with a fixed UTC offset and no date.
///
/// Equality follows the ordering of [`OffsetTime::utc_key`], so `12:00+02:00`
/// and `10:00Z` are equal while keeping their own display forms.
///
/// # Example
/// ```
/// use feelib::value::temporal::OffsetTime;
///
/// let t = OffsetTime::parse("10:30:00+02:00").unwrap();
/// assert_eq!(t.to_string(), "10:30:00+02:00");
///
/// // Without an offset, UTC is assumed.
/// assert_eq!(OffsetTime::parse("10:30").unwrap().to_string(), "10:30:00Z");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct OffsetTime {
    time:   NaiveTime,
    offset: FixedOffset,
}

impl PartialEq for OffsetTime {
    fn eq(&self, other: &Self) -> bool {
        self.utc_key() == other.utc_key()
    }
}

impl Eq for OffsetTime {}

impl OffsetTime {
    /// Pairs a time of day with an offset.
    #[must_use]
    pub const fn new(time: NaiveTime, offset: FixedOffset) -> Self {
        Self { time, offset }
    }

    /// Parses `hh:mm[:ss[.fffffffff]]` followed by an optional `Z` or
    /// `±hh:mm`. Named zones are rejected: they cannot be resolved without a
    /// date.
    pub fn parse(literal: &str) -> EvalResult<Self> {
        let invalid = || FeelError::invalid_literal("time", literal);

        if literal.contains(['@', '[']) {
            return Err(invalid());
        }

        let (clock, offset) = split_offset(literal);
        let time = parse_clock(clock).ok_or_else(invalid)?;
        let offset = match offset {
            Some(text) => parse_offset(text).ok_or_else(invalid)?,
            None => utc(),
        };

        Ok(Self::new(time, offset))
    }

    /// The local time of day.
    #[must_use]
    pub const fn time(&self) -> NaiveTime {
        self.time
    }

    /// The UTC offset.
    #[must_use]
    pub const fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// The same instant expressed at UTC, wrapped into a single day.
    #[must_use]
    pub fn to_utc(&self) -> NaiveTime {
        let shift = TimeDelta::seconds(-i64::from(self.offset.local_minus_utc()));
        self.time.overflowing_add_signed(shift).0
    }

    /// Position on the UTC time line in nanoseconds, without wrapping. Used
    /// for ordering.
    #[must_use]
    pub fn utc_key(&self) -> i64 {
        let seconds = i64::from(self.time.num_seconds_from_midnight())
                      - i64::from(self.offset.local_minus_utc());
        seconds * 1_000_000_000 + i64::from(self.time.nanosecond())
    }
}

impl fmt::Display for OffsetTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.time.format("%H:%M:%S%.f"))?;
        write_offset(f, self.offset)
    }
}

/// A date and time with a UTC offset and, optionally, the named zone the
/// offset was resolved from.
///
/// Equality and ordering compare instants, so `10:00Z` and `12:00+02:00` on the
/// same day are equal.
///
/// # Example
/// ```
/// use feelib::value::temporal::ZonedDateTime;
///
/// let a = ZonedDateTime::parse("2024-01-01T10:00:00Z").unwrap();
/// let b = ZonedDateTime::parse("2024-01-01T12:00:00+02:00").unwrap();
/// assert_eq!(a, b);
///
/// let paris = ZonedDateTime::parse("2024-07-01T12:00:00@Europe/Paris").unwrap();
/// assert_eq!(paris.offset().local_minus_utc(), 7200);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ZonedDateTime {
    instant: DateTime<FixedOffset>,
    zone:    Option<Tz>,
}

impl PartialEq for ZonedDateTime {
    fn eq(&self, other: &Self) -> bool {
        self.instant == other.instant
    }
}

impl Eq for ZonedDateTime {}

impl ZonedDateTime {
    /// Places a local date-time at a fixed offset.
    pub fn from_offset(local: NaiveDateTime, offset: FixedOffset) -> EvalResult<Self> {
        let instant = offset.from_local_datetime(&local)
                            .single()
                            .ok_or_else(|| FeelError::invalid_argument(format!("{local} is not representable at {offset}")))?;
        Ok(Self { instant,
                  zone: None })
    }

    /// Resolves a local date-time in a named zone. Ambiguous local times take
    /// the earlier offset; local times skipped by a transition are rejected.
    pub fn from_zone(local: NaiveDateTime, zone: Tz) -> EvalResult<Self> {
        let resolved = zone.from_local_datetime(&local)
                           .earliest()
                           .ok_or_else(|| FeelError::invalid_argument(format!("{local} does not exist in {}", zone.name())))?;
        Ok(Self { instant: resolved.fixed_offset(),
                  zone:    Some(zone), })
    }

    /// Places a local date-time at UTC.
    pub fn at_utc(local: NaiveDateTime) -> EvalResult<Self> {
        Self::from_offset(local, utc())
    }

    /// Keeps the instant and re-expresses it in `zone`.
    #[must_use]
    pub fn with_zone(self, zone: Tz) -> Self {
        Self { instant: self.instant.with_timezone(&zone).fixed_offset(),
               zone:    Some(zone), }
    }

    /// Parses a date-time literal.
    ///
    /// Accepted forms are `yyyy-mm-ddThh:mm[:ss[.f]]` followed by nothing
    /// (UTC), `Z`, `±hh:mm`, `@Zone/Id` or `[Zone/Id]`, and a bare date
    /// `yyyy-mm-dd`, which denotes midnight.
    pub fn parse(literal: &str) -> EvalResult<Self> {
        let invalid = || FeelError::invalid_literal("date and time", literal);

        let (body, zone) = split_zone(literal);
        let zone = zone.map(|id| id.parse::<Tz>().map_err(|_| invalid()))
                       .transpose()?;
        let (date_text, clock_text) = body.split_once('T').unwrap_or((body, "00:00:00"));
        let date = parse_date(date_text).map_err(|_| invalid())?;
        let (clock, offset) = split_offset(clock_text);
        let local = NaiveDateTime::new(date, parse_clock(clock).ok_or_else(invalid)?);
        let offset = offset.map(|text| parse_offset(text).ok_or_else(invalid))
                           .transpose()?;

        match (offset, zone) {
            (Some(offset), Some(zone)) => Ok(Self::from_offset(local, offset)?.with_zone(zone)),
            (None, Some(zone)) => Self::from_zone(local, zone),
            (Some(offset), None) => Self::from_offset(local, offset),
            (None, None) => Self::at_utc(local),
        }
    }

    /// The underlying instant with its offset.
    #[must_use]
    pub const fn instant(&self) -> &DateTime<FixedOffset> {
        &self.instant
    }

    /// The named zone, if the value was built from one.
    #[must_use]
    pub const fn zone(&self) -> Option<Tz> {
        self.zone
    }

    /// The UTC offset in effect.
    #[must_use]
    pub fn offset(&self) -> FixedOffset {
        *self.instant.offset()
    }

    /// The local date-time.
    #[must_use]
    pub fn local(&self) -> NaiveDateTime {
        self.instant.naive_local()
    }

    /// The local calendar date.
    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.local().date()
    }

    /// The local time of day with the offset.
    #[must_use]
    pub fn time(&self) -> OffsetTime {
        OffsetTime::new(self.local().time(), self.offset())
    }
}

impl fmt::Display for ZonedDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.local().format("%Y-%m-%dT%H:%M:%S%.f"))?;
        match self.zone {
            Some(zone) => write!(f, "@{}", zone.name()),
            None => write_offset(f, self.offset()),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("10:00:00", "10:00:00Z")]
    #[case("10:00:00Z", "10:00:00Z")]
    #[case("23:59:59.5-05:00", "23:59:59.500-05:00")]
    #[case("08:15+0130", "08:15:00+01:30")]
    fn parses_offset_times(#[case] literal: &str, #[case] expected: &str) {
        assert_eq!(OffsetTime::parse(literal).unwrap().to_string(), expected);
    }

    #[rstest]
    #[case("10:00:00@Europe/Paris")]
    #[case("25:00:00")]
    #[case("1:02:03")]
    #[case("10:00.5")]
    #[case("10:00:00.1234567890")]
    #[case("10:00:00.")]
    #[case("10:00:00+19:00")]
    #[case("ten o'clock")]
    fn rejects_bad_times(#[case] literal: &str) {
        assert!(OffsetTime::parse(literal).is_err());
    }

    #[test]
    fn times_are_equal_at_the_same_utc_instant() {
        let paris = OffsetTime::parse("12:00:00+02:00").unwrap();
        let london = OffsetTime::parse("10:00:00Z").unwrap();

        assert_eq!(paris, london);
        assert_ne!(paris.to_string(), london.to_string());
        assert_ne!(paris, OffsetTime::parse("12:00:00Z").unwrap());
    }

    #[rstest]
    #[case("2024-01-05", Some((2024, 1, 5)))]
    #[case("-0044-03-15", Some((-44, 3, 15)))]
    #[case("+12024-01-01", Some((12024, 1, 1)))]
    #[case("2024-1-5", None)]
    #[case("+2024-01-05", None)]
    #[case("12024-01-01", None)]
    #[case("+012024-01-01", None)]
    #[case("2024-01-05T", None)]
    #[case("2024-01-5x", None)]
    fn date_shapes(#[case] literal: &str, #[case] expected: Option<(i32, u32, u32)>) {
        assert_eq!(date_fields(literal), expected);
    }

    #[test]
    fn utc_normalization_wraps_within_the_day() {
        let t = OffsetTime::parse("01:00:00+02:00").unwrap();
        assert_eq!(t.to_utc(), NaiveTime::from_hms_opt(23, 0, 0).unwrap());
    }

    #[rstest]
    #[case("2024-01-01T10:00:00", "2024-01-01T10:00:00Z")]
    #[case("2024-01-01T10:00:00-03:00", "2024-01-01T10:00:00-03:00")]
    #[case("2024-01-01", "2024-01-01T00:00:00Z")]
    #[case("2024-01-01T10:00:00@Europe/Paris", "2024-01-01T10:00:00@Europe/Paris")]
    #[case("2024-07-01T10:00:00+02:00[Europe/Paris]", "2024-07-01T10:00:00@Europe/Paris")]
    fn parses_date_times(#[case] literal: &str, #[case] expected: &str) {
        assert_eq!(ZonedDateTime::parse(literal).unwrap().to_string(), expected);
    }

    #[test]
    fn named_zone_resolves_to_its_offset_at_the_instant() {
        let winter = ZonedDateTime::parse("2024-01-15T12:00:00@Europe/Paris").unwrap();
        let summer = ZonedDateTime::parse("2024-07-15T12:00:00@Europe/Paris").unwrap();

        assert_eq!(winter.offset().local_minus_utc(), 3600);
        assert_eq!(summer.offset().local_minus_utc(), 7200);
    }

    #[rstest]
    #[case("2024-13-01T00:00:00")]
    #[case("2024-01-01T10:00:00@Mars/Olympus")]
    #[case("2024-01-01 10:00:00")]
    #[case("2024-1-01T10:00:00")]
    #[case("+2024-01-01T10:00:00Z")]
    #[case("2024-01-01T1:00:00Z")]
    fn rejects_bad_date_times(#[case] literal: &str) {
        assert!(ZonedDateTime::parse(literal).is_err());
    }
}

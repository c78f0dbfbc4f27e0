use std::{cmp::Ordering, fmt};

use chrono::TimeDelta;
use logos::Logos;
use bigdecimal::{BigDecimal, num_bigint::BigInt, RoundingMode, Zero};

use crate::{
    error::FeelError,
    library::core::EvalResult,
    util::num::decimal_to_i64_checked,
};

const SECONDS_PER_DAY: i64 = 86_400;
const NANOS_PER_SECOND: i64 = 1_000_000_000;

/// Represents a lexical token of an ISO-8601 duration literal such as
/// `-P1DT2H30.5S`.
#[derive(Logos, Debug, PartialEq, Clone)]
enum Token {
    /// `-`
    #[token("-")]
    Minus,
    /// `P`
    #[token("P")]
    Period,
    /// `T`
    #[token("T")]
    Time,
    /// A number followed by its unit letter, such as `2M` or `30.5S`.
    #[regex(r"[0-9]+(\.[0-9]+)?[YMDHS]", component)]
    Component(Component),
}

#[derive(Debug, PartialEq, Clone)]
struct Component {
    amount: BigDecimal,
    unit:   char,
}

fn component(lex: &mut logos::Lexer<Token>) -> Option<Component> {
    let slice = lex.slice();
    let (amount, unit) = slice.split_at(slice.len() - 1);
    Some(Component { amount: amount.parse().ok()?,
                     unit:   unit.chars().next()?, })
}

/// A FEEL duration: either a whole number of months or a day-time span.
///
/// The two kinds never mix. Both carry a sign.
///
/// # Example
/// ```
/// use feelib::value::duration::Duration;
///
/// let ym = Duration::parse("P1Y2M").unwrap();
/// assert_eq!(ym, Duration::YearMonth { months: 14 });
///
/// let dt = Duration::parse("-PT90M").unwrap();
/// assert_eq!(dt.to_string(), "-PT1H30M");
///
/// assert!(Duration::parse("P1Y2D").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Duration {
    /// A years-and-months duration, counted in months.
    YearMonth {
        /// Signed number of months.
        months: i64,
    },
    /// A days-and-time duration.
    DayTime(TimeDelta),
}

impl PartialOrd for Duration {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::YearMonth { months: a }, Self::YearMonth { months: b }) => Some(a.cmp(b)),
            (Self::DayTime(a), Self::DayTime(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl Duration {
    /// Parses an ISO-8601 duration literal.
    ///
    /// Units must appear in the order `Y`, `M`, `D`, then after `T` the units
    /// `H`, `M`, `S`. Only seconds may be fractional. A literal holding both
    /// year-month and day-time units is rejected with
    /// [`FeelError::MixedDuration`].
    pub fn parse(literal: &str) -> EvalResult<Self> {
        let invalid = || FeelError::invalid_literal("duration", literal);

        let mut tokens = Vec::new();
        for token in Token::lexer(literal) {
            tokens.push(token.map_err(|()| invalid())?);
        }

        let mut iter = tokens.into_iter().peekable();
        let negative = iter.next_if_eq(&Token::Minus).is_some();
        if iter.next() != Some(Token::Period) {
            return Err(invalid());
        }

        let mut in_time = false;
        let mut last_rank = 0;
        let mut months = BigDecimal::zero();
        let mut seconds = BigDecimal::zero();
        let (mut year_month, mut day_time) = (false, false);

        for token in iter {
            let Component { amount, unit } = match token {
                Token::Time if !in_time => {
                    in_time = true;
                    continue;
                },
                Token::Component(c) => c,
                _ => return Err(invalid()),
            };

            let (rank, factor) = match (in_time, unit) {
                (false, 'Y') => (1, 12),
                (false, 'M') => (2, 1),
                (false, 'D') => (3, SECONDS_PER_DAY),
                (true, 'H') => (4, 3_600),
                (true, 'M') => (5, 60),
                (true, 'S') => (6, 1),
                _ => return Err(invalid()),
            };
            if rank <= last_rank || (rank != 6 && !amount.is_integer()) {
                return Err(invalid());
            }
            last_rank = rank;

            let scaled = amount * BigDecimal::from(factor);
            if rank <= 2 {
                year_month = true;
                months += scaled;
            } else {
                day_time = true;
                seconds += scaled;
            }
        }

        if last_rank == 0 || (in_time && last_rank < 4) {
            return Err(invalid());
        }
        if year_month && day_time {
            return Err(FeelError::MixedDuration { literal: literal.to_owned() });
        }

        let duration = if year_month {
            Self::YearMonth { months: decimal_to_i64_checked(&months)? }
        } else {
            Self::DayTime(seconds_to_delta(&seconds)?)
        };

        Ok(if negative { duration.negate() } else { duration })
    }

    /// Builds a day-time duration of whole minutes.
    #[must_use]
    pub fn from_minutes(minutes: i64) -> Self {
        Self::DayTime(TimeDelta::minutes(minutes))
    }

    /// Flips the sign.
    #[must_use]
    pub fn negate(self) -> Self {
        match self {
            Self::YearMonth { months } => Self::YearMonth { months: -months },
            Self::DayTime(delta) => Self::DayTime(-delta),
        }
    }

    /// Whole years of a year-month duration; `None` for day-time durations.
    #[must_use]
    pub const fn years(&self) -> Option<i64> {
        match self {
            Self::YearMonth { months } => Some(*months / 12),
            Self::DayTime(_) => None,
        }
    }

    /// Remaining months (`0..12` with the duration's sign) of a year-month
    /// duration.
    #[must_use]
    pub const fn months(&self) -> Option<i64> {
        match self {
            Self::YearMonth { months } => Some(*months % 12),
            Self::DayTime(_) => None,
        }
    }

    /// Whole days of a day-time duration.
    #[must_use]
    pub fn days(&self) -> Option<i64> {
        self.day_time_seconds().map(|s| s / SECONDS_PER_DAY)
    }

    /// Hours beyond whole days.
    #[must_use]
    pub fn hours(&self) -> Option<i64> {
        self.day_time_seconds().map(|s| s / 3_600 % 24)
    }

    /// Minutes beyond whole hours.
    #[must_use]
    pub fn minutes(&self) -> Option<i64> {
        self.day_time_seconds().map(|s| s / 60 % 60)
    }

    /// Seconds beyond whole minutes, including the fractional part.
    #[must_use]
    pub fn seconds(&self) -> Option<BigDecimal> {
        match self {
            Self::DayTime(delta) => {
                let nanos = delta.num_seconds() % 60 * NANOS_PER_SECOND
                            + i64::from(delta.subsec_nanos());
                Some(nanos_as_seconds(nanos))
            },
            Self::YearMonth { .. } => None,
        }
    }

    fn day_time_seconds(&self) -> Option<i64> {
        match self {
            Self::DayTime(delta) => Some(delta.num_seconds()),
            Self::YearMonth { .. } => None,
        }
    }
}

/// Converts a non-negative decimal number of seconds into a `TimeDelta`,
/// truncating below nanosecond resolution.
fn seconds_to_delta(seconds: &BigDecimal) -> EvalResult<TimeDelta> {
    let whole = seconds.with_scale_round(0, RoundingMode::Down);
    let fraction = (seconds.clone() - whole.clone()) * BigDecimal::from(NANOS_PER_SECOND);
    let nanos = decimal_to_i64_checked(&fraction.with_scale_round(0, RoundingMode::Down))?;
    let whole = decimal_to_i64_checked(&whole)?;
    let delta = TimeDelta::try_seconds(whole).ok_or(FeelError::Overflow)?;
    delta.checked_add(&TimeDelta::nanoseconds(nanos))
         .ok_or(FeelError::Overflow)
}

fn nanos_as_seconds(nanos: i64) -> BigDecimal {
    BigDecimal::new(BigInt::from(nanos), 9).normalized()
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::YearMonth { months } => {
                if *months < 0 {
                    write!(f, "-")?;
                }
                let total = months.unsigned_abs();
                let (years, months) = (total / 12, total % 12);
                write!(f, "P")?;
                if years > 0 {
                    write!(f, "{years}Y")?;
                }
                if months > 0 || years == 0 {
                    write!(f, "{months}M")?;
                }
                Ok(())
            },
            Self::DayTime(delta) => {
                let negative = *delta < TimeDelta::zero();
                let magnitude = if negative { -*delta } else { *delta };
                if negative {
                    write!(f, "-")?;
                }

                let total = magnitude.num_seconds();
                let nanos = magnitude.subsec_nanos();
                let (days, hours, minutes, seconds) =
                    (total / SECONDS_PER_DAY, total % SECONDS_PER_DAY / 3_600, total % 3_600 / 60, total % 60);

                write!(f, "P")?;
                if days > 0 {
                    write!(f, "{days}D")?;
                }
                if hours == 0 && minutes == 0 && seconds == 0 && nanos == 0 {
                    return if days == 0 { write!(f, "T0S") } else { Ok(()) };
                }
                write!(f, "T")?;
                if hours > 0 {
                    write!(f, "{hours}H")?;
                }
                if minutes > 0 {
                    write!(f, "{minutes}M")?;
                }
                if seconds > 0 || nanos > 0 {
                    let exact = nanos_as_seconds(seconds * NANOS_PER_SECOND + i64::from(nanos));
                    write!(f, "{}S", exact.to_plain_string())?;
                }
                Ok(())
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("P1Y", "P1Y")]
    #[case("P14M", "P1Y2M")]
    #[case("-P2Y3M", "-P2Y3M")]
    #[case("P0M", "P0M")]
    #[case("P1DT2H3M4S", "P1DT2H3M4S")]
    #[case("PT36H", "P1DT12H")]
    #[case("PT0.25S", "PT0.25S")]
    #[case("-P3D", "-P3D")]
    #[case("PT0S", "PT0S")]
    fn displays_canonical_form(#[case] literal: &str, #[case] expected: &str) {
        assert_eq!(Duration::parse(literal).unwrap().to_string(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("P")]
    #[case("PT")]
    #[case("1Y")]
    #[case("P1M1Y")]
    #[case("P1.5Y")]
    #[case("P1H")]
    #[case("PT1D")]
    #[case("P1W")]
    fn rejects_malformed_literals(#[case] literal: &str) {
        assert!(matches!(Duration::parse(literal), Err(FeelError::InvalidLiteral { .. })));
    }

    #[test]
    fn mixing_kinds_is_its_own_error() {
        assert!(matches!(Duration::parse("P1Y2DT3H"), Err(FeelError::MixedDuration { .. })));
    }

    #[test]
    fn components_keep_the_sign() {
        let d = Duration::parse("-P1DT2H3M4.5S").unwrap();

        assert_eq!(d.days(), Some(-1));
        assert_eq!(d.hours(), Some(-2));
        assert_eq!(d.minutes(), Some(-3));
        assert_eq!(d.seconds().unwrap().to_plain_string(), "-4.5");
        assert_eq!(d.years(), None);

        let ym = Duration::parse("-P1Y5M").unwrap();
        assert_eq!(ym.years(), Some(-1));
        assert_eq!(ym.months(), Some(-5));
        assert_eq!(ym.days(), None);
    }
}

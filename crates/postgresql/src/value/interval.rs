use std::error::Error;
use std::fmt;
use tokio_postgres::types::{FromSql, Type};

/// PostgreSQL INTERVAL value
///
/// Kept as the three fields PostgreSQL stores, since months and days have
/// no fixed length. Displays in PostgreSQL's default `postgres` output style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub months: i32,
    pub days: i32,
    pub microseconds: i64,
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut fields = Vec::new();
        // A positive field right after a negative one carries an explicit '+'
        let mut previous_negative = false;

        for (amount, unit) in [
            (self.months / 12, "year"),
            (self.months % 12, "mon"),
            (self.days, "day"),
        ] {
            if amount == 0 {
                continue;
            }
            let sign = if previous_negative && amount > 0 { "+" } else { "" };
            let plural = if amount == 1 { "" } else { "s" };
            fields.push(format!("{sign}{amount} {unit}{plural}"));
            previous_negative = amount < 0;
        }

        if self.microseconds != 0 || fields.is_empty() {
            let sign = if self.microseconds < 0 {
                "-"
            } else if previous_negative {
                "+"
            } else {
                ""
            };
            fields.push(format!("{sign}{}", Clock(self.microseconds.unsigned_abs())));
        }

        f.write_str(&fields.join(" "))
    }
}

impl<'a> FromSql<'a> for Interval {
    fn from_sql(_: &Type, raw: &'a [u8]) -> Result<Self, Box<dyn Error + Sync + Send>> {
        let raw: [u8; 16] = raw.try_into()?;
        Ok(Self {
            microseconds: i64::from_be_bytes(raw[0..8].try_into()?),
            days: i32::from_be_bytes(raw[8..12].try_into()?),
            months: i32::from_be_bytes(raw[12..16].try_into()?),
        })
    }

    fn accepts(ty: &Type) -> bool {
        *ty == Type::INTERVAL
    }
}

/// `HH:MM:SS` with the fraction trimmed of trailing zeros. Hours may exceed 24.
pub(super) struct Clock(pub u64);

impl fmt::Display for Clock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let seconds = self.0 / 1_000_000;
        let fraction = self.0 % 1_000_000;
        write!(
            f,
            "{:02}:{:02}:{:02}",
            seconds / 3600,
            seconds / 60 % 60,
            seconds % 60
        )?;
        if fraction != 0 {
            let digits = format!("{fraction:06}");
            write!(f, ".{}", digits.trim_end_matches('0'))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR: i64 = 3_600_000_000;

    fn encode(months: i32, days: i32, microseconds: i64) -> Vec<u8> {
        let mut raw = Vec::with_capacity(16);
        raw.extend_from_slice(&microseconds.to_be_bytes());
        raw.extend_from_slice(&days.to_be_bytes());
        raw.extend_from_slice(&months.to_be_bytes());
        raw
    }

    #[test]
    fn test_interval_from_binary() {
        let raw = encode(14, 3, 4 * HOUR + 5 * 60_000_000 + 6_500_000);
        let interval = Interval::from_sql(&Type::INTERVAL, &raw).unwrap();
        assert_eq!(
            interval,
            Interval {
                months: 14,
                days: 3,
                microseconds: 4 * HOUR + 5 * 60_000_000 + 6_500_000
            }
        );
        assert_eq!(interval.to_string(), "1 year 2 mons 3 days 04:05:06.5");
    }

    #[test]
    fn test_interval_rejects_short_input() {
        assert!(Interval::from_sql(&Type::INTERVAL, &[0; 12]).is_err());
    }

    #[test]
    fn test_interval_display() {
        let show = |months, days, microseconds| {
            Interval {
                months,
                days,
                microseconds,
            }
            .to_string()
        };
        assert_eq!(show(0, 0, 0), "00:00:00");
        assert_eq!(show(0, 1, 0), "1 day");
        assert_eq!(show(24, 0, 0), "2 years");
        assert_eq!(show(1, 0, 0), "1 mon");
        assert_eq!(show(0, 0, 30 * HOUR), "30:00:00");
        assert_eq!(show(-14, 0, 0), "-1 years -2 mons");
        assert_eq!(show(0, -1, HOUR), "-1 days +01:00:00");
        assert_eq!(show(0, 1, -HOUR), "1 day -01:00:00");
        assert_eq!(show(0, 0, 1), "00:00:00.000001");
    }
}

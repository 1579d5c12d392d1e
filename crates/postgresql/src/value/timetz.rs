use super::interval::Clock;
use std::error::Error;
use std::fmt;
use tokio_postgres::types::{FromSql, Type};

/// PostgreSQL TIMETZ value (time of day with a UTC offset)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeTz {
    pub microseconds: i64,
    /// Seconds east of UTC
    pub utc_offset: i32,
}

impl fmt::Display for TimeTz {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Clock(self.microseconds.unsigned_abs()))?;

        let sign = if self.utc_offset < 0 { '-' } else { '+' };
        let offset = self.utc_offset.unsigned_abs();
        let (hours, minutes, seconds) = (offset / 3600, offset / 60 % 60, offset % 60);
        // Short form "+05" when the offset is a whole number of hours
        write!(f, "{sign}{hours:02}")?;
        if minutes != 0 || seconds != 0 {
            write!(f, ":{minutes:02}")?;
        }
        if seconds != 0 {
            write!(f, ":{seconds:02}")?;
        }
        Ok(())
    }
}

impl<'a> FromSql<'a> for TimeTz {
    fn from_sql(_: &Type, raw: &'a [u8]) -> Result<Self, Box<dyn Error + Sync + Send>> {
        let raw: [u8; 12] = raw.try_into()?;
        // The wire format stores the zone as seconds west of UTC
        let zone = i32::from_be_bytes(raw[8..12].try_into()?);
        Ok(Self {
            microseconds: i64::from_be_bytes(raw[0..8].try_into()?),
            utc_offset: -zone,
        })
    }

    fn accepts(ty: &Type) -> bool {
        *ty == Type::TIMETZ
    }
}

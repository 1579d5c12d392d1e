use std::error::Error;
use std::fmt::Write;
use tokio_postgres::types::{FromSql, Type};

const NUMERIC_NEG: u16 = 0x4000;
const NUMERIC_NAN: u16 = 0xC000;
const NUMERIC_PINF: u16 = 0xD000;
const NUMERIC_NINF: u16 = 0xF000;

/// PostgreSQL NUMERIC in its exact textual form.
///
/// Used when the value does not fit a `rust_decimal::Decimal`: more than
/// 28 significant digits, or one of `NaN`, `Infinity`, `-Infinity`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumericText(pub String);

impl<'a> FromSql<'a> for NumericText {
    fn from_sql(_: &Type, raw: &'a [u8]) -> Result<Self, Box<dyn Error + Sync + Send>> {
        let ndigits = read_u16(raw, 0)? as usize;
        let weight = read_u16(raw, 2)? as i16 as i32;
        let sign = read_u16(raw, 4)?;
        let dscale = read_u16(raw, 6)? as usize;

        match sign {
            NUMERIC_NAN => return Ok(Self("NaN".to_string())),
            NUMERIC_PINF => return Ok(Self("Infinity".to_string())),
            NUMERIC_NINF => return Ok(Self("-Infinity".to_string())),
            0 | NUMERIC_NEG => {}
            other => return Err(format!("invalid numeric sign {other:#06x}").into()),
        }

        // Base-10000 digit groups; group `i` carries weight `weight - i`
        let digits = (0..ndigits)
            .map(|i| read_u16(raw, 8 + i * 2))
            .collect::<Result<Vec<_>, _>>()?;
        let group = |i: i32| -> u16 {
            usize::try_from(i)
                .ok()
                .and_then(|i| digits.get(i).copied())
                .unwrap_or(0)
        };

        let mut out = String::new();
        if sign == NUMERIC_NEG {
            out.push('-');
        }
        if weight < 0 {
            out.push('0');
        } else {
            for i in 0..=weight {
                if i == 0 {
                    write!(out, "{}", group(i))?;
                } else {
                    write!(out, "{:04}", group(i))?;
                }
            }
        }

        if dscale > 0 {
            let mut fraction = String::with_capacity(dscale + 4);
            let mut i = weight + 1;
            while fraction.len() < dscale {
                write!(fraction, "{:04}", group(i))?;
                i += 1;
            }
            fraction.truncate(dscale);
            out.push('.');
            out.push_str(&fraction);
        }

        Ok(Self(out))
    }

    fn accepts(ty: &Type) -> bool {
        *ty == Type::NUMERIC
    }
}

fn read_u16(raw: &[u8], at: usize) -> Result<u16, Box<dyn Error + Sync + Send>> {
    let bytes = raw.get(at..at + 2).ok_or("numeric value is truncated")?;
    Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
}

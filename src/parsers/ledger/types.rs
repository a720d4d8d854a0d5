use chrono::{Datelike, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Data crua do razão, interpretada com dia primeiro (convenção regional).
///
/// Valores ilegíveis viram `None`; a linha nunca é descartada por causa da
/// data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerDate(String);

const DATETIME_FORMATS: &[&str] = &["%d/%m/%Y %H:%M:%S", "%d/%m/%Y %H:%M"];

impl LedgerDate {
    pub fn parse(&self) -> Option<NaiveDate> {
        let s = self.0.trim();
        if s.is_empty() {
            return None;
        }

        if let Ok(date) = NaiveDate::parse_from_str(s, "%d/%m/%Y") {
            // "05/03/24" casaria com %Y como ano 24; trata como século atual
            if date.year() >= 100 {
                return Some(date);
            }
        }
        if let Ok(date) = NaiveDate::parse_from_str(s, "%d/%m/%y") {
            return Some(date);
        }
        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return Some(date);
        }
        for format in DATETIME_FORMATS {
            if let Ok(datetime) = NaiveDateTime::parse_from_str(s, format) {
                return Some(datetime.date());
            }
        }
        None
    }
}

impl From<String> for LedgerDate {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for LedgerDate {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Valor monetário no formato regional: `.` de milhar e `,` decimal
/// (ex.: `1.234,56`). Símbolos de moeda e espaços são descartados.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrlAmount(String);

impl BrlAmount {
    pub fn parse(&self) -> Option<Decimal> {
        let cleaned: String = self
            .0
            .chars()
            .filter(|c| c.is_ascii_digit() || matches!(c, ',' | '.' | '-'))
            .collect();
        if cleaned.is_empty() {
            return None;
        }
        let normalized = drop_thousands_dots(&cleaned).replace(',', ".");
        Decimal::from_str(&normalized).ok()
    }
}

impl From<String> for BrlAmount {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for BrlAmount {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

// Um '.' seguido de exatamente três dígitos (e depois um não-dígito ou o fim)
// é separador de milhar e cai fora; qualquer outro '.' é preservado.
fn drop_thousands_dots(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = String::with_capacity(s.len());
    for (i, &b) in bytes.iter().enumerate() {
        if b == b'.' {
            let is_thousands = bytes
                .get(i + 1..i + 4)
                .is_some_and(|window| window.iter().all(|d| d.is_ascii_digit()))
                && bytes.get(i + 4).is_none_or(|d| !d.is_ascii_digit());
            if is_thousands {
                continue;
            }
        }
        out.push(b as char);
    }
    out
}

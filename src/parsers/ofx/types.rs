use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Representa uma data crua vinda de um extrato OFX.
///
/// Formatos usuais:
/// - YYYYMMDDHHMMSS (com sufixo de fuso opcional, ex.: `[0:GMT]`)
/// - YYYYMMDDHHMM
/// - YYYYMMDD
///
/// Os três compartilham o mesmo prefixo de 8 dígitos; a hora é ignorada.
/// Datas ilegíveis viram `None`: a transação é retida e ordenada por último,
/// nunca descartada.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfxDate(String);

const FALLBACK_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y"];

impl OfxDate {
    pub fn parse(&self) -> Option<NaiveDate> {
        let cleaned = self
            .0
            .split('[')
            .next()
            .unwrap_or("")
            .trim()
            .replace('T', "");
        let digits: String = cleaned.chars().filter(|c| c.is_ascii_digit()).collect();

        if digits.len() >= 8 {
            let year = digits[0..4].parse().ok()?;
            let month = digits[4..6].parse().ok()?;
            let day = digits[6..8].parse().ok()?;
            if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
                return Some(date);
            }
        }

        for format in FALLBACK_FORMATS {
            if let Ok(parsed) = NaiveDate::parse_from_str(&cleaned, format) {
                return Some(parsed);
            }
        }

        None
    }
}

impl From<String> for OfxDate {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for OfxDate {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

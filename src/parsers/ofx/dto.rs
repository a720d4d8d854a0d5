use std::collections::BTreeMap;
use std::str::FromStr;

use rust_decimal::Decimal;

use super::types::OfxDate;
use crate::types::BankTransaction;

/// Bloco `<STMTTRN>` cru: tags conhecidas e desconhecidas, valores já aparados.
#[derive(Debug, Default)]
pub(super) struct OfxBlock {
    tags: BTreeMap<String, String>,
}

impl OfxBlock {
    pub(super) fn insert(&mut self, name: String, value: String) {
        self.tags.insert(name, value);
    }

    pub(super) fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    fn get(&self, tag: &str) -> Option<&str> {
        self.tags.get(tag).map(String::as_str)
    }

    fn first(&self, candidates: &[&str]) -> Option<&str> {
        candidates.iter().find_map(|tag| self.get(tag))
    }

    pub(super) fn into_transaction(self, source: &str) -> BankTransaction {
        let posted_date = self
            .first(&["DTPOSTED", "DTUSER"])
            .and_then(|value| OfxDate::from(value).parse());
        let amount = self.get("TRNAMT").and_then(parse_statement_amount);
        BankTransaction {
            posted_date,
            amount,
            kind: self.get("TRNTYPE").map(|v| v.to_uppercase()),
            external_id: self.first(&["FITID", "REFNUM"]).map(str::to_string),
            document: self.first(&["CHECKNUM", "REFNUM"]).map(str::to_string),
            memo: self.get("MEMO").map(str::to_string),
            payer_name: self.get("NAME").map(str::to_string),
            source_file: source.to_string(),
        }
    }
}

// Separador fracionário do formato é '.'; uma ',' perdida é tolerada como '.'.
fn parse_statement_amount(text: &str) -> Option<Decimal> {
    let cleaned = text.trim().replace(',', ".");
    if cleaned.is_empty() {
        return None;
    }
    Decimal::from_str(&cleaned).ok()
}

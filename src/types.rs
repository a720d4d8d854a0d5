use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Nomes canônicos das colunas tipadas do razão.
pub const COL_EMISSAO: &str = "Emissão";
pub const COL_VENCTO: &str = "Vencto";
pub const COL_PAGTO: &str = "Pagto";
pub const COL_VALOR: &str = "Valor";
pub const COL_CLASSE: &str = "CLASSE";
pub const COL_HISTORICO: &str = "Historico";

pub(crate) const TYPED_COLUMNS: &[&str] = &[
    COL_EMISSAO,
    COL_VENCTO,
    COL_PAGTO,
    COL_VALOR,
    COL_CLASSE,
    COL_HISTORICO,
];

/// Uma linha limpa do razão exportado pelo sistema de faturamento.
///
/// Datas ausentes ou inválidas ficam `None`; o valor é sempre finito (falhas
/// de parse viram zero e são contadas em [`CleaningStats`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub issue_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub payment_date: Option<NaiveDate>,
    pub amount: Decimal,
    pub category: String,
    pub history: String,
    pub bank_identifier: Option<String>,
    /// Demais colunas canônicas, preservadas para agrupamento e exportação.
    #[serde(default)]
    pub extra: BTreeMap<String, String>,
}

impl LedgerEntry {
    /// Resolve uma coluna canônica para o valor tipado desta linha.
    pub fn field(&self, column: &str) -> FieldValue {
        match column {
            COL_EMISSAO => FieldValue::from_date(self.issue_date),
            COL_VENCTO => FieldValue::from_date(self.due_date),
            COL_PAGTO => FieldValue::from_date(self.payment_date),
            COL_VALOR => FieldValue::Number(self.amount),
            COL_CLASSE => FieldValue::from_text(&self.category),
            COL_HISTORICO => FieldValue::from_text(&self.history),
            other => self
                .extra
                .get(other)
                .map(|v| FieldValue::from_text(v))
                .unwrap_or(FieldValue::Empty),
        }
    }
}

/// Uma transação decodificada de um extrato bancário.
///
/// Linhas com data ou valor ilegíveis são retidas com o campo `None` em vez de
/// descartadas; o conciliador nunca as pareia.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankTransaction {
    pub posted_date: Option<NaiveDate>,
    pub amount: Option<Decimal>,
    pub kind: Option<String>,
    pub external_id: Option<String>,
    pub document: Option<String>,
    pub memo: Option<String>,
    pub payer_name: Option<String>,
    pub source_file: String,
}

impl BankTransaction {
    /// Nome do pagador, caindo para o memo quando ausente.
    pub fn description(&self) -> Option<&str> {
        self.payer_name.as_deref().or(self.memo.as_deref())
    }
}

/// Valor tipado de uma coluna, ordenável para o agrupamento (vazios por último).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FieldValue {
    Date(NaiveDate),
    Number(Decimal),
    Text(String),
    Empty,
}

impl FieldValue {
    fn from_date(date: Option<NaiveDate>) -> Self {
        date.map(FieldValue::Date).unwrap_or(FieldValue::Empty)
    }

    fn from_text(text: &str) -> Self {
        if text.is_empty() {
            FieldValue::Empty
        } else {
            FieldValue::Text(text.to_string())
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Date(date) => write!(f, "{}", date.format("%d/%m/%Y")),
            FieldValue::Number(value) => {
                let mut rounded = *value;
                rounded.rescale(2);
                write!(f, "{}", rounded.to_string().replace('.', ","))
            }
            FieldValue::Text(text) => f.write_str(text),
            FieldValue::Empty => Ok(()),
        }
    }
}

/// Contadores observáveis da limpeza do razão.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleaningStats {
    pub initial_rows: usize,
    pub final_rows: usize,
    pub dropped_control_rows: usize,
    /// Valores de data convertidos com sucesso (sobre as três colunas de data).
    pub parsed_dates: usize,
    /// Valores convertidos com sucesso na coluna Valor; a diferença para
    /// `final_rows` é o número de zeros-por-falha.
    pub parsed_amounts: usize,
    pub encoding: String,
    pub separator: char,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn sample_entry() -> LedgerEntry {
        LedgerEntry {
            issue_date: NaiveDate::from_ymd_opt(2024, 3, 1),
            due_date: NaiveDate::from_ymd_opt(2024, 3, 5),
            payment_date: NaiveDate::from_ymd_opt(2024, 3, 5),
            amount: Decimal::from_str("1234.56").unwrap(),
            category: "MENSALIDADE INDIVIDUAL".to_string(),
            history: "Mensalidade março".to_string(),
            bank_identifier: Some("Banco Itaú".to_string()),
            extra: BTreeMap::from([("Nome Banco".to_string(), "Banco Itaú".to_string())]),
        }
    }

    #[test]
    fn test_field_resolves_typed_columns() {
        let entry = sample_entry();
        assert_eq!(
            entry.field(COL_PAGTO),
            FieldValue::Date(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap())
        );
        assert_eq!(
            entry.field(COL_VALOR),
            FieldValue::Number(Decimal::from_str("1234.56").unwrap())
        );
        assert_eq!(
            entry.field("Nome Banco"),
            FieldValue::Text("Banco Itaú".to_string())
        );
        assert_eq!(entry.field("Inexistente"), FieldValue::Empty);
    }

    #[test]
    fn test_field_missing_date_is_empty() {
        let mut entry = sample_entry();
        entry.payment_date = None;
        assert_eq!(entry.field(COL_PAGTO), FieldValue::Empty);
    }

    #[test]
    fn test_field_value_ordering() {
        let date = FieldValue::Date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        let later = FieldValue::Date(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        let text = FieldValue::Text("abc".to_string());
        assert!(date < later);
        assert!(date < text);
        assert!(text < FieldValue::Empty);
    }

    #[test]
    fn test_field_value_display() {
        let date = FieldValue::Date(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
        assert_eq!(date.to_string(), "05/03/2024");
        let number = FieldValue::Number(Decimal::from_str("150").unwrap());
        assert_eq!(number.to_string(), "150,00");
        assert_eq!(FieldValue::Empty.to_string(), "");
    }

    #[test]
    fn test_description_falls_back_to_memo() {
        let txn = BankTransaction {
            posted_date: None,
            amount: None,
            kind: None,
            external_id: None,
            document: None,
            memo: Some("PIX recebido".to_string()),
            payer_name: None,
            source_file: "extrato.ofx".to_string(),
        };
        assert_eq!(txn.description(), Some("PIX recebido"));
    }

    #[test]
    fn test_ledger_entry_serialization() {
        let entry = sample_entry();
        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("MENSALIDADE INDIVIDUAL"));

        let deserialized: LedgerEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.amount, entry.amount);
        assert_eq!(deserialized.payment_date, entry.payment_date);
        assert_eq!(deserialized.extra, entry.extra);
    }

    #[test]
    fn test_bank_transaction_serialization() {
        let txn = BankTransaction {
            posted_date: NaiveDate::from_ymd_opt(2024, 1, 15),
            amount: Some(Decimal::from_str("-42.50").unwrap()),
            kind: Some("DEBIT".to_string()),
            external_id: Some("ABC".to_string()),
            document: None,
            memo: None,
            payer_name: Some("Clínica".to_string()),
            source_file: "extrato.ofx".to_string(),
        };
        let json = serde_json::to_string(&txn).unwrap();
        assert!(json.contains("DEBIT"));

        let deserialized: BankTransaction = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.amount, txn.amount);
        assert_eq!(deserialized.external_id, txn.external_id);
    }
}

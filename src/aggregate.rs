use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{ReconcileError, ReconcileResult};
use crate::parsers::ledger::BrlAmount;
use crate::types::{COL_VALOR, FieldValue, LedgerEntry, TYPED_COLUMNS};

/// Uma linha do agrupamento: chave, quantidade e soma do valor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRow {
    pub key: Vec<FieldValue>,
    pub count: usize,
    pub total: Decimal,
}

/// Resultado de `group_totals`: as colunas usadas e uma linha por combinação
/// distinta, na ordem natural da chave.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupTotals {
    pub by: Vec<String>,
    pub rows: Vec<GroupRow>,
}

/// Agrupa os lançamentos pelas colunas pedidas somando a coluna de valor
/// (padrão `Valor`; nulos somam como zero). Colunas inexistentes são
/// descartadas; se nenhuma sobrar o agrupamento é inválido.
pub fn group_totals(
    entries: &[LedgerEntry],
    by: &[&str],
    value_column: Option<&str>,
) -> ReconcileResult<GroupTotals> {
    let available = available_columns(entries);
    let columns: Vec<&str> = by
        .iter()
        .copied()
        .filter(|column| available.contains(*column))
        .collect();
    if columns.is_empty() {
        return Err(ReconcileError::InvalidGrouping(by.join(", ")));
    }

    let value_column = value_column.unwrap_or(COL_VALOR);
    let mut groups: BTreeMap<Vec<FieldValue>, (usize, Decimal)> = BTreeMap::new();
    for entry in entries {
        let key: Vec<FieldValue> = columns.iter().map(|column| entry.field(column)).collect();
        let value = numeric_value(entry, value_column);
        let slot = groups.entry(key).or_insert((0, Decimal::ZERO));
        slot.0 += 1;
        slot.1 += value;
    }

    Ok(GroupTotals {
        by: columns.iter().map(|c| c.to_string()).collect(),
        rows: groups
            .into_iter()
            .map(|(key, (count, total))| GroupRow { key, count, total })
            .collect(),
    })
}

fn numeric_value(entry: &LedgerEntry, column: &str) -> Decimal {
    if column == COL_VALOR {
        return entry.amount;
    }
    match entry.field(column) {
        FieldValue::Number(value) => value,
        FieldValue::Text(text) => BrlAmount::from(text.as_str())
            .parse()
            .unwrap_or(Decimal::ZERO),
        _ => Decimal::ZERO,
    }
}

fn available_columns(entries: &[LedgerEntry]) -> BTreeSet<&str> {
    let mut available: BTreeSet<&str> = TYPED_COLUMNS.iter().copied().collect();
    for entry in entries {
        available.extend(entry.extra.keys().map(String::as_str));
    }
    available
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::collections::BTreeMap;
    use std::str::FromStr;

    fn entry(payment: Option<&str>, amount: &str, category: &str, bank: &str) -> LedgerEntry {
        LedgerEntry {
            issue_date: None,
            due_date: None,
            payment_date: payment.map(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").unwrap()),
            amount: Decimal::from_str(amount).unwrap(),
            category: category.to_string(),
            history: String::new(),
            bank_identifier: None,
            extra: if bank.is_empty() {
                BTreeMap::new()
            } else {
                BTreeMap::from([("Nome Banco".to_string(), bank.to_string())])
            },
        }
    }

    fn sample() -> Vec<LedgerEntry> {
        vec![
            entry(Some("2024-03-05"), "100.00", "MENSALIDADE INDIVIDUAL", "Itaú"),
            entry(Some("2024-03-01"), "50.00", "DESCONTO ADMINISTRATIVO", "Itaú"),
            entry(Some("2024-03-05"), "25.00", "MENSALIDADE INDIVIDUAL", ""),
            entry(None, "10.00", "MENSALIDADE INDIVIDUAL", "Bradesco"),
        ]
    }

    #[test]
    fn test_group_by_category() {
        let totals = group_totals(&sample(), &["CLASSE"], None).unwrap();
        assert_eq!(totals.by, vec!["CLASSE"]);
        assert_eq!(totals.rows.len(), 2);

        // ordem natural da chave: DESCONTO antes de MENSALIDADE
        assert_eq!(
            totals.rows[0].key,
            vec![FieldValue::Text("DESCONTO ADMINISTRATIVO".to_string())]
        );
        assert_eq!(totals.rows[0].count, 1);
        assert_eq!(totals.rows[1].count, 3);
        assert_eq!(totals.rows[1].total, Decimal::from_str("135.00").unwrap());
    }

    #[test]
    fn test_group_by_payment_date_sorts_chronologically_nulls_last() {
        let totals = group_totals(&sample(), &["Pagto"], None).unwrap();
        let keys: Vec<&FieldValue> = totals.rows.iter().map(|r| &r.key[0]).collect();
        assert_eq!(
            keys,
            vec![
                &FieldValue::Date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()),
                &FieldValue::Date(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()),
                &FieldValue::Empty,
            ]
        );
    }

    #[test]
    fn test_group_by_extra_column() {
        let totals = group_totals(&sample(), &["Nome Banco"], None).unwrap();
        assert_eq!(totals.rows.len(), 3); // Bradesco, Itaú e sem banco
        let itau = totals
            .rows
            .iter()
            .find(|r| r.key[0] == FieldValue::Text("Itaú".to_string()))
            .unwrap();
        assert_eq!(itau.total, Decimal::from_str("150.00").unwrap());
    }

    #[test]
    fn test_missing_columns_are_filtered() {
        let totals = group_totals(&sample(), &["Inexistente", "CLASSE"], None).unwrap();
        assert_eq!(totals.by, vec!["CLASSE"]);
    }

    #[test]
    fn test_no_valid_column_is_an_error() {
        let result = group_totals(&sample(), &["Inexistente", "Outra"], None);
        assert!(matches!(result, Err(ReconcileError::InvalidGrouping(_))));
    }

    #[test]
    fn test_multi_column_grouping() {
        let totals = group_totals(&sample(), &["Pagto", "CLASSE"], None).unwrap();
        assert_eq!(totals.rows.len(), 4);
        assert_eq!(totals.rows.iter().map(|r| r.count).sum::<usize>(), 4);
    }
}

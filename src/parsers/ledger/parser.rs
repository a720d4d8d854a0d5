use std::collections::BTreeMap;

use csv::ReaderBuilder;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::columns::{canonicalize_headers, detect_bank_column};
use super::dto::RawTable;
use super::types::{BrlAmount, LedgerDate};
use crate::errors::{ReconcileError, ReconcileResult};
use crate::parsers::decode::decode_bytes;
use crate::parsers::traits::Parser;
use crate::types::{
    COL_CLASSE, COL_EMISSAO, COL_HISTORICO, COL_PAGTO, COL_VALOR, COL_VENCTO, CleaningStats,
    LedgerEntry,
};

/// Linhas de preâmbulo do relatório antes do cabeçalho.
pub const SKIPPED_PREAMBLE_LINES: usize = 3;

const SEPARATOR_CANDIDATES: &[u8] = &[b';', b'\t', b','];

/// Razão normalizado: lançamentos tipados, colunas canônicas e estatísticas
/// da limpeza. Consumido somente para leitura pelas camadas de cima.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedLedger {
    pub entries: Vec<LedgerEntry>,
    pub columns: Vec<String>,
    pub bank_column: Option<String>,
    pub stats: CleaningStats,
}

pub struct LedgerParser;

impl Parser for LedgerParser {
    type Output = NormalizedLedger;

    fn is_supported(filename: Option<&str>, content: &[u8]) -> bool {
        if let Some(name) = filename {
            let ext = name.to_lowercase();
            if ext.ends_with(".csv") || ext.ends_with(".txt") {
                return !content.is_empty();
            }
        }

        // o cabeçalho vem depois do preâmbulo, então olha as primeiras linhas
        let head = String::from_utf8_lossy(&content[..content.len().min(2048)]);
        !head.to_uppercase().contains("<OFX")
            && head.lines().take(SKIPPED_PREAMBLE_LINES + 2).any(|line| {
                SEPARATOR_CANDIDATES
                    .iter()
                    .any(|&sep| line.contains(sep as char))
            })
    }

    fn parse(content: &[u8], _source: &str) -> ReconcileResult<NormalizedLedger> {
        let (text, encoding) = decode_bytes(content)?;

        let body = text
            .lines()
            .skip(SKIPPED_PREAMBLE_LINES)
            .collect::<Vec<_>>()
            .join("\n");

        let separator = detect_separator(&body)?;
        let mut raw = read_table(&body, separator)?;
        raw.drop_empty();
        debug!(
            encoding,
            separator = %(separator as char),
            rows = raw.rows.len(),
            "ledger upload decoded"
        );

        Ok(clean_table(raw, encoding, separator))
    }
}

// Tenta os separadores em ordem até o cabeçalho render mais de uma coluna.
fn detect_separator(body: &str) -> ReconcileResult<u8> {
    for &separator in SEPARATOR_CANDIDATES {
        let mut reader = ReaderBuilder::new()
            .delimiter(separator)
            .has_headers(false)
            .flexible(true)
            .from_reader(body.as_bytes());
        if let Some(Ok(record)) = reader.records().next() {
            if record.len() > 1 {
                return Ok(separator);
            }
        }
    }
    Err(ReconcileError::LedgerReadFailed(
        "no field separator produced more than one column".to_string(),
    ))
}

fn read_table(body: &str, separator: u8) -> ReconcileResult<RawTable> {
    let mut reader = ReaderBuilder::new()
        .delimiter(separator)
        .has_headers(false)
        .flexible(true)
        .from_reader(body.as_bytes());

    let mut records = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| ReconcileError::LedgerReadFailed(e.to_string()))?;
        records.push(
            record
                .iter()
                .map(|cell| cell.trim().to_string())
                .collect::<Vec<String>>(),
        );
    }

    let mut records = records.into_iter();
    let headers = records
        .next()
        .ok_or_else(|| ReconcileError::LedgerReadFailed("empty upload".to_string()))?;
    Ok(RawTable::new(headers, records.collect()))
}

fn clean_table(mut raw: RawTable, encoding: &str, separator: u8) -> NormalizedLedger {
    let initial_rows = raw.rows.len();
    let columns = canonicalize_headers(&raw.headers);
    let dropped_control_rows = raw.drop_control_rows();

    let bank_column = detect_bank_column(&columns);
    let position = |name: &str| columns.iter().position(|column| column == name);
    let issue_idx = position(COL_EMISSAO);
    let due_idx = position(COL_VENCTO);
    let payment_idx = position(COL_PAGTO);
    let amount_idx = position(COL_VALOR);
    let category_idx = position(COL_CLASSE);
    let history_idx = position(COL_HISTORICO);
    let bank_idx = bank_column.and_then(position);
    let typed: Vec<Option<usize>> = vec![
        issue_idx,
        due_idx,
        payment_idx,
        amount_idx,
        category_idx,
        history_idx,
    ];

    let mut parsed_dates = 0usize;
    let mut parsed_amounts = 0usize;
    let mut entries = Vec::with_capacity(raw.rows.len());

    for row in &raw.rows {
        let cell = |idx: Option<usize>| idx.and_then(|i| row.get(i)).map(String::as_str);

        let mut parse_date = |idx: Option<usize>| {
            let parsed = cell(idx).and_then(|value| LedgerDate::from(value).parse());
            if parsed.is_some() {
                parsed_dates += 1;
            }
            parsed
        };
        let issue_date = parse_date(issue_idx);
        let due_date = parse_date(due_idx);
        let payment_date = parse_date(payment_idx);

        let amount = match cell(amount_idx).and_then(|value| BrlAmount::from(value).parse()) {
            Some(value) => {
                parsed_amounts += 1;
                value.round_dp(2)
            }
            // nunca perde a linha: falha de parse vira zero e fica nos contadores
            None => Decimal::ZERO,
        };

        let mut extra = BTreeMap::new();
        for (i, column) in columns.iter().enumerate() {
            if typed.contains(&Some(i)) {
                continue;
            }
            if let Some(value) = row.get(i) {
                if !value.is_empty() {
                    extra.insert(column.clone(), value.clone());
                }
            }
        }

        entries.push(LedgerEntry {
            issue_date,
            due_date,
            payment_date,
            amount,
            category: cell(category_idx).unwrap_or_default().to_string(),
            history: cell(history_idx).unwrap_or_default().to_string(),
            bank_identifier: cell(bank_idx)
                .filter(|value| !value.is_empty())
                .map(str::to_string),
            extra,
        });
    }

    let stats = CleaningStats {
        initial_rows,
        final_rows: entries.len(),
        dropped_control_rows,
        parsed_dates,
        parsed_amounts,
        encoding: encoding.to_string(),
        separator: separator as char,
    };

    NormalizedLedger {
        entries,
        columns,
        bank_column: bank_column.map(str::to_string),
        stats,
    }
}

use std::cmp::Ordering;
use std::fmt;

use serde::Serialize;
use tracing::warn;

use super::dto::OfxBlock;
use crate::errors::{ReconcileError, ReconcileResult};
use crate::parsers::decode::decode_bytes;
use crate::parsers::traits::Parser;
use crate::types::BankTransaction;

/// Resultado do parse de um único arquivo de extrato.
#[derive(Debug, Default)]
pub struct StatementParse {
    pub transactions: Vec<BankTransaction>,
    pub warnings: Vec<StatementWarning>,
}

/// Resultado da combinação de vários arquivos: transações ordenadas em
/// conjunto, avisos acumulados e falhas isoladas por arquivo.
#[derive(Debug, Default)]
pub struct StatementBatch {
    pub transactions: Vec<BankTransaction>,
    pub warnings: Vec<StatementWarning>,
    pub failures: Vec<(String, ReconcileError)>,
}

/// Condições brandas de qualidade de dados; nunca abortam o processamento.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum StatementWarning {
    NoTransactionBlocks { source: String },
}

impl fmt::Display for StatementWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatementWarning::NoTransactionBlocks { source } => {
                write!(f, "no transaction blocks found in {source}")
            }
        }
    }
}

pub struct OfxParser;

impl Parser for OfxParser {
    type Output = StatementParse;

    fn is_supported(filename: Option<&str>, content: &[u8]) -> bool {
        if let Some(name) = filename {
            let ext = name.to_lowercase();
            if ext.ends_with(".ofx") || ext.ends_with(".qfx") {
                return true;
            }
        }

        let head = String::from_utf8_lossy(&content[..content.len().min(2048)]).to_uppercase();
        head.contains("<OFX") || head.contains("OFXHEADER") || head.contains("<STMTTRN")
    }

    fn parse(content: &[u8], source: &str) -> ReconcileResult<StatementParse> {
        let (text, _encoding) = decode_bytes(content)?;
        let blocks = scan_blocks(&text);

        let mut warnings = Vec::new();
        if blocks.is_empty() {
            warn!(source, "statement file contained no transaction blocks");
            warnings.push(StatementWarning::NoTransactionBlocks {
                source: source.to_string(),
            });
        }

        let mut transactions: Vec<BankTransaction> = blocks
            .into_iter()
            .map(|block| block.into_transaction(source))
            .collect();
        sort_transactions(&mut transactions);

        Ok(StatementParse {
            transactions,
            warnings,
        })
    }
}

/// Faz o parse de um arquivo de extrato a partir dos bytes crus.
pub fn parse_statement(content: &[u8], source: &str) -> ReconcileResult<StatementParse> {
    OfxParser::parse(content, source)
}

/// Combina vários arquivos enviados em uma única sequência ordenada.
/// Uma falha em um arquivo não interrompe o processamento dos demais.
pub fn parse_statement_batch<'a, I>(files: I) -> StatementBatch
where
    I: IntoIterator<Item = (&'a str, &'a [u8])>,
{
    let mut batch = StatementBatch::default();
    for (source, content) in files {
        match OfxParser::parse(content, source) {
            Ok(parsed) => {
                batch.transactions.extend(parsed.transactions);
                batch.warnings.extend(parsed.warnings);
            }
            Err(error) => batch.failures.push((source.to_string(), error)),
        }
    }
    sort_transactions(&mut batch.transactions);
    batch
}

// Ordena por (data, identificador), nulos por último; estável para empates.
fn sort_transactions(transactions: &mut [BankTransaction]) {
    transactions.sort_by(|a, b| {
        cmp_nulls_last(&a.posted_date, &b.posted_date)
            .then_with(|| cmp_nulls_last(&a.external_id, &b.external_id))
    });
}

fn cmp_nulls_last<T: Ord>(a: &Option<T>, b: &Option<T>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.cmp(y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Lexer dos blocos `<STMTTRN>`: cada segmento `<TAG>valor` vira um par; o
/// valor termina no próximo `<` ou na quebra de linha (tolerante a tags de
/// fechamento ausentes). Tags desconhecidas são ignoradas.
fn scan_blocks(text: &str) -> Vec<OfxBlock> {
    let mut blocks = Vec::new();
    let mut current: Option<OfxBlock> = None;

    for segment in text.split('<') {
        let Some((raw_name, raw_value)) = segment.split_once('>') else {
            continue;
        };
        let name = raw_name.trim().to_uppercase();

        if name == "STMTTRN" {
            current = Some(OfxBlock::default());
            continue;
        }
        if name == "/STMTTRN" {
            if let Some(block) = current.take() {
                if !block.is_empty() {
                    blocks.push(block);
                }
            }
            continue;
        }

        let Some(block) = current.as_mut() else {
            continue;
        };
        if name.is_empty() || name.starts_with('/') {
            continue;
        }
        let value = raw_value.lines().next().unwrap_or("").trim();
        if value.is_empty() {
            continue;
        }
        block.insert(name, value.to_string());
    }

    // bloco final sem tag de fechamento ainda é aproveitado
    if let Some(block) = current.take() {
        if !block.is_empty() {
            blocks.push(block);
        }
    }

    blocks
}

use chrono::NaiveDate;
use csv::WriterBuilder;
use rust_decimal::Decimal;

use crate::classify::AccountingPosting;
use crate::errors::{ReconcileError, ReconcileResult};
use crate::reconcile::Reconciliation;
use crate::types::{BankTransaction, LedgerEntry};

const FIELD_SEPARATOR: u8 = b';';

pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

pub fn format_opt_date(date: Option<NaiveDate>) -> String {
    date.map(format_date).unwrap_or_default()
}

/// Valor com exatamente duas casas e vírgula decimal (ex.: `1234,56`).
pub fn format_amount(value: Decimal) -> String {
    let mut rounded = value;
    rounded.rescale(2);
    rounded.to_string().replace('.', ",")
}

/// Formato monetário de relatório: `R$ 1.234,56`.
pub fn format_brl(value: Decimal) -> String {
    let mut rounded = value;
    rounded.rescale(2);
    let text = rounded.to_string();
    let (integer, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));
    let (sign, digits) = match integer.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", integer),
    };

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    format!("R$ {sign}{grouped},{fraction}")
}

/// Exporta os lançamentos contábeis em texto separado por ';'.
pub fn postings_to_csv(postings: &[AccountingPosting]) -> ReconcileResult<String> {
    write_rows(
        ["Debit", "Credit", "History", "Date", "Amount", "Complement"],
        postings.iter().map(|p| {
            [
                p.debit.clone(),
                p.credit.clone(),
                p.history.clone(),
                p.date.clone(),
                p.amount.clone(),
                p.complement.clone(),
            ]
        }),
    )
}

/// Pares conciliados; valores mantêm o sinal para auditoria.
pub fn matched_to_csv(reconciliation: &Reconciliation) -> ReconcileResult<String> {
    write_rows(
        [
            "Date",
            "Ledger Amount",
            "Bank Amount",
            "Difference",
            "Category",
            "History",
            "Bank Memo",
        ],
        reconciliation.matched.iter().map(|pair| {
            [
                format_opt_date(pair.ledger.payment_date),
                format_amount(pair.ledger.amount),
                pair.bank.amount.map(format_amount).unwrap_or_default(),
                format_amount(pair.difference),
                pair.ledger.category.clone(),
                pair.ledger.history.clone(),
                pair.bank.description().unwrap_or_default().to_string(),
            ]
        }),
    )
}

pub fn ledger_only_to_csv(entries: &[LedgerEntry]) -> ReconcileResult<String> {
    write_rows(
        ["Date", "Amount", "Category", "History", "Bank"],
        entries.iter().map(|entry| {
            [
                format_opt_date(entry.payment_date),
                format_amount(entry.amount),
                entry.category.clone(),
                entry.history.clone(),
                entry.bank_identifier.clone().unwrap_or_default(),
            ]
        }),
    )
}

pub fn bank_only_to_csv(transactions: &[BankTransaction]) -> ReconcileResult<String> {
    write_rows(
        ["Date", "Amount", "Kind", "Payer", "Memo", "Document", "Source"],
        transactions.iter().map(|txn| {
            [
                format_opt_date(txn.posted_date),
                txn.amount.map(format_amount).unwrap_or_default(),
                txn.kind.clone().unwrap_or_default(),
                txn.payer_name.clone().unwrap_or_default(),
                txn.memo.clone().unwrap_or_default(),
                txn.document.clone().unwrap_or_default(),
                txn.source_file.clone(),
            ]
        }),
    )
}

fn write_rows<const N: usize, I>(header: [&str; N], rows: I) -> ReconcileResult<String>
where
    I: Iterator<Item = [String; N]>,
{
    let mut writer = WriterBuilder::new()
        .delimiter(FIELD_SEPARATOR)
        .from_writer(Vec::new());
    writer.write_record(header).map_err(export_error)?;
    for row in rows {
        writer.write_record(&row).map_err(export_error)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| ReconcileError::ExportFailed(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| ReconcileError::ExportFailed(e.to_string()))
}

fn export_error(error: csv::Error) -> ReconcileError {
    ReconcileError::ExportFailed(error.to_string())
}

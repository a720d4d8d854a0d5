//! Reconcile dental-billing ledger exports against bank statement transactions.
//!
//! ```rust,ignore
//! use ledger_reconcile_rs::{LedgerParser, Parser, parse_statement, reconcile};
//!
//! let ledger = LedgerParser::parse(&ledger_bytes, "contas.csv")?;
//! let statement = parse_statement(&ofx_bytes, "extrato.ofx")?;
//! let result = reconcile(&ledger.entries, &statement.transactions);
//! ```

mod aggregate;
mod builder;
mod cache;
mod classify;
mod config;
mod export;
mod reconcile;
mod text;
mod types;

pub mod errors;
pub mod parsers;

pub use aggregate::{GroupRow, GroupTotals, group_totals};
pub use builder::{FileFormat, Upload, UploadBuilder};
pub use cache::ParseCache;
pub use classify::{AccountRule, AccountingPosting, classify_entry, classify_groups, lookup_rule};
pub use config::SessionConfig;
pub use export::{
    bank_only_to_csv, format_amount, format_brl, format_date, format_opt_date, ledger_only_to_csv,
    matched_to_csv, postings_to_csv,
};
pub use reconcile::{MatchPair, Reconciliation, reconcile};
pub use types::{BankTransaction, CleaningStats, FieldValue, LedgerEntry};

pub use parsers::prelude::*;

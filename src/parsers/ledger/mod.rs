mod columns;
mod dto;
mod parser;
mod types;

pub use columns::{BANK_COLUMN_CANDIDATES, canonicalize_headers, detect_bank_column};
pub use parser::{LedgerParser, NormalizedLedger, SKIPPED_PREAMBLE_LINES};
pub use types::{BrlAmount, LedgerDate};

pub mod prelude {
    pub use super::{
        BrlAmount, LedgerDate, LedgerParser, NormalizedLedger, canonicalize_headers,
        detect_bank_column,
    };
}

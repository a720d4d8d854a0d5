mod dto;
mod parser;
mod types;

pub use parser::{
    OfxParser, StatementBatch, StatementParse, StatementWarning, parse_statement,
    parse_statement_batch,
};
pub use types::OfxDate;

pub mod prelude {
    pub use super::{
        OfxDate, OfxParser, StatementBatch, StatementParse, StatementWarning, parse_statement,
        parse_statement_batch,
    };
}

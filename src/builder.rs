use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::cache::ParseCache;
use crate::errors::{ReconcileError, ReconcileResult};
use crate::parsers::ledger::{LedgerParser, NormalizedLedger};
use crate::parsers::ofx::{OfxParser, StatementParse};
use crate::parsers::traits::Parser;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileFormat {
    #[serde(rename = "ofx")]
    Ofx,
    #[serde(rename = "ledger")]
    Ledger,
}

impl FileFormat {
    fn detect(filename: Option<&str>, content: Option<&[u8]>) -> ReconcileResult<Self> {
        if let Some(content) = content {
            if OfxParser::is_supported(filename, content) {
                return Ok(FileFormat::Ofx);
            }
            if LedgerParser::is_supported(filename, content) {
                return Ok(FileFormat::Ledger);
            }
        }

        if let Some(filename) = filename {
            if let Some(ext) = filename.split('.').next_back() {
                match ext.to_lowercase().as_str() {
                    "ofx" | "qfx" => return Ok(FileFormat::Ofx),
                    "csv" | "txt" => return Ok(FileFormat::Ledger),
                    _ => {}
                }
            }
        }

        Err(ReconcileError::UnsupportedFormat)
    }
}

/// Upload já processado, pronto para conciliação/classificação.
#[derive(Debug)]
pub enum Upload {
    Statement(StatementParse),
    Ledger(NormalizedLedger),
}

/// Ponto de entrada para uma fonte de upload qualquer: bytes em memória ou
/// caminho no disco, com detecção de formato quando não informado.
#[derive(Default)]
pub struct UploadBuilder {
    content: Option<Vec<u8>>,
    filepath: Option<String>,
    format: Option<FileFormat>,
}

impl UploadBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content(mut self, content: &[u8]) -> Self {
        self.content = Some(content.to_vec());
        self
    }

    pub fn path(mut self, path: &str) -> Self {
        self.filepath = Some(path.to_string());
        self
    }

    pub fn format(mut self, format: FileFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn load(self) -> ReconcileResult<Upload> {
        let (content, source, format) = self.resolve()?;
        parse_upload(&content, &source, format)
    }

    /// Como `load`, mas memoizado pela identidade do conteúdo.
    pub fn load_cached(self, cache: &ParseCache<Upload>) -> ReconcileResult<Arc<Upload>> {
        let (content, source, format) = self.resolve()?;
        cache.get_or_try_insert_with(&content, || parse_upload(&content, &source, format))
    }

    fn resolve(self) -> ReconcileResult<(Vec<u8>, String, FileFormat)> {
        let format = match self.format {
            Some(format) => format,
            None => FileFormat::detect(self.filepath.as_deref(), self.content.as_deref())?,
        };

        let source = self
            .filepath
            .as_deref()
            .and_then(|path| Path::new(path).file_name())
            .and_then(|name| name.to_str())
            .unwrap_or("upload")
            .to_string();

        let content = match self.content {
            Some(content) => content,
            None => {
                let path = self
                    .filepath
                    .as_deref()
                    .ok_or(ReconcileError::MissingContentAndFilepath)?;
                fs::read(path)?
            }
        };

        Ok((content, source, format))
    }
}

fn parse_upload(content: &[u8], source: &str, format: FileFormat) -> ReconcileResult<Upload> {
    match format {
        FileFormat::Ofx => OfxParser::parse(content, source).map(Upload::Statement),
        FileFormat::Ledger => LedgerParser::parse(content, source).map(Upload::Ledger),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const SAMPLE_OFX: &[u8] = b"<STMTTRN><DTPOSTED>20240115<TRNAMT>-42.50<FITID>ABC</STMTTRN>";
    const SAMPLE_LEDGER: &[u8] =
        b"l1\nl2\nl3\nValor;CLASSE\n150,00;MENSALIDADE INDIVIDUAL\n";

    #[test]
    fn test_empty_builder_is_unsupported() {
        let result = UploadBuilder::new().load();
        assert!(matches!(result, Err(ReconcileError::UnsupportedFormat)));
    }

    #[test]
    fn test_format_without_input_is_missing_content() {
        let result = UploadBuilder::new().format(FileFormat::Ofx).load();
        assert!(matches!(
            result,
            Err(ReconcileError::MissingContentAndFilepath)
        ));
    }

    #[rstest]
    #[case(None, SAMPLE_OFX, FileFormat::Ofx)]
    #[case(Some("extrato.ofx"), SAMPLE_OFX, FileFormat::Ofx)]
    #[case(Some("contas.csv"), SAMPLE_LEDGER, FileFormat::Ledger)]
    #[case(None, SAMPLE_LEDGER, FileFormat::Ledger)]
    fn test_detect(
        #[case] filename: Option<&str>,
        #[case] content: &[u8],
        #[case] expected: FileFormat,
    ) {
        assert_eq!(
            FileFormat::detect(filename, Some(content)).unwrap(),
            expected
        );
    }

    #[test]
    fn test_load_statement() {
        let upload = UploadBuilder::new().content(SAMPLE_OFX).load().unwrap();
        match upload {
            Upload::Statement(parsed) => assert_eq!(parsed.transactions.len(), 1),
            Upload::Ledger(_) => panic!("esperava extrato"),
        }
    }

    #[test]
    fn test_load_ledger() {
        let upload = UploadBuilder::new()
            .content(SAMPLE_LEDGER)
            .format(FileFormat::Ledger)
            .load()
            .unwrap();
        match upload {
            Upload::Ledger(ledger) => {
                assert_eq!(ledger.entries.len(), 1);
                assert_eq!(ledger.entries[0].category, "MENSALIDADE INDIVIDUAL");
            }
            Upload::Statement(_) => panic!("esperava razão"),
        }
    }

    #[test]
    fn test_load_cached_reuses_parse() {
        let cache = ParseCache::new();
        let first = UploadBuilder::new()
            .content(SAMPLE_OFX)
            .load_cached(&cache)
            .unwrap();
        let second = UploadBuilder::new()
            .content(SAMPLE_OFX)
            .load_cached(&cache)
            .unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_format_serialization() {
        let json = serde_json::to_string(&FileFormat::Ofx).unwrap();
        assert!(json.contains("ofx"));
        let parsed: FileFormat = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, FileFormat::Ofx);
    }
}

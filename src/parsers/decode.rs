use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};

use crate::errors::{ReconcileError, ReconcileResult};

const UTF8_BOM: &[u8] = b"\xef\xbb\xbf";

// Os relatórios chegam em UTF-8 (com ou sem BOM) ou em páginas de código
// legadas; windows-1252 cobre byte a byte os candidatos latin1/cp1252.
const ENCODING_CANDIDATES: &[&Encoding] = &[UTF_8, WINDOWS_1252];

/// Decodifica os bytes tentando os candidatos em ordem; o primeiro que não
/// falhar vence.
pub(crate) fn decode_bytes(content: &[u8]) -> ReconcileResult<(String, &'static str)> {
    let body = content.strip_prefix(UTF8_BOM).unwrap_or(content);
    for encoding in ENCODING_CANDIDATES {
        if let Some(text) = encoding.decode_without_bom_handling_and_without_replacement(body) {
            return Ok((text.into_owned(), encoding.name()));
        }
    }
    Err(ReconcileError::DecodeFailed)
}

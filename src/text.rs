//! Normalização de texto usada pelos cabeçalhos do razão e pelas regras contábeis.

/// Remove acentos do intervalo Latin-1 usado pelos relatórios (pt-BR).
pub(crate) fn strip_accents(text: &str) -> String {
    text.chars().map(fold_char).collect()
}

fn fold_char(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'Á' | 'À' | 'Â' | 'Ã' | 'Ä' | 'Å' => 'A',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'É' | 'È' | 'Ê' | 'Ë' => 'E',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'Í' | 'Ì' | 'Î' | 'Ï' => 'I',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'Ó' | 'Ò' | 'Ô' | 'Õ' | 'Ö' => 'O',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'Ú' | 'Ù' | 'Û' | 'Ü' => 'U',
        'ç' => 'c',
        'Ç' => 'C',
        'ñ' => 'n',
        'Ñ' => 'N',
        'º' => 'o',
        'ª' => 'a',
        _ => c,
    }
}

/// Chave de busca para a tabela de sinônimos de colunas: minúsculas, sem
/// acentos, com espaços e pontuação de separação comprimidos em um espaço.
pub(crate) fn normalize_key(text: &str) -> String {
    strip_accents(text)
        .to_lowercase()
        .split(|c: char| c.is_whitespace() || matches!(c, '.' | '_' | '-' | '/'))
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Chave de busca para a tabela de regras contábeis: maiúsculas, sem acentos,
/// espaços comprimidos. A pontuação é preservada ("TAXA DE ADESAO / INSCRICAO").
pub(crate) fn normalize_category(text: &str) -> String {
    strip_accents(text)
        .to_uppercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

use crate::text::normalize_key;
use crate::types::{COL_CLASSE, COL_EMISSAO, COL_HISTORICO, COL_PAGTO, COL_VALOR, COL_VENCTO};

// Muitas grafias para um nome canônico; as chaves já estão normalizadas
// (minúsculas, sem acento, pontuação comprimida).
const COLUMN_SYNONYMS: &[(&str, &str)] = &[
    ("codigo interno", "Codigo Interno"),
    ("emissao", COL_EMISSAO),
    ("vencto", COL_VENCTO),
    ("pagto", COL_PAGTO),
    ("doc", "Doc."),
    ("historico", COL_HISTORICO),
    ("valor", COL_VALOR),
    ("classe", COL_CLASSE),
    ("parc", "Parc."),
    ("orcamento", "Orçamento."),
    ("fat ant", "Fat. Ant."),
    ("gerar rps", "Gerar RPS"),
    ("nome plano", "Nome Plano"),
    ("adm benef", "ADM.Benef."),
    ("valor ppcng", "Valor PPCNG"),
    ("vo tid", "VO TID"),
    ("vindi tid", "VINDI TID"),
    ("forma de pagamento", "Forma de Pagamento"),
    ("id banco", "ID Banco"),
    ("n banco", "NºBanco"),
    ("no banco", "NºBanco"),
    ("nobanco", "NºBanco"),
    ("nome banco", "Nome Banco"),
    ("id conta corrente", "ID Conta Corrente"),
    ("cpf", "CPF"),
    ("fone1", "Fone1"),
    ("fone2", "Fone2"),
    ("fone3", "Fone3"),
    ("fone4", "Fone4"),
    ("celular", "Celular"),
    ("razao social", "Razão Social"),
];

/// Colunas candidatas a identificar o banco, em ordem de preferência.
pub const BANK_COLUMN_CANDIDATES: &[&str] =
    &["Nome Banco", "NºBanco", "ID Banco", "ID Conta Corrente"];

fn lookup_synonym(key: &str) -> Option<&'static str> {
    COLUMN_SYNONYMS
        .iter()
        .find(|(synonym, _)| *synonym == key)
        .map(|(_, canonical)| *canonical)
}

/// Canonicaliza os cabeçalhos crus. Colunas sem sinônimo passam apenas
/// aparadas; uma segunda coluna de histórico vira "Histórico"; colisões
/// recebem sufixo numérico para que nenhuma coluna seja sobrescrita.
/// A operação é idempotente.
pub fn canonicalize_headers(raw: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(raw.len());
    for column in raw {
        let key = normalize_key(column);
        let mut target = lookup_synonym(&key)
            .map(str::to_string)
            .unwrap_or_else(|| column.trim().to_string());

        // segunda coluna de histórico do relatório (memo x histórico do paciente)
        if target == COL_HISTORICO && out.iter().any(|existing| existing == COL_HISTORICO) {
            target = "Histórico".to_string();
        }

        if out.contains(&target) {
            let base = target.clone();
            let mut suffix = 2;
            while out.contains(&format!("{base}_{suffix}")) {
                suffix += 1;
            }
            target = format!("{base}_{suffix}");
        }
        out.push(target);
    }
    out
}

/// Escolhe a coluna de banco mais adequada entre as disponíveis.
pub fn detect_bank_column(columns: &[String]) -> Option<&'static str> {
    BANK_COLUMN_CANDIDATES
        .iter()
        .find(|candidate| columns.iter().any(|column| column == *candidate))
        .copied()
}

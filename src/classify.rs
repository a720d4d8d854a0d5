use serde::{Deserialize, Serialize};

use crate::aggregate::GroupTotals;
use crate::export::{format_amount, format_date};
use crate::parsers::ledger::LedgerDate;
use crate::text::normalize_category;
use crate::types::{COL_CLASSE, COL_EMISSAO, COL_PAGTO, COL_VENCTO, FieldValue, LedgerEntry};

/// Contas e código de histórico de uma classe de lançamento.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountRule {
    pub debit: &'static str,
    pub credit: &'static str,
    pub history: &'static str,
}

// Plano de contas por classe, chaveado pela categoria normalizada
// (maiúsculas, sem acento, espaços comprimidos). Configuração imutável,
// carregada uma vez e segura para compartilhar entre threads.
const ACCOUNT_RULES: &[(&str, AccountRule)] = &[
    (
        "ATO COMPLEMENTAR PF",
        AccountRule {
            debit: "11102001",
            credit: "31101002",
            history: "114",
        },
    ),
    (
        "DESCONTO ADMINISTRATIVO",
        AccountRule {
            debit: "41102003",
            credit: "11102001",
            history: "205",
        },
    ),
    (
        "JUROS E MULTA DE MORA",
        AccountRule {
            debit: "11102001",
            credit: "32101001",
            history: "121",
        },
    ),
    (
        "MENSALIDADE INDIVIDUAL",
        AccountRule {
            debit: "11102001",
            credit: "31101001",
            history: "101",
        },
    ),
    (
        "MENSALIDADE PJ - FAMILIAR",
        AccountRule {
            debit: "11102001",
            credit: "31101003",
            history: "102",
        },
    ),
    (
        "REEMBOLSO ATO COMPLEMENTAR",
        AccountRule {
            debit: "31101002",
            credit: "11102001",
            history: "118",
        },
    ),
    (
        "TAXA DE ADESAO / INSCRICAO",
        AccountRule {
            debit: "11102001",
            credit: "31102001",
            history: "109",
        },
    ),
];

// Colunas candidatas à data do lançamento agrupado, em ordem de prioridade.
const POSTING_DATE_PRIORITY: &[&str] = &[COL_PAGTO, COL_VENCTO, COL_EMISSAO];

/// Uma linha de lançamento contábil pronta para exportação. Campos mapeados
/// em branco sinalizam "revisão manual", nunca um erro.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountingPosting {
    pub debit: String,
    pub credit: String,
    pub history: String,
    pub date: String,
    pub amount: String,
    pub complement: String,
}

/// Busca a regra contábil da categoria, tolerando variações de acento e caixa.
pub fn lookup_rule(category: &str) -> Option<&'static AccountRule> {
    let key = normalize_category(category);
    ACCOUNT_RULES
        .iter()
        .find(|(rule_key, _)| key == *rule_key)
        .map(|(_, rule)| rule)
}

/// Gera o lançamento de um registro individual. A data vem exclusivamente do
/// pagamento do próprio registro: sem pagamento, a data sai em branco.
pub fn classify_entry(entry: &LedgerEntry) -> AccountingPosting {
    let rule = lookup_rule(&entry.category);
    AccountingPosting {
        debit: rule.map(|r| r.debit.to_string()).unwrap_or_default(),
        credit: rule.map(|r| r.credit.to_string()).unwrap_or_default(),
        history: rule.map(|r| r.history.to_string()).unwrap_or_default(),
        date: entry.payment_date.map(format_date).unwrap_or_default(),
        amount: format_amount(entry.amount.abs()),
        complement: entry.history.clone(),
    }
}

/// Gera um lançamento por grupo do agrupamento. Grupos cuja classe contém
/// "PJ" são suprimidos: esses valores seguem por um caminho de conciliação
/// próprio e não podem ser lançados duas vezes.
pub fn classify_groups(totals: &GroupTotals) -> Vec<AccountingPosting> {
    let category_position = totals.by.iter().position(|column| column == COL_CLASSE);

    let mut postings = Vec::new();
    for row in &totals.rows {
        let category = category_position
            .and_then(|i| match &row.key[i] {
                FieldValue::Text(text) => Some(text.clone()),
                _ => None,
            })
            .unwrap_or_default();
        if normalize_category(&category).contains("PJ") {
            continue;
        }

        let rule = lookup_rule(&category);
        let complement = describe_group(row.count, &row.key);
        postings.push(AccountingPosting {
            debit: rule.map(|r| r.debit.to_string()).unwrap_or_default(),
            credit: rule.map(|r| r.credit.to_string()).unwrap_or_default(),
            history: rule.map(|r| r.history.to_string()).unwrap_or_default(),
            date: group_posting_date(&totals.by, &row.key),
            amount: format_amount(row.total.abs()),
            complement,
        });
    }
    postings
}

// Primeira coluna de data presente na chave cujo valor é (ou vira) uma data
// válida; nenhuma qualificando, a data sai em branco.
fn group_posting_date(by: &[String], key: &[FieldValue]) -> String {
    for candidate in POSTING_DATE_PRIORITY {
        let Some(position) = by.iter().position(|column| column == candidate) else {
            continue;
        };
        match &key[position] {
            FieldValue::Date(date) => return format_date(*date),
            FieldValue::Text(text) => {
                if let Some(date) = LedgerDate::from(text.as_str()).parse() {
                    return format_date(date);
                }
            }
            _ => {}
        }
    }
    String::new()
}

fn describe_group(count: usize, key: &[FieldValue]) -> String {
    let label = key
        .iter()
        .map(|value| value.to_string())
        .filter(|value| !value.is_empty())
        .collect::<Vec<_>>()
        .join(" / ");
    format!("{label} ({count} registros)")
}

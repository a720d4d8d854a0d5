use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{BankTransaction, LedgerEntry};

// Chave de pareamento: data do movimento e valor arredondado a 2 casas.
// Não é única: lançamentos recorrentes repetem a mesma chave no mesmo dia.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct MatchKey {
    date: NaiveDate,
    amount: Decimal,
}

/// Um lançamento do razão pareado com uma transação bancária de mesma chave e
/// mesmo rank de ocorrência. A diferença usa os valores sem arredondar, para
/// auditoria de resíduos de centavos.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchPair {
    pub ledger: LedgerEntry,
    pub bank: BankTransaction,
    pub difference: Decimal,
}

/// Partições totais e disjuntas sobre as duas entradas: todo registro aparece
/// em exatamente uma delas.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Reconciliation {
    pub matched: Vec<MatchPair>,
    pub ledger_only: Vec<LedgerEntry>,
    pub bank_only: Vec<BankTransaction>,
}

/// Pareia razão e banco um-para-um por `(chave, rank de ocorrência)`.
///
/// Para uma chave com `m` ocorrências no razão e `n` no banco formam-se
/// exatamente `min(m, n)` pares; o excedente cai na partição "only" do seu
/// lado. Registros com data (ou valor bancário) nulos têm chave indefinida e
/// nunca pareiam.
pub fn reconcile(ledger: &[LedgerEntry], bank: &[BankTransaction]) -> Reconciliation {
    let mut bank_ranks: HashMap<MatchKey, usize> = HashMap::new();
    let mut bank_lookup: HashMap<(MatchKey, usize), usize> = HashMap::new();
    for (index, txn) in bank.iter().enumerate() {
        let Some(key) = bank_key(txn) else { continue };
        let rank = bank_ranks.entry(key.clone()).or_insert(0);
        bank_lookup.insert((key, *rank), index);
        *rank += 1;
    }

    let mut matched: Vec<MatchPair> = Vec::new();
    let mut ledger_only: Vec<LedgerEntry> = Vec::new();
    let mut bank_matched = vec![false; bank.len()];
    let mut ledger_ranks: HashMap<MatchKey, usize> = HashMap::new();

    for entry in ledger {
        let Some(key) = ledger_key(entry) else {
            ledger_only.push(entry.clone());
            continue;
        };
        let slot = ledger_ranks.entry(key.clone()).or_insert(0);
        let rank = *slot;
        *slot += 1;

        match bank_lookup.get(&(key, rank)) {
            Some(&index) => {
                bank_matched[index] = true;
                let txn = &bank[index];
                matched.push(MatchPair {
                    ledger: entry.clone(),
                    bank: txn.clone(),
                    difference: entry.amount - txn.amount.unwrap_or(Decimal::ZERO),
                });
            }
            None => ledger_only.push(entry.clone()),
        }
    }

    let mut bank_only: Vec<BankTransaction> = bank
        .iter()
        .enumerate()
        .filter(|(index, _)| !bank_matched[*index])
        .map(|(_, txn)| txn.clone())
        .collect();

    // ordenação estável por data preserva a ordem de inserção nos empates
    matched.sort_by(|a, b| cmp_dates(&a.ledger.payment_date, &b.ledger.payment_date));
    ledger_only.sort_by(|a, b| cmp_dates(&a.payment_date, &b.payment_date));
    bank_only.sort_by(|a, b| cmp_dates(&a.posted_date, &b.posted_date));

    Reconciliation {
        matched,
        ledger_only,
        bank_only,
    }
}

fn ledger_key(entry: &LedgerEntry) -> Option<MatchKey> {
    entry.payment_date.map(|date| MatchKey {
        date,
        amount: entry.amount.round_dp(2),
    })
}

fn bank_key(txn: &BankTransaction) -> Option<MatchKey> {
    match (txn.posted_date, txn.amount) {
        (Some(date), Some(amount)) => Some(MatchKey {
            date,
            amount: amount.round_dp(2),
        }),
        _ => None,
    }
}

fn cmp_dates(a: &Option<NaiveDate>, b: &Option<NaiveDate>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.cmp(y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::str::FromStr;

    fn entry(payment: Option<&str>, amount: &str, history: &str) -> LedgerEntry {
        LedgerEntry {
            issue_date: None,
            due_date: None,
            payment_date: payment.map(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").unwrap()),
            amount: Decimal::from_str(amount).unwrap(),
            category: "MENSALIDADE INDIVIDUAL".to_string(),
            history: history.to_string(),
            bank_identifier: None,
            extra: BTreeMap::new(),
        }
    }

    fn txn(posted: Option<&str>, amount: Option<&str>, id: &str) -> BankTransaction {
        BankTransaction {
            posted_date: posted.map(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").unwrap()),
            amount: amount.map(|a| Decimal::from_str(a).unwrap()),
            kind: None,
            external_id: Some(id.to_string()),
            document: None,
            memo: None,
            payer_name: None,
            source_file: "extrato.ofx".to_string(),
        }
    }

    #[test]
    fn test_duplicate_keys_pair_min_m_n() {
        // 3 ocorrências no razão, 1 no banco: exatamente 1 par e 2 sobras
        let ledger = vec![
            entry(Some("2024-03-01"), "150.00", "a"),
            entry(Some("2024-03-01"), "150.00", "b"),
            entry(Some("2024-03-01"), "150.00", "c"),
        ];
        let bank = vec![txn(Some("2024-03-01"), Some("150.00"), "B1")];

        let result = reconcile(&ledger, &bank);
        assert_eq!(result.matched.len(), 1);
        assert_eq!(result.ledger_only.len(), 2);
        assert!(result.bank_only.is_empty());
        // o rank 0 do razão pareia com o rank 0 do banco
        assert_eq!(result.matched[0].ledger.history, "a");
    }

    #[test]
    fn test_end_to_end_scenario() {
        let ledger = vec![
            entry(Some("2024-03-01"), "150.00", "a"),
            entry(Some("2024-03-01"), "150.00", "b"),
        ];
        let bank = vec![txn(Some("2024-03-01"), Some("150.00"), "B1")];

        let result = reconcile(&ledger, &bank);
        assert_eq!(result.matched.len(), 1);
        assert_eq!(result.matched[0].difference, Decimal::ZERO);
        assert_eq!(result.ledger_only.len(), 1);
        assert_eq!(result.ledger_only[0].history, "b");
    }

    #[test]
    fn test_no_cross_multiplication() {
        // 2 x 2 na mesma chave: pares em ordem, nunca 4 combinações
        let ledger = vec![
            entry(Some("2024-03-01"), "150.00", "a"),
            entry(Some("2024-03-01"), "150.00", "b"),
        ];
        let bank = vec![
            txn(Some("2024-03-01"), Some("150.00"), "B1"),
            txn(Some("2024-03-01"), Some("150.00"), "B2"),
        ];

        let result = reconcile(&ledger, &bank);
        assert_eq!(result.matched.len(), 2);
        assert!(result.ledger_only.is_empty());
        assert!(result.bank_only.is_empty());
        assert_eq!(result.matched[0].bank.external_id.as_deref(), Some("B1"));
        assert_eq!(result.matched[1].bank.external_id.as_deref(), Some("B2"));
    }

    #[test]
    fn test_partition_totality() {
        let ledger = vec![
            entry(Some("2024-03-01"), "150.00", "a"),
            entry(None, "150.00", "sem data"),
            entry(Some("2024-03-02"), "80.00", "b"),
        ];
        let bank = vec![
            txn(Some("2024-03-01"), Some("150.00"), "B1"),
            txn(Some("2024-03-09"), Some("99.00"), "B2"),
            txn(Some("2024-03-10"), None, "B3"),
        ];

        let result = reconcile(&ledger, &bank);
        assert_eq!(result.matched.len() + result.ledger_only.len(), ledger.len());
        assert_eq!(result.matched.len() + result.bank_only.len(), bank.len());
    }

    #[test]
    fn test_null_keys_go_to_only_partitions() {
        let ledger = vec![entry(None, "150.00", "sem data")];
        let bank = vec![txn(Some("2024-03-10"), None, "B1")];

        let result = reconcile(&ledger, &bank);
        assert!(result.matched.is_empty());
        assert_eq!(result.ledger_only.len(), 1);
        assert_eq!(result.bank_only.len(), 1);
    }

    #[test]
    fn test_rounding_to_two_decimals_pairs() {
        let ledger = vec![entry(Some("2024-03-01"), "150.004", "a")];
        let bank = vec![txn(Some("2024-03-01"), Some("150.00"), "B1")];

        let result = reconcile(&ledger, &bank);
        assert_eq!(result.matched.len(), 1);
        // resíduo sub-centavo fica visível na diferença
        assert_eq!(
            result.matched[0].difference,
            Decimal::from_str("0.004").unwrap()
        );
    }

    #[test]
    fn test_output_sorted_by_date_nulls_last() {
        let ledger = vec![
            entry(Some("2024-03-09"), "1.00", "tarde"),
            entry(None, "3.00", "sem data"),
            entry(Some("2024-03-01"), "2.00", "cedo"),
        ];
        let result = reconcile(&ledger, &[]);
        let order: Vec<&str> = result
            .ledger_only
            .iter()
            .map(|e| e.history.as_str())
            .collect();
        assert_eq!(order, vec!["cedo", "tarde", "sem data"]);
    }

    #[test]
    fn test_amounts_must_match_exactly_after_rounding() {
        let ledger = vec![entry(Some("2024-03-01"), "150.01", "a")];
        let bank = vec![txn(Some("2024-03-01"), Some("150.00"), "B1")];

        let result = reconcile(&ledger, &bank);
        assert!(result.matched.is_empty());
        assert_eq!(result.ledger_only.len(), 1);
        assert_eq!(result.bank_only.len(), 1);
    }
}

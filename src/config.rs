use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::LedgerEntry;

/// Configuração imutável de uma sessão, passada explicitamente pelas chamadas
/// (nada de estado ambiente mutável): faixa de datas de pagamento, banco
/// selecionado e colunas de agrupamento.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Faixa inclusiva aplicada sobre a data de pagamento.
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    /// Mantém lançamentos sem data de pagamento ao filtrar por faixa.
    pub include_undated: bool,
    /// Filtra pelo identificador de banco do lançamento.
    pub bank: Option<String>,
    /// Colunas padrão de agrupamento para os relatórios.
    pub group_by: Vec<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            date_range: None,
            include_undated: true,
            bank: None,
            group_by: Vec::new(),
        }
    }
}

impl SessionConfig {
    /// Aplica os filtros sem mutar a entrada.
    pub fn filter_entries(&self, entries: &[LedgerEntry]) -> Vec<LedgerEntry> {
        entries
            .iter()
            .filter(|entry| self.accepts(entry))
            .cloned()
            .collect()
    }

    fn accepts(&self, entry: &LedgerEntry) -> bool {
        if let Some((start, end)) = self.date_range {
            match entry.payment_date {
                Some(date) => {
                    if date < start || date > end {
                        return false;
                    }
                }
                None => {
                    if !self.include_undated {
                        return false;
                    }
                }
            }
        }
        if let Some(bank) = &self.bank {
            if entry.bank_identifier.as_deref() != Some(bank.as_str()) {
                return false;
            }
        }
        true
    }
}

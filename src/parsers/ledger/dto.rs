/// Tabela crua lida do upload: cabeçalho mais linhas, tudo já aparado.
/// Nenhum parse de tipo acontece aqui.
#[derive(Debug, Default)]
pub(super) struct RawTable {
    pub(super) headers: Vec<String>,
    pub(super) rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Monta a tabela ajustando cada linha ao tamanho do cabeçalho.
    pub(super) fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.truncate(width);
                row.resize(width, String::new());
                row
            })
            .collect();
        Self { headers, rows }
    }

    /// Remove colunas e linhas completamente vazias.
    pub(super) fn drop_empty(&mut self) {
        let keep: Vec<bool> = (0..self.headers.len())
            .map(|col| {
                !self.headers[col].is_empty() || self.rows.iter().any(|row| !row[col].is_empty())
            })
            .collect();
        if keep.iter().any(|k| !k) {
            self.headers = filter_by(&keep, std::mem::take(&mut self.headers));
            self.rows = std::mem::take(&mut self.rows)
                .into_iter()
                .map(|row| filter_by(&keep, row))
                .collect();
        }
        self.rows.retain(|row| row.iter().any(|cell| !cell.is_empty()));
    }

    /// Remove as linhas de controle (primeiro campo iniciando com '*'),
    /// devolvendo quantas foram descartadas. Deve rodar antes de qualquer
    /// parse de datas ou valores.
    pub(super) fn drop_control_rows(&mut self) -> usize {
        let before = self.rows.len();
        self.rows
            .retain(|row| !row.first().is_some_and(|cell| cell.starts_with('*')));
        before - self.rows.len()
    }
}

fn filter_by(keep: &[bool], values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .zip(keep)
        .filter_map(|(value, &k)| k.then_some(value))
        .collect()
}

use thiserror::Error;

/// Erros possíveis durante o processamento de uma sessão de conciliação
#[derive(Error, Debug)]
pub enum ReconcileError {
    /// Nenhuma codificação candidata conseguiu decodificar o arquivo
    #[error("Decode failed: no candidate encoding could decode the file")]
    DecodeFailed,

    /// O CSV do razão não pôde ser lido (sem separador ou sem colunas)
    #[error("Ledger read failed: {0}")]
    LedgerReadFailed(String),

    /// Agrupamento solicitado sem nenhuma coluna válida
    #[error("Invalid grouping: none of the requested columns exist ({0})")]
    InvalidGrouping(String),

    /// Formato do arquivo não é suportado pela biblioteca
    #[error("Unsupported file format")]
    UnsupportedFormat,

    /// Erro ao ler o conteúdo do arquivo do disco
    #[error("Failed to read file content: {0}")]
    ReadContentFailed(#[from] std::io::Error),

    /// O builder foi chamado sem fornecer conteúdo nem caminho de arquivo
    #[error("Content or filepath is required")]
    MissingContentAndFilepath,

    /// Falha ao serializar a saída em texto separado por ';'
    #[error("Export failed: {0}")]
    ExportFailed(String),
}

/// Alias conveniente para Result com nosso tipo de erro principal
pub type ReconcileResult<T> = Result<T, ReconcileError>;

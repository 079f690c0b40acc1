use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("アクセストークンが見つかりません。GOOGLE_ACCESS_TOKEN を設定するか token.json を配置してください ({0})")]
    MissingCredentials(String),

    #[error("シートに必須列がありません: {0}")]
    MissingColumn(String),

    #[error("データソースに接続できません: {0}")]
    SourceUnavailable(String),

    #[error("レポート対象の行がありません: {0}")]
    NoRowsFound(String),

    #[error("画像読み込みエラー: {0}")]
    ImageLoad(String),

    #[error("PDF生成エラー: {0}")]
    PdfGeneration(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] store_report_common::Error),
}

impl From<reqwest::Error> for ReportError {
    fn from(e: reqwest::Error) -> Self {
        ReportError::SourceUnavailable(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;

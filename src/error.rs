use thiserror::Error;

#[derive(Error, Debug)]
pub enum AltTextError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("APIキーが設定されていません。`wp-alt-text config --set-api-key YOUR_KEY` で設定するか OPENAI_API_KEY を指定してください")]
    MissingApiKey,

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("シートが見つかりません: {0}")]
    SheetNotFound(String),

    #[error("必須列がありません: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("処理対象の画像がありません")]
    EmptySelection,

    #[error("行範囲が不正です: {0}")]
    InvalidRange(String),

    #[error("Excel読み込みエラー: {0}")]
    WorkbookRead(String),

    #[error("Excel生成エラー: {0}")]
    WorkbookWrite(String),

    #[error("エクスポートファイルが不正: {0}")]
    InvalidExport(String),

    #[error("API呼び出しエラー: {0}")]
    ApiCall(String),

    #[error("APIレスポンスのパースに失敗: {0}")]
    ApiParse(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] alt_text_common::Error),

    #[error("CLI実行エラー: {0}")]
    CliExecution(String),
}

pub type Result<T> = std::result::Result<T, AltTextError>;

/// 方式ごとの生成失敗
#[derive(Error, Debug)]
pub enum GenerationError {
    /// 2ステップ: 画像説明の取得に失敗
    #[error("Step 1 error: {0}")]
    StepOneFailure(String),

    /// 2ステップ: alt生成に失敗（取得済みの説明文は保持）
    #[error("Step 2 error: {message}")]
    StepTwoFailure { message: String, description: String },

    /// 1ステップ方式の失敗
    #[error("{0}")]
    GenerationFailure(String),
}

impl GenerationError {
    /// 失敗時にも残す画像説明
    pub fn description(&self) -> &str {
        match self {
            GenerationError::StepTwoFailure { description, .. } => description,
            _ => "",
        }
    }
}

/// 行単位の処理失敗（バッチ外へは伝播させない）
#[derive(Error, Debug)]
pub enum RowProcessingFailure {
    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("画像URLが空です（{0}行目）")]
    MissingImageUrl(usize),
}

impl RowProcessingFailure {
    pub fn description(&self) -> &str {
        match self {
            RowProcessingFailure::Generation(e) => e.description(),
            RowProcessingFailure::MissingImageUrl(_) => "",
        }
    }
}

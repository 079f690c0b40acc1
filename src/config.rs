use crate::cli::{Cli, PdfQuality};
use crate::error::{ReportError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use store_report_common::{parse_sheet_date, DuplicatePolicy};

pub const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4";
pub const DRIVE_API_BASE: &str = "https://www.googleapis.com/drive/v3";

/// シートの形式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SheetLayout {
    /// 1行1項目（`item` / `image` 列）
    #[default]
    Long,
    /// Googleフォームの回答（1行1店舗、写真列ごとに1項目）
    Form,
}

impl std::str::FromStr for SheetLayout {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "long" => Ok(SheetLayout::Long),
            "form" => Ok(SheetLayout::Form),
            _ => Err(format!("Unknown sheet layout: {}. Use long or form", s)),
        }
    }
}

/// シートの列名（ヘッダー、大文字小文字無視）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnConfig {
    pub store: String,
    pub date: String,
    /// long形式のみ
    pub item: String,
    /// long形式のみ
    pub image: String,
    /// form形式: 見出しにこの語と "photo" を含む列を全体写真とする
    pub overall_marker: String,
    /// form形式: 見出しにこの語句を含む列を商品写真とする
    pub photo_marker: String,
    /// 各ブロックの情報欄に出す列
    pub text: Vec<String>,
    /// ヘッダーに出す列（グループ先頭行の値）
    pub header: Vec<String>,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            store: "Store Name".into(),
            date: "Date".into(),
            item: "Item".into(),
            image: "Photo".into(),
            overall_marker: "overall".into(),
            photo_marker: "take a clear photo".into(),
            text: vec!["Remarks".into()],
            header: vec!["Name".into(), "Phone Number".into()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub spreadsheet_id: String,
    pub sheet_name: String,
    /// 省略時は `'<sheet_name>'!A1:ZZ`
    pub sheet_range: Option<String>,
    pub layout: SheetLayout,
    pub drive_folder_id: Option<String>,
    pub output_dir: PathBuf,
    pub placeholder_image: Option<PathBuf>,
    pub token_file: PathBuf,
    pub report_date: Option<NaiveDate>,
    pub columns: ColumnConfig,
    pub items_per_page: u8,
    pub pdf_quality: PdfQuality,
    pub duplicate_items: DuplicatePolicy,
    pub timeout_seconds: u64,
    pub sheets_api_base: String,
    pub drive_api_base: String,
    /// 指定時は標準エラーと同じログをファイルにも追記
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            spreadsheet_id: String::new(),
            sheet_name: "Form Responses 1".into(),
            sheet_range: None,
            layout: SheetLayout::Long,
            drive_folder_id: None,
            output_dir: PathBuf::from("output"),
            placeholder_image: None,
            token_file: PathBuf::from("token.json"),
            report_date: None,
            columns: ColumnConfig::default(),
            items_per_page: 3,
            pdf_quality: PdfQuality::Medium,
            duplicate_items: DuplicatePolicy::LastWins,
            timeout_seconds: 30,
            sheets_api_base: SHEETS_API_BASE.into(),
            drive_api_base: DRIVE_API_BASE.into(),
            log_file: None,
        }
    }
}

impl Config {
    /// 設定を読み込み（ファイル → 環境変数の順で上書き）
    ///
    /// `path` を明示した場合はファイルが必須。省略時は既定パスがあれば読む。
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => {
                if !p.exists() {
                    return Err(ReportError::Config(format!(
                        "設定ファイルが見つかりません: {}",
                        p.display()
                    )));
                }
                Self::from_file(p)?
            }
            None => match Self::config_path() {
                Ok(p) if p.exists() => Self::from_file(&p)?,
                _ => Self::default(),
            },
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| ReportError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("store-report").join("config.json"))
    }

    /// 環境変数による上書き
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("SPREADSHEET_ID") {
            self.spreadsheet_id = v;
        }
        if let Some(v) = get("SHEET_NAME") {
            self.sheet_name = v;
        }
        if let Some(v) = get("DRIVE_FOLDER_ID") {
            self.drive_folder_id = Some(v);
        }
        if let Some(v) = get("OUTPUT_DIR") {
            self.output_dir = PathBuf::from(v);
        }
        if let Some(v) = get("PLACEHOLDER_IMAGE") {
            self.placeholder_image = Some(PathBuf::from(v));
        }
        if let Some(v) = get("TOKEN_FILE") {
            self.token_file = PathBuf::from(v);
        }
        if let Some(v) = get("SHEET_LAYOUT") {
            self.layout = v.parse().map_err(ReportError::Config)?;
        }
        if let Some(v) = get("DUPLICATE_ITEMS") {
            self.duplicate_items = v.parse().map_err(ReportError::Config)?;
        }
        if let Some(v) = get("LOG_FILE") {
            self.log_file = Some(PathBuf::from(v));
        }
        if let Some(v) = get("REPORT_DATE") {
            // シートと同じ書式を受け付ける
            self.report_date = Some(parse_sheet_date(&v)?);
        }
        Ok(())
    }

    /// コマンドライン引数による上書き（環境変数より優先）
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(date) = cli.date {
            self.report_date = Some(date);
        }
        if let Some(output) = &cli.output {
            self.output_dir = output.clone();
        }
        if let Some(quality) = cli.pdf_quality {
            self.pdf_quality = quality;
        }
    }

    /// シートの取得範囲
    pub fn range(&self) -> String {
        match &self.sheet_range {
            Some(range) => range.clone(),
            None => format!("'{}'!A1:ZZ", self.sheet_name.replace('\'', "''")),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.spreadsheet_id.trim().is_empty() {
            return Err(ReportError::Config(
                "spreadsheet_id が未設定です（設定ファイルまたは SPREADSHEET_ID）".into(),
            ));
        }
        if !(2..=3).contains(&self.items_per_page) {
            return Err(ReportError::Config(format!(
                "items_per_page は 2 または 3 です: {}",
                self.items_per_page
            )));
        }
        let cols = &self.columns;
        let layout_column = match self.layout {
            SheetLayout::Long => ("item", &cols.item),
            SheetLayout::Form => ("photo_marker", &cols.photo_marker),
        };
        for (name, value) in [("store", &cols.store), ("date", &cols.date), layout_column] {
            if value.trim().is_empty() {
                return Err(ReportError::Config(format!("columns.{} が空です", name)));
            }
        }
        Ok(())
    }
}

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 引数なしで1回分のレポート生成を実行する
#[derive(Parser, Debug, Default)]
#[command(name = "store-report")]
#[command(about = "店舗別検査写真レポート生成ツール", long_about = None)]
pub struct Cli {
    /// 設定ファイル（デフォルト: ~/.config/store-report/config.json）
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 対象日（YYYY-MM-DD）。省略時は全日付
    #[arg(short, long)]
    pub date: Option<chrono::NaiveDate>,

    /// 出力ディレクトリ
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// PDF画像品質 (high/medium/low)
    #[arg(long)]
    pub pdf_quality: Option<PdfQuality>,

    /// 詳細ログを出力
    #[arg(short, long)]
    pub verbose: bool,
}

/// PDF画像品質設定
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PdfQuality {
    /// 高品質: 1400px, 85%
    High,
    /// 中品質: 800px, 75%（デフォルト）
    #[default]
    Medium,
    /// 低品質: 500px, 60%
    Low,
}

impl PdfQuality {
    /// 最大ピクセル幅
    pub fn max_width(&self) -> u32 {
        match self {
            PdfQuality::High => 1400,
            PdfQuality::Medium => 800,
            PdfQuality::Low => 500,
        }
    }

    /// JPEG品質 (0-100)
    pub fn jpeg_quality(&self) -> u8 {
        match self {
            PdfQuality::High => 85,
            PdfQuality::Medium => 75,
            PdfQuality::Low => 60,
        }
    }
}

impl std::str::FromStr for PdfQuality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "high" | "h" => Ok(PdfQuality::High),
            "medium" | "med" | "m" => Ok(PdfQuality::Medium),
            "low" | "l" => Ok(PdfQuality::Low),
            _ => Err(format!("Unknown quality: {}. Use high, medium, or low", s)),
        }
    }
}

impl std::fmt::Display for PdfQuality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PdfQuality::High => write!(f, "high"),
            PdfQuality::Medium => write!(f, "medium"),
            PdfQuality::Low => write!(f, "low"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_arguments() {
        let cli = Cli::try_parse_from(["store-report"]).unwrap();
        assert!(cli.config.is_none());
        assert!(cli.date.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn test_overrides() {
        let cli = Cli::try_parse_from([
            "store-report",
            "--date",
            "2024-01-01",
            "--pdf-quality",
            "low",
            "-o",
            "out",
            "-v",
        ])
        .unwrap();
        assert_eq!(cli.date.unwrap().to_string(), "2024-01-01");
        assert_eq!(cli.pdf_quality, Some(PdfQuality::Low));
        assert_eq!(cli.output, Some(PathBuf::from("out")));
        assert!(cli.verbose);
    }

    #[test]
    fn test_bad_date_rejected() {
        assert!(Cli::try_parse_from(["store-report", "--date", "01/01/2024"]).is_err());
    }

    #[test]
    fn test_quality_parse() {
        assert_eq!("H".parse::<PdfQuality>(), Ok(PdfQuality::High));
        assert!("ultra".parse::<PdfQuality>().is_err());
        assert_eq!(PdfQuality::Low.to_string(), "low");
        assert!(PdfQuality::High.max_width() > PdfQuality::Low.max_width());
    }
}

use anyhow::Context;
use clap::Parser;
use std::process::ExitCode;
use std::time::Duration;
use store_report::auth;
use store_report::cli::Cli;
use store_report::config::Config;
use store_report::drive::GoogleDriveSource;
use store_report::logging;
use store_report::pipeline::{self, RunSummary};
use store_report::resolver::Placeholder;
use store_report::sheets::GoogleSheetsSource;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    // ログファイルの設定を読むため、ログ初期化より先に設定を読む（エラーは初期化後に出す）
    let config = load_config(&cli);
    let log_file = config.as_ref().ok().and_then(|c| c.log_file.clone());
    logging::init(cli.verbose, log_file.as_deref());

    match run(config).await {
        Ok(summary) => {
            log::info!(
                "✅ 完了: PDF {}件 / {}行（スキップ {}行, 未アップロード {}件）",
                summary.reports.len(),
                summary.rows,
                summary.skipped_rows,
                summary.missing_images
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("✗ 中断: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = Config::load(cli.config.as_deref()).context("設定の読み込みに失敗")?;
    config.apply_cli(cli);
    config.validate()?;
    Ok(config)
}

async fn run(config: anyhow::Result<Config>) -> anyhow::Result<RunSummary> {
    let config = config?;

    let token = auth::load_access_token(&config.token_file)?;
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .build()
        .context("HTTPクライアントの初期化に失敗")?;

    let sheets = GoogleSheetsSource::new(client.clone(), &config, token.clone());
    let drive = GoogleDriveSource::new(client, &config, token);
    let placeholder = Placeholder::load(config.placeholder_image.as_deref());

    log::info!("📄 store-report: {} → {}", config.range(), config.output_dir.display());
    let summary = pipeline::run(&config, &sheets, &drive, &placeholder).await?;
    Ok(summary)
}

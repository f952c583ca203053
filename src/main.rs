use anyhow::Context;
use camp_report::analyzer::{AnalysisRequest, ImageSource};
use camp_report::cli::{Cli, Commands};
use camp_report::config::Config;
use camp_report::error::ReportError;
use camp_report::scanner::{self, CompressOptions};
use camp_report::server::{self, AppState};
use camp_report::service::{run_analysis_until_saved, AnalysisResponse};
use camp_report::store::{self, StoreError, SyncStatus};
use camp_report_common::{
    encode_report, estimated_clicks, is_high_quality, metric_summaries, percentile, AnalysisReport,
    LeadAction, SiteMeta, SiteTags, Trend,
};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeMap;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;
    let config = Config::load()?;

    match cli.command {
        Commands::Serve { bind } => {
            let bind = bind.unwrap_or_else(|| config.bind_addr.clone());
            let state = AppState::from_config(&config)?;
            server::serve(state, &bind).await?;
        }

        Commands::Analyze { folder, name, address, leisure, facility, activity, output, no_save } => {
            println!("🏕  camp-report - 写真診断\n");

            // 1. 画像スキャン
            println!("[1/3] 写真をスキャン中...");
            let images = scanner::scan_folder(&folder)?;
            if images.is_empty() {
                return Err(ReportError::NoImages.into());
            }
            println!("✔ {}枚の写真を検出\n", images.len());

            // 2. 圧縮（1枚ずつ）
            println!("[2/3] 画像を圧縮中...");
            let paths: Vec<_> = images.iter().map(|i| i.path.clone()).collect();
            let options = CompressOptions {
                max_dimension: config.max_image_size,
                quality: config.jpeg_quality,
            };
            let bar = ProgressBar::new(paths.len() as u64);
            bar.set_style(
                ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );
            let prepared = scanner::prepare_images(&paths, options, |done, _| bar.set_position(done as u64));
            bar.finish_and_clear();
            let prepared = prepared?;
            println!("✔ 圧縮完了\n");

            // 3. AI診断
            println!("[3/3] AI診断中...");
            let state = AppState::from_config(&config)?;
            let request = AnalysisRequest {
                site: SiteMeta {
                    camping_name: name,
                    address,
                    tags: SiteTags { leisure, facility, activity },
                },
                images: prepared.into_iter().map(ImageSource::Inline).collect(),
            };
            let response = if no_save {
                let report = state.analyzer.analyze(&request).await?;
                AnalysisResponse::new(report, &SyncStatus::Skipped)
            } else {
                run_analysis_until_saved(
                    &state.analyzer,
                    state.store.clone(),
                    state.notifier.clone(),
                    state.persist_wait,
                    &request,
                )
                .await?
            };
            println!("✔ 診断完了\n");

            print_report(&response.report);
            print_sync(&response);

            if let Some(output) = output {
                let json = serde_json::to_string_pretty(&response)?;
                std::fs::write(&output, json)?;
                println!("✔ 結果を保存: {}", output.display());
            }
        }

        Commands::Report { record_id } => {
            let state = AppState::from_config(&config)?;
            let record_store = state.store.ok_or(ReportError::Store(StoreError::NotConfigured))?;
            let report = store::load_report(record_store.as_ref(), &record_id).await?;
            print_report(&report);
        }

        Commands::Lead { record_id, action } => {
            let action = match action {
                Some(action) => action,
                None => select_action()?,
            };
            let state = AppState::from_config(&config)?;
            let record_store = state.store.ok_or(ReportError::Store(StoreError::NotConfigured))?;
            let flags = BTreeMap::from([(action.field_name().to_string(), true)]);
            store::update_fields(record_store.as_ref(), &record_id, &flags).await?;
            println!("✔ {} を記録しました ({})", action, record_id);
        }

        Commands::Share { input } => {
            let content = std::fs::read_to_string(&input)
                .with_context(|| format!("{} を読み込めません", input.display()))?;
            let report: AnalysisReport = serde_json::from_str(&content)?;
            println!("{}", encode_report(&report)?);
        }

        Commands::Config { set_api_key, show } => {
            let mut config = config;

            if let Some(key) = set_api_key {
                config.set_api_key(key)?;
                println!("✔ APIキーを設定しました");
            }

            if show {
                let set = |v: bool| if v { "設定済み" } else { "未設定" };
                println!("設定:");
                println!("  モデル: {}", config.models.join(" → "));
                println!("  最大画像サイズ: {}px", config.max_image_size);
                println!("  JPEG品質: {}", config.jpeg_quality);
                println!("  Gemini APIキー: {}", set(config.has_model_key()));
                println!("  Airtable: {}", set(config.has_store()));
                println!("  Resend: {}", set(config.resend_api_key.is_some()));
                println!("  Cloudinary: {}", set(config.cloudinary_cloud_name.is_some()));
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) -> anyhow::Result<()> {
    let level = if verbose { "debug" } else { "info" };

    let filter = tracing_subscriber::EnvFilter::try_from_env("CAMP_REPORT_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}

fn select_action() -> anyhow::Result<LeadAction> {
    let labels: Vec<&str> = LeadAction::ALL.iter().map(|a| a.field_name()).collect();
    let index = dialoguer::Select::new()
        .with_prompt("記録するアクション")
        .items(&labels)
        .default(0)
        .interact()?;
    Ok(LeadAction::ALL[index])
}

fn print_report(report: &AnalysisReport) {
    if report.mock {
        println!("⚠ APIキー未設定のため例示レポートです\n");
    }
    println!("{} ({})", report.camping_name, report.address);
    let badge = if is_high_quality(report) { " ★" } else { "" };
    println!("総合スコア: {}{}", report.total_score, badge);
    println!(
        "クリック予想: 100人中{}人 / 上位{}%",
        estimated_clicks(report.total_score),
        percentile(report.total_score)
    );
    for metric in metric_summaries(report) {
        let mark = match metric.trend {
            Trend::Up => "▲",
            Trend::Down => "▼",
        };
        println!("  {} {:<6} {:>3}  {}", mark, metric.label, metric.score, metric.comment);
    }
    if !report.ranking.is_empty() {
        println!("\nベストフォト:");
        for entry in &report.ranking {
            println!("  {}. {} [{:?}] {}", entry.rank, entry.filename, entry.category, entry.reason);
        }
    }
    if !report.one_line_intro.is_empty() {
        println!("\n{}", report.one_line_intro);
    }
    if !report.marketing_comment.is_empty() {
        println!("{}", report.marketing_comment);
    }
}

fn print_sync(response: &AnalysisResponse) {
    match (&response.record_id, response.sync_failed) {
        (Some(id), _) => println!("\n✔ レコード保存: {}", id),
        (None, true) => println!("\n⚠ レコード保存に失敗しました（結果は上記の通り）"),
        (None, false) => println!("\n保存状態: {}", response.sync_status),
    }
}

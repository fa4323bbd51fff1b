use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wp_alt_text::{cli, config, error, extractor, generator, runner, session, workbook};
use cli::{Cli, Commands, Confirmation, GenerateArgs};
use config::Config;
use error::{AltTextError, Result};
use std::io::IsTerminal;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "wp_alt_text=info" } else { "wp_alt_text=warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::load()?;

    match cli.command {
        Commands::Extract { input, output, base_url, exclude_types } => {
            println!("📄 wp-alt-text - 画像抽出\n");

            // 1. 読み込み
            println!("[1/3] エクスポートを読み込み中...");
            let items = extractor::load_wp_posts(&input)?;
            println!("✔ {}件のコンテンツを読み込み\n", items.len());

            let (types, statuses) = extractor::count_by_type_and_status(&items);
            for (post_type, count) in &types {
                info!("post_type {}: {}", post_type, count);
            }
            for (status, count) in &statuses {
                info!("post_status {}: {}", status, count);
            }

            // 2. 画像抽出
            println!("[2/3] 画像を抽出中...");
            let mut options = extractor::ExtractOptions {
                base_url: base_url.unwrap_or_default(),
                ..Default::default()
            };
            if !exclude_types.is_empty() {
                options.excluded_types = exclude_types;
            }
            let result = extractor::find_all_images(&items, &options);

            let stats = &result.stats;
            println!("  全コンテンツ: {}", stats.total_posts);
            println!("  非公開で除外: {}", stats.filtered_by_status);
            println!("  投稿タイプで除外: {}", stats.filtered_by_type);
            println!("  本文なし: {}", stats.empty_content);
            println!("  処理: {}（画像あり {}）", stats.processed, stats.with_images);
            println!("✔ {}枚の画像を検出（alt未設定 {}）\n", result.images.len(), result.without_alt());

            if result.images.is_empty() {
                println!("画像が見つからなかったため出力しません");
                return Ok(());
            }

            // 3. 保存
            println!("[3/3] Excelを保存中...");
            workbook::write_extraction_workbook(&result, &output)?;
            println!("✔ 保存: {}", output.display());

            println!("\n✅ 抽出完了");
        }

        Commands::Generate(args) => {
            run_generate(args, &config).await?;
        }

        Commands::Config { set_api_key, show } => {
            let mut config = config;

            if let Some(key) = set_api_key {
                config.set_api_key(key)?;
                println!("✔ APIキーを設定しました");
            }

            if show {
                println!("設定: {}", Config::config_path()?.display());
                println!("  APIベースURL: {}", config.api_base_url);
                println!("  説明モデル: {}", config.description_model);
                println!("  altモデル: {}", config.alt_text_model);
                println!("  temperature: {}", config.temperature);
                println!("  タイムアウト: {}秒", config.timeout_seconds);
                println!("  待機秒数: {}", config.default_delay_seconds);
                println!("  コンテキスト上限: {}文字", config.max_context_chars);
                println!(
                    "  APIキー: {}",
                    if config.get_api_key().is_ok() { "設定済み" } else { "未設定" }
                );
            }
        }
    }

    Ok(())
}

async fn run_generate(args: GenerateArgs, config: &Config) -> Result<()> {
    let run = if args.is_headless() {
        args.to_run_config(config.default_delay_seconds)?
    } else {
        match session::build_run_config(&args, config)? {
            Some(run) => run,
            None => {
                println!("中止しました");
                return Ok(());
            }
        }
    };

    // 前提条件（ファイル・シート・列・対象行・APIキー）はリクエスト前に確認
    let prepared = runner::prepare(&run)?;
    let client = generator::OpenAiClient::from_config(config)?;
    let alt_generator = run.generator(client, config);

    if args.is_headless() {
        let estimate = prepared.estimate(run.approach);
        println!(
            "方式: {} / 対象: {}件 / リクエスト約{}回 / 概算${:.2}",
            run.approach.label(),
            estimate.images,
            estimate.requests,
            estimate.cost_usd
        );

        match args.confirmation(std::io::stdin().is_terminal()) {
            Confirmation::Skip => {}
            Confirmation::Prompt => {
                if !session::confirm_run()? {
                    println!("中止しました");
                    return Ok(());
                }
            }
            Confirmation::Refuse => {
                return Err(AltTextError::CliExecution(
                    "確認できないため実行しません（--yes を指定してください）".into(),
                ));
            }
        }
    }

    let cancel = runner::CancelToken::new();
    let watcher = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\n⚠ 中断します（処理中の行の完了後に保存します）");
            watcher.cancel();
        }
    });

    println!("\n[1/2] alt生成中...");
    let progress = runner::progress_bar(prepared.rows.len());
    let outcome = runner::execute(&run, prepared, &alt_generator, &cancel, &progress).await?;

    let report = &outcome.report;
    let summary = &outcome.summary;
    println!(
        "✔ {}件を処理（成功 {} / 装飾 {} / エラー {} / スキップ {}）\n",
        report.attempted, report.succeeded, report.decorative, report.failed, report.skipped
    );

    println!("[2/2] 結果");
    println!("  方式: {}", summary.approach.label());
    println!("  処理時間: {:.1}秒", summary.elapsed.as_secs_f64());
    println!("  画像数: {}", summary.total_rows);
    println!("  alt生成済み: {}", summary.counts.success);
    println!("  装飾画像: {}", summary.counts.decorative);
    println!("  エラー: {}", summary.counts.error);
    println!("  利用可能なalt合計: {}", summary.usable());
    if summary.quality_warnings > 0 {
        println!("  品質警告: {}（125文字超過または禁止語）", summary.quality_warnings);
    }

    if !outcome.examples.is_empty() {
        println!("\n📝 生成例");
        for example in &outcome.examples {
            println!("  {} / {}", example.identity, example.image_url);
            println!("    alt: {}", example.alt_text);
        }
    }

    if summary.cancelled {
        println!("\n⚠ 中断されました。未処理の行は次回「未処理のみ」で再開できます");
    }
    println!("\n✔ 保存: {}", outcome.output_path.display());
    println!("\n✅ 生成完了");
    Ok(())
}

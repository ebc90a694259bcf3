use anyhow::Context;
use clap::Parser;
use shade_match::{cli, config, recommender, report};
use shade_match_common::catalog;
use shade_match_common::{Catalog, Recommendation};
use cli::{Cli, Commands, LabelKind};
use config::Config;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load()?;

    match cli.command {
        Commands::Manual { tone, undertone, skin_type, color, max_results, json } => {
            let catalog = open_catalog(&config, cli.catalog.as_deref(), json)?;
            let query = recommender::manual_query(
                &tone,
                &undertone,
                &skin_type,
                color.as_deref(),
                &config.aliases,
            );
            let recommendation = recommender::recommend_manual(
                &catalog,
                &query,
                &config.recommend_options(max_results),
            );
            print_recommendation(&recommendation, json)?;
        }

        Commands::Photo { response, max_results, json } => {
            let catalog = open_catalog(&config, cli.catalog.as_deref(), json)?;
            let text = read_response(&response)?;
            let recommendation = recommender::recommend_from_response(
                &catalog,
                &text,
                &config.aliases,
                &config.recommend_options(max_results),
            )?;
            print_recommendation(&recommendation, json)?;
        }

        Commands::Normalize { kind, label } => {
            let (canonical, recognized) = match kind {
                LabelKind::Tone => {
                    let tone = config.aliases.normalize_tone(&label);
                    (tone.to_string(), tone.is_recognized())
                }
                LabelKind::Undertone => {
                    let undertone = config.aliases.normalize_undertone(&label);
                    (undertone.to_string(), undertone.is_recognized())
                }
            };
            let note = if recognized { "" } else { "（未登録: 既定値で照合されます）" };
            println!("{} → {}{}", label, canonical, note);
        }

        Commands::Catalog { dropped } => {
            let path = config.resolve_catalog(cli.catalog.as_deref())?;
            let catalog = recommender::load_catalog(&path)?;
            println!("カタログ: {}", path.display());
            print!("{}", report::render_load_report(catalog.report(), dropped));
            println!("  ブランド数: {}", catalog.brands().len());
        }

        Commands::Config { set_catalog, set_max_results, show } => {
            let mut config = config;

            if let Some(path) = set_catalog {
                config.set_catalog(path)?;
                println!("✔ カタログを設定しました");
            }

            if let Some(n) = set_max_results {
                config.set_max_results(n)?;
                println!("✔ 推薦件数を設定しました");
            }

            if show {
                println!("設定:");
                println!(
                    "  カタログ: {}",
                    config
                        .catalog_path
                        .as_ref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| "未設定".into())
                );
                println!("  推薦件数: {}", config.max_results);
                println!("  コンシーラー補正: +{}", config.concealer_lift);
                println!(
                    "  別名: トーン{}件 / アンダートーン{}件",
                    config.aliases.tone.len(),
                    config.aliases.undertone.len()
                );
            }
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// カタログを読み込み、プロセス全体のカタログとして登録
fn open_catalog(config: &Config, cli_override: Option<&Path>, quiet: bool) -> anyhow::Result<Arc<Catalog>> {
    let path = config.resolve_catalog(cli_override)?;
    let loaded = recommender::load_catalog(&path)?;
    let shared = catalog::init_global(loaded)?;
    let snapshot = shared.snapshot();

    if !quiet {
        println!(
            "✔ カタログ読み込み: {}件（スキップ {}件）\n",
            snapshot.len(),
            snapshot.report().dropped.len()
        );
    }
    Ok(snapshot)
}

fn read_response(path: &Path) -> anyhow::Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("標準入力の読み込みに失敗")?;
        Ok(text)
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("返答ファイルを読み込めません: {}", path.display()))
    }
}

fn print_recommendation(recommendation: &Recommendation, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(recommendation)?);
    } else {
        print!("{}", report::render_recommendation(recommendation));
    }
    Ok(())
}

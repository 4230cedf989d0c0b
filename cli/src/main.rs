mod cli;

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bankqueue_core::{Driver, Simulation, SimulationConfig};
use clap::Parser;
use env_logger::Builder;
use log::info;
use rand::SeedableRng;
use rand::rngs::StdRng;

/// 単一窓口 (M/M/1) の銀行待ち行列シミュレーター
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// シミュレーション設定 (JSON)。省略時は config/simulation.json を探します
    #[arg(long)]
    config: Option<PathBuf>,

    /// 乱数シード (再現用)
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    Builder::from_default_env().format_timestamp(None).init();
    let args = Args::parse();

    let config = load_config(args.config.as_deref())?;
    let rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let simulation =
        Simulation::with_rng(config, rng).context("シミュレーションの初期化に失敗しました")?;
    let mut driver = Driver::new(simulation);

    cli::run(&mut driver)
}

fn load_config(explicit: Option<&Path>) -> Result<SimulationConfig> {
    let config_path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match resolve_config_path()? {
            Some(path) => path,
            None => {
                info!("no config/simulation.json found, starting with defaults");
                return Ok(SimulationConfig::default());
            }
        },
    };

    let file = File::open(&config_path)
        .with_context(|| format!("設定ファイルを開けません: {}", config_path.display()))?;
    let reader = BufReader::new(file);
    let config: SimulationConfig = serde_json::from_reader(reader).with_context(|| {
        format!(
            "設定ファイルの解析に失敗しました: {}",
            config_path.display()
        )
    })?;
    config.validate().with_context(|| {
        format!("設定ファイルの値が不正です: {}", config_path.display())
    })?;
    info!("loaded config from {}", config_path.display());
    Ok(config)
}

fn resolve_config_path() -> Result<Option<PathBuf>> {
    let cwd = std::env::current_dir().context("カレントディレクトリの取得に失敗しました")?;
    let candidates = [
        cwd.join("config").join("simulation.json"),
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("config")
            .join("simulation.json"),
    ];

    Ok(candidates.into_iter().find(|path| path.exists()))
}

mod commands;

use std::io::{self, BufRead, Write};

use anyhow::{Context as _, Result, anyhow, bail};
use bankqueue_core::{
    Driver, EventPolicy, PRACTICAL_RATE_RANGE, RateKind, SPEED_PRESETS, ServerStatus,
    SimulationConfig, Snapshot, theory,
};
use log::warn;

use commands::{CommandRegistry, Context};

const HISTORY_BAR_WIDTH: usize = 40;

pub fn run(driver: &mut Driver) -> Result<()> {
    print_intro(driver.simulation().config());
    let registry = CommandRegistry::default();
    let stdin = io::stdin();

    loop {
        print!("t={:.0}s> ", driver.simulation().clock());
        io::stdout()
            .flush()
            .context("プロンプトのフラッシュに失敗しました")?;

        let mut line = String::new();
        let bytes = stdin
            .lock()
            .read_line(&mut line)
            .context("入力の読み込みに失敗しました")?;

        if bytes == 0 {
            println!("入力が終了したためシミュレーターを終了します。");
            return Ok(());
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let mut ctx = Context::new(driver);
        if let Err(error) = registry.execute_input(&mut ctx, trimmed) {
            println!("エラー: {error}");
        }
    }
}

fn print_intro(config: &SimulationConfig) {
    println!("銀行窓口シミュレーター (単一窓口 M/M/1) へようこそ。");
    println!(
        "到着率 λ={:.1} 人/分, サービス率 μ={:.1} 人/分, 速度 x{}",
        config.arrival_rate_per_min, config.service_rate_per_min, config.speed_multiplier
    );
    println!("コマンド例: run 30 / watch 10 / arrival 8 / speed 5 / status / theory");
    println!("help で利用可能なコマンド一覧を表示します。");
}

pub(crate) fn print_help() {
    println!("利用可能なコマンド:");
    println!("  status                現在の状態と統計を表示");
    println!("  run <秒> [fps]        実時間 <秒> 分を一気に進める (既定 60fps)");
    println!("  watch <秒>            実時間で進行を表示");
    println!("  arrival <人/分>       到着率 λ を変更 (次の到着から反映)");
    println!("  service <人/分>       サービス率 μ を変更 (次の受付から反映)");
    println!("  speed <倍率>          シミュレーション速度 (例: 1, 5, 20)");
    println!("  policy <single|catch-up>  1ティックあたりのイベント処理方式");
    println!("  history               待ち人数の推移 (直近30秒)");
    println!("  theory                M/M/1 理論値を表示");
    println!("  reset                 現在のパラメータで最初からやり直す");
    println!("  quit                  終了");
}

pub(crate) fn print_status(snapshot: &Snapshot) {
    let stats = &snapshot.stats;
    println!("--- 時刻 {}s ---", snapshot.whole_seconds());
    match (&snapshot.status, &snapshot.server) {
        (ServerStatus::Busy, Some(customer)) => println!(
            "窓口: 対応中 #{} (到着 {:.1}s, 残り {:.1}s)",
            customer.id(),
            customer.arrival_time(),
            snapshot
                .next_departure
                .map(|at| (at - snapshot.clock).max(0.0))
                .unwrap_or(0.0)
        ),
        _ => println!("窓口: 空き"),
    }
    let waiting: Vec<String> = snapshot
        .queue
        .iter()
        .map(|customer| format!("#{}", customer.id()))
        .collect();
    println!(
        "待ち行列 ({} 人): {}",
        snapshot.queue_length(),
        if waiting.is_empty() {
            "-".to_string()
        } else {
            waiting.join(" ")
        }
    );
    println!("次の到着予定: {:.1}s", snapshot.next_arrival);
    println!(
        "来店 {} 人 / 処理済み {} 人 / 最大待ち {} 人",
        snapshot.customers_created, stats.total_served, stats.peak_queue_length
    );
    println!(
        "平均待ち時間 {:.2}s / 平均滞在時間 {:.2}s / 稼働率 {:.1}%",
        stats.average_wait,
        stats.average_sojourn,
        stats.utilization * 100.0
    );
    println!(
        "処理スループット {:.2} 人/分 / 平均待ち人数 {:.2} 人",
        stats.throughput_per_min, stats.average_queue_length
    );
}

pub(crate) fn print_status_line(snapshot: &Snapshot) -> Result<()> {
    print!(
        "\rt={:>6.1}s 窓口:{} 待ち:{:>3} 処理済み:{:>4} 稼働率:{:>5.1}%   ",
        snapshot.clock,
        match snapshot.status {
            ServerStatus::Busy => "対応中",
            ServerStatus::Idle => "空き  ",
        },
        snapshot.queue_length(),
        snapshot.stats.total_served,
        snapshot.stats.utilization * 100.0
    );
    io::stdout()
        .flush()
        .context("状況表示のフラッシュに失敗しました")
}

pub(crate) fn print_history(snapshot: &Snapshot) {
    if snapshot.history.is_empty() {
        println!("まだ履歴がありません。run で時間を進めてください。");
        return;
    }
    let peak = snapshot
        .history
        .iter()
        .map(|sample| sample.queue_length)
        .max()
        .unwrap_or(0)
        .max(1);
    println!("待ち人数の推移:");
    for sample in &snapshot.history {
        let bar = "#".repeat(sample.queue_length * HISTORY_BAR_WIDTH / peak);
        println!(
            "{:>6}s | {:<width$} {}",
            sample.second,
            bar,
            sample.queue_length,
            width = HISTORY_BAR_WIDTH
        );
    }
}

pub(crate) fn print_theory(config: &SimulationConfig) -> Result<()> {
    let projection = theory::project(config.arrival_rate_per_min, config.service_rate_per_min)?;
    println!("交通強度 ρ = {:.2}", projection.traffic_intensity);
    match projection.steady_state {
        Some(steady) => {
            println!("システムは安定しています。");
            println!("  平均系内人数 L  = {:.2} 人", steady.expected_in_system);
            println!("  平均待ち人数 Lq = {:.2} 人", steady.expected_in_queue);
            println!("  平均滞在時間 W  = {:.2} 秒", steady.expected_sojourn);
            println!("  平均待ち時間 Wq = {:.2} 秒", steady.expected_wait);
            println!("  窓口が空いている確率 P0 = {:.1}%", steady.idle_probability * 100.0);
        }
        None => println!("⚠ ρ ≥ 1 のため待ち行列は増え続けます (不安定)。"),
    }
    Ok(())
}

fn rate_label(kind: RateKind) -> &'static str {
    match kind {
        RateKind::Arrival => "到着率",
        RateKind::Service => "サービス率",
    }
}

pub(crate) fn parse_rate(token: &str, kind: RateKind) -> Result<f64> {
    let rate: f64 = token
        .parse()
        .map_err(|_| anyhow!("{}は数値 (人/分) で指定してください: {token}", rate_label(kind)))?;
    if rate.is_finite() && rate > 0.0 && !PRACTICAL_RATE_RANGE.contains(&rate) {
        warn!(
            "{kind} rate {rate} is outside the usual {}-{} per minute range",
            PRACTICAL_RATE_RANGE.start(),
            PRACTICAL_RATE_RANGE.end()
        );
    }
    Ok(rate)
}

pub(crate) fn parse_speed(token: &str) -> Result<f64> {
    let trimmed = token.trim_end_matches(['x', 'X']);
    let speed: f64 = trimmed
        .parse()
        .map_err(|_| anyhow!("速度は数値で指定してください (例: 5 または 5x): {token}"))?;
    if !SPEED_PRESETS.contains(&speed) {
        warn!("speed x{speed} is not one of the presets {SPEED_PRESETS:?}");
    }
    Ok(speed)
}

pub(crate) fn parse_seconds(token: &str) -> Result<f64> {
    let seconds: f64 = token
        .parse()
        .map_err(|_| anyhow!("秒数は数値で指定してください: {token}"))?;
    if !seconds.is_finite() || seconds <= 0.0 {
        bail!("秒数は正の値で指定してください: {token}");
    }
    Ok(seconds)
}

pub(crate) fn parse_policy(token: &str) -> Result<EventPolicy> {
    EventPolicy::from_key(token)
        .ok_or_else(|| anyhow!("未知の処理方式です: {token} (single または catch-up)"))
}

use std::collections::HashMap;
use std::process;
use std::str::SplitWhitespace;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Result, anyhow, bail};
use bankqueue_core::{ConfigUpdate, Driver, RateKind};

use super::{
    parse_policy, parse_rate, parse_seconds, parse_speed, print_help, print_history,
    print_status, print_status_line, print_theory,
};

const DEFAULT_FPS: f64 = 60.0;
const MAX_FPS: f64 = 240.0;
const WATCH_REFRESH: Duration = Duration::from_millis(100);

pub struct Context<'a> {
    driver: &'a mut Driver,
}

impl<'a> Context<'a> {
    pub fn new(driver: &'a mut Driver) -> Self {
        Self { driver }
    }

    pub fn driver(&self) -> &Driver {
        &*self.driver
    }

    pub fn driver_mut(&mut self) -> &mut Driver {
        &mut *self.driver
    }
}

/// Remaining whitespace-separated tokens after the command word.
pub struct Args<'a> {
    tokens: SplitWhitespace<'a>,
}

impl<'a> Args<'a> {
    pub fn next(&mut self) -> Option<&'a str> {
        self.tokens.next()
    }

    pub fn next_required(&mut self, message: &str) -> Result<&'a str> {
        self.next().ok_or_else(|| anyhow!(message.to_owned()))
    }
}

pub trait Command {
    fn name() -> &'static str;

    fn aliases() -> &'static [&'static str] {
        &[]
    }

    fn execute(ctx: &mut Context<'_>, args: Args<'_>) -> Result<()>;
}

type CommandFn = for<'a> fn(&mut Context<'a>, Args<'a>) -> Result<()>;

pub struct CommandRegistry {
    handlers: HashMap<&'static str, CommandFn>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    pub fn register<C: Command>(&mut self) {
        for name in std::iter::once(C::name()).chain(C::aliases().iter().copied()) {
            if self.handlers.insert(name, C::execute).is_some() {
                panic!("重複したコマンド登録です: {name}");
            }
        }
    }

    pub fn dispatch<'a>(&self, command: &str, ctx: &mut Context<'a>, args: Args<'a>) -> Result<()> {
        if let Some(handler) = self.handlers.get(command) {
            handler(ctx, args)
        } else {
            bail!("未対応のコマンドです: {command}. help で一覧を確認してください。");
        }
    }

    pub fn execute_input<'a>(&self, ctx: &mut Context<'a>, input: &'a str) -> Result<()> {
        let mut parts = input.split_whitespace();
        let Some(head) = parts.next() else {
            return Err(anyhow!("コマンドが指定されていません。"));
        };
        let command_name = head.to_ascii_lowercase();
        self.dispatch(command_name.as_str(), ctx, Args { tokens: parts })
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        let mut registry = Self::new();
        registry.register::<HelpCommand>();
        registry.register::<StatusCommand>();
        registry.register::<RunCommand>();
        registry.register::<WatchCommand>();
        registry.register::<ArrivalCommand>();
        registry.register::<ServiceCommand>();
        registry.register::<SpeedCommand>();
        registry.register::<PolicyCommand>();
        registry.register::<HistoryCommand>();
        registry.register::<TheoryCommand>();
        registry.register::<ResetCommand>();
        registry.register::<QuitCommand>();
        registry
    }
}

pub struct HelpCommand;

impl Command for HelpCommand {
    fn name() -> &'static str {
        "help"
    }

    fn aliases() -> &'static [&'static str] {
        &["?"]
    }

    fn execute(_ctx: &mut Context<'_>, _args: Args<'_>) -> Result<()> {
        print_help();
        Ok(())
    }
}

pub struct StatusCommand;

impl Command for StatusCommand {
    fn name() -> &'static str {
        "status"
    }

    fn aliases() -> &'static [&'static str] {
        &["st"]
    }

    fn execute(ctx: &mut Context<'_>, _args: Args<'_>) -> Result<()> {
        print_status(&ctx.driver().snapshot());
        Ok(())
    }
}

/// Replays `<seconds>` of wall time as evenly spaced frames without sleeping.
pub struct RunCommand;

impl Command for RunCommand {
    fn name() -> &'static str {
        "run"
    }

    fn execute(ctx: &mut Context<'_>, mut args: Args<'_>) -> Result<()> {
        let seconds = parse_seconds(args.next_required("進める実時間 (秒) を指定してください。")?)?;
        let fps = match args.next() {
            Some(token) => token
                .parse::<f64>()
                .ok()
                .filter(|fps| *fps >= 1.0 && *fps <= MAX_FPS)
                .ok_or_else(|| anyhow!("fps は 1〜{MAX_FPS} の数値で指定してください: {token}"))?,
            None => DEFAULT_FPS,
        };

        let frames = (seconds * fps).ceil() as u64;
        let frame_seconds = seconds / frames as f64;
        let mut arrivals = 0;
        let mut departures = 0;
        for _ in 0..frames {
            let outcome = ctx.driver_mut().step(frame_seconds)?;
            arrivals += outcome.arrivals;
            departures += outcome.departed.len();
        }

        println!(
            "実時間 {seconds:.1}s (x{}) を {frames} フレームで進めました: 到着 {arrivals} 人 / 退出 {departures} 人",
            ctx.driver().speed()
        );
        print_status(&ctx.driver().snapshot());
        Ok(())
    }
}

pub struct WatchCommand;

impl Command for WatchCommand {
    fn name() -> &'static str {
        "watch"
    }

    fn execute(ctx: &mut Context<'_>, mut args: Args<'_>) -> Result<()> {
        let seconds = parse_seconds(args.next_required("表示する実時間 (秒) を指定してください。")?)?;
        let driver = ctx.driver_mut();
        driver.start();
        let watched = watch_for(driver, seconds);
        driver.pause();
        println!();
        watched
    }
}

fn watch_for(driver: &mut Driver, seconds: f64) -> Result<()> {
    let started = Instant::now();
    loop {
        let elapsed = started.elapsed().as_secs_f64();
        let snapshot = driver.tick(elapsed * 1000.0)?;
        print_status_line(&snapshot)?;
        if elapsed >= seconds {
            return Ok(());
        }
        thread::sleep(WATCH_REFRESH);
    }
}

pub struct ArrivalCommand;

impl Command for ArrivalCommand {
    fn name() -> &'static str {
        "arrival"
    }

    fn execute(ctx: &mut Context<'_>, mut args: Args<'_>) -> Result<()> {
        let token = args.next_required("到着率 (人/分) を指定してください。")?;
        let rate = parse_rate(token, RateKind::Arrival)?;
        ctx.driver_mut()
            .reconfigure(ConfigUpdate::arrival_rate(rate))?;
        println!("到着率を λ={rate:.1} 人/分 に設定しました (次の到着予定は変わりません)。");
        Ok(())
    }
}

pub struct ServiceCommand;

impl Command for ServiceCommand {
    fn name() -> &'static str {
        "service"
    }

    fn execute(ctx: &mut Context<'_>, mut args: Args<'_>) -> Result<()> {
        let token = args.next_required("サービス率 (人/分) を指定してください。")?;
        let rate = parse_rate(token, RateKind::Service)?;
        ctx.driver_mut()
            .reconfigure(ConfigUpdate::service_rate(rate))?;
        println!("サービス率を μ={rate:.1} 人/分 に設定しました (対応中の客には影響しません)。");
        Ok(())
    }
}

pub struct SpeedCommand;

impl Command for SpeedCommand {
    fn name() -> &'static str {
        "speed"
    }

    fn execute(ctx: &mut Context<'_>, mut args: Args<'_>) -> Result<()> {
        let token = args.next_required("新しい速度倍率を指定してください。")?;
        let multiplier = parse_speed(token)?;
        ctx.driver_mut().reconfigure(ConfigUpdate::speed(multiplier))?;
        println!("速度倍率 x{} に設定しました。", ctx.driver().speed());
        Ok(())
    }
}

pub struct PolicyCommand;

impl Command for PolicyCommand {
    fn name() -> &'static str {
        "policy"
    }

    fn execute(ctx: &mut Context<'_>, mut args: Args<'_>) -> Result<()> {
        let token = args.next_required("single または catch-up を指定してください。")?;
        let policy = parse_policy(token)?;
        ctx.driver_mut()
            .reconfigure(ConfigUpdate::event_policy(policy))?;
        println!("イベント処理方式を {} に設定しました。", policy.label());
        Ok(())
    }
}

pub struct HistoryCommand;

impl Command for HistoryCommand {
    fn name() -> &'static str {
        "history"
    }

    fn execute(ctx: &mut Context<'_>, _args: Args<'_>) -> Result<()> {
        print_history(&ctx.driver().snapshot());
        Ok(())
    }
}

pub struct TheoryCommand;

impl Command for TheoryCommand {
    fn name() -> &'static str {
        "theory"
    }

    fn execute(ctx: &mut Context<'_>, _args: Args<'_>) -> Result<()> {
        print_theory(ctx.driver().simulation().config())
    }
}

pub struct ResetCommand;

impl Command for ResetCommand {
    fn name() -> &'static str {
        "reset"
    }

    fn execute(ctx: &mut Context<'_>, _args: Args<'_>) -> Result<()> {
        ctx.driver_mut().reset()?;
        println!("シミュレーションを初期状態に戻しました。");
        Ok(())
    }
}

pub struct QuitCommand;

impl Command for QuitCommand {
    fn name() -> &'static str {
        "quit"
    }

    fn aliases() -> &'static [&'static str] {
        &["exit"]
    }

    fn execute(_ctx: &mut Context<'_>, _args: Args<'_>) -> Result<()> {
        println!("シミュレーターを終了します。");
        process::exit(0);
    }
}

#[cfg(test)]
mod tests {
    use bankqueue_core::{EventPolicy, Simulation, SimulationConfig};

    use super::*;

    fn seeded_driver() -> Driver {
        Driver::new(Simulation::with_seed(SimulationConfig::default(), 21).unwrap())
    }

    #[test]
    fn rate_commands_reconfigure_the_engine() {
        let mut driver = seeded_driver();
        let registry = CommandRegistry::default();
        let pending = driver.simulation().next_arrival();

        let mut ctx = Context::new(&mut driver);
        registry.execute_input(&mut ctx, "arrival 9").unwrap();
        registry.execute_input(&mut ctx, "SERVICE 11.5").unwrap();
        registry.execute_input(&mut ctx, "speed 5x").unwrap();
        registry.execute_input(&mut ctx, "policy catch-up").unwrap();

        let config = driver.simulation().config();
        assert_eq!(config.arrival_rate_per_min, 9.0);
        assert_eq!(config.service_rate_per_min, 11.5);
        assert_eq!(config.speed_multiplier, 5.0);
        assert_eq!(config.event_policy, EventPolicy::CatchUp);
        assert_eq!(driver.simulation().next_arrival(), pending);
    }

    #[test]
    fn aliases_reach_the_same_commands() {
        let mut driver = seeded_driver();
        let registry = CommandRegistry::default();

        let mut ctx = Context::new(&mut driver);
        registry.execute_input(&mut ctx, "st").unwrap();
        registry.execute_input(&mut ctx, "?").unwrap();
        registry.execute_input(&mut ctx, "  RUN   2   30  ").unwrap();

        assert!((driver.simulation().clock() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn watch_leaves_the_driver_paused() {
        let mut driver = seeded_driver();
        let registry = CommandRegistry::default();

        let mut ctx = Context::new(&mut driver);
        registry.execute_input(&mut ctx, "watch 0.05").unwrap();

        assert!(!driver.is_running());
        assert!(driver.simulation().clock() > 0.0);
    }

    #[test]
    fn invalid_input_is_rejected_without_changes() {
        let mut driver = seeded_driver();
        let registry = CommandRegistry::default();

        let mut ctx = Context::new(&mut driver);
        assert!(registry.execute_input(&mut ctx, "arrival 0").is_err());
        assert!(registry.execute_input(&mut ctx, "speed -1").is_err());
        assert!(registry.execute_input(&mut ctx, "run").is_err());
        assert!(registry.execute_input(&mut ctx, "run 5 0").is_err());
        assert!(registry.execute_input(&mut ctx, "teleport").is_err());

        assert_eq!(driver.simulation().config(), &SimulationConfig::default());
        assert_eq!(driver.simulation().clock(), 0.0);
    }

    #[test]
    fn run_advances_by_wall_time_times_speed() {
        let mut driver = seeded_driver();
        let registry = CommandRegistry::default();

        let mut ctx = Context::new(&mut driver);
        registry.execute_input(&mut ctx, "speed 20").unwrap();
        registry.execute_input(&mut ctx, "run 3 10").unwrap();

        assert!((driver.simulation().clock() - 60.0).abs() < 1e-9);
        assert!(!driver.is_running());
    }

    #[test]
    fn reset_command_rewinds_the_clock() {
        let mut driver = seeded_driver();
        let registry = CommandRegistry::default();

        let mut ctx = Context::new(&mut driver);
        registry.execute_input(&mut ctx, "run 30").unwrap();
        registry.execute_input(&mut ctx, "reset").unwrap();

        assert_eq!(driver.simulation().clock(), 0.0);
        assert_eq!(driver.snapshot().customers_created, 0);
    }
}

//! YeetCode Companion
//!
//! Drives the duel and ranking engine against in-memory collaborators.
//!
//! # Usage
//!
//! ```bash
//! # Play a scripted duel end to end
//! yeetcode-companion demo
//!
//! # Print a seeded leaderboard with tiers
//! yeetcode-companion standings
//!
//! # Print the tier table
//! yeetcode-companion tiers
//!
//! # Environment overrides
//! YEETCODE__POLLING__MAX_MS=60000 yeetcode-companion demo
//! ```

use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use yeetcode_companion::config::LoggingConfig;
use yeetcode_companion::{Collaborators, CompanionConfig, DevHarness};
use yeetcode_rank::{RankSummary, Tier};

// =============================================================================
// CLI Arguments
// =============================================================================

/// YeetCode Companion - duels, ranks and live leaderboard changes
#[derive(Parser, Debug)]
#[command(name = "yeetcode-companion")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (TOML, JSON, or YAML)
    #[arg(short, long, env = "YEETCODE_CONFIG")]
    config: Option<String>,

    /// Override the configured log level
    #[arg(long, env = "YEETCODE_LOG_LEVEL")]
    log_level: Option<String>,

    /// Emit JSON instead of tables
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Challenge a rival, detect the solve and show the leaderboard update
    Demo,
    /// Show the seeded group leaderboard
    Standings,
    /// Show the XP tier table
    Tiers,
}

// =============================================================================
// Main Entry Point
// =============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut companion_config = CompanionConfig::load(args.config.as_deref())?;
    if let Some(level) = args.log_level {
        companion_config.logging.level = level;
    }
    companion_config.validate()?;

    init_logging(&companion_config.logging)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        user = %companion_config.user.username,
        group = %companion_config.user.group_code,
        "Starting YeetCode companion"
    );

    match args.command {
        Command::Demo => run_demo(&companion_config, args.json).await,
        Command::Standings => print_standings(&companion_config, args.json).await,
        Command::Tiers => {
            print_tiers(args.json)?;
            Ok(())
        }
    }
}

/// Crates logged at the configured level; everything else stays at `warn`
const LOG_TARGETS: [&str; 4] = [
    "yeetcode_companion",
    "yeetcode_duels",
    "yeetcode_watcher",
    "yeetcode_leaderboard",
];

/// Initialize logging.
///
/// Logs go to stderr so `--json` output on stdout stays machine readable.
/// `RUST_LOG` replaces the per-crate directives entirely.
fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => {
            let directives = LOG_TARGETS
                .iter()
                .fold(String::from("warn"), |acc, target| {
                    format!("{},{}={}", acc, target, config.level)
                });
            EnvFilter::try_new(directives)?
        }
    };

    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr);
    let subscriber = tracing_subscriber::registry().with(env_filter);

    if config.format == "json" {
        subscriber.with(fmt_layer.json()).init();
    } else {
        subscriber.with(fmt_layer.pretty()).init();
    }

    Ok(())
}

async fn run_demo(config: &CompanionConfig, json: bool) -> anyhow::Result<()> {
    let harness = DevHarness::new(config, Collaborators::in_memory(Utc::now()))?;
    let report = harness.run_demo().await?;
    harness.shutdown();

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let duel = &report.duel;
    println!();
    println!("Duel {} ({})", duel.problem_title, duel.difficulty);
    println!(
        "  {} {}  vs  {} {}",
        duel.challenger,
        report.user_time.as_deref().unwrap_or("-"),
        duel.challengee,
        report.rival_time.as_deref().unwrap_or("-"),
    );
    if let (Some(winner), Some(xp)) = (&duel.winner, duel.xp_awarded) {
        println!("  Winner: {} (+{} XP)", winner, xp);
    }
    println!("  Challenges received by rival: {}", report.received_by_rival);
    println!("  Completed duels on record: {}", report.recent_duels);

    println!();
    println!("Notifications");
    for notification in &report.notifications {
        println!("  [{}] {}", notification.kind, notification.message);
    }

    println!();
    print_rows(&report.standings);
    Ok(())
}

async fn print_standings(config: &CompanionConfig, json: bool) -> anyhow::Result<()> {
    let harness = DevHarness::new(config, Collaborators::in_memory(Utc::now()))?;
    harness.seed_group()?;
    harness.monitor().refresh(harness.now()).await?;
    let rows = harness.monitor().standings();

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        print_rows(&rows);
    }
    Ok(())
}

fn print_rows(rows: &[yeetcode_leaderboard::StandingRow]) {
    println!("{:>4}  {:<16} {:>7}  {}", "#", "Member", "XP", "Tier");
    for row in rows {
        println!(
            "{:>4}  {:<16} {:>7}  {}",
            row.rank,
            row.name(),
            row.xp,
            row.tier
        );
    }
}

fn print_tiers(json: bool) -> anyhow::Result<()> {
    if json {
        let table: Vec<RankSummary> = Tier::ALL
            .iter()
            .map(|tier| RankSummary::for_xp(tier.min_xp()))
            .collect();
        println!("{}", serde_json::to_string_pretty(&table)?);
        return Ok(());
    }

    println!("{:<22} {:>7} {:>7}", "Tier", "Min XP", "Max XP");
    for tier in Tier::ALL {
        let max = tier
            .max_xp()
            .map(|max| max.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!("{:<22} {:>7} {:>7}", tier.display_name(), tier.min_xp(), max);
    }
    Ok(())
}

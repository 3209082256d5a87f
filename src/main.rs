//! Polymarket Debate Floor
//!
//! CLI entry point: list markets, run the offline toolkit analysis, or run
//! a full multi-agent debate on one market.

use std::sync::Arc;

use chrono::Utc;
use clap::{Parser, Subcommand};
use debate_floor::{
    client::{ClobClient, DataApiClient, GammaClient, MarketData},
    config::{AgentToggles, Config},
    debate::{DebateRunner, DebateState},
    flow::TraderFlowAggregator,
    llm::ChatClient,
    quant::{self, TimeDecay},
    search::TavilyClient,
    types::TraderSnapshot,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "debate-floor")]
#[command(about = "Multi-agent debate engine for Polymarket prediction markets")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Show top markets by volume
    Markets {
        /// Number of markets to show
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },
    /// Run the quantitative toolkit on a market (no LLM calls)
    Analyze {
        /// Market id or slug
        market: String,
    },
    /// Run a full debate on a market
    Debate {
        /// Market id or slug
        market: String,
        /// Agents to leave out (quantitative, time-decay, trader-flow,
        /// news, macro, contrarian); repeatable
        #[arg(long = "skip")]
        skip: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;

    match cli.command {
        Commands::Markets { limit } => show_markets(config, limit).await,
        Commands::Analyze { market } => analyze_market(config, &market).await,
        Commands::Debate { market, skip } => run_debate(config, &market, &skip).await,
    }
}

async fn show_markets(config: Config, limit: usize) -> anyhow::Result<()> {
    let gamma = GammaClient::new(&config.polymarket.gamma_url)?;
    let markets = gamma.top_markets(limit).await?;

    for (i, m) in markets.iter().enumerate() {
        println!(
            "{:2}. [{:5.1}%] {} (7d vol ${:.0})",
            i + 1,
            m.yes_price,
            m.question,
            m.volume_7d
        );
    }
    Ok(())
}

async fn analyze_market(config: Config, market_key: &str) -> anyhow::Result<()> {
    let gamma = GammaClient::new(&config.polymarket.gamma_url)?;
    let clob = ClobClient::new(&config.polymarket.clob_url)?;

    let MarketData {
        snapshot,
        clob_token_ids,
    } = gamma.market(market_key).await?;

    let series = match clob_token_ids.first() {
        Some(token) => clob.history_7d(token).await.unwrap_or_default(),
        None => Vec::new(),
    };

    println!("{} — {:.1}% YES", snapshot.question, snapshot.yes_price);

    let implied = quant::implied_probability(snapshot.yes_price);
    println!(
        "Implied: {:.1}% YES / {:.1}% NO (vig {:.3})",
        implied.implied_yes, implied.implied_no, implied.vig
    );

    let vol = quant::volatility(&series);
    println!("Volatility: std {:.2} — {}", vol.std_dev, vol.regime);

    let mom = quant::momentum(&series);
    println!("Momentum: {} (ROC {:.1}%)", mom.trend, mom.rate_of_change);

    let levels = quant::support_resistance(&series);
    println!("Levels: {}", levels.position);

    match quant::time_decay(snapshot.end_date.as_deref(), snapshot.yes_price, Utc::now()) {
        TimeDecay::Active(p) => println!(
            "Time decay: {:.1} days left, urgency {}, theta {:.2}",
            p.days_remaining,
            p.urgency.as_str(),
            p.theta
        ),
        TimeDecay::Expired => println!("Time decay: market expired"),
        TimeDecay::Unknown { reason } => println!("Time decay: {reason}"),
    }

    Ok(())
}

async fn run_debate(config: Config, market_key: &str, skip: &[String]) -> anyhow::Result<()> {
    let gamma = GammaClient::new(&config.polymarket.gamma_url)?;
    let clob = ClobClient::new(&config.polymarket.clob_url)?;
    let data_api = DataApiClient::new(&config.polymarket.data_api_url)?;

    let MarketData {
        snapshot,
        clob_token_ids,
    } = gamma.market(market_key).await?;

    // Price history is best-effort; the quant agent reports what it gets
    let (prices_24h, prices_7d) = match clob_token_ids.first() {
        Some(token) => {
            let h24 = clob.history_24h(token).await.unwrap_or_else(|e| {
                tracing::warn!("24h history unavailable: {}", e);
                Vec::new()
            });
            let h7d = clob.history_7d(token).await.unwrap_or_else(|e| {
                tracing::warn!("7d history unavailable: {}", e);
                Vec::new()
            });
            (h24, h7d)
        }
        None => (Vec::new(), Vec::new()),
    };
    tracing::info!(
        "Fetched price history: 24h={} points, 7d={} points",
        prices_24h.len(),
        prices_7d.len()
    );

    let traders = gather_traders(&config, &data_api, &snapshot.id, snapshot.slug.as_deref()).await;

    let llm = Arc::new(ChatClient::new(config.llm.clone()));
    let search = Arc::new(TavilyClient::new(config.search.clone()));
    let runner = DebateRunner::new(llm, search);

    let toggles = apply_skips(config.agents, skip)?;

    let mut state = DebateState::new(snapshot, prices_24h, prices_7d, traders);
    runner.run(&toggles, &mut state).await?;

    for contribution in &state.transcript {
        println!("\n═══ {} ═══\n", contribution.author());
        println!("{}", contribution.content);
    }
    println!("\n═══ Verdict ═══\n");
    println!("{}", state.verdict);

    Ok(())
}

/// Holders snapshot when available, raw-trade aggregation as fallback,
/// then global-stats enrichment. Any feed failure degrades to an empty
/// trader list; the trader-flow agent reports the absence.
async fn gather_traders(
    config: &Config,
    data_api: &DataApiClient,
    market_id: &str,
    slug: Option<&str>,
) -> Vec<TraderSnapshot> {
    let aggregator = TraderFlowAggregator::new(config.flow.clone());
    let now = Utc::now();

    let mut snapshots = match data_api.holders(market_id).await {
        Ok(holders) if !holders.is_empty() => aggregator.from_holders(&holders, now),
        Ok(_) => Vec::new(),
        Err(e) => {
            tracing::warn!("Holders lookup failed: {}", e);
            Vec::new()
        }
    };

    if snapshots.is_empty() {
        if let Some(slug) = slug {
            match data_api.trades(slug, 500).await {
                Ok(trades) => {
                    snapshots = aggregator.aggregate_trades(slug, &trades, now);
                }
                Err(e) => tracing::warn!("Trades lookup failed: {}", e),
            }
        }
    }

    aggregator.enrich(snapshots, data_api).await
}

fn apply_skips(mut toggles: AgentToggles, skip: &[String]) -> anyhow::Result<AgentToggles> {
    for name in skip {
        match name.as_str() {
            "quantitative" => toggles.quantitative = false,
            "time-decay" => toggles.time_decay = false,
            "trader-flow" => toggles.trader_flow = false,
            "news" => toggles.news = false,
            "macro" => toggles.macro_analyst = false,
            "contrarian" => toggles.contrarian = false,
            other => anyhow::bail!("unknown agent: {other}"),
        }
    }
    Ok(toggles)
}

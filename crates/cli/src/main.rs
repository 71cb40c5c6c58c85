#![deny(warnings)]

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use tts_console_core::config::{resolve_base_url, AppConfig, Env, StdEnv};

mod repl;

#[derive(Parser, Debug)]
#[command(name = "tts-console")]
#[command(about = "Terminal client for a remote text-to-speech service")]
struct Args {
    /// Base URL of the synthesis/history service
    #[arg(long)]
    base_url: Option<String>,

    /// Voice to preselect, by catalog name
    #[arg(long)]
    voice: Option<String>,

    /// Fetch clips without playing them through an audio device
    #[arg(long, default_value_t = false)]
    no_playback: bool,

    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level)?;

    let env = StdEnv;
    let voice = args.voice.clone();
    let cfg = build_config(args, &env)?;

    tracing::info!(base_url = %cfg.base_url, playback = cfg.playback, "config loaded");

    repl::run(cfg, voice).await
}

fn init_tracing(level: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(
            level
                .parse()
                .with_context(|| format!("invalid --log-level: {level}"))?,
        )
        .from_env_lossy();

    tracing_subscriber::fmt().with_env_filter(filter).init();
    Ok(())
}

fn build_config(args: Args, env: &impl Env) -> anyhow::Result<AppConfig> {
    let base_url = resolve_base_url(args.base_url, env)?;
    Ok(AppConfig {
        base_url,
        playback: !args.no_playback,
    })
}

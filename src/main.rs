//! Rock-Paper-Scissors Companion Demo
//!
//! Runs the phone-side host against a simulated accessory over a loopback
//! link and plays a few rounds with random choices on both sides.

use anyhow::Context;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::info;
use tracing_subscriber::EnvFilter;

use rps_companion::{
    VERSION,
    game::choice::Choice,
    install::sideload::{CommandInstaller, SideloadConfig},
    network::{
        host::CompanionHost,
        loopback::LoopbackAccessory,
        presenter::LogPresenter,
        session::EngineConfig,
        transport::ChannelTransport,
    },
};

/// Rounds played when `RPS_DEMO_ROUNDS` is unset.
const DEFAULT_ROUNDS: u32 = 5;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("RPS Companion v{}", VERSION);

    let config = EngineConfig::from_env();
    let sideload_config = SideloadConfig::from_env();
    let rounds = std::env::var("RPS_DEMO_ROUNDS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_ROUNDS);

    info!("Reveal window: {:?}", config.reveal_duration);
    info!("Rounds: {}", rounds);

    demo_session(config, sideload_config, rounds).await
}

/// Play `rounds` rounds between a random local player and a random accessory.
async fn demo_session(config: EngineConfig, sideload_config: SideloadConfig, rounds: u32) -> anyhow::Result<()> {
    info!("=== Starting Demo Session ===");

    let reveal = config.reveal_duration;
    let (transport, frames) = ChannelTransport::new();
    let installer = CommandInstaller::from_config(&sideload_config);
    let (host, handle) = CompanionHost::new(
        config,
        sideload_config,
        transport,
        LogPresenter::new("phone"),
        installer,
    );
    let host_task = tokio::spawn(host.run());
    let mut accessory = LoopbackAccessory::new(handle.clone(), frames);

    handle.start_session().await?;

    let mut rng = rand::thread_rng();
    for round in 1..=rounds {
        let local = *Choice::PLAYABLE.choose(&mut rng).context("no playable choices")?;
        let remote = *Choice::PLAYABLE.choose(&mut rng).context("no playable choices")?;

        // Either side may move first.
        if rng.gen_bool(0.5) {
            handle.choose(local).await?;
            accessory.select(remote).await?;
        } else {
            accessory.select(remote).await?;
            handle.choose(local).await?;
        }

        let outcome = accessory
            .next_result()
            .await
            .context("accessory link closed before result")?;
        info!(
            "Round {}: accessory threw {:?} and sees {:?} -> {:?}",
            round,
            remote,
            outcome,
            accessory.state().result_text.as_deref().unwrap_or_default()
        );

        tokio::time::sleep(reveal).await;
        accessory.reveal_elapsed();
    }

    // Print final results
    info!("=== Session Results ===");
    let state = handle.snapshot().await?;
    info!("Phone: {} of {} won", state.rounds_won, state.rounds_played);
    info!("Accessory: {} of {} won", accessory.state().wins, accessory.state().games);

    handle.shutdown();
    host_task.await.context("host task panicked")?;
    Ok(())
}

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use fleet_bot::bot::{BotConfig, FleetBot};
use fleet_bot::channels::{ChannelManager, CliChannel, TelegramChannel};
use fleet_bot::config::FleetConfig;
use fleet_bot::dashboard::{DashboardQuery, DashboardState, dashboard_routes};
use fleet_bot::dialog::{RegistrationDialog, SessionStore};
use fleet_bot::store::{LibSqlBackend, VehicleStore, seed_demo_fleet};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = FleetConfig::from_env().context("Invalid configuration")?;

    // Initialize tracing; keep the appender guard alive for the whole run
    let (file_layer, _log_guard) = match &config.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "fleet-bot.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(file_layer)
        .init();

    eprintln!("🚛 Fleet Bot v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Dashboard: http://{}/dashboard", config.http_addr());
    eprintln!("   Web app URL: {}", config.dashboard_url);

    // ── Database (migrations run on open) ────────────────────────────────
    let backend = LibSqlBackend::new_local(&config.db_path)
        .await
        .with_context(|| format!("Failed to open database at {}", config.db_path.display()))?;
    let store: Arc<dyn VehicleStore> = Arc::new(backend);
    eprintln!("   Database: {}", config.db_path.display());

    if config.seed_demo {
        let seeded = seed_demo_fleet(store.as_ref())
            .await
            .context("Failed to seed demo vehicles")?;
        if seeded > 0 {
            eprintln!("   Seeded {seeded} demo vehicles");
        }
    }

    // ── Dashboard server ─────────────────────────────────────────────────
    let app = dashboard_routes(DashboardState {
        query: Arc::new(DashboardQuery::new(Arc::clone(&store))),
    });
    let listener = tokio::net::TcpListener::bind(config.http_addr())
        .await
        .with_context(|| format!("Failed to bind dashboard port {}", config.http_addr()))?;
    tracing::info!(addr = %config.http_addr(), "Dashboard server started");

    let (shutdown_tx, mut shutdown_rx) = tokio::sync::watch::channel(false);
    let server = tokio::spawn(async move {
        let result = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.changed().await;
            })
            .await;
        if let Err(e) = result {
            tracing::error!("Dashboard server error: {e}");
        }
    });

    // ── Channels ─────────────────────────────────────────────────────────
    let mut channels = ChannelManager::new();
    if config.cli_enabled {
        channels.add(Box::new(CliChannel::new()));
        eprintln!("   Console: enabled (type `exit` to stop)");
    }
    if let Some(token) = config.telegram_token.clone() {
        channels.add(Box::new(TelegramChannel::new(token)));
        eprintln!("   Telegram: enabled");
    } else {
        eprintln!("   Telegram: disabled (BOT_TOKEN not set)");
    }
    eprintln!("   Channels: {}\n", channels.names().join(", "));
    let has_channels = !channels.is_empty();

    let failures = channels.health_check_all().await;
    for (name, e) in &failures {
        tracing::warn!(channel = %name, "Health check failed: {e}");
    }

    // ── Bot ──────────────────────────────────────────────────────────────
    let sessions = Arc::new(SessionStore::new(config.dialog_timeout));
    let dialog = Arc::new(RegistrationDialog::new(Arc::clone(&store), sessions));
    let bot = FleetBot::new(
        BotConfig {
            dashboard_url: config.dashboard_url.clone(),
        },
        channels,
        dialog,
    );

    let bot_result = if has_channels {
        bot.run().await
    } else {
        // Dashboard-only mode: run until Ctrl+C.
        tokio::signal::ctrl_c()
            .await
            .context("Failed to listen for Ctrl+C")?;
        Ok(())
    };

    let _ = shutdown_tx.send(true);
    if let Err(e) = server.await {
        tracing::error!("Dashboard server task failed: {e}");
    }
    tracing::info!("Fleet bot stopped");

    bot_result.context("Bot loop failed")
}

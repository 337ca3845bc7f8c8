use std::sync::Arc;

use lead_wizard::config::ServiceConfig;
use lead_wizard::eligibility::EligibilityEngine;
use lead_wizard::identity::AnonymousIdentityProvider;
use lead_wizard::store::{self, LibSqlBackend};
use lead_wizard::wizard::{SessionRegistry, WizardDeps, spawn_prune_task, wizard_routes};

const DEFAULT_LEADS_LIMIT: usize = 20;

#[tokio::main]
async fn main() -> lead_wizard::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = ServiceConfig::from_env();

    // `lead-wizard leads [limit]` prints the newest local leads and exits.
    let mut args = std::env::args().skip(1);
    if args.next().as_deref() == Some("leads") {
        let limit = args
            .next()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_LEADS_LIMIT);
        return print_leads(&config, limit).await;
    }

    eprintln!("Lead Wizard v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   API: http://0.0.0.0:{}/api/sessions", config.port);
    eprintln!("   App ID: {}", config.app_id);
    eprintln!("   Source tag: {}", config.source);

    // ── Lead store ──────────────────────────────────────────────────────
    let lead_store = store::open_store(&config).await?;
    match config.remote_store {
        Some(ref remote) => eprintln!("   Store: remote ({})", remote.base_url),
        None => eprintln!("   Store: {}", config.db_path.display()),
    }

    // ── Sessions ────────────────────────────────────────────────────────
    let deps = WizardDeps {
        identity: Arc::new(AnonymousIdentityProvider::new()),
        store: lead_store,
        engine: Arc::new(EligibilityEngine::standard()),
        app_id: config.app_id.clone(),
        source: config.source.clone(),
    };
    let registry = SessionRegistry::new(deps);
    let _prune_handle = spawn_prune_task(
        Arc::clone(&registry),
        config.prune_interval,
        config.session_idle_timeout,
    );
    eprintln!(
        "   Sessions: idle timeout {}s\n",
        config.session_idle_timeout.as_secs()
    );

    let app = wizard_routes(registry);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
    tracing::info!(port = config.port, "Lead wizard server started");
    axum::serve(listener, app).await?;

    Ok(())
}

/// Dump stored leads as `id<TAB>json` lines, newest first.
async fn print_leads(config: &ServiceConfig, limit: usize) -> lead_wizard::Result<()> {
    let store = LibSqlBackend::new_local(&config.db_path).await?;
    let total = store.count_leads(&config.app_id).await?;
    eprintln!(
        "{total} lead(s) for {} in {}",
        config.app_id,
        config.db_path.display()
    );
    for stored in store.list_leads(&config.app_id, limit).await? {
        println!("{}\t{}", stored.id, serde_json::to_string(&stored.lead)?);
    }
    Ok(())
}

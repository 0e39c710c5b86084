//! Tracing subscriber setup
//!
//! `RUST_LOG` overrides the per-environment defaults below.

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Environment;

/// Default directives when `RUST_LOG` is unset.
///
/// Outbound traffic is one completion call per plan plus one nutrition call
/// per meal, so the HTTP client and connection pool stay quiet outside dev.
/// `sqlx::query` logs every statement at info.
fn default_directives(env: &Environment) -> &'static str {
    match env {
        Environment::Dev => {
            "mealplanner_backend=debug,tower_http=debug,sqlx::query=info,reqwest=debug,hyper_util=info,info"
        }
        Environment::Staging => {
            "mealplanner_backend=debug,tower_http=info,sqlx::query=warn,reqwest=info,hyper_util=warn,info"
        }
        Environment::Prod => {
            "mealplanner_backend=info,tower_http=info,sqlx=warn,reqwest=warn,hyper_util=warn,warn"
        }
    }
}

pub fn init_logging(env: &Environment) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directives(env)))
        .context("Invalid log filter")?;

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_file(env.is_dev())
        .with_line_number(env.is_dev());

    // JSON for log shipping in production
    let installed = if env.is_prod() {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json().flatten_event(true))
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.pretty())
            .try_init()
    };
    installed.context("Failed to install tracing subscriber")?;

    tracing::info!(
        service = env!("CARGO_PKG_NAME"),
        version = env!("CARGO_PKG_VERSION"),
        env = ?env,
        "Logging initialized"
    );

    Ok(())
}

//! `skillstack-sync` -- fetch the learning dashboard state and print a digest.
//!
//! Loads all goals and activities through the sync store and logs the
//! insights the dashboard would render.  Mostly useful as a smoke test
//! against a running backend.
//!
//! # Environment variables
//!
//! | Variable                  | Required | Default                         | Description                  |
//! |---------------------------|----------|---------------------------------|------------------------------|
//! | `SKILLSTACK_API_URL`      | no       | `http://127.0.0.1:8000/mainapp` | Base URL of the REST API     |
//! | `SKILLSTACK_ACCESS_TOKEN` | no       | --                              | Bearer token for the session |

use std::sync::Arc;

use skillstack_sync::api::HttpLearningApi;
use skillstack_sync::config::ApiConfig;
use skillstack_sync::session::{MemoryTokenStore, TokenStore};
use skillstack_sync::store::GoalSyncStore;

use skillstack_core::insights::timeline_groups;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "skillstack_sync=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ApiConfig::from_env();
    tracing::info!(base_url = %config.base_url, "Starting skillstack-sync");

    let tokens: Arc<dyn TokenStore> = match std::env::var("SKILLSTACK_ACCESS_TOKEN") {
        Ok(token) => Arc::new(MemoryTokenStore::with_access_token(token)),
        Err(_) => {
            tracing::warn!("SKILLSTACK_ACCESS_TOKEN is not set, requests will be anonymous");
            Arc::new(MemoryTokenStore::new())
        }
    };

    let api = Arc::new(HttpLearningApi::new(&config, Arc::clone(&tokens)));
    let store = GoalSyncStore::new(api, tokens);

    store.load_all().await;

    let messages = store.messages().await;
    if let Some(message) = &messages.goals {
        tracing::error!(%message, "goals did not load");
    }
    if let Some(message) = &messages.activities {
        tracing::error!(%message, "activities did not load");
    }

    let insights = store.insights().await;
    tracing::info!(
        total = insights.total,
        completed = insights.completed,
        in_progress = insights.in_progress,
        total_hours = insights.total_hours,
        completion_rate = insights.completion_rate,
        "goal insights",
    );

    let activities = store.activities().await;
    for group in timeline_groups(&activities) {
        let hours: f64 = group.items.iter().map(|a| a.hours).sum();
        tracing::info!(date = %group.date, sessions = group.items.len(), hours, "timeline day");
    }

    store.shutdown();
}

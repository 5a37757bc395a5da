// src/main.rs

use dotenvy::dotenv;
use gradestore::config::Config;
use gradestore::{GradeStore, User};
use std::time::Duration;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenv().ok();

    // Load configuration from environment
    let config = Config::from_env();

    let file_appender = tracing_appender::rolling::daily("logs", "gradestore.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    // Initialize Tracing (Logging)
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    // Open the store (applies the schema) with retry
    let mut retry_count = 0;
    let store = loop {
        match GradeStore::open(&config).await {
            Ok(store) => break store,
            Err(e) => {
                retry_count += 1;
                if retry_count > 5 {
                    tracing::error!("Failed to open grade store after 5 retries: {}", e);
                    std::process::exit(1);
                }
                tracing::warn!("Grade store not ready, retrying in 2s... (Attempt {})", retry_count);
                tokio::time::sleep(Duration::from_secs(2)).await;
            }
        }
    };

    tracing::info!("Grade store opened at {}", config.database_url);

    // Seed Admin User
    if let Err(e) = seed_admin_user(&store, &config).await {
        tracing::error!("Failed to seed admin user: {:?}", e);
    }

    match store.load_exercises().await {
        Ok(exercises) => {
            let questions: usize = exercises.iter().map(|ex| ex.questions.len()).sum();
            tracing::info!(
                "Store holds {} exercises with {} questions in total",
                exercises.len(),
                questions
            );
        }
        Err(e) => tracing::error!("Failed to load exercises: {}", e),
    }

    store.close().await;
}

async fn seed_admin_user(store: &GradeStore, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    if let (Some(username), Some(password)) = (&config.admin_username, &config.admin_password) {
        if store.find_user(username).await?.is_none() {
            tracing::info!("Seeding admin user: {}", username);
            let admin = User::new(username.as_str(), "Admin", "");
            store.add_or_update_user(&admin, password).await?;
            tracing::info!("Admin user created successfully.");
        }
    }
    Ok(())
}

use clap::Parser;
use infra_kit::config::read_validated_config;
use infra_kit::utils::error::ErrorCategory;
use infra_kit::{logger, AppConfig, CliConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 載入並驗證配置
    let mut config: AppConfig = match read_validated_config(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", cli.config, e);
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(exit_code(e.category()));
        }
    };

    if cli.verbose {
        config.logger.level = "debug".to_string();
    }

    // 初始化日誌
    logger::init(config.logger.clone())?;

    infra_kit::info!(
        "Configuration loaded",
        path = %cli.config,
        log_level = %config.logger.level(),
        log_file = %config.logger.file_name.display()
    );
    infra_kit::debugf!("MySQL config: {:?}", config.mysql);
    infra_kit::info!("MySQL DSN", dsn = %config.mysql.redacted_dsn());

    if !cli.connect {
        return Ok(());
    }

    let db = match infra_kit::connect(&config.mysql).await {
        Ok(db) => db,
        Err(e) => {
            infra_kit::error!("❌ Database connection failed", error = %e);
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(exit_code(e.category()));
        }
    };

    db.ping().await?;
    infra_kit::info!("✅ Database is reachable", db_name = %config.mysql.db_name);
    db.close().await?;

    Ok(())
}

fn exit_code(category: ErrorCategory) -> i32 {
    match category {
        ErrorCategory::Configuration => 1,
        ErrorCategory::External => 2,
        ErrorCategory::Input => 3,
    }
}

use sea_orm_migration::MigratorTrait;
use tracing::{error, info};

use flowershop_api::{config, db, migrator::Migrator};

/// Applies (`up`, the default), rolls back (`down`) or lists pending (`status`)
/// migrations against the configured database.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = config::load_config()?;
    config::init_tracing(cfg.log_level(), cfg.log_json);

    let command = std::env::args().nth(1).unwrap_or_else(|| "up".to_string());
    info!(command = %command, "Starting database migration");

    let pool = db::establish_connection_from_app_config(&cfg).await?;

    match command.as_str() {
        "up" => db::run_migrations(&pool).await?,
        "down" => {
            Migrator::down(&pool, Some(1)).await?;
            info!("Rolled back the latest migration");
        }
        "status" => {
            let pending = Migrator::get_pending_migrations(&pool).await?;
            if pending.is_empty() {
                info!("All migrations applied");
            }
            for migration in pending {
                info!("Pending migration: {}", migration.name());
            }
        }
        other => {
            error!("Unknown command '{}'; expected up, down or status", other);
            return Err(format!("unknown migration command: {other}").into());
        }
    }

    db::close_pool(pool).await?;
    info!("Migration finished");
    Ok(())
}

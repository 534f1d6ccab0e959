use clap::{Parser, Subcommand};
use uuid::Uuid;

use crate::app::{app, AppState};
use crate::auth::{generate_jwt, Claims};
use crate::config::{self, AppConfig};

#[derive(Parser)]
#[command(name = "habit-api")]
#[command(about = "Habit API - habit tracking REST server")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve {
        #[arg(long, help = "Port to listen on (overrides HABIT_API_PORT)")]
        port: Option<u16>,
        #[arg(long, help = "Address to bind (overrides HABIT_API_BIND)")]
        bind: Option<String>,
    },

    #[command(about = "Issue a bearer token signed with the configured secret")]
    Token {
        #[arg(long, help = "User id placed in the `sub` claim; random when omitted")]
        user: Option<Uuid>,
        #[arg(long, default_value = "cli", help = "Username claim")]
        username: String,
        #[arg(long, help = "Lifetime in hours (overrides SECURITY_JWT_EXPIRY_HOURS)")]
        hours: Option<u64>,
    },
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    // Environment is read once; subcommands work on their own copy
    let config = config::config().clone();

    match cli.command.unwrap_or(Commands::Serve { port: None, bind: None }) {
        Commands::Serve { port, bind } => serve(config, port, bind).await,
        Commands::Token { user, username, hours } => {
            let user = user.unwrap_or_else(Uuid::new_v4);
            let hours = hours.unwrap_or(config.security.jwt_expiry_hours);
            let claims = Claims::new(user, username, hours)?;
            let token = generate_jwt(&claims, &config.security.jwt_secret)?;

            eprintln!("user: {} (expires in {}h)", user, hours);
            println!("{}", token);
            Ok(())
        }
    }
}

async fn serve(mut config: AppConfig, port: Option<u16>, bind: Option<String>) -> anyhow::Result<()> {
    if let Some(port) = port {
        config.server.port = port;
    }
    if let Some(bind) = bind {
        config.server.bind = bind;
    }
    if config.security.jwt_secret.is_empty() {
        anyhow::bail!("SECURITY_JWT_SECRET must be set in {:?} mode", config.environment);
    }

    tracing::info!("Starting Habit API in {:?} mode", config.environment);

    let bind_addr = format!("{}:{}", config.server.bind, config.server.port);
    let state = AppState::from_config(config).await?;

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {}: {}", bind_addr, e))?;

    tracing::info!("Habit API listening on http://{}", bind_addr);

    axum::serve(listener, app(state)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::try_parse_from(["habit-api"]).unwrap();
        assert!(cli.command.is_none());

        let cli = Cli::try_parse_from(["habit-api", "serve", "--port", "8081"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Serve { port: Some(8081), bind: None })));
    }

    #[tokio::test]
    async fn token_with_absurd_lifetime_fails_cleanly() {
        let cli = Cli::try_parse_from(["habit-api", "token", "--hours", "18446744073709551615"]).unwrap();
        let err = run(cli).await.unwrap_err();
        assert!(err.to_string().contains("out of range"), "{}", err);
    }

    #[test]
    fn token_rejects_malformed_user_ids() {
        assert!(Cli::try_parse_from(["habit-api", "token", "--user", "not-a-uuid"]).is_err());
    }
}

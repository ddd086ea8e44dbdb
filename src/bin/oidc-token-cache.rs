use std::fs;
use std::io::Read;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::info;

use oidc_token_cache::adapter::factory::{create_bound_adapter, create_storage_manager};
use oidc_token_cache::cache::scopes::split_scopes;
use oidc_token_cache::cache::token_response::TokenResponse;
use oidc_token_cache::config::loader;
use oidc_token_cache::helpers::time::now_i64;
use oidc_token_cache::request::auth_parameters::AuthParameters;
use oidc_token_cache::request::authority::Authority;
use oidc_token_cache::storage::status::OperationStatus;
use oidc_token_cache::utils::constants::DEFAULT_CONFIG_PATH;
use oidc_token_cache::utils::logging::{self, LogLevel};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: String,
    #[arg(long, env = "LOG_LEVEL", value_enum)]
    log_level: Option<LogLevel>,
    #[command(subcommand)]
    command: Command,
}

/// Request identity shared by the token commands.
#[derive(clap::Args)]
struct RequestArgs {
    /// Home account id of the user.
    #[arg(long, default_value = "")]
    account: String,
    /// Authority URL, e.g. https://login.example.com/contoso.com
    #[arg(long, env = "AUTHORITY")]
    authority: String,
    /// Space separated scopes, order kept.
    #[arg(long, default_value = "")]
    scopes: String,
}

#[derive(Subcommand)]
enum Command {
    /// List cached accounts, optionally for one environment.
    Accounts {
        #[arg(long, default_value = "")]
        environment: String,
    },
    /// Look up a usable token for the request.
    Read(RequestArgs),
    /// Cache a token endpoint response read from stdin.
    Save(RequestArgs),
    /// Drop the refresh token of the request's account.
    DeleteRefreshToken(RequestArgs),
    /// Write the whole cache to a file.
    Export { file: String },
    /// Replace the whole cache with a previously exported file.
    Import { file: String },
}

fn auth_parameters(args: &RequestArgs, client_id: &str) -> Result<AuthParameters> {
    let authority = Authority::parse(&args.authority)?;
    Ok(AuthParameters::new(
        args.account.as_str(),
        authority,
        client_id,
        split_scopes(&args.scopes),
    ))
}

fn main() -> Result<()> {
    // -------------------------------
    // 1. Load YAML config, init logging
    // -------------------------------

    let args = Args::parse();
    let service_config = loader::load_config(&args.config)?;
    logging::run(&service_config, args.log_level);

    let cache_config = &service_config.cache;
    let client_id = cache_config.client_id.as_str();

    // -------------------------------
    // 2. Export / import go straight to storage
    // -------------------------------

    match &args.command {
        Command::Export { file } => {
            let bytes = status_value(create_storage_manager(&cache_config.storage).serialize())?;
            fs::write(file, bytes).with_context(|| format!("writing {}", file))?;
            info!("cache exported to {}", file);
            return Ok(());
        }
        Command::Import { file } => {
            let bytes = fs::read(file).with_context(|| format!("reading {}", file))?;
            status_value(create_storage_manager(&cache_config.storage).deserialize(&bytes))?;
            info!("cache imported from {}", file);
            return Ok(());
        }
        _ => {}
    }

    // -------------------------------
    // 3. Token commands go through the configured adapter
    // -------------------------------

    let adapter = create_bound_adapter(cache_config)?;

    match &args.command {
        Command::Accounts { environment } => {
            let accounts = adapter.get_accounts(environment);
            println!("{}", serde_json::to_string_pretty(&accounts)?);
        }
        Command::Read(request) => {
            let params = auth_parameters(request, client_id)?;
            let Some(result) = adapter.try_read_cache(&params) else {
                bail!("no usable credential found in cache");
            };
            let output = json!({
                "access_token": result.tokens.access_token_secret(),
                "refresh_token": result.tokens.refresh_token_secret(),
                "expires_on": result.tokens.access_token.as_ref().map(|at| at.expires_on),
                "id_token": result.tokens.id_token.as_ref().map(|t| t.raw()),
                "account": result.account,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Command::Save(request) => {
            let params = auth_parameters(request, client_id)?;
            let mut body = String::new();
            std::io::stdin()
                .read_to_string(&mut body)
                .context("reading token response from stdin")?;
            let response = TokenResponse::from_json(&body, now_i64())?;
            match adapter.save_token_response(&params, &response) {
                Some(account) => println!("{}", serde_json::to_string_pretty(&account)?),
                None => info!("token response cached without an account"),
            }
        }
        Command::DeleteRefreshToken(request) => {
            let params = auth_parameters(request, client_id)?;
            adapter.delete_cached_refresh_token(&params);
        }
        Command::Export { .. } | Command::Import { .. } => {}
    }

    Ok(())
}

fn status_value<T>(status: OperationStatus<T>) -> Result<T> {
    match status {
        OperationStatus::Success(value) => Ok(value),
        OperationStatus::Failure(failure) => Err(anyhow!(
            "storage operation failed ({}): {}",
            failure.code,
            failure.description
        )),
    }
}

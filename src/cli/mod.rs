//! CLI module for genesis.
//!
//! - Argument parsing
//! - Version display
//! - Login, logout and whoami against the stored credential
//! - `watch`: a headless dashboard that follows push events and sync
//!
//! # Usage
//!
//! ```ignore
//! use genesis::cli::{parse_args, run_command};
//! use genesis::startup::ClientConfig;
//!
//! let command = parse_args(std::env::args());
//! run_command(command, ClientConfig::from_env()).await?;
//! ```

pub mod args;
pub mod version;

pub use args::{parse_args, CliCommand, USAGE};
pub use version::{version_string, VERSION};

use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use tracing::info;

use crate::app::GenesisClient;
use crate::auth::AuthState;
use crate::error::GenesisError;
use crate::startup::ClientConfig;
use crate::sync::AccountSnapshot;

/// Run a parsed command to completion.
pub async fn run_command(command: CliCommand, config: ClientConfig) -> Result<()> {
    match command {
        CliCommand::Version => {
            println!("{}", version_string());
            Ok(())
        }
        CliCommand::Usage(reason) => Err(eyre!("{}\n{}", reason, USAGE)),
        CliCommand::Login { email } => handle_login(&email, config).await,
        CliCommand::Logout => handle_logout(config).await,
        CliCommand::Whoami => handle_whoami(config).await,
        CliCommand::Watch => handle_watch(config).await,
    }
}

async fn handle_login(email: &str, config: ClientConfig) -> Result<()> {
    let password = tokio::task::spawn_blocking(|| rpassword::prompt_password("Password: "))
        .await
        .wrap_err("password prompt aborted")?
        .wrap_err("failed to read password")?;

    let client = GenesisClient::from_config(config)?;
    let user = client
        .login(email, &password)
        .await
        .map_err(report)?;

    println!("Logged in as {} <{}>", display_name(&user.name, &user.user_id), user.email);
    print_wallets(&client.account());
    Ok(())
}

fn report(err: GenesisError) -> color_eyre::Report {
    eyre!("{} ({})\n{}", err.user_message(), err.error_code(), err.recovery_hint())
}

async fn handle_logout(config: ClientConfig) -> Result<()> {
    let client = GenesisClient::from_config(config)?;
    client.start().await;
    client.logout().await;
    println!("Logged out");
    Ok(())
}

async fn handle_whoami(config: ClientConfig) -> Result<()> {
    let client = GenesisClient::from_config(config)?;
    match client.start().await {
        AuthState::Authenticated => {
            if let Some(session) = client.session() {
                let user = &session.user;
                println!("{} <{}>", display_name(&user.name, &user.user_id), user.email);
                println!("  user id: {}", user.user_id);
                if user.is_admin {
                    println!("  role:    admin");
                }
            }
            print_wallets(&client.account());
            Ok(())
        }
        _ => Err(eyre!("Not logged in. Run `genesis login <email>`.")),
    }
}

async fn handle_watch(config: ClientConfig) -> Result<()> {
    let client = GenesisClient::from_config(config)?;
    if client.start().await != AuthState::Authenticated {
        return Err(eyre!("Not logged in. Run `genesis login <email>`."));
    }

    let mut notifications = client.notifications().subscribe();
    let mut account = client.subscribe_account();
    let mut auth = client.subscribe_auth();
    let mut last_balance = client.account().balance();
    print_wallets(&client.account());
    info!("Watching account, press Ctrl-C to stop");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                println!();
                break;
            }
            changed = notifications.changed() => {
                if changed.is_err() {
                    break;
                }
                if let Some(event) = notifications.borrow_and_update().clone() {
                    println!("[{}] {}", event.severity, event.message);
                }
            }
            changed = account.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = account.borrow_and_update().clone();
                let balance = snapshot.balance();
                if balance != last_balance {
                    if let Some(wallet) = snapshot.active() {
                        println!("Balance: {}{:.2} {}", wallet.currency.symbol(), wallet.balance, wallet.currency);
                    }
                    last_balance = balance;
                }
            }
            changed = auth.changed() => {
                if changed.is_err() {
                    break;
                }
                if *auth.borrow_and_update() == AuthState::Anonymous {
                    return Err(eyre!("Session ended. Run `genesis login <email>` to sign in again."));
                }
            }
        }
    }
    Ok(())
}

fn display_name<'a>(name: &'a str, fallback: &'a str) -> &'a str {
    if name.trim().is_empty() {
        fallback
    } else {
        name
    }
}

fn print_wallets(snapshot: &AccountSnapshot) {
    if snapshot.wallets.is_empty() {
        println!("No wallets");
        return;
    }
    for wallet in &snapshot.wallets {
        let marker = if snapshot.active_wallet.as_deref() == Some(wallet.wallet_id.as_str()) {
            "*"
        } else {
            " "
        };
        println!(
            "{} {}  {}{:.2} {}",
            marker,
            wallet.wallet_id,
            wallet.currency.symbol(),
            wallet.balance,
            wallet.currency
        );
    }
    if snapshot.active().is_some() {
        println!(
            "  sent {:.2}, received {:.2}",
            snapshot.total_sent(),
            snapshot.total_received()
        );
    }
}

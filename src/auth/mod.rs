//! Staff session commands for the CLI
//!
//! `login` authenticates against the gateway, marks the user online and
//! stores the identity in the config file so later one-shot commands can
//! act as that staff member. The TUI keeps its own in-memory session.

use anyhow::{Context, Result};

use crate::api::{Gateway, GatewayClient};
use crate::config::Config;
use crate::models::Presence;

/// Authenticate and persist the session.
pub async fn login(config: &mut Config, username: &str, password: &str) -> Result<()> {
    let username = username.trim();
    if username.is_empty() {
        anyhow::bail!("Username must not be empty");
    }

    let client = GatewayClient::from_config(config)?;
    let mut me = client
        .authenticate(username, password)
        .await
        .context("Sign-in failed")?;
    tracing::info!("Authenticated as {} ({})", me.username, me.role.as_str());

    client
        .update_status(me.id, Presence::Online)
        .await
        .context("Signed in, but could not mark you online")?;
    me.status = Presence::Online;

    println!("Signed in as {} ({}).", me.username, me.role.label());
    config.set_session(me);
    config.save()?;
    Ok(())
}

/// Mark the stored identity offline and forget it.
pub async fn logout(config: &mut Config) -> Result<()> {
    let Some(me) = config.clear_session() else {
        println!("Not signed in.");
        return Ok(());
    };

    let client = GatewayClient::from_config(config)?;
    if let Err(e) = client.update_status(me.id, Presence::Offline).await {
        // The local session is dropped regardless.
        tracing::warn!("Could not mark {} offline: {}", me.username, e);
    }

    config.save()?;
    println!("Signed out {}.", me.username);
    Ok(())
}

/// Show the stored session.
pub async fn status(config: &Config) -> Result<()> {
    match &config.session {
        Some(me) => {
            println!("Signed in: {}", me.username);
            println!("  id:     {}", me.id);
            println!("  role:   {}", me.role.label());
            println!("  status: {} (at sign-in)", me.status.as_str());
        }
        None => println!("Signed in: no"),
    }
    println!("Auth:  {}", config.endpoints.auth);
    println!("Users: {}", config.endpoints.users);
    println!("Chats: {}", config.endpoints.chats);
    Ok(())
}

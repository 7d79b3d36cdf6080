//! Users resource: employee list, employee creation, presence updates

use anyhow::{Context, Result};
use serde::Serialize;

use super::client::{typed_list, GatewayClient};
use super::GatewayError;
use crate::config::Config;
use crate::models::{Identity, NewEmployee, Presence};

#[derive(Debug, Serialize)]
struct StatusUpdate {
    id: i64,
    status: Presence,
}

/// Read every staff account. Missing or malformed `users` yields an empty list.
pub async fn list_users_data(client: &GatewayClient) -> Result<Vec<Identity>, GatewayError> {
    let payload = client.read(&client.endpoints().users, &[]).await?;
    Ok(typed_list(&payload, "users"))
}

/// Create an employee account.
pub async fn create_employee_with_client(
    client: &GatewayClient,
    employee: &NewEmployee,
) -> Result<(), GatewayError> {
    client
        .write(reqwest::Method::POST, &client.endpoints().users, employee)
        .await?;
    Ok(())
}

/// Set a staff member's presence.
pub async fn update_status_with_client(
    client: &GatewayClient,
    user_id: i64,
    status: Presence,
) -> Result<(), GatewayError> {
    let body = StatusUpdate {
        id: user_id,
        status,
    };
    client
        .write(reqwest::Method::PUT, &client.endpoints().users, &body)
        .await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI commands (print to stdout)
// ---------------------------------------------------------------------------

/// List employees (prints to stdout).
pub async fn list_employees(config: &Config) -> Result<()> {
    let client = GatewayClient::from_config(config)?;
    let users = list_users_data(&client).await?;

    println!("\nEmployees:");
    println!("{:-<60}", "");

    if users.is_empty() {
        println!("  (no employees found)");
        return Ok(());
    }

    for user in &users {
        let marker = match user.status {
            Presence::Online => "*",
            Presence::Offline => "o",
        };
        println!(
            "{} {:<20} {:<12} id={}",
            marker,
            user.username,
            user.role.label(),
            user.id
        );
    }
    Ok(())
}

/// Create an employee account.
pub async fn add_employee(config: &Config, employee: NewEmployee) -> Result<()> {
    let client = GatewayClient::from_config(config)?;
    create_employee_with_client(&client, &employee).await?;
    println!("Employee {} added.", employee.username);
    Ok(())
}

/// Show or set presence for `user_id`, defaulting to the stored session.
pub async fn presence(config: &Config, set: Option<Presence>, user_id: Option<i64>) -> Result<()> {
    let user_id = match user_id.or_else(|| config.session.as_ref().map(|s| s.id)) {
        Some(id) => id,
        None => anyhow::bail!("No user given. Pass --id or run 'support-chat login' first."),
    };

    let client = GatewayClient::from_config(config)?;
    if let Some(status) = set {
        tracing::info!("Setting status of user {} to {}...", user_id, status.as_str());
        update_status_with_client(&client, user_id, status).await?;
        println!("Status set to: {}", status.as_str());
        return Ok(());
    }

    let users = list_users_data(&client).await?;
    let user = users
        .iter()
        .find(|u| u.id == user_id)
        .with_context(|| format!("User {} not found", user_id))?;
    println!("\nPresence Status:");
    println!("  User:   {}", user.username);
    println!("  Status: {}", user.status.as_str());
    Ok(())
}

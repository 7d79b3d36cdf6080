//! support-chat - terminal client for a customer-support chat service
//!
//! Clients open chats anonymously; operators answer them; super admins
//! oversee chats and staff. One-shot CLI commands plus a polling TUI.

mod api;
mod auth;
mod config;
mod models;
mod sync;
mod tui;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::models::{NewEmployee, Presence, Resolution, Role};

#[derive(Parser)]
#[command(name = "support-chat")]
#[command(about = "Terminal client for the support chat service", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file to use instead of the platform default
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum ResolutionArg {
    Resolved,
    Unresolved,
}

impl From<ResolutionArg> for Resolution {
    fn from(r: ResolutionArg) -> Self {
        match r {
            ResolutionArg::Resolved => Resolution::Resolved,
            ResolutionArg::Unresolved => Resolution::Unresolved,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum RoleArg {
    Operator,
    #[value(name = "super_admin")]
    SuperAdmin,
}

impl From<RoleArg> for Role {
    fn from(r: RoleArg) -> Self {
        match r {
            RoleArg::Operator => Role::Operator,
            RoleArg::SuperAdmin => Role::SuperAdmin,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum PresenceArg {
    Online,
    Offline,
}

impl From<PresenceArg> for Presence {
    fn from(p: PresenceArg) -> Self {
        match p {
            PresenceArg::Online => Presence::Online,
            PresenceArg::Offline => Presence::Offline,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in as staff and store the session
    Login {
        #[arg(short, long)]
        username: String,

        #[arg(short, long)]
        password: String,
    },

    /// Mark the stored session offline and clear it
    Logout,

    /// Show the stored session
    Status,

    /// List chats
    Chats {
        /// Include closed chats
        #[arg(long)]
        archive: bool,

        /// Only chats assigned to the signed-in operator
        #[arg(long, conflicts_with = "archive")]
        mine: bool,
    },

    /// Print a chat's messages (and comments when signed in)
    Read {
        chat_id: i64,
    },

    /// Open a chat as a client
    Start {
        #[arg(long, default_value = "Anonymous")]
        name: String,

        #[arg(long, default_value = "")]
        email: String,

        /// Optional first message
        message: Option<String>,
    },

    /// Send a message (as the signed-in operator, else as the client)
    Send {
        #[arg(short, long)]
        to: i64,

        message: String,
    },

    /// Close a chat
    Close {
        chat_id: i64,

        #[arg(short, long, value_enum, default_value = "resolved")]
        resolution: ResolutionArg,
    },

    /// Add an internal staff comment to a chat
    Comment {
        chat_id: i64,

        text: String,
    },

    /// List staff accounts
    Employees,

    /// Create a staff account
    AddEmployee {
        #[arg(short, long)]
        username: String,

        #[arg(short, long)]
        password: String,

        #[arg(long, value_enum, default_value = "operator")]
        role: RoleArg,
    },

    /// Show or set online status
    Presence {
        #[arg(short, long, value_enum)]
        set: Option<PresenceArg>,

        /// User id (defaults to the signed-in user)
        #[arg(long)]
        id: Option<i64>,
    },

    /// Launch the terminal user interface
    Tui,
}

fn init_logging(verbose: bool, tui_sink: Option<tui::LogBuffer>) {
    let level = if verbose { "debug" } else { "info" };
    let filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| level.into());
    let registry = tracing_subscriber::registry().with(filter);

    match tui_sink {
        Some(sink) => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(sink),
            )
            .init(),
        None => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // In the TUI, log lines go to the F2 pane instead of the terminal.
    let tui_sink = matches!(cli.command, Commands::Tui).then(tui::LogBuffer::new);
    init_logging(cli.verbose, tui_sink.clone());

    let mut config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Login { username, password } => {
            auth::login(&mut config, &username, &password).await?;
        }
        Commands::Logout => {
            auth::logout(&mut config).await?;
        }
        Commands::Status => {
            auth::status(&config).await?;
        }
        Commands::Chats { archive, mine } => {
            tracing::debug!("Fetching chats...");
            api::chats::list_chats(&config, archive, mine).await?;
        }
        Commands::Read { chat_id } => {
            api::chats::read_thread(&config, chat_id).await?;
        }
        Commands::Start {
            name,
            email,
            message,
        } => {
            api::chats::start_chat(&config, &name, &email, message.as_deref()).await?;
        }
        Commands::Send { to, message } => {
            api::chats::send_message(&config, to, &message).await?;
        }
        Commands::Close {
            chat_id,
            resolution,
        } => {
            api::chats::close_chat(&config, chat_id, resolution.into()).await?;
        }
        Commands::Comment { chat_id, text } => {
            api::chats::add_comment(&config, chat_id, &text).await?;
        }
        Commands::Employees => {
            api::users::list_employees(&config).await?;
        }
        Commands::AddEmployee {
            username,
            password,
            role,
        } => {
            let employee = NewEmployee {
                username,
                password,
                role: role.into(),
            };
            api::users::add_employee(&config, employee).await?;
        }
        Commands::Presence { set, id } => {
            api::users::presence(&config, set.map(Into::into), id).await?;
        }
        Commands::Tui => {
            let sink = tui_sink.unwrap_or_default();
            tui::run(&config, sink).await?;
        }
    }

    Ok(())
}

//! Configuration and session storage

use anyhow::{bail, Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::models::Identity;

const DEFAULT_AUTH_URL: &str = "https://functions.poehali.dev/a03f292b-7405-41f0-8bc7-82ac6cf67651";
const DEFAULT_USERS_URL: &str = "https://functions.poehali.dev/61e569d1-6f44-46a8-9257-92cbe41f117a";
const DEFAULT_CHATS_URL: &str = "https://functions.poehali.dev/2751243f-f994-4065-8e5e-2890d01a7f7e";

/// Gateway resource URLs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub auth: String,
    pub users: String,
    pub chats: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            auth: DEFAULT_AUTH_URL.to_string(),
            users: DEFAULT_USERS_URL.to_string(),
            chats: DEFAULT_CHATS_URL.to_string(),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub endpoints: Endpoints,
    /// Refresh period of the TUI poll loop
    pub poll_interval_secs: u64,
    /// Per-request timeout for gateway calls
    pub request_timeout_secs: u64,
    /// How long a notification stays on screen
    pub notification_ttl_secs: u64,
    /// Identity stored by `login` for one-shot commands
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<Identity>,
    /// Where this config was loaded from (not serialized)
    #[serde(skip)]
    path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoints: Endpoints::default(),
            poll_interval_secs: 3,
            request_timeout_secs: 10,
            notification_ttl_secs: 5,
            session: None,
            path: None,
        }
    }
}

impl Config {
    /// Get config file path in the platform config directory
    fn default_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("dev", "support-chat", "support-chat")
            .context("Could not determine config directory")?;
        Ok(proj_dirs.config_dir().join("config.toml"))
    }

    /// Load configuration from `path`, or from the platform default location.
    ///
    /// A missing file yields defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_path()?,
        };

        let mut config = if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            toml::from_str::<Config>(&content)
                .with_context(|| format!("Failed to parse config file {}", path.display()))?
        } else {
            tracing::debug!("No config at {}, using defaults", path.display());
            Self::default()
        };

        config.validate()?;
        config.path = Some(path);
        Ok(config)
    }

    /// Reject values the client cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_secs == 0 {
            bail!("poll_interval_secs must be greater than zero");
        }
        if self.request_timeout_secs == 0 {
            bail!("request_timeout_secs must be greater than zero");
        }
        for (name, value) in [
            ("auth", &self.endpoints.auth),
            ("users", &self.endpoints.users),
            ("chats", &self.endpoints.chats),
        ] {
            let parsed = url::Url::parse(value)
                .with_context(|| format!("Invalid {} endpoint URL: {}", name, value))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                bail!("{} endpoint must be http(s), got {}", name, value);
            }
        }
        Ok(())
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let path = match &self.path {
            Some(p) => p.clone(),
            None => Self::default_path()?,
        };
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&path, content).context("Failed to write config file")?;

        // The stored session identifies a staff member
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = fs::Permissions::from_mode(0o600);
            fs::set_permissions(&path, perms).context("Failed to set config permissions")?;
        }

        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn notification_ttl(&self) -> Duration {
        Duration::from_secs(self.notification_ttl_secs)
    }

    pub fn set_session(&mut self, identity: Identity) {
        self.session = Some(identity);
    }

    pub fn clear_session(&mut self) -> Option<Identity> {
        self.session.take()
    }
}

use anyhow::{Context, Result, bail};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

const AUTH_FILE: &str = "auth.json";
pub const DEFAULT_PASSPHRASE: &str = "TDP2026";
pub const PASSPHRASE_ENV: &str = "SOCIAL_REPORT_PASSPHRASE";

#[derive(Debug, Default, Serialize, Deserialize)]
struct AuthFlag {
    authenticated: bool,
    authenticated_at: Option<String>,
}

/// Soft access gate: a shared passphrase compared in plaintext, remembered
/// as a flag file. Not a security boundary.
#[derive(Debug, Clone)]
pub struct AuthGate {
    flag_path: PathBuf,
    passphrase: String,
}

impl AuthGate {
    pub fn new(root: &Path) -> Self {
        let passphrase = std::env::var(PASSPHRASE_ENV)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_PASSPHRASE.to_string());

        Self::with_passphrase(root, passphrase)
    }

    pub fn with_passphrase(root: &Path, passphrase: impl Into<String>) -> Self {
        Self {
            flag_path: root.join(AUTH_FILE),
            passphrase: passphrase.into(),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        fs::read_to_string(&self.flag_path)
            .ok()
            .and_then(|content| serde_json::from_str::<AuthFlag>(&content).ok())
            .is_some_and(|flag| flag.authenticated)
    }

    /// Returns `false` on a wrong passphrase; errors only when the flag
    /// cannot be written.
    pub fn login(&self, attempt: &str) -> Result<bool> {
        if attempt != self.passphrase {
            return Ok(false);
        }

        if let Some(parent) = self.flag_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create auth directory: {}", parent.display()))?;
        }

        let flag = AuthFlag {
            authenticated: true,
            authenticated_at: Some(Utc::now().to_rfc3339()),
        };
        let content = serde_json::to_string_pretty(&flag).context("Failed to serialize auth flag")?;
        fs::write(&self.flag_path, content).with_context(|| {
            format!("Failed to write auth flag: {}", self.flag_path.display())
        })?;

        info!("dashboard access granted");
        Ok(true)
    }

    pub fn logout(&self) -> Result<()> {
        if self.flag_path.exists() {
            fs::remove_file(&self.flag_path).with_context(|| {
                format!("Failed to remove auth flag: {}", self.flag_path.display())
            })?;
        }

        Ok(())
    }

    pub fn require(&self) -> Result<()> {
        if !self.is_authenticated() {
            bail!("Not logged in. Run `social-report login` first.");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::AuthGate;

    #[test]
    fn wrong_passphrase_does_not_set_flag() {
        let dir = tempfile::tempdir().expect("tempdir");
        let gate = AuthGate::with_passphrase(dir.path(), "open-sesame");

        assert!(!gate.login("guess").expect("login attempt"));
        assert!(!gate.is_authenticated());
        assert!(gate.require().is_err());
    }

    #[test]
    fn login_persists_until_logout() {
        let dir = tempfile::tempdir().expect("tempdir");
        let gate = AuthGate::with_passphrase(dir.path(), "open-sesame");

        assert!(gate.login("open-sesame").expect("login attempt"));
        assert!(AuthGate::with_passphrase(dir.path(), "open-sesame").is_authenticated());
        gate.require().expect("authenticated");

        gate.logout().expect("logout");
        assert!(!gate.is_authenticated());
        gate.logout().expect("second logout is a no-op");
    }

    #[test]
    fn corrupt_flag_reads_as_logged_out() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("auth.json"), "true").expect("write");

        let gate = AuthGate::with_passphrase(dir.path(), "open-sesame");

        assert!(!gate.is_authenticated());
    }
}

//! Accessory App Sideloading
//!
//! Copies the bundled accessory app out of the assets directory and hands
//! it to an installer. One best-effort attempt; the caller shows failures
//! as a toast.

use std::future::Future;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info, instrument};

use crate::core::hash::{hash_bundle, short_hex};

/// Default bundle file name.
pub const DEFAULT_ARTIFACT: &str = "rps-accessory.pbw";

/// Sideload configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SideloadConfig {
    /// Directory holding bundled assets.
    pub assets_dir: PathBuf,
    /// Writable directory the installer can read from.
    pub external_dir: PathBuf,
    /// Bundle file name, same in both directories.
    pub artifact_name: String,
    /// Program invoked with the copied bundle path.
    pub installer_program: Option<String>,
}

impl Default for SideloadConfig {
    fn default() -> Self {
        Self {
            assets_dir: PathBuf::from("assets"),
            external_dir: std::env::temp_dir().join("rps-companion"),
            artifact_name: DEFAULT_ARTIFACT.to_string(),
            installer_program: None,
        }
    }
}

impl SideloadConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            assets_dir: std::env::var("RPS_ASSETS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.assets_dir),
            external_dir: std::env::var("RPS_EXTERNAL_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.external_dir),
            artifact_name: std::env::var("RPS_ARTIFACT").unwrap_or(defaults.artifact_name),
            installer_program: std::env::var("RPS_INSTALL_COMMAND").ok(),
        }
    }

    /// Where the bundle is read from.
    pub fn source_path(&self) -> PathBuf {
        self.assets_dir.join(&self.artifact_name)
    }

    /// Where the bundle is copied to.
    pub fn target_path(&self) -> PathBuf {
        self.external_dir.join(&self.artifact_name)
    }
}

/// Sideload errors.
#[derive(Debug, thiserror::Error)]
pub enum SideloadError {
    /// Reading or writing the bundle failed.
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// The copy does not match the source.
    #[error("Copied bundle does not match source ({expected} != {actual})")]
    DigestMismatch {
        /// Source digest prefix.
        expected: String,
        /// Copy digest prefix.
        actual: String,
    },

    /// The installer could not be started or refused the bundle.
    #[error("Installer failed: {0}")]
    InstallerFailed(String),

    /// The installer ran but reported failure.
    #[error("Installer exited with {0}")]
    InstallerExit(std::process::ExitStatus),
}

/// Hands a copied bundle to whatever installs it on the accessory.
pub trait Installer: Send + Sync {
    /// Hand off the bundle at `artifact`.
    fn hand_off(&self, artifact: &Path) -> impl Future<Output = Result<(), SideloadError>> + Send;
}

/// Installer that runs an external program with the bundle path.
#[derive(Debug, Clone)]
pub struct CommandInstaller {
    program: Option<String>,
}

impl CommandInstaller {
    /// Installer for `program`; `None` means no installer is configured.
    pub fn new(program: Option<String>) -> Self {
        Self { program }
    }

    /// Installer from the sideload configuration.
    pub fn from_config(config: &SideloadConfig) -> Self {
        Self::new(config.installer_program.clone())
    }
}

impl Installer for CommandInstaller {
    async fn hand_off(&self, artifact: &Path) -> Result<(), SideloadError> {
        let program = self.program.as_deref().ok_or_else(|| {
            SideloadError::InstallerFailed("no installer configured".to_string())
        })?;

        debug!("Handing {} to {}", artifact.display(), program);
        let status = Command::new(program)
            .arg(artifact)
            .status()
            .await
            .map_err(|e| SideloadError::InstallerFailed(e.to_string()))?;

        if status.success() {
            Ok(())
        } else {
            Err(SideloadError::InstallerExit(status))
        }
    }
}

/// Copy the bundle out of assets, verify it and hand it to the installer.
///
/// Returns the path of the copied bundle.
#[instrument(skip(installer))]
pub async fn install<I: Installer>(config: &SideloadConfig, installer: &I) -> Result<PathBuf, SideloadError> {
    let source = config.source_path();
    let target = config.target_path();

    let bundle = tokio::fs::read(&source).await?;
    let expected = hash_bundle(&bundle);

    tokio::fs::create_dir_all(&config.external_dir).await?;
    tokio::fs::write(&target, &bundle).await?;

    let written = tokio::fs::read(&target).await?;
    let actual = hash_bundle(&written);
    if actual != expected {
        return Err(SideloadError::DigestMismatch {
            expected: short_hex(&expected),
            actual: short_hex(&actual),
        });
    }

    info!("Copied {} bytes to {} ({})", bundle.len(), target.display(), short_hex(&expected));
    installer.hand_off(&target).await?;
    info!("Handed {} to installer", target.display());

    Ok(target)
}

/// Toast text for a failed install.
pub fn failure_text(error: &SideloadError) -> String {
    format!("App install failed: {}", error)
}

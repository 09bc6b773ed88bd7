//! Accessory app installation.

pub mod sideload;

pub use sideload::{install, CommandInstaller, Installer, SideloadConfig, SideloadError};

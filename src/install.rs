//! Installs a packer release archive into a local directory.
//!
//! HashiCorp ships packer as a zip archive containing a single executable.
//! [`Installer`] unpacks the archive and verifies the executable actually
//! landed where the release layout says it should.

use std::fs::File;
use std::path::{Path, PathBuf};

use crate::error::PackerError;

/// Name of the executable inside a release archive.
const EXECUTABLE_NAME: &str = "packer";

pub struct Installer {
    archive: PathBuf,
    install_dir: PathBuf,
}

impl Installer {
    pub fn new(archive: impl Into<PathBuf>, install_dir: impl Into<PathBuf>) -> Self {
        Self {
            archive: archive.into(),
            install_dir: install_dir.into(),
        }
    }

    /// Extract the archive and return the path to the packer executable.
    ///
    /// Fails with an installation error when the archive cannot be read or
    /// when no executable exists under the install directory afterwards.
    pub fn install(&self) -> Result<PathBuf, PackerError> {
        tracing::debug!(
            "extracting {} into {}",
            self.archive.display(),
            self.install_dir.display()
        );

        let file = File::open(&self.archive).map_err(|e| {
            PackerError::installation_with(
                format!("cannot open archive {}", self.archive.display()),
                e,
            )
        })?;
        let mut archive = zip::ZipArchive::new(file).map_err(|e| {
            PackerError::installation_with(
                format!("{} is not a readable zip archive", self.archive.display()),
                e,
            )
        })?;
        archive.extract(&self.install_dir).map_err(|e| {
            PackerError::installation_with(
                format!("extraction into {} failed", self.install_dir.display()),
                e,
            )
        })?;

        let exec_path = self.install_dir.join(EXECUTABLE_NAME);
        if !exec_path.is_file() {
            return Err(PackerError::installation(format!(
                "executable not found under {} after extraction",
                exec_path.display()
            )));
        }
        Ok(exec_path)
    }
}

/// Convenience wrapper over [`Installer`].
pub fn install(archive: &Path, install_dir: &Path) -> Result<PathBuf, PackerError> {
    Installer::new(archive, install_dir).install()
}

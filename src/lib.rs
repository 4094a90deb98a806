//! # packer-client
//!
//! A thin client for [HashiCorp Packer](https://www.packer.io/): assemble
//! argv for the `packer` executable, run it as a subprocess, and parse the
//! machine-readable inspection output into structured records.
//!
//! The crate wraps the tool rather than reimplementing it: image building,
//! retries, and process supervision all stay inside packer. Each operation
//! runs one subprocess and waits for it. A non-zero packer exit is result
//! data the caller inspects; only a process that cannot be started raises
//! an error.
//!
//! ```rust,no_run
//! use packer_client::{BuildConfig, BuildOptions, Packer};
//!
//! # async fn demo() -> Result<(), packer_client::PackerError> {
//! let config = BuildConfig::builder("template.json")
//!     .only(["docker"])
//!     .var("region", "us-east-1")
//!     .build()?;
//!
//! let packer = Packer::new(config);
//! let inspection = packer.inspect().await?;
//! println!("builders: {:?}", inspection.builders);
//!
//! let output = packer.build(&BuildOptions::default()).await?;
//! println!("exit: {:?}", output.status);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - `config` - declarative build configuration with construction-time checks
//! - `args` - pure argv assembly for every packer subcommand
//! - `client` - the `Packer` client itself
//! - `inspect` - machine-readable inspection output parser
//! - `install` - release-archive installer
//! - `subprocess` - process-execution layer with a mockable runner seam

pub mod args;
pub mod client;
pub mod config;
pub mod error;
pub mod inspect;
pub mod install;
pub mod subprocess;

pub use args::{BuildOptions, PushOptions};
pub use client::{Fix, Packer, Validation, DEFAULT_EXEC_PATH};
pub use config::{BuildConfig, BuildConfigBuilder};
pub use error::PackerError;
pub use inspect::{Inspection, TemplateBuilder, TemplateProvisioner, TemplateVariable};
pub use install::Installer;
pub use subprocess::{ExitStatus, ProcessOutput, ProcessRunner};

//! Pure argv assembly for packer subcommands.
//!
//! Everything here is deterministic string construction over a
//! [`BuildConfig`]; no process is spawned and no filesystem is touched.
//!
//! Layout, in required order: operation-specific flags first, base
//! arguments next (build and validate only), the template path always last.

use crate::config::BuildConfig;
use crate::error::PackerError;

/// Boolean switches for `packer build`. Parallel builds are on by default,
/// matching the tool's own default.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub parallel: bool,
    pub debug: bool,
    pub force: bool,
    pub machine_readable: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            parallel: true,
            debug: false,
            force: false,
            machine_readable: false,
        }
    }
}

/// Optional `key=value` flags for `packer push`.
#[derive(Debug, Clone, Default)]
pub struct PushOptions {
    pub name: Option<String>,
    pub token: Option<String>,
    pub message: Option<String>,
}

pub(crate) fn build_args(
    config: &BuildConfig,
    options: &BuildOptions,
) -> Result<Vec<String>, PackerError> {
    let mut args = Vec::new();
    if options.parallel {
        args.push("-parallel=true".to_string());
    }
    if options.debug {
        args.push("-debug".to_string());
    }
    if options.force {
        args.push("-force".to_string());
    }
    if options.machine_readable {
        args.push("-machine-readable".to_string());
    }
    args.extend(base_args(config)?);
    args.push(template_arg(config));
    Ok(args)
}

pub(crate) fn validate_args(
    config: &BuildConfig,
    syntax_only: bool,
) -> Result<Vec<String>, PackerError> {
    let mut args = Vec::new();
    if syntax_only {
        args.push("-syntax-only".to_string());
    }
    args.extend(base_args(config)?);
    args.push(template_arg(config));
    Ok(args)
}

pub(crate) fn fix_args(config: &BuildConfig) -> Vec<String> {
    vec![template_arg(config)]
}

pub(crate) fn inspect_args(config: &BuildConfig) -> Vec<String> {
    vec!["-machine-readable".to_string(), template_arg(config)]
}

pub(crate) fn push_args(config: &BuildConfig, options: &PushOptions) -> Vec<String> {
    let mut args = Vec::new();
    if let Some(name) = &options.name {
        args.push(format!("-name={name}"));
    }
    if let Some(token) = &options.token {
        args.push(format!("-token={token}"));
    }
    if let Some(message) = &options.message {
        args.push(format!("-message={message}"));
    }
    args.push(template_arg(config));
    args
}

pub(crate) fn version_args() -> Vec<String> {
    Vec::new()
}

/// Builder selection, template variables, and the variables file: the flags
/// packer accepts on both `build` and `validate`.
///
/// `only` and `exclude` are mutually exclusive; joining an empty list would
/// emit an empty `-only=`/`-except=` value, so each flag is guarded by a
/// non-emptiness check.
pub(crate) fn base_args(config: &BuildConfig) -> Result<Vec<String>, PackerError> {
    if !config.exclude().is_empty() && !config.only().is_empty() {
        return Err(PackerError::configuration(
            "cannot provide both \"only\" and \"exclude\" builders",
        ));
    }

    let mut args = Vec::new();
    if !config.exclude().is_empty() {
        args.push(format!("-except={}", join_comma(config.exclude())));
    } else if !config.only().is_empty() {
        args.push(format!("-only={}", join_comma(config.only())));
    }

    for (name, value) in config.vars() {
        args.push("-var".to_string());
        args.push(format!("{name}={value}"));
    }

    if let Some(path) = config.var_file() {
        args.push(format!("-var-file={}", path.display()));
    }

    Ok(args)
}

#[inline]
pub(crate) fn join_comma(items: &[String]) -> String {
    items.join(",")
}

fn template_arg(config: &BuildConfig) -> String {
    config.template().display().to_string()
}

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::PackerError;

/// Declarative inputs for one packer template: the template path, builder
/// selection, template variables, and an optional variables file.
///
/// Immutable once built. The template path is checked for existence at
/// construction time, so a [`BuildConfig`] in hand always points at a file
/// that was present when it was created.
///
/// Builder selection is exclusive: `only` names the builders to run,
/// `exclude` the builders to skip. Supplying both is rejected when
/// arguments are assembled.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    template: PathBuf,
    exclude: Vec<String>,
    only: Vec<String>,
    vars: BTreeMap<String, String>,
    var_file: Option<PathBuf>,
}

impl BuildConfig {
    pub fn builder(template: impl Into<PathBuf>) -> BuildConfigBuilder {
        BuildConfigBuilder {
            template: template.into(),
            exclude: Vec::new(),
            only: Vec::new(),
            vars: BTreeMap::new(),
            var_file: None,
        }
    }

    pub fn template(&self) -> &Path {
        &self.template
    }

    pub fn exclude(&self) -> &[String] {
        &self.exclude
    }

    pub fn only(&self) -> &[String] {
        &self.only
    }

    /// Template variables, ordered by name. The sorted map keeps `-var`
    /// emission deterministic run to run.
    pub fn vars(&self) -> &BTreeMap<String, String> {
        &self.vars
    }

    pub fn var_file(&self) -> Option<&Path> {
        self.var_file.as_deref()
    }
}

pub struct BuildConfigBuilder {
    template: PathBuf,
    exclude: Vec<String>,
    only: Vec<String>,
    vars: BTreeMap<String, String>,
    var_file: Option<PathBuf>,
}

impl BuildConfigBuilder {
    /// Builders to skip (`-except`).
    pub fn exclude<I, S>(mut self, builders: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude.extend(builders.into_iter().map(Into::into));
        self
    }

    /// Builders to run exclusively (`-only`).
    pub fn only<I, S>(mut self, builders: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.only.extend(builders.into_iter().map(Into::into));
        self
    }

    pub fn var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    pub fn vars<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (name, value) in vars {
            self.vars.insert(name.into(), value.into());
        }
        self
    }

    pub fn var_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.var_file = Some(path.into());
        self
    }

    pub fn build(self) -> Result<BuildConfig, PackerError> {
        if !self.template.is_file() {
            return Err(PackerError::configuration(format!(
                "template not found at {}",
                self.template.display()
            )));
        }
        Ok(BuildConfig {
            template: self.template,
            exclude: self.exclude,
            only: self.only,
            vars: self.vars,
            var_file: self.var_file,
        })
    }
}

use std::collections::BTreeSet;

use tracing::warn;

use crate::{error::GenError, imports::dependency_path, utils::quote};

pub const DEFAULT_MODULE_ROOT: &str = "crate";

/// Generator settings, read from the protoc plugin parameter
/// (`--web_opt=ignore_packages=a.v1;b.v1,module_root=crate`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Packages whose files are skipped entirely.
    pub ignore_packages: BTreeSet<String>,
    /// Rust path under which the prost modules of every package live.
    pub module_root:     String,
    /// Prepended to every route pattern.
    pub path_prefix:     String,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            ignore_packages: BTreeSet::new(),
            module_root:     DEFAULT_MODULE_ROOT.to_string(),
            path_prefix:     String::new(),
        }
    }
}

impl Options {
    pub fn parse(parameter: Option<&str>) -> Result<Self, GenError> {
        let mut options = Options::default();
        let Some(parameter) = parameter else {
            return Ok(options);
        };

        for part in parameter.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (key, value) = part
                .split_once('=')
                .ok_or_else(|| GenError::InvalidParameter(quote(part)))?;
            match key.trim() {
                "ignore_packages" => options.ignore(value),
                "module_root"     => options.module_root = value.trim().to_string(),
                "path_prefix"     => options.path_prefix = value.trim().to_string(),
                other             => warn!("Ignoring unknown parameter {}", quote(other)),
            }
        }

        Ok(options)
    }

    /// Adds the `;`-separated package names in `list` to the ignore set.
    pub fn ignore(&mut self, list: &str) {
        self.ignore_packages.extend(
            list.split(';')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string),
        );
    }

    pub fn is_ignored(&self, package: &str) -> bool {
        self.ignore_packages.contains(package)
    }

    /// Dependency path of the module generated for `package`. Well-known
    /// packages resolve to their fixed crate whatever the module root.
    pub fn module_path(&self, package: &str) -> String {
        dependency_path(&self.module_root, package)
    }
}

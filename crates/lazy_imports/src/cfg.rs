use globset::{Glob, GlobSet, GlobSetBuilder};
use schemars::JsonSchema;
use serde::Deserialize;
use swc_atoms::Atom;

use crate::error::LazyImportsError;

const DEFAULT_MODULE_PARAM: &str = "m";

fn default_module_param() -> String {
    DEFAULT_MODULE_PARAM.to_string()
}

/// A JSON serializable proxy for the LazyImportsConfig struct
///
/// This struct is used to deserialize the pass configuration from a host's
/// config file.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LazyImportsJSONConfig {
    /// Name of the parameter that receives the loaded module in the emitted
    /// `import(...).then((m) => m.fn(...))` callbacks.
    #[serde(default = "default_module_param")]
    pub module_param: String,
    /// A list of globs.
    /// Import statements whose specifier matches one of these globs are never
    /// deferred, even if they import async functions.
    ///
    /// Matches are made against the specifier as written in the import statement,
    /// e.g. `./file1` or `@scope/package`.
    #[serde(default)]
    pub skip_specifiers: Vec<String>,
}

impl Default for LazyImportsJSONConfig {
    fn default() -> Self {
        Self {
            module_param: default_module_param(),
            skip_specifiers: Vec::new(),
        }
    }
}

/// Configuration for the lazy imports pass
#[derive(Debug, Clone)]
pub struct LazyImportsConfig {
    /// Preferred name for the `.then` callback parameter
    pub module_param: Atom,

    /// Specifiers that are left alone
    pub skip_specifiers: GlobSet,
}

impl LazyImportsConfig {
    pub fn is_skipped_specifier(&self, specifier: &str) -> bool {
        self.skip_specifiers.is_match(specifier)
    }
}

impl Default for LazyImportsConfig {
    fn default() -> Self {
        Self {
            module_param: DEFAULT_MODULE_PARAM.into(),
            skip_specifiers: GlobSet::empty(),
        }
    }
}

impl TryFrom<LazyImportsJSONConfig> for LazyImportsConfig {
    type Error = LazyImportsError;

    fn try_from(value: LazyImportsJSONConfig) -> Result<Self, Self::Error> {
        if !crate::rewrite::is_valid_ident_name(&value.module_param) {
            return Err(LazyImportsError::InvalidModuleParam(value.module_param));
        }

        let mut builder = GlobSetBuilder::new();
        for glob in value.skip_specifiers {
            let parsed = Glob::new(&glob)
                .map_err(|source| LazyImportsError::InvalidSkipGlob { glob, source })?;
            builder.add(parsed);
        }
        let skip_specifiers = builder
            .build()
            .map_err(|source| LazyImportsError::InvalidSkipGlob {
                glob: "<combined>".to_string(),
                source,
            })?;

        Ok(LazyImportsConfig {
            module_param: value.module_param.into(),
            skip_specifiers,
        })
    }
}

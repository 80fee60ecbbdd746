mod exports;
mod specifier;

use ahashmap::AHashMap;
use swc_ecma_ast::Module;

use crate::{
    error::LazyImportsError,
    resolver::{BindingSite, CallSignatureInfo, ExportName, TypeResolver},
};

use self::{exports::SignatureLookup, specifier::candidate_paths};

pub use self::specifier::normalise_path;

/// An in-memory set of parsed modules that answers call signature queries
/// by following imports and exports between them.
///
/// Only declarations visible in the source are understood: `async`
/// functions, and functions or function types annotated as returning a
/// `Promise`. Inferred return types are not.
#[derive(Debug, Default)]
pub struct SourceProgram {
    modules: AHashMap<String, Module>,
}

impl SourceProgram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_source(&mut self, path: &str, text: &str) -> Result<(), LazyImportsError> {
        let (_cm, module) =
            swc_utils_parse::parse_ecma_src(path, text).map_err(|err| LazyImportsError::Parse {
                path: path.to_string(),
                message: swc_utils_parse::describe_parse_error(&err),
            })?;
        self.add_module(path, module);
        Ok(())
    }

    pub fn add_module(&mut self, path: &str, module: Module) {
        self.modules.insert(normalise_path(path), module);
    }

    pub fn module(&self, path: &str) -> Option<&Module> {
        self.modules.get(&normalise_path(path))
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// The path of the module `specifier` refers to when imported from `importer`.
    pub fn resolve(&self, importer: &str, specifier: &str) -> Option<String> {
        candidate_paths(importer, specifier)
            .into_iter()
            .find(|path| self.modules.contains_key(path))
    }

    /// What the program knows about the call signature of an export of the
    /// module at `path`.
    pub fn export_signature(&self, path: &str, export: &ExportName) -> Option<CallSignatureInfo> {
        SignatureLookup::new(self).export_signature(&normalise_path(path), export)
    }
}

impl TypeResolver for SourceProgram {
    fn resolve_call_return_type(&self, site: &BindingSite<'_>) -> Option<CallSignatureInfo> {
        let path = self.resolve(site.importer, site.module_path)?;
        self.export_signature(&path, site.export)
    }
}

use std::fmt::Display;

use ahashmap::AHashMap;
use swc_atoms::Atom;
use swc_ecma_ast::{Ident, ModuleExportName};

/// The name a binding reads off the module it is imported from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ExportName {
    Named(Atom),
    Default,
}

impl ExportName {
    pub fn named(name: impl Into<Atom>) -> Self {
        let name = name.into();
        if &*name == "default" {
            ExportName::Default
        } else {
            ExportName::Named(name)
        }
    }

    /// `import { a as b }` reads `a`, `import { "a-b" as b }` reads `a-b`.
    pub fn from_module_export_name(name: &ModuleExportName) -> Self {
        match name {
            ModuleExportName::Ident(ident) => Self::named(ident.sym.clone()),
            ModuleExportName::Str(s) => Self::named(s.value.clone()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ExportName::Named(name) => name.as_str(),
            ExportName::Default => "default",
        }
    }
}

impl Display for ExportName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One import binding the classifier asks about.
#[derive(Debug, Clone, Copy)]
pub struct BindingSite<'a> {
    /// Path of the module containing the import statement
    pub importer: &'a str,
    /// Specifier of the import statement, as written
    pub module_path: &'a str,
    /// Export the binding reads
    pub export: &'a ExportName,
    /// The local binding identifier in the import statement
    pub local: &'a Ident,
}

/// What the type resolver knows about the first call signature of a binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CallSignatureInfo {
    /// The declared return type is the deferred-result (`Promise`) type
    pub returns_deferred: bool,
}

impl CallSignatureInfo {
    pub fn deferred() -> Self {
        Self {
            returns_deferred: true,
        }
    }

    pub fn immediate() -> Self {
        Self {
            returns_deferred: false,
        }
    }
}

/// Type oracle consulted once per import binding.
///
/// Returns `None` when the binding has no call signature at all.
/// Implementations must answer concurrent read-only queries, since modules
/// can be transformed in parallel against a shared resolver.
pub trait TypeResolver: Sync {
    fn resolve_call_return_type(&self, site: &BindingSite<'_>) -> Option<CallSignatureInfo>;
}

impl<T: TypeResolver + ?Sized> TypeResolver for &T {
    fn resolve_call_return_type(&self, site: &BindingSite<'_>) -> Option<CallSignatureInfo> {
        (**self).resolve_call_return_type(site)
    }
}

impl<T: TypeResolver + ?Sized> TypeResolver for Box<T> {
    fn resolve_call_return_type(&self, site: &BindingSite<'_>) -> Option<CallSignatureInfo> {
        (**self).resolve_call_return_type(site)
    }
}

/// Resolver backed by a hand-built table keyed on `(module specifier, export)`.
///
/// Useful for hosts that run their own type checker ahead of the pass, and for tests.
#[derive(Debug, Default, Clone)]
pub struct StaticTypeResolver {
    signatures: AHashMap<(String, ExportName), CallSignatureInfo>,
}

impl StaticTypeResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        module_path: impl Into<String>,
        export: ExportName,
        info: CallSignatureInfo,
    ) -> &mut Self {
        self.signatures.insert((module_path.into(), export), info);
        self
    }

    pub fn with_deferred(mut self, module_path: impl Into<String>, export: ExportName) -> Self {
        self.insert(module_path, export, CallSignatureInfo::deferred());
        self
    }

    pub fn with_immediate(mut self, module_path: impl Into<String>, export: ExportName) -> Self {
        self.insert(module_path, export, CallSignatureInfo::immediate());
        self
    }
}

impl TypeResolver for StaticTypeResolver {
    fn resolve_call_return_type(&self, site: &BindingSite<'_>) -> Option<CallSignatureInfo> {
        self.signatures
            .get(&(site.module_path.to_string(), site.export.clone()))
            .copied()
    }
}

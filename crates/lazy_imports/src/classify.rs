use ahashmap::AHashMap;
use logger::debug_logf;
use logger_srcfile::SrcFileLogger;
use swc_atoms::Atom;
use swc_common::{Span, Spanned};
use swc_ecma_ast::{ImportDecl, ImportSpecifier, Module, ModuleDecl, ModuleItem};

use crate::{
    cfg::LazyImportsConfig,
    resolver::{BindingSite, ExportName, TypeResolver},
};

/// An imported name known to refer to an async function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateBinding {
    /// `y` in `import { x as y } from "./file1"`
    pub local: Atom,
    /// `x` in `import { x as y } from "./file1"`
    pub export: ExportName,
    /// `./file1` in `import { x as y } from "./file1"`
    pub module_path: Atom,
}

/// Candidate bindings of one module, keyed by local name, in declaration order.
#[derive(Debug, Default, Clone)]
pub struct CandidateSet {
    bindings: Vec<CandidateBinding>,
    by_local: AHashMap<Atom, usize>,
}

impl CandidateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a candidate. Returns false if the local name was already taken,
    /// in which case the set is unchanged.
    pub fn insert(&mut self, binding: CandidateBinding) -> bool {
        if self.by_local.contains_key(&binding.local) {
            return false;
        }
        self.by_local
            .insert(binding.local.clone(), self.bindings.len());
        self.bindings.push(binding);
        true
    }

    pub fn get(&self, local: &Atom) -> Option<&CandidateBinding> {
        self.by_local.get(local).map(|idx| &self.bindings[*idx])
    }

    pub fn contains(&self, local: &Atom) -> bool {
        self.by_local.contains_key(local)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CandidateBinding> {
        self.bindings.iter()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn local_names(&self) -> Vec<String> {
        self.bindings.iter().map(|b| b.local.to_string()).collect()
    }
}

/// Finds the imported bindings of `module` that the resolver reports as
/// async functions.
///
/// Bindings without a call signature, or whose return type is not a
/// `Promise`, are skipped without comment.
pub fn classify_imports(
    module: &Module,
    importer: &str,
    resolver: &impl TypeResolver,
    config: &LazyImportsConfig,
    logger: &impl SrcFileLogger,
) -> CandidateSet {
    let mut candidates = CandidateSet::new();

    for item in &module.body {
        let import = match item {
            ModuleItem::ModuleDecl(ModuleDecl::Import(import)) => import,
            _ => continue,
        };
        // `import type { .. }` never exists at runtime
        if import.type_only {
            continue;
        }
        if config.is_skipped_specifier(&import.src.value) {
            debug_logf!(logger, "skipping configured specifier {}", import.src.value);
            continue;
        }

        for (local, export, span) in import_bindings(import) {
            let site = BindingSite {
                importer,
                module_path: &import.src.value,
                export: &export,
                local,
            };
            let returns_deferred = resolver
                .resolve_call_return_type(&site)
                .map(|info| info.returns_deferred)
                .unwrap_or(false);
            if !returns_deferred {
                continue;
            }

            debug_logf!(
                logger,
                "{}: {} ({} from {:?}) is an async import",
                importer,
                local.sym,
                export,
                import.src.value
            );
            let inserted = candidates.insert(CandidateBinding {
                local: local.sym.clone(),
                export,
                module_path: import.src.value.clone(),
            });
            if !inserted {
                logger.src_warn(
                    &span,
                    format!(
                        "{} is imported more than once, only the first import will be deferred",
                        local.sym
                    ),
                );
            }
        }
    }

    candidates
}

/// The value bindings of an import statement, with the export each one reads.
///
/// Namespace imports and type-only specifiers are not callable values and are
/// left out.
fn import_bindings(
    import: &ImportDecl,
) -> impl Iterator<Item = (&swc_ecma_ast::Ident, ExportName, Span)> {
    import.specifiers.iter().filter_map(|spec| match spec {
        // import x from './file1'
        ImportSpecifier::Default(default_spec) => Some((
            &default_spec.local,
            ExportName::Default,
            default_spec.span(),
        )),
        ImportSpecifier::Named(named) => {
            if named.is_type_only {
                return None;
            }
            let export = match &named.imported {
                // import { x as y } from './file1'
                Some(imported) => ExportName::from_module_export_name(imported),
                // import { x } from './file1'
                None => ExportName::named(named.local.sym.clone()),
            };
            Some((&named.local, export, named.span()))
        }
        // import * as ns from './file1'
        ImportSpecifier::Namespace(_) => None,
    })
}

use ahashmap::AHashSet;
use swc_atoms::Atom;
use swc_ecma_ast::{ImportDecl, ImportSpecifier, Module, ModuleDecl, ModuleItem};
use swc_ecma_visit::{Fold, FoldWith};

use crate::classify::CandidateSet;

pub struct PruneOutput {
    pub module: Module,
    /// Local names whose import bindings were removed, in source order
    pub dropped: Vec<Atom>,
    /// Import statements removed entirely
    pub removed_statements: usize,
}

/// Removes the import bindings of candidates that are no longer referenced.
pub fn prune_imports(
    module: Module,
    candidates: &CandidateSet,
    still_needed: &AHashSet<Atom>,
) -> PruneOutput {
    let mut pruner = ImportPruner::new(candidates, still_needed);
    let module = module.fold_with(&mut pruner);
    PruneOutput {
        module,
        dropped: pruner.dropped,
        removed_statements: pruner.removed_statements,
    }
}

struct ImportPruner<'a> {
    candidates: &'a CandidateSet,
    still_needed: &'a AHashSet<Atom>,
    dropped: Vec<Atom>,
    removed_statements: usize,
}

impl<'a> ImportPruner<'a> {
    fn new(candidates: &'a CandidateSet, still_needed: &'a AHashSet<Atom>) -> Self {
        Self {
            candidates,
            still_needed,
            dropped: Vec::new(),
            removed_statements: 0,
        }
    }

    fn is_droppable(&self, import: &ImportDecl, specifier: &ImportSpecifier) -> bool {
        let local = match specifier {
            ImportSpecifier::Default(default_spec) => &default_spec.local,
            ImportSpecifier::Named(named) if !named.is_type_only => &named.local,
            // namespace and type-only bindings are never candidates
            ImportSpecifier::Named(_) | ImportSpecifier::Namespace(_) => return false,
        };
        match self.candidates.get(&local.sym) {
            Some(candidate) => {
                candidate.module_path == import.src.value && !self.still_needed.contains(&local.sym)
            }
            None => false,
        }
    }

    /// `None` when every binding of the statement is dropped.
    fn prune_import(&mut self, import: Box<ImportDecl>) -> Option<Box<ImportDecl>> {
        if import.type_only {
            return Some(import);
        }

        let (droppable, retained): (Vec<&ImportSpecifier>, Vec<&ImportSpecifier>) = import
            .specifiers
            .iter()
            .partition(|specifier| self.is_droppable(&import, specifier));

        match (droppable.len(), retained.len()) {
            // nothing to drop, leave the statement untouched
            (0, _) => Some(import),
            // every binding is dropped, remove the statement
            (_, 0) => {
                self.dropped.extend(droppable.iter().map(|s| specifier_local(s)));
                self.removed_statements += 1;
                None
            }
            // keep the retained bindings, in their original order
            (_, _) => {
                self.dropped.extend(droppable.iter().map(|s| specifier_local(s)));
                let specifiers = retained.into_iter().cloned().collect();
                Some(Box::new(ImportDecl {
                    specifiers,
                    ..*import
                }))
            }
        }
    }
}

fn specifier_local(specifier: &ImportSpecifier) -> Atom {
    match specifier {
        ImportSpecifier::Default(default_spec) => default_spec.local.sym.clone(),
        ImportSpecifier::Named(named) => named.local.sym.clone(),
        ImportSpecifier::Namespace(namespace) => namespace.local.sym.clone(),
    }
}

impl Fold for ImportPruner<'_> {
    fn fold_module_items(&mut self, nodes: Vec<ModuleItem>) -> Vec<ModuleItem> {
        let mut next_nodes = Vec::with_capacity(nodes.len());
        for node in nodes {
            match node {
                ModuleItem::ModuleDecl(ModuleDecl::Import(import)) => {
                    if let Some(import) = self.prune_import(Box::new(import)) {
                        next_nodes.push(ModuleItem::ModuleDecl(ModuleDecl::Import(*import)));
                    }
                }
                other => next_nodes.push(other),
            }
        }
        next_nodes
    }
}

use logger::Logger;
use logger_srcfile::{SimpleSourceFileLogger, SrcFileLogger};
use rayon::prelude::*;
use swc_ecma_ast::Module;

use crate::{
    cfg::{LazyImportsConfig, LazyImportsJSONConfig},
    classify::classify_imports,
    error::LazyImportsError,
    prune::prune_imports,
    report::ModuleReport,
    resolver::TypeResolver,
    rewrite::rewrite_call_sites,
};

pub struct TransformedModule {
    pub module: Module,
    pub report: ModuleReport,
}

/// Classifies, rewrites and prunes modules against one type context.
pub struct LazyImportsPass<R: TypeResolver> {
    resolver: R,
    config: LazyImportsConfig,
}

impl<R: TypeResolver> LazyImportsPass<R> {
    /// Fails when no type context is given: without one no import can be
    /// shown to be async, and the pass would silently do nothing.
    pub fn new(type_context: Option<R>, config: LazyImportsConfig) -> Result<Self, LazyImportsError> {
        let resolver = type_context.ok_or(LazyImportsError::MissingTypeContext)?;
        Ok(Self { resolver, config })
    }

    pub fn from_json_config(
        type_context: Option<R>,
        config: LazyImportsJSONConfig,
    ) -> Result<Self, LazyImportsError> {
        Self::new(type_context, LazyImportsConfig::try_from(config)?)
    }

    /// Transforms one module. Never fails; a module with nothing to defer is
    /// returned as it came in.
    pub fn transform_module(
        &self,
        importer: &str,
        module: Module,
        logger: &impl SrcFileLogger,
    ) -> TransformedModule {
        let mut report = ModuleReport::unchanged(importer);

        let candidates = classify_imports(&module, importer, &self.resolver, &self.config, logger);
        if candidates.is_empty() {
            return TransformedModule { module, report };
        }
        report.candidates = candidates.local_names();
        tracing::debug!(importer, candidates = ?report.candidates, "candidates");

        let rewritten = rewrite_call_sites(module, &candidates, &self.config);
        report.rewritten_calls = rewritten.rewritten_calls;

        if rewritten.still_needed.len() == candidates.len() {
            tracing::debug!(importer, "short-circuit: every candidate is still referenced");
            report.short_circuited = true;
            return TransformedModule {
                module: rewritten.module,
                report,
            };
        }

        let pruned = prune_imports(rewritten.module, &candidates, &rewritten.still_needed);
        report.dropped = pruned.dropped.iter().map(|name| name.to_string()).collect();
        report.removed_statements = pruned.removed_statements;
        tracing::debug!(
            importer,
            dropped = ?report.dropped,
            removed_statements = report.removed_statements,
            "pruned"
        );

        TransformedModule {
            module: pruned.module,
            report,
        }
    }

    /// Transforms independent modules in parallel, preserving their order.
    ///
    /// Diagnostics are prefixed with each module's path.
    pub fn transform_modules(
        &self,
        modules: Vec<(String, Module)>,
        logger: impl Logger + Sync,
    ) -> Vec<TransformedModule> {
        modules
            .into_par_iter()
            .map(|(importer, module)| {
                let file_logger = SimpleSourceFileLogger::new(&importer, &logger);
                self.transform_module(&importer, module, &file_logger)
            })
            .collect()
    }
}

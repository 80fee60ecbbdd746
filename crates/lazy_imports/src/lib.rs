#[cfg(test)]
#[macro_use]
extern crate pretty_assertions;

mod cfg;
mod classify;
mod error;
mod pass;
mod program;
mod prune;
mod report;
mod resolver;
mod rewrite;
mod scope;
#[cfg(test)]
mod test;

use anyhow::Context;
use logger::Logger;
use logger_srcfile::WrapFileLogger;

pub use cfg::{LazyImportsConfig, LazyImportsJSONConfig};
pub use classify::{classify_imports, CandidateBinding, CandidateSet};
pub use error::LazyImportsError;
pub use pass::{LazyImportsPass, TransformedModule};
pub use program::{normalise_path, SourceProgram};
pub use prune::{prune_imports, PruneOutput};
pub use report::ModuleReport;
pub use resolver::{
    BindingSite, CallSignatureInfo, ExportName, StaticTypeResolver, TypeResolver,
};
pub use rewrite::{rewrite_call_sites, RewriteOutput};
pub use scope::{ScopeFrame, ShadowCollector};

/// One source file after the pass, printed back to text.
#[derive(Debug, Clone)]
pub struct TransformedSource {
    pub path: String,
    pub code: String,
    pub report: ModuleReport,
}

/// Parses `sources` as one program, defers the async imports of every file
/// against the others, and prints the results in input order.
pub fn transform_sources(
    logger: impl Logger,
    sources: &[(&str, &str)],
    config: LazyImportsJSONConfig,
) -> Result<Vec<TransformedSource>, anyhow::Error> {
    let mut program = SourceProgram::new();
    let mut parsed = Vec::with_capacity(sources.len());
    for (path, text) in sources {
        let (cm, module) = swc_utils_parse::parse_ecma_src(*path, *text).map_err(|err| {
            LazyImportsError::Parse {
                path: path.to_string(),
                message: swc_utils_parse::describe_parse_error(&err),
            }
        })?;
        program.add_module(path, module.clone());
        parsed.push((*path, cm, module));
    }

    let pass = LazyImportsPass::from_json_config(Some(&program), config)?;
    parsed
        .into_iter()
        .map(|(path, cm, module)| {
            let file_logger = WrapFileLogger::new(cm.clone(), &logger);
            let transformed = pass.transform_module(path, module, &file_logger);
            let code = normalize_src::ast_to_str(
                &cm,
                &transformed.module,
                normalize_src::ModulePrintArgs::default(),
            )
            .with_context(|| format!("printing {}", path))?;
            Ok(TransformedSource {
                path: path.to_string(),
                code,
                report: transformed.report,
            })
        })
        .collect()
}

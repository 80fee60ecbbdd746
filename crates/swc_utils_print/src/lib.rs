use anyhow::Context;
use swc_common::comments::{Comments, SingleThreadedComments};
use swc_common::sync::Lrc;
use swc_common::SourceMap;
use swc_compiler_base::PrintArgs;
use swc_ecma_ast::Module;

pub use swc_compiler_base::PrintArgs as ModulePrintArgs;

/// Prints a module with the source map it was parsed with.
pub fn ast_to_str(
    cm: &Lrc<SourceMap>,
    module: &Module,
    print_args: PrintArgs<'_>,
) -> Result<String, anyhow::Error> {
    let output = swc_compiler_base::print(cm.clone(), module, print_args)
        .context("failed to print module")?;
    Ok(output.code)
}

/// Round-trips `src` through the parser and printer, so that hand-written
/// expectations compare equal to printed trees regardless of formatting.
pub fn normalise_src(src: &str, print_args: PrintArgs) -> Result<String, anyhow::Error> {
    let mut pargs = print_args;

    // Backup value for comments in case it is not provided.
    //
    // Declared at the function level so it outlives `pargs`, which borrows it.
    let own_comments: Option<SingleThreadedComments>;
    if pargs.comments.is_none() {
        own_comments = Some(SingleThreadedComments::default());
        pargs.comments = own_comments.as_ref().map(|c| c as &dyn Comments);
    }

    let (cm, parsed) = swc_utils_parse::parse_ecma_src_comments("test.ts", src, pargs.comments)
        .map_err(|err| {
            anyhow::anyhow!(
                "failed to parse source: {}",
                swc_utils_parse::describe_parse_error(&err)
            )
        })?;
    ast_to_str(&cm, &parsed, pargs)
}

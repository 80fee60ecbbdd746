use std::path::PathBuf;

use swc_common::comments::Comments;
use swc_common::sync::Lrc;
use swc_common::{FileName, SourceFile, SourceMap};
use swc_ecma_ast::Module;
use swc_ecma_parser::{lexer::Lexer, StringInput, Syntax};
use swc_ecma_parser::{Capturing, Parser, TsSyntax};

pub use swc_ecma_parser::error::Error as ParseError;

pub fn create_lexer<'a>(fm: &'a SourceFile, comments: Option<&'a dyn Comments>) -> Lexer<'a> {
    let filename = fm.name.to_string();
    Lexer::new(
        Syntax::Typescript(TsSyntax {
            tsx: filename.ends_with(".tsx") || filename.ends_with(".jsx"),
            dts: filename.ends_with(".d.ts"),
            decorators: true,
            ..Default::default()
        }),
        Default::default(),
        StringInput::from(fm),
        comments,
    )
}

pub fn create_parser<'a>(
    fm: &'a Lrc<SourceFile>,
    comments: Option<&'a dyn Comments>,
) -> Parser<Capturing<Lexer<'a>>> {
    let lexer = create_lexer(fm, comments);
    let capturing = Capturing::new(lexer);

    Parser::new_from(capturing)
}

pub fn parse_ecma_src<TName, TBody>(
    name_str: TName,
    body: TBody,
) -> Result<(Lrc<SourceMap>, Module), ParseError>
where
    TName: Into<String>,
    TBody: ToString,
{
    parse_ecma_src_comments(name_str, body, None)
}

/// Parses `body` as a TypeScript module into a fresh source map.
///
/// The source map is returned alongside the module, since printing the module
/// and resolving spans for diagnostics both need it.
pub fn parse_ecma_src_comments<TName, TBody>(
    name_str: TName,
    body: TBody,
    comments: Option<&dyn Comments>,
) -> Result<(Lrc<SourceMap>, Module), ParseError>
where
    TName: Into<String>,
    TBody: ToString,
{
    let cm = Lrc::<SourceMap>::default();
    let fname: Lrc<FileName> = Lrc::new(FileName::Real(PathBuf::from(name_str.into())));
    let fm = cm.new_source_file(fname, body.to_string());

    let mut parser = create_parser(&fm, comments);
    let module = parser.parse_typescript_module()?;

    Ok((cm, module))
}

/// Human readable message for a parse failure, e.g. for error types that
/// should not carry swc's error type around.
pub fn describe_parse_error(err: &ParseError) -> String {
    err.kind().msg().to_string()
}

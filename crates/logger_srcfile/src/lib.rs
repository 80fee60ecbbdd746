use std::{borrow::Borrow, fmt::Display};

use logger::Logger;
use swc_common::{SourceMap, Span};

/// A logger that knows which source file it is reporting on.
pub trait SrcFileLogger: Logger {
    fn src_warn(&self, location: &Span, message: impl Display);
    fn src_error(&self, location: &Span, message: impl Display);
}

/// Resolves spans to `file:line:col` through the source map the module was parsed with.
#[derive(Clone)]
pub struct WrapFileLogger<TSrcMap, TLogger> {
    source_map: TSrcMap,
    inner_logger: TLogger,
}
impl<TSourceMap: Borrow<SourceMap> + Clone, TLogger: Logger> WrapFileLogger<TSourceMap, TLogger> {
    pub fn new(source_map: TSourceMap, inner_logger: TLogger) -> Self {
        Self {
            source_map,
            inner_logger,
        }
    }

    fn format_location(&self, location: &Span, message: impl Display) -> String {
        let loc = self.source_map.borrow().lookup_char_pos(location.lo);
        format!(
            "{}:{}:{} :: {}",
            loc.file.name, loc.line, loc.col_display, message,
        )
    }
}
impl<TSourceMap: Borrow<SourceMap> + Clone, TLogger: Logger> Logger
    for WrapFileLogger<TSourceMap, TLogger>
{
    fn log(&self, message: impl Display) {
        self.inner_logger.log(message);
    }
    fn error(&self, message: impl Display) {
        self.inner_logger.error(message);
    }
    fn warn(&self, message: impl Display) {
        self.inner_logger.warn(message);
    }
}
impl<TSourceMap: Borrow<SourceMap> + Clone, TLogger: Logger> SrcFileLogger
    for WrapFileLogger<TSourceMap, TLogger>
{
    fn src_warn(&self, location: &Span, message: impl Display) {
        self.warn(self.format_location(location, message));
    }
    fn src_error(&self, location: &Span, message: impl Display) {
        self.error(self.format_location(location, message));
    }
}

/// Used when the source map is not at hand (e.g. trees handed over by a host
/// compiler). Messages are prefixed with the module path only.
#[derive(Clone)]
pub struct SimpleSourceFileLogger<'a, TLogger: Logger> {
    source_file_path: &'a str,
    inner_logger: TLogger,
}
impl<'a, TLogger: Logger> SimpleSourceFileLogger<'a, TLogger> {
    pub fn new(source_file_path: &'a str, inner_logger: TLogger) -> Self {
        Self {
            source_file_path,
            inner_logger,
        }
    }
}
impl<TLogger: Logger> Logger for SimpleSourceFileLogger<'_, TLogger> {
    fn log(&self, message: impl Display) {
        self.inner_logger.log(message);
    }
    fn error(&self, message: impl Display) {
        self.inner_logger.error(message);
    }
    fn warn(&self, message: impl Display) {
        self.inner_logger.warn(message);
    }
}
impl<TLogger: Logger> SrcFileLogger for SimpleSourceFileLogger<'_, TLogger> {
    fn src_warn(&self, _location: &Span, message: impl Display) {
        self.warn(format!("{} :: {}", self.source_file_path, message));
    }
    fn src_error(&self, _location: &Span, message: impl Display) {
        self.error(format!("{} :: {}", self.source_file_path, message));
    }
}

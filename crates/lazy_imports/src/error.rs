#[derive(Debug, thiserror::Error)]
pub enum LazyImportsError {
    #[error("No type resolution context was passed to the lazy imports pass")]
    MissingTypeContext,
    #[error("Invalid skip glob {glob:?}: {source}")]
    InvalidSkipGlob {
        glob: String,
        #[source]
        source: globset::Error,
    },
    #[error("Configured module parameter {0:?} is not a valid identifier")]
    InvalidModuleParam(String),
    #[error("Failed to parse {path}: {message}")]
    Parse { path: String, message: String },
}

use path_clean::clean;

const EXTENSIONS: [&str; 7] = [".ts", ".tsx", ".d.ts", ".js", ".jsx", ".mts", ".mjs"];

/// Normalises a module path for use as a lookup key.
pub fn normalise_path(path: &str) -> String {
    clean(&path.replace('\\', "/"))
}

pub fn is_relative(specifier: &str) -> bool {
    specifier == "."
        || specifier == ".."
        || specifier.starts_with("./")
        || specifier.starts_with("../")
}

/// Paths a specifier may refer to, most specific first.
///
/// Relative specifiers are resolved against the importer's directory and tried
/// as written, with each known extension, then as a directory index.
/// Bare specifiers are only tried verbatim.
pub fn candidate_paths(importer: &str, specifier: &str) -> Vec<String> {
    if !is_relative(specifier) {
        return vec![specifier.to_string()];
    }

    let importer = normalise_path(importer);
    let joined = match importer.rfind('/') {
        Some(idx) => format!("{}/{}", &importer[..idx], specifier),
        None => specifier.to_string(),
    };
    let base = normalise_path(&joined);

    let mut paths = Vec::with_capacity(1 + EXTENSIONS.len() * 2);
    paths.push(base.clone());
    paths.extend(EXTENSIONS.iter().map(|ext| format!("{}{}", base, ext)));
    paths.extend(EXTENSIONS.iter().map(|ext| format!("{}/index{}", base, ext)));
    paths
}

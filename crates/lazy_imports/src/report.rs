use serde::Serialize;

/// Summary of what the pass did to one module.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleReport {
    pub importer: String,
    /// Local names of the imports classified as async functions
    pub candidates: Vec<String>,
    pub rewritten_calls: usize,
    /// Local names whose import bindings were removed
    pub dropped: Vec<String>,
    pub removed_statements: usize,
    /// Every candidate was still referenced, so imports were left alone
    pub short_circuited: bool,
}

impl ModuleReport {
    pub fn unchanged(importer: &str) -> Self {
        Self {
            importer: importer.to_string(),
            ..Default::default()
        }
    }

    pub fn is_unchanged(&self) -> bool {
        self.rewritten_calls == 0 && self.dropped.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::ModuleReport;
    use pretty_assertions::assert_eq;

    #[test]
    fn serializes_camel_case() {
        let report = ModuleReport {
            importer: "src/file2.ts".to_string(),
            candidates: vec!["x".to_string()],
            rewritten_calls: 2,
            dropped: vec!["x".to_string()],
            removed_statements: 1,
            short_circuited: false,
        };
        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            serde_json::json!({
                "importer": "src/file2.ts",
                "candidates": ["x"],
                "rewrittenCalls": 2,
                "dropped": ["x"],
                "removedStatements": 1,
                "shortCircuited": false,
            })
        );
    }

    #[test]
    fn unchanged_report() {
        let report = ModuleReport::unchanged("a.ts");
        assert!(report.is_unchanged());
        assert_eq!(report.importer, "a.ts");
    }
}

use logger::{TracingLogger, VecLogger};
use normalize_src::normalise_src;
use tracing_test::traced_test;

use crate::{transform_sources, LazyImportsJSONConfig, TransformedSource};

fn compile(sources: &[(&str, &str)]) -> Vec<TransformedSource> {
    compile_with_config(sources, LazyImportsJSONConfig::default())
}

fn compile_with_config(
    sources: &[(&str, &str)],
    config: LazyImportsJSONConfig,
) -> Vec<TransformedSource> {
    let logger = VecLogger::new();
    transform_sources(&logger, sources, config).unwrap()
}

fn expect_output(results: &[TransformedSource], path: &str, expected: &str) {
    let result = results
        .iter()
        .find(|result| result.path == path)
        .unwrap_or_else(|| panic!("no output for {}", path));
    assert_eq!(
        format!("{}:\n{}", path, result.code),
        format!(
            "{}:\n{}",
            path,
            normalise_src(expected, Default::default()).unwrap()
        )
    );
}

const ASYNC_X: &str = r#"
export async function x() {
    return true;
}
"#;

#[test]
fn single_async_import_removes_import() {
    let results = compile(&[
        ("file1.ts", ASYNC_X),
        (
            "file2.ts",
            r#"
            import { x } from "./file1";

            async function init() {
                const y = await x();
            }
            init();
            "#,
        ),
    ]);

    expect_output(&results, "file1.ts", ASYNC_X);
    expect_output(
        &results,
        "file2.ts",
        r#"
        async function init() {
            const y = await import("./file1").then((m) => m.x());
        }
        init();
        "#,
    );
}

#[test]
fn double_async_import_removes_import() {
    let results = compile(&[
        (
            "file1.ts",
            r#"
            export async function x() { return true; }
            export async function y() { return true; }
            "#,
        ),
        (
            "file2.ts",
            r#"
            import { x, y } from "./file1";

            async function init() {
                const z = await x();
                const q = await y();
            }
            init();
            "#,
        ),
    ]);

    expect_output(
        &results,
        "file2.ts",
        r#"
        async function init() {
            const z = await import("./file1").then((m) => m.x());
            const q = await import("./file1").then((m) => m.y());
        }
        init();
        "#,
    );
}

#[test]
fn default_and_named_async_imports_are_removed() {
    let results = compile(&[
        (
            "file1.ts",
            r#"
            export default async function () { return true; }
            export async function x() { return true; }
            export async function y() { return true; }
            "#,
        ),
        (
            "file2.ts",
            r#"
            import w, { x, y } from "./file1";

            async function init() {
                const o = await w();
                const z = await x();
                const q = await y();
            }
            init();
            "#,
        ),
    ]);

    expect_output(
        &results,
        "file2.ts",
        r#"
        async function init() {
            const o = await import("./file1").then((m) => m.default());
            const z = await import("./file1").then((m) => m.x());
            const q = await import("./file1").then((m) => m.y());
        }
        init();
        "#,
    );
}

#[test]
fn aliased_import_calls_the_original_export() {
    let results = compile(&[
        ("file1.ts", ASYNC_X),
        (
            "file2.ts",
            r#"
            import { x as y } from "./file1";

            async function init() {
                const z = await y();
            }
            init();
            "#,
        ),
    ]);

    expect_output(
        &results,
        "file2.ts",
        r#"
        async function init() {
            const z = await import("./file1").then((m) => m.x());
        }
        init();
        "#,
    );
}

#[test]
fn sync_import_from_the_same_module_is_kept() {
    let results = compile(&[
        (
            "file1.ts",
            r#"
            export async function x() { return true; }
            export function y() { return false; }
            "#,
        ),
        (
            "file2.ts",
            r#"
            import { x, y } from "./file1";
            async function init() {
                const z = await x();
            }
            init();
            y();
            "#,
        ),
    ]);

    expect_output(
        &results,
        "file2.ts",
        r#"
        import { y } from "./file1";
        async function init() {
            const z = await import("./file1").then((m) => m.x());
        }
        init();
        y();
        "#,
    );
    assert_eq!(results[1].report.candidates, vec!["x".to_string()]);
}

#[test]
fn async_const_arrow_import_is_removed() {
    let results = compile(&[
        (
            "file1.ts",
            r#"
            export const x = async () => {
                return true;
            };
            "#,
        ),
        (
            "file2.ts",
            r#"
            import { x } from "./file1";

            async function init() {
                const y = await x();
            }
            init();
            "#,
        ),
    ]);

    expect_output(
        &results,
        "file2.ts",
        r#"
        async function init() {
            const y = await import("./file1").then((m) => m.x());
        }
        init();
        "#,
    );
}

#[test]
fn default_async_arrow_import_is_removed() {
    let results = compile(&[
        (
            "file1.ts",
            r#"
            export default async () => {
                return true;
            };
            "#,
        ),
        (
            "file2.ts",
            r#"
            import x from "./file1";

            async function init() {
                const y = await x();
            }
            init();
            "#,
        ),
    ]);

    expect_output(
        &results,
        "file2.ts",
        r#"
        async function init() {
            const y = await import("./file1").then((m) => m.default());
        }
        init();
        "#,
    );
}

#[test]
fn default_import_used_as_a_value_is_kept() {
    let results = compile(&[
        (
            "file1.ts",
            r#"
            export default async () => {
                return true;
            };
            "#,
        ),
        (
            "file2.ts",
            r#"
            import x from "./file1";
            async function init() {
                const y = await x();
            }
            function z(y: any) {
                return y;
            }
            init();
            z(x);
            "#,
        ),
    ]);

    expect_output(
        &results,
        "file2.ts",
        r#"
        import x from "./file1";
        async function init() {
            const y = await import("./file1").then((m) => m.default());
        }
        function z(y: any) {
            return y;
        }
        init();
        z(x);
        "#,
    );
    assert!(results[1].report.short_circuited);
}

#[test]
fn named_import_used_as_a_value_is_kept() {
    let results = compile(&[
        (
            "file1.ts",
            r#"
            export async function x() { return true; }
            export function q(x: any) { return x; }
            "#,
        ),
        (
            "file2.ts",
            r#"
            import { x, q } from "./file1";

            async function init() {
                const y = await x();
            }
            init();
            q(x);
            "#,
        ),
    ]);

    expect_output(
        &results,
        "file2.ts",
        r#"
        import { x, q } from "./file1";
        async function init() {
            const y = await import("./file1").then((m) => m.x());
        }
        init();
        q(x);
        "#,
    );
}

#[test]
fn shadowing_parameters_and_locals_still_remove_the_import() {
    let results = compile(&[
        (
            "file1.ts",
            r#"
            export default async function () { return true; }
            export async function x() { return true; }
            "#,
        ),
        (
            "file2.ts",
            r#"
            import y, { x } from "./file1";
            async function init() {
                const q = await y();
                const w = await x();
            }
            function z(y: any) {
                const x = 1;
                let i = 2;
                var o = 3;
                return { x, y };
            }
            init();
            "#,
        ),
    ]);

    expect_output(
        &results,
        "file2.ts",
        r#"
        async function init() {
            const q = await import("./file1").then((m) => m.default());
            const w = await import("./file1").then((m) => m.x());
        }
        function z(y: any) {
            const x = 1;
            let i = 2;
            var o = 3;
            return { x, y };
        }
        init();
        "#,
    );
}

#[test]
fn re_exported_default_is_called_through_the_barrel() {
    let results = compile(&[
        (
            "file1.ts",
            r#"
            export default async () => {
                return true;
            };
            "#,
        ),
        ("file2.ts", r#"export { default as x } from "./file1";"#),
        (
            "file3.ts",
            r#"
            import { x } from "./file2";

            async function init() {
                const y = await x();
            }
            init();
            "#,
        ),
    ]);

    expect_output(
        &results,
        "file2.ts",
        r#"export { default as x } from "./file1";"#,
    );
    expect_output(
        &results,
        "file3.ts",
        r#"
        async function init() {
            const y = await import("./file2").then((m) => m.x());
        }
        init();
        "#,
    );
}

#[test]
fn promise_annotated_functions_in_nested_directories() {
    let results = compile(&[
        (
            "src/api/index.ts",
            r#"
            export function fetchUser(id: string): Promise<string> {
                return Promise.resolve(id);
            }
            "#,
        ),
        (
            "src/views/user.ts",
            r#"
            import { fetchUser } from "../api";
            export const show = (m: string) => fetchUser(m);
            "#,
        ),
    ]);

    expect_output(
        &results,
        "src/views/user.ts",
        r#"
        export const show = (m: string) => import("../api").then((m1) => m1.fetchUser(m));
        "#,
    );
}

#[test]
fn skipped_specifiers_are_left_alone() {
    let src = r#"
        import { x } from "./file1";
        x();
    "#;
    let results = compile_with_config(
        &[("file1.ts", ASYNC_X), ("file2.ts", src)],
        serde_json::from_str(r#"{ "skipSpecifiers": ["./file1"] }"#).unwrap(),
    );

    expect_output(&results, "file2.ts", src);
    assert!(results[1].report.is_unchanged());
}

#[test]
fn configured_module_param() {
    let results = compile_with_config(
        &[
            ("file1.ts", ASYNC_X),
            ("file2.ts", r#"import { x } from "./file1"; x();"#),
        ],
        serde_json::from_str(r#"{ "moduleParam": "mod" }"#).unwrap(),
    );

    expect_output(
        &results,
        "file2.ts",
        r#"import("./file1").then((mod) => mod.x());"#,
    );
}

#[test]
fn running_the_pass_twice_changes_nothing() {
    let first = compile(&[
        ("file1.ts", ASYNC_X),
        (
            "file2.ts",
            r#"
            import { x } from "./file1";
            async function init() {
                await x();
            }
            "#,
        ),
    ]);
    let once = first[1].code.clone();

    let second = compile(&[("file1.ts", ASYNC_X), ("file2.ts", &once)]);
    assert_eq!(second[1].code, once);
    assert!(second[1].report.candidates.is_empty());
}

#[test]
fn parse_errors_are_reported() {
    let logger = VecLogger::new();
    let err = transform_sources(
        &logger,
        &[("file1.ts", "export async function (")],
        LazyImportsJSONConfig::default(),
    )
    .unwrap_err();
    assert!(err.to_string().contains("file1.ts"));
}

#[traced_test]
#[test]
fn pipeline_events_are_traced() {
    transform_sources(
        TracingLogger,
        &[
            ("file1.ts", ASYNC_X),
            (
                "file2.ts",
                r#"
                import { x } from "./file1";
                x();
                export { x };
                "#,
            ),
        ],
        LazyImportsJSONConfig::default(),
    )
    .unwrap();

    assert!(logs_contain("candidates"));
    assert!(logs_contain("short-circuit"));
}

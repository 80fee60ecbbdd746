use ahashmap::AHashSet;
use swc_atoms::Atom;
use swc_ecma_ast::{
    ArrowExpr, Decl, DefaultDecl, ExportSpecifier, Expr, Function, ImportSpecifier,
    ModuleDecl, ModuleItem, Pat, Stmt, TsEntityName, TsFnOrConstructorType, TsType, TsTypeAnn,
    VarDeclarator,
};

use super::SourceProgram;
use crate::resolver::{CallSignatureInfo, ExportName};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum LookupKey {
    Export(ExportName),
    Local(Atom),
}

/// Walks export and import chains across the modules of a program to find
/// the declaration an export name refers to.
pub(super) struct SignatureLookup<'a> {
    program: &'a SourceProgram,
    visited: AHashSet<(String, LookupKey)>,
}

impl<'a> SignatureLookup<'a> {
    pub fn new(program: &'a SourceProgram) -> Self {
        Self {
            program,
            visited: AHashSet::default(),
        }
    }

    pub fn export_signature(&mut self, path: &str, export: &ExportName) -> Option<CallSignatureInfo> {
        if !self.visit(path, LookupKey::Export(export.clone())) {
            return None;
        }
        let program = self.program;
        let module = program.module(path)?;

        for item in &module.body {
            let module_decl = match item {
                ModuleItem::ModuleDecl(module_decl) => module_decl,
                ModuleItem::Stmt(_) => continue,
            };
            match module_decl {
                // export function x() {}
                // export const x = async () => {}
                ModuleDecl::ExportDecl(export_decl) => {
                    if let ExportName::Named(name) = export {
                        if let Some(found) = self.decl_signature(path, &export_decl.decl, name) {
                            return found;
                        }
                    }
                }
                // export default async function() {}
                ModuleDecl::ExportDefaultDecl(default_decl) if *export == ExportName::Default => {
                    return match &default_decl.decl {
                        DefaultDecl::Fn(fn_expr) => Some(function_signature(&fn_expr.function)),
                        DefaultDecl::Class(_) | DefaultDecl::TsInterfaceDecl(_) => None,
                    };
                }
                // export default async () => {}
                // export default x;
                ModuleDecl::ExportDefaultExpr(default_expr) if *export == ExportName::Default => {
                    return self.expr_signature(path, &default_expr.expr);
                }
                ModuleDecl::ExportNamed(named_export) => {
                    for specifier in &named_export.specifiers {
                        let (orig, exported) = match specifier {
                            ExportSpecifier::Named(named) => (
                                ExportName::from_module_export_name(&named.orig),
                                named
                                    .exported
                                    .as_ref()
                                    .map(ExportName::from_module_export_name),
                            ),
                            // `export * as ns from` and `export v from` name namespaces
                            // and defaults, neither of which we follow
                            ExportSpecifier::Namespace(_) | ExportSpecifier::Default(_) => continue,
                        };
                        if exported.as_ref().unwrap_or(&orig) != export {
                            continue;
                        }
                        return match &named_export.src {
                            // export { a as b } from "./file1"
                            Some(src) => {
                                let target = self.program.resolve(path, &src.value)?;
                                self.export_signature(&target, &orig)
                            }
                            // export { a as b }
                            None => match orig {
                                ExportName::Named(local) => self.local_signature(path, &local),
                                ExportName::Default => None,
                            },
                        };
                    }
                }
                _ => {}
            }
        }

        // explicit exports win over `export *`, which never forwards `default`
        if *export == ExportName::Default {
            return None;
        }
        for item in &module.body {
            if let ModuleItem::ModuleDecl(ModuleDecl::ExportAll(export_all)) = item {
                let target = match self.program.resolve(path, &export_all.src.value) {
                    Some(target) => target,
                    None => continue,
                };
                if let Some(found) = self.export_signature(&target, export) {
                    return Some(found);
                }
            }
        }
        None
    }

    /// Signature of a module-level binding, following it through imports.
    fn local_signature(&mut self, path: &str, name: &Atom) -> Option<CallSignatureInfo> {
        if !self.visit(path, LookupKey::Local(name.clone())) {
            return None;
        }
        let program = self.program;
        let module = program.module(path)?;

        for item in &module.body {
            let decl = match item {
                ModuleItem::Stmt(Stmt::Decl(decl)) => decl,
                ModuleItem::ModuleDecl(ModuleDecl::ExportDecl(export_decl)) => &export_decl.decl,
                ModuleItem::ModuleDecl(ModuleDecl::Import(import)) => {
                    if import.type_only {
                        continue;
                    }
                    for specifier in &import.specifiers {
                        let export = match specifier {
                            ImportSpecifier::Default(default_spec)
                                if default_spec.local.sym == *name =>
                            {
                                ExportName::Default
                            }
                            ImportSpecifier::Named(named)
                                if named.local.sym == *name && !named.is_type_only =>
                            {
                                match &named.imported {
                                    Some(imported) => ExportName::from_module_export_name(imported),
                                    None => ExportName::named(named.local.sym.clone()),
                                }
                            }
                            ImportSpecifier::Namespace(namespace)
                                if namespace.local.sym == *name =>
                            {
                                return None;
                            }
                            _ => continue,
                        };
                        let target = self.program.resolve(path, &import.src.value)?;
                        return self.export_signature(&target, &export);
                    }
                    continue;
                }
                _ => continue,
            };
            if let Some(found) = self.decl_signature(path, decl, name) {
                return found;
            }
        }
        None
    }

    /// `Some(..)` when `decl` declares `name`; the inner option is the
    /// signature, if the declaration has one.
    fn decl_signature(
        &mut self,
        path: &str,
        decl: &Decl,
        name: &Atom,
    ) -> Option<Option<CallSignatureInfo>> {
        match decl {
            Decl::Fn(fn_decl) if fn_decl.ident.sym == *name => {
                Some(Some(function_signature(&fn_decl.function)))
            }
            Decl::Var(var_decl) => var_decl
                .decls
                .iter()
                .find(|declarator| binds_name(declarator, name))
                .map(|declarator| self.declarator_signature(path, declarator)),
            Decl::Class(class_decl) if class_decl.ident.sym == *name => Some(None),
            _ => None,
        }
    }

    fn declarator_signature(
        &mut self,
        path: &str,
        declarator: &VarDeclarator,
    ) -> Option<CallSignatureInfo> {
        // const x: () => Promise<void> = ...
        if let Pat::Ident(binding) = &declarator.name {
            if let Some(type_ann) = &binding.type_ann {
                if let TsType::TsFnOrConstructorType(TsFnOrConstructorType::TsFnType(fn_type)) =
                    &*type_ann.type_ann
                {
                    return Some(CallSignatureInfo {
                        returns_deferred: returns_promise(Some(&*fn_type.type_ann)),
                    });
                }
            }
        }
        self.expr_signature(path, declarator.init.as_deref()?)
    }

    fn expr_signature(&mut self, path: &str, expr: &Expr) -> Option<CallSignatureInfo> {
        match expr {
            Expr::Arrow(arrow) => Some(arrow_signature(arrow)),
            Expr::Fn(fn_expr) => Some(function_signature(&fn_expr.function)),
            Expr::Ident(ident) => self.local_signature(path, &ident.sym),
            Expr::Paren(paren) => self.expr_signature(path, &paren.expr),
            _ => None,
        }
    }

    /// False if this lookup was already made, which means a cycle.
    fn visit(&mut self, path: &str, key: LookupKey) -> bool {
        self.visited.insert((path.to_string(), key))
    }
}

fn binds_name(declarator: &VarDeclarator, name: &Atom) -> bool {
    matches!(&declarator.name, Pat::Ident(binding) if binding.id.sym == *name)
}

fn function_signature(function: &Function) -> CallSignatureInfo {
    CallSignatureInfo {
        returns_deferred: (function.is_async && !function.is_generator)
            || returns_promise(function.return_type.as_deref()),
    }
}

fn arrow_signature(arrow: &ArrowExpr) -> CallSignatureInfo {
    CallSignatureInfo {
        returns_deferred: arrow.is_async || returns_promise(arrow.return_type.as_deref()),
    }
}

/// `Promise<T>`
fn returns_promise(return_type: Option<&TsTypeAnn>) -> bool {
    match return_type.map(|ann| &*ann.type_ann) {
        Some(TsType::TsTypeRef(type_ref)) => {
            matches!(&type_ref.type_name, TsEntityName::Ident(ident) if &*ident.sym == "Promise")
        }
        _ => false,
    }
}

#[cfg(test)]
mod test {
    use crate::program::SourceProgram;
    use crate::resolver::{CallSignatureInfo, ExportName};
    use pretty_assertions::assert_eq;

    fn program(files: &[(&str, &str)]) -> SourceProgram {
        let mut program = SourceProgram::new();
        for (path, text) in files {
            program.add_source(path, text).unwrap();
        }
        program
    }

    fn lookup(program: &SourceProgram, path: &str, export: ExportName) -> Option<bool> {
        program
            .export_signature(path, &export)
            .map(|info| info.returns_deferred)
    }

    #[test]
    fn function_declarations() {
        let p = program(&[(
            "file1.ts",
            r#"
            export async function a() {}
            export function b(): Promise<number> { return Promise.resolve(1); }
            export function c() {}
            export async function* d() {}
            export declare function e(): Promise<void>;
            export class F {}
            "#,
        )]);
        assert_eq!(lookup(&p, "file1.ts", ExportName::named("a")), Some(true));
        assert_eq!(lookup(&p, "file1.ts", ExportName::named("b")), Some(true));
        assert_eq!(lookup(&p, "file1.ts", ExportName::named("c")), Some(false));
        assert_eq!(lookup(&p, "file1.ts", ExportName::named("d")), Some(false));
        assert_eq!(lookup(&p, "file1.ts", ExportName::named("e")), Some(true));
        assert_eq!(lookup(&p, "file1.ts", ExportName::named("F")), None);
        assert_eq!(lookup(&p, "file1.ts", ExportName::named("missing")), None);
    }

    #[test]
    fn variable_declarations() {
        let p = program(&[(
            "file1.ts",
            r#"
            export const a = async () => {};
            export const b = function (): Promise<void> { return Promise.resolve(); };
            export let c: (n: number) => Promise<string>;
            export const d = 1;
            export const e = () => 1;
            "#,
        )]);
        assert_eq!(lookup(&p, "file1.ts", ExportName::named("a")), Some(true));
        assert_eq!(lookup(&p, "file1.ts", ExportName::named("b")), Some(true));
        assert_eq!(lookup(&p, "file1.ts", ExportName::named("c")), Some(true));
        assert_eq!(lookup(&p, "file1.ts", ExportName::named("d")), None);
        assert_eq!(lookup(&p, "file1.ts", ExportName::named("e")), Some(false));
    }

    #[test]
    fn default_exports() {
        let fn_default = program(&[("a.ts", "export default async function () {}")]);
        assert_eq!(lookup(&fn_default, "a.ts", ExportName::Default), Some(true));

        let arrow_default = program(&[("a.ts", "export default async () => {};")]);
        assert_eq!(lookup(&arrow_default, "a.ts", ExportName::Default), Some(true));

        let ident_default = program(&[(
            "a.ts",
            r#"
            const load = async () => {};
            export default load;
            "#,
        )]);
        assert_eq!(lookup(&ident_default, "a.ts", ExportName::Default), Some(true));
    }

    #[test]
    fn local_export_lists_and_re_exports() {
        let p = program(&[
            (
                "file1.ts",
                r#"
                async function inner() {}
                export { inner as renamed };
                export default async function () {}
                "#,
            ),
            (
                "file2.ts",
                r#"
                export { default as x, renamed } from "./file1";
                "#,
            ),
            ("barrel/index.ts", r#"export * from "../file1";"#),
            (
                "file3.ts",
                r#"
                import { renamed as y } from "./file2";
                export { y };
                "#,
            ),
        ]);
        assert_eq!(lookup(&p, "file1.ts", ExportName::named("renamed")), Some(true));
        assert_eq!(lookup(&p, "file1.ts", ExportName::named("inner")), None);
        assert_eq!(lookup(&p, "file2.ts", ExportName::named("x")), Some(true));
        assert_eq!(lookup(&p, "file2.ts", ExportName::named("renamed")), Some(true));
        assert_eq!(
            lookup(&p, "barrel/index.ts", ExportName::named("renamed")),
            Some(true)
        );
        assert_eq!(lookup(&p, "barrel/index.ts", ExportName::Default), None);
        assert_eq!(lookup(&p, "file3.ts", ExportName::named("y")), Some(true));
    }

    #[test]
    fn overloads_use_the_first_signature() {
        let p = program(&[(
            "file1.ts",
            r#"
            export function load(id: string): Promise<string>;
            export function load(id: number): Promise<number>;
            export function load(id: any): any { return Promise.resolve(id); }
            "#,
        )]);
        assert_eq!(
            p.export_signature("file1.ts", &ExportName::named("load")),
            Some(CallSignatureInfo::deferred())
        );
    }

    #[test]
    fn export_cycles_terminate() {
        let p = program(&[
            ("a.ts", r#"export * from "./b";"#),
            ("b.ts", r#"export * from "./a";"#),
            ("c.ts", r#"export { x } from "./c";"#),
        ]);
        assert_eq!(lookup(&p, "a.ts", ExportName::named("x")), None);
        assert_eq!(lookup(&p, "c.ts", ExportName::named("x")), None);
    }
}

use ahashmap::AHashSet;
use swc_atoms::Atom;
use swc_ecma_ast::{
    ArrowExpr, BlockStmt, Class, Constructor, Decl, Function, ObjectPatProp, ParamOrTsParamProp,
    Pat, Stmt, TsParamPropParam, VarDecl, VarDeclKind, VarDeclOrExpr,
};
use swc_ecma_visit::{Visit, VisitWith};

use crate::classify::CandidateSet;

/// One lexical scope of the rewrite walk.
///
/// `shadowed` holds the candidate names this scope re-declares.
/// `still_needed` accumulates candidate names referenced inside this scope
/// (including merged children) outside of a rewritten call.
#[derive(Debug, Default)]
pub struct ScopeFrame {
    shadowed: AHashSet<Atom>,
    still_needed: AHashSet<Atom>,
}

impl ScopeFrame {
    pub fn new(shadowed: AHashSet<Atom>) -> Self {
        Self {
            shadowed,
            still_needed: AHashSet::default(),
        }
    }

    pub fn shadows(&self, name: &Atom) -> bool {
        self.shadowed.contains(name)
    }

    pub fn mark_still_needed(&mut self, name: Atom) {
        self.still_needed.insert(name);
    }

    /// Closes this frame, returning the names that escape into the parent frame.
    ///
    /// Names the frame shadows refer to the local declaration, not the import,
    /// so they never escape.
    pub fn into_escaping(self) -> AHashSet<Atom> {
        let ScopeFrame {
            shadowed,
            mut still_needed,
        } = self;
        still_needed.retain(|name| !shadowed.contains(name));
        still_needed
    }

    pub fn merge_child(&mut self, escaping: AHashSet<Atom>) {
        self.still_needed.extend(escaping);
    }

    #[cfg(test)]
    pub fn still_needed(&self) -> &AHashSet<Atom> {
        &self.still_needed
    }
}

/// Collects the candidate names bound by a scope's declarations.
pub struct ShadowCollector<'a> {
    candidates: &'a CandidateSet,
    names: AHashSet<Atom>,
}

impl<'a> ShadowCollector<'a> {
    pub fn new(candidates: &'a CandidateSet) -> Self {
        Self {
            candidates,
            names: AHashSet::default(),
        }
    }

    pub fn finish(self) -> AHashSet<Atom> {
        self.names
    }

    pub fn add_name(&mut self, name: &Atom) {
        if self.candidates.contains(name) {
            self.names.insert(name.clone());
        }
    }

    /// Every identifier bound by a binding pattern, including
    /// destructured and defaulted ones.
    pub fn add_pattern(&mut self, pattern: &Pat) {
        match pattern {
            Pat::Ident(ident) => self.add_name(&ident.id.sym),
            Pat::Array(array_pat) => {
                for subpattern in array_pat.elems.iter().flatten() {
                    self.add_pattern(subpattern);
                }
            }
            Pat::Object(object_pat) => {
                for prop in &object_pat.props {
                    match prop {
                        ObjectPatProp::KeyValue(kv) => self.add_pattern(&kv.value),
                        // let { a = defaultValue } = destructured_object;
                        ObjectPatProp::Assign(assign_prop) => self.add_name(&assign_prop.key.id.sym),
                        ObjectPatProp::Rest(rest) => self.add_pattern(&rest.arg),
                    }
                }
            }
            Pat::Rest(rest_pat) => self.add_pattern(&rest_pat.arg),
            Pat::Assign(assign_pat) => self.add_pattern(&assign_pat.left),
            // assignment targets, not declarations
            Pat::Expr(_) | Pat::Invalid(_) => {}
        }
    }

    pub fn add_var_decl(&mut self, var_decl: &VarDecl) {
        for decl in &var_decl.decls {
            self.add_pattern(&decl.name);
        }
    }

    pub fn add_var_decl_or_expr(&mut self, init: &VarDeclOrExpr) {
        if let VarDeclOrExpr::VarDecl(var_decl) = init {
            self.add_var_decl(var_decl);
        }
    }

    /// Declarations made directly in a block, not in blocks nested inside it.
    pub fn add_block_decls(&mut self, block: &BlockStmt) {
        for stmt in &block.stmts {
            let decl = match stmt {
                Stmt::Decl(decl) => decl,
                _ => continue,
            };
            match decl {
                Decl::Var(var_decl) => self.add_var_decl(var_decl),
                Decl::Using(using_decl) => {
                    for decl in &using_decl.decls {
                        self.add_pattern(&decl.name);
                    }
                }
                Decl::Fn(fn_decl) => self.add_name(&fn_decl.ident.sym),
                Decl::Class(class_decl) => self.add_name(&class_decl.ident.sym),
                Decl::TsInterface(_)
                | Decl::TsTypeAlias(_)
                | Decl::TsEnum(_)
                | Decl::TsModule(_) => {}
            }
        }
    }

    pub fn add_function_params(&mut self, function: &Function) {
        for param in &function.params {
            self.add_pattern(&param.pat);
        }
    }

    pub fn add_arrow_params(&mut self, arrow: &ArrowExpr) {
        for param in &arrow.params {
            self.add_pattern(param);
        }
    }

    pub fn add_constructor_params(&mut self, constructor: &Constructor) {
        for param in &constructor.params {
            match param {
                ParamOrTsParamProp::Param(param) => self.add_pattern(&param.pat),
                ParamOrTsParamProp::TsParamProp(prop) => match &prop.param {
                    TsParamPropParam::Ident(ident) => self.add_name(&ident.id.sym),
                    TsParamPropParam::Assign(assign) => self.add_pattern(&assign.left),
                },
            }
        }
    }

    /// `var` declarations anywhere in a function body are hoisted to the
    /// function scope.
    pub fn add_hoisted_vars(&mut self, body: &BlockStmt) {
        body.visit_with(&mut VarHoistVisitor { collector: self });
    }
}

/// Finds `var` declarations of one function body, without entering nested
/// functions or classes, which hoist into their own scopes.
struct VarHoistVisitor<'a, 'b> {
    collector: &'a mut ShadowCollector<'b>,
}

impl Visit for VarHoistVisitor<'_, '_> {
    fn visit_var_decl(&mut self, node: &VarDecl) {
        if node.kind == VarDeclKind::Var {
            self.collector.add_var_decl(node);
        }
    }

    fn visit_function(&mut self, _node: &Function) {}

    fn visit_arrow_expr(&mut self, _node: &ArrowExpr) {}

    fn visit_class(&mut self, _node: &Class) {}
}

use ahashmap::AHashSet;
use swc_atoms::Atom;
use swc_common::{Span, DUMMY_SP};
use swc_ecma_ast::{
    ArrowExpr, BindingIdent, BlockStmt, BlockStmtOrExpr, CallExpr, Callee, CatchClause, ClassExpr,
    ComputedPropName, Constructor, Expr, ExprOrSpread, FnExpr, ForHead, ForInStmt, ForOfStmt,
    ForStmt, Function, GetterProp, Ident, IdentName, Import, ImportDecl, Lit, MemberExpr, MemberProp, Module,
    NamedExport, Pat, SetterProp, Str, TsTypeParamInstantiation,
};
use swc_ecma_visit::{Fold, FoldWith, Visit, VisitWith};

use crate::{
    cfg::LazyImportsConfig,
    classify::{CandidateBinding, CandidateSet},
    resolver::ExportName,
    scope::{ScopeFrame, ShadowCollector},
};

pub struct RewriteOutput {
    pub module: Module,
    /// Candidates referenced somewhere other than a rewritten call
    pub still_needed: AHashSet<Atom>,
    pub rewritten_calls: usize,
}

/// Replaces each call `f(a, b)` of a candidate `f` that is not shadowed at
/// the call site with `import("<path>").then((m)=>m.f(a, b))`.
pub fn rewrite_call_sites(
    module: Module,
    candidates: &CandidateSet,
    config: &LazyImportsConfig,
) -> RewriteOutput {
    let mut rewriter = CallSiteRewriter::new(candidates, &config.module_param);
    let module = module.fold_with(&mut rewriter);
    let (still_needed, rewritten_calls) = rewriter.finish();
    RewriteOutput {
        module,
        still_needed,
        rewritten_calls,
    }
}

struct CallSiteRewriter<'a> {
    candidates: &'a CandidateSet,
    module_param: &'a Atom,
    // frames[0] is the module scope, which shadows nothing
    frames: Vec<ScopeFrame>,
    rewritten_calls: usize,
}

impl<'a> CallSiteRewriter<'a> {
    fn new(candidates: &'a CandidateSet, module_param: &'a Atom) -> Self {
        Self {
            candidates,
            module_param,
            frames: vec![ScopeFrame::default()],
            rewritten_calls: 0,
        }
    }

    fn finish(mut self) -> (AHashSet<Atom>, usize) {
        let still_needed = self
            .frames
            .drain(..)
            .rev()
            .fold(AHashSet::default(), |escaping, mut frame| {
                frame.merge_child(escaping);
                frame.into_escaping()
            });
        (still_needed, self.rewritten_calls)
    }

    fn is_shadowed(&self, name: &Atom) -> bool {
        self.frames.iter().any(|frame| frame.shadows(name))
    }

    /// The candidate a bare identifier refers to, if it is not shadowed here.
    fn visible_candidate(&self, name: &Atom) -> Option<&'a CandidateBinding> {
        let candidate = self.candidates.get(name)?;
        if self.is_shadowed(name) {
            return None;
        }
        Some(candidate)
    }

    fn callee_candidate(&self, call: &CallExpr) -> Option<&'a CandidateBinding> {
        match &call.callee {
            Callee::Expr(callee) => match &**callee {
                Expr::Ident(ident) => self.visible_candidate(&ident.sym),
                _ => None,
            },
            Callee::Super(_) | Callee::Import(_) => None,
        }
    }

    fn record_reference(&mut self, name: &Atom) {
        if self.visible_candidate(name).is_none() {
            return;
        }
        if let Some(frame) = self.frames.last_mut() {
            frame.mark_still_needed(name.clone());
        }
    }

    fn shadow_collector(&self) -> ShadowCollector<'a> {
        ShadowCollector::new(self.candidates)
    }

    /// Runs `fold` inside a new frame, then merges whatever escapes the frame
    /// into the enclosing one.
    fn with_frame<T>(&mut self, shadowed: AHashSet<Atom>, fold: impl FnOnce(&mut Self) -> T) -> T {
        self.frames.push(ScopeFrame::new(shadowed));
        let result = fold(self);
        if let Some(frame) = self.frames.pop() {
            let escaping = frame.into_escaping();
            if let Some(parent) = self.frames.last_mut() {
                parent.merge_child(escaping);
            }
        }
        result
    }

    /// A function body: hoisted `var`s and direct declarations share one frame.
    fn fold_function_body(&mut self, body: BlockStmt) -> BlockStmt {
        let mut collector = self.shadow_collector();
        collector.add_hoisted_vars(&body);
        collector.add_block_decls(&body);
        self.with_frame(collector.finish(), |this| body.fold_children_with(this))
    }

    fn rewrite_call(&mut self, call: CallExpr, candidate: &CandidateBinding) -> Expr {
        let CallExpr {
            span,
            args,
            type_args,
            ..
        } = call;
        // checked before folding: callbacks of nested rewritten calls bind
        // their own parameter and never capture ours
        let module_param = free_module_param(self.module_param, &args);
        // nested candidate calls in the arguments are rewritten as well
        let args = args.fold_with(self);
        self.rewritten_calls += 1;
        deferred_call(span, candidate, module_param, args, type_args)
    }
}

impl Fold for CallSiteRewriter<'_> {
    // The binding sites of an import are declarations, not references.
    fn fold_import_decl(&mut self, node: ImportDecl) -> ImportDecl {
        node
    }

    // `export { x } from './other'` names another module's exports.
    fn fold_named_export(&mut self, node: NamedExport) -> NamedExport {
        if node.src.is_some() {
            return node;
        }
        node.fold_children_with(self)
    }

    fn fold_expr(&mut self, node: Expr) -> Expr {
        match node {
            Expr::Call(call) => match self.callee_candidate(&call) {
                Some(candidate) => self.rewrite_call(call, candidate),
                None => Expr::Call(call.fold_children_with(self)),
            },
            _ => node.fold_children_with(self),
        }
    }

    fn fold_ident(&mut self, node: Ident) -> Ident {
        self.record_reference(&node.sym);
        node
    }

    // Parameter defaults cannot see the body's declarations, so the body
    // gets a frame of its own inside the parameter frame.
    fn fold_function(&mut self, node: Function) -> Function {
        let mut collector = self.shadow_collector();
        collector.add_function_params(&node);
        self.with_frame(collector.finish(), |this| Function {
            params: node.params.fold_with(this),
            decorators: node.decorators.fold_with(this),
            type_params: node.type_params.fold_with(this),
            return_type: node.return_type.fold_with(this),
            body: node.body.map(|body| this.fold_function_body(body)),
            ..node
        })
    }

    // `const f = function x() { x() }` binds `x` inside the function only
    fn fold_fn_expr(&mut self, node: FnExpr) -> FnExpr {
        let mut collector = self.shadow_collector();
        if let Some(ident) = &node.ident {
            collector.add_name(&ident.sym);
        }
        self.with_frame(collector.finish(), |this| node.fold_children_with(this))
    }

    // `const C = class x { m() { x() } }` binds `x` inside the class only
    fn fold_class_expr(&mut self, node: ClassExpr) -> ClassExpr {
        let mut collector = self.shadow_collector();
        if let Some(ident) = &node.ident {
            collector.add_name(&ident.sym);
        }
        self.with_frame(collector.finish(), |this| node.fold_children_with(this))
    }

    fn fold_arrow_expr(&mut self, node: ArrowExpr) -> ArrowExpr {
        let mut collector = self.shadow_collector();
        collector.add_arrow_params(&node);
        self.with_frame(collector.finish(), |this| ArrowExpr {
            params: node.params.fold_with(this),
            type_params: node.type_params.fold_with(this),
            return_type: node.return_type.fold_with(this),
            body: Box::new(match *node.body {
                BlockStmtOrExpr::BlockStmt(body) => {
                    BlockStmtOrExpr::BlockStmt(this.fold_function_body(body))
                }
                BlockStmtOrExpr::Expr(expr) => BlockStmtOrExpr::Expr(expr.fold_with(this)),
            }),
            ..node
        })
    }

    fn fold_constructor(&mut self, node: Constructor) -> Constructor {
        let mut collector = self.shadow_collector();
        collector.add_constructor_params(&node);
        // computed keys are evaluated outside the constructor
        let key = node.key.fold_with(self);
        self.with_frame(collector.finish(), |this| Constructor {
            key,
            params: node.params.fold_with(this),
            body: node.body.map(|body| this.fold_function_body(body)),
            ..node
        })
    }

    fn fold_getter_prop(&mut self, node: GetterProp) -> GetterProp {
        GetterProp {
            key: node.key.fold_with(self),
            body: node.body.map(|body| self.fold_function_body(body)),
            ..node
        }
    }

    fn fold_setter_prop(&mut self, node: SetterProp) -> SetterProp {
        let key = node.key.fold_with(self);
        let mut collector = self.shadow_collector();
        collector.add_pattern(&node.param);
        self.with_frame(collector.finish(), |this| SetterProp {
            key,
            param: node.param.fold_with(this),
            body: node.body.map(|body| this.fold_function_body(body)),
            ..node
        })
    }

    fn fold_block_stmt(&mut self, node: BlockStmt) -> BlockStmt {
        let mut collector = self.shadow_collector();
        collector.add_block_decls(&node);
        self.with_frame(collector.finish(), |this| node.fold_children_with(this))
    }

    fn fold_catch_clause(&mut self, node: CatchClause) -> CatchClause {
        let mut collector = self.shadow_collector();
        if let Some(param) = &node.param {
            collector.add_pattern(param);
        }
        self.with_frame(collector.finish(), |this| node.fold_children_with(this))
    }

    fn fold_for_stmt(&mut self, node: ForStmt) -> ForStmt {
        let mut collector = self.shadow_collector();
        if let Some(init) = &node.init {
            collector.add_var_decl_or_expr(init);
        }
        self.with_frame(collector.finish(), |this| node.fold_children_with(this))
    }

    fn fold_for_in_stmt(&mut self, node: ForInStmt) -> ForInStmt {
        let mut collector = self.shadow_collector();
        add_for_head(&mut collector, &node.left);
        self.with_frame(collector.finish(), |this| node.fold_children_with(this))
    }

    fn fold_for_of_stmt(&mut self, node: ForOfStmt) -> ForOfStmt {
        let mut collector = self.shadow_collector();
        add_for_head(&mut collector, &node.left);
        self.with_frame(collector.finish(), |this| node.fold_children_with(this))
    }
}

fn add_for_head(collector: &mut ShadowCollector<'_>, head: &ForHead) {
    match head {
        ForHead::VarDecl(var_decl) => collector.add_var_decl(var_decl),
        ForHead::UsingDecl(using_decl) => {
            for decl in &using_decl.decls {
                collector.add_pattern(&decl.name);
            }
        }
        // `for (x of xs)` assigns to an existing binding
        ForHead::Pat(_) => {}
    }
}

/// `import("<path>").then((<param>)=><param>.<export>(...args))`
fn deferred_call(
    span: Span,
    candidate: &CandidateBinding,
    module_param: Atom,
    args: Vec<ExprOrSpread>,
    type_args: Option<Box<TsTypeParamInstantiation>>,
) -> Expr {
    let load_module = CallExpr {
        span: DUMMY_SP,
        callee: Callee::Import(Import {
            span: DUMMY_SP,
            phase: Default::default(),
        }),
        args: vec![ExprOrSpread {
            spread: None,
            expr: Box::new(Expr::Lit(Lit::Str(Str {
                span: DUMMY_SP,
                value: candidate.module_path.clone(),
                raw: None,
            }))),
        }],
        ..Default::default()
    };

    let invoke_export = CallExpr {
        span: DUMMY_SP,
        callee: Callee::Expr(Box::new(Expr::Member(MemberExpr {
            span: DUMMY_SP,
            obj: Box::new(Expr::Ident(Ident::new_no_ctxt(
                module_param.clone(),
                DUMMY_SP,
            ))),
            prop: export_prop(&candidate.export),
        }))),
        args,
        type_args,
        ..Default::default()
    };

    let callback = ArrowExpr {
        span: DUMMY_SP,
        params: vec![Pat::Ident(BindingIdent::from(Ident::new_no_ctxt(
            module_param,
            DUMMY_SP,
        )))],
        body: Box::new(BlockStmtOrExpr::Expr(Box::new(Expr::Call(invoke_export)))),
        ..Default::default()
    };

    Expr::Call(CallExpr {
        span,
        callee: Callee::Expr(Box::new(Expr::Member(MemberExpr {
            span: DUMMY_SP,
            obj: Box::new(Expr::Call(load_module)),
            prop: MemberProp::Ident(IdentName::new("then".into(), DUMMY_SP)),
        }))),
        args: vec![ExprOrSpread {
            spread: None,
            expr: Box::new(Expr::Arrow(callback)),
        }],
        ..Default::default()
    })
}

/// `m.x` for identifier-like export names, `m["a-b"]` otherwise.
fn export_prop(export: &ExportName) -> MemberProp {
    let name = export.as_str();
    if is_valid_ident_name(name) {
        return MemberProp::Ident(IdentName::new(name.into(), DUMMY_SP));
    }
    MemberProp::Computed(ComputedPropName {
        span: DUMMY_SP,
        expr: Box::new(Expr::Lit(Lit::Str(Str {
            span: DUMMY_SP,
            value: name.into(),
            raw: None,
        }))),
    })
}

pub(crate) fn is_valid_ident_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if Ident::is_valid_start(first) => chars.all(Ident::is_valid_continue),
        _ => false,
    }
}

/// The callback parameter must not capture a name the arguments refer to,
/// so `x(m)` becomes `.then((m1)=>m1.x(m))`.
fn free_module_param(preferred: &Atom, args: &[ExprOrSpread]) -> Atom {
    let mut used = UsedNames::default();
    for arg in args {
        arg.visit_with(&mut used);
    }
    if !used.names.contains(preferred) {
        return preferred.clone();
    }
    (1..)
        .map(|suffix| Atom::from(format!("{}{}", preferred, suffix)))
        .find(|candidate| !used.names.contains(candidate))
        .unwrap_or_else(|| preferred.clone())
}

#[derive(Default)]
struct UsedNames {
    names: AHashSet<Atom>,
}

impl Visit for UsedNames {
    fn visit_ident(&mut self, node: &Ident) {
        self.names.insert(node.sym.clone());
    }
}

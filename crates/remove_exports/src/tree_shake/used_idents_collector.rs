use std::collections::HashSet;

use swc_ecma_ast::{
    ArrowExpr, BlockStmt, BlockStmtOrExpr, BreakStmt, CatchClause, ClassExpr, Constructor,
    ContinueStmt, FnExpr, ForHead, ForInStmt, ForOfStmt, ForStmt, Function, GetterProp, Ident,
    LabeledStmt, ObjectPatProp, ParamOrTsParamProp, Pat, SetterProp, StaticBlock, SwitchStmt,
    TsParamPropParam, TsPropertySignature, VarDecl, VarDeclKind, VarDeclOrExpr,
};
use swc_ecma_visit::{Visit, VisitWith};

use crate::tree_shake::defined_idents_collector::{lexical_names, pat_names, var_names};

/// Collects every identifier read that is not bound by a scope opened inside
/// the visited node. The free names left over are candidates for top-level
/// bindings.
pub struct UsedIdentsCollector {
    pub used_idents: HashSet<String>,
    scopes: Vec<HashSet<String>>,
}

impl UsedIdentsCollector {
    pub fn new() -> Self {
        Self {
            used_idents: HashSet::new(),
            scopes: vec![],
        }
    }

    fn is_shadowed(&self, name: &str) -> bool {
        self.scopes.iter().any(|scope| scope.contains(name))
    }

    fn with_scope(&mut self, names: HashSet<String>, f: impl FnOnce(&mut Self)) {
        self.scopes.push(names);
        f(self);
        self.scopes.pop();
    }
}

/// Reads each name of a binding pattern depends on, in the order
/// `pat_idents` reports the names: the default values, computed keys and type
/// annotations on the path down to the name. The names the pattern binds are
/// not reads.
pub fn pat_path_reads(pat: &Pat) -> Vec<HashSet<String>> {
    let mut out = vec![];
    collect_pat_path_reads(pat, &HashSet::new(), &mut out);
    out
}

fn collect_pat_path_reads(
    pat: &Pat,
    inherited: &HashSet<String>,
    out: &mut Vec<HashSet<String>>,
) {
    let with = |visit: &dyn Fn(&mut UsedIdentsCollector)| {
        let mut collector = UsedIdentsCollector::new();
        visit(&mut collector);
        let mut reads = inherited.clone();
        reads.extend(collector.used_idents);
        reads
    };
    match pat {
        // a
        Pat::Ident(binding) => {
            out.push(with(&|collector| binding.type_ann.visit_with(collector)));
        }
        // [a, b = 1]
        Pat::Array(array_pat) => {
            let reads = with(&|collector| array_pat.type_ann.visit_with(collector));
            for elem in array_pat.elems.iter().flatten() {
                collect_pat_path_reads(elem, &reads, out);
            }
        }
        // [...a]
        Pat::Rest(rest_pat) => {
            let reads = with(&|collector| rest_pat.type_ann.visit_with(collector));
            collect_pat_path_reads(&rest_pat.arg, &reads, out);
        }
        // { a, [k]: b, c = 1, ...d }
        Pat::Object(obj_pat) => {
            let reads = with(&|collector| obj_pat.type_ann.visit_with(collector));
            for prop in &obj_pat.props {
                match prop {
                    ObjectPatProp::KeyValue(kv_prop) => {
                        let mut key_reads = reads.clone();
                        let mut collector = UsedIdentsCollector::new();
                        kv_prop.key.visit_with(&mut collector);
                        key_reads.extend(collector.used_idents);
                        collect_pat_path_reads(&kv_prop.value, &key_reads, out);
                    }
                    ObjectPatProp::Assign(assign_prop) => {
                        let mut collector = UsedIdentsCollector::new();
                        assign_prop.value.visit_with(&mut collector);
                        assign_prop.key.type_ann.visit_with(&mut collector);
                        let mut value_reads = reads.clone();
                        value_reads.extend(collector.used_idents);
                        out.push(value_reads);
                    }
                    ObjectPatProp::Rest(rest_prop) => {
                        collect_pat_path_reads(&rest_prop.arg, &reads, out);
                    }
                }
            }
        }
        // a = 1
        Pat::Assign(assign_pat) => {
            let reads = with(&|collector| assign_pat.right.visit_with(collector));
            collect_pat_path_reads(&assign_pat.left, &reads, out);
        }
        _ => {}
    }
}

fn block_scoped_names(var_decl: &VarDecl) -> HashSet<String> {
    if var_decl.kind == VarDeclKind::Var {
        return HashSet::new();
    }
    var_decl
        .decls
        .iter()
        .flat_map(|decl| pat_names(&decl.name))
        .collect()
}

fn for_head_names(head: &ForHead) -> HashSet<String> {
    match head {
        ForHead::VarDecl(var_decl) => block_scoped_names(var_decl),
        ForHead::UsingDecl(using_decl) => using_decl
            .decls
            .iter()
            .flat_map(|decl| pat_names(&decl.name))
            .collect(),
        _ => HashSet::new(),
    }
}

impl Visit for UsedIdentsCollector {
    fn visit_ident(&mut self, ident: &Ident) {
        let name = ident.sym.to_string();
        if !self.is_shadowed(&name) {
            self.used_idents.insert(name);
        }
    }

    fn visit_function(&mut self, function: &Function) {
        let mut names: HashSet<String> = function
            .params
            .iter()
            .flat_map(|param| pat_names(&param.pat))
            .collect();
        if let Some(body) = &function.body {
            names.extend(var_names(body));
        }
        self.with_scope(names, |collector| function.visit_children_with(collector));
    }

    fn visit_arrow_expr(&mut self, arrow: &ArrowExpr) {
        let mut names: HashSet<String> = arrow.params.iter().flat_map(pat_names).collect();
        if let BlockStmtOrExpr::BlockStmt(body) = &*arrow.body {
            names.extend(var_names(body));
        }
        self.with_scope(names, |collector| arrow.visit_children_with(collector));
    }

    // const f = function inner() { inner() };
    fn visit_fn_expr(&mut self, fn_expr: &FnExpr) {
        let names = fn_expr
            .ident
            .iter()
            .map(|ident| ident.sym.to_string())
            .collect();
        self.with_scope(names, |collector| fn_expr.function.visit_with(collector));
    }

    fn visit_class_expr(&mut self, class_expr: &ClassExpr) {
        let names = class_expr
            .ident
            .iter()
            .map(|ident| ident.sym.to_string())
            .collect();
        self.with_scope(names, |collector| class_expr.class.visit_with(collector));
    }

    fn visit_constructor(&mut self, constructor: &Constructor) {
        let mut names = HashSet::new();
        for param in &constructor.params {
            match param {
                ParamOrTsParamProp::Param(param) => names.extend(pat_names(&param.pat)),
                ParamOrTsParamProp::TsParamProp(prop) => match &prop.param {
                    TsParamPropParam::Ident(binding) => {
                        names.insert(binding.id.sym.to_string());
                    }
                    TsParamPropParam::Assign(assign) => names.extend(pat_names(&assign.left)),
                },
            }
        }
        if let Some(body) = &constructor.body {
            names.extend(var_names(body));
        }
        self.with_scope(names, |collector| {
            constructor.visit_children_with(collector)
        });
    }

    fn visit_getter_prop(&mut self, getter: &GetterProp) {
        let names = getter.body.as_ref().map(var_names).unwrap_or_default();
        self.with_scope(names, |collector| getter.visit_children_with(collector));
    }

    fn visit_setter_prop(&mut self, setter: &SetterProp) {
        let mut names: HashSet<String> = pat_names(&setter.param).collect();
        if let Some(body) = &setter.body {
            names.extend(var_names(body));
        }
        self.with_scope(names, |collector| setter.visit_children_with(collector));
    }

    fn visit_static_block(&mut self, block: &StaticBlock) {
        let names = var_names(&block.body);
        self.with_scope(names, |collector| block.visit_children_with(collector));
    }

    fn visit_block_stmt(&mut self, block: &BlockStmt) {
        let names = lexical_names(&block.stmts);
        self.with_scope(names, |collector| block.visit_children_with(collector));
    }

    fn visit_switch_stmt(&mut self, switch: &SwitchStmt) {
        switch.discriminant.visit_with(self);
        let names = lexical_names(switch.cases.iter().flat_map(|case| case.cons.iter()));
        self.with_scope(names, |collector| switch.cases.visit_with(collector));
    }

    fn visit_catch_clause(&mut self, catch: &CatchClause) {
        let names = catch.param.iter().flat_map(pat_names).collect();
        self.with_scope(names, |collector| catch.visit_children_with(collector));
    }

    fn visit_for_stmt(&mut self, for_stmt: &ForStmt) {
        let names = match &for_stmt.init {
            Some(VarDeclOrExpr::VarDecl(var_decl)) => block_scoped_names(var_decl),
            _ => HashSet::new(),
        };
        self.with_scope(names, |collector| for_stmt.visit_children_with(collector));
    }

    fn visit_for_in_stmt(&mut self, for_in: &ForInStmt) {
        let names = for_head_names(&for_in.left);
        self.with_scope(names, |collector| for_in.visit_children_with(collector));
    }

    fn visit_for_of_stmt(&mut self, for_of: &ForOfStmt) {
        let names = for_head_names(&for_of.left);
        self.with_scope(names, |collector| for_of.visit_children_with(collector));
    }

    // labels live in their own namespace
    fn visit_labeled_stmt(&mut self, labeled: &LabeledStmt) {
        labeled.body.visit_with(self);
    }

    fn visit_break_stmt(&mut self, _: &BreakStmt) {}

    fn visit_continue_stmt(&mut self, _: &ContinueStmt) {}

    // interface Props { user: User } only reads `User`
    fn visit_ts_property_signature(&mut self, signature: &TsPropertySignature) {
        if signature.computed {
            signature.key.visit_with(self);
        }
        signature.type_ann.visit_with(self);
    }
}

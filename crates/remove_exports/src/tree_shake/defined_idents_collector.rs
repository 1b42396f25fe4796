use std::collections::HashSet;

use swc_ecma_ast::{
    ArrowExpr, Class, Constructor, Decl, Expr, FnDecl, Function, Ident, ObjectPatProp, Pat, Stmt,
    TsModuleName, VarDecl, VarDeclKind,
};
use swc_ecma_visit::{Visit, VisitWith};

/// Collects the identifiers a binding pattern declares.
pub struct DefinedIdentsCollector {
    pub defined_idents: Vec<Ident>,
}

impl DefinedIdentsCollector {
    pub fn new() -> Self {
        Self {
            defined_idents: vec![],
        }
    }
}

impl Visit for DefinedIdentsCollector {
    fn visit_pat(&mut self, pat: &Pat) {
        match pat {
            // const x = 1;
            Pat::Ident(bi) => {
                self.defined_idents.push(bi.id.clone());
            }
            // const [x, , y = 1] = arr;
            Pat::Array(array_pat) => {
                for elem in array_pat.elems.iter().flatten() {
                    self.visit_pat(elem);
                }
            }
            // const [x, ...rest] = arr;
            Pat::Rest(rest_pat) => {
                self.visit_pat(&rest_pat.arg);
            }
            // const { x, y: z, w = 1, ...rest } = obj;
            Pat::Object(obj_pat) => {
                for prop in &obj_pat.props {
                    match prop {
                        ObjectPatProp::KeyValue(kv_prop) => {
                            self.visit_pat(&kv_prop.value);
                        }
                        ObjectPatProp::Assign(assign_prop) => {
                            self.defined_idents.push(assign_prop.key.id.clone());
                        }
                        ObjectPatProp::Rest(rest_prop) => {
                            self.visit_pat(&rest_prop.arg);
                        }
                    }
                }
            }
            Pat::Assign(assign_pat) => {
                self.visit_pat(&assign_pat.left);
            }
            _ => {}
        }
    }
}

pub fn pat_idents(pat: &Pat) -> Vec<Ident> {
    let mut collector = DefinedIdentsCollector::new();
    pat.visit_with(&mut collector);
    collector.defined_idents
}

pub fn pat_names(pat: &Pat) -> impl Iterator<Item = String> {
    pat_idents(pat).into_iter().map(|ident| ident.sym.to_string())
}

/// Names hoisted to the enclosing function scope by `var`. Does not descend
/// into nested functions or classes, which hoist into their own scope.
pub struct VarNamesCollector {
    pub names: HashSet<String>,
}

impl VarNamesCollector {
    pub fn new() -> Self {
        Self {
            names: HashSet::new(),
        }
    }
}

impl Visit for VarNamesCollector {
    fn visit_var_decl(&mut self, var_decl: &VarDecl) {
        if var_decl.kind == VarDeclKind::Var {
            for decl in &var_decl.decls {
                self.names.extend(pat_names(&decl.name));
            }
        }
    }

    fn visit_expr(&mut self, _: &Expr) {}

    fn visit_fn_decl(&mut self, _: &FnDecl) {}

    fn visit_function(&mut self, _: &Function) {}

    fn visit_arrow_expr(&mut self, _: &ArrowExpr) {}

    fn visit_class(&mut self, _: &Class) {}

    fn visit_constructor(&mut self, _: &Constructor) {}
}

pub fn var_names<N: VisitWith<VarNamesCollector> + ?Sized>(node: &N) -> HashSet<String> {
    let mut collector = VarNamesCollector::new();
    node.visit_with(&mut collector);
    collector.names
}

/// Names declared directly in a statement list with block scoping:
/// `let`, `const`, `using`, classes and function declarations.
pub fn lexical_names<'a>(stmts: impl IntoIterator<Item = &'a Stmt>) -> HashSet<String> {
    let mut names = HashSet::new();
    for stmt in stmts {
        if let Stmt::Decl(decl) = stmt {
            match decl {
                Decl::Var(var_decl) => {
                    if var_decl.kind != VarDeclKind::Var {
                        for decl in &var_decl.decls {
                            names.extend(pat_names(&decl.name));
                        }
                    }
                }
                Decl::Using(using_decl) => {
                    for decl in &using_decl.decls {
                        names.extend(pat_names(&decl.name));
                    }
                }
                Decl::Fn(fn_decl) => {
                    names.insert(fn_decl.ident.sym.to_string());
                }
                Decl::Class(class_decl) => {
                    names.insert(class_decl.ident.sym.to_string());
                }
                Decl::TsEnum(ts_enum) => {
                    names.insert(ts_enum.id.sym.to_string());
                }
                Decl::TsModule(ts_module) => {
                    if let TsModuleName::Ident(ident) = &ts_module.id {
                        names.insert(ident.sym.to_string());
                    }
                }
                _ => {}
            }
        }
    }
    names
}

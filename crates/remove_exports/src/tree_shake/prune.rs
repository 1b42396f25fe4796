use swc_common::DUMMY_SP;
use swc_ecma_ast::{
    ClassDecl, Decl, DefaultDecl, ExportDecl, ExportNamedSpecifier, ExportSpecifier, FnDecl,
    Ident, ImportDecl, Module, ModuleDecl, ModuleExportName, ModuleItem, NamedExport,
    ObjectPatProp, Pat, Stmt, VarDecl, VarDeclarator,
};
use tracing::debug;

use crate::tree_shake::defined_idents_collector::pat_idents;
use crate::tree_shake::reachability::LiveSet;
use crate::tree_shake::symbols::{
    export_specifier_name, BindingId, StatementId, SymbolTable, DEFAULT_EXPORT,
};

/// Rebuilds the module body from what is still live. Surviving statements
/// keep their relative order; an exported statement may expand into several
/// when only part of it is still exported.
pub fn remove_useless_stmts(module: &mut Module, table: &SymbolTable, live: &LiveSet) {
    let body = std::mem::take(&mut module.body);
    let mut pruner = Pruner {
        table,
        live,
        body: Vec::with_capacity(body.len()),
        removed: 0,
    };

    for (id, item) in body.into_iter().enumerate() {
        pruner.prune_module_item(id, item);
    }

    debug!(
        "removed {} statements, {} left",
        pruner.removed,
        pruner.body.len()
    );
    module.body = pruner.body;
}

struct Pruner<'a> {
    table: &'a SymbolTable,
    live: &'a LiveSet,
    body: Vec<ModuleItem>,
    removed: usize,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Visibility {
    Exported,
    Demoted,
}

impl Pruner<'_> {
    fn prune_module_item(&mut self, id: StatementId, item: ModuleItem) {
        if self.table.statement(id).is_self_executed {
            self.body.push(item);
            return;
        }

        match item {
            ModuleItem::Stmt(Stmt::Decl(decl)) => match self.prune_decl(id, decl) {
                Some(decl) => self.body.push(ModuleItem::Stmt(Stmt::Decl(decl))),
                None => self.remove(id),
            },
            ModuleItem::Stmt(stmt) => self.body.push(ModuleItem::Stmt(stmt)),
            ModuleItem::ModuleDecl(module_decl) => self.prune_module_decl(id, module_decl),
        }
    }

    fn prune_module_decl(&mut self, id: StatementId, module_decl: ModuleDecl) {
        match module_decl {
            ModuleDecl::Import(import_decl) => {
                match self.prune_import(id, import_decl) {
                    Some(import_decl) => self.push_module_decl(ModuleDecl::Import(import_decl)),
                    None => self.remove(id),
                }
            }
            ModuleDecl::ExportDecl(export_decl) => self.prune_export_decl(id, export_decl),
            ModuleDecl::ExportDefaultDecl(export_default) => {
                if self.table.has_export(id, DEFAULT_EXPORT) {
                    self.push_module_decl(ModuleDecl::ExportDefaultDecl(export_default));
                    return;
                }
                let demoted = if self.is_live_stmt(id) {
                    demote_default_decl(export_default.decl)
                } else {
                    None
                };
                match demoted {
                    Some(decl) => {
                        debug!("demote default export {}", id);
                        self.body.push(ModuleItem::Stmt(Stmt::Decl(decl)));
                    }
                    None => self.remove(id),
                }
            }
            ModuleDecl::ExportDefaultExpr(export_default) => {
                if self.table.has_export_in(id) {
                    self.push_module_decl(ModuleDecl::ExportDefaultExpr(export_default));
                } else {
                    self.remove(id);
                }
            }
            ModuleDecl::ExportNamed(mut named_export) => {
                let table = self.table;
                named_export
                    .specifiers
                    .retain(|specifier| table.has_export(id, &export_specifier_name(specifier)));
                if named_export.specifiers.is_empty() {
                    self.remove(id);
                } else {
                    self.push_module_decl(ModuleDecl::ExportNamed(named_export));
                }
            }
            ModuleDecl::TsImportEquals(mut import_equals) => {
                if !self.is_live_stmt(id) {
                    self.remove(id);
                    return;
                }
                import_equals.is_export = self.table.has_export_in(id);
                self.push_module_decl(ModuleDecl::TsImportEquals(import_equals));
            }
            module_decl => self.push_module_decl(module_decl),
        }
    }

    // import a, { b, c as d } from "m";
    fn prune_import(&self, id: StatementId, mut import_decl: ImportDecl) -> Option<ImportDecl> {
        let mut bindings = self.table.statement(id).bindings.iter();
        let live = self.live;
        import_decl
            .specifiers
            .retain(|_| bindings.next().map_or(true, |binding| live.contains(*binding)));
        if import_decl.specifiers.is_empty() {
            return None;
        }
        Some(import_decl)
    }

    fn prune_decl(&mut self, id: StatementId, decl: Decl) -> Option<Decl> {
        match decl {
            Decl::Var(mut var_decl) => {
                let decls = std::mem::take(&mut var_decl.decls);
                var_decl.decls = self
                    .prune_declarators(id, decls)
                    .into_iter()
                    .map(|(decl, _)| decl)
                    .collect();
                (!var_decl.decls.is_empty()).then_some(Decl::Var(var_decl))
            }
            Decl::Using(mut using_decl) => {
                let decls = std::mem::take(&mut using_decl.decls);
                using_decl.decls = self
                    .prune_declarators(id, decls)
                    .into_iter()
                    .map(|(decl, _)| decl)
                    .collect();
                (!using_decl.decls.is_empty()).then_some(Decl::Using(using_decl))
            }
            decl => self.is_live_stmt(id).then_some(decl),
        }
    }

    fn prune_export_decl(&mut self, id: StatementId, export_decl: ExportDecl) {
        let var_decl = match export_decl.decl {
            Decl::Var(var_decl) => var_decl,
            decl => {
                let exported = self
                    .table
                    .statement(id)
                    .bindings
                    .iter()
                    .any(|binding| self.table.is_declared_export(*binding));
                if exported {
                    self.push_module_decl(ModuleDecl::ExportDecl(ExportDecl {
                        span: export_decl.span,
                        decl,
                    }));
                } else if self.is_live_stmt(id) {
                    debug!("demote export {}", id);
                    self.body.push(ModuleItem::Stmt(Stmt::Decl(decl)));
                } else {
                    self.remove(id);
                }
                return;
            }
        };

        let mut template = *var_decl;
        let decls = std::mem::take(&mut template.decls);
        let kept = self.prune_declarators(id, decls);
        if kept.is_empty() {
            self.remove(id);
            return;
        }

        // export const a = 1, b = 2, c = 3; export { b as d };
        // without b becomes export const a = 1; const b = 2; export const c = 3;
        // every demoted declarator gets a statement of its own
        let mut runs: Vec<(Visibility, Vec<VarDeclarator>)> = vec![];
        let mut trailing_exports = vec![];
        for (decl, bindings) in kept {
            let exported = bindings
                .iter()
                .filter(|binding| self.table.is_declared_export(**binding))
                .map(|binding| self.table.binding(*binding).name.clone())
                .collect::<Vec<_>>();
            let visibility = if exported.len() == bindings.len() {
                Visibility::Exported
            } else {
                trailing_exports.extend(exported);
                Visibility::Demoted
            };
            match runs.last_mut() {
                Some((Visibility::Exported, run)) if visibility == Visibility::Exported => {
                    run.push(decl)
                }
                _ => runs.push((visibility, vec![decl])),
            }
        }

        for (visibility, decls) in runs {
            let decl = Decl::Var(Box::new(VarDecl {
                decls,
                ..template.clone()
            }));
            match visibility {
                Visibility::Exported => self.push_module_decl(ModuleDecl::ExportDecl(ExportDecl {
                    span: export_decl.span,
                    decl,
                })),
                Visibility::Demoted => {
                    debug!("demote part of export {}", id);
                    self.body.push(ModuleItem::Stmt(Stmt::Decl(decl)));
                }
            }
        }

        if !trailing_exports.is_empty() {
            self.push_module_decl(ModuleDecl::ExportNamed(export_list(trailing_exports)));
        }
    }

    /// Keeps the declarators that still bind a live name, with their dead
    /// names dropped from the pattern. Each kept declarator comes with the
    /// live bindings it declares.
    fn prune_declarators(
        &self,
        id: StatementId,
        decls: Vec<VarDeclarator>,
    ) -> Vec<(VarDeclarator, Vec<BindingId>)> {
        let mut bindings = self.table.statement(id).bindings.iter().copied();
        let mut kept = vec![];
        for mut decl in decls {
            let declared = bindings
                .by_ref()
                .take(pat_idents(&decl.name).len())
                .collect::<Vec<_>>();
            let mut flags = declared.iter().map(|binding| self.live.contains(*binding));
            if retain_live_names(&mut decl.name, &mut flags) {
                let live_bindings = declared
                    .into_iter()
                    .filter(|binding| self.live.contains(*binding))
                    .collect();
                kept.push((decl, live_bindings));
            }
        }
        kept
    }

    fn is_live_stmt(&self, id: StatementId) -> bool {
        self.table
            .statement(id)
            .bindings
            .iter()
            .any(|binding| self.live.contains(*binding))
    }

    fn push_module_decl(&mut self, module_decl: ModuleDecl) {
        self.body.push(ModuleItem::ModuleDecl(module_decl));
    }

    fn remove(&mut self, id: StatementId) {
        debug!("remove statement {}", id);
        self.removed += 1;
    }
}

/// Drops the names whose flag is false from a binding pattern. Flags are
/// consumed in the order `pat_idents` reports the names. Returns whether the
/// pattern still binds anything.
fn retain_live_names(pat: &mut Pat, flags: &mut impl Iterator<Item = bool>) -> bool {
    match pat {
        // foo
        Pat::Ident(_) => flags.next().unwrap_or(true),
        // [foo, , bar]
        Pat::Array(array_pat) => {
            let mut any = false;
            for elem in array_pat.elems.iter_mut() {
                if let Some(pat) = elem {
                    if retain_live_names(pat, flags) {
                        any = true;
                    } else {
                        *elem = None;
                    }
                }
            }
            while let Some(None) = array_pat.elems.last() {
                array_pat.elems.pop();
            }
            any
        }
        // { foo, bar: baz, bai = 1, ...rest }
        Pat::Object(obj_pat) => {
            obj_pat.props.retain_mut(|prop| match prop {
                ObjectPatProp::KeyValue(kv_prop) => retain_live_names(&mut kv_prop.value, flags),
                ObjectPatProp::Assign(_) => flags.next().unwrap_or(true),
                ObjectPatProp::Rest(rest_prop) => retain_live_names(&mut rest_prop.arg, flags),
            });
            !obj_pat.props.is_empty()
        }
        // [...foo]
        Pat::Rest(rest_pat) => retain_live_names(&mut rest_pat.arg, flags),
        // [foo = 1]
        Pat::Assign(assign_pat) => retain_live_names(&mut assign_pat.left, flags),
        _ => true,
    }
}

fn demote_default_decl(decl: DefaultDecl) -> Option<Decl> {
    match decl {
        DefaultDecl::Fn(fn_expr) => fn_expr.ident.map(|ident| {
            Decl::Fn(FnDecl {
                ident,
                declare: false,
                function: fn_expr.function,
            })
        }),
        DefaultDecl::Class(class_expr) => class_expr.ident.map(|ident| {
            Decl::Class(ClassDecl {
                ident,
                declare: false,
                class: class_expr.class,
            })
        }),
        DefaultDecl::TsInterfaceDecl(interface) => Some(Decl::TsInterface(interface)),
    }
}

fn export_list(names: Vec<String>) -> NamedExport {
    NamedExport {
        span: DUMMY_SP,
        specifiers: names
            .into_iter()
            .map(|name| {
                ExportSpecifier::Named(ExportNamedSpecifier {
                    span: DUMMY_SP,
                    orig: ModuleExportName::Ident(Ident::new_no_ctxt(name.into(), DUMMY_SP)),
                    exported: None,
                    is_type_only: false,
                })
            })
            .collect(),
        src: None,
        type_only: false,
        with: None,
    }
}

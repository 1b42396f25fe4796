use std::collections::{HashMap, HashSet};

use indexmap::IndexSet;
use swc_ecma_ast::{
    Decl, DefaultDecl, ExportSpecifier, ImportSpecifier, Module, ModuleDecl, ModuleExportName,
    ModuleItem, Stmt, TsModuleName,
};
use tracing::debug;

use crate::tree_shake::defined_idents_collector::pat_names;

pub type StatementId = usize;
pub type BindingId = usize;

pub const DEFAULT_EXPORT: &str = "default";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub name: String,
    pub stmt_id: StatementId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportTarget {
    // export const a = 1;
    // export default function a() {}
    Declared(BindingId),
    // export { a, b as c };
    Local {
        local: String,
        bindings: Vec<BindingId>,
    },
    // export { a } from "m";
    // export * as ns from "m";
    ReExport,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportEntry {
    pub exported: String,
    pub target: ExportTarget,
    pub stmt_id: StatementId,
}

#[derive(Debug, Clone)]
pub struct Statement {
    pub id: StatementId,
    pub bindings: Vec<BindingId>,
    /// kept regardless of exports, e.g. `foo();` or `import "m";`
    pub is_self_executed: bool,
}

#[derive(Debug, Default)]
pub struct SymbolTable {
    bindings: Vec<Binding>,
    by_name: HashMap<String, Vec<BindingId>>,
    exports: Vec<ExportEntry>,
    statements: Vec<Statement>,
    /// declarations whose own export was removed, see `retract`
    deleted: HashSet<BindingId>,
}

impl SymbolTable {
    pub fn build(module: &Module) -> Self {
        let mut table = Self::default();

        for (id, item) in module.body.iter().enumerate() {
            table.statements.push(Statement {
                id,
                bindings: vec![],
                is_self_executed: false,
            });
            table.analyze_module_item(id, item);
        }

        // export { a } may precede the declaration of a
        for entry in table.exports.iter_mut() {
            if let ExportTarget::Local { local, bindings } = &mut entry.target {
                *bindings = table.by_name.get(local).cloned().unwrap_or_default();
            }
        }

        debug!(
            "symbol table: {} statements, {} bindings, {} exports",
            table.statements.len(),
            table.bindings.len(),
            table.exports.len()
        );
        table
    }

    fn analyze_module_item(&mut self, id: StatementId, item: &ModuleItem) {
        match item {
            ModuleItem::Stmt(Stmt::Decl(decl)) => {
                self.register_decl(id, decl);
            }
            ModuleItem::Stmt(_) => self.mark_self_executed(id),
            ModuleItem::ModuleDecl(module_decl) => match module_decl {
                ModuleDecl::Import(import_decl) => {
                    // import "m"; import {} from "m";
                    if import_decl.specifiers.is_empty() {
                        self.mark_self_executed(id);
                    }
                    for specifier in &import_decl.specifiers {
                        let local = match specifier {
                            ImportSpecifier::Named(named) => &named.local,
                            ImportSpecifier::Default(default) => &default.local,
                            ImportSpecifier::Namespace(namespace) => &namespace.local,
                        };
                        self.register_binding(id, local.sym.to_string());
                    }
                }
                ModuleDecl::ExportDecl(export_decl) => {
                    for binding in self.register_decl(id, &export_decl.decl) {
                        let exported = self.bindings[binding].name.clone();
                        self.register_export(id, exported, ExportTarget::Declared(binding));
                    }
                }
                ModuleDecl::ExportDefaultDecl(export_default) => {
                    let binding = match &export_default.decl {
                        DefaultDecl::Class(class_expr) => match &class_expr.ident {
                            Some(ident) => self.register_binding(id, ident.sym.to_string()),
                            None => self.register_default(id),
                        },
                        DefaultDecl::Fn(fn_expr) => match &fn_expr.ident {
                            Some(ident) => self.register_binding(id, ident.sym.to_string()),
                            None => self.register_default(id),
                        },
                        DefaultDecl::TsInterfaceDecl(interface) => {
                            self.register_binding(id, interface.id.sym.to_string())
                        }
                    };
                    self.register_export(
                        id,
                        DEFAULT_EXPORT.to_string(),
                        ExportTarget::Declared(binding),
                    );
                }
                ModuleDecl::ExportDefaultExpr(_) => {
                    let binding = self.register_default(id);
                    self.register_export(
                        id,
                        DEFAULT_EXPORT.to_string(),
                        ExportTarget::Declared(binding),
                    );
                }
                ModuleDecl::ExportNamed(named_export) => {
                    if named_export.specifiers.is_empty() {
                        self.mark_self_executed(id);
                    }
                    let has_source = named_export.src.is_some();
                    for specifier in &named_export.specifiers {
                        let exported = export_specifier_name(specifier);
                        let target = match (has_source, specifier) {
                            (true, _) => ExportTarget::ReExport,
                            (false, ExportSpecifier::Named(named)) => match &named.orig {
                                ModuleExportName::Ident(ident) => ExportTarget::Local {
                                    local: ident.sym.to_string(),
                                    bindings: vec![],
                                },
                                // only valid with a source
                                _ => continue,
                            },
                            (false, _) => continue,
                        };
                        self.register_export(id, exported, target);
                    }
                }
                ModuleDecl::TsImportEquals(import_equals) => {
                    let binding = self.register_binding(id, import_equals.id.sym.to_string());
                    if import_equals.is_export {
                        let exported = import_equals.id.sym.to_string();
                        self.register_export(id, exported, ExportTarget::Declared(binding));
                    }
                }
                // export * from "m";
                // export = foo;
                // export as namespace Foo;
                _ => self.mark_self_executed(id),
            },
        }
    }

    fn register_decl(&mut self, id: StatementId, decl: &Decl) -> Vec<BindingId> {
        let names: Vec<String> = match decl {
            Decl::Var(var_decl) => var_decl
                .decls
                .iter()
                .flat_map(|decl| pat_names(&decl.name))
                .collect(),
            Decl::Using(using_decl) => using_decl
                .decls
                .iter()
                .flat_map(|decl| pat_names(&decl.name))
                .collect(),
            Decl::Fn(fn_decl) => vec![fn_decl.ident.sym.to_string()],
            Decl::Class(class_decl) => vec![class_decl.ident.sym.to_string()],
            Decl::TsEnum(ts_enum) => vec![ts_enum.id.sym.to_string()],
            Decl::TsInterface(interface) => vec![interface.id.sym.to_string()],
            Decl::TsTypeAlias(alias) => vec![alias.id.sym.to_string()],
            Decl::TsModule(ts_module) => match &ts_module.id {
                // declare global {}
                TsModuleName::Ident(_) if ts_module.global => {
                    self.mark_self_executed(id);
                    vec![]
                }
                TsModuleName::Ident(ident) => vec![ident.sym.to_string()],
                // declare module "m" {}
                _ => {
                    self.mark_self_executed(id);
                    vec![]
                }
            },
            #[allow(unreachable_patterns)]
            _ => {
                self.mark_self_executed(id);
                vec![]
            }
        };
        names
            .into_iter()
            .map(|name| self.register_binding(id, name))
            .collect()
    }

    fn register_binding(&mut self, id: StatementId, name: String) -> BindingId {
        let binding_id = self.bindings.len();
        self.by_name.entry(name.clone()).or_default().push(binding_id);
        self.bindings.push(Binding { name, stmt_id: id });
        self.statements[id].bindings.push(binding_id);
        binding_id
    }

    fn register_default(&mut self, id: StatementId) -> BindingId {
        let binding_id = self.bindings.len();
        self.bindings.push(Binding {
            name: DEFAULT_EXPORT.to_string(),
            stmt_id: id,
        });
        self.statements[id].bindings.push(binding_id);
        binding_id
    }

    fn register_export(&mut self, id: StatementId, exported: String, target: ExportTarget) {
        self.exports.push(ExportEntry {
            exported,
            target,
            stmt_id: id,
        });
    }

    fn mark_self_executed(&mut self, id: StatementId) {
        self.statements[id].is_self_executed = true;
    }

    /// Drops the export entries named in `names`. Names that are not exported
    /// are ignored.
    ///
    /// A removed `export const a`, `export function a` or `export default`
    /// takes its declaration with it, unless a surviving export list still
    /// exposes the same binding. Removing a name from an export list only
    /// hides it.
    pub fn retract(&mut self, names: &IndexSet<String>) {
        let (retracted, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.exports)
            .into_iter()
            .partition(|entry| names.contains(&entry.exported));
        self.exports = kept;

        for entry in &retracted {
            if let ExportTarget::Declared(binding) = entry.target {
                if !self.is_exported(binding) {
                    self.deleted.insert(binding);
                }
            }
        }
        debug!(
            "retract exports {:?}, {} entries matched, {} declarations deleted",
            names,
            retracted.len(),
            self.deleted.len()
        );
    }

    fn is_exported(&self, binding: BindingId) -> bool {
        self.exports.iter().any(|entry| match &entry.target {
            ExportTarget::Declared(declared) => *declared == binding,
            ExportTarget::Local { bindings, .. } => bindings.contains(&binding),
            ExportTarget::ReExport => false,
        })
    }

    /// Whether the declaration of `binding` goes away with its removed export,
    /// whoever still reads it.
    pub fn is_deleted(&self, binding: BindingId) -> bool {
        self.deleted.contains(&binding)
    }

    pub fn binding(&self, id: BindingId) -> &Binding {
        &self.bindings[id]
    }

    pub fn bindings(&self) -> impl Iterator<Item = (BindingId, &Binding)> {
        self.bindings.iter().enumerate()
    }

    /// Every top-level binding declared under `name`.
    pub fn resolve(&self, name: &str) -> &[BindingId] {
        self.by_name.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn statement(&self, id: StatementId) -> &Statement {
        &self.statements[id]
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    pub fn exports(&self) -> &[ExportEntry] {
        &self.exports
    }

    pub fn has_export(&self, id: StatementId, exported: &str) -> bool {
        self.exports
            .iter()
            .any(|entry| entry.stmt_id == id && entry.exported == exported)
    }

    pub fn has_export_in(&self, id: StatementId) -> bool {
        self.exports.iter().any(|entry| entry.stmt_id == id)
    }

    /// Whether `binding` is still exported by its own declaration,
    /// as in `export const a = 1`.
    pub fn is_declared_export(&self, binding: BindingId) -> bool {
        self.exports
            .iter()
            .any(|entry| entry.target == ExportTarget::Declared(binding))
    }
}

pub fn module_export_name(name: &ModuleExportName) -> String {
    match name {
        ModuleExportName::Ident(ident) => ident.sym.to_string(),
        ModuleExportName::Str(s) => s.value.to_string_lossy().into_owned(),
    }
}

pub fn export_specifier_name(specifier: &ExportSpecifier) -> String {
    match specifier {
        // export * as foo from "m";
        ExportSpecifier::Namespace(namespace) => module_export_name(&namespace.name),
        // export foo from "m";
        ExportSpecifier::Default(default) => default.exported.sym.to_string(),
        // export { foo, bar as baz };
        ExportSpecifier::Named(named) => {
            module_export_name(named.exported.as_ref().unwrap_or(&named.orig))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::js_ast::JsAst;
    use crate::config::Config;

    fn build(code: &str) -> SymbolTable {
        let ast = JsAst::build(code, &Config::default()).unwrap();
        SymbolTable::build(&ast.ast)
    }

    fn binding_names(table: &SymbolTable) -> Vec<String> {
        table
            .bindings()
            .map(|(_, binding)| binding.name.clone())
            .collect()
    }

    fn names(names: &[&str]) -> IndexSet<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    fn export_names(table: &SymbolTable) -> Vec<String> {
        table
            .exports()
            .iter()
            .map(|entry| entry.exported.clone())
            .collect()
    }

    #[test]
    fn test_declarations() {
        let table = build(
            r#"
const { a, b: [c] } = obj;
function f() {}
class K {}
import d, { e as g } from "m";
import * as ns from "n";
"#,
        );
        assert_eq!(
            binding_names(&table),
            vec!["a", "c", "f", "K", "d", "g", "ns"]
        );
        assert!(table.exports().is_empty());
        assert!(table.statements().iter().all(|s| !s.is_self_executed));
    }

    #[test]
    fn test_export_declarations() {
        let table = build("export const foo = 1, bar = 2; export function baz() {}");
        assert_eq!(export_names(&table), vec!["foo", "bar", "baz"]);
        let foo = table.resolve("foo")[0];
        assert!(table.is_declared_export(foo));
        assert_eq!(table.binding(foo).stmt_id, 0);
        assert_eq!(table.binding(table.resolve("bar")[0]).stmt_id, 0);
        assert_eq!(table.statement(1).bindings, vec![table.resolve("baz")[0]]);
    }

    #[test]
    fn test_default_exports() {
        let table = build("export default 1;");
        assert_eq!(binding_names(&table), vec!["default"]);
        assert_eq!(export_names(&table), vec!["default"]);
        // the synthetic binding can't be referenced by name
        assert!(table.resolve("default").is_empty());

        let table = build("export default function foo() {}");
        assert_eq!(binding_names(&table), vec!["foo"]);
        assert_eq!(
            table.exports()[0].target,
            ExportTarget::Declared(table.resolve("foo")[0])
        );

        let table = build("export default class {}");
        assert_eq!(binding_names(&table), vec!["default"]);
    }

    #[test]
    fn test_export_list_aliases() {
        let table = build(r#"export { a, b as c, a as "x y" }; const a = 1, b = 2;"#);
        assert_eq!(export_names(&table), vec!["a", "c", "x y"]);
        assert_eq!(
            table.exports()[1].target,
            ExportTarget::Local {
                local: "b".to_string(),
                bindings: vec![table.resolve("b")[0]],
            }
        );
        // export lists don't introduce bindings
        assert_eq!(table.statement(0).bindings, Vec::<BindingId>::new());
    }

    #[test]
    fn test_export_list_of_undeclared_name() {
        let table = build("export { missing };");
        assert_eq!(
            table.exports()[0].target,
            ExportTarget::Local {
                local: "missing".to_string(),
                bindings: vec![],
            }
        );
    }

    #[test]
    fn test_re_exports() {
        let table =
            build(r#"export { a, b as c } from "m"; export * as ns from "n"; export * from "o";"#);
        assert_eq!(export_names(&table), vec!["a", "c", "ns"]);
        assert_eq!(table.exports()[2].target, ExportTarget::ReExport);
        assert!(!table.statement(0).is_self_executed);
        assert!(table.statement(2).is_self_executed);
    }

    #[test]
    fn test_self_executed_statements() {
        let table = build(
            r#"
import "polyfill";
import {} from "styles";
foo();
if (x) {}
export {};
const y = 1;
"#,
        );
        let flags = table
            .statements()
            .iter()
            .map(|s| s.is_self_executed)
            .collect::<Vec<_>>();
        assert_eq!(flags, vec![true, true, true, true, true, false]);
    }

    #[test]
    fn test_commented_export_contributes_nothing() {
        let table = build("export function foo() {}\n// export { foo as bar };");
        assert_eq!(export_names(&table), vec!["foo"]);
    }

    #[test]
    fn test_retract() {
        let mut table = build("export const foo = 1; export { foo as bar }; export default foo;");
        table.retract(&names(&["bar", "missing"]));
        assert_eq!(export_names(&table), vec!["foo", "default"]);
        assert!(!table.has_export_in(1));
        assert!(table.has_export(0, "foo"));
        let foo = table.resolve("foo")[0];
        assert!(table.is_declared_export(foo));
        // an export list only hides its name
        assert!(!table.is_deleted(foo));
    }

    #[test]
    fn test_retract_deletes_exported_declarations() {
        let mut table = build("export function foo() {} export const bar = 1; export default 1;");
        table.retract(&names(&["foo", "default"]));
        assert!(table.is_deleted(table.resolve("foo")[0]));
        assert!(!table.is_deleted(table.resolve("bar")[0]));
        assert!(table.is_deleted(table.statement(2).bindings[0]));
    }

    #[test]
    fn test_retract_keeps_declarations_exported_under_another_name() {
        let mut table = build("export const foo = 1; export { foo as bar };");
        table.retract(&names(&["foo"]));
        let foo = table.resolve("foo")[0];
        assert!(!table.is_declared_export(foo));
        assert!(!table.is_deleted(foo));

        table.retract(&names(&["bar"]));
        assert!(table.exports().is_empty());
        assert!(!table.is_deleted(foo));
    }

    #[test]
    fn test_typescript_declarations() {
        let ast = JsAst::build(
            r#"
export enum Color { Red }
export interface Props {}
export type Id = string;
export namespace Util {}
declare module "ambient" {}
import fs = require("fs");
declare global { interface Window { x: number } }
"#,
            &Config::typescript(),
        )
        .unwrap();
        let table = SymbolTable::build(&ast.ast);
        assert_eq!(export_names(&table), vec!["Color", "Props", "Id", "Util"]);
        assert!(table.statement(4).is_self_executed);
        assert_eq!(table.binding(table.resolve("fs")[0]).stmt_id, 5);
        // global augmentations declare nothing at the top level
        assert!(table.statement(6).is_self_executed);
        assert!(table.resolve("global").is_empty());
    }
}

use std::collections::{HashMap, HashSet};

use petgraph::graph::{Graph, NodeIndex};
use swc_ecma_ast::{Decl, DefaultDecl, Module, ModuleDecl, ModuleItem, Stmt, VarDeclarator};
use swc_ecma_visit::VisitWith;
use tracing::{debug, trace};

use crate::tree_shake::symbols::{BindingId, StatementId, SymbolTable};
use crate::tree_shake::used_idents_collector::{pat_path_reads, UsedIdentsCollector};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GraphNode {
    Binding(BindingId),
    /// a statement kept for its own sake, like `init();`
    Statement(StatementId),
}

/// "reads" edges among top-level bindings
pub struct ReferenceGraph {
    graph: Graph<GraphNode, ()>,
    binding_index_map: HashMap<BindingId, NodeIndex>,
    statement_index_map: HashMap<StatementId, NodeIndex>,
}

impl ReferenceGraph {
    pub fn new(module: &Module, table: &SymbolTable) -> Self {
        let mut graph = Graph::new();
        let mut binding_index_map = HashMap::new();
        let mut statement_index_map = HashMap::new();

        for (id, _) in table.bindings() {
            binding_index_map.insert(id, graph.add_node(GraphNode::Binding(id)));
        }
        for statement in table.statements() {
            if statement.is_self_executed {
                let node = graph.add_node(GraphNode::Statement(statement.id));
                statement_index_map.insert(statement.id, node);
            }
        }

        let mut graph = Self {
            graph,
            binding_index_map,
            statement_index_map,
        };

        for (id, item) in module.body.iter().enumerate() {
            graph.init_item_edges(id, item, table);
        }

        debug!(
            "reference graph: {} nodes, {} edges",
            graph.graph.node_count(),
            graph.graph.edge_count()
        );
        graph
    }

    fn init_item_edges(&mut self, id: StatementId, item: &ModuleItem, table: &SymbolTable) {
        if table.statement(id).is_self_executed {
            let reads = collect_reads(|collector| item.visit_with(collector));
            let from = self.statement_index_map[&id];
            self.add_reads(from, reads, table);
            return;
        }

        match item {
            ModuleItem::Stmt(Stmt::Decl(decl)) => self.init_decl_edges(id, decl, table),
            ModuleItem::ModuleDecl(ModuleDecl::ExportDecl(export_decl)) => {
                self.init_decl_edges(id, &export_decl.decl, table)
            }
            ModuleItem::ModuleDecl(ModuleDecl::ExportDefaultDecl(export_default)) => {
                let reads = collect_reads(|collector| match &export_default.decl {
                    DefaultDecl::Class(class_expr) => class_expr.visit_with(collector),
                    DefaultDecl::Fn(fn_expr) => fn_expr.visit_with(collector),
                    DefaultDecl::TsInterfaceDecl(interface) => interface.visit_with(collector),
                });
                self.add_statement_reads(id, reads, table);
            }
            ModuleItem::ModuleDecl(ModuleDecl::ExportDefaultExpr(export_default)) => {
                let reads = collect_reads(|collector| export_default.expr.visit_with(collector));
                self.add_statement_reads(id, reads, table);
            }
            ModuleItem::ModuleDecl(ModuleDecl::TsImportEquals(import_equals)) => {
                let reads =
                    collect_reads(|collector| import_equals.module_ref.visit_with(collector));
                self.add_statement_reads(id, reads, table);
            }
            // imports and export lists read nothing by themselves
            _ => {}
        }
    }

    fn init_decl_edges(&mut self, id: StatementId, decl: &Decl, table: &SymbolTable) {
        match decl {
            Decl::Var(var_decl) => self.init_declarator_edges(id, &var_decl.decls, table),
            Decl::Using(using_decl) => self.init_declarator_edges(id, &using_decl.decls, table),
            Decl::Fn(fn_decl) => {
                let reads = collect_reads(|collector| fn_decl.function.visit_with(collector));
                self.add_statement_reads(id, reads, table);
            }
            Decl::Class(class_decl) => {
                let reads = collect_reads(|collector| class_decl.class.visit_with(collector));
                self.add_statement_reads(id, reads, table);
            }
            _ => {
                let reads = collect_reads(|collector| decl.visit_with(collector));
                self.add_statement_reads(id, reads, table);
            }
        }
    }

    // const a = b, { c = d } = e;
    // a depends on b, c depends on d and e
    fn init_declarator_edges(
        &mut self,
        id: StatementId,
        decls: &[VarDeclarator],
        table: &SymbolTable,
    ) {
        let mut bindings = table.statement(id).bindings.iter().copied();
        for decl in decls {
            let init_reads = collect_reads(|collector| decl.init.visit_with(collector));
            let path_reads = pat_path_reads(&decl.name);
            for (mut reads, binding) in path_reads.into_iter().zip(bindings.by_ref()) {
                reads.extend(init_reads.iter().cloned());
                let from = self.binding_index_map[&binding];
                self.add_reads(from, reads, table);
            }
        }
    }

    fn add_statement_reads(
        &mut self,
        id: StatementId,
        reads: HashSet<String>,
        table: &SymbolTable,
    ) {
        for binding in &table.statement(id).bindings {
            let from = self.binding_index_map[binding];
            self.add_reads(from, reads.clone(), table);
        }
    }

    fn add_reads(&mut self, from: NodeIndex, reads: HashSet<String>, table: &SymbolTable) {
        for name in reads {
            for binding in table.resolve(&name) {
                let to = self.binding_index_map[binding];
                trace!(
                    "{:?} reads {} declared in statement {}",
                    self.graph[from],
                    name,
                    table.binding(*binding).stmt_id
                );
                self.graph.update_edge(from, to, ());
            }
        }
    }

    pub fn binding_node(&self, id: BindingId) -> Option<NodeIndex> {
        self.binding_index_map.get(&id).copied()
    }

    #[cfg(test)]
    pub fn statement_node(&self, id: StatementId) -> Option<NodeIndex> {
        self.statement_index_map.get(&id).copied()
    }

    pub fn statement_nodes(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.statement_index_map.values().copied()
    }

    pub fn node(&self, index: NodeIndex) -> GraphNode {
        self.graph[index]
    }

    pub fn references(&self, index: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.neighbors(index)
    }

    #[cfg(test)]
    pub fn depends_on(&self, from: GraphNode, to: BindingId) -> bool {
        let from = match from {
            GraphNode::Binding(id) => self.binding_node(id),
            GraphNode::Statement(id) => self.statement_node(id),
        };
        match (from, self.binding_node(to)) {
            (Some(from), Some(to)) => self.graph.contains_edge(from, to),
            _ => false,
        }
    }
}

fn collect_reads(f: impl FnOnce(&mut UsedIdentsCollector)) -> HashSet<String> {
    let mut collector = UsedIdentsCollector::new();
    f(&mut collector);
    collector.used_idents
}

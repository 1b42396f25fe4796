pub(crate) mod defined_idents_collector;
pub(crate) mod prune;
pub(crate) mod reachability;
pub(crate) mod reference_graph;
pub(crate) mod symbols;
pub(crate) mod used_idents_collector;

use indexmap::IndexSet;
use swc_ecma_ast::Module;
use tracing::debug;

use crate::tree_shake::prune::remove_useless_stmts;
use crate::tree_shake::reachability::analyze_live_bindings;
use crate::tree_shake::reference_graph::ReferenceGraph;
use crate::tree_shake::symbols::SymbolTable;

/// Retracts the exports in `names`, deletes the declarations exported only
/// under those names, and drops every top-level statement that is no longer
/// reachable from a surviving export or a side effect.
pub fn shake(module: &mut Module, names: &IndexSet<String>) {
    let mut table = SymbolTable::build(module);
    let graph = ReferenceGraph::new(module, &table);
    table.retract(names);
    let live = analyze_live_bindings(&graph, &table);
    remove_useless_stmts(module, &table, &live);
    debug!("tree shake done, {} statements left", module.body.len());
}

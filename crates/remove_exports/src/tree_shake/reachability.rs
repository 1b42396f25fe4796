use std::collections::{HashSet, VecDeque};

use petgraph::graph::NodeIndex;
use tracing::debug;

use crate::tree_shake::reference_graph::{GraphNode, ReferenceGraph};
use crate::tree_shake::symbols::{BindingId, ExportTarget, SymbolTable};

/// Bindings that must survive.
#[derive(Debug, Default)]
pub struct LiveSet {
    bindings: HashSet<BindingId>,
}

impl LiveSet {
    pub fn contains(&self, id: BindingId) -> bool {
        self.bindings.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }
}

/// Marks every binding reachable from a surviving export or from a statement
/// that is kept unconditionally. `table` must already have the removed
/// exports retracted; the declarations deleted with them are never marked,
/// even when something live still reads them.
pub fn analyze_live_bindings(graph: &ReferenceGraph, table: &SymbolTable) -> LiveSet {
    let mut queue: VecDeque<NodeIndex> = VecDeque::new();

    for entry in table.exports() {
        match &entry.target {
            ExportTarget::Declared(binding) => queue.extend(graph.binding_node(*binding)),
            ExportTarget::Local { bindings, .. } => {
                queue.extend(bindings.iter().filter_map(|b| graph.binding_node(*b)))
            }
            ExportTarget::ReExport => {}
        }
    }
    queue.extend(graph.statement_nodes());

    let mut visited: HashSet<NodeIndex> = HashSet::new();
    let mut live = LiveSet::default();

    while let Some(index) = queue.pop_front() {
        if !visited.insert(index) {
            continue;
        }
        if let GraphNode::Binding(id) = graph.node(index) {
            if table.is_deleted(id) {
                continue;
            }
            live.bindings.insert(id);
        }
        queue.extend(
            graph
                .references(index)
                .filter(|reference| !visited.contains(reference)),
        );
    }

    debug!("live bindings: {}", live.len());
    live
}

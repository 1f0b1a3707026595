//! Net table built from the board's net-list.

use serde::Serialize;
use std::collections::HashMap;

use crate::board::NetlistEntry;

/// Name of net 0, the catch-all for unconnected copper.
pub const NO_CONNECTION: &str = "no connection";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Net {
    pub id: u32,
    pub name: String,
}

/// Nets in id order plus an index from `REFDES-PIN` node names to net ids
#[derive(Debug, Clone)]
pub struct NetTable {
    nets: Vec<Net>,
    nodes: HashMap<String, u32>,
}

impl NetTable {
    /// Net 0 followed by one net per net-list entry, in order.
    pub fn from_netlist(entries: &[NetlistEntry]) -> Self {
        let mut nets = Vec::with_capacity(entries.len() + 1);
        nets.push(Net {
            id: 0,
            name: NO_CONNECTION.to_string(),
        });

        let mut nodes = HashMap::new();
        for (i, entry) in entries.iter().enumerate() {
            let id = (i + 1) as u32;
            nets.push(Net {
                id,
                name: entry.name.trim_start().to_string(),
            });
            for node in &entry.connections {
                // first entry wins on duplicate nodes
                if let Some(previous) = nodes.get(node.as_str()) {
                    tracing::warn!(
                        "Node {} listed in nets {} and {}, keeping the first",
                        node,
                        previous,
                        id
                    );
                    continue;
                }
                nodes.insert(node.clone(), id);
            }
        }

        Self { nets, nodes }
    }

    pub fn nets(&self) -> &[Net] {
        &self.nets
    }

    pub fn len(&self) -> usize {
        self.nets.len()
    }

    /// Always false: net 0 is present in every table.
    pub fn is_empty(&self) -> bool {
        self.nets.is_empty()
    }

    pub fn no_connection(&self) -> &Net {
        &self.nets[0]
    }

    /// Net by id; unknown ids map to net 0.
    pub fn get(&self, id: u32) -> &Net {
        self.nets
            .get(id as usize)
            .unwrap_or_else(|| self.no_connection())
    }

    /// Net id of a `REFDES-PIN` node, if any net-list entry names it.
    pub fn lookup_node(&self, node: &str) -> Option<u32> {
        self.nodes.get(node).copied()
    }
}

impl Default for NetTable {
    fn default() -> Self {
        Self::from_netlist(&[])
    }
}

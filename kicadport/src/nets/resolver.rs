//! Net Resolution
//!
//! Nets are resolved lazily. The first primitive of a copper cluster that
//! is asked for its net triggers one connectivity search; every member of
//! that cluster is then recorded with the seed's net, so later queries are
//! plain cache hits.

use std::collections::{HashMap, HashSet};

use super::connectivity::{ConnectivitySearch, PrimitiveId};
use super::table::{Net, NetTable};

pub struct NetResolver<S> {
    table: NetTable,
    search: S,
    assignments: HashMap<PrimitiveId, u32>,
    visited: HashSet<PrimitiveId>,
    found: HashSet<PrimitiveId>,
    searches: usize,
}

impl<S: ConnectivitySearch> NetResolver<S> {
    pub fn new(table: NetTable, search: S) -> Self {
        Self {
            table,
            search,
            assignments: HashMap::new(),
            visited: HashSet::new(),
            found: HashSet::new(),
            searches: 0,
        }
    }

    /// Net of a primitive. `node_name` is the `REFDES-PIN` name for pins
    /// and pads; other primitives pass `None` and seed net 0.
    pub fn resolve(&mut self, id: PrimitiveId, node_name: Option<&str>) -> &Net {
        if let Some(&net) = self.assignments.get(&id) {
            return self.table.get(net);
        }

        let net = node_name
            .and_then(|name| self.table.lookup_node(name))
            .unwrap_or(0);

        self.found.clear();
        self.search.find_connected(id, &mut self.found);
        self.searches += 1;
        self.found.insert(id);

        let mut recorded = 0;
        for member in self.found.drain() {
            if self.visited.insert(member) {
                self.assignments.insert(member, net);
                recorded += 1;
            }
        }
        tracing::debug!("{:?} seeds net {} ({} primitives)", id, net, recorded);

        self.table.get(net)
    }

    /// Number of connectivity searches run so far.
    pub fn searches(&self) -> usize {
        self.searches
    }

    pub fn table(&self) -> &NetTable {
        &self.table
    }

    pub fn is_visited(&self, id: PrimitiveId) -> bool {
        self.visited.contains(&id)
    }
}

//! Electrical net resolution: the net table, the connectivity search seam
//! and the caching resolver.

pub mod connectivity;
pub mod resolver;
pub mod table;

pub use connectivity::{ConnectivitySearch, CopperGraph, PrimitiveId};
pub use resolver::NetResolver;
pub use table::{Net, NetTable, NO_CONNECTION};

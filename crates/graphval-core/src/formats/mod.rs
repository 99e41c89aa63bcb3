//! Graph loading formats.
//!
//! | Format | Reader | Contents |
//! |--------|--------|----------|
//! | CSV edge list | [`Csv::read_edges`] | `src,dst[,edge_type[,weight]]` |
//! | CSV node types | [`Csv::read_node_types`] | `node[,type1\|type2]` |

mod csv;

pub use self::csv::Csv;

//! CSV format support.
//!
//! Headerless, comma separated, `#` comments allowed.
//!
//! - Edge lists: `src,dst[,edge_type[,weight]]`. An empty type column means
//!   unknown type; a missing weight means 1.0.
//! - Node type lists: `node[,type1|type2|...]`. A missing or empty type
//!   column leaves the node type unknown.

use crate::{Error, Graph, Result};
use std::io::Read;

/// CSV format handler.
pub struct Csv;

impl Csv {
    fn reader<R: Read>(reader: R) -> csv::Reader<R> {
        csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .comment(Some(b'#'))
            .trim(csv::Trim::All)
            .from_reader(reader)
    }

    /// Read an edge list into a new graph.
    pub fn read_edges<R: Read>(reader: R, name: &str, directed: bool) -> Result<Graph> {
        let mut graph = Graph::new(name, directed);

        for (i, result) in Self::reader(reader).records().enumerate() {
            let record = result?;
            if record.len() < 2 {
                return Err(Error::Parse {
                    record: i + 1,
                    reason: format!("expected at least 2 columns, got {}", record.len()),
                });
            }

            let edge_type = record.get(2).filter(|t| !t.is_empty());
            let weight = match record.get(3).filter(|w| !w.is_empty()) {
                Some(w) => w.parse::<f32>().map_err(|e| Error::Parse {
                    record: i + 1,
                    reason: format!("invalid weight `{w}`: {e}"),
                })?,
                None => 1.0,
            };

            graph.add_edge(&record[0], &record[1], edge_type, weight);
        }

        Ok(graph)
    }

    /// Read node types into an existing graph. Returns the number of records read.
    ///
    /// Nodes that do not exist yet are added (as isolated nodes).
    pub fn read_node_types<R: Read>(reader: R, graph: &mut Graph) -> Result<usize> {
        let mut read = 0;
        for (i, result) in Self::reader(reader).records().enumerate() {
            let record = result?;
            let Some(node) = record.get(0).filter(|n| !n.is_empty()) else {
                return Err(Error::Parse {
                    record: i + 1,
                    reason: "missing node name".to_string(),
                });
            };

            let types: Vec<&str> = record
                .get(1)
                .map(|t| t.split('|').map(str::trim).filter(|t| !t.is_empty()).collect())
                .unwrap_or_default();
            graph.add_node(node, types);
            read += 1;
        }
        Ok(read)
    }
}

//! Shaping of free-form query results for the console.

use crate::api::RawGraph;
use crate::api::types::{QueryResponse, ResultType};
use crate::format::cell_text;

/// Tabular query result, every cell already rendered to text.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResultTable {
	/// Column headers in display order.
	pub columns: Vec<String>,
	/// One entry per row, aligned with `columns`.
	pub rows: Vec<Vec<String>>,
	/// Row count reported by the backend, never less than `rows.len()`.
	pub count: usize,
}

/// How a query result is presented. Only `Graph` reaches the diagram.
#[derive(Clone, Debug, PartialEq)]
pub enum QueryView {
	/// Shown in the console.
	Table(ResultTable),
	/// Sent to the diagram through `ShowGraph`.
	Graph {
		/// Non-empty graph payload.
		graph: RawGraph,
		/// Result count for the console summary.
		count: usize,
	},
}

/// Graph results with at least one node become [`QueryView::Graph`]; everything
/// else is tabulated.
pub fn shape(response: QueryResponse) -> QueryView {
	let count = response.count.max(response.results.len());
	if response.result_type == ResultType::Graph {
		if let Some(graph) = response.graph_data.filter(|g| !g.nodes.is_empty()) {
			return QueryView::Graph { graph, count };
		}
	}

	let columns = response
		.table_columns
		.filter(|c| !c.is_empty())
		.or_else(|| {
			response
				.results
				.first()
				.map(|row| row.keys().cloned().collect())
		})
		.unwrap_or_default();
	let rows = response
		.results
		.iter()
		.map(|row| {
			columns
				.iter()
				.map(|c| row.get(c).map(cell_text).unwrap_or_default())
				.collect()
		})
		.collect();

	QueryView::Table(ResultTable {
		columns,
		rows,
		count,
	})
}

//! Wire shapes of the backend endpoints.
//!
//! The backend is loose about types (labels arrive as lists, collections as
//! `null`), so the graph payloads deserialize leniently: known fields are
//! typed, anything else lands in `extra`.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Accepts a string, number, bool, list (first element) or null.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
	D: Deserializer<'de>,
{
	fn flatten(value: Value) -> String {
		match value {
			Value::Null => String::new(),
			Value::String(s) => s,
			Value::Array(items) => items.into_iter().next().map(flatten).unwrap_or_default(),
			other => other.to_string(),
		}
	}
	Ok(flatten(Value::deserialize(deserializer)?))
}

fn lenient_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
	D: Deserializer<'de>,
{
	let s = lenient_string(deserializer)?;
	Ok((!s.is_empty()).then_some(s))
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
	D: Deserializer<'de>,
	T: Default + Deserialize<'de>,
{
	Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Entry of `GET /api/classes`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassInfo {
	/// Display name, also the key for diagram fetches.
	#[serde(default, deserialize_with = "lenient_string")]
	pub label: String,
	/// IRI of the class.
	#[serde(default, deserialize_with = "lenient_opt_string")]
	pub uri: Option<String>,
	/// `skos:definition` text, when present.
	#[serde(default, deserialize_with = "lenient_opt_string")]
	pub definition: Option<String>,
}

/// Entry of `GET /api/relationships`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RelationshipInfo {
	/// Domain class label.
	#[serde(default, deserialize_with = "lenient_string")]
	pub source_class: String,
	/// Property name as stored.
	#[serde(default, deserialize_with = "lenient_string")]
	pub relationship_type: String,
	/// Human label; preferred for display.
	#[serde(default, deserialize_with = "lenient_opt_string")]
	pub relationship_label: Option<String>,
	/// Range class label.
	#[serde(default, deserialize_with = "lenient_string")]
	pub target_class: String,
	/// For example `1` or `0..*`.
	#[serde(default, deserialize_with = "lenient_opt_string")]
	pub cardinality: Option<String>,
	/// `Mandatory`, `Optional` and the like.
	#[serde(default, deserialize_with = "lenient_opt_string")]
	pub requirement: Option<String>,
	/// IRI of the property.
	#[serde(default, deserialize_with = "lenient_opt_string")]
	pub uri: Option<String>,
}

impl RelationshipInfo {
	/// Label if there is one, else the raw type.
	pub fn display_name(&self) -> &str {
		self.relationship_label
			.as_deref()
			.unwrap_or(&self.relationship_type)
	}
}

/// One member of an [`IndividualGroup`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct IndividualMember {
	/// Display name.
	#[serde(default, deserialize_with = "lenient_string")]
	pub label: String,
	/// IRI of the individual.
	#[serde(default, deserialize_with = "lenient_opt_string")]
	pub uri: Option<String>,
	/// Shown as a tooltip.
	#[serde(default, deserialize_with = "lenient_opt_string")]
	pub definition: Option<String>,
}

/// Individuals of one class, from `GET /api/individuals`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct IndividualGroup {
	/// Label of the class the members belong to.
	#[serde(default, deserialize_with = "lenient_string")]
	pub type_label: String,
	/// IRI of that class.
	#[serde(default, deserialize_with = "lenient_opt_string")]
	pub type_uri: Option<String>,
	/// Total members, which may exceed `members.len()`.
	#[serde(default)]
	pub count: usize,
	/// Members returned by the backend.
	#[serde(default, deserialize_with = "null_as_default")]
	pub members: Vec<IndividualMember>,
}

/// Entry of `GET /api/datatypes`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DatatypeInfo {
	/// Display name.
	#[serde(default, deserialize_with = "lenient_string")]
	pub label: String,
	/// IRI of the datatype.
	#[serde(default, deserialize_with = "lenient_opt_string")]
	pub uri: Option<String>,
	/// Free text, truncated in the list.
	#[serde(default, deserialize_with = "lenient_opt_string")]
	pub definition: Option<String>,
}

/// Class in the subclass tree.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HierarchyNode {
	/// Class label.
	#[serde(default, deserialize_with = "lenient_string")]
	pub label: String,
	/// IRI of the class.
	#[serde(default, deserialize_with = "lenient_opt_string")]
	pub uri: Option<String>,
	/// Shown as a tooltip.
	#[serde(default, deserialize_with = "lenient_opt_string")]
	pub definition: Option<String>,
	/// Direct subclasses.
	#[serde(default, deserialize_with = "null_as_default")]
	pub children: Vec<HierarchyNode>,
}

/// `GET /api/class-hierarchy`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassHierarchy {
	/// Number of subclass edges across the whole tree.
	#[serde(default)]
	pub total_edges: usize,
	/// Root classes.
	#[serde(default, deserialize_with = "null_as_default")]
	pub tree: Vec<HierarchyNode>,
}

/// Attribute row of a flattened UML/schema class box.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawAttribute {
	/// Attribute or association name.
	#[serde(default, deserialize_with = "lenient_string")]
	pub name: String,
	/// Datatype or target class label.
	#[serde(rename = "type", default, deserialize_with = "lenient_string")]
	pub type_name: String,
	/// `attribute` or `association`; anything else is treated as an attribute.
	#[serde(default, deserialize_with = "lenient_opt_string")]
	pub kind: Option<String>,
	/// Multiplicity, if the backend knows it.
	#[serde(default, deserialize_with = "lenient_opt_string")]
	pub cardinality: Option<String>,
	/// Free text.
	#[serde(default, deserialize_with = "lenient_opt_string")]
	pub definition: Option<String>,
}

/// Node as emitted by the graph, node-focus and UML endpoints.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawNode {
	/// Unique within one payload; links refer to it.
	#[serde(default, deserialize_with = "lenient_string")]
	pub key: String,
	/// Display name.
	#[serde(default, deserialize_with = "lenient_string")]
	pub label: String,
	/// IRI, when the node has one.
	#[serde(default, deserialize_with = "lenient_opt_string")]
	pub uri: Option<String>,
	/// Free text.
	#[serde(default, deserialize_with = "lenient_opt_string")]
	pub definition: Option<String>,
	/// `class`, `datatype` and so on; unknown values fall back to class.
	#[serde(default, deserialize_with = "lenient_opt_string")]
	pub category: Option<String>,
	/// Marks the node the payload was built around.
	#[serde(rename = "isCenter", default, deserialize_with = "null_as_default")]
	pub is_center: bool,
	/// Enumeration classes in the UML view.
	#[serde(default, deserialize_with = "null_as_default")]
	pub is_enum: bool,
	/// Only filled by the UML endpoint.
	#[serde(default, deserialize_with = "null_as_default")]
	pub attributes: Vec<RawAttribute>,
	/// Stored node properties, in backend order.
	#[serde(default, deserialize_with = "null_as_default")]
	pub properties: IndexMap<String, Value>,
	/// Any field not modelled above.
	#[serde(flatten)]
	pub extra: IndexMap<String, Value>,
}

/// Link as emitted by the diagram endpoints.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawLink {
	/// Key of the source node.
	#[serde(default, deserialize_with = "lenient_string")]
	pub from: String,
	/// Key of the target node.
	#[serde(default, deserialize_with = "lenient_string")]
	pub to: String,
	/// Relationship name; `rdfs__subClassOf` marks inheritance.
	#[serde(default, deserialize_with = "lenient_string")]
	pub relationship: String,
	/// IRI of the relationship.
	#[serde(default, deserialize_with = "lenient_opt_string")]
	pub uri: Option<String>,
	/// Free text.
	#[serde(default, deserialize_with = "lenient_opt_string")]
	pub definition: Option<String>,
	/// Multiplicity on the target end.
	#[serde(default, deserialize_with = "lenient_opt_string")]
	pub cardinality: Option<String>,
	/// `Mandatory`, `Optional` and the like.
	#[serde(default, deserialize_with = "lenient_opt_string")]
	pub requirement: Option<String>,
	/// Backend hint, for example `inheritance`.
	#[serde(default, deserialize_with = "lenient_opt_string")]
	pub category: Option<String>,
	/// Stored relationship properties.
	#[serde(default, deserialize_with = "null_as_default")]
	pub properties: IndexMap<String, Value>,
	/// Any field not modelled above.
	#[serde(flatten)]
	pub extra: IndexMap<String, Value>,
}

/// `{nodes, links, query?}` payload shared by the diagram endpoints.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawGraph {
	/// Node list; may be empty.
	#[serde(default, deserialize_with = "null_as_default")]
	pub nodes: Vec<RawNode>,
	/// Links between `nodes`, possibly dangling.
	#[serde(default, deserialize_with = "null_as_default")]
	pub links: Vec<RawLink>,
	/// Query that produced the payload, if reported.
	#[serde(default, deserialize_with = "lenient_opt_string")]
	pub query: Option<String>,
}

/// `POST /api/cypher` body.
#[derive(Clone, Debug, Serialize)]
pub struct QueryRequest<'a> {
	/// Query text as typed.
	pub query: &'a str,
}

/// Shape of a query result.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultType {
	/// Nodes and links for the diagram.
	Graph,
	/// Rows for the console.
	#[default]
	Table,
}

/// `POST /api/cypher` response; the backend decides the shape.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
	/// Decides between the table and the diagram.
	#[serde(default)]
	pub result_type: ResultType,
	/// One map per row.
	#[serde(default, deserialize_with = "null_as_default")]
	pub results: Vec<IndexMap<String, Value>>,
	/// Column order; derived from the first row when absent.
	#[serde(default)]
	pub table_columns: Option<Vec<String>>,
	/// Set for graph results.
	#[serde(default)]
	pub graph_data: Option<RawGraph>,
	/// Row count as reported.
	#[serde(default)]
	pub count: usize,
}

/// `POST /api/chat` body.
#[derive(Clone, Debug, Serialize)]
pub struct ChatRequest<'a> {
	/// User message.
	pub message: &'a str,
}

/// `POST /api/chat` response.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
	/// Markdown answer.
	#[serde(default, deserialize_with = "lenient_string")]
	pub response: String,
	/// Diagram to show alongside the answer, if any.
	#[serde(default)]
	pub graph_data: Option<RawGraph>,
}

/// `POST /api/llm` body.
#[derive(Clone, Debug, Serialize)]
pub struct LlmSelection<'a> {
	/// One of `LlmStatus::available_llms`.
	pub llm_name: &'a str,
}

/// `GET`/`POST /api/llm`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LlmStatus {
	/// Names the backend can switch to.
	#[serde(default, deserialize_with = "null_as_default")]
	pub available_llms: Vec<String>,
	/// Name in use.
	#[serde(default, deserialize_with = "lenient_string")]
	pub current_llm: String,
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn graph_payload_tolerates_loose_fields() {
		let raw: RawGraph = serde_json::from_value(json!({
			"nodes": [
				{"key": "Invoice", "label": ["Invoice", "Rechnung"], "uri": null, "category": "class",
				 "isCenter": true, "properties": {"rdfs__label": "Invoice", "status": "draft"}, "_id": "4:abc:1"},
				{"key": 7, "label": "Amount", "category": "datatype", "properties": null}
			],
			"links": [{"from": "Invoice", "to": "7", "relationship": "hasAmount", "cardinality": "1"}],
			"query": "MATCH (c) RETURN c"
		}))
		.unwrap();

		assert_eq!(raw.nodes[0].label, "Invoice");
		assert!(raw.nodes[0].is_center);
		assert_eq!(raw.nodes[0].uri, None);
		assert_eq!(raw.nodes[0].extra.get("_id"), Some(&json!("4:abc:1")));
		assert_eq!(raw.nodes[1].key, "7");
		assert!(raw.nodes[1].properties.is_empty());
		assert_eq!(raw.links[0].cardinality.as_deref(), Some("1"));
		assert_eq!(raw.query.as_deref(), Some("MATCH (c) RETURN c"));
	}

	#[test]
	fn missing_collections_default_to_empty() {
		let raw: RawGraph = serde_json::from_value(json!({"nodes": null})).unwrap();
		assert!(raw.nodes.is_empty());
		assert!(raw.links.is_empty());
		assert_eq!(raw.query, None);
	}

	#[test]
	fn uml_attributes_deserialize() {
		let node: RawNode = serde_json::from_value(json!({
			"key": "4:x:9", "label": "Invoice", "is_enum": false,
			"attributes": [
				{"name": "hasAmount", "type": "decimal", "cardinality": "1"},
				{"name": "hasParty", "type": "Party", "kind": "association"}
			]
		}))
		.unwrap();
		assert_eq!(node.attributes.len(), 2);
		assert_eq!(node.attributes[0].type_name, "decimal");
		assert_eq!(node.attributes[1].kind.as_deref(), Some("association"));
	}

	#[test]
	fn query_response_table() {
		let resp: QueryResponse = serde_json::from_value(json!({
			"result_type": "table", "results": [{"name": "x"}], "table_columns": ["name"], "count": 1
		}))
		.unwrap();
		assert_eq!(resp.result_type, ResultType::Table);
		assert_eq!(resp.results[0].get("name"), Some(&json!("x")));
		assert_eq!(resp.graph_data, None);
	}

	#[test]
	fn hierarchy_nests_children() {
		let tree: ClassHierarchy = serde_json::from_value(json!({
			"total_edges": 1, "root_count": 1,
			"tree": [{"label": "Agent", "children": [{"label": "Person", "children": []}]}]
		}))
		.unwrap();
		assert_eq!(tree.tree[0].children[0].label, "Person");
	}
}

//! Raw payload -> committed [`DiagramModel`].

use std::collections::HashSet;

use indexmap::IndexMap;
use log::warn;
use serde_json::Value;

use super::model::*;
use crate::api::types::{RawAttribute, RawGraph, RawLink, RawNode};

/// Result of one translation, with diagnostics for the log.
#[derive(Clone, Debug, PartialEq)]
pub struct Translation {
	/// The model ready to commit.
	pub model: DiagramModel,
	/// Links whose endpoints were not in the node set.
	pub dropped_links: usize,
	/// Nodes whose key repeated an earlier node in the same payload.
	pub duplicate_nodes: usize,
}

fn node_category(raw: Option<&str>, mode: Mode) -> NodeCategory {
	let semantic = match raw.map(str::to_ascii_lowercase).as_deref() {
		Some("datatype") => NodeCategory::Datatype,
		Some("individual") => NodeCategory::Individual,
		_ => NodeCategory::Class,
	};
	match (mode, semantic) {
		(_, NodeCategory::Datatype) | (Mode::Graph, _) => semantic,
		(Mode::Uml, _) => NodeCategory::Uml,
		(Mode::Pydantic, _) => NodeCategory::Pydantic,
	}
}

fn scalars(props: &IndexMap<String, Value>) -> IndexMap<String, Scalar> {
	props
		.iter()
		.map(|(k, v)| (k.clone(), Scalar::from(v)))
		.collect()
}

/// Declared properties, then any unrecognised top-level fields that are not
/// backend internals (leading underscore).
fn merged_properties(
	props: &IndexMap<String, Value>,
	extra: &IndexMap<String, Value>,
) -> IndexMap<String, Scalar> {
	let mut out = scalars(props);
	for (k, v) in extra {
		if !k.starts_with('_') && !out.contains_key(k) {
			out.insert(k.clone(), Scalar::from(v));
		}
	}
	out
}

fn attribute(raw: &RawAttribute) -> UmlAttribute {
	UmlAttribute {
		name: raw.name.clone(),
		type_name: raw.type_name.clone(),
		kind: match raw.kind.as_deref() {
			Some("association") => AttributeKind::Association,
			_ => AttributeKind::Scalar,
		},
		cardinality: raw.cardinality.clone(),
	}
}

fn node(raw: &RawNode, mode: Mode) -> GraphNode {
	let category = node_category(raw.category.as_deref(), mode);
	GraphNode {
		key: raw.key.clone(),
		label: if raw.label.is_empty() {
			raw.key.clone()
		} else {
			raw.label.clone()
		},
		uri: raw.uri.clone().unwrap_or_default(),
		definition: raw.definition.clone(),
		category,
		is_center: raw.is_center,
		is_enum: raw.is_enum,
		attributes: if category.is_box() {
			raw.attributes.iter().map(attribute).collect()
		} else {
			Vec::new()
		},
		properties: merged_properties(&raw.properties, &raw.extra),
	}
}

fn link(raw: &RawLink) -> GraphLink {
	let prop_str = |name: &str| match raw.properties.get(name) {
		Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
		_ => None,
	};
	let category = match raw.category.as_deref() {
		Some("inheritance") => LinkCategory::Inheritance,
		_ if raw.relationship == "rdfs__subClassOf" => LinkCategory::Inheritance,
		_ => LinkCategory::Default,
	};
	GraphLink {
		from: raw.from.clone(),
		to: raw.to.clone(),
		relationship: if raw.relationship.is_empty() {
			"relates_to".to_string()
		} else {
			raw.relationship.clone()
		},
		uri: raw.uri.clone(),
		definition: raw.definition.clone(),
		cardinality: raw.cardinality.clone().or_else(|| prop_str("cardinality")),
		requirement: raw
			.requirement
			.clone()
			.or_else(|| prop_str("requirement"))
			.as_deref()
			.and_then(Requirement::parse),
		category,
		properties: merged_properties(&raw.properties, &raw.extra),
	}
}

/// Build a fresh model for `mode`.
///
/// Node keys are taken verbatim. In the box modes every non-datatype node is
/// re-categorised as the mode's box. Links that would dangle are dropped.
pub fn translate(raw: &RawGraph, mode: Mode, is_light: bool, revision: u64) -> Translation {
	let mut keys = HashSet::with_capacity(raw.nodes.len());
	let mut nodes = Vec::with_capacity(raw.nodes.len());
	let mut duplicate_nodes = 0;
	for raw_node in &raw.nodes {
		if !keys.insert(raw_node.key.as_str()) {
			duplicate_nodes += 1;
			continue;
		}
		nodes.push(node(raw_node, mode));
	}

	let links: Vec<GraphLink> = raw
		.links
		.iter()
		.filter(|l| keys.contains(l.from.as_str()) && keys.contains(l.to.as_str()))
		.map(link)
		.collect();
	let dropped_links = raw.links.len() - links.len();

	if dropped_links > 0 {
		warn!("dropped {dropped_links} link(s) with endpoints outside the payload");
	}
	if duplicate_nodes > 0 {
		warn!("ignored {duplicate_nodes} node(s) with repeated keys");
	}

	Translation {
		model: DiagramModel {
			revision,
			mode,
			nodes,
			links,
			is_light,
		},
		dropped_links,
		duplicate_nodes,
	}
}

#[cfg(test)]
mod tests {
	use rstest::rstest;
	use serde_json::json;

	use super::*;

	fn payload() -> RawGraph {
		serde_json::from_value(json!({
			"nodes": [
				{"key": "Invoice", "label": "Invoice", "category": "class", "isCenter": true,
				 "properties": {"uri": "http://x/Invoice", "status": "draft"}, "_id": "4:a:1"},
				{"key": "Party", "label": "Party", "category": "class",
				 "attributes": [{"name": "name", "type": "string"}]},
				{"key": "decimal", "label": "decimal", "category": "datatype"},
				{"key": "Paid", "label": "Paid", "category": "individual"}
			],
			"links": [
				{"from": "Invoice", "to": "Party", "relationship": "hasParty", "requirement": "Mandatory"},
				{"from": "Invoice", "to": "decimal", "relationship": "hasAmount",
				 "properties": {"cardinality": "1"}},
				{"from": "Invoice", "to": "Ghost", "relationship": "haunts"},
				{"from": "Party", "to": "Invoice", "relationship": "rdfs__subClassOf"}
			]
		}))
		.unwrap()
	}

	#[test]
	fn graph_mode_keeps_semantic_categories() {
		let t = translate(&payload(), Mode::Graph, false, 1);
		let cats: Vec<_> = t.model.nodes.iter().map(|n| n.category).collect();
		assert_eq!(
			cats,
			[
				NodeCategory::Class,
				NodeCategory::Class,
				NodeCategory::Datatype,
				NodeCategory::Individual
			]
		);
		assert!(t.model.nodes[0].is_center);
		assert!(t.model.nodes[1].attributes.is_empty());
	}

	#[rstest]
	#[case(Mode::Uml, NodeCategory::Uml)]
	#[case(Mode::Pydantic, NodeCategory::Pydantic)]
	fn box_modes_override_all_but_datatypes(#[case] mode: Mode, #[case] expected: NodeCategory) {
		let t = translate(&payload(), mode, true, 3);
		for n in &t.model.nodes {
			if n.key == "decimal" {
				assert_eq!(n.category, NodeCategory::Datatype);
			} else {
				assert_eq!(n.category, expected, "node {}", n.key);
			}
		}
		assert_eq!(t.model.nodes[1].attributes[0].type_name, "string");
		assert!(t.model.is_light);
		assert_eq!(t.model.revision, 3);
	}

	#[test]
	fn dangling_links_are_dropped_and_counted() {
		let t = translate(&payload(), Mode::Graph, false, 1);
		assert_eq!(t.dropped_links, 1);
		assert_eq!(t.model.links.len(), 3);
		for l in &t.model.links {
			assert!(t.model.node(&l.from).is_some());
			assert!(t.model.node(&l.to).is_some());
		}
	}

	#[test]
	fn link_fields_are_normalised() {
		let t = translate(&payload(), Mode::Graph, false, 1);
		assert_eq!(t.model.links[0].requirement, Some(Requirement::Mandatory));
		assert_eq!(t.model.links[1].cardinality.as_deref(), Some("1"));
		assert_eq!(t.model.links[2].category, LinkCategory::Inheritance);
		assert_eq!(t.model.links[0].category, LinkCategory::Default);
	}

	#[test]
	fn keys_are_kept_verbatim_and_duplicates_ignored() {
		let mut raw = payload();
		raw.nodes.push(raw.nodes[0].clone());
		let t = translate(&raw, Mode::Graph, false, 1);
		assert_eq!(t.duplicate_nodes, 1);
		assert_eq!(t.model.nodes.len(), 4);
		assert_eq!(t.model.nodes[0].key, "Invoice");
	}

	#[test]
	fn backend_internals_stay_out_of_properties() {
		let t = translate(&payload(), Mode::Graph, false, 1);
		let props = &t.model.nodes[0].properties;
		assert_eq!(props.get("status"), Some(&Scalar::Text("draft".into())));
		assert!(!props.contains_key("_id"));
	}
}

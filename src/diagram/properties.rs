//! Properties panel content for the selected node or link.
//!
//! Everything here is a pure function of the committed model; the panel
//! never talks to the backend.

use std::fmt::Write;

use super::coordinator::Coordinator;
use super::model::*;
use crate::format::escape_html;

const NODE_TECHNICAL_KEYS: &[&str] = &[
	"key",
	"category",
	"isCenter",
	"__gohashid",
	"materialized",
	"rdfs__label",
	"uri",
	"skos__definition",
];

const LINK_TECHNICAL_KEYS: &[&str] = &[
	"from",
	"to",
	"relationship",
	"uri",
	"skos__definition",
	"materialized",
	"materialized_path",
	"_rel_type",
	"__gohashid",
];

/// Heading colour of a sheet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Accent {
	/// Classes and UML or pydantic boxes.
	Class,
	/// Datatype nodes.
	Datatype,
	/// Individual nodes.
	Individual,
	/// Any link.
	Relationship,
}

impl Accent {
	fn css_class(self) -> &'static str {
		match self {
			Accent::Class => "accent-class",
			Accent::Datatype => "accent-datatype",
			Accent::Individual => "accent-individual",
			Accent::Relationship => "accent-relationship",
		}
	}
}

/// Fixed row such as URI or Cardinality.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropertyRow {
	/// Row caption.
	pub label: &'static str,
	/// Unescaped value.
	pub value: String,
	/// Render the value as an external link.
	pub is_link: bool,
}

impl PropertyRow {
	fn text(label: &'static str, value: impl Into<String>) -> Self {
		Self {
			label,
			value: value.into(),
			is_link: false,
		}
	}
}

/// Structured content of the properties panel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropertySheet {
	/// Heading colour.
	pub accent: Accent,
	/// For example `Class: Invoice`.
	pub title: String,
	/// Fixed rows, in display order.
	pub rows: Vec<PropertyRow>,
	/// Heading over `extras`.
	pub extras_heading: &'static str,
	/// Stored properties, technical keys removed.
	pub extras: Vec<(String, String)>,
}

impl PropertySheet {
	/// First row with the given caption.
	pub fn row(&self, label: &str) -> Option<&PropertyRow> {
		self.rows.iter().find(|r| r.label == label)
	}
}

/// Sheet for a node, titled by its category.
pub fn node_sheet(node: &GraphNode) -> PropertySheet {
	let accent = match node.category {
		NodeCategory::Datatype => Accent::Datatype,
		NodeCategory::Individual => Accent::Individual,
		_ => Accent::Class,
	};
	let mut rows = Vec::new();
	if !node.uri.is_empty() {
		rows.push(PropertyRow {
			label: "URI",
			value: node.uri.clone(),
			is_link: true,
		});
	}
	if let Some(def) = node.definition.as_ref().filter(|d| !d.is_empty()) {
		rows.push(PropertyRow::text("Definition", def.clone()));
	}
	rows.push(PropertyRow::text("Category", node.category.title()));
	if node.category.is_box() && !node.attributes.is_empty() {
		rows.push(PropertyRow::text(
			"Attributes",
			node.attributes
				.iter()
				.map(|a| format!("{}: {}", a.name, a.type_name))
				.collect::<Vec<_>>()
				.join(", "),
		));
	}

	PropertySheet {
		accent,
		title: format!("{}: {}", node.category.title(), node.label),
		rows,
		extras_heading: "Metadata / Flattened Properties",
		extras: node
			.properties
			.iter()
			.filter(|(k, _)| !NODE_TECHNICAL_KEYS.contains(&k.as_str()))
			.map(|(k, v)| (k.clone(), v.to_string()))
			.collect(),
	}
}

/// Link endpoints are shown by label when `model` knows them.
pub fn link_sheet(link: &GraphLink, model: Option<&DiagramModel>) -> PropertySheet {
	let endpoint = |key: &str| {
		model
			.map(|m| m.label_of(key).to_string())
			.unwrap_or_else(|| key.to_string())
	};
	let mut rows = vec![
		PropertyRow::text("From", endpoint(&link.from)),
		PropertyRow::text("To", endpoint(&link.to)),
	];
	if let Some(uri) = link.uri.as_ref().filter(|u| !u.is_empty()) {
		rows.push(PropertyRow {
			label: "URI",
			value: uri.clone(),
			is_link: true,
		});
	}
	if let Some(def) = link.definition.as_ref().filter(|d| !d.is_empty()) {
		rows.push(PropertyRow::text("Definition", def.clone()));
	}
	if let Some(card) = &link.cardinality {
		rows.push(PropertyRow::text("Cardinality", card.clone()));
	}
	if let Some(req) = link.requirement {
		rows.push(PropertyRow::text("Requirement", req.as_str()));
	}
	if link.category == LinkCategory::Inheritance {
		rows.push(PropertyRow::text("Kind", "Inheritance"));
	}

	PropertySheet {
		accent: Accent::Relationship,
		title: format!("Relationship: {}", link.relationship),
		rows,
		extras_heading: "Attributes",
		extras: link
			.properties
			.iter()
			.filter(|(k, _)| !LINK_TECHNICAL_KEYS.contains(&k.as_str()))
			.map(|(k, v)| (k.clone(), v.to_string()))
			.collect(),
	}
}

/// Sheet for whatever the coordinator currently has selected.
pub fn sheet_for_selection(coordinator: &Coordinator) -> Option<PropertySheet> {
	let model = coordinator.model().map(|m| m.as_ref());
	match coordinator.selected()? {
		Selected::Node(node) => Some(node_sheet(node)),
		Selected::Link(link) => Some(link_sheet(link, model)),
	}
}

fn push_item(html: &mut String, label: &str, value_html: &str) {
	let _ = write!(
		html,
		r#"<div class="property-item"><div class="property-label">{}</div><div class="property-value">{value_html}</div></div>"#,
		escape_html(label)
	);
}

/// Escaped HTML for the properties container.
pub fn render_html(sheet: &PropertySheet) -> String {
	let mut html = format!(
		r#"<div class="property-section"><h3 class="{}">{}</h3>"#,
		sheet.accent.css_class(),
		escape_html(&sheet.title)
	);
	for row in &sheet.rows {
		let value = escape_html(&row.value);
		if row.is_link {
			push_item(
				&mut html,
				row.label,
				&format!(r#"<a href="{value}" target="_blank" rel="noopener">{value}</a>"#),
			);
		} else {
			push_item(&mut html, row.label, &value);
		}
	}
	if !sheet.extras.is_empty() {
		let _ = write!(
			html,
			r#"<div class="property-extras"><h4>{}</h4>"#,
			escape_html(sheet.extras_heading)
		);
		for (k, v) in &sheet.extras {
			push_item(&mut html, k, &escape_html(v));
		}
		html.push_str("</div>");
	}
	html.push_str("</div>");
	html
}

#[cfg(test)]
mod tests {
	use indexmap::IndexMap;

	use super::*;

	fn node() -> GraphNode {
		let mut properties = IndexMap::new();
		properties.insert("rdfs__label".to_string(), Scalar::Text("Invoice".into()));
		properties.insert("materialized".to_string(), Scalar::Bool(true));
		properties.insert("status".to_string(), Scalar::Text("<draft>".into()));
		GraphNode {
			key: "c1".into(),
			label: "Invoice".into(),
			uri: "http://example.org/Invoice".into(),
			definition: Some("A bill".into()),
			properties,
			..Default::default()
		}
	}

	#[test]
	fn node_sheet_filters_technical_keys() {
		let sheet = node_sheet(&node());
		assert_eq!(sheet.title, "Class: Invoice");
		assert!(sheet.row("URI").unwrap().is_link);
		assert_eq!(sheet.row("Definition").unwrap().value, "A bill");
		assert_eq!(sheet.extras, vec![("status".to_string(), "<draft>".to_string())]);
	}

	#[test]
	fn link_sheet_resolves_endpoint_labels() {
		let model = DiagramModel {
			nodes: vec![node()],
			..Default::default()
		};
		let mut properties = IndexMap::new();
		properties.insert("_rel_type".to_string(), Scalar::Text("hasParty".into()));
		properties.insert("note".to_string(), Scalar::Int(2));
		let link = GraphLink {
			from: "c1".into(),
			to: "p9".into(),
			relationship: "hasParty".into(),
			cardinality: Some("1..*".into()),
			requirement: Some(Requirement::Optional),
			properties,
			..Default::default()
		};
		let sheet = link_sheet(&link, Some(&model));
		assert_eq!(sheet.title, "Relationship: hasParty");
		assert_eq!(sheet.row("From").unwrap().value, "Invoice");
		assert_eq!(sheet.row("To").unwrap().value, "p9");
		assert_eq!(sheet.row("Requirement").unwrap().value, "Optional");
		assert!(sheet.row("URI").is_none());
		assert_eq!(sheet.extras, vec![("note".to_string(), "2".to_string())]);
	}

	#[test]
	fn rendered_html_is_escaped() {
		let html = render_html(&node_sheet(&node()));
		assert!(html.contains("&lt;draft&gt;"));
		assert!(!html.contains("<draft>"));
		assert!(html.contains(r#"href="http://example.org/Invoice""#));
		assert!(html.contains("Metadata / Flattened Properties"));
	}
}

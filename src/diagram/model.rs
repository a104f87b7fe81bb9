//! Committed diagram types. Nothing here knows about the wire format.

use std::fmt;

use indexmap::IndexMap;
use serde_json::Value;

/// Rendering style of the diagram.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Mode {
	/// Force-directed circles.
	#[default]
	Graph,
	/// Class boxes with attribute rows.
	Uml,
	/// Class boxes styled as schema models.
	Pydantic,
}

impl Mode {
	/// Toolbar order.
	pub const ALL: [Mode; 3] = [Mode::Graph, Mode::Uml, Mode::Pydantic];

	/// Lowercase name used in logs.
	pub fn as_str(self) -> &'static str {
		match self {
			Mode::Graph => "graph",
			Mode::Uml => "uml",
			Mode::Pydantic => "pydantic",
		}
	}

	/// Button caption.
	pub fn title(self) -> &'static str {
		match self {
			Mode::Graph => "Graph",
			Mode::Uml => "UML",
			Mode::Pydantic => "Pydantic",
		}
	}
}

/// Colour scheme; dark unless configured or stored otherwise.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Theme {
	/// Light backgrounds.
	Light,
	/// Dark backgrounds.
	#[default]
	Dark,
}

impl Theme {
	/// True for [`Theme::Light`].
	pub fn is_light(self) -> bool {
		self == Theme::Light
	}

	/// Inverse of [`is_light`](Self::is_light).
	pub fn from_light(is_light: bool) -> Self {
		if is_light { Theme::Light } else { Theme::Dark }
	}

	/// The other theme.
	pub fn toggled(self) -> Self {
		Self::from_light(!self.is_light())
	}

	/// Value stored in localStorage and set as `data-theme`.
	pub fn as_str(self) -> &'static str {
		match self {
			Theme::Light => "light",
			Theme::Dark => "dark",
		}
	}

	/// Case-insensitive; `None` for anything but `light` or `dark`.
	pub fn parse(s: &str) -> Option<Self> {
		match s.trim().to_ascii_lowercase().as_str() {
			"light" => Some(Theme::Light),
			"dark" => Some(Theme::Dark),
			_ => None,
		}
	}
}

/// What is on screen: mode, focal class and theme.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ViewState {
	/// Mode used for the next fetch and the committed model.
	pub mode: Mode,
	/// Class the diagram is about; `None` before the first commit.
	pub focal_label: Option<String>,
	/// Current theme, mirrored into the model's `is_light`.
	pub theme: Theme,
}

/// Display category of a committed node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum NodeCategory {
	/// Ontology class, drawn as a circle.
	#[default]
	Class,
	/// Datatype; stays a circle in every mode.
	Datatype,
	/// Named individual.
	Individual,
	/// Class box in UML mode.
	Uml,
	/// Class box in pydantic mode.
	Pydantic,
}

impl NodeCategory {
	/// Heading used by the properties panel.
	pub fn title(self) -> &'static str {
		match self {
			NodeCategory::Datatype => "Datatype",
			NodeCategory::Individual => "Individual",
			NodeCategory::Class | NodeCategory::Uml | NodeCategory::Pydantic => "Class",
		}
	}

	/// Whether the node is drawn as a box with attribute rows.
	pub fn is_box(self) -> bool {
		matches!(self, NodeCategory::Uml | NodeCategory::Pydantic)
	}
}

/// Whether an attribute row holds a value or points at another class.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AttributeKind {
	/// Datatype-valued.
	#[default]
	Scalar,
	/// Class-valued; drawn in its own colour.
	Association,
}

/// Row inside a UML or schema box.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UmlAttribute {
	/// Left-hand side of the row.
	pub name: String,
	/// Right-hand side of the row.
	pub type_name: String,
	/// Value or class reference.
	pub kind: AttributeKind,
	/// Multiplicity, when known.
	pub cardinality: Option<String>,
}

/// Property value kept for display only.
#[derive(Clone, Debug, PartialEq)]
pub enum Scalar {
	/// JSON `null`.
	Null,
	/// JSON boolean.
	Bool(bool),
	/// Integral number.
	Int(i64),
	/// Any other number.
	Float(f64),
	/// Strings, plus arrays and objects flattened to text.
	Text(String),
}

impl From<&Value> for Scalar {
	fn from(value: &Value) -> Self {
		match value {
			Value::Null => Scalar::Null,
			Value::Bool(b) => Scalar::Bool(*b),
			Value::Number(n) => match n.as_i64() {
				Some(i) => Scalar::Int(i),
				None => Scalar::Float(n.as_f64().unwrap_or_default()),
			},
			other => Scalar::Text(crate::format::cell_text(other)),
		}
	}
}

impl fmt::Display for Scalar {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Scalar::Null => f.write_str("null"),
			Scalar::Bool(b) => write!(f, "{b}"),
			Scalar::Int(i) => write!(f, "{i}"),
			Scalar::Float(x) => write!(f, "{x}"),
			Scalar::Text(s) => f.write_str(s),
		}
	}
}

/// A committed node.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphNode {
	/// Unique within the model; links and selections refer to it.
	pub key: String,
	/// Display name.
	pub label: String,
	/// IRI, or empty when the backend sent none.
	pub uri: String,
	/// Free text for the properties panel.
	pub definition: Option<String>,
	/// Decides the node's shape.
	pub category: NodeCategory,
	/// The node the payload was built around.
	pub is_center: bool,
	/// Enumeration class; gets a stereotype line in box modes.
	pub is_enum: bool,
	/// Box rows; empty outside UML and pydantic modes.
	pub attributes: Vec<UmlAttribute>,
	/// Stored properties in backend order, technical keys included.
	pub properties: IndexMap<String, Scalar>,
}

/// Whether a relationship must be present on its source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Requirement {
	/// Also accepted as `required`.
	Mandatory,
	/// May be absent.
	Optional,
}

impl Requirement {
	/// Case-insensitive; unknown values give `None`.
	pub fn parse(s: &str) -> Option<Self> {
		match s.trim().to_ascii_lowercase().as_str() {
			"mandatory" | "required" => Some(Requirement::Mandatory),
			"optional" => Some(Requirement::Optional),
			_ => None,
		}
	}

	/// Capitalised, as shown in badges.
	pub fn as_str(self) -> &'static str {
		match self {
			Requirement::Mandatory => "Mandatory",
			Requirement::Optional => "Optional",
		}
	}
}

/// How a link is drawn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LinkCategory {
	/// Solid line with an arrow.
	#[default]
	Default,
	/// Subclass edge: dashed, ending in a hollow triangle.
	Inheritance,
}

/// A committed link. Both endpoints are keys of nodes in the same model.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphLink {
	/// Source node key.
	pub from: String,
	/// Target node key.
	pub to: String,
	/// Label drawn at the midpoint.
	pub relationship: String,
	/// IRI of the relationship.
	pub uri: Option<String>,
	/// Free text for the properties panel.
	pub definition: Option<String>,
	/// Multiplicity on the target end.
	pub cardinality: Option<String>,
	/// Parsed requirement; unrecognised values are dropped.
	pub requirement: Option<Requirement>,
	/// Drawing style.
	pub category: LinkCategory,
	/// Stored properties in backend order.
	pub properties: IndexMap<String, Scalar>,
}

/// The node/link model handed to the rendering engine.
///
/// `is_light` is the single theme slot every renderer reads; nodes carry no
/// theme of their own.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DiagramModel {
	/// Token of the commit that produced this model.
	pub revision: u64,
	/// Mode the payload was translated for.
	pub mode: Mode,
	/// Unique by key, in payload order.
	pub nodes: Vec<GraphNode>,
	/// Only links whose endpoints are in `nodes`.
	pub links: Vec<GraphLink>,
	/// Theme slot; rewritten in place by a theme change.
	pub is_light: bool,
}

impl DiagramModel {
	/// Node with the given key.
	pub fn node(&self, key: &str) -> Option<&GraphNode> {
		self.nodes.iter().find(|n| n.key == key)
	}

	/// First node marked as the centre, if any.
	pub fn center(&self) -> Option<&GraphNode> {
		self.nodes.iter().find(|n| n.is_center)
	}

	/// Label of `key`, falling back to the key itself.
	pub fn label_of<'a>(&'a self, key: &'a str) -> &'a str {
		self.node(key).map(|n| n.label.as_str()).unwrap_or(key)
	}
}

/// Element picked in the diagram.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SelectionRef {
	/// Key of a node.
	Node(String),
	/// Index into [`DiagramModel::links`].
	Link(usize),
}

/// A resolved selection borrowed from the committed model.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Selected<'a> {
	/// A node of the model.
	Node(&'a GraphNode),
	/// A link of the model.
	Link(&'a GraphLink),
}

impl DiagramModel {
	/// `None` when the selection no longer matches anything in this model.
	pub fn resolve(&self, selection: &SelectionRef) -> Option<Selected<'_>> {
		match selection {
			SelectionRef::Node(key) => self.node(key).map(Selected::Node),
			SelectionRef::Link(idx) => self.links.get(*idx).map(Selected::Link),
		}
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn theme_round_trips_through_storage_strings() {
		assert_eq!(Theme::parse("Light"), Some(Theme::Light));
		assert_eq!(Theme::parse(Theme::Dark.as_str()), Some(Theme::Dark));
		assert_eq!(Theme::parse("sepia"), None);
		assert_eq!(Theme::Dark.toggled(), Theme::Light);
	}

	#[test]
	fn scalars_from_json() {
		assert_eq!(Scalar::from(&json!(3)), Scalar::Int(3));
		assert_eq!(Scalar::from(&json!(1.5)), Scalar::Float(1.5));
		assert_eq!(Scalar::from(&json!(["a", "b"])).to_string(), "a, b");
		assert_eq!(Scalar::from(&json!(null)).to_string(), "null");
	}

	#[test]
	fn requirement_parsing() {
		assert_eq!(Requirement::parse("Mandatory"), Some(Requirement::Mandatory));
		assert_eq!(Requirement::parse(" optional "), Some(Requirement::Optional));
		assert_eq!(Requirement::parse("maybe"), None);
	}

	#[test]
	fn label_lookup_falls_back_to_key() {
		let model = DiagramModel {
			nodes: vec![GraphNode {
				key: "4:x:1".into(),
				label: "Invoice".into(),
				..Default::default()
			}],
			..Default::default()
		};
		assert_eq!(model.label_of("4:x:1"), "Invoice");
		assert_eq!(model.label_of("missing"), "missing");
	}
}

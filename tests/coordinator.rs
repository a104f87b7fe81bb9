//! Coordinator behaviour driven purely through intents and resolutions.

use rstest::rstest;
use serde_json::json;

use onto_modeller::api::types::QueryResponse;
use onto_modeller::api::{FetchRequest, RawGraph};
use onto_modeller::diagram::properties::{node_sheet, sheet_for_selection};
use onto_modeller::diagram::{
	Coordinator, DiagramModel, Intent, Mode, NodeCategory, Outcome, SelectionRef, Theme,
};
use onto_modeller::query::{QueryView, shape};

fn raw(value: serde_json::Value) -> RawGraph {
	serde_json::from_value(value).unwrap()
}

fn invoice() -> RawGraph {
	raw(json!({
		"nodes": [{"key": "c1", "label": "Invoice", "category": "class"}],
		"links": []
	}))
}

fn class_graph(label: &str) -> RawGraph {
	raw(json!({
		"nodes": [
			{"key": format!("{label}-k"), "label": label, "category": "class", "isCenter": true},
			{"key": "amount", "label": "Amount", "category": "datatype"}
		],
		"links": [
			{"from": format!("{label}-k"), "to": "amount", "relationship": "hasAmount"},
			{"from": format!("{label}-k"), "to": "missing", "relationship": "dangling"}
		]
	}))
}

fn loaded(label: &str) -> Coordinator {
	let mut c = Coordinator::new(Theme::Dark);
	let fetch = c.dispatch(Intent::SelectClass(label.into())).unwrap();
	c.resolve(fetch.token, Ok(class_graph(label)));
	c
}

fn assert_link_integrity(model: &DiagramModel) {
	for link in &model.links {
		assert!(model.node(&link.from).is_some(), "dangling from {}", link.from);
		assert!(model.node(&link.to).is_some(), "dangling to {}", link.to);
	}
}

#[test]
fn set_theme_twice_is_idempotent_and_keeps_selection() {
	let mut c = loaded("Invoice");
	c.dispatch(Intent::Select(Some(SelectionRef::Node("Invoice-k".into()))));

	c.dispatch(Intent::SetTheme(Theme::Light));
	let once = c.model().cloned().unwrap();
	c.dispatch(Intent::SetTheme(Theme::Light));
	let twice = c.model().cloned().unwrap();

	assert!(twice.is_light);
	assert_eq!(once, twice);
	assert_eq!(c.selection(), Some(&SelectionRef::Node("Invoice-k".into())));
}

#[test]
fn set_theme_keeps_the_revision() {
	let mut c = loaded("Invoice");
	let before = c.model().unwrap().revision;
	c.dispatch(Intent::SetTheme(Theme::Light));
	assert_eq!(c.model().unwrap().revision, before);
}

#[rstest]
#[case::in_order(false)]
#[case::reversed(true)]
fn only_the_latest_class_commits(#[case] b_first: bool) {
	let mut c = Coordinator::new(Theme::Dark);
	let a = c.dispatch(Intent::SelectClass("A".into())).unwrap();
	let b = c.dispatch(Intent::SelectClass("B".into())).unwrap();
	assert_eq!(a.request, FetchRequest::Graph("A".into()));
	assert_eq!(b.request, FetchRequest::Graph("B".into()));

	let (first, second) = if b_first {
		((b.token, "B"), (a.token, "A"))
	} else {
		((a.token, "A"), (b.token, "B"))
	};
	c.resolve(first.0, Ok(class_graph(first.1)));
	c.resolve(second.0, Ok(class_graph(second.1)));

	let model = c.model().unwrap();
	assert_eq!(model.center().map(|n| n.label.as_str()), Some("B"));
	assert_eq!(c.view().focal_label.as_deref(), Some("B"));
	assert!(!c.is_loading());
}

#[test]
fn stale_response_reports_stale() {
	let mut c = Coordinator::new(Theme::Dark);
	let a = c.dispatch(Intent::SelectClass("A".into())).unwrap();
	c.dispatch(Intent::SelectClass("B".into())).unwrap();
	assert_eq!(c.resolve(a.token, Ok(class_graph("A"))), Outcome::Stale);
	assert!(c.model().is_none());
}

#[rstest]
#[case(Mode::Graph)]
#[case(Mode::Uml)]
#[case(Mode::Pydantic)]
fn switching_to_the_current_mode_is_a_no_op(#[case] mode: Mode) {
	let mut c = loaded("Invoice");
	if mode != Mode::Graph {
		let f = c.dispatch(Intent::SwitchMode(mode)).unwrap();
		c.resolve(f.token, Ok(class_graph("Invoice")));
	}
	let model = c.model().cloned();
	let view = c.view().clone();

	assert_eq!(c.dispatch(Intent::SwitchMode(mode)), None);
	assert_eq!(c.model().cloned(), model);
	assert_eq!(c.view(), &view);
	assert!(!c.is_loading());
}

#[test]
fn empty_focus_changes_nothing() {
	let mut c = loaded("Invoice");
	let model = c.model().cloned();
	let view = c.view().clone();

	let f = c.dispatch(Intent::FocusNode("Amount".into())).unwrap();
	assert_eq!(f.request, FetchRequest::NodeFocus("Amount".into()));
	let outcome = c.resolve(f.token, Ok(raw(json!({"nodes": [], "links": []}))));

	assert_eq!(outcome, Outcome::EmptyFocus);
	assert_eq!(c.model().cloned(), model);
	assert_eq!(c.view(), &view);
}

#[test]
fn committed_links_always_reference_committed_nodes() {
	let mut c = loaded("Invoice");
	assert_link_integrity(c.model().unwrap());
	assert_eq!(c.model().unwrap().links.len(), 1);

	c.dispatch(Intent::ShowGraph(raw(json!({
		"nodes": [{"key": "x", "label": "X"}],
		"links": [
			{"from": "x", "to": "x", "relationship": "self"},
			{"from": "y", "to": "x", "relationship": "orphan"}
		]
	}))));
	assert_link_integrity(c.model().unwrap());
	assert_eq!(c.model().unwrap().links.len(), 1);
}

#[test]
fn invoice_loads_as_one_class_node() {
	let mut c = Coordinator::new(Theme::Dark);
	let f = c.dispatch(Intent::SelectClass("Invoice".into())).unwrap();
	assert_eq!(f.request, FetchRequest::Graph("Invoice".into()));
	c.resolve(f.token, Ok(invoice()));

	let model = c.model().unwrap();
	assert_eq!(model.nodes.len(), 1);
	assert!(model.links.is_empty());

	c.dispatch(Intent::Select(Some(SelectionRef::Node("c1".into()))));
	let sheet = sheet_for_selection(&c).unwrap();
	assert_eq!(sheet.title, "Class: Invoice");
	assert!(sheet.row("From").is_none());
	assert!(sheet.row("To").is_none());
	assert!(sheet.row("Cardinality").is_none());
	assert_eq!(sheet, node_sheet(&c.model().unwrap().nodes[0]));
}

#[test]
fn switching_to_uml_refetches_the_focal_class_once() {
	let mut c = loaded("Invoice");
	let f = c.dispatch(Intent::SwitchMode(Mode::Uml)).unwrap();
	assert_eq!(f.request, FetchRequest::Uml("Invoice".into()));
	assert!(c.dispatch(Intent::SwitchMode(Mode::Uml)).is_none());

	let outcome = c.resolve(f.token, Ok(class_graph("Invoice")));
	assert!(matches!(outcome, Outcome::Committed { nodes: 2, .. }));

	let model = c.model().unwrap();
	assert_eq!(model.mode, Mode::Uml);
	for node in &model.nodes {
		if node.category != NodeCategory::Datatype {
			assert_eq!(node.category, NodeCategory::Uml, "{}", node.label);
		}
	}
}

#[test]
fn table_query_leaves_the_diagram_alone() {
	let c = loaded("Invoice");
	let model = c.model().cloned();
	let view = c.view().clone();

	let response: QueryResponse = serde_json::from_value(json!({
		"result_type": "table",
		"results": [{"name": "x"}],
		"table_columns": ["name"],
		"count": 1
	}))
	.unwrap();

	let QueryView::Table(table) = shape(response) else {
		panic!("expected a table");
	};
	assert_eq!(table.columns, ["name"]);
	assert_eq!(table.rows, [["x"]]);
	assert_eq!(table.count, 1);

	assert_eq!(c.model().cloned(), model);
	assert_eq!(c.view(), &view);
}

#[test]
fn graph_query_result_replaces_the_diagram() {
	let mut c = loaded("Invoice");
	let response: QueryResponse = serde_json::from_value(json!({
		"result_type": "graph",
		"results": [],
		"graph_data": {
			"nodes": [{"key": "p", "label": "Party", "isCenter": true}],
			"links": [],
			"query": "MATCH (p:Party) RETURN p"
		},
		"count": 1
	}))
	.unwrap();

	let QueryView::Graph { graph, .. } = shape(response) else {
		panic!("expected a graph");
	};
	c.dispatch(Intent::ShowGraph(graph));

	assert_eq!(c.view().focal_label.as_deref(), Some("Party"));
	assert_eq!(c.last_query(), Some("MATCH (p:Party) RETURN p"));
	assert_eq!(c.model().unwrap().nodes.len(), 1);
}

#[test]
fn last_query_survives_selection_and_theme_changes() {
	let mut c = loaded("Invoice");
	c.dispatch(Intent::ShowGraph(raw(json!({
		"nodes": [{"key": "p", "label": "Party"}],
		"links": [],
		"query": "MATCH (p:Party) RETURN p"
	}))));

	c.dispatch(Intent::Select(Some(SelectionRef::Node("p".into()))));
	c.dispatch(Intent::SetTheme(Theme::Light));
	c.dispatch(Intent::Select(None));
	assert_eq!(c.last_query(), Some("MATCH (p:Party) RETURN p"));
}

//! Owner of the committed diagram and the view state.
//!
//! The coordinator is a plain state machine: [`Coordinator::dispatch`] turns
//! an [`Intent`] into at most one [`Fetch`] for the caller to perform, and
//! [`Coordinator::resolve`] feeds the result back. Each fetch carries a
//! monotonically increasing token; only the most recently issued one may
//! commit, later-arriving results for superseded intents are dropped.

use std::sync::Arc;

use log::{debug, error, info};

use super::model::*;
use super::translate::translate;
use crate::api::{FetchRequest, RawGraph};
use crate::error::ApiError;

/// Identifies one issued fetch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

/// Work the caller must perform and hand back to [`Coordinator::resolve`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fetch {
	/// Pass back unchanged with the result.
	pub token: RequestToken,
	/// Endpoint and label to fetch.
	pub request: FetchRequest,
}

/// User actions the coordinator understands.
#[derive(Clone, Debug, PartialEq)]
pub enum Intent {
	/// Load the diagram of a class in the current mode.
	SelectClass(String),
	/// Refetch the focal class in another mode; a no-op for the current one.
	SwitchMode(Mode),
	/// Double-click on a node; honoured in graph mode only.
	FocusNode(String),
	/// Retheme the committed model without refetching.
	SetTheme(Theme),
	/// Graph data that arrived through chat or the query console.
	ShowGraph(RawGraph),
	/// Selection reported by the diagram.
	Select(Option<SelectionRef>),
}

/// What [`Coordinator::resolve`] did with a result.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
	/// A new model replaced the previous one.
	Committed {
		/// Revision of the new model.
		revision: u64,
		/// Node count after de-duplication.
		nodes: usize,
		/// Link count after dangling links were dropped.
		links: usize,
		/// How many links were dropped.
		dropped_links: usize,
	},
	/// A newer intent superseded this fetch.
	Stale,
	/// Node focus found nothing; the diagram stays as it was.
	EmptyFocus,
	/// The fetch failed; the message is kept in [`Coordinator::last_error`].
	Failed(ApiError),
}

#[derive(Clone, Debug)]
struct Pending {
	token: RequestToken,
	request: FetchRequest,
	mode: Mode,
}

/// Single owner of the view state, the committed model and the selection.
///
/// Pure: it never performs I/O. [`dispatch`](Self::dispatch) says what to
/// fetch and [`resolve`](Self::resolve) takes the answer.
#[derive(Clone, Debug, Default)]
pub struct Coordinator {
	view: ViewState,
	model: Option<Arc<DiagramModel>>,
	selection: Option<SelectionRef>,
	pending: Option<Pending>,
	last_token: u64,
	last_query: Option<String>,
	last_error: Option<String>,
}

impl Coordinator {
	/// Graph mode, no focal class, placeholder shown.
	pub fn new(theme: Theme) -> Self {
		Self {
			view: ViewState {
				theme,
				..ViewState::default()
			},
			..Self::default()
		}
	}

	/// Mode, focal class and theme.
	pub fn view(&self) -> &ViewState {
		&self.view
	}

	/// Last committed model, `None` until the first commit.
	pub fn model(&self) -> Option<&Arc<DiagramModel>> {
		self.model.as_ref()
	}

	/// Raw selection, which may no longer resolve.
	pub fn selection(&self) -> Option<&SelectionRef> {
		self.selection.as_ref()
	}

	/// The selected element, resolved against the committed model.
	pub fn selected(&self) -> Option<Selected<'_>> {
		let model = self.model.as_deref()?;
		model.resolve(self.selection.as_ref()?)
	}

	/// Query text of the last commit that carried one.
	pub fn last_query(&self) -> Option<&str> {
		self.last_query.as_deref()
	}

	/// Message of the last failed diagram load, cleared by the next commit.
	pub fn last_error(&self) -> Option<&str> {
		self.last_error.as_deref()
	}

	/// A fetch is in flight.
	pub fn is_loading(&self) -> bool {
		self.pending.is_some()
	}

	/// Applies an intent. Returns the fetch to perform, if any; issuing one
	/// supersedes whatever was pending.
	pub fn dispatch(&mut self, intent: Intent) -> Option<Fetch> {
		match intent {
			Intent::SelectClass(label) => self.select_class(label),
			Intent::SwitchMode(mode) => self.switch_mode(mode),
			Intent::FocusNode(label) => self.focus_node(label),
			Intent::SetTheme(theme) => {
				self.set_theme(theme);
				None
			}
			Intent::ShowGraph(raw) => {
				self.show_graph(raw);
				None
			}
			Intent::Select(selection) => {
				self.select(selection);
				None
			}
		}
	}

	fn issue(&mut self, request: FetchRequest) -> Fetch {
		self.last_token += 1;
		let token = RequestToken(self.last_token);
		if let Some(old) = self.pending.replace(Pending {
			token,
			request: request.clone(),
			mode: self.view.mode,
		}) {
			debug!("fetch {:?} superseded by {:?}", old.request, request);
		}
		debug!("issuing fetch {token:?}: {request:?}");
		Fetch { token, request }
	}

	fn request_for_mode(&self, label: &str) -> FetchRequest {
		match self.view.mode {
			Mode::Graph => FetchRequest::Graph(label.to_string()),
			Mode::Uml | Mode::Pydantic => FetchRequest::Uml(label.to_string()),
		}
	}

	fn select_class(&mut self, label: String) -> Option<Fetch> {
		let request = self.request_for_mode(&label);
		self.view.focal_label = Some(label);
		Some(self.issue(request))
	}

	fn switch_mode(&mut self, mode: Mode) -> Option<Fetch> {
		if mode == self.view.mode {
			return None;
		}
		info!("switching to {} mode", mode.as_str());
		self.view.mode = mode;
		// A result fetched for the old mode must not commit under the new one.
		self.pending = None;
		let label = self.view.focal_label.clone()?;
		let request = self.request_for_mode(&label);
		Some(self.issue(request))
	}

	fn focus_node(&mut self, label: String) -> Option<Fetch> {
		if self.view.mode != Mode::Graph {
			debug!("ignoring focus on {label:?} outside graph mode");
			return None;
		}
		if label.is_empty() {
			return None;
		}
		Some(self.issue(FetchRequest::NodeFocus(label)))
	}

	/// Retheme the committed model in place. Selection is untouched.
	fn set_theme(&mut self, theme: Theme) {
		self.view.theme = theme;
		if let Some(model) = self.model.as_mut() {
			if model.is_light != theme.is_light() {
				Arc::make_mut(model).is_light = theme.is_light();
			}
		}
	}

	fn select(&mut self, selection: Option<SelectionRef>) {
		self.selection = match (selection, self.model.as_deref()) {
			(Some(sel), Some(model)) if model.resolve(&sel).is_some() => Some(sel),
			_ => None,
		};
	}

	fn show_graph(&mut self, raw: RawGraph) {
		if raw.nodes.is_empty() {
			info!("graph data is empty, keeping current diagram");
			return;
		}
		if let Some(old) = self.pending.take() {
			debug!("fetch {:?} superseded by graph data", old.request);
		}
		self.last_token += 1;
		let revision = self.last_token;
		let mode = self.view.mode;
		let center = raw
			.nodes
			.iter()
			.find(|n| n.is_center)
			.map(|n| n.label.clone());
		self.commit(&raw, mode, revision);
		if let Some(label) = center.filter(|l| !l.is_empty()) {
			self.view.focal_label = Some(label);
		}
	}

	fn commit(&mut self, raw: &RawGraph, mode: Mode, revision: u64) -> Outcome {
		let translation = translate(raw, mode, self.view.theme.is_light(), revision);
		let outcome = Outcome::Committed {
			revision,
			nodes: translation.model.nodes.len(),
			links: translation.model.links.len(),
			dropped_links: translation.dropped_links,
		};
		if let Some(query) = raw.query.as_ref().filter(|q| !q.trim().is_empty()) {
			self.last_query = Some(query.clone());
		}
		self.model = Some(Arc::new(translation.model));
		self.selection = None;
		self.last_error = None;
		debug!("committed revision {revision} in {} mode", mode.as_str());
		outcome
	}

	/// Apply the result of a fetch issued by [`Coordinator::dispatch`].
	pub fn resolve(&mut self, token: RequestToken, result: Result<RawGraph, ApiError>) -> Outcome {
		let Some(pending) = self.pending.take_if(|p| p.token == token) else {
			debug!("discarding stale response {token:?}");
			return Outcome::Stale;
		};

		let raw = match result {
			Ok(raw) => raw,
			Err(e) => {
				error!("loading {:?} failed: {e}", pending.request);
				self.last_error = Some(e.message().to_string());
				return Outcome::Failed(e);
			}
		};

		if let FetchRequest::NodeFocus(label) = &pending.request {
			if raw.nodes.is_empty() {
				info!("no focus data found for node {label:?}");
				return Outcome::EmptyFocus;
			}
			self.view.focal_label = Some(label.clone());
		}

		let RequestToken(revision) = token;
		self.commit(&raw, pending.mode, revision)
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	fn graph(label: &str) -> RawGraph {
		serde_json::from_value(json!({
			"nodes": [{"key": label, "label": label, "category": "class", "isCenter": true}],
			"links": [],
			"query": format!("MATCH (c {{label: '{label}'}}) RETURN c")
		}))
		.unwrap()
	}

	#[test]
	fn starts_on_placeholder() {
		let c = Coordinator::new(Theme::Dark);
		assert_eq!(c.view().mode, Mode::Graph);
		assert!(c.view().focal_label.is_none());
		assert!(c.model().is_none());
		assert!(!c.is_loading());
	}

	#[test]
	fn failure_keeps_previous_diagram() {
		let mut c = Coordinator::new(Theme::Dark);
		let a = c.dispatch(Intent::SelectClass("A".into())).unwrap();
		c.resolve(a.token, Ok(graph("A")));
		let before = c.model().cloned();

		let b = c.dispatch(Intent::SelectClass("B".into())).unwrap();
		let outcome = c.resolve(b.token, Err(ApiError::network("offline")));

		assert_eq!(outcome, Outcome::Failed(ApiError::network("offline")));
		assert_eq!(c.model().cloned(), before);
		assert_eq!(c.last_error(), Some("offline"));
		assert!(!c.is_loading());
	}

	#[test]
	fn late_error_for_superseded_fetch_is_ignored() {
		let mut c = Coordinator::new(Theme::Dark);
		let a = c.dispatch(Intent::SelectClass("A".into())).unwrap();
		let b = c.dispatch(Intent::SelectClass("B".into())).unwrap();
		c.resolve(b.token, Ok(graph("B")));
		assert_eq!(c.resolve(a.token, Err(ApiError::network("x"))), Outcome::Stale);
		assert_eq!(c.last_error(), None);
	}

	#[test]
	fn focus_is_graph_mode_only() {
		let mut c = Coordinator::new(Theme::Dark);
		c.dispatch(Intent::SwitchMode(Mode::Uml));
		assert_eq!(c.dispatch(Intent::FocusNode("A".into())), None);
	}

	#[test]
	fn focus_success_moves_focal_label() {
		let mut c = Coordinator::new(Theme::Dark);
		let f = c.dispatch(Intent::FocusNode("Party".into())).unwrap();
		assert_eq!(f.request, FetchRequest::NodeFocus("Party".into()));
		c.resolve(f.token, Ok(graph("Party")));
		assert_eq!(c.view().focal_label.as_deref(), Some("Party"));
	}

	#[test]
	fn mode_switch_drops_in_flight_result_of_old_mode() {
		let mut c = Coordinator::new(Theme::Dark);
		let f = c.dispatch(Intent::FocusNode("Party".into())).unwrap();
		assert_eq!(c.dispatch(Intent::SwitchMode(Mode::Pydantic)), None);
		assert_eq!(c.resolve(f.token, Ok(graph("Party"))), Outcome::Stale);
		assert!(c.model().is_none());
	}

	#[test]
	fn show_graph_supersedes_pending_fetch_and_centres() {
		let mut c = Coordinator::new(Theme::Light);
		let a = c.dispatch(Intent::SelectClass("A".into())).unwrap();
		c.dispatch(Intent::ShowGraph(graph("Chat")));
		assert_eq!(c.resolve(a.token, Ok(graph("A"))), Outcome::Stale);
		let model = c.model().unwrap();
		assert_eq!(model.nodes[0].label, "Chat");
		assert!(model.is_light);
		assert_eq!(c.view().focal_label.as_deref(), Some("Chat"));
	}

	#[test]
	fn empty_graph_data_is_ignored() {
		let mut c = Coordinator::new(Theme::Dark);
		c.dispatch(Intent::ShowGraph(RawGraph::default()));
		assert!(c.model().is_none());
	}

	#[test]
	fn selection_must_exist_in_model() {
		let mut c = Coordinator::new(Theme::Dark);
		c.dispatch(Intent::Select(Some(SelectionRef::Node("A".into()))));
		assert_eq!(c.selection(), None);

		let a = c.dispatch(Intent::SelectClass("A".into())).unwrap();
		c.resolve(a.token, Ok(graph("A")));
		c.dispatch(Intent::Select(Some(SelectionRef::Node("A".into()))));
		assert!(matches!(c.selected(), Some(Selected::Node(n)) if n.label == "A"));
		c.dispatch(Intent::Select(Some(SelectionRef::Link(0))));
		assert_eq!(c.selection(), None);
	}

	#[test]
	fn commit_clears_selection_and_records_query() {
		let mut c = Coordinator::new(Theme::Dark);
		let a = c.dispatch(Intent::SelectClass("A".into())).unwrap();
		c.resolve(a.token, Ok(graph("A")));
		c.dispatch(Intent::Select(Some(SelectionRef::Node("A".into()))));
		let b = c.dispatch(Intent::SelectClass("B".into())).unwrap();
		c.resolve(b.token, Ok(graph("B")));
		assert_eq!(c.selection(), None);
		assert_eq!(c.last_query(), Some("MATCH (c {label: 'B'}) RETURN c"));
	}
}

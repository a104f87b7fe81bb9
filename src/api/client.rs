use gloo_net::http::{Request, Response};
use log::{debug, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::types::*;
use crate::error::ApiError;

/// A diagram fetch the coordinator wants performed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FetchRequest {
	/// Neighbourhood graph of a class.
	Graph(String),
	/// Flattened attribute view for the UML and schema modes.
	Uml(String),
	/// Direct connections of a single node.
	NodeFocus(String),
}

const GRAPH_DATA: &str = "/api/graph-data/";
const UML_DATA: &str = "/api/uml-data/";
const NODE_FOCUS: &str = "/api/node-focus/";

fn label_path(prefix: &str, label: &str) -> String {
	format!("{prefix}{}", urlencoding::encode(label))
}

impl FetchRequest {
	/// Class or node label the request is about.
	pub fn label(&self) -> &str {
		match self {
			Self::Graph(l) | Self::Uml(l) | Self::NodeFocus(l) => l,
		}
	}

	/// Path of the endpoint serving this request, with the label encoded.
	pub fn path(&self) -> String {
		let prefix = match self {
			Self::Graph(_) => GRAPH_DATA,
			Self::Uml(_) => UML_DATA,
			Self::NodeFocus(_) => NODE_FOCUS,
		};
		label_path(prefix, self.label())
	}
}

/// Typed wrappers around the backend endpoints.
///
/// Every call resolves to a `Result`; transport failures, non-2xx statuses
/// and undecodable bodies all come back as [`ApiError`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ApiClient {
	base: String,
}

impl ApiClient {
	/// `base` is prefixed to every endpoint path; empty means same origin.
	pub fn new(base: impl Into<String>) -> Self {
		Self {
			base: base.into().trim_end_matches('/').to_string(),
		}
	}

	/// Absolute URL of an endpoint path.
	pub fn url(&self, path: &str) -> String {
		format!("{}{}", self.base, path)
	}

	async fn decode<T: DeserializeOwned>(url: &str, response: Response) -> Result<T, ApiError> {
		let status = response.status();
		let body = response
			.text()
			.await
			.map_err(|e| ApiError::network(e.to_string()))?;
		if !response.ok() {
			warn!("{url} returned {status}");
			return Err(ApiError::from_status(status, &body));
		}
		serde_json::from_str(&body).map_err(|e| {
			warn!("{url}: could not decode body: {e}");
			ApiError::malformed(e.to_string())
		})
	}

	async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
		let url = self.url(path);
		debug!("GET {url}");
		let response = Request::get(&url)
			.send()
			.await
			.map_err(|e| ApiError::network(e.to_string()))?;
		Self::decode(&url, response).await
	}

	async fn post_json<B: Serialize, T: DeserializeOwned>(
		&self,
		path: &str,
		body: &B,
	) -> Result<T, ApiError> {
		let url = self.url(path);
		debug!("POST {url}");
		let response = Request::post(&url)
			.json(body)
			.map_err(|e| ApiError::malformed(e.to_string()))?
			.send()
			.await
			.map_err(|e| ApiError::network(e.to_string()))?;
		Self::decode(&url, response).await
	}

	/// `GET /api/classes`.
	pub async fn fetch_classes(&self) -> Result<Vec<ClassInfo>, ApiError> {
		self.get_json("/api/classes").await
	}

	/// `GET /api/relationships`.
	pub async fn fetch_relationships(&self) -> Result<Vec<RelationshipInfo>, ApiError> {
		self.get_json("/api/relationships").await
	}

	/// Individuals grouped by their class.
	pub async fn fetch_individuals(&self) -> Result<Vec<IndividualGroup>, ApiError> {
		self.get_json("/api/individuals").await
	}

	/// `GET /api/datatypes`.
	pub async fn fetch_datatypes(&self) -> Result<Vec<DatatypeInfo>, ApiError> {
		self.get_json("/api/datatypes").await
	}

	/// Subclass tree from `GET /api/class-hierarchy`.
	pub async fn fetch_hierarchy(&self) -> Result<ClassHierarchy, ApiError> {
		self.get_json("/api/class-hierarchy").await
	}

	/// Neighbourhood of a class for graph mode.
	pub async fn fetch_graph(&self, class_label: &str) -> Result<RawGraph, ApiError> {
		self.get_json(&label_path(GRAPH_DATA, class_label)).await
	}

	/// An empty `nodes` list means nothing was found, not a failure.
	pub async fn fetch_node_focus(&self, node_label: &str) -> Result<RawGraph, ApiError> {
		self.get_json(&label_path(NODE_FOCUS, node_label)).await
	}

	/// Same shape as [`fetch_graph`](Self::fetch_graph), with attributes folded into nodes.
	pub async fn fetch_uml(&self, class_label: &str) -> Result<RawGraph, ApiError> {
		self.get_json(&label_path(UML_DATA, class_label)).await
	}

	/// Performs a coordinator fetch through the matching endpoint wrapper.
	pub async fn execute(&self, request: &FetchRequest) -> Result<RawGraph, ApiError> {
		match request {
			FetchRequest::Graph(label) => self.fetch_graph(label).await,
			FetchRequest::Uml(label) => self.fetch_uml(label).await,
			FetchRequest::NodeFocus(label) => self.fetch_node_focus(label).await,
		}
	}

	/// Runs free-form Cypher; the response says whether it is a table or a graph.
	pub async fn run_query(&self, text: &str) -> Result<QueryResponse, ApiError> {
		self.post_json("/api/cypher", &QueryRequest { query: text })
			.await
	}

	/// Sends one chat message.
	pub async fn chat(&self, message: &str) -> Result<ChatResponse, ApiError> {
		self.post_json("/api/chat", &ChatRequest { message }).await
	}

	/// Available models and the one in use.
	pub async fn llm_status(&self) -> Result<LlmStatus, ApiError> {
		self.get_json("/api/llm").await
	}

	/// Switches model and returns the updated status.
	pub async fn select_llm(&self, llm_name: &str) -> Result<LlmStatus, ApiError> {
		self.post_json("/api/llm", &LlmSelection { llm_name })
			.await
	}
}

#[cfg(test)]
mod tests {
	use rstest::rstest;

	use super::*;

	#[rstest]
	#[case(FetchRequest::Graph("Invoice".into()), "/api/graph-data/Invoice")]
	#[case(FetchRequest::Uml("Tax Form".into()), "/api/uml-data/Tax%20Form")]
	#[case(FetchRequest::NodeFocus("a/b?c".into()), "/api/node-focus/a%2Fb%3Fc")]
	fn request_paths_encode_labels(#[case] request: FetchRequest, #[case] expected: &str) {
		assert_eq!(request.path(), expected);
	}

	#[rstest]
	#[case(FetchRequest::Graph("Invoice Line".into()), GRAPH_DATA)]
	#[case(FetchRequest::Uml("Invoice Line".into()), UML_DATA)]
	#[case(FetchRequest::NodeFocus("Invoice Line".into()), NODE_FOCUS)]
	fn request_path_matches_its_wrapper(#[case] request: FetchRequest, #[case] prefix: &str) {
		assert_eq!(request.path(), label_path(prefix, "Invoice Line"));
		assert_eq!(request.label(), "Invoice Line");
	}

	#[test]
	fn base_url_is_normalised() {
		let client = ApiClient::new("http://localhost:8180/");
		assert_eq!(client.url("/api/classes"), "http://localhost:8180/api/classes");
		assert_eq!(ApiClient::default().url("/api/llm"), "/api/llm");
	}
}

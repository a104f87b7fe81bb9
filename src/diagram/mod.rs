//! Diagram state: the committed model, the coordinator that owns it and the
//! views derived from it.

pub mod coordinator;
pub mod model;
pub mod properties;
pub mod translate;

pub use coordinator::{Coordinator, Fetch, Intent, Outcome, RequestToken};
pub use model::{
	DiagramModel, GraphLink, GraphNode, Mode, NodeCategory, Selected, SelectionRef, Theme,
	ViewState,
};

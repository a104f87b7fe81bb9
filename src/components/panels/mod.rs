//! Side and bottom panels around the diagram.

mod console;
mod lists;
mod llm;
mod properties;

use std::future::Future;

use leptos::prelude::*;
use leptos::task::spawn_local;
use log::error;

pub use console::{ChatPanel, QueryConsole};
pub use lists::{ClassList, DatatypeList, HierarchyTree, IndividualList, RelationshipList};
pub use llm::LlmSelector;
pub use properties::PropertiesPanel;

use crate::error::ApiError;

/// Lifecycle of a panel's one-shot load.
#[derive(Clone, Debug, PartialEq)]
pub enum Load<T> {
	Loading,
	Ready(T),
	Failed,
}

/// Start a load and return the signal it settles into.
pub fn load<T, F>(what: &'static str, fut: F) -> RwSignal<Load<T>>
where
	T: Send + Sync + 'static,
	F: Future<Output = Result<T, ApiError>> + 'static,
{
	let state = RwSignal::new(Load::Loading);
	spawn_local(async move {
		let next = match fut.await {
			Ok(value) => Load::Ready(value),
			Err(e) => {
				error!("error loading {what}: {e}");
				Load::Failed
			}
		};
		state.try_set(next);
	});
	state
}

/// Placeholder text for a failed list load.
pub fn failed_text(what: &str) -> String {
	format!("Failed to load {what}. Is the server running?")
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn failure_text_names_the_panel() {
		assert_eq!(
			failed_text("classes"),
			"Failed to load classes. Is the server running?"
		);
	}
}

//! Reactive shell around the [`Coordinator`].
//!
//! Components dispatch intents here; any fetch the coordinator asks for is
//! performed on the local executor and its result is fed back through
//! [`Coordinator::resolve`].

use leptos::prelude::*;
use leptos::task::spawn_local;
use log::{debug, warn};

use crate::api::ApiClient;
use crate::diagram::{Coordinator, Intent, Outcome, Theme};

/// Copyable handle shared with every component through context.
#[derive(Clone, Copy)]
pub struct DiagramController {
	/// Prefer [`with`](Self::with) and [`dispatch`](Self::dispatch) over touching this.
	pub state: RwSignal<Coordinator>,
	api: StoredValue<ApiClient>,
}

impl DiagramController {
	/// Starts with an empty diagram in graph mode.
	pub fn new(api: ApiClient, theme: Theme) -> Self {
		Self {
			state: RwSignal::new(Coordinator::new(theme)),
			api: StoredValue::new(api),
		}
	}

	/// Clone of the gateway, for panels doing their own fetches.
	pub fn api(&self) -> ApiClient {
		self.api.get_value()
	}

	/// Read the coordinator reactively.
	pub fn with<T>(&self, f: impl FnOnce(&Coordinator) -> T) -> T {
		self.state.with(f)
	}

	/// Applies `intent` and, if it needs data, fetches and resolves it in the background.
	pub fn dispatch(&self, intent: Intent) {
		let Some(fetch) = self.state.try_update(|c| c.dispatch(intent)).flatten() else {
			return;
		};
		let (state, api) = (self.state, self.api());
		spawn_local(async move {
			let result = api.execute(&fetch.request).await;
			let outcome = state.try_update(|c| c.resolve(fetch.token, result));
			match outcome {
				Some(Outcome::Committed {
					revision,
					nodes,
					links,
					dropped_links,
				}) => debug!(
					"revision {revision}: {nodes} nodes, {links} links, {dropped_links} dropped"
				),
				Some(Outcome::Failed(e)) => warn!("diagram for {:?} failed: {e}", fetch.request.label()),
				Some(other) => debug!("fetch {:?} resolved as {other:?}", fetch.token),
				None => warn!("diagram state disposed before {:?} resolved", fetch.token),
			}
		});
	}
}

/// Makes the controller available to [`use_controller`].
pub fn provide_controller(controller: DiagramController) {
	provide_context(controller);
}

/// Panics outside a tree where [`provide_controller`] ran.
pub fn use_controller() -> DiagramController {
	expect_context::<DiagramController>()
}

use leptos::prelude::*;

use crate::controller::use_controller;
use crate::diagram::properties::{render_html, sheet_for_selection};

/// Details of the selected node or link, rendered from the committed model.
#[component]
pub fn PropertiesPanel() -> impl IntoView {
	let controller = use_controller();
	let html = move || controller.with(|c| sheet_for_selection(c).map(|s| render_html(&s)));

	view! {
		<aside class="properties-panel">
			<h2>"Properties"</h2>
			<Show
				when=move || html().is_some()
				fallback=|| view! { <div class="placeholder">"Select a node or link to view its properties"</div> }
			>
				<div class="properties-content" inner_html=move || html().unwrap_or_default()></div>
			</Show>
		</aside>
	}
}

use leptos::prelude::*;
use leptos::task::spawn_local;
use log::{error, info};

use crate::api::types::LlmStatus;
use crate::controller::use_controller;

/// `(name, selected)` per option, in backend order.
fn llm_options(status: LlmStatus) -> Vec<(String, bool)> {
	let current = status.current_llm;
	status
		.available_llms
		.into_iter()
		.map(|name| {
			let selected = name == current;
			(name, selected)
		})
		.collect()
}

/// Drop-down for the chat model; hidden until the backend reports its list.
#[component]
pub fn LlmSelector() -> impl IntoView {
	let controller = use_controller();
	let status = RwSignal::new(None::<LlmStatus>);
	let failure = RwSignal::new(None::<String>);

	let api = controller.api();
	spawn_local(async move {
		match api.llm_status().await {
			Ok(s) => {
				status.try_set(Some(s));
			}
			Err(e) => error!("error loading LLM list: {e}"),
		}
	});

	let on_change = move |ev: leptos::ev::Event| {
		let name = event_target_value(&ev);
		let api = controller.api();
		spawn_local(async move {
			match api.select_llm(&name).await {
				Ok(s) => {
					info!("switched LLM to {}", s.current_llm);
					failure.try_set(None);
					status.try_set(Some(s));
				}
				Err(e) => {
					error!("error switching LLM to {name:?}: {e}");
					failure.try_set(Some(e.message().to_string()));
				}
			}
		});
	};

	view! {
		<Show when=move || status.with(|s| s.as_ref().is_some_and(|s| !s.available_llms.is_empty()))>
			<div class="llm-selector">
				<label>"Model"</label>
				<select
					prop:value=move || status.with(|s| s.as_ref().map(|s| s.current_llm.clone()).unwrap_or_default())
					on:change=on_change
				>
					{move || {
						status
							.get()
							.map(|s| {
								llm_options(s)
									.into_iter()
									.map(|(name, selected)| {
										let value = name.clone();
										view! { <option value=value selected=selected>{name}</option> }
									})
									.collect_view()
							})
					}}
				</select>
				{move || failure.get().map(|f| view! { <span class="inline-error">{f}</span> })}
			</div>
		</Show>
	}
}

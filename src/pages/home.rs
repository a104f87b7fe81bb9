use leptos::prelude::*;

use crate::components::force_graph::{CanvasCommand, ForceGraphCanvas};
use crate::components::panels::{
	ChatPanel, ClassList, DatatypeList, HierarchyTree, IndividualList, LlmSelector,
	PropertiesPanel, QueryConsole, RelationshipList,
};
use crate::config::save_theme;
use crate::controller::use_controller;
use crate::diagram::{Intent, Mode};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SideTab {
	Classes,
	Relationships,
	Individuals,
	Datatypes,
	Hierarchy,
}

impl SideTab {
	const ALL: [SideTab; 5] = [
		SideTab::Classes,
		SideTab::Relationships,
		SideTab::Individuals,
		SideTab::Datatypes,
		SideTab::Hierarchy,
	];

	fn title(self) -> &'static str {
		match self {
			SideTab::Classes => "Classes",
			SideTab::Relationships => "Relations",
			SideTab::Individuals => "Individuals",
			SideTab::Datatypes => "Datatypes",
			SideTab::Hierarchy => "Hierarchy",
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum BottomTab {
	Chat,
	Query,
}

#[component]
fn Sidebar() -> impl IntoView {
	let tab = RwSignal::new(SideTab::Classes);

	let buttons = SideTab::ALL
		.into_iter()
		.map(|t| {
			view! {
				<button
					class="tab-btn"
					class:active=move || tab.get() == t
					on:click=move |_| tab.set(t)
				>
					{t.title()}
				</button>
			}
		})
		.collect_view();

	// A list fetches whenever its tab is opened.
	let content = move || match tab.get() {
		SideTab::Classes => view! { <ClassList /> }.into_any(),
		SideTab::Relationships => view! { <RelationshipList /> }.into_any(),
		SideTab::Individuals => view! { <IndividualList /> }.into_any(),
		SideTab::Datatypes => view! { <DatatypeList /> }.into_any(),
		SideTab::Hierarchy => view! { <HierarchyTree /> }.into_any(),
	};

	view! {
		<nav class="sidebar">
			<div class="sidebar-header">
				<h1>"Onto Modeller"</h1>
			</div>
			<div class="tab-bar">{buttons}</div>
			<div class="tab-content">{content}</div>
		</nav>
	}
}

#[component]
fn Toolbar(command: RwSignal<Option<CanvasCommand>>) -> impl IntoView {
	let controller = use_controller();
	let mode = move || controller.with(|c| c.view().mode);
	let theme = move || controller.with(|c| c.view().theme);

	let mode_buttons = Mode::ALL
		.into_iter()
		.map(|m| {
			view! {
				<button
					class="mode-btn"
					class:active=move || mode() == m
					on:click=move |_| controller.dispatch(Intent::SwitchMode(m))
				>
					{m.title()}
				</button>
			}
		})
		.collect_view();

	let toggle_theme = move |_| {
		let next = controller.state.with_untracked(|c| c.view().theme).toggled();
		save_theme(next);
		controller.dispatch(Intent::SetTheme(next));
	};

	let tool = move |label: &'static str, title: &'static str, cmd: CanvasCommand| {
		view! {
			<button class="tool-btn" title=title on:click=move |_| command.set(Some(cmd))>
				{label}
			</button>
		}
	};

	view! {
		<div class="toolbar">
			<div class="mode-switch">{mode_buttons}</div>
			<div class="focal-label">
				{move || controller.with(|c| c.view().focal_label.clone()).unwrap_or_default()}
			</div>
			<div class="tools">
				{tool("+", "Zoom in", CanvasCommand::ZoomIn)}
				{tool("-", "Zoom out", CanvasCommand::ZoomOut)}
				{tool("[ ]", "Fit to view", CanvasCommand::Fit)}
				{tool("↻", "Refresh layout", CanvasCommand::Relayout)}
				<button class="tool-btn" title="Toggle theme" on:click=toggle_theme>
					{move || if theme().is_light() { "Dark" } else { "Light" }}
				</button>
			</div>
			<LlmSelector />
		</div>
	}
}

#[component]
fn BottomPanel() -> impl IntoView {
	let tab = RwSignal::new(BottomTab::Chat);

	view! {
		<section class="bottom-panel">
			<div class="tab-bar">
				<button
					class="tab-btn"
					class:active=move || tab.get() == BottomTab::Chat
					on:click=move |_| tab.set(BottomTab::Chat)
				>
					"Chat"
				</button>
				<button
					class="tab-btn"
					class:active=move || tab.get() == BottomTab::Query
					on:click=move |_| tab.set(BottomTab::Query)
				>
					"Query"
				</button>
			</div>
			// Both stay mounted so history and the query text survive tab switches.
			<div class="tab-content" class:hidden=move || tab.get() != BottomTab::Chat>
				<ChatPanel />
			</div>
			<div class="tab-content" class:hidden=move || tab.get() != BottomTab::Query>
				<QueryConsole />
			</div>
		</section>
	}
}

/// Modeller workspace: lists, diagram, properties and console.
#[component]
pub fn Home() -> impl IntoView {
	let controller = use_controller();
	let command = RwSignal::new(None::<CanvasCommand>);
	let model = Signal::derive(move || controller.with(|c| c.model().cloned()));
	let has_model = move || controller.with(|c| c.model().is_some());
	let loading = move || controller.with(|c| c.is_loading());
	let failure = move || controller.with(|c| c.last_error().map(str::to_string));

	view! {
		<div class="app-layout">
			<Sidebar />
			<main class="workspace">
				<Toolbar command=command />
				<div class="diagram-area">
					<Show
						when=has_model
						fallback=|| {
							view! {
								<div class="placeholder diagram-placeholder">
									"Select a class to view its diagram"
								</div>
							}
						}
					>
						<ForceGraphCanvas
							model=model
							on_select=move |sel| controller.dispatch(Intent::Select(sel))
							on_focus=move |label| controller.dispatch(Intent::FocusNode(label))
							command=command
						/>
					</Show>
					<Show when=loading>
						<div class="loading-overlay">"Loading..."</div>
					</Show>
					{move || failure().map(|message| view! { <div class="error-banner">{message}</div> })}
				</div>
				<BottomPanel />
			</main>
			<PropertiesPanel />
		</div>
	}
}

#[cfg(test)]
mod tests {
	use std::collections::HashSet;

	use super::*;

	#[test]
	fn side_tabs_have_distinct_titles() {
		let titles: HashSet<_> = SideTab::ALL.iter().map(|t| t.title()).collect();
		assert_eq!(titles.len(), SideTab::ALL.len());
	}
}

use leptos::prelude::*;

use super::{Load, failed_text, load};
use crate::api::types::{ClassInfo, HierarchyNode, IndividualGroup};
use crate::controller::{DiagramController, use_controller};
use crate::diagram::Intent;
use crate::format::truncate;

const DEFINITION_PREVIEW: usize = 120;

fn badge_class(requirement: &str) -> String {
	format!("badge badge-{}", requirement.to_lowercase())
}

fn placeholder(text: String) -> AnyView {
	view! { <div class="placeholder">{text}</div> }.into_any()
}

fn loading() -> AnyView {
	view! { <div class="loading">"Loading..."</div> }.into_any()
}

fn matches_search(class: &ClassInfo, needle: &str) -> bool {
	needle.is_empty() || class.label.to_lowercase().contains(needle)
}

/// Searchable class list; clicking an entry loads its diagram.
#[component]
pub fn ClassList() -> impl IntoView {
	let controller = use_controller();
	let api = controller.api();
	let classes = load("classes", async move { api.fetch_classes().await });
	let search = RwSignal::new(String::new());
	let focal = move || controller.with(|c| c.view().focal_label.clone());

	let rows = move || match classes.get() {
		Load::Loading => loading(),
		Load::Failed => placeholder(failed_text("classes")),
		Load::Ready(list) if list.is_empty() => placeholder("No classes found".into()),
		Load::Ready(list) => {
			let needle = search.get().to_lowercase();
			list.into_iter()
				.filter(|c| matches_search(c, &needle))
				.enumerate()
				.map(|(i, class)| {
					let label = class.label.clone();
					let active_label = label.clone();
					let is_active = move || focal().as_deref() == Some(active_label.as_str());
					view! {
						<div
							class="class-item"
							class:active=is_active
							title=class.definition.clone().unwrap_or_default()
							style=format!("animation-delay: {}ms", i.min(40) * 30)
							on:click=move |_| controller.dispatch(Intent::SelectClass(label.clone()))
						>
							{class.label}
						</div>
					}
				})
				.collect_view()
				.into_any()
		}
	};

	view! {
		<div class="list-panel">
			<input
				class="search-input"
				type="search"
				placeholder="Search classes..."
				prop:value=search
				on:input=move |ev| search.set(event_target_value(&ev))
			/>
			<div class="class-list">{rows}</div>
		</div>
	}
}

#[component]
pub fn RelationshipList() -> impl IntoView {
	let controller = use_controller();
	let api = controller.api();
	let relationships = load("relationships", async move { api.fetch_relationships().await });

	let rows = move || match relationships.get() {
		Load::Loading => loading(),
		Load::Failed => placeholder(failed_text("relationships")),
		Load::Ready(list) if list.is_empty() => placeholder("No relationships found".into()),
		Load::Ready(list) => list
			.into_iter()
			.map(|rel| {
				let source = rel.source_class.clone();
				let name = rel.display_name().to_string();
				let badge = rel.requirement.clone().map(|r| {
					let class = badge_class(&r);
					view! { <span class=class>{r}</span> }
				});
				let cardinality = rel.cardinality.clone().map(|c| {
					view! { <span class="cardinality">{c}</span> }
				});
				view! {
					<div
						class="relationship-item"
						on:click=move |_| controller.dispatch(Intent::SelectClass(source.clone()))
					>
						<span class="rel-source">{rel.source_class}</span>
						<span class="rel-name">{format!(" -{name}-> ")}</span>
						<span class="rel-target">{rel.target_class}</span>
						{cardinality}
						{badge}
					</div>
				}
			})
			.collect_view()
			.into_any(),
	};

	view! { <div class="relationship-list">{rows}</div> }
}

fn individual_group(group: IndividualGroup, controller: DiagramController) -> impl IntoView {
	let type_label = group.type_label.clone();
	let members = group
		.members
		.into_iter()
		.map(|m| {
			let tip = m.definition.unwrap_or_default();
			view! { <li class="individual-item" title=tip>{m.label}</li> }
		})
		.collect_view();
	view! {
		<div class="individual-group">
			<div
				class="group-header"
				on:click=move |_| controller.dispatch(Intent::SelectClass(type_label.clone()))
			>
				<span>{group.type_label}</span>
				<span class="count">{group.count}</span>
			</div>
			<ul>{members}</ul>
		</div>
	}
}

#[component]
pub fn IndividualList() -> impl IntoView {
	let controller = use_controller();
	let api = controller.api();
	let groups = load("individuals", async move { api.fetch_individuals().await });

	let rows = move || match groups.get() {
		Load::Loading => loading(),
		Load::Failed => placeholder(failed_text("individuals")),
		Load::Ready(list) if list.is_empty() => placeholder("No individuals found".into()),
		Load::Ready(list) => list
			.into_iter()
			.map(|g| individual_group(g, controller))
			.collect_view()
			.into_any(),
	};

	view! { <div class="individual-list">{rows}</div> }
}

#[component]
pub fn DatatypeList() -> impl IntoView {
	let controller = use_controller();
	let api = controller.api();
	let datatypes = load("datatypes", async move { api.fetch_datatypes().await });

	let rows = move || match datatypes.get() {
		Load::Loading => loading(),
		Load::Failed => placeholder(failed_text("datatypes")),
		Load::Ready(list) if list.is_empty() => placeholder("No datatypes found".into()),
		Load::Ready(list) => list
			.into_iter()
			.map(|dt| {
				let label = dt.label.clone();
				let definition = dt
					.definition
					.as_deref()
					.map(|d| truncate(d, DEFINITION_PREVIEW))
					.unwrap_or_default();
				view! {
					<div
						class="datatype-item"
						on:click=move |_| controller.dispatch(Intent::SelectClass(label.clone()))
					>
						<div class="datatype-label">{dt.label}</div>
						<div class="datatype-definition">{definition}</div>
					</div>
				}
			})
			.collect_view()
			.into_any(),
	};

	view! { <div class="datatype-list">{rows}</div> }
}

// Boxed so the recursion has a nameable type.
fn hierarchy_branch(node: HierarchyNode, controller: DiagramController) -> AnyView {
	let label = node.label.clone();
	let children = (!node.children.is_empty()).then(|| {
		let items = node
			.children
			.into_iter()
			.map(|child| hierarchy_branch(child, controller))
			.collect_view();
		view! { <ul class="tree-children">{items}</ul> }
	});
	view! {
		<li class="tree-node">
			<span
				class="tree-label"
				title=node.definition.unwrap_or_default()
				on:click=move |_| controller.dispatch(Intent::SelectClass(label.clone()))
			>
				{node.label}
			</span>
			{children}
		</li>
	}
	.into_any()
}

#[component]
pub fn HierarchyTree() -> impl IntoView {
	let controller = use_controller();
	let api = controller.api();
	let hierarchy = load("hierarchy", async move { api.fetch_hierarchy().await });

	let body = move || match hierarchy.get() {
		Load::Loading => loading(),
		Load::Failed => placeholder(failed_text("hierarchy")),
		Load::Ready(h) if h.tree.is_empty() => placeholder("No hierarchy found".into()),
		Load::Ready(h) => {
			let roots = h
				.tree
				.into_iter()
				.map(|n| hierarchy_branch(n, controller))
				.collect_view();
			view! {
				<div class="tree-summary">{format!("{} subclass edges", h.total_edges)}</div>
				<ul class="tree-root">{roots}</ul>
			}
			.into_any()
		}
	};

	view! { <div class="hierarchy-tree">{body}</div> }
}

//! Leptos client-side app wiring and routes.

use leptos::prelude::*;
use leptos_meta::*;
use leptos_router::components::*;
use leptos_router::path;
use log::{Level, info};

pub mod api;
pub mod config;
pub mod controller;
pub mod diagram;
pub mod error;
pub mod format;
pub mod query;

// Modules
mod components;
mod pages;

// Top-Level pages
use crate::api::ApiClient;
use crate::config::AppConfig;
use crate::controller::{DiagramController, provide_controller};
use crate::pages::home::Home;
use crate::pages::not_found::NotFound;

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("Logging initialized");
}

/// An app router which renders the modeller and handles 404's
#[component]
pub fn App() -> impl IntoView {
	// Provides context that manages stylesheets, titles, meta tags, etc.
	provide_meta_context();

	let config = AppConfig::from_document();
	let theme = config.initial_theme();
	info!("starting with theme {}", theme.as_str());
	let controller = DiagramController::new(ApiClient::new(config.api_base), theme);
	provide_controller(controller);

	let data_theme = move || controller.with(|c| c.view().theme.as_str());

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme=data_theme />

		// sets the document title
		<Title text="Onto Modeller" />

		// injects metadata in the <head> of the page
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<Router>
			<Routes fallback=|| view! { <NotFound /> }>
				<Route path=path!("/") view=Home />
			</Routes>
		</Router>
	}
}

//! Browser entry point for the modeller.

use leptos::prelude::*;
use onto_modeller::{App, init_logging};

fn main() {
	init_logging();
	mount_to_body(App);
}

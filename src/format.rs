//! Text-safety and display helpers shared by the panels.

use pulldown_cmark::{Options, Parser};
use serde_json::Value;

/// Escape the five HTML-significant characters.
pub fn escape_html(unsafe_text: &str) -> String {
	let mut out = String::with_capacity(unsafe_text.len());
	for c in unsafe_text.chars() {
		match c {
			'&' => out.push_str("&amp;"),
			'<' => out.push_str("&lt;"),
			'>' => out.push_str("&gt;"),
			'"' => out.push_str("&quot;"),
			'\'' => out.push_str("&#039;"),
			_ => out.push(c),
		}
	}
	out
}

/// Cut `text` to at most `max` characters, appending `...` when shortened.
pub fn truncate(text: &str, max: usize) -> String {
	match text.char_indices().nth(max) {
		Some((idx, _)) => format!("{}...", &text[..idx]),
		None => text.to_string(),
	}
}

/// Render markdown to HTML and strip anything unsafe.
pub fn render_markdown(content: &str) -> String {
	let mut options = Options::empty();
	options.insert(Options::ENABLE_TABLES);
	options.insert(Options::ENABLE_STRIKETHROUGH);
	let parser = Parser::new_ext(content, options);
	let mut html_output = String::new();
	pulldown_cmark::html::push_html(&mut html_output, parser);
	ammonia::clean(&html_output)
}

/// Plain-text form of a JSON value for table cells and property rows.
pub fn cell_text(value: &Value) -> String {
	match value {
		Value::Null => String::new(),
		Value::String(s) => s.clone(),
		Value::Bool(b) => b.to_string(),
		Value::Number(n) => n.to_string(),
		Value::Array(items) if items.iter().all(|v| !v.is_object() && !v.is_array()) => items
			.iter()
			.map(cell_text)
			.collect::<Vec<_>>()
			.join(", "),
		other => other.to_string(),
	}
}

/// `"invoice line item"` -> `"InvoiceLineItem"`, used for schema-style class names.
pub fn pascal_case(label: &str) -> String {
	label
		.split(|c: char| c.is_whitespace() || c == '_' || c == '-')
		.filter(|part| !part.is_empty())
		.map(|part| {
			let lower = part.to_lowercase();
			let mut chars = lower.chars();
			match chars.next() {
				Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
				None => String::new(),
			}
		})
		.collect()
}

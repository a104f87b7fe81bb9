use crate::diagram::NodeCategory;

/// Colours for one theme; chosen per frame from the model's theme flag.
#[derive(Clone, Copy, Debug)]
pub struct Palette {
	pub background: &'static str,
	pub text: &'static str,
	pub muted: &'static str,
	pub edge: &'static str,
	pub inheritance: &'static str,
	pub label_bg: &'static str,
	pub box_fill: &'static str,
	pub box_body: &'static str,
	pub box_stroke: &'static str,
	pub header: &'static str,
	pub center: &'static str,
	pub scalar_attr: &'static str,
	pub association_attr: &'static str,
	pub type_text: &'static str,
}

pub const SELECTED: &str = "#f59e0b";

const DARK: Palette = Palette {
	background: "#0f0f1a",
	text: "#ffffff",
	muted: "#8b949e",
	edge: "#64748b",
	inheritance: "#a78bfa",
	label_bg: "rgba(15, 15, 26, 0.9)",
	box_fill: "#1a1a2e",
	box_body: "rgba(0, 0, 0, 0.3)",
	box_stroke: "#4f46e5",
	header: "#4f46e5",
	center: "#7c3aed",
	scalar_attr: "#34d399",
	association_attr: "#818cf8",
	type_text: "#94a3b8",
};

const LIGHT: Palette = Palette {
	background: "#f8fafc",
	text: "#1e293b",
	muted: "#4b5563",
	edge: "#94a3b8",
	inheritance: "#6d28d9",
	label_bg: "rgba(255, 255, 255, 0.9)",
	box_fill: "#ffffff",
	box_body: "#f1f5f9",
	box_stroke: "#cbd5e1",
	header: "#4f46e5",
	center: "#7c3aed",
	scalar_attr: "#065f46",
	association_attr: "#4338ca",
	type_text: "#475569",
};

impl Palette {
	pub fn for_theme(is_light: bool) -> &'static Palette {
		if is_light { &LIGHT } else { &DARK }
	}

	pub fn node_fill(&self, category: NodeCategory, is_center: bool) -> &'static str {
		match category {
			_ if is_center => self.center,
			NodeCategory::Datatype => "#10b981",
			NodeCategory::Individual => "#14b8a6",
			_ => self.header,
		}
	}
}

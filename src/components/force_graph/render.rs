use std::collections::HashMap;
use std::f64::consts::PI;

use force_graph::DefaultNodeIdx;
use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::state::{BoxContent, ForceGraphState, HEADER_HEIGHT, ROW_HEIGHT};
use super::types::{Palette, SELECTED};
use crate::diagram::model::AttributeKind;

fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

/// Where a node sits this frame and how far its outline reaches.
#[derive(Clone, Copy)]
struct Placed {
	x: f64,
	y: f64,
	half_w: f64,
	half_h: f64,
	is_box: bool,
}

impl Placed {
	/// Distance from the centre to the outline along unit direction (ux, uy).
	fn reach(&self, ux: f64, uy: f64) -> f64 {
		if !self.is_box {
			return self.half_w;
		}
		let tx = if ux.abs() > 1e-6 { self.half_w / ux.abs() } else { f64::MAX };
		let ty = if uy.abs() > 1e-6 { self.half_h / uy.abs() } else { f64::MAX };
		tx.min(ty)
	}
}

fn placements(state: &ForceGraphState) -> HashMap<DefaultNodeIdx, Placed> {
	let mut out = HashMap::new();
	state.graph.visit_nodes(|node| {
		let info = &node.data.user_data;
		let (half_w, half_h, is_box) = match &info.boxed {
			Some(b) => (b.width / 2.0, b.height / 2.0, true),
			None => (info.radius(), info.radius(), false),
		};
		out.insert(
			node.index(),
			Placed {
				x: node.x() as f64,
				y: node.y() as f64,
				half_w,
				half_h,
				is_box,
			},
		);
	});
	out
}

pub fn render(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	let palette = Palette::for_theme(state.is_light);
	ctx.set_fill_style_str(palette.background);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);
	let placed = placements(state);
	draw_edges(state, ctx, palette, &placed);
	draw_nodes(state, ctx, palette);
	ctx.restore();
}

fn draw_edges(
	state: &ForceGraphState,
	ctx: &CanvasRenderingContext2d,
	palette: &Palette,
	placed: &HashMap<DefaultNodeIdx, Placed>,
) {
	let k = state.transform.k;
	let arrow_size = 10.0;
	let t = ease_out_cubic(state.hover.highlight_t);
	let has_highlight = state.has_active_highlight();

	for (i, edge) in state.edges.iter().enumerate() {
		let (Some(a), Some(b)) = (placed.get(&edge.src), placed.get(&edge.tgt)) else {
			continue;
		};
		let (dx, dy) = (b.x - a.x, b.y - a.y);
		let dist = (dx * dx + dy * dy).sqrt();
		if dist < 0.001 {
			continue;
		}
		let (ux, uy) = (dx / dist, dy / dist);
		let (start, end) = (a.reach(ux, uy), b.reach(-ux, -uy));
		if start + end >= dist {
			continue;
		}

		let lit = state.is_highlighted(edge.src) && state.is_highlighted(edge.tgt);
		let alpha = match (has_highlight, lit) {
			(false, _) => 1.0,
			(true, true) => 1.0,
			(true, false) => 1.0 - 0.75 * t,
		};
		let color = if state.is_selected_edge(i) {
			SELECTED
		} else if edge.inheritance {
			palette.inheritance
		} else {
			palette.edge
		};

		ctx.set_global_alpha(alpha);
		ctx.set_stroke_style_str(color);
		ctx.set_line_width(2.0);
		if edge.inheritance {
			let _ = ctx.set_line_dash(&js_sys::Array::of2(
				&JsValue::from_f64(6.0),
				&JsValue::from_f64(3.0),
			));
		}
		let (tip_x, tip_y) = (b.x - ux * end, b.y - uy * end);
		let (back_x, back_y) = (tip_x - ux * arrow_size, tip_y - uy * arrow_size);
		ctx.begin_path();
		ctx.move_to(a.x + ux * start, a.y + uy * start);
		ctx.line_to(back_x, back_y);
		ctx.stroke();
		let _ = ctx.set_line_dash(&js_sys::Array::new());

		// Open triangle for generalisation, filled arrow otherwise
		let (px, py) = (-uy * arrow_size * 0.6, ux * arrow_size * 0.6);
		ctx.begin_path();
		ctx.move_to(tip_x, tip_y);
		ctx.line_to(back_x + px, back_y + py);
		ctx.line_to(back_x - px, back_y - py);
		ctx.close_path();
		if edge.inheritance {
			ctx.set_fill_style_str(palette.box_fill);
			ctx.fill();
			ctx.stroke();
		} else {
			ctx.set_fill_style_str(color);
			ctx.fill();
		}

		if k > 0.45 {
			let (mx, my) = ((a.x + b.x) / 2.0, (a.y + b.y) / 2.0);
			ctx.set_font(if edge.inheritance {
				"italic 10px Inter, sans-serif"
			} else {
				"11px Inter, sans-serif"
			});
			let w = ctx
				.measure_text(&edge.label)
				.map(|m| m.width())
				.unwrap_or(edge.label.len() as f64 * 6.0);
			ctx.set_fill_style_str(palette.label_bg);
			ctx.fill_rect(mx - w / 2.0 - 4.0, my - 8.0, w + 8.0, 16.0);
			ctx.set_fill_style_str(if edge.inheritance {
				palette.inheritance
			} else {
				palette.type_text
			});
			let _ = ctx.fill_text(&edge.label, mx - w / 2.0, my + 4.0);
		}
	}
	ctx.set_global_alpha(1.0);
}

fn draw_nodes(state: &ForceGraphState, ctx: &CanvasRenderingContext2d, palette: &Palette) {
	let (has_highlight, t) = (
		state.has_active_highlight(),
		ease_out_cubic(state.hover.highlight_t),
	);

	state.graph.visit_nodes(|node| {
		let idx = node.index();
		let info = &node.data.user_data;
		let (x, y) = (node.x() as f64, node.y() as f64);
		let selected = state.is_selected_node(idx);
		let alpha = if has_highlight && !state.is_highlighted(idx) {
			1.0 - 0.7 * t
		} else {
			1.0
		};
		ctx.set_global_alpha(alpha);

		if let Some(content) = &info.boxed {
			draw_box(ctx, palette, content, x, y, info.is_center, selected);
		} else {
			let radius = info.radius();
			ctx.begin_path();
			let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
			ctx.set_fill_style_str(palette.node_fill(info.category, info.is_center));
			ctx.fill();
			ctx.set_line_width(if selected { 3.0 } else { 1.5 });
			ctx.set_stroke_style_str(if selected { SELECTED } else { palette.box_stroke });
			ctx.stroke();

			ctx.set_fill_style_str(palette.text);
			ctx.set_font(if info.is_center {
				"bold 14px Inter, sans-serif"
			} else {
				"12px Inter, sans-serif"
			});
			let _ = ctx.fill_text(&info.label, x + radius + 4.0, y + 4.0);
		}
	});
	ctx.set_global_alpha(1.0);
}

fn draw_box(
	ctx: &CanvasRenderingContext2d,
	palette: &Palette,
	content: &BoxContent,
	x: f64,
	y: f64,
	is_center: bool,
	selected: bool,
) {
	let (left, top) = (x - content.width / 2.0, y - content.height / 2.0);
	ctx.set_fill_style_str(palette.box_fill);
	ctx.fill_rect(left, top, content.width, content.height);

	let mut header_h = HEADER_HEIGHT;
	if content.stereotype.is_some() {
		header_h += 12.0;
	}
	ctx.set_fill_style_str(if is_center { palette.center } else { palette.header });
	ctx.fill_rect(left, top, content.width, header_h);

	ctx.set_fill_style_str("#ffffff");
	let mut cursor = top;
	if let Some(stereotype) = content.stereotype {
		ctx.set_font("italic 10px Inter, sans-serif");
		cursor += 12.0;
		let _ = ctx.fill_text(stereotype, left + 8.0, cursor);
	}
	ctx.set_font("bold 13px Inter, sans-serif");
	let _ = ctx.fill_text(&content.title, left + 8.0, cursor + 19.0);
	cursor = top + header_h;

	ctx.set_fill_style_str(palette.box_body);
	ctx.fill_rect(left, cursor, content.width, content.height - header_h);

	ctx.set_font("11px 'Fira Code', monospace");
	if let Some(doc) = &content.doc {
		ctx.set_fill_style_str(palette.muted);
		cursor += ROW_HEIGHT;
		let _ = ctx.fill_text(doc, left + 12.0, cursor);
	}
	for (text, kind) in &content.rows {
		cursor += ROW_HEIGHT;
		ctx.set_fill_style_str(match kind {
			AttributeKind::Association => palette.association_attr,
			AttributeKind::Scalar => palette.scalar_attr,
		});
		let _ = ctx.fill_text(text, left + 12.0, cursor);
	}

	ctx.set_line_width(if selected || is_center { 2.5 } else { 1.5 });
	ctx.set_stroke_style_str(if selected {
		SELECTED
	} else if is_center {
		palette.center
	} else {
		palette.box_stroke
	});
	ctx.stroke_rect(left, top, content.width, content.height);
}

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use leptos::prelude::*;
use log::warn;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent};

use super::render;
use super::state::ForceGraphState;
use crate::diagram::{DiagramModel, SelectionRef};

/// Viewport actions from the diagram toolbar.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CanvasCommand {
	ZoomIn,
	ZoomOut,
	Fit,
	Relayout,
}

/// Event position relative to the canvas' top-left corner.
fn canvas_point(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let rect = canvas_ref.get_untracked()?.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

fn parent_size(canvas: &HtmlCanvasElement) -> (f64, f64) {
	canvas
		.parent_element()
		.map(|p| (p.client_width() as f64, p.client_height() as f64))
		.filter(|(w, h)| *w > 0.0 && *h > 0.0)
		.unwrap_or((800.0, 600.0))
}

/// Canvas renderer for the committed diagram model.
///
/// The canvas never edits the model; it reports picks through `on_select`
/// and node double-clicks through `on_focus`.
#[component]
pub fn ForceGraphCanvas(
	#[prop(into)] model: Signal<Option<Arc<DiagramModel>>>,
	#[prop(into)] on_select: Callback<Option<SelectionRef>>,
	#[prop(into)] on_focus: Callback<String>,
	#[prop(into)] command: Signal<Option<CanvasCommand>>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state: Rc<RefCell<Option<ForceGraphState>>> = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let (state_init, animate_init, resize_cb_init) =
		(state.clone(), animate.clone(), resize_cb.clone());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};
		let (w, h) = parent_size(&canvas);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			warn!("canvas 2d context unavailable");
			return;
		};

		let (state_resize, canvas_resize) = (state_init.clone(), canvas.clone());
		*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
			let (nw, nh) = parent_size(&canvas_resize);
			canvas_resize.set_width(nw as u32);
			canvas_resize.set_height(nh as u32);
			if let Some(ref mut s) = *state_resize.borrow_mut() {
				s.resize(nw, nh);
			}
		}));
		if let Some(ref cb) = *resize_cb_init.borrow() {
			let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}

		let (state_anim, animate_inner) = (state_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if let Some(ref mut s) = *state_anim.borrow_mut() {
				if s.animation_running {
					s.tick(0.016);
				}
				render::render(s, &ctx);
			}
			if let (Some(cb), Some(win)) = (animate_inner.borrow().as_ref(), web_sys::window()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	// Rebuild on a new commit; a retheme of the same commit only flips the flag.
	let state_sync = state.clone();
	Effect::new(move |_| {
		let current = model.get();
		let mut slot = state_sync.borrow_mut();
		match (current, slot.as_mut()) {
			(None, _) => *slot = None,
			(Some(m), Some(s)) if s.revision == m.revision => s.is_light = m.is_light,
			(Some(m), _) => {
				let (w, h) = canvas_ref
					.get_untracked()
					.map(|c| {
						let c: HtmlCanvasElement = c.into();
						(c.width() as f64, c.height() as f64)
					})
					.unwrap_or((800.0, 600.0));
				*slot = Some(ForceGraphState::new(&m, w, h));
			}
		}
	});

	let state_cmd = state.clone();
	Effect::new(move |_| {
		let Some(cmd) = command.get() else {
			return;
		};
		if let Some(ref mut s) = *state_cmd.borrow_mut() {
			match cmd {
				CanvasCommand::ZoomIn => s.zoom_by(1.2),
				CanvasCommand::ZoomOut => s.zoom_by(1.0 / 1.2),
				CanvasCommand::Fit => s.fit(),
				CanvasCommand::Relayout => s.relayout(),
			}
		}
	});

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = canvas_point(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_md.borrow_mut() {
			s.press(x, y);
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = canvas_point(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_mm.borrow_mut() {
			s.pointer_moved(x, y);
		}
	};

	let state_mu = state.clone();
	let on_mouseup = move |ev: MouseEvent| {
		let Some((x, y)) = canvas_point(canvas_ref, &ev) else {
			return;
		};
		let picked = state_mu
			.borrow_mut()
			.as_mut()
			.and_then(|s| s.release().then(|| s.pick(x, y)));
		// Borrow released first: the callback may re-enter through the model effect.
		if let Some(selection) = picked {
			on_select.run(selection);
		}
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_ml.borrow_mut() {
			s.leave();
		}
	};

	let state_dbl = state.clone();
	let on_dblclick = move |ev: MouseEvent| {
		let Some((x, y)) = canvas_point(canvas_ref, &ev) else {
			return;
		};
		let label = {
			let guard = state_dbl.borrow();
			guard.as_ref().and_then(|s| {
				s.node_at_position(x, y)
					.and_then(|idx| s.node_info(idx))
					.map(|n| n.label)
			})
		};
		if let Some(label) = label.filter(|l| !l.is_empty()) {
			on_focus.run(label);
		}
	};

	let state_wh = state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = canvas_point(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_wh.borrow_mut() {
			s.zoom_at(x, y, if ev.delta_y() > 0.0 { 0.9 } else { 1.1 });
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="force-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:dblclick=on_dblclick
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
	}
}

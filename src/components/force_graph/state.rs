use std::collections::{HashMap, HashSet};
use std::f64::consts::PI;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};

use crate::diagram::model::{AttributeKind, LinkCategory};
use crate::diagram::{DiagramModel, NodeCategory, SelectionRef};
use crate::format::{pascal_case, truncate};

pub const NODE_RADIUS: f64 = 9.0;
pub const CENTER_RADIUS: f64 = 13.0;
pub const HIT_RADIUS: f64 = 14.0;
pub const EDGE_HIT: f64 = 6.0;
pub const ROW_HEIGHT: f64 = 16.0;
pub const HEADER_HEIGHT: f64 = 28.0;
const FIT_AFTER_TICKS: u32 = 30;
/// Pointer travel (px) below which a press counts as a click.
const CLICK_SLOP: f64 = 3.0;
const MIN_ZOOM: f64 = 0.1;
const MAX_ZOOM: f64 = 10.0;

/// Pre-formatted content of a UML or schema box.
#[derive(Clone, Debug, Default)]
pub struct BoxContent {
	pub stereotype: Option<&'static str>,
	pub title: String,
	pub doc: Option<String>,
	pub rows: Vec<(String, AttributeKind)>,
	pub width: f64,
	pub height: f64,
}

impl BoxContent {
	fn build(node: &crate::diagram::GraphNode) -> Self {
		let pydantic = node.category == NodeCategory::Pydantic;
		let title = if pydantic {
			format!("class {}(BaseModel):", pascal_case(&node.label))
		} else {
			node.label.clone()
		};
		let rows: Vec<(String, AttributeKind)> = node
			.attributes
			.iter()
			.map(|a| {
				let text = if pydantic {
					format!("{}: Optional[{}] = None", a.name, a.type_name)
				} else {
					format!("+ {} : {}", a.name, a.type_name)
				};
				(text, a.kind)
			})
			.collect();
		let doc = node
			.definition
			.as_ref()
			.filter(|d| pydantic && !d.is_empty())
			.map(|d| format!("\"\"\"{}\"\"\"", truncate(d, 48)));
		let stereotype = node.is_enum.then_some(if pydantic {
			"@enumeration"
		} else {
			"«enumeration»"
		});

		let widest = rows
			.iter()
			.map(|(t, _)| t.chars().count())
			.chain(doc.iter().map(|d| d.chars().count()))
			.max()
			.unwrap_or(0);
		let width = (title.chars().count() as f64 * 7.5)
			.max(widest as f64 * 6.5)
			.max(120.0)
			+ 24.0;
		let height = HEADER_HEIGHT
			+ if stereotype.is_some() { 12.0 } else { 0.0 }
			+ if doc.is_some() { ROW_HEIGHT } else { 0.0 }
			+ rows.len() as f64 * ROW_HEIGHT
			+ 12.0;
		Self {
			stereotype,
			title,
			doc,
			rows,
			width,
			height,
		}
	}
}

#[derive(Clone, Debug, Default)]
pub struct NodeInfo {
	pub key: String,
	pub label: String,
	pub category: NodeCategory,
	pub is_center: bool,
	/// Present for UML and schema nodes.
	pub boxed: Option<BoxContent>,
}

impl NodeInfo {
	pub fn radius(&self) -> f64 {
		if self.is_center { CENTER_RADIUS } else { NODE_RADIUS }
	}
}

#[derive(Clone, Debug)]
pub struct EdgeInfo {
	pub src: DefaultNodeIdx,
	pub tgt: DefaultNodeIdx,
	/// Index into the model's links.
	pub link: usize,
	pub label: String,
	pub inheritance: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Picked {
	Node(DefaultNodeIdx),
	Edge(usize),
}

#[derive(Clone, Debug, Default)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	pub moved: bool,
	pub node_idx: Option<DefaultNodeIdx>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start_x: f32,
	pub node_start_y: f32,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

#[derive(Clone, Debug, Default)]
pub struct HoverState {
	pub node: Option<DefaultNodeIdx>,
	pub neighbors: HashSet<DefaultNodeIdx>,
	pub highlight_t: f64,
	pub prev_node: Option<DefaultNodeIdx>,
	pub prev_neighbors: HashSet<DefaultNodeIdx>,
	delay_t: f64,
}

pub struct ForceGraphState {
	pub graph: ForceGraph<NodeInfo, ()>,
	pub edges: Vec<EdgeInfo>,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub hover: HoverState,
	pub selected: Option<Picked>,
	pub revision: u64,
	pub is_light: bool,
	pub width: f64,
	pub height: f64,
	pub animation_running: bool,
	/// Ticks left before the viewport is fitted to the settled layout.
	fit_countdown: u32,
}

fn circle_position(i: usize, n: usize, width: f64, height: f64) -> (f32, f32) {
	let angle = (i as f64) * 2.0 * PI / n.max(1) as f64;
	let spread = 60.0 + 20.0 * (n as f64).sqrt();
	(
		(width / 2.0 + spread * angle.cos()) as f32,
		(height / 2.0 + spread * angle.sin()) as f32,
	)
}

impl ForceGraphState {
	pub fn new(model: &DiagramModel, width: f64, height: f64) -> Self {
		let boxes = model.nodes.iter().any(|n| n.category.is_box());
		let mut graph = ForceGraph::new(SimulationParameters {
			force_charge: if boxes { 900.0 } else { 150.0 },
			force_spring: 0.05,
			force_max: 100.0,
			node_speed: 3000.0,
			damping_factor: 0.9,
		});
		let mut key_to_idx = HashMap::new();

		for (i, node) in model.nodes.iter().enumerate() {
			let (x, y) = circle_position(i, model.nodes.len(), width, height);
			let idx = graph.add_node(NodeData {
				x,
				y,
				mass: if node.category.is_box() { 25.0 } else { 10.0 },
				is_anchor: false,
				user_data: NodeInfo {
					key: node.key.clone(),
					label: node.label.clone(),
					category: node.category,
					is_center: node.is_center,
					boxed: node.category.is_box().then(|| BoxContent::build(node)),
				},
			});
			key_to_idx.insert(node.key.as_str(), idx);
		}

		let mut edges = Vec::with_capacity(model.links.len());
		for (i, link) in model.links.iter().enumerate() {
			if let (Some(&src), Some(&tgt)) =
				(key_to_idx.get(link.from.as_str()), key_to_idx.get(link.to.as_str()))
			{
				graph.add_edge(src, tgt, EdgeData::default());
				let inheritance = link.category == LinkCategory::Inheritance;
				edges.push(EdgeInfo {
					src,
					tgt,
					link: i,
					label: if inheritance {
						"extends".to_string()
					} else {
						link.relationship.clone()
					},
					inheritance,
				});
			}
		}

		Self {
			graph,
			edges,
			transform: ViewTransform {
				x: 0.0,
				y: 0.0,
				k: 1.0,
			},
			drag: DragState::default(),
			pan: PanState::default(),
			hover: HoverState::default(),
			selected: None,
			revision: model.revision,
			is_light: model.is_light,
			width,
			height,
			animation_running: true,
			fit_countdown: FIT_AFTER_TICKS,
		}
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	pub fn positions(&self) -> HashMap<DefaultNodeIdx, (f64, f64)> {
		let mut out = HashMap::new();
		self.graph.visit_nodes(|node| {
			out.insert(node.index(), (node.x() as f64, node.y() as f64));
		});
		out
	}

	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<DefaultNodeIdx> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let mut found = None;
		self.graph.visit_nodes(|node| {
			let (dx, dy) = (node.x() as f64 - gx, node.y() as f64 - gy);
			let hit = match &node.data.user_data.boxed {
				Some(b) => dx.abs() <= b.width / 2.0 && dy.abs() <= b.height / 2.0,
				// HIT_RADIUS is in world-space, scales with zoom like nodes
				None => (dx * dx + dy * dy).sqrt() < HIT_RADIUS.max(node.data.user_data.radius()),
			};
			if hit {
				found = Some(node.index());
			}
		});
		found
	}

	pub fn edge_at_position(&self, sx: f64, sy: f64) -> Option<usize> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let positions = self.positions();
		let tolerance = EDGE_HIT / self.transform.k.max(0.1);
		self.edges.iter().enumerate().find_map(|(i, e)| {
			let (&(x1, y1), &(x2, y2)) = (positions.get(&e.src)?, positions.get(&e.tgt)?);
			(segment_distance(gx, gy, x1, y1, x2, y2) < tolerance).then_some(i)
		})
	}

	pub fn node_info(&self, idx: DefaultNodeIdx) -> Option<NodeInfo> {
		let mut found = None;
		self.graph.visit_nodes(|node| {
			if node.index() == idx {
				found = Some(node.data.user_data.clone());
			}
		});
		found
	}

	/// Pick whatever lies under the pointer and report it as a model selection.
	pub fn pick(&mut self, sx: f64, sy: f64) -> Option<SelectionRef> {
		if let Some(idx) = self.node_at_position(sx, sy) {
			self.selected = Some(Picked::Node(idx));
			return self.node_info(idx).map(|n| SelectionRef::Node(n.key));
		}
		if let Some(edge) = self.edge_at_position(sx, sy) {
			self.selected = Some(Picked::Edge(edge));
			return Some(SelectionRef::Link(self.edges[edge].link));
		}
		self.selected = None;
		None
	}

	pub fn is_selected_node(&self, idx: DefaultNodeIdx) -> bool {
		self.selected == Some(Picked::Node(idx))
	}

	pub fn is_selected_edge(&self, edge: usize) -> bool {
		self.selected == Some(Picked::Edge(edge))
	}

	pub fn set_hover(&mut self, node: Option<DefaultNodeIdx>) {
		if self.hover.node == node {
			return;
		}
		let was_hovering = self.hover.node.is_some();

		// Keep the outgoing highlight so it can fade
		if was_hovering && node.is_none() {
			self.hover.prev_node = self.hover.node.take();
			self.hover.prev_neighbors = std::mem::take(&mut self.hover.neighbors);
		} else {
			self.hover.prev_node = None;
			self.hover.prev_neighbors.clear();
		}

		self.hover.node = node;
		self.hover.neighbors.clear();

		if let Some(idx) = node {
			if !was_hovering {
				self.hover.delay_t = 0.0;
			}
			for e in &self.edges {
				if e.src == idx {
					self.hover.neighbors.insert(e.tgt);
				} else if e.tgt == idx {
					self.hover.neighbors.insert(e.src);
				}
			}
		}
	}

	pub fn is_highlighted(&self, idx: DefaultNodeIdx) -> bool {
		self.hover.node == Some(idx)
			|| self.hover.neighbors.contains(&idx)
			|| self.hover.prev_node == Some(idx)
			|| self.hover.prev_neighbors.contains(&idx)
	}

	pub fn has_active_highlight(&self) -> bool {
		self.hover.node.is_some() || self.hover.prev_node.is_some()
	}

	pub fn tick(&mut self, dt: f32) {
		self.graph.update(dt);
		if self.fit_countdown > 0 {
			self.fit_countdown -= 1;
			if self.fit_countdown == 0 {
				self.fit();
			}
		}

		let (target, delay, speed) = if self.hover.node.is_some() {
			(1.0, 0.08, 1.8)
		} else {
			(0.0, 0.0, 1.26)
		};

		if self.hover.node.is_some() {
			self.hover.delay_t = (self.hover.delay_t + dt as f64).min(delay);
			if self.hover.delay_t >= delay {
				self.hover.highlight_t += (target - self.hover.highlight_t) * speed * dt as f64;
			}
		} else {
			self.hover.highlight_t += (target - self.hover.highlight_t) * speed * dt as f64;
			if self.hover.highlight_t < 0.01 {
				self.hover.highlight_t = 0.0;
				self.hover.prev_node = None;
				self.hover.prev_neighbors.clear();
			}
		}
	}

	/// Pointer down: grab the node under it, or start panning.
	pub fn press(&mut self, sx: f64, sy: f64) {
		self.drag.moved = false;
		self.drag.start_x = sx;
		self.drag.start_y = sy;
		let Some(idx) = self.node_at_position(sx, sy) else {
			self.pan = PanState {
				active: true,
				start_x: sx,
				start_y: sy,
				transform_start_x: self.transform.x,
				transform_start_y: self.transform.y,
			};
			return;
		};
		let (mut nx, mut ny) = (0.0, 0.0);
		self.graph.visit_nodes(|node| {
			if node.index() == idx {
				(nx, ny) = (node.x(), node.y());
			}
		});
		self.drag.active = true;
		self.drag.node_idx = Some(idx);
		self.drag.node_start_x = nx;
		self.drag.node_start_y = ny;
	}

	/// Pointer move: hover when idle, otherwise move the grabbed node or the view.
	pub fn pointer_moved(&mut self, sx: f64, sy: f64) {
		if !self.drag.active {
			let hovered = self.node_at_position(sx, sy);
			self.set_hover(hovered);
		}
		if !(self.drag.active || self.pan.active) {
			return;
		}
		if (sx - self.drag.start_x).hypot(sy - self.drag.start_y) > CLICK_SLOP {
			self.drag.moved = true;
		}

		if let (true, Some(idx)) = (self.drag.active, self.drag.node_idx) {
			let k = self.transform.k;
			let nx = self.drag.node_start_x + ((sx - self.drag.start_x) / k) as f32;
			let ny = self.drag.node_start_y + ((sy - self.drag.start_y) / k) as f32;
			self.graph.visit_nodes_mut(|node| {
				if node.index() == idx {
					node.data.x = nx;
					node.data.y = ny;
					node.data.is_anchor = true;
				}
			});
		} else if self.pan.active {
			self.transform.x = self.pan.transform_start_x + (sx - self.pan.start_x);
			self.transform.y = self.pan.transform_start_y + (sy - self.pan.start_y);
		}
	}

	/// Pointer up. Returns true when the press never travelled, i.e. a click.
	pub fn release(&mut self) -> bool {
		let was_click = (self.drag.active || self.pan.active) && !self.drag.moved;
		self.drag.active = false;
		self.drag.node_idx = None;
		self.pan.active = false;
		was_click
	}

	/// Pointer left the canvas.
	pub fn leave(&mut self) {
		self.release();
		self.set_hover(None);
	}

	/// Wheel zoom anchored at the pointer.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, factor: f64) {
		let new_k = (self.transform.k * factor).clamp(MIN_ZOOM, MAX_ZOOM);
		let ratio = new_k / self.transform.k;
		self.transform.x = sx - (sx - self.transform.x) * ratio;
		self.transform.y = sy - (sy - self.transform.y) * ratio;
		self.transform.k = new_k;
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}

	/// Toolbar zoom, anchored at the canvas centre.
	pub fn zoom_by(&mut self, factor: f64) {
		self.zoom_at(self.width / 2.0, self.height / 2.0, factor);
	}

	/// Scale and centre so every node is visible.
	pub fn fit(&mut self) {
		let (mut min_x, mut min_y, mut max_x, mut max_y) = (f64::MAX, f64::MAX, f64::MIN, f64::MIN);
		self.graph.visit_nodes(|node| {
			let (hw, hh) = match &node.data.user_data.boxed {
				Some(b) => (b.width / 2.0, b.height / 2.0),
				None => (60.0, CENTER_RADIUS),
			};
			let (x, y) = (node.x() as f64, node.y() as f64);
			min_x = min_x.min(x - hw);
			max_x = max_x.max(x + hw);
			min_y = min_y.min(y - hh);
			max_y = max_y.max(y + hh);
		});
		if min_x > max_x {
			return;
		}
		let pad = 40.0;
		let k = ((self.width - pad) / (max_x - min_x).max(1.0))
			.min((self.height - pad) / (max_y - min_y).max(1.0))
			.clamp(MIN_ZOOM, 2.0);
		self.transform.k = k;
		self.transform.x = self.width / 2.0 - (min_x + max_x) / 2.0 * k;
		self.transform.y = self.height / 2.0 - (min_y + max_y) / 2.0 * k;
	}

	/// Scatter the nodes again and restart the simulation.
	pub fn relayout(&mut self) {
		let mut n = 0;
		self.graph.visit_nodes(|_| n += 1);
		let (w, h) = (self.width, self.height);
		let mut i = 0;
		self.graph.visit_nodes_mut(|node| {
			let (x, y) = circle_position(i, n, w, h);
			node.data.x = x;
			node.data.y = y;
			node.data.is_anchor = false;
			i += 1;
		});
		self.animation_running = true;
		self.fit_countdown = FIT_AFTER_TICKS;
	}
}

fn segment_distance(px: f64, py: f64, x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
	let (dx, dy) = (x2 - x1, y2 - y1);
	let len2 = dx * dx + dy * dy;
	let t = if len2 < f64::EPSILON {
		0.0
	} else {
		(((px - x1) * dx + (py - y1) * dy) / len2).clamp(0.0, 1.0)
	};
	let (cx, cy) = (x1 + t * dx, y1 + t * dy);
	((px - cx).powi(2) + (py - cy).powi(2)).sqrt()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::diagram::model::{GraphLink, GraphNode, UmlAttribute};

	fn model() -> DiagramModel {
		DiagramModel {
			revision: 4,
			nodes: vec![
				GraphNode {
					key: "a".into(),
					label: "A".into(),
					is_center: true,
					..Default::default()
				},
				GraphNode {
					key: "b".into(),
					label: "B".into(),
					..Default::default()
				},
			],
			links: vec![GraphLink {
				from: "a".into(),
				to: "b".into(),
				relationship: "rel".into(),
				..Default::default()
			}],
			..Default::default()
		}
	}

	#[test]
	fn builds_one_edge_per_link() {
		let state = ForceGraphState::new(&model(), 800.0, 600.0);
		assert_eq!(state.edges.len(), 1);
		assert_eq!(state.edges[0].label, "rel");
		assert_eq!(state.revision, 4);
	}

	#[test]
	fn picking_a_node_reports_its_key() {
		let mut state = ForceGraphState::new(&model(), 800.0, 600.0);
		let (x, y) = state.positions()[&state.edges[0].src];
		assert_eq!(state.pick(x, y), Some(SelectionRef::Node("a".into())));
		assert_eq!(state.pick(-5000.0, -5000.0), None);
		assert_eq!(state.selected, None);
	}

	#[test]
	fn press_without_travel_is_a_click() {
		let mut state = ForceGraphState::new(&model(), 800.0, 600.0);
		let (x, y) = state.positions()[&state.edges[0].tgt];
		state.press(x, y);
		assert!(state.drag.active);
		state.pointer_moved(x + 1.0, y);
		assert!(state.release());
		assert!(!state.drag.active);
	}

	#[test]
	fn dragging_a_node_moves_it_and_is_not_a_click() {
		let mut state = ForceGraphState::new(&model(), 800.0, 600.0);
		let idx = state.edges[0].tgt;
		let (x, y) = state.positions()[&idx];
		state.press(x, y);
		state.pointer_moved(x + 40.0, y + 30.0);
		assert!(!state.release());
		let (nx, ny) = state.positions()[&idx];
		assert!((nx - (x + 40.0)).abs() < 1e-3);
		assert!((ny - (y + 30.0)).abs() < 1e-3);
	}

	#[test]
	fn panning_the_background_shifts_the_view() {
		let mut state = ForceGraphState::new(&model(), 800.0, 600.0);
		state.press(-5000.0, -5000.0);
		assert!(state.pan.active);
		state.pointer_moved(-4990.0, -4980.0);
		assert!(!state.release());
		assert_eq!((state.transform.x, state.transform.y), (10.0, 20.0));
	}

	#[test]
	fn zoom_keeps_the_anchor_fixed_and_clamps() {
		let mut state = ForceGraphState::new(&model(), 800.0, 600.0);
		let before = state.screen_to_graph(200.0, 100.0);
		state.zoom_at(200.0, 100.0, 2.0);
		let after = state.screen_to_graph(200.0, 100.0);
		assert!((before.0 - after.0).abs() < 1e-9 && (before.1 - after.1).abs() < 1e-9);
		state.zoom_at(0.0, 0.0, 1000.0);
		assert_eq!(state.transform.k, MAX_ZOOM);
	}

	#[test]
	fn segment_distance_is_perpendicular_inside_segment() {
		assert!((segment_distance(5.0, 3.0, 0.0, 0.0, 10.0, 0.0) - 3.0).abs() < 1e-9);
		assert!((segment_distance(-4.0, 3.0, 0.0, 0.0, 10.0, 0.0) - 5.0).abs() < 1e-9);
	}

	#[test]
	fn schema_boxes_format_rows() {
		let node = GraphNode {
			label: "invoice line".into(),
			category: NodeCategory::Pydantic,
			definition: Some("One line".into()),
			attributes: vec![UmlAttribute {
				name: "amount".into(),
				type_name: "decimal".into(),
				..Default::default()
			}],
			..Default::default()
		};
		let b = BoxContent::build(&node);
		assert_eq!(b.title, "class InvoiceLine(BaseModel):");
		assert_eq!(b.rows[0].0, "amount: Optional[decimal] = None");
		assert_eq!(b.doc.as_deref(), Some("\"\"\"One line\"\"\""));
		assert!(b.height > HEADER_HEIGHT + ROW_HEIGHT);
	}
}

//! Force-directed layout solver.
//!
//! A d3-force style velocity simulation with five forces: many-body repulsion,
//! springs along edges, a weak pull toward the origin, collision avoidance and
//! an optional per-tier vertical bias. Every tick multiplies `alpha` by
//! `1 - alpha_decay`; force magnitudes scale with `alpha`, and the simulation
//! settles once `alpha` drops below `alpha_min`.
//!
//! Collision is the exception to alpha scaling: it behaves as a positional
//! constraint and always pushes overlapping nodes apart at full strength.

use std::collections::{HashMap, HashSet};

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;

use super::types::{Edge, GraphData, Node};

/// Squared distance below which repulsion stops growing.
const DISTANCE_MIN2: f64 = 1.0;

/// Physics parameters for a [`ForceSimulation`].
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
	/// Many-body strength. Negative values repel.
	pub charge_strength: f64,
	/// Rest length of every spring.
	pub link_distance: f64,
	/// Fraction of the spring error corrected per tick at `alpha = 1` and
	/// weight 1. Lower weights soften the spring down to half this value.
	pub link_strength: f64,
	/// Pull of the node centroid toward the origin.
	pub center_strength: f64,
	/// Collision radius as a multiple of the node radius.
	pub collide_scale: f64,
	/// Strength of the vertical pull toward each node's tier row. Zero disables it.
	pub tier_bias: f64,
	/// Number of tier rows spread over the viewport height.
	pub tier_count: u32,
	/// Fraction of `alpha` lost per tick.
	pub alpha_decay: f64,
	/// The simulation settles once `alpha` falls below this.
	pub alpha_min: f64,
	/// `alpha` restored by [`ForceSimulation::reheat`].
	pub reheat_alpha: f64,
	/// Fraction of velocity lost per tick.
	pub velocity_decay: f64,
	/// Ticks run synchronously before the first frame.
	pub warm_start_ticks: usize,
	/// Unplaced nodes start within this fraction of the viewport, centered on the origin.
	pub seed_spread: f64,
	/// Seed for initial placement. `None` draws one from the OS.
	pub seed: Option<u64>,
}

impl Default for SimulationConfig {
	fn default() -> Self {
		Self {
			charge_strength: -30.0,
			link_distance: 80.0,
			link_strength: 0.3,
			center_strength: 0.05,
			collide_scale: 1.5,
			tier_bias: 0.0,
			tier_count: 5,
			alpha_decay: 0.02,
			alpha_min: 0.01,
			reheat_alpha: 0.3,
			velocity_decay: 0.4,
			warm_start_ticks: 100,
			seed_spread: 0.6,
			seed: None,
		}
	}
}

impl SimulationConfig {
	/// Hierarchical layout for the topic skill tree.
	pub fn skill_tree() -> Self {
		Self {
			charge_strength: -200.0,
			link_distance: 100.0,
			tier_bias: 0.15,
			tier_count: 5,
			alpha_decay: 0.025,
			..Self::default()
		}
	}

	/// Loose layout for the problem similarity graph.
	pub fn problem_graph() -> Self {
		Self {
			charge_strength: -40.0,
			link_distance: 50.0,
			alpha_decay: 0.03,
			..Self::default()
		}
	}
}

/// Lifecycle of a simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimulationPhase {
	/// Built and seeded, nothing simulated yet.
	Cold,
	/// Running the synchronous warm-up ticks.
	WarmStarting,
	/// Ticking once per frame.
	Animating,
	/// `alpha` fell below the threshold; no further ticks until reheated.
	Settled,
}

/// A node plus the state only the solver needs.
#[derive(Clone, Debug)]
struct SimNode {
	node: Node,
	vx: f64,
	vy: f64,
	fx: Option<f64>,
	fy: Option<f64>,
}

/// An edge resolved to node indices.
#[derive(Clone, Copy, Debug)]
struct Link {
	source: usize,
	target: usize,
	strength: f64,
	/// Share of the correction applied to the target.
	bias: f64,
}

/// Edges whose endpoints both exist in `nodes`, in their original order.
pub fn drop_dangling(nodes: &[Node], edges: &[Edge]) -> Vec<Edge> {
	let ids: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
	edges
		.iter()
		.filter(|e| ids.contains(e.source.as_str()) && ids.contains(e.target.as_str()))
		.cloned()
		.collect()
}

/// Owns the physics state for one graph snapshot.
///
/// Built from scratch whenever the graph identity changes; nothing carries over
/// except positions the caller seeded into the [`GraphData`].
pub struct ForceSimulation {
	nodes: Vec<SimNode>,
	edges: Vec<Edge>,
	links: Vec<Link>,
	index: HashMap<String, usize>,
	config: SimulationConfig,
	alpha: f64,
	phase: SimulationPhase,
	height: f64,
	rng: StdRng,
}

impl ForceSimulation {
	/// Build a cold simulation. Unplaced nodes are scattered around the origin
	/// within `seed_spread` of the viewport; dangling and self-referencing edges
	/// are left out of the spring list.
	pub fn new(data: &GraphData, config: SimulationConfig, width: f64, height: f64) -> Self {
		let mut rng = match config.seed {
			Some(seed) => StdRng::seed_from_u64(seed),
			None => StdRng::from_entropy(),
		};

		let mut index = HashMap::with_capacity(data.nodes.len());
		let mut nodes = Vec::with_capacity(data.nodes.len());
		for node in &data.nodes {
			if index.contains_key(&node.id) {
				warn!("galaxy: duplicate node id {:?}, keeping the first", node.id);
				continue;
			}
			let mut node = node.clone();
			let placed = node.is_placed() && node.x.is_finite() && node.y.is_finite();
			if !placed {
				node.x = rng.gen_range(-0.5f64..0.5) * width * config.seed_spread;
				node.y = rng.gen_range(-0.5f64..0.5) * height * config.seed_spread;
			}
			if !(node.radius.is_finite() && node.radius > 0.0) {
				node.radius = 1.0;
			}
			index.insert(node.id.clone(), nodes.len());
			nodes.push(SimNode {
				node,
				vx: 0.0,
				vy: 0.0,
				fx: None,
				fy: None,
			});
		}

		let edges: Vec<Edge> = data
			.edges
			.iter()
			.filter(|e| index.contains_key(&e.source) && index.contains_key(&e.target))
			.cloned()
			.collect();
		let dropped = data.edges.len() - edges.len();
		if dropped > 0 {
			warn!("galaxy: dropped {} edges with unknown endpoints", dropped);
		}

		let mut degree = vec![0usize; nodes.len()];
		let pairs: Vec<(usize, usize, f64)> = edges
			.iter()
			.map(|e| (index[&e.source], index[&e.target], e.weight))
			.filter(|(s, t, _)| s != t)
			.collect();
		for &(s, t, _) in &pairs {
			degree[s] += 1;
			degree[t] += 1;
		}
		let links = pairs
			.into_iter()
			.map(|(source, target, weight)| Link {
				source,
				target,
				strength: config.link_strength * (0.5 + 0.5 * weight.clamp(0.0, 1.0)),
				bias: degree[source] as f64 / (degree[source] + degree[target]) as f64,
			})
			.collect();

		info!(
			"galaxy: simulation built with {} nodes, {} edges",
			nodes.len(),
			edges.len()
		);

		Self {
			nodes,
			edges,
			links,
			index,
			config,
			alpha: 1.0,
			phase: SimulationPhase::Cold,
			height,
			rng,
		}
	}

	/// Run the warm-up ticks without rendering, then hand over to the frame loop.
	/// Does nothing unless the simulation is cold.
	pub fn warm_start(&mut self) {
		if self.phase != SimulationPhase::Cold {
			return;
		}
		self.phase = SimulationPhase::WarmStarting;
		let mut ticks = 0;
		while ticks < self.config.warm_start_ticks && self.alpha >= self.config.alpha_min {
			self.step();
			ticks += 1;
		}
		self.phase = if self.alpha < self.config.alpha_min {
			SimulationPhase::Settled
		} else {
			SimulationPhase::Animating
		};
		debug!(
			"galaxy: warm start ran {} ticks, alpha {:.4}, now {:?}",
			ticks, self.alpha, self.phase
		);
	}

	/// Advance one tick. A settled simulation stays put; a cold one starts
	/// animating without the warm-up.
	pub fn tick(&mut self) -> SimulationPhase {
		match self.phase {
			SimulationPhase::Settled => return self.phase,
			SimulationPhase::Cold => self.phase = SimulationPhase::Animating,
			SimulationPhase::WarmStarting | SimulationPhase::Animating => {}
		}
		self.step();
		if self.alpha < self.config.alpha_min {
			self.phase = SimulationPhase::Settled;
			debug!("galaxy: simulation settled");
		}
		self.phase
	}

	/// Restart the layout from the current positions.
	pub fn reheat(&mut self) {
		self.alpha = self.config.reheat_alpha;
		self.phase = if self.alpha < self.config.alpha_min {
			SimulationPhase::Settled
		} else {
			SimulationPhase::Animating
		};
	}

	/// Current temperature.
	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	/// Current lifecycle phase.
	pub fn phase(&self) -> SimulationPhase {
		self.phase
	}

	/// Whether ticking has stopped.
	pub fn is_settled(&self) -> bool {
		self.phase == SimulationPhase::Settled
	}

	/// Copies of the nodes at their current positions.
	pub fn snapshot(&self) -> Vec<Node> {
		self.nodes.iter().map(|n| n.node.clone()).collect()
	}

	/// Edges whose endpoints both exist.
	pub fn edges(&self) -> &[Edge] {
		&self.edges
	}

	/// Number of nodes.
	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	/// Whether the simulation has no nodes.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// Fix a node at a world position. Returns `false` for unknown ids and
	/// non-finite positions, leaving the node as it was.
	pub fn pin(&mut self, id: &str, x: f64, y: f64) -> bool {
		if !(x.is_finite() && y.is_finite()) {
			return false;
		}
		let Some(&i) = self.index.get(id) else {
			return false;
		};
		let node = &mut self.nodes[i];
		node.fx = Some(x);
		node.fy = Some(y);
		true
	}

	/// Release a pinned node. Returns `false` for unknown ids.
	pub fn unpin(&mut self, id: &str) -> bool {
		let Some(&i) = self.index.get(id) else {
			return false;
		};
		let node = &mut self.nodes[i];
		node.fx = None;
		node.fy = None;
		true
	}

	/// Update the viewport height used for tier rows.
	pub fn resize(&mut self, height: f64) {
		self.height = height;
	}

	fn step(&mut self) {
		self.alpha *= 1.0 - self.config.alpha_decay;
		let alpha = self.alpha;
		self.apply_charge(alpha);
		self.apply_links(alpha);
		self.apply_center(alpha);
		self.apply_collision();
		self.apply_tier_bias(alpha);
		self.integrate();
		self.sanitize();
	}

	fn jiggle(rng: &mut StdRng) -> f64 {
		(rng.gen_range(0.0f64..1.0) - 0.5) * 1e-6
	}

	fn apply_charge(&mut self, alpha: f64) {
		let strength = self.config.charge_strength;
		if strength == 0.0 {
			return;
		}
		let n = self.nodes.len();
		for i in 0..n {
			for j in (i + 1)..n {
				let mut dx = self.nodes[j].node.x - self.nodes[i].node.x;
				let mut dy = self.nodes[j].node.y - self.nodes[i].node.y;
				if dx == 0.0 {
					dx = Self::jiggle(&mut self.rng);
				}
				if dy == 0.0 {
					dy = Self::jiggle(&mut self.rng);
				}
				let mut l = dx * dx + dy * dy;
				if l < DISTANCE_MIN2 {
					l = (DISTANCE_MIN2 * l).sqrt();
				}
				let w = strength * alpha / l;
				self.nodes[i].vx += dx * w;
				self.nodes[i].vy += dy * w;
				self.nodes[j].vx -= dx * w;
				self.nodes[j].vy -= dy * w;
			}
		}
	}

	fn apply_links(&mut self, alpha: f64) {
		let distance = self.config.link_distance;
		for link in &self.links {
			let (s, t) = (&self.nodes[link.source], &self.nodes[link.target]);
			let mut x = t.node.x + t.vx - s.node.x - s.vx;
			let mut y = t.node.y + t.vy - s.node.y - s.vy;
			if x == 0.0 {
				x = Self::jiggle(&mut self.rng);
			}
			if y == 0.0 {
				y = Self::jiggle(&mut self.rng);
			}
			let len = (x * x + y * y).sqrt();
			let l = (len - distance) / len * alpha * link.strength;
			x *= l;
			y *= l;
			let t = &mut self.nodes[link.target];
			t.vx -= x * link.bias;
			t.vy -= y * link.bias;
			let s = &mut self.nodes[link.source];
			s.vx += x * (1.0 - link.bias);
			s.vy += y * (1.0 - link.bias);
		}
	}

	fn apply_center(&mut self, alpha: f64) {
		if self.nodes.is_empty() || self.config.center_strength == 0.0 {
			return;
		}
		let n = self.nodes.len() as f64;
		let (sx, sy) = self
			.nodes
			.iter()
			.fold((0.0, 0.0), |(sx, sy), n| (sx + n.node.x, sy + n.node.y));
		let shift = self.config.center_strength * alpha;
		let (cx, cy) = (sx / n * shift, sy / n * shift);
		for node in &mut self.nodes {
			node.node.x -= cx;
			node.node.y -= cy;
		}
	}

	fn apply_collision(&mut self) {
		let scale = self.config.collide_scale;
		if scale <= 0.0 {
			return;
		}
		let n = self.nodes.len();
		for i in 0..n {
			let ri = self.nodes[i].node.radius * scale;
			let xi = self.nodes[i].node.x + self.nodes[i].vx;
			let yi = self.nodes[i].node.y + self.nodes[i].vy;
			for j in (i + 1)..n {
				let rj = self.nodes[j].node.radius * scale;
				let rr = ri + rj;
				let mut x = xi - self.nodes[j].node.x - self.nodes[j].vx;
				let mut y = yi - self.nodes[j].node.y - self.nodes[j].vy;
				let l2 = x * x + y * y;
				if l2 >= rr * rr {
					continue;
				}
				if x == 0.0 {
					x = Self::jiggle(&mut self.rng);
				}
				if y == 0.0 {
					y = Self::jiggle(&mut self.rng);
				}
				let l = (x * x + y * y).sqrt();
				let push = (rr - l) / l;
				x *= push;
				y *= push;
				let share = (rj * rj) / (ri * ri + rj * rj);
				self.nodes[i].vx += x * share;
				self.nodes[i].vy += y * share;
				self.nodes[j].vx -= x * (1.0 - share);
				self.nodes[j].vy -= y * (1.0 - share);
			}
		}
	}

	fn apply_tier_bias(&mut self, alpha: f64) {
		let strength = self.config.tier_bias;
		if strength <= 0.0 || self.config.tier_count == 0 {
			return;
		}
		let top = -(self.height * 0.35);
		let spacing = if self.config.tier_count > 1 {
			self.height * 0.7 / (self.config.tier_count - 1) as f64
		} else {
			0.0
		};
		for node in &mut self.nodes {
			let target = top + node.node.tier as f64 * spacing;
			node.vy += (target - node.node.y) * strength * alpha;
			// slight horizontal pull keeps rows from drifting apart
			node.vx += -node.node.x * 0.01 * alpha;
		}
	}

	fn integrate(&mut self) {
		let keep = 1.0 - self.config.velocity_decay;
		for node in &mut self.nodes {
			match node.fx {
				Some(fx) => {
					node.node.x = fx;
					node.vx = 0.0;
				}
				None => {
					node.vx *= keep;
					node.node.x += node.vx;
				}
			}
			match node.fy {
				Some(fy) => {
					node.node.y = fy;
					node.vy = 0.0;
				}
				None => {
					node.vy *= keep;
					node.node.y += node.vy;
				}
			}
		}
	}

	/// Resets any node with a non-finite position or velocity to the centroid
	/// of the healthy nodes.
	fn sanitize(&mut self) {
		let healthy = |n: &SimNode| {
			n.node.x.is_finite() && n.node.y.is_finite() && n.vx.is_finite() && n.vy.is_finite()
		};
		if self.nodes.iter().all(healthy) {
			return;
		}
		let (mut sx, mut sy, mut count) = (0.0, 0.0, 0usize);
		for n in self.nodes.iter().filter(|n| healthy(n)) {
			sx += n.node.x;
			sy += n.node.y;
			count += 1;
		}
		let (cx, cy) = if count > 0 {
			(sx / count as f64, sy / count as f64)
		} else {
			(0.0, 0.0)
		};
		for n in self.nodes.iter_mut().filter(|n| !healthy(n)) {
			warn!("galaxy: node {:?} diverged, resetting to centroid", n.node.id);
			n.node.x = cx;
			n.node.y = cy;
			n.vx = 0.0;
			n.vy = 0.0;
		}
	}
}

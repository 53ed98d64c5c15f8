//! The two galaxy screens: the topic skill tree and the problem similarity graph.
//!
//! Each view wires a [`GalaxyCanvas`] to its transform, tooltip, controls,
//! legend and status overlay. Auto-fit on first settle happens inside the
//! animation loop, so the views only track state for the overlays.

use std::collections::{HashMap, HashSet};

use leptos::prelude::*;
use log::info;

use super::animation::{GalaxyConfig, GalaxyHandle};
use super::component::GalaxyCanvas;
use super::controls::{GalaxyLegend, LayoutStatus, ZoomControls, problem_legend, skill_legend};
use super::simulation::{SimulationConfig, drop_dangling};
use super::theme::TierPalette;
use super::tooltip::GalaxyTooltip;
use super::transform::{prereqs_met, problems_to_galaxy, topics_to_galaxy};
use super::types::{CuratedSubgraph, HoverInfo, Node, TopicStats, TopicsResponse};

const PROBLEM_BASE_URL: &str = "https://codeforces.com/problemset/problem";

/// Problem page for an id like `1520F` (contest `1520`, index `F`).
pub fn problem_url(id: &str) -> String {
	match id.find(|c: char| c.is_ascii_alphabetic()) {
		Some(split) if split > 0 => format!("{PROBLEM_BASE_URL}/{}/{}", &id[..split], &id[split..]),
		_ => format!("{PROBLEM_BASE_URL}/{id}"),
	}
}

fn open_problem(id: &str) {
	let url = problem_url(id);
	info!("galaxy: opening {url}");
	if let Some(window) = web_sys::window() {
		let _ = window.open_with_url_and_target(&url, "_blank");
	}
}

/// Skill tree: one star per topic, prerequisites as links, tiers stacked top
/// to bottom.
#[component]
pub fn SkillTreeGalaxy(
	#[prop(into)] topics: Signal<TopicsResponse>,
	#[prop(into)] stats: Signal<HashMap<String, TopicStats>>,
	#[prop(optional)] on_topic_click: Option<Callback<String>>,
	#[prop(optional)] config: Option<GalaxyConfig>,
) -> impl IntoView {
	let config = config.unwrap_or_else(|| GalaxyConfig {
		simulation: SimulationConfig::skill_tree(),
		..GalaxyConfig::default()
	});
	let palette = config.theme.palette.clone();
	let legend_palette = palette.clone();

	let data = Memo::new(move |_| {
		let (topics, stats) = (topics.get(), stats.get());
		topics_to_galaxy(&topics, &stats, |id| prereqs_met(&topics, &stats, id), &palette)
	});

	let hover = RwSignal::new(None::<HoverInfo>);
	let settled = RwSignal::new(false);
	let handle = GalaxyHandle::new();

	let on_hover = Callback::new(move |info: Option<HoverInfo>| hover.set(info));
	let on_click = Callback::new(move |node: Option<Node>| {
		if let (Some(node), Some(cb)) = (node, on_topic_click) {
			cb.run(node.id);
		}
	});
	let on_settle = Callback::new(move |done: bool| settled.set(done));

	view! {
		<div class="galaxy-view galaxy-skill-tree" style="position: relative; width: 100%; height: 100%;">
			<GalaxyCanvas
				data=data
				config=config
				handle=handle.clone()
				on_hover=on_hover
				on_click=on_click
				on_settle=on_settle
			/>
			<GalaxyTooltip hover=hover />
			<ZoomControls handle=handle />
			{move || view! { <GalaxyLegend items=skill_legend(&topics.get(), &legend_palette) /> }}
			<LayoutStatus settled=settled />
		</div>
	}
}

/// Problem similarity graph. Clicking a problem opens it on Codeforces unless
/// `on_problem_click` is given.
#[component]
pub fn ProblemGalaxy(
	#[prop(into)] topics: Signal<TopicsResponse>,
	#[prop(into)] subgraph: Signal<CuratedSubgraph>,
	#[prop(into)] solved: Signal<HashSet<String>>,
	#[prop(optional)] on_problem_click: Option<Callback<String>>,
	#[prop(optional)] config: Option<GalaxyConfig>,
) -> impl IntoView {
	let config = config.unwrap_or_else(|| GalaxyConfig {
		simulation: SimulationConfig::problem_graph(),
		..GalaxyConfig::default()
	});
	let palette: TierPalette = config.theme.palette.clone();
	let legend_palette = palette.clone();

	let data = Memo::new(move |_| {
		problems_to_galaxy(&subgraph.get(), &topics.get(), &solved.get(), &palette)
	});
	let counts = Signal::derive(move || {
		data.with(|d| (d.nodes.len(), drop_dangling(&d.nodes, &d.edges).len()))
	});

	let hover = RwSignal::new(None::<HoverInfo>);
	let settled = RwSignal::new(false);
	let handle = GalaxyHandle::new();

	let on_hover = Callback::new(move |info: Option<HoverInfo>| hover.set(info));
	let on_click = Callback::new(move |node: Option<Node>| {
		let Some(node) = node else {
			return;
		};
		match on_problem_click {
			Some(cb) => cb.run(node.id),
			None => open_problem(&node.id),
		}
	});
	let on_settle = Callback::new(move |done: bool| settled.set(done));

	view! {
		<div class="galaxy-view galaxy-problems" style="position: relative; width: 100%; height: 100%;">
			<GalaxyCanvas
				data=data
				config=config
				handle=handle.clone()
				on_hover=on_hover
				on_click=on_click
				on_settle=on_settle
			/>
			<GalaxyTooltip hover=hover />
			<ZoomControls handle=handle />
			{move || view! { <GalaxyLegend items=problem_legend(&topics.get(), &legend_palette) /> }}
			<LayoutStatus settled=settled counts=counts />
			<Show when=move || data.with(|d| d.is_empty())>
				<div class="galaxy-empty">"No curated problems in graph."</div>
			</Show>
		</div>
	}
}

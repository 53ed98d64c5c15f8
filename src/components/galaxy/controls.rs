//! Overlay widgets: zoom buttons, tier legend and layout status.

use std::collections::BTreeSet;

use leptos::prelude::*;

use super::animation::GalaxyHandle;
use super::theme::TierPalette;
use super::types::TopicsResponse;

/// One row of the tier legend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LegendItem {
	pub label: String,
	pub color: String,
}

fn legend_item(topics: &TopicsResponse, palette: &TierPalette, tier: u32) -> LegendItem {
	LegendItem {
		label: topics
			.tier_label(tier)
			.map(str::to_string)
			.unwrap_or_else(|| format!("Tier {tier}")),
		color: topics
			.tier_color(tier)
			.map(str::to_string)
			.unwrap_or_else(|| palette.get(tier).to_css_rgb()),
	}
}

/// Legend for the skill tree: every labelled tier, in order.
pub fn skill_legend(topics: &TopicsResponse, palette: &TierPalette) -> Vec<LegendItem> {
	(0..topics.tier_labels.len() as u32)
		.map(|tier| legend_item(topics, palette, tier))
		.collect()
}

/// Legend for the problem graph: only tiers some topic actually uses.
pub fn problem_legend(topics: &TopicsResponse, palette: &TierPalette) -> Vec<LegendItem> {
	let tiers: BTreeSet<u32> = topics.topics.values().map(|t| t.tier).collect();
	tiers
		.into_iter()
		.map(|tier| legend_item(topics, palette, tier))
		.collect()
}

/// `+`, `-` and `Fit` buttons feeding a [`GalaxyHandle`].
#[component]
pub fn ZoomControls(handle: GalaxyHandle) -> impl IntoView {
	let (zin, zout, fit) = (handle.clone(), handle.clone(), handle);
	view! {
		<div class="galaxy-controls">
			<button title="Zoom in" on:click=move |_| zin.zoom_in()>"+"</button>
			<button title="Zoom out" on:click=move |_| zout.zoom_out()>"-"</button>
			<button title="Fit to view" on:click=move |_| fit.fit_all()>"Fit"</button>
		</div>
	}
}

/// Colored swatch per tier.
#[component]
pub fn GalaxyLegend(items: Vec<LegendItem>) -> impl IntoView {
	view! {
		<div class="galaxy-legend">
			{items
				.into_iter()
				.map(|item| {
					view! {
						<div class="galaxy-legend-item">
							<span
								class="galaxy-legend-swatch"
								style=format!("background: {};", item.color)
							/>
							<span>{item.label}</span>
						</div>
					}
				})
				.collect_view()}
		</div>
	}
}

/// "Simulating layout..." while the layout moves, plus optional node/edge counts.
#[component]
pub fn LayoutStatus(
	#[prop(into)] settled: Signal<bool>,
	#[prop(optional, into)] counts: Option<Signal<(usize, usize)>>,
) -> impl IntoView {
	view! {
		<div class="galaxy-status">
			<Show when=move || !settled.get()>
				<span class="galaxy-status-busy">"Simulating layout..."</span>
			</Show>
			{counts
				.map(|counts| {
					view! {
						<span class="galaxy-status-counts">
							{move || {
								let (nodes, edges) = counts.get();
								format!("{nodes} nodes · {edges} edges")
							}}
						</span>
					}
				})}
		</div>
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::galaxy::types::Topic;

	fn topics() -> TopicsResponse {
		let topic = |tier| Topic {
			name: String::new(),
			icon: String::new(),
			prereqs: Vec::new(),
			tier,
		};
		TopicsResponse {
			topics: [("a".to_string(), topic(2)), ("b".to_string(), topic(0)), ("c".to_string(), topic(2))]
				.into_iter()
				.collect(),
			tier_labels: vec!["Bronze".into(), "Silver".into(), "Gold".into()],
			tier_colors: vec!["#cd7f32".into()],
		}
	}

	#[test]
	fn skill_legend_lists_every_labelled_tier() {
		let palette = TierPalette::nebula();
		let items = skill_legend(&topics(), &palette);
		assert_eq!(items.len(), 3);
		assert_eq!(
			items[0],
			LegendItem {
				label: "Bronze".into(),
				color: "#cd7f32".into()
			}
		);
		assert_eq!(items[2].color, palette.get(2).to_css_rgb());
	}

	#[test]
	fn problem_legend_lists_used_tiers_in_order() {
		let items = problem_legend(&topics(), &TierPalette::nebula());
		let labels: Vec<&str> = items.iter().map(|i| i.label.as_str()).collect();
		assert_eq!(labels, vec!["Bronze", "Gold"]);
	}

	#[test]
	fn unlabelled_tiers_get_a_generic_name() {
		let mut t = topics();
		t.tier_labels.clear();
		let items = problem_legend(&t, &TierPalette::nebula());
		assert_eq!(items[1].label, "Tier 2");
		assert!(skill_legend(&t, &TierPalette::nebula()).is_empty());
	}
}

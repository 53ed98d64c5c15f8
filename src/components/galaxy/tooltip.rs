//! Hover tooltip for galaxy nodes.

use leptos::prelude::*;

use super::types::{HoverInfo, Node, NodeDetail};

/// Pixel offset of the tooltip from the pointer.
const OFFSET: f64 = 14.0;

/// What the tooltip shows for a node.
#[derive(Clone, Debug, PartialEq)]
pub struct TooltipContent {
	/// Icon and label.
	pub title: String,
	/// Secondary lines, top to bottom.
	pub lines: Vec<String>,
	/// Completion bar in percent, for skill nodes.
	pub progress: Option<u32>,
	/// Whether to show the solved badge.
	pub solved: bool,
}

impl TooltipContent {
	pub fn for_node(node: &Node) -> Self {
		let title = if node.icon.is_empty() {
			node.label.clone()
		} else {
			format!("{} {}", node.icon, node.label)
		};
		match &node.metadata {
			NodeDetail::Skill {
				stats,
				tier_label,
				prereqs,
			} => {
				let mut lines: Vec<String> = tier_label.iter().cloned().collect();
				lines.push(format!("{}/{} solved", stats.solved, stats.total));
				if !prereqs.is_empty() {
					lines.push(format!("Requires: {}", prereqs.join(", ")));
				}
				Self {
					title,
					lines,
					progress: Some(stats.percent()),
					solved: false,
				}
			}
			NodeDetail::Problem { rating, topic, solved } => {
				let mut lines = vec![node.id.clone(), format!("Rating {rating}")];
				if !topic.is_empty() {
					lines.push(topic.clone());
				}
				Self {
					title,
					lines,
					progress: None,
					solved: *solved,
				}
			}
			NodeDetail::Plain => Self {
				title,
				lines: Vec::new(),
				progress: None,
				solved: false,
			},
		}
	}
}

/// Floating card next to the hovered node. Renders nothing while `hover` is `None`.
#[component]
pub fn GalaxyTooltip(#[prop(into)] hover: Signal<Option<HoverInfo>>) -> impl IntoView {
	move || {
		hover.get().map(|info| {
			let content = TooltipContent::for_node(&info.node);
			let style = format!(
				"position: absolute; left: {}px; top: {}px; pointer-events: none;",
				info.screen_x + OFFSET,
				info.screen_y + OFFSET
			);
			view! {
				<div class="galaxy-tooltip" style=style>
					<div class="galaxy-tooltip-title">{content.title}</div>
					{content
						.lines
						.into_iter()
						.map(|line| view! { <div class="galaxy-tooltip-line">{line}</div> })
						.collect_view()}
					{content
						.progress
						.map(|pct| {
							view! {
								<div class="galaxy-tooltip-progress">
									<div class="galaxy-tooltip-bar" style=format!("width: {pct}%;") />
									<span>{format!("{pct}%")}</span>
								</div>
							}
						})}
					{content.solved.then(|| view! { <div class="galaxy-tooltip-solved">"Solved"</div> })}
				</div>
			}
		})
	}
}

//! Leptos component wrapping the galaxy canvas.
//!
//! The component claims its canvas on mount but only acquires the 2D context on
//! the first animation frame, after any earlier mount's teardown has had a
//! chance to run. Every frame is driven through [`AnimationLoop::frame`], which
//! ticks the simulation at most once and then draws.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::prelude::*;
use log::{info, warn};
use wasm_bindgen::prelude::*;
use web_sys::{HtmlCanvasElement, MouseEvent, TouchEvent, TouchList, WheelEvent, Window};

use super::animation::{AnimationLoop, CancelToken, GalaxyConfig, GalaxyHandle};
use super::canvas::{CanvasSurface, SurfaceClaim};
use super::input::GraphEvent;
use super::types::{GraphData, HoverInfo, Node};

/// Loop state plus the surface once it has been acquired.
struct GalaxyContext {
	anim: AnimationLoop,
	surface: Option<CanvasSurface>,
	settled: Option<bool>,
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

/// What teardown has to undo.
#[derive(Default)]
struct Mount {
	token: CancelToken,
	claim: Option<Rc<SurfaceClaim>>,
	resize: Option<Closure<dyn FnMut()>>,
	context: Rc<RefCell<Option<GalaxyContext>>>,
	animate: FrameCallback,
}

impl Mount {
	fn new(context: Rc<RefCell<Option<GalaxyContext>>>, animate: FrameCallback) -> Self {
		Self {
			context,
			animate,
			..Self::default()
		}
	}

	/// Stop the loop and drop everything it owns. The frame closure holds its
	/// own handle, so it has to be taken out explicitly to break the cycle.
	fn teardown(&mut self) {
		self.token.cancel();
		if let Some(claim) = self.claim.take() {
			claim.release();
		}
		if let Some(cb) = self.resize.take() {
			if let Some(window) = web_sys::window() {
				let _ =
					window.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}
		if let Ok(mut animate) = self.animate.try_borrow_mut() {
			animate.take();
		}
		if let Ok(mut context) = self.context.try_borrow_mut() {
			context.take();
		}
	}
}

/// Host callbacks.
#[derive(Clone, Copy)]
struct Listeners {
	on_hover: Option<Callback<Option<HoverInfo>>>,
	on_click: Option<Callback<Option<Node>>>,
}

impl Listeners {
	fn emit(&self, event: Option<GraphEvent>) {
		match event {
			Some(GraphEvent::Hover(info)) => {
				if let Some(cb) = self.on_hover {
					cb.run(info);
				}
			}
			Some(GraphEvent::Click(node)) => {
				if let Some(cb) = self.on_click {
					cb.run(node);
				}
			}
			None => {}
		}
	}
}

fn window_size(window: &Window) -> (f64, f64) {
	let dim = |v: Result<JsValue, JsValue>, fallback| v.ok().and_then(|v| v.as_f64()).unwrap_or(fallback);
	(dim(window.inner_width(), 800.0), dim(window.inner_height(), 600.0))
}

fn parent_size(canvas: &HtmlCanvasElement) -> (f64, f64) {
	canvas
		.parent_element()
		.map(|p| (p.client_width() as f64, p.client_height() as f64))
		.filter(|&(w, h)| w > 0.0 && h > 0.0)
		.unwrap_or((800.0, 600.0))
}

fn local_point(canvas: &HtmlCanvasElement, client_x: i32, client_y: i32) -> (f64, f64) {
	let rect = canvas.get_bounding_client_rect();
	(client_x as f64 - rect.left(), client_y as f64 - rect.top())
}

fn touch_points(canvas: &HtmlCanvasElement, list: &TouchList) -> Vec<(f64, f64)> {
	(0..list.length())
		.filter_map(|i| list.get(i))
		.map(|t| local_point(canvas, t.client_x(), t.client_y()))
		.collect()
}

/// Renders an interactive galaxy graph on a canvas element.
///
/// The simulation is rebuilt whenever `data` changes; the camera is kept. Pass a
/// [`GalaxyHandle`] to drive zoom, fit and reheat from outside. `on_settle`
/// fires with `false` while the layout is moving and `true` once it rests.
#[component]
pub fn GalaxyCanvas(
	#[prop(into)] data: Signal<GraphData>,
	#[prop(optional)] config: Option<GalaxyConfig>,
	#[prop(optional)] handle: Option<GalaxyHandle>,
	#[prop(optional)] on_hover: Option<Callback<Option<HoverInfo>>>,
	#[prop(optional)] on_click: Option<Callback<Option<Node>>>,
	#[prop(optional)] on_settle: Option<Callback<bool>>,
	#[prop(default = false)] fullscreen: bool,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let config = config.unwrap_or_default();
	let handle = handle.unwrap_or_default();
	let listeners = Listeners { on_hover, on_click };

	let context: Rc<RefCell<Option<GalaxyContext>>> = Rc::new(RefCell::new(None));
	let animate: FrameCallback = Rc::new(RefCell::new(None));
	let mount = Rc::new(RefCell::new(Mount::new(context.clone(), animate.clone())));

	let mount_cleanup = StoredValue::new_local(mount.clone());
	on_cleanup(move || {
		let _ = mount_cleanup.try_with_value(|m| m.borrow_mut().teardown());
	});

	let (context_init, mount_init) = (context.clone(), mount.clone());
	Effect::new(move |_| {
		let graph = data.get();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		if let Some(ref mut c) = *context_init.borrow_mut() {
			c.anim.replace_graph(&graph);
			c.settled = None;
			info!("galaxy: graph replaced with {} nodes", graph.nodes.len());
			return;
		}
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			warn!("galaxy: no window, nothing to draw on");
			return;
		};

		let (w, h) = if fullscreen {
			window_size(&window)
		} else {
			parent_size(&canvas)
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let claim = Rc::new(SurfaceClaim::claim(canvas.clone()));
		let token = {
			let mut m = mount_init.borrow_mut();
			m.claim = Some(claim.clone());
			m.token.clone()
		};

		*context_init.borrow_mut() = Some(GalaxyContext {
			anim: AnimationLoop::new(&graph, config.clone(), w, h, handle.clone(), token.clone()),
			surface: None,
			settled: None,
		});

		let (context_resize, canvas_resize) = (context_init.clone(), canvas.clone());
		let resize_cb: Closure<dyn FnMut()> = Closure::new(move || {
			let (nw, nh) = match web_sys::window() {
				Some(win) if fullscreen => window_size(&win),
				_ => parent_size(&canvas_resize),
			};
			canvas_resize.set_width(nw as u32);
			canvas_resize.set_height(nh as u32);
			if let Some(ref mut c) = *context_resize.borrow_mut() {
				c.anim.resize(nw, nh);
			}
		});
		let _ = window.add_event_listener_with_callback("resize", resize_cb.as_ref().unchecked_ref());
		mount_init.borrow_mut().resize = Some(resize_cb);

		let (context_anim, animate_inner) = (context_init.clone(), animate.clone());
		let failed = Rc::new(Cell::new(false));
		*animate.borrow_mut() = Some(Closure::new(move || {
			if token.is_cancelled() || failed.get() {
				return;
			}
			let mut settle_change = None;
			if let Some(ref mut c) = *context_anim.borrow_mut() {
				if c.surface.is_none() {
					c.surface = CanvasSurface::try_acquire(&claim);
				}
				let Some(ref mut surface) = c.surface else {
					failed.set(true);
					return;
				};
				if !c.anim.frame(surface) {
					return;
				}
				let settled = c.anim.is_settled();
				if c.settled != Some(settled) {
					c.settled = Some(settled);
					settle_change = Some(settled);
				}
			}
			if let (Some(settled), Some(cb)) = (settle_change, on_settle) {
				cb.run(settled);
			}
			if let Some(ref cb) = *animate_inner.borrow() {
				if let Some(win) = web_sys::window() {
					let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
				}
			}
		}));
		if let Some(ref cb) = *animate.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let context_md = context.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let (x, y) = local_point(&canvas, ev.client_x(), ev.client_y());
		if let Some(ref mut c) = *context_md.borrow_mut() {
			c.anim.pointer_down(x, y);
		}
	};

	let context_mm = context.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let (x, y) = local_point(&canvas, ev.client_x(), ev.client_y());
		let event = match *context_mm.borrow_mut() {
			Some(ref mut c) => c.anim.pointer_move(x, y),
			None => None,
		};
		listeners.emit(event);
	};

	let context_mu = context.clone();
	let on_mouseup = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let (x, y) = local_point(&canvas, ev.client_x(), ev.client_y());
		let event = match *context_mu.borrow_mut() {
			Some(ref mut c) => c.anim.pointer_up(x, y),
			None => None,
		};
		listeners.emit(event);
	};

	let context_ml = context.clone();
	let on_mouseleave = move |_: MouseEvent| {
		let event = match *context_ml.borrow_mut() {
			Some(ref mut c) => c.anim.pointer_leave(),
			None => None,
		};
		listeners.emit(event);
	};

	let context_wh = context.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let (x, y) = local_point(&canvas, ev.client_x(), ev.client_y());
		if let Some(ref mut c) = *context_wh.borrow_mut() {
			c.anim.wheel(x, y, ev.delta_y());
		}
	};

	let context_ts = context.clone();
	let on_touchstart = move |ev: TouchEvent| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let touches = touch_points(&canvas, &ev.touches());
		if let Some(ref mut c) = *context_ts.borrow_mut() {
			c.anim.touch_start(&touches);
		}
	};

	let context_tm = context.clone();
	let on_touchmove = move |ev: TouchEvent| {
		ev.prevent_default();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let touches = touch_points(&canvas, &ev.touches());
		if let Some(ref mut c) = *context_tm.borrow_mut() {
			c.anim.touch_move(&touches);
		}
	};

	let context_te = context.clone();
	let on_touchend = move |ev: TouchEvent| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let changed = touch_points(&canvas, &ev.changed_touches());
		let event = match *context_te.borrow_mut() {
			Some(ref mut c) => c.anim.touch_end(&changed),
			None => None,
		};
		listeners.emit(event);
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="galaxy-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			on:touchstart=on_touchstart
			on:touchmove=on_touchmove
			on:touchend=on_touchend
			style="display: block; cursor: grab; touch-action: none;"
		/>
	}
}

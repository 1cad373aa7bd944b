//! Leptos component wrapping the force-directed graph canvas.
//!
//! The component creates an HTML canvas element with a 2x backing store and
//! wires up mouse/wheel handlers for selection, hover, panning and zooming.
//! Frames are driven by a [`FrameLoop`] that runs while the layout budget
//! lasts or a halo is fading, and otherwise sleeps until input arrives.

use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::{debug, warn};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::frame::FrameLoop;
use super::render;
use super::scale::ScaleConfig;
use super::simulation::SimulationConfig;
use super::state::{ForceGraphState, NodeChange};
use super::theme::Theme;
use super::types::GraphData;

/// Bundles view state with the drawing surface and theme.
struct GraphContext {
	state: ForceGraphState,
	theme: Theme,
	canvas: HtmlCanvasElement,
	ctx: CanvasRenderingContext2d,
}

/// Things to undo when the component unmounts.
struct Teardown {
	frames: FrameLoop,
	resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>>,
}

impl Teardown {
	fn run(&self) {
		self.frames.cancel();
		if let (Some(window), Some(cb)) = (web_sys::window(), self.resize_cb.borrow_mut().take()) {
			let _ = window.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}
	}
}

/// CSS-pixel size the canvas should occupy, or `None` while layout is not ready.
fn measure(
	canvas: &HtmlCanvasElement,
	fullscreen: bool,
	width: Option<f64>,
	height: Option<f64>,
) -> Option<(f64, f64)> {
	let (w, h) = if fullscreen {
		let window: Window = web_sys::window()?;
		(
			window.inner_width().ok()?.as_f64()?,
			window.inner_height().ok()?.as_f64()?,
		)
	} else {
		let parent = canvas.parent_element();
		(
			width.unwrap_or_else(|| parent.as_ref().map(|p| p.client_width() as f64).unwrap_or(800.0)),
			height.unwrap_or_else(|| parent.as_ref().map(|p| p.client_height() as f64).unwrap_or(600.0)),
		)
	};
	(w > 0.0 && h > 0.0).then_some((w, h))
}

/// Size the backing store at `pixel_ratio` times the CSS size and establish
/// the matching base scale. Resizing a canvas resets its transform, so this
/// runs on every resize.
fn configure_surface(
	canvas: &HtmlCanvasElement,
	ctx: &CanvasRenderingContext2d,
	w: f64,
	h: f64,
	pixel_ratio: f64,
) {
	canvas.set_width((w * pixel_ratio) as u32);
	canvas.set_height((h * pixel_ratio) as u32);
	let style = web_sys::HtmlElement::style(canvas);
	let _ = style.set_property("width", &format!("{}px", w));
	let _ = style.set_property("height", &format!("{}px", h));
	let _ = ctx.set_transform(pixel_ratio, 0.0, 0.0, pixel_ratio, 0.0, 0.0);
}

/// Pointer position relative to the canvas, in CSS pixels.
fn pointer_position(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

fn notify(callback: Option<Callback<Option<String>>>, change: Option<NodeChange>) {
	if let (Some(cb), Some(NodeChange(id))) = (callback, change) {
		cb.run(id);
	}
}

/// Renders an interactive force-directed graph on a canvas element.
///
/// Pass graph data via the reactive `data` signal. A new value re-seeds the
/// layout when its node ids differ and otherwise keeps the current positions.
/// `selected`/`hovered` let the host drive the highlight from elsewhere,
/// while `on_select`/`on_hover` report changes made on the canvas.
/// The component sizes itself to its parent container by default; set
/// `fullscreen = true` to fill the viewport. Explicit `width`/`height`
/// override automatic sizing.
#[component]
pub fn ForceGraphCanvas(
	#[prop(into)] data: Signal<GraphData>,
	#[prop(into, optional)] selected: MaybeProp<String>,
	#[prop(into, optional)] hovered: MaybeProp<String>,
	#[prop(optional)] on_select: Option<Callback<Option<String>>>,
	#[prop(optional)] on_hover: Option<Callback<Option<String>>>,
	#[prop(default = SimulationConfig::default())] config: SimulationConfig,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let context: Rc<RefCell<Option<GraphContext>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));

	let context_frame = context.clone();
	let frames = FrameLoop::new(move || {
		let mut guard = context_frame.borrow_mut();
		let Some(c) = guard.as_mut() else {
			return false;
		};
		c.state.tick(0.016);
		if c.state.take_dirty() {
			render::render(&c.state, &c.ctx, &c.theme);
		}
		c.state.is_animating()
	});

	let teardown = StoredValue::new_local(Teardown {
		frames: frames.clone(),
		resize_cb: resize_cb.clone(),
	});
	on_cleanup(move || {
		let _ = teardown.try_with_value(Teardown::run);
	});

	let (context_init, frames_init) = (context.clone(), frames.clone());
	Effect::new(move |_| {
		let data = data.get();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};

		let updated = context_init.borrow_mut().as_mut().map(|c| {
			// Stop the old layout before a possible re-seed.
			frames_init.cancel();
			let change = c.state.set_data(&data, &c.theme, config.clone());
			frames_init.request();
			change
		});
		if let Some(change) = updated {
			notify(on_select, change);
			return;
		}

		let canvas: HtmlCanvasElement = canvas.into();
		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|obj| obj.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			warn!("research-graph: 2d canvas context unavailable");
			return;
		};

		let scale = ScaleConfig::default();
		let (w, h) = measure(&canvas, fullscreen, width, height).unwrap_or((800.0, 600.0));
		configure_surface(&canvas, &ctx, w, h, scale.pixel_ratio);

		let theme = Theme::default();
		let mut state = ForceGraphState::new(&data, w, h, &theme, scale, config.clone());
		state.set_selected_id(selected.get_untracked().as_deref());
		state.set_hovered_id(hovered.get_untracked().as_deref());
		debug!("research-graph: canvas mounted at {}x{}", w, h);

		*context_init.borrow_mut() = Some(GraphContext {
			state,
			theme,
			canvas,
			ctx,
		});

		let (context_resize, frames_resize) = (context_init.clone(), frames_init.clone());
		*resize_cb.borrow_mut() = Some(Closure::new(move || {
			if let Some(c) = context_resize.borrow_mut().as_mut() {
				let Some((nw, nh)) = measure(&c.canvas, fullscreen, width, height) else {
					return;
				};
				configure_surface(&c.canvas, &c.ctx, nw, nh, c.state.scale.pixel_ratio);
				c.state.resize(nw, nh);
			}
			frames_resize.request();
		}));
		if let (Some(window), Some(cb)) = (web_sys::window(), resize_cb.borrow().as_ref()) {
			let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}

		frames_init.request();
	});

	let (context_sel, frames_sel) = (context.clone(), frames.clone());
	Effect::new(move |_| {
		let id = selected.get();
		if let Some(c) = context_sel.borrow_mut().as_mut() {
			if c.state.set_selected_id(id.as_deref()) {
				frames_sel.request();
			}
		}
	});

	let (context_hov, frames_hov) = (context.clone(), frames.clone());
	Effect::new(move |_| {
		let id = hovered.get();
		if let Some(c) = context_hov.borrow_mut().as_mut() {
			if c.state.set_hovered_id(id.as_deref()) {
				frames_hov.request();
			}
		}
	});

	let context_md = context.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = pointer_position(canvas_ref, &ev) else {
			return;
		};
		if let Some(c) = context_md.borrow_mut().as_mut() {
			c.state.pointer_down(x, y);
		}
	};

	let (context_mm, frames_mm) = (context.clone(), frames.clone());
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = pointer_position(canvas_ref, &ev) else {
			return;
		};
		let change = context_mm
			.borrow_mut()
			.as_mut()
			.and_then(|c| c.state.pointer_move(x, y));
		frames_mm.request();
		notify(on_hover, change);
	};

	let (context_mu, frames_mu) = (context.clone(), frames.clone());
	let on_mouseup = move |ev: MouseEvent| {
		let Some((x, y)) = pointer_position(canvas_ref, &ev) else {
			return;
		};
		let change = context_mu
			.borrow_mut()
			.as_mut()
			.and_then(|c| c.state.pointer_up(x, y));
		frames_mu.request();
		notify(on_select, change);
	};

	let (context_ml, frames_ml) = (context.clone(), frames.clone());
	let on_mouseleave = move |_: MouseEvent| {
		let change = context_ml
			.borrow_mut()
			.as_mut()
			.and_then(|c| c.state.pointer_leave());
		frames_ml.request();
		notify(on_hover, change);
	};

	let (context_wh, frames_wh) = (context.clone(), frames.clone());
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = pointer_position(canvas_ref, &ev) else {
			return;
		};
		if let Some(c) = context_wh.borrow_mut().as_mut() {
			c.state.wheel(x, y, ev.delta_y());
		}
		frames_wh.request();
	};

	let view_action = move |action: fn(&mut ForceGraphState)| {
		let (context, frames) = (context.clone(), frames.clone());
		move |_: MouseEvent| {
			if let Some(c) = context.borrow_mut().as_mut() {
				action(&mut c.state);
			}
			frames.request();
		}
	};
	let on_zoom_in = view_action(ForceGraphState::zoom_in);
	let on_zoom_out = view_action(ForceGraphState::zoom_out);
	let on_reset = view_action(ForceGraphState::reset_view);

	view! {
		<div class="force-graph" style="position: relative; width: 100%; height: 100%;">
			<canvas
				node_ref=canvas_ref
				class="force-graph-canvas"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				on:wheel=on_wheel
				style="display: block; cursor: grab;"
			/>
			<div class="graph-controls">
				<button title="Zoom in" on:click=on_zoom_in>"+"</button>
				<button title="Zoom out" on:click=on_zoom_out>"−"</button>
				<button title="Reset view" on:click=on_reset>"Reset"</button>
			</div>
		</div>
	}
}

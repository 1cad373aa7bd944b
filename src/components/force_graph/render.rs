//! Canvas rendering for the force graph.
//!
//! Drawing happens in CSS pixels on top of the backing-store scale set up at
//! each resize. Passes, back to front:
//! 1. Background (screen space)
//! 2. Edges (world space)
//! 3. Halos, then node discs with selection/hover outline, then labels

use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::scale::{ScaledValues, edge_alpha};
use super::state::ForceGraphState;
use super::theme::Theme;

/// Halo intensity below which nothing is drawn.
const HALO_CULL: f64 = 0.01;

/// Renders the complete graph to the canvas.
pub fn render(state: &ForceGraphState, ctx: &CanvasRenderingContext2d, theme: &Theme) {
	if state.width <= 0.0 || state.height <= 0.0 {
		return;
	}

	ctx.set_fill_style_str(&theme.background.to_css());
	ctx.fill_rect(0.0, 0.0, state.width, state.height);

	if state.layout().is_empty() {
		return;
	}

	let scale = ScaledValues::new(&state.scale, state.transform.k);

	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);

	draw_edges(state, ctx, &scale, theme);
	draw_nodes(state, ctx, &scale, theme);

	ctx.restore();
}

fn draw_edges(
	state: &ForceGraphState,
	ctx: &CanvasRenderingContext2d,
	scale: &ScaledValues,
	theme: &Theme,
) {
	let layout = state.layout();
	for link in state.simulation.links() {
		let (Some((x1, y1)), Some((x2, y2))) =
			(layout.position(link.source), layout.position(link.target))
		else {
			continue;
		};
		let alpha = edge_alpha(&state.scale.edge, link.weight);
		ctx.set_stroke_style_str(&theme.edge.with_alpha(alpha).to_css());
		ctx.set_line_width(scale.edge_width(link.weight));
		ctx.begin_path();
		ctx.move_to(x1, y1);
		ctx.line_to(x2, y2);
		ctx.stroke();
	}
}

fn draw_nodes(
	state: &ForceGraphState,
	ctx: &CanvasRenderingContext2d,
	scale: &ScaledValues,
	theme: &Theme,
) {
	let layout = state.layout();
	let nodes = layout.bodies.iter().zip(&state.nodes).enumerate();

	// Pass 1: halos under everything else
	for (idx, (body, info)) in nodes.clone() {
		let t = state.highlight.node_intensity(idx);
		if t < HALO_CULL {
			continue;
		}
		let glow_radius = info.radius * state.scale.glow.halo_radius;
		let Ok(gradient) =
			ctx.create_radial_gradient(body.x, body.y, info.radius * 0.5, body.x, body.y, glow_radius)
		else {
			continue;
		};
		let _ = gradient.add_color_stop(0.0, &info.color.with_alpha(0.55 * t).to_css());
		let _ = gradient.add_color_stop(0.5, &info.color.lighten(0.3).with_alpha(0.2 * t).to_css());
		let _ = gradient.add_color_stop(1.0, &info.color.with_alpha(0.0).to_css());
		ctx.begin_path();
		let _ = ctx.arc(body.x, body.y, glow_radius, 0.0, 2.0 * PI);
		#[allow(deprecated)]
		ctx.set_fill_style(&gradient);
		ctx.fill();
	}

	// Pass 2: discs
	for (idx, (body, info)) in nodes.clone() {
		ctx.begin_path();
		let _ = ctx.arc(body.x, body.y, info.radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(&info.color.to_css());
		ctx.fill();

		if state.selected == Some(idx) {
			ctx.begin_path();
			let _ = ctx.arc(body.x, body.y, info.radius + scale.ring_offset, 0.0, 2.0 * PI);
			ctx.set_stroke_style_str(&theme.selection_ring.to_css());
			ctx.set_line_width(scale.ring_width);
			ctx.stroke();
		} else if state.hovered == Some(idx) {
			ctx.begin_path();
			let _ = ctx.arc(body.x, body.y, info.radius + scale.ring_offset, 0.0, 2.0 * PI);
			let _ = ctx.set_line_dash(&js_sys::Array::of2(
				&(2.0 * scale.ring_width).into(),
				&(2.0 * scale.ring_width).into(),
			));
			ctx.set_stroke_style_str(&info.color.lighten(0.3).to_css());
			ctx.set_line_width(scale.ring_width * 0.5);
			ctx.stroke();
			let _ = ctx.set_line_dash(&js_sys::Array::new());
		}
	}

	// Pass 3: labels, dimmed when something else holds the focus
	let has_focus = state.selected.is_some() || state.hovered.is_some();
	ctx.set_font(&scale.label_font);
	ctx.set_text_align("center");
	ctx.set_text_baseline("top");
	for (idx, (body, info)) in nodes {
		let Some(label) = &info.label else {
			continue;
		};
		let focused = state.selected == Some(idx) || state.hovered == Some(idx);
		let color = if !has_focus || focused {
			theme.label
		} else {
			theme.label_dim
		};
		ctx.set_fill_style_str(&color.to_css());
		let _ = ctx.fill_text(
			label,
			body.x,
			body.y + info.radius + state.scale.node.label_offset,
		);
	}
}

//! `requestAnimationFrame` driver.
//!
//! At most one frame is pending at a time. The frame callback returns whether
//! it wants another frame; when it says no the loop goes idle until something
//! calls [`FrameLoop::request`] again (input, data change, resize).

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use log::warn;
use wasm_bindgen::prelude::*;

struct FrameInner {
	pending: Cell<Option<i32>>,
	callback: RefCell<Option<Closure<dyn FnMut()>>>,
}

impl FrameInner {
	fn request(&self) {
		if self.pending.get().is_some() {
			return;
		}
		let Some(window) = web_sys::window() else {
			warn!("research-graph: no window, cannot schedule frame");
			return;
		};
		let callback = self.callback.borrow();
		let Some(cb) = callback.as_ref() else {
			return;
		};
		match window.request_animation_frame(cb.as_ref().unchecked_ref()) {
			Ok(handle) => self.pending.set(Some(handle)),
			Err(err) => warn!("research-graph: requestAnimationFrame failed: {:?}", err),
		}
	}

	fn cancel(&self) {
		let Some(handle) = self.pending.take() else {
			return;
		};
		if let Some(window) = web_sys::window() {
			let _ = window.cancel_animation_frame(handle);
		}
	}
}

impl Drop for FrameInner {
	fn drop(&mut self) {
		self.cancel();
	}
}

/// Cloneable handle to a single animation loop.
#[derive(Clone)]
pub struct FrameLoop {
	inner: Rc<FrameInner>,
}

impl FrameLoop {
	/// Create an idle loop. `on_frame` runs once per scheduled frame and
	/// returns whether another frame should follow.
	pub fn new(mut on_frame: impl FnMut() -> bool + 'static) -> Self {
		let inner = Rc::new(FrameInner {
			pending: Cell::new(None),
			callback: RefCell::new(None),
		});
		let weak: Weak<FrameInner> = Rc::downgrade(&inner);
		*inner.callback.borrow_mut() = Some(Closure::new(move || {
			let Some(inner) = weak.upgrade() else {
				return;
			};
			inner.pending.set(None);
			if on_frame() {
				inner.request();
			}
		}));
		Self { inner }
	}

	/// Schedule a frame unless one is already pending.
	pub fn request(&self) {
		self.inner.request();
	}

	/// Drop the pending frame, if any.
	pub fn cancel(&self) {
		self.inner.cancel();
	}
}

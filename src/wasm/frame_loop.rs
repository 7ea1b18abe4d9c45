use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::window;

type FrameClosure = Closure<dyn FnMut()>;

/// `requestAnimationFrame` loop that can be stopped and restarted.
///
/// The callback reschedules itself before running the frame body, so the
/// pending request id is always the one `stop` has to cancel.
pub struct FrameLoop {
    callback: Rc<RefCell<Option<FrameClosure>>>,
    pending: Rc<Cell<Option<i32>>>,
}

fn request(callback: &FrameClosure) -> Result<i32, JsValue> {
    window()
        .ok_or("no window")?
        .request_animation_frame(callback.as_ref().unchecked_ref())
}

impl FrameLoop {
    pub fn new<F>(mut on_frame: F) -> Self
    where
        F: FnMut() + 'static,
    {
        // `callback` holds the animation-frame closure so that it can keep
        // calling `request_animation_frame` with itself. A weak handle
        // inside the closure avoids an Rc cycle.
        let callback: Rc<RefCell<Option<FrameClosure>>> = Rc::new(RefCell::new(None));
        let pending: Rc<Cell<Option<i32>>> = Rc::new(Cell::new(None));

        let weak = Rc::downgrade(&callback);
        let next = pending.clone();
        *callback.borrow_mut() = Some(Closure::wrap(Box::new(move || {
            next.set(None);
            let Some(cell) = weak.upgrade() else {
                return;
            };
            if let Some(closure) = cell.borrow().as_ref() {
                match request(closure) {
                    Ok(id) => next.set(Some(id)),
                    Err(err) => log::error!("failed to schedule frame: {err:?}"),
                }
            }
            on_frame();
        }) as Box<dyn FnMut()>));

        Self { callback, pending }
    }

    pub fn is_running(&self) -> bool {
        self.pending.get().is_some()
    }

    pub fn start(&self) -> Result<(), JsValue> {
        if self.is_running() {
            return Ok(());
        }
        if let Some(closure) = self.callback.borrow().as_ref() {
            self.pending.set(Some(request(closure)?));
        }
        Ok(())
    }

    /// Cancel the pending frame. No frame body runs after this returns.
    pub fn stop(&self) {
        if let Some(id) = self.pending.take() {
            if let Some(w) = window() {
                if let Err(err) = w.cancel_animation_frame(id) {
                    log::warn!("cancelAnimationFrame failed: {err:?}");
                }
            }
        }
    }
}

impl Drop for FrameLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

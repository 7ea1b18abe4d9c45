//! Pointer, touch and resize listeners.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use glam::Vec2;
use wasm_bindgen::{closure::Closure, JsCast};
use web_sys::{
    AddEventListenerOptions, Event, EventTarget, HtmlCanvasElement, MouseEvent, TouchEvent, Window,
};

use super::backdrop::Scene;
use super::frame_loop::FrameLoop;
use crate::error::Result;
use crate::impulse::PointerState;

/// An attached listener; detached again on drop.
pub struct Listener {
    target: EventTarget,
    kind: &'static str,
    closure: Closure<dyn FnMut(Event)>,
}

impl Listener {
    fn attach<F>(target: &EventTarget, kind: &'static str, passive: bool, handler: F) -> Result<Self>
    where
        F: FnMut(Event) + 'static,
    {
        let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
        let options = AddEventListenerOptions::new();
        options.set_passive(passive);
        target.add_event_listener_with_callback_and_add_event_listener_options(
            kind,
            closure.as_ref().unchecked_ref(),
            &options,
        )?;
        Ok(Self {
            target: target.clone(),
            kind,
            closure,
        })
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.kind, self.closure.as_ref().unchecked_ref());
    }
}

fn canvas_point(canvas: &HtmlCanvasElement, client_x: i32, client_y: i32) -> Vec2 {
    let rect = canvas.get_bounding_client_rect();
    PointerState::normalize(
        Vec2::new(client_x as f32, client_y as f32),
        Vec2::new(rect.left() as f32, rect.top() as f32),
        Vec2::new(canvas.width() as f32, canvas.height() as f32),
    )
}

/// Run `f` on the pointer unless the scene is busy in a frame.
fn with_pointer(scene: &Rc<RefCell<Scene>>, f: impl FnOnce(&mut PointerState)) {
    match scene.try_borrow_mut() {
        Ok(mut scene) => f(&mut scene.pointer),
        Err(_) => log::trace!("pointer event dropped while scene is busy"),
    }
}

/// Mouse and touch listeners on the canvas.
pub fn attach_pointer(canvas: &HtmlCanvasElement, scene: &Rc<RefCell<Scene>>) -> Result<Vec<Listener>> {
    let target: &EventTarget = canvas.as_ref();
    let mut listeners = Vec::with_capacity(6);

    {
        let (canvas, scene) = (canvas.clone(), scene.clone());
        listeners.push(Listener::attach(target, "mousemove", true, move |event| {
            if let Some(e) = event.dyn_ref::<MouseEvent>() {
                let point = canvas_point(&canvas, e.client_x(), e.client_y());
                with_pointer(&scene, |p| p.move_to(point));
            }
        })?);
    }
    {
        let scene = scene.clone();
        listeners.push(Listener::attach(target, "mousedown", true, move |_| {
            with_pointer(&scene, PointerState::press);
        })?);
    }
    {
        let scene = scene.clone();
        listeners.push(Listener::attach(target, "mouseup", true, move |_| {
            with_pointer(&scene, PointerState::release);
        })?);
    }
    {
        let (canvas, scene) = (canvas.clone(), scene.clone());
        listeners.push(Listener::attach(target, "touchmove", false, move |event| {
            event.prevent_default();
            if let Some(touch) = event.dyn_ref::<TouchEvent>().and_then(|e| e.touches().get(0)) {
                let point = canvas_point(&canvas, touch.client_x(), touch.client_y());
                with_pointer(&scene, |p| p.move_to(point));
            }
        })?);
    }
    {
        let (canvas, scene) = (canvas.clone(), scene.clone());
        listeners.push(Listener::attach(target, "touchstart", false, move |event| {
            event.prevent_default();
            if let Some(touch) = event.dyn_ref::<TouchEvent>().and_then(|e| e.touches().get(0)) {
                let point = canvas_point(&canvas, touch.client_x(), touch.client_y());
                with_pointer(&scene, |p| p.press_at(point));
            }
        })?);
    }
    {
        let scene = scene.clone();
        listeners.push(Listener::attach(target, "touchend", true, move |_| {
            with_pointer(&scene, PointerState::release);
        })?);
    }

    Ok(listeners)
}

/// Debounced window resize: once events stop for the configured delay the
/// frame loop is halted, the scene rebuilt at the new size, and the loop
/// restarted.
pub struct ResizeWatcher {
    window: Window,
    pending: Rc<Cell<Option<i32>>>,
    _rebuild: Rc<Closure<dyn FnMut()>>,
    _listener: Listener,
}

impl ResizeWatcher {
    pub fn attach(
        window: &Window,
        scene: &Rc<RefCell<Scene>>,
        frame_loop: &Rc<FrameLoop>,
        debounce_ms: i32,
    ) -> Result<Self> {
        let pending: Rc<Cell<Option<i32>>> = Rc::new(Cell::new(None));

        let rebuild = {
            let (scene, frame_loop, pending) = (scene.clone(), frame_loop.clone(), pending.clone());
            Rc::new(Closure::wrap(Box::new(move || {
                pending.set(None);
                // halt first: nothing may touch the old fields after this
                frame_loop.stop();
                let rebuilt = match scene.try_borrow_mut() {
                    Ok(mut scene) => scene.rebuild(),
                    Err(_) => {
                        log::warn!("resize skipped: scene busy");
                        Ok(())
                    }
                };
                match rebuilt {
                    Ok(()) => {
                        if let Err(err) = frame_loop.start() {
                            log::error!("failed to restart frame loop: {err:?}");
                        }
                    }
                    Err(err) => log::error!("fluid backdrop stopped after resize: {err}"),
                }
            }) as Box<dyn FnMut()>))
        };

        let listener = {
            let target: &EventTarget = window.as_ref();
            let (window, rebuild, pending) = (window.clone(), rebuild.clone(), pending.clone());
            Listener::attach(target, "resize", true, move |_| {
                if let Some(id) = pending.take() {
                    window.clear_timeout_with_handle(id);
                }
                match window.set_timeout_with_callback_and_timeout_and_arguments_0(
                    (*rebuild).as_ref().unchecked_ref(),
                    debounce_ms,
                ) {
                    Ok(id) => pending.set(Some(id)),
                    Err(err) => log::error!("failed to schedule resize: {err:?}"),
                }
            })?
        };

        Ok(Self {
            window: window.clone(),
            pending,
            _rebuild: rebuild,
            _listener: listener,
        })
    }
}

impl Drop for ResizeWatcher {
    fn drop(&mut self) {
        if let Some(id) = self.pending.take() {
            self.window.clear_timeout_with_handle(id);
        }
    }
}

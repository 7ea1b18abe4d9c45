use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlCanvasElement, Window};

use super::frame_loop::FrameLoop;
use super::input::{self, Listener, ResizeWatcher};
use super::render::Presenter;
use crate::config::{FluidConfig, LaunchOptions};
use crate::error::{FluidError, Result};
use crate::field::GridSize;
use crate::impulse::PointerState;
use crate::solver::FluidSolver;

const LOG_EVERY_FRAMES: u64 = 100;

fn now_secs() -> f64 {
    js_sys::Date::now() * 0.001
}

fn viewport(window: &Window) -> Result<(f64, f64)> {
    let w = window.inner_width()?.as_f64().unwrap_or(1.0);
    let h = window.inner_height()?.as_f64().unwrap_or(1.0);
    Ok((w.max(1.0), h.max(1.0)))
}

fn create_canvas(document: &Document, container: &Element) -> Result<HtmlCanvasElement> {
    let canvas: HtmlCanvasElement = document
        .create_element("canvas")?
        .dyn_into()
        .map_err(|_| FluidError::MissingElement("canvas".into()))?;
    let style = canvas.style();
    style.set_property("display", "block")?;
    style.set_property("width", "100%")?;
    style.set_property("height", "100%")?;
    container.append_child(&canvas)?;
    Ok(canvas)
}

/// Take `canvas` back out of the page when start-up failed part way.
pub(crate) fn discard_on_error<T>(canvas: &HtmlCanvasElement, result: Result<T>) -> Result<T> {
    if result.is_err() {
        canvas.remove();
    }
    result
}

/// Everything a frame touches.
pub struct Scene {
    window: Window,
    canvas: HtmlCanvasElement,
    presenter: Presenter,
    solver: FluidSolver,
    pub(crate) pointer: PointerState,
    pixels: Vec<u8>,
    frame_count: u64,
}

impl Scene {
    fn fit_canvas(&self) -> Result<GridSize> {
        let (w, h) = viewport(&self.window)?;
        self.canvas.set_width(w as u32);
        self.canvas.set_height(h as u32);
        self.presenter.set_viewport(w as u32, h as u32);
        Ok(GridSize::from_viewport(w, h, self.solver.config().grid_scale))
    }

    fn on_frame(&mut self) {
        let frame = self.frame_count;
        self.frame_count += 1;

        if frame % LOG_EVERY_FRAMES == 0 {
            log::debug!(
                "frame {frame}: mean |div| {:.5}",
                self.solver.last_divergence()
            );
        }
        if !self.solver.config().runs_frame(frame) {
            return;
        }

        let t = now_secs();
        self.solver.frame(&mut self.pointer, t, &mut self.pixels);
        if let Err(err) = self.presenter.draw(&self.pixels, self.solver.size()) {
            log::error!("draw failed: {err}");
        }
    }

    /// Replace every grid-sized resource. The frame loop must be stopped.
    pub(crate) fn rebuild(&mut self) -> Result<()> {
        let size = self.fit_canvas()?;
        log::info!("resizing fluid grid to {}x{}", size.width, size.height);
        self.solver.resize(size);
        self.solver.seed_vortex();
        self.pixels.clear();
        Ok(())
    }
}

/// A running backdrop. Dropping it stops the loop and removes the canvas.
pub struct Backdrop {
    scene: Rc<RefCell<Scene>>,
    frame_loop: Rc<FrameLoop>,
    _resize: ResizeWatcher,
    _pointer: Vec<Listener>,
}

impl Backdrop {
    /// Create a canvas in `container` and start animating.
    pub fn mount(container: &Element, options: &LaunchOptions) -> Result<Self> {
        let window = web_sys::window().ok_or_else(|| FluidError::MissingElement("window".into()))?;
        let document = window
            .document()
            .ok_or_else(|| FluidError::MissingElement("document".into()))?;

        let (vw, vh) = viewport(&window)?;
        let user_agent = window.navigator().user_agent().unwrap_or_default();
        let profile = options.profile.resolve(vw, &user_agent);
        log::info!("fluid backdrop starting: {profile} profile, {vw}x{vh} viewport");

        let canvas = create_canvas(&document, container)?;
        let started = Self::start(window, canvas.clone(), profile.config(), (vw, vh));
        discard_on_error(&canvas, started)
    }

    fn start(
        window: Window,
        canvas: HtmlCanvasElement,
        config: FluidConfig,
        (vw, vh): (f64, f64),
    ) -> Result<Self> {
        canvas.set_width(vw as u32);
        canvas.set_height(vh as u32);
        let presenter = Presenter::new(&canvas)?;
        presenter.set_viewport(vw as u32, vh as u32);

        let debounce_ms = config.resize_debounce_ms;
        let size = GridSize::from_viewport(vw, vh, config.grid_scale);
        let mut solver = FluidSolver::new(config, size);
        solver.seed(now_secs());

        let scene = Rc::new(RefCell::new(Scene {
            window: window.clone(),
            canvas: canvas.clone(),
            presenter,
            solver,
            pointer: PointerState::default(),
            pixels: Vec::with_capacity(size.cells() * 4),
            frame_count: 0,
        }));

        let frame_loop = Rc::new(FrameLoop::new({
            let scene = scene.clone();
            move || match scene.try_borrow_mut() {
                Ok(mut scene) => scene.on_frame(),
                Err(_) => log::warn!("frame skipped: scene busy"),
            }
        }));

        let pointer = input::attach_pointer(&canvas, &scene)?;
        let resize = ResizeWatcher::attach(&window, &scene, &frame_loop, debounce_ms)?;
        frame_loop.start()?;

        Ok(Self {
            scene,
            frame_loop,
            _resize: resize,
            _pointer: pointer,
        })
    }

    pub fn canvas(&self) -> HtmlCanvasElement {
        self.scene.borrow().canvas.clone()
    }

    pub fn grid_size(&self) -> GridSize {
        self.scene.borrow().solver.size()
    }

    pub fn is_running(&self) -> bool {
        self.frame_loop.is_running()
    }
}

impl Drop for Backdrop {
    fn drop(&mut self) {
        self.frame_loop.stop();
        if let Ok(scene) = self.scene.try_borrow() {
            scene.canvas.remove();
        }
    }
}

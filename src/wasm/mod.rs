//! Browser host: mounts the backdrop into the page on load.

use std::cell::RefCell;

use wasm_bindgen::prelude::*;

mod backdrop;
mod frame_loop;
mod input;
mod logger;
mod render;

pub use backdrop::Backdrop;

use crate::config::{LaunchOptions, DEFAULT_CONTAINER_ID};
use crate::error::{FluidError, Result};

#[cfg(test)]
wasm_bindgen_test::wasm_bindgen_test_configure!(run_in_browser);

thread_local! {
    static ACTIVE: RefCell<Option<Backdrop>> = const { RefCell::new(None) };
}

fn launch(container_id: &str) -> Result<()> {
    let window = web_sys::window().ok_or_else(|| FluidError::MissingElement("window".into()))?;
    let document = window
        .document()
        .ok_or_else(|| FluidError::MissingElement("document".into()))?;
    let container = document
        .get_element_by_id(container_id)
        .ok_or_else(|| FluidError::MissingElement(format!("#{container_id}")))?;

    let options = LaunchOptions::from_attributes(|name| container.get_attribute(name))?;
    logger::init(options.log_level);

    let backdrop = Backdrop::mount(&container, &options)?;
    ACTIVE.with(|slot| *slot.borrow_mut() = Some(backdrop));
    Ok(())
}

/// Entry point. Failures disable the effect but never throw into the page.
#[wasm_bindgen(start)]
pub fn main() -> Result<(), JsValue> {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    logger::init(log::LevelFilter::Info);
    if let Err(err) = launch(DEFAULT_CONTAINER_ID) {
        log::error!("fluid backdrop disabled: {err}");
    }
    Ok(())
}

/// Stop the running backdrop and remove its canvas.
#[wasm_bindgen]
pub fn stop_backdrop() {
    ACTIVE.with(|slot| slot.borrow_mut().take());
}

#![cfg(target_arch = "wasm32")]

use fluid_backdrop::config::{LaunchOptions, Profile, ProfileChoice};
use fluid_backdrop::wasm::Backdrop;
use fluid_backdrop::GridSize;
use wasm_bindgen_futures::JsFuture;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn container(id: &str) -> web_sys::Element {
    let document = web_sys::window().unwrap().document().unwrap();
    let div = document.create_element("div").unwrap();
    div.set_id(id);
    document.body().unwrap().append_child(&div).unwrap();
    div
}

#[wasm_bindgen_test]
fn mount_creates_running_canvas() {
    let host = container("fluid-test-mount");
    let options = LaunchOptions {
        profile: ProfileChoice::Fixed(Profile::Reduced),
        ..LaunchOptions::default()
    };
    let backdrop = Backdrop::mount(&host, &options).expect("mount");

    let canvas = backdrop.canvas();
    assert!(canvas.width() > 0 && canvas.height() > 0);
    assert_eq!(host.child_element_count(), 1);
    assert!(backdrop.is_running());
    assert!(backdrop.grid_size().cells() > 0);

    drop(backdrop);
    assert_eq!(host.child_element_count(), 0);
    host.remove();
}

async fn sleep(ms: i32) {
    let promise = js_sys::Promise::new(&mut |resolve, _| {
        web_sys::window()
            .unwrap()
            .set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms)
            .unwrap();
    });
    JsFuture::from(promise).await.unwrap();
}

#[wasm_bindgen_test]
async fn resize_rebuilds_and_restarts() {
    let host = container("fluid-test-resize");
    let options = LaunchOptions {
        profile: ProfileChoice::Fixed(Profile::Reduced),
        ..LaunchOptions::default()
    };
    let backdrop = Backdrop::mount(&host, &options).expect("mount");
    let config = Profile::Reduced.config();

    let window = web_sys::window().unwrap();
    let resize = web_sys::Event::new("resize").unwrap();
    window.dispatch_event(&resize).unwrap();
    // still debouncing
    assert!(backdrop.is_running());

    sleep(config.resize_debounce_ms + 200).await;

    let width = window.inner_width().unwrap().as_f64().unwrap().max(1.0);
    let height = window.inner_height().unwrap().as_f64().unwrap().max(1.0);
    assert!(backdrop.is_running());
    assert_eq!(
        backdrop.grid_size(),
        GridSize::from_viewport(width, height, config.grid_scale)
    );

    drop(backdrop);
    assert_eq!(host.child_element_count(), 0);
    host.remove();
}

#[wasm_bindgen_test]
fn attributes_choose_profile() {
    let host = container("fluid-test-attrs");
    host.set_attribute("data-fluid-profile", "mobile").unwrap();
    let options = LaunchOptions::from_attributes(|name| host.get_attribute(name)).unwrap();
    assert_eq!(options.profile, ProfileChoice::Fixed(Profile::Reduced));

    host.set_attribute("data-fluid-profile", "turbo").unwrap();
    assert!(LaunchOptions::from_attributes(|name| host.get_attribute(name)).is_err());
    host.remove();
}

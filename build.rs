// Build script that stages the static demo site into `dist/`.
use std::path::Path;

use fs_extra::dir::{copy, CopyOptions};

fn main() {
    println!("cargo:rerun-if-changed=static");

    let static_dir = Path::new("static");
    if !static_dir.exists() {
        return;
    }

    let out_dir = Path::new("dist");
    if out_dir.exists() {
        std::fs::remove_dir_all(out_dir).ok();
    }
    if let Err(err) = std::fs::create_dir_all(out_dir) {
        println!("cargo:warning=could not create dist/: {err}");
        return;
    }

    let options = CopyOptions {
        overwrite: true,
        content_only: true,
        ..CopyOptions::new()
    };
    if let Err(err) = copy(static_dir, out_dir, &options) {
        println!("cargo:warning=failed to copy static/ to dist/: {err}");
    }
}

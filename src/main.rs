//! Host-side helper: `cargo run` builds the WASM bundle into `static/pkg`
//! and serves `static/` on a local HTTP server for trying the backdrop.

use std::io;
use std::process::{Command, ExitCode, Stdio};

const PORT: &str = "8000";

fn wasm_pack() -> io::Result<bool> {
    println!("Building WASM pkg …");
    let status = Command::new("wasm-pack")
        .args(["build", "--release", "--target", "web", "--out-dir", "static/pkg"])
        .status()?;
    Ok(status.success())
}

fn main() -> ExitCode {
    match wasm_pack() {
        Ok(true) => {}
        Ok(false) => {
            eprintln!("wasm-pack finished with errors.");
            return ExitCode::FAILURE;
        }
        Err(_) => {
            eprintln!(
                "wasm-pack not found in PATH (https://rustwasm.github.io/wasm-pack/). \
                 Serving whatever is already in static/pkg."
            );
        }
    }

    println!("Launching local server at http://127.0.0.1:{PORT} …");
    let server = Command::new("python3")
        .args(["-m", "http.server", PORT, "--directory", "static"])
        .stdout(Stdio::null())
        .stderr(Stdio::inherit())
        .status();

    match server {
        Ok(status) if status.success() => ExitCode::SUCCESS,
        Ok(status) => {
            eprintln!("http server exited with {status}");
            ExitCode::FAILURE
        }
        Err(err) => {
            eprintln!("failed to start http server: {err}");
            ExitCode::FAILURE
        }
    }
}

use wasm_bindgen::JsValue;

/// Everything that can stop a backdrop from starting or rebuilding.
#[derive(Debug, thiserror::Error)]
pub enum FluidError {
    #[error("element not found: {0}")]
    MissingElement(String),
    #[error("WebGL2 not supported")]
    WebGlUnavailable,
    #[error("shader compile error: {0}")]
    ShaderCompile(String),
    #[error("program link error: {0}")]
    ProgramLink(String),
    #[error("failed to create GL resource: {0}")]
    GlResource(&'static str),
    #[error("grid must be at least 1x1, got {width}x{height}")]
    EmptyGrid { width: usize, height: usize },
    #[error("unknown profile `{0}` (expected standard, reduced or auto)")]
    UnknownProfile(String),
    #[error("unknown log level `{0}`")]
    UnknownLogLevel(String),
    #[error("javascript error: {0}")]
    Js(String),
}

impl From<JsValue> for FluidError {
    fn from(value: JsValue) -> Self {
        let text = value
            .as_string()
            .or_else(|| {
                js_sys::JSON::stringify(&value)
                    .ok()
                    .and_then(|s| s.as_string())
            })
            .unwrap_or_else(|| format!("{value:?}"));
        FluidError::Js(text)
    }
}

impl From<FluidError> for JsValue {
    fn from(err: FluidError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

pub type Result<T, E = FluidError> = std::result::Result<T, E>;

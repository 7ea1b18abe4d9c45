use wasm_bindgen::JsCast;
use web_sys::{
    HtmlCanvasElement, WebGl2RenderingContext as GL, WebGlBuffer, WebGlProgram, WebGlShader,
    WebGlTexture, WebGlUniformLocation, WebGlVertexArrayObject,
};

use crate::error::{FluidError, Result};
use crate::field::GridSize;

const VERTEX_SHADER: &str = r#"#version 300 es
in vec2 a_position;
out vec2 v_texCoord;

void main() {
    v_texCoord = a_position * 0.5 + 0.5;
    gl_Position = vec4(a_position, 0.0, 1.0);
}
"#;

const FRAGMENT_SHADER: &str = r#"#version 300 es
precision mediump float;
uniform sampler2D u_image;
in vec2 v_texCoord;
out vec4 outColor;

void main() {
    outColor = texture(u_image, v_texCoord);
}
"#;

/// Full-screen quad as a triangle strip.
const QUAD: [f32; 8] = [-1.0, -1.0, 1.0, -1.0, -1.0, 1.0, 1.0, 1.0];

/// Uploads the display pass output and blends it over the page.
pub struct Presenter {
    gl: GL,
    program: WebGlProgram,
    vao: WebGlVertexArrayObject,
    _quad: WebGlBuffer,
    texture: WebGlTexture,
    image_loc: Option<WebGlUniformLocation>,
}

fn compile_shader(gl: &GL, kind: u32, source: &str) -> Result<WebGlShader> {
    let shader = gl
        .create_shader(kind)
        .ok_or(FluidError::GlResource("shader"))?;
    gl.shader_source(&shader, source);
    gl.compile_shader(&shader);

    let ok = gl
        .get_shader_parameter(&shader, GL::COMPILE_STATUS)
        .as_bool()
        .unwrap_or(false);
    if ok {
        Ok(shader)
    } else {
        let info = gl.get_shader_info_log(&shader).unwrap_or_default();
        gl.delete_shader(Some(&shader));
        Err(FluidError::ShaderCompile(info))
    }
}

fn link_program(gl: &GL, vertex: &WebGlShader, fragment: &WebGlShader) -> Result<WebGlProgram> {
    let program = gl
        .create_program()
        .ok_or(FluidError::GlResource("program"))?;
    gl.attach_shader(&program, vertex);
    gl.attach_shader(&program, fragment);
    gl.link_program(&program);

    let ok = gl
        .get_program_parameter(&program, GL::LINK_STATUS)
        .as_bool()
        .unwrap_or(false);
    if ok {
        Ok(program)
    } else {
        let info = gl.get_program_info_log(&program).unwrap_or_default();
        gl.delete_program(Some(&program));
        Err(FluidError::ProgramLink(info))
    }
}

impl Presenter {
    /// Build the blit pipeline on `canvas`. Any compile or link failure is
    /// fatal for this backdrop.
    pub fn new(canvas: &HtmlCanvasElement) -> Result<Self> {
        let gl: GL = canvas
            .get_context("webgl2")?
            .ok_or(FluidError::WebGlUnavailable)?
            .dyn_into()
            .map_err(|_| FluidError::WebGlUnavailable)?;

        let vertex = compile_shader(&gl, GL::VERTEX_SHADER, VERTEX_SHADER)?;
        let fragment = compile_shader(&gl, GL::FRAGMENT_SHADER, FRAGMENT_SHADER)?;
        let program = link_program(&gl, &vertex, &fragment)?;
        // the linked program keeps its own copy
        gl.delete_shader(Some(&vertex));
        gl.delete_shader(Some(&fragment));

        let quad = gl
            .create_buffer()
            .ok_or(FluidError::GlResource("vertex buffer"))?;
        gl.bind_buffer(GL::ARRAY_BUFFER, Some(&quad));
        let vertices = js_sys::Float32Array::from(QUAD.as_slice());
        gl.buffer_data_with_array_buffer_view(GL::ARRAY_BUFFER, &vertices, GL::STATIC_DRAW);

        let vao = gl
            .create_vertex_array()
            .ok_or(FluidError::GlResource("vertex array"))?;
        gl.bind_vertex_array(Some(&vao));
        let position = gl.get_attrib_location(&program, "a_position");
        if position < 0 {
            return Err(FluidError::GlResource("a_position attribute"));
        }
        gl.enable_vertex_attrib_array(position as u32);
        gl.vertex_attrib_pointer_with_i32(position as u32, 2, GL::FLOAT, false, 0, 0);
        gl.bind_vertex_array(None);

        let texture = gl
            .create_texture()
            .ok_or(FluidError::GlResource("texture"))?;
        gl.bind_texture(GL::TEXTURE_2D, Some(&texture));
        gl.tex_parameteri(GL::TEXTURE_2D, GL::TEXTURE_MIN_FILTER, GL::LINEAR as i32);
        gl.tex_parameteri(GL::TEXTURE_2D, GL::TEXTURE_MAG_FILTER, GL::LINEAR as i32);
        gl.tex_parameteri(GL::TEXTURE_2D, GL::TEXTURE_WRAP_S, GL::CLAMP_TO_EDGE as i32);
        gl.tex_parameteri(GL::TEXTURE_2D, GL::TEXTURE_WRAP_T, GL::CLAMP_TO_EDGE as i32);
        gl.bind_texture(GL::TEXTURE_2D, None);

        let image_loc = gl.get_uniform_location(&program, "u_image");

        gl.enable(GL::BLEND);
        gl.blend_func(GL::SRC_ALPHA, GL::ONE_MINUS_SRC_ALPHA);

        Ok(Self {
            gl,
            program,
            vao,
            _quad: quad,
            texture,
            image_loc,
        })
    }

    pub fn set_viewport(&self, width: u32, height: u32) {
        self.gl.viewport(0, 0, width as i32, height as i32);
    }

    /// Upload `pixels` (RGBA8, one texel per grid cell) and draw it.
    pub fn draw(&self, pixels: &[u8], size: GridSize) -> Result<()> {
        let gl = &self.gl;
        gl.bind_texture(GL::TEXTURE_2D, Some(&self.texture));
        gl.pixel_storei(GL::UNPACK_ALIGNMENT, 1);
        gl.tex_image_2d_with_i32_and_i32_and_i32_and_format_and_type_and_opt_u8_array(
            GL::TEXTURE_2D,
            0,
            GL::RGBA8 as i32,
            size.width as i32,
            size.height as i32,
            0,
            GL::RGBA,
            GL::UNSIGNED_BYTE,
            Some(pixels),
        )?;

        gl.clear_color(0.0, 0.0, 0.0, 0.0);
        gl.clear(GL::COLOR_BUFFER_BIT);

        gl.use_program(Some(&self.program));
        gl.bind_vertex_array(Some(&self.vao));
        gl.active_texture(GL::TEXTURE0);
        gl.uniform1i(self.image_loc.as_ref(), 0);
        gl.draw_arrays(GL::TRIANGLE_STRIP, 0, 4);
        gl.bind_vertex_array(None);
        Ok(())
    }
}

//! GLSL sources of the light shader, the composite shaders and the blur.
//!
//! Attribute names follow `Attribute::name`. The light shader reads the fraction of
//! a ray that is lit through `Texcoord0`.

use crate::errors::*;
use crate::video::prelude::*;

use super::mode::LightingMode;

/// A shader program ready to be created on a `VideoDevice`.
#[derive(Debug, Clone)]
pub struct ShaderSource {
    pub params: ShaderParams,
    pub vs: String,
    pub fs: String,
}

impl ShaderSource {
    pub fn create(&self, video: &VideoDevice) -> Result<ShaderHandle> {
        let handle = video.create_shader(self.params.clone(), &self.vs, &self.fs)?;
        Ok(handle)
    }
}

const PRECISION: &str = r#"
#ifdef GL_ES
precision mediump float;
#endif
"#;

fn header(mode: &LightingMode) -> String {
    let mut header = String::from(PRECISION);
    if mode.gamma_correction {
        header.push_str("#define GAMMA_CORRECTION\n");
    }

    header
}

/// Vertex layout of the full-screen quad drawn by the light map.
pub fn quad_layout() -> VertexLayout {
    VertexLayout::build()
        .with(Attribute::Position, 2)
        .with(Attribute::Texcoord0, 2)
        .finish()
}

/// Vertex layout of light fans: position, color and the lit fraction of the ray.
pub fn light_layout() -> VertexLayout {
    VertexLayout::build()
        .with(Attribute::Position, 2)
        .with(Attribute::Color0, 4)
        .with(Attribute::Texcoord0, 1)
        .finish()
}

/// The shader every light is drawn with.
pub fn light(mode: &LightingMode) -> ShaderSource {
    let header = header(mode);

    let vs = format!(
        r#"{}
attribute vec2 Position;
attribute vec4 Color0;
attribute float Texcoord0;
uniform mat4 u_projTrans;
varying vec4 v_color;

void main() {{
    v_color = Texcoord0 * Color0;
    gl_Position = u_projTrans * vec4(Position, 0.0, 1.0);
}}
"#,
        header
    );

    let fs = format!(
        r#"{}
varying vec4 v_color;

void main() {{
#ifdef GAMMA_CORRECTION
    gl_FragColor = sqrt(v_color);
#else
    gl_FragColor = v_color;
#endif
}}
"#,
        header
    );

    let params = ShaderParams {
        attributes: light_layout(),
        uniforms: UniformVariableLayout::build()
            .with("u_projTrans", UniformVariableType::Matrix4f)
            .finish(),
    };

    ShaderSource { params, vs, fs }
}

const QUAD_VS: &str = r#"
attribute vec2 Position;
attribute vec2 Texcoord0;
varying vec2 v_texCoords;

void main() {
    v_texCoords = Texcoord0;
    gl_Position = vec4(Position, 0.0, 1.0);
}
"#;

fn composite(mode: &LightingMode, body: &str, ambient: bool) -> ShaderSource {
    let header = header(mode);

    let fs = format!(
        r#"{}
uniform sampler2D u_texture;
uniform vec4 u_ambient;
varying vec2 v_texCoords;

void main() {{
    vec4 c = texture2D(u_texture, v_texCoords);
{}
}}
"#,
        header, body
    );

    let mut uniforms =
        UniformVariableLayout::build().with("u_texture", UniformVariableType::RenderTexture);

    if ambient {
        uniforms = uniforms.with("u_ambient", UniformVariableType::Vector4f);
    }

    let params = ShaderParams {
        attributes: quad_layout(),
        uniforms: uniforms.finish(),
    };

    ShaderSource {
        params,
        vs: format!("{}{}", header, QUAD_VS),
        fs,
    }
}

/// Darkens the scene by the ambient alpha where no light reaches.
pub fn shadow(mode: &LightingMode) -> ShaderSource {
    composite(
        mode,
        "    gl_FragColor.rgb = c.rgb * c.a + u_ambient.rgb;\n    gl_FragColor.a = u_ambient.a - c.a;",
        true,
    )
}

/// Produces the multiplier of the diffuse blend function.
pub fn diffuse(mode: &LightingMode) -> ShaderSource {
    composite(
        mode,
        "    gl_FragColor.rgb = u_ambient.rgb + c.rgb;\n    gl_FragColor.a = 1.0;",
        true,
    )
}

/// Adds the light map to the scene as is.
pub fn without_shadow(mode: &LightingMode) -> ShaderSource {
    composite(mode, "    gl_FragColor = c;", false)
}

/// One axis of a separable 5-tap Gaussian blur, the axis is picked with `u_dir`.
pub fn blur(mode: &LightingMode) -> ShaderSource {
    let header = header(mode);

    let vs = format!(
        r#"{}
attribute vec2 Position;
attribute vec2 Texcoord0;
uniform vec2 u_dir;
uniform vec2 u_size;
varying vec2 v_texCoords0;
varying vec2 v_texCoords1;
varying vec2 v_texCoords2;
varying vec2 v_texCoords3;
varying vec2 v_texCoords4;

void main() {{
    vec2 further = u_dir * 3.2307692308 / u_size;
    vec2 closer = u_dir * 1.3846153846 / u_size;
    v_texCoords0 = Texcoord0 - further;
    v_texCoords1 = Texcoord0 - closer;
    v_texCoords2 = Texcoord0;
    v_texCoords3 = Texcoord0 + closer;
    v_texCoords4 = Texcoord0 + further;
    gl_Position = vec4(Position, 0.0, 1.0);
}}
"#,
        header
    );

    let fs = format!(
        r#"{}
uniform sampler2D u_texture;
varying vec2 v_texCoords0;
varying vec2 v_texCoords1;
varying vec2 v_texCoords2;
varying vec2 v_texCoords3;
varying vec2 v_texCoords4;
const float center = 0.2270270270;
const float close = 0.3162162162;
const float far = 0.0702702703;

void main() {{
    gl_FragColor = far * texture2D(u_texture, v_texCoords0)
        + close * texture2D(u_texture, v_texCoords1)
        + center * texture2D(u_texture, v_texCoords2)
        + close * texture2D(u_texture, v_texCoords3)
        + far * texture2D(u_texture, v_texCoords4);
}}
"#,
        header
    );

    let params = ShaderParams {
        attributes: quad_layout(),
        uniforms: UniformVariableLayout::build()
            .with("u_texture", UniformVariableType::RenderTexture)
            .with("u_dir", UniformVariableType::Vector2f)
            .with("u_size", UniformVariableType::Vector2f)
            .finish(),
    };

    ShaderSource { params, vs, fs }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn gamma_define() {
        let gamma = LightingMode::new(true, false);
        assert!(light(&gamma).fs.contains("#define GAMMA_CORRECTION"));
        assert!(!light(&LightingMode::default())
            .fs
            .contains("#define GAMMA_CORRECTION"));
    }

    #[test]
    fn uniforms() {
        let mode = LightingMode::default();
        let source = shadow(&mode);
        assert_eq!(
            source.params.uniforms.variable_type("u_ambient"),
            Some(UniformVariableType::Vector4f)
        );

        assert_eq!(without_shadow(&mode).params.uniforms.len(), 1);
        assert_eq!(blur(&mode).params.uniforms.len(), 3);
        assert_eq!(light_layout().stride(), 28);
        assert_eq!(quad_layout().stride(), 16);
    }
}

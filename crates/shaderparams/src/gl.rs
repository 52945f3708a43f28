//! OpenGL / OpenGL ES binding through `glow`.
use ::glow::HasContext;

use crate::binding::UniformBinding;
use crate::kind::TextureUnit;

/// Routes uniform lookups and writes to a `glow` context.
///
/// Setters act on whichever program is current (`use_program`), so the
/// caller binds the program the table was resolved against before pushing.
pub struct GlowBinding<'gl, G: HasContext> {
    gl: &'gl G,
}

impl<'gl, G: HasContext> GlowBinding<'gl, G> {
    pub fn new(gl: &'gl G) -> Self {
        Self { gl }
    }

    pub fn context(&self) -> &'gl G {
        self.gl
    }
}

impl<G: HasContext> UniformBinding for GlowBinding<'_, G> {
    type Program = G::Program;
    type Location = G::UniformLocation;

    fn uniform_location(&self, program: G::Program, name: &str) -> Option<G::UniformLocation> {
        unsafe { self.gl.get_uniform_location(program, name) }
    }

    fn set_float(&self, location: &G::UniformLocation, value: f32) {
        unsafe { self.gl.uniform_1_f32(Some(location), value) }
    }

    fn set_float_vec2(&self, location: &G::UniformLocation, value: [f32; 2]) {
        unsafe { self.gl.uniform_2_f32_slice(Some(location), &value) }
    }

    fn set_float_vec3(&self, location: &G::UniformLocation, value: [f32; 3]) {
        unsafe { self.gl.uniform_3_f32_slice(Some(location), &value) }
    }

    fn set_float_vec4(&self, location: &G::UniformLocation, value: [f32; 4]) {
        unsafe { self.gl.uniform_4_f32_slice(Some(location), &value) }
    }

    fn set_int(&self, location: &G::UniformLocation, value: i32) {
        unsafe { self.gl.uniform_1_i32(Some(location), value) }
    }

    fn set_int_vec2(&self, location: &G::UniformLocation, value: [i32; 2]) {
        unsafe { self.gl.uniform_2_i32_slice(Some(location), &value) }
    }

    fn set_int_vec3(&self, location: &G::UniformLocation, value: [i32; 3]) {
        unsafe { self.gl.uniform_3_i32_slice(Some(location), &value) }
    }

    fn set_int_vec4(&self, location: &G::UniformLocation, value: [i32; 4]) {
        unsafe { self.gl.uniform_4_i32_slice(Some(location), &value) }
    }

    fn set_sampler(&self, location: &G::UniformLocation, unit: TextureUnit) {
        // glUniform1i is the only legal way to assign a sampler unit.
        let Some(index) = unit.as_gl_int() else {
            tracing::warn!(unit = unit.index(), "texture unit out of range; sampler not set");
            return;
        };
        unsafe { self.gl.uniform_1_i32(Some(location), index) }
    }
}

use std::fmt;

use crate::kind::TextureUnit;

/// The narrow slice of a graphics API the parameter table talks to.
///
/// One lookup primitive resolves a uniform name inside a linked program;
/// one setter per kind writes a value to a resolved location of the
/// program currently in use. Implementations must be called from the
/// thread that owns the graphics context.
pub trait UniformBinding {
    /// Handle of a linked program.
    type Program: Copy + PartialEq + fmt::Debug;
    /// Location of a uniform inside one specific program.
    type Location: Clone + fmt::Debug;

    /// Returns `None` when the program does not declare (or optimised out)
    /// the uniform.
    fn uniform_location(&self, program: Self::Program, name: &str) -> Option<Self::Location>;

    fn set_float(&self, location: &Self::Location, value: f32);
    fn set_float_vec2(&self, location: &Self::Location, value: [f32; 2]);
    fn set_float_vec3(&self, location: &Self::Location, value: [f32; 3]);
    fn set_float_vec4(&self, location: &Self::Location, value: [f32; 4]);

    fn set_int(&self, location: &Self::Location, value: i32);
    fn set_int_vec2(&self, location: &Self::Location, value: [i32; 2]);
    fn set_int_vec3(&self, location: &Self::Location, value: [i32; 3]);
    fn set_int_vec4(&self, location: &Self::Location, value: [i32; 4]);

    /// GLSL booleans are uploaded through the integer setter.
    fn set_bool(&self, location: &Self::Location, value: bool) {
        self.set_int(location, i32::from(value));
    }

    /// Points a sampler at a texture unit. Binding a texture to that unit is
    /// left to the caller. Units above [`TextureUnit::MAX`] are not written.
    fn set_sampler(&self, location: &Self::Location, unit: TextureUnit) {
        match unit.as_gl_int() {
            Some(index) => self.set_int(location, index),
            None => {
                tracing::warn!(unit = unit.index(), "texture unit out of range; sampler not set")
            }
        }
    }
}

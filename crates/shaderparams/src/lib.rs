//! Typed GLSL uniform parameters for full-screen shader views.
//!
//! A [`ParameterTable`] declares every uniform a view may drive together with
//! its kind and current value, resolves their locations once per program
//! link and writes them once per frame through a [`UniformBinding`]. The
//! binding is the only place that talks to a graphics API: [`GlowBinding`]
//! targets OpenGL / OpenGL ES through `glow`, while [`RecordingBinding`]
//! reflects declarations from GLSL source and records every write, which is
//! what the tests and the `uniformcheck` tool run against.
//!
//! ```
//! use shaderparams::{ParameterTable, RecordingBinding};
//!
//! let mut gl = RecordingBinding::new();
//! let program = gl.link(["uniform float u_time;"]);
//!
//! let mut params: ParameterTable<RecordingBinding> = ParameterTable::builder()
//!     .add_float("u_time", 0.0)
//!     .add_vec3("u_color", [1.0, 1.0, 1.0])
//!     .build();
//! params.update("u_time", 2.5_f32);
//! params.resolve_all(&gl, program);
//! assert_eq!(params.push(&gl), 1);
//! ```

mod binding;
mod config;
mod driver;
#[cfg(feature = "glow")]
mod gl;
mod kind;
mod recording;
mod reflect;
mod table;

pub use binding::UniformBinding;
pub use config::{ConfigError, ParamDecl, ParamsConfig, RawScalar, RawValue};
pub use driver::{DriverError, ShaderDriver};
#[cfg(feature = "glow")]
pub use gl::GlowBinding;
pub use kind::{ParamKind, ParamValue, ParseValueError, TextureUnit, UniformValue};
pub use recording::{ProgramId, RecordedLocation, RecordingBinding, UniformCall};
pub use reflect::{declared_uniforms, DeclaredUniform};
pub use table::{Location, ParameterTable, ParameterTableBuilder, ParameterView, TableOptions};

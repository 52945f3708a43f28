//! Uniform kinds and the closed set of values a parameter can hold.
//!
//! Every `ParamValue` variant corresponds to exactly one `ParamKind`, so a
//! value carries its kind with it. Rust types that map onto a kind implement
//! [`UniformValue`], which is what lets the table and builder accept plain
//! `f32`, `[f32; 3]`, `bool` and friends while still knowing the kind at
//! compile time.
use std::fmt;

use serde::{Deserialize, Serialize};

/// GLSL type of a declared uniform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ParamKind {
    #[serde(rename = "float")]
    Float,
    #[serde(rename = "int")]
    Int,
    #[serde(rename = "bool")]
    Bool,
    #[serde(rename = "vec2")]
    FloatVec2,
    #[serde(rename = "vec3")]
    FloatVec3,
    #[serde(rename = "vec4")]
    FloatVec4,
    #[serde(rename = "ivec2")]
    IntVec2,
    #[serde(rename = "ivec3")]
    IntVec3,
    #[serde(rename = "ivec4")]
    IntVec4,
    #[serde(rename = "sampler2D")]
    Sampler2D,
}

impl ParamKind {
    pub const ALL: [ParamKind; 10] = [
        ParamKind::Float,
        ParamKind::Int,
        ParamKind::Bool,
        ParamKind::FloatVec2,
        ParamKind::FloatVec3,
        ParamKind::FloatVec4,
        ParamKind::IntVec2,
        ParamKind::IntVec3,
        ParamKind::IntVec4,
        ParamKind::Sampler2D,
    ];

    /// Maps a GLSL type keyword onto a kind, if the table supports it.
    pub fn from_glsl(keyword: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.glsl_name() == keyword)
    }

    pub fn glsl_name(self) -> &'static str {
        match self {
            ParamKind::Float => "float",
            ParamKind::Int => "int",
            ParamKind::Bool => "bool",
            ParamKind::FloatVec2 => "vec2",
            ParamKind::FloatVec3 => "vec3",
            ParamKind::FloatVec4 => "vec4",
            ParamKind::IntVec2 => "ivec2",
            ParamKind::IntVec3 => "ivec3",
            ParamKind::IntVec4 => "ivec4",
            ParamKind::Sampler2D => "sampler2D",
        }
    }

    /// Number of scalar components a value of this kind carries.
    pub fn components(self) -> usize {
        match self {
            ParamKind::Float | ParamKind::Int | ParamKind::Bool | ParamKind::Sampler2D => 1,
            ParamKind::FloatVec2 | ParamKind::IntVec2 => 2,
            ParamKind::FloatVec3 | ParamKind::IntVec3 => 3,
            ParamKind::FloatVec4 | ParamKind::IntVec4 => 4,
        }
    }

    /// The value a parameter of this kind takes when none is supplied.
    pub fn zero(self) -> ParamValue {
        match self {
            ParamKind::Float => ParamValue::Float(0.0),
            ParamKind::Int => ParamValue::Int(0),
            ParamKind::Bool => ParamValue::Bool(false),
            ParamKind::FloatVec2 => ParamValue::FloatVec2([0.0; 2]),
            ParamKind::FloatVec3 => ParamValue::FloatVec3([0.0; 3]),
            ParamKind::FloatVec4 => ParamValue::FloatVec4([0.0; 4]),
            ParamKind::IntVec2 => ParamValue::IntVec2([0; 2]),
            ParamKind::IntVec3 => ParamValue::IntVec3([0; 3]),
            ParamKind::IntVec4 => ParamValue::IntVec4([0; 4]),
            ParamKind::Sampler2D => ParamValue::Sampler2D(TextureUnit(0)),
        }
    }
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.glsl_name())
    }
}

/// Texture unit a `sampler2D` uniform reads from (`GL_TEXTURE0 + index`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TextureUnit(pub u32);

impl TextureUnit {
    /// Largest unit a sampler uniform can hold (`glUniform1i` takes a GLint).
    pub const MAX: TextureUnit = TextureUnit(i32::MAX as u32);

    pub fn index(self) -> u32 {
        self.0
    }

    /// The unit as the signed value sampler uniforms are written with, or
    /// `None` above [`TextureUnit::MAX`].
    pub fn as_gl_int(self) -> Option<i32> {
        i32::try_from(self.0).ok()
    }
}

/// Current value of a parameter, tagged by its kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamValue {
    Float(f32),
    Int(i32),
    Bool(bool),
    FloatVec2([f32; 2]),
    FloatVec3([f32; 3]),
    FloatVec4([f32; 4]),
    IntVec2([i32; 2]),
    IntVec3([i32; 3]),
    IntVec4([i32; 4]),
    Sampler2D(TextureUnit),
}

impl ParamValue {
    pub fn kind(&self) -> ParamKind {
        match self {
            ParamValue::Float(_) => ParamKind::Float,
            ParamValue::Int(_) => ParamKind::Int,
            ParamValue::Bool(_) => ParamKind::Bool,
            ParamValue::FloatVec2(_) => ParamKind::FloatVec2,
            ParamValue::FloatVec3(_) => ParamKind::FloatVec3,
            ParamValue::FloatVec4(_) => ParamKind::FloatVec4,
            ParamValue::IntVec2(_) => ParamKind::IntVec2,
            ParamValue::IntVec3(_) => ParamKind::IntVec3,
            ParamValue::IntVec4(_) => ParamKind::IntVec4,
            ParamValue::Sampler2D(_) => ParamKind::Sampler2D,
        }
    }

    /// Parses a textual value for the given kind.
    ///
    /// Vectors are written as comma-separated components (`1, 0.5, 0`),
    /// booleans as `true`/`false`/`1`/`0`, samplers as a texture unit index.
    pub fn parse(kind: ParamKind, raw: &str) -> Result<Self, ParseValueError> {
        let raw = raw.trim();
        let invalid = |reason: String| ParseValueError {
            kind,
            input: raw.to_string(),
            reason,
        };

        let parts: Vec<&str> = raw
            .trim_start_matches(['[', '('])
            .trim_end_matches([']', ')'])
            .split(',')
            .map(str::trim)
            .collect();
        if parts.len() != kind.components() {
            return Err(invalid(format!(
                "expected {} component(s), found {}",
                kind.components(),
                parts.len()
            )));
        }

        let floats = || -> Result<Vec<f32>, ParseValueError> {
            parts
                .iter()
                .map(|part| {
                    part.parse::<f32>()
                        .map_err(|err| invalid(format!("'{part}': {err}")))
                })
                .collect()
        };
        let ints = || -> Result<Vec<i32>, ParseValueError> {
            parts
                .iter()
                .map(|part| {
                    part.parse::<i32>()
                        .map_err(|err| invalid(format!("'{part}': {err}")))
                })
                .collect()
        };

        let value = match kind {
            ParamKind::Float => ParamValue::Float(floats()?[0]),
            ParamKind::Int => ParamValue::Int(ints()?[0]),
            ParamKind::Bool => match parts[0].to_ascii_lowercase().as_str() {
                "true" | "1" | "on" => ParamValue::Bool(true),
                "false" | "0" | "off" => ParamValue::Bool(false),
                other => return Err(invalid(format!("'{other}' is not a boolean"))),
            },
            ParamKind::FloatVec2 => {
                let v = floats()?;
                ParamValue::FloatVec2([v[0], v[1]])
            }
            ParamKind::FloatVec3 => {
                let v = floats()?;
                ParamValue::FloatVec3([v[0], v[1], v[2]])
            }
            ParamKind::FloatVec4 => {
                let v = floats()?;
                ParamValue::FloatVec4([v[0], v[1], v[2], v[3]])
            }
            ParamKind::IntVec2 => {
                let v = ints()?;
                ParamValue::IntVec2([v[0], v[1]])
            }
            ParamKind::IntVec3 => {
                let v = ints()?;
                ParamValue::IntVec3([v[0], v[1], v[2]])
            }
            ParamKind::IntVec4 => {
                let v = ints()?;
                ParamValue::IntVec4([v[0], v[1], v[2], v[3]])
            }
            ParamKind::Sampler2D => {
                let unit = parts[0]
                    .parse::<u32>()
                    .map_err(|err| invalid(format!("'{}': {err}", parts[0])))?;
                if unit > TextureUnit::MAX.0 {
                    return Err(invalid(format!(
                        "texture unit {unit} exceeds {}",
                        TextureUnit::MAX.0
                    )));
                }
                ParamValue::Sampler2D(TextureUnit(unit))
            }
        };
        Ok(value)
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
            f.write_str("(")?;
            for (index, item) in items.iter().enumerate() {
                if index > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{item}")?;
            }
            f.write_str(")")
        }

        match self {
            ParamValue::Float(v) => write!(f, "{v}"),
            ParamValue::Int(v) => write!(f, "{v}"),
            ParamValue::Bool(v) => write!(f, "{v}"),
            ParamValue::FloatVec2(v) => list(f, v),
            ParamValue::FloatVec3(v) => list(f, v),
            ParamValue::FloatVec4(v) => list(f, v),
            ParamValue::IntVec2(v) => list(f, v),
            ParamValue::IntVec3(v) => list(f, v),
            ParamValue::IntVec4(v) => list(f, v),
            ParamValue::Sampler2D(unit) => write!(f, "unit {}", unit.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid {kind} value '{input}': {reason}")]
pub struct ParseValueError {
    pub kind: ParamKind,
    pub input: String,
    pub reason: String,
}

/// Rust representation of one uniform kind.
pub trait UniformValue: Copy {
    const KIND: ParamKind;

    fn into_param(self) -> ParamValue;
}

macro_rules! uniform_value {
    ($ty:ty, $kind:ident) => {
        impl UniformValue for $ty {
            const KIND: ParamKind = ParamKind::$kind;

            fn into_param(self) -> ParamValue {
                ParamValue::$kind(self)
            }
        }

        impl From<$ty> for ParamValue {
            fn from(value: $ty) -> Self {
                ParamValue::$kind(value)
            }
        }
    };
}

uniform_value!(f32, Float);
uniform_value!(i32, Int);
uniform_value!(bool, Bool);
uniform_value!([f32; 2], FloatVec2);
uniform_value!([f32; 3], FloatVec3);
uniform_value!([f32; 4], FloatVec4);
uniform_value!([i32; 2], IntVec2);
uniform_value!([i32; 3], IntVec3);
uniform_value!([i32; 4], IntVec4);
uniform_value!(TextureUnit, Sampler2D);

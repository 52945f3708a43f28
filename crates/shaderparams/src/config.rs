//! TOML declarations of a parameter table.
//!
//! ```toml
//! version = 1
//! label = "background"
//! debug = false
//!
//! [params.u_time]
//! type = "float"
//! value = 0.0
//!
//! [params.u_color]
//! type = "vec3"
//! value = [1.0, 1.0, 1.0]
//! ```
//!
//! `value` may be omitted, in which case the kind's zero value is used.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::binding::UniformBinding;
use crate::kind::{ParamKind, ParamValue, TextureUnit};
use crate::table::{ParameterTable, TableOptions};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse parameter declarations: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid parameter declarations: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ParamsConfig {
    pub version: u32,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub debug: bool,
    #[serde(default)]
    pub params: BTreeMap<String, ParamDecl>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ParamDecl {
    #[serde(rename = "type")]
    pub kind: ParamKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<RawValue>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum RawValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    List(Vec<RawScalar>),
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum RawScalar {
    Int(i64),
    Float(f64),
}

impl RawScalar {
    fn as_f32(self) -> f32 {
        match self {
            RawScalar::Int(v) => v as f32,
            RawScalar::Float(v) => v as f32,
        }
    }

    fn as_i32(self) -> Option<i32> {
        match self {
            RawScalar::Int(v) => i32::try_from(v).ok(),
            RawScalar::Float(_) => None,
        }
    }
}

impl RawValue {
    /// Converts a declared value to the shape `kind` requires.
    pub fn to_param(&self, kind: ParamKind) -> Result<ParamValue, String> {
        let scalars: Vec<RawScalar> = match self {
            RawValue::Bool(flag) => {
                return match kind {
                    ParamKind::Bool => Ok(ParamValue::Bool(*flag)),
                    _ => Err(format!("boolean value does not fit type {kind}")),
                };
            }
            RawValue::Int(v) => vec![RawScalar::Int(*v)],
            RawValue::Float(v) => vec![RawScalar::Float(*v)],
            RawValue::List(items) => items.clone(),
        };

        if matches!(self, RawValue::List(_)) == (kind.components() == 1) {
            return Err(format!(
                "type {kind} expects {}",
                if kind.components() == 1 {
                    "a scalar".to_string()
                } else {
                    format!("an array of {} numbers", kind.components())
                }
            ));
        }
        if scalars.len() != kind.components() {
            return Err(format!(
                "type {kind} expects {} components, found {}",
                kind.components(),
                scalars.len()
            ));
        }

        let floats: Vec<f32> = scalars.iter().map(|s| s.as_f32()).collect();
        let ints = || -> Result<Vec<i32>, String> {
            scalars
                .iter()
                .map(|s| {
                    s.as_i32()
                        .ok_or_else(|| format!("type {kind} expects 32-bit integer components"))
                })
                .collect()
        };

        let value = match kind {
            ParamKind::Float => ParamValue::Float(floats[0]),
            ParamKind::Int => ParamValue::Int(ints()?[0]),
            ParamKind::Bool => {
                return Err("type bool expects true or false".to_string());
            }
            ParamKind::FloatVec2 => ParamValue::FloatVec2([floats[0], floats[1]]),
            ParamKind::FloatVec3 => ParamValue::FloatVec3([floats[0], floats[1], floats[2]]),
            ParamKind::FloatVec4 => {
                ParamValue::FloatVec4([floats[0], floats[1], floats[2], floats[3]])
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
                let unit = ints()?[0];
                let unit = u32::try_from(unit)
                    .map_err(|_| "sampler2D texture unit must be non-negative".to_string())?;
                ParamValue::Sampler2D(TextureUnit(unit))
            }
        };
        Ok(value)
    }
}

impl ParamDecl {
    pub fn initial_value(&self) -> Result<ParamValue, String> {
        match &self.value {
            Some(raw) => raw.to_param(self.kind),
            None => Ok(self.kind.zero()),
        }
    }
}

impl ParamsConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: ParamsConfig = toml::from_str(input)?;
        raw.validate()?;
        Ok(raw)
    }

    pub fn options(&self) -> TableOptions {
        TableOptions {
            label: self.label.clone(),
            debug: self.debug,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != 1 {
            return Err(ConfigError::Invalid(format!(
                "unsupported version {}; expected 1",
                self.version
            )));
        }

        for (name, decl) in &self.params {
            validate_name(name)?;
            decl.initial_value()
                .map_err(|reason| ConfigError::Invalid(format!("parameter '{name}': {reason}")))?;
        }
        Ok(())
    }

    /// Builds a table declaring every parameter with its initial value.
    pub fn to_table<B: UniformBinding>(&self) -> Result<ParameterTable<B>, ConfigError> {
        self.validate()?;
        let mut builder = ParameterTable::<B>::builder().options(self.options());
        for (name, decl) in &self.params {
            let value = decl
                .initial_value()
                .map_err(|reason| ConfigError::Invalid(format!("parameter '{name}': {reason}")))?;
            builder = builder.declare(name.clone(), value);
        }
        Ok(builder.build())
    }
}

fn validate_name(name: &str) -> Result<(), ConfigError> {
    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .is_some_and(|ch| ch.is_ascii_alphabetic() || ch == '_');
    if !valid_start || !chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_') {
        return Err(ConfigError::Invalid(format!(
            "parameter name '{name}' is not a GLSL identifier"
        )));
    }
    if name.starts_with("gl_") {
        return Err(ConfigError::Invalid(format!(
            "parameter name '{name}' uses the reserved gl_ prefix"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::RecordingBinding;

    const SAMPLE: &str = r#"
version = 1
label = "background"
debug = true

[params.u_time]
type = "float"
value = 0

[params.u_color]
type = "vec3"
value = [1.0, 0.5, 0]

[params.u_grid]
type = "ivec2"
value = [16, 9]

[params.u_enabled]
type = "bool"
value = true

[params.u_texture]
type = "sampler2D"
value = 1

[params.u_offset]
type = "vec2"
"#;

    #[test]
    fn parses_sample_declarations() {
        let config = ParamsConfig::from_toml_str(SAMPLE).expect("parse config");
        assert_eq!(config.params.len(), 6);
        assert_eq!(config.options(), TableOptions::debug("background"));

        let table: ParameterTable<RecordingBinding> = config.to_table().unwrap();
        assert_eq!(table.get("u_time").unwrap().value, ParamValue::Float(0.0));
        assert_eq!(
            table.get("u_color").unwrap().value,
            ParamValue::FloatVec3([1.0, 0.5, 0.0])
        );
        assert_eq!(table.get("u_grid").unwrap().value, ParamValue::IntVec2([16, 9]));
        assert_eq!(table.get("u_enabled").unwrap().value, ParamValue::Bool(true));
        assert_eq!(
            table.get("u_texture").unwrap().value,
            ParamValue::Sampler2D(TextureUnit(1))
        );
        assert_eq!(
            table.get("u_offset").unwrap().value,
            ParamValue::FloatVec2([0.0, 0.0])
        );
    }

    #[test]
    fn rejects_unknown_version() {
        let err = ParamsConfig::from_toml_str("version = 2").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_unknown_type() {
        let err = ParamsConfig::from_toml_str(
            r#"
version = 1
[params.u_mvp]
type = "mat4"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn rejects_shape_mismatch() {
        let err = ParamsConfig::from_toml_str(
            r#"
version = 1
[params.u_color]
type = "vec3"
value = [1.0, 1.0]
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(message) if message.contains("u_color")));

        let err = ParamsConfig::from_toml_str(
            r#"
version = 1
[params.u_count]
type = "int"
value = 1.5
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = ParamsConfig::from_toml_str(
            r#"
version = 1
[params.u_scale]
type = "float"
value = [1.0]
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_invalid_names() {
        for name in ["1abc", "gl_Position", "with-dash"] {
            let config = format!("version = 1\n[params.\"{name}\"]\ntype = \"float\"\n");
            let err = ParamsConfig::from_toml_str(&config).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid(_)), "{name}");
        }
    }
}

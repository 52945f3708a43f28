//! The uniform parameter table and its builder.
//!
//! A `ParameterTable` owns one entry per declared uniform: its current value
//! (which fixes the kind for the lifetime of the table) and the location it
//! resolved to inside the most recently linked program. The renderer drives
//! it in two steps:
//!
//! - `resolve_all` after every program (re)link, which looks each name up
//!   through the `UniformBinding` and caches the result;
//! - `push` once per frame, which writes every resolved value with the
//!   kind-specific setter.
//!
//! Updates for names the table never declared, and pushes for names the
//! current program does not use, are silently ignored so a host can drive a
//! superset of parameters without knowing which shader is active.
use std::collections::BTreeMap;
use std::fmt;

use crate::binding::UniformBinding;
use crate::kind::{ParamKind, ParamValue, TextureUnit, UniformValue};

/// Per-instance settings for a table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableOptions {
    /// Name used in log events, handy when several views run side by side.
    pub label: Option<String>,
    /// Emit `debug` events for resolution, pushes and ignored updates.
    pub debug: bool,
}

impl TableOptions {
    pub fn debug(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            debug: true,
        }
    }

    fn label(&self) -> &str {
        self.label.as_deref().unwrap_or("shader-params")
    }
}

/// Where a parameter lives inside the program it was last resolved against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location<L> {
    /// Never resolved.
    Unresolved,
    /// Resolved, but the program does not declare the uniform.
    NotFound,
    Found(L),
}

impl<L> Location<L> {
    pub fn found(&self) -> Option<&L> {
        match self {
            Location::Found(location) => Some(location),
            _ => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Location::Found(_))
    }
}

struct Entry<L> {
    value: ParamValue,
    location: Location<L>,
}

/// Read-only view of one declared parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterView<'a, L> {
    pub kind: ParamKind,
    pub value: ParamValue,
    pub location: &'a Location<L>,
}

pub struct ParameterTable<B: UniformBinding> {
    entries: BTreeMap<String, Entry<B::Location>>,
    program: Option<B::Program>,
    options: TableOptions,
}

impl<B: UniformBinding> ParameterTable<B> {
    pub fn builder() -> ParameterTableBuilder<B> {
        ParameterTableBuilder::new()
    }

    pub fn options(&self) -> &TableOptions {
        &self.options
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn get(&self, name: &str) -> Option<ParameterView<'_, B::Location>> {
        self.entries.get(name).map(|entry| ParameterView {
            kind: entry.value.kind(),
            value: entry.value,
            location: &entry.location,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, ParameterView<'_, B::Location>)> {
        self.entries.iter().map(|(name, entry)| {
            (
                name.as_str(),
                ParameterView {
                    kind: entry.value.kind(),
                    value: entry.value,
                    location: &entry.location,
                },
            )
        })
    }

    /// Program the table was last fully resolved against via `resolve_all`.
    pub fn resolved_program(&self) -> Option<B::Program> {
        self.program
    }

    /// `false` means the cached locations belong to some other program and a
    /// `resolve_all` is required before the next `push`.
    pub fn is_resolved_for(&self, program: B::Program) -> bool {
        self.program == Some(program)
    }

    /// Replaces the value of `name`. Unknown names and values whose kind
    /// differs from the declared one are ignored.
    pub fn update<V: UniformValue>(&mut self, name: &str, value: V) {
        self.update_value(name, value.into_param());
    }

    /// Dynamically typed variant of [`update`](Self::update).
    pub fn update_value(&mut self, name: &str, value: ParamValue) {
        let Some(entry) = self.entries.get_mut(name) else {
            if self.options.debug {
                tracing::debug!(
                    table = self.options.label(),
                    name,
                    "ignoring update for undeclared parameter"
                );
            }
            return;
        };

        let declared = entry.value.kind();
        if declared != value.kind() {
            if self.options.debug {
                tracing::debug!(
                    table = self.options.label(),
                    name,
                    declared = %declared,
                    supplied = %value.kind(),
                    "ignoring update with mismatched kind"
                );
            }
            return;
        }
        entry.value = value;
    }

    /// Looks `name` up in `program` and caches the result, which may be
    /// [`Location::NotFound`]. Does nothing for undeclared names.
    ///
    /// Only [`resolve_all`](Self::resolve_all) marks the table as resolved
    /// for a program. Resolving a single name against a program other than
    /// the one the table was resolved for clears that mark, since the other
    /// entries still point into the previous program.
    pub fn resolve_location(&mut self, binding: &B, name: &str, program: B::Program) {
        let Some(entry) = self.entries.get_mut(name) else {
            return;
        };
        if self.program.is_some_and(|resolved| resolved != program) {
            self.program = None;
        }
        entry.location = match binding.uniform_location(program, name) {
            Some(location) => Location::Found(location),
            None => Location::NotFound,
        };
        if self.options.debug {
            tracing::debug!(
                table = self.options.label(),
                name,
                program = ?program,
                location = ?entry.location,
                "resolved uniform location"
            );
        }
    }

    /// Resolves every declared parameter against a freshly linked program.
    pub fn resolve_all(&mut self, binding: &B, program: B::Program) {
        let names: Vec<String> = self.entries.keys().cloned().collect();
        for name in &names {
            self.resolve_location(binding, name, program);
        }
        self.program = Some(program);

        if self.options.debug {
            let found = self
                .entries
                .values()
                .filter(|entry| entry.location.is_found())
                .count();
            tracing::debug!(
                table = self.options.label(),
                program = ?program,
                declared = self.entries.len(),
                found,
                "resolved parameter table"
            );
        }
    }

    /// Writes every resolved value to the program in use and returns how
    /// many uniforms were set.
    pub fn push(&self, binding: &B) -> usize {
        let mut pushed = 0;
        for (name, entry) in &self.entries {
            let Some(location) = entry.location.found() else {
                continue;
            };
            match entry.value {
                ParamValue::Float(v) => binding.set_float(location, v),
                ParamValue::Int(v) => binding.set_int(location, v),
                ParamValue::Bool(v) => binding.set_bool(location, v),
                ParamValue::FloatVec2(v) => binding.set_float_vec2(location, v),
                ParamValue::FloatVec3(v) => binding.set_float_vec3(location, v),
                ParamValue::FloatVec4(v) => binding.set_float_vec4(location, v),
                ParamValue::IntVec2(v) => binding.set_int_vec2(location, v),
                ParamValue::IntVec3(v) => binding.set_int_vec3(location, v),
                ParamValue::IntVec4(v) => binding.set_int_vec4(location, v),
                ParamValue::Sampler2D(unit) => binding.set_sampler(location, unit),
            }
            if self.options.debug {
                tracing::trace!(
                    table = self.options.label(),
                    name = name.as_str(),
                    value = %entry.value,
                    "pushed uniform"
                );
            }
            pushed += 1;
        }
        pushed
    }
}

impl<B: UniformBinding> fmt::Debug for ParameterTable<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (name, entry) in &self.entries {
            map.entry(name, &(entry.value, &entry.location));
        }
        map.finish()
    }
}

/// Declares the schema of a [`ParameterTable`].
///
/// Declaring the same name twice keeps the second declaration, kind and
/// initial value alike.
pub struct ParameterTableBuilder<B: UniformBinding> {
    entries: BTreeMap<String, Entry<B::Location>>,
    options: TableOptions,
}

impl<B: UniformBinding> Default for ParameterTableBuilder<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: UniformBinding> ParameterTableBuilder<B> {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            options: TableOptions::default(),
        }
    }

    pub fn options(mut self, options: TableOptions) -> Self {
        self.options = options;
        self
    }

    pub fn add<V: UniformValue>(self, name: impl Into<String>, value: V) -> Self {
        self.declare(name, value.into_param())
    }

    pub fn declare(mut self, name: impl Into<String>, value: ParamValue) -> Self {
        self.entries.insert(
            name.into(),
            Entry {
                value,
                location: Location::Unresolved,
            },
        );
        self
    }

    pub fn add_float(self, name: impl Into<String>, value: f32) -> Self {
        self.add(name, value)
    }

    pub fn add_int(self, name: impl Into<String>, value: i32) -> Self {
        self.add(name, value)
    }

    pub fn add_bool(self, name: impl Into<String>, value: bool) -> Self {
        self.add(name, value)
    }

    pub fn add_vec2(self, name: impl Into<String>, value: [f32; 2]) -> Self {
        self.add(name, value)
    }

    pub fn add_vec3(self, name: impl Into<String>, value: [f32; 3]) -> Self {
        self.add(name, value)
    }

    pub fn add_vec4(self, name: impl Into<String>, value: [f32; 4]) -> Self {
        self.add(name, value)
    }

    pub fn add_ivec2(self, name: impl Into<String>, value: [i32; 2]) -> Self {
        self.add(name, value)
    }

    pub fn add_ivec3(self, name: impl Into<String>, value: [i32; 3]) -> Self {
        self.add(name, value)
    }

    pub fn add_ivec4(self, name: impl Into<String>, value: [i32; 4]) -> Self {
        self.add(name, value)
    }

    pub fn add_sampler(self, name: impl Into<String>, unit: u32) -> Self {
        self.add(name, TextureUnit(unit))
    }

    pub fn build(self) -> ParameterTable<B> {
        ParameterTable {
            entries: self.entries,
            program: None,
            options: self.options,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::{RecordingBinding, UniformCall};

    const TIME_ONLY: &str = "uniform float u_time;\nvoid main() {}";

    fn scenario_table() -> ParameterTable<RecordingBinding> {
        ParameterTable::builder()
            .add_float("u_time", 0.0)
            .add_vec3("u_color", [1.0, 1.0, 1.0])
            .build()
    }

    fn pushed_values(calls: &[UniformCall]) -> Vec<(&str, ParamValue)> {
        calls
            .iter()
            .map(|call| (call.name.as_str(), call.value))
            .collect()
    }

    #[test]
    fn pushes_only_uniforms_the_program_declares() {
        let mut gl = RecordingBinding::new();
        let program = gl.link([TIME_ONLY]);

        let mut table = scenario_table();
        table.update("u_time", 2.5_f32);
        table.resolve_all(&gl, program);

        assert_eq!(table.push(&gl), 1);
        let calls = gl.take_calls();
        assert_eq!(pushed_values(&calls), vec![("u_time", ParamValue::Float(2.5))]);
        assert_eq!(
            table.get("u_color").map(|view| view.location.clone()),
            Some(Location::NotFound)
        );
    }

    #[test]
    fn update_round_trips_through_push_for_every_kind() {
        let source = "\
uniform float f; uniform int i; uniform bool b;
uniform vec2 v2; uniform vec3 v3; uniform vec4 v4;
uniform ivec2 i2; uniform ivec3 i3; uniform ivec4 i4;
uniform sampler2D tex;";
        let mut gl = RecordingBinding::new();
        let program = gl.link([source]);

        let mut table: ParameterTable<RecordingBinding> = ParameterTable::builder()
            .add_float("f", 0.0)
            .add_int("i", 0)
            .add_bool("b", false)
            .add_vec2("v2", [0.0; 2])
            .add_vec3("v3", [0.0; 3])
            .add_vec4("v4", [0.0; 4])
            .add_ivec2("i2", [0; 2])
            .add_ivec3("i3", [0; 3])
            .add_ivec4("i4", [0; 4])
            .add_sampler("tex", 0)
            .build();
        table.resolve_all(&gl, program);

        let updates = [
            ("f", ParamValue::Float(1.25)),
            ("i", ParamValue::Int(-7)),
            ("b", ParamValue::Bool(true)),
            ("v2", ParamValue::FloatVec2([1.0, 2.0])),
            ("v3", ParamValue::FloatVec3([1.0, 2.0, 3.0])),
            ("v4", ParamValue::FloatVec4([1.0, 2.0, 3.0, 4.0])),
            ("i2", ParamValue::IntVec2([1, 2])),
            ("i3", ParamValue::IntVec3([1, 2, 3])),
            ("i4", ParamValue::IntVec4([1, 2, 3, 4])),
            ("tex", ParamValue::Sampler2D(TextureUnit(3))),
        ];
        for (name, value) in updates {
            table.update_value(name, value);
        }

        assert_eq!(table.push(&gl), updates.len());
        let calls = gl.take_calls();
        for (name, value) in updates {
            let call = calls.iter().find(|call| call.name == name).unwrap();
            assert_eq!(call.value, value, "uniform {name}");
        }
    }

    #[test]
    fn unknown_name_update_is_a_no_op() {
        let mut table = scenario_table();
        let before = format!("{table:?}");
        table.update("u_missing", 4.0_f32);
        table.update_value("u_other", ParamValue::IntVec2([1, 2]));
        assert_eq!(format!("{table:?}"), before);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn mismatched_kind_update_keeps_declared_value() {
        let mut table = scenario_table();
        table.update("u_time", 3_i32);
        table.update("u_color", [0.0_f32, 0.0]);
        let time = table.get("u_time").unwrap();
        assert_eq!(time.kind, ParamKind::Float);
        assert_eq!(time.value, ParamValue::Float(0.0));
        assert_eq!(
            table.get("u_color").unwrap().value,
            ParamValue::FloatVec3([1.0, 1.0, 1.0])
        );
    }

    #[test]
    fn update_keeps_location() {
        let mut gl = RecordingBinding::new();
        let program = gl.link([TIME_ONLY]);
        let mut table = scenario_table();
        table.resolve_all(&gl, program);
        let before = table.get("u_time").unwrap().location.clone();
        table.update("u_time", 9.0_f32);
        assert_eq!(table.get("u_time").unwrap().location, &before);
    }

    #[test]
    fn push_before_resolution_sets_nothing() {
        let gl = RecordingBinding::new();
        let table = scenario_table();
        assert_eq!(table.push(&gl), 0);
        assert!(gl.calls().is_empty());
        assert_eq!(
            table.get("u_time").unwrap().location,
            &Location::Unresolved
        );
    }

    #[test]
    fn relink_without_resolution_is_detectable() {
        let mut gl = RecordingBinding::new();
        let first = gl.link([TIME_ONLY]);
        let mut table = scenario_table();
        table.resolve_all(&gl, first);
        let stale = table.get("u_time").unwrap().location.clone();

        let second = gl.link([TIME_ONLY]);
        assert!(table.is_resolved_for(first));
        assert!(!table.is_resolved_for(second));

        table.push(&gl);
        let calls = gl.take_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].location.program, first);

        table.resolve_all(&gl, second);
        let fresh = table.get("u_time").unwrap().location.clone();
        assert_ne!(stale, fresh);
        assert!(table.is_resolved_for(second));

        table.push(&gl);
        assert_eq!(gl.take_calls()[0].location.program, second);
    }

    #[test]
    fn resolve_location_ignores_undeclared_names() {
        let mut gl = RecordingBinding::new();
        let program = gl.link(["uniform float u_extra;"]);
        let mut table = scenario_table();
        table.resolve_location(&gl, "u_extra", program);
        assert!(!table.contains("u_extra"));
        assert_eq!(table.resolved_program(), None);
    }

    #[test]
    fn single_name_resolution_against_new_program_clears_resolved_mark() {
        let mut gl = RecordingBinding::new();
        let first = gl.link([TIME_ONLY]);
        let mut table = scenario_table();
        table.resolve_all(&gl, first);

        table.resolve_location(&gl, "u_time", first);
        assert!(table.is_resolved_for(first));

        let second = gl.link([TIME_ONLY]);
        table.resolve_location(&gl, "u_time", second);
        assert!(!table.is_resolved_for(first));
        assert!(!table.is_resolved_for(second));
        assert_eq!(table.resolved_program(), None);

        table.resolve_all(&gl, second);
        assert!(table.is_resolved_for(second));
    }

    #[test]
    fn builder_keeps_last_declaration() {
        let table: ParameterTable<RecordingBinding> = ParameterTable::builder()
            .add_float("u_mix", 0.5)
            .add_ivec2("u_mix", [4, 2])
            .build();
        assert_eq!(table.len(), 1);
        let view = table.get("u_mix").unwrap();
        assert_eq!(view.kind, ParamKind::IntVec2);
        assert_eq!(view.value, ParamValue::IntVec2([4, 2]));
    }

    #[test]
    fn names_are_listed() {
        let table = scenario_table();
        let names: Vec<&str> = table.names().collect();
        assert_eq!(names, vec!["u_color", "u_time"]);
        assert!(!table.is_empty());
    }

    #[test]
    fn debug_options_do_not_change_behaviour() {
        let mut gl = RecordingBinding::new();
        let program = gl.link([TIME_ONLY]);
        let mut table: ParameterTable<RecordingBinding> = ParameterTable::builder()
            .options(TableOptions::debug("preview"))
            .add_float("u_time", 1.0)
            .build();
        assert!(table.options().debug);
        table.update("u_unknown", true);
        table.resolve_all(&gl, program);
        assert_eq!(table.push(&gl), 1);
    }
}

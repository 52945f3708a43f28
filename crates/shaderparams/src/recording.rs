//! In-memory `UniformBinding` that needs no graphics context.
//!
//! `RecordingBinding::link` stands in for compiling and linking: it reflects
//! the uniform declarations out of the GLSL sources and hands out a program
//! id plus one location per declared uniform. Ids and locations are never
//! reused, so a relinked program always resolves to fresh locations. Every
//! setter call is appended to a log that callers can inspect or drain.
use std::cell::RefCell;
use std::fmt;

use crate::binding::UniformBinding;
use crate::kind::{ParamValue, TextureUnit};
use crate::reflect::{declared_uniforms, DeclaredUniform};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProgramId(pub u32);

impl fmt::Display for ProgramId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "program#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordedLocation {
    pub program: ProgramId,
    pub slot: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UniformCall {
    pub location: RecordedLocation,
    /// Name the location was handed out for.
    pub name: String,
    pub value: ParamValue,
}

#[derive(Debug)]
struct LinkedProgram {
    id: ProgramId,
    first_slot: u32,
    uniforms: Vec<DeclaredUniform>,
}

#[derive(Debug, Default)]
pub struct RecordingBinding {
    programs: Vec<LinkedProgram>,
    next_slot: u32,
    calls: RefCell<Vec<UniformCall>>,
}

impl RecordingBinding {
    pub fn new() -> Self {
        Self::default()
    }

    /// "Links" the given shader stages into a new program.
    ///
    /// A name declared by several stages gets a single location.
    pub fn link<'a>(&mut self, sources: impl IntoIterator<Item = &'a str>) -> ProgramId {
        let mut uniforms: Vec<DeclaredUniform> = Vec::new();
        for source in sources {
            for uniform in declared_uniforms(source) {
                if uniforms.iter().all(|known| known.name != uniform.name) {
                    uniforms.push(uniform);
                }
            }
        }

        let id = ProgramId(self.programs.len() as u32 + 1);
        let first_slot = self.next_slot;
        self.next_slot += uniforms.len() as u32;
        tracing::trace!(program = %id, uniforms = uniforms.len(), "linked recording program");
        self.programs.push(LinkedProgram {
            id,
            first_slot,
            uniforms,
        });
        id
    }

    /// Uniforms the program declares, or an empty slice for unknown ids.
    pub fn declared(&self, program: ProgramId) -> &[DeclaredUniform] {
        self.program(program)
            .map(|linked| linked.uniforms.as_slice())
            .unwrap_or_default()
    }

    pub fn calls(&self) -> Vec<UniformCall> {
        self.calls.borrow().clone()
    }

    pub fn take_calls(&self) -> Vec<UniformCall> {
        self.calls.take()
    }

    fn program(&self, program: ProgramId) -> Option<&LinkedProgram> {
        self.programs.iter().find(|linked| linked.id == program)
    }

    fn name_of(&self, location: &RecordedLocation) -> String {
        self.program(location.program)
            .and_then(|linked| {
                let index = location.slot.checked_sub(linked.first_slot)? as usize;
                linked.uniforms.get(index)
            })
            .map(|uniform| uniform.name.clone())
            .unwrap_or_default()
    }

    fn record(&self, location: &RecordedLocation, value: ParamValue) {
        let call = UniformCall {
            location: *location,
            name: self.name_of(location),
            value,
        };
        self.calls.borrow_mut().push(call);
    }
}

impl UniformBinding for RecordingBinding {
    type Program = ProgramId;
    type Location = RecordedLocation;

    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<RecordedLocation> {
        let linked = self.program(program)?;
        let index = linked
            .uniforms
            .iter()
            .position(|uniform| uniform.name == name)?;
        Some(RecordedLocation {
            program,
            slot: linked.first_slot + index as u32,
        })
    }

    fn set_float(&self, location: &RecordedLocation, value: f32) {
        self.record(location, ParamValue::Float(value));
    }

    fn set_float_vec2(&self, location: &RecordedLocation, value: [f32; 2]) {
        self.record(location, ParamValue::FloatVec2(value));
    }

    fn set_float_vec3(&self, location: &RecordedLocation, value: [f32; 3]) {
        self.record(location, ParamValue::FloatVec3(value));
    }

    fn set_float_vec4(&self, location: &RecordedLocation, value: [f32; 4]) {
        self.record(location, ParamValue::FloatVec4(value));
    }

    fn set_int(&self, location: &RecordedLocation, value: i32) {
        self.record(location, ParamValue::Int(value));
    }

    fn set_int_vec2(&self, location: &RecordedLocation, value: [i32; 2]) {
        self.record(location, ParamValue::IntVec2(value));
    }

    fn set_int_vec3(&self, location: &RecordedLocation, value: [i32; 3]) {
        self.record(location, ParamValue::IntVec3(value));
    }

    fn set_int_vec4(&self, location: &RecordedLocation, value: [i32; 4]) {
        self.record(location, ParamValue::IntVec4(value));
    }

    fn set_bool(&self, location: &RecordedLocation, value: bool) {
        self.record(location, ParamValue::Bool(value));
    }

    fn set_sampler(&self, location: &RecordedLocation, unit: TextureUnit) {
        if unit.as_gl_int().is_some() {
            self.record(location, ParamValue::Sampler2D(unit));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_uniforms_get_one_location() {
        let mut gl = RecordingBinding::new();
        let program = gl.link([
            "uniform vec2 u_resolution; uniform float u_time;",
            "uniform float u_time; uniform vec4 u_tint;",
        ]);
        assert_eq!(gl.declared(program).len(), 3);
        assert!(gl.uniform_location(program, "u_tint").is_some());
        assert!(gl.uniform_location(program, "u_missing").is_none());
    }

    #[test]
    fn relinking_never_reuses_locations() {
        let mut gl = RecordingBinding::new();
        let first = gl.link(["uniform float u_time;"]);
        let second = gl.link(["uniform float u_time;"]);
        assert_ne!(first, second);
        assert_ne!(
            gl.uniform_location(first, "u_time"),
            gl.uniform_location(second, "u_time")
        );
        assert!(gl.declared(ProgramId(99)).is_empty());
    }

    #[test]
    fn records_calls_with_names() {
        let mut gl = RecordingBinding::new();
        let program = gl.link(["uniform bool u_flag;"]);
        let location = gl.uniform_location(program, "u_flag").unwrap();
        gl.set_bool(&location, true);
        let calls = gl.take_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].name, "u_flag");
        assert_eq!(calls[0].value, ParamValue::Bool(true));
        assert!(gl.calls().is_empty());
    }

    #[test]
    fn out_of_range_sampler_unit_is_not_written() {
        let mut gl = RecordingBinding::new();
        let program = gl.link(["uniform sampler2D u_texture;"]);
        let location = gl.uniform_location(program, "u_texture").unwrap();
        gl.set_sampler(&location, TextureUnit(u32::MAX));
        assert!(gl.calls().is_empty());
        gl.set_sampler(&location, TextureUnit::MAX);
        assert_eq!(gl.take_calls()[0].value, ParamValue::Sampler2D(TextureUnit::MAX));
    }

    #[test]
    fn links_uniforms_declared_after_helper_functions() {
        use crate::table::ParameterTable;

        let mut gl = RecordingBinding::new();
        let program =
            gl.link(["float helper() { return 1.0; }\nuniform float u_late;\nvoid main() {}"]);
        assert_eq!(gl.declared(program).len(), 1);

        let mut table: ParameterTable<RecordingBinding> =
            ParameterTable::builder().add_float("u_late", 2.5).build();
        table.resolve_all(&gl, program);
        assert_eq!(table.push(&gl), 1);
        assert_eq!(gl.take_calls()[0].value, ParamValue::Float(2.5));
    }
}

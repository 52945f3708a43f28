//! Per-frame handshake between a host view, its linked program and the
//! parameter table.
//!
//! The host tells the driver when a program has been (re)linked and when the
//! parameter set is replaced; `draw_frame` takes care of re-resolving
//! locations before the next push so a relink can never leave stale
//! locations in use.
use crate::binding::UniformBinding;
use crate::table::ParameterTable;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DriverError {
    #[error("no shader program is attached; link one before drawing")]
    NoProgram,
}

pub struct ShaderDriver<B: UniformBinding> {
    params: Option<ParameterTable<B>>,
    program: Option<B::Program>,
    needs_resolve: bool,
    frames: u64,
}

impl<B: UniformBinding> Default for ShaderDriver<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: UniformBinding> ShaderDriver<B> {
    pub fn new() -> Self {
        Self {
            params: None,
            program: None,
            needs_resolve: false,
            frames: 0,
        }
    }

    pub fn with_params(params: ParameterTable<B>) -> Self {
        let mut driver = Self::new();
        driver.set_params(params);
        driver
    }

    /// Records a newly linked program. Locations are re-resolved on the next
    /// frame.
    pub fn attach_program(&mut self, program: B::Program) {
        tracing::debug!(program = ?program, "attached shader program");
        self.program = Some(program);
        self.needs_resolve = true;
    }

    /// Forgets the current program, e.g. once the surface is destroyed and
    /// the program released. Returns the handle that was attached.
    pub fn detach_program(&mut self) -> Option<B::Program> {
        self.needs_resolve = self.params.is_some();
        self.program.take()
    }

    /// Replaces the parameter table, returning the previous one.
    pub fn set_params(&mut self, params: ParameterTable<B>) -> Option<ParameterTable<B>> {
        self.needs_resolve = true;
        self.params.replace(params)
    }

    pub fn params(&self) -> Option<&ParameterTable<B>> {
        self.params.as_ref()
    }

    pub fn params_mut(&mut self) -> Option<&mut ParameterTable<B>> {
        self.params.as_mut()
    }

    pub fn program(&self) -> Option<B::Program> {
        self.program
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Draws one frame's worth of uniforms.
    ///
    /// Resolves locations if the program or table changed since the last
    /// frame, hands the table to `on_frame` for per-frame updates, then
    /// pushes. Returns the number of uniforms written.
    pub fn draw_frame<F>(&mut self, binding: &B, on_frame: F) -> Result<usize, DriverError>
    where
        F: FnOnce(&mut ParameterTable<B>),
    {
        let program = self.program.ok_or(DriverError::NoProgram)?;
        let Some(params) = self.params.as_mut() else {
            self.frames += 1;
            return Ok(0);
        };

        if self.needs_resolve || !params.is_resolved_for(program) {
            params.resolve_all(binding, program);
            self.needs_resolve = false;
        }

        on_frame(params);
        let pushed = params.push(binding);
        self.frames += 1;
        Ok(pushed)
    }
}

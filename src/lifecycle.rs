//! Generation lifecycle.
//!
//! A generator runs a fixed sequence of phases. Each phase is a stage holding
//! an ordered list of named steps. Customizations splice their own steps
//! into the base step lists instead of overriding whole phases.

use crate::error::{Error, Result};
use log::debug;

/// Lifecycle phases, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    Initializing,
    Prompting,
    Configuring,
    Default,
    Writing,
    Install,
    End,
}

impl Phase {
    pub const ALL: [Phase; 7] = [
        Phase::Initializing,
        Phase::Prompting,
        Phase::Configuring,
        Phase::Default,
        Phase::Writing,
        Phase::Install,
        Phase::End,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Phase::Initializing => "initializing",
            Phase::Prompting => "prompting",
            Phase::Configuring => "configuring",
            Phase::Default => "default",
            Phase::Writing => "writing",
            Phase::Install => "install",
            Phase::End => "end",
        }
    }
}

/// A unit of work operating on the generator state.
pub type Step<S> = fn(&mut S) -> Result<()>;

/// Ordered, named steps of one phase.
pub struct Stage<S> {
    phase: Phase,
    steps: Vec<(&'static str, Step<S>)>,
}

impl<S> Stage<S> {
    pub fn new(phase: Phase) -> Self {
        Self { phase, steps: Vec::new() }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Names of the steps, in execution order.
    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|(name, _)| *name).collect()
    }

    fn position(&self, name: &str) -> Result<usize> {
        self.steps.iter().position(|(step, _)| *step == name).ok_or_else(|| {
            Error::ConfigError(format!("no step '{}' in phase '{}'", name, self.phase.name()))
        })
    }

    fn ensure_unique(&self, name: &str) -> Result<()> {
        if self.steps.iter().any(|(step, _)| *step == name) {
            return Err(Error::ConfigError(format!(
                "step '{}' already exists in phase '{}'",
                name,
                self.phase.name()
            )));
        }
        Ok(())
    }

    /// Appends a step.
    pub fn step(mut self, name: &'static str, step: Step<S>) -> Self {
        self.steps.push((name, step));
        self
    }

    pub fn push(&mut self, name: &'static str, step: Step<S>) -> Result<()> {
        self.ensure_unique(name)?;
        self.steps.push((name, step));
        Ok(())
    }

    pub fn prepend(&mut self, name: &'static str, step: Step<S>) -> Result<()> {
        self.ensure_unique(name)?;
        self.steps.insert(0, (name, step));
        Ok(())
    }

    pub fn insert_before(&mut self, anchor: &str, name: &'static str, step: Step<S>) -> Result<()> {
        self.ensure_unique(name)?;
        let index = self.position(anchor)?;
        self.steps.insert(index, (name, step));
        Ok(())
    }

    pub fn insert_after(&mut self, anchor: &str, name: &'static str, step: Step<S>) -> Result<()> {
        self.ensure_unique(name)?;
        let index = self.position(anchor)?;
        self.steps.insert(index + 1, (name, step));
        Ok(())
    }

    /// Swaps the implementation of an existing step, keeping its position.
    pub fn replace(&mut self, name: &str, step: Step<S>) -> Result<()> {
        let index = self.position(name)?;
        self.steps[index].1 = step;
        Ok(())
    }

    /// Runs every step in order, stopping at the first error.
    pub fn run(&self, state: &mut S) -> Result<()> {
        for (name, step) in &self.steps {
            debug!("Running {}::{}", self.phase.name(), name);
            step(state)?;
        }
        Ok(())
    }
}

/// All stages of a generator.
pub struct Lifecycle<S> {
    stages: Vec<Stage<S>>,
}

impl<S> Lifecycle<S> {
    /// Creates a lifecycle with one empty stage per phase.
    pub fn new() -> Self {
        Self { stages: Phase::ALL.iter().map(|phase| Stage::new(*phase)).collect() }
    }

    /// Sets the stage of its phase, replacing any previous one.
    pub fn with_stage(mut self, stage: Stage<S>) -> Self {
        let index = stage.phase() as usize;
        self.stages[index] = stage;
        self
    }

    pub fn stage(&self, phase: Phase) -> &Stage<S> {
        &self.stages[phase as usize]
    }

    pub fn stage_mut(&mut self, phase: Phase) -> &mut Stage<S> {
        &mut self.stages[phase as usize]
    }

    /// Runs all stages in phase order.
    pub fn run(&self, state: &mut S) -> Result<()> {
        for stage in &self.stages {
            stage.run(state)?;
        }
        Ok(())
    }
}

impl<S> Default for Lifecycle<S> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Trace(Vec<&'static str>);

    fn a(t: &mut Trace) -> Result<()> {
        t.0.push("a");
        Ok(())
    }
    fn b(t: &mut Trace) -> Result<()> {
        t.0.push("b");
        Ok(())
    }
    fn c(t: &mut Trace) -> Result<()> {
        t.0.push("c");
        Ok(())
    }
    fn fail(_: &mut Trace) -> Result<()> {
        Err(Error::ConfigError("boom".to_string()))
    }

    #[test]
    fn phases_run_in_order_regardless_of_registration() {
        let lifecycle = Lifecycle::new()
            .with_stage(Stage::new(Phase::End).step("c", c))
            .with_stage(Stage::new(Phase::Initializing).step("a", a))
            .with_stage(Stage::new(Phase::Writing).step("b", b));
        let mut trace = Trace::default();
        lifecycle.run(&mut trace).unwrap();
        assert_eq!(trace.0, vec!["a", "b", "c"]);
    }

    #[test]
    fn splicing_keeps_declared_positions() {
        let mut stage = Stage::new(Phase::Prompting).step("a", a).step("c", c);
        stage.insert_after("a", "b", b).unwrap();
        stage.prepend("first", c).unwrap();
        assert_eq!(stage.step_names(), vec!["first", "a", "b", "c"]);

        stage.insert_before("first", "zero", a).unwrap();
        assert_eq!(stage.step_names()[0], "zero");
    }

    #[test]
    fn splicing_rejects_unknown_anchor_and_duplicates() {
        let mut stage = Stage::new(Phase::Prompting).step("a", a);
        assert!(stage.insert_after("missing", "b", b).is_err());
        assert!(stage.push("a", b).is_err());
        assert_eq!(stage.step_names(), vec!["a"]);
    }

    #[test]
    fn replace_swaps_implementation() {
        let mut stage = Stage::new(Phase::Writing).step("a", a).step("b", b);
        stage.replace("a", c).unwrap();
        let mut trace = Trace::default();
        stage.run(&mut trace).unwrap();
        assert_eq!(trace.0, vec!["c", "b"]);
    }

    #[test]
    fn first_error_stops_the_run() {
        let lifecycle = Lifecycle::new()
            .with_stage(Stage::new(Phase::Configuring).step("a", a).step("fail", fail).step("b", b))
            .with_stage(Stage::new(Phase::End).step("c", c));
        let mut trace = Trace::default();
        assert!(lifecycle.run(&mut trace).is_err());
        assert_eq!(trace.0, vec!["a"]);
    }
}

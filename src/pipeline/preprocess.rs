//! Ordered, named preprocessing steps folded over a dataset

use std::collections::{HashMap, HashSet};
use std::fmt;

use polars::prelude::DataFrame;
use tracing::debug;

use super::error::{Result, TabularError};

/// A preprocessing step: takes the frame by value and returns the next one.
pub type StepFn = Box<dyn Fn(DataFrame) -> Result<DataFrame>>;

/// Registry of preprocessing steps applied in insertion order.
///
/// Step names are unique. Adding a step under a name that is already taken
/// registers it as `<name>_<n>` with the smallest counter value that is
/// still free.
#[derive(Default)]
pub struct PreprocessPipeline {
    steps: Vec<(String, StepFn)>,
    counters: HashMap<String, usize>,
    taken: HashSet<String>,
}

impl PreprocessPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a step and return the name it was stored under.
    pub fn add<F>(&mut self, name: &str, handler: F) -> String
    where
        F: Fn(DataFrame) -> Result<DataFrame> + 'static,
    {
        let registered = self.unique_name(name);
        debug!(step = %registered, "registered preprocessing step");
        self.taken.insert(registered.clone());
        self.steps.push((registered.clone(), Box::new(handler)));
        registered
    }

    /// Builder form of [`add`](Self::add).
    pub fn with_step<F>(mut self, name: &str, handler: F) -> Self
    where
        F: Fn(DataFrame) -> Result<DataFrame> + 'static,
    {
        self.add(name, handler);
        self
    }

    fn unique_name(&mut self, base: &str) -> String {
        if !self.taken.contains(base) {
            return base.to_string();
        }
        let counter = self.counters.entry(base.to_string()).or_insert(0);
        loop {
            *counter += 1;
            let candidate = format!("{}_{}", base, counter);
            if !self.taken.contains(&candidate) {
                return candidate;
            }
        }
    }

    /// Run every step in order. The first failing step aborts the run and
    /// is reported as [`TabularError::StepFailed`].
    pub fn apply(&self, df: DataFrame) -> Result<DataFrame> {
        self.steps.iter().try_fold(df, |df, (name, step)| {
            debug!(step = %name, rows = df.height(), columns = df.width(), "applying step");
            step(df).map_err(|source| TabularError::StepFailed {
                step: name.clone(),
                source: Box::new(source),
            })
        })
    }

    /// Registered step names, in execution order.
    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl fmt::Debug for PreprocessPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreprocessPipeline")
            .field("steps", &self.step_names())
            .finish()
    }
}

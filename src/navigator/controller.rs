//! The navigator: owns the current-screen belief and moves it to a target.

use super::action::{Action, ActionContext};
use super::error::{ConfigError, NavigationError};
use super::executor::{Executor, VerifyPolicy};
use super::graph::{ScreenGraph, ScreenId};
use super::planner::find_path;
use crate::config::NavigatorConfig;
use crate::input::{ensure_focus, InputDriver, WindowFocus};
use crate::perception::{DetectionRules, Perception};

/// Knobs for the retry loop and path verification.
#[derive(Clone, Debug, PartialEq)]
pub struct NavigatorSettings {
    /// Initial detection attempts (>= 1)
    pub max_retries: u32,
    /// Fired between failed initial detection attempts
    pub retry_action: Action,
    pub policy: VerifyPolicy,
}

impl From<&NavigatorConfig> for NavigatorSettings {
    fn from(config: &NavigatorConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            retry_action: config.retry_action.clone(),
            policy: config.verify_policy,
        }
    }
}

/// Drives the client between screens.
///
/// Calls take `&mut self`, so at most one navigation is in flight per
/// navigator.
pub struct Navigator {
    graph: ScreenGraph,
    rules: DetectionRules,
    perception: Perception,
    input: Box<dyn InputDriver>,
    focus: Box<dyn WindowFocus>,
    settings: NavigatorSettings,
    belief: ScreenId,
}

impl Navigator {
    /// Builds the navigator and detects the starting screen, retrying up to
    /// `max_retries` times.
    pub fn new(
        graph: ScreenGraph,
        rules: DetectionRules,
        perception: Perception,
        input: Box<dyn InputDriver>,
        focus: Box<dyn WindowFocus>,
        settings: NavigatorSettings,
    ) -> Result<Self, NavigationError> {
        if settings.max_retries == 0 {
            return Err(NavigationError::Config(ConfigError::InvalidRetries));
        }
        if graph.is_empty() {
            return Err(NavigationError::Config(ConfigError::EmptyCatalog));
        }

        let mut navigator = Self {
            graph,
            rules,
            perception,
            input,
            focus,
            settings,
            belief: ScreenId(0),
        };
        navigator.belief = navigator.detect_initial_state_with_retries()?;
        Ok(navigator)
    }

    pub fn graph(&self) -> &ScreenGraph {
        &self.graph
    }

    /// The screen the client is believed to be on.
    pub fn belief(&self) -> ScreenId {
        self.belief
    }

    pub fn belief_name(&self) -> &str {
        self.graph.name(self.belief)
    }

    fn detect_initial_state_with_retries(&mut self) -> Result<ScreenId, NavigationError> {
        let attempts = self.settings.max_retries;
        for attempt in 1..=attempts {
            match self.detect() {
                Ok(Some(id)) => {
                    crate::log(&format!("Detected initial state: {}", self.graph.name(id)));
                    return Ok(id);
                }
                Ok(None) => crate::log(&format!(
                    "Failed to detect initial state (attempt {}/{})",
                    attempt, attempts
                )),
                Err(e) => crate::log(&format!(
                    "Could not capture initial state (attempt {}/{}): {}",
                    attempt, attempts, e
                )),
            }

            if attempt < attempts {
                self.fire_retry_action();
            }
        }

        self.perception.save_snapshot("initial_state");
        Err(NavigationError::InitialDetectionFailed { attempts })
    }

    fn fire_retry_action(&mut self) {
        crate::log(&format!("Retrying after: {}", self.settings.retry_action));
        if let Err(e) = ensure_focus(self.focus.as_mut()) {
            crate::log(&format!("Focus pull before retry failed: {:#}", e));
        }
        let mut ctx = ActionContext {
            perception: &mut self.perception,
            input: self.input.as_mut(),
        };
        if let Err(e) = self.settings.retry_action.execute(&mut ctx) {
            crate::log(&format!("Retry action failed: {}", e));
        }
    }

    /// Fresh capture, mapped onto a graph id.
    fn detect(&mut self) -> Result<Option<ScreenId>, NavigationError> {
        let detected = self.perception.detect_current(&self.rules)?;
        Ok(detected.and_then(|name| {
            let id = self.graph.lookup(&name);
            if id.is_none() {
                crate::log(&format!("[BUG] Detected screen {} is not in the graph", name));
            }
            id
        }))
    }

    /// Moves the client to `target`, re-detecting the current screen first.
    ///
    /// Belief is updated on success and failure alike to wherever the walk
    /// left the client.
    pub fn detect_and_transition(&mut self, target: &str) -> Result<(), NavigationError> {
        let target_id = self
            .graph
            .lookup(target)
            .ok_or_else(|| NavigationError::UnknownScreen(target.to_string()))?;

        if self.belief == target_id {
            crate::log(&format!("Already in the {} state.", target));
            return Ok(());
        }

        if let Some(detected) = self.detect()? {
            crate::log(&format!("Detected state: {}", self.graph.name(detected)));
            self.belief = detected;
        }

        if self.belief == target_id {
            crate::log(&format!("Already in the {} state.", target));
            return Ok(());
        }

        let Some(path) = find_path(&self.graph, self.belief, target_id) else {
            crate::log(&format!("No path found to {}", target));
            return Err(NavigationError::NoPath {
                from: self.belief_name().to_string(),
                to: target.to_string(),
            });
        };
        crate::log(&format!("Path to {}: {}", target, self.graph.describe_path(&path)));

        ensure_focus(self.focus.as_mut()).map_err(|e| NavigationError::Focus(format!("{:#}", e)))?;

        let report = Executor {
            graph: &self.graph,
            rules: &self.rules,
            perception: &mut self.perception,
            input: self.input.as_mut(),
            focus: self.focus.as_mut(),
            policy: self.settings.policy,
        }
        .follow(self.belief, &path);

        self.belief = report.belief;
        report.result
    }
}

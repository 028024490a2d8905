//! The screen graph: named UI screens and the labeled transitions between them.
//!
//! Screens live in an arena and refer to each other by [`ScreenId`], so a
//! transition never holds a reference to its target.

use std::collections::HashMap;

use super::action::Action;
use super::error::ConfigError;

/// Index of a screen in its [`ScreenGraph`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScreenId(pub(crate) usize);

impl ScreenId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A directed edge: firing `action` on the source screen leads to `target`.
#[derive(Clone, Debug, PartialEq)]
pub struct Transition {
    pub trigger: String,
    pub target: ScreenId,
    pub action: Action,
}

#[derive(Clone, Debug)]
struct Screen {
    name: String,
    transitions: Vec<Transition>,
}

/// Directed graph of screens. Read-only once built.
#[derive(Clone, Debug, Default)]
pub struct ScreenGraph {
    screens: Vec<Screen>,
    index: HashMap<String, ScreenId>,
}

impl ScreenGraph {
    pub fn builder() -> GraphBuilder {
        GraphBuilder::default()
    }

    pub fn len(&self) -> usize {
        self.screens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.screens.is_empty()
    }

    pub fn lookup(&self, name: &str) -> Option<ScreenId> {
        self.index.get(name).copied()
    }

    pub fn name(&self, id: ScreenId) -> &str {
        &self.screens[id.0].name
    }

    /// Outbound transitions of `id`, in registration order.
    pub fn transitions(&self, id: ScreenId) -> &[Transition] {
        &self.screens[id.0].transitions
    }

    /// All screen ids in catalog order.
    pub fn ids(&self) -> impl Iterator<Item = ScreenId> + '_ {
        (0..self.screens.len()).map(ScreenId)
    }

    /// First transition from `from` whose target is `to`.
    pub fn edge(&self, from: ScreenId, to: ScreenId) -> Option<&Transition> {
        self.transitions(from).iter().find(|t| t.target == to)
    }

    pub fn transition_by_trigger(&self, from: ScreenId, trigger: &str) -> Option<&Transition> {
        self.transitions(from).iter().find(|t| t.trigger == trigger)
    }

    /// Renders a path as `A -> B -> C` for logs.
    pub fn describe_path(&self, path: &[ScreenId]) -> String {
        path.iter()
            .map(|id| self.name(*id))
            .collect::<Vec<_>>()
            .join(" -> ")
    }
}

struct PendingTransition {
    source: String,
    trigger: String,
    target: String,
    action: Action,
}

/// Collects screens and transitions by name, then resolves them into a
/// [`ScreenGraph`].
#[derive(Default)]
pub struct GraphBuilder {
    screens: Vec<String>,
    transitions: Vec<PendingTransition>,
}

impl GraphBuilder {
    pub fn screen(mut self, name: impl Into<String>) -> Self {
        self.screens.push(name.into());
        self
    }

    pub fn transition(
        mut self,
        source: impl Into<String>,
        trigger: impl Into<String>,
        target: impl Into<String>,
        action: Action,
    ) -> Self {
        self.transitions.push(PendingTransition {
            source: source.into(),
            trigger: trigger.into(),
            target: target.into(),
            action,
        });
        self
    }

    /// Resolves names to ids.
    ///
    /// Fails on duplicate screens or transitions naming undefined screens.
    /// A repeated trigger on the same source replaces the earlier transition
    /// in place.
    pub fn build(self) -> Result<ScreenGraph, ConfigError> {
        let mut graph = ScreenGraph::default();

        for name in self.screens {
            if graph.index.contains_key(&name) {
                return Err(ConfigError::DuplicateScreen(name));
            }
            graph.index.insert(name.clone(), ScreenId(graph.screens.len()));
            graph.screens.push(Screen {
                name,
                transitions: Vec::new(),
            });
        }

        for pending in self.transitions {
            let referenced_by = format!("transition '{}'", pending.trigger);
            let source = graph
                .lookup(&pending.source)
                .ok_or_else(|| ConfigError::UnknownScreen {
                    referenced_by: referenced_by.clone(),
                    name: pending.source.clone(),
                })?;
            let target = graph
                .lookup(&pending.target)
                .ok_or_else(|| ConfigError::UnknownScreen {
                    referenced_by,
                    name: pending.target.clone(),
                })?;

            let transition = Transition {
                trigger: pending.trigger,
                target,
                action: pending.action,
            };
            let outbound = &mut graph.screens[source.0].transitions;
            match outbound.iter_mut().find(|t| t.trigger == transition.trigger) {
                Some(existing) => {
                    crate::log(&format!(
                        "Warning: trigger '{}' on {} registered twice, keeping the last one",
                        transition.trigger, pending.source
                    ));
                    *existing = transition;
                }
                None => outbound.push(transition),
            }
        }

        Ok(graph)
    }
}

//! Walks a planned path: fire each hop's action, then look again.

use serde::{Deserialize, Serialize};

use super::action::ActionContext;
use super::error::NavigationError;
use super::graph::{ScreenGraph, ScreenId};
use crate::input::{ensure_focus, InputDriver, WindowFocus};
use crate::perception::{DetectionRules, Perception};

/// How post-hop detections are judged.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerifyPolicy {
    /// Succeed as soon as any post-hop detection shows the final target,
    /// even if earlier hops were never confirmed. An inconclusive or
    /// unexpected detection does not stop the walk.
    #[default]
    AnyHopReachesGoal,
    /// Every hop must be confirmed by detecting the screen it leads to.
    /// Detecting the final target early still counts as success.
    StrictPerHop,
}

/// Outcome of walking a path, plus where the walk leaves the client.
#[derive(Debug)]
pub struct FollowReport {
    /// Believed current screen after the walk.
    pub belief: ScreenId,
    pub result: Result<(), NavigationError>,
}

/// Borrowed providers for one walk.
pub struct Executor<'a> {
    pub graph: &'a ScreenGraph,
    pub rules: &'a DetectionRules,
    pub perception: &'a mut Perception,
    pub input: &'a mut dyn InputDriver,
    pub focus: &'a mut dyn WindowFocus,
    pub policy: VerifyPolicy,
}

impl Executor<'_> {
    /// Follows `path` starting from the current belief `start`.
    ///
    /// `path` is planner output: it begins with `start` and ends with the
    /// target.
    pub fn follow(&mut self, start: ScreenId, path: &[ScreenId]) -> FollowReport {
        let mut belief = start;
        let (Some(&first), Some(&target)) = (path.first(), path.last()) else {
            crate::log("[BUG] Asked to follow an empty path");
            return FollowReport {
                belief,
                result: Err(NavigationError::BrokenPathStep {
                    from: self.graph.name(start).to_string(),
                    to: "<empty path>".to_string(),
                }),
            };
        };
        if first != start {
            crate::log(&format!(
                "[BUG] Path starts at {} but belief is {}",
                self.graph.name(first),
                self.graph.name(start)
            ));
            return FollowReport {
                belief,
                result: Err(NavigationError::BrokenPathStep {
                    from: self.graph.name(start).to_string(),
                    to: self.graph.name(first).to_string(),
                }),
            };
        }
        let graph = self.graph;
        let target_name = graph.name(target).to_string();
        if path.len() == 1 {
            return FollowReport { belief, result: Ok(()) };
        }

        for pair in path.windows(2) {
            let (from, to) = (pair[0], pair[1]);
            let from_name = graph.name(from).to_string();
            let to_name = graph.name(to).to_string();

            let Some(transition) = graph.edge(from, to) else {
                crate::log(&format!(
                    "[BUG] No valid transition found from {} to {}; planner and graph disagree",
                    from_name, to_name
                ));
                return FollowReport {
                    belief,
                    result: Err(NavigationError::BrokenPathStep {
                        from: from_name,
                        to: to_name,
                    }),
                };
            };

            if let Err(e) = ensure_focus(&mut *self.focus) {
                return FollowReport {
                    belief,
                    result: Err(NavigationError::Focus(format!("{:#}", e))),
                };
            }

            crate::log(&format!(
                "Transitioning from {} to {} on input {} ({})",
                from_name, to_name, transition.trigger, transition.action
            ));

            let mut ctx = ActionContext {
                perception: &mut *self.perception,
                input: &mut *self.input,
            };
            if let Err(source) = transition.action.execute(&mut ctx) {
                crate::log(&format!(
                    "Action {} failed: {}; staying at {}",
                    transition.trigger, source, from_name
                ));
                return FollowReport {
                    belief,
                    result: Err(NavigationError::ActionFailed {
                        from: from_name,
                        to: to_name,
                        source,
                    }),
                };
            }

            // The hop fired; trust it until a detection says otherwise
            belief = to;

            let detected = match self.perception.detect_current(self.rules) {
                Ok(detected) => detected,
                Err(e) => {
                    crate::log(&format!("Could not verify hop to {}: {}", to_name, e));
                    return FollowReport {
                        belief,
                        result: Err(NavigationError::PerceptionUnavailable(e)),
                    };
                }
            };

            if detected.as_deref() == Some(target_name.as_str()) {
                crate::log(&format!("Reached target state: {}", target_name));
                return FollowReport {
                    belief: target,
                    result: Ok(()),
                };
            }

            match (&detected, self.policy) {
                (Some(name), _) if *name == to_name => {}
                (_, VerifyPolicy::AnyHopReachesGoal) => {
                    crate::log(&format!(
                        "Hop to {} not confirmed (detected {:?}), continuing",
                        to_name, detected
                    ));
                }
                (_, VerifyPolicy::StrictPerHop) => {
                    let detected_name = detected.clone().unwrap_or_else(|| "nothing".to_string());
                    crate::log(&format!(
                        "Expected {} after hop, detected {}",
                        to_name, detected_name
                    ));
                    if let Some(actual) = detected.as_deref().and_then(|n| graph.lookup(n)) {
                        belief = actual;
                    } else {
                        belief = from;
                    }
                    self.perception.save_snapshot(&target_name);
                    return FollowReport {
                        belief,
                        result: Err(NavigationError::VerificationFailed {
                            expected: to_name,
                            detected: detected_name,
                        }),
                    };
                }
            }
        }

        crate::log(&format!("Failed to transition to {} state.", target_name));
        self.perception.save_snapshot(&target_name);
        FollowReport {
            belief,
            result: Err(NavigationError::NotReached {
                target: target_name,
                belief: graph.name(belief).to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Key;
    use crate::navigator::action::Action;
    use crate::navigator::error::ActionError;
    use crate::testing::{rules_for, FakeWorld, InputEvent};
    use std::time::Duration;

    const HOLD: u64 = 100;

    /// A -> B -> C -> D, each hop pressing a different key.
    fn chain() -> ScreenGraph {
        ScreenGraph::builder()
            .screen("Alpha")
            .screen("Bravo")
            .screen("Charlie")
            .screen("Delta")
            .transition("Alpha", "to_bravo", "Bravo", Action::press(Key::Right, HOLD))
            .transition("Bravo", "to_charlie", "Charlie", Action::press(Key::Down, HOLD))
            .transition("Charlie", "to_delta", "Delta", Action::press(Key::Space, HOLD))
            .build()
            .unwrap()
    }

    fn path(graph: &ScreenGraph, names: &[&str]) -> Vec<ScreenId> {
        names.iter().map(|n| graph.lookup(n).unwrap()).collect()
    }

    fn key(k: Key) -> InputEvent {
        InputEvent::Key(k, Duration::from_millis(HOLD))
    }

    fn follow(world: &FakeWorld, graph: &ScreenGraph, names: &[&str], policy: VerifyPolicy) -> FollowReport {
        let rules = rules_for(&["Alpha", "Bravo", "Charlie", "Delta"]);
        let mut perception = world.perception();
        let mut input = world.input();
        let mut focus = world.focus();
        let mut executor = Executor {
            graph,
            rules: &rules,
            perception: &mut perception,
            input: &mut input,
            focus: &mut focus,
            policy,
        };
        let path = path(graph, names);
        executor.follow(path[0], &path)
    }

    #[test]
    fn test_walks_every_hop() {
        let graph = chain();
        let world = FakeWorld::showing("Alpha");
        world.route("Alpha", Key::Right, "Bravo");
        world.route("Bravo", Key::Down, "Charlie");
        world.route("Charlie", Key::Space, "Delta");

        let report = follow(&world, &graph, &["Alpha", "Bravo", "Charlie", "Delta"], VerifyPolicy::default());

        assert!(report.result.is_ok());
        assert_eq!(report.belief, graph.lookup("Delta").unwrap());
        assert_eq!(world.events(), vec![key(Key::Right), key(Key::Down), key(Key::Space)]);
    }

    #[test]
    fn test_short_circuits_when_goal_seen_early() {
        let graph = chain();
        let world = FakeWorld::showing("Alpha");
        // The first hop lands directly on the goal
        world.route("Alpha", Key::Right, "Delta");

        let report = follow(&world, &graph, &["Alpha", "Bravo", "Charlie", "Delta"], VerifyPolicy::default());

        assert!(report.result.is_ok());
        assert_eq!(report.belief, graph.lookup("Delta").unwrap());
        assert_eq!(world.events(), vec![key(Key::Right)]);
    }

    #[test]
    fn test_unconfirmed_hops_continue_on_intended_belief() {
        let graph = chain();
        let world = FakeWorld::showing("Alpha");
        // Screen never changes visibly until the last hop
        world.route("Alpha", Key::Right, "Loading");
        world.route("Loading", Key::Down, "Loading");
        world.route("Loading", Key::Space, "Delta");

        let report = follow(&world, &graph, &["Alpha", "Bravo", "Charlie", "Delta"], VerifyPolicy::default());

        assert!(report.result.is_ok());
        assert_eq!(world.events().len(), 3);
    }

    #[test]
    fn test_exhausted_path_fails_and_snapshots() {
        let graph = chain();
        let world = FakeWorld::showing("Alpha");
        let dir = tempfile::tempdir().unwrap();
        let rules = rules_for(&["Alpha", "Bravo", "Charlie", "Delta"]);
        let mut perception = world.perception().with_snapshots(dir.path().to_path_buf(), false);
        let mut input = world.input();
        let mut focus = world.focus();

        let report = Executor {
            graph: &graph,
            rules: &rules,
            perception: &mut perception,
            input: &mut input,
            focus: &mut focus,
            policy: VerifyPolicy::AnyHopReachesGoal,
        }
        .follow(graph.lookup("Alpha").unwrap(), &path(&graph, &["Alpha", "Bravo", "Charlie"]));

        assert!(matches!(report.result, Err(NavigationError::NotReached { .. })));
        assert_eq!(report.belief, graph.lookup("Charlie").unwrap());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_broken_path_step() {
        let graph = chain();
        let world = FakeWorld::showing("Alpha");

        let report = follow(&world, &graph, &["Alpha", "Charlie"], VerifyPolicy::default());

        assert!(matches!(report.result, Err(NavigationError::BrokenPathStep { .. })));
        assert_eq!(report.belief, graph.lookup("Alpha").unwrap());
        assert!(world.events().is_empty());
    }

    #[test]
    fn test_action_failure_keeps_last_confirmed_belief() {
        let graph = chain();
        let world = FakeWorld::showing("Alpha");
        world.route("Alpha", Key::Right, "Bravo");
        world.fail_input_after(1);

        let report = follow(&world, &graph, &["Alpha", "Bravo", "Charlie", "Delta"], VerifyPolicy::default());

        match report.result {
            Err(NavigationError::ActionFailed { ref from, ref to, source: ActionError::Input(_) }) => {
                assert_eq!((from.as_str(), to.as_str()), ("Bravo", "Charlie"));
            }
            ref other => panic!("unexpected result {:?}", other),
        }
        assert_eq!(report.belief, graph.lookup("Bravo").unwrap());
    }

    #[test]
    fn test_focus_pulled_before_each_action() {
        let graph = chain();
        let world = FakeWorld::showing("Alpha");
        world.route("Alpha", Key::Right, "Bravo");
        world.set_active(false);

        let report = follow(&world, &graph, &["Alpha", "Bravo"], VerifyPolicy::default());

        assert!(report.result.is_ok());
        assert_eq!(world.focus_pulls(), 1);
    }

    #[test]
    fn test_strict_policy_fails_on_wrong_screen() {
        let graph = chain();
        let world = FakeWorld::showing("Alpha");
        world.route("Alpha", Key::Right, "Charlie");

        let report = follow(&world, &graph, &["Alpha", "Bravo", "Charlie", "Delta"], VerifyPolicy::StrictPerHop);

        assert!(matches!(report.result, Err(NavigationError::VerificationFailed { .. })));
        assert_eq!(report.belief, graph.lookup("Charlie").unwrap());
        assert_eq!(world.events(), vec![key(Key::Right)]);
    }

    #[test]
    fn test_strict_policy_unrecognized_screen_stays_put() {
        let graph = chain();
        let world = FakeWorld::showing("Alpha");
        world.route("Alpha", Key::Right, "Loading");

        let report = follow(&world, &graph, &["Alpha", "Bravo", "Charlie"], VerifyPolicy::StrictPerHop);

        assert!(matches!(report.result, Err(NavigationError::VerificationFailed { .. })));
        assert_eq!(report.belief, graph.lookup("Alpha").unwrap());
    }

    #[test]
    fn test_perception_loss_after_hop_is_surfaced() {
        let graph = chain();
        let world = FakeWorld::showing("Alpha");
        world.route("Alpha", Key::Right, "Bravo");
        world.fail_captures(1);

        let report = follow(&world, &graph, &["Alpha", "Bravo", "Charlie"], VerifyPolicy::default());

        assert!(matches!(report.result, Err(NavigationError::PerceptionUnavailable(_))));
        assert_eq!(report.belief, graph.lookup("Bravo").unwrap());
    }
}

//! Shortest-path search over the screen graph.

use std::collections::VecDeque;

use super::graph::{ScreenGraph, ScreenId};

/// Breadth-first search from `source` to `target`.
///
/// Returns the screens to pass through, both ends included, or `None` if
/// `target` is unreachable. Ties between equally short paths go to the
/// transition registered first. Each screen is expanded at most once, so
/// cycles are safe.
pub fn find_path(graph: &ScreenGraph, source: ScreenId, target: ScreenId) -> Option<Vec<ScreenId>> {
    if source == target {
        return Some(vec![source]);
    }

    let mut parent: Vec<Option<ScreenId>> = vec![None; graph.len()];
    let mut seen = vec![false; graph.len()];
    let mut queue = VecDeque::new();

    seen[source.index()] = true;
    queue.push_back(source);

    while let Some(current) = queue.pop_front() {
        for transition in graph.transitions(current) {
            let next = transition.target;
            if seen[next.index()] {
                continue;
            }
            seen[next.index()] = true;
            parent[next.index()] = Some(current);

            if next == target {
                return Some(unwind(&parent, target));
            }
            queue.push_back(next);
        }
    }

    None
}

fn unwind(parent: &[Option<ScreenId>], target: ScreenId) -> Vec<ScreenId> {
    let mut path = vec![target];
    let mut current = target;
    while let Some(previous) = parent[current.index()] {
        path.push(previous);
        current = previous;
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigator::action::Action;
    use proptest::prelude::*;

    fn graph(screens: &[&str], edges: &[(&str, &str)]) -> ScreenGraph {
        let mut builder = ScreenGraph::builder();
        for name in screens {
            builder = builder.screen(*name);
        }
        for (i, (from, to)) in edges.iter().enumerate() {
            builder = builder.transition(*from, format!("t{}", i), *to, Action::Wait { ms: 0 });
        }
        builder.build().unwrap()
    }

    fn names(graph: &ScreenGraph, path: &[ScreenId]) -> Vec<String> {
        path.iter().map(|id| graph.name(*id).to_string()).collect()
    }

    #[test]
    fn test_scoreboard_to_in_game_via_menu() {
        let g = graph(
            &["Menu", "Scoreboard", "InGame"],
            &[("Menu", "Scoreboard"), ("Scoreboard", "Menu"), ("Menu", "InGame")],
        );
        let path = find_path(&g, g.lookup("Scoreboard").unwrap(), g.lookup("InGame").unwrap());
        assert_eq!(names(&g, &path.unwrap()), ["Scoreboard", "Menu", "InGame"]);
    }

    #[test]
    fn test_same_source_and_target() {
        let g = graph(&["Menu"], &[]);
        let menu = g.lookup("Menu").unwrap();
        assert_eq!(find_path(&g, menu, menu), Some(vec![menu]));
    }

    #[test]
    fn test_unreachable_returns_none() {
        let g = graph(&["Deploy", "InGame"], &[("Deploy", "InGame")]);
        assert_eq!(
            find_path(&g, g.lookup("InGame").unwrap(), g.lookup("Deploy").unwrap()),
            None
        );
    }

    #[test]
    fn test_tie_break_follows_registration_order() {
        let g = graph(
            &["A", "B", "C", "D"],
            &[("A", "C"), ("A", "B"), ("B", "D"), ("C", "D")],
        );
        let path = find_path(&g, g.lookup("A").unwrap(), g.lookup("D").unwrap()).unwrap();
        assert_eq!(names(&g, &path), ["A", "C", "D"]);
    }

    #[test]
    fn test_cycles_terminate() {
        let g = graph(
            &["A", "B", "C", "Z"],
            &[("A", "B"), ("B", "C"), ("C", "A"), ("B", "A")],
        );
        assert_eq!(find_path(&g, g.lookup("A").unwrap(), g.lookup("Z").unwrap()), None);
    }

    /// Reference all-pairs distances by repeated relaxation.
    fn distances(n: usize, edges: &[(usize, usize)], source: usize) -> Vec<Option<usize>> {
        let mut dist = vec![None; n];
        dist[source] = Some(0);
        for _ in 0..n {
            for &(from, to) in edges {
                if let Some(d) = dist[from] {
                    if dist[to].is_none_or(|existing| d + 1 < existing) {
                        dist[to] = Some(d + 1);
                    }
                }
            }
        }
        dist
    }

    prop_compose! {
        fn arbitrary_graph()(n in 1usize..9)
            (edges in prop::collection::vec((0..n, 0..n), 0..24), n in Just(n))
            -> (usize, Vec<(usize, usize)>) {
            (n, edges)
        }
    }

    proptest! {
        #[test]
        fn path_is_shortest_and_valid(
            (n, edges) in arbitrary_graph(),
            s in 0usize..9,
            t in 0usize..9,
        ) {
            let s = s % n;
            let t = t % n;

            let mut builder = ScreenGraph::builder();
            for i in 0..n {
                builder = builder.screen(format!("S{}", i));
            }
            for (i, (from, to)) in edges.iter().enumerate() {
                builder = builder.transition(
                    format!("S{}", from),
                    format!("e{}", i),
                    format!("S{}", to),
                    Action::Wait { ms: 0 },
                );
            }
            let g = builder.build().unwrap();
            let source = g.lookup(&format!("S{}", s)).unwrap();
            let target = g.lookup(&format!("S{}", t)).unwrap();

            let expected = distances(n, &edges, s)[t];
            match (find_path(&g, source, target), expected) {
                (Some(path), Some(d)) => {
                    prop_assert_eq!(path.len(), d + 1);
                    prop_assert_eq!(path[0], source);
                    prop_assert_eq!(*path.last().unwrap(), target);
                    for pair in path.windows(2) {
                        prop_assert!(g.edge(pair[0], pair[1]).is_some());
                    }
                }
                (None, None) => {}
                (got, want) => prop_assert!(false, "planner {:?} vs reference {:?}", got, want),
            }
        }

        #[test]
        fn planning_is_deterministic(
            (n, edges) in arbitrary_graph(),
            s in 0usize..9,
            t in 0usize..9,
        ) {
            let mut builder = ScreenGraph::builder();
            for i in 0..n {
                builder = builder.screen(format!("S{}", i));
            }
            for (i, (from, to)) in edges.iter().enumerate() {
                builder = builder.transition(
                    format!("S{}", from),
                    format!("e{}", i),
                    format!("S{}", to),
                    Action::Wait { ms: 0 },
                );
            }
            let g = builder.build().unwrap();
            let source = g.lookup(&format!("S{}", s % n)).unwrap();
            let target = g.lookup(&format!("S{}", t % n)).unwrap();

            prop_assert_eq!(find_path(&g, source, target), find_path(&g, source, target));
        }
    }
}

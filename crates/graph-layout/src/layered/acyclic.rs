use petgraph::graphmap::DiGraphMap;
use petgraph::Direction;
use std::collections::HashSet;
use std::hash::Hash;

/// Make the graph acyclic by reversing every DFS back edge
///
/// Roots are visited in node order and successors in edge order, so the set
/// of reversed edges is a pure function of the graph. Returns the reversed
/// edges in their original orientation.
pub(crate) fn break_cycles<N>(graph: &mut DiGraphMap<N, ()>) -> Vec<(N, N)>
where
    N: Copy + Ord + Hash,
{
    let mut visited = HashSet::new();
    let mut on_stack = HashSet::new();
    let mut back_edges = Vec::new();

    let roots: Vec<N> = graph.nodes().collect();
    for root in roots {
        if !visited.insert(root) {
            continue;
        }
        on_stack.insert(root);
        let mut stack = vec![(root, successors(graph, root), 0usize)];

        while let Some(frame) = stack.last_mut() {
            let node = frame.0;
            match frame.1.get(frame.2).copied() {
                Some(succ) => {
                    frame.2 += 1;
                    if on_stack.contains(&succ) {
                        back_edges.push((node, succ));
                    } else if visited.insert(succ) {
                        on_stack.insert(succ);
                        stack.push((succ, successors(graph, succ), 0));
                    }
                }
                None => {
                    on_stack.remove(&node);
                    stack.pop();
                }
            }
        }
    }

    for &(from, to) in &back_edges {
        graph.remove_edge(from, to);
        graph.add_edge(to, from, ());
    }

    back_edges
}

fn successors<N>(graph: &DiGraphMap<N, ()>, node: N) -> Vec<N>
where
    N: Copy + Ord + Hash,
{
    graph.neighbors_directed(node, Direction::Outgoing).collect()
}

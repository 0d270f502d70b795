//! Generic pre-order traversal over trees described by a children function

/// Lazy pre-order walk that yields the nodes accepted by `filter`.
///
/// Every node reachable from the start node is visited exactly once, children
/// in the order `get_children` returns them. Nodes rejected by the filter are
/// still descended into. Stopping iteration stops the walk; cloning an
/// unstarted traversal gives an independent replay of it.
#[derive(Clone)]
pub struct PreOrder<N, C, P> {
    stack: Vec<N>,
    get_children: C,
    filter: P,
}

pub fn traverse_pre_order<N, C, P>(start: N, get_children: C, filter: P) -> PreOrder<N, C, P>
where
    C: Fn(&N) -> Vec<N>,
    P: Fn(&N) -> bool,
{
    PreOrder {
        stack: vec![start],
        get_children,
        filter,
    }
}

/// Predicate accepting nodes without children.
pub fn leaf_filter<N, C>(get_children: C) -> impl Fn(&N) -> bool + Clone
where
    C: Fn(&N) -> Vec<N> + Clone,
{
    move |node: &N| get_children(node).is_empty()
}

impl<N, C, P> Iterator for PreOrder<N, C, P>
where
    C: Fn(&N) -> Vec<N>,
    P: Fn(&N) -> bool,
{
    type Item = N;

    fn next(&mut self) -> Option<N> {
        while let Some(node) = self.stack.pop() {
            let children = (self.get_children)(&node);
            self.stack.extend(children.into_iter().rev());

            if (self.filter)(&node) {
                return Some(node);
            }
        }
        None
    }
}

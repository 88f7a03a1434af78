use crate::graph::EdgeState;

pub trait EdgeFilter {
    fn accept(&self, edge: &EdgeState) -> bool;
}

/// Accepts every edge.
#[derive(Clone, Copy, Debug, Default)]
pub struct AllEdgesFilter;

impl EdgeFilter for AllEdgesFilter {
    fn accept(&self, _edge: &EdgeState) -> bool {
        true
    }
}

impl<F> EdgeFilter for F
where
    F: Fn(&EdgeState) -> bool,
{
    fn accept(&self, edge: &EdgeState) -> bool {
        self(edge)
    }
}

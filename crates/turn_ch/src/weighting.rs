use fxhash::FxHashMap;

use crate::{
    constants::{INFINITE_WEIGHT, NO_EDGE},
    edge_direction::EdgeDirection,
    graph::{Graph, GraphEdge},
    types::{EdgeId, NodeId},
};

pub type Weight = f64;

/// Edge and turn weights. An infinite weight marks an edge or a turn that cannot be taken.
pub trait TurnWeighting<G>
where
    G: Graph,
{
    fn calc_edge_weight(&self, edge: &G::Edge, direction: EdgeDirection) -> Weight;

    fn calc_turn_weight(&self, in_edge: EdgeId, via_node: NodeId, out_edge: EdgeId) -> Weight;

    /// Weight of travelling `edge` in `direction` after arriving through the original edge
    /// `incoming_edge`, or without any turn cost when `incoming_edge` is `NO_EDGE`.
    fn calc_weight(&self, edge: &G::Edge, direction: EdgeDirection, incoming_edge: EdgeId) -> Weight {
        let edge_weight = self.calc_edge_weight(edge, direction);
        if incoming_edge == NO_EDGE || edge_weight.is_infinite() {
            return edge_weight;
        }

        let via_node = match direction {
            EdgeDirection::Forward => edge.start_node(),
            EdgeDirection::Backward => edge.end_node(),
        };

        edge_weight
            + self.calc_turn_weight(incoming_edge, via_node, edge.first_orig_edge(direction))
    }
}

/// Turn cost table keyed by `(in_edge, via_node, out_edge)` over original edge ids.
///
/// Turns missing from the table are free, except U-turns which use `u_turn_cost`.
#[derive(Clone, Debug)]
pub struct TurnCostWeighting {
    turn_costs: FxHashMap<(EdgeId, NodeId, EdgeId), Weight>,
    u_turn_cost: Weight,
}

impl Default for TurnCostWeighting {
    fn default() -> Self {
        Self::new()
    }
}

impl TurnCostWeighting {
    pub fn new() -> Self {
        TurnCostWeighting {
            turn_costs: FxHashMap::default(),
            u_turn_cost: INFINITE_WEIGHT,
        }
    }

    pub fn with_u_turn_cost(mut self, u_turn_cost: Weight) -> Self {
        self.u_turn_cost = u_turn_cost;
        self
    }

    pub fn add_turn_cost(&mut self, in_edge: EdgeId, via_node: NodeId, out_edge: EdgeId, cost: Weight) {
        self.turn_costs.insert((in_edge, via_node, out_edge), cost);
    }

    pub fn restrict_turn(&mut self, in_edge: EdgeId, via_node: NodeId, out_edge: EdgeId) {
        self.add_turn_cost(in_edge, via_node, out_edge, INFINITE_WEIGHT);
    }

    pub fn turn_cost(&self, in_edge: EdgeId, via_node: NodeId, out_edge: EdgeId) -> Weight {
        if in_edge == NO_EDGE || out_edge == NO_EDGE {
            return 0.0;
        }

        if let Some(&cost) = self.turn_costs.get(&(in_edge, via_node, out_edge)) {
            return cost;
        }

        if in_edge == out_edge {
            self.u_turn_cost
        } else {
            0.0
        }
    }

    pub fn len(&self) -> usize {
        self.turn_costs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turn_costs.is_empty()
    }
}

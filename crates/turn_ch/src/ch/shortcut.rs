use crate::{
    types::{EdgeId, NodeId},
    weighting::Weight,
};

#[derive(Clone, Debug, PartialEq)]
pub struct Shortcut {
    pub from: NodeId,
    pub to: NodeId,

    /// Skipped edge incoming to the contracted node
    pub incoming_edge: EdgeId,

    /// Skipped edge outgoing from the contracted node
    pub outgoing_edge: EdgeId,

    /// First original edge of the represented path, used for the turn onto the shortcut
    pub orig_edge_first: EdgeId,

    /// Last original edge of the represented path, used for the turn off the shortcut
    pub orig_edge_last: EdgeId,

    /// Includes the turn costs inside the shortcut but not the ones at `from` and `to`
    pub weight: Weight,
}

impl Shortcut {
    pub(crate) fn key(&self) -> ShortcutKey {
        ShortcutKey {
            from: self.from,
            to: self.to,
            orig_edge_first: self.orig_edge_first,
            orig_edge_last: self.orig_edge_last,
        }
    }
}

/// Two shortcuts with the same key are interchangeable for any query, only the cheaper one is kept.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub(crate) struct ShortcutKey {
    from: NodeId,
    to: NodeId,
    orig_edge_first: EdgeId,
    orig_edge_last: EdgeId,
}

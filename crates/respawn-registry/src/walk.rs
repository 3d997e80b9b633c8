//! Hierarchy traversal for cascading despawn.

use smallvec::{smallvec, SmallVec};

use respawn_core::{Host, InstanceId};

/// Collect `root` and all its descendants, every node after all of its
/// children (root last).
///
/// Driven entirely by the host's child enumeration, so it is independent
/// of any particular scene-graph representation. The order is captured
/// up front: callers mutate the hierarchy (despawn reparents nodes away)
/// while consuming it.
pub(crate) fn post_order<H: Host + ?Sized>(host: &H, root: InstanceId) -> Vec<InstanceId> {
    let mut stack: SmallVec<[InstanceId; 16]> = smallvec![root];
    let mut order = Vec::new();
    while let Some(node) = stack.pop() {
        order.push(node);
        stack.extend(host.children(node));
    }
    // `order` holds parents before their descendants; reversing puts
    // every node after its whole subtree.
    order.reverse();
    order
}

//! Positional reconciliation of conditional settings against the tree.

use super::ConditionalRenderSetting;
use crate::target::Document;

/// Run one full pass over `settings`, in scan order.
///
/// `is_truthy` answers the current value of a condition key. Every setting is
/// re-evaluated on each pass; nothing is skipped or batched.
pub fn reconcile<D: Document>(
    document: &D,
    settings: &[ConditionalRenderSetting<D::Node>],
    is_truthy: impl Fn(&str) -> bool,
) {
    for setting in settings {
        if is_truthy(&setting.condition_key) {
            show(document, setting);
        } else {
            hide(document, setting);
        }
    }
}

fn show<D: Document>(document: &D, setting: &ConditionalRenderSetting<D::Node>) {
    let ConditionalRenderSetting {
        target,
        alternate,
        parent_container: container,
        position_index,
        ..
    } = setting;

    let current = document.children(container).into_iter().nth(*position_index);
    if current.as_ref() == Some(target) {
        return;
    }

    match (alternate, current) {
        (Some(alternate), _) if is_attached(document, alternate, container) => {
            tracing::trace!(key = %setting.condition_key, "swapping alternate for target");
            document.replace_child(container, target, alternate);
        }
        (_, Some(current)) => {
            tracing::trace!(key = %setting.condition_key, index = position_index, "inserting target");
            document.insert_before(container, target, &current);
        }
        (_, None) => {
            tracing::trace!(key = %setting.condition_key, "appending target");
            document.append_child(container, target);
        }
    }
}

fn hide<D: Document>(document: &D, setting: &ConditionalRenderSetting<D::Node>) {
    let ConditionalRenderSetting {
        target,
        alternate,
        parent_container: container,
        position_index,
        ..
    } = setting;

    if !is_attached(document, target, container) {
        return;
    }

    match alternate {
        None => {
            tracing::trace!(key = %setting.condition_key, "detaching target");
            document.remove_child(container, target);
        }
        Some(alternate) => {
            let current = document.children(container).into_iter().nth(*position_index);
            if current.as_ref() != Some(alternate) {
                tracing::trace!(key = %setting.condition_key, "swapping target for alternate");
                document.replace_child(container, alternate, target);
            }
        }
    }
}

fn is_attached<D: Document>(document: &D, node: &D::Node, container: &D::Node) -> bool {
    document.parent(node).as_ref() == Some(container)
}

// =============================================================================
// Tests
// =============================================================================

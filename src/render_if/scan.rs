//! One-time, read-only scan building the reconciliation model.

use super::{Markers, ABSENCE_ATTR, PRESENCE_ATTR};
use crate::error::{Error, Result};
use crate::target::Document;

const ORPHANED_ABSENCE: &str =
    "found an element with an \"_else\" attribute, but no element with an \"_if\" attribute before it";

const BOTH_MARKERS: &str =
    "found an element carrying both the \"_if\" and the \"_else\" attribute";

/// One presence-marked element and how to reposition it.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalRenderSetting<N> {
    /// The presence-marked element.
    pub target: N,
    /// Element shown instead of `target` while the condition is falsy.
    pub alternate: Option<N>,
    /// Condition model key gating this setting.
    pub condition_key: String,
    /// Element ordinal of `target` among its siblings at scan time.
    pub position_index: usize,
    /// Node whose child list `target` is repositioned within.
    pub parent_container: N,
}

/// Result of a successful scan.
#[derive(Debug, Clone)]
pub struct Scan<N> {
    pub settings: Vec<ConditionalRenderSetting<N>>,
    presence_marked: Vec<N>,
    absence_consumed: Vec<N>,
}

impl<N: Clone + PartialEq> Scan<N> {
    /// Remove every marker the scan consumed from the tree.
    pub fn strip_markers<D: Document<Node = N>>(&self, document: &D) {
        for node in &self.presence_marked {
            document.remove_attribute(node, PRESENCE_ATTR);
        }
        for node in &self.absence_consumed {
            document.remove_attribute(node, ABSENCE_ATTR);
        }
    }
}

/// Walk everything under `root` and collect its conditional settings.
///
/// The tree is not modified. Markers that would be removed during the walk
/// are tracked instead, so later elements see them as already consumed.
/// The first conflict aborts the scan with [`Error::MarkerConflict`].
pub fn scan<D: Document>(document: &D, root: &D::Node) -> Result<Scan<D::Node>> {
    let mut scanner = Scanner {
        document,
        settings: Vec::new(),
        presence_marked: Vec::new(),
        absence_consumed: Vec::new(),
    };
    scanner.walk(root)?;

    Ok(Scan {
        settings: scanner.settings,
        presence_marked: scanner.presence_marked,
        absence_consumed: scanner.absence_consumed,
    })
}

struct Scanner<'a, D: Document> {
    document: &'a D,
    settings: Vec<ConditionalRenderSetting<D::Node>>,
    presence_marked: Vec<D::Node>,
    absence_consumed: Vec<D::Node>,
}

impl<D: Document> Scanner<'_, D> {
    fn walk(&mut self, parent: &D::Node) -> Result<()> {
        let mut ordinal = 0;

        for node in self.document.child_nodes(parent) {
            let position = self.document.is_element(&node).then(|| {
                ordinal += 1;
                ordinal - 1
            });

            // Nested subtrees first, then this level's pairing
            if self.document.has_child_nodes(&node) {
                self.walk(&node)?;
            }

            if let Some(position) = position {
                self.visit(&node, parent, position)?;
            }
        }
        Ok(())
    }

    fn visit(&mut self, node: &D::Node, parent: &D::Node, position: usize) -> Result<()> {
        let markers = self.markers(node);
        if markers.is_orphaned_absence() {
            return Err(conflict(ORPHANED_ABSENCE));
        }
        if markers.is_conflicting() {
            return Err(conflict(BOTH_MARKERS));
        }

        if !markers.contains(Markers::PRESENCE) {
            return Ok(());
        }
        self.presence_marked.push(node.clone());
        let key = self
            .document
            .get_attribute(node, PRESENCE_ATTR)
            .filter(|key| !key.is_empty());

        // Only a presence-marked element can claim the `_else` after it
        let mut alternate = None;
        if let Some(sibling) = self.document.next_element_sibling(node) {
            let sibling_markers = self.markers(&sibling);
            if sibling_markers.contains(Markers::ABSENCE) {
                if sibling_markers.contains(Markers::PRESENCE) {
                    return Err(conflict(BOTH_MARKERS));
                }
                self.absence_consumed.push(sibling.clone());
                alternate = Some(sibling);
            }
        }

        if let Some(condition_key) = key {
            self.settings.push(ConditionalRenderSetting {
                target: node.clone(),
                alternate,
                condition_key,
                position_index: position,
                parent_container: parent.clone(),
            });
        }
        Ok(())
    }

    /// Markers as they would be after earlier pairings stripped `_else`.
    fn markers(&self, node: &D::Node) -> Markers {
        let mut markers = Markers::of(self.document, node);
        if self.absence_consumed.contains(node) {
            markers.remove(Markers::ABSENCE);
        }
        markers
    }
}

fn conflict(reason: &str) -> Error {
    Error::MarkerConflict {
        reason: reason.to_string(),
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::MemoryDocument;

    #[test]
    fn test_scan_pairs_presence_with_following_absence() {
        let doc = MemoryDocument::new();
        let root = doc.element(doc.body(), "div", &[]);
        doc.element(root, "h1", &[]);
        let a = doc.element(root, "p", &[(PRESENCE_ATTR, "open")]);
        let b = doc.element(root, "p", &[(ABSENCE_ATTR, "")]);

        let scan = scan(&doc, &root).unwrap();

        assert_eq!(
            scan.settings,
            vec![ConditionalRenderSetting {
                target: a,
                alternate: Some(b),
                condition_key: "open".into(),
                position_index: 1,
                parent_container: root,
            }]
        );
        assert!(doc.has_attribute(&a, PRESENCE_ATTR), "scan is read only");

        scan.strip_markers(&doc);
        assert!(!doc.has_attribute(&a, PRESENCE_ATTR));
        assert!(!doc.has_attribute(&b, ABSENCE_ATTR));
    }

    #[test]
    fn test_scan_counts_only_elements_for_position() {
        let doc = MemoryDocument::new();
        let root = doc.element(doc.body(), "div", &[]);
        doc.text(root, "leading text");
        doc.element(root, "span", &[]);
        doc.text(root, "more text");
        let target = doc.element(root, "p", &[(PRESENCE_ATTR, "k")]);

        let scan = scan(&doc, &root).unwrap();
        assert_eq!(scan.settings[0].target, target);
        assert_eq!(scan.settings[0].position_index, 1);
    }

    #[test]
    fn test_scan_nested_settings_use_their_own_parent() {
        let doc = MemoryDocument::new();
        let root = doc.element(doc.body(), "div", &[]);
        let section = doc.element(root, "section", &[(PRESENCE_ATTR, "outer")]);
        let inner = doc.element(section, "p", &[(PRESENCE_ATTR, "inner")]);

        let scan = scan(&doc, &root).unwrap();

        // Children are scanned before their parent is evaluated
        assert_eq!(scan.settings.len(), 2);
        assert_eq!(scan.settings[0].target, inner);
        assert_eq!(scan.settings[0].parent_container, section);
        assert_eq!(scan.settings[1].target, section);
        assert_eq!(scan.settings[1].parent_container, root);
    }

    #[test]
    fn test_scan_rejects_orphaned_absence() {
        let doc = MemoryDocument::new();
        let root = doc.element(doc.body(), "div", &[]);
        doc.element(root, "p", &[]);
        doc.element(root, "p", &[(ABSENCE_ATTR, "")]);

        let err = scan(&doc, &root).unwrap_err();
        assert!(matches!(err, Error::MarkerConflict { .. }));
    }

    #[test]
    fn test_scan_unmarked_element_does_not_claim_absence() {
        let doc = MemoryDocument::new();
        let root = doc.element(doc.body(), "div", &[]);
        doc.element(root, "p", &[(PRESENCE_ATTR, "k")]);
        doc.element(root, "p", &[]);
        let orphan = doc.element(root, "p", &[(ABSENCE_ATTR, "")]);

        let err = scan(&doc, &root).unwrap_err();
        assert!(matches!(err, Error::MarkerConflict { ref reason } if reason == ORPHANED_ABSENCE));
        assert!(doc.has_attribute(&orphan, ABSENCE_ATTR), "nothing stripped");
    }

    #[test]
    fn test_scan_rejects_both_markers_on_paired_sibling() {
        let doc = MemoryDocument::new();
        let root = doc.element(doc.body(), "div", &[]);
        doc.element(root, "p", &[(PRESENCE_ATTR, "a")]);
        doc.element(root, "p", &[(PRESENCE_ATTR, "b"), (ABSENCE_ATTR, "")]);

        assert!(scan(&doc, &root).is_err());
    }

    #[test]
    fn test_scan_rejects_nested_orphan() {
        let doc = MemoryDocument::new();
        let root = doc.element(doc.body(), "div", &[]);
        let section = doc.element(root, "section", &[]);
        doc.element(section, "p", &[(ABSENCE_ATTR, "")]);

        assert!(scan(&doc, &root).is_err(), "orphans are rejected at every depth");
    }

    #[test]
    fn test_scan_empty_key_is_not_committed() {
        let doc = MemoryDocument::new();
        let root = doc.element(doc.body(), "div", &[]);
        let p = doc.element(root, "p", &[(PRESENCE_ATTR, "")]);

        let scan = scan(&doc, &root).unwrap();
        assert!(scan.settings.is_empty());

        scan.strip_markers(&doc);
        assert!(!doc.has_attribute(&p, PRESENCE_ATTR), "marker still consumed");
    }
}

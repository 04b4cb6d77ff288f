//! Presence and absence markers.

use crate::target::Document;

/// Attribute holding the condition key of a presence-marked element.
pub const PRESENCE_ATTR: &str = "_if";

/// Attribute flagging the alternate of the preceding presence-marked element.
pub const ABSENCE_ATTR: &str = "_else";

bitflags::bitflags! {
    /// Markers carried by one element.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Markers: u8 {
        const PRESENCE = 1 << 0;
        const ABSENCE = 1 << 1;
    }
}

impl Markers {
    /// Read the markers currently on `element`.
    pub fn of<D: Document>(document: &D, element: &D::Node) -> Self {
        let mut markers = Markers::empty();
        if document.has_attribute(element, PRESENCE_ATTR) {
            markers |= Markers::PRESENCE;
        }
        if document.has_attribute(element, ABSENCE_ATTR) {
            markers |= Markers::ABSENCE;
        }
        markers
    }

    /// Both markers on one element.
    pub fn is_conflicting(self) -> bool {
        self.contains(Markers::PRESENCE | Markers::ABSENCE)
    }

    /// Absence marker with nothing to pair it.
    pub fn is_orphaned_absence(self) -> bool {
        self.contains(Markers::ABSENCE) && !self.contains(Markers::PRESENCE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::MemoryDocument;

    #[test]
    fn test_markers_of_element() {
        let doc = MemoryDocument::new();
        let plain = doc.element(doc.body(), "p", &[]);
        let shown = doc.element(doc.body(), "p", &[(PRESENCE_ATTR, "open")]);
        let both = doc.element(doc.body(), "p", &[(PRESENCE_ATTR, "x"), (ABSENCE_ATTR, "")]);

        assert!(Markers::of(&doc, &plain).is_empty());
        assert_eq!(Markers::of(&doc, &shown), Markers::PRESENCE);
        assert!(Markers::of(&doc, &both).is_conflicting());
        assert!(!Markers::of(&doc, &both).is_orphaned_absence());
        assert!(Markers::ABSENCE.is_orphaned_absence());
    }
}

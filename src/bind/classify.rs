//! Field classification by name.

/// Fields mirrored to a live element property instead of an attribute.
pub const SPECIAL_FIELDS: [&str; 3] = ["value", "currentTime", "checked"];

/// Event names recognized after the `on` prefix.
pub const DOM_EVENTS: &[&str] = &[
    // Mouse
    "click", "dblclick", "contextmenu", "mousedown", "mouseup", "mousemove",
    "mouseover", "mouseout", "mouseenter", "mouseleave", "wheel",
    // Pointer / touch
    "pointerdown", "pointerup", "pointermove", "pointerover", "pointerout",
    "pointerenter", "pointerleave", "pointercancel", "touchstart", "touchend",
    "touchmove", "touchcancel",
    // Keyboard
    "keydown", "keyup", "keypress",
    // Focus
    "focus", "blur", "focusin", "focusout",
    // Forms
    "input", "change", "submit", "reset", "invalid", "select", "beforeinput",
    // Drag and drop
    "drag", "dragstart", "dragend", "dragenter", "dragleave", "dragover", "drop",
    // Clipboard
    "copy", "cut", "paste",
    // Media
    "play", "pause", "playing", "ended", "timeupdate", "volumechange",
    "seeking", "seeked", "canplay", "canplaythrough", "loadeddata",
    "loadedmetadata", "durationchange", "ratechange", "waiting", "stalled",
    // Resources
    "load", "error", "abort", "scroll", "resize",
    // Animation / transition
    "animationstart", "animationend", "animationiteration", "transitionend",
    "toggle",
];

/// How a manager field is synchronized with its element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Mirrors a live element property.
    Special,
    /// Installs an event handler; cannot be read back.
    Event,
    /// Mirrors an attribute through a shadow value.
    Plain,
}

/// Classify a field name. Precedence: special, then event, then plain.
pub fn classify(name: &str) -> FieldKind {
    if is_special(name) {
        FieldKind::Special
    } else if is_event(name) {
        FieldKind::Event
    } else {
        FieldKind::Plain
    }
}

pub fn is_special(name: &str) -> bool {
    SPECIAL_FIELDS.contains(&name)
}

/// `on` followed by a recognized event name. Handler properties are lowercase,
/// so `onClick` is a plain field.
pub fn is_event(name: &str) -> bool {
    name.strip_prefix("on")
        .is_some_and(|event| DOM_EVENTS.contains(&event))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(classify("value"), FieldKind::Special);
        assert_eq!(classify("checked"), FieldKind::Special);
        assert_eq!(classify("currentTime"), FieldKind::Special);
        assert_eq!(classify("onclick"), FieldKind::Event);
        assert_eq!(classify("oninput"), FieldKind::Event);
        assert_eq!(classify("onClick"), FieldKind::Plain, "handler properties are lowercase");
        assert_eq!(classify("class"), FieldKind::Plain);
    }

    #[test]
    fn test_on_prefix_alone_is_not_an_event() {
        assert_eq!(classify("online"), FieldKind::Plain);
        assert_eq!(classify("on"), FieldKind::Plain);
        assert_eq!(classify("click"), FieldKind::Plain, "prefix is required");
    }
}

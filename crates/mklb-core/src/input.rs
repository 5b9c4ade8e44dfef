#![forbid(unsafe_code)]

//! User input understood by the lightbox.

/// A key release, decoded from `KeyboardEvent.code`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Escape,
    ArrowLeft,
    ArrowRight,
    /// Any key the lightbox does not react to.
    Other,
}

impl Key {
    /// Decode a physical key code. Matching is exact.
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code {
            "Escape" => Key::Escape,
            "ArrowLeft" => Key::ArrowLeft,
            "ArrowRight" => Key::ArrowRight,
            _ => Key::Other,
        }
    }
}

/// A clickable part of a viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    /// The original image on the page.
    Trigger,
    /// The close button.
    Close,
    /// The wrapper itself, outside any slide or button.
    Backdrop,
    Previous,
    Next,
}

/// What a viewer does in response to input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewerAction {
    Open,
    Close,
    Previous,
    Next,
}

impl ViewerAction {
    /// Action for a key while the viewer is open.
    #[must_use]
    pub fn for_key(key: Key) -> Option<Self> {
        match key {
            Key::Escape => Some(ViewerAction::Close),
            Key::ArrowLeft => Some(ViewerAction::Previous),
            Key::ArrowRight => Some(ViewerAction::Next),
            Key::Other => None,
        }
    }

    /// Action for a click on `control`.
    ///
    /// `on_wrapper` tells whether the event target was the wrapper itself;
    /// only then does a click reaching the wrapper dismiss the viewer.
    #[must_use]
    pub fn for_click(control: Control, on_wrapper: bool) -> Option<Self> {
        match control {
            Control::Trigger => Some(ViewerAction::Open),
            Control::Close => Some(ViewerAction::Close),
            Control::Backdrop if on_wrapper => Some(ViewerAction::Close),
            Control::Backdrop => None,
            Control::Previous => Some(ViewerAction::Previous),
            Control::Next => Some(ViewerAction::Next),
        }
    }
}

use crate::images::ImagePolicy;

/// Default display text for a link inserted without a selection.
pub const DEFAULT_LINK_TEXT: &str = "link";

/// Editor behaviour knobs, usually filled from `lectern.config.json`.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorOptions {
    /// Maximum undo levels (0 = unlimited)
    pub history_depth: usize,

    /// Read-only editors ignore keyboard input and commands
    pub read_only: bool,

    pub default_link_text: String,

    pub image_policy: ImagePolicy,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            history_depth: 100,
            read_only: false,
            default_link_text: DEFAULT_LINK_TEXT.to_string(),
            image_policy: ImagePolicy::default(),
        }
    }
}

impl EditorOptions {
    pub fn read_only() -> Self {
        Self {
            read_only: true,
            ..Self::default()
        }
    }
}

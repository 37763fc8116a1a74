use lectern_editor::{EditorOptions, ImagePolicy, DEFAULT_LINK_TEXT};
use lectern_renderer::{HtmlOptions, RenderMode, RenderOptions, DEFAULT_PLACEHOLDER};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_NAME: &str = "lectern.config.json";

/// Lectern configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Largest accepted image file, in bytes
    #[serde(default = "default_max_image_bytes")]
    pub max_image_bytes: usize,

    /// MIME prefix an image file must carry
    #[serde(default = "default_accepted_mime_prefix")]
    pub accepted_mime_prefix: String,

    /// Text shown in an empty editable document
    #[serde(default = "default_placeholder")]
    pub placeholder: String,

    /// Display text for links inserted without a selection
    #[serde(default = "default_link_text")]
    pub default_link_text: String,

    /// Maximum undo levels (0 = unlimited)
    #[serde(default = "default_history_depth")]
    pub history_depth: usize,

    /// Indent rendered HTML
    #[serde(default = "default_pretty_html")]
    pub pretty_html: bool,
}

fn default_max_image_bytes() -> usize {
    ImagePolicy::default().max_bytes
}

fn default_accepted_mime_prefix() -> String {
    ImagePolicy::default().accepted_prefix
}

fn default_placeholder() -> String {
    DEFAULT_PLACEHOLDER.to_string()
}

fn default_link_text() -> String {
    DEFAULT_LINK_TEXT.to_string()
}

fn default_history_depth() -> usize {
    EditorOptions::default().history_depth
}

fn default_pretty_html() -> bool {
    true
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &str) -> anyhow::Result<Self> {
        Self::load_from(&PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME))
    }

    /// Load a specific config file; a missing file gives the defaults.
    pub fn load_from(config_path: &Path) -> anyhow::Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            tracing::debug!(path = %config_path.display(), "config loaded");
            Ok(config)
        } else {
            // Return default config if none exists
            Ok(Config::default())
        }
    }

    pub fn editor_options(&self) -> EditorOptions {
        EditorOptions {
            history_depth: self.history_depth,
            read_only: false,
            default_link_text: self.default_link_text.clone(),
            image_policy: ImagePolicy {
                max_bytes: self.max_image_bytes,
                accepted_prefix: self.accepted_mime_prefix.clone(),
            },
        }
    }

    pub fn render_options(&self, mode: RenderMode) -> RenderOptions {
        RenderOptions {
            mode,
            placeholder: self.placeholder.clone(),
        }
    }

    pub fn html_options(&self) -> HtmlOptions {
        HtmlOptions {
            pretty: self.pretty_html,
            ..HtmlOptions::default()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_image_bytes: default_max_image_bytes(),
            accepted_mime_prefix: default_accepted_mime_prefix(),
            placeholder: default_placeholder(),
            default_link_text: default_link_text(),
            history_depth: default_history_depth(),
            pretty_html: default_pretty_html(),
        }
    }
}

/// Default viewport when none is requested.
pub const DEFAULT_VIEWPORT: (u32, u32) = (1280, 720);

/// Window-level settings for [`crate::run_window`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowOptions {
    /// Logical viewport; the render target is derived from it by the config.
    pub viewport: (u32, u32),
    /// Prefix of the window title; the current option string follows it.
    pub title: String,
}

impl WindowOptions {
    pub fn new(viewport: (u32, u32)) -> Self {
        Self {
            viewport,
            title: "quadview".to_string(),
        }
    }

    pub fn title_for(&self, options: &str) -> String {
        if options.is_empty() {
            self.title.clone()
        } else {
            format!("{} #{options}", self.title)
        }
    }
}

impl Default for WindowOptions {
    fn default() -> Self {
        Self::new(DEFAULT_VIEWPORT)
    }
}

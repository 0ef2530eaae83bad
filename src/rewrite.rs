//! Expansion of templated path names.

use log::debug;

use crate::error::{Error, Result};
use crate::platform::Platform;
use crate::renderer::TemplateRenderer;

/// Renders every segment of a `/`-separated relative path on its own.
///
/// For example, with `tests=false` the path
/// `{% if tests %}tests{% endif %}/{{ name }}.rs` is suppressed as a whole, because its
/// first segment renders to nothing.
pub struct PathRewriter<'a> {
    renderer: &'a dyn TemplateRenderer,
    platform: Platform,
}

impl<'a> PathRewriter<'a> {
    pub fn new(renderer: &'a dyn TemplateRenderer, platform: Platform) -> Self {
        Self { renderer, platform }
    }

    /// Returns the expanded path joined with the platform separator, or `None` when a
    /// segment renders to the empty string.
    ///
    /// Whitespace is removed from rendered segments. Empty input segments, such as the
    /// leading one of `/abs/path`, are kept as they are.
    pub fn rewrite(
        &self,
        relative_path: &str,
        context: &serde_json::Value,
    ) -> Result<Option<String>> {
        let mut segments = Vec::new();
        for segment in relative_path.split('/') {
            if segment.is_empty() {
                segments.push(String::new());
                continue;
            }
            let rendered = self.render_segment(relative_path, segment, context)?;
            if rendered.is_empty() {
                debug!("Path '{relative_path}' suppressed by segment '{segment}'");
                return Ok(None);
            }
            segments.push(rendered);
        }
        Ok(Some(segments.join(&self.platform.separator().to_string())))
    }

    fn render_segment(
        &self,
        relative_path: &str,
        segment: &str,
        context: &serde_json::Value,
    ) -> Result<String> {
        let compiled = self.renderer.compile(segment).map_err(|source| Error::TemplateParse {
            path: relative_path.to_string(),
            source,
        })?;
        let rendered =
            self.renderer.render(&compiled, context).map_err(|source| Error::TemplateRender {
                path: relative_path.to_string(),
                source,
            })?;
        Ok(rendered.chars().filter(|c| !c.is_whitespace()).collect())
    }
}

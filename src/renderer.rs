//! Template engine abstraction for the scaffolder.
//! The builder only sees [`TemplateRenderer`]; MiniJinja is the bundled engine.
use crate::error::BoxError;
use cruet::Inflector;
use minijinja::Environment;

/// Template text whose syntax has been checked by an engine.
///
/// Compiling is a validation pass: only the source is kept, and engines parse it
/// again on every render.
#[derive(Debug, Clone)]
pub struct CompiledTemplate {
    source: String,
}

impl CompiledTemplate {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// Template text as it was compiled.
    pub fn source(&self) -> &str {
        &self.source
    }
}

/// Trait for template rendering engines.
pub trait TemplateRenderer {
    /// Parses a template string, failing on malformed expressions.
    fn compile(&self, template: &str) -> Result<CompiledTemplate, BoxError>;

    /// Renders a compiled template with the given context.
    fn render(
        &self,
        template: &CompiledTemplate,
        context: &serde_json::Value,
    ) -> Result<String, BoxError>;

    /// Markers that close a template expression, e.g. `}}`.
    ///
    /// A source file name ending with one of them has its own name rendered before
    /// the template suffix is stripped.
    fn closing_markers(&self) -> &[&str];
}

/// MiniJinja-based template rendering engine.
pub struct MiniJinjaRenderer {
    /// MiniJinja environment instance
    env: Environment<'static>,
}

impl MiniJinjaRenderer {
    /// Creates a new engine with the case-conversion filters registered.
    /// Rendered files keep their trailing newline.
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_keep_trailing_newline(true);
        env.add_filter("snake_case", |value: String| value.to_snake_case());
        env.add_filter("kebab_case", |value: String| value.to_kebab_case());
        env.add_filter("camel_case", |value: String| value.to_camel_case());
        env.add_filter("pascal_case", |value: String| value.to_pascal_case());
        env.add_filter("screaming_snake_case", |value: String| {
            value.to_screaming_snake_case()
        });
        Self { env }
    }
}

impl Default for MiniJinjaRenderer {
    fn default() -> Self {
        MiniJinjaRenderer::new()
    }
}

impl TemplateRenderer for MiniJinjaRenderer {
    fn compile(&self, template: &str) -> Result<CompiledTemplate, BoxError> {
        self.env.template_from_str(template)?;
        Ok(CompiledTemplate::new(template))
    }

    fn render(
        &self,
        template: &CompiledTemplate,
        context: &serde_json::Value,
    ) -> Result<String, BoxError> {
        Ok(self.env.render_str(template.source(), context)?)
    }

    fn closing_markers(&self) -> &[&str] {
        &["}}", "%}"]
    }
}

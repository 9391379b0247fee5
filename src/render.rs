//! Template rendering capability.
//!
//! The walker only needs "render(source, context) -> text"; [`Renderer`] is that
//! seam. [`MiniJinjaRenderer`] is the engine used unless a caller supplies one.

use minijinja::{Environment, UndefinedBehavior};

use crate::error::RenderError;

/// Data handed unchanged to every template rendered during one walk
pub type RenderContext = serde_json::Value;

/// Something that can turn template source into output text
pub trait Renderer {
    /// Render `source` against `context`. `name` identifies the template in
    /// error messages and is usually the source path.
    fn render(&self, name: &str, source: &str, context: &RenderContext)
        -> Result<String, RenderError>;
}

/// Jinja-style templates backed by `minijinja`.
///
/// Undefined variables are an error rather than rendering as empty, and a
/// trailing newline in the template survives into the output.
pub struct MiniJinjaRenderer {
    env: Environment<'static>,
}

impl MiniJinjaRenderer {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_keep_trailing_newline(true);
        Self { env }
    }
}

impl Default for MiniJinjaRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for MiniJinjaRenderer {
    fn render(
        &self,
        name: &str,
        source: &str,
        context: &RenderContext,
    ) -> Result<String, RenderError> {
        self.env
            .render_named_str(name, source, context)
            .map_err(|e| RenderError::new(e.to_string()))
    }
}

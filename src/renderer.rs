//! Template rendering for modulith.
//! Wraps MiniJinja behind a small trait so the manifest writer can be driven
//! by any engine, and supports per-template delimiter overrides.
use crate::error::Result;
use minijinja::syntax::SyntaxConfig;
use minijinja::{AutoEscape, Environment, UndefinedBehavior};

/// Delimiter set used to interpolate a template.
///
/// Some generated formats contain text that collides with the default Jinja
/// delimiters or reads badly with them (XML changelogs, CQL, CSV seeds and
/// Gatling simulations), so those templates use an alternative set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delimiters {
    pub block: (&'static str, &'static str),
    pub variable: (&'static str, &'static str),
    pub comment: (&'static str, &'static str),
}

impl Delimiters {
    /// `[% block %]`, `[[ variable ]]` and `[# comment #]`.
    pub const SQUARE: Delimiters = Delimiters {
        block: ("[%", "%]"),
        variable: ("[[", "]]"),
        comment: ("[#", "#]"),
    };

    fn syntax(&self) -> Result<SyntaxConfig> {
        Ok(SyntaxConfig::builder()
            .block_delimiters(self.block.0, self.block.1)
            .variable_delimiters(self.variable.0, self.variable.1)
            .comment_delimiters(self.comment.0, self.comment.1)
            .build()?)
    }
}

/// Trait for template rendering engines.
pub trait TemplateRenderer {
    /// Renders a template string with the given context.
    ///
    /// # Arguments
    /// * `name` - Template identifier, used in error messages
    /// * `template` - Template source to render
    /// * `context` - Variables available to the template
    /// * `delimiters` - Optional delimiter override
    ///
    /// # Returns
    /// * `Result<String>` - Rendered template string
    fn render(
        &self,
        name: &str,
        template: &str,
        context: &serde_json::Value,
        delimiters: Option<&Delimiters>,
    ) -> Result<String>;
}

/// MiniJinja-based template rendering engine.
pub struct MiniJinjaRenderer {
    /// MiniJinja environment instance
    env: Environment<'static>,
}

impl MiniJinjaRenderer {
    /// Creates a renderer that fails on any undefined variable and keeps the
    /// trailing newline of every template.
    ///
    /// Generated sources are written verbatim, so auto-escaping is off for
    /// every extension (`.xml`, `.yml` included).
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_keep_trailing_newline(true);
        env.set_trim_blocks(true);
        Self { env }
    }
}

impl Default for MiniJinjaRenderer {
    fn default() -> Self {
        MiniJinjaRenderer::new()
    }
}

impl TemplateRenderer for MiniJinjaRenderer {
    /// Renders a template string using MiniJinja.
    ///
    /// # Errors
    /// * `Error::RenderError` if:
    ///   - The delimiter override is invalid
    ///   - The template fails to parse
    ///   - The template references an undefined variable
    fn render(
        &self,
        name: &str,
        template: &str,
        context: &serde_json::Value,
        delimiters: Option<&Delimiters>,
    ) -> Result<String> {
        match delimiters {
            None => Ok(self.env.render_named_str(name, template, context)?),
            Some(delimiters) => {
                let mut env = self.env.clone();
                env.set_syntax(delimiters.syntax()?);
                Ok(env.render_named_str(name, template, context)?)
            }
        }
    }
}

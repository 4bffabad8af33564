//! Verification email templates rendered with `tera`.

use serde_json::Value;
use tera::{Context, Tera};

use campaign_application::TemplateRenderer;
use campaign_core::{AppError, AppResult};

/// Template renderer backed by a preloaded `tera` template set.
#[derive(Debug)]
pub struct TeraTemplateRenderer {
    tera: Tera,
}

impl TeraTemplateRenderer {
    /// Loads every template matching `glob`, e.g. `templates/**/*.html`.
    pub fn from_glob(glob: &str) -> AppResult<Self> {
        let tera = Tera::new(glob).map_err(|error| {
            AppError::Validation(format!("failed to load email templates from '{glob}': {error}"))
        })?;

        Ok(Self { tera })
    }

    /// Builds a renderer from in-memory `(name, source)` pairs.
    pub fn from_raw_templates(templates: &[(&str, &str)]) -> AppResult<Self> {
        let mut tera = Tera::default();
        tera.add_raw_templates(templates.iter().copied())
            .map_err(|error| {
                AppError::Validation(format!("failed to parse email templates: {error}"))
            })?;

        Ok(Self { tera })
    }
}

impl TemplateRenderer for TeraTemplateRenderer {
    fn render(&self, template: &str, context: &Value) -> AppResult<String> {
        let context = Context::from_value(context.clone()).map_err(|error| {
            AppError::Internal(format!("invalid context for template '{template}': {error}"))
        })?;

        self.tera.render(template, &context).map_err(|error| {
            AppError::Internal(format!("failed to render template '{template}': {error}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use campaign_application::TemplateRenderer;
    use serde_json::json;

    use super::TeraTemplateRenderer;

    #[test]
    fn renders_context_values() {
        let renderer = TeraTemplateRenderer::from_raw_templates(&[(
            "verify.html",
            "<h1>{{ mailing_list.title }}</h1><p>{{ message }}</p><a href=\"{{ url }}\">Verify</a>",
        )])
        .unwrap_or_else(|_| panic!("test"));

        let rendered = renderer.render(
            "verify.html",
            &json!({
                "message": "Please verify",
                "url": "http://localhost/forms/verify-subscribe?token=abc",
                "mailing_list": { "title": "Weekly" },
            }),
        );

        let rendered = rendered.unwrap_or_else(|_| panic!("test"));
        assert!(rendered.contains("<h1>Weekly</h1>"));
        assert!(rendered.contains("<p>Please verify</p>"));
        assert!(rendered.contains("token=abc"));
    }

    #[test]
    fn unknown_template_is_an_error() {
        let renderer =
            TeraTemplateRenderer::from_raw_templates(&[]).unwrap_or_else(|_| panic!("test"));

        assert!(renderer.render("missing.html", &json!({})).is_err());
    }
}

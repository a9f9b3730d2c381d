//! Template post-processor.
//!
//! Templates use Jinja syntax. References written in the dotted style
//! `{{.Title}}` are accepted and rewritten to `{{ Title }}` before compiling.
//! Fields are exposed as `Id`, `Time`, `Event`, `Topic`, `Title`, `Message`
//! and as their lowercase forms. Unknown names are render errors.
//!
//! Only field references get the dotted rewrite. Go template actions such as
//! `{{if .Title}}...{{end}}` or `{{printf "%s" .Title}}` fail to compile and
//! have to be written in Jinja: `{% if Title %}...{% endif %}`, filters.

use async_trait::async_trait;
use minijinja::{context, Environment, UndefinedBehavior, Value};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::fmt;
use std::path::Path;

use super::PostProcessor;
use crate::error::{ConfigError, ProcessError};
use crate::ntfy::{EventKind, NotificationEvent, OutboundMessage};

const TEMPLATE_NAME: &str = "message";

static TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{.*?\}\}").expect("Invalid template tag regex"));

static DOTTED_FIELD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(^|[\s(,|!{-])\.([A-Za-z_][A-Za-z0-9_]*)").expect("Invalid dotted field regex")
});

/// Rewrite `.Field` references inside `{{ }}` tags to bare names.
pub fn normalize_template(source: &str) -> String {
    TAG_RE
        .replace_all(source, |tag: &Captures| {
            DOTTED_FIELD_RE
                .replace_all(&tag[0], "${1}${2}")
                .into_owned()
        })
        .into_owned()
}

fn event_context(event: &NotificationEvent) -> Value {
    context! {
        Id => &event.id,
        Time => event.timestamp,
        Event => event.kind.as_str(),
        Topic => &event.topic,
        Title => &event.title,
        Message => &event.body,
        id => &event.id,
        time => event.timestamp,
        event => event.kind.as_str(),
        topic => &event.topic,
        title => &event.title,
        message => &event.body,
    }
}

/// Populated record used to exercise a template at construction.
fn sample_event() -> NotificationEvent {
    NotificationEvent {
        id: "test-id".to_string(),
        timestamp: 1640995200,
        kind: EventKind::Message,
        topic: "test-topic".to_string(),
        title: "Test Title".to_string(),
        body: "Test Message".to_string(),
    }
}

/// Renders each event through a compiled template.
pub struct TemplateTransform {
    env: Environment<'static>,
}

impl fmt::Debug for TemplateTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateTransform").finish_non_exhaustive()
    }
}

impl TemplateTransform {
    /// Compile `source` and render it against an empty and a populated
    /// record, so field errors surface now rather than on the first message.
    pub fn new(source: &str) -> Result<Self, ConfigError> {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_keep_trailing_newline(true);
        env.add_template_owned(TEMPLATE_NAME, normalize_template(source))
            .map_err(|e| ConfigError::TemplateSyntax(e.to_string()))?;

        let transform = Self { env };
        for (sample, event) in [("empty", NotificationEvent::default()), ("sample", sample_event())] {
            transform
                .render(&event)
                .map_err(|e| ConfigError::TemplateValidation {
                    sample,
                    message: e.to_string(),
                })?;
        }
        Ok(transform)
    }

    /// Load the template from a file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::TemplateFile {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "Loaded template file");
        Self::new(&source)
    }

    fn render(&self, event: &NotificationEvent) -> Result<String, minijinja::Error> {
        self.env
            .get_template(TEMPLATE_NAME)?
            .render(event_context(event))
    }
}

#[async_trait]
impl PostProcessor for TemplateTransform {
    async fn process(&self, event: &NotificationEvent) -> Result<OutboundMessage, ProcessError> {
        let text = self
            .render(event)
            .map_err(|e| ProcessError::Render(e.to_string()))?;
        Ok(OutboundMessage::new(text))
    }

    fn name(&self) -> &'static str {
        "template"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_normalize_dotted_fields() {
        assert_eq!(normalize_template("{{.Title}}: {{.Message}}"), "{{Title}}: {{Message}}");
        assert_eq!(normalize_template("{{ .Title | upper }}"), "{{ Title | upper }}");
        assert_eq!(normalize_template("{{- .Topic -}}"), "{{- Topic -}}");
    }

    #[test]
    fn test_normalize_leaves_text_alone() {
        assert_eq!(normalize_template("see .Title here"), "see .Title here");
        assert_eq!(normalize_template("{{ a.b }}"), "{{ a.b }}");
    }

    #[tokio::test]
    async fn test_dotted_template_renders() {
        let transform = TemplateTransform::new("{{.Title}}: {{.Message}}").unwrap();
        let out = transform
            .process(&NotificationEvent::message("A", "B"))
            .await
            .unwrap();
        assert_eq!(out.text, "A: B");
    }

    #[tokio::test]
    async fn test_jinja_template_with_lowercase_names() {
        let transform =
            TemplateTransform::new("[{{ topic }}] {% if title %}{{ title }} - {% endif %}{{ message }}")
                .unwrap();

        let mut event = NotificationEvent::message("", "disk full");
        event.topic = "ops".to_string();
        let out = transform.process(&event).await.unwrap();
        assert_eq!(out.text, "[ops] disk full");
    }

    #[test]
    fn test_syntax_error_fails_construction() {
        let err = TemplateTransform::new("{{ Title ").unwrap_err();
        assert!(matches!(err, ConfigError::TemplateSyntax(_)));
    }

    #[test]
    fn test_go_actions_fail_construction() {
        assert!(TemplateTransform::new("{{if .Title}}{{.Title}}{{end}}").is_err());
        assert!(TemplateTransform::new("{{printf \"%s\" .Message}}").is_err());

        let jinja = TemplateTransform::new("{% if Title %}{{ Title }}: {% endif %}{{ Message }}")
            .unwrap();
        assert_eq!(jinja.render(&NotificationEvent::message("", "m")).unwrap(), "m");
        assert_eq!(jinja.render(&NotificationEvent::message("T", "m")).unwrap(), "T: m");
    }

    #[test]
    fn test_unknown_field_fails_construction() {
        let err = TemplateTransform::new("{{.Nope}}").unwrap_err();
        assert!(matches!(err, ConfigError::TemplateValidation { sample: "empty", .. }));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{{{.Topic}}}}/{{{{.Id}}}}").unwrap();

        let transform = TemplateTransform::from_file(file.path()).unwrap();
        let mut event = NotificationEvent::message("t", "m");
        event.topic = "alerts".to_string();
        event.id = "x9".to_string();
        assert_eq!(transform.render(&event).unwrap(), "alerts/x9");
    }

    #[test]
    fn test_missing_file() {
        let err = TemplateTransform::from_file("/definitely/not/here.tpl").unwrap_err();
        assert!(matches!(err, ConfigError::TemplateFile { .. }));
    }
}

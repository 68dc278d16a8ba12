//! Remote content for template-based windows.
//!
//! A load request names a document by url, optionally followed by
//! `#selector`. JSON documents describe a template (or a map of named
//! templates); anything else is used verbatim as the window body.

use std::path::PathBuf;

use serde::Deserialize;

use crate::config::{ActionHandler, StyleOverrides, WindowOptions};
use crate::error::PopupError;

pub trait ContentLoader {
    fn fetch(&self, url: &str) -> Result<String, PopupError>;
}

/// Resolves urls as filesystem paths, relative to `root` when set.
#[derive(Debug, Clone, Default)]
pub struct FileLoader {
    root: Option<PathBuf>,
}

impl FileLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }
}

impl ContentLoader for FileLoader {
    fn fetch(&self, url: &str) -> Result<String, PopupError> {
        let path = match &self.root {
            Some(root) => root.join(url),
            None => PathBuf::from(url),
        };
        tracing::debug!(path = %path.display(), "fetching window content");
        std::fs::read_to_string(&path).map_err(|err| PopupError::Fetch {
            url: url.to_string(),
            reason: err.to_string(),
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoadRequest {
    pub url: Option<String>,
    pub options: WindowOptions,
}

impl LoadRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            options: WindowOptions::default(),
        }
    }

    pub fn options(mut self, options: WindowOptions) -> Self {
        self.options = options;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Template {
    pub title: Option<String>,
    pub body: Option<String>,
    pub width: Option<u16>,
    pub height: Option<u16>,
    pub buttons: Vec<String>,
    pub style: Option<StyleOverrides>,
}

impl Template {
    /// Fill in whatever `options` leaves unset.
    pub fn apply_to(self, mut options: WindowOptions) -> WindowOptions {
        if options.title.is_none() {
            options.title = self.title;
        }
        if options.body.is_none() && options.text.is_none() {
            options.body = self.body;
        }
        if options.width.is_none() {
            options.width = self.width;
        }
        if options.height.is_none() {
            options.height = self.height;
        }
        if options.style.is_none() {
            options.style = self.style;
        }
        if options.actions.is_none() && !self.buttons.is_empty() {
            options.actions = Some(
                self.buttons
                    .into_iter()
                    .map(|name| {
                        let handler = ActionHandler::alias(name.clone());
                        (name, handler)
                    })
                    .collect(),
            );
        }
        options
    }
}

/// Split `path#selector`. An empty selector counts as none.
pub fn split_url(url: &str) -> (&str, Option<&str>) {
    match url.split_once('#') {
        Some((path, selector)) if !selector.is_empty() => (path, Some(selector)),
        Some((path, _)) => (path, None),
        None => (url, None),
    }
}

pub fn select_template(document: &str, selector: Option<&str>) -> Result<Template, PopupError> {
    let looks_like_json = document.trim_start().starts_with('{');
    let Some(selector) = selector else {
        if looks_like_json {
            return Ok(serde_json::from_str(document)?);
        }
        return Ok(Template {
            body: Some(document.to_string()),
            ..Template::default()
        });
    };
    if !looks_like_json {
        return Err(PopupError::TemplateNotFound(selector.to_string()));
    }
    let value: serde_json::Value = serde_json::from_str(document)?;
    let entry = value
        .get(selector)
        .cloned()
        .ok_or_else(|| PopupError::TemplateNotFound(selector.to_string()))?;
    Ok(serde_json::from_value(entry)?)
}

/// Resolve a request into window options, failing before any window state is
/// touched.
pub fn resolve_request(
    loader: &dyn ContentLoader,
    request: LoadRequest,
) -> Result<WindowOptions, PopupError> {
    let Some(url) = request.url.as_deref() else {
        return Err(PopupError::MissingUrl);
    };
    let (path, selector) = split_url(url);
    let document = loader.fetch(path)?;
    let template = select_template(&document, selector)?;
    Ok(template.apply_to(request.options))
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use std::io::Write;

    const DIALOGS: &str = indoc! {r#"
        {
            "confirm": { "title": "Confirm", "body": "Really?", "buttons": ["Ok", "Cancel"] },
            "about": { "title": "About", "width": 30, "height": 8 }
        }
    "#};

    #[test]
    fn split_url_handles_selectors() {
        assert_eq!(split_url("a.json#confirm"), ("a.json", Some("confirm")));
        assert_eq!(split_url("a.json#"), ("a.json", None));
        assert_eq!(split_url("a.json"), ("a.json", None));
    }

    #[test]
    fn selector_picks_named_template() {
        let template = select_template(DIALOGS, Some("about")).expect("template");
        assert_eq!(template.title.as_deref(), Some("About"));
        assert_eq!(template.width, Some(30));
    }

    #[test]
    fn unknown_selector_is_reported() {
        let err = select_template(DIALOGS, Some("nope")).expect_err("missing");
        assert!(matches!(err, PopupError::TemplateNotFound(name) if name == "nope"));
    }

    #[test]
    fn plain_text_becomes_body() {
        let template = select_template("hello there", None).expect("template");
        assert_eq!(template.body.as_deref(), Some("hello there"));
    }

    #[test]
    fn missing_url_is_rejected() {
        let err = resolve_request(&FileLoader::new(), LoadRequest::default()).expect_err("no url");
        assert_eq!(err.to_string(), "The url is not defined");
    }

    #[test]
    fn file_loader_reads_template_from_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut file = std::fs::File::create(dir.path().join("dialogs.json")).expect("create");
        file.write_all(DIALOGS.as_bytes()).expect("write");

        let loader = FileLoader::with_root(dir.path());
        let options = resolve_request(
            &loader,
            LoadRequest::new("dialogs.json#confirm")
                .options(WindowOptions::new().title("Override")),
        )
        .expect("resolved");
        assert_eq!(options.title.as_deref(), Some("Override"));
        assert_eq!(options.body.as_deref(), Some("Really?"));
        let names: Vec<_> = options
            .actions
            .as_ref()
            .map(|actions| actions.iter().map(|(name, _)| name.clone()).collect())
            .unwrap_or_default();
        assert_eq!(names, vec!["Ok".to_string(), "Cancel".to_string()]);
    }

    #[test]
    fn file_loader_reports_missing_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let loader = FileLoader::with_root(dir.path());
        let err = loader.fetch("absent.json").expect_err("missing");
        assert!(matches!(err, PopupError::Fetch { .. }));
    }
}

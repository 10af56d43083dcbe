//! Live preview for the active session
//!
//! `PreviewCoordinator` listens to registry events and re-renders the active
//! session once a burst of edits goes quiet. Style and font changes render
//! immediately. A failed render keeps the last good document on display.

use super::renderer::{MarkdownRenderer, RenderedDocument};
use super::styles::FontSettings;
use crate::config::Config;
use crate::error::RenderError;
use crate::state::{SessionEvent, SessionId, SessionRegistry};
use crate::utils::Debouncer;
use std::sync::mpsc::Receiver;
use std::time::Instant;

/// What a call to `poll` or `render_now` did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewStatus {
    /// Nothing was due
    Idle,
    /// A new document replaced the current one
    Rendered,
    /// Rendering failed; the previous document is still current
    Failed(RenderError),
}

/// Drives re-rendering of the active session
pub struct PreviewCoordinator {
    renderer: MarkdownRenderer,

    /// Style requested by the user; may be unknown, in which case
    /// renders fall back to Default and say so
    style_name: String,

    active_session: Option<SessionId>,

    debouncer: Debouncer,

    events: Option<Receiver<SessionEvent>>,

    /// Last successful render
    current: Option<RenderedDocument>,

    last_error: Option<RenderError>,

    /// Render on the next poll regardless of the debouncer
    render_requested: bool,
}

impl PreviewCoordinator {
    pub fn new(renderer: MarkdownRenderer, style_name: impl Into<String>, debounce_ms: u64) -> Self {
        Self {
            renderer,
            style_name: style_name.into(),
            active_session: None,
            debouncer: Debouncer::new(debounce_ms),
            events: None,
            current: None,
            last_error: None,
            render_requested: false,
        }
    }

    /// Build a coordinator from the editor font and preview settings
    pub fn from_config(config: &Config) -> Self {
        let mut renderer = MarkdownRenderer::new();
        renderer.set_font(FontSettings::from_config(&config.editor));
        Self::new(renderer, config.preview.style.clone(), config.preview.debounce_ms)
    }

    /// Start following `registry`; the active session renders on the next poll
    pub fn attach(&mut self, registry: &mut SessionRegistry) {
        self.events = Some(registry.subscribe());
        self.active_session = Some(registry.active_id());
        self.render_requested = true;
    }

    pub fn active_session(&self) -> Option<SessionId> {
        self.active_session
    }

    pub fn active_style_name(&self) -> &str {
        &self.style_name
    }

    /// Switch style and re-render the active session
    pub fn set_active_style(
        &mut self,
        style_name: impl Into<String>,
        registry: &SessionRegistry,
    ) -> PreviewStatus {
        self.style_name = style_name.into();
        log::debug!("Preview style set to {}", self.style_name);
        self.render_now(registry)
    }

    /// Update the font the base CSS inherits and re-render
    pub fn set_font(&mut self, font: FontSettings, registry: &SessionRegistry) -> PreviewStatus {
        self.renderer.set_font(font);
        self.render_now(registry)
    }

    /// Current preview document, if anything has rendered yet
    pub fn current(&self) -> Option<&RenderedDocument> {
        self.current.as_ref()
    }

    pub fn composed_html(&self) -> Option<&str> {
        self.current.as_ref().map(|doc| doc.composed_html.as_str())
    }

    /// Error from the most recent render, cleared by the next success
    pub fn last_error(&self) -> Option<&RenderError> {
        self.last_error.as_ref()
    }

    /// Whether an edit is waiting out the debounce period
    pub fn is_pending(&self) -> bool {
        self.render_requested || self.debouncer.is_pending()
    }

    /// Process registry events and render if due
    pub fn poll(&mut self, registry: &SessionRegistry, now: Instant) -> PreviewStatus {
        let events: Vec<SessionEvent> = match &self.events {
            Some(rx) => rx.try_iter().collect(),
            None => Vec::new(),
        };

        for event in events {
            self.handle_event(event, now);
        }

        if self.render_requested || self.debouncer.should_fire(now) {
            self.render_now(registry)
        } else {
            PreviewStatus::Idle
        }
    }

    fn handle_event(&mut self, event: SessionEvent, now: Instant) {
        match event {
            SessionEvent::ContentChanged { id } | SessionEvent::Reloaded { id } => {
                if self.active_session == Some(id) {
                    self.debouncer.trigger(now);
                }
            }
            SessionEvent::Activated { id } => {
                self.active_session = Some(id);
                self.debouncer.reset();
                self.render_requested = true;
            }
            SessionEvent::Closed { id } => {
                if self.active_session == Some(id) {
                    self.debouncer.reset();
                    self.render_requested = false;
                    self.active_session = None;
                }
            }
            _ => {}
        }
    }

    /// Render the active session immediately
    pub fn render_now(&mut self, registry: &SessionRegistry) -> PreviewStatus {
        self.render_requested = false;
        self.debouncer.reset();

        let Some(session) = self.active_session.and_then(|id| registry.get(id)) else {
            return PreviewStatus::Idle;
        };

        match self.renderer.render(&session.text(), &self.style_name) {
            Ok(document) => {
                self.current = Some(document);
                self.last_error = None;
                PreviewStatus::Rendered
            }
            Err(e) => {
                log::error!(
                    "Preview render of {} failed, keeping last good render: {}",
                    session.display_name(),
                    e
                );
                self.last_error = Some(e.clone());
                PreviewStatus::Failed(e)
            }
        }
    }
}

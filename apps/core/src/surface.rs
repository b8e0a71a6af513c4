//! Collaborators the widget drives but does not own: the visible input, the hidden
//! output field, the item list renderer, the dropdown overlay and the loading spinner.
//!
//! The `Shared*`/`Recording*` types are in-memory implementations backed by
//! `Rc<RefCell<_>>`, so a clone kept outside the widget observes what it did.

use std::cell::RefCell;
use std::rc::Rc;

use crate::highlight;
use crate::model::NormalizedItem;

pub trait TextInput {
    fn value(&self) -> String;
    fn set_value(&mut self, value: &str);
}

/// The form field that carries only the final output value.
pub trait OutputField {
    fn value(&self) -> String;
    fn set_value(&mut self, value: &str);
}

pub struct RenderModel<'a> {
    pub class_prefix: &'a str,
    pub hover_class: &'a str,
    pub query: &'a str,
    pub items: &'a [NormalizedItem],
}

pub trait Renderer {
    /// Rebuilds the item list and returns how many item elements it now exposes.
    fn render(&mut self, model: &RenderModel<'_>) -> usize;
    fn clear(&mut self);
    fn set_hover(&mut self, index: Option<usize>);
    fn scroll_into_view(&mut self, index: usize);
}

pub trait Overlay {
    fn show(&mut self);
    fn hide(&mut self);
    fn is_visible(&self) -> bool;
}

pub trait Spinner {
    fn show(&mut self);
    fn hide(&mut self);
}

pub struct Surface {
    pub input: Box<dyn TextInput>,
    pub field: Box<dyn OutputField>,
    pub renderer: Box<dyn Renderer>,
    pub overlay: Box<dyn Overlay>,
    pub spinner: Box<dyn Spinner>,
}

impl Surface {
    /// An in-memory surface plus a probe that shares its state.
    pub fn recording(initial_text: &str) -> (Self, SurfaceProbe) {
        let probe = SurfaceProbe {
            input: SharedInput::new(initial_text),
            field: SharedField::default(),
            renderer: RecordingRenderer::default(),
            overlay: RecordingOverlay::default(),
            spinner: RecordingSpinner::default(),
        };
        let surface = Self {
            input: Box::new(probe.input.clone()),
            field: Box::new(probe.field.clone()),
            renderer: Box::new(probe.renderer.clone()),
            overlay: Box::new(probe.overlay.clone()),
            spinner: Box::new(probe.spinner.clone()),
        };
        (surface, probe)
    }
}

#[derive(Clone)]
pub struct SurfaceProbe {
    pub input: SharedInput,
    pub field: SharedField,
    pub renderer: RecordingRenderer,
    pub overlay: RecordingOverlay,
    pub spinner: RecordingSpinner,
}

#[derive(Clone, Default)]
pub struct SharedInput(Rc<RefCell<String>>);

impl SharedInput {
    pub fn new(text: &str) -> Self {
        Self(Rc::new(RefCell::new(text.to_string())))
    }

    /// Changes the text the way typing would, without notifying anyone.
    pub fn type_text(&self, text: &str) {
        *self.0.borrow_mut() = text.to_string();
    }

    pub fn text(&self) -> String {
        self.0.borrow().clone()
    }
}

impl TextInput for SharedInput {
    fn value(&self) -> String {
        self.text()
    }

    fn set_value(&mut self, value: &str) {
        self.type_text(value);
    }
}

#[derive(Clone, Default)]
pub struct SharedField(Rc<RefCell<Option<String>>>);

impl SharedField {
    /// `None` until the widget writes something.
    pub fn written(&self) -> Option<String> {
        self.0.borrow().clone()
    }
}

impl OutputField for SharedField {
    fn value(&self) -> String {
        self.written().unwrap_or_default()
    }

    fn set_value(&mut self, value: &str) {
        *self.0.borrow_mut() = Some(value.to_string());
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderLog {
    pub renders: usize,
    pub clears: usize,
    /// Highlight markup of every item in the latest render.
    pub items: Vec<String>,
    pub hover: Option<usize>,
    pub scrolled: Vec<usize>,
}

#[derive(Clone, Default)]
pub struct RecordingRenderer(Rc<RefCell<RenderLog>>);

impl RecordingRenderer {
    pub fn log(&self) -> RenderLog {
        self.0.borrow().clone()
    }
}

impl Renderer for RecordingRenderer {
    fn render(&mut self, model: &RenderModel<'_>) -> usize {
        let mut log = self.0.borrow_mut();
        log.renders += 1;
        log.hover = None;
        log.items = model
            .items
            .iter()
            .map(|item| {
                highlight::markup(
                    &item.label,
                    item.highlight_index.as_deref(),
                    model.class_prefix,
                )
            })
            .collect();
        log.items.len()
    }

    fn clear(&mut self) {
        let mut log = self.0.borrow_mut();
        log.clears += 1;
        log.items.clear();
        log.hover = None;
    }

    fn set_hover(&mut self, index: Option<usize>) {
        self.0.borrow_mut().hover = index;
    }

    fn scroll_into_view(&mut self, index: usize) {
        self.0.borrow_mut().scrolled.push(index);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ToggleLog {
    pub visible: bool,
    pub shows: usize,
    pub hides: usize,
}

#[derive(Clone, Default)]
pub struct RecordingOverlay(Rc<RefCell<ToggleLog>>);

impl RecordingOverlay {
    pub fn log(&self) -> ToggleLog {
        *self.0.borrow()
    }
}

impl Overlay for RecordingOverlay {
    fn show(&mut self) {
        let mut log = self.0.borrow_mut();
        log.visible = true;
        log.shows += 1;
    }

    fn hide(&mut self) {
        let mut log = self.0.borrow_mut();
        log.visible = false;
        log.hides += 1;
    }

    fn is_visible(&self) -> bool {
        self.0.borrow().visible
    }
}

#[derive(Clone, Default)]
pub struct RecordingSpinner(Rc<RefCell<ToggleLog>>);

impl RecordingSpinner {
    pub fn log(&self) -> ToggleLog {
        *self.0.borrow()
    }
}

impl Spinner for RecordingSpinner {
    fn show(&mut self) {
        let mut log = self.0.borrow_mut();
        log.visible = true;
        log.shows += 1;
    }

    fn hide(&mut self) {
        let mut log = self.0.borrow_mut();
        log.visible = false;
        log.hides += 1;
    }
}

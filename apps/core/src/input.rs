use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::surface::TextInput;

pub type ValueTransform = dyn Fn(&str) -> String + Send + Sync;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QueryChange {
    Changed { query: String, previous: String },
    /// Only whitespace differs; the tracked query is left untouched.
    WhitespaceChanged { previous: String },
}

/// Keys re-dispatched as named events instead of plain keydowns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecialKey {
    Tab,
    Esc,
    Left,
    Right,
    Enter,
    Up,
    Down,
}

impl SpecialKey {
    pub fn from_key_code(code: u32) -> Option<Self> {
        match code {
            9 => Some(Self::Tab),
            27 => Some(Self::Esc),
            37 => Some(Self::Left),
            39 => Some(Self::Right),
            13 => Some(Self::Enter),
            38 => Some(Self::Up),
            40 => Some(Self::Down),
            _ => None,
        }
    }

    /// Accepts DOM `KeyboardEvent.key` names as well as the short names.
    pub fn from_key_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "tab" => Some(Self::Tab),
            "escape" | "esc" => Some(Self::Esc),
            "arrowleft" | "left" => Some(Self::Left),
            "arrowright" | "right" => Some(Self::Right),
            "enter" | "return" => Some(Self::Enter),
            "arrowup" | "up" => Some(Self::Up),
            "arrowdown" | "down" => Some(Self::Down),
            _ => None,
        }
    }

    pub fn event_name(self) -> &'static str {
        match self {
            Self::Tab => "keyTab",
            Self::Esc => "keyEsc",
            Self::Left => "keyLeft",
            Self::Right => "keyRight",
            Self::Enter => "keyEnter",
            Self::Up => "keyUp",
            Self::Down => "keyDown",
        }
    }
}

/// Owns the text of the visible input and decides when it amounts to a new query.
pub struct QueryTracker {
    element: Box<dyn TextInput>,
    query: String,
    transform: Option<Arc<ValueTransform>>,
}

impl QueryTracker {
    pub fn new(element: Box<dyn TextInput>) -> Self {
        let query = element.value();
        Self {
            element,
            query,
            transform: None,
        }
    }

    pub fn with_transform(mut self, transform: Arc<ValueTransform>) -> Self {
        self.transform = Some(transform);
        self.query = self.value();
        self
    }

    pub fn value(&self) -> String {
        let raw = self.element.value();
        match &self.transform {
            Some(transform) => transform(&raw),
            None => raw,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Writes into the input; unless `silent`, runs the same detection as a keystroke.
    pub fn set_value(&mut self, text: &str, silent: bool) -> Option<QueryChange> {
        self.element.set_value(text);
        if silent {
            return None;
        }
        self.detect_change(false)
    }

    /// `force` reports a change even when nothing but focus happened.
    pub fn detect_change(&mut self, force: bool) -> Option<QueryChange> {
        let current = self.value();
        let same = normalize_whitespace(&current) == normalize_whitespace(&self.query);

        if same && !force {
            if current.chars().count() != self.query.chars().count() {
                return Some(QueryChange::WhitespaceChanged {
                    previous: self.query.clone(),
                });
            }
            return None;
        }

        let previous = std::mem::replace(&mut self.query, current.clone());
        Some(QueryChange::Changed {
            query: current,
            previous,
        })
    }
}

/// Drops leading whitespace and collapses runs of two or more whitespace chars to one space.
pub fn normalize_whitespace(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut run = String::new();

    for ch in input.trim_start().chars() {
        if ch.is_whitespace() {
            run.push(ch);
            continue;
        }
        flush_whitespace(&mut out, &mut run);
        out.push(ch);
    }
    flush_whitespace(&mut out, &mut run);
    out
}

fn flush_whitespace(out: &mut String, run: &mut String) {
    if run.chars().nth(1).is_some() {
        out.push(' ');
    } else {
        out.push_str(run);
    }
    run.clear();
}

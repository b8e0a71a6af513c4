use serde::{Deserialize, Serialize};

use crate::input::SpecialKey;
use crate::model::{Candidate, NormalizedItem};
use crate::navigation::{DropdownState, IndexChange};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum AutocompleteEvent {
    Key(SpecialKey),
    QueryChanged { query: String, previous: String },
    WhitespaceChanged { previous: String },
    /// A current response arrived, before filtering.
    Data { token: u64, count: usize },
    IndexChanged(IndexChange),
    ItemSelected { index: usize, item: NormalizedItem },
}

impl AutocompleteEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Key(key) => key.event_name(),
            Self::QueryChanged { .. } => "queryChanged",
            Self::WhitespaceChanged { .. } => "whitespaceChanged",
            Self::Data { .. } => "data",
            Self::IndexChanged(_) => "indexChanged",
            Self::ItemSelected { .. } => "itemSelected",
        }
    }
}

/// A key as a host reports it: legacy key code or `KeyboardEvent.key` name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeyInput {
    Code(u32),
    Name(String),
}

impl KeyInput {
    pub fn special_key(&self) -> Option<SpecialKey> {
        match self {
            Self::Code(code) => SpecialKey::from_key_code(*code),
            Self::Name(name) => SpecialKey::from_key_name(name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum HostCommand {
    Input { text: String },
    SetValue {
        text: String,
        #[serde(default)]
        silent: bool,
    },
    Key { key: KeyInput },
    Focus,
    Blur,
    MouseEnter { index: usize },
    MouseLeave { index: usize },
    Click { index: usize },
    SelectItem {
        #[serde(default)]
        index: Option<usize>,
    },
    Show,
    Hide,
    Respond {
        token: u64,
        candidates: Vec<Candidate>,
    },
    Tick,
    Destroy,
    State,
}

/// A data-source request waiting for the host to answer with `respond`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingRequest {
    pub token: u64,
    pub query: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandResponse {
    pub events: Vec<AutocompleteEvent>,
    pub requests: Vec<PendingRequest>,
    pub state: DropdownState,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub prevent_default: bool,
}

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::autocomplete::Autocomplete;
use crate::config::Options;
use crate::contract::{AutocompleteEvent, CommandResponse, HostCommand, PendingRequest};
use crate::data_source::{DataSource, Responder};
use crate::surface::{Surface, SurfaceProbe};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidJson,
    UnknownToken,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TransportResponse {
    Ok { response: CommandResponse },
    Err { error: ErrorResponse },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    UnknownToken(u64),
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownToken(token) => write!(f, "no pending request with token {token}"),
        }
    }
}

impl std::error::Error for TransportError {}

type PendingMap = Rc<RefCell<BTreeMap<u64, Responder>>>;

/// Parks every request until the host answers it with a `respond` command.
///
/// Superseded requests stay parked until answered, so hosts should answer every
/// token they were handed, even if only with an empty list. `destroy` drops them all.
struct RemoteSource {
    pending: PendingMap,
}

impl DataSource for RemoteSource {
    fn request(&mut self, _query: &str, responder: Responder) {
        self.pending.borrow_mut().insert(responder.token(), responder);
    }
}

/// Drives a widget from serialized host commands, for hosts that own the real
/// DOM and the real data source.
pub struct Bridge {
    widget: Autocomplete,
    probe: SurfaceProbe,
    pending: PendingMap,
    events: Rc<RefCell<Vec<AutocompleteEvent>>>,
    announced_until: u64,
}

impl Bridge {
    pub fn new(options: Options) -> Self {
        let (surface, probe) = Surface::recording("");
        let pending: PendingMap = Rc::default();
        let source = RemoteSource {
            pending: Rc::clone(&pending),
        };
        let mut widget = Autocomplete::new(options, surface, Box::new(source));

        let events: Rc<RefCell<Vec<AutocompleteEvent>>> = Rc::default();
        let sink = Rc::clone(&events);
        widget.subscribe(move |event| sink.borrow_mut().push(event.clone()));

        Self {
            widget,
            probe,
            pending,
            events,
            announced_until: 0,
        }
    }

    pub fn widget(&self) -> &Autocomplete {
        &self.widget
    }

    pub fn probe(&self) -> &SurfaceProbe {
        &self.probe
    }

    pub fn handle_command(
        &mut self,
        command: HostCommand,
    ) -> Result<CommandResponse, TransportError> {
        let mut prevent_default = false;

        match command {
            HostCommand::Input { text } => {
                self.probe.input.type_text(&text);
                self.widget.handle_input();
            }
            HostCommand::SetValue { text, silent } => self.widget.set_value(&text, silent),
            HostCommand::Key { key } => {
                if let Some(key) = key.special_key() {
                    prevent_default = self.widget.handle_key(key).prevent_default;
                }
            }
            HostCommand::Focus => self.widget.focus(),
            HostCommand::Blur => self.widget.blur(Instant::now()),
            HostCommand::MouseEnter { index } => self.widget.mouse_enter(index),
            HostCommand::MouseLeave { index } => self.widget.mouse_leave(index),
            HostCommand::Click { index } => {
                self.widget.click(index);
            }
            HostCommand::SelectItem { index } => {
                self.widget.select_item(index);
            }
            HostCommand::Show => self.widget.show(),
            HostCommand::Hide => self.widget.hide(),
            HostCommand::Respond { token, candidates } => {
                let responder = self
                    .pending
                    .borrow_mut()
                    .remove(&token)
                    .ok_or(TransportError::UnknownToken(token))?;
                responder.respond(candidates);
                self.widget.pump();
            }
            HostCommand::Tick => self.widget.tick(Instant::now()),
            HostCommand::Destroy => {
                self.widget.destroy();
                self.pending.borrow_mut().clear();
            }
            HostCommand::State => {}
        }

        let events = std::mem::take(&mut *self.events.borrow_mut());
        Ok(CommandResponse {
            events,
            requests: self.new_requests(),
            state: self.widget.state(),
            prevent_default,
        })
    }

    fn new_requests(&mut self) -> Vec<PendingRequest> {
        let requests: Vec<PendingRequest> = self
            .pending
            .borrow()
            .range(self.announced_until + 1..)
            .map(|(token, responder)| PendingRequest {
                token: *token,
                query: responder.query().to_string(),
            })
            .collect();
        if let Some(last) = requests.last() {
            self.announced_until = last.token;
        }
        requests
    }
}

pub fn handle_request(bridge: &mut Bridge, command: HostCommand) -> TransportResponse {
    match bridge.handle_command(command) {
        Ok(response) => TransportResponse::Ok { response },
        Err(error) => TransportResponse::Err {
            error: map_transport_error(error),
        },
    }
}

pub fn handle_json(bridge: &mut Bridge, payload: &str) -> String {
    let response = match serde_json::from_str::<HostCommand>(payload) {
        Ok(command) => handle_request(bridge, command),
        Err(error) => TransportResponse::Err {
            error: ErrorResponse {
                code: ErrorCode::InvalidJson,
                message: error.to_string(),
            },
        },
    };

    serde_json::to_string(&response).expect("transport response should serialize")
}

fn map_transport_error(error: TransportError) -> ErrorResponse {
    match error {
        TransportError::UnknownToken(_) => ErrorResponse {
            code: ErrorCode::UnknownToken,
            message: error.to_string(),
        },
    }
}

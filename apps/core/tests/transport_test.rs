use autocomplete_core::config::Options;
use autocomplete_core::contract::{AutocompleteEvent, HostCommand, KeyInput, PendingRequest};
use autocomplete_core::input::SpecialKey;
use autocomplete_core::navigation::{DropdownState, IndexChange};
use autocomplete_core::transport::{
    handle_json, handle_request, Bridge, ErrorCode, TransportError, TransportResponse,
};

fn ok(raw: &str) -> autocomplete_core::contract::CommandResponse {
    match serde_json::from_str::<TransportResponse>(raw).unwrap() {
        TransportResponse::Ok { response } => response,
        TransportResponse::Err { error } => panic!("unexpected error: {}", error.message),
    }
}

#[test]
fn json_session_requests_answers_and_selects() {
    let mut bridge = Bridge::new(Options::default());

    let focused = ok(&handle_json(&mut bridge, r#"{"kind":"focus"}"#));
    assert!(focused.events.is_empty());
    assert_eq!(focused.state, DropdownState::OpenEmpty);

    let typed = ok(&handle_json(
        &mut bridge,
        r#"{"kind":"input","payload":{"text":"a"}}"#,
    ));
    assert_eq!(
        typed.requests,
        vec![PendingRequest {
            token: 1,
            query: "a".into()
        }]
    );
    assert_eq!(typed.events[0].name(), "queryChanged");

    let answered = ok(&handle_json(
        &mut bridge,
        r#"{"kind":"respond","payload":{"token":1,"candidates":["abc","abd","xyz"]}}"#,
    ));
    assert_eq!(
        answered.events,
        vec![AutocompleteEvent::Data { token: 1, count: 3 }]
    );
    assert!(answered.requests.is_empty());
    assert_eq!(
        answered.state,
        DropdownState::OpenWithItems {
            item_count: 2,
            selected: None
        }
    );

    let down = ok(&handle_json(
        &mut bridge,
        r#"{"kind":"key","payload":{"key":40}}"#,
    ));
    assert!(down.prevent_default);
    assert_eq!(
        down.events,
        vec![
            AutocompleteEvent::Key(SpecialKey::Down),
            AutocompleteEvent::IndexChanged(IndexChange {
                index: 0,
                previous: None
            }),
        ]
    );

    let enter = ok(&handle_json(
        &mut bridge,
        r#"{"kind":"key","payload":{"key":"Enter"}}"#,
    ));
    assert!(enter.prevent_default);
    assert_eq!(enter.state, DropdownState::Closed);
    assert!(matches!(
        &enter.events[1],
        AutocompleteEvent::ItemSelected { index: 0, item } if item.value == "abc"
    ));
    assert_eq!(bridge.probe().field.written().as_deref(), Some("abc"));
}

#[test]
fn stale_answer_is_accepted_but_ignored() {
    let mut bridge = Bridge::new(Options::default());
    bridge.handle_command(HostCommand::Focus).unwrap();
    bridge
        .handle_command(HostCommand::Input { text: "a".into() })
        .unwrap();
    let second = bridge
        .handle_command(HostCommand::Input { text: "ab".into() })
        .unwrap();
    assert_eq!(second.requests.len(), 1);
    assert_eq!(second.requests[0].token, 2);

    let stale = bridge
        .handle_command(HostCommand::Respond {
            token: 1,
            candidates: vec!["abc".into()],
        })
        .unwrap();
    assert!(stale.events.is_empty());
    assert_eq!(stale.state, DropdownState::OpenEmpty);
    assert!(bridge.widget().results().is_empty());
}

#[test]
fn answering_twice_reports_unknown_token() {
    let mut bridge = Bridge::new(Options::default());
    bridge
        .handle_command(HostCommand::Input { text: "a".into() })
        .unwrap();
    let respond = HostCommand::Respond {
        token: 1,
        candidates: Vec::new(),
    };
    assert!(bridge.handle_command(respond.clone()).is_ok());
    assert_eq!(
        bridge.handle_command(respond.clone()),
        Err(TransportError::UnknownToken(1))
    );

    match handle_request(&mut bridge, respond) {
        TransportResponse::Err { error } => assert_eq!(error.code, ErrorCode::UnknownToken),
        _ => panic!("expected unknown token error"),
    }
}

#[test]
fn json_handler_returns_invalid_json_error_code() {
    let mut bridge = Bridge::new(Options::default());

    let raw = handle_json(&mut bridge, "{not-json");
    let parsed: TransportResponse = serde_json::from_str(&raw).unwrap();

    match parsed {
        TransportResponse::Err { error } => assert_eq!(error.code, ErrorCode::InvalidJson),
        _ => panic!("expected invalid json error"),
    }
}

#[test]
fn key_names_and_codes_resolve_alike() {
    assert_eq!(KeyInput::Code(27).special_key(), Some(SpecialKey::Esc));
    assert_eq!(
        KeyInput::Name("Escape".into()).special_key(),
        Some(SpecialKey::Esc)
    );
    assert_eq!(KeyInput::Code(65).special_key(), None);

    let command: HostCommand =
        serde_json::from_str(r#"{"kind":"key","payload":{"key":"ArrowUp"}}"#).unwrap();
    assert_eq!(
        command,
        HostCommand::Key {
            key: KeyInput::Name("ArrowUp".into())
        }
    );
}

#[test]
fn destroy_drops_pending_answers() {
    let mut bridge = Bridge::new(Options::default());
    bridge
        .handle_command(HostCommand::Input { text: "a".into() })
        .unwrap();
    bridge.handle_command(HostCommand::Destroy).unwrap();

    let late = bridge.handle_command(HostCommand::Respond {
        token: 1,
        candidates: vec!["abc".into()],
    });
    assert_eq!(late, Err(TransportError::UnknownToken(1)));

    let state = bridge.handle_command(HostCommand::State).unwrap();
    assert!(state.events.is_empty());
    assert!(state.requests.is_empty());
    assert_eq!(state.state, DropdownState::Closed);
    assert!(bridge.widget().is_destroyed());
}

#[test]
fn events_serialize_with_kind_and_payload() {
    let encoded = serde_json::to_string(&AutocompleteEvent::QueryChanged {
        query: "ab".into(),
        previous: "a".into(),
    })
    .unwrap();
    assert_eq!(
        encoded,
        r#"{"kind":"query_changed","payload":{"query":"ab","previous":"a"}}"#
    );
}

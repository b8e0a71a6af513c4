use std::sync::mpsc::{self, Receiver, Sender};

use serde_json::Value;

use crate::model::Candidate;

#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub token: u64,
    pub query: String,
    pub candidates: Vec<Candidate>,
}

/// Completion handle for one data-source request.
///
/// It can be moved anywhere, kept for later or dropped. Answering after the widget
/// was destroyed is harmless: `respond` just reports `false`.
#[derive(Debug)]
pub struct Responder {
    token: u64,
    query: String,
    sender: Sender<Response>,
}

impl Responder {
    pub fn token(&self) -> u64 {
        self.token
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn respond(self, candidates: Vec<Candidate>) -> bool {
        self.sender
            .send(Response {
                token: self.token,
                query: self.query,
                candidates,
            })
            .is_ok()
    }
}

pub trait DataSource {
    fn request(&mut self, query: &str, responder: Responder);
}

impl<F> DataSource for F
where
    F: FnMut(&str, Responder),
{
    fn request(&mut self, query: &str, responder: Responder) {
        self(query, responder)
    }
}

/// A fixed list, answered immediately whatever the query.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    candidates: Vec<Candidate>,
}

impl StaticSource {
    pub fn new<I, C>(candidates: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Candidate>,
    {
        Self {
            candidates: candidates.into_iter().map(Into::into).collect(),
        }
    }
}

impl DataSource for StaticSource {
    fn request(&mut self, _query: &str, responder: Responder) {
        responder.respond(self.candidates.clone());
    }
}

/// Answers every request with nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptySource;

impl DataSource for EmptySource {
    fn request(&mut self, _query: &str, responder: Responder) {
        responder.respond(Vec::new());
    }
}

/// A JSON array becomes a static list; any other value an empty source.
pub fn from_json(value: Value) -> Box<dyn DataSource> {
    match value {
        list @ Value::Array(_) => {
            let candidates: Vec<Candidate> = serde_json::from_value(list).unwrap_or_default();
            Box::new(StaticSource { candidates })
        }
        _ => Box::new(EmptySource),
    }
}

/// Hands out staleness tokens and collects responses.
///
/// Only the most recently issued token is current; anything older is stale no
/// matter when it arrives.
pub(crate) struct RequestQueue {
    latest: u64,
    waiting_on_latest: bool,
    sender: Sender<Response>,
    receiver: Receiver<Response>,
}

impl RequestQueue {
    pub(crate) fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            latest: 0,
            waiting_on_latest: false,
            sender,
            receiver,
        }
    }

    pub(crate) fn issue(&mut self, query: &str) -> Responder {
        self.latest += 1;
        self.waiting_on_latest = true;
        Responder {
            token: self.latest,
            query: query.to_string(),
            sender: self.sender.clone(),
        }
    }

    pub(crate) fn latest(&self) -> u64 {
        self.latest
    }

    pub(crate) fn is_waiting(&self) -> bool {
        self.waiting_on_latest
    }

    /// Marks `token` answered and reports whether it is still current.
    pub(crate) fn accept(&mut self, token: u64) -> bool {
        if token != self.latest {
            return false;
        }
        self.waiting_on_latest = false;
        true
    }

    pub(crate) fn drain(&self) -> Vec<Response> {
        self.receiver.try_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{from_json, DataSource, RequestQueue, StaticSource};

    #[test]
    fn only_latest_token_is_accepted() {
        let mut queue = RequestQueue::new();
        let first = queue.issue("a");
        let second = queue.issue("ab");
        assert!(first.token() < second.token());

        first.respond(vec!["stale".into()]);
        second.respond(vec!["fresh".into()]);
        let responses = queue.drain();
        assert_eq!(responses.len(), 2);
        assert!(!queue.accept(responses[0].token));
        assert!(queue.is_waiting());
        assert!(queue.accept(responses[1].token));
        assert!(!queue.is_waiting());
    }

    #[test]
    fn static_source_answers_immediately() {
        let mut queue = RequestQueue::new();
        let mut source = StaticSource::new(["x", "y"]);
        source.request("q", queue.issue("q"));
        let responses = queue.drain();
        assert_eq!(responses[0].candidates.len(), 2);
        assert_eq!(responses[0].query, "q");
    }

    #[test]
    fn non_list_json_yields_empty_source() {
        let mut queue = RequestQueue::new();
        from_json(serde_json::json!({"not": "a list"})).request("q", queue.issue("q"));
        from_json(serde_json::json!(["a", null])).request("q", queue.issue("q"));
        let responses = queue.drain();
        assert!(responses[0].candidates.is_empty());
        assert_eq!(responses[1].candidates.len(), 2);
    }
}

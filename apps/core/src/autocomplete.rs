use std::sync::Arc;
use std::time::Instant;

use crate::config::{EmptyMatchMode, Options};
use crate::contract::AutocompleteEvent;
use crate::data_source::{DataSource, RequestQueue, Response};
use crate::filter::Filter;
use crate::input::{QueryChange, QueryTracker, SpecialKey, ValueTransform};
use crate::logging;
use crate::model::{normalize, NormalizedItem};
use crate::navigation::{Direction, DropdownState, Navigation, SelectionUpdate};
use crate::surface::{OutputField, Overlay, RenderModel, Renderer, Spinner, Surface};

pub type OutFilter = dyn Fn(&NormalizedItem) -> String + Send + Sync;

type Listener = Box<dyn FnMut(&AutocompleteEvent)>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyOutcome {
    /// The host should suppress the key's default action (caret move, form submit).
    pub prevent_default: bool,
}

/// The dropdown widget: turns input events into data-source requests, filters
/// current responses into the result set and drives selection.
///
/// Every method is a no-op after [`Autocomplete::destroy`].
pub struct Autocomplete {
    options: Options,
    filter: Filter,
    out_filter: Arc<OutFilter>,
    data_source: Box<dyn DataSource>,
    tracker: QueryTracker,
    field: Box<dyn OutputField>,
    renderer: Box<dyn Renderer>,
    overlay: Box<dyn Overlay>,
    spinner: Box<dyn Spinner>,
    requests: RequestQueue,
    navigation: Navigation,
    results: Vec<NormalizedItem>,
    is_open: bool,
    pending_hide: Option<Instant>,
    destroyed: bool,
    listeners: Vec<Listener>,
}

impl Autocomplete {
    pub fn new(options: Options, surface: Surface, data_source: Box<dyn DataSource>) -> Self {
        let filter = Filter::resolve(options.filter.as_deref());
        Self {
            options,
            filter,
            out_filter: Arc::new(|item: &NormalizedItem| item.value.clone()),
            data_source,
            tracker: QueryTracker::new(surface.input),
            field: surface.field,
            renderer: surface.renderer,
            overlay: surface.overlay,
            spinner: surface.spinner,
            requests: RequestQueue::new(),
            navigation: Navigation::default(),
            results: Vec::new(),
            is_open: false,
            pending_hide: None,
            destroyed: false,
            listeners: Vec::new(),
        }
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }

    /// Maps the selected item to what the output field receives. Defaults to `value`.
    pub fn with_out_filter<F>(mut self, out_filter: F) -> Self
    where
        F: Fn(&NormalizedItem) -> String + Send + Sync + 'static,
    {
        self.out_filter = Arc::new(out_filter);
        self
    }

    /// Applied to the raw input text before it is compared or stored as the query.
    pub fn with_value_transform<F>(mut self, transform: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        let transform: Arc<ValueTransform> = Arc::new(transform);
        self.tracker = self.tracker.with_transform(transform);
        self
    }

    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&AutocompleteEvent) + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    pub fn query(&self) -> &str {
        self.tracker.query()
    }

    pub fn value(&self) -> String {
        self.tracker.value()
    }

    pub fn output_value(&self) -> String {
        self.field.value()
    }

    pub fn results(&self) -> &[NormalizedItem] {
        &self.results
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.navigation.selected()
    }

    pub fn last_index(&self) -> Option<usize> {
        self.navigation.last_index()
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn is_visible(&self) -> bool {
        self.overlay.is_visible()
    }

    pub fn is_loading(&self) -> bool {
        self.requests.is_waiting()
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn latest_token(&self) -> u64 {
        self.requests.latest()
    }

    pub fn state(&self) -> DropdownState {
        if self.destroyed || !self.is_open {
            return DropdownState::Closed;
        }
        if self.results.is_empty() {
            return DropdownState::OpenEmpty;
        }
        DropdownState::OpenWithItems {
            item_count: self.results.len(),
            selected: self.navigation.selected(),
        }
    }

    /// A keystroke or `input` event changed the visible text.
    pub fn handle_input(&mut self) {
        if self.destroyed {
            return;
        }
        self.pump();
        if let Some(change) = self.tracker.detect_change(false) {
            self.on_query_change(change);
        }
    }

    pub fn set_value(&mut self, text: &str, silent: bool) {
        if self.destroyed {
            return;
        }
        self.pump();
        if let Some(change) = self.tracker.set_value(text, silent) {
            self.on_query_change(change);
        }
    }

    pub fn handle_key_code(&mut self, code: u32) -> KeyOutcome {
        match SpecialKey::from_key_code(code) {
            Some(key) => self.handle_key(key),
            None => KeyOutcome::default(),
        }
    }

    pub fn handle_key(&mut self, key: SpecialKey) -> KeyOutcome {
        if self.destroyed {
            return KeyOutcome::default();
        }
        self.pump();
        self.emit(AutocompleteEvent::Key(key));

        match key {
            SpecialKey::Enter => {
                let committed = self.commit(None);
                KeyOutcome {
                    prevent_default: committed && !self.options.submit_on_enter,
                }
            }
            SpecialKey::Esc => {
                self.hide();
                KeyOutcome::default()
            }
            SpecialKey::Up | SpecialKey::Down => {
                self.show();
                if self.overlay.is_visible() {
                    let direction = if key == SpecialKey::Up {
                        Direction::Up
                    } else {
                        Direction::Down
                    };
                    let update = self.navigation.step(direction);
                    self.apply_selection_update(update);
                }
                KeyOutcome {
                    prevent_default: true,
                }
            }
            SpecialKey::Tab | SpecialKey::Left | SpecialKey::Right => KeyOutcome::default(),
        }
    }

    /// Focus makes the dropdown eligible to open; it does not open it.
    pub fn focus(&mut self) {
        if self.destroyed {
            return;
        }
        self.pump();
        self.pending_hide = None;
        self.is_open = true;
        if self.options.refresh_on_focus {
            if let Some(change) = self.tracker.detect_change(true) {
                self.on_query_change(change);
            }
        }
    }

    pub fn blur(&mut self, now: Instant) {
        if self.destroyed {
            return;
        }
        self.pump();
        if self.options.select_on_blur {
            self.commit(None);
        }
        match self.options.blur_hide_delay() {
            Some(delay) => self.pending_hide = Some(now + delay),
            None => self.hide(),
        }
    }

    /// Fires a delayed hide once `now` reaches it, and applies any arrived responses.
    pub fn tick(&mut self, now: Instant) {
        if self.destroyed {
            return;
        }
        self.pump();
        if self.pending_hide.is_some_and(|deadline| now >= deadline) {
            self.hide();
        }
    }

    pub fn mouse_enter(&mut self, index: usize) {
        if self.destroyed {
            return;
        }
        self.renderer.set_hover(None);
        if self.navigation.hover_enter(index) {
            self.renderer.set_hover(Some(index));
        }
    }

    /// Drops the hover highlight; the selected index stays where it was.
    pub fn mouse_leave(&mut self, _index: usize) {
        if self.destroyed {
            return;
        }
        self.renderer.set_hover(None);
        self.navigation.hover_leave();
    }

    pub fn click(&mut self, index: usize) -> bool {
        if self.destroyed {
            return false;
        }
        self.pump();
        self.commit(Some(index))
    }

    /// Commits `index`, or the current selection when `None`. Returns whether an item was selected.
    pub fn select_item(&mut self, index: Option<usize>) -> bool {
        if self.destroyed {
            return false;
        }
        self.pump();
        if !self.navigation.is_rendered() {
            return false;
        }
        if let Some(index) = index {
            if index >= self.navigation.item_count() {
                return false;
            }
            let update = self.navigation.select(Some(index));
            self.apply_selection_update(update);
        }
        self.commit(None)
    }

    /// Shows the dropdown, unless there is nothing to show.
    pub fn show(&mut self) {
        if self.destroyed {
            return;
        }
        self.is_open = true;
        if self.results.is_empty() {
            return;
        }
        self.overlay.show();
    }

    pub fn hide(&mut self) {
        if self.destroyed {
            return;
        }
        self.close();
    }

    /// Applies every response that arrived since the last call. Returns how many were current.
    pub fn pump(&mut self) -> usize {
        if self.destroyed {
            return 0;
        }
        let mut applied = 0;
        for response in self.requests.drain() {
            if self.apply_response(response) {
                applied += 1;
            }
        }
        applied
    }

    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        if self.requests.is_waiting() {
            logging::warn(&format!(
                "destroyed with request token={} in flight",
                self.requests.latest()
            ));
            self.spinner.hide();
        }

        self.listeners.clear();
        self.clear();
        self.close();
        // A fresh queue drops the old receiver, so late answers go nowhere.
        self.requests = RequestQueue::new();
        self.destroyed = true;
    }

    fn on_query_change(&mut self, change: QueryChange) {
        match change {
            QueryChange::WhitespaceChanged { previous } => {
                self.emit(AutocompleteEvent::WhitespaceChanged { previous });
            }
            QueryChange::Changed { query, previous } => {
                self.emit(AutocompleteEvent::QueryChanged {
                    query: query.clone(),
                    previous,
                });
                self.clear();
                self.close();
                self.request(&query);
                self.show();
            }
        }
    }

    fn request(&mut self, query: &str) {
        if self.options.disabled {
            return;
        }

        self.spinner.show();
        let responder = self.requests.issue(query);
        logging::debug(&format!(
            "request token={} query={query:?}",
            responder.token()
        ));
        self.data_source.request(query, responder);
        self.pump();
    }

    fn apply_response(&mut self, response: Response) -> bool {
        if !self.requests.accept(response.token) {
            logging::info(&format!(
                "discarded stale response token={} latest={}",
                response.token,
                self.requests.latest()
            ));
            return false;
        }

        self.spinner.hide();
        self.emit(AutocompleteEvent::Data {
            token: response.token,
            count: response.candidates.len(),
        });

        let items = self
            .filter
            .apply(normalize(response.candidates), self.tracker.query());
        self.render_results(items);
        true
    }

    fn render_results(&mut self, items: Vec<NormalizedItem>) {
        self.results = items;
        let rendered = self.renderer.render(&RenderModel {
            class_prefix: &self.options.class_prefix,
            hover_class: &self.options.hover_class,
            query: self.tracker.query(),
            items: &self.results,
        });
        let update = self.navigation.load(rendered, self.options.select_first);
        self.apply_selection_update(update);

        // A selection writes the input and may trigger another render; only reopen if still active.
        if self.is_open {
            self.show();
        }

        if self.results.is_empty() {
            self.write_empty_match();
        }
    }

    fn write_empty_match(&mut self) {
        match self.options.mode {
            EmptyMatchMode::KeepTyped => {
                let typed = NormalizedItem::from_text(&self.tracker.value());
                let output = (self.out_filter)(&typed);
                self.field.set_value(&output);
            }
            EmptyMatchMode::SubmitEmpty => self.field.set_value(""),
            EmptyMatchMode::SubmitNothing => {}
        }
    }

    fn commit(&mut self, explicit: Option<usize>) -> bool {
        if !self.navigation.is_rendered() {
            return false;
        }
        let Some(index) = self.navigation.commit_target(explicit) else {
            return false;
        };
        let Some(item) = self.results.get(index).cloned() else {
            return false;
        };

        self.tracker.set_value(&item.target, true);
        self.navigation.select_silently(index);
        let output = (self.out_filter)(&item);
        self.field.set_value(&output);
        logging::info(&format!("item selected index={index} output={output:?}"));

        self.emit(AutocompleteEvent::ItemSelected { index, item });
        self.close();
        true
    }

    fn clear(&mut self) {
        self.renderer.clear();
        self.results.clear();
        self.navigation.clear();
    }

    fn close(&mut self) {
        self.pending_hide = None;
        self.is_open = false;
        self.overlay.hide();
        let update = self.navigation.select(None);
        self.apply_selection_update(update);
    }

    fn apply_selection_update(&mut self, update: Option<SelectionUpdate>) {
        match update {
            None => {}
            Some(SelectionUpdate::Cleared) => self.renderer.set_hover(None),
            Some(SelectionUpdate::Moved(change)) => {
                self.renderer.set_hover(Some(change.index));
                self.emit(AutocompleteEvent::IndexChanged(change));
                self.renderer.scroll_into_view(change.index);
            }
        }
    }

    fn emit(&mut self, event: AutocompleteEvent) {
        for listener in self.listeners.iter_mut() {
            listener(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Autocomplete;
    use crate::config::Options;
    use crate::data_source::StaticSource;
    use crate::navigation::DropdownState;
    use crate::surface::Surface;

    #[test]
    fn static_list_opens_with_matches() {
        let (surface, probe) = Surface::recording("");
        let mut widget = Autocomplete::new(
            Options::default(),
            surface,
            Box::new(StaticSource::new(["abc", "abd", "cbc"])),
        );
        widget.focus();
        probe.input.type_text("a");
        widget.handle_input();

        assert_eq!(
            widget.state(),
            DropdownState::OpenWithItems {
                item_count: 2,
                selected: None,
            }
        );
        assert!(probe.overlay.log().visible);
        assert!(!probe.spinner.log().visible);
    }

    #[test]
    fn empty_results_never_show_overlay() {
        let (surface, probe) = Surface::recording("");
        let mut widget = Autocomplete::new(
            Options::default(),
            surface,
            Box::new(StaticSource::new(["abc"])),
        );
        widget.focus();
        probe.input.type_text("z");
        widget.handle_input();

        assert_eq!(widget.state(), DropdownState::OpenEmpty);
        assert_eq!(probe.overlay.log().shows, 0);
        assert_eq!(probe.field.written().as_deref(), Some("z"));
    }
}

use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::Event;
use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyEventKind;
use crossterm::event::KeyModifiers;
use tagscope_api_client::ExplorerClient;
use tagscope_api_client::model::TagCategory;
use tagscope_core::AutocompleteSession;
use tagscope_core::FetchTicket;
use tagscope_core::Query;
use tagscope_core::QueryStore;
use tagscope_core::TAG_KEY;
use tagscope_core::TagSession;
use tagscope_core::VisibleCategories;
use tagscope_core::filter;
use tokio::sync::mpsc::unbounded_channel;
use tokio_stream::StreamExt;
use tracing::warn;

use crate::Cli;
use crate::app_event::AppEvent;
use crate::app_event_sender::AppEventSender;
use crate::terminal::Tui;
use crate::views;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Focus {
    Search,
    Correlations,
}

pub(crate) struct App {
    client: Arc<ExplorerClient>,
    app_event_tx: AppEventSender,
    pub(crate) query_store: QueryStore,
    pub(crate) autocomplete: AutocompleteSession,
    pub(crate) tags: TagSession,
    pub(crate) visible: VisibleCategories,

    /// Transient input text; only a commit writes it into the query store.
    pub(crate) input: String,
    /// Cursor position in characters.
    pub(crate) cursor: usize,
    pub(crate) selected_suggestion: Option<usize>,
    pub(crate) focus: Focus,
    pub(crate) selected_correlation: usize,

    done: bool,
}

pub async fn run_main(cli: Cli) -> Result<()> {
    let client = Arc::new(ExplorerClient::from_base_url(&cli.api_url)?);
    let initial = initial_query(&cli);
    let mut tui = Tui::new()?;
    App::run(&mut tui, client, initial).await
}

fn initial_query(cli: &Cli) -> Query {
    if let Some(link) = &cli.link {
        return Query::from_query_string(link);
    }
    match &cli.tag {
        Some(tag) => Query::new().with(TAG_KEY, tag),
        None => Query::new(),
    }
}

impl App {
    pub(crate) async fn run(
        tui: &mut Tui,
        client: Arc<ExplorerClient>,
        initial: Query,
    ) -> Result<()> {
        let (tx, mut rx) = unbounded_channel();
        let app_event_tx = AppEventSender::new(tx);

        let mut query_store = QueryStore::new(initial.clone());
        let store_tx = app_event_tx.clone();
        query_store.subscribe(move |query| store_tx.send(AppEvent::QueryChanged(query.clone())));

        let mut app = Self {
            client,
            app_event_tx,
            query_store,
            autocomplete: AutocompleteSession::new(),
            tags: TagSession::new(),
            visible: VisibleCategories::all_visible(),
            input: String::new(),
            cursor: 0,
            selected_suggestion: None,
            focus: Focus::Search,
            selected_correlation: 0,
            done: false,
        };

        // The subscriber only fires on transitions, so a shared-link startup
        // query needs the same fan-out applied by hand once.
        app.handle_query_changed(initial);

        let mut events = tui.event_stream();
        while !app.done {
            tui.terminal.draw(|frame| views::draw(frame, &app))?;
            tokio::select! {
                Some(Ok(event)) = events.next() => app.handle_terminal_event(event),
                Some(app_event) = rx.recv() => app.handle_app_event(app_event),
            }
        }
        Ok(())
    }

    fn handle_terminal_event(&mut self, event: Event) {
        if let Event::Key(key) = event
            && key.kind != KeyEventKind::Release
        {
            self.handle_key(key);
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.app_event_tx.send(AppEvent::ExitRequest);
            return;
        }
        if key.modifiers.contains(KeyModifiers::ALT) {
            match key.code {
                KeyCode::Left => {
                    self.query_store.back();
                    return;
                }
                KeyCode::Right => {
                    self.query_store.forward();
                    return;
                }
                KeyCode::Char(c) => {
                    if let Some(category) = category_for_key(c) {
                        self.visible.toggle(category);
                        self.clamp_correlation_selection();
                        return;
                    }
                }
                _ => {}
            }
        }
        if key.code == KeyCode::Tab {
            self.focus = match self.focus {
                Focus::Search => Focus::Correlations,
                Focus::Correlations => Focus::Search,
            };
            return;
        }
        match self.focus {
            Focus::Search => self.handle_search_key(key),
            Focus::Correlations => self.handle_correlations_key(key),
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.input.clear();
                self.cursor = 0;
                self.on_input_changed();
            }
            KeyCode::Char(c)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                let at = byte_index(&self.input, self.cursor);
                self.input.insert(at, c);
                self.cursor += 1;
                self.on_input_changed();
            }
            KeyCode::Backspace => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    let at = byte_index(&self.input, self.cursor);
                    self.input.remove(at);
                    self.on_input_changed();
                }
            }
            KeyCode::Left => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Right => self.cursor = (self.cursor + 1).min(self.input.chars().count()),
            KeyCode::Up => self.move_suggestion_selection(-1),
            KeyCode::Down => self.move_suggestion_selection(1),
            KeyCode::Esc => {
                self.autocomplete.dismiss();
                self.selected_suggestion = None;
            }
            KeyCode::Enter => {
                let chosen = match self.selected_suggestion {
                    Some(index) => self
                        .autocomplete
                        .suggestions()
                        .get(index)
                        .map(|suggestion| suggestion.text.clone()),
                    None => None,
                };
                let tag = chosen.unwrap_or_else(|| self.input.trim().to_string());
                self.commit(&tag);
            }
            _ => {}
        }
    }

    fn handle_correlations_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up => {
                self.selected_correlation = self.selected_correlation.saturating_sub(1);
            }
            KeyCode::Down => {
                let count = self.visible_correlation_count();
                if count > 0 {
                    self.selected_correlation = (self.selected_correlation + 1).min(count - 1);
                }
            }
            KeyCode::Enter => {
                // Tag-to-tag navigation: commit the selected correlated tag.
                let chosen = self.tags.correlations().and_then(|result| {
                    filter::filter(result, &self.visible)
                        .get(self.selected_correlation)
                        .map(|correlation| correlation.tag.clone())
                });
                if let Some(tag) = chosen {
                    self.commit(&tag);
                }
            }
            _ => {}
        }
    }

    /// All commits funnel through here and therefore through
    /// `QueryStore::set`, preserving the history invariant.
    fn commit(&mut self, tag: &str) {
        self.selected_suggestion = None;
        self.autocomplete.commit(tag, &mut self.query_store);
    }

    fn handle_app_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::QueryChanged(query) => self.handle_query_changed(query),
            AppEvent::CompletionResult {
                ticket,
                suggestions,
            } => {
                if self.autocomplete.apply_result(&ticket, suggestions) {
                    self.selected_suggestion = None;
                }
            }
            AppEvent::CompletionFailed { ticket } => self.autocomplete.on_failure(&ticket),
            AppEvent::CorrelationsResult { ticket, outcome } => {
                if self.tags.apply_correlations(&ticket, outcome) {
                    self.clamp_correlation_selection();
                }
            }
            AppEvent::PostsOverTimeResult { ticket, outcome } => {
                self.tags.apply_time_series(&ticket, outcome);
            }
            AppEvent::ExitRequest => self.done = true,
        }
    }

    /// Fan-out on every query transition: mirror the committed tag into the
    /// input, re-derive both tag fetches, and start whatever the plan asks
    /// for. Back/forward land here exactly like fresh commits.
    fn handle_query_changed(&mut self, query: Query) {
        self.input = query.get(TAG_KEY).unwrap_or("").to_string();
        self.cursor = self.input.chars().count();
        self.selected_suggestion = None;

        let plan = self.tags.on_query_changed(&query);
        if let Some((tag, ticket)) = plan.correlations {
            self.spawn_correlations(tag, ticket);
        }
        if let Some((tag, ticket)) = plan.posts_over_time {
            self.spawn_posts_over_time(tag, ticket);
        }
    }

    fn on_input_changed(&mut self) {
        self.selected_suggestion = None;
        let ticket = self.autocomplete.on_input(&self.input);
        let prefix = self.input.clone();
        let client = self.client.clone();
        let tx = self.app_event_tx.clone();
        tokio::spawn(async move {
            match ticket.guard(client.tag_complete(&prefix)).await {
                // Superseded: no UI change at all.
                None => {}
                Some(Ok(suggestions)) => tx.send(AppEvent::CompletionResult {
                    ticket,
                    suggestions,
                }),
                Some(Err(err)) => {
                    warn!("tag completion for {prefix:?} failed: {err}");
                    tx.send(AppEvent::CompletionFailed { ticket });
                }
            }
        });
    }

    fn spawn_correlations(&self, tag: String, ticket: FetchTicket) {
        let client = self.client.clone();
        let tx = self.app_event_tx.clone();
        tokio::spawn(async move {
            match ticket.guard(client.tag_correlations(&tag)).await {
                None => {}
                Some(result) => {
                    let outcome = result
                        .inspect_err(|err| warn!("correlations for {tag:?} failed: {err}"))
                        .ok();
                    tx.send(AppEvent::CorrelationsResult { ticket, outcome });
                }
            }
        });
    }

    fn spawn_posts_over_time(&self, tag: String, ticket: FetchTicket) {
        let client = self.client.clone();
        let tx = self.app_event_tx.clone();
        tokio::spawn(async move {
            match ticket.guard(client.tag_posts_over_time(&tag)).await {
                None => {}
                Some(result) => {
                    let outcome = result
                        .inspect_err(|err| warn!("posts over time for {tag:?} failed: {err}"))
                        .ok();
                    tx.send(AppEvent::PostsOverTimeResult { ticket, outcome });
                }
            }
        });
    }

    fn move_suggestion_selection(&mut self, delta: isize) {
        let count = self.autocomplete.suggestions().len();
        if count == 0 {
            self.selected_suggestion = None;
            return;
        }
        let next = match self.selected_suggestion {
            None if delta > 0 => 0,
            None => count - 1,
            Some(index) => (index as isize + delta).rem_euclid(count as isize) as usize,
        };
        self.selected_suggestion = Some(next);
    }

    fn visible_correlation_count(&self) -> usize {
        self.tags
            .correlations()
            .map(|result| filter::filter(result, &self.visible).len())
            .unwrap_or(0)
    }

    fn clamp_correlation_selection(&mut self) {
        let count = self.visible_correlation_count();
        self.selected_correlation = self
            .selected_correlation
            .min(count.saturating_sub(1));
    }
}

fn category_for_key(c: char) -> Option<TagCategory> {
    let index = c.to_digit(10)? as usize;
    TagCategory::ALL.get(index.checked_sub(1)?).copied()
}

fn byte_index(text: &str, char_index: usize) -> usize {
    text.char_indices()
        .nth(char_index)
        .map(|(index, _)| index)
        .unwrap_or(text.len())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn digit_keys_map_to_the_category_palette_order() {
        assert_eq!(category_for_key('1'), Some(TagCategory::General));
        assert_eq!(category_for_key('2'), Some(TagCategory::Artist));
        assert_eq!(category_for_key('5'), Some(TagCategory::Meta));
        assert_eq!(category_for_key('6'), None);
        assert_eq!(category_for_key('x'), None);
    }

    #[test]
    fn byte_index_handles_multibyte_input() {
        let text = "héllo";
        assert_eq!(byte_index(text, 0), 0);
        assert_eq!(byte_index(text, 2), 3);
        assert_eq!(byte_index(text, 99), text.len());
    }

    #[test]
    fn initial_query_prefers_the_shared_link() {
        let cli = Cli {
            api_url: "http://localhost".to_string(),
            tag: None,
            link: Some("tag=1girl".to_string()),
        };
        assert_eq!(initial_query(&cli).get(TAG_KEY), Some("1girl"));

        let cli = Cli {
            api_url: "http://localhost".to_string(),
            tag: Some("1boy".to_string()),
            link: None,
        };
        assert_eq!(initial_query(&cli).get(TAG_KEY), Some("1boy"));
    }
}

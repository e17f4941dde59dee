use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread;
use std::time::{Duration, Instant};

use crossterm::event::KeyEvent;
use tracing::{debug, info, warn};

use crate::api::{
    ApiError, Article, ArticleId, ArticleSummary, Backend, CheckResponse, SentenceId,
};
use crate::clipboard;
use crate::config::Config;
use crate::event::AppEvent;
use crate::session::{
    CheckRequest, LayoutEvent, LoadTicket, SessionError, SessionPhase, SessionState,
};
use crate::ui::components::article_list::ArticleMenu;
use crate::ui::line_input::{InputResult, LineInput};
use crate::ui::theme::Theme;

/// How long the copied marker stays on a sentence.
const COPY_FLASH: Duration = Duration::from_secs(2);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppScreen {
    ArticleList,
    Study,
    Complete,
}

pub struct App {
    pub screen: AppScreen,
    pub articles: ArticleMenu,
    pub listing: bool,
    /// Latest load or list error, shown on the article list.
    pub status: Option<String>,
    pub session: SessionState,
    pub input: LineInput,
    pub theme: &'static Theme,
    pub config: Config,
    pub should_quit: bool,
    copied: Option<(SentenceId, Instant)>,
    backend: Arc<dyn Backend>,
    events: Sender<AppEvent>,
}

impl App {
    pub fn new(
        config: Config,
        theme: &'static Theme,
        backend: Arc<dyn Backend>,
        events: Sender<AppEvent>,
    ) -> Self {
        let session = SessionState::new(config.auto_advance(), config.failed_check_policy);
        Self {
            screen: AppScreen::ArticleList,
            articles: ArticleMenu::default(),
            listing: false,
            status: None,
            session,
            input: LineInput::default(),
            theme,
            config,
            should_quit: false,
            copied: None,
            backend,
            events,
        }
    }

    // --- network requests; each runs on its own thread and reports back as an AppEvent ---

    pub fn refresh_articles(&mut self) {
        if self.listing {
            return;
        }
        self.listing = true;
        let backend = Arc::clone(&self.backend);
        let tx = self.events.clone();
        thread::spawn(move || {
            let _ = tx.send(AppEvent::ArticlesListed(backend.list()));
        });
    }

    pub fn open_article(&mut self, article_id: ArticleId) {
        let ticket = self.session.begin_load(article_id);
        self.status = Some(format!("Loading article {article_id}..."));
        let backend = Arc::clone(&self.backend);
        let tx = self.events.clone();
        thread::spawn(move || {
            let result = backend.get(ticket.article_id);
            let _ = tx.send(AppEvent::ArticleLoaded(ticket, result));
        });
    }

    pub fn open_selected(&mut self) {
        if let Some(id) = self.articles.current().map(|a| a.id) {
            self.open_article(id);
        }
    }

    pub fn submit(&mut self) {
        let text = self.input.value().to_string();
        match self.session.submit_translation(&text) {
            Ok(request) => {
                debug!(sentence_id = %request.sentence_id, "translation submitted");
                let backend = Arc::clone(&self.backend);
                let tx = self.events.clone();
                thread::spawn(move || {
                    let result = backend.check(request.sentence_id, &request.text);
                    let _ = tx.send(AppEvent::CheckFinished(request, result));
                });
            }
            Err(SessionError::Validation | SessionError::Busy) => {}
            Err(err) => warn!(%err, "submission rejected"),
        }
    }

    // --- event handlers ---

    pub fn on_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Key(_) | AppEvent::Resize(_, _) => {}
            AppEvent::Tick => self.on_tick(Instant::now()),
            AppEvent::ArticlesListed(result) => self.on_articles_listed(result),
            AppEvent::ArticleLoaded(ticket, result) => self.on_article_loaded(&ticket, result),
            AppEvent::CheckFinished(request, result) => self.on_check_finished(&request, result),
        }
    }

    fn on_articles_listed(&mut self, result: Result<Vec<ArticleSummary>, ApiError>) {
        self.listing = false;
        match result {
            Ok(articles) => {
                info!(count = articles.len(), "article list refreshed");
                self.status = articles
                    .is_empty()
                    .then(|| "No articles available".to_string());
                self.articles.set_items(articles);
            }
            Err(err) => {
                warn!(%err, "listing articles failed");
                self.status = Some(format!("Could not list articles: {err} (press r to retry)"));
            }
        }
    }

    fn on_article_loaded(&mut self, ticket: &LoadTicket, result: Result<Article, ApiError>) {
        match self.session.finish_load(ticket, result) {
            Ok(()) => {
                self.status = None;
                self.screen = AppScreen::Study;
                self.sync_input();
            }
            Err(SessionError::Superseded) => {}
            Err(SessionError::NotFound) => {
                self.status = Some(format!("Article {} not found", ticket.article_id));
                self.screen = AppScreen::ArticleList;
            }
            Err(err) if err.is_retryable() => {
                self.status = Some(format!("Could not load article: {err} (press Enter to retry)"));
            }
            Err(err) => {
                self.status = Some(format!("Could not load article: {err}"));
            }
        }
    }

    fn on_check_finished(&mut self, request: &CheckRequest, result: Result<CheckResponse, ApiError>) {
        match self.session.complete_check(request, result, Instant::now()) {
            Ok(Some(classification)) => {
                debug!(sentence_id = %request.sentence_id, ?classification, "check applied");
            }
            Ok(None) => {}
            Err(err) => warn!(%err, sentence_id = %request.sentence_id, "translation check failed"),
        }
    }

    pub fn on_tick(&mut self, now: Instant) {
        if self.session.tick(now) {
            self.after_move();
        }
    }

    // --- study screen actions ---

    pub fn edit(&mut self, key: KeyEvent) -> InputResult {
        if self.session.input_locked() {
            return InputResult::Continue;
        }
        let result = self.input.handle(key);
        self.session.set_draft(self.input.value());
        result
    }

    pub fn skip(&mut self) {
        match self.session.skip() {
            Ok(()) => self.after_move(),
            Err(err) => debug!(%err, "skip ignored"),
        }
    }

    /// Move the current-sentence pointer by `delta`, clamped to the article.
    pub fn select_relative(&mut self, delta: isize) {
        let len = self.session.sentence_count();
        if len == 0 {
            return;
        }
        let target = self
            .session
            .current_index()
            .saturating_add_signed(delta)
            .min(len - 1);
        self.select(target);
    }

    pub fn select(&mut self, index: usize) {
        match self.session.select_sentence(index) {
            Ok(()) => self.after_move(),
            Err(err) => debug!(%err, index, "selection ignored"),
        }
    }

    pub fn page_scroll(&mut self, pages: i32) {
        let page = (self.session.layout().viewport_height() / 2).max(1) as i32;
        self.session.scroll_by(pages * page);
    }

    /// Put the current sentence's source text on the system clipboard.
    pub fn copy_current(&mut self) {
        let Some(sentence) = self.session.current_sentence() else {
            return;
        };
        let id = sentence.id;
        match clipboard::copy_text(&sentence.text) {
            Ok(()) => {
                debug!(sentence_id = %id, "sentence copied");
                self.mark_copied(id, Instant::now());
            }
            Err(err) => warn!(%err, sentence_id = %id, "copy to clipboard failed"),
        }
    }

    fn mark_copied(&mut self, sentence_id: SentenceId, now: Instant) {
        self.copied = Some((sentence_id, now));
    }

    /// Sentence copied within the last couple of seconds, if any.
    pub fn copied_sentence(&self, now: Instant) -> Option<SentenceId> {
        self.copied
            .filter(|(_, at)| now.saturating_duration_since(*at) < COPY_FLASH)
            .map(|(id, _)| id)
    }

    pub fn apply_layout(&mut self, events: Vec<LayoutEvent>) {
        for event in events {
            self.session.apply_layout(event);
        }
    }

    pub fn go_to_list(&mut self) {
        self.screen = AppScreen::ArticleList;
        self.refresh_articles();
    }

    fn after_move(&mut self) {
        self.sync_input();
        self.screen = match self.session.phase() {
            SessionPhase::Completed => AppScreen::Complete,
            SessionPhase::Studying => AppScreen::Study,
            SessionPhase::Empty => AppScreen::ArticleList,
        };
    }

    fn sync_input(&mut self) {
        if self.input.value() != self.session.draft() {
            self.input = LineInput::new(self.session.draft());
        }
    }
}

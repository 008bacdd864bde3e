use std::time::{Duration, Instant};

use ratatui::layout::Rect;
use tokio::task::JoinHandle;
use tracing::{error, warn};

use crate::clipboard;
use crate::config::Config;
use crate::error::Error;
use crate::gemini::GeminiClient;

/// How long the copy confirmation stays visible.
pub const COPY_CONFIRMATION: Duration = Duration::from_millis(2000);

pub const SPINNER_FRAMES: u8 = 3;

/// The UI's current phase regarding code generation. Exactly one
/// variant holds at any time; transitions are driven by the controller
/// in response to user action and request completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationState {
    Idle,
    Loading,
    Error(String),
    Ready(String),
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub state: GenerationState,

    // Code view state
    pub code_scroll: u16,
    pub code_height: u16,
    pub total_code_lines: u16,

    // Copy confirmation
    pub copied: bool,
    copied_at: Option<Instant>,

    // Animation state
    pub spinner_frame: u8,

    // In-flight request (at most one; the handler refuses to start
    // another while this is Some)
    generation_task: Option<JoinHandle<Result<String, Error>>>,

    // Control areas for mouse hit-testing (updated during render)
    pub generate_button_area: Option<Rect>,
    pub copy_button_area: Option<Rect>,
    pub code_area: Option<Rect>,

    client: GeminiClient,
}

impl App {
    /// Fails fast when the credential is missing; the terminal has not
    /// entered raw mode yet, so the error reaches stderr untouched.
    pub fn new(config: &Config) -> Result<Self, Error> {
        let api_key = config.credential()?;
        let client = GeminiClient::new(&api_key, &config.model());

        Ok(Self {
            should_quit: false,
            state: GenerationState::Idle,

            code_scroll: 0,
            code_height: 0,
            total_code_lines: 0,

            copied: false,
            copied_at: None,

            spinner_frame: 0,

            generation_task: None,

            generate_button_area: None,
            copy_button_area: None,
            code_area: None,

            client,
        })
    }

    pub fn is_loading(&self) -> bool {
        self.state == GenerationState::Loading
    }

    pub fn code(&self) -> Option<&str> {
        match &self.state {
            GenerationState::Ready(code) => Some(code),
            _ => None,
        }
    }

    /// The single user-triggerable action. Ignored while a request is
    /// in flight, so at most one task ever exists.
    pub fn request_generation(&mut self) {
        if self.generation_task.is_some() {
            return;
        }
        let client = self.client.clone();
        self.start_generation(tokio::spawn(async move {
            client.generate_simulation_script().await
        }));
    }

    fn start_generation(&mut self, task: JoinHandle<Result<String, Error>>) {
        self.state = GenerationState::Loading;
        self.copied = false;
        self.copied_at = None;
        self.code_scroll = 0;
        self.generation_task = Some(task);
    }

    /// Reap a finished request task, called from the event loop before
    /// each draw. Does nothing while the task is still running.
    pub async fn poll_generation(&mut self) {
        let finished = self
            .generation_task
            .as_ref()
            .is_some_and(|task| task.is_finished());
        if !finished {
            return;
        }

        if let Some(task) = self.generation_task.take() {
            let result = match task.await {
                Ok(result) => result,
                Err(e) => {
                    error!("generation task failed to run: {e}");
                    Err(Error::Generation(String::new()))
                }
            };
            self.finish_generation(result);
        }
    }

    fn finish_generation(&mut self, result: Result<String, Error>) {
        match result {
            Ok(raw) => self.state = GenerationState::Ready(clean_code(&raw)),
            Err(e) => self.state = GenerationState::Error(e.to_display_message()),
        }
    }

    /// Copy the generated code to the clipboard, exactly as displayed.
    /// Copy failures are logged and otherwise silent.
    pub fn copy_code(&mut self) {
        let GenerationState::Ready(code) = &self.state else {
            return;
        };
        match clipboard::copy(code) {
            Ok(()) => self.note_copied(),
            Err(e) => warn!("failed to copy to clipboard: {e:#}"),
        }
    }

    fn note_copied(&mut self) {
        self.copied = true;
        self.copied_at = Some(Instant::now());
    }

    /// Advance the spinner and expire the copy confirmation. Called on
    /// every Tick event.
    pub fn tick(&mut self) {
        if self.is_loading() {
            self.spinner_frame = (self.spinner_frame + 1) % SPINNER_FRAMES;
        }
        if let Some(at) = self.copied_at {
            if at.elapsed() >= COPY_CONFIRMATION {
                self.copied = false;
                self.copied_at = None;
            }
        }
    }

    // Code view scrolling
    pub fn scroll_down(&mut self) {
        let max_scroll = self.total_code_lines.saturating_sub(self.code_height);
        if self.code_scroll < max_scroll {
            self.code_scroll = self.code_scroll.saturating_add(1);
        }
    }

    pub fn scroll_up(&mut self) {
        self.code_scroll = self.code_scroll.saturating_sub(1);
    }

    pub fn scroll_half_page_down(&mut self) {
        let half_page = self.code_height / 2;
        let max_scroll = self.total_code_lines.saturating_sub(self.code_height);
        self.code_scroll = (self.code_scroll + half_page).min(max_scroll);
    }

    pub fn scroll_half_page_up(&mut self) {
        let half_page = self.code_height / 2;
        self.code_scroll = self.code_scroll.saturating_sub(half_page);
    }

    pub fn scroll_to_top(&mut self) {
        self.code_scroll = 0;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.code_scroll = self.total_code_lines.saturating_sub(self.code_height);
    }
}

/// Strip a leading Markdown fence line (with its language tag) and a
/// trailing fence from generated text. Fences inside the code survive,
/// and fence-free input passes through unchanged.
pub fn clean_code(raw: &str) -> String {
    let mut text = raw.trim();

    if let Some(rest) = text.strip_prefix("```") {
        // Drop the whole fence line, language tag included
        text = match rest.split_once('\n') {
            Some((_, body)) => body,
            None => "",
        };
    }

    text = text.trim_end();
    if let Some(body) = text.strip_suffix("```") {
        text = body;
    }

    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GENERATION_FAILED_PREFIX;

    fn test_app() -> App {
        let config = Config {
            api_key: Some("test-key".to_string()),
            model: None,
        };
        App::new(&config).expect("config carries a credential")
    }

    fn spawn_result(result: Result<String, Error>) -> JoinHandle<Result<String, Error>> {
        tokio::spawn(async move { result })
    }

    async fn drive_to_completion(app: &mut App) {
        while app.is_loading() {
            app.poll_generation().await;
            tokio::task::yield_now().await;
        }
    }

    #[test]
    fn clean_strips_leading_and_trailing_fences() {
        assert_eq!(clean_code("```python\nprint(1)\n```"), "print(1)");
    }

    #[test]
    fn clean_is_a_noop_without_fences() {
        let code = "import pygame\n\npygame.init()";
        assert_eq!(clean_code(code), code);
    }

    #[test]
    fn clean_is_idempotent() {
        let raw = "```python\nprint(1)\n```";
        assert_eq!(clean_code(&clean_code(raw)), clean_code(raw));

        let plain = "x = 1";
        assert_eq!(clean_code(&clean_code(plain)), clean_code(plain));
    }

    #[test]
    fn clean_preserves_internal_backticks() {
        let raw = "```python\ndoc = \"```example```\"\nprint(doc)\n```";
        assert_eq!(clean_code(raw), "doc = \"```example```\"\nprint(doc)");
    }

    #[test]
    fn clean_handles_untagged_fences_and_whitespace() {
        assert_eq!(clean_code("  ```\nx = 1\n```  \n"), "x = 1");
    }

    #[test]
    fn clean_of_a_bare_fence_line_is_empty() {
        assert_eq!(clean_code("```python"), "");
    }

    #[tokio::test]
    async fn request_sets_loading_synchronously() {
        let mut app = test_app();
        app.request_generation();
        // Before the task resolves; the spawned task never runs here
        // because this test hits no await point
        assert_eq!(app.state, GenerationState::Loading);
    }

    #[tokio::test]
    async fn request_resets_copy_state_and_scroll() {
        let mut app = test_app();
        app.state = GenerationState::Ready("old".to_string());
        app.note_copied();
        app.code_scroll = 5;

        app.start_generation(spawn_result(Ok("new".to_string())));
        assert!(!app.copied);
        assert_eq!(app.code_scroll, 0);
    }

    #[tokio::test]
    async fn successful_generation_ends_ready_with_cleaned_code() {
        let mut app = test_app();
        app.start_generation(spawn_result(Ok("```python\nprint(1)\n```".to_string())));
        drive_to_completion(&mut app).await;
        assert_eq!(app.state, GenerationState::Ready("print(1)".to_string()));
    }

    #[tokio::test]
    async fn failed_generation_ends_error_with_prefixed_message() {
        let mut app = test_app();
        app.start_generation(spawn_result(Err(Error::Generation(
            "Failed to generate code from the Gemini API".to_string(),
        ))));
        drive_to_completion(&mut app).await;

        match &app.state {
            GenerationState::Error(message) => {
                assert!(message.starts_with(GENERATION_FAILED_PREFIX));
                assert!(message.contains("Failed to generate code from the Gemini API"));
            }
            other => panic!("expected Error state, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn failure_clears_prior_result() {
        let mut app = test_app();
        app.state = GenerationState::Ready("old code".to_string());

        app.start_generation(spawn_result(Err(Error::Generation("boom".to_string()))));
        assert_eq!(app.state, GenerationState::Loading);
        drive_to_completion(&mut app).await;

        assert!(matches!(app.state, GenerationState::Error(_)));
        assert!(app.code().is_none());
    }

    #[tokio::test]
    async fn regeneration_reuses_the_same_flow_after_error() {
        let mut app = test_app();
        app.state = GenerationState::Error("earlier failure".to_string());

        app.start_generation(spawn_result(Ok("x = 2".to_string())));
        drive_to_completion(&mut app).await;
        assert_eq!(app.code(), Some("x = 2"));
    }

    #[tokio::test]
    async fn trigger_is_ignored_while_a_request_is_in_flight() {
        let mut app = test_app();
        app.start_generation(spawn_result(Ok("first".to_string())));

        // Would spawn a real network call if the guard were broken
        app.request_generation();
        drive_to_completion(&mut app).await;

        assert_eq!(app.code(), Some("first"));
    }

    #[test]
    fn copy_confirmation_expires_after_the_window() {
        let mut app = test_app();
        app.note_copied();
        assert!(app.copied);

        // A tick inside the window keeps the confirmation
        app.tick();
        assert!(app.copied);

        app.copied_at = Some(Instant::now() - COPY_CONFIRMATION);
        app.tick();
        assert!(!app.copied);
        assert!(app.copied_at.is_none());
    }

    #[test]
    fn copy_confirmation_applies_to_empty_text_too() {
        let mut app = test_app();
        app.state = GenerationState::Ready(String::new());
        app.note_copied();
        assert!(app.copied);
    }

    #[test]
    fn spinner_only_advances_while_loading() {
        let mut app = test_app();
        app.tick();
        assert_eq!(app.spinner_frame, 0);

        app.state = GenerationState::Loading;
        app.tick();
        assert_eq!(app.spinner_frame, 1);
    }

    #[test]
    fn scrolling_clamps_to_content() {
        let mut app = test_app();
        app.total_code_lines = 10;
        app.code_height = 4;

        app.scroll_to_bottom();
        assert_eq!(app.code_scroll, 6);
        app.scroll_down();
        assert_eq!(app.code_scroll, 6);

        app.scroll_half_page_up();
        assert_eq!(app.code_scroll, 4);
        app.scroll_to_top();
        assert_eq!(app.code_scroll, 0);
        app.scroll_up();
        assert_eq!(app.code_scroll, 0);
    }
}

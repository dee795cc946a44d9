//! Recording UI surface for testing.
//!
//! Answers prompts from a script, records everything shown to the user and
//! can hold prompts open so a test can observe the state while a
//! confirmation is pending.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;

use crate::traits::{AlertLevel, DialogContent, UiSurface};

/// Something the surface was asked to show or do.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    Confirm(String),
    Alert(String),
    Inpage(AlertLevel, String),
    HideInpage,
    Dialog { title: String, content: DialogContent },
    Navigate(String),
    ReloadView { view: String, src: String },
}

/// Test double for [`UiSurface`].
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    events: Arc<Mutex<Vec<UiEvent>>>,
    answers: Arc<Mutex<VecDeque<bool>>>,
    default_answer: Arc<Mutex<bool>>,
    held: Arc<watch::Sender<bool>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl Default for RecordingSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingSurface {
    /// A surface that affirms every prompt.
    pub fn new() -> Self {
        let (held, _) = watch::channel(false);
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
            answers: Arc::new(Mutex::new(VecDeque::new())),
            default_answer: Arc::new(Mutex::new(true)),
            held: Arc::new(held),
        }
    }

    /// A surface that declines every prompt.
    pub fn declining() -> Self {
        let surface = Self::new();
        surface.set_default_answer(false);
        surface
    }

    /// Answer used once the scripted answers run out.
    pub fn set_default_answer(&self, answer: bool) {
        *lock(&self.default_answer) = answer;
    }

    /// Script the next prompt answers, in order.
    pub fn push_answers(&self, answers: &[bool]) {
        lock(&self.answers).extend(answers.iter().copied());
    }

    /// Keep prompts open until [`release_confirms`](Self::release_confirms).
    pub fn hold_confirms(&self) {
        self.held.send_replace(true);
    }

    pub fn release_confirms(&self) {
        self.held.send_replace(false);
    }

    /// Wait until at least `count` prompts have been shown.
    pub async fn wait_for_confirms(&self, count: usize) {
        loop {
            let shown = lock(&self.events)
                .iter()
                .filter(|event| matches!(event, UiEvent::Confirm(_)))
                .count();
            if shown >= count {
                return;
            }
            tokio::task::yield_now().await;
        }
    }

    pub fn events(&self) -> Vec<UiEvent> {
        lock(&self.events).clone()
    }

    pub fn clear(&self) {
        lock(&self.events).clear();
    }

    pub fn confirms(&self) -> Vec<String> {
        self.collect(|event| match event {
            UiEvent::Confirm(message) => Some(message.clone()),
            _ => None,
        })
    }

    pub fn alerts(&self) -> Vec<String> {
        self.collect(|event| match event {
            UiEvent::Alert(message) => Some(message.clone()),
            _ => None,
        })
    }

    pub fn inpage(&self) -> Vec<(AlertLevel, String)> {
        self.collect(|event| match event {
            UiEvent::Inpage(level, message) => Some((*level, message.clone())),
            _ => None,
        })
    }

    pub fn dialogs(&self) -> Vec<(String, DialogContent)> {
        self.collect(|event| match event {
            UiEvent::Dialog { title, content } => Some((title.clone(), content.clone())),
            _ => None,
        })
    }

    pub fn navigations(&self) -> Vec<String> {
        self.collect(|event| match event {
            UiEvent::Navigate(location) => Some(location.clone()),
            _ => None,
        })
    }

    fn collect<T>(&self, f: impl Fn(&UiEvent) -> Option<T>) -> Vec<T> {
        lock(&self.events).iter().filter_map(f).collect()
    }

    fn record(&self, event: UiEvent) {
        lock(&self.events).push(event);
    }
}

#[async_trait]
impl UiSurface for RecordingSurface {
    async fn confirm(&self, message: &str) -> bool {
        self.record(UiEvent::Confirm(message.to_string()));

        let mut held = self.held.subscribe();
        // Sender lives in self, so wait_for cannot observe a closed channel.
        let _ = held.wait_for(|held| !*held).await;

        let scripted = lock(&self.answers).pop_front();
        scripted.unwrap_or_else(|| *lock(&self.default_answer))
    }

    async fn alert(&self, message: &str) {
        self.record(UiEvent::Alert(message.to_string()));
    }

    fn inpage_alert(&self, level: AlertLevel, message: &str) {
        self.record(UiEvent::Inpage(level, message.to_string()));
    }

    fn hide_inpage_alert(&self) {
        self.record(UiEvent::HideInpage);
    }

    async fn dialog(&self, title: &str, content: &DialogContent) {
        self.record(UiEvent::Dialog {
            title: title.to_string(),
            content: content.clone(),
        });
    }

    fn navigate(&self, location: &str) {
        self.record(UiEvent::Navigate(location.to_string()));
    }

    fn reload_view(&self, view: &str, src: &str) {
        self.record(UiEvent::ReloadView {
            view: view.to_string(),
            src: src.to_string(),
        });
    }
}

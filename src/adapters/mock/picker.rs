//! Scripted picker backend for testing.

use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{ConsoleError, ConsoleResult};
use crate::picker::{Library, PickedDocument, PickerBackend, PickerRequest};

#[derive(Debug, Default)]
struct Script {
    token: String,
    email: String,
    fail_auth: bool,
    pick: Option<PickedDocument>,
    cancel_next: bool,
    loads: Vec<Library>,
    authorizations: usize,
    requests: Vec<PickerRequest>,
    closes: usize,
}

/// Test double for [`PickerBackend`]. Clones share the script.
#[derive(Debug, Clone)]
pub struct MockPicker {
    script: Arc<Mutex<Script>>,
}

fn lock(script: &Mutex<Script>) -> MutexGuard<'_, Script> {
    script.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl Default for MockPicker {
    fn default() -> Self {
        Self::new()
    }
}

impl MockPicker {
    pub fn new() -> Self {
        let script = Script {
            token: "mock-token".to_string(),
            email: "user@example.com".to_string(),
            ..Script::default()
        };
        Self {
            script: Arc::new(Mutex::new(script)),
        }
    }

    pub fn with_auth(self, token: &str, email: &str) -> Self {
        {
            let mut script = lock(&self.script);
            script.token = token.to_string();
            script.email = email.to_string();
        }
        self
    }

    pub fn failing_auth(self) -> Self {
        lock(&self.script).fail_auth = true;
        self
    }

    /// Document returned by every pick.
    pub fn with_pick(self, name: &str, id: &str) -> Self {
        lock(&self.script).pick = Some(PickedDocument {
            id: id.to_string(),
            name: name.to_string(),
        });
        self
    }

    /// Make the next pick come back cancelled.
    pub fn cancel_next(&self) {
        lock(&self.script).cancel_next = true;
    }

    pub fn loads(&self) -> Vec<Library> {
        lock(&self.script).loads.clone()
    }

    pub fn authorize_count(&self) -> usize {
        lock(&self.script).authorizations
    }

    pub fn requests(&self) -> Vec<PickerRequest> {
        lock(&self.script).requests.clone()
    }

    pub fn close_count(&self) -> usize {
        lock(&self.script).closes
    }
}

#[async_trait]
impl PickerBackend for MockPicker {
    async fn load(&self, library: Library) -> ConsoleResult<()> {
        lock(&self.script).loads.push(library);
        Ok(())
    }

    async fn authorize(&self, _app_id: &str, _scope: &str) -> ConsoleResult<String> {
        let mut script = lock(&self.script);
        script.authorizations += 1;
        if script.fail_auth {
            return Err(ConsoleError::AuthorizationRequired {
                service: "Google".to_string(),
            });
        }
        Ok(script.token.clone())
    }

    async fn user_email(&self, _token: &str) -> ConsoleResult<String> {
        Ok(lock(&self.script).email.clone())
    }

    async fn pick(&self, request: &PickerRequest) -> ConsoleResult<Option<PickedDocument>> {
        let mut script = lock(&self.script);
        script.requests.push(request.clone());
        if std::mem::take(&mut script.cancel_next) {
            return Ok(None);
        }
        Ok(script.pick.clone())
    }

    fn close(&self) {
        lock(&self.script).closes += 1;
    }
}

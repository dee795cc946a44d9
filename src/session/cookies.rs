//! Session cookie storage.
//!
//! The backend identifies a session purely by cookies. The jar absorbs
//! `Set-Cookie` headers, replays them as a `Cookie` header on every request
//! and can persist itself to `~/.jbox/cookies.json` between runs.

use chrono::Utc;
use cookie::Cookie;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use crate::error::{classify_io_error, ConsoleResult, SystemError};

/// The cookies directory name.
const COOKIES_DIR: &str = ".jbox";

/// The cookies file name.
const COOKIES_FILE: &str = "cookies.json";

/// Cookies that make up a logged-in session; logout removes exactly these.
pub const SESSION_COOKIES: [&str; 6] = [
    "sessname",
    "hostshell",
    "hostupload",
    "hostipnb",
    "sign",
    "juliabox",
];

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredCookies {
    cookies: BTreeMap<String, String>,
}

/// In-memory cookie jar with optional file persistence.
#[derive(Debug, Default)]
pub struct CookieJar {
    cookies: Mutex<BTreeMap<String, String>>,
    path: Option<PathBuf>,
}

/// Default location of the persisted jar.
pub fn default_cookie_path() -> ConsoleResult<PathBuf> {
    let home = dirs::home_dir().ok_or(SystemError::NoHomeDirectory)?;
    Ok(home.join(COOKIES_DIR).join(COOKIES_FILE))
}

impl CookieJar {
    /// A jar that is never written to disk.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load the jar at `path`; a missing file yields an empty jar.
    pub fn load(path: impl Into<PathBuf>) -> ConsoleResult<Self> {
        let path = path.into();
        let cookies = if path.exists() {
            let file = File::open(&path)
                .map_err(|e| classify_io_error(e, Some(path.clone()), "open cookie jar"))?;
            let stored: StoredCookies = serde_json::from_reader(BufReader::new(file)).map_err(
                |e| SystemError::CorruptFile {
                    path: path.clone(),
                    message: e.to_string(),
                },
            )?;
            stored.cookies
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            cookies: Mutex::new(cookies),
            path: Some(path),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn cookies(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        self.cookies
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Write the jar back to its file. No-op for in-memory jars.
    pub fn save(&self) -> ConsoleResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    classify_io_error(e, Some(parent.to_path_buf()), "create directory")
                })?;
            }
        }

        let stored = StoredCookies {
            cookies: self.cookies().clone(),
        };
        let file = File::create(path)
            .map_err(|e| classify_io_error(e, Some(path.clone()), "write cookie jar"))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &stored).map_err(|e| {
            SystemError::IoError {
                operation: "serialize cookie jar".to_string(),
                path: Some(path.clone()),
                message: e.to_string(),
            }
        })?;
        writer
            .flush()
            .map_err(|e| classify_io_error(e, Some(path.clone()), "flush cookie jar"))?;
        Ok(())
    }

    pub fn set(&self, name: impl Into<String>, value: impl Into<String>) {
        self.cookies().insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<String> {
        self.cookies().get(name).cloned()
    }

    pub fn names(&self) -> Vec<String> {
        self.cookies().keys().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.cookies().is_empty()
    }

    /// Value for a `Cookie` request header, if there is anything to send.
    pub fn header_value(&self) -> Option<String> {
        let cookies = self.cookies();
        if cookies.is_empty() {
            return None;
        }
        Some(
            cookies
                .iter()
                .map(|(name, value)| format!("{}={}", name, value))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }

    /// Apply one or more `Set-Cookie` lines (newline separated).
    ///
    /// An empty value, a non-positive `Max-Age` or an `Expires` in the past
    /// deletes the cookie. `Max-Age` wins when both are given.
    pub fn absorb_set_cookie(&self, header: &str) {
        let now = Utc::now().timestamp();
        let mut cookies = self.cookies();
        for line in header.lines().map(str::trim).filter(|line| !line.is_empty()) {
            let cookie = match Cookie::parse(line) {
                Ok(cookie) => cookie,
                Err(e) => {
                    tracing::debug!("ignoring malformed Set-Cookie: {}", e);
                    continue;
                }
            };
            let value = cookie.value().trim_matches('"');

            if value.is_empty() || is_expired(&cookie, now) {
                cookies.remove(cookie.name());
            } else {
                cookies.insert(cookie.name().to_string(), value.to_string());
            }
        }
    }

    /// Remove the session cookies present in the jar; returns their names.
    pub fn remove_session_cookies(&self) -> Vec<String> {
        let mut cookies = self.cookies();
        let present: Vec<String> = cookies
            .keys()
            .filter(|name| SESSION_COOKIES.contains(&name.as_str()))
            .cloned()
            .collect();
        for name in &present {
            cookies.remove(name);
        }
        present
    }
}

fn is_expired(cookie: &Cookie<'_>, now: i64) -> bool {
    match cookie.max_age() {
        Some(age) => age.is_zero() || age.is_negative(),
        None => cookie
            .expires_datetime()
            .is_some_and(|at| at.unix_timestamp() <= now),
    }
}

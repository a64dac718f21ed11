use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use vt_core::{ApiConfig, LogEntry, Word};

fn log_path() -> Option<String> {
    std::env::var("LOG_API_PATH").ok()
}

pub fn log_error(message: &str) {
    let Some(path) = log_path() else {
        return;
    };
    let mut line = String::new();
    line.push_str("[error] ");
    line.push_str(message);
    line.push('\n');
    if let Ok(mut file) = std::fs::OpenOptions::new().create(true).append(true).open(path) {
        use std::io::Write;
        let _ = file.write_all(line.as_bytes());
    }
}

#[derive(Debug, Deserialize)]
pub struct UserInfo {
    pub user: UserProfile,
}

#[derive(Debug, Deserialize)]
pub struct UserProfile {
    pub username: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Exercise {
    pub question: String,
    #[serde(default)]
    pub using_dictionary: bool,
}

#[derive(Debug, Deserialize)]
pub struct AnswerFeedback {
    pub feedback: String,
}

#[derive(Debug, Serialize)]
struct ExerciseRequest<'a> {
    topics: Vec<&'a str>,
    exercise_type: &'a str,
    dictionary_words: &'a [Word],
}

#[derive(Debug, Serialize)]
struct CheckAnswerRequest<'a> {
    question: &'a str,
    answer: &'a str,
    exercise_type: &'a str,
}

#[derive(Debug, Serialize)]
struct AddLogRequest<'a> {
    content: &'a str,
}

/// Blocking client for the vocabulary service. The session rides on a
/// cookie: an existing one can be provided via SESSION_COOKIE, and the
/// cookie store keeps whatever the server refreshes it to.
#[derive(Debug)]
pub struct ApiClient {
    client: reqwest::blocking::Client,
    base_url: String,
    session_cookie: Option<String>,
}

impl ApiClient {
    pub fn from_config(config: &ApiConfig) -> Result<Self, String> {
        let base_url = std::env::var("API_URL").unwrap_or_else(|_| config.base_url.clone());
        let session_cookie = std::env::var("SESSION_COOKIE").ok();

        let client = reqwest::blocking::Client::builder()
            .cookie_store(true)
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|err| format!("Failed to build HTTP client: {err}"))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            session_cookie,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn get(&self, path: &str) -> reqwest::blocking::RequestBuilder {
        let mut request = self.client.get(self.url(path));
        if let Some(cookie) = &self.session_cookie {
            request = request.header("Cookie", cookie);
        }
        request
    }

    fn post(&self, path: &str) -> reqwest::blocking::RequestBuilder {
        let mut request = self.client.post(self.url(path));
        if let Some(cookie) = &self.session_cookie {
            request = request.header("Cookie", cookie);
        }
        request
    }

    fn read_json<T: DeserializeOwned>(
        response: reqwest::blocking::Response,
    ) -> Result<T, String> {
        let response = Self::check(response)?;
        response
            .json()
            .map_err(|err| format!("Invalid API response: {err}"))
    }

    fn check(
        response: reqwest::blocking::Response,
    ) -> Result<reqwest::blocking::Response, String> {
        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err("not logged in (set SESSION_COOKIE or log in again)".to_string());
        }
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(format!("API error ({status}): {body}"));
        }
        Ok(response)
    }

    pub fn me(&self) -> Result<UserInfo, String> {
        let response = self
            .get("/api/auth/me")
            .send()
            .map_err(|err| format!("Failed to reach the service: {err}"))?;
        Self::read_json(response)
    }

    pub fn fetch_dictionary(&self) -> Result<Vec<Word>, String> {
        let response = self
            .get("/api/dictionary")
            .send()
            .map_err(|err| format!("Failed to load dictionary: {err}"))?;
        Self::read_json(response)
    }

    pub fn fetch_log(&self) -> Result<Vec<LogEntry>, String> {
        let response = self
            .get("/api/log")
            .send()
            .map_err(|err| format!("Failed to load activity log: {err}"))?;
        Self::read_json(response)
    }

    pub fn add_log(&self, content: &str) -> Result<(), String> {
        let response = self
            .post("/api/log")
            .json(&AddLogRequest { content })
            .send()
            .map_err(|err| format!("Failed to append to activity log: {err}"))?;
        Self::check(response)?;
        Ok(())
    }

    pub fn fetch_exercise(
        &self,
        exercise_type: &str,
        dictionary_words: &[Word],
    ) -> Result<Exercise, String> {
        let payload = ExerciseRequest {
            topics: Vec::new(),
            exercise_type,
            dictionary_words,
        };
        let response = self
            .post("/exercise")
            .json(&payload)
            .send()
            .map_err(|err| format!("Failed to request an exercise: {err}"))?;
        Self::read_json(response)
    }

    pub fn check_answer(
        &self,
        question: &str,
        answer: &str,
        exercise_type: &str,
    ) -> Result<AnswerFeedback, String> {
        let payload = CheckAnswerRequest {
            question,
            answer,
            exercise_type,
        };
        let response = self
            .post("/check-answer")
            .json(&payload)
            .send()
            .map_err(|err| format!("Failed to check the answer: {err}"))?;
        Self::read_json(response)
    }
}

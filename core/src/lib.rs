use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod practice;

pub use practice::{
    Answered, Card, CardFaces, FLASHCARD_MIN_WORDS, Face, Flashcards, PracticeController,
    PracticeError, PracticeMode, QUIZ_MIN_WORDS, Quiz, Score, build_deck, resolve_faces,
};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TargetLanguage {
    English,
    Russian,
}

impl TargetLanguage {
    pub fn label(self) -> &'static str {
        match self {
            TargetLanguage::English => "English",
            TargetLanguage::Russian => "Russian",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            TargetLanguage::English => TargetLanguage::Russian,
            TargetLanguage::Russian => TargetLanguage::English,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PracticeDirection {
    GermanToTarget,
    TargetToGerman,
}

impl PracticeDirection {
    pub fn toggled(self) -> Self {
        match self {
            PracticeDirection::GermanToTarget => PracticeDirection::TargetToGerman,
            PracticeDirection::TargetToGerman => PracticeDirection::GermanToTarget,
        }
    }

    pub fn label(self, language: TargetLanguage) -> String {
        match self {
            PracticeDirection::GermanToTarget => format!("German → {}", language.label()),
            PracticeDirection::TargetToGerman => format!("{} → German", language.label()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Word {
    pub id: Uuid,
    pub german: String,
    pub english: String,
    pub russian: String,
    #[serde(rename = "type")]
    pub word_type: String,
    pub category: String,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default)]
    pub examples: Vec<String>,
    #[serde(rename = "timestamp")]
    pub created_at: DateTime<Utc>,
}

impl Word {
    pub fn translation(&self, language: TargetLanguage) -> &str {
        match language {
            TargetLanguage::English => &self.english,
            TargetLanguage::Russian => &self.russian,
        }
    }

    pub fn has_translation(&self, language: TargetLanguage) -> bool {
        !self.translation(language).trim().is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub content: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PracticeConfig {
    pub language: TargetLanguage,
    pub direction: PracticeDirection,
}

impl Default for PracticeConfig {
    fn default() -> Self {
        Self {
            language: TargetLanguage::English,
            direction: PracticeDirection::GermanToTarget,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
        }
    }
}

use std::collections::HashSet;
use std::error::Error;
use std::fmt;

use rand::Rng;
use rand::seq::SliceRandom;
use uuid::Uuid;

use crate::{PracticeDirection, TargetLanguage, Word};

pub const FLASHCARD_MIN_WORDS: usize = 1;
pub const QUIZ_MIN_WORDS: usize = 4;
const QUIZ_DISTRACTORS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PracticeError {
    InsufficientWords { required: usize, available: usize },
    MissingTranslation { german: String, language: TargetLanguage },
}

impl fmt::Display for PracticeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PracticeError::InsufficientWords {
                required,
                available,
            } => write!(
                f,
                "you need at least {required} words to practice ({available} eligible)"
            ),
            PracticeError::MissingTranslation { german, language } => {
                write!(f, "'{german}' has no {} translation", language.label())
            }
        }
    }
}

impl Error for PracticeError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PracticeMode {
    Flashcards,
    Quiz,
}

impl PracticeMode {
    pub fn minimum_words(self) -> usize {
        match self {
            PracticeMode::Flashcards => FLASHCARD_MIN_WORDS,
            PracticeMode::Quiz => QUIZ_MIN_WORDS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardFaces {
    pub prompt: String,
    pub answer: String,
}

pub fn resolve_faces(
    word: &Word,
    direction: PracticeDirection,
    language: TargetLanguage,
) -> Result<CardFaces, PracticeError> {
    let translation = word.translation(language).trim();
    if translation.is_empty() {
        return Err(PracticeError::MissingTranslation {
            german: word.german.clone(),
            language,
        });
    }
    let (prompt, answer) = match direction {
        PracticeDirection::GermanToTarget => (word.german.trim(), translation),
        PracticeDirection::TargetToGerman => (translation, word.german.trim()),
    };
    Ok(CardFaces {
        prompt: prompt.to_string(),
        answer: answer.to_string(),
    })
}

#[derive(Debug, Clone)]
pub struct Card {
    pub word: Word,
    pub prompt: String,
    pub answer: String,
}

/// Builds the working deck for one session: the selected words (or all of
/// them when the selection is empty) in dictionary order, minus entries
/// with no translation for the requested language, uniformly shuffled.
pub fn build_deck(
    words: &[Word],
    selection: &HashSet<Uuid>,
    direction: PracticeDirection,
    language: TargetLanguage,
    minimum: usize,
    rng: &mut impl Rng,
) -> Result<Vec<Card>, PracticeError> {
    let mut seen = HashSet::new();
    let mut deck: Vec<Card> = words
        .iter()
        .filter(|word| selection.is_empty() || selection.contains(&word.id))
        .filter(|word| seen.insert(word.id))
        .filter_map(|word| {
            let faces = resolve_faces(word, direction, language).ok()?;
            Some(Card {
                word: word.clone(),
                prompt: faces.prompt,
                answer: faces.answer,
            })
        })
        .collect();

    if deck.len() < minimum {
        return Err(PracticeError::InsufficientWords {
            required: minimum,
            available: deck.len(),
        });
    }

    deck.shuffle(rng);
    Ok(deck)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Face {
    Prompt,
    Answer,
}

#[derive(Debug)]
pub struct Flashcards {
    deck: Vec<Card>,
    index: usize,
    face: Face,
    language: TargetLanguage,
    direction: PracticeDirection,
}

impl Flashcards {
    fn new(deck: Vec<Card>, language: TargetLanguage, direction: PracticeDirection) -> Self {
        Self {
            deck,
            index: 0,
            face: Face::Prompt,
            language,
            direction,
        }
    }

    pub fn card(&self) -> &Card {
        &self.deck[self.index]
    }

    pub fn face(&self) -> Face {
        self.face
    }

    pub fn position(&self) -> (usize, usize) {
        (self.index, self.deck.len())
    }

    pub fn language(&self) -> TargetLanguage {
        self.language
    }

    pub fn direction(&self) -> PracticeDirection {
        self.direction
    }

    pub fn flip(&mut self) {
        self.face = match self.face {
            Face::Prompt => Face::Answer,
            Face::Answer => Face::Prompt,
        };
    }

    // Showing a different card always starts face up on the prompt.
    fn advance(&mut self) -> bool {
        if self.index + 1 < self.deck.len() {
            self.index += 1;
            self.face = Face::Prompt;
            true
        } else {
            false
        }
    }

    fn retreat(&mut self) -> bool {
        if self.index > 0 {
            self.index -= 1;
            self.face = Face::Prompt;
            true
        } else {
            false
        }
    }

    fn shuffle(&mut self, rng: &mut impl Rng) {
        self.deck.shuffle(rng);
        self.index = 0;
        self.face = Face::Prompt;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Score {
    pub correct: u32,
    pub total: u32,
}

impl Score {
    pub fn percentage(self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        (f64::from(self.correct) * 100.0 / f64::from(self.total)).round() as u32
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answered {
    pub selected: String,
    pub correct: bool,
}

#[derive(Debug)]
pub struct Quiz {
    deck: Vec<Card>,
    index: usize,
    options: Vec<String>,
    answered: Option<Answered>,
    score: Score,
    language: TargetLanguage,
    direction: PracticeDirection,
}

impl Quiz {
    fn new(
        deck: Vec<Card>,
        language: TargetLanguage,
        direction: PracticeDirection,
        rng: &mut impl Rng,
    ) -> Self {
        let mut quiz = Self {
            deck,
            index: 0,
            options: Vec::new(),
            answered: None,
            score: Score::default(),
            language,
            direction,
        };
        quiz.build_options(rng);
        quiz
    }

    fn build_options(&mut self, rng: &mut impl Rng) {
        let current = &self.deck[self.index];
        let others: Vec<&Card> = self
            .deck
            .iter()
            .filter(|card| card.word.id != current.word.id)
            .collect();
        let mut options: Vec<String> = others
            .choose_multiple(rng, QUIZ_DISTRACTORS)
            .map(|card| card.answer.clone())
            .collect();
        options.push(current.answer.clone());
        options.shuffle(rng);
        self.options = options;
    }

    pub fn card(&self) -> &Card {
        &self.deck[self.index]
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn answered(&self) -> Option<&Answered> {
        self.answered.as_ref()
    }

    pub fn score(&self) -> Score {
        self.score
    }

    pub fn position(&self) -> (usize, usize) {
        (self.index, self.deck.len())
    }

    pub fn language(&self) -> TargetLanguage {
        self.language
    }

    pub fn direction(&self) -> PracticeDirection {
        self.direction
    }

    pub fn is_complete(&self) -> bool {
        self.answered.is_some() && self.index + 1 == self.deck.len()
    }

    // Answers are locked: only the first submission per card is scored.
    fn submit(&mut self, selected: &str) -> bool {
        if self.answered.is_some() {
            return false;
        }
        let correct = selected == self.deck[self.index].answer;
        self.score.total += 1;
        if correct {
            self.score.correct += 1;
        }
        self.answered = Some(Answered {
            selected: selected.to_string(),
            correct,
        });
        true
    }

    fn advance(&mut self, rng: &mut impl Rng) -> bool {
        if self.answered.is_none() || self.index + 1 >= self.deck.len() {
            return false;
        }
        self.index += 1;
        self.answered = None;
        self.build_options(rng);
        true
    }

    fn shuffle(&mut self, rng: &mut impl Rng) {
        self.deck.shuffle(rng);
        self.index = 0;
        self.answered = None;
        self.score = Score::default();
        self.build_options(rng);
    }
}

#[derive(Debug)]
enum Session {
    Flashcards(Flashcards),
    Quiz(Quiz),
}

#[derive(Debug, Default)]
pub struct PracticeController {
    session: Option<Session>,
}

impl PracticeController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a session. Builds the deck before touching any state, so a
    /// failed start leaves the controller idle. Returns the log line for
    /// the activity log; the caller decides what to do with it.
    pub fn enter(
        &mut self,
        mode: PracticeMode,
        words: &[Word],
        selection: &HashSet<Uuid>,
        language: TargetLanguage,
        direction: PracticeDirection,
        rng: &mut impl Rng,
    ) -> Result<String, PracticeError> {
        self.session = None;
        let deck = build_deck(
            words,
            selection,
            direction,
            language,
            mode.minimum_words(),
            rng,
        )?;
        let count = deck.len();
        let started = match mode {
            PracticeMode::Flashcards => {
                self.session = Some(Session::Flashcards(Flashcards::new(
                    deck, language, direction,
                )));
                format!(
                    "Started flashcard practice: {} ({count} words)",
                    direction.label(language)
                )
            }
            PracticeMode::Quiz => {
                self.session = Some(Session::Quiz(Quiz::new(deck, language, direction, rng)));
                format!("Started quiz: {} ({count} words)", direction.label(language))
            }
        };
        Ok(started)
    }

    /// Tears the session down and resets everything, no matter how far the
    /// learner got. Returns the summary log line when a quiz was scored.
    pub fn exit(&mut self) -> Option<String> {
        let summary = match &self.session {
            Some(Session::Quiz(quiz)) if quiz.score().total > 0 => {
                let score = quiz.score();
                Some(format!(
                    "Quiz completed: {}/{} correct",
                    score.correct, score.total
                ))
            }
            _ => None,
        };
        self.session = None;
        summary
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn mode(&self) -> Option<PracticeMode> {
        match &self.session {
            Some(Session::Flashcards(_)) => Some(PracticeMode::Flashcards),
            Some(Session::Quiz(_)) => Some(PracticeMode::Quiz),
            None => None,
        }
    }

    pub fn flashcards(&self) -> Option<&Flashcards> {
        match &self.session {
            Some(Session::Flashcards(cards)) => Some(cards),
            _ => None,
        }
    }

    pub fn quiz(&self) -> Option<&Quiz> {
        match &self.session {
            Some(Session::Quiz(quiz)) => Some(quiz),
            _ => None,
        }
    }

    pub fn flip(&mut self) {
        if let Some(Session::Flashcards(cards)) = &mut self.session {
            cards.flip();
        }
    }

    pub fn advance(&mut self, rng: &mut impl Rng) -> bool {
        match &mut self.session {
            Some(Session::Flashcards(cards)) => cards.advance(),
            Some(Session::Quiz(quiz)) => quiz.advance(rng),
            None => false,
        }
    }

    /// Quiz progression is monotonic: retreat is a no-op there, always.
    pub fn retreat(&mut self) -> bool {
        match &mut self.session {
            Some(Session::Flashcards(cards)) => cards.retreat(),
            Some(Session::Quiz(_)) => false,
            None => false,
        }
    }

    pub fn submit_answer(&mut self, selected: &str) -> bool {
        match &mut self.session {
            Some(Session::Quiz(quiz)) => quiz.submit(selected),
            _ => false,
        }
    }

    pub fn shuffle(&mut self, rng: &mut impl Rng) -> Option<String> {
        match &mut self.session {
            Some(Session::Flashcards(cards)) => {
                cards.shuffle(rng);
                Some("Shuffled practice words".to_string())
            }
            Some(Session::Quiz(quiz)) => {
                quiz.shuffle(rng);
                Some("Shuffled practice words".to_string())
            }
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn word(german: &str, english: &str, russian: &str) -> Word {
        Word {
            id: Uuid::new_v4(),
            german: german.to_string(),
            english: english.to_string(),
            russian: russian.to_string(),
            word_type: "noun".to_string(),
            category: "Test".to_string(),
            explanation: None,
            examples: Vec::new(),
            created_at: Utc::now(),
        }
    }

    fn four_words() -> Vec<Word> {
        vec![
            word("Haus", "house", "дом"),
            word("Katze", "cat", "кошка"),
            word("Brot", "bread", "хлеб"),
            word("Wasser", "water", "вода"),
        ]
    }

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(7)
    }

    fn ids(words: &[Word]) -> HashSet<Uuid> {
        words.iter().map(|w| w.id).collect()
    }

    #[test]
    fn deck_is_a_permutation_of_the_selection() {
        let words = four_words();
        let selection: HashSet<Uuid> = words[..2].iter().map(|w| w.id).collect();
        let deck = build_deck(
            &words,
            &selection,
            PracticeDirection::GermanToTarget,
            TargetLanguage::English,
            FLASHCARD_MIN_WORDS,
            &mut rng(),
        )
        .unwrap();

        assert_eq!(deck.len(), 2);
        let deck_ids: HashSet<Uuid> = deck.iter().map(|c| c.word.id).collect();
        assert_eq!(deck_ids, selection);
    }

    #[test]
    fn empty_selection_uses_the_whole_dictionary() {
        let words = four_words();
        let deck = build_deck(
            &words,
            &HashSet::new(),
            PracticeDirection::GermanToTarget,
            TargetLanguage::English,
            QUIZ_MIN_WORDS,
            &mut rng(),
        )
        .unwrap();

        assert_eq!(deck.len(), 4);
        let deck_ids: HashSet<Uuid> = deck.iter().map(|c| c.word.id).collect();
        assert_eq!(deck_ids, ids(&words));
    }

    #[test]
    fn a_repeated_snapshot_entry_yields_one_card() {
        let mut words = four_words();
        words.push(words[0].clone());
        let deck = build_deck(
            &words,
            &HashSet::new(),
            PracticeDirection::GermanToTarget,
            TargetLanguage::English,
            FLASHCARD_MIN_WORDS,
            &mut rng(),
        )
        .unwrap();

        assert_eq!(deck.len(), 4);
        let deck_ids: HashSet<Uuid> = deck.iter().map(|c| c.word.id).collect();
        assert_eq!(deck_ids.len(), 4);
    }

    #[test]
    fn deck_excludes_words_without_the_needed_translation() {
        let mut words = four_words();
        words.push(word("Tisch", "", "стол"));
        let deck = build_deck(
            &words,
            &HashSet::new(),
            PracticeDirection::GermanToTarget,
            TargetLanguage::English,
            FLASHCARD_MIN_WORDS,
            &mut rng(),
        )
        .unwrap();

        assert_eq!(deck.len(), 4);
        assert!(deck.iter().all(|c| c.word.german != "Tisch"));

        // The same word is fine when drilling the language it does have.
        let deck = build_deck(
            &words,
            &HashSet::new(),
            PracticeDirection::GermanToTarget,
            TargetLanguage::Russian,
            FLASHCARD_MIN_WORDS,
            &mut rng(),
        )
        .unwrap();
        assert_eq!(deck.len(), 5);
    }

    #[test]
    fn three_words_are_not_enough_for_a_quiz() {
        let words = four_words();
        let selection: HashSet<Uuid> = words[..3].iter().map(|w| w.id).collect();
        let err = build_deck(
            &words,
            &selection,
            PracticeDirection::GermanToTarget,
            TargetLanguage::English,
            QUIZ_MIN_WORDS,
            &mut rng(),
        )
        .unwrap_err();

        assert_eq!(
            err,
            PracticeError::InsufficientWords {
                required: 4,
                available: 3
            }
        );
    }

    #[test]
    fn exclusion_can_drop_a_deck_below_the_minimum() {
        let mut words = four_words();
        words[3].english = "  ".to_string();
        let err = build_deck(
            &words,
            &HashSet::new(),
            PracticeDirection::GermanToTarget,
            TargetLanguage::English,
            QUIZ_MIN_WORDS,
            &mut rng(),
        )
        .unwrap_err();

        assert_eq!(
            err,
            PracticeError::InsufficientWords {
                required: 4,
                available: 3
            }
        );
    }

    #[test]
    fn resolve_faces_follows_the_direction() {
        let w = word("Haus", "house", "дом");

        let faces = resolve_faces(
            &w,
            PracticeDirection::GermanToTarget,
            TargetLanguage::English,
        )
        .unwrap();
        assert_eq!(faces.prompt, "Haus");
        assert_eq!(faces.answer, "house");

        let faces = resolve_faces(
            &w,
            PracticeDirection::TargetToGerman,
            TargetLanguage::Russian,
        )
        .unwrap();
        assert_eq!(faces.prompt, "дом");
        assert_eq!(faces.answer, "Haus");
    }

    #[test]
    fn resolve_faces_rejects_a_blank_translation() {
        let w = word("Haus", " ", "дом");
        let err = resolve_faces(
            &w,
            PracticeDirection::GermanToTarget,
            TargetLanguage::English,
        )
        .unwrap_err();
        assert_eq!(
            err,
            PracticeError::MissingTranslation {
                german: "Haus".to_string(),
                language: TargetLanguage::English
            }
        );
    }

    #[test]
    fn flipping_twice_returns_to_the_prompt() {
        let mut rng = rng();
        let mut controller = PracticeController::new();
        controller
            .enter(
                PracticeMode::Flashcards,
                &four_words(),
                &HashSet::new(),
                TargetLanguage::English,
                PracticeDirection::GermanToTarget,
                &mut rng,
            )
            .unwrap();

        assert_eq!(controller.flashcards().unwrap().face(), Face::Prompt);
        controller.flip();
        assert_eq!(controller.flashcards().unwrap().face(), Face::Answer);
        controller.flip();
        assert_eq!(controller.flashcards().unwrap().face(), Face::Prompt);
    }

    #[test]
    fn advancing_resets_the_face_to_the_prompt() {
        let mut rng = rng();
        let mut controller = PracticeController::new();
        controller
            .enter(
                PracticeMode::Flashcards,
                &four_words(),
                &HashSet::new(),
                TargetLanguage::English,
                PracticeDirection::GermanToTarget,
                &mut rng,
            )
            .unwrap();

        controller.flip();
        assert!(controller.advance(&mut rng));
        let cards = controller.flashcards().unwrap();
        assert_eq!(cards.face(), Face::Prompt);
        assert_eq!(cards.position().0, 1);
    }

    #[test]
    fn single_card_deck_cannot_move_in_either_direction() {
        let words = vec![word("Haus", "house", "дом")];
        let mut rng = rng();
        let mut controller = PracticeController::new();
        controller
            .enter(
                PracticeMode::Flashcards,
                &words,
                &HashSet::new(),
                TargetLanguage::English,
                PracticeDirection::GermanToTarget,
                &mut rng,
            )
            .unwrap();

        assert!(!controller.advance(&mut rng));
        assert!(!controller.retreat());
        assert_eq!(controller.flashcards().unwrap().position(), (0, 1));
    }

    #[test]
    fn quiz_options_hold_the_answer_and_three_distractors() {
        let mut rng = rng();
        let mut controller = PracticeController::new();
        controller
            .enter(
                PracticeMode::Quiz,
                &four_words(),
                &HashSet::new(),
                TargetLanguage::English,
                PracticeDirection::GermanToTarget,
                &mut rng,
            )
            .unwrap();

        let quiz = controller.quiz().unwrap();
        let answer = quiz.card().answer.clone();
        assert_eq!(quiz.options().len(), 4);
        assert!(quiz.options().contains(&answer));
        // Distinct translations in the fixture, so all options are distinct.
        let unique: HashSet<&String> = quiz.options().iter().collect();
        assert_eq!(unique.len(), 4);
    }

    #[test]
    fn correct_answer_scores_and_unlocks_advance() {
        let mut rng = rng();
        let mut controller = PracticeController::new();
        controller
            .enter(
                PracticeMode::Quiz,
                &four_words(),
                &HashSet::new(),
                TargetLanguage::English,
                PracticeDirection::GermanToTarget,
                &mut rng,
            )
            .unwrap();

        let answer = controller.quiz().unwrap().card().answer.clone();
        assert!(!controller.advance(&mut rng));
        assert!(controller.submit_answer(&answer));

        let quiz = controller.quiz().unwrap();
        assert_eq!(quiz.score(), Score {
            correct: 1,
            total: 1
        });
        assert!(quiz.answered().unwrap().correct);

        assert!(controller.advance(&mut rng));
        let quiz = controller.quiz().unwrap();
        assert_eq!(quiz.position().0, 1);
        assert!(quiz.answered().is_none());
    }

    #[test]
    fn answers_are_locked_after_the_first_submission() {
        let mut rng = rng();
        let mut controller = PracticeController::new();
        controller
            .enter(
                PracticeMode::Quiz,
                &four_words(),
                &HashSet::new(),
                TargetLanguage::English,
                PracticeDirection::GermanToTarget,
                &mut rng,
            )
            .unwrap();

        assert!(controller.submit_answer("definitely wrong"));
        let first = controller.quiz().unwrap().answered().cloned().unwrap();
        assert!(!first.correct);
        assert_eq!(controller.quiz().unwrap().score(), Score {
            correct: 0,
            total: 1
        });

        let answer = controller.quiz().unwrap().card().answer.clone();
        assert!(!controller.submit_answer(&answer));
        let quiz = controller.quiz().unwrap();
        assert_eq!(quiz.score(), Score {
            correct: 0,
            total: 1
        });
        assert_eq!(quiz.answered(), Some(&first));
    }

    #[test]
    fn quiz_never_moves_backwards() {
        let mut rng = rng();
        let mut controller = PracticeController::new();
        controller
            .enter(
                PracticeMode::Quiz,
                &four_words(),
                &HashSet::new(),
                TargetLanguage::English,
                PracticeDirection::GermanToTarget,
                &mut rng,
            )
            .unwrap();

        assert!(!controller.retreat());
        let answer = controller.quiz().unwrap().card().answer.clone();
        controller.submit_answer(&answer);
        controller.advance(&mut rng);
        assert!(!controller.retreat());
        assert_eq!(controller.quiz().unwrap().position().0, 1);
    }

    #[test]
    fn score_never_exceeds_the_attempt_count() {
        let mut rng = rng();
        let mut controller = PracticeController::new();
        controller
            .enter(
                PracticeMode::Quiz,
                &four_words(),
                &HashSet::new(),
                TargetLanguage::English,
                PracticeDirection::GermanToTarget,
                &mut rng,
            )
            .unwrap();

        for step in 0..4 {
            let answer = controller.quiz().unwrap().card().answer.clone();
            if step % 2 == 0 {
                controller.submit_answer(&answer);
            } else {
                controller.submit_answer("definitely wrong");
            }
            let score = controller.quiz().unwrap().score();
            assert!(score.correct <= score.total);
            controller.advance(&mut rng);
        }
    }

    #[test]
    fn answering_every_card_wrong_completes_with_zero_percent() {
        let mut rng = rng();
        let mut controller = PracticeController::new();
        controller
            .enter(
                PracticeMode::Quiz,
                &four_words(),
                &HashSet::new(),
                TargetLanguage::English,
                PracticeDirection::GermanToTarget,
                &mut rng,
            )
            .unwrap();

        for _ in 0..4 {
            controller.submit_answer("definitely wrong");
            controller.advance(&mut rng);
        }

        let quiz = controller.quiz().unwrap();
        assert!(quiz.is_complete());
        assert_eq!(quiz.score(), Score {
            correct: 0,
            total: 4
        });
        assert_eq!(quiz.score().percentage(), 0);
    }

    #[test]
    fn percentage_rounds_to_the_nearest_whole() {
        assert_eq!(
            Score {
                correct: 2,
                total: 3
            }
            .percentage(),
            67
        );
        assert_eq!(Score::default().percentage(), 0);
    }

    #[test]
    fn shuffle_restarts_the_quiz_in_place() {
        let mut rng = rng();
        let mut controller = PracticeController::new();
        controller
            .enter(
                PracticeMode::Quiz,
                &four_words(),
                &HashSet::new(),
                TargetLanguage::English,
                PracticeDirection::GermanToTarget,
                &mut rng,
            )
            .unwrap();

        let answer = controller.quiz().unwrap().card().answer.clone();
        controller.submit_answer(&answer);
        controller.advance(&mut rng);

        let line = controller.shuffle(&mut rng);
        assert_eq!(line.as_deref(), Some("Shuffled practice words"));
        let quiz = controller.quiz().unwrap();
        assert_eq!(quiz.position().0, 0);
        assert_eq!(quiz.score(), Score::default());
        assert!(quiz.answered().is_none());
        assert_eq!(quiz.options().len(), 4);
    }

    #[test]
    fn exit_resets_everything_and_reports_a_scored_quiz() {
        let mut rng = rng();
        let mut controller = PracticeController::new();
        controller
            .enter(
                PracticeMode::Quiz,
                &four_words(),
                &HashSet::new(),
                TargetLanguage::English,
                PracticeDirection::GermanToTarget,
                &mut rng,
            )
            .unwrap();

        let answer = controller.quiz().unwrap().card().answer.clone();
        controller.submit_answer(&answer);
        controller.advance(&mut rng);
        controller.submit_answer("definitely wrong");

        let summary = controller.exit();
        assert_eq!(summary.as_deref(), Some("Quiz completed: 1/2 correct"));
        assert!(!controller.is_active());
        assert!(controller.mode().is_none());
        assert!(controller.quiz().is_none());
        assert!(controller.exit().is_none());
    }

    #[test]
    fn exiting_flashcards_logs_nothing() {
        let mut rng = rng();
        let mut controller = PracticeController::new();
        controller
            .enter(
                PracticeMode::Flashcards,
                &four_words(),
                &HashSet::new(),
                TargetLanguage::English,
                PracticeDirection::GermanToTarget,
                &mut rng,
            )
            .unwrap();

        controller.flip();
        controller.advance(&mut rng);
        assert!(controller.exit().is_none());
        assert!(!controller.is_active());
    }

    #[test]
    fn an_unanswered_quiz_exits_without_a_summary() {
        let mut rng = rng();
        let mut controller = PracticeController::new();
        controller
            .enter(
                PracticeMode::Quiz,
                &four_words(),
                &HashSet::new(),
                TargetLanguage::English,
                PracticeDirection::GermanToTarget,
                &mut rng,
            )
            .unwrap();

        assert!(controller.exit().is_none());
    }

    #[test]
    fn a_failed_enter_leaves_the_controller_idle() {
        let words = four_words();
        let selection: HashSet<Uuid> = words[..3].iter().map(|w| w.id).collect();
        let mut rng = rng();
        let mut controller = PracticeController::new();

        let err = controller
            .enter(
                PracticeMode::Quiz,
                &words,
                &selection,
                TargetLanguage::English,
                PracticeDirection::GermanToTarget,
                &mut rng,
            )
            .unwrap_err();

        assert!(matches!(err, PracticeError::InsufficientWords {
            required: 4,
            ..
        }));
        assert!(!controller.is_active());
        assert!(controller.mode().is_none());
    }

    #[test]
    fn enter_reports_the_session_in_the_log_line() {
        let mut rng = rng();
        let mut controller = PracticeController::new();
        let line = controller
            .enter(
                PracticeMode::Quiz,
                &four_words(),
                &HashSet::new(),
                TargetLanguage::Russian,
                PracticeDirection::TargetToGerman,
                &mut rng,
            )
            .unwrap();

        assert_eq!(line, "Started quiz: Russian → German (4 words)");
    }
}

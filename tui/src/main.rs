use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use chrono::Utc;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use directories::ProjectDirs;
use dotenvy::dotenv;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use vt_core::{
    ApiConfig, Face, LogEntry, PracticeConfig, PracticeController, PracticeDirection,
    PracticeMode, TargetLanguage, Word,
};

mod api;
use crate::api::{AnswerFeedback, ApiClient, Exercise};

const TICK_MS: u64 = 100;
const EXERCISE_TYPES: [&str; 4] = ["vocabulary", "grammar", "translation", "comprehension"];

fn main() -> io::Result<()> {
    dotenv().ok();

    let data_dir = ProjectDirs::from("com", "vokabeltrainer", "Vokabeltrainer")
        .map(|dirs| dirs.data_local_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("./data"));
    fs::create_dir_all(&data_dir)?;
    let config_path = data_dir.join("config.toml");
    let config = load_config(&config_path)?;

    let api = ApiClient::from_config(&config.api)
        .map_err(|err| io::Error::new(io::ErrorKind::Other, err))?;

    let user = match api.me() {
        Ok(user) => user,
        Err(err) => {
            eprintln!("Cannot start: {err}");
            return Ok(());
        }
    };
    let dictionary = match api.fetch_dictionary() {
        Ok(words) => words,
        Err(err) => {
            eprintln!("Warning: {err}");
            Vec::new()
        }
    };
    let learning_log = match api.fetch_log() {
        Ok(entries) => entries,
        Err(err) => {
            eprintln!("Warning: {err}");
            Vec::new()
        }
    };

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    crossterm::execute!(stdout, crossterm::terminal::EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let (api_tx, api_rx) = mpsc::channel();
    let mut app = App::new(
        config.practice,
        Arc::new(api),
        user.user.username,
        dictionary,
        learning_log,
        api_tx,
        api_rx,
    );

    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    crossterm::execute!(
        terminal.backend_mut(),
        crossterm::terminal::LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }

    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> io::Result<()> {
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| ui(f, app))?;

        let timeout = TICK_MS.saturating_sub(last_tick.elapsed().as_millis() as u64);
        if event::poll(Duration::from_millis(timeout))? {
            if let Event::Key(key) = event::read()? {
                if handle_key(app, key)? {
                    return Ok(());
                }
            }
        }

        if last_tick.elapsed() >= Duration::from_millis(TICK_MS) {
            app.tick();
            last_tick = Instant::now();
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) -> io::Result<bool> {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Ok(true);
    }
    if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Ok(true);
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('d') => {
                app.open_dictionary();
                return Ok(false);
            }
            KeyCode::Char('p') => {
                app.open_practice();
                return Ok(false);
            }
            KeyCode::Char('l') => {
                app.open_log();
                return Ok(false);
            }
            _ => {}
        }
    }

    match app.mode {
        Mode::Menu => handle_menu_key(app, key),
        Mode::Dictionary => handle_dictionary_key(app, key),
        Mode::Exercise => handle_exercise_key(app, key),
        Mode::PracticeMenu => handle_practice_menu_key(app, key),
        Mode::Flashcards => handle_flashcards_key(app, key),
        Mode::Quiz => handle_quiz_key(app, key),
        Mode::Log => handle_log_key(app, key),
        Mode::Message => {
            app.message = None;
            app.mode = Mode::Menu;
            Ok(false)
        }
    }
}

fn handle_menu_key(app: &mut App, key: KeyEvent) -> io::Result<bool> {
    match key.code {
        KeyCode::Char('q') => Ok(true),
        KeyCode::Char('d') => {
            app.open_dictionary();
            Ok(false)
        }
        KeyCode::Char('e') => {
            app.message = None;
            app.mode = Mode::Exercise;
            Ok(false)
        }
        KeyCode::Char('p') => {
            app.open_practice();
            Ok(false)
        }
        KeyCode::Char('l') => {
            app.open_log();
            Ok(false)
        }
        _ => Ok(false),
    }
}

fn handle_dictionary_key(app: &mut App, key: KeyEvent) -> io::Result<bool> {
    if app.dict_searching {
        match key.code {
            KeyCode::Esc => {
                app.dict_searching = false;
                app.dict_search.clear();
                app.dict_cursor = 0;
            }
            KeyCode::Enter => app.dict_searching = false,
            KeyCode::Backspace => {
                app.dict_search.pop();
                app.dict_cursor = 0;
            }
            KeyCode::Char(ch) => {
                app.dict_search.push(ch);
                app.dict_cursor = 0;
            }
            _ => {}
        }
        return Ok(false);
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => {
            app.mode = Mode::Menu;
            Ok(false)
        }
        KeyCode::Up | KeyCode::Char('k') => {
            app.dict_move(-1);
            Ok(false)
        }
        KeyCode::Down | KeyCode::Char('j') => {
            app.dict_move(1);
            Ok(false)
        }
        KeyCode::Enter | KeyCode::Char(' ') => {
            app.toggle_selected();
            Ok(false)
        }
        KeyCode::Char('a') => {
            let ids: Vec<Uuid> = app.dictionary.iter().map(|w| w.id).collect();
            app.selected_words.extend(ids);
            Ok(false)
        }
        KeyCode::Char('x') => {
            app.selected_words.clear();
            Ok(false)
        }
        KeyCode::Char('/') => {
            app.dict_searching = true;
            Ok(false)
        }
        _ => Ok(false),
    }
}

fn handle_exercise_key(app: &mut App, key: KeyEvent) -> io::Result<bool> {
    if key.code == KeyCode::Char('n') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.request_exercise();
        return Ok(false);
    }

    if app.exercise.is_some() {
        match key.code {
            KeyCode::Esc => {
                app.mode = Mode::Menu;
            }
            KeyCode::Enter => app.submit_exercise_answer(),
            KeyCode::Backspace => {
                app.exercise_answer.pop();
            }
            KeyCode::Char(ch) => app.exercise_answer.push(ch),
            _ => {}
        }
        return Ok(false);
    }

    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => {
            app.mode = Mode::Menu;
            Ok(false)
        }
        KeyCode::Char('t') | KeyCode::Up | KeyCode::Down => {
            app.exercise_type_index = (app.exercise_type_index + 1) % EXERCISE_TYPES.len();
            Ok(false)
        }
        KeyCode::Enter | KeyCode::Char('g') => {
            app.request_exercise();
            Ok(false)
        }
        _ => Ok(false),
    }
}

fn handle_practice_menu_key(app: &mut App, key: KeyEvent) -> io::Result<bool> {
    match key.code {
        KeyCode::Esc => {
            app.message = None;
            app.mode = Mode::Menu;
            Ok(false)
        }
        KeyCode::Char('l') => {
            app.practice_language = app.practice_language.toggled();
            Ok(false)
        }
        KeyCode::Char('d') => {
            app.practice_direction = app.practice_direction.toggled();
            Ok(false)
        }
        KeyCode::Char('f') => {
            app.start_practice(PracticeMode::Flashcards);
            Ok(false)
        }
        KeyCode::Char('q') => {
            app.start_practice(PracticeMode::Quiz);
            Ok(false)
        }
        _ => Ok(false),
    }
}

fn handle_flashcards_key(app: &mut App, key: KeyEvent) -> io::Result<bool> {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => {
            app.exit_practice();
            app.mode = Mode::PracticeMenu;
            Ok(false)
        }
        KeyCode::Char(' ') | KeyCode::Enter => {
            app.practice.flip();
            Ok(false)
        }
        KeyCode::Right | KeyCode::Char('n') => {
            app.practice.advance(&mut rand::thread_rng());
            Ok(false)
        }
        KeyCode::Left | KeyCode::Char('p') => {
            app.practice.retreat();
            Ok(false)
        }
        KeyCode::Char('s') => {
            if let Some(line) = app.practice.shuffle(&mut rand::thread_rng()) {
                app.log_activity(line);
            }
            Ok(false)
        }
        _ => Ok(false),
    }
}

fn handle_quiz_key(app: &mut App, key: KeyEvent) -> io::Result<bool> {
    if app.quiz_summary {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {
                app.exit_practice();
                app.mode = Mode::PracticeMenu;
            }
            KeyCode::Char('r') => app.start_practice(PracticeMode::Quiz),
            _ => {}
        }
        return Ok(false);
    }

    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => {
            app.exit_practice();
            app.mode = Mode::PracticeMenu;
            Ok(false)
        }
        KeyCode::Char(ch @ '1'..='4') => {
            let index = ch as usize - '1' as usize;
            let option = app
                .practice
                .quiz()
                .and_then(|quiz| quiz.options().get(index).cloned());
            if let Some(option) = option {
                app.quiz_notice = None;
                app.practice.submit_answer(&option);
            }
            Ok(false)
        }
        KeyCode::Right | KeyCode::Char('n') => {
            let complete = app.practice.quiz().is_some_and(|quiz| quiz.is_complete());
            if complete {
                app.quiz_summary = true;
            } else {
                app.practice.advance(&mut rand::thread_rng());
            }
            Ok(false)
        }
        KeyCode::Left | KeyCode::Char('p') => {
            app.practice.retreat();
            app.quiz_notice = Some("Cannot go back in quiz mode!".to_string());
            Ok(false)
        }
        KeyCode::Char('s') => {
            app.quiz_notice = None;
            if let Some(line) = app.practice.shuffle(&mut rand::thread_rng()) {
                app.log_activity(line);
            }
            Ok(false)
        }
        _ => Ok(false),
    }
}

fn handle_log_key(app: &mut App, key: KeyEvent) -> io::Result<bool> {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => {
            app.mode = Mode::Menu;
            Ok(false)
        }
        KeyCode::Up | KeyCode::Char('k') => {
            app.log_scroll = app.log_scroll.saturating_sub(1);
            Ok(false)
        }
        KeyCode::Down | KeyCode::Char('j') => {
            app.log_scroll = app.log_scroll.saturating_add(1);
            Ok(false)
        }
        _ => Ok(false),
    }
}

fn ui(frame: &mut ratatui::Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(3)].as_ref())
        .split(frame.size());

    match app.mode {
        Mode::Menu => frame.render_widget(render_menu(app), chunks[0]),
        Mode::Dictionary => render_dictionary(frame, app, chunks[0]),
        Mode::Exercise => render_exercise(frame, app, chunks[0]),
        Mode::PracticeMenu => frame.render_widget(render_practice_menu(app), chunks[0]),
        Mode::Flashcards => render_flashcards(frame, app, chunks[0]),
        Mode::Quiz => render_quiz(frame, app, chunks[0]),
        Mode::Log => render_log(frame, app, chunks[0]),
        Mode::Message => frame.render_widget(render_message(app), chunks[0]),
    }
    frame.render_widget(render_footer(app), chunks[1]);
}

fn render_menu(app: &App) -> Paragraph<'_> {
    let mut text = Text::default();
    text.lines.push(Line::from("Vokabeltrainer"));
    text.lines
        .push(Line::from(format!("Logged in as {}", app.username)));
    text.lines.push(Line::from(format!(
        "{} words in your dictionary",
        app.dictionary.len()
    )));
    text.lines.push(Line::from(""));
    text.lines.push(Line::from("d - dictionary"));
    text.lines.push(Line::from("e - exercises"));
    text.lines.push(Line::from("p - practice"));
    text.lines.push(Line::from("l - activity log"));
    text.lines.push(Line::from("q - quit"));

    Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title("Menu"))
        .wrap(Wrap { trim: true })
}

fn render_dictionary(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(3)].as_ref())
        .split(area);

    let mut header = Text::default();
    header.lines.push(Line::from(format!(
        "{} words, {} selected for practice",
        app.dictionary.len(),
        app.selected_words.len()
    )));
    if app.dict_searching || !app.dict_search.is_empty() {
        header
            .lines
            .push(Line::from(format!("Search: {}", app.dict_search)));
    }
    if let Some(message) = &app.message {
        header.lines.push(Line::from(Span::styled(
            message.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )));
    }

    let header_widget = Paragraph::new(header)
        .block(Block::default().borders(Borders::ALL).title("Dictionary"))
        .wrap(Wrap { trim: false });
    frame.render_widget(header_widget, chunks[0]);

    let mut text = Text::default();
    let indices = app.filtered_dict_indices();
    if indices.is_empty() {
        text.lines.push(Line::from("No words found"));
    } else {
        let available = chunks[1].height.saturating_sub(2) as usize;
        let total = indices.len();
        let mut start = app.dict_cursor.saturating_sub(available / 2);
        if available > 0 && start + available > total {
            start = total.saturating_sub(available);
        }
        let end = (start + available).min(total);
        for (offset, dict_idx) in indices[start..end].iter().enumerate() {
            let global_idx = start + offset;
            let word = &app.dictionary[*dict_idx];
            let marker = if app.selected_words.contains(&word.id) {
                "[x]"
            } else {
                "[ ]"
            };
            let line = format!(
                "{} {} {} -> {} / {} ({}, {})",
                if global_idx == app.dict_cursor { ">" } else { " " },
                marker,
                word.german,
                word.english,
                word.russian,
                word.word_type,
                word.category
            );
            if global_idx == app.dict_cursor {
                text.lines.push(Line::from(Span::styled(
                    line,
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                )));
            } else {
                text.lines.push(Line::from(line));
            }
        }
    }

    let list = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL))
        .wrap(Wrap { trim: false });
    frame.render_widget(list, chunks[1]);
}

fn render_exercise(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(5),
                Constraint::Min(5),
                Constraint::Length(4),
            ]
            .as_ref(),
        )
        .split(area);

    let mut header = Text::default();
    header.lines.push(Line::from(format!(
        "Exercise type: {}",
        app.exercise_type()
    )));
    if app.exercise_in_flight {
        header.lines.push(Line::from("Loading..."));
    }
    if let Some(message) = &app.message {
        header.lines.push(Line::from(Span::styled(
            message.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )));
    }

    let header_widget = Paragraph::new(header)
        .block(Block::default().borders(Borders::ALL).title("Exercises"))
        .wrap(Wrap { trim: false });
    frame.render_widget(header_widget, chunks[0]);

    let mut body = Text::default();
    match &app.exercise {
        Some(exercise) => {
            if exercise.using_dictionary {
                body.lines.push(Line::from(Span::styled(
                    "Using your dictionary words",
                    Style::default().fg(Color::Green),
                )));
                body.lines.push(Line::from(""));
            }
            for line in strip_markup(&exercise.question).lines() {
                body.lines.push(Line::from(line.to_string()));
            }
            if let Some(feedback) = &app.exercise_feedback {
                body.lines.push(Line::from(""));
                for line in strip_markup(feedback).lines() {
                    body.lines.push(Line::from(Span::styled(
                        line.to_string(),
                        Style::default().fg(Color::Yellow),
                    )));
                }
            }
        }
        None => {
            body.lines
                .push(Line::from("Press Enter to fetch an exercise."));
            if !app.selected_words.is_empty() {
                body.lines.push(Line::from(format!(
                    "{} selected dictionary words will be woven in.",
                    app.selected_words.len()
                )));
            }
        }
    }

    let body_widget = Paragraph::new(body)
        .block(Block::default().borders(Borders::ALL).title("Question"))
        .wrap(Wrap { trim: false });
    frame.render_widget(body_widget, chunks[1]);

    let answer = Paragraph::new(app.exercise_answer.as_str())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Your answer")
                .border_style(if app.exercise.is_some() {
                    Style::default()
                        .fg(Color::Blue)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                }),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(answer, chunks[2]);
}

fn render_practice_menu(app: &App) -> Paragraph<'_> {
    let mut text = Text::default();
    text.lines.push(Line::from("Practice"));
    text.lines.push(Line::from(""));
    let pool = if app.selected_words.is_empty() {
        app.dictionary.len()
    } else {
        app.selected_words.len()
    };
    text.lines.push(Line::from(format!(
        "{} words in the pool, {} with a {} translation",
        pool,
        app.eligible_count(),
        app.practice_language.label()
    )));
    text.lines.push(Line::from(format!(
        "Direction: {}",
        app.practice_direction.label(app.practice_language)
    )));
    text.lines.push(Line::from(""));
    text.lines.push(Line::from("f - flashcards"));
    text.lines.push(Line::from("q - multiple-choice quiz"));
    text.lines.push(Line::from("l - switch target language"));
    text.lines.push(Line::from("d - switch direction"));
    if let Some(message) = &app.message {
        text.lines.push(Line::from(""));
        text.lines.push(Line::from(Span::styled(
            message.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )));
    }

    Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title("Practice"))
        .wrap(Wrap { trim: true })
}

fn render_flashcards(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let Some(cards) = app.practice.flashcards() else {
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(5)].as_ref())
        .split(area);

    let (index, total) = cards.position();
    let mut header = Text::default();
    header
        .lines
        .push(Line::from(cards.direction().label(cards.language())));
    header
        .lines
        .push(Line::from(format!("Card {} of {}", index + 1, total)));

    let header_widget = Paragraph::new(header)
        .block(Block::default().borders(Borders::ALL).title("Flashcards"))
        .wrap(Wrap { trim: false });
    frame.render_widget(header_widget, chunks[0]);

    let card = cards.card();
    let (face_label, face_text) = match cards.face() {
        Face::Prompt => (
            prompt_label(cards.direction(), cards.language()),
            &card.prompt,
        ),
        Face::Answer => (
            answer_label(cards.direction(), cards.language()),
            &card.answer,
        ),
    };

    let mut body = Text::default();
    body.lines.push(Line::from(Span::styled(
        face_label,
        Style::default().fg(Color::DarkGray),
    )));
    body.lines.push(Line::from(""));
    body.lines.push(Line::from(Span::styled(
        face_text.clone(),
        Style::default().add_modifier(Modifier::BOLD),
    )));
    body.lines.push(Line::from(Span::styled(
        format!("({})", card.word.word_type),
        Style::default().fg(Color::DarkGray),
    )));

    let body_widget = Paragraph::new(body)
        .block(Block::default().borders(Borders::ALL).title("Card"))
        .wrap(Wrap { trim: false });
    frame.render_widget(body_widget, chunks[1]);
}

fn render_quiz(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let Some(quiz) = app.practice.quiz() else {
        return;
    };

    if app.quiz_summary {
        let score = quiz.score();
        let mut text = Text::default();
        text.lines.push(Line::from("Quiz complete!"));
        text.lines.push(Line::from(""));
        text.lines.push(Line::from(format!(
            "Final score: {}/{} ({}%)",
            score.correct,
            score.total,
            score.percentage()
        )));
        text.lines.push(Line::from(""));
        text.lines.push(Line::from("r - try again"));
        text.lines.push(Line::from("Esc - back to the practice menu"));

        let widget = Paragraph::new(text)
            .block(Block::default().borders(Borders::ALL).title("Quiz"))
            .wrap(Wrap { trim: true });
        frame.render_widget(widget, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(5),
                Constraint::Min(6),
                Constraint::Length(4),
            ]
            .as_ref(),
        )
        .split(area);

    let (index, total) = quiz.position();
    let score = quiz.score();
    let mut header = Text::default();
    header
        .lines
        .push(Line::from(quiz.direction().label(quiz.language())));
    header.lines.push(Line::from(format!(
        "Question {} of {} | Score: {}/{}",
        index + 1,
        total,
        score.correct,
        score.total
    )));
    if let Some(notice) = &app.quiz_notice {
        header.lines.push(Line::from(Span::styled(
            notice.clone(),
            Style::default().fg(Color::Yellow),
        )));
    }

    let header_widget = Paragraph::new(header)
        .block(Block::default().borders(Borders::ALL).title("Quiz"))
        .wrap(Wrap { trim: false });
    frame.render_widget(header_widget, chunks[0]);

    let card = quiz.card();
    let mut body = Text::default();
    body.lines.push(Line::from(Span::styled(
        card.prompt.clone(),
        Style::default().add_modifier(Modifier::BOLD),
    )));
    body.lines.push(Line::from(Span::styled(
        format!("({})", card.word.word_type),
        Style::default().fg(Color::DarkGray),
    )));
    body.lines.push(Line::from(""));
    for (idx, option) in quiz.options().iter().enumerate() {
        let mut label = format!("{}. {}", idx + 1, option);
        let style = match quiz.answered() {
            Some(answered) => {
                if *option == answered.selected && answered.correct {
                    label.push_str("  ✓");
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD)
                } else if *option == answered.selected {
                    label.push_str("  ✗");
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
                } else if *option == card.answer {
                    Style::default().fg(Color::Green)
                } else {
                    Style::default().fg(Color::DarkGray)
                }
            }
            None => Style::default(),
        };
        body.lines.push(Line::from(Span::styled(label, style)));
    }

    let body_widget = Paragraph::new(body)
        .block(Block::default().borders(Borders::ALL).title("Question"))
        .wrap(Wrap { trim: false });
    frame.render_widget(body_widget, chunks[1]);

    let mut feedback = Text::default();
    if let Some(answered) = quiz.answered() {
        let verdict = if answered.correct {
            Span::styled("Correct!", Style::default().fg(Color::Green))
        } else {
            Span::styled("Incorrect", Style::default().fg(Color::Red))
        };
        feedback.lines.push(Line::from(verdict));
        feedback
            .lines
            .push(Line::from(format!("{} = {}", card.prompt, card.answer)));
        if quiz.is_complete() {
            feedback
                .lines
                .push(Line::from("Press n to see your final score"));
        }
    }

    let feedback_widget = Paragraph::new(feedback)
        .block(Block::default().borders(Borders::ALL))
        .wrap(Wrap { trim: false });
    frame.render_widget(feedback_widget, chunks[2]);
}

fn render_log(frame: &mut ratatui::Frame, app: &mut App, area: Rect) {
    let mut text = Text::default();
    if app.learning_log.is_empty() {
        text.lines.push(Line::from("No log entries yet"));
    } else {
        let available = area.height.saturating_sub(2) as usize;
        let total = app.learning_log.len();
        let max_start = total.saturating_sub(available);
        if app.log_scroll > max_start {
            app.log_scroll = max_start;
        }
        let start = app.log_scroll;
        let end = (start + available).min(total);
        for entry in &app.learning_log[start..end] {
            text.lines.push(Line::from(format!(
                "{}  {}",
                entry.timestamp.format("%Y-%m-%d %H:%M"),
                entry.content
            )));
        }
    }

    let widget = Paragraph::new(text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Activity Log"),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(widget, area);
}

fn render_message(app: &App) -> Paragraph<'_> {
    let message = app.message.clone().unwrap_or_else(|| "".to_string());
    Paragraph::new(message)
        .block(Block::default().borders(Borders::ALL).title("Message"))
        .wrap(Wrap { trim: true })
}

fn render_footer(app: &App) -> Paragraph<'_> {
    let info = match app.mode {
        Mode::Menu => "d dictionary | e exercises | p practice | l log | q quit | Ctrl+Q quit",
        Mode::Dictionary => {
            "Up/Down or j/k move | Space select | a all | x none | / search | q back"
        }
        Mode::Exercise => "Enter fetch/submit | t type | Ctrl+N new exercise | Esc back",
        Mode::PracticeMenu => "f flashcards | q quiz | l language | d direction | Esc back",
        Mode::Flashcards => "Space flip | n next | p previous | s shuffle | Esc exit",
        Mode::Quiz => "1-4 answer | n next | s shuffle | Esc exit",
        Mode::Log => "Up/Down or j/k scroll | q back",
        Mode::Message => "Any key back",
    };

    Paragraph::new(info).block(Block::default().borders(Borders::ALL).title("Keys"))
}

fn prompt_label(direction: PracticeDirection, language: TargetLanguage) -> &'static str {
    match direction {
        PracticeDirection::GermanToTarget => "German",
        PracticeDirection::TargetToGerman => language.label(),
    }
}

fn answer_label(direction: PracticeDirection, language: TargetLanguage) -> &'static str {
    match direction {
        PracticeDirection::GermanToTarget => language.label(),
        PracticeDirection::TargetToGerman => "German",
    }
}

// The service decorates questions with **bold** markers meant for HTML.
fn strip_markup(text: &str) -> String {
    text.replace("**", "")
}

#[derive(Debug)]
struct App {
    mode: Mode,
    api: Arc<ApiClient>,
    username: String,
    dictionary: Vec<Word>,
    selected_words: HashSet<Uuid>,
    dict_cursor: usize,
    dict_search: String,
    dict_searching: bool,
    learning_log: Vec<LogEntry>,
    log_scroll: usize,
    exercise_type_index: usize,
    exercise: Option<Exercise>,
    exercise_answer: String,
    exercise_feedback: Option<String>,
    exercise_in_flight: bool,
    exercise_words_sent: usize,
    api_tx: Sender<ApiEvent>,
    api_rx: Receiver<ApiEvent>,
    practice: PracticeController,
    practice_language: TargetLanguage,
    practice_direction: PracticeDirection,
    quiz_notice: Option<String>,
    quiz_summary: bool,
    message: Option<String>,
}

impl App {
    fn new(
        practice_config: PracticeConfig,
        api: Arc<ApiClient>,
        username: String,
        dictionary: Vec<Word>,
        learning_log: Vec<LogEntry>,
        api_tx: Sender<ApiEvent>,
        api_rx: Receiver<ApiEvent>,
    ) -> Self {
        Self {
            mode: Mode::Menu,
            api,
            username,
            dictionary,
            selected_words: HashSet::new(),
            dict_cursor: 0,
            dict_search: String::new(),
            dict_searching: false,
            learning_log,
            log_scroll: 0,
            exercise_type_index: 0,
            exercise: None,
            exercise_answer: String::new(),
            exercise_feedback: None,
            exercise_in_flight: false,
            exercise_words_sent: 0,
            api_tx,
            api_rx,
            practice: PracticeController::new(),
            practice_language: practice_config.language,
            practice_direction: practice_config.direction,
            quiz_notice: None,
            quiz_summary: false,
            message: None,
        }
    }

    fn tick(&mut self) {
        loop {
            match self.api_rx.try_recv() {
                Ok(ApiEvent::Exercise(result)) => {
                    self.exercise_in_flight = false;
                    match result {
                        Ok(exercise) => {
                            self.exercise = Some(exercise);
                            self.exercise_answer.clear();
                            self.exercise_feedback = None;
                            self.message = None;
                            let line = if self.exercise_words_sent > 0 {
                                format!("Practiced {} selected words", self.exercise_words_sent)
                            } else {
                                format!("Started {} exercise", self.exercise_type())
                            };
                            self.log_activity(line);
                        }
                        Err(err) => self.set_message(format!("Failed to load exercise: {err}")),
                    }
                }
                Ok(ApiEvent::Feedback(result)) => {
                    self.exercise_in_flight = false;
                    match result {
                        Ok(feedback) => {
                            self.exercise_feedback = Some(feedback.feedback);
                            self.log_activity("Completed exercise".to_string());
                        }
                        Err(err) => self.set_message(format!("Failed to check answer: {err}")),
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => break,
            }
        }
    }

    fn set_message(&mut self, message: String) {
        self.message = Some(message);
    }

    fn open_dictionary(&mut self) {
        self.message = None;
        self.dict_cursor = 0;
        self.mode = Mode::Dictionary;
    }

    fn open_log(&mut self) {
        self.log_scroll = 0;
        self.mode = Mode::Log;
    }

    // Entering the practice section always tears down whatever session was
    // left behind, so the menu never shows residual state.
    fn open_practice(&mut self) {
        self.exit_practice();
        self.message = None;
        if self.dictionary.is_empty() {
            self.set_message("Your dictionary is empty. Add words before practicing.".to_string());
            self.mode = Mode::Message;
        } else {
            self.mode = Mode::PracticeMenu;
        }
    }

    fn start_practice(&mut self, mode: PracticeMode) {
        self.quiz_summary = false;
        self.quiz_notice = None;
        match self.practice.enter(
            mode,
            &self.dictionary,
            &self.selected_words,
            self.practice_language,
            self.practice_direction,
            &mut rand::thread_rng(),
        ) {
            Ok(line) => {
                self.message = None;
                self.log_activity(line);
                self.mode = match mode {
                    PracticeMode::Flashcards => Mode::Flashcards,
                    PracticeMode::Quiz => Mode::Quiz,
                };
            }
            Err(err) => self.set_message(format!("Cannot start: {err}")),
        }
    }

    fn exit_practice(&mut self) {
        if let Some(summary) = self.practice.exit() {
            self.log_activity(summary);
        }
        self.quiz_summary = false;
        self.quiz_notice = None;
    }

    // The POST is fire-and-forget; the local copy keeps the log view current.
    fn log_activity(&mut self, content: String) {
        self.learning_log.insert(0, LogEntry {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            content: content.clone(),
        });
        let api = Arc::clone(&self.api);
        thread::spawn(move || {
            if let Err(err) = api.add_log(&content) {
                api::log_error(&format!("add_log failed: {err}"));
            }
        });
    }

    fn exercise_type(&self) -> &'static str {
        EXERCISE_TYPES[self.exercise_type_index]
    }

    fn request_exercise(&mut self) {
        if self.exercise_in_flight {
            return;
        }
        let api = Arc::clone(&self.api);
        let tx = self.api_tx.clone();
        let exercise_type = self.exercise_type();
        let words: Vec<Word> = self
            .dictionary
            .iter()
            .filter(|word| self.selected_words.contains(&word.id))
            .cloned()
            .collect();
        self.exercise_words_sent = words.len();
        self.exercise_in_flight = true;
        thread::spawn(move || {
            let result = api.fetch_exercise(exercise_type, &words);
            let _ = tx.send(ApiEvent::Exercise(result));
        });
    }

    fn submit_exercise_answer(&mut self) {
        if self.exercise_in_flight {
            return;
        }
        let Some(exercise) = &self.exercise else {
            return;
        };
        let answer = self.exercise_answer.trim();
        if answer.is_empty() {
            self.set_message("Please provide an answer".to_string());
            return;
        }
        let api = Arc::clone(&self.api);
        let tx = self.api_tx.clone();
        let question = exercise.question.clone();
        let answer = answer.to_string();
        let exercise_type = self.exercise_type();
        self.exercise_in_flight = true;
        thread::spawn(move || {
            let result = api.check_answer(&question, &answer, exercise_type);
            let _ = tx.send(ApiEvent::Feedback(result));
        });
    }

    fn filtered_dict_indices(&self) -> Vec<usize> {
        let search = self.dict_search.to_lowercase();
        self.dictionary
            .iter()
            .enumerate()
            .filter(|(_, word)| {
                search.is_empty()
                    || word.german.to_lowercase().contains(&search)
                    || word.english.to_lowercase().contains(&search)
                    || word.russian.to_lowercase().contains(&search)
            })
            .map(|(idx, _)| idx)
            .collect()
    }

    fn dict_move(&mut self, delta: i32) {
        let total = self.filtered_dict_indices().len();
        if total == 0 {
            return;
        }
        let len = total as i32;
        let mut idx = self.dict_cursor as i32 + delta;
        if idx < 0 {
            idx = 0;
        } else if idx >= len {
            idx = len - 1;
        }
        self.dict_cursor = idx as usize;
    }

    fn toggle_selected(&mut self) {
        let indices = self.filtered_dict_indices();
        let Some(&dict_idx) = indices.get(self.dict_cursor) else {
            return;
        };
        let id = self.dictionary[dict_idx].id;
        if !self.selected_words.remove(&id) {
            self.selected_words.insert(id);
        }
    }

    fn eligible_count(&self) -> usize {
        self.dictionary
            .iter()
            .filter(|word| self.selected_words.is_empty() || self.selected_words.contains(&word.id))
            .filter(|word| word.has_translation(self.practice_language))
            .count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Mode {
    Menu,
    Dictionary,
    Exercise,
    PracticeMenu,
    Flashcards,
    Quiz,
    Log,
    Message,
}

#[derive(Debug)]
enum ApiEvent {
    Exercise(Result<Exercise, String>),
    Feedback(Result<AnswerFeedback, String>),
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    api: ApiConfig,
    #[serde(default)]
    practice: PracticeConfig,
}

fn load_config(path: &Path) -> io::Result<ConfigFile> {
    if path.exists() {
        let content = fs::read_to_string(path)?;
        let cfg: ConfigFile =
            toml::from_str(&content).map_err(|err| io::Error::new(io::ErrorKind::Other, err))?;
        Ok(cfg)
    } else {
        let cfg = ConfigFile::default();
        let content = toml::to_string_pretty(&cfg)
            .map_err(|err| io::Error::new(io::ErrorKind::Other, err))?;
        fs::write(path, content)?;
        Ok(cfg)
    }
}

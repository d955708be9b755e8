//! Main TUI application state machine.
//!
//! Handles:
//! - Screen navigation
//! - Input event handling
//! - Risk evaluation on submit

use std::io;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};

use crate::application::RiskEvaluator;

use super::ui::{
    patient::{render_patient_form, PatientFormState},
    render_disclaimer,
    result::{render_result, AssessmentState},
};

/// Current screen/view in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Form,
    Result,
}

/// Main application state
pub struct App {
    /// Current screen
    screen: Screen,

    /// Whether the app should quit
    should_quit: bool,

    /// Evaluator holding the loaded model
    evaluator: RiskEvaluator,

    /// Patient form state
    patient_form_state: PatientFormState,

    /// Latest assessment
    assessment_state: AssessmentState,
}

impl App {
    /// Create the application around an evaluator (Composition Root pattern).
    ///
    /// `main.rs` or tests construct the model externally and inject it here.
    pub fn new(evaluator: RiskEvaluator) -> Self {
        Self {
            screen: Screen::Form,
            should_quit: false,
            evaluator,
            patient_form_state: PatientFormState::default(),
            assessment_state: AssessmentState::default(),
        }
    }

    #[must_use]
    pub fn screen(&self) -> Screen {
        self.screen
    }

    /// Run the main application loop.
    ///
    /// # Errors
    /// Returns error if terminal operations fail.
    pub fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        // Main loop
        let result = self.main_loop(&mut terminal);

        // Restore terminal
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;

        result
    }

    fn main_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        loop {
            terminal.draw(|f| self.draw(f))?;

            if event::poll(Duration::from_millis(250))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code, key.modifiers);
                    }
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    fn draw(&self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(3)])
            .split(f.area());

        match self.screen {
            Screen::Form => render_patient_form(f, chunks[0], &self.patient_form_state),
            Screen::Result => render_result(f, chunks[0], &self.assessment_state),
        }

        render_disclaimer(f, chunks[1], self.evaluator.model_name());
    }

    fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        // Global quit handling
        if key == KeyCode::Esc
            || (key == KeyCode::Char('q') && modifiers.contains(KeyModifiers::CONTROL))
        {
            self.should_quit = true;
            return;
        }

        match self.screen {
            Screen::Form => self.handle_patient_form_key(key),
            Screen::Result => self.handle_result_key(key),
        }
    }

    fn handle_patient_form_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Up | KeyCode::BackTab => {
                self.patient_form_state.prev_field();
            }
            KeyCode::Down | KeyCode::Tab => {
                self.patient_form_state.next_field();
            }
            KeyCode::Left => {
                self.patient_form_state.decrease();
            }
            KeyCode::Right => {
                self.patient_form_state.increase();
            }
            KeyCode::Char('s') | KeyCode::Char('S') => {
                self.patient_form_state.load_sample_data();
            }
            KeyCode::Char(c) => {
                self.patient_form_state.input_char(c);
            }
            KeyCode::Backspace => {
                self.patient_form_state.delete_char();
            }
            KeyCode::Delete => {
                self.patient_form_state.clear_field();
            }
            KeyCode::Enter => {
                self.submit_patient_form();
            }
            _ => {}
        }
    }

    fn handle_result_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Enter | KeyCode::Backspace => {
                self.screen = Screen::Form;
            }
            KeyCode::Char('n') | KeyCode::Char('N') => {
                self.patient_form_state.clear_sensitive();
                self.assessment_state = AssessmentState::Idle;
                self.screen = Screen::Form;
            }
            _ => {}
        }
    }

    fn submit_patient_form(&mut self) {
        let Some(record) = self.patient_form_state.collect() else {
            self.patient_form_state.flag_incomplete();
            tracing::debug!("Submit rejected: form incomplete");
            return;
        };

        self.assessment_state = match self.evaluator.evaluate(&record) {
            Ok(result) => AssessmentState::Complete { result },
            Err(e) => {
                tracing::error!("Risk evaluation failed: {}", e);
                AssessmentState::Error {
                    message: e.to_string(),
                }
            }
        };
        self.screen = Screen::Result;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FeatureVector, FieldId, PatientRecord, RiskVerdict};
    use crate::ports::{ClassifierError, RiskClassifier};
    use std::sync::Arc;

    /// Positive probability rises with the first feature (age).
    struct AgeClassifier;

    impl RiskClassifier for AgeClassifier {
        fn predict_proba(&self, x: &FeatureVector) -> Result<Vec<f64>, ClassifierError> {
            let p = x[0] / 100.0;
            Ok(vec![1.0 - p, p])
        }

        fn name(&self) -> &str {
            "age"
        }
    }

    struct BrokenClassifier;

    impl RiskClassifier for BrokenClassifier {
        fn predict_proba(&self, _: &FeatureVector) -> Result<Vec<f64>, ClassifierError> {
            Ok(vec![0.9])
        }

        fn name(&self) -> &str {
            "broken"
        }
    }

    fn app_with(model: impl RiskClassifier + 'static) -> App {
        App::new(RiskEvaluator::new(Arc::new(model)))
    }

    fn press(app: &mut App, key: KeyCode) {
        app.handle_key(key, KeyModifiers::NONE);
    }

    fn completed(app: &App) -> &crate::domain::RiskResult {
        match &app.assessment_state {
            AssessmentState::Complete { result } => result,
            other => panic!("expected a completed assessment, got {other:?}"),
        }
    }

    #[test]
    fn test_submit_defaults_gives_low_risk() {
        let mut app = app_with(AgeClassifier);
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.screen(), Screen::Result);
        let result = completed(&app);
        assert_eq!(result.verdict, RiskVerdict::LowRisk);
        assert_eq!(result.percentage_label(), "50.0%");
    }

    #[test]
    fn test_adjusting_age_changes_verdict() {
        let mut app = app_with(AgeClassifier);
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Enter);

        let result = completed(&app);
        assert_eq!(result.verdict, RiskVerdict::HighRisk);
        assert_eq!(result.message(), "High risk of Heart Disease detected! (51.0%)");
    }

    #[test]
    fn test_incomplete_form_is_not_submitted() {
        let mut app = app_with(AgeClassifier);
        app.patient_form_state.selected_field = FieldId::RestingBloodPressure.index();
        press(&mut app, KeyCode::Delete);
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.screen(), Screen::Form);
        assert!(matches!(app.assessment_state, AssessmentState::Idle));
        assert!(app.patient_form_state.error_message.is_some());
    }

    #[test]
    fn test_contract_violation_shows_error() {
        let mut app = app_with(BrokenClassifier);
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.screen(), Screen::Result);
        match &app.assessment_state {
            AssessmentState::Error { message } => {
                assert!(message.contains("Model contract violation"))
            }
            other => panic!("expected error, got {other:?}"),
        }
    }

    #[test]
    fn test_new_assessment_resets_form() {
        let mut app = app_with(AgeClassifier);
        press(&mut app, KeyCode::Char('s'));
        press(&mut app, KeyCode::Enter);
        assert_eq!(completed(&app).percentage_label(), "63.0%");

        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.screen(), Screen::Form);
        assert!(matches!(app.assessment_state, AssessmentState::Idle));
        assert_eq!(
            app.patient_form_state.collect(),
            Some(PatientRecord::default())
        );
    }

    #[test]
    fn test_enter_on_result_keeps_inputs() {
        let mut app = app_with(AgeClassifier);
        press(&mut app, KeyCode::Char('s'));
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.screen(), Screen::Form);
        let record = app.patient_form_state.collect().expect("complete");
        assert_eq!(record.age.get(), 63);
    }

    #[test]
    fn test_quit_keys() {
        let mut app = app_with(AgeClassifier);
        press(&mut app, KeyCode::Esc);
        assert!(app.should_quit);

        let mut app = app_with(AgeClassifier);
        app.handle_key(KeyCode::Char('q'), KeyModifiers::CONTROL);
        assert!(app.should_quit);

        let mut app = app_with(AgeClassifier);
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.should_quit);
    }

    #[test]
    fn test_repeat_submission_is_identical() {
        let mut app = app_with(AgeClassifier);
        press(&mut app, KeyCode::Enter);
        let first = completed(&app).clone();

        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Enter);
        assert_eq!(completed(&app), &first);
    }
}

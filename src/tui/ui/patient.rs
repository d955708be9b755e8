//! Patient data input form.
//!
//! Every control is bounded: sliders clamp, selects cycle through their
//! options, number fields only accept digits. The form yields a
//! `PatientRecord` only once every field holds an in-range value.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use zeroize::Zeroize;

use crate::domain::{
    Age, FeatureVector, FieldId, MajorVessels, MaxHeartRate, Oldpeak, PatientRecord,
    RestingBloodPressure, SerumCholesterol, FEATURE_COUNT,
};
use crate::tui::styles::MedicalTheme;

/// Longest number a buffer accepts ("600").
const MAX_NUMBER_DIGITS: usize = 3;

/// Fields in the left column; the rest go right.
const PATIENT_INFO_FIELDS: usize = 6;

const SEX_OPTIONS: &[&str] = &["Female", "Male"];
const CHEST_PAIN_OPTIONS: &[&str] = &["0", "1", "2", "3"];
const BINARY_OPTIONS: &[&str] = &["0", "1"];
const THREE_OPTIONS: &[&str] = &["0", "1", "2"];

/// Input control for one field.
#[derive(Debug, Clone, PartialEq)]
pub enum Control {
    /// Integer steps between `min` and `max`; the value shown is `value / scale`.
    Slider {
        value: i32,
        min: i32,
        max: i32,
        scale: i32,
    },
    /// Typed digits, parsed on collect.
    Number { buffer: String, min: u16, max: u16 },
    /// The selected index is the encoded value.
    Select {
        options: &'static [&'static str],
        index: usize,
    },
}

impl Control {
    fn slider(value: i32, min: i32, max: i32) -> Self {
        Self::Slider {
            value,
            min,
            max,
            scale: 1,
        }
    }

    /// Encoded value, or `None` if the control is incomplete.
    fn value(&self) -> Option<f64> {
        match self {
            Self::Slider { value, scale, .. } => Some(f64::from(*value) / f64::from(*scale)),
            Self::Number { buffer, min, max } => buffer
                .parse::<u16>()
                .ok()
                .filter(|v| (*min..=*max).contains(v))
                .map(f64::from),
            Self::Select { index, .. } => Some(*index as f64),
        }
    }

    /// Step by `delta`, clamping sliders and numbers and wrapping selects.
    fn step(&mut self, delta: i32) {
        match self {
            Self::Slider {
                value, min, max, ..
            } => {
                *value = (*value + delta).clamp(*min, *max);
            }
            Self::Number { buffer, min, max } => {
                let current = buffer.parse::<i32>().unwrap_or(i32::from(*min));
                let next = (current + delta).clamp(i32::from(*min), i32::from(*max));
                buffer.zeroize();
                buffer.push_str(&next.to_string());
            }
            Self::Select { options, index } => {
                let len = options.len();
                *index = if delta < 0 {
                    (*index + len - 1) % len
                } else {
                    (*index + 1) % len
                };
            }
        }
    }

    fn display(&self) -> String {
        match self {
            Self::Slider { scale: 1, value, .. } => value.to_string(),
            Self::Slider { value, scale, .. } => {
                format!("{:.1}", f64::from(*value) / f64::from(*scale))
            }
            Self::Number { buffer, .. } => buffer.clone(),
            Self::Select { options, index } => options[*index].to_string(),
        }
    }

    fn range_hint(&self) -> String {
        match self {
            Self::Slider {
                min, max, scale: 1, ..
            } => format!("{min}-{max}"),
            Self::Slider { min, max, scale, .. } => format!(
                "{:.1}-{:.1}",
                f64::from(*min) / f64::from(*scale),
                f64::from(*max) / f64::from(*scale)
            ),
            Self::Number { min, max, .. } => format!("{min}-{max}"),
            Self::Select { options, .. } => options.join("/"),
        }
    }
}

/// Form field definition
#[derive(Debug, Clone, PartialEq)]
pub struct FormField {
    pub field: FieldId,
    pub control: Control,
}

/// Patient form state
pub struct PatientFormState {
    pub fields: Vec<FormField>,
    pub selected_field: usize,
    pub error_message: Option<String>,
}

impl Default for PatientFormState {
    fn default() -> Self {
        Self::from_record(&PatientRecord::default())
    }
}

impl PatientFormState {
    /// Form pre-filled with `record`.
    #[must_use]
    pub fn from_record(record: &PatientRecord) -> Self {
        let values = record.to_feature_vector();
        let fields = FieldId::ALL
            .iter()
            .map(|&field| FormField {
                field,
                control: control_for(field, values[field.index()]),
            })
            .collect();

        Self {
            fields,
            selected_field: 0,
            error_message: None,
        }
    }

    /// Move to the next field
    pub fn next_field(&mut self) {
        self.selected_field = (self.selected_field + 1) % self.fields.len();
    }

    /// Move to the previous field
    pub fn prev_field(&mut self) {
        if self.selected_field == 0 {
            self.selected_field = self.fields.len() - 1;
        } else {
            self.selected_field -= 1;
        }
    }

    /// Field under the cursor.
    #[must_use]
    pub fn selected(&self) -> &FormField {
        &self.fields[self.selected_field]
    }

    pub fn increase(&mut self) {
        self.step_selected(1);
    }

    pub fn decrease(&mut self) {
        self.step_selected(-1);
    }

    fn step_selected(&mut self, delta: i32) {
        self.fields[self.selected_field].control.step(delta);
        self.error_message = None;
    }

    /// Add a digit to the current number field. Other controls ignore typing.
    pub fn input_char(&mut self, c: char) {
        if let Control::Number { buffer, .. } = &mut self.fields[self.selected_field].control {
            if c.is_ascii_digit() && buffer.len() < MAX_NUMBER_DIGITS {
                buffer.push(c);
                self.error_message = None;
            }
        }
    }

    /// Delete the last character
    pub fn delete_char(&mut self) {
        if let Control::Number { buffer, .. } = &mut self.fields[self.selected_field].control {
            buffer.pop();
        }
    }

    /// Clear the current field
    pub fn clear_field(&mut self) {
        if let Control::Number { buffer, .. } = &mut self.fields[self.selected_field].control {
            buffer.zeroize();
        }
    }

    /// First field without a valid value, in form order.
    #[must_use]
    pub fn first_incomplete(&self) -> Option<&FormField> {
        self.fields.iter().find(|f| f.control.value().is_none())
    }

    /// The validated record, or `None` while any field is incomplete.
    #[must_use]
    pub fn collect(&self) -> Option<PatientRecord> {
        let mut values: FeatureVector = [0.0; FEATURE_COUNT];
        for form_field in &self.fields {
            values[form_field.field.index()] = form_field.control.value()?;
        }
        PatientRecord::from_values(&values).ok()
    }

    /// Explain why the form cannot be submitted.
    pub fn flag_incomplete(&mut self) {
        self.error_message = self.first_incomplete().map(|f| {
            format!(
                "{}: enter a value in {}",
                f.field.label(),
                f.control.range_hint()
            )
        });
    }

    /// Wipe typed buffers from memory and restore the default values.
    pub fn clear_sensitive(&mut self) {
        for form_field in self.fields.iter_mut() {
            if let Control::Number { buffer, .. } = &mut form_field.control {
                buffer.zeroize();
            }
        }
        *self = Self::default();
    }

    /// Load sample data for testing (high-risk profile)
    pub fn load_sample_data(&mut self) {
        // 63yo male, asymptomatic chest pain, fasting BS > 120, oldpeak 2.3
        let sample = [
            63.0, 1.0, 3.0, 145.0, 233.0, 1.0, 0.0, 150.0, 0.0, 2.3, 0.0, 0.0, 1.0,
        ];
        self.clear_sensitive();
        for form_field in self.fields.iter_mut() {
            form_field.control = control_for(form_field.field, sample[form_field.field.index()]);
        }
    }
}

/// Build the control for `field` positioned at `value`.
fn control_for(field: FieldId, value: f64) -> Control {
    let code = value.round() as usize;
    let select = |options: &'static [&'static str]| Control::Select {
        options,
        index: code.min(options.len() - 1),
    };
    let number = |min: u16, max: u16| Control::Number {
        buffer: format!("{value:.0}"),
        min,
        max,
    };

    match field {
        FieldId::Age => Control::slider(value as i32, i32::from(Age::MIN), i32::from(Age::MAX)),
        FieldId::Sex => select(SEX_OPTIONS),
        FieldId::ChestPainType => select(CHEST_PAIN_OPTIONS),
        FieldId::RestingBloodPressure => {
            number(RestingBloodPressure::MIN, RestingBloodPressure::MAX)
        }
        FieldId::SerumCholesterol => number(SerumCholesterol::MIN, SerumCholesterol::MAX),
        FieldId::FastingBloodSugar | FieldId::ExerciseAngina => select(BINARY_OPTIONS),
        FieldId::RestingEcg | FieldId::StSlope | FieldId::Thalassemia => select(THREE_OPTIONS),
        FieldId::MaxHeartRate => Control::slider(
            value as i32,
            i32::from(MaxHeartRate::MIN),
            i32::from(MaxHeartRate::MAX),
        ),
        FieldId::Oldpeak => Control::Slider {
            value: (value * 10.0).round() as i32,
            min: (Oldpeak::MIN * 10.0) as i32,
            max: (Oldpeak::MAX * 10.0) as i32,
            scale: 10,
        },
        FieldId::MajorVessels => Control::slider(
            value as i32,
            i32::from(MajorVessels::MIN),
            i32::from(MajorVessels::MAX),
        ),
    }
}

/// Render the patient data input form
pub fn render_patient_form(f: &mut Frame, area: Rect, state: &PatientFormState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Form
            Constraint::Length(3), // Footer/error
        ])
        .split(area);

    render_form_header(f, chunks[0], state);
    render_form_fields(f, chunks[1], state);
    render_form_footer(f, chunks[2], state);
}

fn render_form_header(f: &mut Frame, area: Rect, state: &PatientFormState) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", MedicalTheme::text()),
        Span::styled("Heart Disease Risk Assessment", MedicalTheme::title()),
        Span::styled(" │ ", MedicalTheme::text_secondary()),
        Span::styled(state.selected().field.help(), MedicalTheme::text_secondary()),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(header, area);
}

fn render_form_fields(f: &mut Frame, area: Rect, state: &PatientFormState) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .margin(1)
        .split(area);

    let mid = PATIENT_INFO_FIELDS.min(state.fields.len());
    render_field_column(
        f,
        columns[0],
        " Patient Info ",
        &state.fields[..mid],
        0,
        state.selected_field,
    );
    render_field_column(
        f,
        columns[1],
        " Medical Indicators ",
        &state.fields[mid..],
        mid,
        state.selected_field,
    );
}

fn render_field_column(
    f: &mut Frame,
    area: Rect,
    title: &str,
    fields: &[FormField],
    offset: usize,
    selected: usize,
) {
    let column = Block::default()
        .title(Span::styled(title, MedicalTheme::subtitle()))
        .borders(Borders::TOP)
        .border_style(MedicalTheme::border());
    let inner = column.inner(area);
    f.render_widget(column, area);

    let field_height = 3;
    let constraints: Vec<Constraint> = fields
        .iter()
        .map(|_| Constraint::Length(field_height))
        .chain(std::iter::once(Constraint::Min(0)))
        .collect();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    for (i, form_field) in fields.iter().enumerate() {
        let is_selected = offset + i == selected;
        let border_style = if is_selected {
            MedicalTheme::border_focused()
        } else {
            MedicalTheme::border()
        };

        let title_style = if is_selected {
            MedicalTheme::focused()
        } else {
            MedicalTheme::text_secondary()
        };

        let block = Block::default()
            .title(Span::styled(
                format!(" {} ", form_field.field.label()),
                title_style,
            ))
            .borders(Borders::ALL)
            .border_style(border_style);

        let content = Paragraph::new(field_line(&form_field.control, is_selected)).block(block);
        f.render_widget(content, chunks[i]);
    }
}

fn field_line(control: &Control, is_selected: bool) -> Line<'static> {
    let hint = Span::styled(
        format!("  [{}]", control.range_hint()),
        MedicalTheme::text_muted(),
    );

    match control {
        Control::Number { buffer, .. } => {
            let value = if buffer.is_empty() {
                Span::styled("required", MedicalTheme::warning())
            } else if control.value().is_none() {
                Span::styled(buffer.clone(), MedicalTheme::danger())
            } else {
                Span::styled(buffer.clone(), MedicalTheme::text())
            };
            let cursor = if is_selected {
                Span::styled("▌", MedicalTheme::focused())
            } else {
                Span::raw("")
            };
            Line::from(vec![Span::raw(" "), value, cursor, hint])
        }
        Control::Slider { .. } | Control::Select { .. } => {
            let arrow = if is_selected {
                MedicalTheme::key_hint()
            } else {
                MedicalTheme::text_muted()
            };
            Line::from(vec![
                Span::styled(" ◀ ", arrow),
                Span::styled(control.display(), MedicalTheme::text()),
                Span::styled(" ▶", arrow),
                hint,
            ])
        }
    }
}

fn render_form_footer(f: &mut Frame, area: Rect, state: &PatientFormState) {
    let content = if let Some(err) = &state.error_message {
        Line::from(vec![
            Span::styled("! ", MedicalTheme::danger()),
            Span::styled(err.clone(), MedicalTheme::danger()),
        ])
    } else {
        Line::from(vec![
            Span::styled("[↑↓] ", MedicalTheme::key_hint()),
            Span::styled("Navigate ", MedicalTheme::key_desc()),
            Span::styled("[←→] ", MedicalTheme::key_hint()),
            Span::styled("Adjust ", MedicalTheme::key_desc()),
            Span::styled("[Enter] ", MedicalTheme::key_hint()),
            Span::styled("Predict ", MedicalTheme::key_desc()),
            Span::styled("[S] ", MedicalTheme::key_hint()),
            Span::styled("Sample Data ", MedicalTheme::key_desc()),
            Span::styled("[Esc] ", MedicalTheme::key_hint()),
            Span::styled("Quit", MedicalTheme::key_desc()),
        ])
    };

    let footer = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(footer, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Sex;

    fn select(state: &mut PatientFormState, field: FieldId) {
        state.selected_field = field.index();
    }

    #[test]
    fn test_defaults_collect_to_default_record() {
        let state = PatientFormState::default();
        assert_eq!(state.fields.len(), FEATURE_COUNT);
        assert_eq!(state.collect(), Some(PatientRecord::default()));
        assert!(state.first_incomplete().is_none());
    }

    #[test]
    fn test_fields_follow_feature_order() {
        let state = PatientFormState::default();
        for (i, form_field) in state.fields.iter().enumerate() {
            assert_eq!(form_field.field.index(), i);
        }
    }

    #[test]
    fn test_slider_clamps_at_bounds() {
        let mut state = PatientFormState::default();
        select(&mut state, FieldId::MajorVessels);
        for _ in 0..10 {
            state.increase();
        }
        assert_eq!(state.collect().expect("complete").major_vessels.get(), 4);

        for _ in 0..10 {
            state.decrease();
        }
        assert_eq!(state.collect().expect("complete").major_vessels.get(), 0);
    }

    #[test]
    fn test_oldpeak_steps_by_tenths() {
        let mut state = PatientFormState::default();
        select(&mut state, FieldId::Oldpeak);
        state.increase();
        state.increase();

        let oldpeak = state.collect().expect("complete").oldpeak.get();
        assert!((oldpeak - 1.2).abs() < 1e-9);
    }

    #[test]
    fn test_select_cycles_options() {
        let mut state = PatientFormState::default();
        select(&mut state, FieldId::Sex);
        state.increase();
        assert_eq!(state.collect().expect("complete").sex, Sex::Male);
        state.increase();
        assert_eq!(state.collect().expect("complete").sex, Sex::Female);
        state.decrease();
        assert_eq!(state.collect().expect("complete").sex, Sex::Male);

        select(&mut state, FieldId::ChestPainType);
        state.decrease();
        assert_eq!(state.collect().expect("complete").chest_pain_type.get(), 3);
    }

    #[test]
    fn test_empty_number_is_incomplete() {
        let mut state = PatientFormState::default();
        select(&mut state, FieldId::SerumCholesterol);
        state.clear_field();

        assert!(state.collect().is_none());
        assert_eq!(
            state.first_incomplete().map(|f| f.field),
            Some(FieldId::SerumCholesterol)
        );

        state.flag_incomplete();
        assert_eq!(
            state.error_message.as_deref(),
            Some("Serum Cholesterol: enter a value in 100-600")
        );
    }

    #[test]
    fn test_out_of_range_number_is_incomplete() {
        let mut state = PatientFormState::default();
        select(&mut state, FieldId::RestingBloodPressure);
        state.clear_field();
        state.input_char('5');
        state.input_char('0');
        assert!(state.collect().is_none());

        // Stepping pulls the buffer back into range.
        state.increase();
        assert_eq!(
            state.collect().expect("complete").resting_blood_pressure.get(),
            80
        );
    }

    #[test]
    fn test_number_input_accepts_digits_only() {
        let mut state = PatientFormState::default();
        select(&mut state, FieldId::SerumCholesterol);
        state.clear_field();
        for c in ['2', 'x', '.', '5', '-', '0', '9'] {
            state.input_char(c);
        }
        assert_eq!(state.selected().control.display(), "250");

        state.delete_char();
        state.input_char('1');
        assert_eq!(state.collect().expect("complete").serum_cholesterol.get(), 251);
    }

    #[test]
    fn test_typing_ignored_on_slider() {
        let mut state = PatientFormState::default();
        state.input_char('9');
        assert_eq!(state.collect(), Some(PatientRecord::default()));
    }

    #[test]
    fn test_sample_data() {
        let mut state = PatientFormState::default();
        state.load_sample_data();
        let record = state.collect().expect("complete");

        assert_eq!(record.age.get(), 63);
        assert_eq!(record.sex, Sex::Male);
        assert_eq!(record.chest_pain_type.get(), 3);
        assert_eq!(record.resting_blood_pressure.get(), 145);
        assert_eq!(record.serum_cholesterol.get(), 233);
        assert!(record.fasting_blood_sugar_high);
        assert!((record.oldpeak.get() - 2.3).abs() < 1e-9);
        assert_eq!(record.thalassemia.get(), 1);
    }

    #[test]
    fn test_clear_sensitive_restores_defaults() {
        let mut state = PatientFormState::default();
        state.load_sample_data();
        state.selected_field = 5;
        state.error_message = Some("x".into());

        state.clear_sensitive();
        assert_eq!(state.collect(), Some(PatientRecord::default()));
        assert_eq!(state.selected_field, 0);
        assert!(state.error_message.is_none());
    }

    #[test]
    fn test_navigation_wraps() {
        let mut state = PatientFormState::default();
        state.prev_field();
        assert_eq!(state.selected().field, FieldId::Thalassemia);
        state.next_field();
        assert_eq!(state.selected().field, FieldId::Age);
    }
}

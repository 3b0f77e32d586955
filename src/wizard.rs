//! Submission wizard state machine.
//!
//! Pure state: no GTK types, no I/O. The UI layer reads the gating
//! predicates to set widget sensitivity and calls the transition methods
//! from signal handlers; `app::pipeline` drives the submit transitions from
//! backend events.

use crate::api::{SubmissionPayload, SubmitReceipt};
use std::collections::BTreeMap;

/// The four wizard pages, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    Consent,
    Questionnaire,
    Recording,
    Result,
}

/// Recording sub-state within the Recording step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingPhase {
    /// No capture in progress, no clip yet.
    Idle,
    /// Microphone capture active.
    Recording,
    /// Clip finalized, input device released.
    Captured,
}

/// The consent clauses a participant must acknowledge, one checkbox each.
///
/// Adding a clause here extends `ALL`, the completeness check, and the wire
/// map in one place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsentClause {
    DataCollection,
    VoiceRecording,
    ResearchUse,
    AnonymizedSharing,
    DataRetention,
    VoluntaryParticipation,
    WithdrawalRight,
    AgeConfirmation,
    NotDiagnostic,
    PrivacyPolicy,
}

impl ConsentClause {
    pub const ALL: [ConsentClause; 10] = [
        ConsentClause::DataCollection,
        ConsentClause::VoiceRecording,
        ConsentClause::ResearchUse,
        ConsentClause::AnonymizedSharing,
        ConsentClause::DataRetention,
        ConsentClause::VoluntaryParticipation,
        ConsentClause::WithdrawalRight,
        ConsentClause::AgeConfirmation,
        ConsentClause::NotDiagnostic,
        ConsentClause::PrivacyPolicy,
    ];

    /// Wire key in the submission payload's consent map.
    pub fn key(self) -> &'static str {
        match self {
            ConsentClause::DataCollection => "dataCollection",
            ConsentClause::VoiceRecording => "voiceRecording",
            ConsentClause::ResearchUse => "researchUse",
            ConsentClause::AnonymizedSharing => "anonymizedSharing",
            ConsentClause::DataRetention => "dataRetention",
            ConsentClause::VoluntaryParticipation => "voluntaryParticipation",
            ConsentClause::WithdrawalRight => "withdrawalRight",
            ConsentClause::AgeConfirmation => "ageConfirmation",
            ConsentClause::NotDiagnostic => "notDiagnostic",
            ConsentClause::PrivacyPolicy => "privacyPolicy",
        }
    }

    /// Checkbox label shown on the consent page.
    pub fn text(self) -> &'static str {
        match self {
            ConsentClause::DataCollection => {
                "I agree to the collection of my questionnaire responses."
            }
            ConsentClause::VoiceRecording => {
                "I agree to have my voice recorded for this study."
            }
            ConsentClause::ResearchUse => {
                "I agree that my data may be used for research purposes."
            }
            ConsentClause::AnonymizedSharing => {
                "I agree that anonymized data may be shared with researchers."
            }
            ConsentClause::DataRetention => {
                "I understand my data will be stored securely for the study period."
            }
            ConsentClause::VoluntaryParticipation => {
                "I understand that participation is voluntary."
            }
            ConsentClause::WithdrawalRight => {
                "I understand I may withdraw at any time before submission."
            }
            ConsentClause::AgeConfirmation => "I confirm that I am 18 years or older.",
            ConsentClause::NotDiagnostic => {
                "I understand this assessment is not a medical diagnosis."
            }
            ConsentClause::PrivacyPolicy => "I have read and accept the privacy policy.",
        }
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|&c| c == self).unwrap_or(0)
    }
}

/// The ten consent flags, all of which must be granted to proceed.
#[derive(Debug, Clone, Default)]
pub struct ConsentForm {
    granted: [bool; ConsentClause::ALL.len()],
}

impl ConsentForm {
    pub fn set(&mut self, clause: ConsentClause, granted: bool) {
        self.granted[clause.index()] = granted;
    }

    pub fn is_granted(&self, clause: ConsentClause) -> bool {
        self.granted[clause.index()]
    }

    /// True iff every clause in [`ConsentClause::ALL`] is granted.
    pub fn all_granted(&self) -> bool {
        ConsentClause::ALL.iter().all(|&c| self.is_granted(c))
    }

    /// Wire form: camelCase clause key -> granted.
    pub fn to_map(&self) -> BTreeMap<String, bool> {
        ConsentClause::ALL
            .iter()
            .map(|&c| (c.key().to_string(), self.is_granted(c)))
            .collect()
    }
}

/// Demographic field identifiers for keyed updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    FullName,
    Age,
    Gender,
    CurrentMedication,
    RecordingEnvironment,
    LanguageDialect,
}

/// Introductory text above the consent checkboxes.
pub const CONSENT_INTRO: &str = "Please review and acknowledge each statement. \
     All ten are required before the assessment can begin.";

/// The PHQ-8 items, answered on the 0-3 frequency scale.
pub const PHQ8_ITEMS: [&str; 8] = [
    "Little interest or pleasure in doing things",
    "Feeling down, depressed, or hopeless",
    "Trouble falling or staying asleep, or sleeping too much",
    "Feeling tired or having little energy",
    "Poor appetite or overeating",
    "Feeling bad about yourself, or that you are a failure",
    "Trouble concentrating on things, such as reading",
    "Moving or speaking slowly, or being fidgety or restless",
];

/// Answer scale: label and wire value.
pub const ANSWER_OPTIONS: [(&str, u8); 4] = [
    ("Not at all", 0),
    ("Several days", 1),
    ("More than half the days", 2),
    ("Nearly every day", 3),
];

pub const GENDER_OPTIONS: [&str; 3] = ["Male", "Female", "Other"];
pub const MEDICATION_OPTIONS: [&str; 2] = ["No", "Yes"];
pub const ENVIRONMENT_OPTIONS: [&str; 4] = ["Quiet room", "Home", "Office", "Outdoors"];
pub const DIALECT_OPTIONS: [&str; 3] = ["Standard", "Regional", "Other"];

/// Questionnaire form values, kept as entered (strings) until submit time.
#[derive(Debug, Clone, Default)]
pub struct FormFields {
    pub full_name: String,
    pub age: String,
    pub gender: String,
    pub current_medication: String,
    pub recording_environment: String,
    pub language_dialect: String,
    /// Answers to [`PHQ8_ITEMS`], each "0".."3" once selected.
    pub answers: [String; 8],
}

impl FormFields {
    pub fn set(&mut self, field: Field, value: &str) {
        let slot = match field {
            Field::FullName => &mut self.full_name,
            Field::Age => &mut self.age,
            Field::Gender => &mut self.gender,
            Field::CurrentMedication => &mut self.current_medication,
            Field::RecordingEnvironment => &mut self.recording_environment,
            Field::LanguageDialect => &mut self.language_dialect,
        };
        *slot = value.to_string();
    }

    pub fn set_answer(&mut self, item: usize, value: &str) {
        if let Some(slot) = self.answers.get_mut(item) {
            *slot = value.to_string();
        }
    }

    /// Age as a number, if the entry parses.
    pub fn parsed_age(&self) -> Option<u32> {
        self.age.trim().parse().ok()
    }
}

/// A finalized recording: mono 16-bit PCM WAV bytes.
#[derive(Debug, Clone)]
pub struct CapturedClip {
    pub wav: Vec<u8>,
    pub duration_secs: f32,
}

/// The wizard's complete state. See module docs.
#[derive(Debug, Default)]
pub struct WizardState {
    step: WizardStep,
    pub fields: FormFields,
    pub consent: ConsentForm,
    phase: RecordingPhase,
    clip: Option<CapturedClip>,
    submitting: bool,
    receipt: Option<SubmitReceipt>,
}

impl Default for WizardStep {
    fn default() -> Self {
        WizardStep::Consent
    }
}

impl Default for RecordingPhase {
    fn default() -> Self {
        RecordingPhase::Idle
    }
}

impl WizardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn phase(&self) -> RecordingPhase {
        self.phase
    }

    pub fn clip(&self) -> Option<&CapturedClip> {
        self.clip.as_ref()
    }

    pub fn receipt(&self) -> Option<&SubmitReceipt> {
        self.receipt.as_ref()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Gate for Consent -> Questionnaire.
    pub fn consent_complete(&self) -> bool {
        self.consent.all_granted()
    }

    /// Gate for Questionnaire -> Recording: numeric age >= 18 and every
    /// required selector and answer non-empty. Full name is optional.
    pub fn questionnaire_complete(&self) -> bool {
        let age_ok = self.fields.parsed_age().map_or(false, |age| age >= 18);
        age_ok
            && !self.fields.gender.is_empty()
            && !self.fields.current_medication.is_empty()
            && !self.fields.recording_environment.is_empty()
            && !self.fields.language_dialect.is_empty()
            && self.fields.answers.iter().all(|a| !a.is_empty())
    }

    /// Submit is available iff a clip is captured and no request is in flight.
    pub fn can_submit(&self) -> bool {
        self.step == WizardStep::Recording
            && self.phase == RecordingPhase::Captured
            && self.clip.is_some()
            && !self.submitting
    }

    /// Advance one step when the current step's gate passes.
    /// Returns false (and stays put) otherwise. Recording -> Result is not
    /// reachable here; it happens via [`WizardState::submit_succeeded`].
    pub fn advance(&mut self) -> bool {
        match self.step {
            WizardStep::Consent if self.consent_complete() => {
                self.step = WizardStep::Questionnaire;
                true
            }
            WizardStep::Questionnaire if self.questionnaire_complete() => {
                self.step = WizardStep::Recording;
                true
            }
            _ => false,
        }
    }

    /// Idle -> Recording. The caller opens the capture stream first; this is
    /// only reached once the microphone is live.
    pub fn start_recording(&mut self) -> bool {
        if self.step == WizardStep::Recording && self.phase == RecordingPhase::Idle {
            self.phase = RecordingPhase::Recording;
            true
        } else {
            false
        }
    }

    /// Recording -> Captured with the finalized clip.
    pub fn finish_recording(&mut self, clip: CapturedClip) -> bool {
        if self.phase == RecordingPhase::Recording {
            self.clip = Some(clip);
            self.phase = RecordingPhase::Captured;
            true
        } else {
            false
        }
    }

    /// Recording -> Idle without a clip: capture produced nothing usable.
    pub fn abort_recording(&mut self) -> bool {
        if self.phase == RecordingPhase::Recording {
            self.clip = None;
            self.phase = RecordingPhase::Idle;
            true
        } else {
            false
        }
    }

    /// Captured -> Idle, discarding the clip ("re-record").
    pub fn discard_clip(&mut self) -> bool {
        if self.phase == RecordingPhase::Captured && !self.submitting {
            self.clip = None;
            self.phase = RecordingPhase::Idle;
            true
        } else {
            false
        }
    }

    /// Latch a submission. Returns false if one is already in flight or no
    /// clip is captured; the caller must not issue a request in that case.
    pub fn begin_submit(&mut self) -> bool {
        if self.can_submit() {
            self.submitting = true;
            true
        } else {
            false
        }
    }

    /// Release the latch after a failed request. The clip and step are
    /// untouched so the user can retry without re-recording.
    pub fn submit_failed(&mut self) {
        self.submitting = false;
    }

    /// Store the receipt and move to the terminal Result step.
    pub fn submit_succeeded(&mut self, receipt: SubmitReceipt) {
        self.submitting = false;
        self.receipt = Some(receipt);
        self.step = WizardStep::Result;
    }

    /// Atomic full reset: back to Consent with fields, consent, clip, latch
    /// and receipt all cleared in one assignment.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Assemble the wire payload from the current form values and the
    /// base64-encoded clip. Returns None if any answer or the age fails
    /// integer coercion, which validation rules out before submit.
    pub fn payload(&self, audio_base64: String) -> Option<SubmissionPayload> {
        let age = self.fields.parsed_age()?;
        let mut answers = [0u8; 8];
        for (slot, raw) in answers.iter_mut().zip(self.fields.answers.iter()) {
            *slot = raw.trim().parse().ok()?;
        }
        let full_name = match self.fields.full_name.trim() {
            "" => "Anonymous".to_string(),
            name => name.to_string(),
        };
        Some(SubmissionPayload {
            full_name,
            age,
            gender: self.fields.gender.clone(),
            current_medication: self.fields.current_medication.clone(),
            recording_environment: self.fields.recording_environment.clone(),
            language_dialect: self.fields.language_dialect.clone(),
            consent: self.consent.to_map(),
            question1: answers[0],
            question2: answers[1],
            question3: answers[2],
            question4: answers[3],
            question5: answers[4],
            question6: answers[5],
            question7: answers[6],
            question8: answers[7],
            audio_data: audio_base64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_questionnaire(state: &mut WizardState) {
        state.fields.set(Field::FullName, "Test Participant");
        state.fields.set(Field::Age, "25");
        state.fields.set(Field::Gender, "Female");
        state.fields.set(Field::CurrentMedication, "No");
        state.fields.set(Field::RecordingEnvironment, "Quiet room");
        state.fields.set(Field::LanguageDialect, "Standard");
        for item in 0..8 {
            state.fields.set_answer(item, "0");
        }
    }

    fn grant_all(state: &mut WizardState) {
        for clause in ConsentClause::ALL {
            state.consent.set(clause, true);
        }
    }

    fn clip() -> CapturedClip {
        CapturedClip {
            wav: vec![1, 2, 3],
            duration_secs: 1.5,
        }
    }

    /// Drive a fresh state to the Recording step with a captured clip.
    fn at_captured() -> WizardState {
        let mut state = WizardState::new();
        grant_all(&mut state);
        assert!(state.advance());
        filled_questionnaire(&mut state);
        assert!(state.advance());
        assert!(state.start_recording());
        assert!(state.finish_recording(clip()));
        state
    }

    #[test]
    fn consent_gate_requires_all_ten_flags() {
        let mut state = WizardState::new();
        assert!(!state.consent_complete());
        assert!(!state.advance());
        assert_eq!(state.step(), WizardStep::Consent);

        grant_all(&mut state);
        assert!(state.consent_complete());

        // Flipping any one flag back off disables the gate again.
        state.consent.set(ConsentClause::WithdrawalRight, false);
        assert!(!state.consent_complete());
        assert!(!state.advance());

        state.consent.set(ConsentClause::WithdrawalRight, true);
        assert!(state.advance());
        assert_eq!(state.step(), WizardStep::Questionnaire);
    }

    #[test]
    fn underage_blocks_questionnaire() {
        // Scenario A: age "17", everything else valid.
        let mut state = WizardState::new();
        grant_all(&mut state);
        state.advance();
        filled_questionnaire(&mut state);
        state.fields.set(Field::Age, "17");
        assert!(!state.questionnaire_complete());
        assert!(!state.advance());
        assert_eq!(state.step(), WizardStep::Questionnaire);
    }

    #[test]
    fn unparsable_age_blocks_questionnaire() {
        let mut state = WizardState::new();
        grant_all(&mut state);
        state.advance();
        filled_questionnaire(&mut state);
        state.fields.set(Field::Age, "twenty");
        assert!(!state.questionnaire_complete());
    }

    #[test]
    fn missing_answer_blocks_questionnaire() {
        let mut state = WizardState::new();
        grant_all(&mut state);
        state.advance();
        filled_questionnaire(&mut state);
        state.fields.set_answer(5, "");
        assert!(!state.questionnaire_complete());
    }

    #[test]
    fn blank_name_is_allowed() {
        let mut state = WizardState::new();
        grant_all(&mut state);
        state.advance();
        filled_questionnaire(&mut state);
        state.fields.set(Field::FullName, "");
        assert!(state.questionnaire_complete());
    }

    #[test]
    fn recording_phases_and_rerecord() {
        // Scenario C: start, stop, re-record.
        let mut state = WizardState::new();
        grant_all(&mut state);
        state.advance();
        filled_questionnaire(&mut state);
        state.advance();

        assert_eq!(state.phase(), RecordingPhase::Idle);
        assert!(!state.can_submit());

        assert!(state.start_recording());
        // A second start while recording is rejected.
        assert!(!state.start_recording());

        assert!(state.finish_recording(clip()));
        assert_eq!(state.phase(), RecordingPhase::Captured);
        assert!(state.can_submit());

        assert!(state.discard_clip());
        assert_eq!(state.phase(), RecordingPhase::Idle);
        assert!(state.clip().is_none());
        assert!(!state.can_submit());
    }

    #[test]
    fn aborted_capture_returns_to_idle_without_a_clip() {
        let mut state = WizardState::new();
        grant_all(&mut state);
        state.advance();
        filled_questionnaire(&mut state);
        state.advance();
        assert!(state.start_recording());
        assert!(state.abort_recording());
        assert_eq!(state.phase(), RecordingPhase::Idle);
        assert!(state.clip().is_none());
        // Only applicable while capture is live.
        assert!(!state.abort_recording());
    }

    #[test]
    fn start_recording_outside_recording_step_is_rejected() {
        let mut state = WizardState::new();
        assert!(!state.start_recording());
        assert_eq!(state.phase(), RecordingPhase::Idle);
    }

    #[test]
    fn duplicate_submit_is_a_noop() {
        // Scenario D: second submit while one is in flight.
        let mut state = at_captured();
        assert!(state.begin_submit());
        assert!(state.is_submitting());
        assert!(!state.begin_submit());
        assert!(!state.can_submit());
    }

    #[test]
    fn failed_submit_keeps_clip_and_releases_latch() {
        // Scenario E, state-machine half: stay on Recording, clip retained.
        let mut state = at_captured();
        assert!(state.begin_submit());
        state.submit_failed();
        assert_eq!(state.step(), WizardStep::Recording);
        assert!(state.clip().is_some());
        assert!(state.can_submit());
    }

    #[test]
    fn successful_submit_reaches_result() {
        let mut state = at_captured();
        assert!(state.begin_submit());
        state.submit_succeeded(SubmitReceipt {
            test_id: "abc-123".into(),
            result: None,
        });
        assert_eq!(state.step(), WizardStep::Result);
        assert_eq!(state.receipt().unwrap().test_id, "abc-123");
        assert!(!state.is_submitting());
    }

    #[test]
    fn reset_is_atomic_and_idempotent() {
        let mut state = at_captured();
        state.begin_submit();
        state.submit_succeeded(SubmitReceipt {
            test_id: "xyz".into(),
            result: None,
        });

        state.reset();
        assert_eq!(state.step(), WizardStep::Consent);
        assert!(!state.consent_complete());
        assert!(state.fields.full_name.is_empty());
        assert!(state.clip().is_none());
        assert!(state.receipt().is_none());
        assert!(!state.is_submitting());

        // Resetting again changes nothing.
        state.reset();
        assert_eq!(state.step(), WizardStep::Consent);
    }

    #[test]
    fn payload_coerces_answers_and_age() {
        // Scenario B: all answers "0", age "25".
        let state = at_captured();
        let payload = state.payload("QUJD".into()).unwrap();
        assert_eq!(payload.age, 25);
        assert_eq!(payload.question1, 0);
        assert_eq!(payload.question8, 0);
        assert_eq!(payload.full_name, "Test Participant");
        assert_eq!(payload.audio_data, "QUJD");
        assert_eq!(payload.consent.len(), 10);
        assert!(payload.consent.values().all(|&granted| granted));
    }

    #[test]
    fn payload_defaults_blank_name_to_anonymous() {
        let mut state = at_captured();
        state.fields.set(Field::FullName, "   ");
        let payload = state.payload(String::new()).unwrap();
        assert_eq!(payload.full_name, "Anonymous");
    }

    #[test]
    fn consent_map_lists_every_clause_key() {
        let mut form = ConsentForm::default();
        form.set(ConsentClause::PrivacyPolicy, true);
        let map = form.to_map();
        assert_eq!(map.len(), ConsentClause::ALL.len());
        assert_eq!(map["privacyPolicy"], true);
        assert_eq!(map["dataCollection"], false);
    }
}

use gtk4::prelude::*;
use libadwaita::prelude::*;

use crate::wizard::{
    ConsentClause, RecordingPhase, WizardState, WizardStep, ANSWER_OPTIONS, CONSENT_INTRO,
    DIALECT_OPTIONS, ENVIRONMENT_OPTIONS, GENDER_OPTIONS, MEDICATION_OPTIONS, PHQ8_ITEMS,
};

/// Sentence the participant reads aloud while recording.
const READING_PROMPT: &str =
    "\u{201C}How have you been feeling over the past two weeks? \
     Please describe your days in your own words.\u{201D}";

/// Handles returned from building the wizard window.
#[derive(Clone)]
pub struct WizardWidgets {
    pub window: libadwaita::Window,
    pub stack: gtk4::Stack,

    // Consent page
    pub consent_checks: Vec<gtk4::CheckButton>,
    pub consent_continue: gtk4::Button,

    // Questionnaire page
    pub name_row: libadwaita::EntryRow,
    pub age_row: libadwaita::EntryRow,
    pub gender_row: libadwaita::ComboRow,
    pub medication_row: libadwaita::ComboRow,
    pub environment_row: libadwaita::ComboRow,
    pub dialect_row: libadwaita::ComboRow,
    pub answer_rows: Vec<libadwaita::ComboRow>,
    pub form_continue: gtk4::Button,

    // Recording page
    pub recording_status: gtk4::Label,
    pub timer_label: gtk4::Label,
    pub record_button: gtk4::Button,
    pub stop_button: gtk4::Button,
    pub rerecord_button: gtk4::Button,
    pub submit_button: gtk4::Button,

    // Result page
    pub test_id_label: gtk4::Label,
    pub close_button: gtk4::Button,
}

/// Build the (hidden) wizard window with its four stacked pages.
pub fn build_wizard(parent: &libadwaita::ApplicationWindow) -> WizardWidgets {
    let window = libadwaita::Window::builder()
        .title("New Assessment")
        .default_width(480)
        .default_height(620)
        .transient_for(parent)
        .modal(true)
        .build();

    let toolbar_view = libadwaita::ToolbarView::new();
    let header = libadwaita::HeaderBar::new();
    toolbar_view.add_top_bar(&header);

    let stack = gtk4::Stack::new();
    stack.set_transition_type(gtk4::StackTransitionType::SlideLeftRight);

    let (consent_page, consent_checks, consent_continue) = build_consent_page();
    stack.add_named(&consent_page, Some("consent"));

    let questionnaire = build_questionnaire_page();
    stack.add_named(&questionnaire.page, Some("questionnaire"));

    let recording = build_recording_page();
    stack.add_named(&recording.page, Some("recording"));

    let (result_page, test_id_label, close_button) = build_result_page();
    stack.add_named(&result_page, Some("result"));

    toolbar_view.set_content(Some(&stack));
    window.set_content(Some(&toolbar_view));

    WizardWidgets {
        window,
        stack,
        consent_checks,
        consent_continue,
        name_row: questionnaire.name_row,
        age_row: questionnaire.age_row,
        gender_row: questionnaire.gender_row,
        medication_row: questionnaire.medication_row,
        environment_row: questionnaire.environment_row,
        dialect_row: questionnaire.dialect_row,
        answer_rows: questionnaire.answer_rows,
        form_continue: questionnaire.form_continue,
        recording_status: recording.status_label,
        timer_label: recording.timer_label,
        record_button: recording.record_button,
        stop_button: recording.stop_button,
        rerecord_button: recording.rerecord_button,
        submit_button: recording.submit_button,
        test_id_label,
        close_button,
    }
}

/// Reflect the wizard state in the widgets: visible page, forward-action
/// sensitivity and the recording controls. Writes only sensitivity,
/// visibility and display labels.
pub fn sync_wizard(ui: &WizardWidgets, wizard: &WizardState) {
    let page = match wizard.step() {
        WizardStep::Consent => "consent",
        WizardStep::Questionnaire => "questionnaire",
        WizardStep::Recording => "recording",
        WizardStep::Result => "result",
    };
    ui.stack.set_visible_child_name(page);

    ui.consent_continue.set_sensitive(wizard.consent_complete());
    ui.form_continue.set_sensitive(wizard.questionnaire_complete());

    let phase = wizard.phase();
    let submitting = wizard.is_submitting();

    ui.record_button.set_visible(phase == RecordingPhase::Idle);
    ui.stop_button.set_visible(phase == RecordingPhase::Recording);
    ui.rerecord_button.set_visible(phase == RecordingPhase::Captured);
    ui.submit_button.set_visible(phase == RecordingPhase::Captured);

    ui.rerecord_button.set_sensitive(!submitting);
    ui.submit_button.set_sensitive(wizard.can_submit());
    ui.submit_button.set_label(if submitting {
        "Submitting\u{2026}"
    } else {
        "Submit Assessment"
    });

    ui.timer_label.set_visible(phase == RecordingPhase::Recording);
    match phase {
        RecordingPhase::Idle => {
            ui.timer_label.set_text("00:00");
            ui.recording_status
                .set_text("Press Record and read the prompt aloud.");
        }
        RecordingPhase::Recording => {
            ui.recording_status.set_text("Recording\u{2026}");
        }
        RecordingPhase::Captured => {
            let duration = wizard.clip().map(|c| c.duration_secs).unwrap_or(0.0);
            ui.recording_status
                .set_text(&format!("Recording saved ({duration:.0}s)."));
        }
    }

    if let Some(receipt) = wizard.receipt() {
        ui.test_id_label.set_text(&receipt.test_id);
    }
}

/// Return every input widget to its blank state. Fires the widgets' change
/// handlers, so callers must not hold a state borrow.
pub fn clear_widgets(ui: &WizardWidgets) {
    for check in &ui.consent_checks {
        check.set_active(false);
    }
    ui.name_row.set_text("");
    ui.age_row.set_text("");
    for combo in [
        &ui.gender_row,
        &ui.medication_row,
        &ui.environment_row,
        &ui.dialect_row,
    ] {
        combo.set_selected(0);
    }
    for row in &ui.answer_rows {
        row.set_selected(0);
    }
    ui.timer_label.set_text("00:00");
    ui.test_id_label.set_text("");
}

fn page_box() -> gtk4::Box {
    let content = gtk4::Box::new(gtk4::Orientation::Vertical, 0);
    content.set_margin_start(16);
    content.set_margin_end(16);
    content.set_margin_top(12);
    content.set_margin_bottom(12);
    content
}

fn scrolled(content: &gtk4::Box) -> gtk4::ScrolledWindow {
    gtk4::ScrolledWindow::builder()
        .hscrollbar_policy(gtk4::PolicyType::Never)
        .child(content)
        .build()
}

fn build_consent_page() -> (gtk4::ScrolledWindow, Vec<gtk4::CheckButton>, gtk4::Button) {
    let content = page_box();

    let group = libadwaita::PreferencesGroup::new();
    group.set_title("Informed Consent");
    group.set_description(Some(CONSENT_INTRO));

    let mut checks = Vec::with_capacity(ConsentClause::ALL.len());
    for clause in ConsentClause::ALL {
        let check = gtk4::CheckButton::new();
        check.set_valign(gtk4::Align::Center);

        let row = libadwaita::ActionRow::builder()
            .title(clause.text())
            .activatable(true)
            .build();
        row.add_prefix(&check);
        row.set_activatable_widget(Some(&check));
        group.add(&row);

        checks.push(check);
    }

    content.append(&group);

    let continue_button = gtk4::Button::builder()
        .label("Continue to Questionnaire")
        .sensitive(false)
        .margin_top(16)
        .build();
    continue_button.add_css_class("suggested-action");
    continue_button.add_css_class("pill");
    content.append(&continue_button);

    (scrolled(&content), checks, continue_button)
}

struct QuestionnairePage {
    page: gtk4::ScrolledWindow,
    name_row: libadwaita::EntryRow,
    age_row: libadwaita::EntryRow,
    gender_row: libadwaita::ComboRow,
    medication_row: libadwaita::ComboRow,
    environment_row: libadwaita::ComboRow,
    dialect_row: libadwaita::ComboRow,
    answer_rows: Vec<libadwaita::ComboRow>,
    form_continue: gtk4::Button,
}

fn build_questionnaire_page() -> QuestionnairePage {
    let content = page_box();

    // --- Demographics ---
    let about_group = libadwaita::PreferencesGroup::new();
    about_group.set_title("About You");

    let name_row = libadwaita::EntryRow::builder()
        .title("Full name (optional)")
        .build();
    about_group.add(&name_row);

    let age_row = libadwaita::EntryRow::builder()
        .title("Age (18 or older)")
        .build();
    about_group.add(&age_row);

    let gender_row = selector_row("Gender", &GENDER_OPTIONS);
    about_group.add(&gender_row);

    let medication_row = selector_row("Currently on medication", &MEDICATION_OPTIONS);
    about_group.add(&medication_row);

    let environment_row = selector_row("Recording environment", &ENVIRONMENT_OPTIONS);
    about_group.add(&environment_row);

    let dialect_row = selector_row("Language dialect", &DIALECT_OPTIONS);
    about_group.add(&dialect_row);

    content.append(&about_group);

    // --- PHQ-8 items ---
    let phq_group = libadwaita::PreferencesGroup::new();
    phq_group.set_title("Over the last 2 weeks, how often have you been bothered by:");
    phq_group.set_margin_top(12);

    let answer_labels: Vec<&str> = ANSWER_OPTIONS.iter().map(|(label, _)| *label).collect();
    let mut answer_rows = Vec::with_capacity(PHQ8_ITEMS.len());
    for (i, item) in PHQ8_ITEMS.iter().enumerate() {
        let row = selector_row(&format!("{}. {item}", i + 1), &answer_labels);
        phq_group.add(&row);
        answer_rows.push(row);
    }

    content.append(&phq_group);

    let form_continue = gtk4::Button::builder()
        .label("Continue to Voice Recording")
        .sensitive(false)
        .margin_top(16)
        .build();
    form_continue.add_css_class("suggested-action");
    form_continue.add_css_class("pill");
    content.append(&form_continue);

    QuestionnairePage {
        page: scrolled(&content),
        name_row,
        age_row,
        gender_row,
        medication_row,
        environment_row,
        dialect_row,
        answer_rows,
        form_continue,
    }
}

struct RecordingPage {
    page: gtk4::ScrolledWindow,
    status_label: gtk4::Label,
    timer_label: gtk4::Label,
    record_button: gtk4::Button,
    stop_button: gtk4::Button,
    rerecord_button: gtk4::Button,
    submit_button: gtk4::Button,
}

fn build_recording_page() -> RecordingPage {
    let content = page_box();

    let prompt_group = libadwaita::PreferencesGroup::new();
    prompt_group.set_title("Voice Recording");
    prompt_group.set_description(Some("Please read this prompt aloud, naturally and clearly:"));

    let prompt_label = gtk4::Label::new(Some(READING_PROMPT));
    prompt_label.set_wrap(true);
    prompt_label.set_xalign(0.0);
    prompt_label.set_margin_top(8);
    prompt_label.add_css_class("title-4");
    prompt_group.add(&prompt_label);

    content.append(&prompt_group);

    let status_label = gtk4::Label::new(Some("Press Record and read the prompt aloud."));
    status_label.set_margin_top(24);
    status_label.add_css_class("dim-label");
    content.append(&status_label);

    let timer_label = gtk4::Label::new(Some("00:00"));
    timer_label.add_css_class("numeric");
    timer_label.add_css_class("title-2");
    timer_label.set_margin_top(8);
    timer_label.set_visible(false);
    content.append(&timer_label);

    let buttons = gtk4::Box::new(gtk4::Orientation::Horizontal, 12);
    buttons.set_halign(gtk4::Align::Center);
    buttons.set_margin_top(24);

    let record_button = gtk4::Button::builder().label("Start Recording").build();
    record_button.add_css_class("suggested-action");
    record_button.add_css_class("pill");
    buttons.append(&record_button);

    let stop_button = gtk4::Button::builder()
        .label("Stop Recording")
        .visible(false)
        .build();
    stop_button.add_css_class("destructive-action");
    stop_button.add_css_class("pill");
    buttons.append(&stop_button);

    let rerecord_button = gtk4::Button::builder()
        .label("Re-record")
        .visible(false)
        .build();
    rerecord_button.add_css_class("pill");
    buttons.append(&rerecord_button);

    let submit_button = gtk4::Button::builder()
        .label("Submit Assessment")
        .visible(false)
        .sensitive(false)
        .build();
    submit_button.add_css_class("suggested-action");
    submit_button.add_css_class("pill");
    buttons.append(&submit_button);

    content.append(&buttons);

    RecordingPage {
        page: scrolled(&content),
        status_label,
        timer_label,
        record_button,
        stop_button,
        rerecord_button,
        submit_button,
    }
}

fn build_result_page() -> (gtk4::ScrolledWindow, gtk4::Label, gtk4::Button) {
    let content = page_box();

    let done_group = libadwaita::PreferencesGroup::new();
    done_group.set_title("Assessment Submitted");
    done_group.set_description(Some("Thank you for taking part in the study."));

    let id_caption = gtk4::Label::new(Some("Your assessment ID"));
    id_caption.add_css_class("dim-label");
    id_caption.set_margin_top(16);
    done_group.add(&id_caption);

    let test_id_label = gtk4::Label::new(None);
    test_id_label.add_css_class("title-2");
    test_id_label.add_css_class("numeric");
    test_id_label.set_selectable(true);
    test_id_label.set_margin_top(4);
    done_group.add(&test_id_label);

    let note = gtk4::Label::new(Some(
        "Save this ID to follow up on your assessment. Voice and questionnaire \
         analysis runs on the study servers; results are typically available \
         within 24-48 hours.",
    ));
    note.set_wrap(true);
    note.set_xalign(0.0);
    note.set_margin_top(16);
    note.add_css_class("dim-label");
    done_group.add(&note);

    content.append(&done_group);

    let close_button = gtk4::Button::builder().label("Done").margin_top(24).build();
    close_button.add_css_class("suggested-action");
    close_button.add_css_class("pill");
    content.append(&close_button);

    (scrolled(&content), test_id_label, close_button)
}

/// A ComboRow whose first entry is a "Select…" placeholder mapping to the
/// empty (unanswered) value.
fn selector_row(title: &str, options: &[&str]) -> libadwaita::ComboRow {
    let mut entries: Vec<&str> = Vec::with_capacity(options.len() + 1);
    entries.push("Select\u{2026}");
    entries.extend_from_slice(options);

    let row = libadwaita::ComboRow::builder().title(title).build();
    row.set_model(Some(&gtk4::StringList::new(&entries)));
    row.set_selected(0);
    row
}

//! Glue between the wizard widgets and the wizard state machine: signal
//! handlers mutate [`WizardState`] and re-sync widget sensitivity from it.

use std::cell::RefCell;
use std::rc::Rc;

use gtk4::prelude::*;

use super::pipeline::dispatch_submit;
use super::recording::{discard_recording, start_recording, stop_recording};
use super::state::AppState;
use crate::ui::wizard::{clear_widgets, sync_wizard, WizardWidgets};
use crate::wizard::{
    ConsentClause, Field, ANSWER_OPTIONS, DIALECT_OPTIONS, ENVIRONMENT_OPTIONS, GENDER_OPTIONS,
    MEDICATION_OPTIONS,
};

/// Re-sync the wizard widgets from the current state.
/// Only writes sensitivity, visibility and labels, so it never re-enters
/// the input signal handlers.
fn sync(state: &Rc<RefCell<AppState>>) {
    let ui = state.borrow().wizard_ui.clone();
    if let Some(ui) = ui {
        sync_wizard(&ui, &state.borrow().wizard);
    }
}

/// Present the wizard at the Consent step.
pub fn open_wizard(state: &Rc<RefCell<AppState>>) {
    let ui = state.borrow().wizard_ui.clone();
    if let Some(ui) = ui {
        sync_wizard(&ui, &state.borrow().wizard);
        ui.window.present();
    }
}

/// Close the wizard: stop any live capture, then perform the atomic reset
/// and restore every widget to its blank state.
pub fn close_wizard(state: &Rc<RefCell<AppState>>) {
    {
        let mut s = state.borrow_mut();
        if let Some(source) = s.timer_source.take() {
            source.remove();
        }
        s.capture_stream = None;
        s.recording_start = None;
        s.wizard.reset();
    }

    // Clearing widgets fires their change handlers, which write the (already
    // reset) state; no borrow may be held across this call.
    let ui = state.borrow().wizard_ui.clone();
    if let Some(ui) = ui {
        clear_widgets(&ui);
        sync_wizard(&ui, &state.borrow().wizard);
        ui.window.set_visible(false);
    }
}

/// Forward progress from Consent or Questionnaire, if the gate passes.
pub fn advance_step(state: &Rc<RefCell<AppState>>) {
    if state.borrow_mut().wizard.advance() {
        log::info!("Wizard advanced to {:?}", state.borrow().wizard.step());
        sync(state);
    }
}

/// User-initiated submit.
pub fn submit(state: &Rc<RefCell<AppState>>) {
    dispatch_submit(state);
    sync(state);
}

/// Wire every wizard widget to the state machine. Called once at startup,
/// before the widgets are stored in [`AppState`].
pub fn connect_wizard(state: &Rc<RefCell<AppState>>, ui: &WizardWidgets) {
    // Consent checkboxes
    for (check, clause) in ui.consent_checks.iter().zip(ConsentClause::ALL) {
        let state = state.clone();
        check.connect_toggled(move |check| {
            state.borrow_mut().wizard.consent.set(clause, check.is_active());
            sync(&state);
        });
    }

    // Free-text rows
    connect_entry(state, &ui.name_row, Field::FullName);
    connect_entry(state, &ui.age_row, Field::Age);

    // Demographic selectors
    connect_combo(state, &ui.gender_row, Field::Gender, &GENDER_OPTIONS);
    connect_combo(state, &ui.medication_row, Field::CurrentMedication, &MEDICATION_OPTIONS);
    connect_combo(
        state,
        &ui.environment_row,
        Field::RecordingEnvironment,
        &ENVIRONMENT_OPTIONS,
    );
    connect_combo(state, &ui.dialect_row, Field::LanguageDialect, &DIALECT_OPTIONS);

    // PHQ-8 answers: selection index 1..=4 maps onto the 0-3 scale.
    for (item, row) in ui.answer_rows.iter().enumerate() {
        let state = state.clone();
        row.connect_selected_notify(move |row| {
            let idx = row.selected();
            let value = if idx == 0 {
                String::new()
            } else {
                ANSWER_OPTIONS[(idx - 1) as usize].1.to_string()
            };
            state.borrow_mut().wizard.fields.set_answer(item, &value);
            sync(&state);
        });
    }

    // Step navigation
    {
        let state = state.clone();
        ui.consent_continue.connect_clicked(move |_| advance_step(&state));
    }
    {
        let state = state.clone();
        ui.form_continue.connect_clicked(move |_| advance_step(&state));
    }

    // Recording controls
    {
        let state = state.clone();
        ui.record_button.connect_clicked(move |_| start_recording(&state));
    }
    {
        let state = state.clone();
        ui.stop_button.connect_clicked(move |_| stop_recording(&state));
    }
    {
        let state = state.clone();
        ui.rerecord_button.connect_clicked(move |_| discard_recording(&state));
    }
    {
        let state = state.clone();
        ui.submit_button.connect_clicked(move |_| submit(&state));
    }

    // Result page close, and the window's own close button, both reset.
    {
        let state = state.clone();
        ui.close_button.connect_clicked(move |_| close_wizard(&state));
    }
    {
        let state = state.clone();
        ui.window.connect_close_request(move |_| {
            close_wizard(&state);
            gtk4::glib::Propagation::Stop
        });
    }
}

fn connect_entry(state: &Rc<RefCell<AppState>>, row: &libadwaita::EntryRow, field: Field) {
    let state = state.clone();
    row.connect_changed(move |row| {
        state.borrow_mut().wizard.fields.set(field, &row.text());
        sync(&state);
    });
}

fn connect_combo(
    state: &Rc<RefCell<AppState>>,
    row: &libadwaita::ComboRow,
    field: Field,
    options: &'static [&'static str],
) {
    let state = state.clone();
    row.connect_selected_notify(move |row| {
        let idx = row.selected();
        let value = if idx == 0 {
            ""
        } else {
            options[(idx - 1) as usize]
        };
        state.borrow_mut().wizard.fields.set(field, value);
        sync(&state);
    });
}

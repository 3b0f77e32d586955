use std::cell::RefCell;
use std::rc::Rc;

use gtk4::glib;

use super::state::{AppState, BackendEvent};
use crate::ui::notice::show_notice;
use crate::ui::wizard::sync_wizard;
use crate::wizard::{CapturedClip, RecordingPhase, WizardStep};

/// Start microphone capture for the wizard's Recording step.
/// On a cpal failure (denied permission, missing device) a blocking notice
/// is shown and the sub-state stays idle so the user can retry.
pub fn start_recording(state: &Rc<RefCell<AppState>>) {
    {
        let s = state.borrow();
        if s.wizard.step() != WizardStep::Recording
            || s.wizard.phase() != RecordingPhase::Idle
        {
            return;
        }
        s.audio_buffer.lock().unwrap().clear();
    }

    log::info!("Starting recording");

    let buffer = state.borrow().audio_buffer.clone();
    match crate::recorder::start_capture(buffer) {
        Ok((stream, sample_rate)) => {
            let mut s = state.borrow_mut();
            s.capture_stream = Some(stream);
            s.sample_rate = sample_rate;
            s.recording_start = Some(std::time::Instant::now());
            s.wizard.start_recording();
        }
        Err(e) => {
            log::error!("Failed to start recording: {e}");
            let s = state.borrow();
            if let Some(ref ui) = s.wizard_ui {
                show_notice(
                    &ui.window,
                    "Microphone unavailable",
                    &format!("{e}\n\nEnable microphone access and try again."),
                );
            }
            return;
        }
    }

    // One tick per second: updates the elapsed label and enforces the cap.
    let sender = state.borrow().backend_sender.clone();
    let source = glib::timeout_add_local(std::time::Duration::from_secs(1), move || {
        let _ = sender.try_send(BackendEvent::RecordingTick);
        glib::ControlFlow::Continue
    });
    state.borrow_mut().timer_source = Some(source);

    sync_ui(state);
}

/// Stop capture, release the input device and finalize the clip.
pub fn stop_recording(state: &Rc<RefCell<AppState>>) {
    if state.borrow().wizard.phase() != RecordingPhase::Recording {
        return;
    }

    log::info!("Stopping recording");

    if let Some(source) = state.borrow_mut().timer_source.take() {
        source.remove();
    }

    // Dropping the stream releases the device; this is the only place the
    // stream leaves the state while a recording sub-session is live.
    state.borrow_mut().capture_stream = None;
    state.borrow_mut().recording_start = None;

    let samples: Vec<f32> = state.borrow().audio_buffer.lock().unwrap().clone();
    let sample_rate = state.borrow().sample_rate;

    if samples.is_empty() {
        state.borrow_mut().wizard.abort_recording();
        let s = state.borrow();
        if let Some(ref ui) = s.wizard_ui {
            show_notice(
                &ui.window,
                "No audio captured",
                "The microphone produced no samples. Try recording again.",
            );
        }
        drop(s);
        sync_ui(state);
        return;
    }

    log::info!(
        "Captured {} samples ({:.1}s at {}Hz)",
        samples.len(),
        crate::recorder::duration_secs(samples.len(), sample_rate),
        sample_rate
    );

    match crate::recorder::samples_to_wav(&samples, sample_rate) {
        Ok(wav) => {
            let clip = CapturedClip {
                wav,
                duration_secs: crate::recorder::duration_secs(samples.len(), sample_rate),
            };
            state.borrow_mut().wizard.finish_recording(clip);
        }
        Err(e) => {
            log::error!("WAV encoding failed: {e}");
            state.borrow_mut().wizard.abort_recording();
            let s = state.borrow();
            if let Some(ref ui) = s.wizard_ui {
                show_notice(&ui.window, "Recording failed", &format!("{e}"));
            }
        }
    }

    sync_ui(state);
}

/// Discard the captured clip and return to idle ("re-record").
pub fn discard_recording(state: &Rc<RefCell<AppState>>) {
    if state.borrow_mut().wizard.discard_clip() {
        log::info!("Clip discarded for re-record");
        sync_ui(state);
    }
}

/// Handle a recording timer tick: refresh the elapsed label and auto-stop
/// once the configured cap is reached.
pub fn on_recording_tick(state: &Rc<RefCell<AppState>>) {
    let (elapsed, cap) = {
        let s = state.borrow();
        let Some(start) = s.recording_start else {
            return;
        };
        (start.elapsed().as_secs(), s.config.max_recording_secs)
    };

    {
        let s = state.borrow();
        if let Some(ref ui) = s.wizard_ui {
            let mins = elapsed / 60;
            let secs = elapsed % 60;
            ui.timer_label.set_text(&format!("{mins:02}:{secs:02}"));
        }
    }

    if elapsed >= cap {
        log::info!("Recording cap of {cap}s reached, auto-stopping");
        stop_recording(state);
    }
}

fn sync_ui(state: &Rc<RefCell<AppState>>) {
    let s = state.borrow();
    if let Some(ref ui) = s.wizard_ui {
        sync_wizard(ui, &s.wizard);
    }
}

use std::cell::RefCell;
use std::rc::Rc;

use super::pipeline::dispatch_stats_fetch;
use super::recording::on_recording_tick;
use super::state::{AppState, BackendEvent};
use crate::ui::dashboard::render_stats;
use crate::ui::notice::show_notice;
use crate::ui::wizard::sync_wizard;

/// Handle a backend event on the GTK main thread.
pub fn handle_backend_event(state: &Rc<RefCell<AppState>>, event: BackendEvent) {
    match event {
        BackendEvent::StatsLoaded(snapshot) => {
            log::info!(
                "Stats refreshed: {} submissions on record",
                snapshot.total_tests()
            );
            let mut s = state.borrow_mut();
            s.stats = snapshot;
            if let Some(ref dash) = s.dashboard {
                render_stats(dash, &s.stats);
            }
        }
        BackendEvent::StatsFailed(err) => {
            // Placeholder data stays on screen; the dashboard never blocks.
            log::warn!("Stats fetch failed: {err}");
        }
        BackendEvent::SubmitAccepted(receipt) => {
            log::info!("Submission accepted: testId={}", receipt.test_id);
            {
                let mut s = state.borrow_mut();
                s.wizard.submit_succeeded(receipt);
                if let Some(ref ui) = s.wizard_ui {
                    sync_wizard(ui, &s.wizard);
                }
            }
            dispatch_stats_fetch(state);
        }
        BackendEvent::SubmitFailed(err) => {
            log::error!("Submission failed: {err}");
            let mut s = state.borrow_mut();
            s.wizard.submit_failed();
            if let Some(ref ui) = s.wizard_ui {
                sync_wizard(ui, &s.wizard);
                show_notice(
                    &ui.window,
                    "Submission failed",
                    &format!("{err}\n\nYour recording is kept. Please try again."),
                );
            }
        }
        BackendEvent::RecordingTick => {
            on_recording_tick(state);
        }
    }
}

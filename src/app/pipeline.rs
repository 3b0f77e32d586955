use std::cell::RefCell;
use std::rc::Rc;

use super::state::{AppState, BackendEvent};

/// Fetch the aggregate statistics snapshot on the tokio runtime.
/// Issued at startup and again after every accepted submission.
pub fn dispatch_stats_fetch(state: &Rc<RefCell<AppState>>) {
    let s = state.borrow();
    let api = s.api.clone();
    let sender = s.backend_sender.clone();

    s.tokio_rt.spawn(async move {
        match api.fetch_stats().await {
            Ok(snapshot) => {
                let _ = sender.send(BackendEvent::StatsLoaded(snapshot)).await;
            }
            Err(e) => {
                let _ = sender.send(BackendEvent::StatsFailed(e.to_string())).await;
            }
        }
    });
}

/// Latch and dispatch a submission. A no-op when no clip is captured or a
/// request is already in flight. The clip is base64-encoded and the payload
/// fully assembled before the request task is spawned.
pub fn dispatch_submit(state: &Rc<RefCell<AppState>>) {
    let mut s = state.borrow_mut();

    if !s.wizard.begin_submit() {
        log::info!("Ignoring submit: no clip captured or a request is in flight");
        return;
    }

    // can_submit() held above, so the clip is present.
    let audio_base64 = match s.wizard.clip() {
        Some(clip) => crate::api::encode_audio(&clip.wav),
        None => {
            s.wizard.submit_failed();
            return;
        }
    };

    let payload = match s.wizard.payload(audio_base64) {
        Some(payload) => payload,
        None => {
            // Unreachable past questionnaire validation; recover anyway.
            log::error!("Submission payload assembly failed");
            s.wizard.submit_failed();
            return;
        }
    };

    log::info!(
        "Submitting assessment ({} bytes of audio, {:.1}s)",
        payload.audio_data.len(),
        s.wizard.clip().map(|c| c.duration_secs).unwrap_or(0.0),
    );

    let api = s.api.clone();
    let sender = s.backend_sender.clone();

    s.tokio_rt.spawn(async move {
        match api.submit_test(&payload).await {
            Ok(receipt) => {
                let _ = sender.send(BackendEvent::SubmitAccepted(receipt)).await;
            }
            Err(e) => {
                let _ = sender.send(BackendEvent::SubmitFailed(e.to_string())).await;
            }
        }
    });
}

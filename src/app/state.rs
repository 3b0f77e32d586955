use std::sync::{Arc, Mutex};

use gtk4::glib;

use crate::api::{ApiClient, SubmitReceipt};
use crate::config::Config;
use crate::stats::StatsSnapshot;
use crate::ui::dashboard::DashboardWidgets;
use crate::ui::wizard::WizardWidgets;
use crate::wizard::WizardState;

/// Events sent from background tasks to the GTK main thread.
#[derive(Debug, Clone)]
pub enum BackendEvent {
    StatsLoaded(StatsSnapshot),
    StatsFailed(String),
    SubmitAccepted(SubmitReceipt),
    SubmitFailed(String),
    RecordingTick,
}

/// Central application state. Lives on the GTK main thread inside Rc<RefCell<>>.
pub struct AppState {
    pub config: Config,
    pub api: Arc<ApiClient>,
    pub wizard: WizardState,
    pub stats: StatsSnapshot,
    pub tokio_rt: tokio::runtime::Runtime,
    pub backend_sender: async_channel::Sender<BackendEvent>,

    // Capture state
    pub audio_buffer: Arc<Mutex<Vec<f32>>>,
    pub capture_stream: Option<cpal::Stream>,
    pub sample_rate: u32,
    pub recording_start: Option<std::time::Instant>,
    pub timer_source: Option<glib::SourceId>,

    // UI handles
    pub dashboard: Option<DashboardWidgets>,
    pub wizard_ui: Option<WizardWidgets>,
}

impl AppState {
    pub fn new(sender: async_channel::Sender<BackendEvent>) -> Self {
        let config = Config::load();
        log::info!("Backend base URL: {}", config.base_url);
        let api = ApiClient::new(&config).expect("Failed to build HTTP client");
        let tokio_rt = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");

        Self {
            config,
            api: Arc::new(api),
            wizard: WizardState::new(),
            stats: StatsSnapshot::default(),
            tokio_rt,
            backend_sender: sender,
            audio_buffer: Arc::new(Mutex::new(Vec::new())),
            capture_stream: None,
            sample_rate: crate::recorder::TARGET_SAMPLE_RATE,
            recording_start: None,
            timer_source: None,
            dashboard: None,
            wizard_ui: None,
        }
    }
}

mod api;
mod app;
mod config;
mod recorder;
mod stats;
mod ui;
mod wizard;

use std::cell::RefCell;
use std::rc::Rc;

use gtk4::prelude::*;
use libadwaita::prelude::*;

use app::{AppState, BackendEvent};

fn main() {
    env_logger::init();
    log::info!("MindVoice starting");

    let application = libadwaita::Application::builder()
        .application_id("com.github.mindvoice.MindVoice")
        .build();

    application.connect_activate(on_activate);
    application.run();
}

fn on_activate(app: &libadwaita::Application) {
    // Async channel for backend → UI communication
    let (backend_tx, backend_rx) = async_channel::unbounded::<BackendEvent>();

    // Build app state (config resolved here, once)
    let state = Rc::new(RefCell::new(AppState::new(backend_tx)));

    // Write the default config on first run so it is editable
    if !config::Config::on_disk() {
        if let Err(e) = state.borrow().config.save() {
            log::warn!("Failed to write default config: {e}");
        }
    }

    // Build UI
    let dashboard = ui::dashboard::build_dashboard(app, &state.borrow().stats);
    let wizard_ui = ui::wizard::build_wizard(&dashboard.window);

    // App-level actions for the dashboard menu
    {
        let quit_action = gtk4::gio::SimpleAction::new("quit", None);
        let app_clone = app.clone();
        quit_action.connect_activate(move |_, _| app_clone.quit());
        app.add_action(&quit_action);

        let about_action = gtk4::gio::SimpleAction::new("about", None);
        let parent = dashboard.window.clone();
        about_action.connect_activate(move |_, _| {
            let about = libadwaita::AboutWindow::builder()
                .application_name("MindVoice")
                .version(env!("CARGO_PKG_VERSION"))
                .comments("Voice and questionnaire collection client for a depression-screening study")
                .license_type(gtk4::License::MitX11)
                .transient_for(&parent)
                .build();
            about.present();
        });
        app.add_action(&about_action);
    }

    // Wire the wizard controls to the state machine
    app::connect_wizard(&state, &wizard_ui);

    // Wire the "Start Assessment" button
    {
        let state_clone = state.clone();
        dashboard.start_button.connect_clicked(move |_| {
            app::open_wizard(&state_clone);
        });
    }

    // Store UI handles in state
    {
        let mut s = state.borrow_mut();
        s.dashboard = Some(dashboard);
        s.wizard_ui = Some(wizard_ui);
    }

    // Show the dashboard
    state.borrow().dashboard.as_ref().unwrap().window.present();

    // Attach backend event handler
    {
        let state_clone = state.clone();
        gtk4::glib::spawn_future_local(async move {
            while let Ok(event) = backend_rx.recv().await {
                app::handle_backend_event(&state_clone, event);
            }
        });
    }

    // Initial stats fetch
    app::dispatch_stats_fetch(&state);
}

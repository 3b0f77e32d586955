use gtk4::prelude::*;
use libadwaita::prelude::*;

use crate::stats::{severity_label, StatsSnapshot};

/// Handles returned from building the dashboard window.
#[derive(Clone)]
pub struct DashboardWidgets {
    pub window: libadwaita::ApplicationWindow,
    pub total_tests_label: gtk4::Label,
    pub total_audio_label: gtk4::Label,
    pub average_label: gtk4::Label,
    pub gender_label: gtk4::Label,
    pub outcome_list: gtk4::Box,
    pub status_list: gtk4::Box,
    pub age_list: gtk4::Box,
    pub updated_label: gtk4::Label,
    pub start_button: gtk4::Button,
}

/// Build the main dashboard window, pre-populated from `stats`
/// (placeholder data until the first fetch lands).
pub fn build_dashboard(app: &libadwaita::Application, stats: &StatsSnapshot) -> DashboardWidgets {
    let window = libadwaita::ApplicationWindow::builder()
        .application(app)
        .title("MindVoice Study")
        .default_width(520)
        .default_height(640)
        .build();

    let toolbar_view = libadwaita::ToolbarView::new();
    let header = libadwaita::HeaderBar::new();

    let menu_button = gtk4::MenuButton::new();
    menu_button.set_icon_name("open-menu-symbolic");

    let menu = gtk4::gio::Menu::new();
    menu.append(Some("About MindVoice"), Some("app.about"));
    menu.append(Some("Quit"), Some("app.quit"));

    menu_button.set_menu_model(Some(&menu));
    header.pack_end(&menu_button);

    toolbar_view.add_top_bar(&header);

    let content = gtk4::Box::new(gtk4::Orientation::Vertical, 0);
    content.set_margin_start(16);
    content.set_margin_end(16);
    content.set_margin_top(12);
    content.set_margin_bottom(12);

    // --- Overview group ---
    let overview_group = libadwaita::PreferencesGroup::new();
    overview_group.set_title("Study Overview");

    let (tests_row, total_tests_label) = stat_row("Total participants");
    overview_group.add(&tests_row);

    let (audio_row, total_audio_label) = stat_row("Voice recordings");
    overview_group.add(&audio_row);

    let (average_row, average_label) = stat_row("Average PHQ-8 score");
    overview_group.add(&average_row);

    let (gender_row, gender_label) = stat_row("Male / female participants");
    overview_group.add(&gender_row);

    content.append(&overview_group);
    content.append(&gtk4::Separator::new(gtk4::Orientation::Horizontal));

    // --- Screening outcomes ---
    let outcome_group = libadwaita::PreferencesGroup::new();
    outcome_group.set_title("Screening Outcomes");
    outcome_group.set_margin_top(12);

    let outcome_list = gtk4::Box::new(gtk4::Orientation::Vertical, 6);
    outcome_list.set_margin_top(8);
    outcome_group.add(&outcome_list);

    content.append(&outcome_group);
    content.append(&gtk4::Separator::new(gtk4::Orientation::Horizontal));

    // --- Severity distribution ---
    let status_group = libadwaita::PreferencesGroup::new();
    status_group.set_title("Severity Distribution");
    status_group.set_description(Some(
        "Share of submissions per PHQ-8 band: 0-4 minimal, 5-9 mild, \
         10-14 moderate, 15-19 moderately severe, 20-24 severe",
    ));
    status_group.set_margin_top(12);

    let status_list = gtk4::Box::new(gtk4::Orientation::Vertical, 6);
    status_list.set_margin_top(8);
    status_group.add(&status_list);

    content.append(&status_group);
    content.append(&gtk4::Separator::new(gtk4::Orientation::Horizontal));

    // --- Age distribution ---
    let age_group = libadwaita::PreferencesGroup::new();
    age_group.set_title("Age Distribution");
    age_group.set_margin_top(12);

    let age_list = gtk4::Box::new(gtk4::Orientation::Vertical, 6);
    age_list.set_margin_top(8);
    age_group.add(&age_list);

    content.append(&age_group);
    content.append(&gtk4::Separator::new(gtk4::Orientation::Horizontal));

    // --- Participate ---
    let participate_group = libadwaita::PreferencesGroup::new();
    participate_group.set_title("Take Part");
    participate_group.set_description(Some(
        "A short questionnaire and one voice recording. Anonymous, about five minutes.",
    ));
    participate_group.set_margin_top(12);

    let start_button = gtk4::Button::builder()
        .label("Start Assessment")
        .halign(gtk4::Align::Start)
        .build();
    start_button.add_css_class("suggested-action");
    start_button.add_css_class("pill");
    start_button.set_margin_top(8);
    participate_group.add(&start_button);

    content.append(&participate_group);

    let updated_label = gtk4::Label::new(Some("Showing sample data until the first refresh"));
    updated_label.add_css_class("dim-label");
    updated_label.set_margin_top(16);
    updated_label.set_xalign(0.0);
    content.append(&updated_label);

    // Assemble
    let scrolled = gtk4::ScrolledWindow::builder()
        .hscrollbar_policy(gtk4::PolicyType::Never)
        .child(&content)
        .build();
    toolbar_view.set_content(Some(&scrolled));
    window.set_content(Some(&toolbar_view));

    let widgets = DashboardWidgets {
        window,
        total_tests_label,
        total_audio_label,
        average_label,
        gender_label,
        outcome_list,
        status_list,
        age_list,
        updated_label,
        start_button,
    };

    populate(&widgets, stats);
    widgets
}

/// Refresh every dashboard section from a freshly fetched snapshot and
/// stamp the refresh time.
pub fn render_stats(dash: &DashboardWidgets, stats: &StatsSnapshot) {
    populate(dash, stats);
    let now = chrono::Local::now().format("%H:%M:%S");
    dash.updated_label.set_text(&format!("Updated {now}"));
}

fn populate(dash: &DashboardWidgets, stats: &StatsSnapshot) {
    dash.total_tests_label.set_text(&stats.total_tests().to_string());
    dash.total_audio_label.set_text(&stats.total_audio().to_string());
    let average = stats.average_phq8();
    dash.average_label.set_text(&format!(
        "{average:.1} ({})",
        severity_label(average.round() as u8)
    ));

    let (male, female) = stats.gender_split();
    dash.gender_label.set_text(&format!("{male:.0}% / {female:.0}%"));

    let outcomes = stats.outcome_split();
    let outcome_rows: Vec<(String, f64, String)> = outcomes
        .iter()
        .map(|s| (s.name.clone(), s.value, format!("{:.1}%", s.value)))
        .collect();
    rebuild_bars(&dash.outcome_list, &outcome_rows, 100.0);

    let status = stats.status_distribution();
    let status_rows: Vec<(String, f64, String)> = status
        .iter()
        .map(|s| (s.name.clone(), s.value, format!("{:.1}%", s.value)))
        .collect();
    rebuild_bars(&dash.status_list, &status_rows, 100.0);

    let ages = stats.age_distribution();
    let max_count = ages.iter().map(|b| b.count).max().unwrap_or(0).max(1);
    let age_rows: Vec<(String, f64, String)> = ages
        .iter()
        .map(|b| (b.age_group.clone(), b.count as f64, b.count.to_string()))
        .collect();
    rebuild_bars(&dash.age_list, &age_rows, max_count as f64);
}

/// Replace `container`'s children with one labelled bar per entry.
fn rebuild_bars(container: &gtk4::Box, rows: &[(String, f64, String)], max_value: f64) {
    while let Some(child) = container.first_child() {
        container.remove(&child);
    }

    for (title, value, value_text) in rows {
        let row = gtk4::Box::new(gtk4::Orientation::Horizontal, 12);

        let name = gtk4::Label::new(Some(title));
        name.set_xalign(0.0);
        name.set_width_chars(24);
        name.set_ellipsize(gtk4::pango::EllipsizeMode::End);
        row.append(&name);

        let bar = gtk4::LevelBar::for_interval(0.0, max_value.max(f64::EPSILON));
        bar.set_value(value.clamp(0.0, max_value));
        bar.set_hexpand(true);
        bar.set_valign(gtk4::Align::Center);
        row.append(&bar);

        let amount = gtk4::Label::new(Some(value_text));
        amount.add_css_class("dim-label");
        amount.set_width_chars(7);
        amount.set_xalign(1.0);
        row.append(&amount);

        container.append(&row);
    }
}

/// An ActionRow with a dim suffix label holding one headline number.
fn stat_row(title: &str) -> (libadwaita::ActionRow, gtk4::Label) {
    let row = libadwaita::ActionRow::builder().title(title).build();
    let label = gtk4::Label::new(Some("0"));
    label.add_css_class("dim-label");
    row.add_suffix(&label);
    (row, label)
}

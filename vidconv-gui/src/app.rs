use vidconv_core::{BackgroundConverter, ConverterConfig};

use crate::messages::MsgBox;
use crate::theme::{self, Theme};
use crate::view::ConverterView;

pub const WINDOW_TITLE: &str = "Video Manager";

/// One-line status shown at the bottom of the window.
#[derive(Debug, Default)]
pub struct StatusBar {
    message: String,
}

impl StatusBar {
    pub fn show_message(&mut self, text: impl Into<String>) {
        self.message = text.into();
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    fn show(&self, ui: &mut egui::Ui) {
        ui.label(egui::RichText::new(self.message()).small());
    }
}

/// Main window: hosts the converter view above a status bar.
pub struct MainWindow {
    view: ConverterView,
    status_bar: StatusBar,
}

impl MainWindow {
    pub fn new(cc: &eframe::CreationContext<'_>, config: &ConverterConfig, theme: Theme) -> Self {
        theme::setup_theme(&cc.egui_ctx, theme);

        // Worker events wake the UI so they are handled without input
        let ctx = cc.egui_ctx.clone();
        let converter = BackgroundConverter::from_config(config).with_notify(move || ctx.request_repaint());

        Self {
            view: ConverterView::new(converter, Box::new(MsgBox::new(WINDOW_TITLE))),
            status_bar: StatusBar::default(),
        }
    }
}

impl eframe::App for MainWindow {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.view.handle_events(&mut self.status_bar);

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            self.status_bar.show(ui);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.view.show(ui, &mut self.status_bar);
        });
    }
}

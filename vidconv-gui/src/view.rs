//! Converter view: file pickers, format selector and the convert button.

use std::path::PathBuf;

use egui::{RichText, Vec2};
use vidconv_core::formats::{self, FormatEntry};
use vidconv_core::{
    BackgroundConverter, ConversionEvent, ConversionOutcome, ConversionRequest, JobId,
};

use crate::app::StatusBar;
use crate::messages::Notifier;
use crate::theme::TEXT_MARGIN;

pub const STATUS_IN_PROGRESS: &str = "Conversion in progress...";
pub const STATUS_FINISHED: &str = "Conversion finished";
pub const STATUS_CANCELLED: &str = "Conversion cancelled";

pub struct ConverterView {
    converter: BackgroundConverter,
    notifier: Box<dyn Notifier>,
    input_path: String,
    output_path: String,
    selected_format: &'static FormatEntry,
    /// Job started from this view; events for other jobs are stale
    current_job: Option<JobId>,
    /// Fraction complete while a conversion runs
    progress: Option<f32>,
}

impl ConverterView {
    pub fn new(converter: BackgroundConverter, notifier: Box<dyn Notifier>) -> Self {
        Self {
            converter,
            notifier,
            input_path: String::new(),
            output_path: String::new(),
            selected_format: formats::default_format(),
            current_job: None,
            progress: None,
        }
    }

    pub fn set_input_path(&mut self, path: impl Into<String>) {
        self.input_path = path.into();
    }

    pub fn set_output_path(&mut self, path: impl Into<String>) {
        self.output_path = path.into();
    }

    pub fn select_format(&mut self, format: &'static FormatEntry) {
        self.selected_format = format;
    }

    pub fn progress(&self) -> Option<f32> {
        self.progress
    }

    /// Start converting the chosen file. Does nothing until both paths are set.
    pub fn start_convert(&mut self, status: &mut StatusBar) {
        let input = self.input_path.trim();
        let output = self.output_path.trim();
        if input.is_empty() || output.is_empty() {
            return;
        }

        let request = ConversionRequest::new(self.selected_format.label, input, output);
        match self.converter.start(request) {
            Ok(job) => {
                self.current_job = Some(job);
                self.progress = Some(0.0);
                status.show_message(STATUS_IN_PROGRESS);
            }
            Err(e) => self.notifier.show_error(&e.to_string()),
        }
    }

    /// Apply every event the worker has sent since the last frame.
    pub fn handle_events(&mut self, status: &mut StatusBar) {
        for event in self.converter.poll_events() {
            self.handle_event(event, status);
        }
    }

    fn handle_event(&mut self, event: ConversionEvent, status: &mut StatusBar) {
        if self.current_job != Some(event.job()) {
            log::debug!("Ignoring event from finished job {}", event.job());
            return;
        }

        match event {
            ConversionEvent::Started(_, request) => {
                log::debug!("Worker started on {:?}", request.input);
            }
            ConversionEvent::Progress(_, percent) => {
                self.progress = Some((percent / 100.0).clamp(0.0, 1.0) as f32);
            }
            ConversionEvent::Finished(_, ConversionOutcome::Success(path)) => {
                self.current_job = None;
                self.progress = None;
                status.show_message(STATUS_FINISHED);
                self.notifier.show_info(&format!(
                    "Conversion finished.\nSaved to: {}",
                    path.display()
                ));
            }
            ConversionEvent::Finished(_, ConversionOutcome::Failure(message)) => {
                self.current_job = None;
                self.progress = None;
                status.show_message(STATUS_CANCELLED);
                self.notifier
                    .show_error(&format!("Conversion cancelled: {message}"));
            }
        }
    }

    pub fn show(&mut self, ui: &mut egui::Ui, status: &mut StatusBar) {
        ui.add_space(TEXT_MARGIN / 2.0);

        ui.label("Select your video:");
        if ui.button("Select your video").clicked() {
            self.select_input_file();
        }
        ui.text_edit_singleline(&mut self.input_path);

        ui.label("Select the output format:");
        let mut selected = self.selected_format;
        egui::ComboBox::from_id_source("output_format")
            .selected_text(selected.label)
            .width(ui.available_width())
            .show_ui(ui, |ui| {
                for entry in formats::all() {
                    ui.selectable_value(&mut selected, entry, entry.label);
                }
            });
        self.select_format(selected);

        ui.label("Select where to save your video:");
        if ui.button("Select where to save your video").clicked() {
            self.select_output_file();
        }
        ui.text_edit_singleline(&mut self.output_path);

        ui.add_space(TEXT_MARGIN / 2.0);
        if ui
            .add_sized(Vec2::new(ui.available_width(), 28.0), egui::Button::new("Convert"))
            .clicked()
        {
            self.start_convert(status);
        }

        if let Some(progress) = self.progress() {
            ui.add(
                egui::ProgressBar::new(progress)
                    .show_percentage()
                    .animate(true),
            );
        }

        self.handle_dropped_files(ui);
    }

    fn select_input_file(&mut self) {
        let extensions = formats::supported_input_extensions();
        if let Some(path) = rfd::FileDialog::new()
            .set_title("Select a video to convert")
            .add_filter("Videos", extensions)
            .add_filter("All Files", &["*"])
            .pick_file()
        {
            self.set_input_path(path.display().to_string());
        }
    }

    fn select_output_file(&mut self) {
        let extension = self.selected_format.extension();
        if let Some(path) = rfd::FileDialog::new()
            .set_title("Choose where to save the converted video")
            .add_filter(self.selected_format.label, &[extension.as_str()])
            .save_file()
        {
            self.set_output_path(path.display().to_string());
        }
    }

    /// A video dropped on the window becomes the input file.
    fn handle_dropped_files(&mut self, ui: &mut egui::Ui) {
        let dropped: Option<PathBuf> = ui.ctx().input(|i| {
            i.raw
                .dropped_files
                .iter()
                .filter_map(|f| f.path.clone())
                .find(|p| {
                    p.extension()
                        .and_then(|e| e.to_str())
                        .map(formats::is_supported_extension)
                        .unwrap_or(false)
                })
        });

        if let Some(path) = dropped {
            self.set_input_path(path.display().to_string());
        }

        if ui.ctx().input(|i| !i.raw.hovered_files.is_empty()) {
            ui.label(RichText::new("Drop to use as input").italics());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::cell::RefCell;
    use std::path::Path;
    use std::rc::Rc;
    use std::sync::{Arc, Mutex};
    use std::time::{Duration, Instant};
    use vidconv_core::Encoder;

    #[derive(Debug, Clone, PartialEq)]
    enum Notice {
        Error(String),
        Info(String),
    }

    #[derive(Clone, Default)]
    struct RecordingNotifier(Rc<RefCell<Vec<Notice>>>);

    impl Notifier for RecordingNotifier {
        fn show_error(&self, text: &str) {
            self.0.borrow_mut().push(Notice::Error(text.to_string()));
        }

        fn show_info(&self, text: &str) {
            self.0.borrow_mut().push(Notice::Info(text.to_string()));
        }
    }

    /// Records the codec and writes a stub file. The n-th call first sleeps
    /// for `delays[n]`, if given.
    #[derive(Default)]
    struct StubEncoder {
        codecs: Mutex<Vec<Option<String>>>,
        delays: Vec<Duration>,
        fail_with: Option<&'static str>,
    }

    impl Encoder for StubEncoder {
        fn encode(
            &self,
            _input: &Path,
            output: &Path,
            codec: Option<&str>,
            _muxer: Option<&str>,
            progress: &mut dyn FnMut(f64),
        ) -> Result<()> {
            let call = {
                let mut codecs = self.codecs.lock().unwrap();
                codecs.push(codec.map(str::to_string));
                codecs.len() - 1
            };
            std::thread::sleep(self.delays.get(call).copied().unwrap_or_default());
            if let Some(message) = self.fail_with {
                anyhow::bail!(message);
            }
            progress(100.0);
            std::fs::write(output, b"converted")?;
            Ok(())
        }
    }

    fn scratch_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("vidconv-gui-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn view_with(encoder: Arc<StubEncoder>) -> (ConverterView, RecordingNotifier) {
        let notifier = RecordingNotifier::default();
        let converter = BackgroundConverter::new(encoder, scratch_dir());
        (
            ConverterView::new(converter, Box::new(notifier.clone())),
            notifier,
        )
    }

    fn wait_until_done(view: &mut ConverterView, status: &mut StatusBar) {
        let deadline = Instant::now() + Duration::from_secs(10);
        while status.message() == STATUS_IN_PROGRESS {
            assert!(Instant::now() < deadline, "conversion did not finish");
            std::thread::sleep(Duration::from_millis(10));
            view.handle_events(status);
        }
    }

    #[test]
    fn empty_paths_start_nothing() {
        let encoder = Arc::new(StubEncoder::default());
        let (mut view, notices) = view_with(encoder.clone());
        let mut status = StatusBar::default();

        view.start_convert(&mut status);
        view.set_input_path("clip.mov");
        view.start_convert(&mut status);
        view.set_input_path("");
        view.set_output_path("clip.mp4");
        view.start_convert(&mut status);

        assert_eq!(status.message(), "");
        assert!(notices.0.borrow().is_empty());
        assert!(view.progress().is_none());
        assert!(encoder.codecs.lock().unwrap().is_empty());
    }

    #[test]
    fn success_updates_status_and_shows_info() {
        let encoder = Arc::new(StubEncoder::default());
        let (mut view, notices) = view_with(encoder);
        let mut status = StatusBar::default();
        let output = scratch_dir().join("success.mp4");

        view.set_input_path("clip.mov");
        view.set_output_path(output.display().to_string());
        view.start_convert(&mut status);
        assert_eq!(status.message(), STATUS_IN_PROGRESS);
        assert_eq!(view.progress(), Some(0.0));

        wait_until_done(&mut view, &mut status);

        assert_eq!(status.message(), STATUS_FINISHED);
        assert!(view.progress().is_none());
        assert_eq!(
            *notices.0.borrow(),
            vec![Notice::Info(format!(
                "Conversion finished.\nSaved to: {}",
                output.display()
            ))]
        );
        assert!(output.exists());
    }

    #[test]
    fn busy_converter_shows_error_notice() {
        let encoder = Arc::new(StubEncoder {
            delays: vec![Duration::from_millis(300)],
            ..Default::default()
        });
        let (mut view, notices) = view_with(encoder.clone());
        let mut status = StatusBar::default();

        view.set_input_path("clip.mov");
        view.set_output_path(scratch_dir().join("busy.mp4").display().to_string());
        view.start_convert(&mut status);
        view.start_convert(&mut status);

        assert_eq!(
            notices.0.borrow().first(),
            Some(&Notice::Error("A conversion is already in progress".to_string()))
        );

        wait_until_done(&mut view, &mut status);
        assert_eq!(encoder.codecs.lock().unwrap().len(), 1);
        assert_eq!(status.message(), STATUS_FINISHED);
    }

    #[test]
    fn failure_shows_cancelled_notice() {
        let encoder = Arc::new(StubEncoder {
            fail_with: Some("Invalid data found when processing input"),
            ..Default::default()
        });
        let (mut view, notices) = view_with(encoder);
        let mut status = StatusBar::default();
        let output = scratch_dir().join("failed.avi");

        view.set_input_path("broken.mov");
        view.set_output_path(output.display().to_string());
        view.select_format(formats::find("AVI").unwrap());
        view.start_convert(&mut status);
        wait_until_done(&mut view, &mut status);

        assert_eq!(status.message(), STATUS_CANCELLED);
        assert_eq!(
            *notices.0.borrow(),
            vec![Notice::Error(
                "Conversion cancelled: Invalid data found when processing input".to_string()
            )]
        );
        assert!(!output.exists());
    }

    #[test]
    fn late_finish_from_previous_job_is_ignored() {
        let encoder = Arc::new(StubEncoder {
            delays: vec![Duration::ZERO, Duration::from_millis(500)],
            ..Default::default()
        });
        let (mut view, notices) = view_with(encoder.clone());
        let mut status = StatusBar::default();
        let first = scratch_dir().join("first.mp4");
        let second = scratch_dir().join("second.mp4");

        view.set_input_path("clip.mov");
        view.set_output_path(first.display().to_string());
        view.start_convert(&mut status);

        // First job is done but its events have not been handled yet
        let deadline = Instant::now() + Duration::from_secs(10);
        while view.converter.is_running() {
            assert!(Instant::now() < deadline, "first conversion did not finish");
            std::thread::sleep(Duration::from_millis(10));
        }
        std::thread::sleep(Duration::from_millis(50));

        view.set_output_path(second.display().to_string());
        view.start_convert(&mut status);
        view.handle_events(&mut status);

        assert_eq!(status.message(), STATUS_IN_PROGRESS);
        assert!(view.progress().is_some());
        assert!(notices.0.borrow().is_empty());

        wait_until_done(&mut view, &mut status);
        assert_eq!(status.message(), STATUS_FINISHED);
        assert_eq!(
            *notices.0.borrow(),
            vec![Notice::Info(format!(
                "Conversion finished.\nSaved to: {}",
                second.display()
            ))]
        );
        assert_eq!(encoder.codecs.lock().unwrap().len(), 2);
    }

    #[test]
    fn selected_format_decides_codec() {
        let encoder = Arc::new(StubEncoder::default());
        let (mut view, _notices) = view_with(encoder.clone());
        let mut status = StatusBar::default();

        view.set_input_path("clip.mov");
        view.set_output_path(scratch_dir().join("clip.3gpp").display().to_string());
        view.select_format(formats::find("3GPP").unwrap());
        view.start_convert(&mut status);
        wait_until_done(&mut view, &mut status);

        assert_eq!(
            *encoder.codecs.lock().unwrap(),
            vec![Some("h263p".to_string())]
        );
    }
}

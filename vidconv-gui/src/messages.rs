/// Shows short notices to the user.
pub trait Notifier {
    fn show_error(&self, text: &str);
    fn show_info(&self, text: &str);
}

/// Modal native message box with an error or information icon.
#[derive(Debug, Clone)]
pub struct MsgBox {
    title: String,
}

impl MsgBox {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }

    fn show(&self, level: rfd::MessageLevel, text: &str) {
        let _ = rfd::MessageDialog::new()
            .set_level(level)
            .set_title(self.title.as_str())
            .set_description(text)
            .set_buttons(rfd::MessageButtons::Ok)
            .show();
    }
}

impl Notifier for MsgBox {
    fn show_error(&self, text: &str) {
        log::warn!("{}", text);
        self.show(rfd::MessageLevel::Error, text);
    }

    fn show_info(&self, text: &str) {
        log::info!("{}", text);
        self.show(rfd::MessageLevel::Info, text);
    }
}

use clap::ValueEnum;
use egui::{Color32, FontId, Rounding, Stroke, TextStyle};

pub const PRIMARY_COLOR: Color32 = Color32::from_rgb(0x1e, 0x81, 0xb0);
pub const DARKER_PRIMARY_COLOR: Color32 = Color32::from_rgb(0x16, 0x65, 0x8a);
pub const DARKEST_PRIMARY_COLOR: Color32 = Color32::from_rgb(0x11, 0x52, 0x70);

pub const SMALL_FONT_SIZE: f32 = 12.0;
pub const TEXT_MARGIN: f32 = 15.0;
pub const MINIMUM_WIDTH: f32 = 500.0;

const CORNER_RADIUS: f32 = 6.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

/// Build the application style: rounded widgets with the primary accent on
/// buttons and selections.
pub fn style_for(theme: Theme) -> egui::Style {
    let mut style = egui::Style::default();

    style.visuals = match theme {
        Theme::Dark => egui::Visuals::dark(),
        Theme::Light => egui::Visuals::light(),
    };

    let visuals = &mut style.visuals;
    visuals.selection.bg_fill = PRIMARY_COLOR;
    visuals.hyperlink_color = PRIMARY_COLOR;

    let text = Stroke::new(1.0, Color32::WHITE);
    for (widget, fill) in [
        (&mut visuals.widgets.inactive, PRIMARY_COLOR),
        (&mut visuals.widgets.hovered, DARKER_PRIMARY_COLOR),
        (&mut visuals.widgets.active, DARKEST_PRIMARY_COLOR),
    ] {
        widget.weak_bg_fill = fill;
        widget.fg_stroke = text;
        widget.rounding = Rounding::same(CORNER_RADIUS);
    }
    visuals.widgets.noninteractive.rounding = Rounding::same(CORNER_RADIUS);

    style
        .text_styles
        .insert(TextStyle::Button, FontId::proportional(SMALL_FONT_SIZE));
    style.spacing.item_spacing.y = 8.0;

    style
}

pub fn setup_theme(ctx: &egui::Context, theme: Theme) {
    ctx.set_style(style_for(theme));
}

/// Shared look and feel
///
/// Palette constants and widget styles for the light theme the app
/// ships with.

use iced::widget::{button, container, text};
use iced::{Background, Border, Color, Theme};

pub mod palette {
    use iced::Color;

    /// Screen background
    pub const BACKGROUND: Color = Color::from_rgb(0.980, 0.980, 0.988);
    /// Card and sheet surfaces
    pub const SURFACE: Color = Color::WHITE;
    /// Input fields and image card backdrops
    pub const FIELD: Color = Color::from_rgb(0.941, 0.941, 0.961);
    /// Body text
    pub const TEXT: Color = Color::from_rgb(0.118, 0.118, 0.180);
    /// Secondary text, placeholders, empty states
    pub const MUTED: Color = Color::from_rgb(0.533, 0.533, 0.533);
    /// Brand blue for primary actions
    pub const PRIMARY: Color = Color::from_rgb(0.0, 0.478, 1.0);
    /// Success toast background
    pub const SUCCESS: Color = Color::from_rgb(0.651, 0.890, 0.631);
    /// Error toast background
    pub const DANGER: Color = Color::from_rgb(0.953, 0.545, 0.659);
    /// Neutral cancel-button surface
    pub const CANCEL: Color = Color::from_rgb(0.878, 0.878, 0.878);
}

/// The single light theme the app runs with.
pub fn app_theme() -> Theme {
    Theme::custom(
        "Waymark Light".to_string(),
        iced::theme::Palette {
            background: palette::BACKGROUND,
            text: palette::TEXT,
            primary: palette::PRIMARY,
            success: palette::SUCCESS,
            danger: palette::DANGER,
        },
    )
}

fn rounded(radius: f32) -> Border {
    Border {
        color: Color::TRANSPARENT,
        width: 0.0,
        radius: radius.into(),
    }
}

/// White card behind form sections and list rows
pub fn card(_theme: &Theme) -> container::Style {
    container::Style {
        background: Some(Background::Color(palette::SURFACE)),
        border: rounded(12.0),
        ..container::Style::default()
    }
}

/// Backdrop for image cards and other inset surfaces
pub fn field(_theme: &Theme) -> container::Style {
    container::Style {
        background: Some(Background::Color(palette::FIELD)),
        border: rounded(12.0),
        ..container::Style::default()
    }
}

/// Dimmed layer behind modal content
pub fn overlay_backdrop(_theme: &Theme) -> container::Style {
    container::Style {
        background: Some(Background::Color(Color {
            a: 0.3,
            ..Color::BLACK
        })),
        ..container::Style::default()
    }
}

/// Bottom sheet surface, rounded only at the top
pub fn sheet(_theme: &Theme) -> container::Style {
    container::Style {
        background: Some(Background::Color(palette::SURFACE)),
        border: Border {
            color: Color::TRANSPARENT,
            width: 0.0,
            radius: iced::border::Radius {
                top_left: 20.0,
                top_right: 20.0,
                bottom_right: 0.0,
                bottom_left: 0.0,
            },
        },
        ..container::Style::default()
    }
}

/// Brand-blue filled button
pub fn primary_button(_theme: &Theme, status: button::Status) -> button::Style {
    let background = match status {
        button::Status::Hovered | button::Status::Pressed => Color {
            a: 0.85,
            ..palette::PRIMARY
        },
        button::Status::Disabled => Color {
            a: 0.4,
            ..palette::PRIMARY
        },
        button::Status::Active => palette::PRIMARY,
    };

    button::Style {
        background: Some(Background::Color(background)),
        text_color: Color::WHITE,
        border: rounded(12.0),
        ..button::Style::default()
    }
}

/// Neutral gray button used for cancel affordances
pub fn cancel_button(_theme: &Theme, status: button::Status) -> button::Style {
    let background = match status {
        button::Status::Hovered | button::Status::Pressed => Color {
            a: 0.8,
            ..palette::CANCEL
        },
        _ => palette::CANCEL,
    };

    button::Style {
        background: Some(Background::Color(background)),
        text_color: Color::from_rgb(0.2, 0.2, 0.2),
        border: rounded(12.0),
        ..button::Style::default()
    }
}

/// White list row that highlights on hover
pub fn row_button(_theme: &Theme, status: button::Status) -> button::Style {
    let background = match status {
        button::Status::Hovered | button::Status::Pressed => palette::FIELD,
        _ => palette::SURFACE,
    };

    button::Style {
        background: Some(Background::Color(background)),
        text_color: palette::TEXT,
        border: rounded(12.0),
        ..button::Style::default()
    }
}

/// Secondary text color for hints and empty states
pub fn muted_text(_theme: &Theme) -> text::Style {
    text::Style {
        color: Some(palette::MUTED),
    }
}

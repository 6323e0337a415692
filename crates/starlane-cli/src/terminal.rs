//! Terminal styling and color utilities.
//!
//! ANSI escape codes and color detection for route output. Travel methods
//! get a reverse-video badge so legs can be scanned at a glance.

use starlane_lib::TravelMethod;

/// ANSI escape codes for text styling and colors.
pub mod colors {
    /// Reset all styling.
    pub const RESET: &str = "\x1b[0m";

    /// Bold reverse white for sublight legs.
    pub const TAG_SUBLIGHT: &str = "\x1b[1;7;37m";
    /// Bold reverse yellow for catapult legs.
    pub const TAG_CATAPULT: &str = "\x1b[1;7;33m";
    /// Bold reverse magenta for wormhole legs.
    pub const TAG_WORMHOLE: &str = "\x1b[1;7;35m";

    /// Bright bold white for system names.
    pub const WHITE_BOLD: &str = "\x1b[1;97m";
    /// Gray for secondary elements.
    pub const GRAY: &str = "\x1b[90m";
    /// Cyan for distances.
    pub const CYAN: &str = "\x1b[36m";
}

/// Resolved color codes, either ANSI sequences or empty strings.
#[derive(Debug, Clone, Copy)]
pub struct ColorPalette {
    pub reset: &'static str,
    pub tag_sublight: &'static str,
    pub tag_catapult: &'static str,
    pub tag_wormhole: &'static str,
    pub white_bold: &'static str,
    pub gray: &'static str,
    pub cyan: &'static str,
}

impl ColorPalette {
    #[must_use]
    pub const fn colored() -> Self {
        Self {
            reset: colors::RESET,
            tag_sublight: colors::TAG_SUBLIGHT,
            tag_catapult: colors::TAG_CATAPULT,
            tag_wormhole: colors::TAG_WORMHOLE,
            white_bold: colors::WHITE_BOLD,
            gray: colors::GRAY,
            cyan: colors::CYAN,
        }
    }

    #[must_use]
    pub const fn plain() -> Self {
        Self {
            reset: "",
            tag_sublight: "",
            tag_catapult: "",
            tag_wormhole: "",
            white_bold: "",
            gray: "",
            cyan: "",
        }
    }

    /// `colored()` when the terminal supports ANSI colors, otherwise `plain()`.
    #[must_use]
    pub fn detect() -> Self {
        if supports_color() {
            Self::colored()
        } else {
            Self::plain()
        }
    }

    /// Badge color for a travel method.
    pub fn method_tag(&self, method: TravelMethod) -> &'static str {
        match method {
            TravelMethod::Sublight => self.tag_sublight,
            TravelMethod::Catapult | TravelMethod::CatapultSublight => self.tag_catapult,
            TravelMethod::Wormhole => self.tag_wormhole,
        }
    }
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self::detect()
    }
}

/// Check if the terminal supports ANSI color codes.
///
/// Respects `NO_COLOR` (https://no-color.org/) and `TERM=dumb`.
#[must_use]
pub fn supports_color() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if let Ok(term) = std::env::var("TERM") {
        if term.eq_ignore_ascii_case("dumb") {
            return false;
        }
    }
    true
}

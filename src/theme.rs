use crate::settings;
use ratatui::style::Color;

/// The subset of base16 slots the reader draws with. `base_00`..`base_07`
/// run from page background to strongest text; the rest are accents
/// (red, yellow, green, blue).
#[derive(Clone, Debug)]
pub struct Base16Palette {
    pub base_00: Color,
    pub base_01: Color,
    pub base_02: Color,
    pub base_03: Color,
    pub base_04: Color,
    pub base_05: Color,
    pub base_06: Color,
    pub base_07: Color,
    pub base_08: Color,
    pub base_0a: Color,
    pub base_0b: Color,
    pub base_0d: Color,
}

const fn rgb(hex: u32) -> Color {
    Color::Rgb((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
}

static OCEANIC_NEXT: Base16Palette = Base16Palette {
    base_00: rgb(0x1B2B34),
    base_01: rgb(0x343D46),
    base_02: rgb(0x4F5B66),
    base_03: rgb(0x65737E),
    base_04: rgb(0xA7ADBA),
    base_05: rgb(0xC0C5CE),
    base_06: rgb(0xCDD3DE),
    base_07: rgb(0xF0F4F8),
    base_08: rgb(0xEC5F67),
    base_0a: rgb(0xFAC863),
    base_0b: rgb(0x99C794),
    base_0d: rgb(0x6699CC),
};

static SOLARIZED_LIGHT: Base16Palette = Base16Palette {
    base_00: rgb(0xFDF6E3),
    base_01: rgb(0xEEE8D5),
    base_02: rgb(0x93A1A1),
    base_03: rgb(0x839496),
    base_04: rgb(0x657B83),
    base_05: rgb(0x586E75),
    base_06: rgb(0x073642),
    base_07: rgb(0x002B36),
    base_08: rgb(0xDC322F),
    base_0a: rgb(0xB58900),
    base_0b: rgb(0x859900),
    base_0d: rgb(0x268BD2),
};

pub fn current_theme() -> &'static Base16Palette {
    if settings::is_dark_theme() {
        &OCEANIC_NEXT
    } else {
        &SOLARIZED_LIGHT
    }
}

pub fn toggle_theme() {
    settings::set_dark_theme(!settings::is_dark_theme());
}

impl Base16Palette {
    /// (text, border, background) of a reading pane.
    pub fn get_panel_colors(&self, focused: bool) -> (Color, Color, Color) {
        if focused {
            (self.base_07, self.base_04, self.base_00)
        } else {
            (self.base_05, self.base_03, self.base_00)
        }
    }

    /// (background, foreground) of the highlighted menu row.
    pub fn get_selection_colors(&self, focused: bool) -> (Color, Color) {
        let fg = if focused { self.base_06 } else { self.base_03 };
        (self.base_02, fg)
    }
}

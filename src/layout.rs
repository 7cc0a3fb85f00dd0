use log::debug;

/// Minimum width of either split panel, in the host's length unit.
pub const DEFAULT_MIN_PANEL_WIDTH: f32 = 350.0;
pub const DEFAULT_LEFT_PERCENT: f32 = 50.0;

/// Left/right proportion of the split view. Pure presentation state; it
/// never touches navigation or versions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitLayout {
    left_percent: f32,
    min_panel_width: f32,
}

impl Default for SplitLayout {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_PANEL_WIDTH)
    }
}

impl SplitLayout {
    pub fn new(min_panel_width: f32) -> Self {
        Self {
            left_percent: DEFAULT_LEFT_PERCENT,
            min_panel_width: min_panel_width.max(0.0),
        }
    }

    pub fn left_percent(&self) -> f32 {
        self.left_percent
    }

    pub fn right_percent(&self) -> f32 {
        100.0 - self.left_percent
    }

    pub fn min_panel_width(&self) -> f32 {
        self.min_panel_width
    }

    pub fn left_width(&self, available: f32) -> f32 {
        available * self.left_percent / 100.0
    }

    /// Moves the divider to `left_width` units from the left edge, clamped so
    /// both panels keep the minimum width. Returns the new left percentage.
    pub fn drag_to(&mut self, left_width: f32, available: f32) -> f32 {
        if available.is_nan() || available <= 0.0 || !left_width.is_finite() {
            return self.left_percent;
        }

        self.left_percent = if available < 2.0 * self.min_panel_width {
            DEFAULT_LEFT_PERCENT
        } else {
            let clamped = left_width.clamp(self.min_panel_width, available - self.min_panel_width);
            clamped / available * 100.0
        };
        debug!("Split divider at {:.1}%", self.left_percent);
        self.left_percent
    }

    /// Keyboard variant of [`drag_to`](Self::drag_to).
    pub fn resize_by(&mut self, delta: f32, available: f32) -> f32 {
        let current = self.left_width(available);
        self.drag_to(current + delta, available)
    }

    /// Applies a persisted percentage. Out-of-range values are ignored.
    pub fn restore(&mut self, percent: f32) -> bool {
        if percent.is_finite() && percent > 0.0 && percent < 100.0 {
            self.left_percent = percent;
            true
        } else {
            debug!("Ignoring persisted split ratio {percent}");
            false
        }
    }

    /// Splits `available` whole cells into left and right widths, keeping the
    /// minimum on both sides when there is room for it.
    pub fn split_cells(&self, available: u16) -> (u16, u16) {
        let total = f32::from(available);
        let min = self.min_panel_width;
        let left = if total < 2.0 * min {
            total / 2.0
        } else {
            self.left_width(total).clamp(min, total - min)
        };
        let left = (left.round() as u16).min(available);
        (left, available - left)
    }
}

/// Formats a percentage the way it is persisted, e.g. `"62.5%"`.
pub fn format_ratio(percent: f32) -> String {
    format!("{percent:.1}%")
}

pub fn parse_ratio(value: &str) -> Option<f32> {
    value.trim().trim_end_matches('%').trim().parse::<f32>().ok()
}

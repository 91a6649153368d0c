//! Terminal stylesheet. Every style is plain until `Styles::colored` is used.

use owo_colors::Style;

use crate::domain::state::StatusKind;

#[derive(Default, Clone)]
pub struct Styles {
    pub success: Style,
    pub warning: Style,
    pub info: Style,
    /// Setting keys and field labels.
    pub dim: Style,
    pub header: Style,
}

impl Styles {
    #[must_use]
    pub fn colored() -> Self {
        Self {
            success: Style::new().green(),
            warning: Style::new().yellow(),
            info: Style::new().blue(),
            dim: Style::new().dimmed(),
            header: Style::new().bold().cyan(),
        }
    }

    /// Style for a status category tag.
    #[must_use]
    pub fn status(&self, kind: StatusKind) -> Style {
        match kind {
            StatusKind::Active => self.success,
            StatusKind::Blocked => self.warning,
            StatusKind::Waiting | StatusKind::Maintenance => self.info,
            StatusKind::Unknown => self.dim,
        }
    }
}

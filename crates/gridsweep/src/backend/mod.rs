//! Drawing backends for planned figures.

#[cfg(feature = "gui")]
mod egui;
mod terminal;

#[cfg(feature = "gui")]
pub use egui::EguiBackend;
pub use terminal::FigureWidget;
#[cfg(feature = "native")]
pub use terminal::TerminalBackend;

use crate::error::Result;
use crate::plot::Figure;

/// Something that can put a [`Figure`] in front of the user.
pub trait ChartBackend {
    /// Display `figure`, returning once the user closes it.
    fn show(&mut self, figure: &Figure) -> Result<()>;
}

//! Terminal rendering with ratatui `Chart` widgets, one per facet.

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, LegendPosition, Paragraph, Widget},
};

use crate::plot::format::{tick_label, tick_positions};
use crate::plot::{Facet, Figure, PlotKind};

/// Series colors, cycled by series index.
const PALETTE: [Color; 6] = [
    Color::Cyan,
    Color::Yellow,
    Color::Green,
    Color::Magenta,
    Color::LightRed,
    Color::LightBlue,
];

const TICKS: usize = 3;

/// Widget drawing a whole [`Figure`]: an optional title line above a grid of
/// facet charts sharing the figure's axis ranges.
pub struct FigureWidget<'a> {
    figure: &'a Figure,
    show_legend: bool,
}

impl<'a> FigureWidget<'a> {
    pub fn new(figure: &'a Figure) -> Self {
        Self {
            figure,
            show_legend: figure.legend,
        }
    }

    #[must_use]
    pub fn show_legend(mut self, show: bool) -> Self {
        self.show_legend = show;
        self
    }
}

impl Widget for FigureWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let figure = self.figure;
        let grid_area = match &figure.title {
            Some(title) => {
                let [title_area, rest] =
                    Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).areas(area);
                Paragraph::new(title.as_str().bold())
                    .alignment(Alignment::Center)
                    .render(title_area, buf);
                rest
            }
            None => area,
        };

        if figure.nrows == 0 || figure.ncols == 0 {
            Paragraph::new("No data to display.".dark_gray()).render(grid_area, buf);
            return;
        }

        let rows = Layout::vertical(vec![
            Constraint::Ratio(1, figure.nrows as u32);
            figure.nrows
        ])
        .split(grid_area);
        for (i, row_area) in rows.iter().enumerate() {
            let cols = Layout::horizontal(vec![
                Constraint::Ratio(1, figure.ncols as u32);
                figure.ncols
            ])
            .split(*row_area);
            for (j, cell) in cols.iter().enumerate() {
                if let Some(facet) = figure.facet(i, j) {
                    render_facet(figure, facet, self.show_legend, *cell, buf);
                }
            }
        }
    }
}

/// Owned point buffers for one facet; ratatui datasets borrow from these.
struct FacetData {
    series: Vec<(Option<String>, Color, Vec<(f64, f64)>)>,
    error_bars: Vec<(Color, [(f64, f64); 2])>,
    reference: Vec<[(f64, f64); 2]>,
}

impl FacetData {
    fn new(figure: &Figure, facet: &Facet) -> Self {
        let mut series = Vec::with_capacity(facet.series.len());
        let mut error_bars = Vec::new();
        for (k, s) in facet.series.iter().enumerate() {
            let color = PALETTE[k % PALETTE.len()];
            let name = s.label.as_ref().map(|label| match &figure.legend_title {
                Some(z) => format!("{z} = {label}"),
                None => label.clone(),
            });
            series.push((name, color, s.points.clone()));
            error_bars.extend(
                s.error_bars()
                    .map(|(x, lo, hi)| (color, [(x, lo), (x, hi)])),
            );
        }

        let (x0, x1) = figure.x_range;
        let (y0, y1) = figure.y_range;
        let reference = figure
            .hlines
            .iter()
            .map(|&y| [(x0, y), (x1, y)])
            .chain(figure.vlines.iter().map(|&x| [(x, y0), (x, y1)]))
            .collect();

        Self {
            series,
            error_bars,
            reference,
        }
    }
}

fn axis_labels(range: (f64, f64), log: bool, hidden: bool) -> Vec<Span<'static>> {
    if hidden {
        return Vec::new();
    }
    tick_positions(range.0, range.1, TICKS)
        .into_iter()
        .map(|v| Span::raw(tick_label(v, log)))
        .collect()
}

fn render_facet(figure: &Figure, facet: &Facet, show_legend: bool, area: Rect, buf: &mut Buffer) {
    let data = FacetData::new(figure, facet);
    let (graph_type, marker) = match figure.kind {
        PlotKind::Line => (GraphType::Line, symbols::Marker::Braille),
        PlotKind::Scatter => (GraphType::Scatter, symbols::Marker::Dot),
    };

    let mut datasets: Vec<Dataset> = data
        .reference
        .iter()
        .map(|line| {
            Dataset::default()
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(Color::DarkGray))
                .data(line)
        })
        .collect();
    datasets.extend(data.error_bars.iter().map(|(color, bar)| {
        Dataset::default()
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(*color).add_modifier(Modifier::DIM))
            .data(bar)
    }));
    for (name, color, points) in &data.series {
        let mut dataset = Dataset::default()
            .marker(marker)
            .graph_type(graph_type)
            .style(Style::default().fg(*color))
            .data(points);
        if let (true, Some(name)) = (show_legend, name) {
            dataset = dataset.name(name.clone());
        }
        datasets.push(dataset);
    }

    let mut block = Block::default().borders(Borders::ALL);
    if let Some(title) = &facet.title {
        block = block.title(Line::from(title.as_str().bold()).centered());
    }
    if let (true, Some(ytitle)) = (facet.ytitle_right, &facet.ytitle) {
        block = block.title(Line::from(ytitle.as_str().italic()).right_aligned());
    }

    let mut x_axis = Axis::default()
        .bounds([figure.x_range.0, figure.x_range.1])
        .labels(axis_labels(figure.x_range, figure.xlog, facet.hide_xticklabels));
    if let Some(xtitle) = &facet.xtitle {
        x_axis = x_axis.title(xtitle.as_str().dark_gray());
    }
    let mut y_axis = Axis::default()
        .bounds([figure.y_range.0, figure.y_range.1])
        .labels(axis_labels(figure.y_range, figure.ylog, facet.hide_yticklabels));
    if let (false, Some(ytitle)) = (facet.ytitle_right, &facet.ytitle) {
        y_axis = y_axis.title(ytitle.as_str().dark_gray());
    }

    let legend = if show_legend {
        Some(LegendPosition::TopRight)
    } else {
        None
    };
    Chart::new(datasets)
        .block(block)
        .x_axis(x_axis)
        .y_axis(y_axis)
        .legend_position(legend)
        .render(area, buf);
}

/// Shows figures in the terminal until the user quits.
#[cfg(feature = "native")]
#[derive(Debug, Default)]
pub struct TerminalBackend;

#[cfg(feature = "native")]
impl super::ChartBackend for TerminalBackend {
    fn show(&mut self, figure: &Figure) -> crate::error::Result<()> {
        let mut viewer = crate::viewer::Viewer::new(figure);
        ratatui::run(|terminal| viewer.run(terminal))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plot::{PlotSpec, auto_lineplot};
    use gridsweep_core::Dataset as SweepDataset;
    use ratatui::{Terminal, backend::TestBackend};

    fn render(figure: &Figure, width: u16, height: u16) -> Vec<String> {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal
            .draw(|frame| frame.render_widget(FigureWidget::new(figure), frame.area()))
            .unwrap();
        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect())
            .collect()
    }

    fn faceted() -> Figure {
        let ds = SweepDataset::new()
            .with_coord("t", [0, 1, 2, 3])
            .unwrap()
            .with_coord("k", [1, 2])
            .unwrap()
            .with_var("v", ["k", "t"], [0.0, 1.0, 2.0, 3.0, 0.0, 2.0, 4.0, 6.0])
            .unwrap();
        Figure::plan(&ds, &PlotSpec::line("t", "v").with_col("k").with_title("growth")).unwrap()
    }

    #[test]
    fn test_renders_column_titles() {
        let lines = render(&faceted(), 80, 20);
        assert!(lines[0].contains("growth"));
        assert!(lines.iter().any(|l| l.contains("k = 1")));
        assert!(lines.iter().any(|l| l.contains("k = 2")));
    }

    #[test]
    fn test_second_column_hides_y_ticks() {
        let lines = render(&faceted(), 80, 20);
        let left_half: String = lines.iter().map(|l| l.chars().take(40).collect::<String>()).collect();
        let right_half: String = lines.iter().map(|l| l.chars().skip(40).collect::<String>()).collect();
        // Top y tick is the padded maximum, 6.3.
        assert!(left_half.contains("6.3"));
        assert!(!right_half.contains("6.3"));
    }

    #[test]
    fn test_legend_names_series() {
        let fig = auto_lineplot(None, &[vec![1.0, 2.0, 3.0], vec![3.0, 2.0, 1.0]]).unwrap();
        let lines = render(&fig, 100, 30);
        assert!(lines.iter().any(|l| l.contains("z = 0")));
        assert!(lines.iter().any(|l| l.contains("z = 1")));
    }

    #[test]
    fn test_tiny_area_does_not_panic() {
        render(&faceted(), 10, 5);
    }
}

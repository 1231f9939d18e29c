use eframe::egui;
use egui_plot::{HLine, Legend, Line, Plot, PlotPoints, Points, VLine};

use super::ChartBackend;
use crate::error::{PlotError, Result};
use crate::plot::{Facet, Figure, PlotKind};

/// Opens a native window with one egui plot per facet.
#[derive(Debug, Default)]
pub struct EguiBackend {
    window_title: Option<String>,
}

impl EguiBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn window_title(mut self, title: impl Into<String>) -> Self {
        self.window_title = Some(title.into());
        self
    }
}

impl ChartBackend for EguiBackend {
    fn show(&mut self, figure: &Figure) -> Result<()> {
        let title = self
            .window_title
            .clone()
            .or_else(|| figure.title.clone())
            .unwrap_or_else(|| "gridsweep".to_string());
        let app = FigureApp {
            figure: figure.clone(),
        };
        eframe::run_native(
            &title,
            eframe::NativeOptions::default(),
            Box::new(|_cc| Ok(Box::new(app))),
        )
        .map_err(|e| PlotError::Backend(e.to_string()))
    }
}

struct FigureApp {
    figure: Figure,
}

impl FigureApp {
    fn facet_plot(&self, ui: &mut egui::Ui, facet: &Facet, width: f32, height: f32) {
        let figure = &self.figure;
        let show_x = !facet.hide_xticklabels;
        let show_y = !facet.hide_yticklabels;

        let mut plot = Plot::new(("facet", facet.row, facet.col))
            .width(width)
            .height(height)
            .include_x(figure.x_range.0)
            .include_x(figure.x_range.1)
            .include_y(figure.y_range.0)
            .include_y(figure.y_range.1)
            .show_axes([show_x, show_y]);
        if figure.legend {
            plot = plot.legend(Legend::default());
        }
        if let Some(xtitle) = &facet.xtitle {
            plot = plot.x_axis_label(axis_title(xtitle, figure.xlog));
        }
        if let (false, Some(ytitle)) = (facet.ytitle_right, &facet.ytitle) {
            plot = plot.y_axis_label(axis_title(ytitle, figure.ylog));
        }

        plot.show(ui, |plot_ui| {
            for &y in &figure.hlines {
                plot_ui.hline(HLine::new(y).color(egui::Color32::GRAY));
            }
            for &x in &figure.vlines {
                plot_ui.vline(VLine::new(x).color(egui::Color32::GRAY));
            }
            for series in &facet.series {
                let name = match (&series.label, &figure.legend_title) {
                    (Some(label), Some(z)) => format!("{z} = {label}"),
                    (Some(label), None) => label.clone(),
                    (None, _) => String::new(),
                };
                let points: PlotPoints = series.points.iter().map(|&(x, y)| [x, y]).collect();
                match figure.kind {
                    PlotKind::Line => plot_ui.line(Line::new(points).name(&name)),
                    PlotKind::Scatter => plot_ui.points(Points::new(points).radius(2.5).name(&name)),
                }
                for (x, lo, hi) in series.error_bars() {
                    plot_ui.line(Line::new(PlotPoints::new(vec![[x, lo], [x, hi]])).name(&name));
                }
            }
        });
    }
}

/// Log axes hold `log10` of the data.
fn axis_title(title: &str, log: bool) -> String {
    if log {
        format!("log₁₀ {title}")
    } else {
        title.to_string()
    }
}

impl eframe::App for FigureApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let figure = &self.figure;
            if let Some(title) = &figure.title {
                ui.vertical_centered(|ui| ui.heading(title));
            }
            let spacing = ui.spacing().item_spacing;
            let width = ui.available_width() / figure.ncols.max(1) as f32 - spacing.x;
            let height = ui.available_height() / figure.nrows.max(1) as f32 - spacing.y - 24.0;

            egui::Grid::new("facets").show(ui, |ui| {
                for row in 0..figure.nrows {
                    for col in 0..figure.ncols {
                        if let Some(facet) = figure.facet(row, col) {
                            ui.vertical(|ui| {
                                ui.horizontal(|ui| {
                                    if let Some(title) = &facet.title {
                                        ui.strong(title);
                                    }
                                    if let (true, Some(ytitle)) = (facet.ytitle_right, &facet.ytitle) {
                                        ui.with_layout(
                                            egui::Layout::right_to_left(egui::Align::Center),
                                            |ui| ui.label(ytitle),
                                        );
                                    }
                                });
                                self.facet_plot(ui, facet, width, height.max(60.0));
                            });
                        }
                    }
                    ui.end_row();
                }
            });
        });
    }
}

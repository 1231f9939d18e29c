use std::io;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    DefaultTerminal, Frame,
    layout::{Constraint, Layout},
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::backend::FigureWidget;
use crate::plot::Figure;

/// Interactive terminal view of one figure.
pub struct Viewer<'a> {
    figure: &'a Figure,
    show_legend: bool,
    exit: bool,
}

impl<'a> Viewer<'a> {
    pub fn new(figure: &'a Figure) -> Self {
        Self {
            figure,
            show_legend: figure.legend,
            exit: false,
        }
    }

    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> io::Result<()> {
        tracing::info!(points = self.figure.point_count(), "showing figure");
        while !self.exit {
            terminal.draw(|frame| self.draw(frame))?;
            self.handle_events()?;
        }
        Ok(())
    }

    pub fn draw(&self, frame: &mut Frame) {
        let [plot_area, status_area] =
            Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(frame.area());

        frame.render_widget(
            FigureWidget::new(self.figure).show_legend(self.show_legend),
            plot_area,
        );

        let key = Style::default().fg(Color::Yellow);
        let status = Line::from(vec![
            Span::styled(" q", key),
            Span::raw(" quit  "),
            Span::styled("l", key),
            Span::raw(if self.show_legend {
                " hide legend"
            } else {
                " show legend"
            }),
        ]);
        frame.render_widget(
            Paragraph::new(status).style(Style::default().fg(Color::DarkGray)),
            status_area,
        );
    }

    fn handle_events(&mut self) -> io::Result<()> {
        match event::read()? {
            Event::Key(key_event) if key_event.kind == KeyEventKind::Press => {
                self.handle_key_event(key_event)
            }
            _ => {}
        };
        Ok(())
    }

    pub fn handle_key_event(&mut self, key_event: KeyEvent) {
        match key_event.code {
            KeyCode::Char('q') | KeyCode::Esc => self.exit = true,
            KeyCode::Char('c') if key_event.modifiers.contains(KeyModifiers::CONTROL) => {
                self.exit = true;
            }
            KeyCode::Char('l') => self.show_legend = !self.show_legend,
            _ => {}
        }
    }

    pub fn should_exit(&self) -> bool {
        self.exit
    }
}

use super::types::{Action, Data, View};
use super::ViewComponent;
use crate::backend::types::PostContext;
use color_eyre::Result;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Style, Stylize};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, List, ListState, Padding, Paragraph};
use ratatui::Frame;

pub struct RootComponent {
    context: PostContext,
    state: ListState,
    notice: Option<String>,
}

impl RootComponent {
    pub fn new(context: PostContext) -> Self {
        Self {
            context,
            state: ListState::default().with_selected(Some(0)),
            notice: None,
        }
    }
}

impl ViewComponent for RootComponent {
    fn view(&self) -> View {
        View::Root
    }
    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        Ok(match action {
            Action::Enter => Some(Action::NewThread),
            Action::Update(data) => match *data {
                Data::Notice(notice) => {
                    self.notice = Some(notice);
                    Some(Action::Render)
                }
                _ => None,
            },
            _ => None,
        })
    }
    fn draw(&mut self, f: &mut Frame<'_>, area: Rect) -> Result<()> {
        let [header, account, list, notice] = Layout::vertical([
            Constraint::Length(2),
            Constraint::Length(2),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .areas(area);
        f.render_widget(
            Paragraph::new("Threads").bold().block(
                Block::default()
                    .borders(Borders::BOTTOM)
                    .border_style(Color::Gray)
                    .padding(Padding::horizontal(1)),
            ),
            header,
        );
        let mut spans = vec![
            Span::from(" posting as ").dim(),
            Span::from(self.context.account_id.as_str()).bold(),
        ];
        if let Some(community) = &self.context.community_id {
            spans.push(Span::from(" in ").dim());
            spans.push(Span::from(community.as_str()).bold());
        }
        f.render_widget(Text::from(Line::from(spans)), account);
        f.render_stateful_widget(
            List::new([Line::from("+ New thread")])
                .block(Block::default().padding(Padding::horizontal(1)))
                .highlight_style(Style::default().reversed()),
            list,
            &mut self.state,
        );
        if let Some(text) = &self.notice {
            f.render_widget(Line::from(format!(" {text}")).green(), notice);
        }
        Ok(())
    }
}

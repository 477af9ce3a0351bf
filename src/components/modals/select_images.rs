use super::super::views::types::Action as ViewsAction;
use super::types::Action;
use super::ModalComponent;
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use directories::UserDirs;
use image::ImageFormat;
use ratatui::layout::{Constraint, Layout, Margin, Rect};
use ratatui::style::{Color, Style, Stylize};
use ratatui::text::Line;
use ratatui::widgets::{Block, Clear};
use ratatui::Frame;
use std::path::PathBuf;
use tui_textarea::TextArea;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Paths,
    Ok,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    None,
    Ok,
    /// Every path is a file, but some don't look like images.
    Warn,
    Error,
}

/// Picks image files by path, one per line.
pub struct SelectImagesModalComponent {
    paths: TextArea<'static>,
    focus: Focus,
    state: State,
}

impl SelectImagesModalComponent {
    pub fn new() -> Self {
        let mut paths = TextArea::default();
        paths.set_block(Block::bordered().title("Paths (one per line)"));
        paths.set_cursor_line_style(Style::default());
        Self {
            paths,
            focus: Focus::Paths,
            state: State::None,
        }
    }
    fn selected(&self) -> Vec<PathBuf> {
        parse_paths(self.paths.lines())
    }
    fn update_state(&mut self) {
        self.state = check_paths(&self.selected());
        if let Some(block) = self.paths.block() {
            let block = block.clone();
            self.paths.set_block(match self.state {
                State::None => block.border_style(Color::Reset),
                State::Ok => block.border_style(Color::Green),
                State::Warn => block.border_style(Color::Yellow),
                State::Error => block.border_style(Color::Red),
            });
        }
    }
    fn update_focus(&mut self, focus: Focus) {
        self.focus = focus;
        let (cursor_style, dim) = match focus {
            Focus::Paths => (Style::default().reversed(), false),
            Focus::Ok => (Style::default(), true),
        };
        self.paths.set_cursor_style(cursor_style);
        if let Some(block) = self.paths.block() {
            let block = block.clone();
            self.paths
                .set_block(if dim { block.dim() } else { block.not_dim() });
        }
    }
}

impl ModalComponent for SelectImagesModalComponent {
    fn handle_key_events(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.focus != Focus::Paths
            || matches!(key.code, KeyCode::Tab | KeyCode::BackTab | KeyCode::Esc)
        {
            return Ok(None);
        }
        let cursor = self.paths.cursor();
        Ok(if self.paths.input(key) {
            self.update_state();
            Some(Action::Render)
        } else if self.paths.cursor() != cursor {
            Some(Action::Render)
        } else {
            None
        })
    }
    fn update(&mut self, action: ViewsAction) -> Result<Option<Action>> {
        Ok(match action {
            ViewsAction::NextInput | ViewsAction::NextItem if self.focus == Focus::Paths => {
                self.update_focus(Focus::Ok);
                Some(Action::Render)
            }
            ViewsAction::PrevInput | ViewsAction::PrevItem if self.focus == Focus::Ok => {
                self.update_focus(Focus::Paths);
                Some(Action::Render)
            }
            ViewsAction::Enter if self.focus == Focus::Ok => match self.state {
                State::Ok | State::Warn => Some(Action::Ok(self.selected())),
                _ => None,
            },
            ViewsAction::Back => Some(Action::Cancel),
            _ => None,
        })
    }
    fn draw(&mut self, f: &mut Frame<'_>, area: Rect) -> Result<()> {
        let area = area.inner(Margin {
            horizontal: 2,
            vertical: 1,
        });
        let [area] = Layout::vertical([Constraint::Length(12)]).areas(area);

        let block = Block::bordered().title("Select images");
        let inner = block.inner(area);
        f.render_widget(Clear, area);
        f.render_widget(block, area);

        let [paths, hint, ok] = Layout::vertical([
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(inner);
        let hint_line = match self.state {
            State::Warn => Line::from("some files don't look like images").yellow(),
            State::Error => Line::from("file not found").red(),
            _ => Line::from(format!("{} selected", self.selected().len())).dim(),
        };
        let mut line = Line::from("OK").centered();
        if matches!(self.state, State::Ok | State::Warn) {
            line = line.blue();
        } else {
            line = line.dim();
        }
        if self.focus == Focus::Ok {
            line = line.reversed();
        }
        f.render_widget(&self.paths, paths);
        f.render_widget(hint_line, hint);
        f.render_widget(line, ok);
        Ok(())
    }
}

fn parse_paths(lines: &[String]) -> Vec<PathBuf> {
    let home = UserDirs::new().map(|dirs| dirs.home_dir().to_path_buf());
    lines
        .iter()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .map(|line| match (line.strip_prefix("~/"), &home) {
            (Some(rest), Some(home)) => home.join(rest),
            _ => PathBuf::from(line),
        })
        .collect()
}

fn check_paths(paths: &[PathBuf]) -> State {
    if paths.is_empty() {
        State::None
    } else if !paths.iter().all(|path| path.is_file()) {
        State::Error
    } else if !paths.iter().all(|path| ImageFormat::from_path(path).is_ok()) {
        State::Warn
    } else {
        State::Ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn parse() {
        let lines = vec![
            String::from(" /tmp/a.png "),
            String::new(),
            String::from("b.jpg"),
        ];
        assert_eq!(
            parse_paths(&lines),
            vec![PathBuf::from("/tmp/a.png"), PathBuf::from("b.jpg")]
        );
    }

    #[test]
    fn check() {
        let dir = TempDir::new().expect("failed to create temp dir");
        let png = dir.path().join("a.png");
        let txt = dir.path().join("a.txt");
        fs::write(&png, b"").expect("failed to write");
        fs::write(&txt, b"").expect("failed to write");
        assert_eq!(check_paths(&[]), State::None);
        assert_eq!(check_paths(&[png.clone()]), State::Ok);
        assert_eq!(check_paths(&[png.clone(), txt]), State::Warn);
        assert_eq!(check_paths(&[png, dir.path().join("missing.png")]), State::Error);
    }

    #[test]
    fn ok_returns_paths() {
        let dir = TempDir::new().expect("failed to create temp dir");
        let png = dir.path().join("a.png");
        fs::write(&png, b"").expect("failed to write");
        let mut modal = SelectImagesModalComponent::new();
        modal.paths.insert_str(png.to_string_lossy());
        modal.update_state();
        // nothing happens while the paths are focused
        assert_eq!(modal.update(ViewsAction::Enter).expect("update"), None);
        assert_eq!(
            modal.update(ViewsAction::NextInput).expect("update"),
            Some(Action::Render)
        );
        assert_eq!(
            modal.update(ViewsAction::Enter).expect("update"),
            Some(Action::Ok(vec![png]))
        );
        assert_eq!(
            modal.update(ViewsAction::Back).expect("update"),
            Some(Action::Cancel)
        );
    }
}

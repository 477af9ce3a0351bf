use crate::components::views::types::Action as ViewAction;
use crossterm::event::KeyEvent;

#[derive(Debug, Clone)]
pub enum Action {
    Error(String),
    Quit,
    Suspend,
    Resume,
    Tick(usize),
    Render,
    View(ViewAction),
    /// Sent by a background task of the view with the given id.
    ViewTask(usize, ViewAction),
}

#[derive(Debug, Clone)]
pub enum Event {
    Tick(usize),
    Render,
    Key(KeyEvent),
    Resize(u16, u16),
    Error(String),
}

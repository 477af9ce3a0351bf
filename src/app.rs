use crate::backend::types::PostContext;
use crate::backend::Backend;
use crate::components::main::MainComponent;
use crate::components::Component;
use crate::config::{Config, Key};
use crate::tui::{io, Tui};
use crate::types::{Action, Event};
use color_eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::sync::mpsc;

pub struct App {
    config: Config,
    backend: Backend,
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        log::debug!("App::new({config:?})");
        let backend = Backend::from_config(&config)?;
        Ok(Self { config, backend })
    }
    pub async fn run(&mut self) -> Result<()> {
        let (action_tx, mut action_rx) = mpsc::unbounded_channel();

        let terminal = Terminal::new(CrosstermBackend::new(io()))?;
        log::debug!("terminal size: {:?}", terminal.size()?);
        let mut tui = Tui::new(terminal);
        tui.start()?;

        let context = PostContext {
            account_id: self.config.account.id.clone(),
            community_id: self.config.account.community.clone(),
        };
        let mut main_component = MainComponent::new(
            self.config.clone(),
            self.backend.clone(),
            context,
            action_tx.clone(),
        );
        main_component.init(tui.size()?)?;

        let mut should_quit = false;
        loop {
            tokio::select! {
                Some(e) = tui.next_event() => {
                    let action = match self.handle_events(&e) {
                        Some(action) => Some(action),
                        None => main_component.handle_events(Some(e))?,
                    };
                    if let Some(action) = action {
                        action_tx.send(action)?;
                    }
                }
                Some(action) = action_rx.recv() => {
                    if !matches!(action, Action::Tick(_) | Action::Render) {
                        log::info!("Action {action:?}");
                    }
                    match action {
                        Action::Quit => should_quit = true,
                        Action::Suspend => {
                            tui.suspend()?;
                            action_tx.send(Action::Resume)?;
                        }
                        Action::Resume => tui.resume()?,
                        Action::Tick(_) => {}
                        Action::Error(e) => log::error!("{e}"),
                        Action::Render => {
                            tui.draw(|f| {
                                let area = f.area();
                                if let Err(e) = main_component.draw(f, area) {
                                    if let Err(e) =
                                        action_tx.send(Action::Error(format!("failed to draw: {e:?}")))
                                    {
                                        log::error!("failed to send error: {e}");
                                    }
                                }
                            })?;
                        }
                        _ => {
                            if let Some(action) = main_component.update(action)? {
                                action_tx.send(action)?;
                            }
                        }
                    }
                }
            }
            if should_quit {
                break;
            }
        }
        tui.end()?;
        Ok(())
    }
    fn handle_events(&self, event: &Event) -> Option<Action> {
        match event {
            Event::Tick(i) => Some(Action::Tick(*i)),
            Event::Render | Event::Resize(_, _) => Some(Action::Render),
            Event::Key(key_event) => self.handle_key_events(*key_event),
            Event::Error(e) => Some(Action::Error(e.clone())),
        }
    }
    fn handle_key_events(&self, key_event: KeyEvent) -> Option<Action> {
        self.config
            .keybindings
            .global
            .get(&Key::from(key_event))
            .map(Action::from)
    }
}

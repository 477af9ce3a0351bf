use super::views::types::{Action as ViewAction, Transition, View};
use super::views::{NewThreadViewComponent, RootComponent, ViewComponent};
use super::Component;
use crate::backend::types::PostContext;
use crate::backend::Backend;
use crate::config::{Config, Key};
use crate::types::Action;
use color_eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::layout::{Rect, Size};
use ratatui::Frame;
use tokio::sync::mpsc::{self, UnboundedSender};

/// Owns the stack of views. The bottom of the stack is always the root view.
/// Each view gets an id, so results of background tasks only reach the view
/// that started them.
pub struct MainComponent {
    views: Vec<(usize, Box<dyn ViewComponent>)>,
    next_id: usize,
    config: Config,
    backend: Backend,
    context: PostContext,
    action_tx: UnboundedSender<Action>,
}

impl MainComponent {
    pub fn new(
        config: Config,
        backend: Backend,
        context: PostContext,
        action_tx: UnboundedSender<Action>,
    ) -> Self {
        Self {
            views: Vec::new(),
            next_id: 0,
            config,
            backend,
            context,
            action_tx,
        }
    }
    pub(crate) fn transition(&mut self, transition: &Transition) -> Result<Option<Action>> {
        match transition {
            Transition::Push(view) => {
                let next = self.view(view);
                self.views.push(next);
            }
            Transition::Pop => {
                if self.views.len() > 1 {
                    self.views.pop();
                }
            }
            Transition::Root => {
                self.views.truncate(1);
            }
        }
        Ok(Some(Action::Render))
    }
    fn view(&mut self, view: &View) -> (usize, Box<dyn ViewComponent>) {
        let id = self.next_id;
        self.next_id += 1;
        let component: Box<dyn ViewComponent> = match view {
            View::Root => Box::new(RootComponent::new(self.context.clone())),
            View::NewThread => Box::new(NewThreadViewComponent::new(
                self.view_tx(id),
                self.backend.clone(),
                self.context.clone(),
            )),
        };
        (id, component)
    }
    /// A sender for the view's background tasks. It lives as long as the
    /// view or any of its tasks holds a clone.
    fn view_tx(&self, id: usize) -> UnboundedSender<ViewAction> {
        let (view_tx, mut view_rx) = mpsc::unbounded_channel();
        let action_tx = self.action_tx.clone();
        tokio::spawn(async move {
            while let Some(action) = view_rx.recv().await {
                if let Err(e) = action_tx.send(Action::ViewTask(id, action)) {
                    log::error!("failed to send view action: {e}");
                    break;
                }
            }
        });
        view_tx
    }
    fn current(&self) -> Option<View> {
        self.views.last().map(|(_, view)| view.view())
    }
}

impl Component for MainComponent {
    fn init(&mut self, _size: Size) -> Result<()> {
        let root = self.view(&View::Root);
        self.views = vec![root];
        Ok(())
    }
    fn handle_key_events(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if let Some((_, view)) = self.views.last_mut() {
            if let Some(action) = view.handle_key_events(key)? {
                return Ok(Some(Action::View(action)));
            }
        }
        Ok(self
            .config
            .keybindings
            .view
            .get(&Key::from(key))
            .map(|action| Action::View(action.into())))
    }
    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        let view_action = match action {
            Action::View(view_action) => view_action,
            Action::ViewTask(id, view_action) => {
                if self.views.last().map(|(top, _)| *top) != Some(id) {
                    log::debug!("dropping {view_action:?} from closed view {id}");
                    return Ok(None);
                }
                view_action
            }
            _ => return Ok(None),
        };
        match view_action {
            ViewAction::Render => return Ok(Some(Action::Render)),
            ViewAction::Transition(transition) => return self.transition(&transition),
            ViewAction::NewThread => {
                if self.current() != Some(View::NewThread) {
                    return self.transition(&Transition::Push(Box::new(View::NewThread)));
                }
                return Ok(None);
            }
            _ => {}
        }
        let Some((_, view)) = self.views.last_mut() else {
            return Ok(None);
        };
        Ok(match view.update(view_action)? {
            Some(ViewAction::Transition(transition)) => self.transition(&transition)?,
            Some(ViewAction::Render) => Some(Action::Render),
            action => action.map(Action::View),
        })
    }
    fn draw(&mut self, f: &mut Frame<'_>, area: Rect) -> Result<()> {
        if let Some((_, view)) = self.views.last_mut() {
            view.draw(f, area)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::form::tests::attachment;
    use crate::backend::submit::tests::{FakeStore, FakeUploader};
    use crate::components::views::types::Data;
    use crossterm::event::{KeyCode, KeyModifiers};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::mpsc::UnboundedReceiver;
    use tokio::time;

    fn main_component(store: FakeStore) -> (MainComponent, UnboundedReceiver<Action>) {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let backend = Backend::new(
            Arc::new(FakeUploader::default()),
            Arc::new(store),
            1,
        );
        let mut config = Config::default();
        config.set_default_keybindings();
        let context = PostContext {
            account_id: String::from("user_1"),
            community_id: None,
        };
        let mut main = MainComponent::new(config, backend, context, action_tx);
        main.init(Size::new(80, 24)).expect("failed to init");
        (main, action_rx)
    }

    fn top_id(main: &MainComponent) -> usize {
        main.views.last().map(|(id, _)| *id).expect("no views")
    }

    fn type_text(main: &mut MainComponent, s: &str) {
        for c in s.chars() {
            main.handle_key_events(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
                .expect("failed to handle key");
        }
    }

    async fn drain(rx: &mut UnboundedReceiver<Action>) -> Vec<Action> {
        let mut actions = Vec::new();
        while let Ok(Some(action)) = time::timeout(Duration::from_millis(200), rx.recv()).await {
            actions.push(action);
        }
        actions
    }

    #[tokio::test]
    async fn transitions() {
        let (mut main, _rx) = main_component(FakeStore::default());
        assert_eq!(main.current(), Some(View::Root));
        // root's only item opens a new thread
        let action = main
            .update(Action::View(ViewAction::Enter))
            .expect("failed to update");
        assert!(matches!(action, Some(Action::View(ViewAction::NewThread))));
        main.update(action.expect("no action"))
            .expect("failed to update");
        assert_eq!(main.current(), Some(View::NewThread));
        // no second form on top of the first
        main.update(Action::View(ViewAction::NewThread))
            .expect("failed to update");
        assert_eq!(main.views.len(), 2);

        main.update(Action::View(ViewAction::Transition(Transition::Root)))
            .expect("failed to update");
        assert_eq!(main.views.len(), 1);
        assert_eq!(main.current(), Some(View::Root));
        // the root is never popped
        main.transition(&Transition::Pop).expect("failed to transition");
        assert_eq!(main.current(), Some(View::Root));
    }

    #[tokio::test]
    async fn back_discards_draft() {
        let (mut main, _rx) = main_component(FakeStore::default());
        main.update(Action::View(ViewAction::NewThread))
            .expect("failed to update");
        assert_eq!(main.current(), Some(View::NewThread));
        let action = main
            .update(Action::View(ViewAction::Back))
            .expect("failed to update");
        assert!(matches!(action, Some(Action::Render)));
        assert_eq!(main.current(), Some(View::Root));
    }

    #[tokio::test]
    async fn discarded_draft_results_are_dropped() {
        let (mut main, mut rx) = main_component(FakeStore {
            fail: true,
            ..Default::default()
        });
        main.update(Action::View(ViewAction::NewThread))
            .expect("failed to update");
        let first = top_id(&main);
        type_text(&mut main, "draft A");
        main.update(Action::View(ViewAction::Submit))
            .expect("failed to update");
        main.update(Action::View(ViewAction::Back))
            .expect("failed to update");

        main.update(Action::View(ViewAction::NewThread))
            .expect("failed to update");
        let second = top_id(&main);
        assert_ne!(first, second);
        type_text(&mut main, "draft B");
        main.update(Action::View(ViewAction::Submit))
            .expect("failed to update");

        let (stale, live): (Vec<_>, Vec<_>) = drain(&mut rx)
            .await
            .into_iter()
            .partition(|action| matches!(action, Action::ViewTask(id, _) if *id == first));
        assert_eq!(stale.len(), 1);
        assert_eq!(live.len(), 1);
        // the first draft's failure must not clear the second one's guard
        for action in stale {
            assert!(main.update(action).expect("failed to update").is_none());
        }
        assert!(main
            .update(Action::View(ViewAction::Submit))
            .expect("failed to update")
            .is_none());
        // its own failure does
        for action in live {
            assert!(matches!(
                main.update(action).expect("failed to update"),
                Some(Action::Render)
            ));
        }
        assert!(matches!(
            main.update(Action::View(ViewAction::Submit))
                .expect("failed to update"),
            Some(Action::Render)
        ));
    }

    #[tokio::test]
    async fn stale_attachments_and_navigation_are_dropped() {
        let (mut main, _rx) = main_component(FakeStore::default());
        main.update(Action::View(ViewAction::NewThread))
            .expect("failed to update");
        let first = top_id(&main);
        main.update(Action::View(ViewAction::Back))
            .expect("failed to update");
        main.update(Action::View(ViewAction::NewThread))
            .expect("failed to update");
        let second = top_id(&main);

        let attachments = |id| {
            Action::ViewTask(
                id,
                ViewAction::Update(Box::new(Data::Attachments(vec![attachment("from_a")]))),
            )
        };
        assert!(main
            .update(attachments(first))
            .expect("failed to update")
            .is_none());
        assert!(main
            .update(Action::ViewTask(
                first,
                ViewAction::Transition(Transition::Root)
            ))
            .expect("failed to update")
            .is_none());
        assert_eq!(main.current(), Some(View::NewThread));
        assert_eq!(top_id(&main), second);

        assert!(matches!(
            main.update(attachments(second)).expect("failed to update"),
            Some(Action::Render)
        ));
        main.update(Action::ViewTask(
            second,
            ViewAction::Transition(Transition::Root),
        ))
        .expect("failed to update");
        assert_eq!(main.current(), Some(View::Root));
    }
}

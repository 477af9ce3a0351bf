use super::super::modals::types::Action as ModalAction;
use super::super::modals::{ModalComponent, SelectImagesModalComponent};
use super::types::{Action, Data, Transition, View};
use super::ViewComponent;
use crate::backend::form::{Attachment, Field, ThreadForm, ValidationError, MIN_THREAD_LEN};
use crate::backend::staging::stage_images;
use crate::backend::submit::submit_thread;
use crate::backend::types::PostContext;
use crate::backend::Backend;
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Style, Stylize};
use ratatui::text::{Line, Text};
use ratatui::widgets::{Block, Borders, Padding, Paragraph};
use ratatui::Frame;
use std::path::PathBuf;
use tokio::sync::mpsc::UnboundedSender;
use tui_textarea::TextArea;

const PREVIEW_WIDTH: usize = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Text,
    Images,
    Submit,
}

impl Focus {
    fn next(&self) -> Self {
        match self {
            Self::Text => Self::Images,
            Self::Images => Self::Submit,
            Self::Submit => Self::Text,
        }
    }
    fn prev(&self) -> Self {
        match self {
            Self::Text => Self::Submit,
            Self::Images => Self::Text,
            Self::Submit => Self::Images,
        }
    }
}

pub struct NewThreadViewComponent {
    action_tx: UnboundedSender<Action>,
    backend: Backend,
    context: PostContext,
    form: ThreadForm,
    text: TextArea<'static>,
    focus: Focus,
    /// Row in the image list; `attachments.len()` is the "add images" row.
    selected: usize,
    errors: Vec<ValidationError>,
    submitting: bool,
    failure: Option<String>,
    modal: Option<Box<dyn ModalComponent>>,
}

impl NewThreadViewComponent {
    pub fn new(action_tx: UnboundedSender<Action>, backend: Backend, context: PostContext) -> Self {
        let mut text = TextArea::default();
        text.set_block(Block::bordered().title("Content"));
        text.set_cursor_line_style(Style::default());
        text.set_cursor_style(Style::default().reversed());
        Self {
            action_tx,
            backend,
            form: ThreadForm::new(context.account_id.clone()),
            context,
            text,
            focus: Focus::Text,
            selected: 0,
            errors: Vec::new(),
            submitting: false,
            failure: None,
            modal: None,
        }
    }
    fn update_focus(&mut self, focus: Focus) {
        self.focus = focus;
        self.text.set_cursor_style(if focus == Focus::Text {
            Style::default().reversed()
        } else {
            Style::default()
        });
    }
    fn sync_text(&mut self) {
        self.form.thread = self.text.lines().join("\n");
        if !self.errors.is_empty() {
            self.errors = self.form.values().validate().err().unwrap_or_default();
        }
        if let Some(block) = self.text.block() {
            let block = block.clone();
            self.text
                .set_block(match self.form.thread.chars().count() {
                    0 => block.border_style(Color::Reset),
                    n if n < MIN_THREAD_LEN => block.border_style(Color::Red),
                    _ => block.border_style(Color::Green),
                });
        }
    }
    /// Stage the selected files in the background. The attachments are replaced
    /// only if every file could be staged.
    fn select_images(&self, paths: Vec<PathBuf>) {
        if paths.is_empty() {
            return;
        }
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            match stage_images(paths).await {
                Ok(attachments) => {
                    if let Err(e) = tx.send(Action::Update(Box::new(Data::Attachments(
                        attachments,
                    )))) {
                        log::error!("failed to send update action: {e}");
                    }
                }
                Err(e) => {
                    log::error!("error loading images: {e}");
                }
            }
        });
    }
    fn set_attachments(&mut self, attachments: Vec<Attachment>) {
        self.form.attachments.replace(attachments);
        self.selected = self.selected.min(self.form.attachments.len());
    }
    fn remove_image(&mut self, index: usize) -> Option<Action> {
        let removed = self.form.attachments.remove(index)?;
        log::debug!("removed image {}", removed.file.name);
        self.selected = self.selected.min(self.form.attachments.len());
        Some(Action::Render)
    }
    fn submit(&mut self) -> Option<Action> {
        if self.submitting {
            log::debug!("submission already in progress");
            return None;
        }
        let values = self.form.values();
        if let Err(errors) = values.validate() {
            self.errors = errors;
            return Some(Action::Render);
        }
        self.errors.clear();
        self.failure = None;
        self.submitting = true;

        let tx = self.action_tx.clone();
        let backend = self.backend.clone();
        let context = self.context.clone();
        let attachments = self.form.attachments.iter().cloned().collect::<Vec<_>>();
        let path = self.view().path();
        tokio::spawn(async move {
            match submit_thread(&backend, values, attachments, &context, path).await {
                Ok(report) => {
                    log::info!(
                        "thread created with {} images ({} failed)",
                        report.image.len(),
                        report.failed
                    );
                    let notice = match report.failed {
                        0 => String::from("Thread posted"),
                        n => format!("Thread posted, {n} image(s) failed to upload"),
                    };
                    for action in [
                        Action::Transition(Transition::Root),
                        Action::Update(Box::new(Data::Notice(notice))),
                    ] {
                        if let Err(e) = tx.send(action) {
                            log::error!("failed to send action: {e}");
                        }
                    }
                }
                Err(e) => {
                    log::error!("failed to create thread: {e}");
                    if let Err(e) = tx.send(Action::Update(Box::new(Data::SubmitFailed(
                        e.to_string(),
                    )))) {
                        log::error!("failed to send update action: {e}");
                    }
                }
            }
        });
        Some(Action::Render)
    }
    fn field_errors(&self, field: Field) -> Vec<Line<'static>> {
        self.errors
            .iter()
            .filter(|e| e.field() == field)
            .map(|e| Line::from(format!(" {e}")).red())
            .collect()
    }
}

impl ViewComponent for NewThreadViewComponent {
    fn view(&self) -> View {
        View::NewThread
    }
    fn handle_key_events(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if let Some(modal) = self.modal.as_mut() {
            return Ok(match modal.handle_key_events(key)? {
                Some(ModalAction::Render) => Some(Action::Render),
                _ => None,
            });
        }
        if self.focus != Focus::Text
            || matches!(key.code, KeyCode::Tab | KeyCode::BackTab | KeyCode::Esc)
        {
            return Ok(None);
        }
        let cursor = self.text.cursor();
        let result = self.text.input(key) || self.text.cursor() != cursor;
        self.sync_text();
        Ok(result.then_some(Action::Render))
    }
    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        if let Some(modal) = self.modal.as_mut() {
            if !matches!(action, Action::Update(_)) {
                return Ok(match modal.update(action)? {
                    Some(ModalAction::Ok(paths)) => {
                        self.modal = None;
                        self.select_images(paths);
                        Some(Action::Render)
                    }
                    Some(ModalAction::Cancel) => {
                        self.modal = None;
                        Some(Action::Render)
                    }
                    Some(ModalAction::Render) => Some(Action::Render),
                    None => None,
                });
            }
        }
        Ok(match action {
            Action::NextInput => {
                self.update_focus(self.focus.next());
                Some(Action::Render)
            }
            Action::PrevInput => {
                self.update_focus(self.focus.prev());
                Some(Action::Render)
            }
            Action::NextItem if self.focus == Focus::Images => {
                if self.selected < self.form.attachments.len() {
                    self.selected += 1;
                } else {
                    self.update_focus(Focus::Submit);
                }
                Some(Action::Render)
            }
            Action::PrevItem if self.focus == Focus::Images => {
                if self.selected > 0 {
                    self.selected -= 1;
                } else {
                    self.update_focus(Focus::Text);
                }
                Some(Action::Render)
            }
            Action::NextItem => {
                if self.focus.next() == Focus::Images {
                    self.selected = 0;
                }
                self.update_focus(self.focus.next());
                Some(Action::Render)
            }
            Action::PrevItem => {
                if self.focus.prev() == Focus::Images {
                    self.selected = self.form.attachments.len();
                }
                self.update_focus(self.focus.prev());
                Some(Action::Render)
            }
            Action::Enter if self.focus == Focus::Images => {
                if self.selected == self.form.attachments.len() {
                    self.modal = Some(Box::new(SelectImagesModalComponent::new()));
                    Some(Action::Render)
                } else {
                    self.remove_image(self.selected)
                }
            }
            Action::Remove if self.focus == Focus::Images => self.remove_image(self.selected),
            Action::Enter if self.focus == Focus::Submit => self.submit(),
            Action::Submit => self.submit(),
            Action::Back => {
                // TODO: confirm to discard the draft
                Some(Action::Transition(Transition::Pop))
            }
            Action::Update(data) => match *data {
                Data::Attachments(attachments) => {
                    self.set_attachments(attachments);
                    Some(Action::Render)
                }
                Data::SubmitFailed(message) => {
                    self.submitting = false;
                    self.failure = Some(message);
                    Some(Action::Render)
                }
                Data::Notice(_) => None,
            },
            _ => None,
        })
    }
    fn draw(&mut self, f: &mut Frame<'_>, area: Rect) -> Result<()> {
        let thread_errors = self.field_errors(Field::Thread);
        let account_errors = self.field_errors(Field::AccountId);
        let [paragraph, text_len, text, errors, images, submit, status] = Layout::vertical([
            Constraint::Length(2),
            Constraint::Length(1),
            Constraint::Min(5),
            Constraint::Length((thread_errors.len() + account_errors.len()) as u16),
            Constraint::Length(2 + self.form.attachments.len() as u16),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(area);

        let mut image_lines = vec![Line::from(format!(
            "Images ({})",
            self.form.attachments.len()
        ))
        .bold()];
        for (i, attachment) in self.form.attachments.iter().enumerate() {
            let mut line = Line::from(format!(
                "  [x] {} {}  {}",
                attachment.file.name,
                describe(attachment),
                preview_prefix(&attachment.preview)
            ));
            if self.focus == Focus::Images && self.selected == i {
                line = line.reversed();
            } else {
                line = line.dim();
            }
            image_lines.push(line);
        }
        let mut add_line = Line::from("  + Add images");
        if self.focus == Focus::Images && self.selected == self.form.attachments.len() {
            add_line = add_line.reversed();
        }
        image_lines.push(add_line);

        let mut submit_line = Line::from(if self.submitting {
            "Posting..."
        } else {
            "Post Thread"
        })
        .centered();
        submit_line = if self.submitting {
            submit_line.dim()
        } else {
            submit_line.blue()
        };
        if self.focus == Focus::Submit {
            submit_line = submit_line.reversed();
        }

        f.render_widget(
            Paragraph::new("New thread").bold().block(
                Block::default()
                    .borders(Borders::BOTTOM)
                    .border_style(Color::Gray)
                    .padding(Padding::horizontal(1)),
            ),
            paragraph,
        );
        f.render_widget(
            Line::from(format!("{} ", self.form.thread.chars().count()))
                .right_aligned()
                .gray(),
            text_len,
        );
        f.render_widget(&self.text, text);
        f.render_widget(
            Text::from(thread_errors.into_iter().chain(account_errors).collect::<Vec<_>>()),
            errors,
        );
        f.render_widget(Text::from(image_lines), images);
        f.render_widget(submit_line, submit);
        if let Some(failure) = &self.failure {
            f.render_widget(Line::from(format!(" {failure}")).red(), status);
        }

        for modal in self.modal.iter_mut() {
            modal.draw(f, area)?;
        }
        Ok(())
    }
}

fn describe(attachment: &Attachment) -> String {
    let size = attachment.file.bytes.len();
    let size = if size < 1024 {
        format!("{size} B")
    } else if size < 1024 * 1024 {
        format!("{:.1} KB", size as f64 / 1024.0)
    } else {
        format!("{:.1} MB", size as f64 / (1024.0 * 1024.0))
    };
    match attachment.dimensions {
        Some((width, height)) => format!("({}, {width}x{height}, {size})", attachment.file.media_type),
        None => format!("({}, {size})", attachment.file.media_type),
    }
}

fn preview_prefix(preview: &str) -> String {
    match preview.char_indices().nth(PREVIEW_WIDTH) {
        Some((i, _)) => format!("{}…", &preview[..i]),
        None => preview.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::form::tests::attachment;
    use crate::backend::staging::tests::png_bytes;
    use crate::backend::submit::tests::{FakeStore, FakeUploader};
    use crossterm::event::KeyModifiers;
    use std::fs;
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::TempDir;
    use tokio::sync::mpsc::{self, UnboundedReceiver};
    use tokio::time;

    struct Harness {
        view: NewThreadViewComponent,
        rx: UnboundedReceiver<Action>,
        uploader: Arc<FakeUploader>,
        store: Arc<FakeStore>,
    }

    fn harness(uploader: FakeUploader, store: FakeStore) -> Harness {
        let (tx, rx) = mpsc::unbounded_channel();
        let (uploader, store) = (Arc::new(uploader), Arc::new(store));
        let view = NewThreadViewComponent::new(
            tx,
            Backend::new(uploader.clone(), store.clone(), 1),
            PostContext {
                account_id: String::from("user_1"),
                community_id: None,
            },
        );
        Harness {
            view,
            rx,
            uploader,
            store,
        }
    }

    fn type_text(view: &mut NewThreadViewComponent, s: &str) {
        for c in s.chars() {
            view.handle_key_events(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
                .expect("failed to handle key");
        }
    }

    /// Collect everything sent until the channel stays quiet for a while.
    async fn drain(rx: &mut UnboundedReceiver<Action>) -> Vec<Action> {
        let mut actions = Vec::new();
        while let Ok(Some(action)) = time::timeout(Duration::from_millis(200), rx.recv()).await {
            actions.push(action);
        }
        actions
    }

    #[tokio::test]
    async fn select_images_updates_once() {
        let dir = TempDir::new().expect("failed to create temp dir");
        let paths = ["a.png", "b.png", "c.png"]
            .iter()
            .map(|name| {
                let path = dir.path().join(name);
                fs::write(&path, png_bytes(1, 1)).expect("failed to write");
                path
            })
            .collect::<Vec<_>>();
        let Harness { mut view, mut rx, .. } =
            harness(FakeUploader::default(), FakeStore::default());
        view.select_images(paths.clone());
        let actions = drain(&mut rx).await;
        assert_eq!(actions.len(), 1);
        let Some(Action::Update(data)) = actions.into_iter().next() else {
            panic!("expected update action");
        };
        let Data::Attachments(attachments) = *data else {
            panic!("expected attachments");
        };
        assert_eq!(
            attachments.iter().map(|a| a.file.path.clone()).collect::<Vec<_>>(),
            paths
        );
        view.update(Action::Update(Box::new(Data::Attachments(attachments))))
            .expect("failed to update");
        assert_eq!(view.form.values().image.len(), 3);
    }

    #[tokio::test]
    async fn select_images_with_non_image_changes_nothing() {
        let dir = TempDir::new().expect("failed to create temp dir");
        let png = dir.path().join("a.png");
        let txt = dir.path().join("b.txt");
        fs::write(&png, png_bytes(1, 1)).expect("failed to write");
        fs::write(&txt, b"text").expect("failed to write");
        let Harness { mut view, mut rx, .. } =
            harness(FakeUploader::default(), FakeStore::default());
        view.set_attachments(vec![attachment("old")]);
        view.select_images(vec![png, txt]);
        assert!(drain(&mut rx).await.is_empty());
        assert_eq!(view.form.attachments.len(), 1);
        // empty selection doesn't touch anything either
        view.select_images(Vec::new());
        assert!(drain(&mut rx).await.is_empty());
    }

    #[tokio::test]
    async fn remove_selected_image() {
        let Harness { mut view, .. } = harness(FakeUploader::default(), FakeStore::default());
        view.set_attachments(vec![attachment("a"), attachment("b"), attachment("c")]);
        view.update(Action::NextInput).expect("failed to update");
        view.update(Action::NextItem).expect("failed to update");
        assert_eq!(view.selected, 1);
        assert!(matches!(
            view.update(Action::Remove).expect("failed to update"),
            Some(Action::Render)
        ));
        assert_eq!(
            view.form
                .attachments
                .files()
                .into_iter()
                .map(|f| f.name)
                .collect::<Vec<_>>(),
            vec!["a", "c"]
        );
    }

    #[tokio::test]
    async fn invalid_form_is_not_submitted() {
        let Harness {
            mut view,
            mut rx,
            store,
            ..
        } = harness(FakeUploader::default(), FakeStore::default());
        type_text(&mut view, "hi");
        view.update(Action::Submit).expect("failed to update");
        assert_eq!(view.errors, vec![ValidationError::ThreadTooShort]);
        assert!(!view.submitting);
        assert!(drain(&mut rx).await.is_empty());
        assert!(store.created.lock().expect("poisoned").is_empty());
        // errors follow the text once shown
        type_text(&mut view, "!");
        assert!(view.errors.is_empty());
    }

    #[tokio::test]
    async fn submit_navigates_to_root_once() {
        let Harness {
            mut view,
            mut rx,
            uploader,
            store,
        } = harness(FakeUploader::failing(&["b"]), FakeStore::default());
        type_text(&mut view, "hello world");
        view.set_attachments(vec![attachment("a"), attachment("b"), attachment("c")]);
        view.update(Action::Submit).expect("failed to update");
        assert!(view.submitting);
        // ignored while in flight
        assert!(view.update(Action::Submit).expect("failed to update").is_none());

        let actions = drain(&mut rx).await;
        assert_eq!(
            actions
                .iter()
                .filter(|a| matches!(a, Action::Transition(Transition::Root)))
                .count(),
            1
        );
        assert!(matches!(
            actions.last(),
            Some(Action::Update(data)) if matches!(data.as_ref(), Data::Notice(_))
        ));
        assert_eq!(uploader.calls.lock().expect("poisoned").len(), 3);
        let created = store.created.lock().expect("poisoned");
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].text, "hello world");
        assert_eq!(created[0].author, "user_1");
        assert_eq!(created[0].path, "/create-thread");
        assert_eq!(
            created[0].image,
            vec![
                String::from("https://files.test/a"),
                String::from("https://files.test/c")
            ]
        );
    }

    #[tokio::test]
    async fn failed_submit_can_be_retried() {
        let Harness { mut view, mut rx, .. } = harness(
            FakeUploader::default(),
            FakeStore {
                fail: true,
                ..Default::default()
            },
        );
        type_text(&mut view, "hello");
        view.update(Action::Submit).expect("failed to update");
        // no navigation and no notice, only the failure
        let mut actions = drain(&mut rx).await;
        assert_eq!(actions.len(), 1);
        assert!(!actions
            .iter()
            .any(|a| matches!(a, Action::Transition(_))));
        let action = actions.remove(0);
        assert!(
            matches!(&action, Action::Update(data) if matches!(data.as_ref(), Data::SubmitFailed(_)))
        );
        view.update(action).expect("failed to update");
        assert!(!view.submitting);
        assert!(view.failure.is_some());
        assert!(matches!(
            view.update(Action::Submit).expect("failed to update"),
            Some(Action::Render)
        ));
        assert!(view.submitting);
    }

    #[test]
    fn preview_prefix_truncates() {
        assert_eq!(preview_prefix("data:"), "data:");
        assert_eq!(
            preview_prefix("data:image/png;base64,iVBORw0KGgo"),
            "data:image/png;base64,iV…"
        );
    }
}

use crate::backend::form::Attachment;

#[derive(Debug, Clone)]
pub enum Action {
    NextItem,
    PrevItem,
    NextInput,
    PrevInput,
    Enter,
    Back,
    Remove,
    Submit,
    NewThread,
    Render,
    Transition(Transition),
    Update(Box<Data>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Push(Box<View>),
    Pop,
    /// Drop every view above the root.
    Root,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Root,
    NewThread,
}

impl View {
    /// Route of the view, sent along with a new thread so the server knows which
    /// page to revalidate.
    pub fn path(&self) -> &'static str {
        match self {
            Self::Root => "/",
            Self::NewThread => "/create-thread",
        }
    }
}

#[derive(Debug, Clone)]
pub enum Data {
    Attachments(Vec<Attachment>),
    SubmitFailed(String),
    Notice(String),
}

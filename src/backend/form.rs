use super::types::StagedFile;
use thiserror::Error;

pub const MIN_THREAD_LEN: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Thread,
    AccountId,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Thread is required")]
    ThreadRequired,
    #[error("Minimum 3 characters.")]
    ThreadTooShort,
    #[error("Account is required")]
    AccountRequired,
}

impl ValidationError {
    pub fn field(&self) -> Field {
        match self {
            Self::ThreadRequired | Self::ThreadTooShort => Field::Thread,
            Self::AccountRequired => Field::AccountId,
        }
    }
}

/// The schema view of the form, as checked before submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThreadValues {
    pub thread: String,
    pub account_id: String,
    pub image: Vec<String>,
}

impl ThreadValues {
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();
        if let Err(e) = validate_thread(&self.thread) {
            errors.push(e);
        }
        if self.account_id.is_empty() {
            errors.push(ValidationError::AccountRequired);
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

pub fn validate_thread(thread: &str) -> Result<(), ValidationError> {
    match thread.chars().count() {
        0 => Err(ValidationError::ThreadRequired),
        n if n < MIN_THREAD_LEN => Err(ValidationError::ThreadTooShort),
        _ => Ok(()),
    }
}

/// A staged file together with its preview, and its remote URL once uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub file: StagedFile,
    pub preview: String,
    pub dimensions: Option<(u32, u32)>,
    pub remote: Option<String>,
}

/// Ordered attachments. Preview list and staged files are the same list, so they
/// can't drift apart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attachments(Vec<Attachment>);

impl Attachments {
    pub fn replace(&mut self, attachments: Vec<Attachment>) {
        self.0 = attachments;
    }
    pub fn remove(&mut self, index: usize) -> Option<Attachment> {
        (index < self.0.len()).then(|| self.0.remove(index))
    }
    pub fn previews(&self) -> Vec<String> {
        self.0.iter().map(|a| a.preview.clone()).collect()
    }
    pub fn files(&self) -> Vec<StagedFile> {
        self.0.iter().map(|a| a.file.clone()).collect()
    }
    pub fn len(&self) -> usize {
        self.0.len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
    pub fn iter(&self) -> impl Iterator<Item = &Attachment> {
        self.0.iter()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ThreadForm {
    pub thread: String,
    pub account_id: String,
    pub attachments: Attachments,
}

impl ThreadForm {
    pub fn new(account_id: impl Into<String>) -> Self {
        Self {
            thread: String::new(),
            account_id: account_id.into(),
            attachments: Attachments::default(),
        }
    }
    pub fn values(&self) -> ThreadValues {
        ThreadValues {
            thread: self.thread.clone(),
            account_id: self.account_id.clone(),
            image: self.attachments.previews(),
        }
    }
}

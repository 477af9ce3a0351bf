use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Ok(Vec<PathBuf>),
    Cancel,
    Render,
}

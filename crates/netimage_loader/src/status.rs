use std::sync::Arc;

use crate::{ImageData, LoadError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    Idle,
    Loading,
    Loaded,
    Failed,
}

/// The loader's state machine. `Loaded` is terminal; `Failed` may transition
/// back to `Loading` on a retry.
#[derive(Default)]
pub(crate) enum LoadState {
    #[default]
    Idle,
    Loading,
    Loaded(Arc<ImageData>),
    Failed(LoadError),
}

impl LoadState {
    pub fn status(&self) -> LoadStatus {
        match self {
            LoadState::Idle => LoadStatus::Idle,
            LoadState::Loading => LoadStatus::Loading,
            LoadState::Loaded(_) => LoadStatus::Loaded,
            LoadState::Failed(_) => LoadStatus::Failed,
        }
    }
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }
    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadState::Loaded(_))
    }
    pub fn image(&self) -> Option<Arc<ImageData>> {
        match self {
            LoadState::Loaded(image) => Some(image.clone()),
            _ => None,
        }
    }
}

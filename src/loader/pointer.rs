use serde::{Deserialize, Serialize};

/// Which of the two independent cursors of a loader is addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointerKind {
    /// Cursor over the primary frames.
    Train,
    /// Cursor over the held-out frames.
    Valid,
}

/// `(dataset, frame)` cursor of the sequence batcher.
///
/// The frame index only moves forward inside a dataset. Moving to the next dataset wraps to
/// dataset `0` after the last one and restarts at frame `0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchPointer {
    pub dataset_index: usize,
    pub frame_index: usize,
}

impl BatchPointer {
    pub fn new() -> Self {
        BatchPointer::default()
    }

    /// Back to the first frame of the first dataset.
    pub fn reset(&mut self) {
        *self = BatchPointer::default();
    }

    /// Move to the first frame of the next dataset, cycling over `num_datasets`.
    pub fn tick(&mut self, num_datasets: usize) {
        self.dataset_index += 1;
        self.frame_index = 0;
        if self.dataset_index >= num_datasets {
            self.dataset_index = 0;
        }
    }

    /// Skip the window just emitted.
    pub fn advance(&mut self, seq_length: usize) {
        self.frame_index += seq_length;
    }
}

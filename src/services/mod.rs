//! Support services separated from pipeline business logic

mod progress;

pub use progress::{
    ConsoleProgressReporter, NoOpProgressReporter, ProcessingStage, ProgressReporter,
    ProgressUpdate,
};

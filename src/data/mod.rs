//! Data module - CSV loading, cleaning, merging and writing

mod loader;
mod merger;
mod processor;
mod subsets;
mod writer;

pub use loader::{DataLoader, LoaderError};
pub use merger::{JoinStep, MergeOutcome, Merger, SourceTables};
pub use processor::{
    CleanedTable, CleaningReport, CoercionWarning, DataProcessor, MissingValues, ProcessorError,
    TimestampOutcome,
};
pub use subsets::{MotorcycleSplitter, MotorcycleSubsets, SplitSummary};
pub use writer::{TableWriter, WriteError, WrittenFile};

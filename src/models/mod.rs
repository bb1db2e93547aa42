pub mod rows;
pub mod run;
pub mod step;

pub use rows::{RowPage, RowRecord};
pub use run::{Run, RunSummary};
pub use step::{Step, StepStatus};

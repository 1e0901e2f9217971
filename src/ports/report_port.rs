//! Report output port.

use crate::domain::batch::BatchReport;
use crate::domain::error::StratbenchError;
use std::path::Path;

/// Port for persisting the results of a batch run.
pub trait ReportPort {
    fn write(&self, report: &BatchReport, output_dir: &Path) -> Result<(), StratbenchError>;
}

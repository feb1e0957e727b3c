use std::sync::{Arc, Mutex};

use crate::report::ExceptionReport;

pub trait ReportSink {
    fn send(&self, report: ExceptionReport);
}

pub struct LogReportSink {}

impl ReportSink for LogReportSink {
    fn send(&self, report: ExceptionReport) {
        tracing::info!(event_id = %report.event_id, "exception report: {:?}", report);
    }
}

#[derive(Clone, Default)]
pub struct MemoryReportSink {
    reports: Arc<Mutex<Vec<ExceptionReport>>>,
}

impl MemoryReportSink {
    pub fn reports(&self) -> Vec<ExceptionReport> {
        self.reports
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl ReportSink for MemoryReportSink {
    fn send(&self, report: ExceptionReport) {
        self.reports
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(report);
    }
}

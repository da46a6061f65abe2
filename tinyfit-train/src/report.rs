/// Outcome of one epoch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpochReport {
    /// Zero-based epoch index.
    pub epoch: usize,
    /// Size-weighted mean of the validation batch losses.
    pub valid_loss: f32,
}

/// Receives one report per finished epoch.
pub trait EpochReporter {
    fn report(&mut self, report: &EpochReport);
}

/// Reports through the `log` facade at info level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReporter;

impl EpochReporter for LogReporter {
    fn report(&mut self, report: &EpochReport) {
        log::info!("epoch {}: valid_loss = {:.6}", report.epoch, report.valid_loss);
    }
}

impl<F> EpochReporter for F
where
    F: FnMut(&EpochReport),
{
    fn report(&mut self, report: &EpochReport) {
        self(report)
    }
}

/// Every epoch report of a run, in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FitHistory {
    reports: Vec<EpochReport>,
}

impl FitHistory {
    pub fn new() -> Self {
        FitHistory::default()
    }

    pub fn push(&mut self, report: EpochReport) {
        self.reports.push(report);
    }

    pub fn reports(&self) -> &[EpochReport] {
        &self.reports
    }

    pub fn valid_losses(&self) -> Vec<f32> {
        self.reports.iter().map(|r| r.valid_loss).collect()
    }

    pub fn first(&self) -> Option<&EpochReport> {
        self.reports.first()
    }

    pub fn last(&self) -> Option<&EpochReport> {
        self.reports.last()
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }
}

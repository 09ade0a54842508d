use serde::Serialize;

/// Running totals for one session's pipeline activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PipelineCounters {
    loads: usize,
    records_parsed: usize,
    rows_skipped: usize,
    renders: usize,
}

impl PipelineCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_load(&mut self, parsed: usize, skipped: usize) {
        self.loads += 1;
        self.records_parsed += parsed;
        self.rows_skipped += skipped;
    }

    pub fn record_render(&mut self) {
        self.renders += 1;
    }

    pub fn loads(&self) -> usize {
        self.loads
    }

    pub fn records_parsed(&self) -> usize {
        self.records_parsed
    }

    pub fn rows_skipped(&self) -> usize {
        self.rows_skipped
    }

    pub fn renders(&self) -> usize {
        self.renders
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate_across_loads() {
        let mut counters = PipelineCounters::new();
        counters.record_load(10, 2);
        counters.record_load(5, 0);
        counters.record_render();
        assert_eq!(counters.loads(), 2);
        assert_eq!(counters.records_parsed(), 15);
        assert_eq!(counters.rows_skipped(), 2);
        assert_eq!(counters.renders(), 1);
    }
}

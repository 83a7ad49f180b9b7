/*!
Run configuration for the scoring pipeline. The label set itself is fixed by the [`Label`] type
and is not configurable.

[`Label`]: crate::span::Label
*/

/// Parameters for one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PipelineConfig {
    /// Score documents on a rayon worker pool instead of sequentially. Documents are independent
    /// units of work; results are merged in a single reduction either way.
    pub(crate) parallel: bool,
    /// Keep the per-document entity records for export. Disable for large corpora where only the
    /// score tables matter.
    pub(crate) entity_records: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfigBuilder::default().build()
    }
}

impl PipelineConfig {
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineConfigBuilder {
    parallel: bool,
    skip_entity_records: bool,
}

impl PipelineConfigBuilder {
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn skip_entity_records(mut self, skip: bool) -> Self {
        self.skip_entity_records = skip;
        self
    }

    pub fn build(self) -> PipelineConfig {
        PipelineConfig {
            parallel: self.parallel,
            entity_records: !self.skip_entity_records,
        }
    }
}

//! Collector tuning surface.
//!
//! Mirrors the host crate's `GcConfigBuilder` pattern: a plain `Default` for
//! production-scale values, and a builder for anyone who wants to override
//! individual knobs without naming every field.

/// Sizing and capacity knobs for a [`crate::gc::Collector`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectorConfig {
    /// Capacity in bytes of the young generation's single region.
    pub young_region_size: usize,
    /// Capacity in bytes of each of the old generation's two regions.
    pub old_region_size: usize,
    /// Maximum number of simultaneously registered roots.
    pub root_stack_capacity: usize,
    /// Maximum number of outstanding remembered-set entries between minor
    /// collections.
    pub remembered_set_capacity: usize,
    /// Gates the per-object `trace`-level dump emitted during collection;
    /// `print_gc_state`/`print_gc_alloc_stats` are unaffected by this flag.
    pub debug_log: bool,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        CollectorConfig {
            young_region_size: 8 * 1024,
            old_region_size: 32 * 1024,
            root_stack_capacity: 1024,
            remembered_set_capacity: 1024,
            debug_log: false,
        }
    }
}

impl CollectorConfig {
    /// Start a [`CollectorConfigBuilder`] from the production-scale defaults.
    pub fn builder() -> CollectorConfigBuilder {
        CollectorConfigBuilder::default()
    }

    /// The literal byte geometry used by the S1-S6 scenario suite: 8-byte
    /// words, a 64-byte young region, a 128-byte old region.
    pub fn for_doctest_sizes() -> Self {
        CollectorConfig {
            young_region_size: 64,
            old_region_size: 128,
            root_stack_capacity: 1024,
            remembered_set_capacity: 1024,
            debug_log: true,
        }
    }
}

/// Chainable builder for [`CollectorConfig`].
#[derive(Debug, Clone, Default)]
pub struct CollectorConfigBuilder {
    config: CollectorConfig,
}

impl CollectorConfigBuilder {
    /// Set the young generation's region size, in bytes.
    pub fn young_region_size(mut self, bytes: usize) -> Self {
        self.config.young_region_size = bytes;
        self
    }

    /// Set each of the old generation's two region sizes, in bytes.
    pub fn old_region_size(mut self, bytes: usize) -> Self {
        self.config.old_region_size = bytes;
        self
    }

    /// Set the root registry's capacity.
    pub fn root_stack_capacity(mut self, capacity: usize) -> Self {
        self.config.root_stack_capacity = capacity;
        self
    }

    /// Set the remembered set's capacity.
    pub fn remembered_set_capacity(mut self, capacity: usize) -> Self {
        self.config.remembered_set_capacity = capacity;
        self
    }

    /// Toggle the per-object trace dump during collection.
    pub fn debug_log(mut self, enabled: bool) -> Self {
        self.config.debug_log = enabled;
        self
    }

    /// Finish building.
    pub fn build(self) -> CollectorConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_production_scale_comment() {
        let config = CollectorConfig::default();
        assert_eq!(config.young_region_size, 8 * 1024);
        assert_eq!(config.old_region_size, 32 * 1024);
        assert!(!config.debug_log);
    }

    #[test]
    fn doctest_sizes_match_scenario_geometry() {
        let config = CollectorConfig::for_doctest_sizes();
        assert_eq!(config.young_region_size, 64);
        assert_eq!(config.old_region_size, 128);
    }

    #[test]
    fn builder_overrides_only_named_fields() {
        let config = CollectorConfig::builder()
            .young_region_size(256)
            .debug_log(true)
            .build();
        assert_eq!(config.young_region_size, 256);
        assert_eq!(config.old_region_size, 32 * 1024);
        assert!(config.debug_log);
    }
}

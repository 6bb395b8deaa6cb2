use super::segment::TraceBlock;
use crate::config::FilterConfig;
use crate::model::CaseResult;

/// Deny-lists for noisy tags and benign exceptions, plus the relevance check
#[derive(Debug, Clone)]
pub struct TraceFilter {
    config: FilterConfig,
}

impl Default for TraceFilter {
    fn default() -> Self {
        Self::new(FilterConfig::default())
    }
}

impl TraceFilter {
    pub fn new(config: FilterConfig) -> Self {
        Self { config }
    }

    /// True if blocks logged under `tag` should be dropped
    pub fn filter_tag(&self, tag: &str) -> bool {
        self.config.ignored_tags.iter().any(|t| t == tag)
    }

    /// True if the block is a known benign or harness-internal exception
    pub fn filter_exc(&self, block: &TraceBlock) -> bool {
        self.config
            .ignored_exception_types
            .iter()
            .any(|t| block.exc_types.contains(t))
            || self
                .config
                .ignored_header_markers
                .iter()
                .any(|m| block.header.contains(m.as_str()))
    }

    /// True if any block mentions the case's component, package or package
    /// group, or carries an always-relevant marker
    pub fn is_relevant(&self, case: &CaseResult, blocks: &[TraceBlock]) -> bool {
        let group_id = package_group_id(&case.pkg_name);
        let mentions = |block: &TraceBlock, needle: &str| {
            !needle.is_empty() && (block.header.contains(needle) || block.frames.contains(needle))
        };

        for block in blocks {
            if mentions(block, &case.comp_name)
                || mentions(block, &case.pkg_name)
                || mentions(block, group_id)
            {
                return true;
            }
            if let Some(marker) = self
                .config
                .always_relevant_markers
                .iter()
                .find(|m| block.header.contains(m.as_str()))
            {
                tracing::warn!(
                    component = %case.comp_name,
                    "{} detected, treating trace as relevant",
                    marker
                );
                return true;
            }
        }
        false
    }
}

/// Package prefix up to (excluding) the second `.`; the whole package when
/// it has at most one dot
///
/// # Example
/// ```
/// use tracesift::stacktrace::package_group_id;
///
/// assert_eq!(package_group_id("com.example.app"), "com.example");
/// assert_eq!(package_group_id("org.demo"), "org.demo");
/// ```
pub fn package_group_id(pkg_name: &str) -> &str {
    match pkg_name.match_indices('.').nth(1) {
        Some((idx, _)) => &pkg_name[..idx],
        None => pkg_name,
    }
}

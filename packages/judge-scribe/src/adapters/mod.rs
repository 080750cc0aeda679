//! Page adapters: per-judge selector strategies.
//!
//! An adapter only knows *where* things live on its judge's page. The
//! watcher, gate and extraction pipeline are shared across judges.

pub mod gfg;
pub mod leetcode;
pub mod select;

pub use gfg::GfgAdapter;
pub use leetcode::LeetCodeAdapter;

use scraper::Html;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::types::record::Judge;

/// Selector strategies for one online judge.
///
/// Every reader is best-effort: it returns `None` or an empty list when
/// none of its strategies match, and must not panic on unexpected markup.
pub trait PageAdapter: Send + Sync {
    /// Which judge this adapter reads.
    fn judge(&self) -> Judge;

    /// Whether this adapter applies to the page at `url`.
    fn handles(&self, url: &str) -> bool;

    /// The target condition the watcher waits for.
    fn is_signal(&self, doc: &Html) -> bool;

    /// Pause between the signal and the first field read.
    fn signal_settle(&self) -> Duration {
        Duration::ZERO
    }

    /// Whether the code editor container has rendered.
    fn editor_ready(&self, doc: &Html) -> bool;

    fn title(&self, doc: &Html) -> Option<String>;

    fn difficulty(&self, doc: &Html) -> Option<String>;

    fn topics(&self, doc: &Html) -> Vec<String>;

    /// Statement prose with the examples section removed.
    fn description(&self, doc: &Html) -> Option<String>;

    /// Raw text of each example block, in document order.
    fn example_blocks(&self, doc: &Html) -> Vec<String>;

    /// Lines that may be constraints; the pipeline filters them.
    fn constraint_candidates(&self, doc: &Html) -> Vec<String>;

    /// Editor content, lines joined with `\n`.
    fn code(&self, doc: &Html) -> Option<String>;

    /// Free-form notes attached to the statement.
    fn notes(&self, _doc: &Html) -> Option<String> {
        None
    }
}

/// Whether `location` is a `/problems/` page on one of `domains` or a
/// subdomain of one.
pub(crate) fn is_problem_page(location: &str, domains: &[&str]) -> bool {
    let Ok(url) = Url::parse(location) else {
        return false;
    };
    let Some(host) = url.host_str() else {
        return false;
    };
    let on_domain = domains.iter().any(|domain| {
        host == *domain
            || host
                .strip_suffix(domain)
                .is_some_and(|prefix| prefix.ends_with('.'))
    });
    on_domain && url.path().starts_with("/problems/")
}

/// Picks the adapter for a page location.
#[derive(Clone, Default)]
pub struct AdapterRegistry {
    adapters: Vec<Arc<dyn PageAdapter>>,
}

impl AdapterRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in judge.
    pub fn with_builtin() -> Self {
        Self::new()
            .with_adapter(LeetCodeAdapter::new())
            .with_adapter(GfgAdapter::new())
    }

    /// Register an adapter (earlier registrations win).
    pub fn with_adapter(mut self, adapter: impl PageAdapter + 'static) -> Self {
        self.adapters.push(Arc::new(adapter));
        self
    }

    /// The first adapter that handles `url`.
    pub fn for_url(&self, url: &str) -> Option<Arc<dyn PageAdapter>> {
        self.adapters.iter().find(|a| a.handles(url)).cloned()
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

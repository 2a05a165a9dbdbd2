use serde_json::{Value, json};

/// Maximum entries honored per list selector; extra entries are dropped.
pub const MAX_PURGE_ITEMS: usize = 30;

/// Caller-supplied purge selectors. Any combination may be set.
#[derive(Debug, Clone, Default)]
pub struct PurgeSelectors {
    pub purge_everything: bool,
    pub files: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub hosts: Option<Vec<String>>,
    pub prefixes: Option<Vec<String>>,
}

/// Exactly one purge request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CachePurge {
    Everything,
    Files(Vec<String>),
    Tags(Vec<String>),
    Hosts(Vec<String>),
    Prefixes(Vec<String>),
}

impl PurgeSelectors {
    /// Pick the highest-precedence selector present:
    /// everything, then files, tags, hosts, prefixes.
    ///
    /// Empty lists count as absent. Returns `None` when nothing is selected.
    pub fn into_purge(self) -> Option<CachePurge> {
        if self.purge_everything {
            return Some(CachePurge::Everything);
        }
        let capped = |list: Option<Vec<String>>| {
            list.filter(|l| !l.is_empty()).map(|mut l| {
                l.truncate(MAX_PURGE_ITEMS);
                l
            })
        };
        capped(self.files)
            .map(CachePurge::Files)
            .or_else(|| capped(self.tags).map(CachePurge::Tags))
            .or_else(|| capped(self.hosts).map(CachePurge::Hosts))
            .or_else(|| capped(self.prefixes).map(CachePurge::Prefixes))
    }
}

impl CachePurge {
    /// Request body for `POST /zones/{id}/purge_cache`.
    pub fn to_body(&self) -> Value {
        match self {
            Self::Everything => json!({"purge_everything": true}),
            Self::Files(files) => json!({"files": files}),
            Self::Tags(tags) => json!({"tags": tags}),
            Self::Hosts(hosts) => json!({"hosts": hosts}),
            Self::Prefixes(prefixes) => json!({"prefixes": prefixes}),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("https://example.com/{i}")).collect()
    }

    #[test]
    fn everything_wins_over_lists() {
        let purge = PurgeSelectors {
            purge_everything: true,
            files: Some(urls(2)),
            tags: Some(vec!["t".to_string()]),
            ..Default::default()
        }
        .into_purge()
        .unwrap();
        assert_eq!(purge.to_body(), json!({"purge_everything": true}));
    }

    #[test]
    fn precedence_files_tags_hosts_prefixes() {
        let purge = PurgeSelectors {
            tags: Some(vec!["t".to_string()]),
            hosts: Some(vec!["h.example.com".to_string()]),
            ..Default::default()
        }
        .into_purge()
        .unwrap();
        assert_eq!(purge, CachePurge::Tags(vec!["t".to_string()]));

        let purge = PurgeSelectors {
            hosts: Some(vec!["h.example.com".to_string()]),
            prefixes: Some(vec!["example.com/a".to_string()]),
            ..Default::default()
        }
        .into_purge()
        .unwrap();
        assert_eq!(purge.to_body(), json!({"hosts": ["h.example.com"]}));
    }

    #[test]
    fn lists_are_truncated() {
        let purge = PurgeSelectors {
            files: Some(urls(45)),
            ..Default::default()
        }
        .into_purge()
        .unwrap();
        assert_eq!(purge, CachePurge::Files(urls(30)));
    }

    #[test]
    fn empty_lists_count_as_absent() {
        let selectors = PurgeSelectors {
            files: Some(Vec::new()),
            prefixes: Some(vec!["example.com/p".to_string()]),
            ..Default::default()
        };
        assert_eq!(
            selectors.into_purge(),
            Some(CachePurge::Prefixes(vec!["example.com/p".to_string()]))
        );
        assert_eq!(PurgeSelectors::default().into_purge(), None);
    }
}

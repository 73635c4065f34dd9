use rustc_hash::FxHashSet;

/// The deduplicated outcome of a run: filenames and URLs that should be
/// blocked, plus the report files they came from.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Results {
    pub paths: FxHashSet<String>,
    pub urls: FxHashSet<String>,
    pub files: FxHashSet<String>,
}

impl Results {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_path(&mut self, path: impl Into<String>) {
        self.paths.insert(path.into());
    }

    pub fn add_url(&mut self, url: impl Into<String>) {
        self.urls.insert(url.into());
    }

    pub fn add_file(&mut self, file: impl Into<String>) {
        self.files.insert(file.into());
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty() && self.urls.is_empty()
    }

    /// Set union on every field. Results computed per input file can be
    /// combined in any order.
    pub fn merge(mut self, other: Results) -> Results {
        self.paths.extend(other.paths);
        self.urls.extend(other.urls);
        self.files.extend(other.files);
        self
    }
}

/// Everything `check` hands back: the mergeable `Results` plus the
/// operator-visible side channels. `skipped` holds URLs intentionally not
/// probed (HTTPS, .onion); `auth_required` holds URLs the proxy answered
/// with 407 for. Both are sorted so the output is identical for any worker
/// count.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Checked {
    pub results: Results,
    pub skipped: Vec<String>,
    pub auth_required: Vec<String>,
}

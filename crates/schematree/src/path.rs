use std::fmt;

/// Location of a node inside the schema hierarchy, e.g.
/// `["network_config", "subnet_id"]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SchemaPath(Vec<String>);

impl SchemaPath {
    pub fn new(segments: Vec<String>) -> Self {
        Self(segments)
    }

    pub fn root(segment: impl Into<String>) -> Self {
        Self(vec![segment.into()])
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        Self(segments)
    }

    pub fn parent(&self) -> Option<Self> {
        match self.0.len() {
            0 | 1 => None,
            n => Some(Self(self.0[..n - 1].to_vec())),
        }
    }

    /// True when `self` lies strictly below `ancestor`.
    pub fn is_strict_descendant_of(&self, ancestor: &SchemaPath) -> bool {
        self.0.len() > ancestor.0.len() && self.0.starts_with(&ancestor.0)
    }

    /// Every proper, non-empty prefix from the shortest to the longest.
    pub fn strict_prefixes(&self) -> impl Iterator<Item = SchemaPath> + '_ {
        (1..self.0.len()).map(move |n| Self(self.0[..n].to_vec()))
    }

    /// Dot-joined form, used as graph key and in resource references.
    pub fn dotted(&self) -> String {
        self.0.join(".")
    }

    /// Underscore-joined form, used for exported declaration names.
    pub fn flat_name(&self) -> String {
        self.0.join("_")
    }
}

impl fmt::Display for SchemaPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dotted())
    }
}

impl From<Vec<String>> for SchemaPath {
    fn from(segments: Vec<String>) -> Self {
        Self(segments)
    }
}

impl From<&[&str]> for SchemaPath {
    fn from(segments: &[&str]) -> Self {
        Self(segments.iter().map(|s| s.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for SchemaPath {
    fn from(segments: [&str; N]) -> Self {
        Self(segments.iter().map(|s| s.to_string()).collect())
    }
}

use std::collections::BTreeSet;

/// Allowlist of verified material suppliers.
///
/// Matching ignores case and surrounding whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SourceRegistry {
    verified: BTreeSet<String>,
}

const VERIFIED_SUPPLIERS: &[&str] = &[
    "EcoCement Co.",
    "NatureBricks",
    "EarthInnovations",
    "PlasticCycle",
    "Sustainable Works",
    "GreenBuild Ltd.",
    "certified-supplier-a",
    "eco-source-b",
    "govt-agency-c",
];

fn normalize(source: &str) -> String {
    source.trim().to_lowercase()
}

impl SourceRegistry {
    pub fn new<I, S>(sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            verified: sources.into_iter().map(|s| normalize(s.as_ref())).collect(),
        }
    }

    /// The built-in list of certified suppliers.
    pub fn verified_defaults() -> Self {
        Self::new(VERIFIED_SUPPLIERS.iter().copied())
    }

    pub fn register(&mut self, source: &str) {
        self.verified.insert(normalize(source));
    }

    pub fn is_verified(&self, source: &str) -> bool {
        self.verified.contains(&normalize(source))
    }

    pub fn len(&self) -> usize {
        self.verified.len()
    }

    pub fn is_empty(&self) -> bool {
        self.verified.is_empty()
    }
}

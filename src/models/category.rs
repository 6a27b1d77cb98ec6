/// The fixed set of spending categories an expense can be filed under.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Food,
    Utilities,
    Entertainment,
    #[default]
    Others,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Food => "Food",
            Self::Utilities => "Utilities",
            Self::Entertainment => "Entertainment",
            Self::Others => "Others",
        }
    }

    /// Case-insensitive lookup. Unknown names yield `None` rather than a
    /// fallback so stored rows with stray categories stay distinguishable.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "food" => Some(Self::Food),
            "utilities" => Some(Self::Utilities),
            "entertainment" => Some(Self::Entertainment),
            "others" | "other" => Some(Self::Others),
            _ => None,
        }
    }

    /// Exact match against the stored spelling. Anything else, including a
    /// differently-cased name, is not one of the known categories.
    pub fn from_stored(s: &str) -> Option<Self> {
        Self::all().iter().copied().find(|c| c.as_str() == s)
    }

    pub fn all() -> &'static [Category] {
        &[
            Self::Food,
            Self::Utilities,
            Self::Entertainment,
            Self::Others,
        ]
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

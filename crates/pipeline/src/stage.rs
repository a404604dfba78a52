use std::fmt;

/// Where a run is. Logged on every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Parse,
    Normalize,
    Upsert,
    ResolveOrganizations,
    ResolveIngredients,
    ResolveCategories,
    Aggregate,
    Completed,
    Cancelled,
}

impl Stage {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Parse => "parse",
            Self::Normalize => "normalize",
            Self::Upsert => "upsert",
            Self::ResolveOrganizations => "resolve-organizations",
            Self::ResolveIngredients => "resolve-ingredients",
            Self::ResolveCategories => "resolve-categories",
            Self::Aggregate => "aggregate",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// One slot collected while walking a paginated listing
///
/// A listing page normally contributes one `Id` per result. The other two
/// variants are what a page can degrade into when its request fails, so the
/// walker's output keeps one entry per contribution without mixing
/// identifiers and text in a single untyped list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingEntry {
    /// Item identifier (a detail URL) read from a listing result
    Id(String),

    /// Value recovered from a retried page after an interrupted transfer.
    /// The retry response is read as a single result, so only its
    /// `full_text` is kept.
    Recovered { full_text: Option<String> },

    /// A page that could not be fetched at all
    Missing,
}

impl ListingEntry {
    /// Returns the identifier if this entry is one
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Id(id) => Some(id),
            _ => None,
        }
    }

    /// Returns true for entries that stand in for a failed page
    pub fn is_degraded(&self) -> bool {
        !matches!(self, Self::Id(_))
    }
}

//! Filter, search, and sort composition for the discount listing.
//!
//! [`DiscountQuery`] is a backend-agnostic description of the current
//! filter state. The HTTP client translates it into data-service query
//! parameters; [`DiscountQuery::apply`] evaluates the same predicates
//! over an already-fetched list (the in-memory fallback), so the
//! composition logic stays unit-testable without a live backend.

use core::cmp::Ordering;

use crate::models::Discount;

/// Maximum length of a sanitized search term, in characters.
pub const MAX_SEARCH_LEN: usize = 100;

/// Normalizes free-text search input.
///
/// Strips every character that is not an ASCII word character
/// (`[A-Za-z0-9_]`) or whitespace, trims, and caps the result at
/// [`MAX_SEARCH_LEN`] characters. Whitespace is preserved, never
/// collapsed. The trailing trim after the cap keeps the function
/// idempotent. Invalid input degrades to an empty string; the output
/// always satisfies `^[\w\s]*$`.
#[must_use]
pub fn sanitize_search(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .filter(|ch| ch.is_ascii_alphanumeric() || *ch == '_' || ch.is_whitespace())
        .collect();
    let capped: String = cleaned.trim().chars().take(MAX_SEARCH_LEN).collect();
    capped.trim_end().to_owned()
}

/// Multi-select filter state for one dimension (brand or day).
///
/// Toggle operations return a new set and never mutate in place, which
/// keeps change detection a plain equality check.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    /// Selected values, in insertion order.
    values: Vec<String>,
}

impl SelectionSet {
    /// Creates an empty selection.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self { values: Vec::new() }
    }

    /// Returns `true` if nothing is selected.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the number of selected values.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if `value` is selected.
    #[inline]
    #[must_use]
    pub fn contains(&self, value: &str) -> bool {
        self.values.iter().any(|v| v == value)
    }

    /// Iterates over the selected values in insertion order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(String::as_str)
    }

    /// Returns a new set with `value`'s membership toggled.
    #[must_use]
    pub fn toggle(&self, value: &str) -> Self {
        let mut values = self.values.clone();
        if let Some(pos) = values.iter().position(|v| v == value) {
            drop(values.remove(pos));
        } else {
            values.push(value.to_owned());
        }
        Self { values }
    }

    /// Returns a new set with `value` toggled under sentinel
    /// exclusivity rules.
    ///
    /// Toggling the sentinel clears the set or replaces it with just
    /// the sentinel; toggling a concrete value while the sentinel is
    /// selected replaces the set with just that value. The result never
    /// contains the sentinel together with a concrete value.
    #[must_use]
    pub fn toggle_exclusive(&self, value: &str, sentinel: &str) -> Self {
        if value == sentinel {
            if self.contains(sentinel) {
                Self::new()
            } else {
                Self {
                    values: vec![sentinel.to_owned()],
                }
            }
        } else if self.contains(sentinel) {
            Self {
                values: vec![value.to_owned()],
            }
        } else {
            self.toggle(value)
        }
    }
}

impl FromIterator<String> for SelectionSet {
    #[inline]
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Column a listing can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortField {
    /// Discount percentage.
    Discount,
    /// Reimbursement limit.
    ReimbursementLimit,
    /// Fuel brand.
    FuelBrand,
    /// Day descriptor.
    Day,
}

impl SortField {
    /// Returns the backend column name for this field.
    #[inline]
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::Discount => "discount",
            Self::ReimbursementLimit => "reimbursement_limit",
            Self::FuelBrand => "fuel_brand",
            Self::Day => "day",
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortDirection {
    /// Smallest first.
    Asc,
    /// Largest first.
    Desc,
}

impl SortDirection {
    /// Returns the opposite direction.
    #[inline]
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    /// Returns the backend keyword for this direction.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// A sort field paired with a direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SortSpec {
    /// Column to sort by.
    pub field: SortField,
    /// Direction to sort in.
    pub direction: SortDirection,
}

impl SortSpec {
    /// Computes the spec resulting from a column-header interaction.
    ///
    /// Selecting the already-active field flips the direction;
    /// selecting a new field resets the direction to descending.
    #[must_use]
    pub fn select(current: Option<Self>, field: SortField) -> Self {
        match current {
            Some(spec) if spec.field == field => Self {
                field,
                direction: spec.direction.flipped(),
            },
            Some(_) | None => Self {
                field,
                direction: SortDirection::Desc,
            },
        }
    }

    /// Compares two records by this spec.
    ///
    /// Numeric fields compare numerically; string fields compare
    /// lexicographically, case-insensitively. An absent reimbursement
    /// limit (no cap) sorts above every bounded limit. Descending
    /// reverses the comparison.
    #[must_use]
    pub fn compare(&self, a: &Discount, b: &Discount) -> Ordering {
        let ordering = match self.field {
            SortField::Discount => a.discount.cmp(&b.discount),
            SortField::ReimbursementLimit => {
                compare_limits(a.reimbursement_limit, b.reimbursement_limit)
            }
            SortField::FuelBrand => compare_ci(a.fuel_brand.as_str(), b.fuel_brand.as_str()),
            SortField::Day => compare_ci(&a.day, &b.day),
        };
        match self.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

/// Compares reimbursement limits, treating `None` (no cap) as largest.
fn compare_limits(a: Option<u32>, b: Option<u32>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(x), Some(y)) => x.cmp(&y),
    }
}

/// Case-insensitive lexicographic comparison.
fn compare_ci(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

/// Case-insensitive substring test; `needle` must already be lowercase.
fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

/// Backend-agnostic description of the current filter, search, and
/// sort state.
///
/// # Examples
///
/// ```
/// use surtidor_rs::query::{DiscountQuery, SortField};
///
/// let query = DiscountQuery::new()
///     .brand("YPF")
///     .day("Lunes")
///     .search("visa!!")
///     .sorted_by(SortField::Discount);
/// assert_eq!(query.search, "visa");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscountQuery {
    /// Selected brands; empty means all brands.
    pub brands: SelectionSet,
    /// Selected days; empty means all days.
    pub days: SelectionSet,
    /// Sanitized search term; empty means no search.
    pub search: String,
    /// Active sort, if any.
    pub sort: Option<SortSpec>,
}

impl DiscountQuery {
    /// Creates an empty query matching every record.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggles a brand filter value.
    #[inline]
    #[must_use]
    pub fn brand(mut self, value: &str) -> Self {
        self.brands = self.brands.toggle(value);
        self
    }

    /// Toggles a day filter value under sentinel exclusivity.
    #[inline]
    #[must_use]
    pub fn day(mut self, value: &str) -> Self {
        self.days = self
            .days
            .toggle_exclusive(value, crate::models::days::EVERY_DAY);
        self
    }

    /// Replaces the search term with the sanitized form of `raw`.
    #[inline]
    #[must_use]
    pub fn search(mut self, raw: &str) -> Self {
        self.search = sanitize_search(raw);
        self
    }

    /// Applies a column-header sort interaction (see
    /// [`SortSpec::select`]).
    #[inline]
    #[must_use]
    pub fn sorted_by(mut self, field: SortField) -> Self {
        self.sort = Some(SortSpec::select(self.sort, field));
        self
    }

    /// Returns `true` if the record satisfies every active predicate.
    #[must_use]
    pub fn matches(&self, discount: &Discount) -> bool {
        self.matches_brand(discount) && self.matches_day(discount) && self.matches_search(discount)
    }

    /// Checks brand membership (exact match against canonical values).
    fn matches_brand(&self, discount: &Discount) -> bool {
        self.brands.is_empty() || self.brands.contains(discount.fuel_brand.as_str())
    }

    /// Checks whether the record's day field contains any selected day
    /// (case-insensitive substring — the field may be composite).
    fn matches_day(&self, discount: &Discount) -> bool {
        if self.days.is_empty() {
            return true;
        }
        let day_lower = discount.day.to_lowercase();
        self.days
            .iter()
            .any(|selected| day_lower.contains(&selected.to_lowercase()))
    }

    /// Checks the search term against every eligible field.
    ///
    /// Payment method and frequency are always eligible; brand and day
    /// are eligible only while their own filter dimension is inactive.
    /// A record matches if any eligible field contains the term.
    fn matches_search(&self, discount: &Discount) -> bool {
        if self.search.is_empty() {
            return true;
        }
        let term = self.search.to_lowercase();
        if contains_ci(&discount.card_method, &term)
            || discount.frequency.as_str().contains(&term)
        {
            return true;
        }
        if self.brands.is_empty() && contains_ci(discount.fuel_brand.as_str(), &term) {
            return true;
        }
        self.days.is_empty() && contains_ci(&discount.day, &term)
    }

    /// In-memory fallback: filters and sorts an already-fetched list.
    #[must_use]
    pub fn apply(&self, records: Vec<Discount>) -> Vec<Discount> {
        let mut filtered: Vec<Discount> = records
            .into_iter()
            .filter(|discount| self.matches(discount))
            .collect();
        if let Some(spec) = self.sort {
            filtered.sort_by(|a, b| spec.compare(a, b));
        }
        filtered
    }
}

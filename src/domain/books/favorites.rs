use crate::domain::ids::BookId;

/// Upper bound on the number of books a profile may pin as favorites.
pub const MAX_FAVORITES: usize = 5;

/// Deduplicate the requested favorites, preserving order, and cap the list at
/// [`MAX_FAVORITES`]. Entries past the cap are ignored rather than rejected.
pub fn select_favorites(requested: &[BookId]) -> Vec<BookId> {
    let mut selected = Vec::with_capacity(MAX_FAVORITES);
    for id in requested {
        if selected.len() == MAX_FAVORITES {
            break;
        }
        if !selected.contains(id) {
            selected.push(*id);
        }
    }
    selected
}

//! Static helpers over anything iterable
//!
//! Callbacks receive the item's position first and the item second.

/// Call `callback` for every item
pub fn each<I, F>(iterable: I, mut callback: F)
where
    I: IntoIterator,
    F: FnMut(usize, I::Item),
{
    iterable
        .into_iter()
        .enumerate()
        .for_each(|(index, item)| callback(index, item));
}

/// Collect `callback`'s result for every item, in order
pub fn map<I, F, T>(iterable: I, mut callback: F) -> Vec<T>
where
    I: IntoIterator,
    F: FnMut(usize, I::Item) -> T,
{
    iterable
        .into_iter()
        .enumerate()
        .map(|(index, item)| callback(index, item))
        .collect()
}

/// Keep the items `callback` accepts; order is preserved
///
/// `index` is the item's position in the input, not in the output.
pub fn filter<I, F>(iterable: I, mut callback: F) -> Vec<I::Item>
where
    I: IntoIterator,
    F: FnMut(usize, &I::Item) -> bool,
{
    iterable
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| callback(index, &item).then_some(item))
        .collect()
}

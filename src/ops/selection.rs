/// Keep the user's current item selected across a list recomputation.
///
/// `remembered` is the id that was at the cursor before the list changed.
/// If it is still present, its new position wins. Otherwise the old index is
/// clamped to the new length (0 for an empty list).
pub fn resolve<S: AsRef<str>>(new_ids: &[S], remembered: Option<&str>, old_index: usize) -> usize {
    if let Some(id) = remembered
        && let Some(pos) = new_ids.iter().position(|s| s.as_ref() == id)
    {
        return pos;
    }
    clamp(old_index, new_ids.len())
}

/// Clamp an index into `[0, len - 1]`, or 0 when empty
pub fn clamp(index: usize, len: usize) -> usize {
    if len == 0 { 0 } else { index.min(len - 1) }
}

/// Move `index` by `delta` within a list of `len` items, stopping at the edges
pub fn step(index: usize, delta: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let target = index as isize + delta;
    clamp(target.max(0) as usize, len)
}

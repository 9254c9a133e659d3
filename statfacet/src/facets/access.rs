use crate::backends::{Hit, PermissionPredicate};
use crate::Result;

/// Count the hits in `sample` that `predicate` lets the caller see.
///
/// Errors from the source (a failed page fetch) or from the predicate abort
/// the count.
pub fn accessible_count<I, P>(sample: I, predicate: &P) -> Result<u64>
where
    I: IntoIterator<Item = Result<Hit>>,
    P: PermissionPredicate + ?Sized,
{
    let mut count = 0;
    for hit in sample {
        if predicate.is_visible(&hit?)? {
            count += 1;
        }
    }
    Ok(count)
}

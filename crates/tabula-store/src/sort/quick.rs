//! In-place quicksort with a median-of-three pivot and three-way partitioning.
//!
//! Not stable: records that compare equal may come out in any order.

use std::cmp::Ordering;

pub(crate) fn sort_by<T, F>(items: &mut [T], compare: &mut F)
where
    F: FnMut(&T, &T) -> Ordering,
{
    let mut slice = items;
    while slice.len() > 1 {
        let (lt, gt) = partition(slice, compare);
        let (left, rest) = std::mem::take(&mut slice).split_at_mut(lt);
        let right = &mut rest[gt - lt..];
        // Recurse into the smaller side to keep the stack logarithmic.
        if left.len() < right.len() {
            sort_by(left, &mut *compare);
            slice = right;
        } else {
            sort_by(right, &mut *compare);
            slice = left;
        }
    }
}

/// Returns `(lt, gt)` such that `items[..lt]` < pivot, `items[lt..gt]` ==
/// pivot and `items[gt..]` > pivot.
fn partition<T, F>(items: &mut [T], compare: &mut F) -> (usize, usize)
where
    F: FnMut(&T, &T) -> Ordering,
{
    let pivot = median_of_three(items, compare);
    items.swap(0, pivot);

    let mut lt = 0;
    let mut i = 1;
    let mut gt = items.len();
    while i < gt {
        match compare(&items[i], &items[lt]) {
            Ordering::Less => {
                items.swap(lt, i);
                lt += 1;
                i += 1;
            }
            Ordering::Greater => {
                gt -= 1;
                items.swap(i, gt);
            }
            Ordering::Equal => i += 1,
        }
    }
    (lt, gt)
}

fn median_of_three<T, F>(items: &[T], compare: &mut F) -> usize
where
    F: FnMut(&T, &T) -> Ordering,
{
    let last = items.len() - 1;
    let mut idx = [0, last / 2, last];
    if compare(&items[idx[1]], &items[idx[0]]) == Ordering::Less {
        idx.swap(0, 1);
    }
    if compare(&items[idx[2]], &items[idx[1]]) == Ordering::Less {
        idx.swap(1, 2);
        if compare(&items[idx[1]], &items[idx[0]]) == Ordering::Less {
            idx.swap(0, 1);
        }
    }
    idx[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sorts_with_duplicates() {
        let mut values = vec![5, 3, 9, 3, 1, 5, 5, 0, 12, 3];
        sort_by(&mut values, &mut |a: &i32, b: &i32| a.cmp(b));
        assert_eq!(values, vec![0, 1, 3, 3, 3, 5, 5, 5, 9, 12]);
    }

    #[test]
    fn handles_degenerate_inputs() {
        let mut empty: Vec<i32> = Vec::new();
        sort_by(&mut empty, &mut |a: &i32, b: &i32| a.cmp(b));
        assert!(empty.is_empty());

        let mut same = vec![7; 64];
        sort_by(&mut same, &mut |a: &i32, b: &i32| a.cmp(b));
        assert_eq!(same, vec![7; 64]);

        let mut descending: Vec<i32> = (0..200).rev().collect();
        sort_by(&mut descending, &mut |a: &i32, b: &i32| a.cmp(b));
        assert_eq!(descending, (0..200).collect::<Vec<_>>());
    }
}

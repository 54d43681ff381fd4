//! Heapsort made stable by breaking ties on input position.

use std::cmp::Ordering;

pub(crate) fn sort_by<T, F>(items: Vec<T>, compare: &mut F) -> Vec<T>
where
    F: FnMut(&T, &T) -> Ordering,
{
    let mut keyed: Vec<(usize, T)> = items.into_iter().enumerate().collect();
    let mut is_less = |a: &(usize, T), b: &(usize, T)| {
        compare(&a.1, &b.1).then(a.0.cmp(&b.0)) == Ordering::Less
    };

    let len = keyed.len();
    for node in (0..len / 2).rev() {
        sift_down(&mut keyed, node, len, &mut is_less);
    }
    for end in (1..len).rev() {
        keyed.swap(0, end);
        sift_down(&mut keyed, 0, end, &mut is_less);
    }

    keyed.into_iter().map(|(_, item)| item).collect()
}

fn sift_down<T, F>(heap: &mut [T], mut node: usize, end: usize, is_less: &mut F)
where
    F: FnMut(&T, &T) -> bool,
{
    loop {
        let mut child = 2 * node + 1;
        if child >= end {
            break;
        }
        if child + 1 < end && is_less(&heap[child], &heap[child + 1]) {
            child += 1;
        }
        if !is_less(&heap[node], &heap[child]) {
            break;
        }
        heap.swap(node, child);
        node = child;
    }
}

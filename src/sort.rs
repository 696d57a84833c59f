//! In-place quicksort over abstract positions.
//!
//! The sort never touches values directly: it only asks the data to compare two positions and to
//! swap two positions. This lets parallel sequences (e.g. codepoints and the widths they map to)
//! be sorted through one indirection.

use std::cmp::Ordering;

/// Ranges shorter than this are insertion sorted.
const INSERTION_SORT_THRESHOLD: isize = 16;
/// Ranges longer than this pick their pivot as a pseudomedian of 9.
const MEDIAN_OF_NINE_THRESHOLD: isize = 128;

/// Data which can be sorted by position.
///
/// `compare` and `swap` always act on the *current* contents of the given slots.
pub trait IndexedSortable {
    fn compare(&self, a: usize, b: usize) -> Ordering;

    fn swap(&mut self, a: usize, b: usize);
}

impl<T: Ord> IndexedSortable for [T] {
    #[inline]
    fn compare(&self, a: usize, b: usize) -> Ordering {
        self[a].cmp(&self[b])
    }

    #[inline]
    fn swap(&mut self, a: usize, b: usize) {
        <[T]>::swap(self, a, b)
    }
}

struct ByCallbacks<'a, T: ?Sized, C, S> {
    data: &'a mut T,
    compare: C,
    swap: S,
}

impl<'a, T, C, S> IndexedSortable for ByCallbacks<'a, T, C, S>
where
    T: ?Sized,
    C: Fn(&T, usize, usize) -> Ordering,
    S: FnMut(&mut T, usize, usize),
{
    #[inline]
    fn compare(&self, a: usize, b: usize) -> Ordering {
        (self.compare)(&*self.data, a, b)
    }

    #[inline]
    fn swap(&mut self, a: usize, b: usize) {
        (self.swap)(&mut *self.data, a, b)
    }
}

/// Sorts the positions `[from, to)` of `data`. Not stable.
///
/// An empty or reversed range is a no-op.
pub fn quick_sort<T: IndexedSortable + ?Sized>(from: usize, to: usize, data: &mut T) {
    if to <= from {
        return;
    }
    sort_range(data, from as isize, to as isize);
}

/// Same as [`quick_sort`], but with a comparator and a swapper given as closures.
///
/// Both closures receive `data`, so the comparator may read what the swapper mutates.
///
/// ```
/// use glyph_widths::sort::quick_sort_by;
///
/// let widths = [3.0f32, 1.0, 2.0];
/// let mut order = vec![0usize, 1, 2];
/// quick_sort_by(0, order.len(), &mut order,
///     |order, a, b| widths[order[a]].total_cmp(&widths[order[b]]),
///     |order, a, b| order.swap(a, b));
/// assert_eq!(order, [1, 2, 0]);
/// ```
pub fn quick_sort_by<T, C, S>(from: usize, to: usize, data: &mut T, compare: C, swap: S)
where
    T: ?Sized,
    C: Fn(&T, usize, usize) -> Ordering,
    S: FnMut(&mut T, usize, usize),
{
    quick_sort(from, to, &mut ByCallbacks { data, compare, swap });
}

#[inline]
fn cmp<T: IndexedSortable + ?Sized>(data: &T, a: isize, b: isize) -> Ordering {
    data.compare(a as usize, b as usize)
}

#[inline]
fn swap<T: IndexedSortable + ?Sized>(data: &mut T, a: isize, b: isize) {
    data.swap(a as usize, b as usize)
}

fn swap_block<T: IndexedSortable + ?Sized>(data: &mut T, a: isize, b: isize, n: isize) {
    for i in 0..n {
        swap(data, a + i, b + i);
    }
}

fn med3<T: IndexedSortable + ?Sized>(data: &T, a: isize, b: isize, c: isize) -> isize {
    let ab = cmp(data, a, b);
    let ac = cmp(data, a, c);
    let bc = cmp(data, b, c);
    if ab == Ordering::Less {
        if bc == Ordering::Less {
            b
        } else if ac == Ordering::Less {
            c
        } else {
            a
        }
    } else if bc == Ordering::Greater {
        b
    } else if ac == Ordering::Greater {
        c
    } else {
        a
    }
}

fn insertion_sort<T: IndexedSortable + ?Sized>(data: &mut T, from: isize, to: isize) {
    for i in from..to {
        let mut j = i;
        while j > from && cmp(data, j - 1, j) == Ordering::Greater {
            swap(data, j, j - 1);
            j -= 1;
        }
    }
}

fn sort_range<T: IndexedSortable + ?Sized>(data: &mut T, mut from: isize, mut to: isize) {
    loop {
        let len = to - from;
        if len < INSERTION_SORT_THRESHOLD {
            insertion_sort(data, from, to);
            return;
        }

        // pivot
        let mut m = from + len / 2;
        let mut l = from;
        let mut n = to - 1;
        if len > MEDIAN_OF_NINE_THRESHOLD {
            let s = len / 8;
            l = med3(data, l, l + s, l + 2 * s);
            m = med3(data, m - s, m, m + s);
            n = med3(data, n - 2 * s, n - s, n);
        }
        m = med3(data, l, m, n);

        // Establish invariant: v* (<v)* (>v)* v*
        let mut a = from;
        let mut b = a;
        let mut c = to - 1;
        let mut d = c;
        loop {
            while b <= c {
                let ordering = cmp(data, b, m);
                if ordering == Ordering::Greater {
                    break;
                }
                if ordering == Ordering::Equal {
                    // the pivot itself may be moved
                    if a == m {
                        m = b;
                    } else if b == m {
                        m = a;
                    }
                    swap(data, a, b);
                    a += 1;
                }
                b += 1;
            }
            while c >= b {
                let ordering = cmp(data, c, m);
                if ordering == Ordering::Less {
                    break;
                }
                if ordering == Ordering::Equal {
                    if c == m {
                        m = d;
                    } else if d == m {
                        m = c;
                    }
                    swap(data, c, d);
                    d -= 1;
                }
                c -= 1;
            }
            if b > c {
                break;
            }
            // b compares greater and c compares less than the pivot, so neither holds it.
            debug_assert!(b != m && c != m);
            swap(data, b, c);
            b += 1;
            c -= 1;
        }

        // Swap the equal runs back to the middle
        let s = (a - from).min(b - a);
        swap_block(data, from, b - s, s);
        let s = (d - c).min(to - d - 1);
        swap_block(data, b, to - s, s);

        // Recurse into the smaller side, loop on the larger one.
        let less = b - a;
        let greater = d - c;
        if less <= greater {
            if less > 1 {
                sort_range(data, from, from + less);
            }
            if greater <= 1 {
                return;
            }
            from = to - greater;
        } else {
            if greater > 1 {
                sort_range(data, to - greater, to);
            }
            if less <= 1 {
                return;
            }
            to = from + less;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pseudo_random(len: usize, modulo: u32) -> Vec<u32> {
        let mut state: u32 = 0x2545_f491;
        (0..len)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                state % modulo
            })
            .collect()
    }

    fn assert_sorted<T: Ord + std::fmt::Debug>(v: &[T]) {
        for pair in v.windows(2) {
            assert!(pair[0] <= pair[1], "{:?} is not sorted", pair);
        }
    }

    #[test]
    fn empty_and_single_are_untouched() {
        let mut empty: Vec<u32> = vec![];
        quick_sort(0, 0, &mut empty[..]);
        assert!(empty.is_empty());

        let mut single = vec![42];
        quick_sort(0, 1, &mut single[..]);
        assert_eq!(single, [42]);
    }

    #[test]
    fn reversed_range_is_a_no_op() {
        let mut v = vec![3, 2, 1];
        quick_sort(2, 1, &mut v[..]);
        assert_eq!(v, [3, 2, 1]);
    }

    #[test]
    fn sorts_below_insertion_threshold() {
        let mut v = vec![5, 3, 9, 1, 1, 0, 7];
        let len = v.len();
        quick_sort(0, len, &mut v[..]);
        assert_eq!(v, [0, 1, 1, 3, 5, 7, 9]);
    }

    #[test]
    fn sorts_mid_sized_with_duplicates() {
        let mut v = pseudo_random(100, 7);
        let mut expected = v.clone();
        expected.sort();
        let len = v.len();
        quick_sort(0, len, &mut v[..]);
        assert_eq!(v, expected);
    }

    #[test]
    fn sorts_large_ranges() {
        for &modulo in &[2, 50, u32::max_value()] {
            let mut v = pseudo_random(5000, modulo);
            let len = v.len();
            quick_sort(0, len, &mut v[..]);
            assert_sorted(&v);
        }
    }

    #[test]
    fn sorts_already_ordered_and_reversed_input() {
        let mut ascending: Vec<u32> = (0..1000).collect();
        quick_sort(0, 1000, &mut ascending[..]);
        assert_sorted(&ascending);

        let mut descending: Vec<u32> = (0..1000).rev().collect();
        quick_sort(0, 1000, &mut descending[..]);
        assert_eq!(descending, (0..1000).collect::<Vec<_>>());
    }

    #[test]
    fn only_touches_the_given_range() {
        let mut v = pseudo_random(300, 1000);
        let before = v.clone();
        quick_sort(50, 250, &mut v[..]);
        assert_eq!(&v[..50], &before[..50]);
        assert_eq!(&v[250..], &before[250..]);
        assert_sorted(&v[50..250]);
    }

    #[test]
    fn sorts_parallel_sequences_through_callbacks() {
        let keys = pseudo_random(400, 64);
        let mut payload: Vec<(u32, usize)> = keys.iter().cloned().zip(0..).collect();
        let len = payload.len();
        quick_sort_by(
            0,
            len,
            &mut payload,
            |p, a, b| p[a].0.cmp(&p[b].0),
            |p, a, b| p.swap(a, b),
        );
        for pair in payload.windows(2) {
            assert!(pair[0].0 <= pair[1].0);
        }
        // every payload still sits next to its own key
        for (key, origin) in &payload {
            assert_eq!(keys[*origin], *key);
        }
    }
}

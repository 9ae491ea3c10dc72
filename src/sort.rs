/// In-place quicksort, ascending by `key`, pivoting on the middle element.
///
/// Ranges are kept on an explicit stack so large populations cannot blow the
/// call stack. Equal keys are swapped past each other rather than skipped,
/// which keeps every partition shrinking even when all keys are equal. Ties
/// end up in no particular order.
pub fn quicksort_by_key<T, F>(items: &mut [T], key: F)
where
    F: Fn(&T) -> f32,
{
    if items.len() < 2 {
        return;
    }

    let mut ranges: Vec<(usize, usize)> = vec![(0, items.len() - 1)];
    while let Some((lo, hi)) = ranges.pop() {
        let pivot = key(&items[lo + (hi - lo) / 2]);
        let mut i = lo as isize;
        let mut j = hi as isize;

        while i <= j {
            while key(&items[i as usize]) < pivot {
                i += 1;
            }
            while key(&items[j as usize]) > pivot {
                j -= 1;
            }
            if i <= j {
                items.swap(i as usize, j as usize);
                i += 1;
                j -= 1;
            }
        }

        if (lo as isize) < j {
            ranges.push((lo, j as usize));
        }
        if i < hi as isize {
            ranges.push((i as usize, hi));
        }
    }
}

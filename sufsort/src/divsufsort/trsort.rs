// Copyright 2024 Logan Magee
//
// SPDX-License-Identifier: LicenseRef-Proprietary

//! Rank doubling over the reduced string of B* names.
//!
//! Groups of suffixes sharing a rank are refined by comparing the ranks found `depth` positions
//! later, doubling `depth` on every pass. Groups whose members are periodic (tandem repeats) are
//! finished by copying the order of an already sorted shifted group instead of being refined
//! further. A [`Budget`] caps the refinement work spent per pass; groups it cuts off are revisited
//! on the next pass.

use super::{
    Observer,
    mark::{flip, is_marked},
    select::{heapsort, partition, pivot},
    stack::Stack,
    tables::ilg,
};
use crate::trace;

const TR_INSERTIONSORT_THRESHOLD: usize = 8;
const TR_STACKSIZE: usize = 64;

/// Limits how much refinement a single pass may perform.
///
/// Each group refined costs its size. Once `remain` runs out, `chance` more refills of `incval`
/// are granted before further groups are refused and their sizes tallied in `count`.
#[derive(Debug, PartialEq, Eq)]
pub(super) struct Budget {
    chance: u32,
    remain: usize,
    incval: usize,
    count: usize,
}

impl Budget {
    /// Creates the budget for sorting `n` reduced suffixes.
    pub(super) fn new(n: usize) -> Self {
        Self {
            chance: (ilg(n).max(0) * 2 / 3) as u32,
            remain: n,
            incval: n,
            count: 0,
        }
    }

    /// Charges `size` items of work, returning `false` if the budget refuses it.
    pub(super) fn check(&mut self, size: usize) -> bool {
        if size <= self.remain {
            self.remain -= size;
            return true;
        }
        if self.chance == 0 {
            self.count += size;
            return false;
        }

        self.remain = self.remain + self.incval - size;
        self.chance -= 1;
        true
    }
}

/// How the range of the current frame should be processed next.
#[derive(Clone, Copy, Debug)]
enum Limit {
    /// Split out members whose rank points back into the range itself.
    Tandem,
    /// The range is sorted; publish its ranks and pick out any tied runs.
    Sorted,
    /// Introsort with the given remaining depth before falling back to heapsort.
    Depth(i32),
}

#[derive(Clone, Copy, Debug)]
struct Frame {
    isad: usize,
    first: usize,
    last: usize,
    limit: Limit,
    trlink: Option<usize>,
}

enum Task {
    Sort(Frame),
    /// Orders `sa[a..b]` from the sorted ranges around it once those are done.
    ///
    /// `partial` is set if any of the surrounding ranges were left unsorted by the budget, in which
    /// case only the ties that can be resolved are.
    Copy {
        isad: usize,
        first: usize,
        last: usize,
        a: usize,
        b: usize,
        trlink: Option<usize>,
        partial: bool,
    },
}

/// Sorts the suffixes of the reduced string whose current order and ranks are held in `sa` and
/// `isa`, starting by comparing ranks `depth` positions ahead.
///
/// On entry `sa` holds groups of suffixes sharing a rank, with runs of already sorted suffixes
/// replaced by their negated length, and `isa[i]` is the last position of suffix `i`'s group. On
/// return `isa` holds every suffix's final position.
pub(super) fn sort<O: Observer>(isa: &mut [i32], sa: &mut [i32], depth: usize, observer: &mut O) {
    let budget = Budget::new(sa.len());
    sort_with_budget(isa, sa, depth, budget, observer);
}

fn sort_with_budget<O: Observer>(
    isa: &mut [i32],
    sa: &mut [i32],
    depth: usize,
    mut budget: Budget,
    observer: &mut O,
) {
    let n = sa.len();
    let mut isad = depth;
    let mut passes = 0;

    while -(n as i32) < sa[0] {
        observer.resolver_pass(isad);
        passes += 1;

        let mut first = 0;
        let mut skip = 0i32;
        let mut unsorted = 0;
        loop {
            let t = sa[first];
            if is_marked(t) {
                first = (first as i32 - t) as usize;
                skip += t;
            } else {
                if skip != 0 {
                    sa[(first as i32 + skip) as usize] = skip;
                    skip = 0;
                }

                let last = isa[t as usize] as usize + 1;
                if 1 < last - first {
                    budget.count = 0;
                    introsort(isa, sa, isad, first, last, &mut budget, observer);
                    if budget.count != 0 {
                        unsorted += budget.count;
                    } else {
                        skip = first as i32 - last as i32;
                    }
                } else if last - first == 1 {
                    skip = -1;
                }
                first = last;
            }

            if n <= first {
                break;
            }
        }

        if skip != 0 {
            sa[(first as i32 + skip) as usize] = skip;
        }
        if unsorted == 0 {
            break;
        }

        isad += isad;
    }

    trace::resolved(n, passes);
}

/// Introsort by the ranks `isad` positions ahead, with tandem repeat detection.
fn introsort<O: Observer>(
    isa: &mut [i32],
    sa: &mut [i32],
    isad: usize,
    first: usize,
    last: usize,
    budget: &mut Budget,
    observer: &mut O,
) {
    let incr = isad;
    let mut stack: Stack<Task, TR_STACKSIZE> = Stack::new();
    let mut cur = Frame {
        isad,
        first,
        last,
        limit: Limit::Depth(ilg(last - first)),
        trlink: None,
    };

    loop {
        let Frame {
            isad,
            first,
            last,
            trlink,
            ..
        } = cur;
        let task = |isad, first, last, limit| {
            Task::Sort(Frame {
                isad,
                first,
                last,
                limit,
                trlink,
            })
        };

        match cur.limit {
            Limit::Tandem => {
                let prev = isad - incr;
                let key = |x: i32| isa[prev + x as usize];
                let (a, b) = partition(sa, &key, first, first, last, last as i32 - 1);

                // Members before and after the tandem run get ranks of their own
                if a < last {
                    let v = a as i32 - 1;
                    for c in first..a {
                        isa[sa[c] as usize] = v;
                    }
                }
                if b < last {
                    let v = b as i32 - 1;
                    for c in a..b {
                        isa[sa[c] as usize] = v;
                    }
                }

                if 1 < b - a {
                    stack.push(Task::Copy {
                        isad: prev,
                        first,
                        last,
                        a,
                        b,
                        trlink,
                        partial: false,
                    });
                    cur.trlink = Some(stack.len() - 1);
                }
                let trlink = cur.trlink;

                if a - first <= last - b {
                    if 1 < a - first {
                        stack.push(Task::Sort(Frame {
                            isad,
                            first: b,
                            last,
                            limit: Limit::Depth(ilg(last - b)),
                            trlink,
                        }));
                        cur.last = a;
                        cur.limit = Limit::Depth(ilg(a - first));
                    } else if 1 < last - b {
                        cur.first = b;
                        cur.limit = Limit::Depth(ilg(last - b));
                    } else {
                        let Some(frame) = next_frame(isa, sa, &mut stack, observer) else { return };
                        cur = frame;
                    }
                } else if 1 < last - b {
                    stack.push(Task::Sort(Frame {
                        isad,
                        first,
                        last: a,
                        limit: Limit::Depth(ilg(a - first)),
                        trlink,
                    }));
                    cur.first = b;
                    cur.limit = Limit::Depth(ilg(last - b));
                } else if 1 < a - first {
                    cur.last = a;
                    cur.limit = Limit::Depth(ilg(a - first));
                } else {
                    let Some(frame) = next_frame(isa, sa, &mut stack, observer) else { return };
                    cur = frame;
                }
            }

            Limit::Sorted => {
                let mut first = first;

                // Publish the final ranks of the leading run of sorted suffixes
                if first < last && !is_marked(sa[first]) {
                    let mut a = first;
                    loop {
                        isa[sa[a] as usize] = a as i32;
                        a += 1;
                        if !(a < last && !is_marked(sa[a])) {
                            break;
                        }
                    }
                    first = a;
                }

                if last <= first {
                    let Some(frame) = next_frame(isa, sa, &mut stack, observer) else { return };
                    cur = frame;
                    continue;
                }

                // The next tied run ends at the first unmarked item
                let mut a = first;
                loop {
                    sa[a] = flip(sa[a]);
                    a += 1;
                    if !is_marked(sa[a]) {
                        break;
                    }
                }
                let s = sa[a] as usize;
                let next = if isa[s] != isa[isad + s] {
                    Limit::Depth(ilg(a - first + 1))
                } else {
                    Limit::Tandem
                };
                a += 1;
                if a < last {
                    let v = a as i32 - 1;
                    for b in first..a {
                        isa[sa[b] as usize] = v;
                    }
                }

                if budget.check(a - first) {
                    if a - first <= last - a {
                        stack.push(task(isad, a, last, Limit::Sorted));
                        cur = Frame {
                            isad: isad + incr,
                            first,
                            last: a,
                            limit: next,
                            trlink,
                        };
                    } else if 1 < last - a {
                        stack.push(task(isad + incr, first, a, next));
                        cur.first = a;
                        cur.limit = Limit::Sorted;
                    } else {
                        cur = Frame {
                            isad: isad + incr,
                            first,
                            last: a,
                            limit: next,
                            trlink,
                        };
                    }
                } else {
                    mark_partial(&mut stack, trlink);
                    if 1 < last - a {
                        cur.first = a;
                        cur.limit = Limit::Sorted;
                    } else {
                        let Some(frame) = next_frame(isa, sa, &mut stack, observer) else { return };
                        cur = frame;
                    }
                }
            }

            Limit::Depth(_) if last - first <= TR_INSERTIONSORT_THRESHOLD => {
                insertion_sort(isa, sa, isad, first, last);
                cur.limit = Limit::Sorted;
            }

            Limit::Depth(0) => {
                let key = |x: i32| isa[isad + x as usize];
                heapsort(sa, &key, first, last - first);

                // Mark every item that ties with its successor
                let mut a = last as isize - 1;
                while (first as isize) < a {
                    let x = key(sa[a as usize]);
                    let mut b = a - 1;
                    while first as isize <= b && key(sa[b as usize]) == x {
                        sa[b as usize] = flip(sa[b as usize]);
                        b -= 1;
                    }
                    a = b;
                }

                cur.limit = Limit::Sorted;
            }

            Limit::Depth(limit) => {
                let limit = Limit::Depth(limit - 1);
                cur.limit = limit;

                let key = |x: i32| isa[isad + x as usize];
                let p = pivot(sa, &key, first, last);
                sa.swap(first, p);
                let v = key(sa[first]);

                let (a, b) = partition(sa, &key, first, first + 1, last, v);
                if last - first == b - a {
                    // Every item shares the pivot rank, so look further ahead
                    if budget.check(last - first) {
                        cur.limit = Limit::Depth(ilg(last - first));
                        cur.isad += incr;
                    } else {
                        mark_partial(&mut stack, trlink);
                        let Some(frame) = next_frame(isa, sa, &mut stack, observer) else { return };
                        cur = frame;
                    }
                    continue;
                }

                let next = if isa[sa[a] as usize] != v {
                    Limit::Depth(ilg(b - a))
                } else {
                    Limit::Tandem
                };

                let v = a as i32 - 1;
                for c in first..a {
                    isa[sa[c] as usize] = v;
                }
                if b < last {
                    let v = b as i32 - 1;
                    for c in a..b {
                        isa[sa[c] as usize] = v;
                    }
                }

                let middle = Frame {
                    isad: isad + incr,
                    first: a,
                    last: b,
                    limit: next,
                    trlink,
                };

                if 1 < b - a && budget.check(b - a) {
                    if a - first <= last - b {
                        if last - b <= b - a {
                            if 1 < a - first {
                                stack.push(Task::Sort(middle));
                                stack.push(task(isad, b, last, limit));
                                cur.last = a;
                            } else if 1 < last - b {
                                stack.push(Task::Sort(middle));
                                cur.first = b;
                            } else {
                                cur = middle;
                            }
                        } else if a - first <= b - a {
                            stack.push(task(isad, b, last, limit));
                            if 1 < a - first {
                                stack.push(Task::Sort(middle));
                                cur.last = a;
                            } else {
                                cur = middle;
                            }
                        } else {
                            stack.push(task(isad, b, last, limit));
                            stack.push(task(isad, first, a, limit));
                            cur = middle;
                        }
                    } else if a - first <= b - a {
                        if 1 < last - b {
                            stack.push(Task::Sort(middle));
                            stack.push(task(isad, first, a, limit));
                            cur.first = b;
                        } else if 1 < a - first {
                            stack.push(Task::Sort(middle));
                            cur.last = a;
                        } else {
                            cur = middle;
                        }
                    } else if last - b <= b - a {
                        stack.push(task(isad, first, a, limit));
                        if 1 < last - b {
                            stack.push(Task::Sort(middle));
                            cur.first = b;
                        } else {
                            cur = middle;
                        }
                    } else {
                        stack.push(task(isad, first, a, limit));
                        stack.push(task(isad, b, last, limit));
                        cur = middle;
                    }
                } else {
                    if 1 < b - a {
                        mark_partial(&mut stack, trlink);
                    }

                    if a - first <= last - b {
                        if 1 < a - first {
                            stack.push(task(isad, b, last, limit));
                            cur.last = a;
                        } else if 1 < last - b {
                            cur.first = b;
                        } else {
                            let Some(frame) = next_frame(isa, sa, &mut stack, observer) else { return };
                            cur = frame;
                        }
                    } else if 1 < last - b {
                        stack.push(task(isad, first, a, limit));
                        cur.first = b;
                    } else if 1 < a - first {
                        cur.last = a;
                    } else {
                        let Some(frame) = next_frame(isa, sa, &mut stack, observer) else { return };
                        cur = frame;
                    }
                }
            }
        }
    }
}

/// Pops the next range to sort, running any pending tandem repeat copies on the way.
fn next_frame<O: Observer>(
    isa: &mut [i32],
    sa: &mut [i32],
    stack: &mut Stack<Task, TR_STACKSIZE>,
    observer: &mut O,
) -> Option<Frame> {
    loop {
        match stack.pop()? {
            Task::Sort(frame) => return Some(frame),
            Task::Copy {
                isad,
                first,
                last,
                a,
                b,
                trlink,
                partial,
            } => {
                if partial {
                    observer.partial_copy(b - a);
                    mark_partial(stack, trlink);
                    partial_copy(isa, sa, first, a, b, last, isad);
                } else {
                    copy(isa, sa, first, a, b, last, isad);
                }
            }
        }
    }
}

/// Records against the enclosing tandem copy that part of its input was left unsorted.
fn mark_partial(stack: &mut Stack<Task, TR_STACKSIZE>, trlink: Option<usize>) {
    if let Some(Task::Copy { partial, .. }) = trlink.and_then(|link| stack.get_mut(link)) {
        *partial = true;
    }
}

fn insertion_sort(isa: &[i32], sa: &mut [i32], isad: usize, first: usize, last: usize) {
    let key = |x: i32| isa[isad + x as usize];
    let first = first as isize;

    for a in first + 1..last as isize {
        let t = sa[a as usize];
        let mut b = a - 1;

        let mut r;
        loop {
            r = key(t) - key(sa[b as usize]);
            if 0 <= r {
                break;
            }

            loop {
                sa[(b + 1) as usize] = sa[b as usize];
                b -= 1;
                if !(first <= b && is_marked(sa[b as usize])) {
                    break;
                }
            }
            if b < first {
                break;
            }
        }

        if r == 0 {
            sa[b as usize] = flip(sa[b as usize]);
        }
        sa[(b + 1) as usize] = t;
    }
}

/// Orders the tandem run `sa[a..b]` from the sorted suffixes on either side of it.
///
/// A member `s` of the run is followed `depth` positions later by another suffix of the same
/// range, so walking the sorted prefix forwards and the sorted suffix backwards visits the members
/// in order.
fn copy(
    isa: &mut [i32],
    sa: &mut [i32],
    first: usize,
    a: usize,
    b: usize,
    last: usize,
    depth: usize,
) {
    let v = b as i32 - 1;
    let depth = depth as i32;

    let mut c = first as isize;
    let mut d = a as isize - 1;
    while c <= d {
        let s = sa[c as usize] - depth;
        if 0 <= s && isa[s as usize] == v {
            d += 1;
            sa[d as usize] = s;
            isa[s as usize] = d as i32;
        }
        c += 1;
    }

    let mut c = last as isize - 1;
    let e = d + 1;
    let mut d = b as isize;
    while e < d {
        let s = sa[c as usize] - depth;
        if 0 <= s && isa[s as usize] == v {
            d -= 1;
            sa[d as usize] = s;
            isa[s as usize] = d as i32;
        }
        c -= 1;
    }
}

/// Like [`copy`], but only splits the run where the ranks `depth` positions ahead differ.
fn partial_copy(
    isa: &mut [i32],
    sa: &mut [i32],
    first: usize,
    a: usize,
    b: usize,
    last: usize,
    depth: usize,
) {
    let v = b as i32 - 1;
    let depth = depth as i32;
    let mut newrank = -1;

    let mut lastrank = -1;
    let mut c = first as isize;
    let mut d = a as isize - 1;
    while c <= d {
        let s = sa[c as usize] - depth;
        if 0 <= s && isa[s as usize] == v {
            d += 1;
            sa[d as usize] = s;
            let rank = isa[(s + depth) as usize];
            if lastrank != rank {
                lastrank = rank;
                newrank = d as i32;
            }
            isa[s as usize] = newrank;
        }
        c += 1;
    }

    lastrank = -1;
    let mut e = d;
    while first as isize <= e {
        let s = sa[e as usize] as usize;
        let rank = isa[s];
        if lastrank != rank {
            lastrank = rank;
            newrank = e as i32;
        }
        if newrank != rank {
            isa[s] = newrank;
        }
        e -= 1;
    }

    lastrank = -1;
    let mut c = last as isize - 1;
    let e = d + 1;
    let mut d = b as isize;
    while e < d {
        let s = sa[c as usize] - depth;
        if 0 <= s && isa[s as usize] == v {
            d -= 1;
            sa[d as usize] = s;
            let rank = isa[(s + depth) as usize];
            if lastrank != rank {
                lastrank = rank;
                newrank = d as i32;
            }
            isa[s as usize] = newrank;
        }
        c -= 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Passes {
        depths: Vec<usize>,
        partial_copies: usize,
    }

    impl Observer for Passes {
        fn resolver_pass(&mut self, depth: usize) {
            self.depths.push(depth);
        }

        fn partial_copy(&mut self, _len: usize) {
            self.partial_copies += 1;
        }
    }

    /// Groups the suffixes of `names` by their first name the way the resolver expects them:
    /// every member ranked at the last position of its group, and runs of single-member groups
    /// collapsed to their negated length.
    fn grouped(names: &[i32]) -> (Vec<i32>, Vec<i32>) {
        let n = names.len();
        let mut sa: Vec<i32> = (0..n as i32).collect();
        sa.sort_by_key(|&i| names[i as usize]);

        let mut isa = vec![0; n];
        let mut first = 0;
        while first < n {
            let name = names[sa[first] as usize];
            let len = sa[first..]
                .iter()
                .take_while(|&&i| names[i as usize] == name)
                .count();
            for &i in &sa[first..first + len] {
                isa[i as usize] = (first + len - 1) as i32;
            }
            first += len;
        }

        let mut first = 0;
        while first < n {
            let run = (first..n)
                .take_while(|&p| isa[sa[p] as usize] == p as i32)
                .count();
            if run > 0 {
                sa[first] = -(run as i32);
                first += run;
            } else {
                first = isa[sa[first] as usize] as usize + 1;
            }
        }

        (isa, sa)
    }

    fn naive_ranks(names: &[i32]) -> Vec<i32> {
        let mut order: Vec<usize> = (0..names.len()).collect();
        order.sort_by(|&a, &b| names[a..].cmp(&names[b..]));

        let mut ranks = vec![0; names.len()];
        for (rank, &i) in order.iter().enumerate() {
            ranks[i] = rank as i32;
        }
        ranks
    }

    fn periodic_names() -> Vec<i32> {
        // (0 0 0 1)^5 3
        let mut names = [0, 0, 0, 1].repeat(5);
        names.push(3);
        names
    }

    #[test]
    fn budget_refills_then_refuses() {
        let mut budget = Budget::new(4);
        assert_eq!(budget.chance, 1);

        assert!(budget.check(3), "fits in the initial allowance");
        assert!(budget.check(4), "uses the single refill");
        assert!(!budget.check(2), "no refills remain");
        assert!(budget.check(1), "the leftover allowance is still spendable");
        assert_eq!(budget.count, 2);
    }

    #[test]
    fn budget_grants_chances_by_size() {
        let budget = Budget::new(1000);
        assert_eq!(budget.chance, 6);
        assert_eq!(budget.remain, 1000);

        let budget = Budget::new(1);
        assert_eq!(budget.chance, 0);
    }

    #[test]
    fn resolves_short_groups() {
        // Names 1 0 1 0 2, grouped by their first name
        let mut sa = vec![1, 3, 0, 2, -1];
        let mut isa = vec![3, 1, 3, 1, 4];
        let mut passes = Passes::default();

        sort(&mut isa, &mut sa, 1, &mut passes);

        assert_eq!(isa, vec![2, 0, 3, 1, 4]);
        assert_eq!(passes.depths, vec![1]);
    }

    #[test]
    fn resolves_tandem_repeats() {
        // Names 0 0 0 0 1
        let mut sa = vec![0, 1, 2, 3, -1];
        let mut isa = vec![3, 3, 3, 3, 4];
        let mut passes = Passes::default();

        sort(&mut isa, &mut sa, 1, &mut passes);

        assert_eq!(isa, vec![0, 1, 2, 3, 4]);
        assert_eq!(passes.depths, vec![1]);
    }

    #[test]
    fn skips_fully_sorted_input() {
        let mut sa = vec![-3, 1, 2];
        let mut isa = vec![0, 1, 2];
        let mut passes = Passes::default();

        sort(&mut isa, &mut sa, 1, &mut passes);

        assert!(passes.depths.is_empty(), "{:?}", passes.depths);
    }

    #[test]
    fn grouping_matches_hand_built_input() {
        let (isa, sa) = grouped(&[1, 0, 1, 0, 2]);

        assert_eq!(sa, vec![1, 3, 0, 2, -1]);
        assert_eq!(isa, vec![3, 1, 3, 1, 4]);
    }

    #[test]
    fn default_budget_resolves_periodic_names_in_one_pass() {
        let names = periodic_names();
        let (mut isa, mut sa) = grouped(&names);
        let mut passes = Passes::default();

        sort(&mut isa, &mut sa, 1, &mut passes);

        assert_eq!(isa, naive_ranks(&names));
        assert_eq!(passes.depths, vec![1]);
        assert_eq!(passes.partial_copies, 0);
    }

    #[test]
    fn starved_budget_defers_groups_to_later_passes() {
        let names = periodic_names();

        for remain in [16, 30] {
            let (mut isa, mut sa) = grouped(&names);
            let budget = Budget {
                chance: 0,
                remain,
                incval: names.len(),
                count: 0,
            };
            let mut passes = Passes::default();

            sort_with_budget(&mut isa, &mut sa, 1, budget, &mut passes);

            assert_eq!(isa, naive_ranks(&names), "remain {remain}");
            assert_eq!(passes.depths, vec![1, 2, 4, 8], "remain {remain}");
            assert!(
                passes.partial_copies > 0,
                "remain {remain}: no tandem run was partly copied"
            );
        }
    }
}

/// A strict weak order over `T`, expressed as a "less than" predicate.
///
/// Two elements `a` and `b` are *equivalent* when neither `less(a, b)` nor
/// `less(b, a)` holds.  Equivalent elements may coexist in a
/// [`BPlusTree`](crate::BPlusTree).
///
/// Any `Fn(&T, &T) -> bool` closure is a `Compare<T>`, so custom orders do not
/// need a named type.
///
/// # Examples
/// ```
/// use bplus_chain::BPlusTree;
///
/// let mut t = BPlusTree::with_fanout_and_compare(3, |a: &i32, b: &i32| b < a)
///     .unwrap();
/// t.extend([1, 3, 2]);
/// assert!(t.iter().eq([3, 2, 1].iter()));
/// ```
pub trait Compare<T: ?Sized> {
    fn less(&self, a: &T, b: &T) -> bool;
}

/// Orders elements by their `Ord` implementation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Natural;

impl<T: Ord + ?Sized> Compare<T> for Natural {
    #[inline]
    fn less(&self, a: &T, b: &T) -> bool {
        a < b
    }
}

impl<T: ?Sized, F> Compare<T> for F
where
    F: Fn(&T, &T) -> bool,
{
    #[inline]
    fn less(&self, a: &T, b: &T) -> bool {
        self(a, b)
    }
}

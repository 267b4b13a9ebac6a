//! Ordered sequences with verified membership and an optional fixed tail.
//!
//! Nodes hold their actions and actions hold their outcomes in a [`Container`].
//! Every insertion is checked against a [`Membership`] predicate, and a container
//! may keep a number of elements fixed at its end: new elements are always inserted
//! before them.

use crate::error::{Origin, ValidationError, ValidationErrorKind};

#[cfg(feature = "serde_support")]
use serde::{Deserialize, Serialize};

/// Predicate deciding whether an element qualifies to be in a container.
pub trait Membership<T> {
    fn verify(&self, item: &T) -> bool;
}

impl<T, F> Membership<T> for F
where
    F: Fn(&T) -> bool,
{
    fn verify(&self, item: &T) -> bool {
        self(item)
    }
}

#[derive(Clone, Copy, Debug, Default)]
/// Membership which accepts every element.
pub struct AnyMember;

impl<T> Membership<T> for AnyMember {
    fn verify(&self, _: &T) -> bool {
        true
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde_support", derive(Deserialize, Serialize))]
/// Ordered, mutable sequence of elements.
///
/// The last `fixed_end` elements are kept in place: an insertion at an index inside
/// that tail is moved to just before it.
///
/// # Examples
/// ```
/// # use storyweave::{AnyMember, Container};
/// let mut list = Container::with_fixed_end(1);
///
/// list.push(vec!['A'], &AnyMember).unwrap();
/// list.push(vec!['B', 'C'], &AnyMember).unwrap();
/// list.insert(0, 'D', &AnyMember).unwrap();
///
/// assert_eq!(list.as_slice(), &['D', 'B', 'C', 'A']);
/// ```
pub struct Container<T> {
    items: Vec<T>,
    fixed_end: usize,
}

impl<T> Default for Container<T> {
    fn default() -> Self {
        Container::new()
    }
}

impl<T> Container<T> {
    /// Create an empty container without a fixed tail.
    pub fn new() -> Self {
        Container::with_fixed_end(0)
    }

    /// Create an empty container which keeps its last `fixed_end` elements in place.
    pub fn with_fixed_end(fixed_end: usize) -> Self {
        Container {
            items: Vec::new(),
            fixed_end,
        }
    }

    /// Create a container of the given elements, all of which are kept fixed at the
    /// end.
    ///
    /// # Errors
    /// *   [`NotAMember`][crate::error::ValidationErrorKind::NotAMember]: if any
    ///     element fails the membership check.
    pub fn with_tail<M>(items: Vec<T>, members: &M) -> Result<Self, ValidationError>
    where
        M: Membership<T> + ?Sized,
    {
        if !items.iter().all(|item| members.verify(item)) {
            return Err(not_a_member());
        }

        Ok(Container {
            fixed_end: items.len(),
            items,
        })
    }

    /// Number of elements kept fixed at the end.
    pub fn fixed_end(&self) -> usize {
        self.fixed_end
    }

    /// Insert an element at the given index, or just before the fixed tail if the
    /// index lands inside it.
    ///
    /// # Errors
    /// *   [`NotAMember`][crate::error::ValidationErrorKind::NotAMember]: if the
    ///     element fails the membership check. The container is left untouched.
    pub fn insert<M>(&mut self, index: usize, item: T, members: &M) -> Result<(), ValidationError>
    where
        M: Membership<T> + ?Sized,
    {
        if !members.verify(&item) {
            return Err(not_a_member());
        }

        let index = index.min(self.end());
        self.items.insert(index, item);

        Ok(())
    }

    /// Insert the elements, in order, at the end of the container (before the fixed
    /// tail).
    ///
    /// All elements are verified before any is inserted: if one of them fails the
    /// membership check, none are.
    ///
    /// # Errors
    /// *   [`NotAMember`][crate::error::ValidationErrorKind::NotAMember]: if any
    ///     element fails the membership check.
    pub fn push<I, M>(&mut self, items: I, members: &M) -> Result<(), ValidationError>
    where
        I: IntoIterator<Item = T>,
        M: Membership<T> + ?Sized,
    {
        let items = items.into_iter().collect::<Vec<_>>();

        if !items.iter().all(|item| members.verify(item)) {
            return Err(not_a_member());
        }

        for item in items {
            let index = self.end();
            self.items.insert(index, item);
        }

        Ok(())
    }

    /// Remove and return the element at the given index.
    ///
    /// # Errors
    /// *   [`IndexOutOfRange`][crate::error::ValidationErrorKind::IndexOutOfRange]:
    ///     if the index is not in `[0, len)`.
    pub fn delete(&mut self, index: usize) -> Result<T, ValidationError> {
        if index >= self.items.len() {
            return Err(ValidationError::from_kind(
                Origin::default(),
                ValidationErrorKind::IndexOutOfRange {
                    index,
                    len: self.items.len(),
                },
            ));
        }

        Ok(self.items.remove(index))
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<T> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Index at which new elements are inserted.
    fn end(&self) -> usize {
        self.items.len().saturating_sub(self.fixed_end)
    }
}

impl<T: PartialEq> Container<T> {
    /// Find the index of an element, if present.
    pub fn index_of(&self, item: &T) -> Option<usize> {
        self.items.iter().position(|other| other == item)
    }
}

impl<'a, T> IntoIterator for &'a Container<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

fn not_a_member() -> ValidationError {
    ValidationError::from_kind(Origin::default(), ValidationErrorKind::NotAMember)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_upper(c: &char) -> bool {
        c.is_ascii_uppercase()
    }

    #[test]
    fn pushing_keeps_fixed_tail_last() {
        let mut list = Container::with_fixed_end(1);

        list.push(vec!['A'], &AnyMember).unwrap();
        list.push(vec!['B', 'C'], &AnyMember).unwrap();

        assert_eq!(list.as_slice(), &['B', 'C', 'A']);
    }

    #[test]
    fn inserting_at_front_of_fixed_tail_container_works() {
        let mut list = Container::with_fixed_end(1);

        list.push(vec!['A', 'B', 'C'], &AnyMember).unwrap();
        list.insert(0, 'D', &AnyMember).unwrap();

        assert_eq!(list.as_slice(), &['D', 'B', 'C', 'A']);
    }

    #[test]
    fn containers_built_from_a_tail_keep_its_order() {
        let mut list = Container::with_tail(vec!['X', 'Y', 'Z'], &AnyMember).unwrap();

        list.push(vec!['A'], &AnyMember).unwrap();
        list.insert(9, 'B', &AnyMember).unwrap();

        assert_eq!(list.fixed_end(), 3);
        assert_eq!(list.as_slice(), &['A', 'B', 'X', 'Y', 'Z']);
        assert!(Container::with_tail(vec!['X', 'y'], &is_upper).is_err());
    }

    #[test]
    fn inserting_inside_fixed_tail_lands_before_it() {
        let mut list = Container::with_fixed_end(2);

        list.push(vec!['A', 'B'], &AnyMember).unwrap();
        assert_eq!(list.as_slice(), &['B', 'A']);

        list.insert(5, 'C', &AnyMember).unwrap();
        list.insert(2, 'D', &AnyMember).unwrap();

        assert_eq!(list.as_slice(), &['C', 'D', 'B', 'A']);
    }

    #[test]
    fn fixed_tail_is_preserved_through_any_sequence_of_insertions() {
        let mut list = Container::with_fixed_end(2);
        list.push(vec![1, 2], &AnyMember).unwrap();

        let tail = list.as_slice()[list.len() - 2..].to_vec();

        for (i, value) in (10..40).enumerate() {
            if i % 3 == 0 {
                list.push(vec![value, value + 100], &AnyMember).unwrap();
            } else {
                list.insert(i * 7 % (list.len() + 3), value, &AnyMember)
                    .unwrap();
            }

            assert_eq!(&list.as_slice()[list.len() - 2..], tail.as_slice());
        }
    }

    #[test]
    fn insertion_past_the_end_without_fixed_tail_appends() {
        let mut list = Container::new();

        list.insert(10, 'A', &AnyMember).unwrap();
        list.insert(10, 'B', &AnyMember).unwrap();

        assert_eq!(list.as_slice(), &['A', 'B']);
    }

    #[test]
    fn inserting_an_invalid_element_yields_error_and_leaves_container_untouched() {
        let mut list = Container::new();
        list.push(vec!['A'], &is_upper).unwrap();

        let err = list.insert(0, 'b', &is_upper).unwrap_err();

        assert_eq!(err.kind, ValidationErrorKind::NotAMember);
        assert_eq!(list.as_slice(), &['A']);
    }

    #[test]
    fn pushing_with_one_invalid_element_inserts_nothing() {
        let mut list = Container::new();
        list.push(vec!['A'], &is_upper).unwrap();

        assert!(list.push(vec!['B', 'c', 'D'], &is_upper).is_err());
        assert_eq!(list.as_slice(), &['A']);
    }

    #[test]
    fn deleting_returns_the_element() {
        let mut list = Container::new();
        list.push(vec!['A', 'B', 'C'], &AnyMember).unwrap();

        assert_eq!(list.delete(1).unwrap(), 'B');
        assert_eq!(list.as_slice(), &['A', 'C']);
    }

    #[test]
    fn deleting_out_of_range_yields_error() {
        let mut list: Container<char> = Container::new();
        list.push(vec!['A'], &AnyMember).unwrap();

        let err = list.delete(1).unwrap_err();

        assert_eq!(
            err.kind,
            ValidationErrorKind::IndexOutOfRange { index: 1, len: 1 }
        );
    }

    #[test]
    fn index_of_returns_none_on_miss() {
        let mut list = Container::new();
        list.push(vec!['A', 'B'], &AnyMember).unwrap();

        assert_eq!(list.index_of(&'B'), Some(1));
        assert_eq!(list.index_of(&'Z'), None);
        assert_eq!(list.get(2), None);
    }
}

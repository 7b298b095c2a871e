use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use crate::value::{Number, Value};

// -----------------------------------------------------------------------------
// NumberRange

/// An inclusive numeric range, used by [`Tag::Range`].
///
/// # Examples
///
/// ```
/// use vc_codec::key::NumberRange;
/// use vc_codec::value::Number;
///
/// let percent = NumberRange::between(0, 100);
/// assert!(percent.contains(Number::Int(100)));
/// assert!(!percent.contains(Number::Float(100.5)));
///
/// let positive = NumberRange::at_least(1);
/// assert!(positive.contains(Number::Int(i64::MAX)));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NumberRange {
    pub min: Option<Number>,
    pub max: Option<Number>,
}

impl NumberRange {
    pub fn between(min: impl Into<Number>, max: impl Into<Number>) -> Self {
        Self {
            min: Some(min.into()),
            max: Some(max.into()),
        }
    }

    pub fn at_least(min: impl Into<Number>) -> Self {
        Self {
            min: Some(min.into()),
            max: None,
        }
    }

    pub fn at_most(max: impl Into<Number>) -> Self {
        Self {
            min: None,
            max: Some(max.into()),
        }
    }

    /// Returns `true` if `value` lies within the range.
    ///
    /// Integer bounds compare exactly against integer values,
    /// anything involving a float compares as `f64`.
    pub fn contains(&self, value: Number) -> bool {
        let above = self
            .min
            .is_none_or(|min| compare(min, value) != core::cmp::Ordering::Greater);
        let below = self
            .max
            .is_none_or(|max| compare(value, max) != core::cmp::Ordering::Greater);
        above && below
    }
}

fn compare(a: Number, b: Number) -> core::cmp::Ordering {
    match (a, b) {
        (Number::Int(a), Number::Int(b)) => a.cmp(&b),
        (a, b) => a.as_f64().total_cmp(&b.as_f64()),
    }
}

impl fmt::Display for NumberRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(min) = self.min {
            write!(f, "{min}")?;
        }
        f.write_str("..=")?;
        if let Some(max) = self.max {
            write!(f, "{max}")?;
        }
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// Tag

/// Configuration attached to one type-use site.
///
/// Tags change behavior: `i32` and `i32` tagged `Range(0..=100)` are different
/// [`TypeKey`](crate::TypeKey)s and get different handlers.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tag {
    /// Decoders substitute this wire value when the input is [`Value::Empty`].
    /// Constructors build the value by decoding it.
    Default(Value),
    /// Numeric values must lie within the range.
    Range(NumberRange),
    /// Alternative member name accepted when decoding a record.
    Alias(Cow<'static, str>),
    /// A record with exactly one member is written as that member's value.
    Inline,
    /// Strings and sequences must not be empty.
    NonEmpty,
    /// The record member is neither written nor read.
    Skip,
    /// A user-defined marker for custom factories.
    Custom(Cow<'static, str>),
}

impl Tag {
    #[inline]
    pub fn default_value(value: impl Into<Value>) -> Self {
        Self::Default(value.into())
    }

    #[inline]
    pub fn range(min: impl Into<Number>, max: impl Into<Number>) -> Self {
        Self::Range(NumberRange::between(min, max))
    }

    #[inline]
    pub fn alias(name: impl Into<Cow<'static, str>>) -> Self {
        Self::Alias(name.into())
    }

    #[inline]
    pub fn custom(name: impl Into<Cow<'static, str>>) -> Self {
        Self::Custom(name.into())
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default(value) => write!(f, "default({value})"),
            Self::Range(range) => write!(f, "range({range})"),
            Self::Alias(name) => write!(f, "alias({name})"),
            Self::Inline => f.write_str("inline"),
            Self::NonEmpty => f.write_str("non_empty"),
            Self::Skip => f.write_str("skip"),
            Self::Custom(name) => write!(f, "custom({name})"),
        }
    }
}

// -----------------------------------------------------------------------------
// Tags

/// An ordered, immutable list of [`Tag`]s.
///
/// Cloning is cheap, the list is shared.
///
/// # Examples
///
/// ```
/// use vc_codec::{Tag, Tags};
///
/// let tags = Tags::new().with(Tag::range(0, 10)).with(Tag::default_value(5));
///
/// assert_eq!(tags.len(), 2);
/// assert_eq!(tags.ranges().len(), 1);
/// assert_eq!(tags.default_value(), Some(&vc_codec::Value::from(5)));
/// assert_eq!(tags.to_string(), "[range(0..=10), default(5)]");
/// ```
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tags(Option<Arc<[Tag]>>);

impl Tags {
    /// Creates an empty tag list.
    #[inline]
    pub const fn new() -> Self {
        Self(None)
    }

    /// Returns a new list with `tag` appended.
    pub fn with(&self, tag: Tag) -> Self {
        let mut tags = self.as_slice().to_vec();
        tags.push(tag);
        Self(Some(tags.into()))
    }

    /// Returns a new list without the tags matching `predicate`.
    pub fn without(&self, predicate: impl Fn(&Tag) -> bool) -> Self {
        self.iter().filter(|tag| !predicate(tag)).cloned().collect()
    }

    #[inline]
    pub fn as_slice(&self) -> &[Tag] {
        match &self.0 {
            Some(tags) => tags,
            None => &[],
        }
    }

    #[inline]
    pub fn iter(&self) -> core::slice::Iter<'_, Tag> {
        self.as_slice().iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }

    #[inline]
    pub fn contains(&self, tag: &Tag) -> bool {
        self.as_slice().contains(tag)
    }

    /// Returns the first [`Tag::Default`] value.
    pub fn default_value(&self) -> Option<&Value> {
        self.iter().find_map(|tag| match tag {
            Tag::Default(value) => Some(value),
            _ => None,
        })
    }

    /// Returns every [`Tag::Range`], sorted. A value must lie within all of them.
    pub fn ranges(&self) -> Vec<NumberRange> {
        let mut ranges: Vec<NumberRange> = self
            .iter()
            .filter_map(|tag| match tag {
                Tag::Range(range) => Some(*range),
                _ => None,
            })
            .collect();
        ranges.sort_unstable();
        ranges
    }

    /// Returns every [`Tag::Alias`] in declaration order.
    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.iter().filter_map(|tag| match tag {
            Tag::Alias(name) => Some(&**name),
            _ => None,
        })
    }

    #[inline]
    pub fn is_inline(&self) -> bool {
        self.contains(&Tag::Inline)
    }

    #[inline]
    pub fn is_non_empty(&self) -> bool {
        self.contains(&Tag::NonEmpty)
    }

    #[inline]
    pub fn is_skip(&self) -> bool {
        self.contains(&Tag::Skip)
    }

    /// Returns `true` if a [`Tag::Custom`] with this name is present.
    pub fn has_custom(&self, name: &str) -> bool {
        self.iter()
            .any(|tag| matches!(tag, Tag::Custom(custom) if custom == name))
    }
}

impl FromIterator<Tag> for Tags {
    fn from_iter<I: IntoIterator<Item = Tag>>(iter: I) -> Self {
        let tags: Vec<Tag> = iter.into_iter().collect();
        if tags.is_empty() {
            Self(None)
        } else {
            Self(Some(tags.into()))
        }
    }
}

impl<const N: usize> From<[Tag; N]> for Tags {
    #[inline]
    fn from(tags: [Tag; N]) -> Self {
        tags.into_iter().collect()
    }
}

impl From<Vec<Tag>> for Tags {
    #[inline]
    fn from(tags: Vec<Tag>) -> Self {
        tags.into_iter().collect()
    }
}

impl<'a> IntoIterator for &'a Tags {
    type Item = &'a Tag;
    type IntoIter = core::slice::Iter<'a, Tag>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Debug for Tags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl fmt::Display for Tags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (index, tag) in self.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            fmt::Display::fmt(tag, f)?;
        }
        f.write_str("]")
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{NumberRange, Tag, Tags};
    use crate::value::Number;

    #[test]
    fn empty_lists_are_equal() {
        assert_eq!(Tags::new(), Tags::from(Vec::new()));
        assert_eq!(Tags::new().with(Tag::Inline).without(|t| *t == Tag::Inline), Tags::new());
    }

    #[test]
    fn order_is_kept() {
        let a = Tags::from([Tag::Inline, Tag::NonEmpty]);
        let b = Tags::from([Tag::NonEmpty, Tag::Inline]);
        assert_ne!(a, b);
        assert_eq!(a.as_slice()[0], Tag::Inline);
    }

    #[test]
    fn lookups() {
        let tags = Tags::from([
            Tag::alias("old_name"),
            Tag::custom("secret"),
            Tag::alias("legacy"),
        ]);
        assert_eq!(tags.aliases().collect::<Vec<_>>(), ["old_name", "legacy"]);
        assert!(tags.has_custom("secret"));
        assert!(!tags.has_custom("public"));
        assert!(tags.ranges().is_empty());
        assert!(!tags.is_skip());
    }

    #[test]
    fn mixed_range_comparison() {
        let range = NumberRange::between(0, 1.5);
        assert!(range.contains(Number::Int(1)));
        assert!(range.contains(Number::Float(1.5)));
        assert!(!range.contains(Number::Int(2)));
        assert!(!range.contains(Number::Int(-1)));
        assert_eq!(range.to_string(), "0..=1.5");
        assert_eq!(NumberRange::at_most(3).to_string(), "..=3");
    }

    #[test]
    fn ranges_ignore_order() {
        let a = Tags::from([Tag::range(0, 5), Tag::Inline, Tag::range(10, 20)]);
        let b = Tags::from([Tag::range(10, 20), Tag::range(0, 5)]);
        assert_eq!(a.ranges(), b.ranges());
        assert_eq!(a.ranges()[0], NumberRange::between(0, 5));
    }
}

//! Sort orders rendered into `ORDER BY` clauses.
//!
//! ```ignore
//! use pgorm_paginator::{Order, Sort};
//!
//! let sort = Sort::new([Order::asc("name")?, Order::desc("created_at")?]);
//! assert_eq!(sort.to_string(), "name asc, created_at desc");
//!
//! let parsed: Sort = "name asc, created_at desc".parse()?;
//! assert_eq!(parsed, sort);
//! ```

use crate::error::{PageError, PageResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Sort direction of a single [`Order`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    /// `asc`
    Asc,
    /// `desc`
    Desc,
    /// No direction; the database default applies.
    #[default]
    Unspecified,
}

impl Direction {
    /// Parse a direction. Only the exact lowercase forms `asc`, `desc` and the
    /// empty string are accepted.
    pub fn parse(s: &str) -> PageResult<Self> {
        match s {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            "" => Ok(Self::Unspecified),
            other => Err(PageError::OrderDirectionNotValid {
                direction: other.to_string(),
            }),
        }
    }

    /// The SQL keyword for this direction (empty when unspecified).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
            Self::Unspecified => "",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = PageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Direction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Direction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// A validated `(property, direction)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawOrder")]
pub struct Order {
    property: String,
    direction: Direction,
}

#[derive(Deserialize)]
struct RawOrder {
    property: String,
    #[serde(default)]
    direction: Direction,
}

impl TryFrom<RawOrder> for Order {
    type Error = PageError;

    fn try_from(raw: RawOrder) -> Result<Self, Self::Error> {
        Order::new(raw.property, raw.direction)
    }
}

impl Order {
    /// Create an order.
    ///
    /// The property is rendered into ORDER BY verbatim, so it must be a column
    /// name: dotted parts, each either `[A-Za-z_][A-Za-z0-9_$]*` or a
    /// double-quoted name with `""` escapes (`p.price`, `"CamelCase"`).
    pub fn new(property: impl Into<String>, direction: Direction) -> PageResult<Self> {
        let property = property.into();
        if property.is_empty() {
            return Err(PageError::OrderPropertyIsEmpty);
        }
        if let Err(reason) = check_property(&property) {
            return Err(PageError::OrderPropertyNotValid { property, reason });
        }
        Ok(Self {
            property,
            direction,
        })
    }

    /// `<property> asc`
    pub fn asc(property: impl Into<String>) -> PageResult<Self> {
        Self::new(property, Direction::Asc)
    }

    /// `<property> desc`
    pub fn desc(property: impl Into<String>) -> PageResult<Self> {
        Self::new(property, Direction::Desc)
    }

    /// Parse `"<property>"` or `"<property> <direction>"`.
    pub fn parse(s: &str) -> PageResult<Self> {
        let s = s.trim();
        if s.ends_with('"') {
            return Self::new(s, Direction::Unspecified);
        }
        match s.rsplit_once(char::is_whitespace) {
            Some((property, direction)) => Self::new(property.trim_end(), Direction::parse(direction)?),
            None => Self::new(s, Direction::Unspecified),
        }
    }

    pub fn property(&self) -> &str {
        &self.property
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.direction {
            Direction::Unspecified => f.write_str(&self.property),
            direction => write!(f, "{} {}", self.property, direction),
        }
    }
}

impl FromStr for Order {
    type Err = PageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Check that `property` is a possibly dotted, possibly quoted column name.
fn check_property(property: &str) -> Result<(), String> {
    if property.contains('\0') {
        return Err("NUL character".to_string());
    }
    let mut chars = property.chars().peekable();
    loop {
        if chars.peek() == Some(&'"') {
            chars.next();
            let mut len = 0;
            loop {
                match chars.next() {
                    Some('"') if chars.peek() == Some(&'"') => {
                        chars.next();
                        len += 1;
                    }
                    Some('"') => break,
                    Some(_) => len += 1,
                    None => return Err("unclosed quoted name".to_string()),
                }
            }
            if len == 0 {
                return Err("empty quoted name".to_string());
            }
        } else {
            match chars.next() {
                Some(c) if c == '_' || c.is_ascii_alphabetic() => {}
                Some(c) => return Err(format!("unexpected character '{c}'")),
                None => return Err("empty name segment".to_string()),
            }
            while let Some(&c) = chars.peek() {
                if c == '_' || c == '$' || c.is_ascii_alphanumeric() {
                    chars.next();
                } else {
                    break;
                }
            }
        }

        match chars.next() {
            None => return Ok(()),
            Some('.') => {}
            Some(c) => return Err(format!("unexpected character '{c}'")),
        }
    }
}

/// An ordered list of [`Order`]s.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sort(Vec<Order>);

impl Sort {
    /// Build a sort from orders, keeping their sequence.
    pub fn new(orders: impl IntoIterator<Item = Order>) -> Self {
        Self(orders.into_iter().collect())
    }

    /// No ordering.
    pub fn unsorted() -> Self {
        Self(Vec::new())
    }

    /// Parse a comma separated list such as `"name asc, age desc, id"`.
    ///
    /// Blank input yields an unsorted value.
    pub fn parse(s: &str) -> PageResult<Self> {
        if s.trim().is_empty() {
            return Ok(Self::unsorted());
        }
        s.split(',').map(Order::parse).collect::<PageResult<Vec<_>>>().map(Self)
    }

    /// Append an order.
    pub fn push(&mut self, order: Order) -> &mut Self {
        self.0.push(order);
        self
    }

    /// Consuming version of [`Sort::push`].
    pub fn and(mut self, order: Order) -> Self {
        self.0.push(order);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Order> {
        self.0.iter()
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, order) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{order}")?;
        }
        Ok(())
    }
}

impl FromStr for Sort {
    type Err = PageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<Order> for Sort {
    fn from(order: Order) -> Self {
        Self(vec![order])
    }
}

impl FromIterator<Order> for Sort {
    fn from_iter<I: IntoIterator<Item = Order>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl<'a> IntoIterator for &'a Sort {
    type Item = &'a Order;
    type IntoIter = std::slice::Iter<'a, Order>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for Sort {
    type Item = Order;
    type IntoIter = std::vec::IntoIter<Order>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

//! Product card interaction state.
//!
//! Each product card keeps its own selection: which carousel image is shown,
//! the chosen size, the quantity and whether the visitor favourited it.
//! Selections are plain values; the storefront stores one per product in the
//! visitor's session.

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Garment sizes offered on every card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Size {
    P,
    M,
    G,
    GG,
}

impl Size {
    /// All sizes in display order.
    pub const ALL: [Self; 4] = [Self::P, Self::M, Self::G, Self::GG];

    /// Label shown on the size button.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::P => "P",
            Self::M => "M",
            Self::G => "G",
            Self::GG => "GG",
        }
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Size {
    type Err = SelectionActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|size| size.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SelectionActionError::UnknownSize(s.to_owned()))
    }
}

/// A purchase quantity between 1 and 99.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Quantity(u8);

impl Quantity {
    /// Smallest quantity.
    pub const MIN: Self = Self(1);
    /// Largest quantity.
    pub const MAX: Self = Self(99);

    /// Create a quantity, or `None` when outside `1..=99`.
    #[must_use]
    pub const fn new(value: u8) -> Option<Self> {
        if value >= Self::MIN.0 && value <= Self::MAX.0 {
            Some(Self(value))
        } else {
            None
        }
    }

    /// The numeric value.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// One more, saturating at 99.
    #[must_use]
    pub const fn increment(self) -> Self {
        if self.0 < Self::MAX.0 { Self(self.0 + 1) } else { self }
    }

    /// One less, saturating at 1.
    #[must_use]
    pub const fn decrement(self) -> Self {
        if self.0 > Self::MIN.0 { Self(self.0 - 1) } else { self }
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self::MIN
    }
}

impl TryFrom<u8> for Quantity {
    type Error = SelectionActionError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(SelectionActionError::QuantityOutOfRange)
    }
}

impl From<Quantity> for u8 {
    fn from(quantity: Quantity) -> Self {
        quantity.0
    }
}

/// Errors parsing a [`SelectionAction`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionActionError {
    #[error("unknown action: {0}")]
    UnknownAction(String),
    #[error("unknown size: {0}")]
    UnknownSize(String),
    #[error("invalid image index: {0}")]
    InvalidImageIndex(String),
    #[error("quantity must be between 1 and 99")]
    QuantityOutOfRange,
}

/// One interaction with a product card.
///
/// The wire form is the value of the card's submit button:
/// `next`, `prev`, `image:N`, `inc`, `dec`, `set`, `size:X` or `favorite`.
/// `set` takes its value from the card's quantity input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionAction {
    NextImage,
    PreviousImage,
    SelectImage(usize),
    Increment,
    Decrement,
    SetQuantity(Option<Quantity>),
    SelectSize(Size),
    ToggleFavorite,
}

impl SelectionAction {
    /// Parse a button value, with `quantity` the raw quantity input.
    ///
    /// A `set` whose quantity is missing, non-numeric or outside `1..=99`
    /// parses to `SetQuantity(None)`, which leaves the selection unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown actions, sizes or image indexes.
    pub fn parse(action: &str, quantity: Option<&str>) -> Result<Self, SelectionActionError> {
        let action = action.trim();
        match action.split_once(':') {
            Some(("image", index)) => index
                .parse::<usize>()
                .map(Self::SelectImage)
                .map_err(|_| SelectionActionError::InvalidImageIndex(index.to_owned())),
            Some(("size", size)) => size.parse().map(Self::SelectSize),
            Some(_) => Err(SelectionActionError::UnknownAction(action.to_owned())),
            None => match action {
                "next" => Ok(Self::NextImage),
                "prev" => Ok(Self::PreviousImage),
                "inc" => Ok(Self::Increment),
                "dec" => Ok(Self::Decrement),
                "favorite" => Ok(Self::ToggleFavorite),
                "set" => Ok(Self::SetQuantity(
                    quantity
                        .and_then(|q| q.trim().parse::<u8>().ok())
                        .and_then(Quantity::new),
                )),
                other => Err(SelectionActionError::UnknownAction(other.to_owned())),
            },
        }
    }
}

/// Interaction state of one product card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProductSelection {
    /// Index of the image shown in the carousel.
    pub image_index: usize,
    /// Chosen quantity.
    pub quantity: Quantity,
    /// Chosen size, if any.
    pub size: Option<Size>,
    /// Whether the visitor favourited the product.
    pub favorited: bool,
}

impl ProductSelection {
    /// Apply `action` to a card whose carousel has `image_count` images.
    pub fn apply(&mut self, action: SelectionAction, image_count: usize) {
        match action {
            SelectionAction::NextImage => {
                self.image_index = next_index(self.image_index, image_count);
            }
            SelectionAction::PreviousImage => {
                self.image_index = previous_index(self.image_index, image_count);
            }
            SelectionAction::SelectImage(index) => {
                if index < image_count {
                    self.image_index = index;
                }
            }
            SelectionAction::Increment => self.quantity = self.quantity.increment(),
            SelectionAction::Decrement => self.quantity = self.quantity.decrement(),
            SelectionAction::SetQuantity(Some(quantity)) => self.quantity = quantity,
            SelectionAction::SetQuantity(None) => {}
            SelectionAction::SelectSize(size) => self.size = Some(size),
            SelectionAction::ToggleFavorite => self.favorited = !self.favorited,
        }
    }

    /// The image index clamped to the current image count.
    ///
    /// The product list can shrink between requests; an index past the end
    /// falls back to the first image.
    #[must_use]
    pub const fn visible_image(&self, image_count: usize) -> usize {
        if self.image_index < image_count {
            self.image_index
        } else {
            0
        }
    }
}

/// Next carousel position, wrapping to the start.
#[must_use]
pub const fn next_index(current: usize, len: usize) -> usize {
    if len == 0 { 0 } else { (current + 1) % len }
}

/// Previous carousel position, wrapping to the end.
#[must_use]
pub const fn previous_index(current: usize, len: usize) -> usize {
    if len == 0 {
        0
    } else {
        (current % len + len - 1) % len
    }
}

//! Label encoding for charger categories.

use chargewise_core::ChargerCategory;
use serde::{Deserialize, Serialize};

use crate::EncoderError;

/// Maps each category seen while fitting to its index in sorted order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryEncoder {
    classes: Vec<ChargerCategory>,
}

impl CategoryEncoder {
    /// Fit over every category in `categories`.
    ///
    /// # Errors
    /// Returns [`EncoderError::Empty`] when the iterator yields nothing.
    pub fn fit<I>(categories: I) -> Result<Self, EncoderError>
    where
        I: IntoIterator<Item = ChargerCategory>,
    {
        let mut classes: Vec<ChargerCategory> = categories.into_iter().collect();
        classes.sort_unstable();
        classes.dedup();
        if classes.is_empty() {
            return Err(EncoderError::Empty);
        }
        Ok(Self { classes })
    }

    /// Fitted classes in encoding order.
    #[must_use]
    pub fn classes(&self) -> &[ChargerCategory] {
        &self.classes
    }

    /// Encode one category.
    ///
    /// # Errors
    /// [`EncoderError::Unrecognised`] for `None`, [`EncoderError::Unseen`]
    /// for a category absent at fit time.
    #[expect(
        clippy::cast_precision_loss,
        reason = "at most three classes are ever fitted"
    )]
    pub fn transform(&self, category: Option<ChargerCategory>) -> Result<f64, EncoderError> {
        let known = category.ok_or(EncoderError::Unrecognised)?;
        self.classes
            .binary_search(&known)
            .map(|index| index as f64)
            .map_err(|_| EncoderError::Unseen(known.to_string()))
    }
}

//! Ranking context passed to ranking rules.

use crate::models::{Location, Product};

/// Per-call inputs that ranking rules read besides the candidate itself.
///
/// The cart's last put location is resolved against the location universe
/// by the caller and threaded through here explicitly; it is never attached
/// to the product.
#[derive(Debug, Clone, Copy)]
pub struct RankingContext<'a> {
    /// Product being put away.
    pub product: &'a Product,
    /// The cart's last put location, when known.
    pub last_put_location: Option<&'a Location>,
}

impl<'a> RankingContext<'a> {
    /// Creates a context with no cart anchor.
    pub fn new(product: &'a Product) -> Self {
        Self {
            product,
            last_put_location: None,
        }
    }

    /// Sets the cart's last put location.
    pub fn with_last_put_location(mut self, location: Option<&'a Location>) -> Self {
        self.last_put_location = location;
        self
    }
}

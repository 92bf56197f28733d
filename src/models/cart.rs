//! Cart context for consolidation.

use serde::{Deserialize, Serialize};

/// State carried across putaways of one stowing cart.
///
/// The caller owns and updates it between calls; the engine only reads it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartContext {
    #[serde(default)]
    pub cart_id: Option<String>,
    #[serde(default)]
    pub last_put_location: Option<String>,
}

impl CartContext {
    /// No cart: consolidation and proximity sorting are inert.
    pub fn none() -> Self {
        Self::default()
    }

    /// A cart with no put yet.
    pub fn new(cart_id: impl Into<String>) -> Self {
        Self {
            cart_id: Some(cart_id.into()),
            last_put_location: None,
        }
    }

    pub fn with_last_put(mut self, location_id: impl Into<String>) -> Self {
        self.last_put_location = Some(location_id.into());
        self
    }
}

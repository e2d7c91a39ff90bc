//! Booking price computation
//!
//! All amounts are integer cents. The platform always retains exactly the
//! base price; the partner's nominal share is the markup, before gateway
//! processing fees.

/// Result of pricing a stay. Recomputing with identical inputs always yields
/// identical outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quote {
    /// Resort price for the whole stay, retained by the platform
    pub base_price: i64,
    /// Partner markup on top of the base price
    pub markup_amount: i64,
    /// Customer-facing total, immutable once written to a booking
    pub total_price: i64,
}

impl Quote {
    /// The partner's nominal share before gateway processing fees.
    pub fn partner_share(&self) -> i64 {
        self.total_price - self.base_price
    }
}

/// Price a stay of `nights` nights at `base_price_per_night` cents with an
/// integer-percent partner markup.
pub fn quote(base_price_per_night: i64, nights: i64, markup_rate: i64) -> Quote {
    let base_price = base_price_per_night * nights;
    // Integer division floors the markup
    let markup_amount = base_price * markup_rate / 100;
    let total_price = base_price + markup_amount;

    Quote {
        base_price,
        markup_amount,
        total_price,
    }
}

//! Five-element (wuxing) persona tag.
//!
//! The companion persona is themed on the element of the user's birth
//! year. Every outbound notification carries this tag so the dispatcher
//! can pick persona-appropriate copy and artwork. The full birth-chart
//! lookup lives behind an external service; only the year-stem element
//! is derived locally.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Element {
    Wood,
    Fire,
    Earth,
    Metal,
    Water,
}

impl Element {
    /// Element of a Gregorian year's heavenly stem.
    ///
    /// Stems repeat on a 10-year cycle anchored at 4 CE (Jia, wood);
    /// consecutive stem pairs share an element.
    pub fn from_birth_year(year: i32) -> Self {
        match (year - 4).rem_euclid(10) / 2 {
            0 => Element::Wood,
            1 => Element::Fire,
            2 => Element::Earth,
            3 => Element::Metal,
            _ => Element::Water,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Element::Wood => "wood",
            Element::Fire => "fire",
            Element::Earth => "earth",
            Element::Metal => "metal",
            Element::Water => "water",
        }
    }
}

impl Default for Element {
    fn default() -> Self {
        Element::Wood
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stem_cycle_anchors() {
        assert_eq!(Element::from_birth_year(1984), Element::Wood);
        assert_eq!(Element::from_birth_year(1986), Element::Fire);
        assert_eq!(Element::from_birth_year(1988), Element::Earth);
        assert_eq!(Element::from_birth_year(1990), Element::Metal);
        assert_eq!(Element::from_birth_year(1992), Element::Water);
    }

    #[test]
    fn stem_pairs_share_element() {
        assert_eq!(Element::from_birth_year(1984), Element::from_birth_year(1985));
        assert_eq!(Element::from_birth_year(2000), Element::Metal);
    }

    #[test]
    fn pre_common_era_years_do_not_panic() {
        let _ = Element::from_birth_year(-500);
    }
}

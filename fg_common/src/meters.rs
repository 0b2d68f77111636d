use std::{fmt::Display, iter::Sum, ops::Add};

use serde::{Deserialize, Serialize};
use sqlx::Type;

use crate::op;

//--------------------------------------      Meters        ---------------------------------------------------------
/// A road distance in whole meters, as reported by the routing service.
#[derive(Debug, Clone, Copy, Default, Type, Ord, PartialOrd, PartialEq, Eq, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct Meters(i64);

op!(binary Meters, Add, add);

impl Sum for Meters {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

impl From<i64> for Meters {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl Display for Meters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let km = self.0 as f64 / 1000.0;
        write!(f, "{km:0.2} km")
    }
}

impl Meters {
    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn as_km(&self) -> f64 {
        self.0 as f64 / 1000.0
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn display_is_km_with_two_places() {
        assert_eq!(Meters::from(2000).to_string(), "2.00 km");
        assert_eq!(Meters::from(3460).to_string(), "3.46 km");
        assert_eq!(Meters::from(999).to_string(), "1.00 km");
    }
}

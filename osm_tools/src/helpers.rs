use fg_common::{Centavos, Meters};

/// Fare rule: ₱22 for every 2 km, pro-rata for partial distance.
///
/// Working in centavos, that is 1.1 centavos per meter, rounded half-up to the nearest centavo.
pub fn fare_for_distance(distance: Meters) -> Centavos {
    let centavos = (distance.value() * 11 + 5) / 10;
    Centavos::from(centavos)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn two_km_costs_twenty_two_pesos() {
        assert_eq!(fare_for_distance(Meters::from(2000)), Centavos::from_pesos(22));
    }

    #[test]
    fn partial_distance_is_proportional() {
        // 1 km -> ₱11.00
        assert_eq!(fare_for_distance(Meters::from(1000)), Centavos::from(1100));
        // 3.46 km -> (3.46 / 2) * 22 = ₱38.06
        assert_eq!(fare_for_distance(Meters::from(3460)), Centavos::from(3806));
    }

    #[test]
    fn rounding_is_half_up() {
        // 995 m -> 1094.5 centavos -> ₱10.95
        assert_eq!(fare_for_distance(Meters::from(995)), Centavos::from(1095));
        // 994 m -> 1093.4 centavos -> ₱10.93
        assert_eq!(fare_for_distance(Meters::from(994)), Centavos::from(1093));
    }

    #[test]
    fn zero_distance_is_free() {
        assert_eq!(fare_for_distance(Meters::from(0)), Centavos::from(0));
    }
}

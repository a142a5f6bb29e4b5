use std::collections::HashMap;

use crate::versions::v2::UnitType;

lazy_static::lazy_static! {
    /// Base unit symbols and the SI factors they expand to.
    ///
    /// Each factor is `(kind, exponent, multiplier)`. Molar expands to two factors,
    /// every other symbol to exactly one.
    pub static ref KIND_MAPPINGS: HashMap<&'static str, Vec<(UnitType, i64, f64)>> = {
        let mut m = HashMap::new();
        // Molar
        m.insert("M", vec![(UnitType::Mole, 1, 1.0), (UnitType::Litre, -1, 1.0)]);

        // Mole
        m.insert("mole", vec![(UnitType::Mole, 1, 1.0)]);
        m.insert("mol", vec![(UnitType::Mole, 1, 1.0)]);

        // Liter
        m.insert("liter", vec![(UnitType::Litre, 1, 1.0)]);
        m.insert("litre", vec![(UnitType::Litre, 1, 1.0)]);
        m.insert("l", vec![(UnitType::Litre, 1, 1.0)]);
        m.insert("L", vec![(UnitType::Litre, 1, 1.0)]);

        // Second
        m.insert("second", vec![(UnitType::Second, 1, 1.0)]);
        m.insert("seconds", vec![(UnitType::Second, 1, 1.0)]);
        m.insert("sec", vec![(UnitType::Second, 1, 1.0)]);
        m.insert("s", vec![(UnitType::Second, 1, 1.0)]);

        // Minute
        m.insert("minute", vec![(UnitType::Second, 1, 60.0)]);
        m.insert("minutes", vec![(UnitType::Second, 1, 60.0)]);
        m.insert("mins", vec![(UnitType::Second, 1, 60.0)]);
        m.insert("min", vec![(UnitType::Second, 1, 60.0)]);

        // Hour
        m.insert("hour", vec![(UnitType::Second, 1, 3600.0)]);
        m.insert("hours", vec![(UnitType::Second, 1, 3600.0)]);
        m.insert("hr", vec![(UnitType::Second, 1, 3600.0)]);
        m.insert("h", vec![(UnitType::Second, 1, 3600.0)]);

        // Gram
        m.insert("gram", vec![(UnitType::Gram, 1, 1.0)]);
        m.insert("g", vec![(UnitType::Gram, 1, 1.0)]);

        // Dimensionless
        m.insert("dimensionless", vec![(UnitType::Dimensionless, 1, 1.0)]);

        // Kelvin
        m.insert("kelvin", vec![(UnitType::Kelvin, 1, 1.0)]);
        m.insert("K", vec![(UnitType::Kelvin, 1, 1.0)]);

        // Celsius
        m.insert("celsius", vec![(UnitType::Celsius, 1, 1.0)]);
        m.insert("C", vec![(UnitType::Celsius, 1, 1.0)]);

        m
    };

    /// Decimal prefixes and their power of ten.
    pub static ref PREFIX_MAPPING: HashMap<&'static str, i64> = {
        let mut m: HashMap<&str, i64> = HashMap::new();
        m.insert("kilo", 3);
        m.insert("k", 3);
        m.insert("deci", -1);
        m.insert("d", -1);
        m.insert("centi", -2);
        m.insert("c", -2);
        m.insert("milli", -3);
        m.insert("m", -3);
        m.insert("micro", -6);
        m.insert("u", -6);
        m.insert("µ", -6);
        m.insert("μ", -6);
        m.insert("nano", -9);
        m.insert("n", -9);
        m.insert("pico", -12);
        m.insert("p", -12);
        m.insert("femto", -15);
        m.insert("f", -15);
        m
    };
}

use super::schema::ChemistryFile;
use super::store::{DataStore, ElementEntry};
use crate::model::types::Element;
use std::collections::HashMap;

const CHEMISTRY_TABLE: &str = include_str!("../../data/chemistry.toml");

pub fn load_chemistry() -> DataStore {
    parse_chemistry(CHEMISTRY_TABLE)
}

fn parse_chemistry(content: &str) -> DataStore {
    let schema: ChemistryFile = toml::from_str(content)
        .unwrap_or_else(|e| panic!("Failed to parse embedded chemistry table: {}", e));

    let mut elements = HashMap::new();
    for record in schema.elements {
        let element = parse_symbol(&record.symbol);
        if record.valences.is_empty() {
            panic!("Element '{}' declares no valences", record.symbol);
        }
        let entry = ElementEntry {
            valences: record.valences,
            valence_electrons: record.valence_electrons,
            covalent_radius: record.covalent_radius,
            min_bond_angle: record.min_bond_angle,
        };
        if elements.insert(element, entry).is_some() {
            panic!("Duplicate element entry found: {}", record.symbol);
        }
    }

    let mut bond_lengths = HashMap::new();
    for record in schema.bonds {
        let a = parse_symbol(&record.pair[0]);
        let b = parse_symbol(&record.pair[1]);
        if !elements.contains_key(&a) || !elements.contains_key(&b) {
            panic!(
                "Bond entry {}-{} references an element without table data",
                a, b
            );
        }
        if record.lengths.is_empty() {
            panic!("Bond entry {}-{} declares no lengths", a, b);
        }
        if bond_lengths.insert(pair_key(a, b), record.lengths).is_some() {
            panic!("Duplicate bond entry found: {}-{}", a, b);
        }
    }

    DataStore {
        elements,
        bond_lengths,
    }
}

fn parse_symbol(symbol: &str) -> Element {
    symbol
        .parse::<Element>()
        .unwrap_or_else(|e| panic!("Invalid element in chemistry table: {}", e))
}

pub fn pair_key(a: Element, b: Element) -> (Element, Element) {
    if a <= b { (a, b) } else { (b, a) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_table_parses() {
        let store = load_chemistry();
        assert!(store.elements.contains_key(&Element::C));
        assert!(store.bond_lengths.contains_key(&pair_key(Element::O, Element::C)));
    }

    #[test]
    #[should_panic(expected = "Duplicate element entry")]
    fn duplicate_elements_are_rejected() {
        parse_chemistry(
            r#"
            [[elements]]
            symbol = "C"
            valences = [4]
            valence_electrons = 4
            covalent_radius = 0.76
            min_bond_angle = 100.0

            [[elements]]
            symbol = "C"
            valences = [4]
            valence_electrons = 4
            covalent_radius = 0.76
            min_bond_angle = 100.0
            "#,
        );
    }

    #[test]
    #[should_panic(expected = "without table data")]
    fn bonds_to_unknown_elements_are_rejected() {
        parse_chemistry(
            r#"
            [[bonds]]
            pair = ["C", "Fe"]
            lengths = [2.0]
            "#,
        );
    }
}

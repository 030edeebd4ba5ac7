use super::loader;
use crate::model::types::Element;
use std::collections::HashMap;
use std::sync::OnceLock;

#[derive(Debug, Clone)]
pub struct ElementEntry {
    pub valences: Vec<u8>,
    pub valence_electrons: u8,
    pub covalent_radius: f64,
    pub min_bond_angle: f64,
}

pub struct DataStore {
    pub elements: HashMap<Element, ElementEntry>,
    pub bond_lengths: HashMap<(Element, Element), Vec<f64>>,
}

static STORE: OnceLock<DataStore> = OnceLock::new();

pub fn get_store() -> &'static DataStore {
    STORE.get_or_init(loader::load_chemistry)
}

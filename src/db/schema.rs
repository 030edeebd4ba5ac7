use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct ChemistryFile {
    #[serde(default)]
    pub elements: Vec<ElementRecord>,
    #[serde(default)]
    pub bonds: Vec<BondRecord>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct ElementRecord {
    pub symbol: String,
    pub valences: Vec<u8>,
    pub valence_electrons: u8,
    pub covalent_radius: f64,
    pub min_bond_angle: f64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct BondRecord {
    pub pair: [String; 2],
    pub lengths: Vec<f64>,
}

use crate::model::types::Element;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("unsupported element '{element}' at atom {atom}")]
    UnsupportedElement { atom: usize, element: Element },

    #[error(
        "atom {atom} ({element}) has {bonds} bonds, more than any allowed valence (max {max_valence})"
    )]
    ValenceExceeded {
        atom: usize,
        element: Element,
        bonds: usize,
        max_valence: u8,
    },

    #[error("connectivity covers {graph_atoms} atoms but {elements} elements were supplied")]
    SizeMismatch { graph_atoms: usize, elements: usize },

    #[error("no valid bonding model: {reason}")]
    NoBondingModel { reason: String },
}

impl Error {
    pub fn unsupported_element(atom: usize, element: Element) -> Self {
        Self::UnsupportedElement { atom, element }
    }

    pub fn valence_exceeded(atom: usize, element: Element, bonds: usize, max_valence: u8) -> Self {
        Self::ValenceExceeded {
            atom,
            element,
            bonds,
            max_valence,
        }
    }

    pub fn no_bonding_model(reason: impl Into<String>) -> Self {
        Self::NoBondingModel {
            reason: reason.into(),
        }
    }

    /// Reports whether the error means a bond-order assignment could not be found, as opposed
    /// to the input being outside the supported chemistry.
    pub fn is_resolver_failure(&self) -> bool {
        matches!(
            self,
            Error::ValenceExceeded { .. } | Error::SizeMismatch { .. } | Error::NoBondingModel { .. }
        )
    }
}

use std::fmt::Display;

use variantly::Variantly;

use crate::versions::v2::SpeciesKind;

use super::error::SBMLError;

pub(crate) const SMALL_MOLECULE_SBO_TERM: &str = "SBO:0000247";
pub(crate) const PROTEIN_SBO_TERM: &str = "SBO:0000252";
pub(crate) const COMPLEX_SBO_TERM: &str = "SBO:0000296";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Variantly)]
pub enum SpeciesType {
    SmallMolecule,
    Protein,
    Complex,
}

impl SpeciesType {
    pub fn sbo_term(&self) -> &'static str {
        match self {
            SpeciesType::SmallMolecule => SMALL_MOLECULE_SBO_TERM,
            SpeciesType::Protein => PROTEIN_SBO_TERM,
            SpeciesType::Complex => COMPLEX_SBO_TERM,
        }
    }
}

impl Display for SpeciesType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SpeciesType::SmallMolecule => "small molecule",
            SpeciesType::Protein => "protein",
            SpeciesType::Complex => "complex",
        };
        write!(f, "{name}")
    }
}

impl From<&SpeciesKind> for SpeciesType {
    fn from(kind: &SpeciesKind) -> Self {
        match kind {
            SpeciesKind::SmallMolecule(_) => SpeciesType::SmallMolecule,
            SpeciesKind::Protein(_) => SpeciesType::Protein,
            SpeciesKind::Complex(_) => SpeciesType::Complex,
        }
    }
}

impl TryFrom<&str> for SpeciesType {
    type Error = SBMLError;

    fn try_from(sbo_term: &str) -> Result<Self, Self::Error> {
        Ok(match sbo_term {
            SMALL_MOLECULE_SBO_TERM => SpeciesType::SmallMolecule,
            PROTEIN_SBO_TERM => SpeciesType::Protein,
            COMPLEX_SBO_TERM => SpeciesType::Complex,
            _ => return Err(SBMLError::InvalidSBOTerm(sbo_term.to_string())),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sbo_terms_round_trip() {
        for species_type in [SpeciesType::SmallMolecule, SpeciesType::Protein, SpeciesType::Complex] {
            let parsed = SpeciesType::try_from(species_type.sbo_term()).unwrap();
            assert_eq!(parsed, species_type);
        }
    }

    #[test]
    fn test_unknown_sbo_term() {
        assert!(matches!(
            SpeciesType::try_from("SBO:0000000"),
            Err(SBMLError::InvalidSBOTerm(_))
        ));
    }
}

// Released under MIT License.
// Copyright (c) 2024 Ladislav Bartos

//! Implementation of methods rebuilding the atom types and the types of bonded interactions.

use hashbrown::HashMap;

use super::topology::atom_types_of;
use super::{find_by_id, Atom, AtomType, Data, Interaction, InteractionType, PairType, TopologyKind};
use crate::errors::DataError;

/// Improper styles for which the first atom is not the central atom.
const NONCENTRAL_IMPROPER_STYLES: [&str; 3] = ["distharm", "ring", "class2"];

/// Orders of improper atoms that keep the first (central) atom in place.
const IMPROPER_PERMUTATIONS: [[usize; 4]; 6] = [
    [0, 1, 2, 3],
    [0, 1, 3, 2],
    [0, 2, 1, 3],
    [0, 2, 3, 1],
    [0, 3, 1, 2],
    [0, 3, 2, 1],
];

/// Can a type with comment `candidate` be used for an item with comment `placed`?
fn comment_matches(candidate: &Option<String>, placed: &Option<String>) -> bool {
    placed.is_none() || candidate == placed
}

/// ## Methods for resetting the types of the system.
///
/// The types are rebuilt from the items using them. Items with identical
/// parameters share a type. Types that are not used by any item are removed.
/// New types are numbered from 1 in the order of the first item using them.
impl Data {
    /// Rebuild atom types from the atoms of the system.
    ///
    /// Atoms share a type if their types have the same mass and compatible comments
    /// (the comments are identical or the comment of the atom's type is undefined).
    /// Pair types are renumbered accordingly. Pair types of atom types not used by any atom are removed.
    pub fn reset_atom_types(&mut self) -> Result<(), DataError> {
        let mut new_types: Vec<AtomType> = Vec::new();
        let mut mapping: HashMap<usize, usize> = HashMap::new();

        for atom in self.atoms.iter_mut() {
            let old = find_by_id(&self.atom_types, atom.atom_type, |x| x.id)
                .map(|index| &self.atom_types[index])
                .ok_or(DataError::AtomTypeNotFound(atom.atom_type))?;

            let new_id = match new_types
                .iter()
                .find(|t| t.mass == old.mass && comment_matches(&t.comment, &old.comment))
            {
                Some(t) => t.id,
                None => {
                    let id = new_types.len() + 1;
                    new_types.push(AtomType::new(id, old.mass, old.comment.clone()));
                    id
                }
            };

            mapping.insert(old.id, new_id);
            atom.atom_type = new_id;
        }

        let mut new_pairs: Vec<PairType> = Vec::with_capacity(self.pair_types.len());
        for pair in &self.pair_types {
            let (i, j) = pair.atom_types;
            let (Some(&new_i), Some(&new_j)) = (mapping.get(&i), mapping.get(&j)) else {
                continue;
            };

            let renumbered = PairType::new(
                (new_i, new_j),
                pair.coeffs.clone(),
                pair.style.clone(),
                pair.comment.clone(),
            );

            match new_pairs
                .iter_mut()
                .find(|x| x.atom_types == renumbered.atom_types)
            {
                Some(existing) => *existing = renumbered,
                None => new_pairs.push(renumbered),
            }
        }

        self.atom_types = new_types;
        self.replace_pair_types(new_pairs);
        Ok(())
    }

    /// Rebuild the types of bonds, angles, dihedrals, or impropers.
    ///
    /// Interactions share a type if their types have the same coefficients and style
    /// and compatible comments. If `match_atom_types` is `true`, the interactions must also
    /// involve the same atom types, either in the same or in the reversed order.
    ///
    /// Impropers are always matched by their atom types, see [`Data::reset_improper_types`].
    pub fn reset_types(
        &mut self,
        kind: TopologyKind,
        match_atom_types: bool,
    ) -> Result<(), DataError> {
        let new_types = match kind {
            TopologyKind::Bond => merge_types(
                &self.atoms,
                &mut self.bonds,
                &self.bond_types,
                kind,
                match_atom_types,
            )?,
            TopologyKind::Angle => merge_types(
                &self.atoms,
                &mut self.angles,
                &self.angle_types,
                kind,
                match_atom_types,
            )?,
            TopologyKind::Dihedral => merge_types(
                &self.atoms,
                &mut self.dihedrals,
                &self.dihedral_types,
                kind,
                match_atom_types,
            )?,
            TopologyKind::Improper => return self.reset_improper_types(),
        };

        self.replace_types(kind, new_types);
        Ok(())
    }

    /// Rebuild improper types.
    ///
    /// Impropers share a type if their types have the same coefficients and style,
    /// compatible comments, and the same central atom type with the remaining
    /// three atom types in any order. Atoms of each improper are reordered
    /// so that their types follow the order of the shared type.
    /// Comments of the impropers are kept as they are.
    ///
    /// ## Returns
    /// `DataError::UnsupportedImproperStyle` if any improper type uses a style
    /// in which the first atom is not the central atom (`distharm`, `ring`, `class2`).
    pub fn reset_improper_types(&mut self) -> Result<(), DataError> {
        if let Some(style) = self
            .improper_types
            .iter()
            .filter_map(|t| t.style.as_deref())
            .find(|style| NONCENTRAL_IMPROPER_STYLES.contains(style))
        {
            return Err(DataError::UnsupportedImproperStyle(style.to_owned()));
        }

        let mut new_types: Vec<(InteractionType, [usize; 4])> = Vec::new();

        for improper in self.impropers.iter_mut() {
            let old = find_type(&self.improper_types, improper.interaction_type, TopologyKind::Improper)?;
            let atom_types = atom_types_of(&self.atoms, &improper.atoms)?;

            let found = new_types
                .iter()
                .filter(|(t, _)| t.same_parameters(old) && comment_matches(&t.comment, &old.comment))
                .find_map(|(t, stored)| {
                    IMPROPER_PERMUTATIONS
                        .iter()
                        .find(|p| p.map(|k| atom_types[k]) == *stored)
                        .map(|p| (t.id, *p))
                });

            match found {
                Some((id, permutation)) => {
                    let atoms = improper.atoms;
                    improper.set_atoms(permutation.map(|k| atoms[k]));
                    improper.interaction_type = id;
                }
                None => {
                    let id = new_types.len() + 1;
                    new_types.push((
                        InteractionType::new(id, old.coeffs.clone(), old.style.clone(), old.comment.clone()),
                        atom_types,
                    ));
                    improper.interaction_type = id;
                }
            }
        }

        self.replace_types(
            TopologyKind::Improper,
            new_types.into_iter().map(|(t, _)| t).collect(),
        );
        Ok(())
    }

    /// Rebuild atom types and types of all bonded interactions.
    pub fn reset_all_types(&mut self, match_atom_types: bool) -> Result<(), DataError> {
        self.reset_atom_types()?;
        self.reset_types(TopologyKind::Bond, match_atom_types)?;
        self.reset_types(TopologyKind::Angle, match_atom_types)?;
        self.reset_types(TopologyKind::Dihedral, match_atom_types)?;
        self.reset_improper_types()
    }
}

fn find_type(
    types: &[InteractionType],
    id: usize,
    kind: TopologyKind,
) -> Result<&InteractionType, DataError> {
    find_by_id(types, id, |x| x.id)
        .map(|index| &types[index])
        .ok_or(DataError::TypeNotFound(kind, id))
}

/// Merge the types of interactions with identical parameters.
fn merge_types<const N: usize>(
    atoms: &[Atom],
    interactions: &mut [Interaction<N>],
    old_types: &[InteractionType],
    kind: TopologyKind,
    match_atom_types: bool,
) -> Result<Vec<InteractionType>, DataError> {
    let mut new_types: Vec<(InteractionType, [usize; N])> = Vec::new();

    for interaction in interactions.iter_mut() {
        let old = find_type(old_types, interaction.interaction_type, kind)?;
        let atom_types = atom_types_of(atoms, &interaction.atoms)?;
        let mut reversed = atom_types;
        reversed.reverse();

        let found = new_types.iter().find(|(t, stored)| {
            (!match_atom_types || *stored == atom_types || *stored == reversed)
                && t.same_parameters(old)
                && comment_matches(&t.comment, &old.comment)
        });

        interaction.interaction_type = match found {
            Some((t, _)) => t.id,
            None => {
                let id = new_types.len() + 1;
                new_types.push((
                    InteractionType::new(id, old.coeffs.clone(), old.style.clone(), old.comment.clone()),
                    atom_types,
                ));
                id
            }
        };
    }

    Ok(new_types.into_iter().map(|(t, _)| t).collect())
}

/******************************/
/*         UNIT TESTS         */
/******************************/

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::tests::make_data;
    use crate::data::{Angle, AtomStyle, Bond, Improper};

    #[test]
    fn reset_atom_types_merge() {
        let mut data = make_data();
        // duplicate hydrogen type without comment
        data.add_atom_type(AtomType::new(3, Some(1.008), None));
        data.get_atom_mut(6).unwrap().set_atom_type(3);
        data.add_pair_type(PairType::new((1, 1), Some(vec![0.15, 3.15]), None, None))
            .unwrap();
        data.add_pair_type(PairType::new((2, 2), Some(vec![0.0, 0.0]), None, None))
            .unwrap();
        data.add_pair_type(PairType::new((1, 3), Some(vec![0.1, 1.0]), None, None))
            .unwrap();

        data.reset_atom_types().unwrap();

        assert_eq!(data.atom_types().len(), 2);
        assert_eq!(data.get_atom(6).unwrap().atom_type(), 2);
        assert_eq!(data.get_atom_type(2).unwrap().comment(), &Some(String::from("HW")));

        let pairs: Vec<(usize, usize)> = data.pair_types().iter().map(|x| x.atom_types()).collect();
        assert_eq!(pairs, vec![(1, 1), (1, 2), (2, 2)]);
    }

    #[test]
    fn reset_atom_types_renumber() {
        let mut data = make_data();
        data.add_atom_type(AtomType::new(1, Some(1.008), Some(String::from("HW"))));
        data.add_atom_type(AtomType::new(2, Some(15.9994), Some(String::from("OW"))));
        for id in 1..=6 {
            let atom = data.get_atom_mut(id).unwrap();
            let swapped = if atom.atom_type() == 1 { 2 } else { 1 };
            atom.set_atom_type(swapped);
        }
        data.add_pair_type(PairType::new((1, 2), Some(vec![0.1, 2.0]), None, None))
            .unwrap();
        data.add_pair_type(PairType::new((2, 2), Some(vec![0.15, 3.15]), None, None))
            .unwrap();

        data.reset_atom_types().unwrap();

        // the oxygen is the first atom
        assert_eq!(data.get_atom_type(1).unwrap().comment(), &Some(String::from("OW")));
        assert_eq!(data.get_atom(1).unwrap().atom_type(), 1);
        assert_eq!(data.get_atom(2).unwrap().atom_type(), 2);
        assert_eq!(
            data.get_pair_type(1, 1).unwrap().coeffs(),
            &Some(vec![0.15, 3.15])
        );
        assert_eq!(
            data.get_pair_type(1, 2).unwrap().coeffs(),
            &Some(vec![0.1, 2.0])
        );
    }

    #[test]
    fn reset_atom_types_different_comment() {
        let mut data = make_data();
        data.add_atom_type(AtomType::new(3, Some(1.008), Some(String::from("H"))));
        data.get_atom_mut(6).unwrap().set_atom_type(3);

        data.reset_atom_types().unwrap();
        assert_eq!(data.atom_types().len(), 3);
    }

    fn data_with_duplicate_bond_types() -> Data {
        let mut data = make_data();
        data.add_type(
            TopologyKind::Bond,
            InteractionType::new(2, Some(vec![450.0, 0.9572]), None, None),
        );
        data.add_type(
            TopologyKind::Bond,
            InteractionType::new(3, Some(vec![450.0, 0.9572]), Some(String::from("harmonic")), None),
        );
        data.add_bond(Bond::new(2, 2, [1, 3])).unwrap();
        data.add_bond(Bond::new(4, 3, [4, 6])).unwrap();
        data
    }

    #[test]
    fn reset_bond_types() {
        let mut data = data_with_duplicate_bond_types();
        data.reset_types(TopologyKind::Bond, true).unwrap();

        let types: Vec<usize> = data.bonds().iter().map(|x| x.interaction_type()).collect();
        assert_eq!(types, vec![1, 1, 1, 2]);
        assert_eq!(data.bond_types().len(), 2);
        assert_eq!(
            data.get_type(TopologyKind::Bond, 1).unwrap().comment(),
            &Some(String::from("OW-HW"))
        );
        assert_eq!(
            data.get_type(TopologyKind::Bond, 2).unwrap().style(),
            &Some(String::from("harmonic"))
        );
    }

    #[test]
    fn reset_bond_types_reversed() {
        let mut data = make_data();
        data.add_type(
            TopologyKind::Bond,
            InteractionType::new(2, Some(vec![450.0, 0.9572]), None, None),
        );
        // same bond written in the opposite direction
        data.add_bond(Bond::new(5, 2, [2, 1])).unwrap();

        data.reset_types(TopologyKind::Bond, true).unwrap();
        assert_eq!(data.bond_types().len(), 1);
        assert_eq!(data.get_bond(5).unwrap().interaction_type(), 1);
    }

    #[test]
    fn reset_types_match_atom_types() {
        let mut data = make_data();
        data.add_type(
            TopologyKind::Angle,
            InteractionType::new(2, Some(vec![55.0, 104.52]), None, None),
        );
        // same parameters, different atom types
        data.add_angle(Angle::new(3, 2, [1, 2, 4])).unwrap();

        let mut matched = data.clone();
        matched.reset_types(TopologyKind::Angle, true).unwrap();
        assert_eq!(matched.angle_types().len(), 2);
        assert_eq!(matched.get_angle(3).unwrap().interaction_type(), 2);

        data.reset_types(TopologyKind::Angle, false).unwrap();
        assert_eq!(data.angle_types().len(), 1);
        assert_eq!(data.get_angle(3).unwrap().interaction_type(), 1);
    }

    #[test]
    fn reset_types_missing_type() {
        let mut data = make_data();
        data.replace_types(TopologyKind::Bond, Vec::new());

        assert_eq!(
            data.reset_types(TopologyKind::Bond, true),
            Err(DataError::TypeNotFound(TopologyKind::Bond, 1))
        );
    }

    fn data_with_impropers(style: Option<&str>) -> Data {
        let mut data = Data::new(AtomStyle::Full);
        data.add_atom_type(AtomType::new(1, Some(12.011), Some(String::from("C"))));
        data.add_atom_type(AtomType::new(2, Some(15.999), Some(String::from("O"))));
        data.add_atom_type(AtomType::new(3, Some(14.007), Some(String::from("N"))));
        data.add_atom_type(AtomType::new(4, Some(1.008), Some(String::from("H"))));

        for (id, atom_type) in [(1, 1), (2, 2), (3, 3), (4, 4), (5, 1), (6, 2), (7, 3), (8, 4)] {
            data.add_atom(Atom::new(id, 1, atom_type, [0.0; 3])).unwrap();
        }

        for id in 1..=2 {
            data.add_type(
                TopologyKind::Improper,
                InteractionType::new(id, Some(vec![10.5, 180.0]), style.map(String::from), None),
            );
        }

        data.add_improper(Improper::new(1, 1, [1, 2, 3, 4])).unwrap();
        data.add_improper(Improper::new(2, 2, [5, 8, 6, 7]).with_comment("second"))
            .unwrap();
        data
    }

    #[test]
    fn reset_improper_types() {
        let mut data = data_with_impropers(Some("cvff"));
        data.reset_improper_types().unwrap();

        assert_eq!(data.improper_types().len(), 1);
        let second = data.get_improper(2).unwrap();
        assert_eq!(second.interaction_type(), 1);
        assert_eq!(second.atoms(), [5, 6, 7, 8]);
        assert_eq!(second.comment(), &Some(String::from("second")));
    }

    #[test]
    fn reset_improper_types_different_center() {
        let mut data = data_with_impropers(None);
        data.add_improper(Improper::new(2, 2, [6, 5, 7, 8])).unwrap();
        data.reset_improper_types().unwrap();

        assert_eq!(data.improper_types().len(), 2);
        assert_eq!(data.get_improper(2).unwrap().atoms(), [6, 5, 7, 8]);
    }

    #[test]
    fn reset_improper_types_unsupported() {
        for style in ["distharm", "ring", "class2"] {
            let mut data = data_with_impropers(Some(style));
            assert_eq!(
                data.reset_improper_types(),
                Err(DataError::UnsupportedImproperStyle(style.to_owned()))
            );
        }
    }

    #[test]
    fn reset_types_improper_dispatch() {
        let mut data = data_with_impropers(Some("cvff"));
        data.reset_types(TopologyKind::Improper, false).unwrap();
        assert_eq!(data.improper_types().len(), 1);
    }

    #[test]
    fn reset_all_types() {
        let mut data = data_with_duplicate_bond_types();
        data.add_atom_type(AtomType::new(3, Some(1.008), None));
        data.get_atom_mut(5).unwrap().set_atom_type(3);

        data.reset_all_types(false).unwrap();

        assert_eq!(data.atom_types().len(), 2);
        assert_eq!(data.bond_types().len(), 2);
        assert_eq!(data.angle_types().len(), 1);
        assert!(data.improper_types().is_empty());
    }
}

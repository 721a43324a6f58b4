// Released under MIT License.
// Copyright (c) 2024 Ladislav Bartos

//! Implementation of methods analyzing the bonded topology of the `Data` structure.

use std::collections::VecDeque;

use hashbrown::HashMap;

use super::{find_by_id, Atom, Data, Interaction, InteractionType};
use crate::errors::DataError;

/// ## Methods working with the topology of the system.
impl Data {
    /// Construct the bond graph of the system.
    ///
    /// ## Returns
    /// Map of atom ids to the sorted ids of atoms bonded to them.
    /// Every atom of the system is present in the map, even if it has no bonds.
    pub fn bond_graph(&self) -> HashMap<usize, Vec<usize>> {
        let mut graph: HashMap<usize, Vec<usize>> =
            self.atoms.iter().map(|atom| (atom.id, Vec::new())).collect();

        for bond in &self.bonds {
            let [a, b] = bond.atoms;
            graph.entry(a).or_default().push(b);
            graph.entry(b).or_default().push(a);
        }

        for neighbors in graph.values_mut() {
            neighbors.sort_unstable();
            neighbors.dedup();
        }

        graph
    }

    /// Assign molecule ids based on the bonds between atoms.
    ///
    /// Each connected component of the bond graph is a molecule.
    /// Molecules are numbered from 1 in the order of their first atom.
    pub fn reset_molecule_ids(&mut self) {
        let graph = self.bond_graph();
        let mut molecules: HashMap<usize, usize> = HashMap::with_capacity(self.atoms.len());
        let mut n_molecules = 0;

        for atom in &self.atoms {
            if molecules.contains_key(&atom.id) {
                continue;
            }

            n_molecules += 1;
            molecules.insert(atom.id, n_molecules);

            let mut queue = VecDeque::from([atom.id]);
            while let Some(current) = queue.pop_front() {
                for &neighbor in graph.get(&current).map(|x| x.as_slice()).unwrap_or(&[]) {
                    if !molecules.contains_key(&neighbor) {
                        molecules.insert(neighbor, n_molecules);
                        queue.push_back(neighbor);
                    }
                }
            }
        }

        for atom in self.atoms.iter_mut() {
            if let Some(&molecule) = molecules.get(&atom.id) {
                atom.molecule = molecule;
            }
        }
    }

    /// Get ids of atoms belonging to the molecule with the given id.
    pub fn molecule_atoms(&self, molecule: usize) -> Vec<usize> {
        self.atoms
            .iter()
            .filter(|atom| atom.molecule == molecule)
            .map(|atom| atom.id)
            .collect()
    }

    /// Set comments of all atoms, pair types, and bonded interactions (and their types)
    /// by joining the comments of the involved atom types using `sep`.
    ///
    /// ## Returns
    /// - `DataError::MissingComment` if any atom type involved has no comment.
    /// - `DataError::AtomTypeNotFound` or `DataError::AtomNotFound` if the topology is inconsistent.
    ///
    /// ## Example
    /// Atom types `CT` and `HC` bonded together produce the bond comment `CT-HC`.
    /// ```no_run
    /// use lammps_rs::prelude::*;
    ///
    /// let mut data = Data::from_file("system.data").unwrap();
    /// data.auto_comment_from_atom_types("-").unwrap();
    /// ```
    pub fn auto_comment_from_atom_types(&mut self, sep: &str) -> Result<(), DataError> {
        let pair_comments = self
            .pair_types
            .iter()
            .map(|pair| -> Result<String, DataError> {
                let (i, j) = pair.atom_types;
                Ok([self.atom_type_comment(i)?, self.atom_type_comment(j)?].join(sep))
            })
            .collect::<Result<Vec<String>, DataError>>()?;

        let atom_comments = self
            .atoms
            .iter()
            .map(|atom| self.atom_type_comment(atom.atom_type).map(str::to_owned))
            .collect::<Result<Vec<String>, DataError>>()?;

        let bond_comments = self.interaction_comments(&self.bonds, sep)?;
        let angle_comments = self.interaction_comments(&self.angles, sep)?;
        let dihedral_comments = self.interaction_comments(&self.dihedrals, sep)?;
        let improper_comments = self.interaction_comments(&self.impropers, sep)?;

        for (pair, comment) in self.pair_types.iter_mut().zip(pair_comments) {
            pair.comment = Some(comment);
        }

        for (atom, comment) in self.atoms.iter_mut().zip(atom_comments) {
            atom.comment = Some(comment);
        }

        assign_comments(&mut self.bonds, &mut self.bond_types, bond_comments);
        assign_comments(&mut self.angles, &mut self.angle_types, angle_comments);
        assign_comments(&mut self.dihedrals, &mut self.dihedral_types, dihedral_comments);
        assign_comments(&mut self.impropers, &mut self.improper_types, improper_comments);

        Ok(())
    }

    fn atom_type_comment(&self, id: usize) -> Result<&str, DataError> {
        self.get_atom_type(id)
            .ok_or(DataError::AtomTypeNotFound(id))?
            .comment
            .as_deref()
            .ok_or(DataError::MissingComment(id))
    }

    fn interaction_comments<const N: usize>(
        &self,
        interactions: &[Interaction<N>],
        sep: &str,
    ) -> Result<Vec<String>, DataError> {
        interactions
            .iter()
            .map(|interaction| -> Result<String, DataError> {
                let types = atom_types_of(&self.atoms, &interaction.atoms)?;
                let comments = types
                    .iter()
                    .map(|&t| self.atom_type_comment(t))
                    .collect::<Result<Vec<&str>, DataError>>()?;
                Ok(comments.join(sep))
            })
            .collect()
    }
}

/// Get the atom types of the atoms with the given ids.
pub(super) fn atom_types_of<const N: usize>(
    atoms: &[Atom],
    ids: &[usize; N],
) -> Result<[usize; N], DataError> {
    let mut types = [0; N];
    for (atom_type, &id) in types.iter_mut().zip(ids.iter()) {
        *atom_type = find_by_id(atoms, id, |x| x.id)
            .map(|index| atoms[index].atom_type)
            .ok_or(DataError::AtomNotFound(id))?;
    }

    Ok(types)
}

/// Set comments of interactions and of their types.
/// The type receives the comment of the last interaction using it.
fn assign_comments<const N: usize>(
    interactions: &mut [Interaction<N>],
    types: &mut [InteractionType],
    comments: Vec<String>,
) {
    for (interaction, comment) in interactions.iter_mut().zip(comments) {
        if let Some(index) = find_by_id(types, interaction.interaction_type, |x| x.id) {
            types[index].comment = Some(comment.clone());
        }
        interaction.comment = Some(comment);
    }
}

/******************************/
/*         UNIT TESTS         */
/******************************/

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::tests::make_data;
    use crate::data::{AtomType, Bond, TopologyKind};

    #[test]
    fn bond_graph() {
        let data = make_data();
        let graph = data.bond_graph();

        assert_eq!(graph.len(), 6);
        assert_eq!(graph.get(&1).unwrap(), &vec![2, 3]);
        assert_eq!(graph.get(&2).unwrap(), &vec![1]);
        assert_eq!(graph.get(&4).unwrap(), &vec![5, 6]);
    }

    #[test]
    fn bond_graph_isolated_atom() {
        let mut data = make_data();
        data.add_atom(crate::data::Atom::new(7, 3, 1, [5.0, 5.0, 5.0]))
            .unwrap();

        let graph = data.bond_graph();
        assert!(graph.get(&7).unwrap().is_empty());
    }

    #[test]
    fn reset_molecule_ids() {
        let mut data = make_data();
        for id in 1..=6 {
            data.get_atom_mut(id).unwrap().set_molecule(1);
        }

        data.reset_molecule_ids();

        let molecules: Vec<usize> = data.atoms().iter().map(|x| x.molecule()).collect();
        assert_eq!(molecules, vec![1, 1, 1, 2, 2, 2]);
        assert_eq!(data.molecule_atoms(2), vec![4, 5, 6]);
    }

    #[test]
    fn reset_molecule_ids_joined() {
        let mut data = make_data();
        // connect the two molecules
        data.add_bond(Bond::new(5, 1, [3, 4])).unwrap();
        data.add_atom(crate::data::Atom::new(7, 9, 1, [5.0, 5.0, 5.0]))
            .unwrap();

        data.reset_molecule_ids();

        let molecules: Vec<usize> = data.atoms().iter().map(|x| x.molecule()).collect();
        assert_eq!(molecules, vec![1, 1, 1, 1, 1, 1, 2]);
    }

    #[test]
    fn auto_comment() {
        let mut data = make_data();
        data.add_pair_type(crate::data::PairType::new((1, 2), None, None, None))
            .unwrap();
        data.auto_comment_from_atom_types("-").unwrap();

        assert_eq!(
            data.pair_types()[0].comment(),
            &Some(String::from("OW-HW"))
        );
        assert_eq!(data.get_atom(2).unwrap().comment(), &Some(String::from("HW")));
        assert_eq!(
            data.get_bond(1).unwrap().comment(),
            &Some(String::from("OW-HW"))
        );
        assert_eq!(
            data.get_angle(2).unwrap().comment(),
            &Some(String::from("HW-OW-HW"))
        );
        assert_eq!(
            data.get_type(TopologyKind::Angle, 1).unwrap().comment(),
            &Some(String::from("HW-OW-HW"))
        );
    }

    #[test]
    fn auto_comment_separator() {
        let mut data = make_data();
        data.auto_comment_from_atom_types(" ").unwrap();

        assert_eq!(
            data.get_angle(1).unwrap().comment(),
            &Some(String::from("HW OW HW"))
        );
    }

    #[test]
    fn auto_comment_missing() {
        let mut data = make_data();
        data.add_atom_type(AtomType::new(2, Some(1.008), None));

        assert_eq!(
            data.auto_comment_from_atom_types("-"),
            Err(DataError::MissingComment(2))
        );
        // nothing is changed on failure
        assert_eq!(data.get_atom(1).unwrap().comment(), &None);
    }
}

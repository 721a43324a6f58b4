// Released under MIT License.
// Copyright (c) 2024 Ladislav Bartos

//! Implementation of the `Data` structure describing a LAMMPS system
//! (simulation box, atoms, topology and force field coefficients).

pub mod reset;
pub mod topology;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use getset::{CopyGetters, Getters, Setters};

use crate::errors::{DataError, ParseDataError};
use crate::io::data_io;
use crate::structures::simbox::SimBox;

/******************************/
/*         ATOM STYLE         */
/******************************/

/// Supported atom styles of LAMMPS data files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AtomStyle {
    /// `id mol type q x y z`
    #[default]
    Full,
    /// `id mol type q x y z` (`pqeq` is written identically to `full`)
    Pqeq,
    /// `id mol type x y z`
    Molecular,
}

impl AtomStyle {
    /// Does the style store atomic charges?
    pub fn has_charge(&self) -> bool {
        !matches!(self, AtomStyle::Molecular)
    }
}

impl fmt::Display for AtomStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AtomStyle::Full => "full",
            AtomStyle::Pqeq => "pqeq",
            AtomStyle::Molecular => "molecular",
        };

        write!(f, "{}", name)
    }
}

impl FromStr for AtomStyle {
    type Err = ParseDataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "full" => Ok(AtomStyle::Full),
            "pqeq" => Ok(AtomStyle::Pqeq),
            "molecular" => Ok(AtomStyle::Molecular),
            other => Err(ParseDataError::UnsupportedAtomStyle(other.to_owned())),
        }
    }
}

/******************************/
/*       TOPOLOGY KIND        */
/******************************/

/// Kind of bonded interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TopologyKind {
    Bond,
    Angle,
    Dihedral,
    Improper,
}

impl TopologyKind {
    /// All kinds in the order in which they appear in a data file.
    pub const ALL: [TopologyKind; 4] = [
        TopologyKind::Bond,
        TopologyKind::Angle,
        TopologyKind::Dihedral,
        TopologyKind::Improper,
    ];

    /// Number of atoms involved in an interaction of this kind.
    pub fn n_atoms(&self) -> usize {
        match self {
            TopologyKind::Bond => 2,
            TopologyKind::Angle => 3,
            TopologyKind::Dihedral | TopologyKind::Improper => 4,
        }
    }

    /// Name of the interactions in the header of a data file (e.g., `bonds`).
    pub(crate) fn plural(&self) -> &'static str {
        match self {
            TopologyKind::Bond => "bonds",
            TopologyKind::Angle => "angles",
            TopologyKind::Dihedral => "dihedrals",
            TopologyKind::Improper => "impropers",
        }
    }

    /// Name of the section listing the interactions (e.g., `Bonds`).
    pub(crate) fn section(&self) -> &'static str {
        match self {
            TopologyKind::Bond => "Bonds",
            TopologyKind::Angle => "Angles",
            TopologyKind::Dihedral => "Dihedrals",
            TopologyKind::Improper => "Impropers",
        }
    }

    /// Name of the section listing the coefficients (e.g., `Bond Coeffs`).
    pub(crate) fn coeffs_section(&self) -> &'static str {
        match self {
            TopologyKind::Bond => "Bond Coeffs",
            TopologyKind::Angle => "Angle Coeffs",
            TopologyKind::Dihedral => "Dihedral Coeffs",
            TopologyKind::Improper => "Improper Coeffs",
        }
    }

    /// LAMMPS command setting the coefficients (e.g., `bond_coeff`).
    pub(crate) fn command(&self) -> &'static str {
        match self {
            TopologyKind::Bond => "bond_coeff",
            TopologyKind::Angle => "angle_coeff",
            TopologyKind::Dihedral => "dihedral_coeff",
            TopologyKind::Improper => "improper_coeff",
        }
    }
}

impl fmt::Display for TopologyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TopologyKind::Bond => "bond type",
            TopologyKind::Angle => "angle type",
            TopologyKind::Dihedral => "dihedral type",
            TopologyKind::Improper => "improper type",
        };

        write!(f, "{}", name)
    }
}

/******************************/
/*           TYPES            */
/******************************/

#[derive(Debug, Clone, PartialEq, Getters, CopyGetters, Setters)]
pub struct AtomType {
    #[getset(get_copy = "pub")]
    id: usize,
    #[getset(get_copy = "pub", set = "pub")]
    mass: Option<f64>,
    #[getset(get = "pub", set = "pub")]
    comment: Option<String>,
}

impl AtomType {
    pub fn new(id: usize, mass: Option<f64>, comment: Option<String>) -> Self {
        AtomType { id, mass, comment }
    }
}

/// Non-bonded interaction between two atom types.
#[derive(Debug, Clone, PartialEq, Getters, CopyGetters, Setters)]
pub struct PairType {
    /// Ids of the atom types. The first id is never larger than the second one.
    #[getset(get_copy = "pub")]
    atom_types: (usize, usize),
    #[getset(get = "pub", set = "pub")]
    coeffs: Option<Vec<f64>>,
    #[getset(get = "pub", set = "pub")]
    style: Option<String>,
    #[getset(get = "pub", set = "pub")]
    comment: Option<String>,
}

impl PairType {
    /// Create a new pair type. The atom types are ordered automatically.
    pub fn new(
        atom_types: (usize, usize),
        coeffs: Option<Vec<f64>>,
        style: Option<String>,
        comment: Option<String>,
    ) -> Self {
        let (i, j) = atom_types;
        PairType {
            atom_types: (i.min(j), i.max(j)),
            coeffs,
            style,
            comment,
        }
    }

    /// Is this an interaction between atoms of the same type?
    pub fn is_self(&self) -> bool {
        self.atom_types.0 == self.atom_types.1
    }
}

/// Type of bond, angle, dihedral or improper.
///
/// Coefficients set to `None` are unknown.
#[derive(Debug, Clone, PartialEq, Getters, CopyGetters, Setters)]
pub struct InteractionType {
    #[getset(get_copy = "pub")]
    id: usize,
    #[getset(get = "pub", set = "pub")]
    coeffs: Option<Vec<f64>>,
    #[getset(get = "pub", set = "pub")]
    style: Option<String>,
    #[getset(get = "pub", set = "pub")]
    comment: Option<String>,
}

impl InteractionType {
    pub fn new(
        id: usize,
        coeffs: Option<Vec<f64>>,
        style: Option<String>,
        comment: Option<String>,
    ) -> Self {
        InteractionType {
            id,
            coeffs,
            style,
            comment,
        }
    }

    /// Do two types describe the same interaction (ignoring the comment)?
    pub(crate) fn same_parameters(&self, other: &InteractionType) -> bool {
        self.coeffs == other.coeffs && self.style == other.style
    }
}

/******************************/
/*      ATOMS, TOPOLOGY       */
/******************************/

#[derive(Debug, Clone, PartialEq, Getters, CopyGetters, Setters)]
pub struct Atom {
    #[getset(get_copy = "pub")]
    id: usize,
    /// Id of the molecule the atom belongs to.
    #[getset(get_copy = "pub", set = "pub")]
    molecule: usize,
    #[getset(get_copy = "pub", set = "pub")]
    atom_type: usize,
    #[getset(get_copy = "pub", set = "pub")]
    charge: Option<f64>,
    #[getset(get_copy = "pub", set = "pub")]
    position: [f64; 3],
    /// Image flags.
    #[getset(get_copy = "pub", set = "pub")]
    image: Option<[i32; 3]>,
    #[getset(get_copy = "pub", set = "pub")]
    velocity: Option<[f64; 3]>,
    #[getset(get = "pub", set = "pub")]
    comment: Option<String>,
}

impl Atom {
    /// Create a new atom without charge, image flags, velocity and comment.
    pub fn new(id: usize, molecule: usize, atom_type: usize, position: [f64; 3]) -> Self {
        Atom {
            id,
            molecule,
            atom_type,
            charge: None,
            position,
            image: None,
            velocity: None,
            comment: None,
        }
    }

    pub fn with_charge(mut self, charge: f64) -> Self {
        self.charge = Some(charge);
        self
    }

    pub fn with_image(mut self, image: [i32; 3]) -> Self {
        self.image = Some(image);
        self
    }

    pub fn with_velocity(mut self, velocity: [f64; 3]) -> Self {
        self.velocity = Some(velocity);
        self
    }

    pub fn with_comment(mut self, comment: &str) -> Self {
        self.comment = Some(comment.to_owned());
        self
    }
}

/// Bonded interaction between `N` atoms.
#[derive(Debug, Clone, PartialEq, Getters, CopyGetters, Setters)]
pub struct Interaction<const N: usize> {
    #[getset(get_copy = "pub")]
    id: usize,
    /// Id of the bond/angle/dihedral/improper type.
    #[getset(get_copy = "pub", set = "pub")]
    interaction_type: usize,
    /// Ids of the atoms involved in the interaction.
    #[getset(get_copy = "pub")]
    atoms: [usize; N],
    #[getset(get = "pub", set = "pub")]
    comment: Option<String>,
}

impl<const N: usize> Interaction<N> {
    pub fn new(id: usize, interaction_type: usize, atoms: [usize; N]) -> Self {
        Interaction {
            id,
            interaction_type,
            atoms,
            comment: None,
        }
    }

    pub fn with_comment(mut self, comment: &str) -> Self {
        self.comment = Some(comment.to_owned());
        self
    }

    pub(crate) fn set_atoms(&mut self, atoms: [usize; N]) {
        self.atoms = atoms;
    }
}

pub type Bond = Interaction<2>;
pub type Angle = Interaction<3>;
pub type Dihedral = Interaction<4>;
pub type Improper = Interaction<4>;

/******************************/
/*            DATA            */
/******************************/

/// Complete description of a LAMMPS system as stored in a data file.
///
/// All collections are kept sorted by id. Pair types are sorted by their atom types.
#[derive(Debug, Clone, PartialEq, Getters, CopyGetters, Setters)]
pub struct Data {
    /// Title of the data file.
    #[getset(get = "pub", set = "pub")]
    header: String,
    #[getset(get_copy = "pub", set = "pub")]
    atom_style: AtomStyle,
    #[getset(get = "pub", set = "pub")]
    simbox: SimBox,
    #[getset(get = "pub")]
    atom_types: Vec<AtomType>,
    #[getset(get = "pub")]
    pair_types: Vec<PairType>,
    #[getset(get = "pub")]
    bond_types: Vec<InteractionType>,
    #[getset(get = "pub")]
    angle_types: Vec<InteractionType>,
    #[getset(get = "pub")]
    dihedral_types: Vec<InteractionType>,
    #[getset(get = "pub")]
    improper_types: Vec<InteractionType>,
    #[getset(get = "pub")]
    atoms: Vec<Atom>,
    #[getset(get = "pub")]
    bonds: Vec<Bond>,
    #[getset(get = "pub")]
    angles: Vec<Angle>,
    #[getset(get = "pub")]
    dihedrals: Vec<Dihedral>,
    #[getset(get = "pub")]
    impropers: Vec<Improper>,
}

/// Insert an item into a vector sorted by id. An item with the same id is replaced.
fn insert_by_id<T>(items: &mut Vec<T>, item: T, id: impl Fn(&T) -> usize) {
    match items.binary_search_by_key(&id(&item), &id) {
        Ok(index) => items[index] = item,
        Err(index) => items.insert(index, item),
    }
}

fn find_by_id<T>(items: &[T], target: usize, id: impl Fn(&T) -> usize) -> Option<usize> {
    items.binary_search_by_key(&target, id).ok()
}

/// ## Methods for creating `Data` structures and accessing their properties.
impl Data {
    /// Create an empty `Data` structure with an empty simulation box.
    pub fn new(atom_style: AtomStyle) -> Self {
        Data {
            header: String::new(),
            atom_style,
            simbox: SimBox::new([[0.0, 0.0]; 3]),
            atom_types: Vec::new(),
            pair_types: Vec::new(),
            bond_types: Vec::new(),
            angle_types: Vec::new(),
            dihedral_types: Vec::new(),
            improper_types: Vec::new(),
            atoms: Vec::new(),
            bonds: Vec::new(),
            angles: Vec::new(),
            dihedrals: Vec::new(),
            impropers: Vec::new(),
        }
    }

    /// Read a LAMMPS data file.
    ///
    /// The atom style is taken from the comment of the `Atoms` section (`Atoms # full`).
    /// If the comment is not present, `full` style is assumed.
    ///
    /// ## Example
    /// ```no_run
    /// use lammps_rs::prelude::*;
    ///
    /// let data = Data::from_file("system.data").unwrap();
    /// println!("System contains {} atoms and {} bonds.", data.atoms().len(), data.bonds().len());
    /// ```
    pub fn from_file(filename: impl AsRef<Path>) -> Result<Data, ParseDataError> {
        data_io::read_data(filename, None)
    }

    /// Read a LAMMPS data file assuming the specified atom style.
    /// The comment of the `Atoms` section is ignored.
    pub fn from_file_with_style(
        filename: impl AsRef<Path>,
        atom_style: AtomStyle,
    ) -> Result<Data, ParseDataError> {
        data_io::read_data(filename, Some(atom_style))
    }

    /// Get the types of bonds, angles, dihedrals or impropers.
    pub fn types(&self, kind: TopologyKind) -> &[InteractionType] {
        match kind {
            TopologyKind::Bond => &self.bond_types,
            TopologyKind::Angle => &self.angle_types,
            TopologyKind::Dihedral => &self.dihedral_types,
            TopologyKind::Improper => &self.improper_types,
        }
    }

    pub(crate) fn types_mut(&mut self, kind: TopologyKind) -> &mut Vec<InteractionType> {
        match kind {
            TopologyKind::Bond => &mut self.bond_types,
            TopologyKind::Angle => &mut self.angle_types,
            TopologyKind::Dihedral => &mut self.dihedral_types,
            TopologyKind::Improper => &mut self.improper_types,
        }
    }

    /// Number of bonds, angles, dihedrals or impropers.
    pub fn n_interactions(&self, kind: TopologyKind) -> usize {
        match kind {
            TopologyKind::Bond => self.bonds.len(),
            TopologyKind::Angle => self.angles.len(),
            TopologyKind::Dihedral => self.dihedrals.len(),
            TopologyKind::Improper => self.impropers.len(),
        }
    }

    /// Ids of the types used by the interactions of the given kind.
    pub(crate) fn used_types(&self, kind: TopologyKind) -> Vec<usize> {
        match kind {
            TopologyKind::Bond => self.bonds.iter().map(|x| x.interaction_type).collect(),
            TopologyKind::Angle => self.angles.iter().map(|x| x.interaction_type).collect(),
            TopologyKind::Dihedral => self.dihedrals.iter().map(|x| x.interaction_type).collect(),
            TopologyKind::Improper => self.impropers.iter().map(|x| x.interaction_type).collect(),
        }
    }

    pub fn get_atom(&self, id: usize) -> Option<&Atom> {
        find_by_id(&self.atoms, id, |x| x.id).map(|i| &self.atoms[i])
    }

    pub fn get_atom_mut(&mut self, id: usize) -> Option<&mut Atom> {
        find_by_id(&self.atoms, id, |x| x.id).map(move |i| &mut self.atoms[i])
    }

    pub fn get_atom_type(&self, id: usize) -> Option<&AtomType> {
        find_by_id(&self.atom_types, id, |x| x.id).map(|i| &self.atom_types[i])
    }

    pub fn get_atom_type_mut(&mut self, id: usize) -> Option<&mut AtomType> {
        find_by_id(&self.atom_types, id, |x| x.id).map(move |i| &mut self.atom_types[i])
    }

    /// Get the pair type for atom types `i` and `j` (in any order).
    pub fn get_pair_type(&self, i: usize, j: usize) -> Option<&PairType> {
        let key = (i.min(j), i.max(j));
        self.pair_types
            .binary_search_by_key(&key, |x| x.atom_types)
            .ok()
            .map(|index| &self.pair_types[index])
    }

    /// Get bond, angle, dihedral or improper type with the given id.
    pub fn get_type(&self, kind: TopologyKind, id: usize) -> Option<&InteractionType> {
        let types = self.types(kind);
        find_by_id(types, id, |x| x.id).map(|i| &types[i])
    }

    pub fn get_type_mut(&mut self, kind: TopologyKind, id: usize) -> Option<&mut InteractionType> {
        let types = self.types_mut(kind);
        find_by_id(types, id, |x| x.id).map(move |i| &mut types[i])
    }

    pub fn get_bond(&self, id: usize) -> Option<&Bond> {
        find_by_id(&self.bonds, id, |x| x.id).map(|i| &self.bonds[i])
    }

    pub fn get_angle(&self, id: usize) -> Option<&Angle> {
        find_by_id(&self.angles, id, |x| x.id).map(|i| &self.angles[i])
    }

    pub fn get_dihedral(&self, id: usize) -> Option<&Dihedral> {
        find_by_id(&self.dihedrals, id, |x| x.id).map(|i| &self.dihedrals[i])
    }

    pub fn get_improper(&self, id: usize) -> Option<&Improper> {
        find_by_id(&self.impropers, id, |x| x.id).map(|i| &self.impropers[i])
    }

    /// Id that would be assigned to a newly added atom.
    pub fn next_atom_id(&self) -> usize {
        self.atoms.len() + 1
    }

    pub fn next_atom_type_id(&self) -> usize {
        self.atom_types.len() + 1
    }

    pub fn next_type_id(&self, kind: TopologyKind) -> usize {
        self.types(kind).len() + 1
    }

    pub fn next_interaction_id(&self, kind: TopologyKind) -> usize {
        self.n_interactions(kind) + 1
    }
}

/// ## Methods for adding items into the `Data` structure.
///
/// Items with an already existing id replace the original items.
impl Data {
    pub fn add_atom_type(&mut self, atom_type: AtomType) {
        insert_by_id(&mut self.atom_types, atom_type, |x| x.id);
    }

    /// Add a pair type. Pair type for the same atom types is replaced.
    ///
    /// ## Returns
    /// `DataError::AtomTypeNotFound` if any of the atom types does not exist.
    pub fn add_pair_type(&mut self, pair_type: PairType) -> Result<(), DataError> {
        let (i, j) = pair_type.atom_types;
        for id in [i, j] {
            if self.get_atom_type(id).is_none() {
                return Err(DataError::AtomTypeNotFound(id));
            }
        }

        match self
            .pair_types
            .binary_search_by_key(&(i, j), |x| x.atom_types)
        {
            Ok(index) => self.pair_types[index] = pair_type,
            Err(index) => self.pair_types.insert(index, pair_type),
        }

        Ok(())
    }

    /// Add a bond, angle, dihedral or improper type.
    pub fn add_type(&mut self, kind: TopologyKind, interaction_type: InteractionType) {
        insert_by_id(self.types_mut(kind), interaction_type, |x| x.id);
    }

    /// Add an atom.
    ///
    /// ## Returns
    /// `DataError::AtomTypeNotFound` if the type of the atom does not exist.
    pub fn add_atom(&mut self, atom: Atom) -> Result<(), DataError> {
        if self.get_atom_type(atom.atom_type).is_none() {
            return Err(DataError::AtomTypeNotFound(atom.atom_type));
        }

        insert_by_id(&mut self.atoms, atom, |x| x.id);
        Ok(())
    }

    pub fn add_bond(&mut self, bond: Bond) -> Result<(), DataError> {
        self.check_interaction(TopologyKind::Bond, bond.interaction_type, &bond.atoms)?;
        insert_by_id(&mut self.bonds, bond, |x| x.id);
        Ok(())
    }

    pub fn add_angle(&mut self, angle: Angle) -> Result<(), DataError> {
        self.check_interaction(TopologyKind::Angle, angle.interaction_type, &angle.atoms)?;
        insert_by_id(&mut self.angles, angle, |x| x.id);
        Ok(())
    }

    pub fn add_dihedral(&mut self, dihedral: Dihedral) -> Result<(), DataError> {
        self.check_interaction(
            TopologyKind::Dihedral,
            dihedral.interaction_type,
            &dihedral.atoms,
        )?;
        insert_by_id(&mut self.dihedrals, dihedral, |x| x.id);
        Ok(())
    }

    pub fn add_improper(&mut self, improper: Improper) -> Result<(), DataError> {
        self.check_interaction(
            TopologyKind::Improper,
            improper.interaction_type,
            &improper.atoms,
        )?;
        insert_by_id(&mut self.impropers, improper, |x| x.id);
        Ok(())
    }

    /// Check that the type and all the atoms of an interaction exist.
    fn check_interaction(
        &self,
        kind: TopologyKind,
        interaction_type: usize,
        atoms: &[usize],
    ) -> Result<(), DataError> {
        if let Some(missing) = atoms.iter().find(|&&a| self.get_atom(a).is_none()) {
            return Err(DataError::AtomNotFound(*missing));
        }

        if self.get_type(kind, interaction_type).is_none() {
            return Err(DataError::TypeNotFound(kind, interaction_type));
        }

        Ok(())
    }

    /// Replace all pair types. The pair types are sorted.
    pub(crate) fn replace_pair_types(&mut self, mut pair_types: Vec<PairType>) {
        pair_types.sort_by_key(|x| x.atom_types);
        self.pair_types = pair_types;
    }

    /// Replace all types of the given kind. The types are sorted.
    pub(crate) fn replace_types(&mut self, kind: TopologyKind, mut types: Vec<InteractionType>) {
        types.sort_by_key(|x| x.id);
        *self.types_mut(kind) = types;
    }
}

/******************************/
/*         UNIT TESTS         */
/******************************/

// Released under MIT License.
// Copyright (c) 2024 Ladislav Bartos

//! Implementation of functions for reading and writing LAMMPS data files.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::{debug, warn};

use crate::auxiliary::{comment_suffix, format_sci, split_comment};
use crate::data::{
    Angle, Atom, AtomStyle, AtomType, Bond, Data, Dihedral, Improper, InteractionType, PairType,
    TopologyKind,
};
use crate::errors::{DataError, ParseDataError, ReadError, WriteDataError};
use crate::io::source::TextSource;

/******************************/
/*     SHARED COEFFICIENTS    */
/******************************/

/// Parse the tokens following the id(s) of a coefficient line.
/// `?` tokens are ignored, numbers are coefficients, and any other token is the style.
/// If no coefficient is present, the coefficients are unknown (`None`).
pub(crate) fn parse_coeff_tokens(
    tokens: &[&str],
    default_style: &Option<String>,
) -> (Option<Vec<f64>>, Option<String>) {
    let mut coeffs = Vec::new();
    let mut style = None;

    for token in tokens.iter().filter(|&&x| x != "?") {
        match token.parse::<f64>() {
            Ok(x) => coeffs.push(x),
            Err(_) => style = Some((*token).to_owned()),
        }
    }

    let coeffs = if coeffs.is_empty() { None } else { Some(coeffs) };
    (coeffs, style.or_else(|| default_style.clone()))
}

/// Collect the distinct styles (including the undefined style) in the order of appearance.
pub(crate) fn distinct_styles<'a>(
    styles: impl Iterator<Item = &'a Option<String>>,
) -> Vec<&'a Option<String>> {
    let mut distinct: Vec<&Option<String>> = Vec::new();
    for style in styles {
        if !distinct.contains(&style) {
            distinct.push(style);
        }
    }

    distinct
}

/// Format the style column used when several styles are mixed.
pub(crate) fn style_column(style: &Option<String>) -> String {
    format!(" {:<7}", style.as_deref().unwrap_or("none"))
}

/// Format coefficients. Unknown coefficients are written as `unknown`.
pub(crate) fn format_coeffs(coeffs: &Option<Vec<f64>>, unknown: &str) -> String {
    match coeffs {
        Some(values) => values.iter().map(|x| format!(" {:9.4}", x)).collect(),
        None => unknown.to_owned(),
    }
}

/******************************/
/*         READING            */
/******************************/

/// Sections of a data file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Masses,
    PairCoeffs,
    PairIJCoeffs,
    Coeffs(TopologyKind),
    Atoms,
    Velocities,
    Topology(TopologyKind),
    Unsupported,
}

impl Section {
    fn from_keyword(keyword: &str) -> Section {
        match keyword {
            "Masses" => Section::Masses,
            "Pair Coeffs" => Section::PairCoeffs,
            "PairIJ Coeffs" => Section::PairIJCoeffs,
            "Atoms" => Section::Atoms,
            "Velocities" => Section::Velocities,
            other => TopologyKind::ALL
                .into_iter()
                .find_map(|kind| {
                    if other == kind.coeffs_section() {
                        Some(Section::Coeffs(kind))
                    } else if other == kind.section() {
                        Some(Section::Topology(kind))
                    } else {
                        None
                    }
                })
                .unwrap_or(Section::Unsupported),
        }
    }
}

/// Numbers of items declared in the header of a data file.
#[derive(Debug, Default)]
struct HeaderCounts {
    atoms: usize,
    atom_types: usize,
    interactions: [usize; 4],
    types: [usize; 4],
}

struct DataParser {
    data: Data,
    counts: HeaderCounts,
    forced_style: Option<AtomStyle>,
    section: Option<Section>,
    default_style: Option<String>,
}

/// Convert errors of the text source into errors of data file parsing.
fn source_error(error: ReadError) -> ParseDataError {
    match error {
        ReadError::FileNotFound(path) => ParseDataError::FileNotFound(path),
        ReadError::CouldNotRead(path) | ReadError::UnexpectedEof(path) => {
            ParseDataError::CouldNotRead(path)
        }
        other => panic!(
            "FATAL LAMMPS_RS ERROR | data_io::source_error | Unexpected error when reading a data file: {:?}",
            other
        ),
    }
}

fn parse_value<T: std::str::FromStr>(token: Option<&&str>, line: &str) -> Result<T, ParseDataError> {
    token
        .and_then(|x| x.parse::<T>().ok())
        .ok_or_else(|| ParseDataError::ParseLineErr(line.to_owned()))
}

fn parse_array<T: std::str::FromStr + Copy + Default, const N: usize>(
    tokens: &[&str],
    line: &str,
) -> Result<[T; N], ParseDataError> {
    if tokens.len() < N {
        return Err(ParseDataError::ParseLineErr(line.to_owned()));
    }

    let mut values = [T::default(); N];
    for (value, token) in values.iter_mut().zip(tokens.iter()) {
        *value = parse_value(Some(token), line)?;
    }

    Ok(values)
}

/// Read a LAMMPS data file.
/// If `style` is provided, the comment of the `Atoms` section is ignored.
pub(crate) fn read_data(
    filename: impl AsRef<Path>,
    style: Option<AtomStyle>,
) -> Result<Data, ParseDataError> {
    let mut source = TextSource::open(filename.as_ref()).map_err(source_error)?;

    let header = source
        .read_line()
        .map_err(source_error)?
        .ok_or_else(|| ParseDataError::EmptyFile(Box::from(filename.as_ref())))?;

    let mut parser = DataParser {
        data: Data::new(style.unwrap_or_default()),
        counts: HeaderCounts::default(),
        forced_style: style,
        section: None,
        default_style: None,
    };
    parser.data.set_header(header.trim().to_owned());

    while let Some(line) = source.read_line().map_err(source_error)? {
        let (content, comment) = split_comment(&line);
        let content = content.trim();
        if content.is_empty() {
            continue;
        }

        if content.starts_with(|c: char| c.is_ascii_alphabetic()) {
            parser.start_section(content, comment)?;
        } else if parser.section.is_none() {
            parser.parse_header_line(content)?;
        } else {
            parser.parse_section_line(content, comment)?;
        }
    }

    parser.finish()
}

impl DataParser {
    fn parse_header_line(&mut self, line: &str) -> Result<(), ParseDataError> {
        let tokens: Vec<&str> = line.split_whitespace().collect();

        for (i, keyword) in ["xlo xhi", "ylo yhi", "zlo zhi"].into_iter().enumerate() {
            if line.ends_with(keyword) {
                let bounds = parse_array::<f64, 2>(&tokens, line)?;
                let mut simbox = self.data.simbox().clone();
                simbox.bounds[i] = bounds;
                self.data.set_simbox(simbox);
                return Ok(());
            }
        }

        if line.ends_with("xy xz yz") {
            let tilt = parse_array::<f64, 3>(&tokens, line)?;
            let simbox = self.data.simbox().clone().with_tilt(tilt);
            self.data.set_simbox(simbox);
            return Ok(());
        }

        let count: usize = parse_value(tokens.first(), line)?;
        let keyword = tokens[1..].join(" ");

        match keyword.as_str() {
            "atoms" => self.counts.atoms = count,
            "atom types" => self.counts.atom_types = count,
            other => {
                let declared = TopologyKind::ALL.into_iter().find_map(|kind| {
                    if other == kind.plural() {
                        Some((kind, false))
                    } else if other == format!("{}s", kind) {
                        Some((kind, true))
                    } else {
                        None
                    }
                });

                match declared {
                    Some((kind, false)) => self.counts.interactions[kind as usize] = count,
                    Some((kind, true)) => self.counts.types[kind as usize] = count,
                    None => warn!(
                        "Data file: header keyword '{}' is not supported and will be ignored.",
                        other
                    ),
                }
            }
        }

        Ok(())
    }

    fn start_section(
        &mut self,
        keyword: &str,
        comment: Option<String>,
    ) -> Result<(), ParseDataError> {
        let section = Section::from_keyword(keyword);
        self.default_style = None;

        match section {
            Section::Unsupported => warn!(
                "Data file: section '{}' is not supported and will be skipped.",
                keyword
            ),
            Section::Atoms => {
                if self.forced_style.is_none() {
                    if let Some(style) = comment {
                        let style = style.parse::<AtomStyle>()?;
                        self.data.set_atom_style(style);
                    }
                }
            }
            Section::PairCoeffs | Section::PairIJCoeffs | Section::Coeffs(_) => {
                self.default_style = comment
            }
            _ => (),
        }

        debug!("Data file: reading section '{}'.", keyword);
        self.section = Some(section);
        Ok(())
    }

    fn parse_section_line(
        &mut self,
        line: &str,
        comment: Option<String>,
    ) -> Result<(), ParseDataError> {
        let tokens: Vec<&str> = line.split_whitespace().collect();

        match self.section {
            Some(Section::Masses) => {
                let id = parse_value(tokens.first(), line)?;
                let mass = parse_value(tokens.get(1), line)?;
                self.data
                    .add_atom_type(AtomType::new(id, Some(mass), comment));
            }
            Some(Section::PairCoeffs) => {
                let i = parse_value(tokens.first(), line)?;
                let (coeffs, style) = parse_coeff_tokens(&tokens[1..], &self.default_style);
                self.add_pair_type(PairType::new((i, i), coeffs, style, comment), line)?;
            }
            Some(Section::PairIJCoeffs) => {
                let [i, j] = parse_array::<usize, 2>(&tokens, line)?;
                let (coeffs, style) = parse_coeff_tokens(&tokens[2..], &self.default_style);
                self.add_pair_type(PairType::new((i, j), coeffs, style, comment), line)?;
            }
            Some(Section::Coeffs(kind)) => {
                let id = parse_value(tokens.first(), line)?;
                let (coeffs, style) = parse_coeff_tokens(&tokens[1..], &self.default_style);
                self.data
                    .add_type(kind, InteractionType::new(id, coeffs, style, comment));
            }
            Some(Section::Atoms) => self.parse_atom(&tokens, line, comment)?,
            Some(Section::Velocities) => {
                let id = parse_value(tokens.first(), line)?;
                let velocity = parse_array::<f64, 3>(&tokens[1..], line)?;
                self.data
                    .get_atom_mut(id)
                    .ok_or(ParseDataError::AtomNotFound(id))?
                    .set_velocity(Some(velocity));
            }
            Some(Section::Topology(kind)) => self.parse_interaction(kind, &tokens, line, comment)?,
            Some(Section::Unsupported) | None => (),
        }

        Ok(())
    }

    fn add_pair_type(&mut self, pair_type: PairType, line: &str) -> Result<(), ParseDataError> {
        let (i, j) = pair_type.atom_types();
        for id in [i, j] {
            if self.data.get_atom_type(id).is_none() {
                self.data.add_atom_type(AtomType::new(id, None, None));
            }
        }

        self.data
            .add_pair_type(pair_type)
            .map_err(|_| ParseDataError::ParseLineErr(line.to_owned()))
    }

    fn parse_atom(
        &mut self,
        tokens: &[&str],
        line: &str,
        comment: Option<String>,
    ) -> Result<(), ParseDataError> {
        let [id, molecule, atom_type] = parse_array::<usize, 3>(tokens, line)?;

        let has_charge = self.data.atom_style().has_charge();
        let first_coordinate = if has_charge { 4 } else { 3 };
        let position = parse_array::<f64, 3>(tokens.get(first_coordinate..).unwrap_or(&[]), line)?;

        let mut atom = Atom::new(id, molecule, atom_type, position);
        if has_charge {
            atom = atom.with_charge(parse_value(tokens.get(3), line)?);
        }

        if tokens.len() >= first_coordinate + 6 {
            atom = atom.with_image(parse_array::<i32, 3>(&tokens[first_coordinate + 3..], line)?);
        }

        atom.set_comment(comment.clone());

        if self.data.get_atom_type(atom_type).is_none() {
            self.data
                .add_atom_type(AtomType::new(atom_type, None, comment));
        }

        self.data
            .add_atom(atom)
            .map_err(|_| ParseDataError::ParseLineErr(line.to_owned()))
    }

    fn parse_interaction(
        &mut self,
        kind: TopologyKind,
        tokens: &[&str],
        line: &str,
        comment: Option<String>,
    ) -> Result<(), ParseDataError> {
        let id = parse_value(tokens.first(), line)?;
        let interaction_type = parse_value(tokens.get(1), line)?;
        let atoms = tokens.get(2..).unwrap_or(&[]);

        if self.data.get_type(kind, interaction_type).is_none() {
            self.data.add_type(
                kind,
                InteractionType::new(interaction_type, None, None, comment.clone()),
            );
        }

        let result = match kind {
            TopologyKind::Bond => {
                let mut bond = Bond::new(id, interaction_type, parse_array(atoms, line)?);
                bond.set_comment(comment);
                self.data.add_bond(bond)
            }
            TopologyKind::Angle => {
                let mut angle = Angle::new(id, interaction_type, parse_array(atoms, line)?);
                angle.set_comment(comment);
                self.data.add_angle(angle)
            }
            TopologyKind::Dihedral => {
                let mut dihedral = Dihedral::new(id, interaction_type, parse_array(atoms, line)?);
                dihedral.set_comment(comment);
                self.data.add_dihedral(dihedral)
            }
            TopologyKind::Improper => {
                let mut improper = Improper::new(id, interaction_type, parse_array(atoms, line)?);
                improper.set_comment(comment);
                self.data.add_improper(improper)
            }
        };

        result.map_err(|e| match e {
            DataError::AtomNotFound(atom) => ParseDataError::AtomNotFound(atom),
            _ => ParseDataError::ParseLineErr(line.to_owned()),
        })
    }

    /// Create types declared in the header but never defined and check the numbers of items.
    fn finish(mut self) -> Result<Data, ParseDataError> {
        for id in 1..=self.counts.atom_types {
            if self.data.get_atom_type(id).is_none() {
                self.data.add_atom_type(AtomType::new(id, None, None));
            }
        }

        for kind in TopologyKind::ALL {
            for id in 1..=self.counts.types[kind as usize] {
                if self.data.get_type(kind, id).is_none() {
                    self.data
                        .add_type(kind, InteractionType::new(id, None, None, None));
                }
            }
        }

        let mut checks = vec![
            (String::from("atoms"), self.counts.atoms, self.data.atoms().len()),
            (
                String::from("atom types"),
                self.counts.atom_types,
                self.data.atom_types().len(),
            ),
        ];

        for kind in TopologyKind::ALL {
            checks.push((
                kind.plural().to_owned(),
                self.counts.interactions[kind as usize],
                self.data.n_interactions(kind),
            ));
            checks.push((
                format!("{}s", kind),
                self.counts.types[kind as usize],
                self.data.types(kind).len(),
            ));
        }

        if let Some((name, declared, read)) = checks.into_iter().find(|(_, d, r)| d != r) {
            return Err(ParseDataError::CountMismatch(name, declared, read));
        }

        Ok(self.data)
    }
}

/******************************/
/*          WRITING           */
/******************************/

/// ## Methods for writing data files.
impl Data {
    /// Write the system into a LAMMPS data file.
    ///
    /// If `write_coeffs` is `true`, the force field coefficients are written
    /// into the `Pair Coeffs`, `PairIJ Coeffs`, and `<Kind> Coeffs` sections.
    ///
    /// ## Returns
    /// - `Ok` if the file has been successfully written.
    /// - `WriteDataError::MissingMass` if only some atom types have masses.
    /// - `WriteDataError::CouldNotCreate` or `WriteDataError::CouldNotWrite` if writing failed.
    ///
    /// ## Notes
    /// - `Masses` section is not written if no atom type has a mass.
    /// - `Velocities` section is written if any atom has a velocity.
    ///   Missing velocities are written as zero.
    pub fn write_data(
        &self,
        filename: impl AsRef<Path>,
        write_coeffs: bool,
    ) -> Result<(), WriteDataError> {
        let n_masses = self
            .atom_types()
            .iter()
            .filter(|x| x.mass().is_some())
            .count();

        if n_masses != 0 && n_masses != self.atom_types().len() {
            if let Some(missing) = self.atom_types().iter().find(|x| x.mass().is_none()) {
                return Err(WriteDataError::MissingMass(missing.id()));
            }
        }

        let output = File::create(filename.as_ref())
            .map_err(|_| WriteDataError::CouldNotCreate(Box::from(filename.as_ref())))?;
        let mut writer = BufWriter::new(output);

        self.write_data_header(&mut writer)?;

        if n_masses != 0 {
            let lines = self.atom_types().iter().map(|t| {
                format!(
                    "{:4} {:9.6}{}",
                    t.id(),
                    t.mass().unwrap_or_default(),
                    comment_suffix(t.comment())
                )
            });
            write_section(&mut writer, "Masses", lines)?;
        }

        if write_coeffs {
            self.write_coeff_sections(&mut writer)?;
        }

        let has_charge = self.atom_style().has_charge();
        let atoms = self.atoms().iter().map(|atom| {
            let mut line = format!(
                "{:7} {:7} {:7}",
                atom.id(),
                atom.molecule(),
                atom.atom_type()
            );
            if has_charge {
                line.push_str(&format!(" {:9.6}", atom.charge().unwrap_or_default()));
            }
            for x in atom.position() {
                line.push(' ');
                line.push_str(&format_sci(x, 6, 13));
            }
            if let Some([nx, ny, nz]) = atom.image() {
                line.push_str(&format!(" {} {} {}", nx, ny, nz));
            }
            line.push_str(&comment_suffix(atom.comment()));
            line
        });
        write_section(
            &mut writer,
            &format!("Atoms # {}", self.atom_style()),
            atoms,
        )?;

        if self.atoms().iter().any(|x| x.velocity().is_some()) {
            let velocities = self.atoms().iter().map(|atom| {
                let mut line = format!("{:7}", atom.id());
                for v in atom.velocity().unwrap_or_default() {
                    line.push(' ');
                    line.push_str(&format_sci(v, 6, 13));
                }
                line.push_str(&comment_suffix(atom.comment()));
                line
            });
            write_section(&mut writer, "Velocities", velocities)?;
        }

        write_interactions(&mut writer, TopologyKind::Bond, self.bonds())?;
        write_interactions(&mut writer, TopologyKind::Angle, self.angles())?;
        write_interactions(&mut writer, TopologyKind::Dihedral, self.dihedrals())?;
        write_interactions(&mut writer, TopologyKind::Improper, self.impropers())?;

        writer.flush().map_err(|_| WriteDataError::CouldNotWrite)?;
        Ok(())
    }

    fn write_data_header(&self, writer: &mut impl Write) -> Result<(), WriteDataError> {
        let mut header = format!("{}\n\n{} atoms\n", self.header(), self.atoms().len());
        for kind in TopologyKind::ALL {
            let n = self.n_interactions(kind);
            if n != 0 {
                header.push_str(&format!("{} {}\n", n, kind.plural()));
            }
        }

        header.push_str(&format!("\n{} atom types\n", self.atom_types().len()));
        for kind in TopologyKind::ALL {
            let n = self.types(kind).len();
            if n != 0 {
                header.push_str(&format!("{} {}s\n", n, kind));
            }
        }
        header.push('\n');

        let simbox = self.simbox();
        for (bounds, dim) in simbox.bounds.iter().zip(["x", "y", "z"]) {
            header.push_str(&format!(
                "{:.6} {:.6} {}lo {}hi\n",
                bounds[0], bounds[1], dim, dim
            ));
        }

        if simbox.tilt.iter().any(|&x| x != 0.0) {
            header.push_str(&format!(
                "{:.6} {:.6} {:.6} xy xz yz\n",
                simbox.tilt[0], simbox.tilt[1], simbox.tilt[2]
            ));
        }
        header.push('\n');

        write!(writer, "{}", header).map_err(|_| WriteDataError::CouldNotWrite)
    }

    fn write_coeff_sections(&self, writer: &mut impl Write) -> Result<(), WriteDataError> {
        let pair_styles = distinct_styles(self.pair_types().iter().map(|x| x.style()));
        let pair_line = |pair: &PairType, ids: String| {
            let mut line = ids;
            if pair_styles.len() > 1 {
                line.push_str(&style_column(pair.style()));
            }
            line.push_str(&format_coeffs(pair.coeffs(), ""));
            line.push_str(&comment_suffix(pair.comment()));
            line
        };

        let self_pairs: Vec<&PairType> = self.pair_types().iter().filter(|x| x.is_self()).collect();
        if !self_pairs.is_empty() {
            write_section(
                writer,
                &coeffs_section_header("Pair Coeffs", &pair_styles),
                self_pairs
                    .into_iter()
                    .map(|p| pair_line(p, format!("{:4}", p.atom_types().0))),
            )?;
        }

        let cross_pairs: Vec<&PairType> =
            self.pair_types().iter().filter(|x| !x.is_self()).collect();
        if !cross_pairs.is_empty() {
            write_section(
                writer,
                &coeffs_section_header("PairIJ Coeffs", &pair_styles),
                cross_pairs.into_iter().map(|p| {
                    let (i, j) = p.atom_types();
                    pair_line(p, format!("{:4} {:4}", i, j))
                }),
            )?;
        }

        for kind in TopologyKind::ALL {
            let types = self.types(kind);
            if types.is_empty() {
                continue;
            }

            let styles = distinct_styles(types.iter().map(|x| x.style()));
            let lines = types.iter().map(|t| {
                let mut line = format!("{:4}", t.id());
                if styles.len() > 1 {
                    line.push_str(&style_column(t.style()));
                }
                line.push_str(&format_coeffs(t.coeffs(), ""));
                line.push_str(&comment_suffix(t.comment()));
                line
            });

            write_section(
                writer,
                &coeffs_section_header(kind.coeffs_section(), &styles),
                lines,
            )?;
        }

        Ok(())
    }
}

/// The style is written into the section header if all items share the same defined style.
fn coeffs_section_header(name: &str, styles: &[&Option<String>]) -> String {
    match styles {
        [Some(style)] => format!("{} # {}", name, style),
        _ => name.to_owned(),
    }
}

fn write_section(
    writer: &mut impl Write,
    name: &str,
    lines: impl Iterator<Item = String>,
) -> Result<(), WriteDataError> {
    writeln!(writer, "{}\n", name).map_err(|_| WriteDataError::CouldNotWrite)?;
    for line in lines {
        writeln!(writer, "{}", line).map_err(|_| WriteDataError::CouldNotWrite)?;
    }
    writeln!(writer).map_err(|_| WriteDataError::CouldNotWrite)
}

fn write_interactions<const N: usize>(
    writer: &mut impl Write,
    kind: TopologyKind,
    interactions: &[crate::data::Interaction<N>],
) -> Result<(), WriteDataError> {
    if interactions.is_empty() {
        return Ok(());
    }

    let lines = interactions.iter().map(|x| {
        let mut line = format!("{:7} {:7}", x.id(), x.interaction_type());
        for atom in x.atoms() {
            line.push_str(&format!(" {:7}", atom));
        }
        line.push_str(&comment_suffix(x.comment()));
        line
    });

    write_section(writer, kind.section(), lines)
}

/******************************/
/*         UNIT TESTS         */
/******************************/

use crate::io::error::Error;
use crate::model::{
    atom::Atom,
    geometry::Geometry,
    types::{Element, Point},
};
use std::io::{BufRead, Write};
use std::path::Path;
use std::str::FromStr;

const FORMAT: &str = "XYZ";

/// Reads one XYZ block: an atom-count line, a comment line, then one atom per line.
///
/// Columns after the three coordinates are ignored, as are any lines after the declared
/// atoms. Mathematica-style exponents (`1.5*^-6`) are accepted.
///
/// # Arguments
///
/// * `reader` - Buffered source of the XYZ text.
/// * `path` - Origin of the text, used for the geometry name and in diagnostics.
pub fn read<R: BufRead>(reader: R, path: Option<&Path>) -> Result<Geometry, Error> {
    let owned_path = path.map(Path::to_path_buf);
    let mut lines = reader.lines().enumerate();

    let mut next_line = || -> Result<Option<(usize, String)>, Error> {
        match lines.next() {
            Some((idx, line)) => line
                .map(|text| Some((idx + 1, text)))
                .map_err(|e| Error::from_io(e, owned_path.clone())),
            None => Ok(None),
        }
    };

    let Some((line_num, header)) = next_line()? else {
        return Err(Error::parse(FORMAT, owned_path.clone(), 1, "missing atom count"));
    };
    let count = header.trim().parse::<usize>().map_err(|_| {
        Error::parse(
            FORMAT,
            owned_path.clone(),
            line_num,
            format!("invalid atom count '{}'", header.trim()),
        )
    })?;

    let comment = match next_line()? {
        Some((_, text)) => text.trim().to_string(),
        None if count == 0 => String::new(),
        None => {
            return Err(Error::parse(FORMAT, owned_path.clone(), 2, "missing comment line"));
        }
    };

    let mut atoms = Vec::with_capacity(count);
    while atoms.len() < count {
        let Some((line_num, line)) = next_line()? else {
            return Err(Error::inconsistent_data(
                FORMAT,
                owned_path.clone(),
                format!("{} atoms declared, {} found", count, atoms.len()),
            ));
        };
        atoms.push(parse_atom_line(&line, line_num, path)?);
    }

    let name = path
        .and_then(|p| p.file_stem())
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| comment.clone());

    Ok(Geometry::new(name, atoms).with_comment(comment))
}

fn parse_atom_line(line: &str, line_num: usize, path: Option<&Path>) -> Result<Atom, Error> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 4 {
        return Err(Error::parse(
            FORMAT,
            path.map(Path::to_path_buf),
            line_num,
            "atom line needs an element and three coordinates",
        ));
    }

    let element = Element::from_str(fields[0])
        .map_err(|e| Error::parse(FORMAT, path.map(Path::to_path_buf), line_num, e))?;

    let mut coords = [0.0; 3];
    for (slot, field) in coords.iter_mut().zip(&fields[1..4]) {
        *slot = parse_coordinate(field).ok_or_else(|| {
            Error::parse(
                FORMAT,
                path.map(Path::to_path_buf),
                line_num,
                format!("invalid coordinate '{}'", field),
            )
        })?;
    }

    Ok(Atom::new(element, Point::new(coords[0], coords[1], coords[2])))
}

fn parse_coordinate(field: &str) -> Option<f64> {
    let value = if field.contains("*^") {
        field.replace("*^", "e").parse::<f64>().ok()?
    } else {
        field.parse::<f64>().ok()?
    };
    value.is_finite().then_some(value)
}

/// Writes atoms as one XYZ block.
pub fn write<W: Write>(mut writer: W, atoms: &[Atom], comment: &str) -> Result<(), Error> {
    writer
        .write_all(to_string(atoms, comment).as_bytes())
        .map_err(|e| Error::from_io(e, None))
}

/// Renders atoms as an XYZ block in memory.
pub fn to_string(atoms: &[Atom], comment: &str) -> String {
    let mut block = format!("{}\n{}\n", atoms.len(), comment.replace('\n', " "));
    for atom in atoms {
        block.push_str(&format!(
            "{:<2} {:>12.6} {:>12.6} {:>12.6}\n",
            atom.element.symbol(),
            atom.pos.x,
            atom.pos.y,
            atom.pos.z
        ));
    }
    block
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const WATER: &str = "3\nwater molecule\nO 0.000 0.000 0.117\nH 0.000 0.757 -0.467\nH 0.000 -0.757 -0.467\n";

    #[test]
    fn read_parses_header_comment_and_atoms() {
        let geometry = read(Cursor::new(WATER), None).unwrap();

        assert_eq!(geometry.len(), 3);
        assert_eq!(geometry.comment, "water molecule");
        assert_eq!(geometry.name, "water molecule");
        assert_eq!(geometry.atoms.atom(0).element, Element::O);
        assert!((geometry.atoms.atom(1).pos.y - 0.757).abs() < 1e-12);
    }

    #[test]
    fn read_names_geometry_after_file_stem() {
        let geometry = read(Cursor::new(WATER), Some(Path::new("data/dsgdb9nsd_000003.xyz")))
            .unwrap();
        assert_eq!(geometry.name, "dsgdb9nsd_000003");
    }

    #[test]
    fn read_accepts_extra_columns_and_mathematica_exponents() {
        let text = "2\n\nC 0.0 0.0 1.5*^-6 -0.53\nO\t1.2\t0.0\t0.0\t0.31\nInChI=1S/CO\n";
        let geometry = read(Cursor::new(text), None).unwrap();

        assert_eq!(geometry.len(), 2);
        assert!((geometry.atoms.atom(0).pos.z - 1.5e-6).abs() < 1e-15);
        assert_eq!(geometry.atoms.atom(1).element, Element::O);
    }

    #[test]
    fn read_accepts_atomic_numbers_and_lowercase_symbols() {
        let text = "2\n\n6 0 0 0\ncl 1.7 0 0\n";
        let geometry = read(Cursor::new(text), None).unwrap();
        assert_eq!(geometry.atoms.atom(0).element, Element::C);
        assert_eq!(geometry.atoms.atom(1).element, Element::Cl);
    }

    #[test]
    fn read_rejects_bad_count() {
        let err = read(Cursor::new("three\n\n"), None).unwrap_err();
        assert!(matches!(err, Error::Parse { line_number: 1, .. }));
    }

    #[test]
    fn read_rejects_bad_coordinate_with_line_number() {
        let text = "2\n\nC 0 0 0\nO 1.2 zero 0\n";
        let err = read(Cursor::new(text), None).unwrap_err();
        assert!(matches!(err, Error::Parse { line_number: 4, .. }));
    }

    #[test]
    fn read_rejects_unknown_element() {
        let text = "1\n\nQq 0 0 0\n";
        assert!(matches!(
            read(Cursor::new(text), None),
            Err(Error::Parse { line_number: 3, .. })
        ));
    }

    #[test]
    fn read_reports_truncated_body() {
        let err = read(Cursor::new("3\n\nC 0 0 0\n"), None).unwrap_err();
        assert!(matches!(err, Error::InconsistentData { .. }));
    }

    #[test]
    fn read_accepts_empty_geometry() {
        let geometry = read(Cursor::new("0\n"), None).unwrap();
        assert!(geometry.is_empty());
    }

    #[test]
    fn written_block_reads_back() {
        let geometry = read(Cursor::new(WATER), None).unwrap();
        let text = to_string(geometry.atoms.atoms(), "copy");

        let again = read(Cursor::new(text), None).unwrap();
        assert_eq!(again.comment, "copy");
        assert_eq!(again.atoms, geometry.atoms);
    }

    #[test]
    fn write_emits_the_rendered_block_with_a_single_line_comment() {
        let atoms = [Atom::new(Element::C, Point::new(1.0, -2.5, 0.0))];
        let mut buffer = Vec::new();
        write(&mut buffer, &atoms, "two\nlines").unwrap();

        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(text, to_string(&atoms, "two\nlines"));
        assert_eq!(
            text,
            "1\ntwo lines\nC      1.000000    -2.500000     0.000000\n"
        );
    }
}

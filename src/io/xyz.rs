use crate::io::{Format, error::Error};
use crate::model::{atom::Atom, system::System, types::Element, units::LengthUnit};
use std::io::BufRead;

/// A single XYZ frame.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Second line of the frame, unmodified.
    pub comment: String,
    /// Atoms and optional cell, converted to Bohr.
    pub system: System,
}

/// Reads every frame of an XYZ stream.
///
/// The first column holds an element symbol (any case) or an atomic number.
/// Coordinates and an extended-XYZ `Lattice` are scaled from `unit` to Bohr.
pub fn read_frames<R: BufRead>(reader: R, unit: LengthUnit) -> Result<Vec<Frame>, Error> {
    let mut lines = reader
        .lines()
        .enumerate()
        .map(|(i, line)| line.map(|content| (i + 1, content)));
    let mut frames = Vec::new();

    while let Some(header) = lines.next() {
        let (ln, header) = header?;
        if header.trim().is_empty() {
            continue;
        }
        let count = header
            .split_whitespace()
            .next()
            .and_then(|token| token.parse::<usize>().ok())
            .ok_or_else(|| Error::parse(Format::Xyz, ln, "expected atom count"))?;

        let (comment_ln, comment) = lines
            .next()
            .transpose()?
            .ok_or_else(|| Error::parse(Format::Xyz, ln, "missing comment line"))?;

        let mut atoms = Vec::with_capacity(count);
        let mut last_ln = comment_ln;
        for _ in 0..count {
            let (atom_ln, raw) = lines.next().transpose()?.ok_or_else(|| {
                Error::parse(
                    Format::Xyz,
                    last_ln,
                    format!("frame ended after {} of {} atoms", atoms.len(), count),
                )
            })?;
            atoms.push(parse_atom(&raw, atom_ln, unit)?);
            last_ln = atom_ln;
        }

        let box_vectors = parse_lattice(&comment, comment_ln, unit)?;
        frames.push(Frame {
            comment,
            system: System { atoms, box_vectors },
        });
    }

    if frames.is_empty() {
        return Err(Error::Empty(Format::Xyz));
    }
    log::debug!("read {} XYZ frame(s)", frames.len());
    Ok(frames)
}

/// Reads the first frame of an XYZ stream.
pub fn read<R: BufRead>(reader: R, unit: LengthUnit) -> Result<System, Error> {
    read_frames(reader, unit)?
        .into_iter()
        .next()
        .map(|frame| frame.system)
        .ok_or(Error::Empty(Format::Xyz))
}

fn parse_atom(line: &str, line_no: usize, unit: LengthUnit) -> Result<Atom, Error> {
    let tokens: Vec<_> = line.split_whitespace().collect();
    if tokens.len() < 4 {
        return Err(Error::parse(
            Format::Xyz,
            line_no,
            "atom line must contain an element and three coordinates",
        ));
    }

    let element = parse_element(tokens[0])
        .ok_or_else(|| Error::parse(Format::Xyz, line_no, format!("unknown element '{}'", tokens[0])))?;

    let mut position = [0.0; 3];
    for (axis, (slot, token)) in position.iter_mut().zip(&tokens[1..4]).enumerate() {
        let value = token.parse::<f64>().map_err(|_| {
            Error::parse(
                Format::Xyz,
                line_no,
                format!("invalid {} coordinate '{}'", ["x", "y", "z"][axis], token),
            )
        })?;
        *slot = value * unit.to_bohr();
    }

    Ok(Atom::new(element, position))
}

fn parse_element(token: &str) -> Option<Element> {
    match token.parse::<u8>() {
        Ok(number) => Element::from_atomic_number(number),
        Err(_) => Element::from_symbol_ignore_case(token).ok(),
    }
}

fn parse_lattice(
    comment: &str,
    line_no: usize,
    unit: LengthUnit,
) -> Result<Option<[[f64; 3]; 3]>, Error> {
    let Some(start) = comment.find("Lattice=\"") else {
        return Ok(None);
    };
    let rest = &comment[start + "Lattice=\"".len()..];
    let end = rest
        .find('"')
        .ok_or_else(|| Error::parse(Format::Xyz, line_no, "unterminated Lattice entry"))?;

    let values = rest[..end]
        .split_whitespace()
        .map(|token| token.parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| Error::parse(Format::Xyz, line_no, "invalid number in Lattice entry"))?;
    if values.len() != 9 {
        return Err(Error::parse(
            Format::Xyz,
            line_no,
            format!("Lattice entry needs 9 values, found {}", values.len()),
        ));
    }

    let scale = unit.to_bohr();
    Ok(Some([0, 1, 2].map(|row| {
        [0, 1, 2].map(|col| values[3 * row + col] * scale)
    })))
}

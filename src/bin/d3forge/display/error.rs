use std::io::{self, Write};

use anyhow::Error;

use crate::util::text::wrap;

#[rustfmt::skip]
pub fn print_error(err: &Error) {
    let mut stderr = io::stderr().lock();

    let _ = writeln!(stderr);
    let _ = writeln!(stderr, "   ╔══════════════════════════════════════════════════════════════╗");
    let _ = writeln!(stderr, "   ║  ✗ Error                                                     ║");
    let _ = writeln!(stderr, "   ╟──────────────────────────────────────────────────────────────╢");

    let msg = err.to_string();
    for line in msg.lines().flat_map(|l| wrap(l, 59)) {
        let _ = writeln!(stderr, "   ║  {:<59} ║", line);
    }

    let mut source = err.source();
    while let Some(cause) = source {
        let _ = writeln!(stderr, "   ╟──────────────────────────────────────────────────────────────╢");
        let _ = writeln!(stderr, "   ║  Caused by:                                                  ║");
        for line in wrap(&cause.to_string(), 57) {
            let _ = writeln!(stderr, "   ║    {:<57} ║", line);
        }
        source = cause.source();
    }

    if let Some(hints) = HintCollector::collect(err) {
        let _ = writeln!(stderr, "   ╟──────────────────────────────────────────────────────────────╢");
        let _ = writeln!(stderr, "   ║  Hints:                                                      ║");
        for hint in hints {
            let wrapped = wrap(&hint, 55);
            if let Some((first, rest)) = wrapped.split_first() {
                let _ = writeln!(stderr, "   ║    • {:<55} ║", first);
                for line in rest {
                    let _ = writeln!(stderr, "   ║      {:<55} ║", line);
                }
            }
        }
    }

    let _ = writeln!(stderr, "   ╚══════════════════════════════════════════════════════════════╝");
    let _ = writeln!(stderr);
}

struct HintCollector {
    hints: Vec<String>,
    has_typed_hints: bool,
}

impl HintCollector {
    fn new() -> Self {
        Self {
            hints: Vec::new(),
            has_typed_hints: false,
        }
    }

    fn collect(err: &Error) -> Option<Vec<String>> {
        let mut collector = Self::new();

        collector.collect_io_hints(err);
        collector.collect_dispersion_hints(err);

        if !collector.has_typed_hints {
            collector.collect_fallback_hints(err);
        }

        if collector.hints.is_empty() {
            None
        } else {
            Some(collector.hints)
        }
    }

    fn add(&mut self, hint: impl Into<String>) {
        self.hints.push(hint.into());
    }

    fn mark_typed(&mut self) {
        self.has_typed_hints = true;
    }

    fn collect_io_hints(&mut self, err: &Error) {
        use d3_forge::io::Error as IoError;

        let Some(io_err) = err.downcast_ref::<IoError>() else {
            return;
        };

        self.mark_typed();

        match io_err {
            IoError::Io { source } => {
                self.collect_std_io_hints(source);
            }

            IoError::Parse { format, line, .. } => {
                self.add(format!(
                    "Parser encountered an issue near line {} in {} format",
                    line, format
                ));
                self.add("Each frame needs an atom count, a comment line and one line per atom");
                self.add("Atom lines start with an element symbol or atomic number followed by x y z");
            }

            IoError::Empty(format) => {
                self.add(format!("No {} frames were found in the input", format));
                self.add("Verify the input file is not empty or truncated");
            }
        }
    }

    fn collect_std_io_hints(&mut self, source: &std::io::Error) {
        use std::io::ErrorKind;

        match source.kind() {
            ErrorKind::NotFound => {
                self.add("File or directory not found");
                self.add("Check the path spelling and ensure the file exists");
            }

            ErrorKind::PermissionDenied => {
                self.add("Permission denied accessing the file");
                self.add("Check file permissions with `ls -la`");
            }

            ErrorKind::InvalidData => {
                self.add("File contains invalid or corrupt data");
                self.add("XYZ input must be UTF-8 text");
            }

            ErrorKind::BrokenPipe => {
                self.add("Broken pipe: the output consumer terminated");
                self.add("This may occur when piping to commands like `head`");
            }

            _ => {
                self.add("I/O operation failed");
                self.add("Check file path, permissions, and disk space");
            }
        }
    }

    fn collect_dispersion_hints(&mut self, err: &Error) {
        use d3_forge::DispersionError;

        let Some(disp_err) = err.downcast_ref::<DispersionError>() else {
            return;
        };

        self.mark_typed();

        match disp_err {
            DispersionError::UnsupportedElement { number, .. }
            | DispersionError::UnknownElement(number) => {
                self.add(format!(
                    "The reference data has no entry for atomic number {}",
                    number
                ));
                self.add("Use a reference file that covers every element of the input");
            }

            DispersionError::ReferenceUnavailable => {
                self.add("Pass --reference <FILE> or set D3FORGE_REFERENCE");
            }

            DispersionError::ReferenceIo { source, .. } => {
                self.collect_std_io_hints(source);
            }

            DispersionError::ReferenceParse(_) => {
                self.add("Reference file has invalid TOML syntax or layout");
                self.add("Expected [[element]] tables with reference_cn and [[pair]] tables with c6");
            }

            DispersionError::InvalidReference(_) => {
                self.add("Reference tables are inconsistent");
                self.add("Every pair of listed elements needs one [[pair]] entry with a square c6 block");
            }

            DispersionError::EmptySystem => {
                self.add("Input frame contains no atoms");
                self.add("Verify the atom count line of each frame");
            }

            DispersionError::LengthMismatch { .. } | DispersionError::IndexOutOfRange { .. } => {
                self.add("Atom count does not match the model's composition");
                self.add("This may indicate a bug; please report if reproducible");
            }

            DispersionError::NonFinitePosition { index } => {
                self.add(format!("Atom {} has a NaN or infinite coordinate", index + 1));
            }

            DispersionError::DegenerateGeometry { i, j, .. } => {
                self.add(format!("Atoms {} and {} occupy the same position", i + 1, j + 1));
                self.add("Check for duplicated atom lines");
                self.add("Check --unit if coordinates are given in Bohr");
            }

            DispersionError::MissingParameter { scheme, name } => {
                self.add(format!("{} damping needs a value for '{}'", scheme, name));
                self.add("Select a functional with --functional NAME");
                self.add("List available functionals with `d3forge functionals`");
            }

            DispersionError::InvalidParameter { name, .. } => {
                self.add(format!("Check the value given for '{}'", name));
                self.add("Damping parameters must be finite and non-negative");
            }

            DispersionError::UnknownFunctional(name) => {
                self.add(format!("No preset is named '{}'", name));
                self.add("List available functionals with `d3forge functionals`");
                self.add("Try the other damping scheme with --damping");
            }

            DispersionError::InvalidCutoff { .. } => {
                self.add("Cutoff onsets must be positive and below their cutoffs");
                self.add("Check the [cutoff] table of the configuration file");
            }

            DispersionError::ConfigParse(_) => {
                self.add("Configuration file has invalid TOML syntax or unknown keys");
                self.add("Allowed tables: [damping], [cutoff], [model]");
            }

            DispersionError::SingularLattice => {
                self.add("The Lattice entry of the XYZ comment line is singular");
                self.add("Lattice vectors must span three dimensions");
            }
        }
    }

    fn collect_fallback_hints(&mut self, err: &Error) {
        let msg = error_chain_text(err);

        if msg.contains("terminal") || msg.contains("stdin") {
            self.add("Input appears to be from a terminal");
            self.add("Provide input via -i/--input or pipe data to stdin");
            return;
        }

        if msg.contains("no such file") || msg.contains("not found") {
            self.add("Check that the file path is correct");
            self.add("Verify the file exists and is readable");
            return;
        }

        if msg.contains("permission denied") {
            self.add("Check file permissions with `ls -la`");
        }
    }
}

fn error_chain_text(err: &Error) -> String {
    err.chain()
        .map(|cause| cause.to_string())
        .collect::<Vec<_>>()
        .join("\n")
        .to_lowercase()
}

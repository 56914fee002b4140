use std::io::{self, BufWriter, Write};

use anyhow::{Context, Result};

use d3_forge::DampingScheme;
use d3_forge::dispersion::params;

use crate::cli::FunctionalsArgs;
use crate::util::text::optional;

pub fn run_functionals(args: FunctionalsArgs) -> Result<()> {
    let schemes = match args.damping {
        Some(scheme) => vec![scheme.into()],
        None => vec![DampingScheme::Rational, DampingScheme::Zero],
    };

    let mut out = BufWriter::new(io::stdout().lock());
    for (k, scheme) in schemes.into_iter().enumerate() {
        if k > 0 {
            writeln!(out)?;
        }
        write_scheme(&mut out, scheme)?;
    }
    out.flush().context("Failed to write functional list")?;

    Ok(())
}

fn write_scheme(out: &mut impl Write, scheme: DampingScheme) -> Result<()> {
    let columns: &[&str] = match scheme {
        DampingScheme::Rational => &["s6", "s8", "a1", "a2"],
        DampingScheme::Zero => &["s6", "s8", "rs6", "rs8", "alp"],
    };

    write!(out, "# {:<10}", format!("{} damping", scheme))?;
    for column in columns {
        write!(out, " {:>8}", column)?;
    }
    writeln!(out)?;

    for name in params::available(scheme) {
        let p = params::lookup(name, scheme)?;
        let values = match scheme {
            DampingScheme::Rational => vec![p.s6, p.s8, p.a1, p.a2],
            DampingScheme::Zero => vec![p.s6, p.s8, p.rs6, p.rs8, p.alp],
        };

        write!(out, "  {:<10}", name)?;
        for value in values {
            write!(out, " {:>8}", optional(value, 4))?;
        }
        writeln!(out)?;
    }

    Ok(())
}

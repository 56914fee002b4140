use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, IsTerminal, Write};
use std::path::Path;

use anyhow::{Context, Result, bail};

use d3_forge::io::xyz::{self, Frame};
use d3_forge::{
    ConfigFile, Damping, Dispersion, DispersionConfig, DispersionResult, LengthUnit,
    ReferenceDatabase,
};

use crate::cli::{DampingOptions, EnergyArgs};
use crate::display::{
    Progress, Stage, print_damping, print_element_distribution, print_energies,
    print_structure_info,
};

/// Energy of one frame, with the full breakdown when per-atom output is requested.
struct FrameEnergy {
    energy: f64,
    detail: Option<DispersionResult>,
}

pub fn run_energy(args: EnergyArgs, interactive: bool) -> Result<()> {
    if args.io.input.is_none() && io::stdin().is_terminal() {
        bail!(
            "No input file specified and stdin is a terminal.\n\nUsage: d3forge energy -i <INPUT> or pipe XYZ data via stdin."
        );
    }

    let mut progress = Progress::new(interactive);

    progress.begin(Stage::Reference);
    let reference = load_reference(args.reference.as_deref())?;
    progress.complete(
        Stage::Reference,
        &[
            format!("Version: {}", reference.version().unwrap_or("unversioned")),
            format!(
                "{} elements, up to {} reference environments",
                reference.supported_elements().count(),
                reference.max_references()
            ),
        ],
    );

    progress.begin(Stage::Structure);
    let unit = LengthUnit::from(args.output.unit);
    let frames = read_frames(args.io.input.as_deref(), unit)?;
    let mut read_details = vec![format!("Parse {} XYZ frame(s)", frames.len())];
    if unit == LengthUnit::Angstrom {
        read_details.push("Convert coordinates from Å to Bohr".to_string());
    }
    let periodic = frames.iter().filter(|f| f.system.is_periodic()).count();
    if periodic > 0 {
        read_details.push(format!("{} periodic frame(s) with lattice sums", periodic));
    }
    progress.complete(Stage::Structure, &read_details);

    if interactive {
        print_structure_info(&frames);
        print_element_distribution(&frames[0].system);
    }

    progress.begin(Stage::Damping);
    let config = resolve_config(&args.damping)?;
    progress.complete(Stage::Damping, &build_damping_details(&args.damping, &config));

    if interactive {
        print_damping(&config);
    }

    progress.begin(Stage::Evaluation);
    let (results, models) = evaluate_frames(&reference, &frames, config, args.output.per_atom)?;
    progress.complete(
        Stage::Evaluation,
        &[format!("{} frame(s), {} model(s) built", results.len(), models)],
    );

    if interactive {
        let energies: Vec<f64> = results.iter().map(|r| r.energy).collect();
        print_energies(&frames, &energies);
    }

    progress.begin(Stage::Output);
    let output = args.io.output.as_deref();
    write_energies(output, &frames, &results, &config)?;
    let target = output
        .map(|p| p.file_name().unwrap_or_default().to_string_lossy().into_owned())
        .unwrap_or_else(|| "stdout".to_string());
    progress.complete(Stage::Output, &[format!("Write energies → {}", target)]);

    progress.finish(frames.len());

    Ok(())
}

fn load_reference(path: Option<&Path>) -> Result<ReferenceDatabase> {
    let Some(path) = path else {
        bail!(
            "No reference data specified.\n\nUse --reference <FILE> or set the D3FORGE_REFERENCE environment variable."
        );
    };
    ReferenceDatabase::from_path(path)
        .with_context(|| format!("Failed to load reference data: {}", path.display()))
}

/// Reads every XYZ frame from `path`, or from stdin when no path is given.
fn read_frames(path: Option<&Path>, unit: LengthUnit) -> Result<Vec<Frame>> {
    let frames = match path {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open input file: {}", path.display()))?;
            xyz::read_frames(BufReader::new(file), unit)
        }
        None => xyz::read_frames(io::stdin().lock(), unit),
    };
    frames.context("Failed to read structure")
}

/// Writes the energy table to `path`, or to stdout when no path is given.
fn write_energies(
    path: Option<&Path>,
    frames: &[Frame],
    results: &[FrameEnergy],
    config: &DispersionConfig,
) -> Result<()> {
    let written = match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            flush_results(BufWriter::new(file), frames, results, config)
        }
        None => flush_results(io::stdout().lock(), frames, results, config),
    };
    written.context("Failed to write energies")
}

fn flush_results(
    mut out: impl Write,
    frames: &[Frame],
    results: &[FrameEnergy],
    config: &DispersionConfig,
) -> io::Result<()> {
    write_results(&mut out, frames, results, config)?;
    out.flush()
}

/// Layers the functional preset, the configuration file and the flags.
///
/// A `--functional` flag replaces the file's functional; explicit parameters
/// from the file still apply on top of it.
fn resolve_config(options: &DampingOptions) -> Result<DispersionConfig> {
    let mut file = match &options.config {
        Some(path) => {
            let content = fs::read_to_string(path).with_context(|| {
                format!("Failed to read configuration file: {}", path.display())
            })?;
            ConfigFile::from_toml(&content)
                .with_context(|| format!("Invalid configuration file: {}", path.display()))?
        }
        None => ConfigFile::default(),
    };

    if let Some(name) = &options.functional {
        file.damping.functional = Some(name.clone());
    }

    file.resolve(options.damping.map(Into::into), &options.overrides())
        .context("Failed to resolve damping parameters")
}

fn build_damping_details(options: &DampingOptions, config: &DispersionConfig) -> Vec<String> {
    let mut steps = Vec::new();

    match &options.functional {
        Some(name) => steps.push(format!("Preset: {}", name)),
        None if options.config.is_none() => steps.push("Explicit parameters".to_string()),
        None => {}
    }
    if let Some(path) = &options.config {
        steps.push(format!(
            "Configuration: {}",
            path.file_name().unwrap_or_default().to_string_lossy()
        ));
    }

    steps.push(match config.damping {
        Damping::Rational(p) => format!(
            "Rational damping (s6 {:.4}, s8 {:.4}, a1 {:.4}, a2 {:.4})",
            p.s6, p.s8, p.a1, p.a2
        ),
        Damping::Zero(p) => format!(
            "Zero damping (s6 {:.4}, s8 {:.4}, rs6 {:.4}, rs8 {:.4}, alp {:.1})",
            p.s6, p.s8, p.rs6, p.rs8, p.alp
        ),
    });

    steps
}

/// Evaluates every frame, building one model per run of consecutive frames
/// that share composition and cell.
fn evaluate_frames(
    reference: &ReferenceDatabase,
    frames: &[Frame],
    config: DispersionConfig,
    per_atom: bool,
) -> Result<(Vec<FrameEnergy>, usize)> {
    let mut results = Vec::with_capacity(frames.len());
    let mut models = 0;
    let mut start = 0;

    while start < frames.len() {
        let first = &frames[start].system;
        let numbers = first.atomic_numbers();
        let end = start
            + 1
            + frames[start + 1..]
                .iter()
                .take_while(|frame| {
                    frame.system.box_vectors == first.box_vectors
                        && frame.system.atomic_numbers() == numbers
                })
                .count();

        let model = Dispersion::from_system(reference, first, config)
            .with_context(|| format!("Failed to set up the model for frame {}", start + 1))?;
        models += 1;

        if per_atom {
            for (offset, frame) in frames[start..end].iter().enumerate() {
                let detail = model
                    .analyze(&frame.system.positions())
                    .with_context(|| format!("Evaluation failed for frame {}", start + offset + 1))?;
                results.push(FrameEnergy {
                    energy: detail.energy,
                    detail: Some(detail),
                });
            }
        } else {
            let positions: Vec<Vec<[f64; 3]>> = frames[start..end]
                .iter()
                .map(|frame| frame.system.positions())
                .collect();
            let energies = model
                .energy_batch(&positions)
                .with_context(|| format!("Evaluation failed for frames {}-{}", start + 1, end))?;
            results.extend(
                energies
                    .into_iter()
                    .map(|energy| FrameEnergy { energy, detail: None }),
            );
        }

        start = end;
    }

    log::info!("evaluated {} frame(s) with {} model(s)", results.len(), models);
    Ok((results, models))
}

fn write_results(
    out: &mut impl Write,
    frames: &[Frame],
    results: &[FrameEnergy],
    config: &DispersionConfig,
) -> io::Result<()> {
    writeln!(
        out,
        "# d3forge {}, {} damping, energies in Hartree",
        env!("CARGO_PKG_VERSION"),
        config.damping.scheme()
    )?;
    writeln!(out, "# {:>6} {:>8} {:>24}", "frame", "atoms", "energy")?;

    for (k, (frame, result)) in frames.iter().zip(results).enumerate() {
        writeln!(
            out,
            "  {:>6} {:>8} {:>24.15e}",
            k + 1,
            frame.system.atom_count(),
            result.energy
        )?;

        let Some(detail) = &result.detail else {
            continue;
        };
        writeln!(
            out,
            "# {:>6} {:>8} {:>12} {:>24}",
            "atom", "element", "cn", "energy"
        )?;
        for (i, atom) in frame.system.atoms.iter().enumerate() {
            writeln!(
                out,
                "  {:>6} {:>8} {:>12.6} {:>24.15e}",
                i + 1,
                atom.element.symbol(),
                detail.coordination_numbers[i],
                detail.atomic_energies[i]
            )?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const REFERENCE: &str = r#"
        version = "cli-test"

        [[element]]
        number = 1
        reference_cn = [0.9118, 0.0]

        [[pair]]
        numbers = [1, 1]
        rvdw = 3.1
        c6 = [[3.09, 4.84], [4.84, 7.59]]
    "#;

    const FRAMES: &str = "\
2
first
H 0.0 0.0 0.0
H 0.0 0.0 0.74
2
second
H 0.0 0.0 0.0
H 0.0 0.0 0.80
3
third
H 0.0 0.0 0.0
H 0.0 0.0 0.74
H 0.0 3.00 0.0
";

    fn setup() -> (ReferenceDatabase, Vec<Frame>, DispersionConfig) {
        let reference = ReferenceDatabase::from_toml(REFERENCE).unwrap();
        let frames = xyz::read_frames(Cursor::new(FRAMES), LengthUnit::Angstrom).unwrap();
        let options = DampingOptions {
            functional: Some("pbe".to_string()),
            damping: None,
            config: None,
            s6: None,
            s8: None,
            a1: None,
            a2: None,
            rs6: None,
            rs8: None,
            alp: None,
        };
        (reference, frames, resolve_config(&options).unwrap())
    }

    #[test]
    fn groups_frames_by_composition() {
        let (reference, frames, config) = setup();
        let (results, models) = evaluate_frames(&reference, &frames, config, false).unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(models, 2);
        assert!(results.iter().all(|r| r.energy < 0.0 && r.detail.is_none()));

        let (detailed, _) = evaluate_frames(&reference, &frames, config, true).unwrap();
        for (plain, full) in results.iter().zip(&detailed) {
            assert_eq!(plain.energy, full.energy);
        }
        assert_eq!(detailed[2].detail.as_ref().unwrap().atomic_energies.len(), 3);
    }

    #[test]
    fn writes_one_line_per_frame() {
        let (reference, frames, config) = setup();
        let (results, _) = evaluate_frames(&reference, &frames, config, true).unwrap();

        let mut buffer = Vec::new();
        write_results(&mut buffer, &frames, &results, &config).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        let data: Vec<_> = text.lines().filter(|l| !l.starts_with('#')).collect();
        assert_eq!(data.len(), 3 + 2 + 2 + 3);
        assert!(text.starts_with("# d3forge"));
        assert!(text.contains("rational damping"));
    }

    #[test]
    fn round_trips_through_files() {
        let (reference, _, config) = setup();
        let dir = tempfile::tempdir().unwrap();

        let input = dir.path().join("frames.xyz");
        fs::write(&input, FRAMES).unwrap();
        let frames = read_frames(Some(&input), LengthUnit::Angstrom).unwrap();
        assert_eq!(frames.len(), 3);

        let (results, _) = evaluate_frames(&reference, &frames, config, false).unwrap();
        let output = dir.path().join("energies.txt");
        write_energies(Some(&output), &frames, &results, &config).unwrap();
        let text = fs::read_to_string(&output).unwrap();
        assert_eq!(text.lines().filter(|l| !l.starts_with('#')).count(), 3);

        let missing = dir.path().join("missing.xyz");
        let err = read_frames(Some(&missing), LengthUnit::Angstrom).unwrap_err();
        assert!(err.to_string().contains("Failed to open input file"));
    }

    #[test]
    fn flags_override_presets() {
        let options = DampingOptions {
            functional: Some("pbe".to_string()),
            damping: None,
            config: None,
            s6: None,
            s8: Some(0.5),
            a1: None,
            a2: None,
            rs6: None,
            rs8: None,
            alp: None,
        };
        match resolve_config(&options).unwrap().damping {
            Damping::Rational(p) => assert_eq!(p.s8, 0.5),
            other => panic!("unexpected damping: {:?}", other),
        }
    }

    #[test]
    fn missing_parameters_are_reported() {
        let options = DampingOptions {
            functional: None,
            damping: None,
            config: None,
            s6: Some(1.0),
            s8: None,
            a1: None,
            a2: None,
            rs6: None,
            rs8: None,
            alp: None,
        };
        let err = resolve_config(&options).unwrap_err();
        assert!(err.downcast_ref::<d3_forge::DispersionError>().is_some());
    }

    #[test]
    fn reads_configuration_files() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[damping]\nscheme = \"zero\"\nfunctional = \"b3lyp\"\n\n[cutoff]\ndisp_onset = 40.0\ndisp_cutoff = 45.0"
        )
        .unwrap();

        let options = DampingOptions {
            functional: None,
            damping: None,
            config: Some(file.path().to_path_buf()),
            s6: None,
            s8: None,
            a1: None,
            a2: None,
            rs6: None,
            rs8: None,
            alp: None,
        };
        let config = resolve_config(&options).unwrap();
        assert!(matches!(config.damping, Damping::Zero(_)));
        assert_eq!(config.cutoff.disp_cutoff, 45.0);
    }
}

use std::collections::HashMap;
use std::io::{self, Write};

use d3_forge::io::xyz::Frame;
use d3_forge::{BOHR_TO_ANGSTROM, Damping, DispersionConfig, Element, System};

use crate::util::text::truncate;

const INDENT: &str = "      ";

const BOX_INNER_WIDTH: usize = 62;
const SAFE_TABLE_WIDTH: usize = BOX_INNER_WIDTH - INDENT.len();

const HARTREE_TO_KCAL_MOL: f64 = 627.509474;

const MAX_ROWS: usize = 15;

pub fn print_structure_info(frames: &[Frame]) {
    let stderr = io::stderr();
    let mut out = stderr.lock();

    let sizes = frames.iter().map(|f| f.system.atom_count());
    let (min, max) = sizes.fold((usize::MAX, 0), |(lo, hi), n| (lo.min(n), hi.max(n)));
    let atoms = if min == max {
        format!("{}", max)
    } else {
        format!("{}–{}", min, max)
    };

    let mut rows = vec![
        ("Frames", format!("{}", frames.len())),
        ("Atoms per Frame", atoms),
    ];

    let periodic = frames.iter().filter(|f| f.system.is_periodic()).count();
    if periodic > 0 {
        rows.push(("Periodic Frames", format!("{}", periodic)));
    }

    if let Some(box_vectors) = frames.first().and_then(|f| f.system.box_vectors.as_ref()) {
        let a = vec_len(&box_vectors[0]) * BOHR_TO_ANGSTROM;
        let b = vec_len(&box_vectors[1]) * BOHR_TO_ANGSTROM;
        let c = vec_len(&box_vectors[2]) * BOHR_TO_ANGSTROM;
        rows.push(("Box (Å)", format!("{:.1} × {:.1} × {:.1}", a, b, c)));

        let (alpha, beta, gamma) = calc_angles(box_vectors);
        rows.push((
            "Angles (α β γ)",
            format!("{:.1}° {:.1}° {:.1}°", alpha, beta, gamma),
        ));
    }

    print_kv_table(&mut out, "Structure Summary", &rows);
}

pub fn print_element_distribution(system: &System) {
    let stderr = io::stderr();
    let mut out = stderr.lock();

    let mut element_counts: HashMap<Element, usize> = HashMap::new();
    for atom in &system.atoms {
        *element_counts.entry(atom.element).or_insert(0) += 1;
    }

    let total = system.atoms.len();
    let mut sorted: Vec<_> = element_counts
        .into_iter()
        .map(|(e, c)| (e.symbol().to_string(), c))
        .collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    print_distribution_table(&mut out, "Element Distribution", &sorted, total);
}

pub fn print_damping(config: &DispersionConfig) {
    let stderr = io::stderr();
    let mut out = stderr.lock();

    let mut rows = vec![("Scheme", config.damping.scheme().to_string())];
    match config.damping {
        Damping::Rational(p) => {
            rows.push(("s6", format!("{:.4}", p.s6)));
            rows.push(("s8", format!("{:.4}", p.s8)));
            rows.push(("a1", format!("{:.4}", p.a1)));
            rows.push(("a2 (Bohr)", format!("{:.4}", p.a2)));
        }
        Damping::Zero(p) => {
            rows.push(("s6", format!("{:.4}", p.s6)));
            rows.push(("s8", format!("{:.4}", p.s8)));
            rows.push(("rs6", format!("{:.4}", p.rs6)));
            rows.push(("rs8", format!("{:.4}", p.rs8)));
            rows.push(("alp", format!("{:.1}", p.alp)));
        }
    }

    let cutoff = config.cutoff;
    rows.push((
        "CN Cutoff",
        format!("{:.1} → {:.1} Bohr", cutoff.cn_onset, cutoff.cn_cutoff),
    ));
    rows.push((
        "Disp. Cutoff",
        format!("{:.1} → {:.1} Bohr", cutoff.disp_onset, cutoff.disp_cutoff),
    ));

    print_kv_table(&mut out, "Damping Parameters", &rows);
}

pub fn print_energies(frames: &[Frame], energies: &[f64]) {
    let stderr = io::stderr();
    let mut out = stderr.lock();

    let frame_w = 7usize;
    let atoms_w = 7usize;
    let sep_overhead = 9;
    let rest = SAFE_TABLE_WIDTH.saturating_sub(frame_w + atoms_w + sep_overhead);
    let eh_w = rest / 2;
    let kcal_w = rest - eh_w;

    let line = |l: &str, m: &str, r: &str| {
        format!(
            "{}{l}{}{m}{}{m}{}{m}{}{r}",
            INDENT,
            "─".repeat(frame_w + 2),
            "─".repeat(atoms_w + 2),
            "─".repeat(eh_w + 2),
            "─".repeat(kcal_w + 2),
        )
    };

    let _ = writeln!(out, "{}┌─ Dispersion Energy ─┐", INDENT);
    let _ = writeln!(out, "{}", line("┌", "┬", "┐"));
    let _ = writeln!(
        out,
        "{}│ {:<frame_w$} │ {:>atoms_w$} │ {:>eh_w$} │ {:>kcal_w$} │",
        INDENT, "Frame", "Atoms", "E (Eh)", "E (kcal/mol)",
    );
    let _ = writeln!(out, "{}", line("├", "┼", "┤"));

    for (k, (frame, energy)) in frames.iter().zip(energies).enumerate().take(MAX_ROWS) {
        let _ = writeln!(
            out,
            "{}│ {:<frame_w$} │ {:>atoms_w$} │ {:>eh_w$.8} │ {:>kcal_w$.4} │",
            INDENT,
            k + 1,
            frame.system.atom_count(),
            energy,
            energy * HARTREE_TO_KCAL_MOL,
        );
    }

    if energies.len() > MAX_ROWS {
        let _ = writeln!(
            out,
            "{}│ {:<frame_w$} │ {:>atoms_w$} │ {:>eh_w$} │ {:>kcal_w$} │",
            INDENT,
            "...",
            "...",
            format!("({} more)", energies.len() - MAX_ROWS),
            "",
        );
    }

    let _ = writeln!(out, "{}", line("└", "┴", "┘"));
}

fn print_distribution_table(
    out: &mut impl Write,
    title: &str,
    data: &[(String, usize)],
    total: usize,
) {
    let name_w = 10usize;
    let count_w = 8usize;
    let sep_overhead = 6;
    let dist_w = SAFE_TABLE_WIDTH.saturating_sub(name_w + count_w + sep_overhead);
    let max_bar_width = dist_w.saturating_sub(8).min(20);

    let rule = |l: &str, m: &str, r: &str| {
        format!(
            "{}{l}{}{m}{}{m}{}{r}",
            INDENT,
            "─".repeat(name_w + 2),
            "─".repeat(count_w + 2),
            "─".repeat(dist_w + 2),
        )
    };

    let _ = writeln!(
        out,
        "{}┌─ {} ─┐",
        INDENT,
        truncate(title, SAFE_TABLE_WIDTH - 6)
    );
    let _ = writeln!(out, "{}", rule("┌", "┬", "┐"));
    let _ = writeln!(
        out,
        "{}│ {:<name_w$} │ {:>count_w$} │ {:<dist_w$} │",
        INDENT, "Element", "Count", "Distribution",
    );
    let _ = writeln!(out, "{}", rule("├", "┼", "┤"));

    for (name, count) in data.iter().take(MAX_ROWS) {
        let pct = (*count as f64 / total as f64) * 100.0;
        let bar = make_bar(pct, max_bar_width);
        let dist_cell = format!("{}  {:>5.1}%", bar, pct);
        let _ = writeln!(
            out,
            "{}│ {:<name_w$} │ {:>count_w$} │ {:<dist_w$} │",
            INDENT,
            truncate(name, name_w),
            count,
            dist_cell,
        );
    }

    if data.len() > MAX_ROWS {
        let _ = writeln!(
            out,
            "{}│ {:<name_w$} │ {:>count_w$} │ {:<dist_w$} │",
            INDENT,
            "...",
            "...",
            format!("({} more elements)", data.len() - MAX_ROWS),
        );
    }

    let _ = writeln!(out, "{}", rule("└", "┴", "┘"));
}

fn print_kv_table(out: &mut impl Write, title: &str, rows: &[(&str, String)]) {
    let key_w = 16usize;
    let sep_overhead = 6;
    let val_w = SAFE_TABLE_WIDTH.saturating_sub(key_w + sep_overhead);

    let rule = |l: &str, m: &str, r: &str| {
        format!(
            "{}{l}{}{m}{}{r}",
            INDENT,
            "─".repeat(key_w + 2),
            "─".repeat(val_w + 2),
        )
    };

    let _ = writeln!(
        out,
        "{}┌─ {} ─┐",
        INDENT,
        truncate(title, SAFE_TABLE_WIDTH - 6)
    );
    let _ = writeln!(out, "{}", rule("┌", "┬", "┐"));
    let _ = writeln!(
        out,
        "{}│ {:<key_w$} │ {:>val_w$} │",
        INDENT, "Metric", "Value",
    );
    let _ = writeln!(out, "{}", rule("├", "┼", "┤"));

    for (key, val) in rows {
        let _ = writeln!(
            out,
            "{}│ {:<key_w$} │ {:>val_w$} │",
            INDENT,
            truncate(key, key_w),
            truncate(val, val_w),
        );
    }

    let _ = writeln!(out, "{}", rule("└", "┴", "┘"));
}

fn make_bar(pct: f64, max_width: usize) -> String {
    let filled = ((pct / 100.0) * max_width as f64).round() as usize;
    let empty = max_width.saturating_sub(filled);
    format!("{}{}", "█".repeat(filled), "░".repeat(empty))
}

fn vec_len(v: &[f64; 3]) -> f64 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}

fn calc_angles(box_vectors: &[[f64; 3]; 3]) -> (f64, f64, f64) {
    let [a, b, c] = box_vectors;
    let angle = |u: &[f64; 3], v: &[f64; 3]| {
        ((u[0] * v[0] + u[1] * v[1] + u[2] * v[2]) / (vec_len(u) * vec_len(v)))
            .acos()
            .to_degrees()
    };

    (angle(b, c), angle(a, c), angle(a, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orthorhombic_cell_has_right_angles() {
        let cell = [[10.0, 0.0, 0.0], [0.0, 12.0, 0.0], [0.0, 0.0, 14.0]];
        let (alpha, beta, gamma) = calc_angles(&cell);
        for angle in [alpha, beta, gamma] {
            assert!((angle - 90.0).abs() < 1e-12);
        }
    }

    #[test]
    fn bar_is_filled_in_proportion() {
        assert_eq!(make_bar(50.0, 10), "█████░░░░░");
        assert_eq!(make_bar(100.0, 4), "████");
    }
}

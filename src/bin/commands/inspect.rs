use std::io::{self as stdio, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use prettytable::{Table, format, row};

use struct_forge::ops::{
    BondingModel, CandidateSet, EnumerationCache, find_candidates, resolve_candidate,
};
use struct_forge::{AtomSet, PartialMolecule};

use crate::commands::{EngineArgs, print_boxed_label, read_geometry, run_with_spinner};

/// Enumerates and resolves the candidate structures of a single geometry.
#[derive(Debug, Args)]
pub struct InspectArgs {
    /// XYZ file to inspect.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
    /// Maximum number of candidates to print.
    #[arg(long, value_name = "INT", default_value_t = 20)]
    pub limit: usize,
    #[command(flatten)]
    pub engine: EngineArgs,
}

pub fn run(args: &InspectArgs) -> Result<()> {
    let geometry = read_geometry(&args.file)?;
    let atoms = args.engine.element_policy().apply(&geometry.atoms);
    let config = args.engine.enumeration();

    let candidates = run_with_spinner("Enumerating candidates", || {
        let mut cache = EnumerationCache::new();
        find_candidates(&atoms, &config, &mut cache).context("Candidate enumeration failed")
    })?;

    let mut stdout = stdio::stdout().lock();
    print_overview(&mut stdout, &geometry.name, &atoms, &candidates, args)?;

    let resolver = args.engine.resolver();
    for (index, molecule) in candidates.iter().take(args.limit).enumerate() {
        writeln!(stdout)?;
        print_boxed_label(&mut stdout, &format!("Candidate #{}", index + 1))?;
        match resolve_candidate(molecule, candidates.universe(), &resolver) {
            Ok(model) => print_candidate(&mut stdout, molecule, candidates.universe(), &model)?,
            Err(e) => writeln!(stdout, "unresolved: {}", e)?,
        }
    }

    if candidates.len() > args.limit {
        writeln!(
            stdout,
            "\n... {} more candidates not shown (raise --limit)",
            candidates.len() - args.limit
        )?;
    }
    Ok(())
}

fn print_overview<W: Write>(
    writer: &mut W,
    name: &str,
    atoms: &AtomSet,
    candidates: &CandidateSet,
    args: &InspectArgs,
) -> Result<()> {
    print_boxed_label(writer, "StructForge Inspection")?;
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BOX_CHARS);
    table.set_titles(row!["Metric", "Value"]);
    table.add_row(row!["Geometry", name]);
    table.add_row(row!["Atoms (after element policy)", atoms.len()]);
    table.add_row(row!["Search Universe", candidates.universe().len()]);
    table.add_row(row!["Filters", args.engine.filters.filters()]);
    table.add_row(row!["Sign Ambiguity", !args.engine.no_sign_ambiguity]);
    table.add_row(row!["Candidates", candidates.len()]);
    table
        .print(writer)
        .context("Failed to render inspection overview")?;
    Ok(())
}

fn print_candidate<W: Write>(
    writer: &mut W,
    molecule: &PartialMolecule,
    universe: &AtomSet,
    model: &BondingModel,
) -> Result<()> {
    let members = molecule.members();

    let mut atoms = Table::new();
    atoms.set_format(*format::consts::FORMAT_BOX_CHARS);
    atoms.set_titles(row!["#", "Element", "X", "Y", "Z", "Valence", "Charge", "Radicals"]);
    for (local, &id) in members.iter().enumerate() {
        let atom = universe.atom(id);
        atoms.add_row(row![
            id,
            atom.element,
            format!("{:.4}", atom.pos.x),
            format!("{:.4}", atom.pos.y),
            format!("{:.4}", atom.pos.z),
            model.valences[local],
            format!("{:+}", model.charges[local]),
            model.radicals[local]
        ]);
    }
    atoms
        .print(writer)
        .context("Failed to render candidate atoms")?;

    let mut bonds = Table::new();
    bonds.set_format(*format::consts::FORMAT_BOX_CHARS);
    bonds.set_titles(row!["Atom", "Atom", "Order"]);
    for (i, j, order) in model.bond_orders.bonds() {
        bonds.add_row(row![members[i], members[j], order]);
    }
    bonds
        .print(writer)
        .context("Failed to render candidate bonds")?;

    writeln!(
        writer,
        "net charge {:+}, total |charge| {}, radicals {}",
        model.net_charge(),
        model.total_abs_charge(),
        model.total_radicals()
    )?;
    Ok(())
}

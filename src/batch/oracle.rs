//! Canonical-identifier oracles.
//!
//! An [`Oracle`] maps a set of atoms to the authoritative identifier of the molecule they
//! form. The batch pipeline treats it as a slow, blocking black box and calls it from worker
//! threads, hence the `Sync` bound.

use super::error::Error;
use crate::io;
use crate::model::atom::Atom;
use crate::model::types::{Element, Point};
use std::ffi::OsString;
use std::io::Write;
use log::debug;
use std::process::{Child, Command, Stdio};

pub trait Oracle: Sync {
    /// Checks once, before any work starts, that the oracle can answer at all.
    fn probe(&self) -> Result<(), Error> {
        Ok(())
    }

    /// Returns the canonical identifier of the molecule formed by `atoms`.
    fn canonical_identifier(&self, atoms: &[Atom]) -> Result<String, Error>;
}

impl<O: Oracle + ?Sized> Oracle for &O {
    fn probe(&self) -> Result<(), Error> {
        (**self).probe()
    }

    fn canonical_identifier(&self, atoms: &[Atom]) -> Result<String, Error> {
        (**self).canonical_identifier(atoms)
    }
}

/// Adapts a closure into an [`Oracle`] that is always available.
pub struct FnOracle<F> {
    func: F,
}

impl<F> FnOracle<F>
where
    F: Fn(&[Atom]) -> Result<String, Error> + Sync,
{
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F> Oracle for FnOracle<F>
where
    F: Fn(&[Atom]) -> Result<String, Error> + Sync,
{
    fn canonical_identifier(&self, atoms: &[Atom]) -> Result<String, Error> {
        (self.func)(atoms)
    }
}

/// Oracle backed by an external program.
///
/// The program receives one XYZ block on stdin and must print the identifier as the first
/// non-empty line of stdout, exiting with status zero.
#[derive(Debug, Clone)]
pub struct CommandOracle {
    program: OsString,
    args: Vec<OsString>,
}

impl CommandOracle {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    fn describe(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }
}

impl Oracle for CommandOracle {
    fn probe(&self) -> Result<(), Error> {
        let probe = [Atom::new(Element::C, Point::origin())];
        self.canonical_identifier(&probe)
            .map(|_| ())
            .map_err(|e| Error::oracle_unavailable(e.to_string()))
    }

    fn canonical_identifier(&self, atoms: &[Atom]) -> Result<String, Error> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Error::oracle(format!("failed to start '{}': {}", self.describe(), e)))?;

        let input = io::xyz_to_string(atoms, "");
        if let Some(mut stdin) = child.stdin.take() {
            if let Err(e) = stdin.write_all(input.as_bytes()) {
                drop(stdin);
                reap(&mut child);
                return Err(Error::oracle(format!("failed to send geometry: {}", e)));
            }
        }

        let output = child
            .wait_with_output()
            .map_err(|e| Error::oracle(format!("failed to read oracle output: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::oracle(format!(
                "'{}' exited with {}: {}",
                self.describe(),
                output.status,
                stderr.trim()
            )));
        }

        String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(str::to_string)
            .ok_or_else(|| Error::oracle(format!("'{}' printed no identifier", self.describe())))
    }
}

/// Kills and waits for an oracle process abandoned mid-call.
fn reap(child: &mut Child) {
    if let Err(e) = child.kill() {
        debug!("oracle process {} already gone: {}", child.id(), e);
    }
    if let Err(e) = child.wait() {
        debug!("failed to reap oracle process {}: {}", child.id(), e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fn_oracle_forwards_to_closure() {
        let oracle = FnOracle::new(|atoms: &[Atom]| Ok(format!("{} atoms", atoms.len())));
        assert!(oracle.probe().is_ok());
        assert_eq!(
            oracle
                .canonical_identifier(&[Atom::new(Element::O, Point::origin())])
                .unwrap(),
            "1 atoms"
        );
    }

    #[test]
    fn missing_program_is_reported_unavailable() {
        let oracle = CommandOracle::new("struct-forge-no-such-oracle-program");
        assert!(matches!(
            oracle.probe(),
            Err(Error::OracleUnavailable { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn command_oracle_reads_first_output_line() {
        // `head -n 1` echoes the atom-count line of the XYZ block.
        let oracle = CommandOracle::new("head").args(["-n", "1"]);
        let atoms = [
            Atom::new(Element::C, Point::origin()),
            Atom::new(Element::O, Point::new(1.2, 0.0, 0.0)),
        ];
        assert_eq!(oracle.canonical_identifier(&atoms).unwrap(), "2");
    }

    #[cfg(unix)]
    #[test]
    fn command_oracle_rejects_failing_program() {
        let oracle = CommandOracle::new("false");
        assert!(matches!(
            oracle.canonical_identifier(&[]),
            Err(Error::Oracle { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn command_oracle_fails_cleanly_when_program_ignores_stdin() {
        // Larger than a pipe buffer, so the write outlives `true`.
        let atoms = vec![Atom::new(Element::C, Point::new(1.0, 2.0, 3.0)); 20_000];
        let oracle = CommandOracle::new("true");
        assert!(matches!(
            oracle.canonical_identifier(&atoms),
            Err(Error::Oracle { .. })
        ));
    }
}

//! GCC-compatible process adapter.

use std::ffi::OsString;
use std::path::Path;
use std::process::Command;
use tracing::debug;

use crate::toolchain::{CompileJob, LinkJob, ToolFailure, Toolchain};

/// Flag forcing colored diagnostics even though stderr is captured.
pub const COLOR_FLAG: &str = "-fdiagnostics-color=always";

/// Drives `g++`, `clang++` or any compiler accepting the same options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GccToolchain {
    program: String,
}

impl GccToolchain {
    /// Creates an adapter for the compiler called `program`.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Arguments of a dependency scan.
    pub fn scan_args(include: &Path, source: &Path) -> Vec<OsString> {
        vec![
            "-I".into(),
            include.into(),
            "-MM".into(),
            source.into(),
        ]
    }

    /// Arguments of a compilation.
    pub fn compile_args(job: &CompileJob<'_>) -> Vec<OsString> {
        let mut args: Vec<OsString> = job.flags.iter().map(OsString::from).collect();
        if !job.flags.iter().any(|f| f == COLOR_FLAG) {
            args.push(COLOR_FLAG.into());
        }
        let tail: [OsString; 6] = [
            "-I".into(),
            job.include.into(),
            "-c".into(),
            job.source.into(),
            "-o".into(),
            job.object.into(),
        ];
        args.extend(tail);
        args
    }

    /// Arguments of a link.
    pub fn link_args(job: &LinkJob<'_>) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["-o".into(), job.output.into()];
        args.extend(job.objects.iter().map(OsString::from));
        args.extend(job.libraries.iter().map(|lib| OsString::from(format!("-l{lib}"))));
        args
    }

    fn run(&self, args: Vec<OsString>) -> Result<String, ToolFailure> {
        debug!(
            "execute: {} {}",
            self.program,
            args.iter()
                .map(|a| a.to_string_lossy())
                .collect::<Vec<_>>()
                .join(" ")
        );
        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .map_err(|e| ToolFailure::new(None, format!("cannot run {}: {e}", self.program)))?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            Err(ToolFailure::new(
                output.status.code(),
                String::from_utf8_lossy(&output.stderr).into_owned(),
            ))
        }
    }
}

impl Default for GccToolchain {
    fn default() -> Self {
        Self::new("g++")
    }
}

impl Toolchain for GccToolchain {
    fn scan(&self, include: &Path, source: &Path) -> Result<String, ToolFailure> {
        self.run(Self::scan_args(include, source))
    }

    fn compile(&self, job: &CompileJob<'_>) -> Result<(), ToolFailure> {
        self.run(Self::compile_args(job)).map(drop)
    }

    fn link(&self, job: &LinkJob<'_>) -> Result<(), ToolFailure> {
        self.run(Self::link_args(job)).map(drop)
    }
}

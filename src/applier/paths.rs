//! Locating SQL files that ship next to the executable.

use std::io;
use std::path::{Path, PathBuf};

/// Schema file, relative to the executable's directory.
pub const SCHEMA_FILE: &str = "schema.sql";
/// Seed data file, relative to the executable's directory.
pub const SEED_FILE: &str = "seed/seed_data.sql";
/// Optional `PG*` overrides read by the seed runner.
pub const SEED_ENV_FILE: &str = "secrets/.env";

/// Join `relative` onto `dir`. The caller's working directory plays no part.
pub fn resolve_in(dir: &Path, relative: impl AsRef<Path>) -> PathBuf {
    dir.join(relative)
}

/// Directory holding the running executable, with symlinks resolved so an
/// alias on `PATH` still finds the files installed beside the real binary.
pub fn executable_dir() -> io::Result<PathBuf> {
    let exe = std::env::current_exe()?.canonicalize()?;
    exe.parent().map(Path::to_path_buf).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::NotFound,
            format!("{} has no parent directory", exe.display()),
        )
    })
}

/// Resolve `relative` against [`executable_dir`].
pub fn resolve_beside_executable(relative: impl AsRef<Path>) -> io::Result<PathBuf> {
    Ok(resolve_in(&executable_dir()?, relative))
}

use log::info;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

pub const DEFAULT_PROJECT: &str = "xenly_project";
pub const PROJECT_SUFFIX: &str = "_project";
pub const ENTRY_FILE: &str = "main.xe";
pub const DEFAULT_SOURCE: &str = "print(\"Hello, World!\")\nprint(2*9-6/3*5)\n";

/// Directory name `--create-project NAME` uses.
pub fn project_dir_name(name: &str) -> String {
    format!("{}{}", name, PROJECT_SUFFIX)
}

/// Creates `parent/dir_name/main.xe` holding the hello-world program and
/// returns the project directory. Refuses to reuse an existing directory.
pub fn create_project(parent: &Path, dir_name: &str) -> io::Result<PathBuf> {
    let mut components = Path::new(dir_name).components();
    let single_component = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );
    if !single_component {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("'{}' is not a valid project name", dir_name),
        ));
    }

    let dir = parent.join(dir_name);
    if dir.exists() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("'{}' already exists", dir.display()),
        ));
    }

    fs::create_dir(&dir)?;
    fs::write(dir.join(ENTRY_FILE), DEFAULT_SOURCE)?;
    info!("created project at {}", dir.display());
    Ok(dir)
}

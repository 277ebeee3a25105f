use std::path::Path;
use std::process::ExitCode;

use tracing::debug;

use cm_core::error::{CmError, ConfigError};
use cm_core::fuzzy;

use super::Context;

/// Directory names directly under `root`, sorted for stable tie order.
fn project_names(root: &Path) -> Result<Vec<String>, ConfigError> {
    let entries = std::fs::read_dir(root).map_err(|source| ConfigError::Io {
        path: root.to_path_buf(),
        source,
    })?;

    let mut names: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_ok_and(|t| t.is_dir()))
        .filter_map(|entry| entry.file_name().into_string().ok())
        .collect();
    names.sort();
    Ok(names)
}

/// Projects under `root` matching `abbrev`, best first.
pub fn rank_projects(root: &Path, abbrev: &str) -> Result<Vec<String>, CmError> {
    let names = project_names(root)?;
    debug!(root = %root.display(), candidates = names.len(), "ranking projects");
    Ok(fuzzy::rank(abbrev, &names)
        .into_iter()
        .map(|ranked| ranked.candidate)
        .collect())
}

pub fn run_goto(ctx: &Context, abbrev: &str, first: bool) -> Result<ExitCode, CmError> {
    let ranked = rank_projects(&ctx.settings.projects_root, abbrev)?;
    if ranked.is_empty() {
        return Ok(ExitCode::FAILURE);
    }

    if first {
        println!("{}", ranked[0]);
    } else {
        println!("{}", ranked.join(" "));
    }
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_projects() {
        let root = tempfile::tempdir().unwrap();
        for dir in ["acme-shop", "blog", "shop"] {
            std::fs::create_dir(root.path().join(dir)).unwrap();
        }
        std::fs::write(root.path().join("shopping.txt"), "").unwrap();

        let ranked = rank_projects(root.path(), "shp").unwrap();
        assert_eq!(ranked, vec!["shop", "acme-shop"]);

        assert!(rank_projects(root.path(), "xyz").unwrap().is_empty());
    }

    #[test]
    fn test_missing_root_is_reported() {
        let root = tempfile::tempdir().unwrap();
        let missing = root.path().join("nope");
        assert!(matches!(
            rank_projects(&missing, "a"),
            Err(CmError::Config(ConfigError::Io { .. }))
        ));
    }
}

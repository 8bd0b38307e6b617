//! # Resolve Command Implementation
//!
//! Prints the absolute host path a merged path resolves to. With `--meta`,
//! also prints which root won and where that root publishes the path.

use anyhow::Result;
use clap::Args;

use super::ViewArgs;
use fs_merger::suggestions;

/// Print the absolute path of the highest-priority match
#[derive(Args, Debug)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub view: ViewArgs,

    /// Path relative to the merged view
    pub path: String,

    /// Also print the winning root position, its prefix and the published path
    #[arg(long)]
    pub meta: bool,
}

pub fn execute(args: ResolveArgs) -> Result<()> {
    let merger = args.view.open()?;

    if !args.meta {
        let resolved = merger
            .resolve(&args.path)
            .map_err(|e| suggestions::explain(e, &args.path))?;
        println!("{}", resolved.display());
        return Ok(());
    }

    let meta = merger
        .fs()
        .read_file_meta(&args.path, None)
        .map_err(|e| suggestions::explain(e, &args.path))?;
    println!("path: {}", meta.path.display());
    println!("origin: {}", meta.origin);
    println!("prefix: {}", meta.prefix.as_deref().unwrap_or(""));
    println!("published: {}", meta.published_path(&args.path));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn view(temp: &TempDir) -> ViewArgs {
        let low = temp.path().join("low");
        let high = temp.path().join("high");
        std::fs::create_dir_all(&low).unwrap();
        std::fs::create_dir_all(&high).unwrap();
        std::fs::write(low.join("a.txt"), "low").unwrap();
        ViewArgs {
            roots: vec![
                format!("{}=vendor", low.display()),
                high.display().to_string(),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_execute_resolves() {
        let temp = TempDir::new().unwrap();
        let args = ResolveArgs {
            view: view(&temp),
            path: "a.txt".to_string(),
            meta: false,
        };
        assert!(execute(args).is_ok());
    }

    #[test]
    fn test_execute_with_meta() {
        let temp = TempDir::new().unwrap();
        let args = ResolveArgs {
            view: view(&temp),
            path: "a.txt".to_string(),
            meta: true,
        };
        assert!(execute(args).is_ok());
    }

    #[test]
    fn test_execute_missing_path() {
        let temp = TempDir::new().unwrap();
        let args = ResolveArgs {
            view: view(&temp),
            path: "zzz.txt".to_string(),
            meta: false,
        };
        let err = execute(args).unwrap_err();
        assert!(err.to_string().contains("No root contains 'zzz.txt'"));
    }

    #[test]
    fn test_execute_absolute_path() {
        let temp = TempDir::new().unwrap();
        let args = ResolveArgs {
            view: view(&temp),
            path: "/etc/hosts".to_string(),
            meta: false,
        };
        let err = execute(args).unwrap_err();
        assert!(err.to_string().contains("try 'etc/hosts'"));
    }
}

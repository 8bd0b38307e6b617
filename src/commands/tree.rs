//! # Tree Command Implementation
//!
//! Displays the merged entries below a directory as a tree.

use anyhow::Result;
use clap::Args;
use ptree::{print_tree, TreeItem};
use std::collections::BTreeMap;

use super::ViewArgs;
use fs_merger::output::OutputConfig;
use fs_merger::{suggestions, Entry, WalkOptions};

/// Display merged entries as a tree
#[derive(Args, Debug)]
pub struct TreeArgs {
    #[command(flatten)]
    pub view: ViewArgs,

    /// Directory relative to the merged view (defaults to the top level)
    #[arg(default_value = "")]
    pub dir: String,

    /// Maximum depth to display.
    ///
    /// If not specified, displays the full tree. Use 1 to show only the
    /// immediate children.
    #[arg(long, value_name = "NUM")]
    pub depth: Option<usize>,
}

pub fn execute(args: TreeArgs, output: OutputConfig) -> Result<()> {
    let merger = args.view.open()?;
    let entries = merger
        .fs()
        .entries(&args.dir, &WalkOptions::default())
        .map_err(|e| suggestions::explain(e, &args.dir))?;

    let label = if args.dir.is_empty() {
        ".".to_string()
    } else {
        args.dir.clone()
    };
    let tree = build_tree(label, &entries, args.depth.unwrap_or(usize::MAX), output);
    print_tree(&tree).map_err(|e| anyhow::anyhow!("Failed to display tree: {}", e))?;

    Ok(())
}

#[derive(Default)]
struct Branch {
    is_directory: bool,
    children: BTreeMap<String, Branch>,
}

/// Fold sorted entries into nested nodes, cutting off below `max_depth`.
fn build_tree(label: String, entries: &[Entry], max_depth: usize, output: OutputConfig) -> TreeNode {
    let mut root = Branch {
        is_directory: true,
        ..Default::default()
    };

    for entry in entries {
        let components: Vec<&str> = entry.relative_path.split('/').collect();
        if components.len() > max_depth {
            continue;
        }
        let mut branch = &mut root;
        for component in &components {
            branch = branch.children.entry(component.to_string()).or_default();
        }
        branch.is_directory = entry.is_directory;
    }

    into_node(label, root, output)
}

fn into_node(label: String, branch: Branch, output: OutputConfig) -> TreeNode {
    TreeNode {
        label: output.path(&label, branch.is_directory),
        children: branch
            .children
            .into_iter()
            .map(|(name, child)| into_node(name, child, output))
            .collect(),
    }
}

/// Tree node structure for ptree visualization
#[derive(Clone, Debug)]
struct TreeNode {
    label: String,
    children: Vec<TreeNode>,
}

impl TreeItem for TreeNode {
    type Child = TreeNode;

    fn write_self<W: std::io::Write>(
        &self,
        f: &mut W,
        _style: &ptree::Style,
    ) -> std::io::Result<()> {
        write!(f, "{}", self.label)
    }

    fn children(&self) -> std::borrow::Cow<'_, [Self::Child]> {
        std::borrow::Cow::Borrowed(&self.children)
    }
}

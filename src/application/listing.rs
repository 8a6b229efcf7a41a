use colored::Colorize;

use crate::filesystem::{Descriptor, EntryKind, ErrorCode, OpenFlags, PathFlags};

const BRANCH: &str = "├── ";
const LAST_BRANCH: &str = "└── ";
const INDENT: &str = "│   ";
const LAST_INDENT: &str = "    ";

/// Renders the tree below `directory` one entry per line in enumeration
/// order: directories with a trailing `/`, files with their size.
pub fn render_listing(directory: &Descriptor, name: &str, color: bool) -> Result<String, ErrorCode> {
    let mut output = format!("{}\n", paint_directory(name, color));
    render_children(directory, "", color, &mut output)?;
    Ok(output)
}

fn render_children(
    directory: &Descriptor,
    prefix: &str,
    color: bool,
    output: &mut String,
) -> Result<(), ErrorCode> {
    let entries: Vec<_> = directory.read_directory()?.collect();
    let count = entries.len();

    for (position, entry) in entries.into_iter().enumerate() {
        let is_last = position + 1 == count;
        let branch = if is_last { LAST_BRANCH } else { BRANCH };
        match entry.kind {
            EntryKind::Directory => {
                let child = directory.open_at(
                    PathFlags::empty(),
                    &entry.name,
                    OpenFlags::DIRECTORY,
                    directory.get_flags(),
                )?;
                let label = format!("{}/", entry.name);
                output.push_str(&format!("{}{}{}\n", prefix, branch, paint_directory(&label, color)));
                let indent = if is_last { LAST_INDENT } else { INDENT };
                render_children(&child, &format!("{}{}", prefix, indent), color, output)?;
            }
            EntryKind::File => {
                let size = directory.stat_at(PathFlags::empty(), &entry.name)?.size;
                output.push_str(&format!("{}{}{} ({} bytes)\n", prefix, branch, entry.name, size));
            }
        }
    }
    Ok(())
}

fn paint_directory(label: &str, color: bool) -> String {
    if color {
        label.blue().bold().to_string()
    } else {
        label.to_string()
    }
}

use hashlink::LinkedHashMap;
use tracing::debug;

use crate::filesystem::{
    Descriptor, Directory, Entry, EntryKind, ErrorCode, File, Filesystem, NodeArena, NodeId,
    OpenFlags, PathFlags,
};

/// Nested description of a directory's contents.
pub type TreeMap = LinkedHashMap<String, TreeNode>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeNode {
    /// File content stored as UTF-8.
    Text(String),
    Bytes(Vec<u8>),
    Directory(TreeMap),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntoTreeOptions {
    /// Report files made only of printable ASCII, tab, LF and CR as text.
    pub decode_ascii: bool,
}

impl Default for IntoTreeOptions {
    fn default() -> Self {
        Self { decode_ascii: true }
    }
}

/// Builds a fresh filesystem whose root directory holds `tree`.
///
/// Names that are empty, `.`, `..` or contain `/` cannot be represented and
/// are skipped.
pub fn directory_from_tree(tree: &TreeMap) -> Filesystem {
    let mut arena = NodeArena::new();
    let root = arena.root();
    populate(&mut arena, root, tree);
    Filesystem::from_arena(arena)
}

fn populate(arena: &mut NodeArena, directory: NodeId, tree: &TreeMap) {
    for (name, node) in tree {
        let entry = match node {
            TreeNode::Text(text) => Entry::File(File::new(text.as_bytes().to_vec())),
            TreeNode::Bytes(bytes) => Entry::File(File::new(bytes.clone())),
            TreeNode::Directory(_) => Entry::Directory(Directory::default()),
        };
        match arena.link(directory, name, entry) {
            Ok(child) => {
                if let TreeNode::Directory(subtree) = node {
                    populate(arena, child, subtree);
                }
            }
            Err(error) => debug!("Skipping tree entry '{}': {}", name, error),
        }
    }
}

/// Converts the directory behind `directory` back into a nested tree.
pub fn directory_into_tree(
    directory: &Descriptor,
    options: IntoTreeOptions,
) -> Result<TreeMap, ErrorCode> {
    let mut tree = TreeMap::new();
    for entry in directory.read_directory()? {
        let node = match entry.kind {
            EntryKind::Directory => {
                let child = directory.open_at(
                    PathFlags::empty(),
                    &entry.name,
                    OpenFlags::DIRECTORY,
                    directory.get_flags(),
                )?;
                TreeNode::Directory(directory_into_tree(&child, options)?)
            }
            EntryKind::File => {
                let child = directory.open_at(
                    PathFlags::empty(),
                    &entry.name,
                    OpenFlags::empty(),
                    directory.get_flags(),
                )?;
                let (bytes, _) = child.read(child.stat()?.size, 0)?;
                file_node(bytes, options)
            }
        };
        tree.insert(entry.name, node);
    }
    Ok(tree)
}

fn is_plain_ascii(bytes: &[u8]) -> bool {
    bytes
        .iter()
        .all(|&byte| matches!(byte, 0x09 | 0x0a | 0x0d | 0x20..=0x7e))
}

fn file_node(bytes: Vec<u8>, options: IntoTreeOptions) -> TreeNode {
    if !options.decode_ascii || !is_plain_ascii(&bytes) {
        return TreeNode::Bytes(bytes);
    }
    match String::from_utf8(bytes) {
        Ok(text) => TreeNode::Text(text),
        Err(error) => TreeNode::Bytes(error.into_bytes()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    fn text(value: &str) -> TreeNode {
        TreeNode::Text(value.to_string())
    }

    fn tree<const N: usize>(entries: [(&str, TreeNode); N]) -> TreeMap {
        entries
            .into_iter()
            .map(|(name, node)| (name.to_string(), node))
            .collect()
    }

    #[test]
    fn builds_files_and_subdirectories() {
        let source = tree([
            ("a.txt", text("hi")),
            ("sub", TreeNode::Directory(tree([("b.txt", text("yo"))]))),
        ]);
        let root = directory_from_tree(&source).root();

        let a = root.stat_at(PathFlags::empty(), "a.txt").unwrap();
        assert_eq!((a.kind, a.size), (EntryKind::File, 2));
        let sub = root.stat_at(PathFlags::empty(), "sub").unwrap();
        assert_eq!(sub.kind, EntryKind::Directory);
        let b = root.stat_at(PathFlags::empty(), "sub/b.txt").unwrap();
        assert_eq!((b.kind, b.size), (EntryKind::File, 2));

        assert_eq!(directory_into_tree(&root, IntoTreeOptions::default()), Ok(source));
    }

    #[rstest]
    #[case("plain words")]
    #[case("tabs\tand\nnewlines\r\n")]
    #[case("")]
    #[case("~!@#$%^&*()_+{}|:<>?")]
    fn printable_text_round_trips(#[case] content: &str) {
        let source = tree([("f", text(content)), ("d", TreeNode::Directory(tree([("g", text(content))])))]);
        let root = directory_from_tree(&source).root();
        assert_eq!(directory_into_tree(&root, IntoTreeOptions::default()), Ok(source));
    }

    #[rstest]
    #[case(vec![0x00, 0x41])]
    #[case(vec![0x7f])]
    #[case("é".as_bytes().to_vec())]
    fn non_printable_content_stays_bytes(#[case] content: Vec<u8>) {
        let source = tree([("blob", TreeNode::Bytes(content.clone()))]);
        let root = directory_from_tree(&source).root();
        let result = directory_into_tree(&root, IntoTreeOptions::default()).unwrap();
        assert_eq!(result.get("blob"), Some(&TreeNode::Bytes(content)));
    }

    #[test]
    fn decoding_can_be_disabled() {
        let source = tree([("a.txt", text("hi"))]);
        let root = directory_from_tree(&source).root();
        let result = directory_into_tree(&root, IntoTreeOptions { decode_ascii: false }).unwrap();
        assert_eq!(result.get("a.txt"), Some(&TreeNode::Bytes(b"hi".to_vec())));
    }

    #[test]
    fn preserves_entry_order() {
        let source = tree([("z", text("")), ("a", text("")), ("m", text(""))]);
        let root = directory_from_tree(&source).root();
        let result = directory_into_tree(&root, IntoTreeOptions::default()).unwrap();
        let names: Vec<_> = result.keys().cloned().collect();
        assert_eq!(names, vec!["z", "a", "m"]);
    }

    #[test]
    fn skips_unrepresentable_names() {
        let source = tree([
            ("bad/name", text("x")),
            ("", text("y")),
            (".", text("dot")),
            ("..", TreeNode::Directory(TreeMap::new())),
            ("ok", text("z")),
        ]);
        let root = directory_from_tree(&source).root();
        let result = directory_into_tree(&root, IntoTreeOptions::default()).unwrap();
        assert_eq!(result, tree([("ok", text("z"))]));
    }

    #[test]
    fn skipped_dot_leaf_does_not_shadow_directory() {
        let root = directory_from_tree(&tree([(".", text("x")), ("a", text("y"))])).root();
        let stat = root.stat_at(PathFlags::empty(), ".").unwrap();
        assert_eq!(stat.kind, EntryKind::Directory);
        assert_eq!(
            directory_into_tree(&root, IntoTreeOptions::default()),
            Ok(tree([("a", text("y"))]))
        );
    }

    #[test]
    fn into_tree_on_file_is_not_directory() {
        let root = directory_from_tree(&tree([("a", text("x"))])).root();
        let file = root
            .open_at(PathFlags::empty(), "a", OpenFlags::empty(), Default::default())
            .unwrap();
        assert_eq!(
            directory_into_tree(&file, IntoTreeOptions::default()),
            Err(ErrorCode::NotDirectory)
        );
    }
}

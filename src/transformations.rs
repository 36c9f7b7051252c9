use crate::structs::Tree;

/// Marks the start of vertical (parent) history on a label: `NP^S`.
pub const PARENT_MARK: char = '^';
/// Prefix of the intermediate nodes introduced by binarization: `@NP->_DT`.
pub const INTERMEDIATE_MARK: char = '@';

const FUNCTION_TAG_MARKS: [char; 3] = ['-', '=', ':'];
const EMPTY_ELEMENT: &str = "-NONE-";

/// Prepares a training tree for grammar estimation: first-order vertical
/// markovization followed by lossless right-factored binarization.
pub fn annotate_tree(tree: &Tree) -> Tree {
    binarise_tree(&markovize_tree(tree))
}

/// Undoes `annotate_tree` on a parser output and strips function tags.
pub fn unannotate_tree(tree: Tree) -> Tree {
    let debinarised = debinarise_node(tree);
    demarkovize_node(strip_function_tags(debinarised))
}

// --- Markovization ---

/// Appends the original parent label to every internal node below the root.
pub fn markovize_tree(root: &Tree) -> Tree {
    markovize_recursive(root, None)
}

fn markovize_recursive(node: &Tree, parent_label: Option<&str>) -> Tree {
    if node.is_leaf() {
        return node.clone();
    }

    let label = match parent_label {
        Some(parent) => format!("{}{}{}", node.label, PARENT_MARK, parent),
        None => node.label.clone(),
    };

    // Children see this node's original label, never the annotated one.
    let children = node
        .children
        .iter()
        .map(|child| markovize_recursive(child, Some(&node.label)))
        .collect();

    Tree { label, children }
}

/// Cuts every internal label at its first `^` (a leading `^` is kept).
pub fn demarkovize_node(node: Tree) -> Tree {
    if node.is_leaf() {
        return node;
    }
    let label = match node.label.find(PARENT_MARK) {
        Some(cut) if cut > 0 => node.label[..cut].to_string(),
        _ => node.label,
    };
    Tree {
        label,
        children: node.children.into_iter().map(demarkovize_node).collect(),
    }
}

// --- Binarization ---

/// Rewrites every node with three or more children into a right-branching
/// chain. `(L c0 c1 c2 c3)` becomes `(L c0 (@L->_c0 c1 (@L->_c0_c1 c2 c3)))`.
/// Unary and binary nodes keep their shape.
pub fn binarise_tree(node: &Tree) -> Tree {
    if node.is_leaf() {
        return node.clone();
    }
    if node.children.len() <= 2 {
        return Tree {
            label: node.label.clone(),
            children: node.children.iter().map(binarise_tree).collect(),
        };
    }

    let intermediate_label = format!("{}{}->", INTERMEDIATE_MARK, node.label);
    Tree {
        label: node.label.clone(),
        children: binarise_children(&node.children, intermediate_label),
    }
}

// Returns the two children of a node whose label already records the
// siblings consumed so far.
fn binarise_children(children: &[Tree], intermediate_label: String) -> Vec<Tree> {
    let first = binarise_tree(&children[0]);
    if children.len() == 2 {
        return vec![first, binarise_tree(&children[1])];
    }
    let next_label = format!("{}_{}", intermediate_label, children[0].label);
    let rest = binarise_children(&children[1..], next_label.clone());
    vec![first, Tree::new(next_label, rest)]
}

/// Splices out binarization nodes, moving their children up into the parent.
pub fn debinarise_node(node: Tree) -> Tree {
    if node.is_leaf() {
        return node;
    }

    let mut new_children = Vec::new();
    for child in node.children {
        // Recursively debinarise children first
        let debinarised_child = debinarise_node(child);

        if is_intermediate(&debinarised_child) {
            new_children.extend(debinarised_child.children);
        } else {
            new_children.push(debinarised_child);
        }
    }

    Tree {
        label: node.label,
        children: new_children,
    }
}

fn is_intermediate(node: &Tree) -> bool {
    !node.is_leaf() && node.label.starts_with(INTERMEDIATE_MARK)
}

// --- Function tags and treebank cleanup ---

/// Cuts internal labels at the first `-`, `=` or `:` past position zero,
/// so `NP-SBJ` becomes `NP` while `-LRB-` and `:` survive.
pub fn strip_function_tags(node: Tree) -> Tree {
    if node.is_leaf() {
        return node;
    }
    let label = match node.label.find(&FUNCTION_TAG_MARKS[..]) {
        Some(cut) if cut > 0 => node.label[..cut].to_string(),
        _ => node.label,
    };
    Tree {
        label,
        children: node.children.into_iter().map(strip_function_tags).collect(),
    }
}

/// Standard cleanup for treebank input: function tags, empty elements and
/// X-over-X chains go. `None` when nothing but empty elements remained.
pub fn normalize_tree(tree: Tree) -> Option<Tree> {
    let stripped = strip_function_tags(tree);
    strip_empty_elements(stripped).map(remove_x_over_x)
}

fn strip_empty_elements(node: Tree) -> Option<Tree> {
    if node.label == EMPTY_ELEMENT && !node.is_leaf() {
        return None;
    }
    if node.is_leaf() {
        return Some(node);
    }
    let children: Vec<Tree> = node.children.into_iter().filter_map(strip_empty_elements).collect();
    if children.is_empty() {
        return None;
    }
    Some(Tree { label: node.label, children })
}

fn remove_x_over_x(node: Tree) -> Tree {
    let Tree { label, mut children } = node;
    while children.len() == 1 && !children[0].is_leaf() && children[0].label == label {
        children = children.remove(0).children;
    }
    Tree {
        label,
        children: children.into_iter().map(remove_x_over_x).collect(),
    }
}

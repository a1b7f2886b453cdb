use serde_json::Value;

use crate::error::{DecodeErrors, Mismatch, Step, TypeInfo};

/// Render one failed decode as an indented, human-readable report.
///
/// Mismatches sharing a trail prefix merge into one displayed node; child
/// lines sit two spaces deeper than their parent. Sibling order follows
/// declared field/alternative order and ascending array index. Never
/// panics; produces best-effort text for any tree shape.
pub fn create_message(errors: &DecodeErrors) -> String {
    let mut out = format!("Invalid value supplied to $: {}", errors.root.name);
    let items: Vec<(&Mismatch, usize)> = errors.mismatches.iter().map(|m| (m, 0)).collect();
    render(&mut out, &items, "$", 1);
    out
}

/// Key identifying which child node a trail step belongs to.
#[derive(PartialEq)]
enum GroupKey<'a> {
    Field(&'a str),
    Index(usize),
    Branch(usize),
}

impl<'a> GroupKey<'a> {
    fn of(step: &'a Step) -> Self {
        match step {
            Step::Field { name, .. } => GroupKey::Field(name),
            Step::Index { index, .. } => GroupKey::Index(*index),
            Step::Branch { index, .. } => GroupKey::Branch(*index),
        }
    }
}

/// `items` is the set of mismatches that reached the current node, each
/// paired with its cursor into the trail.
fn render(out: &mut String, items: &[(&Mismatch, usize)], path: &str, depth: usize) {
    // Mismatches terminating here are plain value-vs-type leaves.
    for (mismatch, cursor) in items {
        if *cursor == mismatch.trail.len() {
            line(
                out,
                depth,
                &format!(
                    "Supplied value `{}' is not {}",
                    literal(&mismatch.actual),
                    mismatch.expected
                ),
            );
        }
    }

    // Group the rest by their next step, in first-appearance order (decode
    // emits in declared order, so this is never map iteration order).
    let mut keys: Vec<GroupKey<'_>> = Vec::new();
    let mut groups: Vec<Vec<(&Mismatch, usize)>> = Vec::new();
    for &(mismatch, cursor) in items {
        if cursor >= mismatch.trail.len() {
            continue;
        }
        let key = GroupKey::of(&mismatch.trail[cursor]);
        match keys.iter().position(|k| *k == key) {
            Some(i) => groups[i].push((mismatch, cursor)),
            None => {
                keys.push(key);
                groups.push(vec![(mismatch, cursor)]);
            }
        }
    }

    for group in &groups {
        let (first, first_cursor) = group[0];
        match &first.trail[first_cursor] {
            Step::Branch { ty, .. } => render_branch(out, group, ty, path, depth),
            Step::Field { name, ty } => {
                let child = format!("{path}.{name}");
                node_header(out, depth, &child, ty);
                render(out, &advanced(group), &child, depth + 1);
            }
            Step::Index { index, ty } => {
                let child = format!("{path}[{index}]");
                node_header(out, depth, &child, ty);
                render(out, &advanced(group), &child, depth + 1);
            }
        }
    }
}

/// One failed union alternative. A branch with no nested detail (a
/// primitive alternative, or a compound that failed its base check) prints
/// the literal leaf form; a branch with nested structure prints an
/// `is not <Name>` header and discloses the structural reason below it.
fn render_branch(
    out: &mut String,
    group: &[(&Mismatch, usize)],
    ty: &TypeInfo,
    path: &str,
    depth: usize,
) {
    let mut deeper = Vec::new();
    for &(mismatch, cursor) in group {
        if cursor + 1 == mismatch.trail.len() {
            line(
                out,
                depth,
                &format!(
                    "Supplied value `{}' is not {}",
                    literal(&mismatch.actual),
                    mismatch.expected
                ),
            );
        } else {
            deeper.push((mismatch, cursor + 1));
        }
    }
    if !deeper.is_empty() {
        line(out, depth, &format!("Supplied value is not {}", ty.name));
        render(out, &deeper, path, depth + 1);
    }
}

/// Union-typed nodes carry no name suffix; their branches are itemized on
/// the lines below instead.
fn node_header(out: &mut String, depth: usize, path: &str, ty: &TypeInfo) {
    if ty.is_union {
        line(out, depth, &format!("Invalid value supplied to {path}"));
    } else {
        line(
            out,
            depth,
            &format!("Invalid value supplied to {path}: {}", ty.name),
        );
    }
}

fn advanced<'a>(group: &[(&'a Mismatch, usize)]) -> Vec<(&'a Mismatch, usize)> {
    group
        .iter()
        .map(|&(mismatch, cursor)| (mismatch, cursor + 1))
        .collect()
}

/// Compact-JSON rendering of the offending value; a missing value renders
/// as the bare token `undefined`.
fn literal(actual: &Option<Value>) -> String {
    match actual {
        None => "undefined".to_string(),
        Some(value) => value.to_string(),
    }
}

fn line(out: &mut String, depth: usize, text: &str) {
    out.push('\n');
    for _ in 0..depth {
        out.push_str("  ");
    }
    out.push_str(text);
}

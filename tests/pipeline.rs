//! End-to-end tests of the library pipeline on the dumps in `tests/data`.

use std::collections::HashSet;
use std::path::PathBuf;

use num_bigint::BigUint;
use test_log::test;

use bdd_abstract::bdd::Bdd;
use bdd_abstract::builder::build;
use bdd_abstract::enumerate::enumerate;
use bdd_abstract::error::{Error, Malformed};
use bdd_abstract::model::GraphModel;
use bdd_abstract::parser::{parse_file, read_visible_file};
use bdd_abstract::projector::VariableProjector;

fn data(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("data").join(name)
}

fn run(dump: &str, visible: &str) -> Vec<String> {
    let model = parse_file(data(dump)).unwrap();
    let visible = read_visible_file(data(visible)).unwrap();

    let bdd = Bdd::default();
    let root = build(&model, &bdd).unwrap();
    let projector = VariableProjector::new(&model.ordering, &visible);
    let abstracted = projector.abstract_root(&bdd, root);
    enumerate(&bdd, abstracted, model.ordering.len(), projector.visible_indices()).collect()
}

fn all_assignments(num_vars: usize) -> impl Iterator<Item = Vec<bool>> {
    (0..1u32 << num_vars).map(move |bits| (0..num_vars).map(|i| bits & (1 << i) != 0).collect())
}

// ─── Small scenarios ───────────────────────────────────────────────────────────

#[test]
fn scenario_projects_onto_first_variable() {
    // true iff v1 = 0 and v2 = 1
    assert_eq!(run("scenario.dot", "visible_v1.txt"), vec!["0"]);
}

#[test]
fn scenario_with_swapped_edges() {
    // true iff v1 = 1 and v2 = 0
    assert_eq!(run("scenario_swapped.dot", "visible_v1.txt"), vec!["1"]);
}

#[test]
fn constant_dump() {
    assert_eq!(run("constant.dot", "visible_none.txt"), vec![""]);
}

// ─── Reachable states ──────────────────────────────────────────────────────────

#[test]
fn reachable_projected_onto_pc_and_grant() {
    let lines = run("reachable.dot", "visible_pc_grant.txt");
    assert_eq!(lines, vec!["010", "011", "101", "111"]);
}

#[test]
fn reachable_all_visible() {
    let lines = run("reachable.dot", "visible_all.txt");
    let distinct: HashSet<&String> = lines.iter().collect();
    assert_eq!(distinct.len(), lines.len());
    assert_eq!(lines.len(), 5);
    for line in &lines {
        assert_eq!(line.len(), 4);
    }
}

#[test]
fn reachable_nothing_visible() {
    assert_eq!(run("reachable.dot", "visible_none.txt"), vec![""]);
}

#[test]
fn reachable_is_deterministic() {
    let first = run("reachable.dot", "visible_pc_grant.txt");
    let second = run("reachable.dot", "visible_pc_grant.txt");
    assert_eq!(first, second);
}

// ─── Properties ────────────────────────────────────────────────────────────────

#[test]
fn construction_fidelity() {
    for name in ["scenario.dot", "scenario_swapped.dot", "reachable.dot"] {
        let model = parse_file(data(name)).unwrap();
        let bdd = Bdd::default();
        let root = build(&model, &bdd).unwrap();
        for a in all_assignments(model.ordering.len()) {
            assert_eq!(Some(bdd.evaluate(root, &a)), model.evaluate(&a), "{} on {:?}", name, a);
        }
    }
}

/// The distinct outputs are exactly the projections of the satisfying assignments.
fn check_projection(model: &GraphModel, visible: &[&str]) {
    let visible = visible.iter().copied().collect();
    let bdd = Bdd::default();
    let root = build(model, &bdd).unwrap();
    let projector = VariableProjector::new(&model.ordering, &visible);
    let abstracted = projector.abstract_root(&bdd, root);
    let indices = projector.visible_indices();

    let lines: Vec<String> = enumerate(&bdd, abstracted, model.ordering.len(), indices).collect();
    let produced: HashSet<String> = lines.iter().cloned().collect();
    assert_eq!(produced.len(), lines.len(), "duplicates in {:?}", lines);

    let expected: HashSet<String> = all_assignments(model.ordering.len())
        .filter(|a| model.evaluate(a) == Some(true))
        .map(|a| indices.iter().map(|&i| if a[i] { '1' } else { '0' }).collect())
        .collect();
    assert_eq!(produced, expected, "visible = {:?}", indices);
}

#[test]
fn projection_correctness_for_every_subset() {
    let model = parse_file(data("reachable.dot")).unwrap();
    let names = ["pc", "tmp", "grant"];
    for mask in 0..1 << names.len() {
        let subset: Vec<&str> = names
            .iter()
            .enumerate()
            .filter(|(i, _)| mask & (1 << i) != 0)
            .map(|(_, &name)| name)
            .collect();
        check_projection(&model, &subset);
    }
}

#[test]
fn all_visible_count_matches_sat_count() {
    let model = parse_file(data("reachable.dot")).unwrap();
    let bdd = Bdd::default();
    let root = build(&model, &bdd).unwrap();
    let visible = read_visible_file(data("visible_all.txt")).unwrap();
    let projector = VariableProjector::new(&model.ordering, &visible);
    assert!(projector.free_indices().is_empty());

    let abstracted = projector.abstract_root(&bdd, root);
    assert_eq!(abstracted, root);
    let count = enumerate(&bdd, abstracted, model.ordering.len(), projector.visible_indices()).count();
    assert_eq!(BigUint::from(count), bdd.sat_count(root, model.ordering.len()));
}

// ─── Errors ────────────────────────────────────────────────────────────────────

#[test]
fn malformed_dump_is_rejected() {
    let err = parse_file(data("malformed.dot")).unwrap_err();
    match err {
        Error::MalformedLine { line, kind } => {
            assert_eq!(line, 7);
            assert_eq!(kind, Malformed::UndeclaredTarget { address: 3 });
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn cyclic_dump_is_rejected() {
    let model = parse_file(data("cyclic.dot")).unwrap();
    let bdd = Bdd::default();
    assert!(matches!(build(&model, &bdd), Err(Error::CyclicGraph { .. })));
}

#[test]
fn missing_files() {
    assert!(matches!(parse_file(data("missing.dot")), Err(Error::FileAccess { .. })));
    assert!(matches!(read_visible_file(data("missing.txt")), Err(Error::FileAccess { .. })));
}

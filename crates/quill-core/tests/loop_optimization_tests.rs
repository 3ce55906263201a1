use quill_core::ast::{Node, ReferenceForm, LOOP_VARIABLE};
use quill_core::config::{EnvironmentOptions, OptimizationFlags};
use quill_core::traverser::traverse;
use quill_core::{Environment, LoopContext, OptimizerNodeVisitor};
use quill_test_helpers::compile::{always_defined, at, optimize_loops, optimize_with, with_loop};
use quill_test_helpers::fixtures::{
    loop_with_body, nested_loops, print_loop_index, print_parent_loop_index,
};

fn inner(tree: &Node) -> &Node {
    at(tree, &["body", "0"])
}

// ============================================================================
// Single loops
// ============================================================================

#[test]
fn test_loop_without_metadata_use_stays_disabled() {
    let tree = loop_with_body(Node::nodes(vec![
        Node::text("<li>"),
        Node::print(Node::name("user")),
        Node::print(Node::attribute(Node::name("user"), Node::constant("name"))),
    ]));

    let result = optimize_loops(tree);
    assert!(!with_loop(&result), "Got:\n{}", result);
}

#[test]
fn test_parser_default_is_reset() {
    let tree = loop_with_body(Node::nodes(vec![]));
    assert!(with_loop(&tree));

    let result = optimize_loops(tree);
    assert!(!with_loop(&result));
}

#[test]
fn test_loop_variable_enables_metadata() {
    let tree = loop_with_body(Node::nodes(vec![print_loop_index()]));
    let result = optimize_loops(tree);

    assert!(with_loop(&result));
    let name = at(&result, &["body", "0", "expr", "node"]);
    assert!(name.is_name(LOOP_VARIABLE));
    assert!(always_defined(name));
}

#[test]
fn test_loop_targets_are_always_defined() {
    let tree = loop_with_body(Node::nodes(vec![
        Node::print(Node::name("item")),
        Node::print(Node::name("_key")),
        Node::print(Node::name("other")),
    ]));
    let result = optimize_loops(tree);

    assert!(always_defined(at(&result, &["body", "0", "expr"])));
    assert!(always_defined(at(&result, &["body", "1", "expr"])));
    assert!(!always_defined(at(&result, &["body", "2", "expr"])));
    assert!(!with_loop(&result), "target names do not need loop metadata");
}

#[test]
fn test_names_after_loop_are_not_always_defined() {
    let tree = Node::nodes(vec![
        loop_with_body(Node::nodes(vec![])),
        Node::print(Node::name("item")),
        Node::print(Node::name(LOOP_VARIABLE)),
    ]);
    let result = optimize_loops(tree);

    assert!(!always_defined(at(&result, &["1", "expr"])));
    assert!(!always_defined(at(&result, &["2", "expr"])));
}

#[test]
fn test_block_reference_enables_metadata() {
    let tree = loop_with_body(Node::nodes(vec![Node::block_reference(
        "row",
        ReferenceForm::Statement,
    )]));
    assert!(with_loop(&optimize_loops(tree)));
}

#[test]
fn test_block_function_enables_metadata() {
    let tree = loop_with_body(Node::nodes(vec![Node::print(Node::block_reference(
        "row",
        ReferenceForm::Expression,
    ))]));
    assert!(with_loop(&optimize_loops(tree)));
}

#[test]
fn test_isolated_include_keeps_metadata_disabled() {
    let tree = loop_with_body(Node::nodes(vec![Node::include(
        Node::constant("row.html"),
        true,
    )]));
    assert!(!with_loop(&optimize_loops(tree)));
}

#[test]
fn test_include_function_without_with_context_enables_metadata() {
    let tree = loop_with_body(Node::nodes(vec![Node::print(Node::call(
        "include",
        [("template", Node::constant("row.html"))],
    ))]));
    assert!(with_loop(&optimize_loops(tree)));
}

#[test]
fn test_include_function_with_context_true_enables_metadata() {
    let tree = loop_with_body(Node::nodes(vec![Node::print(Node::call(
        "include",
        [
            ("template", Node::constant("row.html")),
            ("with_context", Node::constant(true)),
        ],
    ))]));
    assert!(with_loop(&optimize_loops(tree)));
}

#[test]
fn test_other_functions_do_not_enable_metadata() {
    let tree = loop_with_body(Node::nodes(vec![Node::print(Node::call(
        "range",
        [("low", Node::constant(1i64)), ("high", Node::constant(3i64))],
    ))]));
    assert!(!with_loop(&optimize_loops(tree)));
}

#[test]
fn test_sibling_loops_are_independent() {
    let tree = Node::nodes(vec![
        loop_with_body(Node::nodes(vec![print_loop_index()])),
        loop_with_body(Node::nodes(vec![Node::print(Node::name("item"))])),
    ]);
    let result = optimize_loops(tree);

    assert!(with_loop(at(&result, &["0"])));
    assert!(!with_loop(at(&result, &["1"])));
}

#[test]
fn test_loop_variable_in_seq_belongs_to_the_loop_being_entered() {
    let seq = Node::attribute(Node::name(LOOP_VARIABLE), Node::constant("index"));
    let tree = Node::loop_over("_key", "x", seq, Node::nodes(vec![]));
    assert!(with_loop(&optimize_loops(tree)));
}

// ============================================================================
// Nested loops
// ============================================================================

#[test]
fn test_loop_variable_in_inner_loop_enables_inner_only() {
    let result = optimize_loops(nested_loops(Node::nodes(vec![print_loop_index()])));

    assert!(!with_loop(&result));
    assert!(with_loop(inner(&result)));
}

#[test]
fn test_loop_variable_in_outer_body_enables_outer_only() {
    let tree = Node::loop_over(
        "_key",
        "row",
        Node::name("rows"),
        Node::nodes(vec![
            Node::loop_over("_key", "cell", Node::name("row"), Node::nodes(vec![])),
            print_loop_index(),
        ]),
    );
    let result = optimize_loops(tree);

    assert!(with_loop(&result));
    assert!(!with_loop(inner(&result)));
}

#[test]
fn test_unisolated_include_enables_every_enclosing_loop() {
    let result = optimize_loops(nested_loops(Node::nodes(vec![Node::include(
        Node::constant("cell.html"),
        false,
    )])));

    assert!(with_loop(&result));
    assert!(with_loop(inner(&result)));
}

#[test]
fn test_include_function_enables_every_enclosing_loop() {
    let result = optimize_loops(nested_loops(Node::nodes(vec![Node::print(Node::call(
        "include",
        [("template", Node::constant("cell.html"))],
    ))])));

    assert!(with_loop(&result));
    assert!(with_loop(inner(&result)));
}

#[test]
fn test_include_function_without_context_is_isolated() {
    let result = optimize_loops(nested_loops(Node::nodes(vec![Node::print(Node::call(
        "include",
        [
            ("template", Node::constant("cell.html")),
            ("with_context", Node::constant(false)),
        ],
    ))])));

    assert!(!with_loop(&result));
    assert!(!with_loop(inner(&result)));
}

#[test]
fn test_loop_parent_enables_every_enclosing_loop() {
    let result = optimize_loops(nested_loops(Node::nodes(vec![print_parent_loop_index()])));

    assert!(with_loop(&result));
    assert!(with_loop(inner(&result)));
}

#[test]
fn test_dynamic_access_on_loop_enables_every_enclosing_loop() {
    let dynamic = Node::attribute(Node::name(LOOP_VARIABLE), Node::name("field"));
    let result = optimize_loops(nested_loops(Node::nodes(vec![Node::print(dynamic)])));

    assert!(with_loop(&result));
    assert!(with_loop(inner(&result)));
}

#[test]
fn test_dynamic_access_after_loop_use_enables_every_enclosing_loop() {
    let dynamic = Node::attribute(Node::name("user"), Node::name("field"));
    let result = optimize_loops(nested_loops(Node::nodes(vec![
        print_loop_index(),
        Node::print(dynamic),
    ])));

    assert!(with_loop(&result));
    assert!(with_loop(inner(&result)));
}

#[test]
fn test_dynamic_access_without_loop_use_keeps_metadata_disabled() {
    let dynamic = Node::attribute(Node::name("user"), Node::name("field"));
    let result = optimize_loops(nested_loops(Node::nodes(vec![Node::print(dynamic)])));

    assert!(!with_loop(&result));
    assert!(!with_loop(inner(&result)));
}

#[test]
fn test_outer_targets_are_visible_in_inner_loop() {
    let result = optimize_loops(nested_loops(Node::nodes(vec![
        Node::print(Node::name("row")),
        Node::print(Node::name("cell")),
    ])));

    assert!(always_defined(at(inner(&result), &["body", "0", "expr"])));
    assert!(always_defined(at(inner(&result), &["body", "1", "expr"])));
    assert!(!with_loop(&result));
    assert!(!with_loop(inner(&result)));
}

// ============================================================================
// Configuration and bookkeeping
// ============================================================================

#[test]
fn test_for_disabled_leaves_loops_alone() {
    let tree = loop_with_body(Node::nodes(vec![Node::print(Node::name(LOOP_VARIABLE))]));
    let result = optimize_with(OptimizationFlags::TEXT_NODES, tree);

    assert!(with_loop(&result));
    assert!(!always_defined(at(&result, &["body", "0", "expr"])));
}

#[test]
fn test_deserialized_loop_keeps_metadata_without_for() {
    let json = r#"{
        "kind": "loop",
        "children": {
            "key_target": { "kind": "assign_name", "name": "_key" },
            "value_target": { "kind": "assign_name", "name": "item" },
            "seq": { "kind": "name", "name": "items" },
            "body": {
                "kind": "print",
                "children": {
                    "expr": {
                        "kind": "attribute_access",
                        "children": {
                            "node": { "kind": "name", "name": "loop" },
                            "attribute": { "kind": "constant", "value": "index" }
                        }
                    }
                }
            }
        }
    }"#;
    let tree: Node = serde_json::from_str(json).unwrap();
    assert!(with_loop(&tree));

    let result = optimize_with(OptimizationFlags::TEXT_NODES, tree);
    assert!(with_loop(&result));
}

#[test]
fn test_binary_operand_reading_loop_enables_metadata() {
    let index_plus_one = Node::binary(
        "+",
        Node::attribute(Node::name(LOOP_VARIABLE), Node::constant("index0")),
        Node::constant(1i64),
    );
    let tree = loop_with_body(Node::nodes(vec![Node::print(index_plus_one)]));
    let result = optimize_loops(tree);

    assert!(with_loop(&result));
    assert!(always_defined(at(&result, &["body", "0", "expr", "left", "node"])));
}

#[test]
fn test_loop_context_is_empty_after_traversal() {
    let env = Environment::new(EnvironmentOptions::default()).unwrap();
    let visitor = OptimizerNodeVisitor::default();
    let mut loops = LoopContext::new();

    let tree = nested_loops(Node::nodes(vec![print_parent_loop_index()]));
    let result = traverse(&visitor, &mut loops, tree, &env);

    assert!(result.is_some());
    assert!(loops.is_empty());
    assert_eq!(loops.depth(), 0);
}

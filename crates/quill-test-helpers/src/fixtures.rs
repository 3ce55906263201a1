//! Test fixtures - template trees as the parser would hand them over

use quill_core::ast::{Node, ReferenceForm, LOOP_VARIABLE};

/// `{% for v in items %}ab{% endfor %}` with the text split in two nodes
pub fn loop_with_text_body() -> Node {
    Node::loop_over(
        "k",
        "v",
        Node::name("items"),
        Node::nodes(vec![Node::text("a"), Node::text("b")]),
    )
}

/// A loop over `items` whose body is `body`
pub fn loop_with_body(body: Node) -> Node {
    Node::loop_over("_key", "item", Node::name("items"), body)
}

/// `{% for row in rows %}{% for cell in row %}...{% endfor %}{% endfor %}`
///
/// The inner loop sits at `body/0` of the outer loop.
pub fn nested_loops(inner_body: Node) -> Node {
    let inner = Node::loop_over("_key", "cell", Node::name("row"), inner_body);
    Node::loop_over(
        "_key",
        "row",
        Node::name("rows"),
        Node::nodes(vec![inner]),
    )
}

/// `{{ loop.index }}`
pub fn print_loop_index() -> Node {
    Node::print(Node::attribute(
        Node::name(LOOP_VARIABLE),
        Node::constant("index"),
    ))
}

/// `{{ loop.parent.loop.index }}`
pub fn print_parent_loop_index() -> Node {
    let parent = Node::attribute(Node::name(LOOP_VARIABLE), Node::constant("parent"));
    let parent_loop = Node::attribute(parent, Node::constant(LOOP_VARIABLE));
    Node::print(Node::attribute(parent_loop, Node::constant("index")))
}

/// `{{ name|raw }}`
pub fn raw_print(name: &str) -> Node {
    Node::print(Node::filter(Node::name(name), "raw", vec![]))
}

/// A list page as a parser would produce it, text split at every tag
pub fn list_page() -> Node {
    Node::nodes(vec![
        Node::text("<ul>"),
        Node::text("\n"),
        loop_with_body(Node::nodes(vec![
            Node::text("<li>"),
            Node::print(Node::name("item")),
            Node::text("</li>"),
        ])),
        Node::text("</ul>"),
    ])
}

/// A child template overriding `content` and rendering the parent's version
pub fn block_with_parent() -> Node {
    Node::block(
        "content",
        Node::nodes(vec![
            Node::print(Node::parent_call("content")),
            Node::print(Node::constant("<p>extra</p>")),
            Node::print(Node::block_reference("sidebar", ReferenceForm::Expression)),
        ]),
    )
}

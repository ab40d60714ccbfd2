// Shared by the benchmark targets in this directory; each one uses a subset
#![allow(dead_code)]

use weft_dom::{Dom, NodeId, NodeSpec};

/// A surface of `sections` repetitions of headings, styled paragraphs, a
/// nested list and a small table
pub fn generate_surface(sections: usize) -> (Dom, NodeId) {
    let mut root = NodeSpec::element("div");
    for section in 0..sections {
        root = root
            .child(NodeSpec::element("h2").child(NodeSpec::text(&format!("Section {section}"))))
            .child(
                NodeSpec::element("p")
                    .attr("style", "text-align: center")
                    .child(NodeSpec::text("Some paragraph content with "))
                    .child(NodeSpec::element("b").child(NodeSpec::text("bold")))
                    .child(NodeSpec::text(" and "))
                    .child(
                        NodeSpec::element("a")
                            .attr("href", "https://example.com")
                            .child(NodeSpec::text("a link")),
                    ),
            )
            .child(
                NodeSpec::element("ul")
                    .child(
                        NodeSpec::element("li")
                            .child(NodeSpec::text("item"))
                            .child(NodeSpec::element("ol").child(NodeSpec::element("li").child(NodeSpec::text("nested")))),
                    )
                    .child(NodeSpec::element("li").child(NodeSpec::text("another item"))),
            )
            .child(generate_table(3, 3));
    }

    let mut dom = Dom::new();
    let document = dom.document();
    let root = dom.build(document, &root);
    (dom, root)
}

fn generate_table(rows: usize, cols: usize) -> NodeSpec {
    let mut table = NodeSpec::element("table");
    for row in 0..rows {
        let mut tr = NodeSpec::element("tr");
        for col in 0..cols {
            tr = tr.child(NodeSpec::element("td").child(NodeSpec::text(&format!("{row}.{col}"))));
        }
        table = table.child(tr);
    }
    table
}

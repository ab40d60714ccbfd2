use std::collections::BTreeMap;

use crate::node::{NodeData, NodeId};
use crate::tree::Dom;

impl Dom {
    /// Outer HTML of a node. Document and fragment nodes serialize their
    /// children only.
    pub fn to_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_html(id, &mut out);
        out
    }

    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        for &child in self.children(id) {
            self.write_html(child, &mut out);
        }
        out
    }

    fn write_html(&self, id: NodeId, out: &mut String) {
        match self.data(id) {
            NodeData::Text(text) => out.push_str(&html_escape::encode_text(text)),
            NodeData::Comment(text) => {
                out.push_str("<!--");
                out.push_str(text);
                out.push_str("-->");
            }
            NodeData::Document | NodeData::Fragment => {
                for &child in self.children(id) {
                    self.write_html(child, out);
                }
            }
            NodeData::Element(element) => {
                let mut attributes: BTreeMap<&str, String> = element
                    .attributes
                    .iter()
                    .map(|(name, value)| (name.as_str(), value.clone()))
                    .collect();
                if !element.style.is_empty() {
                    attributes.insert("style", element.style_text());
                }

                out.push('<');
                out.push_str(&element.tag);
                for (name, value) in attributes {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    out.push_str(&html_escape::encode_double_quoted_attribute(&value));
                    out.push('"');
                }
                out.push('>');
                if element.is_void() {
                    return;
                }
                for &child in self.children(id) {
                    self.write_html(child, out);
                }
                out.push_str("</");
                out.push_str(&element.tag);
                out.push('>');
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::spec::NodeSpec;
    use crate::tree::Dom;
    use insta::assert_snapshot;

    #[test]
    fn serializes_elements_text_and_void_tags() {
        let spec = NodeSpec::element("div")
            .attr("title", "a \"quote\"")
            .attr("style", "color: red")
            .child(NodeSpec::text("1 < 2 & 3"))
            .child(NodeSpec::element("br"))
            .child(NodeSpec::Comment {
                comment: "c".to_string(),
            });
        let mut dom = Dom::new();
        let document = dom.document();
        let div = dom.build(document, &spec);

        assert_snapshot!(
            dom.to_html(div),
            @r#"<div style="color: red" title="a &quot;quote&quot;">1 &lt; 2 &amp; 3<br><!--c--></div>"#
        );
        assert_eq!(dom.inner_html(document), dom.to_html(div));
    }
}

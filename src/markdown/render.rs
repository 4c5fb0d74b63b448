//! Document tree to Markdown rendering.
//!
//! Standard element mappings only: headings, emphasis, links, images, lists,
//! code. The pipeline targets one fixed source template, so anything
//! unrecognized degrades to its inner content rather than erroring. Spacing
//! is deliberately generous; the transformer collapses blank-line runs in a
//! later pass.

use crate::dom::{Element, Node, inner_text};

/// Render a forest of nodes to Markdown text.
pub fn render_nodes(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        render_block(node, &mut out, 0);
    }
    out
}

fn render_block(node: &Node, out: &mut String, indent: usize) {
    match node {
        Node::Text(text) => out.push_str(text),
        Node::Element(el) => match el.name.as_str() {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let level = el.name[1..].parse::<usize>().unwrap_or(1);
                ensure_line_start(out);
                out.push_str(&"#".repeat(level));
                out.push(' ');
                out.push_str(render_inline_children(el).trim());
                out.push_str("\n\n");
            }
            "p" => {
                ensure_line_start(out);
                out.push_str(&render_inline_children(el));
                out.push_str("\n\n");
            }
            "pre" => {
                ensure_line_start(out);
                out.push_str("```\n");
                let code = inner_text(el);
                out.push_str(&code);
                if !code.ends_with('\n') {
                    out.push('\n');
                }
                out.push_str("```\n\n");
            }
            "ul" => {
                render_list(el, false, out, indent);
                if indent == 0 {
                    out.push('\n');
                }
            }
            "ol" => {
                render_list(el, true, out, indent);
                if indent == 0 {
                    out.push('\n');
                }
            }
            "hr" => {
                ensure_line_start(out);
                out.push_str("---\n\n");
            }
            "br" => out.push('\n'),
            "img" => out.push_str(&render_image(el)),
            "a" => out.push_str(&render_link(el)),
            "strong" | "b" | "em" | "i" | "code" => out.push_str(&render_inline(el)),
            // Structural containers and anything unrecognized: render the
            // children and let the content speak for itself.
            _ => {
                for child in &el.children {
                    render_block(child, out, indent);
                }
            }
        },
    }
}

fn render_list(list: &Element, ordered: bool, out: &mut String, indent: usize) {
    ensure_line_start(out);
    let mut counter = 0;
    for child in &list.children {
        let Node::Element(item) = child else { continue };
        if item.name != "li" {
            continue;
        }
        counter += 1;
        out.push_str(&"  ".repeat(indent));
        if ordered {
            out.push_str(&format!("{counter}. "));
        } else {
            out.push_str("* ");
        }

        // Inline content forms the item line; nested lists follow it.
        let mut line = String::new();
        let mut nested: Vec<&Element> = Vec::new();
        for part in &item.children {
            match part {
                Node::Element(el) if el.name == "ul" || el.name == "ol" => nested.push(el),
                other => line.push_str(&render_inline_node(other)),
            }
        }
        out.push_str(line.trim());
        out.push('\n');
        for sublist in nested {
            render_list(sublist, sublist.name == "ol", out, indent + 1);
        }
    }
}

fn render_inline_children(el: &Element) -> String {
    el.children.iter().map(render_inline_node).collect()
}

fn render_inline_node(node: &Node) -> String {
    match node {
        Node::Text(text) => text.clone(),
        Node::Element(el) => render_inline(el),
    }
}

fn render_inline(el: &Element) -> String {
    match el.name.as_str() {
        "strong" | "b" => wrap_nonempty(&render_inline_children(el), "**"),
        "em" | "i" => wrap_nonempty(&render_inline_children(el), "*"),
        "code" => wrap_nonempty(&inner_text(el), "`"),
        "a" => render_link(el),
        "img" => render_image(el),
        "br" => "\n".to_string(),
        _ => render_inline_children(el),
    }
}

fn wrap_nonempty(content: &str, marker: &str) -> String {
    if content.is_empty() {
        String::new()
    } else {
        format!("{marker}{content}{marker}")
    }
}

fn render_link(a: &Element) -> String {
    let text = render_inline_children(a);
    match a.attr("href") {
        Some(href) if !href.is_empty() => format!("[{text}]({href})"),
        _ => text,
    }
}

fn render_image(img: &Element) -> String {
    let src = img.attr("src").unwrap_or_default();
    let alt = img.attr("alt").unwrap_or_default();
    format!("![{alt}]({src})")
}

fn ensure_line_start(out: &mut String) {
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
}
